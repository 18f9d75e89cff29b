use std::collections::HashMap;

use crate::{
	analysis::SymbolTable,
	ast::{BinaryOp, Expression, Function, Identifier, Namespace, Statement, UnaryOp},
};

/// Constant propagation and folding.
///
/// A bottom-up walk over every statement's expression computes, per
/// subtree, whether it is a compile-time constant. Whole-constant subtrees
/// are folded by the parent; a binary operation with exactly one constant
/// side materializes that side in place. The pass also tracks, per storage
/// location, whether the location currently holds a known constant, so a
/// later read of the location folds too.
///
/// The tracking map is keyed by `(namespace, id)`: parameter 0 and
/// variable 0 are different locations.
pub struct ConstantPropagation<'a> {
	symbols: &'a SymbolTable,
	/// `Some(v)` while the location is known to hold `v`, `None` after it
	/// was overwritten with a value that is not a compile-time constant.
	known:   HashMap<(Namespace, usize), Option<i64>>,
}

impl<'a> ConstantPropagation<'a> {
	pub fn new(symbols: &'a SymbolTable) -> Self { Self { symbols, known: HashMap::new() } }

	pub fn run(&mut self, function: &mut Function) {
		for statement in &mut function.statements {
			self.fold_statement(statement);
		}
	}

	fn fold_statement(&mut self, statement: &mut Statement) {
		match statement {
			Statement::Assignment { target, expr } => {
				let folded = self.fold_expression(expr);
				if let Some(value) = folded {
					*expr = Expression::ConstantLiteral(value);
				}
				// Either way the target's constness changes: it now holds
				// the folded value, or its value is no longer known.
				self.known.insert((target.namespace, target.id), folded);
			}
			Statement::Return { expr } => {
				if let Some(value) = self.fold_expression(expr) {
					*expr = Expression::ConstantLiteral(value);
				}
			}
		}
	}

	/// Returns the value of `expr` if the whole subtree is a compile-time
	/// constant, materializing single constant sides of binary operations
	/// along the way.
	fn fold_expression(&mut self, expr: &mut Expression) -> Option<i64> {
		match expr {
			Expression::ConstantLiteral(value) => Some(*value),
			Expression::Identifier(identifier) => self.fold_identifier(*identifier),
			Expression::UnaryOp { op, expr } => {
				let value = self.fold_expression(expr)?;
				Some(match op {
					UnaryOp::Plus => value,
					UnaryOp::Minus => value.wrapping_neg(),
				})
			}
			Expression::BinaryOp { op, lhs, rhs } => {
				let left = self.fold_expression(lhs);
				let right = self.fold_expression(rhs);
				match (left, right) {
					(Some(left), Some(right)) => fold_binary(*op, left, right),
					(Some(left), None) => {
						**lhs = Expression::ConstantLiteral(left);
						None
					}
					(None, Some(right)) => {
						**rhs = Expression::ConstantLiteral(right);
						None
					}
					(None, None) => None,
				}
			}
		}
	}

	fn fold_identifier(&self, identifier: Identifier) -> Option<i64> {
		if identifier.namespace == Namespace::Constant {
			return Some(self.symbols.constant_value(identifier.id));
		}
		self.known.get(&(identifier.namespace, identifier.id)).copied().flatten()
	}
}

/// Applies a binary operator to two known values. A division by zero is
/// never folded: the expression keeps its runtime-error behavior instead
/// of turning a trap into a literal.
fn fold_binary(op: BinaryOp, lhs: i64, rhs: i64) -> Option<i64> {
	match op {
		BinaryOp::Add => Some(lhs.wrapping_add(rhs)),
		BinaryOp::Sub => Some(lhs.wrapping_sub(rhs)),
		BinaryOp::Mul => Some(lhs.wrapping_mul(rhs)),
		BinaryOp::Div if rhs == 0 => None,
		BinaryOp::Div => Some(lhs.wrapping_div(rhs)),
	}
}
