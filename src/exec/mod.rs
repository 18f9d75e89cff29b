//! Tree-walking execution of compiled functions.
//!
//! Evaluation is a depth-first walk over the optimized AST against a
//! per-invocation [`ExecutionContext`]. Arithmetic wraps on signed 64-bit
//! overflow; division truncates toward zero and raises the only runtime
//! error, division by zero. Every node short-circuits once the context
//! carries an error, so no further side effects happen after a failure.

use crate::{
	analysis::SymbolTable,
	ast::{BinaryOp, Expression, Function, Identifier, Namespace, Statement, UnaryOp},
};

/// A runtime failure raised during evaluation.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
	#[error("division by zero")]
	DivisionByZero,
}

/// Per-invocation state: parameter and variable storage, the return value
/// and the error channel. Constants are read from the symbol table.
pub struct ExecutionContext<'a> {
	pub parameters:   Vec<i64>,
	pub variables:    Vec<i64>,
	pub return_value: i64,
	pub error:        Option<EvalError>,
	symbols:          &'a SymbolTable,
}

impl<'a> ExecutionContext<'a> {
	/// Variable storage is sized from the symbol table and zeroed; the
	/// caller is responsible for passing exactly `parameter_count` values.
	pub fn new(parameters: Vec<i64>, symbols: &'a SymbolTable) -> Self {
		debug_assert_eq!(parameters.len(), symbols.parameter_count());
		let variables = vec![0; symbols.variable_count()];
		Self { parameters, variables, return_value: 0, error: None, symbols }
	}

	pub fn has_error(&self) -> bool { self.error.is_some() }
}

/// Executes a function. Statements run in source order until the first
/// return statement has executed or a runtime error occurred.
pub fn execute(function: &Function, context: &mut ExecutionContext) {
	for statement in &function.statements {
		execute_statement(statement, context);
		if context.has_error() || matches!(statement, Statement::Return { .. }) {
			break;
		}
	}
}

fn execute_statement(statement: &Statement, context: &mut ExecutionContext) {
	match statement {
		Statement::Assignment { target, expr } => {
			let value = evaluate(expr, context);
			if context.has_error() {
				return;
			}
			match target.namespace {
				Namespace::Parameter => context.parameters[target.id] = value,
				Namespace::Variable => context.variables[target.id] = value,
				Namespace::Constant => unreachable!("the analyzer rejects assignments to constants"),
			}
		}
		Statement::Return { expr } => {
			let value = evaluate(expr, context);
			if !context.has_error() {
				context.return_value = value;
			}
		}
	}
}

fn evaluate(expr: &Expression, context: &mut ExecutionContext) -> i64 {
	match expr {
		Expression::ConstantLiteral(value) => *value,
		Expression::Identifier(identifier) => load(*identifier, context),
		Expression::UnaryOp { op, expr } => {
			let value = evaluate(expr, context);
			if context.has_error() {
				return 0;
			}
			match op {
				UnaryOp::Plus => value,
				UnaryOp::Minus => value.wrapping_neg(),
			}
		}
		Expression::BinaryOp { op, lhs, rhs } => {
			let lhs = evaluate(lhs, context);
			if context.has_error() {
				return 0;
			}
			let rhs = evaluate(rhs, context);
			if context.has_error() {
				return 0;
			}
			apply_binary(*op, lhs, rhs, context)
		}
	}
}

fn load(identifier: Identifier, context: &ExecutionContext) -> i64 {
	match identifier.namespace {
		Namespace::Parameter => context.parameters[identifier.id],
		Namespace::Variable => context.variables[identifier.id],
		Namespace::Constant => context.symbols.constant_value(identifier.id),
	}
}

fn apply_binary(op: BinaryOp, lhs: i64, rhs: i64, context: &mut ExecutionContext) -> i64 {
	match op {
		BinaryOp::Add => lhs.wrapping_add(rhs),
		BinaryOp::Sub => lhs.wrapping_sub(rhs),
		BinaryOp::Mul => lhs.wrapping_mul(rhs),
		BinaryOp::Div => {
			if rhs == 0 {
				println!("error: division by zero");
				context.error = Some(EvalError::DivisionByZero);
				return 0;
			}
			lhs.wrapping_div(rhs)
		}
	}
}
