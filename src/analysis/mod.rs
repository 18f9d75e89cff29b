//! Semantic analysis: declaration checking and lowering to the AST.
//!
//! Analysis runs in two phases. Phase one walks the declaration sections in
//! syntactic order (PARAM, VAR, CONST) and registers every identifier in
//! its namespace; a name collision is a duplicate declaration and fails the
//! analysis. Phase two walks the statement list and lowers it, enforcing
//! two rules on the way:
//!
//! 1. An assignment target must not be a constant.
//! 2. A variable must be assigned before it is read. The program is a
//!    single straight line, so syntactic order equals execution order and
//!    a plain set of initialized ids is enough. Parameters count as
//!    initialized on entry, constants trivially so.

mod symbol_table;

pub use symbol_table::{Registration, SymbolEntry, SymbolTable};

use std::collections::HashSet;

use crate::{
	ast::{self, Namespace},
	error::CompileError,
	lexer::TokenKind,
	parser::cst,
	source::{SourceManager, SourceRange},
};

/// Validates a parsed function and lowers it into an AST.
pub struct SemanticAnalyzer<'a> {
	source:      &'a SourceManager,
	symbols:     &'a mut SymbolTable,
	/// Ids of variables that have been assigned up to the current point
	initialized: HashSet<usize>,
	has_return:  bool,
}

impl<'a> SemanticAnalyzer<'a> {
	pub fn new(source: &'a SourceManager, symbols: &'a mut SymbolTable) -> Self {
		Self { source, symbols, initialized: HashSet::new(), has_return: false }
	}

	pub fn analyze_function(mut self, node: &cst::FunctionDefinition) -> Result<ast::Function, CompileError> {
		if let Some(parameters) = &node.parameters {
			self.register_declarator_list(&parameters.declarators, Namespace::Parameter)?;
		}
		if let Some(variables) = &node.variables {
			self.register_declarator_list(&variables.declarators, Namespace::Variable)?;
		}
		if let Some(constants) = &node.constants {
			self.register_constant_declarations(constants)?;
		}

		let statements = self.analyze_statements(&node.body)?;

		if !self.has_return {
			self.source
				.report(node.body.end.range, "error: function does not contain a return-statement");
			return Err(CompileError::Semantic);
		}

		Ok(ast::Function { statements })
	}

	fn register_declarator_list(
		&mut self,
		list: &cst::DeclaratorList,
		namespace: Namespace,
	) -> Result<(), CompileError> {
		for entry in &list.entries {
			let cst::ListEntry::Node(identifier) = entry else { continue };
			let name = self.source.text(identifier.range);
			let result = self.symbols.register(namespace, name, identifier.range, None);
			if !result.newly_registered {
				self.report_duplicate(identifier.range, result.entry)?;
			}
		}
		Ok(())
	}

	fn register_constant_declarations(&mut self, node: &cst::ConstantDeclarations) -> Result<(), CompileError> {
		for entry in &node.declarators.entries {
			let cst::ListEntry::Node(declarator) = entry else { continue };
			let name = self.source.text(declarator.name.range);
			let result =
				self.symbols
					.register(Namespace::Constant, name, declarator.name.range, Some(declarator.value.value));
			if !result.newly_registered {
				self.report_duplicate(declarator.name.range, result.entry)?;
			}
		}
		Ok(())
	}

	fn report_duplicate(&self, duplicate: SourceRange, existing: SymbolEntry) -> Result<(), CompileError> {
		self.source.report(duplicate, "error: duplicate declaration of identifier");
		self.source.report(existing.declaration, "note: already declared here");
		Err(CompileError::Semantic)
	}

	fn analyze_statements(&mut self, node: &cst::CompoundStatement) -> Result<Vec<ast::Statement>, CompileError> {
		let mut statements = Vec::new();
		for entry in &node.statements.entries {
			let cst::ListEntry::Node(statement) = entry else { continue };
			statements.push(self.analyze_statement(statement)?);
		}
		Ok(statements)
	}

	fn analyze_statement(&mut self, node: &cst::Statement) -> Result<ast::Statement, CompileError> {
		match &node.kind {
			cst::StatementKind::Return { expression, .. } => {
				self.has_return = true;
				let expr = self.analyze_additive(expression)?;
				Ok(ast::Statement::Return { expr })
			}
			cst::StatementKind::Assignment(assignment) => {
				// The right-hand side is analyzed first: an uninitialized
				// variable on the right of its own first assignment is
				// still an error.
				let expr = self.analyze_additive(&assignment.expression)?;

				let name = self.source.text(assignment.target.range);
				let Some(entry) = self.symbols.lookup(name) else {
					self.source.report(assignment.target.range, "error: use of undeclared identifier");
					return Err(CompileError::Semantic);
				};

				if entry.namespace == Namespace::Constant {
					self.source.report(
						assignment.target.range,
						"error: trying to assign to an identifier declared 'CONST'",
					);
					self.source.report(entry.declaration, "note: declared as 'CONST' here");
					return Err(CompileError::Semantic);
				}

				if entry.namespace == Namespace::Variable {
					// The variable now holds a value and is safe to read.
					self.initialized.insert(entry.id);
				}

				let target = ast::Identifier { namespace: entry.namespace, id: entry.id };
				Ok(ast::Statement::Assignment { target, expr })
			}
		}
	}

	fn analyze_additive(&mut self, node: &cst::AdditiveExpression) -> Result<ast::Expression, CompileError> {
		let first = self.analyze_multiplicative(&node.first)?;
		let Some((op, rhs)) = &node.rest else { return Ok(first) };

		let op = if op.kind == TokenKind::Plus { ast::BinaryOp::Add } else { ast::BinaryOp::Sub };
		let rhs = self.analyze_additive(rhs)?;
		Ok(ast::Expression::BinaryOp { op, lhs: Box::new(first), rhs: Box::new(rhs) })
	}

	fn analyze_multiplicative(
		&mut self,
		node: &cst::MultiplicativeExpression,
	) -> Result<ast::Expression, CompileError> {
		let first = self.analyze_unary(&node.first)?;
		let Some((op, rhs)) = &node.rest else { return Ok(first) };

		let op = if op.kind == TokenKind::Star { ast::BinaryOp::Mul } else { ast::BinaryOp::Div };
		let rhs = self.analyze_multiplicative(rhs)?;
		Ok(ast::Expression::BinaryOp { op, lhs: Box::new(first), rhs: Box::new(rhs) })
	}

	fn analyze_unary(&mut self, node: &cst::UnaryExpression) -> Result<ast::Expression, CompileError> {
		let expr = self.analyze_primary(&node.primary)?;
		let Some(sign) = &node.sign else { return Ok(expr) };

		let op = if sign.kind == TokenKind::Plus { ast::UnaryOp::Plus } else { ast::UnaryOp::Minus };
		Ok(ast::Expression::UnaryOp { op, expr: Box::new(expr) })
	}

	fn analyze_primary(&mut self, node: &cst::PrimaryExpression) -> Result<ast::Expression, CompileError> {
		match &node.kind {
			cst::PrimaryKind::Literal(literal) => Ok(ast::Expression::ConstantLiteral(literal.value)),
			cst::PrimaryKind::Identifier(identifier) => self.analyze_identifier(identifier),
			// The parentheses only matter for precedence, which the tree
			// shape already encodes.
			cst::PrimaryKind::Parenthesized { expression, .. } => self.analyze_additive(expression),
		}
	}

	fn analyze_identifier(&mut self, node: &cst::Identifier) -> Result<ast::Expression, CompileError> {
		let name = self.source.text(node.range);
		let Some(entry) = self.symbols.lookup(name) else {
			self.source.report(node.range, "error: use of undeclared identifier");
			return Err(CompileError::Semantic);
		};

		if entry.namespace == Namespace::Variable && !self.initialized.contains(&entry.id) {
			self.source.report(node.range, "error: use of uninitialized identifier");
			return Err(CompileError::Semantic);
		}

		Ok(ast::Expression::Identifier(ast::Identifier { namespace: entry.namespace, id: entry.id }))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		ast::{BinaryOp, Expression, Identifier, Statement},
		parser::Parser,
	};

	fn analyze(input: &str) -> Result<(ast::Function, SymbolTable), CompileError> {
		let manager = SourceManager::new(input.to_string());
		let mut parser = Parser::new(&manager);
		let tree = parser.parse_function_definition().expect("test programs must parse");
		let mut symbols = SymbolTable::new();
		let function = SemanticAnalyzer::new(&manager, &mut symbols).analyze_function(&tree)?;
		Ok((function, symbols))
	}

	fn accepts(input: &str) {
		assert!(analyze(input).is_ok(), "should analyze: {input}");
	}

	fn rejects(input: &str) {
		assert!(analyze(input).is_err(), "should not analyze: {input}");
	}

	#[test]
	fn declarations_are_registered() {
		let (_, symbols) = analyze("PARAM a, b; VAR x; CONST C = 3; BEGIN x := a; RETURN x + b * C END.")
			.unwrap();
		assert_eq!(symbols.parameter_count(), 2);
		assert_eq!(symbols.variable_count(), 1);
		assert_eq!(symbols.lookup("b").unwrap().id, 1);
		assert_eq!(symbols.lookup("C").unwrap().namespace, Namespace::Constant);
		assert_eq!(symbols.constant_value(0), 3);
	}

	#[test]
	fn duplicate_declarations() {
		rejects("PARAM a, a; BEGIN RETURN a END.");
		rejects("PARAM a; VAR a; BEGIN RETURN a END.");
		rejects("VAR x; CONST x = 1; BEGIN RETURN x END.");
		rejects("CONST A = 1, A = 2; BEGIN RETURN A END.");
	}

	#[test]
	fn undeclared_identifiers() {
		rejects("BEGIN a := 12; RETURN a END.");
		rejects("BEGIN RETURN a END.");
		rejects("PARAM a; BEGIN RETURN b END.");
	}

	#[test]
	fn assignment_to_a_constant() {
		rejects("CONST A = 1; BEGIN A := 2; RETURN A END.");
	}

	#[test]
	fn initialization_before_use() {
		rejects("VAR x; BEGIN RETURN x END.");
		rejects("VAR x; BEGIN x := x + 1; RETURN x END.");
		accepts("VAR x; BEGIN x := 1; RETURN x END.");
		accepts("VAR x, y; BEGIN x := 2; y := x * x; RETURN y END.");
		// Parameters are initialized on entry and stay assignable.
		accepts("PARAM a; BEGIN a := a + 1; RETURN a END.");
		accepts("CONST A = 5; BEGIN RETURN A END.");
	}

	#[test]
	fn missing_return() {
		rejects("VAR x; BEGIN x := 1 END.");
	}

	#[test]
	fn lowering_resolves_identifiers() {
		let (function, _) = analyze("PARAM a; VAR x; BEGIN x := a + 1; RETURN x END.").unwrap();
		assert_eq!(function.statements.len(), 2);

		let Statement::Assignment { target, expr } = &function.statements[0] else {
			panic!("expected an assignment")
		};
		assert_eq!(*target, Identifier { namespace: Namespace::Variable, id: 0 });
		let Expression::BinaryOp { op: BinaryOp::Add, lhs, .. } = expr else { panic!("expected an addition") };
		assert_eq!(
			**lhs,
			Expression::Identifier(Identifier { namespace: Namespace::Parameter, id: 0 })
		);
	}

	#[test]
	fn lowering_nests_to_the_right() {
		// 1+3-2+42 lowers as 1+(3-(2+42)).
		let (function, _) = analyze("BEGIN RETURN 1+3-2+42 END.").unwrap();
		let Statement::Return { expr } = &function.statements[0] else { panic!("expected a return") };

		let Expression::BinaryOp { op: BinaryOp::Add, lhs, rhs } = expr else {
			panic!("expected the outer addition")
		};
		assert_eq!(**lhs, Expression::ConstantLiteral(1));
		let Expression::BinaryOp { op: BinaryOp::Sub, rhs, .. } = &**rhs else {
			panic!("expected the subtraction")
		};
		assert!(matches!(&**rhs, Expression::BinaryOp { op: BinaryOp::Add, .. }));
	}

	#[test]
	fn unary_plus_is_preserved() {
		let (function, _) = analyze("BEGIN RETURN +1 END.").unwrap();
		let Statement::Return { expr } = &function.statements[0] else { panic!("expected a return") };
		assert_eq!(
			*expr,
			Expression::UnaryOp { op: ast::UnaryOp::Plus, expr: Box::new(Expression::ConstantLiteral(1)) }
		);
	}
}
