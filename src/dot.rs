//! DOT graph rendering of the two trees, for the inspection tool.
//!
//! Nodes are numbered in pre-order. Non-terminals of the concrete syntax
//! tree are labelled with their production name and terminals with their
//! source text; AST nodes are labelled with what they execute, resolving
//! identifier names back through the symbol table.

use std::fmt::Write;

use crate::{
	analysis::SymbolTable,
	ast,
	lexer::Token,
	parser::cst,
	source::SourceManager,
};

/// Renders a concrete syntax tree as a DOT digraph.
pub fn render_cst(tree: &cst::FunctionDefinition, source: &SourceManager) -> String {
	let mut printer = CstPrinter { source, graph: DotGraph::default() };
	printer.function_definition(tree);
	printer.graph.finish()
}

/// Renders an AST as a DOT digraph.
pub fn render_ast(function: &ast::Function, symbols: &SymbolTable) -> String {
	let mut printer = AstPrinter { symbols, graph: DotGraph::default() };
	printer.function(function);
	printer.graph.finish()
}

/// Label and edge collector shared by both printers.
#[derive(Default)]
struct DotGraph {
	labels: Vec<String>,
	edges:  Vec<(usize, usize)>,
}

impl DotGraph {
	/// Adds a node and returns its id.
	fn node(&mut self, label: impl Into<String>) -> usize {
		self.labels.push(label.into());
		self.labels.len() - 1
	}

	fn edge(&mut self, from: usize, to: usize) { self.edges.push((from, to)); }

	fn finish(self) -> String {
		let mut out = String::from("digraph {\n");
		for (id, label) in self.labels.iter().enumerate() {
			let _ = writeln!(out, "\t{id} [label=\"{label}\"];");
		}
		for (from, to) in &self.edges {
			let _ = writeln!(out, "\t{from} -> {to};");
		}
		out.push_str("}\n");
		out
	}
}

struct CstPrinter<'a> {
	source: &'a SourceManager,
	graph:  DotGraph,
}

impl CstPrinter<'_> {
	fn function_definition(&mut self, node: &cst::FunctionDefinition) -> usize {
		let id = self.graph.node("function-definition");
		if let Some(parameters) = &node.parameters {
			let child = self.parameter_declarations(parameters);
			self.graph.edge(id, child);
		}
		if let Some(variables) = &node.variables {
			let child = self.variable_declarations(variables);
			self.graph.edge(id, child);
		}
		if let Some(constants) = &node.constants {
			let child = self.constant_declarations(constants);
			self.graph.edge(id, child);
		}
		let body = self.compound_statement(&node.body);
		self.graph.edge(id, body);
		let terminator = self.token(&node.terminator);
		self.graph.edge(id, terminator);
		id
	}

	fn parameter_declarations(&mut self, node: &cst::ParameterDeclarations) -> usize {
		let id = self.graph.node("parameter-declarations");
		let keyword = self.token(&node.keyword);
		self.graph.edge(id, keyword);
		let list = self.declarator_list(&node.declarators);
		self.graph.edge(id, list);
		let semicolon = self.token(&node.semicolon);
		self.graph.edge(id, semicolon);
		id
	}

	fn variable_declarations(&mut self, node: &cst::VariableDeclarations) -> usize {
		let id = self.graph.node("variable-declarations");
		let keyword = self.token(&node.keyword);
		self.graph.edge(id, keyword);
		let list = self.declarator_list(&node.declarators);
		self.graph.edge(id, list);
		let semicolon = self.token(&node.semicolon);
		self.graph.edge(id, semicolon);
		id
	}

	fn constant_declarations(&mut self, node: &cst::ConstantDeclarations) -> usize {
		let id = self.graph.node("constant-declarations");
		let keyword = self.token(&node.keyword);
		self.graph.edge(id, keyword);
		let list = self.init_declarator_list(&node.declarators);
		self.graph.edge(id, list);
		let semicolon = self.token(&node.semicolon);
		self.graph.edge(id, semicolon);
		id
	}

	fn declarator_list(&mut self, node: &cst::DeclaratorList) -> usize {
		let id = self.graph.node("declarator-list");
		for entry in &node.entries {
			let child = match entry {
				cst::ListEntry::Node(identifier) => self.identifier(identifier),
				cst::ListEntry::Separator(token) => self.token(token),
			};
			self.graph.edge(id, child);
		}
		id
	}

	fn init_declarator_list(&mut self, node: &cst::InitDeclaratorList) -> usize {
		let id = self.graph.node("init-declarator-list");
		for entry in &node.entries {
			let child = match entry {
				cst::ListEntry::Node(declarator) => self.init_declarator(declarator),
				cst::ListEntry::Separator(token) => self.token(token),
			};
			self.graph.edge(id, child);
		}
		id
	}

	fn init_declarator(&mut self, node: &cst::InitDeclarator) -> usize {
		let id = self.graph.node("init-declarator");
		let name = self.identifier(&node.name);
		self.graph.edge(id, name);
		let init = self.token(&node.init);
		self.graph.edge(id, init);
		let value = self.literal(&node.value);
		self.graph.edge(id, value);
		id
	}

	fn compound_statement(&mut self, node: &cst::CompoundStatement) -> usize {
		let id = self.graph.node("compound-statement");
		let begin = self.token(&node.begin);
		self.graph.edge(id, begin);
		let list = self.statement_list(&node.statements);
		self.graph.edge(id, list);
		let end = self.token(&node.end);
		self.graph.edge(id, end);
		id
	}

	fn statement_list(&mut self, node: &cst::StatementList) -> usize {
		let id = self.graph.node("statement-list");
		for entry in &node.entries {
			let child = match entry {
				cst::ListEntry::Node(statement) => self.statement(statement),
				cst::ListEntry::Separator(token) => self.token(token),
			};
			self.graph.edge(id, child);
		}
		id
	}

	fn statement(&mut self, node: &cst::Statement) -> usize {
		let id = self.graph.node("statement");
		match &node.kind {
			cst::StatementKind::Assignment(assignment) => {
				let child = self.assignment_expression(assignment);
				self.graph.edge(id, child);
			}
			cst::StatementKind::Return { keyword, expression } => {
				let keyword = self.token(keyword);
				self.graph.edge(id, keyword);
				let expression = self.additive_expression(expression);
				self.graph.edge(id, expression);
			}
		}
		id
	}

	fn assignment_expression(&mut self, node: &cst::AssignmentExpression) -> usize {
		let id = self.graph.node("assignment-expression");
		let target = self.identifier(&node.target);
		self.graph.edge(id, target);
		let assign = self.token(&node.assign);
		self.graph.edge(id, assign);
		let expression = self.additive_expression(&node.expression);
		self.graph.edge(id, expression);
		id
	}

	fn additive_expression(&mut self, node: &cst::AdditiveExpression) -> usize {
		let id = self.graph.node("additive-expression");
		let first = self.multiplicative_expression(&node.first);
		self.graph.edge(id, first);
		if let Some((op, rhs)) = &node.rest {
			let op = self.token(op);
			self.graph.edge(id, op);
			let rhs = self.additive_expression(rhs);
			self.graph.edge(id, rhs);
		}
		id
	}

	fn multiplicative_expression(&mut self, node: &cst::MultiplicativeExpression) -> usize {
		let id = self.graph.node("multiplicative-expression");
		let first = self.unary_expression(&node.first);
		self.graph.edge(id, first);
		if let Some((op, rhs)) = &node.rest {
			let op = self.token(op);
			self.graph.edge(id, op);
			let rhs = self.multiplicative_expression(rhs);
			self.graph.edge(id, rhs);
		}
		id
	}

	fn unary_expression(&mut self, node: &cst::UnaryExpression) -> usize {
		let id = self.graph.node("unary-expression");
		if let Some(sign) = &node.sign {
			let sign = self.token(sign);
			self.graph.edge(id, sign);
		}
		let primary = self.primary_expression(&node.primary);
		self.graph.edge(id, primary);
		id
	}

	fn primary_expression(&mut self, node: &cst::PrimaryExpression) -> usize {
		let id = self.graph.node("primary-expression");
		match &node.kind {
			cst::PrimaryKind::Identifier(identifier) => {
				let child = self.identifier(identifier);
				self.graph.edge(id, child);
			}
			cst::PrimaryKind::Literal(literal) => {
				let child = self.literal(literal);
				self.graph.edge(id, child);
			}
			cst::PrimaryKind::Parenthesized { open, expression, close } => {
				let open = self.token(open);
				self.graph.edge(id, open);
				let expression = self.additive_expression(expression);
				self.graph.edge(id, expression);
				let close = self.token(close);
				self.graph.edge(id, close);
			}
		}
		id
	}

	fn identifier(&mut self, node: &cst::Identifier) -> usize {
		self.graph.node(self.source.text(node.range).to_string())
	}

	fn literal(&mut self, node: &cst::Literal) -> usize {
		self.graph.node(self.source.text(node.range).to_string())
	}

	fn token(&mut self, token: &Token) -> usize { self.graph.node(self.source.text(token.range).to_string()) }
}

struct AstPrinter<'a> {
	symbols: &'a SymbolTable,
	graph:   DotGraph,
}

impl AstPrinter<'_> {
	fn function(&mut self, node: &ast::Function) -> usize {
		let id = self.graph.node("Function");
		for statement in &node.statements {
			let child = self.statement(statement);
			self.graph.edge(id, child);
		}
		id
	}

	fn statement(&mut self, node: &ast::Statement) -> usize {
		match node {
			ast::Statement::Assignment { target, expr } => {
				let id = self.graph.node(":=");
				let target = self.identifier(*target);
				self.graph.edge(id, target);
				let expr = self.expression(expr);
				self.graph.edge(id, expr);
				id
			}
			ast::Statement::Return { expr } => {
				let id = self.graph.node("RETURN");
				let expr = self.expression(expr);
				self.graph.edge(id, expr);
				id
			}
		}
	}

	fn expression(&mut self, node: &ast::Expression) -> usize {
		match node {
			ast::Expression::ConstantLiteral(value) => self.graph.node(value.to_string()),
			ast::Expression::Identifier(identifier) => self.identifier(*identifier),
			ast::Expression::UnaryOp { op, expr } => {
				let label = match op {
					ast::UnaryOp::Plus => "+",
					ast::UnaryOp::Minus => "-",
				};
				let id = self.graph.node(label);
				let child = self.expression(expr);
				self.graph.edge(id, child);
				id
			}
			ast::Expression::BinaryOp { op, lhs, rhs } => {
				let label = match op {
					ast::BinaryOp::Add => "+",
					ast::BinaryOp::Sub => "-",
					ast::BinaryOp::Mul => "*",
					ast::BinaryOp::Div => "/",
				};
				let id = self.graph.node(label);
				let lhs = self.expression(lhs);
				self.graph.edge(id, lhs);
				let rhs = self.expression(rhs);
				self.graph.edge(id, rhs);
				id
			}
		}
	}

	fn identifier(&mut self, identifier: ast::Identifier) -> usize {
		let name = self.symbols.lookup_name(identifier.namespace, identifier.id).unwrap_or("?");
		let label = match identifier.namespace {
			// Constants carry their value in the label.
			ast::Namespace::Constant => {
				format!("{name}: {}", self.symbols.constant_value(identifier.id))
			}
			_ => name.to_string(),
		};
		self.graph.node(label)
	}
}
