//! Recursive-descent parsing of the PL/0 grammar.
//!
//! ``` EBNF
//! function-definition = [parameter-declarations] [variable-declarations]
//!                       [constant-declarations] compound-statement "."
//! parameter-declarations = "PARAM" declarator-list ";"
//! variable-declarations  = "VAR"   declarator-list ";"
//! constant-declarations  = "CONST" init-declarator-list ";"
//! declarator-list        = identifier {"," identifier}
//! init-declarator-list   = init-declarator {"," init-declarator}
//! init-declarator        = identifier "=" literal
//! compound-statement     = "BEGIN" statement-list "END"
//! statement-list         = statement {";" statement}
//! statement              = assignment-expression | "RETURN" additive-expression
//! assignment-expression  = identifier ":=" additive-expression
//! additive-expression       = multiplicative-expression [("+"|"-") additive-expression]
//! multiplicative-expression = unary-expression          [("*"|"/") multiplicative-expression]
//! unary-expression          = ["+"|"-"] primary-expression
//! primary-expression        = identifier | literal | "(" additive-expression ")"
//! ```
//!
//! Note that the additive and multiplicative productions recurse on the
//! right, which makes `+ - * /` right-associative. That is the language's
//! defined evaluation order for subtraction and division chains, not an
//! accident to be normalized away.
//!
//! Diagnostics distinguish two shapes. When the stream ends where a token
//! was required, the message reads `expected X afterwards` and points at
//! the last consumed character. When a wrong token is present, the message
//! reads `expected X` and points at that token.

pub mod cst;

use crate::{
	error::CompileError,
	lexer::{Lexer, Token, TokenKind},
	parser::cst::*,
	source::{SourceLocation, SourceManager},
};

/// Recursive-descent parser producing a concrete syntax tree.
pub struct Parser<'a> {
	source:        &'a SourceManager,
	lexer:         Lexer<'a>,
	/// Position of the last consumed character; end-of-stream diagnostics
	/// are pinned here.
	last_consumed: SourceLocation,
}

impl<'a> Parser<'a> {
	pub fn new(source: &'a SourceManager) -> Self {
		let mut lexer = Lexer::new(source);
		let last_consumed = lexer.peek().map(|token| token.range.first()).unwrap_or_default();
		Self { source, lexer, last_consumed }
	}

	/// Parses a complete function definition, including the check that no
	/// tokens follow the program terminator.
	pub fn parse_function_definition(&mut self) -> Result<FunctionDefinition, CompileError> {
		let parameters = if self.peek_kind() == Some(TokenKind::Param) {
			let declarations = self.parse_parameter_declarations()?;
			if !self.lexer.has_next() {
				self.source.report_location(
					declarations.range.last(),
					"error: expected afterwards either 'VAR', 'CONST', or 'BEGIN'",
				);
				return Err(CompileError::Syntax);
			}
			Some(declarations)
		} else {
			None
		};

		let variables = if self.peek_kind() == Some(TokenKind::Var) {
			let declarations = self.parse_variable_declarations()?;
			if !self.lexer.has_next() {
				self.source.report_location(
					declarations.range.last(),
					"error: expected afterwards either 'CONST' or 'BEGIN'",
				);
				return Err(CompileError::Syntax);
			}
			Some(declarations)
		} else {
			None
		};

		let constants = if self.peek_kind() == Some(TokenKind::Const) {
			let declarations = self.parse_constant_declarations()?;
			if !self.lexer.has_next() {
				self.source
					.report_location(declarations.range.last(), "error: expected afterwards 'BEGIN'");
				return Err(CompileError::Syntax);
			}
			Some(declarations)
		} else {
			None
		};

		let body = self.parse_compound_statement()?;
		let terminator = self.expect(TokenKind::Terminator)?;

		if let Some(extra) = self.lexer.peek() {
			self.source.report(extra.range, "error: expected no tokens after the program terminator");
			return Err(CompileError::Syntax);
		}

		let start = parameters
			.as_ref()
			.map(|declarations| declarations.range)
			.or(variables.as_ref().map(|declarations| declarations.range))
			.or(constants.as_ref().map(|declarations| declarations.range))
			.unwrap_or(body.range);
		let range = start.extend_until(terminator.range.last());

		Ok(FunctionDefinition { parameters, variables, constants, body, terminator, range })
	}

	fn parse_parameter_declarations(&mut self) -> Result<ParameterDeclarations, CompileError> {
		let keyword = self.expect(TokenKind::Param)?;
		let declarators = self.parse_declarator_list()?;
		let semicolon = self.expect(TokenKind::Semicolon)?;
		let range = keyword.range.extend_until(semicolon.range.last());
		Ok(ParameterDeclarations { keyword, declarators, semicolon, range })
	}

	fn parse_variable_declarations(&mut self) -> Result<VariableDeclarations, CompileError> {
		let keyword = self.expect(TokenKind::Var)?;
		let declarators = self.parse_declarator_list()?;
		let semicolon = self.expect(TokenKind::Semicolon)?;
		let range = keyword.range.extend_until(semicolon.range.last());
		Ok(VariableDeclarations { keyword, declarators, semicolon, range })
	}

	fn parse_constant_declarations(&mut self) -> Result<ConstantDeclarations, CompileError> {
		let keyword = self.expect(TokenKind::Const)?;
		let declarators = self.parse_init_declarator_list()?;
		let semicolon = self.expect(TokenKind::Semicolon)?;
		let range = keyword.range.extend_until(semicolon.range.last());
		Ok(ConstantDeclarations { keyword, declarators, semicolon, range })
	}

	fn parse_declarator_list(&mut self) -> Result<DeclaratorList, CompileError> {
		let mut entries = Vec::new();

		let first = self.parse_identifier()?;
		let start = first.range;
		let mut end = first.range;
		entries.push(ListEntry::Node(first));

		while self.peek_kind() == Some(TokenKind::Comma) {
			entries.push(ListEntry::Separator(self.expect(TokenKind::Comma)?));
			let identifier = self.parse_identifier()?;
			end = identifier.range;
			entries.push(ListEntry::Node(identifier));
		}

		Ok(DeclaratorList { entries, range: start.extend_until(end.last()) })
	}

	fn parse_init_declarator_list(&mut self) -> Result<InitDeclaratorList, CompileError> {
		let mut entries = Vec::new();

		let first = self.parse_init_declarator()?;
		let start = first.range;
		let mut end = first.range;
		entries.push(ListEntry::Node(first));

		while self.peek_kind() == Some(TokenKind::Comma) {
			entries.push(ListEntry::Separator(self.expect(TokenKind::Comma)?));
			let declarator = self.parse_init_declarator()?;
			end = declarator.range;
			entries.push(ListEntry::Node(declarator));
		}

		Ok(InitDeclaratorList { entries, range: start.extend_until(end.last()) })
	}

	fn parse_init_declarator(&mut self) -> Result<InitDeclarator, CompileError> {
		let name = self.parse_identifier()?;
		let init = self.expect(TokenKind::Init)?;
		let value = self.parse_literal()?;
		let range = name.range.extend_until(value.range.last());
		Ok(InitDeclarator { name, init, value, range })
	}

	fn parse_compound_statement(&mut self) -> Result<CompoundStatement, CompileError> {
		let begin = self.expect(TokenKind::Begin)?;
		let statements = self.parse_statement_list()?;
		let end = match self.expect(TokenKind::End) {
			Ok(end) => end,
			Err(error) => {
				self.source.report(begin.range, "note: to match this 'BEGIN'");
				return Err(error);
			}
		};
		let range = begin.range.extend_until(end.range.last());
		Ok(CompoundStatement { begin, statements, end, range })
	}

	fn parse_statement_list(&mut self) -> Result<StatementList, CompileError> {
		let mut entries = Vec::new();

		let first = self.parse_statement()?;
		let start = first.range;
		let mut end = first.range;
		entries.push(ListEntry::Node(first));

		while self.peek_kind() == Some(TokenKind::Semicolon) {
			entries.push(ListEntry::Separator(self.expect(TokenKind::Semicolon)?));
			let statement = self.parse_statement()?;
			end = statement.range;
			entries.push(ListEntry::Node(statement));
		}

		Ok(StatementList { entries, range: start.extend_until(end.last()) })
	}

	fn parse_statement(&mut self) -> Result<Statement, CompileError> {
		let Some(token) = self.lexer.peek() else {
			self.source.report_location(self.last_consumed, "error: expected statement afterwards");
			return Err(CompileError::Syntax);
		};

		if token.kind == TokenKind::Return {
			let keyword = self.expect(TokenKind::Return)?;
			let expression = self.parse_additive_expression()?;
			let range = keyword.range.extend_until(expression.range.last());
			return Ok(Statement { kind: StatementKind::Return { keyword, expression }, range });
		}

		if token.kind != TokenKind::Identifier {
			self.source.report(token.range, "error: expected statement");
			return Err(CompileError::Syntax);
		}

		let assignment = self.parse_assignment_expression()?;
		let range = assignment.range;
		Ok(Statement { kind: StatementKind::Assignment(assignment), range })
	}

	fn parse_assignment_expression(&mut self) -> Result<AssignmentExpression, CompileError> {
		let target = self.parse_identifier()?;
		let assign = self.expect(TokenKind::Assign)?;
		let expression = self.parse_additive_expression()?;
		let range = target.range.extend_until(expression.range.last());
		Ok(AssignmentExpression { target, assign, expression, range })
	}

	fn parse_additive_expression(&mut self) -> Result<AdditiveExpression, CompileError> {
		let first = self.parse_multiplicative_expression()?;

		let rest = match self.peek_kind() {
			Some(kind @ (TokenKind::Plus | TokenKind::Minus)) => {
				let op = self.expect(kind)?;
				let rhs = Box::new(self.parse_additive_expression()?);
				Some((op, rhs))
			}
			_ => None,
		};

		let range = match &rest {
			Some((_, rhs)) => first.range.extend_until(rhs.range.last()),
			None => first.range,
		};
		Ok(AdditiveExpression { first, rest, range })
	}

	fn parse_multiplicative_expression(&mut self) -> Result<MultiplicativeExpression, CompileError> {
		let first = self.parse_unary_expression()?;

		let rest = match self.peek_kind() {
			Some(kind @ (TokenKind::Star | TokenKind::Slash)) => {
				let op = self.expect(kind)?;
				let rhs = Box::new(self.parse_multiplicative_expression()?);
				Some((op, rhs))
			}
			_ => None,
		};

		let range = match &rest {
			Some((_, rhs)) => first.range.extend_until(rhs.range.last()),
			None => first.range,
		};
		Ok(MultiplicativeExpression { first, rest, range })
	}

	fn parse_unary_expression(&mut self) -> Result<UnaryExpression, CompileError> {
		let Some(token) = self.lexer.peek() else {
			self.source.report_location(
				self.last_consumed,
				"error: expected unary-expression or primary-expression afterwards",
			);
			return Err(CompileError::Syntax);
		};

		let sign = match token.kind {
			TokenKind::Plus | TokenKind::Minus => Some(self.expect(token.kind)?),
			_ => None,
		};

		let primary = self.parse_primary_expression()?;
		let range = match &sign {
			Some(sign) => sign.range.extend_until(primary.range.last()),
			None => primary.range,
		};
		Ok(UnaryExpression { sign, primary, range })
	}

	fn parse_primary_expression(&mut self) -> Result<PrimaryExpression, CompileError> {
		let Some(token) = self.lexer.peek() else {
			self.source.report_location(self.last_consumed, "error: expected primary-expression afterwards");
			return Err(CompileError::Syntax);
		};

		match token.kind {
			TokenKind::Identifier => {
				let identifier = self.parse_identifier()?;
				let range = identifier.range;
				Ok(PrimaryExpression { kind: PrimaryKind::Identifier(identifier), range })
			}
			TokenKind::Literal => {
				let literal = self.parse_literal()?;
				let range = literal.range;
				Ok(PrimaryExpression { kind: PrimaryKind::Literal(literal), range })
			}
			TokenKind::LeftParen => {
				let open = self.expect(TokenKind::LeftParen)?;
				let expression = Box::new(self.parse_additive_expression()?);
				let close = match self.expect(TokenKind::RightParen) {
					Ok(close) => close,
					Err(error) => {
						self.source.report(open.range, "note: to match this '('");
						return Err(error);
					}
				};
				let range = open.range.extend_until(close.range.last());
				Ok(PrimaryExpression { kind: PrimaryKind::Parenthesized { open, expression, close }, range })
			}
			_ => {
				self.source.report(token.range, "error: expected primary-expression");
				Err(CompileError::Syntax)
			}
		}
	}

	fn parse_identifier(&mut self) -> Result<Identifier, CompileError> {
		let token = self.expect(TokenKind::Identifier)?;
		Ok(Identifier { range: token.range })
	}

	fn parse_literal(&mut self) -> Result<Literal, CompileError> {
		let token = self.expect(TokenKind::Literal)?;
		let value = parse_literal_value(self.source.text(token.range));
		Ok(Literal { value, range: token.range })
	}

	/// Consumes the next token, which must be of the expected kind. The
	/// end-of-stream and wrong-token cases produce the two diagnostic
	/// shapes described in the module documentation; a lexer error token
	/// propagates silently because its diagnostic is already printed.
	fn expect(&mut self, expected: TokenKind) -> Result<Token, CompileError> {
		let Some(token) = self.lexer.next() else {
			let message = format!("error: expected {} afterwards", expected.expectation());
			self.source.report_location(self.last_consumed, &message);
			return Err(CompileError::Syntax);
		};

		if token.is_error() {
			return Err(CompileError::Lexical);
		}

		if token.kind != expected {
			let message = format!("error: expected {}", expected.expectation());
			self.source.report(token.range, &message);
			return Err(CompileError::Syntax);
		}

		self.last_consumed = token.range.last();
		Ok(token)
	}

	fn peek_kind(&mut self) -> Option<TokenKind> { self.lexer.peek().map(|token| token.kind) }
}

/// Accumulates a decimal digit sequence left to right, wrapping past the
/// 64-bit value range.
fn parse_literal_value(digits: &str) -> i64 {
	let mut value: u64 = 0;
	for digit in digits.bytes() {
		value = value.wrapping_mul(10).wrapping_add(u64::from(digit - b'0'));
	}
	value as i64
}
