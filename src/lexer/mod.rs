//! Lexical analysis of PL/0 source code.
//!
//! The lexer is a stateful stream with one token of lookahead. Its cursor
//! always rests on a non-whitespace character (or the end of the input):
//! whitespace is consumed eagerly after every token, so the next token
//! boundary is predictable for `peek`.
//!
//! Error tokens are sticky. Once scanning fails, the failing token stays in
//! the lookahead cache and both [`Lexer::peek`] and [`Lexer::next`] keep
//! returning it, so a caller can never silently advance past broken input
//! and produce cascaded diagnostics.

mod token;

pub use token::{Token, TokenKind};

use crate::source::{SourceManager, SourceRange};

fn is_whitespace(c: u8) -> bool { matches!(c, b' ' | b'\n' | b'\t') }

fn is_digit(c: u8) -> bool { c.is_ascii_digit() }

fn is_alpha(c: u8) -> bool { c.is_ascii_alphabetic() }

/// The legal alphabet of the language. The byte range `(`..=`;` covers the
/// separators, the operators, and the digits.
fn is_legal(c: u8) -> bool {
	(b'('..=b';').contains(&c) || c == b'=' || is_alpha(c) || is_whitespace(c)
}

/// A stream lexer with one-token lookahead over a source buffer.
pub struct Lexer<'a> {
	source: &'a SourceManager,
	/// Byte offset of the next unconsumed character
	cursor: usize,
	/// Cache for the peek functionality. An error token is never cleared.
	cache:  Option<Token>,
}

impl<'a> Lexer<'a> {
	pub fn new(source: &'a SourceManager) -> Self {
		let mut lexer = Self { source, cursor: 0, cache: None };
		lexer.skip_whitespace();
		lexer
	}

	/// True while a cached token or unconsumed non-whitespace input remains.
	/// Note: also true if the next token will be an error token.
	pub fn has_next(&self) -> bool { self.cache.is_some() || self.cursor < self.source.len() }

	/// Returns the next token without consuming it, scanning and caching it
	/// on the first call. Returns `None` once the input is exhausted.
	pub fn peek(&mut self) -> Option<Token> {
		if self.cache.is_none() {
			self.cache = self.scan();
		}
		self.cache
	}

	/// Returns the next token. A cached error token is returned again
	/// instead of advancing past the broken input.
	pub fn next(&mut self) -> Option<Token> {
		if let Some(token) = self.cache {
			if !token.is_error() {
				self.cache = None;
			}
			return Some(token);
		}
		self.scan()
	}

	/// Scans a single token starting at the cursor.
	fn scan(&mut self) -> Option<Token> {
		let bytes = self.source.bytes();
		if self.cursor >= bytes.len() {
			return None;
		}

		let start = self.cursor;
		let first = bytes[start];
		debug_assert!(!is_whitespace(first));

		if !is_legal(first) {
			return Some(self.fail(SourceRange::new(start, 1), "error: illegal character"));
		}

		self.cursor += 1;

		if let Some(kind) = TokenKind::from_single_char(first) {
			self.skip_whitespace();
			return Some(Token::new(kind, SourceRange::new(start, 1)));
		}

		// Multi-character token: a literal, a keyword, an identifier, or `:=`.
		let is_literal = is_digit(first);
		let mut last = start;
		while self.cursor < bytes.len() {
			let current = bytes[self.cursor];

			if !is_legal(current) {
				return Some(self.fail(SourceRange::new(self.cursor, 1), "error: illegal character"));
			}

			// A `:` is only valid as the start of the assignment operator.
			if bytes[last] == b':' {
				if current != b'=' {
					let range = SourceRange::new(start, self.cursor - start + 1);
					return Some(self.fail(range, "error: unknown multi-character token"));
				}
				let range = SourceRange::new(start, self.cursor - start + 1);
				self.cursor += 1;
				self.skip_whitespace();
				return Some(Token::new(TokenKind::Assign, range));
			}

			// Identifiers absorb only letters, literals only digits; the
			// first non-matching character ends the token.
			if (is_literal && !is_digit(current)) || (!is_literal && !is_alpha(current)) {
				break;
			}

			last = self.cursor;
			self.cursor += 1;
		}

		let range = SourceRange::new(start, last - start + 1);
		let kind = if is_literal {
			TokenKind::Literal
		} else {
			TokenKind::keyword_or_identifier(self.source.text(range))
		};
		self.skip_whitespace();
		Some(Token::new(kind, range))
	}

	/// Prints the diagnostic and caches the sticky error token.
	fn fail(&mut self, range: SourceRange, message: &str) -> Token {
		self.source.report(range, message);
		let token = Token::new(TokenKind::LexerError, range);
		self.cache = Some(token);
		token
	}

	fn skip_whitespace(&mut self) {
		let bytes = self.source.bytes();
		while self.cursor < bytes.len() && is_whitespace(bytes[self.cursor]) {
			self.cursor += 1;
		}
	}
}

#[cfg(test)]
mod tests {
	use TokenKind::*;

	use super::*;

	/// Lexes the whole input and checks kind and text of every token.
	fn lex(input: &str, expected: &[(TokenKind, &str)]) {
		let manager = SourceManager::new(input.to_string());
		let mut lexer = Lexer::new(&manager);
		for &(kind, text) in expected {
			let token = lexer.next().expect("token stream ended early");
			assert_eq!(token.kind, kind);
			assert_eq!(manager.text(token.range), text);
		}
		assert!(!lexer.has_next());
		assert_eq!(lexer.next(), None);
	}

	#[test]
	fn every_token_category() {
		lex(
			"PARAM VAR CONST BEGIN END RETURN\n\t, ; := = ( ) .\n\t+ - * /\n1234abc\n12 34 ABCDEFG\t\t    \n",
			&[
				(Param, "PARAM"),
				(Var, "VAR"),
				(Const, "CONST"),
				(Begin, "BEGIN"),
				(End, "END"),
				(Return, "RETURN"),
				(Comma, ","),
				(Semicolon, ";"),
				(Assign, ":="),
				(Init, "="),
				(LeftParen, "("),
				(RightParen, ")"),
				(Terminator, "."),
				(Plus, "+"),
				(Minus, "-"),
				(Star, "*"),
				(Slash, "/"),
				(Literal, "1234"),
				(Identifier, "abc"),
				(Literal, "12"),
				(Literal, "34"),
				(Identifier, "ABCDEFG"),
			],
		);
	}

	#[test]
	fn identifier_stops_at_digit() {
		// An identifier never absorbs digits; `abc1234` is two tokens.
		lex("abc1234", &[(Identifier, "abc"), (Literal, "1234")]);
	}

	#[test]
	fn assignment_operator() {
		lex("a:=1", &[(Identifier, "a"), (Assign, ":="), (Literal, "1")]);
	}

	#[test]
	fn peek_is_idempotent() {
		let manager = SourceManager::new("BEGIN RETURN 1 END.".to_string());
		let mut lexer = Lexer::new(&manager);

		let peeked = lexer.peek();
		assert_eq!(peeked, lexer.peek());
		assert_eq!(peeked, lexer.next());

		// After a non-error next the cache is empty and peek scans anew.
		let second = lexer.peek().unwrap();
		assert_eq!(second.kind, Return);
	}

	#[test]
	fn token_ranges_cover_the_source() {
		let input = "PARAM a;\nBEGIN\nRETURN a\nEND.";
		let manager = SourceManager::new(input.to_string());
		let mut lexer = Lexer::new(&manager);

		let mut covered = vec![false; input.len()];
		while let Some(token) = lexer.next() {
			for offset in token.range.start..token.range.start + token.range.len {
				covered[offset] = true;
			}
		}
		for (offset, byte) in input.bytes().enumerate() {
			assert_eq!(covered[offset], !matches!(byte, b' ' | b'\n' | b'\t'), "offset {offset}");
		}
	}

	#[test]
	fn illegal_character_is_sticky() {
		let manager = SourceManager::new("BEGIN @ END.".to_string());
		let mut lexer = Lexer::new(&manager);

		assert_eq!(lexer.next().unwrap().kind, Begin);
		assert!(lexer.peek().unwrap().is_error());
		// Both peek and next keep reporting the error token.
		assert!(lexer.peek().unwrap().is_error());
		assert!(lexer.next().unwrap().is_error());
		assert!(lexer.next().unwrap().is_error());
		assert!(lexer.has_next());
	}

	#[test]
	fn unknown_multi_character_token() {
		let manager = SourceManager::new("a :- 1".to_string());
		let mut lexer = Lexer::new(&manager);

		assert_eq!(lexer.next().unwrap().kind, Identifier);
		let error = lexer.next().unwrap();
		assert!(error.is_error());
		assert_eq!(manager.text(error.range), ":-");
	}

	#[test]
	fn lone_colon_at_end_of_input() {
		// With nothing after it, a `:` falls through keyword classification
		// and surfaces as an identifier; the grammar rejects it later.
		lex("a :", &[(Identifier, "a"), (Identifier, ":")]);
	}

	#[test]
	fn empty_and_whitespace_only_input() {
		lex("", &[]);
		lex(" \t\n ", &[]);
		let manager = SourceManager::new("  ".to_string());
		let mut lexer = Lexer::new(&manager);
		assert!(!lexer.has_next());
		assert_eq!(lexer.peek(), None);
	}
}
