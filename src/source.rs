//! Ownership of source text and rendering of diagnostics.
//!
//! Every registered function keeps its source alive in a [`SourceManager`]
//! for as long as the function exists, so positions can be stored as plain
//! byte offsets instead of line/column pairs. Resolution into line and
//! column happens lazily, by scanning the owned buffer; diagnostics are
//! rare, so the linear cost does not matter.

use std::fmt::Write;

/// A single position in the source text, addressed by byte offset.
///
/// Used for "expected X afterwards" diagnostics, which point at the last
/// consumed character rather than at a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation(pub usize);

/// A contiguous run of at least one character in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange {
	pub start: usize,
	pub len:   usize,
}

impl SourceRange {
	pub fn new(start: usize, len: usize) -> Self {
		debug_assert!(len >= 1);
		Self { start, len }
	}

	/// A range covering exactly the character at `location`.
	pub fn at(location: SourceLocation) -> Self { Self { start: location.0, len: 1 } }

	/// Position of the first character of the range.
	pub fn first(&self) -> SourceLocation { SourceLocation(self.start) }

	/// Position of the last character of the range.
	pub fn last(&self) -> SourceLocation { SourceLocation(self.start + self.len - 1) }

	/// Widens the range so that it ends at `location`.
	pub fn extend_until(&self, location: SourceLocation) -> Self {
		Self::new(self.start, location.0 - self.start + 1)
	}
}

/// Resolved position metadata for one location, computed on demand.
struct ResolvedLocation {
	/// 1-based line number
	line:       usize,
	/// 1-based column within the line
	column:     usize,
	line_start: usize,
	line_len:   usize,
}

/// Owns the immutable source text of one registered function.
#[derive(Debug)]
pub struct SourceManager {
	source: String,
}

impl SourceManager {
	pub fn new(source: String) -> Self { Self { source } }

	pub fn is_empty(&self) -> bool { self.source.is_empty() }

	pub fn len(&self) -> usize { self.source.len() }

	/// The raw bytes of the source. The language alphabet is ASCII, so the
	/// lexer works on bytes; anything non-ASCII is an illegal character.
	pub fn bytes(&self) -> &[u8] { self.source.as_bytes() }

	/// The text a range refers to.
	pub fn text(&self, range: SourceRange) -> &str { &self.source[range.start..range.start + range.len] }

	/// Prints a diagnostic for a range to stdout.
	pub fn report(&self, range: SourceRange, message: &str) { print!("{}", self.context(range, message)); }

	/// Prints a diagnostic for a single location to stdout.
	pub fn report_location(&self, location: SourceLocation, message: &str) {
		self.report(SourceRange::at(location), message);
	}

	/// Renders the diagnostic context for a range: `line:col: message`,
	/// the affected source line, and a caret-and-tilde underline exactly
	/// as wide as the range.
	pub fn context(&self, range: SourceRange, message: &str) -> String {
		let resolved = self.resolve(range.first());
		let line = &self.source[resolved.line_start..resolved.line_start + resolved.line_len];

		let mut rendered = String::new();
		let _ = writeln!(rendered, "{}:{}: {}", resolved.line, resolved.column, message);
		let _ = writeln!(rendered, "{line}");
		let _ = writeln!(rendered, "{:>width$}{}", '^', "~".repeat(range.len - 1), width = resolved.column);
		rendered
	}

	/// Scans the buffer to find the line a location lies on.
	fn resolve(&self, location: SourceLocation) -> ResolvedLocation {
		let stop = location.0;
		debug_assert!(stop < self.source.len());

		let mut line = 1;
		let mut line_start = 0;
		for (index, byte) in self.source.bytes().take(stop).enumerate() {
			if byte == b'\n' {
				line += 1;
				line_start = index + 1;
			}
		}

		let mut line_len = stop - line_start + 1;
		for byte in self.source.bytes().skip(stop + 1) {
			if byte == b'\n' {
				break;
			}
			line_len += 1;
		}

		ResolvedLocation { line, column: stop - line_start + 1, line_start, line_len }
	}
}
