//! Failure values shared by the compilation pipeline.
//!
//! Diagnostics are rendered to stdout once, at the point where a stage
//! detects the problem. The error values travelling up the call chain only
//! record which stage rejected the input, so nothing is ever printed twice.

/// A failed compilation. The diagnostic has already been printed.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileError {
	#[error("lexical analysis failed")]
	Lexical,
	#[error("syntax analysis failed")]
	Syntax,
	#[error("semantic analysis failed")]
	Semantic,
	#[error("received code string of length 0")]
	EmptySource,
}
