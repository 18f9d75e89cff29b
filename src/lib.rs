//! # A just-in-time compiler for PL/0 functions
//!
//! A host program registers the source text of a function and receives an
//! opaque, cheaply clonable handle. Nothing is compiled yet. The first
//! invocation of the handle runs the whole pipeline and caches the result
//! inside the function's frame; later invocations, from any thread, reuse
//! it. "JIT" here means lazy first-use compilation into a tree-shaped
//! intermediate representation, not machine-code emission.
//!
//! ## Pipeline
//!
//! ``` markdown
//! source text
//!   └── Lexer            token stream with one-token lookahead
//!       └── Parser       concrete syntax tree, every node with its range
//!           └── SemanticAnalyzer
//!               │        symbol resolution + validity rules, lowers to AST
//!               └── Optimizer
//!                   │    dead-code elimination, constant propagation
//!                   └── Evaluator
//!                        tree-walking execution per invocation
//! ```
//!
//! The concrete syntax tree keeps every token, separators included, so the
//! exact source structure survives for inspection; the AST keeps only what
//! execution needs. Both stay immutable once the frame is compiled, which
//! is what makes lock-free concurrent invocations safe after the initial
//! compile handshake.
//!
//! ## Example
//!
//! ```
//! use pljit::{Jit, ResultCode};
//!
//! let mut jit = Jit::new();
//! let add = jit.register("PARAM a, b; BEGIN RETURN a + b END.");
//!
//! let result = add.invoke(&[1, 2]);
//! assert_eq!(result.code, ResultCode::Success);
//! assert_eq!(result.value, 3);
//! ```
//!
//! Diagnostics for rejected programs and runtime errors are printed to
//! stdout in a `line:column: severity: message` format with the offending
//! source line and a caret underline; the [`CallResult`] only discriminates
//! the failure category.

pub mod analysis;
pub mod ast;
pub mod cli;
pub mod dot;
pub mod error;
pub mod exec;
pub mod jit;
pub mod lexer;
pub mod optim;
pub mod parser;
pub mod source;

pub use error::CompileError;
pub use jit::{cant_fail, CallResult, FunctionHandle, Jit, ResultCode};
