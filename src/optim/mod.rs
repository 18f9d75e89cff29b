//! AST-to-AST optimization passes.
//!
//! Dead-code elimination must run before constant propagation: an
//! assignment behind the first return never executes, and letting it seed
//! the constant table would propagate values that do not exist at runtime.

mod const_prop;
mod dead_code;

pub use const_prop::ConstantPropagation;
pub use dead_code::DeadCodeElimination;

use crate::{analysis::SymbolTable, ast::Function};

/// Runs the full pass pipeline in the required order.
pub fn optimize(function: &mut Function, symbols: &SymbolTable) {
	DeadCodeElimination.run(function);
	ConstantPropagation::new(symbols).run(function);
}
