use std::path::PathBuf;

use palc::Parser;

/// CLI arguments of the tree inspection tool
#[derive(Parser)]
#[command(
	name = "pljit",
	after_long_help = "Writes the requested tree of a PL/0 program in the DOT format; \
	                   visualize the output with e.g. `xdot <outfile>`."
)]
pub struct Cli {
	/// Which tree to dump: -P for the parse tree, -A for the plain AST,
	/// -Ad after dead-code elimination, -Ac after constant propagation,
	/// -Acd after both passes
	#[arg(trailing_var_arg = true)]
	pub mode:    String,
	/// Input program
	pub infile:  PathBuf,
	/// Output DOT file
	pub outfile: PathBuf,
}

/// The tree (and optimization level) selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpMode {
	ParseTree,
	Ast,
	AstAfterDeadCodeElimination,
	AstAfterConstantPropagation,
	AstAfterBothPasses,
}

impl DumpMode {
	/// Maps a mode flag to its dump mode.
	pub fn from_flag(flag: &str) -> Option<Self> {
		match flag {
			"-P" => Some(DumpMode::ParseTree),
			"-A" => Some(DumpMode::Ast),
			"-Ad" => Some(DumpMode::AstAfterDeadCodeElimination),
			"-Ac" => Some(DumpMode::AstAfterConstantPropagation),
			"-Acd" => Some(DumpMode::AstAfterBothPasses),
			_ => None,
		}
	}
}
