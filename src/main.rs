use std::{fs, process::ExitCode};

use anyhow::Context;
use palc::Parser;
use pljit::{
	analysis::{SemanticAnalyzer, SymbolTable},
	cli::{Cli, DumpMode},
	dot,
	error::CompileError,
	optim::{ConstantPropagation, DeadCodeElimination},
	parser,
	source::SourceManager,
};

fn main() -> ExitCode {
	let cli = Cli::parse();

	let Some(mode) = DumpMode::from_flag(&cli.mode) else {
		eprintln!("Could not recognize flag {}", cli.mode);
		return ExitCode::FAILURE;
	};

	let code = match fs::read_to_string(&cli.infile)
		.with_context(|| format!("Failed to open file {}", cli.infile.display()))
	{
		Ok(code) => code,
		Err(error) => {
			eprintln!("{error:#}");
			return ExitCode::FAILURE;
		}
	};

	// Compile diagnostics have already been printed when this fails.
	let Ok(rendered) = render(code, mode) else { return ExitCode::FAILURE };

	if let Err(error) =
		fs::write(&cli.outfile, rendered).with_context(|| format!("Failed to open file {}", cli.outfile.display()))
	{
		eprintln!("{error:#}");
		return ExitCode::FAILURE;
	}
	ExitCode::SUCCESS
}

/// Runs the pipeline far enough for the requested dump and renders it.
fn render(code: String, mode: DumpMode) -> Result<String, CompileError> {
	let manager = SourceManager::new(code);
	if manager.is_empty() {
		println!("error: received code string of length 0");
		return Err(CompileError::EmptySource);
	}

	let mut parser = parser::Parser::new(&manager);
	let tree = parser.parse_function_definition()?;
	if mode == DumpMode::ParseTree {
		return Ok(dot::render_cst(&tree, &manager));
	}

	let mut symbols = SymbolTable::new();
	let mut function = SemanticAnalyzer::new(&manager, &mut symbols).analyze_function(&tree)?;

	match mode {
		DumpMode::ParseTree | DumpMode::Ast => {}
		DumpMode::AstAfterDeadCodeElimination => DeadCodeElimination.run(&mut function),
		DumpMode::AstAfterConstantPropagation => ConstantPropagation::new(&symbols).run(&mut function),
		DumpMode::AstAfterBothPasses => {
			DeadCodeElimination.run(&mut function);
			ConstantPropagation::new(&symbols).run(&mut function);
		}
	}

	Ok(dot::render_ast(&function, &symbols))
}

#[cfg(test)]
mod tests {
	use super::*;

	const PROGRAM: &str = "VAR x; BEGIN x := 1 + 2; RETURN x; RETURN 999 END.";

	fn rendered(mode: DumpMode) -> String { render(PROGRAM.to_string(), mode).unwrap() }

	#[test]
	fn parse_tree_dump() {
		let dot = rendered(DumpMode::ParseTree);
		assert!(dot.contains("[label=\"function-definition\"]"));
		assert!(dot.contains("[label=\"statement-list\"]"));
		assert!(dot.contains("[label=\"999\"]"));
	}

	#[test]
	fn plain_ast_dump_keeps_everything() {
		let dot = rendered(DumpMode::Ast);
		assert_eq!(dot.matches("[label=\"RETURN\"]").count(), 2);
		assert!(dot.contains("[label=\"+\"]"));
	}

	#[test]
	fn dead_code_elimination_dump() {
		let dot = rendered(DumpMode::AstAfterDeadCodeElimination);
		assert_eq!(dot.matches("[label=\"RETURN\"]").count(), 1);
		// The addition is untouched without constant propagation.
		assert!(dot.contains("[label=\"+\"]"));
	}

	#[test]
	fn constant_propagation_dump() {
		let dot = rendered(DumpMode::AstAfterConstantPropagation);
		assert!(dot.contains("[label=\"3\"]"));
		assert!(!dot.contains("[label=\"+\"]"));
	}

	#[test]
	fn both_passes_dump() {
		let dot = rendered(DumpMode::AstAfterBothPasses);
		assert_eq!(dot.matches("[label=\"RETURN\"]").count(), 1);
		assert!(!dot.contains("[label=\"999\"]"));
		assert!(dot.contains("[label=\"3\"]"));
	}

	#[test]
	fn compile_errors_and_empty_input_fail() {
		assert!(render("BEGIN RETURN x END.".to_string(), DumpMode::Ast).is_err());
		assert!(render(String::new(), DumpMode::ParseTree).is_err());
	}
}
