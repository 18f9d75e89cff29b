use crate::ast::{Function, Statement};

/// Removes every statement after the first return statement.
///
/// Nothing behind it can execute in a straight-line program. Semantic
/// analysis has already guaranteed that at least one return exists.
pub struct DeadCodeElimination;

impl DeadCodeElimination {
	pub fn run(&self, function: &mut Function) {
		let first_return = function
			.statements
			.iter()
			.position(|statement| matches!(statement, Statement::Return { .. }));

		debug_assert!(first_return.is_some());
		if let Some(index) = first_return {
			function.statements.truncate(index + 1);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::optim::tests::analyze;

	fn eliminate(input: &str) -> Function {
		let (mut function, _) = analyze(input);
		DeadCodeElimination.run(&mut function);
		function
	}

	#[test]
	fn truncates_after_the_first_return() {
		let function = eliminate("VAR x; BEGIN x := 1; RETURN x; x := 2; RETURN 999 END.");
		assert_eq!(function.statements.len(), 2);
		assert!(matches!(function.statements.last(), Some(Statement::Return { .. })));
	}

	#[test]
	fn keeps_a_minimal_function_untouched() {
		let function = eliminate("BEGIN RETURN 1 END.");
		assert_eq!(function.statements.len(), 1);
	}

	#[test]
	fn the_last_statement_is_the_only_return() {
		let function = eliminate("VAR x; BEGIN x := 1; RETURN x; RETURN 2; RETURN 3 END.");
		let returns = function
			.statements
			.iter()
			.filter(|statement| matches!(statement, Statement::Return { .. }))
			.count();
		assert_eq!(returns, 1);
		assert!(matches!(function.statements.last(), Some(Statement::Return { .. })));
	}
}
