//! End-to-end tests of the JIT façade.

use std::thread;

use pljit::{cant_fail, CallResult, Jit, ResultCode};

fn invoke_once(code: &str, arguments: &[i64]) -> CallResult {
	let mut jit = Jit::new();
	let handle = jit.register(code);
	handle.invoke(arguments)
}

#[test]
fn minimal_program() {
	let result = invoke_once("BEGIN RETURN 1 END.", &[]);
	assert_eq!(result, CallResult { value: 1, code: ResultCode::Success });
}

#[test]
fn addition_of_parameters() {
	let result = invoke_once("PARAM a,b; BEGIN RETURN a+b END.", &[1, 2]);
	assert_eq!(result, CallResult { value: 3, code: ResultCode::Success });
}

#[test]
fn dead_code_elimination_and_constant_folding() {
	// Arithmetic is right-associative: 1+3-2+42 = 1+(3-(2+42)) = -40,
	// so x+12 returns -28; the second return is dead.
	let result = invoke_once("VAR x; BEGIN x:=1+3-2+42; RETURN x+12; RETURN 999 END.", &[]);
	assert_eq!(result, CallResult { value: -28, code: ResultCode::Success });
}

#[test]
fn constant_materialization_and_partial_folding() {
	let code = "PARAM a; VAR x; CONST A=10,B=5; BEGIN x:=B*a+A-2+B; RETURN x+A+B END.";
	let result = invoke_once(code, &[3]);
	assert_eq!(result, CallResult { value: 33, code: ResultCode::Success });
}

#[test]
fn division_by_zero_at_runtime() {
	let result = invoke_once("PARAM a,b; BEGIN RETURN a/b END.", &[1, 0]);
	assert_eq!(result, CallResult { value: -1, code: ResultCode::RuntimeError });
}

#[test]
fn undeclared_identifier_is_a_compile_error() {
	let result = invoke_once("BEGIN a:=12; RETURN a END.", &[]);
	assert_eq!(result, CallResult { value: -1, code: ResultCode::CompileError });
}

#[test]
fn parameter_count_mismatch() {
	let result = invoke_once("PARAM a,b,c; BEGIN RETURN a+b-c END.", &[1, 2]);
	assert_eq!(result, CallResult { value: -1, code: ResultCode::InvalidFunctionCall });
}

#[test]
fn empty_source() {
	let result = invoke_once("", &[]);
	assert_eq!(result, CallResult { value: -1, code: ResultCode::CompileError });
}

#[test]
fn cant_fail_unwraps() {
	let mut jit = Jit::new();
	let handle = jit.register("BEGIN\nRETURN 1\nEND.");
	assert_eq!(cant_fail(handle.invoke(&[])), 1);
}

#[test]
fn compile_errors_are_terminal() {
	let mut jit = Jit::new();
	let handle = jit.register("BEGIN RETURN @ END.");
	assert_eq!(handle.invoke(&[]).code, ResultCode::CompileError);
	assert_eq!(handle.invoke(&[]).code, ResultCode::CompileError);
}

#[test]
fn several_functions_in_one_registry() {
	let mut jit = Jit::new();
	let one = jit.register("BEGIN RETURN 1 END.");
	let double = jit.register("PARAM a; BEGIN RETURN a * 2 END.");
	let broken = jit.register("BEGIN END.");

	assert_eq!(one.invoke(&[]).value, 1);
	assert_eq!(double.invoke(&[21]).value, 42);
	assert_eq!(broken.invoke(&[]).code, ResultCode::CompileError);
	// Earlier handles are unaffected by later registrations and failures.
	assert_eq!(one.invoke(&[]).value, 1);
}

#[test]
fn many_threads_invoke_the_same_handle() {
	let code = "PARAM a, b;\nVAR c;\nBEGIN\n  c := a + b;\nRETURN c * 2\nEND.";
	let mut jit = Jit::new();
	let handle = jit.register(code);

	thread::scope(|scope| {
		for i in 0..10i64 {
			let handle = handle.clone();
			scope.spawn(move || {
				for _ in 0..100 {
					let result = handle.invoke(&[i, 2 * i]);
					assert_eq!(result.code, ResultCode::Success);
					assert_eq!(result.value, 6 * i);
				}
			});
		}
	});
}

#[test]
fn many_threads_observe_the_same_compile_error() {
	let mut jit = Jit::new();
	let handle = jit.register("VAR x; BEGIN RETURN x END.");

	thread::scope(|scope| {
		for _ in 0..8 {
			let handle = handle.clone();
			scope.spawn(move || {
				for _ in 0..50 {
					assert_eq!(handle.invoke(&[]).code, ResultCode::CompileError);
				}
			});
		}
	});
}

#[test]
fn concurrent_invocations_of_different_handles() {
	let mut jit = Jit::new();
	let handles: Vec<_> =
		(0..8).map(|i| jit.register(format!("BEGIN RETURN {i} END."))).collect();

	thread::scope(|scope| {
		for (i, handle) in handles.iter().enumerate() {
			let handle = handle.clone();
			scope.spawn(move || {
				for _ in 0..100 {
					assert_eq!(handle.invoke(&[]).value, i as i64);
				}
			});
		}
	});
}
