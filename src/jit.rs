//! The thread-safe just-in-time compilation façade.
//!
//! "Just in time" here means lazy first-use compilation to the tree IR:
//! registering a function only stores its source, and the first invocation
//! runs the full pipeline (lex, parse, analyze, optimize) and caches the
//! result in the function's frame. Every later invocation reuses it.
//!
//! Each frame carries a readers-writer lock around its compile state.
//! Invocations take the shared lock; whoever finds the state still
//! [`CompileState::NotCompiled`] upgrades to the exclusive lock, rechecks,
//! and compiles. The state only ever advances from `NotCompiled` to
//! `Compiled` or `Failed`, so at most one compilation attempt happens per
//! function no matter how many threads race, and a failed compilation is
//! terminal: further invocations report the compile error without
//! re-running the pipeline or re-printing diagnostics.

use std::sync::{Arc, PoisonError, RwLock};

use crate::{
	analysis::{SemanticAnalyzer, SymbolTable},
	ast,
	error::CompileError,
	exec::{self, ExecutionContext},
	optim,
	parser::Parser,
	source::SourceManager,
};

/// Discriminates the outcome of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
	Success,
	CompileError,
	RuntimeError,
	InvalidFunctionCall,
}

/// Outcome of invoking a registered function. On anything but
/// [`ResultCode::Success`] the value is `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallResult {
	pub value: i64,
	pub code:  ResultCode,
}

impl CallResult {
	fn success(value: i64) -> Self { Self { value, code: ResultCode::Success } }

	fn compile_error() -> Self { Self { value: -1, code: ResultCode::CompileError } }

	fn runtime_error() -> Self { Self { value: -1, code: ResultCode::RuntimeError } }

	fn invalid_call() -> Self { Self { value: -1, code: ResultCode::InvalidFunctionCall } }
}

/// Unwraps a [`CallResult`] the caller knows cannot fail. The value is
/// meaningless if the result is not a success.
pub fn cant_fail(result: CallResult) -> i64 { result.value }

/// The compiled artifact attached to a frame: immutable once installed,
/// readable by any number of concurrent invocations.
struct CompiledFunction {
	function: ast::Function,
	symbols:  SymbolTable,
}

enum CompileState {
	NotCompiled,
	Compiled(CompiledFunction),
	Failed,
}

/// Per-registered-function record: the source and the lock-guarded
/// compile state.
struct Frame {
	source: SourceManager,
	state:  RwLock<CompileState>,
}

impl Frame {
	fn new(code: String) -> Self {
		Self { source: SourceManager::new(code), state: RwLock::new(CompileState::NotCompiled) }
	}

	/// Runs the full compilation pipeline over the frame's source.
	fn compile(&self) -> Result<CompiledFunction, CompileError> {
		if self.source.is_empty() {
			println!("error: received code string of length 0");
			return Err(CompileError::EmptySource);
		}

		let mut parser = Parser::new(&self.source);
		let tree = parser.parse_function_definition()?;

		let mut symbols = SymbolTable::new();
		let mut function = SemanticAnalyzer::new(&self.source, &mut symbols).analyze_function(&tree)?;

		optim::optimize(&mut function, &symbols);

		Ok(CompiledFunction { function, symbols })
	}

	/// Compiles on first use, then runs the function. Thread-safe.
	fn execute(&self, arguments: &[i64]) -> CallResult {
		// A panic while a lock was held cannot leave the state machine
		// half-updated (states only advance), so a poisoned lock is usable.
		loop {
			{
				let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
				match &*state {
					CompileState::Failed => return CallResult::compile_error(),
					CompileState::Compiled(compiled) => return Self::run(compiled, arguments),
					CompileState::NotCompiled => {}
				}
			}

			let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
			// Another thread may have won the race for the write lock.
			if matches!(&*state, CompileState::NotCompiled) {
				*state = match self.compile() {
					Ok(compiled) => CompileState::Compiled(compiled),
					Err(_) => CompileState::Failed,
				};
			}
			// Loop around and re-enter through the read path.
		}
	}

	fn run(compiled: &CompiledFunction, arguments: &[i64]) -> CallResult {
		if arguments.len() != compiled.symbols.parameter_count() {
			println!(
				"error: invalid number of parameters provided, expected {} but {} were provided",
				compiled.symbols.parameter_count(),
				arguments.len()
			);
			return CallResult::invalid_call();
		}

		let mut context = ExecutionContext::new(arguments.to_vec(), &compiled.symbols);
		exec::execute(&compiled.function, &mut context);

		if context.has_error() {
			return CallResult::runtime_error();
		}
		CallResult::success(context.return_value)
	}
}

/// A cheap-to-clone handle to a registered function. Handles stay valid
/// across later registrations and can be shared freely between threads.
#[derive(Clone)]
pub struct FunctionHandle {
	frame: Arc<Frame>,
}

impl FunctionHandle {
	/// Invokes the function, compiling it on first use. Thread-safe, also
	/// for concurrent invocations of the same handle.
	pub fn invoke(&self, arguments: &[i64]) -> CallResult { self.frame.execute(arguments) }
}

/// Registry of JIT-compiled functions.
///
/// Frames are appended only and each one is reference-counted, so handles
/// keep stable addresses no matter how many functions are registered later.
/// Frames live until the registry itself is dropped (and beyond, while
/// handles to them exist).
#[derive(Default)]
pub struct Jit {
	frames: Vec<Arc<Frame>>,
}

impl Jit {
	pub fn new() -> Self { Self::default() }

	/// Registers a function and returns its handle. Compilation is
	/// deferred to the first invocation.
	/// Note: Registration is not thread-safe; invocation is.
	pub fn register(&mut self, code: impl Into<String>) -> FunctionHandle {
		let frame = Arc::new(Frame::new(code.into()));
		self.frames.push(Arc::clone(&frame));
		FunctionHandle { frame }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn invoke_once(code: &str, arguments: &[i64]) -> CallResult {
		let mut jit = Jit::new();
		let handle = jit.register(code);
		handle.invoke(arguments)
	}

	#[test]
	fn successful_invocation() {
		let result = invoke_once("BEGIN RETURN 1 END.", &[]);
		assert_eq!(result, CallResult { value: 1, code: ResultCode::Success });
	}

	#[test]
	fn compiles_once_and_reuses_the_artifact() {
		let mut jit = Jit::new();
		let handle = jit.register("PARAM a; BEGIN RETURN a * a END.");
		assert_eq!(handle.invoke(&[3]).value, 9);
		assert_eq!(handle.invoke(&[5]).value, 25);
	}

	#[test]
	fn empty_source() {
		let result = invoke_once("", &[]);
		assert_eq!(result.code, ResultCode::CompileError);
		assert_eq!(result.value, -1);
	}

	#[test]
	fn compile_errors_are_terminal() {
		let mut jit = Jit::new();
		let handle = jit.register("BEGIN a := 12; RETURN a END.");
		assert_eq!(handle.invoke(&[]).code, ResultCode::CompileError);
		// The frame stays failed; no second compilation attempt happens.
		assert_eq!(handle.invoke(&[]).code, ResultCode::CompileError);
	}

	#[test]
	fn parameter_count_mismatch() {
		let mut jit = Jit::new();
		let handle = jit.register("PARAM a, b, c; BEGIN RETURN a + b - c END.");
		assert_eq!(handle.invoke(&[1, 2]).code, ResultCode::InvalidFunctionCall);
		// The function itself stays usable.
		assert_eq!(handle.invoke(&[1, 2, 3]), CallResult { value: 0, code: ResultCode::Success });
	}

	#[test]
	fn runtime_error() {
		let result = invoke_once("PARAM a, b; BEGIN RETURN a / b END.", &[1, 0]);
		assert_eq!(result, CallResult { value: -1, code: ResultCode::RuntimeError });
	}

	#[test]
	fn handles_survive_later_registrations() {
		let mut jit = Jit::new();
		let first = jit.register("BEGIN RETURN 1 END.");
		let mut handles = Vec::new();
		for index in 0..100 {
			handles.push(jit.register(format!("BEGIN RETURN {index} END.")));
		}
		assert_eq!(first.invoke(&[]).value, 1);
		for (index, handle) in handles.iter().enumerate() {
			assert_eq!(handle.invoke(&[]).value, index as i64);
		}
	}

	#[test]
	fn cant_fail_unwraps_the_value() {
		let mut jit = Jit::new();
		let handle = jit.register("BEGIN RETURN 1 END.");
		assert_eq!(cant_fail(handle.invoke(&[])), 1);
	}
}
