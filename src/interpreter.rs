//! Tree-walking execution of a parsed [`Program`].
//!
//! Execution pipeline:
//! run -> exec_block -> exec_statement -> eval_expression -> call_function
//! -> exec_block (function body). Control flow travels as `Signal`s.

use std::io::Write;

use crate::ast::Program;
use crate::engine::ScriptError;
use crate::runtime::environment::EnvStack;
use crate::runtime::error::RuntimeError;
use crate::runtime::object::Object;
use crate::runtime::registry::TypeRegistry;

mod eval;
mod exec;
mod format;
mod signal;
#[cfg(test)]
mod tests;

use signal::Signal;

/// How a program that did not fail came to an end.
#[derive(Debug)]
pub enum Completion {
    /// Ran off the end of the program.
    Finished,
    /// Stopped at an `exit` statement carrying this value.
    Exited(Object),
}

impl Completion {
    /// The `exit` value, or None when the program ran to completion.
    pub fn value(&self) -> Object {
        match self {
            Completion::Finished => Object::none(),
            Completion::Exited(value) => value.duplicate(),
        }
    }
    /// Process status for this completion. A whole-number `exit` value in
    /// `0..=255` is used as is; any other Number yields 255. Non-numeric
    /// values count as success.
    pub fn exit_code(&self) -> u8 {
        let Completion::Exited(value) = self else {
            return 0;
        };
        match value.as_number() {
            Some(code) if code.fract() == 0.0 && (0.0..=255.0).contains(&code) => code as u8,
            Some(_) => u8::MAX,
            None => 0,
        }
    }
}

/// Deepest chain of script function calls before execution fails.
pub const MAX_CALL_DEPTH: usize = 512;

pub struct Interpreter<'a> {
    types: &'a TypeRegistry,
    output: &'a mut dyn Write,
    call_depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(types: &'a TypeRegistry, output: &'a mut dyn Write) -> Self {
        Self {
            types,
            output,
            call_depth: 0,
        }
    }

    /// Executes `program` in the global frame of `env`.
    pub fn run(
        &mut self,
        program: &Program,
        env: &mut EnvStack,
    ) -> Result<Completion, ScriptError> {
        let depth = env.depth();
        let result = self.exec_block(&program.statements, env);
        debug_assert_eq!(env.depth(), depth, "unbalanced scopes");
        let (error, span) = match result {
            Ok(()) => return Ok(Completion::Finished),
            Err(Signal::Exit(value)) => return Ok(Completion::Exited(value)),
            Err(Signal::Return(_, span)) => (RuntimeError::ReturnOutsideFunction, Some(span)),
            Err(Signal::Break(span)) => (RuntimeError::BreakOutsideLoop, Some(span)),
            Err(Signal::Continue(span)) => (RuntimeError::ContinueOutsideLoop, Some(span)),
            Err(Signal::Error(error, span)) => (error, span),
        };
        Err(ScriptError::Runtime { error, span })
    }
}
