//! Embedding entry point.
//!
//! An [`Engine`] is configured once (host types and host functions) and then
//! shared read-only by any number of executions. Each execution builds its
//! own [`EnvStack`] and object graph, so one engine can serve several threads.

use std::io::{self, Write};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::ast::Program;
use crate::interpreter::{Completion, Interpreter};
use crate::lexer::{LexError, tokenize};
use crate::parser::{SyntaxError, parse_tokens};
use crate::runtime::callable::{Callable, HostFunction};
use crate::runtime::environment::EnvStack;
use crate::runtime::error::RuntimeError;
use crate::runtime::registry::{ObjectFactory, TypeRegistry};
use crate::token::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Ok,
    SyntaxErrorOccurred,
    RuntimeErrorOccurred,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScriptError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("Runtime error{}: {error}", location(.span))]
    Runtime {
        error: RuntimeError,
        span: Option<Span>,
    },
}

fn location(span: &Option<Span>) -> String {
    span.map(|span| format!(" at {span}")).unwrap_or_default()
}

impl ScriptError {
    pub fn status(&self) -> ExitStatus {
        match self {
            ScriptError::Lex(_) | ScriptError::Syntax(_) => ExitStatus::SyntaxErrorOccurred,
            ScriptError::Runtime { .. } => ExitStatus::RuntimeErrorOccurred,
        }
    }

    pub fn position(&self) -> Option<Span> {
        match self {
            ScriptError::Lex(error) => Some(Span::new(error.line(), error.column())),
            ScriptError::Syntax(error) => Some(Span::new(error.line(), error.column())),
            ScriptError::Runtime { span, .. } => *span,
        }
    }

    /// The runtime error, if execution got that far.
    pub fn runtime_error(&self) -> Option<&RuntimeError> {
        match self {
            ScriptError::Runtime { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[derive(Clone, Default)]
pub struct Engine {
    types: TypeRegistry,
    functions: FxHashMap<String, Arc<dyn HostFunction>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(
        &mut self,
        name: impl Into<String>,
        factory: impl ObjectFactory + 'static,
    ) -> Result<(), RuntimeError> {
        self.types.register(name, factory)
    }

    pub fn register_function(
        &mut self,
        name: impl Into<String>,
        function: impl HostFunction + 'static,
    ) -> Result<(), RuntimeError> {
        let name = name.into();
        if self.functions.contains_key(&name) {
            return Err(RuntimeError::Redeclaration {
                kind: "function",
                name,
            });
        }
        self.functions.insert(name, Arc::new(function));
        Ok(())
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Fresh environment whose global frame holds the host functions.
    pub fn new_env(&self) -> EnvStack {
        let mut env = EnvStack::new();
        for (name, function) in &self.functions {
            env.define_global_function(name, Callable::Host(Arc::clone(function)));
        }
        env
    }

    /// Lexes and parses without executing.
    pub fn compile(&self, source: &str) -> Result<Program, ScriptError> {
        let tokens = tokenize(source)?;
        let program = parse_tokens(tokens)?;
        Ok(program)
    }

    /// Runs `source` against an existing environment, so globals survive
    /// for inspection or for a later run.
    pub fn run_in(
        &self,
        env: &mut EnvStack,
        source: &str,
        output: &mut dyn Write,
    ) -> Result<Completion, ScriptError> {
        let program = self.compile(source)?;
        self.run_program(env, &program, output)
    }

    pub fn run_program(
        &self,
        env: &mut EnvStack,
        program: &Program,
        output: &mut dyn Write,
    ) -> Result<Completion, ScriptError> {
        let result = Interpreter::new(&self.types, output).run(program, env);
        match &result {
            Ok(completion) => debug!(?completion, "execution finished"),
            Err(error) => debug!(%error, "execution failed"),
        }
        result
    }

    pub fn run(&self, source: &str, output: &mut dyn Write) -> Result<Completion, ScriptError> {
        let mut env = self.new_env();
        self.run_in(&mut env, source, output)
    }

    /// Runs `source` with print output on stdout and any error reported on stderr.
    pub fn execute(&self, source: &str) -> ExitStatus {
        let stdout = io::stdout();
        let mut output = stdout.lock();
        match self.run(source, &mut output) {
            Ok(_) => ExitStatus::Ok,
            Err(error) => {
                let _ = output.flush();
                eprintln!("{error}");
                error.status()
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut functions: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        functions.sort_unstable();
        f.debug_struct("Engine")
            .field("types", &self.types)
            .field("functions", &functions)
            .finish()
    }
}
