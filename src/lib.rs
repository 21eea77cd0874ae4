pub mod ast;
pub mod engine;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runtime;
mod stack;
pub mod token;

pub use engine::{Engine, ExitStatus, ScriptError};
pub use interpreter::Completion;
