use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Undefined function '{name}'")]
    UndefinedFunction { name: String },
    #[error("Unknown type '{name}'")]
    UnknownType { name: String },
    #[error("Redeclaration of {kind} '{name}' in the same scope")]
    Redeclaration { kind: &'static str, name: String },
    #[error("Type mismatch in assignment: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("Cannot assign to a temporary {type_name} value")]
    NotAssignable { type_name: String },
    #[error("Operator '{operator}' is not supported between {left} and {right}")]
    UnsupportedOperator {
        operator: &'static str,
        left: String,
        right: String,
    },
    #[error("Operation '{operation}' is not supported for type {type_name}")]
    UnsupportedOperation {
        operation: &'static str,
        type_name: String,
    },
    #[error("Unknown member '{member}' for type {type_name}")]
    UnknownMember { member: String, type_name: String },
    #[error("'{name}' expected {expected} arguments, got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Invalid argument type for '{operation}': expected {expected}, got {got}")]
    InvalidArgumentType {
        operation: String,
        expected: String,
        got: String,
    },
    #[error("Index must be a whole number, got {index}")]
    InvalidIndex { index: String },
    #[error("Index must be non-negative, got {index}")]
    NegativeIndex { index: i64 },
    #[error("Index out of bounds: index {index}, len {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Format specifier '%{specifier}' has no matching argument")]
    MissingFormatArgument { specifier: char },
    #[error("Unknown format specifier '%{specifier}'")]
    UnknownFormatSpecifier { specifier: char },
    #[error("Format string ends with a lone '%'")]
    DanglingFormatPercent,
    #[error("Print received {unused} more arguments than its format string uses")]
    UnusedFormatArguments { unused: usize },
    #[error("'break' outside of a loop")]
    BreakOutsideLoop,
    #[error("'continue' outside of a loop")]
    ContinueOutsideLoop,
    #[error("'return' outside of a function")]
    ReturnOutsideFunction,
    #[error("Maximum call depth of {limit} exceeded")]
    StackOverflow { limit: usize },
    #[error("Failed to write output: {message}")]
    Output { message: String },
    #[error("{message}")]
    Host { message: String },
}

impl RuntimeError {
    pub fn expect_arity(name: &str, expected: usize, found: usize) -> Result<(), RuntimeError> {
        if expected == found {
            return Ok(());
        }
        Err(RuntimeError::ArityMismatch {
            name: name.to_string(),
            expected,
            found,
        })
    }

    pub fn host(message: impl Into<String>) -> Self {
        RuntimeError::Host {
            message: message.into(),
        }
    }
}
