use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Expected {expected}, got {found} at line {line}, column {column}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },
    #[error("Invalid assignment target at line {line}, column {column}")]
    InvalidAssignmentTarget { line: usize, column: usize },
    #[error("Trailing comma before {closing} at line {line}, column {column}")]
    TrailingComma {
        closing: &'static str,
        line: usize,
        column: usize,
    },
    #[error("Nesting deeper than {limit} levels at line {line}, column {column}")]
    NestingTooDeep {
        limit: usize,
        line: usize,
        column: usize,
    },
}

impl SyntaxError {
    pub fn line(&self) -> usize {
        match self {
            Self::UnexpectedToken { line, .. }
            | Self::InvalidAssignmentTarget { line, .. }
            | Self::TrailingComma { line, .. }
            | Self::NestingTooDeep { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            Self::UnexpectedToken { column, .. }
            | Self::InvalidAssignmentTarget { column, .. }
            | Self::TrailingComma { column, .. }
            | Self::NestingTooDeep { column, .. } => *column,
        }
    }
}

pub type ParseResult<T> = Result<T, SyntaxError>;
