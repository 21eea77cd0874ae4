use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unexpected character '{character}' at line {line}, column {column}")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Invalid escape sequence '\\{character}' at line {line}, column {column}")]
    InvalidEscape {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Unterminated string literal at line {line}, column {column}")]
    UnterminatedString { line: usize, column: usize },
    #[error("Invalid number literal '{literal}' at line {line}, column {column}")]
    InvalidNumberLiteral {
        literal: String,
        line: usize,
        column: usize,
    },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            Self::UnexpectedCharacter { line, .. }
            | Self::InvalidEscape { line, .. }
            | Self::UnterminatedString { line, .. }
            | Self::InvalidNumberLiteral { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            Self::UnexpectedCharacter { column, .. }
            | Self::InvalidEscape { column, .. }
            | Self::UnterminatedString { column, .. }
            | Self::InvalidNumberLiteral { column, .. } => *column,
        }
    }
}

pub type LexResult<T> = Result<T, LexError>;
