use thiserror::Error;

/// A recoverable parse diagnostic. The parser accumulates these in insertion
/// order and always returns a schema; a statement that produced an error is
/// discarded while the rest of the input still parses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {line}:{column}")]
pub struct ParseError {
    pub message: String,
    /// 1-based source line.
    pub line: u32,
    /// 1-based source column.
    pub column: u32,
}

impl ParseError {
    #[must_use]
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}
