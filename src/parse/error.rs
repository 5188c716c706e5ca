use thiserror::Error;

/// Errors produced when parsing rule DSL text.
///
/// `line` and `column` are 1-based and point at the byte where parsing
/// stopped.
#[derive(Debug, Error)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    line: usize,
    column: usize,
    message: String,
}

impl ParseError {
    pub(crate) fn at_offset(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let consumed = &input[..offset.min(input.len())];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed
            .rfind('\n')
            .map_or(consumed.chars().count(), |nl| consumed[nl + 1..].chars().count())
            + 1;
        Self {
            line,
            column,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
