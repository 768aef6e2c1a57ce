use std::fmt;

/// A line/column position within the source being lexed, 1-based.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Location {
    /// 1-based line number.
    pub line: u64,
    /// 1-based column number.
    pub column: u64,
}

impl Location {
    pub(crate) fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    pub(crate) fn into_error(self, message: impl Into<String>) -> LexerError {
        LexerError {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// An error raised while tokenizing CCL source.
///
/// Unlike structural CCL failures (bad index, unknown column, ...), a
/// tokenize error is not tied to any particular statement yet, so it is
/// surfaced as a `Result::Err` rather than a logged warning — see the
/// error-handling design notes on `ccl_engine`.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message} at line {line}, column {column}")]
pub struct LexerError {
    /// Human-readable description.
    pub message: String,
    /// 1-based line of the offending character.
    pub line: u64,
    /// 1-based column of the offending character.
    pub column: u64,
}
