use std::fmt;

use ccl_lexer::LexerError;

/// An error raised while parsing a CCL program.
#[derive(Clone, Debug, PartialEq)]
pub enum ParserError {
    /// The underlying token stream could not be produced.
    Tokenize(String),
    /// A syntax error while parsing the token stream.
    Syntax(String),
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParserError::Tokenize(s) => s,
            ParserError::Syntax(s) => s,
        })
    }
}

impl std::error::Error for ParserError {}

impl From<LexerError> for ParserError {
    fn from(err: LexerError) -> Self {
        Self::Tokenize(err.to_string())
    }
}

impl From<String> for ParserError {
    fn from(err: String) -> Self {
        Self::Syntax(err)
    }
}

impl From<&str> for ParserError {
    fn from(err: &str) -> Self {
        Self::Syntax(err.into())
    }
}

pub(crate) fn parse_error<R>(message: impl Into<String>) -> Result<R, ParserError> {
    Err(ParserError::Syntax(message.into()))
}
