use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A literal appearing directly in CCL source.
///
/// Numbers are kept as their raw source text (mirroring how a SQL AST keeps
/// `Value::Number(String)` rather than pre-parsing into a fixed-width type)
/// so the evaluator decides integer-vs-float widening the same way it
/// widens any other value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Literal {
    /// Numeric literal, raw source text (e.g. `"42"`, `"-3.5"`).
    Number(String),
    /// String literal, already unquoted.
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(s) => f.write_str(s),
            Literal::String(s) => write!(f, "'{s}'"),
        }
    }
}
