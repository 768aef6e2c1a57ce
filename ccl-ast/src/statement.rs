#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/// The left-hand side of an assignment statement.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LValue {
    /// A bare identifier naming an existing column (by letter index or, if
    /// no such letter exists, by name).
    Ident(String),
    /// `[AB]` or `['name']`: assign to an existing column by letter or by
    /// name, matching the bracket form used on the right-hand side.
    Bracket(BracketTarget),
    /// `NEW('name')`: create a column with the given name (suffixed to
    /// uniqueness) and assign into it.
    New(String),
}

/// Distinguishes the two bracket lvalue forms, mirroring [`crate::ColRef`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BracketTarget {
    /// `[AB]`: by letter index.
    Letter(String),
    /// `['name']`: by column name.
    Name(String),
}

/// One statement of a CCL program.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Statement {
    /// `target = expression`.
    Assign {
        /// The assignment target.
        target: LValue,
        /// The right-hand side, evaluated once per row.
        expr: Expr,
    },
    /// A bare expression, valid only in "add column" / "edit column" mode.
    Expr(Expr),
}

/// A parsed CCL program: a sequence of statements in source order.
pub type Program = Vec<Statement>;
