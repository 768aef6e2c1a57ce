#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{literal::Literal, operator::{BinaryOperator, UnaryOperator}};

/// A reference to a single column, either by its bare identifier (letter
/// index or, failing that, resolved by name at evaluation time) or by an
/// explicit bracketed form.
///
/// `[AB]` (no quotes) is [`ColRef::BracketLetter`]; `['name']` (quoted) is
/// [`ColRef::BracketName`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColRef {
    /// A bare identifier, e.g. `A` or `total`.
    Bare(String),
    /// `[AB]`: resolves by letter index.
    BracketLetter(String),
    /// `['name']` or `["name"]`: resolves by column name.
    BracketName(String),
}

/// A reference to a single row, either by 0-based index or by row name.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RowRef {
    /// 0-based row index; negative values wrap from the end.
    Index(i64),
    /// A quoted row name, resolved via the table's row-name index.
    Name(String),
}

/// `<col-expr>` or `<col-expr>:<col-expr>`, the column dimension of a
/// range/column access.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColRange {
    /// The first (or only) column.
    pub start: ColRef,
    /// The second column, if this is a `start:end` column range.
    pub end: Option<ColRef>,
}

/// `<row-ref>` or `<row-ref>:<row-ref>`, the row dimension of a range/column
/// access.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RowRange {
    /// The first (or only) row.
    pub start: RowRef,
    /// The second row, if this is a `start:end` row range.
    pub end: Option<RowRef>,
}

/// A CCL expression.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// A number or string literal.
    Literal(Literal),
    /// The `@` whole-table aggregate sentinel.
    At,
    /// A column access, optionally narrowed to specific row(s) with a
    /// dot-row suffix. With no row suffix, the access is evaluated once per
    /// row of the enclosing statement.
    Column {
        /// The column, or column range.
        col: ColRange,
        /// The `.row` or `.start:end` suffix, if present.
        row: Option<RowRange>,
    },
    /// A function call, `NAME(args...)`.
    Call {
        /// Function name, matched case-insensitively.
        name: String,
        /// Argument expressions.
        args: Vec<Expr>,
    },
    /// A unary operator application.
    Unary {
        /// The operator.
        op: UnaryOperator,
        /// The operand.
        expr: Box<Expr>,
    },
    /// A binary operator application.
    Binary {
        /// Left-hand operand.
        left: Box<Expr>,
        /// The operator.
        op: BinaryOperator,
        /// Right-hand operand.
        right: Box<Expr>,
    },
    /// A parenthesized expression, kept distinct from its inner expression
    /// only to preserve source shape; evaluates identically to `expr`.
    Nested(Box<Expr>),
}
