//! # ccl-ast
//!
//! Abstract syntax tree types for the Column Calculation Language (CCL),
//! independent of how they were parsed. Mirrors the teacher's split between
//! lexing/parsing and a standalone AST crate that downstream crates (the
//! evaluator) can depend on without pulling in a parser.
#![deny(missing_docs)]
#![deny(unused_imports)]

mod expr;
mod literal;
mod operator;
mod statement;

pub use self::{
    expr::{ColRange, ColRef, Expr, RowRange, RowRef},
    literal::Literal,
    operator::{BinaryOperator, UnaryOperator},
    statement::{BracketTarget, LValue, Program, Statement},
};
