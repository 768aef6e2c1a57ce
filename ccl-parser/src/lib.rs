//! # ccl-parser
//!
//! A recursive-descent/precedence-climbing parser that turns Column
//! Calculation Language tokens into a [`ccl_ast::Program`] or a single
//! [`ccl_ast::Expr`], depending on the entry point the host is using.
#![deny(missing_docs)]

mod error;
mod parser;
mod peek;

pub use self::{
    error::ParserError,
    parser::{EntryMode, Parser},
};
