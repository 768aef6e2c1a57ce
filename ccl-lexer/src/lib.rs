//! # ccl-lexer
//!
//! A lexer that converts Column Calculation Language source text into a
//! sequence of tokens.
#![deny(missing_docs)]
#![deny(unused_imports)]

mod error;
mod lexer;
mod token;

pub use self::{
    error::{LexerError, Location},
    lexer::Lexer,
    token::Token,
};
