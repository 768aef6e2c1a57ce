//! # ccl-engine
//!
//! The `Column`/`Table` data model, the serializing [`actor::Actor`]
//! concurrency primitive they share, and the Column Calculation Language
//! evaluator that powers `execute_ccl` / `add_col_using_ccl` /
//! `edit_col_by_index_using_ccl` / `edit_col_by_name_using_ccl`.
#![deny(missing_docs)]

mod actor;
mod column;
pub mod config;
mod error;
mod eval;
mod letters;
pub mod registry;
mod rowindex;
mod table;
mod warnings;

pub use self::{column::Column, error::EngineError, table::Table};
