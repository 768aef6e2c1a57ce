//! # ccl-value
//!
//! The dynamic cell value used throughout a table's columns, plus the
//! coercion rules (`to_float`, `compare`, `concat_string`, ...) shared by
//! arithmetic, comparison, concatenation and aggregation in the Column
//! Calculation Language.
#![deny(missing_docs)]
#![deny(unused_imports)]

mod coerce;
mod value;

pub use self::{
    coerce::{compare, concat_string, is_numeric, to_float, Ordering},
    value::Value,
};
