//! # tabula
//!
//! An in-process, dynamically-typed tabular data engine: [`Column`] and
//! [`Table`] hold heterogeneous [`Value`] cells addressed by spreadsheet
//! letter, 0-based number, or name, mutated either directly or through the
//! embedded Column Calculation Language (`execute_ccl`, `add_col_using_ccl`,
//! `edit_col_by_index_using_ccl`, `edit_col_by_name_using_ccl`).
//!
//! Every `Column` and `Table` serializes its own operations through a
//! private worker thread (see `ccl_engine::config::set_thread_safe` to
//! disable this for single-threaded embedding), and buffers structural
//! failures (out-of-range writes, unresolved CCL references, ragged-column
//! reads) as warnings rather than panicking or returning `Result` — the
//! only fallible entry points are the CCL ones, which can fail to parse.
#![deny(missing_docs)]

pub use ccl_engine::{config, registry, Column, EngineError, Table};
pub use ccl_value::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reexports_are_usable_end_to_end() {
        let a = Column::from_values(vec![Value::Int(1), Value::Int(2)]).with_name("A");
        let b = Column::from_values(vec![Value::Int(0), Value::Int(0)]).with_name("B");
        let table = Table::new(vec![a, b]).with_name("sheet1");
        table.execute_ccl("B = A * 10").unwrap();
        assert_eq!(table.get_element(0, "B"), Value::Float(10.0));
        assert_eq!(table.get_element(1, "B"), Value::Float(20.0));
        assert!(table.warnings().is_empty());
    }
}
