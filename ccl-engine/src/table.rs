use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ccl_value::Value;
use chrono::{DateTime, Utc};

use crate::{actor::Actor, column::Column, eval, letters, rowindex::RowIndex, warnings::WarningLog, EngineError};

struct TableInner {
    columns: Vec<Column>,
    row_index: RowIndex,
    name: String,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

impl TableInner {
    fn row_count(&self) -> usize {
        self.columns.iter().map(Column::len).max().unwrap_or(0)
    }

    fn resolve_col_number(&self, i: i64) -> Option<usize> {
        let resolved = if i < 0 { i + self.columns.len() as i64 } else { i };
        if resolved >= 0 && (resolved as usize) < self.columns.len() {
            Some(resolved as usize)
        } else {
            None
        }
    }

    fn resolve_row_number(&self, i: i64, len: usize) -> Option<usize> {
        let resolved = if i < 0 { i + len as i64 } else { i };
        if resolved >= 0 && (resolved as usize) < len {
            Some(resolved as usize)
        } else {
            None
        }
    }

    fn col_position_by_name(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.get_name() == name)
    }

    /// Resolves a bare column reference the way CCL does: letter first,
    /// falling back to name.
    fn col_position_by_ref(&self, col_ref: &str) -> Option<usize> {
        if let Some(pos) = letters::decode(col_ref) {
            if pos < self.columns.len() {
                return Some(pos);
            }
        }
        self.col_position_by_name(col_ref)
    }
}

/// An ordered sequence of [`Column`]s plus a bidirectional row-name index,
/// addressable by spreadsheet-style letter, 0-based number, or name.
///
/// Like [`Column`], every public operation is serialized through the
/// table's own [`Actor`].
pub struct Table {
    inner: Arc<Mutex<TableInner>>,
    actor: Actor,
    warnings: Arc<WarningLog>,
}

impl Table {
    /// Creates a table from an ordered list of columns.
    pub fn new(columns: Vec<Column>) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(Mutex::new(TableInner {
                columns,
                row_index: RowIndex::default(),
                name: String::new(),
                created_at: now,
                last_modified_at: now,
            })),
            actor: Actor::new(),
            warnings: Arc::new(WarningLog::default()),
        }
    }

    /// Attaches a name at construction time, returning `self` for chaining.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    /// Runs `f` inside this table's actor, exposing the atomic-block
    /// primitive collaborators (merge/join/sort orchestration) build on.
    pub fn atomic_do<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.actor.atomic_do(f)
    }

    // -- addressing --------------------------------------------------

    /// Encodes a 0-based column position as its spreadsheet-style letter.
    pub fn letter(position: usize) -> String {
        letters::encode(position)
    }

    /// Decodes a letter (case-insensitive) back to a 0-based position.
    pub fn parse_letter(letter: &str) -> Option<usize> {
        letters::decode(letter)
    }

    /// Number of columns.
    pub fn col_count(&self) -> usize {
        self.read(|inner| inner.columns.len())
    }

    /// `max` over columns of column length; ragged columns read as
    /// null-padded.
    pub fn row_count(&self) -> usize {
        self.read(|inner| inner.row_count())
    }

    // -- element / column / row access --------------------------------

    /// Reads a single cell, resolving `col_ref` by letter then by name.
    pub fn get_element(&self, row: i64, col_ref: &str) -> Value {
        let col_ref = col_ref.to_string();
        self.read(move |inner| match inner.col_position_by_ref(&col_ref) {
            Some(pos) => cell_or_null(&inner.columns[pos], row),
            None => Value::Null,
        })
    }

    /// Reads a single cell by 0-based column number.
    pub fn get_element_by_number(&self, row: i64, col: i64) -> Value {
        self.read(move |inner| match inner.resolve_col_number(col) {
            Some(pos) => cell_or_null(&inner.columns[pos], row),
            None => Value::Null,
        })
    }

    /// A snapshot copy of the column at `letter`, if it exists.
    pub fn get_col(&self, letter: &str) -> Option<Column> {
        self.get_col_by_number(letters::decode(letter)? as i64)
    }

    /// A snapshot copy of the column at 0-based `i`.
    pub fn get_col_by_number(&self, i: i64) -> Option<Column> {
        self.read(move |inner| {
            inner.resolve_col_number(i).map(|pos| {
                Column::from_values(inner.columns[pos].data()).with_name(inner.columns[pos].get_name())
            })
        })
    }

    /// A snapshot copy of the first column named `name`.
    pub fn get_col_by_name(&self, name: &str) -> Option<Column> {
        let name = name.to_string();
        self.read(move |inner| {
            inner.col_position_by_name(&name).map(|pos| {
                Column::from_values(inner.columns[pos].data()).with_name(inner.columns[pos].get_name())
            })
        })
    }

    /// A freshly synthesized column holding the cells of row `i`, in
    /// column order, null-padded for columns shorter than `i`.
    pub fn get_row(&self, i: i64) -> Column {
        self.read(move |inner| {
            let len = inner.row_count();
            let values = match inner.resolve_row_number(i, len) {
                Some(row) => inner.columns.iter().map(|c| cell_or_null(c, row as i64)).collect(),
                None => vec![],
            };
            Column::from_values(values)
        })
    }

    /// Same as [`Table::get_row`], addressed by row name.
    pub fn get_row_by_name(&self, name: &str) -> Option<Column> {
        let name = name.to_string();
        self.read(move |inner| inner.row_index.index_of(&name)).map(|i| self.get_row(i as i64))
    }

    // -- mutation -------------------------------------------------------

    /// Appends columns to the table.
    pub fn append_cols(&self, columns: Vec<Column>) {
        self.mutate(move |inner| inner.columns.extend(columns));
    }

    /// Appends each `columns[i]`'s values onto the matching existing
    /// column, growing the table with new columns for any `columns`
    /// beyond the current width.
    pub fn append_rows_from_columns(&self, columns: Vec<Column>) {
        self.mutate(move |inner| {
            for (i, col) in columns.into_iter().enumerate() {
                match inner.columns.get(i) {
                    Some(existing) => existing.append_many(col.data()),
                    None => inner.columns.push(col),
                }
            }
        });
    }

    /// Appends one row, keyed by column letter; columns with no entry in
    /// `row` are padded with null.
    pub fn append_rows_by_col_index(&self, row: HashMap<String, Value>) {
        self.mutate(move |inner| {
            let row_i = inner.row_count();
            for (i, col) in inner.columns.iter().enumerate() {
                let letter = letters::encode(i);
                let value = row.get(&letter).cloned().unwrap_or(Value::Null);
                pad_to(col, row_i);
                col.append_one(value);
            }
        });
    }

    /// Appends one row, keyed by column name; columns with no entry in
    /// `row` are padded with null.
    pub fn append_rows_by_col_name(&self, row: HashMap<String, Value>) {
        self.mutate(move |inner| {
            let row_i = inner.row_count();
            for col in inner.columns.iter() {
                let value = row.get(&col.get_name()).cloned().unwrap_or(Value::Null);
                pad_to(col, row_i);
                col.append_one(value);
            }
        });
    }

    /// Overwrites a single cell, resolving `col_ref` by letter then name.
    pub fn update_element(&self, row: i64, col_ref: &str, value: Value) {
        let col_ref = col_ref.to_string();
        let warnings = Arc::clone(&self.warnings);
        self.mutate(move |inner| match inner.col_position_by_ref(&col_ref) {
            Some(pos) => inner.columns[pos].update(row, value),
            None => warnings.push(format!("update_element: unknown column '{col_ref}'")),
        });
    }

    /// Replaces the column at `letter` wholesale.
    pub fn update_col(&self, letter: &str, column: Column) {
        let pos = Self::parse_letter(letter);
        let letter = letter.to_string();
        let warnings = Arc::clone(&self.warnings);
        self.mutate(move |inner| match pos.filter(|&p| p < inner.columns.len()) {
            Some(pos) => inner.columns[pos] = column,
            None => warnings.push(format!("update_col: unknown column letter '{letter}'")),
        });
    }

    /// Overwrites row `i` with the values of `row`, in column order.
    pub fn update_row(&self, i: i64, row: Column) {
        let values = row.data();
        self.mutate(move |inner| {
            let len = inner.row_count();
            if let Some(r) = inner.resolve_row_number(i, len.max(values.len())) {
                for (col, value) in inner.columns.iter().zip(values.into_iter()) {
                    col.update(r as i64, value);
                }
            }
        });
    }

    /// Drops every column whose name is in `names`.
    pub fn drop_cols_by_name(&self, names: &[&str]) {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        self.mutate(move |inner| inner.columns.retain(|c| !names.contains(&c.get_name())));
    }

    /// Drops every column whose letter is in `letters`.
    pub fn drop_cols_by_letter(&self, letters: &[&str]) {
        let positions: Vec<usize> = letters.iter().filter_map(|l| Self::parse_letter(l)).collect();
        self.mutate(move |inner| {
            let mut i = 0;
            inner.columns.retain(|_| {
                let keep = !positions.contains(&i);
                i += 1;
                keep
            });
        });
    }

    /// Drops every column at the given 0-based numbers (negative wraps).
    pub fn drop_cols_by_number(&self, numbers: &[i64]) {
        let numbers = numbers.to_vec();
        self.mutate(move |inner| {
            let resolved: Vec<usize> = numbers
                .iter()
                .filter_map(|&n| inner.resolve_col_number(n))
                .collect();
            let mut i = 0;
            inner.columns.retain(|_| {
                let keep = !resolved.contains(&i);
                i += 1;
                keep
            });
        });
    }

    /// Drops every row at the given 0-based indices (negative wraps).
    pub fn drop_rows_by_index(&self, indices: &[i64]) {
        let indices = indices.to_vec();
        self.mutate(move |inner| {
            let len = inner.row_count();
            let resolved: Vec<usize> = indices
                .iter()
                .filter_map(|&i| inner.resolve_row_number(i, len))
                .collect();
            drop_rows(inner, &resolved);
        });
    }

    /// Drops every row carrying one of the given row names.
    pub fn drop_rows_by_name(&self, names: &[&str]) {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        self.mutate(move |inner| {
            let resolved: Vec<usize> = names
                .iter()
                .filter_map(|n| inner.row_index.index_of(n))
                .collect();
            drop_rows(inner, &resolved);
        });
    }

    /// Drops every row containing at least one string cell.
    pub fn drop_rows_where_contains_string(&self) {
        self.drop_rows_matching(|v| matches!(v, Value::String(_)));
    }

    /// Drops every row containing at least one numeric cell.
    pub fn drop_rows_where_contains_number(&self) {
        self.drop_rows_matching(ccl_value::is_numeric);
    }

    /// Drops every row containing at least one null cell.
    pub fn drop_rows_where_contains_nil(&self) {
        self.drop_rows_matching(Value::is_nil);
    }

    /// Drops every row containing at least one NaN cell.
    pub fn drop_rows_where_contains_nan(&self) {
        self.drop_rows_matching(Value::is_nan);
    }

    /// Drops every row containing a cell NaN-aware-equal to `value`.
    pub fn drop_rows_where_contains_value(&self, value: Value) {
        self.drop_rows_matching(move |v| v.eq_nan_aware(&value));
    }

    /// Drops every row containing the conventional "#N/A" sentinel string
    /// used by spreadsheet exports (this core has no dedicated NA type).
    pub fn drop_rows_where_contains_excel_na(&self) {
        self.drop_rows_matching(|v| matches!(v, Value::String(s) if s == "#N/A"));
    }

    fn drop_rows_matching(&self, predicate: impl Fn(&Value) -> bool + Send + 'static) {
        self.mutate(move |inner| {
            let len = inner.row_count();
            let resolved: Vec<usize> = (0..len)
                .filter(|&row| {
                    inner
                        .columns
                        .iter()
                        .any(|c| predicate(&cell_or_null(c, row as i64)))
                })
                .collect();
            drop_rows(inner, &resolved);
        });
    }

    /// Swaps two columns by name.
    pub fn swap_cols_by_name(&self, a: &str, b: &str) {
        let (a, b) = (a.to_string(), b.to_string());
        self.mutate(move |inner| {
            if let (Some(ia), Some(ib)) = (inner.col_position_by_name(&a), inner.col_position_by_name(&b)) {
                inner.columns.swap(ia, ib);
            }
        });
    }

    /// Swaps two columns by letter.
    pub fn swap_cols_by_letter(&self, a: &str, b: &str) {
        if let (Some(ia), Some(ib)) = (Self::parse_letter(a), Self::parse_letter(b)) {
            self.mutate(move |inner| {
                if ia < inner.columns.len() && ib < inner.columns.len() {
                    inner.columns.swap(ia, ib);
                }
            });
        }
    }

    /// Swaps two columns by 0-based number.
    pub fn swap_cols_by_number(&self, a: i64, b: i64) {
        self.mutate(move |inner| {
            if let (Some(ia), Some(ib)) = (inner.resolve_col_number(a), inner.resolve_col_number(b)) {
                inner.columns.swap(ia, ib);
            }
        });
    }

    /// Swaps two rows by 0-based index.
    pub fn swap_rows_by_index(&self, a: i64, b: i64) {
        self.mutate(move |inner| {
            let len = inner.row_count();
            if let (Some(ia), Some(ib)) = (inner.resolve_row_number(a, len), inner.resolve_row_number(b, len)) {
                for col in inner.columns.iter() {
                    let va = col.get(ia as i64);
                    let vb = col.get(ib as i64);
                    col.update(ia as i64, vb);
                    col.update(ib as i64, va);
                }
            }
        });
    }

    /// Swaps two rows by row name.
    pub fn swap_rows_by_name(&self, a: &str, b: &str) {
        let (a, b) = (a.to_string(), b.to_string());
        let indices = self.read(move |inner| (inner.row_index.index_of(&a), inner.row_index.index_of(&b)));
        if let (Some(ia), Some(ib)) = indices {
            self.swap_rows_by_index(ia as i64, ib as i64);
        }
    }

    /// Promotes the current column names into a new first row, then clears
    /// column names.
    pub fn col_names_to_first_row(&self) {
        self.mutate(move |inner| {
            let names: Vec<Value> = inner.columns.iter().map(|c| Value::String(c.get_name())).collect();
            for (col, name) in inner.columns.iter().zip(names) {
                col.insert_at(0, name);
            }
            for col in inner.columns.iter() {
                col.set_name(String::new());
            }
        });
    }

    /// Clears every column name.
    pub fn drop_col_names(&self) {
        self.mutate(move |inner| {
            for col in inner.columns.iter() {
                col.set_name(String::new());
            }
        });
    }

    /// Promotes current row names into a new first column named `name`,
    /// then clears the row-name index.
    pub fn row_names_to_first_col(&self, name: &str) {
        let name = name.to_string();
        self.mutate(move |inner| {
            let len = inner.row_count();
            let values = inner.row_index.all(len).into_iter().map(Value::String).collect();
            inner.columns.insert(0, Column::from_values(values).with_name(name));
            inner.row_index = RowIndex::default();
        });
    }

    /// Clears the row-name index.
    pub fn drop_row_names(&self) {
        self.mutate(move |inner| inner.row_index = RowIndex::default());
    }

    /// Uses the column at `letter` as the new row-name index, consuming it
    /// as a column.
    pub fn set_col_to_row_names(&self, letter: &str) {
        if let Some(pos) = Self::parse_letter(letter) {
            self.mutate(move |inner| {
                if pos >= inner.columns.len() {
                    return;
                }
                let col = inner.columns.remove(pos);
                let mut row_index = RowIndex::default();
                for (i, value) in col.data().into_iter().enumerate() {
                    row_index.set(i, &value.to_string());
                }
                inner.row_index = row_index;
            });
        }
    }

    /// Uses row `row_i`'s values as the new column-name row, removing that
    /// row from the data.
    pub fn set_row_to_col_names(&self, row_i: i64) {
        self.mutate(move |inner| {
            let len = inner.row_count();
            let Some(row) = inner.resolve_row_number(row_i, len) else {
                return;
            };
            let names: Vec<String> = inner.columns.iter().map(|c| cell_or_null(c, row as i64).to_string()).collect();
            for (col, name) in inner.columns.iter().zip(names) {
                col.drop(row as i64);
                col.set_name(name);
            }
        });
    }

    // -- table-wide replace family (mirrors Column's) -------------------

    /// Clears every string cell across all columns.
    pub fn clear_strings(&self) {
        self.for_each_col(Column::clear_strings);
    }

    /// Clears every numeric cell across all columns.
    pub fn clear_numbers(&self) {
        self.for_each_col(Column::clear_numbers);
    }

    /// Clears every NaN cell across all columns.
    pub fn clear_nans(&self) {
        self.for_each_col(Column::clear_nans);
    }

    /// Clears every null cell across all columns.
    pub fn clear_nils(&self) {
        self.for_each_col(Column::clear_nils);
    }

    /// Replaces the first occurrence of `old` with `new`, per column.
    pub fn replace_first(&self, old: Value, new: Value) {
        self.mutate(move |inner| {
            for col in inner.columns.iter() {
                col.replace_first(&old, new.clone());
            }
        });
    }

    /// Replaces the last occurrence of `old` with `new`, per column.
    pub fn replace_last(&self, old: Value, new: Value) {
        self.mutate(move |inner| {
            for col in inner.columns.iter() {
                col.replace_last(&old, new.clone());
            }
        });
    }

    /// Replaces every occurrence of `old` with `new`, across all columns.
    pub fn replace_all(&self, old: Value, new: Value) {
        self.mutate(move |inner| {
            for col in inner.columns.iter() {
                col.replace_all(&old, new.clone());
            }
        });
    }

    /// Replaces every NaN cell with `new`, across all columns.
    pub fn replace_nans_with(&self, new: Value) {
        self.mutate(move |inner| {
            for col in inner.columns.iter() {
                col.replace_nans_with(new.clone());
            }
        });
    }

    /// Replaces every null cell with `new`, across all columns.
    pub fn replace_nils_with(&self, new: Value) {
        self.mutate(move |inner| {
            for col in inner.columns.iter() {
                col.replace_nils_with(new.clone());
            }
        });
    }

    /// Replaces every null or NaN cell with `new`, across all columns.
    pub fn replace_both(&self, new: Value) {
        self.mutate(move |inner| {
            for col in inner.columns.iter() {
                col.replace_both(new.clone());
            }
        });
    }

    fn for_each_col(&self, f: impl Fn(&Column) + Send + 'static) {
        self.mutate(move |inner| {
            for col in inner.columns.iter() {
                f(col);
            }
        });
    }

    // -- row-name API -----------------------------------------------

    /// `(index, found)` for a row name.
    pub fn get_row_index_by_name(&self, name: &str) -> (i64, bool) {
        let name = name.to_string();
        match self.read(move |inner| inner.row_index.index_of(&name)) {
            Some(i) => (i as i64, true),
            None => (-1, false),
        }
    }

    /// `(name, set)` for a row index.
    pub fn get_row_name_by_index(&self, i: i64) -> (String, bool) {
        match self.read(move |inner| inner.row_index.name_of(i.max(0) as usize).map(str::to_string)) {
            Some(name) => (name, true),
            None => (String::new(), false),
        }
    }

    /// Names row `i`, suffixing on collision. Returns the name stored.
    pub fn set_row_name_by_index(&self, i: i64, name: &str) -> Option<String> {
        let name = name.to_string();
        self.mutate(move |inner| {
            let len = inner.row_count();
            inner
                .resolve_row_number(i, len.max(i.max(0) as usize + 1))
                .and_then(|i| inner.row_index.set(i, &name))
        })
    }

    /// Renames a row by its current name.
    pub fn change_row_name(&self, old: &str, new: &str) -> Option<String> {
        let (old, new) = (old.to_string(), new.to_string());
        self.mutate(move |inner| inner.row_index.rename(&old, &new))
    }

    /// Replaces the whole row-name list, positionally; blank entries clear
    /// that row's name.
    pub fn set_row_names(&self, names: Vec<String>) {
        self.mutate(move |inner| {
            inner.row_index = RowIndex::default();
            for (i, name) in names.into_iter().enumerate() {
                inner.row_index.set(i, &name);
            }
        });
    }

    /// All row names in index order, empty string for unnamed rows.
    pub fn row_names(&self) -> Vec<String> {
        self.read(|inner| {
            let len = inner.row_count();
            inner.row_index.all(len)
        })
    }

    // -- CCL entry points ---------------------------------------------

    /// Executes a multi-statement CCL program against this table.
    pub fn execute_ccl(&self, program: &str) -> Result<(), EngineError> {
        let parsed = eval::parse_program(program)?;
        let warnings = Arc::clone(&self.warnings);
        self.mutate(move |inner| eval::run_program(inner_as_eval_table(inner), &parsed, &warnings));
        Ok(())
    }

    /// Evaluates a single expression once per row and appends the results
    /// into a newly created column named `new_col_name`.
    pub fn add_col_using_ccl(&self, new_col_name: &str, expression: &str) -> Result<(), EngineError> {
        let expr = eval::parse_add_or_edit_expr(expression)?;
        let new_col_name = new_col_name.to_string();
        let warnings = Arc::clone(&self.warnings);
        self.mutate(move |inner| {
            let values = eval::eval_per_row(inner_as_eval_table(inner), &expr, &warnings);
            let name = unique_col_name(&inner.columns, &new_col_name);
            inner.columns.push(Column::from_values(values).with_name(name));
        });
        Ok(())
    }

    /// Evaluates a single expression once per row and overwrites the
    /// column at `letter`.
    pub fn edit_col_by_index_using_ccl(&self, letter: &str, expression: &str) -> Result<(), EngineError> {
        let expr = eval::parse_add_or_edit_expr(expression)?;
        let letter = letter.to_string();
        let warnings = Arc::clone(&self.warnings);
        self.mutate(move |inner| {
            let values = eval::eval_per_row(inner_as_eval_table(inner), &expr, &warnings);
            match letters::decode(&letter).filter(|&p| p < inner.columns.len()) {
                Some(pos) => overwrite_column(&inner.columns[pos], values),
                None => warnings.push(format!("edit_col_by_index_using_ccl: unknown column '{letter}'")),
            }
        });
        Ok(())
    }

    /// Evaluates a single expression once per row and overwrites the
    /// first column named `name`.
    pub fn edit_col_by_name_using_ccl(&self, name: &str, expression: &str) -> Result<(), EngineError> {
        let expr = eval::parse_add_or_edit_expr(expression)?;
        let name = name.to_string();
        let warnings = Arc::clone(&self.warnings);
        self.mutate(move |inner| {
            let values = eval::eval_per_row(inner_as_eval_table(inner), &expr, &warnings);
            match inner.col_position_by_name(&name) {
                Some(pos) => overwrite_column(&inner.columns[pos], values),
                None => warnings.push(format!("edit_col_by_name_using_ccl: unknown column '{name}'")),
            }
        });
        Ok(())
    }

    // -- misc ------------------------------------------------------

    /// Sets the table's name.
    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.mutate(move |inner| inner.name = name);
    }

    /// The table's name, empty string if unnamed.
    pub fn get_name(&self) -> String {
        self.read(|inner| inner.name.clone())
    }

    /// When this table was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.read(|inner| inner.created_at)
    }

    /// When this table was last mutated.
    pub fn last_modified_at(&self) -> DateTime<Utc> {
        self.read(|inner| inner.last_modified_at)
    }

    /// The structural warnings logged against this table since the last
    /// [`Table::clear_warnings`] call (or construction).
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.snapshot()
    }

    /// Clears the buffered warning log.
    pub fn clear_warnings(&self) {
        self.warnings.clear();
    }

    /// Marks this table's actor closed; further operations degrade to
    /// inline execution.
    pub fn close(&self) {
        self.actor.close();
    }

    /// A mapping from column key (letter, or name when `use_names`) to its
    /// ordered values, for collaborator exporters (CSV/JSON/SQL writers).
    pub fn data(&self, use_names: bool) -> HashMap<String, Vec<Value>> {
        self.read(move |inner| {
            inner
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let key = if use_names { col.get_name() } else { letters::encode(i) };
                    (key, col.data())
                })
                .collect()
        })
    }

    fn mutate<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut TableInner) -> R + Send + 'static,
        R: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        self.actor.atomic_do(move || {
            let mut guard = inner.lock().unwrap();
            let result = f(&mut guard);
            guard.last_modified_at = Utc::now();
            result
        })
    }

    fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&TableInner) -> R + Send + 'static,
        R: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        self.actor.atomic_do(move || f(&inner.lock().unwrap()))
    }
}

fn cell_or_null(col: &Column, row: i64) -> Value {
    if row < 0 {
        return col.get(row);
    }
    if (row as usize) < col.len() {
        col.get(row)
    } else {
        Value::Null
    }
}

fn pad_to(col: &Column, row_count: usize) {
    while col.len() < row_count {
        col.append_one(Value::Null);
    }
}

fn drop_rows(inner: &mut TableInner, rows: &[usize]) {
    for &row in rows.iter().collect::<std::collections::BTreeSet<_>>().into_iter().rev() {
        for col in inner.columns.iter() {
            col.drop(row as i64);
        }
    }
    inner.row_index = RowIndex::default();
}

fn overwrite_column(col: &Column, values: Vec<Value>) {
    col.clear();
    col.append_many(values);
}

pub(crate) fn unique_col_name(columns: &[Column], wanted: &str) -> String {
    if !columns.iter().any(|c| c.get_name() == wanted) {
        return wanted.to_string();
    }
    let mut suffix = 1;
    loop {
        let candidate = format!("{wanted}_{suffix}");
        if !columns.iter().any(|c| c.get_name() == candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn inner_as_eval_table(inner: &mut TableInner) -> eval::TableView<'_> {
    eval::TableView {
        columns: &mut inner.columns,
        row_index: &inner.row_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_ab() -> Table {
        let a = Column::from_values(vec![Value::Int(1), Value::Int(2), Value::Int(3)]).with_name("A");
        let b = Column::from_values(vec![Value::Int(4), Value::Int(5), Value::Int(6)]).with_name("B");
        Table::new(vec![a, b])
    }

    #[test]
    fn letter_round_trips() {
        assert_eq!(Table::letter(0), "A");
        assert_eq!(Table::parse_letter("A"), Some(0));
    }

    #[test]
    fn row_count_is_the_ragged_max() {
        let a = Column::from_values(vec![Value::Int(1)]);
        let b = Column::from_values(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let t = Table::new(vec![a, b]);
        assert_eq!(t.row_count(), 3);
    }

    #[test]
    fn get_element_resolves_letter_then_name() {
        let t = table_ab();
        assert_eq!(t.get_element(0, "A"), Value::Int(1));
        assert_eq!(t.get_element(1, "B"), Value::Int(5));
    }

    #[test]
    fn drop_rows_by_index_shrinks_every_column() {
        let t = table_ab();
        t.drop_rows_by_index(&[1]);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.get_element(1, "A"), Value::Int(3));
    }

    #[test]
    fn row_names_round_trip_with_suffixing() {
        let t = table_ab();
        t.set_row_name_by_index(0, "q1");
        let second = t.set_row_name_by_index(1, "q1").unwrap();
        assert_eq!(second, "q1_1");
        assert_eq!(t.get_row_index_by_name("q1"), (0, true));
    }

    #[test]
    fn append_rows_by_col_name_pads_missing_columns_with_null() {
        let t = table_ab();
        let mut row = HashMap::new();
        row.insert("A".to_string(), Value::Int(9));
        t.append_rows_by_col_name(row);
        assert_eq!(t.row_count(), 4);
        assert_eq!(t.get_element(3, "A"), Value::Int(9));
        assert_eq!(t.get_element(3, "B"), Value::Null);
    }
}
