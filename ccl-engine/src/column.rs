use std::sync::{Arc, Mutex};

use ccl_value::Value;
use chrono::{DateTime, Utc};

use crate::{actor::Actor, warnings::WarningLog};

struct ColumnInner {
    values: Vec<Value>,
    name: String,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

/// An ordered, heterogeneously-typed sequence of [`Value`]s with an
/// optional name, backed by its own serializing [`Actor`].
///
/// Every public mutator and accessor runs through [`Actor::atomic_do`], so
/// concurrent callers see a total order of operations on a given `Column`
/// without taking an explicit lock themselves.
pub struct Column {
    inner: Arc<Mutex<ColumnInner>>,
    actor: Actor,
    warnings: Arc<WarningLog>,
}

impl Column {
    /// Creates an empty, unnamed column.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(Mutex::new(ColumnInner {
                values: Vec::new(),
                name: String::new(),
                created_at: now,
                last_modified_at: now,
            })),
            actor: Actor::new(),
            warnings: Arc::new(WarningLog::default()),
        }
    }

    /// Creates a column pre-populated from `values`, in order.
    pub fn from_values(values: Vec<Value>) -> Self {
        let column = Self::new();
        column.append_many(values);
        column
    }

    /// Attaches a name at construction time, returning `self` for chaining.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    /// Appends one value.
    pub fn append_one(&self, value: impl Into<Value>) {
        let value = value.into();
        self.mutate(move |inner| inner.values.push(value));
    }

    /// Appends each element of `values` as its own row (the
    /// variable-length "flattened" append form).
    pub fn append_many(&self, values: Vec<Value>) {
        self.mutate(move |inner| inner.values.extend(values));
    }

    /// Appends `values` as a single nested [`Value::Seq`] row (the
    /// fixed-shape "kept intact" append form).
    pub fn append_seq(&self, values: Vec<Value>) {
        self.mutate(move |inner| inner.values.push(Value::Seq(values)));
    }

    /// Inserts `value` at position `i`, shifting later elements back.
    /// An out-of-range index logs a warning and is a no-op.
    pub fn insert_at(&self, i: i64, value: impl Into<Value>) {
        let value = value.into();
        let warnings = Arc::clone(&self.warnings);
        self.mutate(move |inner| match resolve_insert_index(i, inner.values.len()) {
            Some(i) => inner.values.insert(i, value),
            None => warnings.push(format!("insert_at: index {i} out of range")),
        });
    }

    /// Overwrites the value at `i`. Out-of-range logs a warning.
    pub fn update(&self, i: i64, value: impl Into<Value>) {
        let value = value.into();
        let warnings = Arc::clone(&self.warnings);
        self.mutate(move |inner| match resolve_index(i, inner.values.len()) {
            Some(i) => inner.values[i] = value,
            None => warnings.push(format!("update: index {i} out of range")),
        });
    }

    /// Reads the value at `i`. Negative indices wrap from the end;
    /// out-of-range reads return [`Value::Null`] rather than warning
    /// (reads never log).
    pub fn get(&self, i: i64) -> Value {
        self.read(move |inner| match resolve_index(i, inner.values.len()) {
            Some(i) => inner.values[i].clone(),
            None => Value::Null,
        })
    }

    /// Removes and returns the last value, or [`Value::Null`] if empty.
    pub fn pop(&self) -> Value {
        self.mutate(|inner| inner.values.pop().unwrap_or(Value::Null))
    }

    /// Removes the value at `i`. Out-of-range logs a warning.
    pub fn drop(&self, i: i64) {
        let warnings = Arc::clone(&self.warnings);
        self.mutate(move |inner| match resolve_index(i, inner.values.len()) {
            Some(i) => {
                inner.values.remove(i);
            }
            None => warnings.push(format!("drop: index {i} out of range")),
        });
    }

    /// Removes every value NaN-aware-equal to any of `targets`.
    pub fn drop_all(&self, targets: &[Value]) {
        let targets = targets.to_vec();
        self.mutate(move |inner| {
            inner
                .values
                .retain(|v| !targets.iter().any(|t| v.eq_nan_aware(t)));
        });
    }

    /// Removes every value.
    pub fn clear(&self) {
        self.mutate(|inner| inner.values.clear());
    }

    /// Removes every string value.
    pub fn clear_strings(&self) {
        self.mutate(|inner| inner.values.retain(|v| !matches!(v, Value::String(_))));
    }

    /// Removes every numeric (int/float/bool) value.
    pub fn clear_numbers(&self) {
        self.mutate(|inner| inner.values.retain(|v| !ccl_value::is_numeric(v)));
    }

    /// Removes every NaN float value.
    pub fn clear_nans(&self) {
        self.mutate(|inner| inner.values.retain(|v| !v.is_nan()));
    }

    /// Removes every null value.
    pub fn clear_nils(&self) {
        self.mutate(|inner| inner.values.retain(|v| !v.is_nil()));
    }

    /// Replaces the first value NaN-aware-equal to `old` with `new`.
    pub fn replace_first(&self, old: &Value, new: impl Into<Value>) {
        let (old, new) = (old.clone(), new.into());
        self.mutate(move |inner| {
            if let Some(slot) = inner.values.iter_mut().find(|v| v.eq_nan_aware(&old)) {
                *slot = new;
            }
        });
    }

    /// Replaces the last value NaN-aware-equal to `old` with `new`.
    pub fn replace_last(&self, old: &Value, new: impl Into<Value>) {
        let (old, new) = (old.clone(), new.into());
        self.mutate(move |inner| {
            if let Some(slot) = inner.values.iter_mut().rev().find(|v| v.eq_nan_aware(&old)) {
                *slot = new;
            }
        });
    }

    /// Replaces every value NaN-aware-equal to `old` with `new`.
    pub fn replace_all(&self, old: &Value, new: impl Into<Value>) {
        let (old, new) = (old.clone(), new.into());
        self.mutate(move |inner| {
            for slot in inner.values.iter_mut() {
                if slot.eq_nan_aware(&old) {
                    *slot = new.clone();
                }
            }
        });
    }

    /// Replaces every NaN value with `new`.
    pub fn replace_nans_with(&self, new: impl Into<Value>) {
        let new = new.into();
        self.mutate(move |inner| {
            for slot in inner.values.iter_mut() {
                if slot.is_nan() {
                    *slot = new.clone();
                }
            }
        });
    }

    /// Replaces every null value with `new`.
    pub fn replace_nils_with(&self, new: impl Into<Value>) {
        let new = new.into();
        self.mutate(move |inner| {
            for slot in inner.values.iter_mut() {
                if slot.is_nil() {
                    *slot = new.clone();
                }
            }
        });
    }

    /// Replaces every null or NaN value with `new`.
    pub fn replace_both(&self, new: impl Into<Value>) {
        let new = new.into();
        self.mutate(move |inner| {
            for slot in inner.values.iter_mut() {
                if slot.is_nil_or_nan() {
                    *slot = new.clone();
                }
            }
        });
    }

    /// The number of values.
    pub fn len(&self) -> usize {
        self.read(|inner| inner.values.len())
    }

    /// `true` if the column holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A snapshot copy of every value, in order.
    pub fn data(&self) -> Vec<Value> {
        self.read(|inner| inner.values.clone())
    }

    /// Sets the column's name.
    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.mutate(move |inner| inner.name = name);
    }

    /// The column's name, empty string if unnamed.
    pub fn get_name(&self) -> String {
        self.read(|inner| inner.name.clone())
    }

    /// When this column was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.read(|inner| inner.created_at)
    }

    /// When this column was last mutated.
    pub fn last_modified_at(&self) -> DateTime<Utc> {
        self.read(|inner| inner.last_modified_at)
    }

    /// The structural warnings logged against this column since the last
    /// [`Column::clear_warnings`] call (or construction).
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.snapshot()
    }

    /// Clears the buffered warning log.
    pub fn clear_warnings(&self) {
        self.warnings.clear();
    }

    /// Marks this column's actor closed; further operations degrade to
    /// inline execution.
    pub fn close(&self) {
        self.actor.close();
    }

    pub(crate) fn warnings_arc(&self) -> Arc<WarningLog> {
        Arc::clone(&self.warnings)
    }

    fn mutate<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ColumnInner) -> R + Send + 'static,
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
        F: FnOnce(&ColumnInner) -> R + Send + 'static,
        R: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        self.actor.atomic_do(move || f(&inner.lock().unwrap()))
    }
}

impl Default for Column {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_index(i: i64, len: usize) -> Option<usize> {
    let resolved = if i < 0 { i + len as i64 } else { i };
    if resolved >= 0 && (resolved as usize) < len {
        Some(resolved as usize)
    } else {
        None
    }
}

fn resolve_insert_index(i: i64, len: usize) -> Option<usize> {
    let resolved = if i < 0 { i + len as i64 } else { i };
    if resolved >= 0 && (resolved as usize) <= len {
        Some(resolved as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_read_back() {
        let col = Column::new();
        col.append_one(1i64);
        col.append_one(2i64);
        assert_eq!(col.len(), 2);
        assert_eq!(col.data(), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn append_many_flattens_while_append_seq_nests() {
        let flattened = Column::new();
        flattened.append_many(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(flattened.len(), 2);

        let nested = Column::new();
        nested.append_seq(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(nested.len(), 1);
        assert_eq!(nested.get(0), Value::Seq(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn negative_index_wraps_from_the_end() {
        let col = Column::from_values(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(col.get(-1), Value::Int(3));
        assert_eq!(col.get(-3), Value::Int(1));
    }

    #[test]
    fn out_of_range_read_returns_null_and_logs_nothing() {
        let col = Column::from_values(vec![Value::Int(1)]);
        assert_eq!(col.get(5), Value::Null);
        assert!(col.warnings().is_empty());
    }

    #[test]
    fn out_of_range_write_logs_a_warning_and_is_a_no_op() {
        let col = Column::from_values(vec![Value::Int(1)]);
        col.update(5, Value::Int(9));
        assert_eq!(col.data(), vec![Value::Int(1)]);
        assert_eq!(col.warnings().len(), 1);
    }

    #[test]
    fn drop_all_is_nan_aware() {
        let col = Column::from_values(vec![Value::Float(f64::NAN), Value::Int(1), Value::Float(f64::NAN)]);
        col.drop_all(&[Value::Float(f64::NAN)]);
        assert_eq!(col.data(), vec![Value::Int(1)]);
    }

    #[test]
    fn replace_both_covers_null_and_nan() {
        let col = Column::from_values(vec![Value::Null, Value::Float(f64::NAN), Value::Int(1)]);
        col.replace_both(Value::Int(0));
        assert_eq!(col.data(), vec![Value::Int(0), Value::Int(0), Value::Int(1)]);
    }

    #[test]
    fn pop_on_empty_column_returns_null() {
        let col = Column::new();
        assert_eq!(col.pop(), Value::Null);
    }

    #[test]
    fn mutation_bumps_last_modified_at() {
        let col = Column::new();
        let created = col.last_modified_at();
        col.append_one(1i64);
        assert!(col.last_modified_at() >= created);
    }
}
