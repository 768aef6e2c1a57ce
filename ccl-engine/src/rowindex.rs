use std::collections::HashMap;

/// A bidirectional, partial mapping between row position and row name.
///
/// Only some rows need a name; duplicate insertions are resolved by
/// suffixing `_1`, `_2`, … until unique, and an empty name request is a
/// no-op rather than creating a mapping.
#[derive(Debug, Default, Clone)]
pub(crate) struct RowIndex {
    by_index: HashMap<usize, String>,
    by_name: HashMap<String, usize>,
}

impl RowIndex {
    pub(crate) fn name_of(&self, index: usize) -> Option<&str> {
        self.by_index.get(&index).map(String::as_str)
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Sets (or replaces) the name of `index`, suffixing on collision with
    /// an existing, differently-indexed name. Returns the name actually
    /// stored. A blank `name` clears any existing mapping for `index`.
    pub(crate) fn set(&mut self, index: usize, name: &str) -> Option<String> {
        self.clear(index);
        if name.is_empty() {
            return None;
        }
        let unique = self.uniquify(name);
        self.by_index.insert(index, unique.clone());
        self.by_name.insert(unique.clone(), index);
        Some(unique)
    }

    /// Renames whatever row currently owns `old` to `new`, suffixing `new`
    /// on collision. No-op if `old` is not currently mapped.
    pub(crate) fn rename(&mut self, old: &str, new: &str) -> Option<String> {
        let index = self.index_of(old)?;
        self.set(index, new)
    }

    pub(crate) fn clear(&mut self, index: usize) {
        if let Some(old_name) = self.by_index.remove(&index) {
            self.by_name.remove(&old_name);
        }
    }

    /// Row names in index order, `0..=max_index`, empty string for unnamed
    /// rows, matching `Table::row_names()`'s "includes empty entries"
    /// contract.
    pub(crate) fn all(&self, row_count: usize) -> Vec<String> {
        (0..row_count)
            .map(|i| self.name_of(i).unwrap_or_default().to_string())
            .collect()
    }

    fn uniquify(&self, name: &str) -> String {
        if !self.by_name.contains_key(name) {
            return name.to_string();
        }
        let mut suffix = 1;
        loop {
            let candidate = format!("{name}_{suffix}");
            if !self.by_name.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
