//! Export tables.
//!
//! [`ScopedNames`] is the per-sheet table the scope pass builds: each local
//! name maps to every external name it stands for, its own scoped name
//! first, then whatever it composes. [`ExportTable`] is the flattened
//! `{name: value}` artifact a linked sheet exports.

use rustc_hash::FxHashMap;

/// Ordered `name -> value` table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportTable {
    entries: Vec<(String, String)>,
    index: FxHashMap<String, usize>,
}

impl ExportTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, keeping its first position when it already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExportTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = ExportTable::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

/// Ordered `local name -> external names` table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopedNames {
    entries: Vec<(String, Vec<String>)>,
    index: FxHashMap<String, usize>,
}

impl ScopedNames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, name: &str) -> &mut Vec<String> {
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.index.insert(name.to_owned(), self.entries.len());
                self.entries.push((name.to_owned(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }

    /// Append `value` to `name` unless it is already there.
    pub fn push_unique(&mut self, name: &str, value: &str) {
        let slot = self.slot(name);
        if !slot.iter().any(|v| v == value) {
            slot.push(value.to_owned());
        }
    }

    /// Append `value` to `name`.
    pub fn push(&mut self, name: &str, value: &str) {
        self.slot(name).push(value.to_owned());
    }

    /// Replace everything `name` maps to.
    pub fn set(&mut self, name: &str, values: Vec<String>) {
        *self.slot(name) = values;
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.index.get(name).map(|&i| self.entries[i].1.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Flatten to `name: "a b c"`.
    pub fn to_table(&self) -> ExportTable {
        self.iter().map(|(k, v)| (k, v.join(" "))).collect()
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use serde::ser::{Serialize, SerializeMap, Serializer};

    use super::{ExportTable, ScopedNames};

    impl Serialize for ExportTable {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (k, v) in self.iter() {
                map.serialize_entry(k, v)?;
            }
            map.end()
        }
    }

    impl Serialize for ScopedNames {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.entries.len()))?;
            for (k, v) in self.iter() {
                map.serialize_entry(k, v)?;
            }
            map.end()
        }
    }
}

#[cfg(test)]
mod tests;
