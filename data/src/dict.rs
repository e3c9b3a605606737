//! Hierarchical, dot-path-keyed containers.
//!
//! [`PathMap`] stores a nested mapping flattened on dot-joined paths, so a
//! nested dictionary and its flattened form are the same value, and traversal
//! order is deterministic. [`TensorDict`] is the instantiation every model
//! passes around.
use crate::errors::ValidationError;
use crate::tensor::Tensor;
use crate::TrellisResult;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// A mapping from dot-joined paths to values.
///
/// Derived maps (filter, merge) are new instances; nothing mutates a source
/// map in place once it is built.
#[derive(Clone, Debug, PartialEq)]
pub struct PathMap<V> {
    entries: BTreeMap<String, V>,
}

/// The tensor dictionary exchanged with models.
pub type TensorDict = PathMap<Arc<Tensor>>;

impl<V> Default for PathMap<V> {
    fn default() -> Self {
        PathMap { entries: BTreeMap::new() }
    }
}

impl<V> PathMap<V> {
    pub fn new() -> Self {
        PathMap::default()
    }

    /// Fails with [`ValidationError::MissingKey`] if the path is absent.
    pub fn get(&self, path: &str) -> TrellisResult<&V> {
        self.entries
            .get(path)
            .ok_or_else(|| ValidationError::MissingKey { path: path.to_string() }.into())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Inserting an already-present path replaces its value.
    pub fn insert(&mut self, path: impl Into<String>, value: V) {
        self.entries.insert(path.into(), value);
    }

    pub fn with(mut self, path: impl Into<String>, value: V) -> Self {
        self.insert(path, value);
        self
    }

    /// Grafts `sub` under `prefix`, path by path.
    pub fn insert_nested(&mut self, prefix: &str, sub: PathMap<V>) {
        for (path, value) in sub {
            self.insert(format!("{prefix}{SEPARATOR}{path}"), value);
        }
    }

    /// Distinct first segments of all paths.
    pub fn shallow_keys(&self) -> BTreeSet<&str> {
        self.entries
            .keys()
            .map(|k| k.split(SEPARATOR).next().unwrap_or(k.as_str()))
            .collect()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> PathMap<V> {
    /// Projection onto the paths of `keep`: the result's key set is exactly
    /// the intersection of both key sets. Never synthesizes a path absent
    /// from `self`, whatever `keep` declares.
    pub fn filter<W>(&self, keep: &PathMap<W>) -> PathMap<V> {
        PathMap {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| keep.contains(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Union of both maps; on a shared path `other` wins.
    pub fn merge(&self, other: &PathMap<V>) -> PathMap<V> {
        let mut entries = self.entries.clone();
        for (k, v) in &other.entries {
            entries.insert(k.clone(), v.clone());
        }
        PathMap { entries }
    }
}

impl<S: Into<String>, V> FromIterator<(S, V)> for PathMap<V> {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        PathMap { entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

impl<S: Into<String>, V> Extend<(S, V)> for PathMap<V> {
    fn extend<I: IntoIterator<Item = (S, V)>>(&mut self, iter: I) {
        self.entries.extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

impl<V> IntoIterator for PathMap<V> {
    type Item = (String, V);
    type IntoIter = std::collections::btree_map::IntoIter<String, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a PathMap<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = std::collections::btree_map::Iter<'a, String, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
