//! In-memory contents of a skill bundle.

use std::collections::BTreeMap;

use crate::manifest::MANIFEST_FILE;

/// Relative path → content mapping for one bundle. Keys are unique and
/// iterate in path order.
#[derive(Debug, Default, Clone)]
pub struct FileSet {
    files: BTreeMap<String, Vec<u8>>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    /// Insert only when the path is not already present. Used when merging
    /// tree contents under files that were fetched first.
    pub fn insert_if_absent(&mut self, path: &str, contents: Vec<u8>) {
        self.files.entry(path.to_string()).or_insert(contents);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Whether the set carries a `SKILL.md` at its root.
    pub fn has_manifest(&self) -> bool {
        self.contains(MANIFEST_FILE)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(path, contents)| (path.as_str(), contents.as_slice()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}
