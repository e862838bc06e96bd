//! Universal index: at most one fully-loaded entry list per collection,
//! kept for the session so search can reach across every page.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::collection::CollectionKind;
use crate::state::CollectionEntry;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UniversalIndex {
    entries: HashMap<CollectionKind, Vec<CollectionEntry>>,
}

impl UniversalIndex {
    pub fn is_loaded(&self, kind: CollectionKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn insert(&mut self, kind: CollectionKind, entries: Vec<CollectionEntry>) {
        self.entries.insert(kind, entries);
    }

    pub fn get(&self, kind: CollectionKind) -> Option<&[CollectionEntry]> {
        self.entries.get(&kind).map(Vec::as_slice)
    }

    /// Case-insensitive substring match on name, in index order. An
    /// empty or whitespace query is inert and matches nothing; search
    /// only starts once the user has typed something.
    pub fn search(&self, kind: CollectionKind, query: &str) -> Vec<CollectionEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let Some(entries) = self.entries.get(&kind) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}
