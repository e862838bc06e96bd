//! Durable favorites: a JSON `{name: true}` blob per collection,
//! written before the in-memory set changes so disk and memory never
//! diverge.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq)]
pub enum StorageError {
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable(detail) => {
                write!(f, "favorites storage unavailable: {detail}")
            }
        }
    }
}

impl std::error::Error for StorageError {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FavoritesStore {
    path: PathBuf,
    names: BTreeSet<String>,
}

impl FavoritesStore {
    /// Load the store at `path`, starting empty if the file does not
    /// exist yet. A corrupt blob is treated as empty rather than fatal.
    pub fn open(path: PathBuf) -> Self {
        let names = fs::read(&path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<BTreeMap<String, bool>>(&bytes).ok())
            .map(|map| {
                map.into_iter()
                    .filter(|(_, marked)| *marked)
                    .map(|(name, _)| name)
                    .collect()
            })
            .unwrap_or_default();
        Self { path, names }
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn list(&self) -> &BTreeSet<String> {
        &self.names
    }

    /// Flip membership for `name`. The new blob is persisted before the
    /// in-memory set is touched; on a failed write the toggle does not
    /// happen. Returns the new membership state.
    pub fn toggle(&mut self, name: &str) -> Result<bool, StorageError> {
        let mut next = self.names.clone();
        let now_favorite = if next.contains(name) {
            next.remove(name);
            false
        } else {
            next.insert(name.to_string());
            true
        };

        write_blob(&self.path, &next)?;
        self.names = next;
        Ok(now_favorite)
    }
}

fn write_blob(path: &Path, names: &BTreeSet<String>) -> Result<(), StorageError> {
    // Absence means false; only `true` entries are ever stored.
    let map: BTreeMap<&str, bool> = names.iter().map(|name| (name.as_str(), true)).collect();
    let bytes = serde_json::to_vec(&map)
        .map_err(|err| StorageError::Unavailable(err.to_string()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| StorageError::Unavailable(err.to_string()))?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &bytes).map_err(|err| StorageError::Unavailable(err.to_string()))?;
    fs::rename(&tmp, path).map_err(|err| StorageError::Unavailable(err.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(tag: &str) -> PathBuf {
        let unique = format!(
            "pokegrid-favorites-{tag}-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        );
        std::env::temp_dir().join(unique).join("favorites.json")
    }

    #[test]
    fn test_toggle_flips_and_reports_new_state() {
        let mut store = FavoritesStore::open(scratch_path("flip"));
        assert!(!store.is_favorite("pikachu"));

        assert_eq!(store.toggle("pikachu"), Ok(true));
        assert!(store.is_favorite("pikachu"));

        assert_eq!(store.toggle("pikachu"), Ok(false));
        assert!(!store.is_favorite("pikachu"));
    }

    #[test]
    fn test_removal_deletes_the_key() {
        let path = scratch_path("delete");
        let mut store = FavoritesStore::open(path.clone());
        store.toggle("pikachu").unwrap();
        store.toggle("eevee").unwrap();
        store.toggle("pikachu").unwrap();

        let raw = fs::read(&path).unwrap();
        let map: BTreeMap<String, bool> = serde_json::from_slice(&raw).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("eevee"), Some(&true));
        assert!(!map.contains_key("pikachu"));
    }

    #[test]
    fn test_survives_reload() {
        let path = scratch_path("reload");
        let mut store = FavoritesStore::open(path.clone());
        store.toggle("snorlax").unwrap();

        let reloaded = FavoritesStore::open(path);
        assert!(reloaded.is_favorite("snorlax"));
        assert_eq!(reloaded.list().len(), 1);
    }

    #[test]
    fn test_blob_round_trips() {
        let path = scratch_path("roundtrip");
        let mut store = FavoritesStore::open(path);
        store.toggle("mew").unwrap();
        store.toggle("ditto").unwrap();

        let json = serde_json::to_string(&store).unwrap();
        let back: FavoritesStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        // A favorites path whose parent is a regular file cannot be
        // created, so the persist step must fail.
        let blocker = scratch_path("blocked");
        fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        fs::write(&blocker, b"not a directory").unwrap();

        let mut store = FavoritesStore::open(blocker.join("favorites.json"));
        let result = store.toggle("pikachu");
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert!(!store.is_favorite("pikachu"));
    }
}
