//! Whole-file identity store
//!
//! Records are keyed by id; the (tag, geometry, owner) resolution index and
//! the per-prefix increment counters live beside them. The index is derived
//! and rebuilt on load; counters are persisted.

use super::record::{IdentityRecord, ResolutionKey};
use super::{IdentityError, IdentityResult};
use plantag_common::config::write_atomic;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const STORE_VERSION: u32 = 1;

/// On-disk snapshot; BTreeMaps keep the file byte-stable between saves
#[derive(Debug, Serialize, Deserialize)]
struct StoreSnapshot {
    version: u32,
    #[serde(default)]
    records: BTreeMap<String, IdentityRecord>,
    #[serde(default)]
    counters: BTreeMap<String, u32>,
}

#[derive(Debug)]
pub struct IdentityStore {
    path: PathBuf,
    records: HashMap<String, IdentityRecord>,
    index: HashMap<ResolutionKey, String>,
    counters: HashMap<String, u32>,
    dirty: bool,
}

impl IdentityStore {
    /// Empty store that will persist to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: HashMap::new(),
            index: HashMap::new(),
            counters: HashMap::new(),
            dirty: false,
        }
    }

    /// Load the snapshot at `path`; a missing file yields an empty store
    pub fn load(path: impl Into<PathBuf>) -> IdentityResult<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(IdentityError::MissingStorePath);
        }

        let mut store = Self::new(path.clone());
        if !path.exists() {
            tracing::info!(path = %path.display(), "Identity store not found, starting empty");
            return Ok(store);
        }

        let content = std::fs::read_to_string(&path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
        if snapshot.version != STORE_VERSION {
            return Err(IdentityError::UnsupportedVersion(snapshot.version));
        }

        for (id, mut record) in snapshot.records {
            record.id = id.clone();
            store.index.insert(record.key(), id.clone());
            store.records.insert(id, record);
        }
        store.counters = snapshot.counters.into_iter().collect();

        tracing::info!(
            path = %path.display(),
            records = store.records.len(),
            "Identity store loaded"
        );
        Ok(store)
    }

    /// Write the snapshot atomically and clear the dirty flag
    pub fn save(&mut self) -> IdentityResult<()> {
        let snapshot = StoreSnapshot {
            version: STORE_VERSION,
            records: self
                .records
                .iter()
                .map(|(id, r)| (id.clone(), r.clone()))
                .collect(),
            counters: self
                .counters
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
        };
        let json = serde_json::to_vec_pretty(&snapshot)?;
        write_atomic(&self.path, &json)?;
        self.dirty = false;

        tracing::debug!(
            path = %self.path.display(),
            records = self.records.len(),
            "Identity store saved"
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, id: &str) -> Option<&IdentityRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut IdentityRecord> {
        self.dirty = true;
        self.records.get_mut(id)
    }

    pub fn find(&self, key: &ResolutionKey) -> Option<&str> {
        self.index.get(key).map(String::as_str)
    }

    /// Insert a new record; an existing id is replaced in place
    pub fn insert(&mut self, record: IdentityRecord) {
        self.index.insert(record.key(), record.id.clone());
        self.records.insert(record.id.clone(), record);
        self.dirty = true;
    }

    /// Next increment for `prefix`, starting at 1
    pub fn next_counter(&mut self, prefix: &str) -> u32 {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        self.dirty = true;
        *counter
    }

    /// Raise the counter for `prefix` so it never hands out `value` again
    pub fn observe_counter(&mut self, prefix: &str, value: u32) {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        if value > *counter {
            *counter = value;
            self.dirty = true;
        }
    }

    pub fn counter(&self, prefix: &str) -> u32 {
        self.counters.get(prefix).copied().unwrap_or(0)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::GeometryKind;
    use crate::types::Diagnostics;
    use tempfile::TempDir;

    fn record(id: &str, tag: &str) -> IdentityRecord {
        let now = plantag_common::time::now();
        IdentityRecord {
            id: id.to_string(),
            tag: tag.to_string(),
            geometry_kind: GeometryKind::Box,
            generated_name: tag.replace('.', "_"),
            catalog_reference: None,
            reference_number: None,
            source_file: None,
            source_version: None,
            owner_model_name: "ModelA".to_string(),
            suffix_letter: None,
            suffix_increment: Some(1),
            description: None,
            is_valid: true,
            created_at: now,
            updated_at: now,
            diagnostics: Diagnostics::default(),
        }
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = IdentityStore::load(dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_save_and_reload_rebuilds_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let mut store = IdentityStore::new(&path);
        store.insert(record("id-1", "PCM01.MHS01-ME"));
        assert_eq!(store.next_counter("PCM01"), 1);
        assert_eq!(store.next_counter("PCM01"), 2);
        assert!(store.is_dirty());
        store.save().unwrap();
        assert!(!store.is_dirty());

        let reloaded = IdentityStore::load(&path).unwrap();
        let key = ResolutionKey::new("PCM01.MHS01-ME", GeometryKind::Box, "ModelA");
        assert_eq!(reloaded.find(&key), Some("id-1"));
        assert_eq!(reloaded.counter("PCM01"), 2);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(IdentityStore::load(&path), Err(IdentityError::Corrupt(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"version": 9, "records": {}, "counters": {}}"#).unwrap();

        assert!(matches!(
            IdentityStore::load(&path),
            Err(IdentityError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(
            IdentityStore::load(""),
            Err(IdentityError::MissingStorePath)
        ));
    }

    #[test]
    fn test_observe_counter_only_raises() {
        let mut store = IdentityStore::new("unused.json");
        store.observe_counter("P", 12);
        store.observe_counter("P", 3);
        assert_eq!(store.next_counter("P"), 13);
    }
}
