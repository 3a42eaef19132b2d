//! In-memory store.
//!
//! Records are kept JSON-encoded per root, so reads go through the same
//! decoding as the file store and come back marked as loaded from cache.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::types::ClassInfo;

use super::{Store, StoreSnapshot};

#[derive(Debug, Default)]
pub struct MemoryStore {
    roots: HashMap<PathBuf, BTreeMap<String, String>>,
    root: PathBuf,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Option<&BTreeMap<String, String>> {
        self.roots.get(&self.root)
    }

    fn records_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.roots.entry(self.root.clone()).or_default()
    }

    /// Number of records under the active root.
    pub fn len(&self) -> usize {
        self.records().map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn decode(name: &str, raw: &str) -> Result<ClassInfo, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::Corrupt {
            path: PathBuf::from(name),
            message: e.to_string(),
        })
    }
}

impl Store for MemoryStore {
    fn read_class(&self, name: &str) -> Result<ClassInfo, StoreError> {
        let raw = self
            .records()
            .and_then(|r| r.get(name))
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        Self::decode(name, raw)
    }

    fn write_class(&mut self, class: &ClassInfo) -> Result<(), StoreError> {
        let raw = serde_json::to_string(class).map_err(|e| StoreError::Corrupt {
            path: PathBuf::from(&class.name),
            message: e.to_string(),
        })?;
        self.records_mut().insert(class.name.clone(), raw);
        Ok(())
    }

    fn remove_class(&mut self, name: &str) -> Result<(), StoreError> {
        self.records_mut()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn read_all(&self) -> Result<StoreSnapshot, StoreError> {
        let mut snapshot = StoreSnapshot::default();
        for (name, raw) in self.records().into_iter().flatten() {
            match Self::decode(name, raw) {
                Ok(class) => snapshot.classes.push(class),
                Err(e) => {
                    tracing::warn!("skipping cache record: {}", e);
                    snapshot.skipped += 1;
                }
            }
        }
        Ok(snapshot)
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.records_mut().clear();
        Ok(())
    }

    fn switch_root(&mut self, root: &Path) -> Result<(), StoreError> {
        self.root = root.to_path_buf();
        Ok(())
    }

    fn seed_from(&mut self, previous: &Path) -> Result<(), StoreError> {
        let copy = self.roots.get(previous).cloned().unwrap_or_default();
        *self.records_mut() = copy;
        Ok(())
    }
}
