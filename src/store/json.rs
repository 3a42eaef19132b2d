//! JSON file store.
//!
//! Records live at `<root>/store/c_<sha256(class name)>.json`, one
//! pretty-printed [`ClassInfo`] each.  Writes go through a temporary file
//! in the same directory and are renamed into place.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::types::ClassInfo;
use crate::util::content_hash;

use super::{Store, StoreSnapshot};

const STORE_DIR: &str = "store";

#[derive(Debug, Default)]
pub struct JsonStore {
    root: Option<PathBuf>,
}

impl JsonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already pointing at `root`.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.switch_root(root)?;
        Ok(store)
    }

    fn dir(&self) -> Result<PathBuf, StoreError> {
        match &self.root {
            Some(root) => Ok(root.join(STORE_DIR)),
            None => Err(StoreError::Inaccessible {
                path: PathBuf::new(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no store root selected"),
            }),
        }
    }

    /// Path of the record for `name`.
    pub fn record_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        Ok(self
            .dir()?
            .join(format!("c_{}.json", content_hash(name.as_bytes()))))
    }

    fn decode(path: &Path) -> Result<ClassInfo, StoreError> {
        let bytes = fs::read(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

fn is_record(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("c_") && n.ends_with(".json"))
}

impl Store for JsonStore {
    fn read_class(&self, name: &str) -> Result<ClassInfo, StoreError> {
        let path = self.record_path(name)?;
        if !path.exists() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Self::decode(&path)
    }

    fn write_class(&mut self, class: &ClassInfo) -> Result<(), StoreError> {
        let dir = self.dir()?;
        let path = self.record_path(&class.name)?;
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.clone(),
            source,
        };

        let json = serde_json::to_vec_pretty(class).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    fn remove_class(&mut self, name: &str) -> Result<(), StoreError> {
        let path = self.record_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn read_all(&self) -> Result<StoreSnapshot, StoreError> {
        let dir = self.dir()?;
        if !dir.exists() {
            return Ok(StoreSnapshot::default());
        }
        let entries = fs::read_dir(&dir).map_err(|source| StoreError::Inaccessible {
            path: dir.clone(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| is_record(p))
            .collect();
        paths.sort();

        let mut snapshot = StoreSnapshot::default();
        for path in paths {
            match Self::decode(&path) {
                Ok(class) => snapshot.classes.push(class),
                Err(e) => {
                    tracing::warn!("skipping cache record: {}", e);
                    snapshot.skipped += 1;
                }
            }
        }
        snapshot.classes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(snapshot)
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        let dir = self.dir()?;
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|source| StoreError::Inaccessible {
                path: dir.clone(),
                source,
            })?;
        }
        fs::create_dir_all(&dir).map_err(|source| StoreError::Inaccessible { path: dir, source })
    }

    fn switch_root(&mut self, root: &Path) -> Result<(), StoreError> {
        let dir = root.join(STORE_DIR);
        fs::create_dir_all(&dir).map_err(|source| StoreError::Inaccessible { path: dir, source })?;
        self.root = Some(root.to_path_buf());
        Ok(())
    }

    fn seed_from(&mut self, previous: &Path) -> Result<(), StoreError> {
        self.flush()?;
        let from = previous.join(STORE_DIR);
        if !from.exists() {
            return Ok(());
        }
        let to = self.dir()?;
        let entries = fs::read_dir(&from).map_err(|source| StoreError::Inaccessible {
            path: from.clone(),
            source,
        })?;
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if !is_record(&path) {
                continue;
            }
            let target = to.join(entry.file_name());
            fs::copy(&path, &target).map_err(|source| StoreError::Io {
                path: target.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
