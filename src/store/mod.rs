//! Durable class storage.
//!
//! One record per class, keyed by class name, under the active version's
//! cache root.  [`JsonStore`] is the on-disk implementation; [`MemoryStore`]
//! keeps records in memory and is handy for tests and dry runs.

mod json;
mod memory;

use std::path::Path;

use crate::error::StoreError;
use crate::types::ClassInfo;

pub use json::JsonStore;
pub use memory::MemoryStore;

/// Every record of a store root that could be decoded.
#[derive(Debug, Default)]
pub struct StoreSnapshot {
    pub classes: Vec<ClassInfo>,
    /// Records that could not be decoded and were left out.
    pub skipped: usize,
}

pub trait Store {
    /// Read one class.  Returns `StoreError::NotFound` when absent.
    fn read_class(&self, name: &str) -> Result<ClassInfo, StoreError>;

    fn write_class(&mut self, class: &ClassInfo) -> Result<(), StoreError>;

    /// Remove one class.  Returns `StoreError::NotFound` when absent.
    fn remove_class(&mut self, name: &str) -> Result<(), StoreError>;

    /// Read every record, sorted by class name.  Undecodable records are
    /// counted in `skipped` instead of failing the read.
    fn read_all(&self) -> Result<StoreSnapshot, StoreError>;

    /// Delete every record of the active root.
    fn flush(&mut self) -> Result<(), StoreError>;

    /// Make `root` (a version's cache directory) the active root.
    fn switch_root(&mut self, root: &Path) -> Result<(), StoreError>;

    /// Replace the active root's records with a copy of `previous`'s.
    fn seed_from(&mut self, previous: &Path) -> Result<(), StoreError>;
}
