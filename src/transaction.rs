//! Per-run change tracking.
//!
//! A [`Transaction`] is seeded from the classes the project already knows
//! (loaded from the store) and then told about every file hash seen and
//! every class extracted during the run.  Whatever prior hash is never seen
//! again belongs to a removed class.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexSet;

use crate::project::Project;
use crate::types::ClassInfo;

#[derive(Debug, Default)]
pub struct Transaction {
    /// Content hash → names of the classes declared in a file with that
    /// content.
    hashes: BTreeMap<String, BTreeSet<String>>,
    /// Class name → current hash.
    classes: BTreeMap<String, String>,
    /// Class name → file of the current declaration.
    origins: BTreeMap<String, String>,
    /// Declaring file → hash it had when its classes were recorded.
    files: BTreeMap<String, String>,
    visited: BTreeSet<String>,
    modified: IndexSet<String>,
    errors: Vec<String>,
}

impl Transaction {
    /// Start a run from the project's current class set.
    pub fn from_project(project: &Project) -> Self {
        let mut tx = Self::default();
        for class in project.classes() {
            tx.record(class);
        }
        tx.visited.clear();
        tx
    }

    fn record(&mut self, class: &ClassInfo) {
        if let Some(old) = self.classes.get(&class.name) {
            if let Some(names) = self.hashes.get_mut(old) {
                names.remove(&class.name);
                if names.is_empty() {
                    self.hashes.remove(old);
                }
            }
        }
        self.hashes
            .entry(class.hash.clone())
            .or_default()
            .insert(class.name.clone());
        self.classes.insert(class.name.clone(), class.hash.clone());
        self.origins.insert(class.name.clone(), class.file.clone());
        self.files.insert(class.file.clone(), class.hash.clone());
        self.visited.insert(class.hash.clone());
    }

    /// Whether classes with this content hash are already known.  A known
    /// hash counts as seen for this run.
    pub fn has_hash(&mut self, hash: &str) -> bool {
        if !self.hashes.contains_key(hash) {
            return false;
        }
        self.visited.insert(hash.to_string());
        true
    }

    /// The other file that already declares `class` during this run, if any.
    /// The first declaration seen in a run wins.
    pub fn declared_elsewhere(&self, class: &ClassInfo) -> Option<&str> {
        let hash = self.classes.get(&class.name)?;
        let file = self.origins.get(&class.name)?;
        (file != &class.file && self.visited.contains(hash)).then_some(file.as_str())
    }

    /// Record a freshly extracted class.  It counts as modified.
    pub fn add_class(&mut self, class: &ClassInfo) {
        self.record(class);
        self.modified.insert(class.name.clone());
    }

    /// Keep the classes previously recorded for `file`, e.g. because the
    /// file no longer parses.
    pub fn keep_file(&mut self, file: &str) {
        if let Some(hash) = self.files.get(file) {
            self.visited.insert(hash.clone());
        }
    }

    /// Record a class changed by the visitor pass.
    pub fn mark_modified(&mut self, name: &str) {
        self.modified.insert(name.to_string());
    }

    pub fn add_errors(&mut self, errors: impl IntoIterator<Item = String>) {
        self.errors.extend(errors);
    }

    /// Names of the modified classes, in the order they were recorded.
    pub fn modified_classes(&self) -> impl Iterator<Item = &str> {
        self.modified.iter().map(String::as_str)
    }

    /// Classes whose hash was not seen during the run, sorted by name.
    pub fn removed_classes(&self) -> Vec<String> {
        self.hashes
            .iter()
            .filter(|(hash, _)| !self.visited.contains(*hash))
            .flat_map(|(_, names)| names.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn modified_count(&self) -> usize {
        self.modified.len()
    }

    /// Diagnostics collected during the run.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// The current hash of a class.
    pub fn hash_of(&self, name: &str) -> Option<&str> {
        self.classes.get(name).map(String::as_str)
    }
}
