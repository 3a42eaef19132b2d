//! What needs re-rendering.
//!
//! After each render a [`ProjectIndex`] is saved in the build directory:
//! a fingerprint per documented class, the namespaces and the configured
//! versions.  The next run compares the current project with it to find
//! the pages that are out of date.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::project::Project;
use crate::types::ClassInfo;
use crate::util::content_hash;

pub const INDEX_FILE: &str = "renderer.index.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIndex {
    /// Class name → fingerprint of its stored record.
    pub classes: BTreeMap<String, String>,
    pub namespaces: Vec<String>,
    pub versions: Vec<String>,
}

/// Fingerprint of everything a class page shows.  Unlike the file hash it
/// also changes when enrichment alone changed the class.
pub fn fingerprint(class: &ClassInfo) -> String {
    match serde_json::to_vec(class) {
        Ok(bytes) => content_hash(&bytes),
        Err(_) => class.hash.clone(),
    }
}

impl ProjectIndex {
    pub fn from_project(project: &Project) -> Self {
        Self {
            classes: project
                .project_classes()
                .map(|c| (c.name.clone(), fingerprint(c)))
                .collect(),
            namespaces: project.namespaces(),
            versions: project.versions().names(),
        }
    }

    /// Read an index; `None` when it is missing or unreadable.
    pub fn load(path: &Path) -> Option<Self> {
        let bytes = fs::read(path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(index) => Some(index),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring corrupt render index: {}", e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), BuildError> {
        let err = |source: std::io::Error| BuildError::Directory {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_vec_pretty(self).map_err(|e| err(std::io::Error::other(e)))?;
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(err)?;
        tmp.write_all(&json).map_err(err)?;
        tmp.persist(path).map_err(|e| err(e.error))?;
        Ok(())
    }

    pub fn fingerprint_of(&self, class: &str) -> Option<&str> {
        self.classes.get(class).map(String::as_str)
    }
}

/// The difference between the last rendered index and the current project.
#[derive(Debug, Clone)]
pub struct RenderDiff {
    current: ProjectIndex,
    previous: ProjectIndex,
    already_rendered: bool,
    path: PathBuf,
}

impl RenderDiff {
    pub fn new(project: &Project, build_dir: &Path) -> Self {
        let path = build_dir.join(INDEX_FILE);
        let loaded = ProjectIndex::load(&path);
        Self {
            current: ProjectIndex::from_project(project),
            already_rendered: loaded.is_some(),
            previous: loaded.unwrap_or_default(),
            path,
        }
    }

    /// A diff against nothing: every class counts as modified.
    pub fn unrendered(project: &Project, build_dir: &Path) -> Self {
        Self {
            current: ProjectIndex::from_project(project),
            already_rendered: false,
            previous: ProjectIndex::default(),
            path: build_dir.join(INDEX_FILE),
        }
    }

    /// Whether an index from an earlier render was found.
    pub fn is_already_rendered(&self) -> bool {
        self.already_rendered
    }

    pub fn versions_modified(&self) -> bool {
        self.current.versions != self.previous.versions
    }

    /// Classes that are new or whose fingerprint changed, sorted.
    pub fn modified_classes(&self) -> Vec<String> {
        self.current
            .classes
            .iter()
            .filter(|(name, print)| self.previous.fingerprint_of(name) != Some(print.as_str()))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn removed_classes(&self) -> Vec<String> {
        self.previous
            .classes
            .keys()
            .filter(|name| !self.current.classes.contains_key(*name))
            .cloned()
            .collect()
    }

    pub fn added_namespaces(&self) -> Vec<String> {
        difference(&self.current.namespaces, &self.previous.namespaces)
    }

    pub fn removed_namespaces(&self) -> Vec<String> {
        difference(&self.previous.namespaces, &self.current.namespaces)
    }

    /// Nothing to re-render.
    pub fn is_empty(&self) -> bool {
        !self.versions_modified()
            && self.modified_classes().is_empty()
            && self.removed_classes().is_empty()
    }

    /// Record the current state as rendered.
    pub fn save(&self) -> Result<(), BuildError> {
        self.current.save(&self.path)
    }
}

fn difference(a: &[String], b: &[String]) -> Vec<String> {
    let b: BTreeSet<&String> = b.iter().collect();
    a.iter().filter(|n| !b.contains(n)).cloned().collect()
}
