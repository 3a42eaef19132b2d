//! Versions of the documented source tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A named snapshot of the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    /// A frozen version is built once and then reused as is.
    #[serde(default)]
    pub frozen: bool,
}

impl Version {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            long_name: None,
            frozen: false,
        }
    }

    pub fn frozen(name: impl Into<String>) -> Self {
        Self {
            frozen: true,
            ..Self::new(name)
        }
    }

    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    /// The long name, or the name when none is set.
    pub fn display_name(&self) -> &str {
        self.long_name.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The versions to build, in build order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCollection {
    versions: Vec<Version>,
}

impl VersionCollection {
    pub fn new(versions: Vec<Version>) -> Result<Self, ConfigError> {
        if versions.is_empty() {
            return Err(ConfigError::NoVersions);
        }
        for (i, v) in versions.iter().enumerate() {
            if versions[..i].iter().any(|other| other.name == v.name) {
                return Err(ConfigError::DuplicateVersion(v.name.clone()));
            }
        }
        Ok(Self { versions })
    }

    /// A single non-frozen version.
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            versions: vec![Version::new(name)],
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Version> {
        self.versions.iter()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.versions.iter().map(|v| v.name.clone()).collect()
    }
}

impl Default for VersionCollection {
    fn default() -> Self {
        Self::single("main")
    }
}

impl<'a> IntoIterator for &'a VersionCollection {
    type Item = &'a Version;
    type IntoIter = std::slice::Iter<'a, Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Puts the source tree in the state of a version before it is parsed.
pub trait SourceSwitcher {
    fn switch(&mut self, version: &Version) -> Result<(), String>;
}

/// Leaves the working tree alone: every version is parsed from the files
/// currently on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentTree;

impl SourceSwitcher for CurrentTree {
    fn switch(&mut self, _version: &Version) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_rejected() {
        let err = VersionCollection::new(vec![Version::new("1.0"), Version::frozen("1.0")])
            .expect_err("duplicate");
        assert!(matches!(err, ConfigError::DuplicateVersion(name) if name == "1.0"));
    }

    #[test]
    fn display_name_falls_back() {
        assert_eq!(Version::new("main").display_name(), "main");
        assert_eq!(
            Version::new("1.x").with_long_name("1.x branch").display_name(),
            "1.x branch"
        );
    }
}
