//! The class registry.
//!
//! A [`Project`] owns every [`ClassInfo`] known for the active version,
//! keyed by fully-qualified name.  Cross references between classes are
//! names, resolved here on every access.  The namespace listings are
//! derived from the registry on demand and never stored.
//!
//! The project also knows the configured versions and where each version's
//! cache and build directories live, and implements version switching:
//! reloading the class set from the store, seeding a first build from the
//! previous version and skipping frozen versions that are already built.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::cache;
use crate::error::{BuildError, ConfigError};
use crate::inheritance;
use crate::store::Store;
use crate::types::{ClassInfo, ConstantInfo, MethodInfo, PropertyInfo};
use crate::version::{Version, VersionCollection};

/// Directory templates, each may contain `%version%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDirs {
    pub build_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl Default for ProjectDirs {
    fn default() -> Self {
        let base = std::env::temp_dir().join("phpantom-doc");
        Self {
            build_dir: base.join("build").join(cache::VERSION_PLACEHOLDER),
            cache_dir: base.join("cache").join(cache::VERSION_PLACEHOLDER),
        }
    }
}

/// Whether a version still has to go through the parse loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// A frozen version with a populated cache: reuse it as is.
    Reused,
    /// The version must be parsed.
    Parse,
}

#[derive(Debug, Default)]
pub struct Project {
    classes: BTreeMap<String, ClassInfo>,
    versions: VersionCollection,
    version: Option<Version>,
    dirs: ProjectDirs,
    /// Set when the store held records that could not be decoded.
    cache_degraded: bool,
}

impl Project {
    pub fn new(versions: VersionCollection, dirs: ProjectDirs) -> Result<Self, ConfigError> {
        if versions.len() > 1 {
            if !cache::has_placeholder(&dirs.build_dir) {
                return Err(ConfigError::MissingPlaceholder {
                    setting: "build_dir",
                });
            }
            if !cache::has_placeholder(&dirs.cache_dir) {
                return Err(ConfigError::MissingPlaceholder {
                    setting: "cache_dir",
                });
            }
        }
        Ok(Self {
            versions,
            dirs,
            ..Self::default()
        })
    }

    // ─── Registry ───────────────────────────────────────────────────────

    /// Look up a class by name, with or without a leading `\`.
    pub fn get_class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name.trim_start_matches('\\'))
    }

    pub fn get_class_mut(&mut self, name: &str) -> Option<&mut ClassInfo> {
        self.classes.get_mut(name.trim_start_matches('\\'))
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.get_class(name).is_some()
    }

    /// Register a class, replacing any previous entry of the same name.
    pub fn add_class(&mut self, class: ClassInfo) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn remove_class(&mut self, name: &str) -> Option<ClassInfo> {
        self.classes.remove(name.trim_start_matches('\\'))
    }

    /// Every known class, sorted by name.
    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    /// Classes that are documented (accepted by the filter), sorted by name.
    pub fn project_classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values().filter(|c| c.is_project_class)
    }

    pub fn class_names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Forget every class.
    pub fn clear(&mut self) {
        self.classes.clear();
    }

    /// Whether the store held undecodable records at the last read.
    pub fn is_cache_degraded(&self) -> bool {
        self.cache_degraded
    }

    // ─── Namespace listings ─────────────────────────────────────────────

    /// Every namespace of a project class plus all their ancestors,
    /// sorted.  The global namespace is `""`.
    pub fn namespaces(&self) -> Vec<String> {
        let mut set = BTreeSet::new();
        for class in self.project_classes() {
            let mut ns = class.namespace.as_str();
            set.insert(ns.to_string());
            while let Some((parent, _)) = ns.rsplit_once('\\') {
                set.insert(parent.to_string());
                ns = parent;
            }
        }
        set.into_iter().collect()
    }

    /// `false` when every class lives in the global namespace.
    pub fn has_namespaces(&self) -> bool {
        self.namespaces().iter().any(|ns| !ns.is_empty())
    }

    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces().iter().any(|ns| ns == namespace)
    }

    fn in_namespace<'s>(&'s self, namespace: &str) -> impl Iterator<Item = &'s ClassInfo> {
        self.project_classes().filter(move |c| c.namespace == namespace)
    }

    /// Plain classes (not interfaces, traits or exceptions) of `namespace`.
    pub fn namespace_classes(&self, namespace: &str) -> Vec<&ClassInfo> {
        self.in_namespace(namespace)
            .filter(|c| !c.is_interface() && !c.is_trait() && !self.is_exception(c))
            .collect()
    }

    pub fn namespace_interfaces(&self, namespace: &str) -> Vec<&ClassInfo> {
        self.in_namespace(namespace).filter(|c| c.is_interface()).collect()
    }

    pub fn namespace_traits(&self, namespace: &str) -> Vec<&ClassInfo> {
        self.in_namespace(namespace).filter(|c| c.is_trait()).collect()
    }

    pub fn namespace_exceptions(&self, namespace: &str) -> Vec<&ClassInfo> {
        self.in_namespace(namespace)
            .filter(|c| !c.is_interface() && !c.is_trait() && self.is_exception(c))
            .collect()
    }

    /// Every project class of `namespace`, sorted by name.
    pub fn namespace_all_classes(&self, namespace: &str) -> Vec<&ClassInfo> {
        self.in_namespace(namespace).collect()
    }

    pub fn is_exception(&self, class: &ClassInfo) -> bool {
        inheritance::is_exception(self, class)
    }

    // ─── Member views ───────────────────────────────────────────────────

    /// Methods of `name`; with `deep`, also inherited and trait methods.
    pub fn class_methods(&self, name: &str, deep: bool) -> IndexMap<String, &MethodInfo> {
        match self.get_class(name) {
            Some(class) => inheritance::class_methods(self, class, deep),
            None => IndexMap::new(),
        }
    }

    pub fn class_properties(&self, name: &str, deep: bool) -> IndexMap<String, &PropertyInfo> {
        match self.get_class(name) {
            Some(class) => inheritance::class_properties(self, class, deep),
            None => IndexMap::new(),
        }
    }

    pub fn class_constants(&self, name: &str, deep: bool) -> IndexMap<String, &ConstantInfo> {
        match self.get_class(name) {
            Some(class) => inheritance::class_constants(self, class, deep),
            None => IndexMap::new(),
        }
    }

    // ─── Versions and directories ───────────────────────────────────────

    pub fn versions(&self) -> &VersionCollection {
        &self.versions
    }

    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    fn active_name(&self) -> &str {
        self.version.as_ref().map_or("main", |v| v.name.as_str())
    }

    /// Cache directory of `version`, without touching the filesystem.
    pub fn cache_dir_for(&self, version: &Version) -> PathBuf {
        cache::expand(&self.dirs.cache_dir, &version.name)
    }

    pub fn build_dir_for(&self, version: &Version) -> PathBuf {
        cache::expand(&self.dirs.build_dir, &version.name)
    }

    /// The active version's build directory, created (or discarded when
    /// stale) as needed.
    pub fn build_dir(&self) -> Result<PathBuf, BuildError> {
        let version = self.active_name();
        let dir = cache::expand(&self.dirs.build_dir, version);
        cache::prepare_dir(&dir, version)?;
        Ok(dir)
    }

    /// Iterate the classes mutably, sorted by name.
    pub fn classes_mut(&mut self) -> impl Iterator<Item = &mut ClassInfo> {
        self.classes.values_mut()
    }

    /// Replace the class set with the store's records.
    pub fn read(&mut self, store: &dyn Store) -> Result<(), BuildError> {
        self.classes.clear();
        let snapshot = store.read_all()?;
        if snapshot.skipped > 0 {
            tracing::warn!(
                skipped = snapshot.skipped,
                "undecodable cache records, every file will be re-extracted"
            );
        }
        self.cache_degraded = snapshot.skipped > 0;
        for class in snapshot.classes {
            self.add_class(class);
        }
        Ok(())
    }

    /// Make `version` the active version with whatever its cache holds,
    /// without creating or discarding anything.  A missing or stale cache
    /// leaves the project empty.
    pub fn load_version(&mut self, version: &Version, store: &mut dyn Store) -> Result<(), BuildError> {
        self.version = Some(version.clone());
        self.classes.clear();
        self.cache_degraded = false;
        let dir = self.cache_dir_for(version);
        if !cache::is_current(&dir) {
            return Ok(());
        }
        store.switch_root(&dir)?;
        self.read(store)
    }

    /// Make `version` the active version.
    ///
    /// Its cache directory becomes the store root and the class set is
    /// reloaded from it.  A directory that had to be recreated also empties
    /// the store root.  A frozen version that already has classes is
    /// reused as is.  `force` discards the cache.  Otherwise an empty
    /// cache is seeded from `previous`.
    pub fn switch_version(
        &mut self,
        version: &Version,
        previous: Option<&Version>,
        store: &mut dyn Store,
        force: bool,
    ) -> Result<Activation, BuildError> {
        self.version = Some(version.clone());
        let dir = self.cache_dir_for(version);
        let fresh = cache::prepare_dir(&dir, &version.name)?;
        store.switch_root(&dir)?;
        if fresh {
            store.flush()?;
        }
        self.read(store)?;

        if version.frozen && !self.classes.is_empty() {
            tracing::info!(version = %version, "frozen version already built");
            return Ok(Activation::Reused);
        }

        if force {
            tracing::debug!(version = %version, "discarding cache");
            store.flush()?;
            self.classes.clear();
            self.cache_degraded = false;
            return Ok(Activation::Parse);
        }

        if let Some(previous) = previous.filter(|_| self.classes.is_empty()) {
            let from = self.cache_dir_for(previous);
            if from != dir {
                tracing::debug!(version = %version, from = %previous, "seeding cache");
                store.seed_from(&from)?;
                self.read(store)?;
            }
        }
        Ok(Activation::Parse)
    }

    /// The directory templates.
    pub fn dirs(&self) -> &ProjectDirs {
        &self.dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClassKind;

    fn class(name: &str, kind: ClassKind) -> ClassInfo {
        let mut c = ClassInfo::new(name, kind, 1);
        c.namespace = crate::util::namespace_of(name).to_string();
        c
    }

    #[test]
    fn namespaces_include_ancestors() {
        let mut project = Project::default();
        project.add_class(class("Vendor\\Pkg\\Sub\\A", ClassKind::Class));
        project.add_class(class("Other\\B", ClassKind::Interface));
        assert_eq!(
            project.namespaces(),
            vec!["Other", "Vendor", "Vendor\\Pkg", "Vendor\\Pkg\\Sub"]
        );
        assert!(project.has_namespaces());
    }

    #[test]
    fn global_namespace_only() {
        let mut project = Project::default();
        project.add_class(class("A", ClassKind::Class));
        assert_eq!(project.namespaces(), vec![String::new()]);
        assert!(!project.has_namespaces());
    }

    #[test]
    fn lookups_ignore_leading_backslash() {
        let mut project = Project::default();
        project.add_class(class("Foo\\Bar", ClassKind::Class));
        assert!(project.get_class("\\Foo\\Bar").is_some());
        assert!(project.remove_class("\\Foo\\Bar").is_some());
        assert!(project.is_empty());
    }

    #[test]
    fn multi_version_requires_placeholders() {
        let versions = VersionCollection::new(vec![Version::new("1.0"), Version::new("2.0")])
            .expect("versions");
        let dirs = ProjectDirs {
            build_dir: PathBuf::from("/tmp/build"),
            cache_dir: PathBuf::from("/tmp/cache/%version%"),
        };
        let err = Project::new(versions, dirs).expect_err("missing placeholder");
        assert!(matches!(
            err,
            ConfigError::MissingPlaceholder {
                setting: "build_dir"
            }
        ));
    }
}
