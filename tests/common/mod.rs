#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use phpantom_doc::DocBuilder;
use phpantom_doc::error::StoreError;
use phpantom_doc::files::FileSource;
use phpantom_doc::message::{Message, Progress, ProgressError};
use phpantom_doc::parser::filter::DefaultFilter;
use phpantom_doc::parser::{FileOutcome, extract_file};
use phpantom_doc::project::{Project, ProjectDirs};
use phpantom_doc::store::{MemoryStore, Store, StoreSnapshot};
use phpantom_doc::types::ClassInfo;
use phpantom_doc::version::VersionCollection;

/// Extract one file's classes with the default filter.
pub fn parse_php(php: &str) -> FileOutcome {
    extract_file(php, "test.php", "test-hash", &DefaultFilter)
}

/// Extract one file and return the class named `name`.
pub fn parse_class(php: &str, name: &str) -> ClassInfo {
    parse_php(php)
        .classes
        .into_iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("class {name} not extracted"))
}

/// A temp directory holding PHP sources under `src/` and the per-version
/// cache and build directories next to them.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        fs::create_dir_all(dir.path().join("src")).expect("failed to create src dir");
        Self { dir }
    }

    /// Create a workspace with the given `(relative path, content)` files.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let workspace = Self::new();
        for (rel_path, content) in files {
            workspace.write(rel_path, content);
        }
        workspace
    }

    pub fn src(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    pub fn write(&self, rel_path: &str, content: &str) {
        let full = self.src().join(rel_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        fs::write(&full, content).expect("failed to write PHP file");
    }

    pub fn remove(&self, rel_path: &str) {
        fs::remove_file(self.src().join(rel_path)).expect("failed to remove PHP file");
    }

    pub fn dirs(&self) -> ProjectDirs {
        ProjectDirs {
            build_dir: self.dir.path().join("build").join("%version%"),
            cache_dir: self.dir.path().join("cache").join("%version%"),
        }
    }

    pub fn cache_dir(&self, version: &str) -> PathBuf {
        self.dir.path().join("cache").join(version)
    }

    pub fn build_dir(&self, version: &str) -> PathBuf {
        self.dir.path().join("build").join(version)
    }

    pub fn project(&self, versions: VersionCollection) -> Project {
        Project::new(versions, self.dirs()).expect("valid project")
    }

    /// A single-version builder over `src/` with an in-memory store.
    pub fn builder(&self) -> DocBuilder {
        self.builder_with(VersionCollection::default(), Box::new(MemoryStore::new()))
    }

    pub fn builder_with(&self, versions: VersionCollection, store: Box<dyn Store>) -> DocBuilder {
        DocBuilder::new(
            self.project(versions),
            store,
            FileSource::directory(self.src()),
        )
    }
}

/// Wraps a [`MemoryStore`] and counts the calls the tests care about.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    pub removes: Rc<Cell<usize>>,
    pub writes: Rc<Cell<usize>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for CountingStore {
    fn read_class(&self, name: &str) -> Result<ClassInfo, StoreError> {
        self.inner.read_class(name)
    }

    fn write_class(&mut self, class: &ClassInfo) -> Result<(), StoreError> {
        self.writes.set(self.writes.get() + 1);
        self.inner.write_class(class)
    }

    fn remove_class(&mut self, name: &str) -> Result<(), StoreError> {
        self.removes.set(self.removes.get() + 1);
        self.inner.remove_class(name)
    }

    fn read_all(&self) -> Result<StoreSnapshot, StoreError> {
        self.inner.read_all()
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.inner.flush()
    }

    fn switch_root(&mut self, root: &Path) -> Result<(), StoreError> {
        self.inner.switch_root(root)
    }

    fn seed_from(&mut self, previous: &Path) -> Result<(), StoreError> {
        self.inner.seed_from(previous)
    }
}

/// Progress sink that keeps a printable line per notification.
#[derive(Default, Clone)]
pub struct Recorder {
    pub lines: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Lines starting with `prefix`.
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|l| l.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl Progress for Recorder {
    fn notify(&mut self, message: Message<'_>) -> Result<(), ProgressError> {
        let line = match message {
            Message::SwitchVersion(version) => format!("switch {version}"),
            Message::ParseClass { percent, class } => format!("parse {class} {percent}"),
            Message::ParseErrors { file, errors } => {
                format!("errors {} {}", file, errors.len())
            }
            Message::ClassVisited { class, modified } => format!("visited {class} {modified}"),
            Message::ParseVersionFinished {
                version,
                modified,
                removed,
                errors,
            } => format!("finished {version} {modified} {removed} {errors}"),
        };
        self.lines.borrow_mut().push(line);
        Ok(())
    }
}
