//! Incremental API documentation builder for PHP code bases.
//!
//! The pipeline parses the configured source files into a class model,
//! merges doc comments into it, links classes together (inherited
//! documentation, `@method`/`@property` members, source links) and keeps
//! the result in a per-version cache.  Later runs only re-extract files
//! whose content changed and report which classes were modified or removed,
//! so a renderer only has to redo the affected pages.
//!
//! [`DocBuilder`] wires the pieces together:
//!
//! ```no_run
//! use phpantom_doc::{DocBuilder, config::Config, message::Silent};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(std::path::Path::new("phpantom-doc.toml"))?;
//! let mut builder = DocBuilder::from_config(&config)?;
//! for report in builder.parse(&mut Silent, false)? {
//!     println!("{}: {} modified", report.version, report.modified.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod diff;
pub mod docblock;
pub mod error;
pub mod files;
pub mod indexer;
pub mod inheritance;
pub mod message;
pub mod parser;
pub mod project;
pub mod remote;
pub mod resolution;
pub mod store;
pub mod transaction;
pub mod types;
pub mod util;
pub mod version;
pub mod visitors;

use std::path::Path;

use crate::config::Config;
use crate::diff::RenderDiff;
use crate::error::BuildError;
use crate::files::FileSource;
use crate::indexer::Indexer;
use crate::message::{Message, Progress, ProgressError};
use crate::parser::filter::{DefaultFilter, Filter};
use crate::project::{Activation, Project};
use crate::store::{JsonStore, Store};
use crate::version::{CurrentTree, SourceSwitcher, Version};
use crate::visitors::ClassTraverser;

// ─── Re-exports ─────────────────────────────────────────────────────────────

pub use crate::error::{ConfigError, StoreError};
pub use crate::transaction::Transaction;

/// Turns a project into output files.
pub trait Renderer {
    /// Render what `diff` reports as out of date into `build_dir`.
    fn render(
        &mut self,
        project: &Project,
        diff: &RenderDiff,
        build_dir: &Path,
    ) -> Result<(), ProgressError>;
}

/// What one version's build did.
#[derive(Debug, Clone)]
pub struct VersionReport {
    pub version: Version,
    /// A frozen version whose cache was reused as is.
    pub reused: bool,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
    pub errors: Vec<String>,
    /// Set by [`DocBuilder::update`].
    pub diff: Option<RenderDiff>,
}

impl VersionReport {
    fn reused(version: &Version) -> Self {
        Self {
            version: version.clone(),
            reused: true,
            modified: Vec::new(),
            removed: Vec::new(),
            errors: Vec::new(),
            diff: None,
        }
    }

    fn from_transaction(version: &Version, tx: &Transaction) -> Self {
        Self {
            version: version.clone(),
            reused: false,
            modified: tx.modified_classes().map(str::to_string).collect(),
            removed: tx.removed_classes(),
            errors: tx.errors().to_vec(),
            diff: None,
        }
    }
}

/// The composition root: a project, its store, the source files and the
/// collaborators used to build every version.
pub struct DocBuilder {
    project: Project,
    store: Box<dyn Store>,
    files: FileSource,
    filter: Box<dyn Filter>,
    traverser: ClassTraverser,
    switcher: Box<dyn SourceSwitcher>,
    renderer: Option<Box<dyn Renderer>>,
}

impl DocBuilder {
    /// A builder with the default filter, the standard visitors, no remote
    /// repository and no source switching.
    pub fn new(project: Project, store: Box<dyn Store>, files: FileSource) -> Self {
        Self {
            project,
            store,
            files,
            filter: Box::new(DefaultFilter),
            traverser: ClassTraverser::standard(None, None),
            switcher: Box::new(CurrentTree),
            renderer: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        let project = config.project()?;
        let files = config.file_source()?;
        let mut builder = Self::new(project, Box::new(JsonStore::new()), files);
        builder.filter = config.filter.build();
        builder.traverser = ClassTraverser::standard(config.remote.clone(), config.examples_dir()?);
        Ok(builder)
    }

    pub fn with_filter(mut self, filter: Box<dyn Filter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_traverser(mut self, traverser: ClassTraverser) -> Self {
        self.traverser = traverser;
        self
    }

    pub fn with_switcher(mut self, switcher: Box<dyn SourceSwitcher>) -> Self {
        self.switcher = switcher;
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Build the class model of every version, in order.
    pub fn parse(
        &mut self,
        progress: &mut dyn Progress,
        force: bool,
    ) -> Result<Vec<VersionReport>, BuildError> {
        let versions: Vec<Version> = self.project.versions().iter().cloned().collect();
        let mut reports = Vec::with_capacity(versions.len());
        let mut previous: Option<&Version> = None;
        for version in &versions {
            reports.push(self.parse_version(version, previous, progress, force)?);
            previous = Some(version);
        }
        Ok(reports)
    }

    /// Build and render every version, in order.
    pub fn update(
        &mut self,
        progress: &mut dyn Progress,
        force: bool,
    ) -> Result<Vec<VersionReport>, BuildError> {
        let versions: Vec<Version> = self.project.versions().iter().cloned().collect();
        let mut reports = Vec::with_capacity(versions.len());
        let mut previous: Option<&Version> = None;
        for version in &versions {
            let mut report = self.parse_version(version, previous, progress, force)?;
            report.diff = Some(self.render_version(version, previous, force)?);
            reports.push(report);
            previous = Some(version);
        }
        Ok(reports)
    }

    /// What each version would re-render, compared with its last render,
    /// going by the classes already in its cache.  No directory is created
    /// or discarded and nothing is parsed or rendered.
    pub fn pending(&mut self) -> Result<Vec<(Version, RenderDiff)>, BuildError> {
        let versions: Vec<Version> = self.project.versions().iter().cloned().collect();
        let mut out = Vec::with_capacity(versions.len());
        for version in versions {
            self.project.load_version(&version, self.store.as_mut())?;
            let dir = self.project.build_dir_for(&version);
            let diff = if cache::is_current(&dir) {
                RenderDiff::new(&self.project, &dir)
            } else {
                RenderDiff::unrendered(&self.project, &dir)
            };
            out.push((version, diff));
        }
        Ok(out)
    }

    fn parse_version(
        &mut self,
        version: &Version,
        previous: Option<&Version>,
        progress: &mut dyn Progress,
        force: bool,
    ) -> Result<VersionReport, BuildError> {
        progress
            .notify(Message::SwitchVersion(version))
            .map_err(BuildError::Progress)?;
        self.switcher
            .switch(version)
            .map_err(|message| BuildError::Switch {
                version: version.name.clone(),
                message,
            })?;

        let activation = self
            .project
            .switch_version(version, previous, self.store.as_mut(), force)?;

        let report = match activation {
            Activation::Reused => VersionReport::reused(version),
            Activation::Parse => {
                let indexer = Indexer::new(&self.files, self.filter.as_ref(), &self.traverser);
                let tx = indexer.parse(&mut self.project, self.store.as_mut(), progress)?;
                VersionReport::from_transaction(version, &tx)
            }
        };

        progress
            .notify(Message::ParseVersionFinished {
                version,
                modified: report.modified.len(),
                removed: report.removed.len(),
                errors: report.errors.len(),
            })
            .map_err(BuildError::Progress)?;
        tracing::info!(
            version = %version,
            classes = self.project.len(),
            modified = report.modified.len(),
            removed = report.removed.len(),
            errors = report.errors.len(),
            "version parsed"
        );
        Ok(report)
    }

    /// Compute what changed since the last render of `version` and hand it
    /// to the renderer.  A first render is seeded with the previous
    /// version's output.
    fn render_version(
        &mut self,
        version: &Version,
        previous: Option<&Version>,
        force: bool,
    ) -> Result<RenderDiff, BuildError> {
        let dir = self.project.build_dir()?;
        let rendered = dir.join(diff::INDEX_FILE).exists();
        let frozen = version.frozen && rendered;

        if force && !frozen {
            cache::flush_dir(&dir, &version.name)?;
        }
        if let Some(previous) = previous {
            let from = self.project.build_dir_for(previous);
            if !dir.join(diff::INDEX_FILE).exists() && from != dir {
                tracing::debug!(from = %from.display(), "seeding build directory");
                cache::mirror_dir(&from, &dir)?;
            }
        }

        let diff = RenderDiff::new(&self.project, &dir);
        if frozen || (diff.is_empty() && diff.is_already_rendered()) {
            return Ok(diff);
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer
                .render(&self.project, &diff, &dir)
                .map_err(BuildError::Render)?;
        }
        diff.save()?;
        Ok(diff)
    }
}
