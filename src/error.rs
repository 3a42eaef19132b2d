//! Fatal error types.
//!
//! Only failures that abort a run are Rust errors.  Syntax errors, broken
//! doc comments and `@param` mismatches are diagnostics: plain strings
//! collected on the entity, the per-file context and the
//! [`Transaction`](crate::transaction::Transaction).

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or incomplete configuration.  Always raised before any file is
/// processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(
        "the {setting} setting must contain the %version% placeholder when more than one version is configured"
    )]
    MissingPlaceholder { setting: &'static str },

    #[error("no source configured: set either `source` or `files`")]
    NoSource,

    #[error("`source` and `files` are mutually exclusive")]
    AmbiguousSource,

    #[error("at least one version must be configured")]
    NoVersions,

    #[error("version {0:?} is configured more than once")]
    DuplicateVersion(String),

    #[error("cannot determine the user cache directory: {0}")]
    NoCacheDir(String),

    #[error("examples directory {} does not exist", .0.display())]
    MissingExamplesDir(PathBuf),
}

/// Storage failures.
///
/// `NotFound` and `Corrupt` are cache misses: callers fall back to
/// re-extraction.  `Inaccessible` means the storage root itself is
/// unusable and is fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("class {0} is not in the store")]
    NotFound(String),

    #[error("corrupt store record {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store root {path} is not accessible: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Whether the error only invalidates a single record.
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::Corrupt { .. })
    }
}

/// Errors that terminate a build run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("progress callback failed: {0}")]
    Progress(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("rendering failed: {0}")]
    Render(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("cannot switch to version {version}: {message}")]
    Switch { version: String, message: String },

    #[error("cannot prepare directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot list source files under {path}: {message}")]
    Files { path: PathBuf, message: String },
}

/// Format a diagnostic in the shape used across the run summary.
pub fn diagnostic(entity: &str, line: usize, message: &str) -> String {
    format!(
        "An error occurred while parsing \"{}\" line \"{}\": {}",
        entity, line, message
    )
}
