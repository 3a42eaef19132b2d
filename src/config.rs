//! Configuration file.
//!
//! ```toml
//! title = "My Library"
//! source = "src"
//! build_dir = "build/%version%"
//! cache_dir = "cache/%version%"
//! filter = "default"
//!
//! [[versions]]
//! name = "v1.0"
//! frozen = true
//!
//! [[versions]]
//! name = "main"
//!
//! [remote]
//! kind = "github"
//! name = "acme/library"
//! local_path = "/home/dev/library"
//!
//! # directory `@example` paths are read from
//! # examples_dir = "doc/examples"
//! ```
//!
//! Relative paths are resolved against the directory of the configuration
//! file.  Without `build_dir`/`cache_dir` the user cache directory is used.

use std::path::{Path, PathBuf};

use etcetera::BaseStrategy;
use serde::Deserialize;

use crate::cache::VERSION_PLACEHOLDER;
use crate::error::ConfigError;
use crate::files::FileSource;
use crate::parser::filter::FilterKind;
use crate::project::{Project, ProjectDirs};
use crate::remote::RemoteRepository;
use crate::version::{Version, VersionCollection};

fn default_extensions() -> Vec<String> {
    vec!["php".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub title: Option<String>,
    /// Directory mode.
    #[serde(default)]
    pub source: Option<PathBuf>,
    /// Explicit-list mode.
    #[serde(default)]
    pub files: Option<Vec<PathBuf>>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub build_dir: Option<PathBuf>,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub filter: FilterKind,
    #[serde(default)]
    pub versions: Vec<Version>,
    #[serde(default)]
    pub remote: Option<RemoteRepository>,
    /// Base directory of the files named by `@example` tags.
    #[serde(default)]
    pub examples_dir: Option<PathBuf>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::parse(&text, path, base_dir)
    }

    /// Parse configuration text.  `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path, base_dir: PathBuf) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = base_dir;
        Ok(config)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn file_source(&self) -> Result<FileSource, ConfigError> {
        match (&self.source, &self.files) {
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousSource),
            (None, None) => Err(ConfigError::NoSource),
            (Some(root), None) => Ok(FileSource::Directory {
                root: self.resolve(root),
                extensions: self.extensions.clone(),
            }),
            (None, Some(files)) => Ok(FileSource::List(
                files.iter().map(|f| self.resolve(f)).collect(),
            )),
        }
    }

    /// The configured versions, or a single `main` version.
    pub fn version_collection(&self) -> Result<VersionCollection, ConfigError> {
        if self.versions.is_empty() {
            return Ok(VersionCollection::default());
        }
        VersionCollection::new(self.versions.clone())
    }

    pub fn dirs(&self) -> Result<ProjectDirs, ConfigError> {
        let (build_dir, cache_dir) = match (&self.build_dir, &self.cache_dir) {
            (Some(build), Some(cache)) => (self.resolve(build), self.resolve(cache)),
            (build, cache) => {
                let base = user_cache_dir()?;
                (
                    build
                        .as_deref()
                        .map(|b| self.resolve(b))
                        .unwrap_or_else(|| base.join("build").join(VERSION_PLACEHOLDER)),
                    cache
                        .as_deref()
                        .map(|c| self.resolve(c))
                        .unwrap_or_else(|| base.join("cache").join(VERSION_PLACEHOLDER)),
                )
            }
        };
        Ok(ProjectDirs {
            build_dir,
            cache_dir,
        })
    }

    /// The resolved examples directory, which must exist when configured.
    pub fn examples_dir(&self) -> Result<Option<PathBuf>, ConfigError> {
        let Some(dir) = &self.examples_dir else {
            return Ok(None);
        };
        let dir = self.resolve(dir);
        if !dir.is_dir() {
            return Err(ConfigError::MissingExamplesDir(dir));
        }
        Ok(Some(dir))
    }

    /// An empty project for the configured versions and directories.
    pub fn project(&self) -> Result<Project, ConfigError> {
        Project::new(self.version_collection()?, self.dirs()?)
    }
}

fn user_cache_dir() -> Result<PathBuf, ConfigError> {
    let strategy =
        etcetera::choose_base_strategy().map_err(|e| ConfigError::NoCacheDir(e.to_string()))?;
    Ok(strategy.cache_dir().join("phpantom-doc"))
}
