//! Per-version cache and build directories.
//!
//! Each directory carries two marker files: `PHPANTOM_DOC_VERSION`, the
//! version of the tool that produced it, and `PROJECT_VERSION`, the name of
//! the version it belongs to.  A directory without a matching tool marker
//! is discarded wholesale.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::BuildError;

pub const TOOL_MARKER: &str = "PHPANTOM_DOC_VERSION";
pub const PROJECT_MARKER: &str = "PROJECT_VERSION";
pub const VERSION_PLACEHOLDER: &str = "%version%";

/// The version string written into [`TOOL_MARKER`].
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Replace every `%version%` in `template` with `version`.
pub fn expand(template: &Path, version: &str) -> PathBuf {
    PathBuf::from(
        template
            .to_string_lossy()
            .replace(VERSION_PLACEHOLDER, version),
    )
}

/// Whether `template` contains the `%version%` placeholder.
pub fn has_placeholder(template: &Path) -> bool {
    template.to_string_lossy().contains(VERSION_PLACEHOLDER)
}

/// Whether `dir` was written by this tool version.
pub fn is_current(dir: &Path) -> bool {
    fs::read_to_string(dir.join(TOOL_MARKER))
        .is_ok_and(|marker| marker.trim() == TOOL_VERSION)
}

/// Make `dir` usable for `version`.
///
/// Returns `true` when the directory was (re)created empty, either because
/// it did not exist or because it was written by another tool version.
pub fn prepare_dir(dir: &Path, version: &str) -> Result<bool, BuildError> {
    if is_current(dir) {
        return Ok(false);
    }
    if dir.exists() {
        tracing::debug!(dir = %dir.display(), "discarding directory written by another tool version");
    }
    flush_dir(dir, version)?;
    Ok(true)
}

/// Empty `dir` and write fresh markers.
pub fn flush_dir(dir: &Path, version: &str) -> Result<(), BuildError> {
    let err = |source: std::io::Error| BuildError::Directory {
        path: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(err)?;
    }
    fs::create_dir_all(dir).map_err(err)?;
    fs::write(dir.join(TOOL_MARKER), TOOL_VERSION).map_err(err)?;
    fs::write(dir.join(PROJECT_MARKER), version).map_err(err)?;
    Ok(())
}

/// Copy the contents of `from` into `to`, recursively.  Marker files are
/// left alone so `to` keeps describing its own version.
pub fn mirror_dir(from: &Path, to: &Path) -> Result<(), BuildError> {
    let err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| BuildError::Directory { path, source }
    };
    if !from.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(to).map_err(err(to))?;
    for entry in fs::read_dir(from).map_err(err(from))? {
        let entry = entry.map_err(err(from))?;
        let name = entry.file_name();
        if name == TOOL_MARKER || name == PROJECT_MARKER {
            continue;
        }
        let source = entry.path();
        let target = to.join(&name);
        if source.is_dir() {
            mirror_dir(&source, &target)?;
        } else {
            fs::copy(&source, &target).map_err(err(&target))?;
        }
    }
    Ok(())
}
