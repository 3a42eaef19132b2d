//! Source file enumeration.
//!
//! Two modes: walk one directory (gitignore-aware, via the `ignore` crate)
//! or take an explicit list.  Either way the result is sorted so that runs
//! do not depend on filesystem iteration order.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::BuildError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Every file under `root` whose extension is in `extensions`.
    Directory {
        root: PathBuf,
        extensions: Vec<String>,
    },
    /// Exactly these files.
    List(Vec<PathBuf>),
}

impl FileSource {
    pub fn directory(root: impl Into<PathBuf>) -> Self {
        FileSource::Directory {
            root: root.into(),
            extensions: vec!["php".to_string()],
        }
    }

    /// List candidate files in deterministic order.
    pub fn files(&self) -> Result<Vec<PathBuf>, BuildError> {
        let mut files = match self {
            FileSource::Directory { root, extensions } => walk(root, extensions)?,
            FileSource::List(files) => files.clone(),
        };
        files.sort();
        files.dedup();
        Ok(files)
    }

    /// The directory the files are taken from, if there is one.
    pub fn root(&self) -> Option<&Path> {
        match self {
            FileSource::Directory { root, .. } => Some(root),
            FileSource::List(_) => None,
        }
    }
}

fn walk(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, BuildError> {
    if !root.is_dir() {
        return Err(BuildError::Files {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .follow_links(false)
        .threads(1)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("error walking {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)));
        if matches {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_mode_filters_and_sorts() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        std::fs::create_dir_all(dir.path().join("sub")).expect("mkdir");
        std::fs::write(dir.path().join("b.php"), "<?php").expect("write");
        std::fs::write(dir.path().join("sub/a.php"), "<?php").expect("write");
        std::fs::write(dir.path().join("notes.txt"), "x").expect("write");

        let files = FileSource::directory(dir.path()).files().expect("list");
        assert_eq!(
            files,
            vec![dir.path().join("b.php"), dir.path().join("sub/a.php")]
        );
    }

    #[test]
    fn list_mode_is_deduplicated() {
        let source = FileSource::List(vec!["b.php".into(), "a.php".into(), "b.php".into()]);
        assert_eq!(
            source.files().expect("list"),
            vec![PathBuf::from("a.php"), PathBuf::from("b.php")]
        );
    }
}
