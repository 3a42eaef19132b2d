//! The incremental build loop.
//!
//! One run goes through three phases:
//!
//!   1. **File loop**: hash every candidate file; files whose hash is
//!      already known are skipped, the others are extracted, and each
//!      extracted class is registered and written to the store.  A class
//!      already declared by a file seen earlier in the run is reported and
//!      skipped.
//!   2. **Cleanup**: classes whose hash was not seen during the loop are
//!      removed from the project and the store.
//!   3. **Visitor pass**: the [`ClassTraverser`] enriches the classes that
//!      need it and every class it changes is written again.
//!
//! The returned [`Transaction`] reports what changed.

use std::collections::BTreeSet;
use std::fs;

use crate::error::{BuildError, diagnostic};
use crate::files::FileSource;
use crate::message::{Message, Progress};
use crate::parser::extract_file;
use crate::parser::filter::Filter;
use crate::project::Project;
use crate::store::Store;
use crate::transaction::Transaction;
use crate::util::content_hash;
use crate::visitors::ClassTraverser;

pub struct Indexer<'a> {
    files: &'a FileSource,
    filter: &'a dyn Filter,
    traverser: &'a ClassTraverser,
}

impl<'a> Indexer<'a> {
    pub fn new(files: &'a FileSource, filter: &'a dyn Filter, traverser: &'a ClassTraverser) -> Self {
        Self {
            files,
            filter,
            traverser,
        }
    }

    /// Bring `project` and `store` up to date with the source files.
    pub fn parse(
        &self,
        project: &mut Project,
        store: &mut dyn Store,
        progress: &mut dyn Progress,
    ) -> Result<Transaction, BuildError> {
        let mut tx = Transaction::from_project(project);

        self.file_loop(project, store, progress, &mut tx)?;
        self.cleanup(project, store, &tx)?;

        tracing::debug!("visitor pass");
        for name in self.traverser.traverse(project, progress)? {
            if let Some(class) = project.get_class(&name) {
                store.write_class(class)?;
            }
            tx.mark_modified(&name);
        }

        Ok(tx)
    }

    fn file_loop(
        &self,
        project: &mut Project,
        store: &mut dyn Store,
        progress: &mut dyn Progress,
        tx: &mut Transaction,
    ) -> Result<(), BuildError> {
        let files = self.files.files()?;
        let total = files.len().max(1) as f64;
        // Undecodable records left holes in the project: re-extract everything.
        let skip_known = !project.is_cache_degraded();
        tracing::debug!(files = files.len(), skip_known, "file loop");

        for (step, path) in files.iter().enumerate() {
            let file = path.to_string_lossy();
            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(file = %file, "cannot read source file: {}", e);
                    let errors = vec![diagnostic(&file, 0, &format!("cannot read file: {}", e))];
                    notify(progress, Message::ParseErrors {
                        file: &file,
                        errors: &errors,
                    })?;
                    tx.add_errors(errors);
                    tx.keep_file(&file);
                    continue;
                }
            };

            let hash = content_hash(&bytes);
            if skip_known && tx.has_hash(&hash) {
                continue;
            }

            let content = String::from_utf8_lossy(&bytes);
            let outcome = extract_file(&content, &file, &hash, self.filter);

            let mut errors = outcome.errors;
            let mut classes = Vec::with_capacity(outcome.classes.len());
            for class in outcome.classes {
                match tx.declared_elsewhere(&class) {
                    Some(other) => errors.push(diagnostic(
                        &class.name,
                        class.line,
                        &format!("class already declared in \"{}\"", other),
                    )),
                    None => classes.push(class),
                }
            }

            if !errors.is_empty() {
                notify(progress, Message::ParseErrors {
                    file: &file,
                    errors: &errors,
                })?;
                tx.add_errors(errors);
            }
            if outcome.syntax_error {
                tx.keep_file(&file);
                continue;
            }

            let percent = ((step + 1) as f64 / total * 100.0).floor();
            for class in classes {
                notify(progress, Message::ParseClass {
                    percent,
                    class: &class.name,
                })?;
                tx.add_class(&class);
                store.write_class(&class)?;
                project.add_class(class);
            }
        }
        Ok(())
    }

    fn cleanup(
        &self,
        project: &mut Project,
        store: &mut dyn Store,
        tx: &Transaction,
    ) -> Result<(), BuildError> {
        let removed: BTreeSet<String> = tx.removed_classes().into_iter().collect();
        tracing::debug!(removed = removed.len(), "cleanup");
        if removed.is_empty() {
            return Ok(());
        }

        for name in &removed {
            project.remove_class(name);
            match store.remove_class(name) {
                Ok(()) => {}
                Err(e) if e.is_cache_miss() => {
                    tracing::warn!(class = %name, "cannot remove cache record: {}", e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        // Whatever was copied down from a removed ancestor must be redone.
        for class in project.classes_mut() {
            if class
                .ancestry()
                .chain(class.traits.iter().map(String::as_str))
                .any(|dep| removed.contains(dep.trim_start_matches('\\')))
            {
                class.from_cache = false;
            }
        }
        Ok(())
    }
}

fn notify(progress: &mut dyn Progress, message: Message<'_>) -> Result<(), BuildError> {
    progress.notify(message).map_err(BuildError::Progress)
}
