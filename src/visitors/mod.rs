//! Cross-class enrichment.
//!
//! Some documentation can only be completed once every class is known:
//! inherited descriptions, members declared through `@method` and
//! `@property` tags, links to the hosted source.  A [`ClassTraverser`]
//! runs its [`ClassVisitor`]s over the project so that parents and
//! interfaces are always visited before the classes that depend on them.
//!
//! # Submodules
//!
//! - [`inheritdoc`]: copies documentation down from overridden methods.
//! - [`method_tags`]: synthesizes methods from `@method` tags.
//! - [`property_tags`]: synthesizes properties from `@property` tags.
//! - [`view_source`]: records the path relative to the remote repository.
//! - [`example`]: loads the files named by `@example` tags.

mod example;
mod inheritdoc;
mod method_tags;
mod property_tags;
mod view_source;

use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;

use crate::error::BuildError;
use crate::inheritance;
use crate::message::{Message, Progress};
use crate::project::Project;
use crate::remote::RemoteRepository;
use crate::types::ClassInfo;

pub use example::ExampleVisitor;
pub use inheritdoc::InheritdocVisitor;
pub use method_tags::MethodTagVisitor;
pub use property_tags::PropertyTagVisitor;
pub use view_source::ViewSourceVisitor;

pub trait ClassVisitor {
    /// Enrich `class` and report whether anything changed.  The class has
    /// been taken out of `project` for the duration of the call.
    fn visit(&self, class: &mut ClassInfo, project: &Project) -> bool;
}

/// Runs visitors over every project class in dependency order.
#[derive(Default)]
pub struct ClassTraverser {
    visitors: Vec<Box<dyn ClassVisitor>>,
}

impl ClassTraverser {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard pipeline: inherited docs, `@method` and `@property`,
    /// plus source links and examples when configured.
    pub fn standard(remote: Option<RemoteRepository>, examples_dir: Option<PathBuf>) -> Self {
        let mut traverser = Self::new();
        traverser.add_visitor(Box::new(InheritdocVisitor));
        traverser.add_visitor(Box::new(MethodTagVisitor));
        traverser.add_visitor(Box::new(PropertyTagVisitor));
        if let Some(remote) = remote {
            traverser.add_visitor(Box::new(ViewSourceVisitor::new(remote)));
        }
        if let Some(dir) = examples_dir {
            traverser.add_visitor(Box::new(ExampleVisitor::new(dir)));
        }
        traverser
    }

    pub fn add_visitor(&mut self, visitor: Box<dyn ClassVisitor>) {
        self.visitors.push(visitor);
    }

    /// Visit the project classes and return the names of those that
    /// changed, in visit order.
    ///
    /// A class waits at the back of the queue while its parent or one of
    /// its interfaces is still queued.  Classes loaded from the store whose
    /// whole ancestry was loaded from the store as well are skipped.
    pub fn traverse(
        &self,
        project: &mut Project,
        progress: &mut dyn Progress,
    ) -> Result<Vec<String>, BuildError> {
        let mut queue: VecDeque<String> =
            project.project_classes().map(|c| c.name.clone()).collect();
        let mut pending: BTreeSet<String> = queue.iter().cloned().collect();
        let mut modified = Vec::new();
        let mut requeued = 0usize;

        while let Some(name) = queue.pop_front() {
            let blocked = project.get_class(&name).is_some_and(|class| {
                class.ancestry().any(|dep| {
                    let dep = dep.trim_start_matches('\\');
                    dep != name && pending.contains(dep)
                })
            });

            if blocked {
                if requeued <= queue.len() {
                    queue.push_back(name);
                    requeued += 1;
                    continue;
                }
                tracing::warn!(class = %name, "inheritance cycle, visiting out of order");
            }
            requeued = 0;
            pending.remove(&name);

            if self.visit_one(&name, project, progress)? {
                modified.push(name);
            }
        }

        tracing::debug!(modified = modified.len(), "visitor pass done");
        Ok(modified)
    }

    fn visit_one(
        &self,
        name: &str,
        project: &mut Project,
        progress: &mut dyn Progress,
    ) -> Result<bool, BuildError> {
        let stale = match project.get_class(name) {
            Some(class) => !class.from_cache || ancestry_changed(project, class),
            None => return Ok(false),
        };
        if !stale {
            return Ok(false);
        }

        let Some(mut class) = project.remove_class(name) else {
            return Ok(false);
        };
        let mut modified = false;
        for visitor in &self.visitors {
            modified = visitor.visit(&mut class, project) || modified;
        }
        if modified {
            class.from_cache = false;
        }

        let result = progress.notify(Message::ClassVisited {
            class: &class.name,
            modified,
        });
        project.add_class(class);
        result.map_err(BuildError::Progress)?;
        Ok(modified)
    }
}

/// Whether any ancestor was parsed or changed during this run.
fn ancestry_changed(project: &Project, class: &ClassInfo) -> bool {
    inheritance::parent_chain(project, class)
        .into_iter()
        .chain(inheritance::all_interfaces(project, class))
        .chain(inheritance::all_traits(project, class))
        .any(|ancestor| !ancestor.from_cache)
}
