use std::fs;
use std::path::PathBuf;

use crate::project::Project;
use crate::types::{ClassInfo, DocTag};

use super::ClassVisitor;

/// Loads the files named by method `@example` tags from a base directory.
///
/// A path without a `.php` part gets the extension appended.  An example
/// that cannot be read is reported on the method and left without code.
pub struct ExampleVisitor {
    dir: PathBuf,
}

impl ExampleVisitor {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut file = path.to_string();
        if !file.contains(".php") {
            file.push_str(".php");
        }
        self.dir.join(file)
    }
}

impl ClassVisitor for ExampleVisitor {
    fn visit(&self, class: &mut ClassInfo, _project: &Project) -> bool {
        let mut modified = false;
        for method in class.methods.values_mut() {
            let Some(tags) = method.tags.get_mut("example") else {
                continue;
            };
            for tag in tags.iter_mut() {
                let DocTag::Example(example) = tag else {
                    continue;
                };
                let path = self.resolve(&example.path);
                match fs::read_to_string(&path) {
                    Ok(code) => {
                        if example.code.as_deref() != Some(code.as_str()) {
                            example.code = Some(code);
                            modified = true;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "cannot read example: {}", e);
                        let error = format!("@example tag: cannot read \"{}\"", path.display());
                        if !method.errors.contains(&error) {
                            method.errors.push(error);
                            modified = true;
                        }
                    }
                }
            }
        }
        modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassKind, ExampleTag, MethodInfo};

    fn class_with_example(path: &str) -> ClassInfo {
        let mut method = MethodInfo::new("run", 3);
        method.tags.insert(
            "example".into(),
            vec![DocTag::Example(ExampleTag {
                path: path.into(),
                description: "Basic use".into(),
                code: None,
            })],
        );
        let mut class = ClassInfo::new("Job", ClassKind::Class, 1);
        class.add_method(method);
        class
    }

    fn example_code(class: &ClassInfo) -> Option<&str> {
        match &class.methods["run"].tags["example"][0] {
            DocTag::Example(e) => e.code.as_deref(),
            _ => None,
        }
    }

    #[test]
    fn loads_example_with_implied_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("basic.php"), "<?php run();").expect("write");
        let visitor = ExampleVisitor::new(dir.path());
        let project = Project::default();

        let mut class = class_with_example("basic");
        assert!(visitor.visit(&mut class, &project));
        assert_eq!(example_code(&class), Some("<?php run();"));
        assert!(!visitor.visit(&mut class, &project), "already loaded");
    }

    #[test]
    fn missing_example_is_reported_on_the_method() {
        let dir = tempfile::tempdir().expect("tempdir");
        let visitor = ExampleVisitor::new(dir.path());
        let project = Project::default();

        let mut class = class_with_example("missing.php");
        assert!(visitor.visit(&mut class, &project));
        assert_eq!(example_code(&class), None);
        assert_eq!(class.methods["run"].errors.len(), 1);
        assert!(!visitor.visit(&mut class, &project));
    }
}
