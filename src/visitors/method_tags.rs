use crate::docblock::parse_method_tag;
use crate::project::Project;
use crate::resolution::TypeContext;
use crate::types::{ClassInfo, DocTag};

use super::ClassVisitor;

/// Adds the methods declared by class-level `@method` tags.
///
/// A method declared in code is never replaced.  When two tags declare the
/// same name the later one wins.
pub struct MethodTagVisitor;

impl ClassVisitor for MethodTagVisitor {
    fn visit(&self, class: &mut ClassInfo, _project: &Project) -> bool {
        let bodies: Vec<String> = class
            .tag("method")
            .iter()
            .filter_map(DocTag::as_text)
            .map(str::to_string)
            .collect();
        if bodies.is_empty() {
            return false;
        }

        let ctx = TypeContext::new(class.namespace.clone())
            .with_aliases(class.aliases.clone())
            .for_class(&class.name, class.parent.as_deref());

        let mut modified = false;
        for body in &bodies {
            let Some(method) = parse_method_tag(body, &ctx, class.line) else {
                tracing::debug!(class = %class.name, tag = %body, "unparsable @method tag");
                continue;
            };
            match class.methods.get(&method.name) {
                Some(existing) if !existing.is_virtual => continue,
                Some(existing) if *existing == method => continue,
                _ => {}
            }
            class.add_method(method);
            modified = true;
        }
        modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassKind, MethodInfo};

    #[test]
    fn real_methods_win_over_tags() {
        let mut class = ClassInfo::new("App\\Model", ClassKind::Class, 4);
        class.namespace = "App".into();
        class.tags.insert(
            "method".into(),
            vec![
                DocTag::Text("string save()".into()),
                DocTag::Text("static self make(array $data) Builds one.".into()),
            ],
        );
        class.add_method(MethodInfo::new("save", 10));

        let project = Project::default();
        assert!(MethodTagVisitor.visit(&mut class, &project));
        assert!(!class.method("save").expect("save").is_virtual);

        let make = class.method("make").expect("make");
        assert!(make.is_virtual);
        assert!(make.modifiers.is_static);
        assert_eq!(make.hint[0].name, "\\App\\Model");
        assert_eq!(make.short_desc, "Builds one.");
        assert!(make.parameter("data").is_some());

        assert!(!MethodTagVisitor.visit(&mut class, &project), "idempotent");
    }
}
