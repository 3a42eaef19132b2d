use crate::inheritance;
use crate::project::Project;
use crate::types::{ClassInfo, MethodInfo};

use super::ClassVisitor;

/// Copies documentation from the method a method overrides.
///
/// Empty signature documentation (return hint and description, parameter
/// descriptions and hints) is filled from the overridden method.  A method
/// marked `{@inheritdoc}`, or without any doc comment, takes its whole
/// description and `@throws` list from the nearest ancestor that documents
/// it.  Copied fields are flagged so the next visit refreshes them.
pub struct InheritdocVisitor;

impl ClassVisitor for InheritdocVisitor {
    fn visit(&self, class: &mut ClassInfo, project: &Project) -> bool {
        let names: Vec<String> = class
            .methods
            .values()
            .filter(|m| !m.is_virtual)
            .map(|m| m.name.clone())
            .collect();

        let mut modified = false;
        for name in names {
            let Some(parent) = inheritance::parent_method(project, class, &name) else {
                continue;
            };
            let documented = inheritance::documented_method(project, class, &name);
            let Some(method) = class.methods.get_mut(&name) else {
                continue;
            };

            modified = inherit_signature(method, parent) || modified;
            if method.inherits_doc {
                if let Some(source) = documented {
                    modified = inherit_description(method, source) || modified;
                }
            }
        }
        modified
    }
}

fn inherit_signature(method: &mut MethodInfo, parent: &MethodInfo) -> bool {
    let mut modified = false;

    for (name, param) in method.parameters.iter_mut() {
        let Some(from) = parent.parameter(name) else {
            continue;
        };
        if (param.short_desc.is_empty() || param.inherited.short_desc)
            && param.short_desc != from.short_desc
        {
            param.short_desc = from.short_desc.clone();
            param.inherited.short_desc = true;
            modified = true;
        }
        if (param.hint.is_empty() || param.inherited.hint) && param.hint != from.hint {
            param.hint = from.hint.clone();
            param.inherited.hint = true;
            modified = true;
        }
    }

    if (method.hint.is_empty() || method.inherited.hint) && method.hint != parent.hint {
        method.hint = parent.hint.clone();
        method.inherited.hint = true;
        modified = true;
    }
    if (method.hint_desc.is_empty() || method.inherited.hint_desc)
        && method.hint_desc != parent.hint_desc
    {
        method.hint_desc = parent.hint_desc.clone();
        method.inherited.hint_desc = true;
        modified = true;
    }
    modified
}

fn inherit_description(method: &mut MethodInfo, source: &MethodInfo) -> bool {
    let mut modified = false;
    if method.short_desc != source.short_desc {
        method.short_desc = source.short_desc.clone();
        modified = true;
    }
    if method.long_desc != source.long_desc {
        method.long_desc = source.long_desc.clone();
        modified = true;
    }
    if method.exceptions != source.exceptions {
        method.exceptions = source.exceptions.clone();
        modified = true;
    }
    if modified {
        method.inherited.short_desc = true;
    }
    modified
}
