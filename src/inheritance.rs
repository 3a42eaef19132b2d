/// Class inheritance resolution.
///
/// Ancestors are never owned by a class: every walk here resolves parent,
/// interface and trait names through the [`Project`] registry, so forward
/// references and cycles cost nothing more than a failed lookup.  Walks stop
/// at names the registry does not know (built-in classes) and at a depth
/// limit of 20 to survive circular hierarchies.
///
/// Member precedence for the deep views mirrors PHP:
///
///   class own > traits > parent chain (> extended interfaces)
use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::docblock::INHERITDOC;
use crate::project::Project;
use crate::types::{ClassInfo, ConstantInfo, MethodInfo, Modifiers, PropertyInfo, Visibility};

const MAX_DEPTH: u32 = 20;

/// Built-in names whose descendants are listed as exceptions.
const EXCEPTION_ROOTS: &[&str] = &[
    "Exception",
    "Error",
    "Throwable",
    "ErrorException",
    "RuntimeException",
    "LogicException",
];

/// The parent chain of `class`, nearest first, limited to known classes.
pub fn parent_chain<'a>(project: &'a Project, class: &ClassInfo) -> Vec<&'a ClassInfo> {
    let mut chain: Vec<&'a ClassInfo> = Vec::new();
    let mut next = class.parent.as_deref();
    while let Some(name) = next {
        if chain.len() as u32 >= MAX_DEPTH {
            break;
        }
        let Some(parent) = project.get_class(name) else {
            break;
        };
        if parent.name == class.name || chain.iter().any(|c| c.name == parent.name) {
            tracing::warn!(class = %class.name, "circular inheritance");
            break;
        }
        chain.push(parent);
        next = parent.parent.as_deref();
    }
    chain
}

/// Every interface `class` implements: its own, the ones they extend, and
/// those of its parent chain.  Each appears once, in discovery order.
pub fn all_interfaces<'a>(project: &'a Project, class: &ClassInfo) -> Vec<&'a ClassInfo> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    collect_interfaces(project, class, &mut seen, &mut out, 0);
    out
}

fn collect_interfaces<'a>(
    project: &'a Project,
    class: &ClassInfo,
    seen: &mut BTreeSet<String>,
    out: &mut Vec<&'a ClassInfo>,
    depth: u32,
) {
    if depth > MAX_DEPTH {
        return;
    }
    for name in &class.interfaces {
        if !seen.insert(name.clone()) {
            continue;
        }
        if let Some(interface) = project.get_class(name) {
            out.push(interface);
            collect_interfaces(project, interface, seen, out, depth + 1);
        }
    }
    if let Some(parent) = class.parent.as_deref().and_then(|p| project.get_class(p)) {
        collect_interfaces(project, parent, seen, out, depth + 1);
    }
}

/// Every trait used by `class`, by the traits it uses, and by its parents.
pub fn all_traits<'a>(project: &'a Project, class: &ClassInfo) -> Vec<&'a ClassInfo> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    collect_traits(project, class, &mut seen, &mut out, 0);
    out
}

fn collect_traits<'a>(
    project: &'a Project,
    class: &ClassInfo,
    seen: &mut BTreeSet<String>,
    out: &mut Vec<&'a ClassInfo>,
    depth: u32,
) {
    if depth > MAX_DEPTH {
        return;
    }
    for name in &class.traits {
        if !seen.insert(name.clone()) {
            continue;
        }
        if let Some(used) = project.get_class(name) {
            out.push(used);
            collect_traits(project, used, seen, out, depth + 1);
        }
    }
    if let Some(parent) = class.parent.as_deref().and_then(|p| project.get_class(p)) {
        collect_traits(project, parent, seen, out, depth + 1);
    }
}

/// Ancestor methods named `name` in lookup order: each parent (with its
/// traits) nearest first, then every interface.
fn ancestor_methods<'a>(
    project: &'a Project,
    class: &ClassInfo,
    name: &str,
) -> Vec<&'a MethodInfo> {
    let mut candidates: Vec<&'a MethodInfo> = Vec::new();
    for parent in parent_chain(project, class) {
        if let Some(m) = parent.method(name) {
            candidates.push(m);
        }
        for used in all_traits(project, parent) {
            if let Some(m) = used.method(name) {
                candidates.push(m);
            }
        }
    }
    for interface in all_interfaces(project, class) {
        if let Some(m) = interface.method(name) {
            candidates.push(m);
        }
    }
    candidates
}

/// The method `name` overrides or implements, if any ancestor declares it.
pub fn parent_method<'a>(project: &'a Project, class: &ClassInfo, name: &str) -> Option<&'a MethodInfo> {
    ancestor_methods(project, class, name).into_iter().next()
}

/// The nearest ancestor declaration of `name` that carries a description of
/// its own (anything but empty or the inheritance marker).
pub fn documented_method<'a>(
    project: &'a Project,
    class: &ClassInfo,
    name: &str,
) -> Option<&'a MethodInfo> {
    ancestor_methods(project, class, name)
        .into_iter()
        .find(|m| has_description(m))
}

pub(crate) fn has_description(method: &MethodInfo) -> bool {
    let short = method.short_desc.trim();
    !short.is_empty() && !short.eq_ignore_ascii_case(INHERITDOC)
}

/// Whether the parent chain reaches one of the built-in exception roots.
pub fn is_exception(project: &Project, class: &ClassInfo) -> bool {
    let mut next = class.parent.as_deref();
    let mut depth = 0;
    while let Some(name) = next {
        if EXCEPTION_ROOTS.contains(&name) {
            return true;
        }
        depth += 1;
        if depth > MAX_DEPTH {
            return false;
        }
        next = project.get_class(name).and_then(|p| p.parent.as_deref());
    }
    false
}

// ─── Deep member views ──────────────────────────────────────────────────────

trait Member {
    fn modifiers(&self) -> &Modifiers;
}

impl Member for MethodInfo {
    fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }
}

impl Member for PropertyInfo {
    fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }
}

impl Member for ConstantInfo {
    fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }
}

#[derive(Clone, Copy)]
struct Sources {
    interfaces: bool,
    traits: bool,
}

fn methods_of(class: &ClassInfo) -> &IndexMap<String, MethodInfo> {
    &class.methods
}

fn properties_of(class: &ClassInfo) -> &IndexMap<String, PropertyInfo> {
    &class.properties
}

fn constants_of(class: &ClassInfo) -> &IndexMap<String, ConstantInfo> {
    &class.constants
}

fn merge_members<'a, T: Member>(
    project: &'a Project,
    class: &'a ClassInfo,
    select: fn(&ClassInfo) -> &IndexMap<String, T>,
    sources: Sources,
    depth: u32,
    out: &mut IndexMap<String, &'a T>,
) {
    if depth > MAX_DEPTH {
        return;
    }
    if sources.interfaces && class.is_interface() {
        for name in &class.interfaces {
            if let Some(parent) = project.get_class(name) {
                merge_members(project, parent, select, sources, depth + 1, out);
            }
        }
    }
    if let Some(parent) = class.parent.as_deref().and_then(|p| project.get_class(p)) {
        let mut inherited = IndexMap::new();
        merge_members(project, parent, select, sources, depth + 1, &mut inherited);
        // Private members stay with the class that declares them.
        for (name, member) in inherited {
            if member.modifiers().visibility != Visibility::Private {
                out.insert(name, member);
            }
        }
    }
    if sources.traits {
        for name in &class.traits {
            if let Some(used) = project.get_class(name) {
                merge_members(project, used, select, sources, depth + 1, out);
            }
        }
    }
    for (name, member) in select(class) {
        out.insert(name.clone(), member);
    }
}

/// Methods of `class`, including inherited, trait and (for interfaces)
/// extended-interface methods when `deep` is set.
pub fn class_methods<'a>(project: &'a Project, class: &'a ClassInfo, deep: bool) -> IndexMap<String, &'a MethodInfo> {
    if !deep {
        return class.methods.iter().map(|(k, v)| (k.clone(), v)).collect();
    }
    let mut out = IndexMap::new();
    let sources = Sources {
        interfaces: true,
        traits: true,
    };
    merge_members(project, class, methods_of, sources, 0, &mut out);
    out
}

pub fn class_properties<'a>(
    project: &'a Project,
    class: &'a ClassInfo,
    deep: bool,
) -> IndexMap<String, &'a PropertyInfo> {
    if !deep {
        return class.properties.iter().map(|(k, v)| (k.clone(), v)).collect();
    }
    let mut out = IndexMap::new();
    let sources = Sources {
        interfaces: false,
        traits: true,
    };
    merge_members(project, class, properties_of, sources, 0, &mut out);
    out
}

pub fn class_constants<'a>(
    project: &'a Project,
    class: &'a ClassInfo,
    deep: bool,
) -> IndexMap<String, &'a ConstantInfo> {
    if !deep {
        return class.constants.iter().map(|(k, v)| (k.clone(), v)).collect();
    }
    let mut out = IndexMap::new();
    let sources = Sources {
        interfaces: false,
        traits: false,
    };
    merge_members(project, class, constants_of, sources, 0, &mut out);
    out
}
