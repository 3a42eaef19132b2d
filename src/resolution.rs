//! Type name resolution.
//!
//! Turns the type tokens found in signatures and doc comments into
//! canonical references, following PHP's name resolution rules:
//!
//!   1. Built-in type keywords are returned as written.
//!   2. A leading `\` means the name is already fully qualified.
//!   3. `self`, `static` and `$this` name the enclosing class; `parent`
//!      names its parent.
//!   4. A name whose first segment is a `use` alias is rewritten to the
//!      alias target.
//!   5. Anything else is relative to the current namespace.
//!
//! Class references are returned with a leading `\` (e.g. `\Foo\Bar`).

use std::collections::BTreeMap;

use crate::docblock::is_php_type_hint;
use crate::docblock::types::{base_alternative, split_alternatives};
use crate::types::{Hint, TypeHint};

/// The naming context active at a declaration site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeContext {
    /// Current namespace without leading or trailing `\`; `""` is global.
    pub namespace: String,
    /// `use` aliases: short name → fully-qualified name (no leading `\`).
    pub aliases: BTreeMap<String, String>,
    /// Fully-qualified name of the enclosing class, if any.
    pub class_name: Option<String>,
    /// Fully-qualified name of the enclosing class's parent, if any.
    pub parent: Option<String>,
}

impl TypeContext {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_aliases(mut self, aliases: BTreeMap<String, String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Enter a class body: `self`/`static`/`parent` now resolve.
    pub fn for_class(&self, class_name: &str, parent: Option<&str>) -> Self {
        Self {
            class_name: Some(class_name.to_string()),
            parent: parent.map(str::to_string),
            ..self.clone()
        }
    }

    /// Resolve a single type token (no union, no array marker).
    ///
    /// Built-in keywords come back unchanged; class names come back with a
    /// leading `\`.
    pub fn resolve(&self, token: &str) -> String {
        let token = token.trim();
        if is_php_type_hint(token) {
            return token.to_string();
        }
        if token.starts_with('\\') {
            return token.to_string();
        }

        match token.to_ascii_lowercase().as_str() {
            "self" | "static" | "$this" => {
                if let Some(class) = &self.class_name {
                    return format!("\\{}", class);
                }
                return token.to_string();
            }
            "parent" => {
                if let Some(parent) = &self.parent {
                    return format!("\\{}", parent);
                }
                return token.to_string();
            }
            _ => {}
        }

        let (first, rest) = match token.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (token, None),
        };
        if let Some(target) = self.alias(first) {
            return match rest {
                Some(rest) => format!("\\{}\\{}", target, rest),
                None => format!("\\{}", target),
            };
        }

        if self.namespace.is_empty() {
            format!("\\{}", token)
        } else {
            format!("\\{}\\{}", self.namespace, token)
        }
    }

    /// The target of a `use` alias.  Like class names, aliases are
    /// case-insensitive.
    fn alias(&self, name: &str) -> Option<&String> {
        self.aliases.get(name).or_else(|| {
            self.aliases
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                .map(|(_, target)| target)
        })
    }

    /// Resolve a class name to its registry key (no leading `\`).
    pub fn resolve_class(&self, token: &str) -> String {
        self.resolve(token).trim_start_matches('\\').to_string()
    }

    /// Resolve a raw union hint such as `A|\B[]|?C`.
    ///
    /// Each alternative keeps its own array flag.  A nullable `?T` expands
    /// to `T|null`.  Generic parameters are dropped: `Collection<int, T>`
    /// resolves as `Collection`.
    pub fn resolve_hint(&self, raw: &str) -> Hint {
        let mut hint = Vec::new();
        self.push_alternatives(raw.trim(), &mut hint);
        hint
    }

    fn push_alternatives(&self, raw: &str, hint: &mut Hint) {
        for alt in split_alternatives(raw) {
            let (alt, nullable) = match alt.strip_prefix('?') {
                Some(rest) => (rest, true),
                None => (alt, false),
            };
            let (base, is_array) = base_alternative(alt);
            if base.contains(['|', '&']) {
                self.push_alternatives(base, hint);
            } else if !base.is_empty() {
                let resolved = TypeHint::new(self.resolve(base), is_array);
                if !hint.contains(&resolved) {
                    hint.push(resolved);
                }
            }
            if nullable {
                let null = TypeHint::new("null", false);
                if !hint.contains(&null) {
                    hint.push(null);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TypeContext {
        let mut aliases = BTreeMap::new();
        aliases.insert("Bar".to_string(), "Vendor\\Lib\\Bar".to_string());
        aliases.insert("Lib".to_string(), "Vendor\\Lib".to_string());
        TypeContext::new("App\\Model")
            .with_aliases(aliases)
            .for_class("App\\Model\\User", Some("App\\Model\\Base"))
    }

    #[test]
    fn resolution_order() {
        let ctx = ctx();
        assert_eq!(ctx.resolve("String"), "String");
        assert_eq!(ctx.resolve("\\Exception"), "\\Exception");
        assert_eq!(ctx.resolve("self"), "\\App\\Model\\User");
        assert_eq!(ctx.resolve("static"), "\\App\\Model\\User");
        assert_eq!(ctx.resolve("$this"), "\\App\\Model\\User");
        assert_eq!(ctx.resolve("parent"), "\\App\\Model\\Base");
        assert_eq!(ctx.resolve("Bar"), "\\Vendor\\Lib\\Bar");
        assert_eq!(ctx.resolve("Lib\\Baz"), "\\Vendor\\Lib\\Baz");
        assert_eq!(ctx.resolve("Post"), "\\App\\Model\\Post");
    }

    #[test]
    fn aliases_are_case_insensitive() {
        let ctx = ctx();
        assert_eq!(ctx.resolve("bar"), "\\Vendor\\Lib\\Bar");
        assert_eq!(ctx.resolve("LIB\\Baz"), "\\Vendor\\Lib\\Baz");
        assert_eq!(ctx.resolve_hint("bar[]"), vec![TypeHint::new("\\Vendor\\Lib\\Bar", true)]);
    }

    #[test]
    fn union_keeps_array_flags() {
        let hint = TypeContext::default().resolve_hint("SingleClass|\\MultipleClass[]");
        assert_eq!(
            hint,
            vec![
                TypeHint::new("\\SingleClass", false),
                TypeHint::new("\\MultipleClass", true),
            ]
        );
    }

    #[test]
    fn nullable_expands_to_null() {
        let hint = TypeContext::default().resolve_hint("?int");
        assert_eq!(
            hint,
            vec![TypeHint::new("int", false), TypeHint::new("null", false)]
        );
    }
}
