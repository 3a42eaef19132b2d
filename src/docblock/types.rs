//! Type token utilities for PHPDoc types.
//!
//! This submodule provides helpers for splitting raw type strings extracted
//! from docblocks into union alternatives, stripping generic parameters and
//! array markers, and classifying built-in type keywords.

use crate::types::TypeHint;

/// Built-in type keywords.  Anything else in a hint position names a class.
pub(crate) const PHP_TYPE_HINTS: &[&str] = &[
    "", "scalar", "object", "boolean", "bool", "int", "integer", "array", "string", "mixed",
    "void", "null", "resource", "double", "float", "callable", "iterable", "never", "false",
    "true", "list",
];

/// Whether `name` is a built-in type keyword (case-insensitive).
pub fn is_php_type_hint(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    PHP_TYPE_HINTS.contains(&lower.as_str())
}

/// Split off the first type token from `s`, respecting `<…>`, `(…)` and
/// `{…}` nesting.
///
/// Returns `(type_token, remainder)` where `type_token` is the full type
/// (e.g. `Collection<int, User>`) and `remainder` is whatever follows.
pub(crate) fn split_type_token(s: &str) -> (&str, &str) {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' | '{' => depth += 1,
            '>' | ')' | '}' => depth -= 1,
            c if c.is_whitespace() && depth <= 0 => {
                return (&s[..i], &s[i..]);
            }
            _ => {}
        }
    }
    (s, "")
}

/// Split a union (or intersection) on `|` / `&` at nesting depth zero.
pub(crate) fn split_alternatives(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, ch) in s.char_indices() {
        match ch {
            '<' | '(' | '{' => depth += 1,
            '>' | ')' | '}' => depth -= 1,
            '|' | '&' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Reduce one alternative to its base name and array flag.
///
///   - `Foo[]`                  → `("Foo", true)`
///   - `Collection<int, Foo>`   → `("Collection", false)`
///   - `array{a: int}`          → `("array", false)`
///   - `(Foo|Bar)`              → `("Foo|Bar", false)` (caller re-splits)
pub(crate) fn base_alternative(raw: &str) -> (&str, bool) {
    let mut s = raw.trim();
    let is_array = if let Some(stripped) = s.strip_suffix("[]") {
        s = stripped.trim_end_matches("[]");
        true
    } else {
        false
    };

    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        return (inner.trim(), is_array);
    }

    let cut = s.find(['<', '{', '(']).unwrap_or(s.len());
    let s = s[..cut].trim_end_matches(['.', ',']);
    (s, is_array)
}

/// Decide whether a docblock type may refine a native type hint.
///
/// Returns `true` when the native hint is broad enough to be narrowed:
///   - it is empty (no inline hint at all)
///   - it contains `array`, `iterable`, `mixed` or `object`
///   - it contains a class name (which a docblock may narrow to a subclass)
///
/// Returns `false` when every native alternative is a concrete scalar such
/// as `int` or `string` (or `self`/`static`, already canonical).
pub fn should_refine_hint(native: &[TypeHint]) -> bool {
    if native.is_empty() {
        return true;
    }
    native.iter().any(|t| {
        let lower = t.name.to_ascii_lowercase();
        matches!(lower.as_str(), "array" | "iterable" | "mixed" | "object") || t.is_class()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_token_respects_generics() {
        assert_eq!(
            split_type_token("Collection<int, User> $users rest"),
            ("Collection<int, User>", " $users rest")
        );
        assert_eq!(split_type_token("int"), ("int", ""));
    }

    #[test]
    fn alternatives_split_at_depth_zero() {
        assert_eq!(
            split_alternatives("A|array<int|string, B>|C[]"),
            vec!["A", "array<int|string, B>", "C[]"]
        );
    }

    #[test]
    fn base_alternative_strips_decorations() {
        assert_eq!(base_alternative("Foo[]"), ("Foo", true));
        assert_eq!(base_alternative("Collection<int, Foo>"), ("Collection", false));
        assert_eq!(base_alternative("array{a: int}"), ("array", false));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert!(is_php_type_hint("Bool"));
        assert!(is_php_type_hint(""));
        assert!(!is_php_type_hint("Foo"));
    }
}
