//! Virtual member synthesis (`@property`, `@method`).
//!
//! This submodule turns class-level tag payloads into member entities:
//!
//!   - `@property Type $name Description` / `@property-read` / `@property-write`
//!   - `@method ReturnType methodName(ParamType $param = default, ...) Description`
//!   - `@method static ReturnType methodName(...)`

use super::tags::collapse_lines;
use crate::resolution::TypeContext;
use crate::types::{MethodInfo, Modifiers, ParameterInfo, PropertyInfo, PropertyTag};

// ─── @property Tags ─────────────────────────────────────────────────────────

/// Build the property entity declared by a `@property` tag.
///
/// The tag payload is already resolved, so this only copies fields.  The
/// property name does **not** include the `$` prefix.
pub fn property_from_tag(tag: &PropertyTag, line: usize) -> PropertyInfo {
    PropertyInfo {
        name: tag.name.clone(),
        line,
        short_desc: tag.description.clone(),
        hint: tag.hint.clone(),
        modifiers: Modifiers::default(),
        is_virtual: true,
        ..PropertyInfo::default()
    }
}

// ─── @method Tags ───────────────────────────────────────────────────────────

/// Parse the body of a `@method` tag into a method entity.
///
/// The format is:
///
///   - `@method ReturnType methodName(ParamType $param, ...) Description`
///   - `@method static ReturnType methodName(ParamType $param, ...)`
///   - `@method methodName(ParamType $param, ...)`  (no return type)
///
/// Returns `None` when the body has no `name(` part.
pub fn parse_method_tag(body: &str, ctx: &TypeContext, line: usize) -> Option<MethodInfo> {
    let rest = body.trim();

    // "static" must be followed by whitespace to avoid matching a method
    // literally named "staticFoo".
    let (is_static, rest) = match rest.strip_prefix("static") {
        Some(after) if after.starts_with(char::is_whitespace) => (true, after.trim_start()),
        _ => (false, rest),
    };

    let paren_pos = rest.find('(')?;
    let before_paren = rest[..paren_pos].trim();
    if before_paren.is_empty() {
        return None;
    }

    // The method name is the last whitespace-delimited token before `(`.
    let (return_type_raw, method_name) = match before_paren.rfind(char::is_whitespace) {
        Some(last_space) => (
            before_paren[..last_space].trim(),
            before_paren[last_space..].trim(),
        ),
        None => ("", before_paren),
    };
    let method_name = method_name.trim_start_matches('&');
    if method_name.is_empty() {
        return None;
    }

    let after_paren = &rest[paren_pos + 1..];
    let close = matching_paren(after_paren).unwrap_or(after_paren.len());
    let params_str = after_paren[..close].trim();
    let description = after_paren.get(close + 1..).unwrap_or("");

    let mut method = MethodInfo::new(method_name, line);
    method.modifiers.is_static = is_static;
    method.is_by_ref = before_paren
        .rsplit(char::is_whitespace)
        .next()
        .is_some_and(|n| n.starts_with('&'));
    method.is_virtual = true;
    method.short_desc = collapse_lines(description);
    if !return_type_raw.is_empty() {
        method.hint = ctx.resolve_hint(return_type_raw);
    }
    for parameter in parse_method_tag_params(params_str, ctx, line) {
        method.add_parameter(parameter);
    }

    Some(method)
}

/// Index of the `)` closing the parameter list, respecting nesting.
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '<' | '{' | '[' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' | '>' | '}' | ']' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Parse the parameter list of a `@method` tag.
///
/// Handles formats like:
///   - `string $abstract, callable():mixed $mockDefinition = null`
///   - `array<string, mixed> $data, string $connection = null`
///
/// Entries without a `$name` are skipped.
fn parse_method_tag_params(params_str: &str, ctx: &TypeContext, line: usize) -> Vec<ParameterInfo> {
    let mut result = Vec::new();

    for part in split_params(params_str) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (declaration, default) = match part.split_once('=') {
            Some((decl, default)) => (decl.trim(), Some(default.trim().to_string())),
            None => (part, None),
        };

        let Some(dollar) = declaration.rfind('$') else {
            continue;
        };
        let name = declaration[dollar + 1..].trim();
        if name.is_empty() {
            continue;
        }

        let mut before = declaration[..dollar].trim_end();
        let is_by_ref = before.ends_with('&');
        before = before.trim_end_matches('&').trim_end();
        let is_variadic = before.ends_with("...");
        before = before.trim_end_matches("...").trim_end();

        result.push(ParameterInfo {
            name: name.to_string(),
            line,
            hint: if before.is_empty() {
                Vec::new()
            } else {
                ctx.resolve_hint(before)
            },
            default,
            is_by_ref,
            is_variadic,
            ..ParameterInfo::default()
        });
    }

    result
}

/// Split a parameter string on commas while respecting `<>`, `()`, `{}`
/// and `[]` nesting so that `array<string, mixed>` is not split.
fn split_params(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, ch) in s.char_indices() {
        match ch {
            '<' | '(' | '{' | '[' => depth += 1,
            '>' | ')' | '}' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeHint;

    #[test]
    fn split_params_respects_generics() {
        assert_eq!(
            split_params("array<string, mixed> $a, int $b = [1, 2]"),
            vec!["array<string, mixed> $a", " int $b = [1, 2]"]
        );
    }

    #[test]
    fn method_tag_with_description() {
        let ctx = TypeContext::new("App");
        let m = parse_method_tag("static Foo[] find(int $id, ...$rest) Finds things.", &ctx, 3)
            .expect("method");
        assert_eq!(m.name, "find");
        assert!(m.modifiers.is_static);
        assert_eq!(m.hint, vec![TypeHint::new("\\App\\Foo", true)]);
        assert_eq!(m.short_desc, "Finds things.");
        assert!(m.parameters["rest"].is_variadic);
        assert_eq!(m.parameters["rest"].position, 1);
    }
}
