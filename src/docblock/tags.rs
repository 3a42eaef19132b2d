//! PHPDoc tag body grammars.
//!
//! This submodule turns the text following a `@tag` marker into a
//! structured [`DocTag`] payload:
//!
//!   - `@param [type] [$name] [description] [{ @type … }]`
//!   - `@return` / `@var [type] [description]`
//!   - `@throws Class [description]`
//!   - `@property[-read|-write] [type] $name [description]`
//!   - `@see Reference [description]`
//!   - `@example path [description]`
//!
//! Types are resolved against the [`TypeContext`] of the declaration the
//! comment belongs to.  It also hosts the comment lookup
//! ([`get_docblock_text_for_node`]) used by the extractor.

use indexmap::IndexMap;
use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::resolution::TypeContext;
use crate::types::{
    DocTag, ExampleTag, ParamTag, PropertyTag, SeeTag, SubParam, ThrowsTag, TypedTag,
    hint_to_string,
};

use super::types::split_type_token;

/// Tags whose mere presence carries meaning.  They are recorded with an
/// empty body instead of being skipped.
pub(crate) const MARKER_TAGS: &[&str] = &["api", "deprecated", "internal"];

/// Strip the comment delimiters and the leading `*` of every line.
pub(crate) fn comment_lines(raw: &str) -> Vec<&str> {
    let inner = raw.trim();
    let inner = inner
        .strip_prefix("/**")
        .or_else(|| inner.strip_prefix("/*"))
        .unwrap_or(inner);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);

    inner
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').unwrap_or(line).trim()
        })
        .collect()
}

/// Whether a line opens a tag region: `@` directly followed by a letter.
pub(crate) fn is_tag_line(line: &str) -> bool {
    line.strip_prefix('@')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '\\')
}

/// Net change in `{ … }` nesting for one line.  Inline tags such as
/// `{@link Foo}` open and close on their own and do not count.
pub(crate) fn brace_delta(line: &str) -> i32 {
    let mut delta = 0i32;
    let mut inline = 0i32;
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'{' if bytes.get(i + 1) == Some(&b'@') => inline += 1,
            b'{' => delta += 1,
            b'}' if inline > 0 => inline -= 1,
            b'}' => delta -= 1,
            _ => {}
        }
    }
    delta
}

fn is_type_line(line: &str) -> bool {
    line.strip_prefix("@type")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Split cleaned comment lines into the leading description lines and the
/// tag regions that follow.
///
/// A region starts at a tag line and runs until the next one.  Inside an
/// open `{ … }` only `@type` lines continue the region, so a stray `{` in a
/// description cannot swallow the tags after it.
pub(crate) fn split_regions<'a>(lines: &[&'a str]) -> (Vec<&'a str>, Vec<Vec<&'a str>>) {
    let mut description = Vec::new();
    let mut regions: Vec<Vec<&'a str>> = Vec::new();
    let mut depth = 0i32;

    for &line in lines {
        if is_tag_line(line) && (depth <= 0 || !is_type_line(line)) {
            depth = 0;
            regions.push(vec![line]);
        } else if let Some(region) = regions.last_mut() {
            region.push(line);
        } else {
            description.push(line);
            continue;
        }
        depth += brace_delta(line);
    }

    (description, regions)
}

/// Join wrapped lines into a single space-separated sentence.
pub(crate) fn collapse_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn starts_with_variable(s: &str) -> bool {
    let s = s.trim_start_matches('&').trim_start_matches("...");
    s.starts_with('$')
}

/// Split `s` at the first whitespace.
fn first_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], &s[i..]),
        None => (s, ""),
    }
}

fn variable_name(token: &str) -> String {
    token
        .trim_start_matches('&')
        .trim_start_matches("...")
        .trim_start_matches('$')
        .trim_end_matches([',', ')'])
        .to_string()
}

/// Reject type tokens whose brackets do not pair up.
fn check_type(raw: &str) -> Result<(), String> {
    let mut depth = 0i32;
    for c in raw.chars() {
        match c {
            '<' | '(' | '{' | '[' => depth += 1,
            '>' | ')' | '}' | ']' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            break;
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(format!("malformed type \"{}\"", raw))
    }
}

fn is_class_token(s: &str) -> bool {
    let s = s.strip_prefix('\\').unwrap_or(s);
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.split('\\').all(|seg| {
            !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Find the first `{ … }` block (ignoring inline `{@tag}` markers) and
/// return `(before, inside, after)`.  Callers only treat the block as
/// structure when it contains `@type` lines.
fn take_brace_block(text: &str) -> Result<Option<(&str, &str, &str)>, String> {
    let bytes = text.as_bytes();
    let Some(open) = (0..bytes.len()).find(|&i| bytes[i] == b'{' && bytes.get(i + 1) != Some(&b'@'))
    else {
        return Ok(None);
    };

    let mut depth = 0i32;
    let mut inline = 0i32;
    for i in open..bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'@') => inline += 1,
            b'{' => depth += 1,
            b'}' if inline > 0 => inline -= 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some((&text[..open], &text[open + 1..i], &text[i + 1..])));
                }
            }
            _ => {}
        }
    }
    Err("unbalanced \"{\"".to_string())
}

/// The `{ … }` block of a tag body when it holds `@type` entries.  Other
/// braces, balanced or not, are plain description text.
fn structured_block(text: &str) -> Result<Option<(&str, &str, &str)>, String> {
    match take_brace_block(text) {
        Ok(block) => Ok(block.filter(|(_, inside, _)| inside.contains("@type"))),
        Err(e) if text.lines().any(|l| is_type_line(l.trim())) => Err(e),
        Err(_) => Ok(None),
    }
}

/// Parse a tag body according to the tag name.  Unknown tags keep their
/// trimmed text.
pub(crate) fn parse_tag(name: &str, body: &str, ctx: &TypeContext) -> Result<DocTag, String> {
    let body = body.trim();
    let tag = match name {
        "param" => DocTag::Param(parse_param(body, ctx)?),
        "return" | "var" => DocTag::Typed(parse_typed(name, body, ctx)?),
        "throws" | "throw" => DocTag::Throws(parse_throws(body, ctx)?),
        "property" | "property-read" | "property-write" => {
            DocTag::Property(parse_property(body, ctx)?)
        }
        "see" => DocTag::See(parse_see(body, ctx)),
        "example" => {
            let (path, rest) = first_word(body);
            DocTag::Example(ExampleTag {
                path: path.to_string(),
                description: collapse_lines(rest),
                code: None,
            })
        }
        _ => DocTag::Text(body.to_string()),
    };
    Ok(tag)
}

fn parse_param(body: &str, ctx: &TypeContext) -> Result<ParamTag, String> {
    let (hint_raw, rest) = if starts_with_variable(body) {
        ("", body)
    } else {
        split_type_token(body)
    };
    check_type(hint_raw)?;

    let rest = rest.trim_start();
    let (name, rest) = if starts_with_variable(rest) {
        let (token, rest) = first_word(rest);
        (Some(variable_name(token)), rest)
    } else {
        (None, rest)
    };

    let (description, sub_params) = match structured_block(rest)? {
        Some((before, inside, after)) => {
            let (extra, sub_params) = parse_sub_params(inside, ctx)?;
            let text = format!("{}\n{}\n{}", before, extra, after);
            (collapse_lines(&text), sub_params)
        }
        None => (collapse_lines(rest), IndexMap::new()),
    };

    Ok(ParamTag {
        hint: if hint_raw.is_empty() {
            Vec::new()
        } else {
            ctx.resolve_hint(hint_raw)
        },
        name,
        description,
        sub_params,
    })
}

fn parse_typed(name: &str, body: &str, ctx: &TypeContext) -> Result<TypedTag, String> {
    let (hint_raw, rest) = split_type_token(body);
    check_type(hint_raw)?;

    // `@var Type $name Description`: the property name is not description.
    let rest = rest.trim_start();
    let rest = if name == "var" && rest.starts_with('$') {
        first_word(rest).1
    } else {
        rest
    };

    Ok(TypedTag {
        hint: ctx.resolve_hint(hint_raw),
        description: collapse_lines(rest),
    })
}

fn parse_throws(body: &str, ctx: &TypeContext) -> Result<ThrowsTag, String> {
    let (class, rest) = first_word(body);
    if !is_class_token(class) {
        return Err(format!("invalid exception class \"{}\"", class));
    }
    Ok(ThrowsTag {
        class: ctx.resolve(class),
        description: collapse_lines(rest),
    })
}

fn parse_property(body: &str, ctx: &TypeContext) -> Result<PropertyTag, String> {
    let (hint_raw, rest) = if body.starts_with('$') {
        ("", body)
    } else {
        split_type_token(body)
    };
    check_type(hint_raw)?;

    let (token, rest) = first_word(rest);
    if !token.starts_with('$') || token.len() < 2 {
        return Err("missing property name".to_string());
    }

    Ok(PropertyTag {
        hint: if hint_raw.is_empty() {
            Vec::new()
        } else {
            ctx.resolve_hint(hint_raw)
        },
        name: variable_name(token),
        description: collapse_lines(rest),
    })
}

/// `@see` accepts class names, `Class::member()` references, functions and
/// URLs.  Only class parts are resolved.
fn parse_see(body: &str, ctx: &TypeContext) -> SeeTag {
    let (target, rest) = first_word(body);
    let reference = if target.contains("://") {
        target.to_string()
    } else if let Some((class, member)) = target.split_once("::") {
        if is_class_token(class) {
            format!("{}::{}", ctx.resolve(class), member)
        } else {
            target.to_string()
        }
    } else if is_class_token(target) {
        ctx.resolve(target)
    } else {
        target.to_string()
    };

    SeeTag {
        raw: body.to_string(),
        reference,
        description: collapse_lines(rest),
    }
}

// ─── Structured sub-parameters ──────────────────────────────────────────────

/// Parse the inside of a `{ … }` block attached to a `@param` (or nested
/// `@type`) tag.
///
/// Returns the free text that precedes the first `@type` line and the
/// entries keyed by name in declaration order.
fn parse_sub_params(
    block: &str,
    ctx: &TypeContext,
) -> Result<(String, IndexMap<String, SubParam>), String> {
    let lines: Vec<&str> = block.lines().map(str::trim).collect();
    let (description, regions) = split_regions(&lines);

    let mut entries = IndexMap::new();
    for region in regions {
        let text = region.join("\n");
        let Some(body) = text.strip_prefix("@type") else {
            continue;
        };
        let entry = parse_sub_param(body.trim(), ctx)?;
        entries.insert(entry.name.clone(), entry);
    }

    Ok((description.join("\n"), entries))
}

fn parse_sub_param(body: &str, ctx: &TypeContext) -> Result<SubParam, String> {
    let (hint_raw, rest) = if starts_with_variable(body) {
        ("", body)
    } else {
        split_type_token(body)
    };
    check_type(hint_raw)?;

    let (token, rest) = first_word(rest);
    if !starts_with_variable(token) {
        return Err("missing @type entry name".to_string());
    }
    let name = variable_name(token);

    let (text, nested) = match structured_block(rest)? {
        Some((before, inside, after)) => {
            let (extra, nested) = parse_sub_params(inside, ctx)?;
            (format!("{}\n{}\n{}", before, extra, after), nested)
        }
        None => (rest.to_string(), IndexMap::new()),
    };
    let text = collapse_lines(&text);

    let (required, text) = if let Some(rest) = text.strip_prefix("Optional.") {
        (false, rest.trim_start().to_string())
    } else if let Some(rest) = text.strip_prefix("Required.") {
        (true, rest.trim_start().to_string())
    } else {
        (false, text)
    };

    let hint = ctx.resolve_hint(hint_raw);
    let is_list = hint
        .iter()
        .any(|t| t.is_array || t.name.eq_ignore_ascii_case("array"));

    let mut entry = SubParam {
        name: name.clone(),
        hint: (!hint.is_empty()).then(|| hint_to_string(&hint)),
        default: default_value(&text),
        description: text,
        required,
        ..SubParam::default()
    };

    if !nested.is_empty() {
        if is_list {
            entry.item_schema = Some(Box::new(SubParam {
                name: format!("{}[]", name),
                properties: nested,
                ..SubParam::default()
            }));
        } else {
            entry.properties = nested;
        }
    }

    Ok(entry)
}

/// Extract the value of a `Default …` sentence, e.g. `Default 'id'.` or
/// `Default is 10.`
fn default_value(description: &str) -> Option<String> {
    let start = description
        .match_indices("Default ")
        .map(|(i, _)| i)
        .find(|&i| i == 0 || description[..i].trim_end().ends_with(['.', '?', '!']))?;

    let rest = &description[start + "Default ".len()..];
    let rest = rest.strip_prefix("is ").unwrap_or(rest);
    let end = rest.find(". ").unwrap_or(rest.len());
    let value = rest[..end].trim().trim_end_matches('.');
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ─── Comment lookup ─────────────────────────────────────────────────────────

/// Look up the docblock comment (if any) for an AST node and return its raw
/// text.
///
/// This uses the program's trivia list to find the `/** ... */` comment that
/// immediately precedes the given node.  The `content` parameter is the full
/// source text and is used to verify there is no code between the docblock
/// and the node.
pub fn get_docblock_text_for_node<'a>(
    trivia: &'a [Trivia<'a>],
    content: &str,
    node: &impl HasSpan,
) -> Option<&'a str> {
    let node_start = node.span().start.offset;
    let candidate_idx = trivia.partition_point(|t| t.span.start.offset < node_start);
    if candidate_idx == 0 {
        return None;
    }

    let content_bytes = content.as_bytes();
    let mut covered_from = node_start;

    for i in (0..candidate_idx).rev() {
        let t = &trivia[i];
        let t_end = t.span.end.offset;

        // Only whitespace may separate the comment from the node.
        let gap = content_bytes
            .get(t_end as usize..covered_from as usize)
            .unwrap_or(&[]);
        if !gap.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        match t.kind {
            TriviaKind::DocBlockComment => return Some(t.value),
            TriviaKind::WhiteSpace
            | TriviaKind::SingleLineComment
            | TriviaKind::MultiLineComment
            | TriviaKind::HashComment => {
                covered_from = t.span.start.offset;
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_keep_nested_type_lines() {
        let lines = vec![
            "Summary.",
            "@param array $opts {",
            "@type string $a First.",
            "}",
            "@return void",
        ];
        let (desc, regions) = split_regions(&lines);
        assert_eq!(desc, vec!["Summary."]);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].len(), 3);
        assert_eq!(regions[1], vec!["@return void"]);
    }

    #[test]
    fn stray_brace_does_not_swallow_later_tags() {
        let lines = vec!["@param string $s A '{' char", "@return int Count"];
        let (_, regions) = split_regions(&lines);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1], vec!["@return int Count"]);
    }

    #[test]
    fn inline_tags_do_not_nest() {
        assert_eq!(brace_delta("See {@link Foo} for {"), 1);
        assert_eq!(brace_delta("{@inheritdoc}"), 0);
    }

    #[test]
    fn default_sentence() {
        assert_eq!(default_value("The key. Default 'id'."), Some("'id'".into()));
        assert_eq!(default_value("Default is 10."), Some("10".into()));
        assert_eq!(default_value("No defaults here."), None);
    }
}
