//! PHPDoc block parsing.
//!
//! This module turns a raw `/** ... */` comment into a [`DocBlock`]: a short
//! description, a long description, a map of tag name → payloads, and a
//! list of diagnostics for tags that could not be understood.  Parsing never
//! fails; a malformed tag records an error and only that tag is dropped.
//!
//! The description is split at the first blank line.  When there is none,
//! the first sentence (ending in `.`, `?` or `!` and followed by a sentence
//! starting with an uppercase letter) becomes the short description.
//!
//! # Submodules
//!
//! - [`tags`]: tag body grammars (`@param`, `@return`, `@var`, `@throws`,
//!   `@property`, `@see`, nested `@type` blocks) and docblock text
//!   retrieval from the AST.
//! - [`types`]: type token utilities (`split_type_token`,
//!   `is_php_type_hint`, `should_refine_hint`).
//! - [`virtual_members`]: `@method` / `@property` member synthesis.

mod tags;
pub(crate) mod types;
mod virtual_members;

use crate::resolution::TypeContext;
use crate::types::{DocTag, ParamTag, Tags, ThrowsTag, TypedTag};

// ─── Re-exports ─────────────────────────────────────────────────────────────

pub use tags::get_docblock_text_for_node;
pub use types::{is_php_type_hint, should_refine_hint};
pub use virtual_members::{parse_method_tag, property_from_tag};

/// The literal marker asking for the ancestor's documentation.
pub const INHERITDOC: &str = "{@inheritdoc}";

/// A parsed documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    pub short_desc: String,
    pub long_desc: String,
    pub tags: Tags,
    /// One message per tag that could not be parsed.
    pub errors: Vec<String>,
    /// Set by `{@inheritdoc}` as the description or a bare `@inheritdoc`.
    pub inherit_doc: bool,
}

impl DocBlock {
    /// Parse a comment in the global namespace with no enclosing class.
    pub fn parse(raw: &str) -> Self {
        Self::parse_in(raw, &TypeContext::default())
    }

    /// Parse a comment, resolving every type it mentions against `ctx`.
    pub fn parse_in(raw: &str, ctx: &TypeContext) -> Self {
        let lines = tags::comment_lines(raw);
        let (description, regions) = tags::split_regions(&lines);

        let mut doc = DocBlock::default();
        let (short_desc, long_desc) = split_description(&description.join("\n"));
        doc.inherit_doc = short_desc.trim().eq_ignore_ascii_case(INHERITDOC);
        doc.short_desc = short_desc;
        doc.long_desc = long_desc;

        for region in regions {
            let text = region.join("\n");
            let text = &text[1..];
            let (name, body) = match text.find(char::is_whitespace) {
                Some(i) => (&text[..i], text[i..].trim()),
                None => (text, ""),
            };
            let name = name.to_ascii_lowercase();

            if name == "inheritdoc" {
                doc.inherit_doc = true;
                continue;
            }
            if body.is_empty() {
                if tags::MARKER_TAGS.contains(&name.as_str()) {
                    doc.tags
                        .entry(name)
                        .or_default()
                        .push(DocTag::Text(String::new()));
                }
                continue;
            }

            match tags::parse_tag(&name, body, ctx) {
                Ok(tag) => doc.tags.entry(name).or_default().push(tag),
                Err(message) => doc.errors.push(format!("@{} tag: {}", name, message)),
            }
        }

        doc
    }

    pub fn tag(&self, name: &str) -> &[DocTag] {
        self.tags.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// All `@param` payloads in declaration order.
    pub fn params(&self) -> Vec<&ParamTag> {
        self.tag("param")
            .iter()
            .filter_map(|t| match t {
                DocTag::Param(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// The first `@return` payload.
    pub fn return_tag(&self) -> Option<&TypedTag> {
        Self::first_typed(self.tag("return"))
    }

    /// The first `@var` payload.
    pub fn var_tag(&self) -> Option<&TypedTag> {
        Self::first_typed(self.tag("var"))
    }

    fn first_typed(tags: &[DocTag]) -> Option<&TypedTag> {
        tags.iter().find_map(|t| match t {
            DocTag::Typed(typed) => Some(typed),
            _ => None,
        })
    }

    /// `@throws` (and `@throw`) payloads in declaration order.
    pub fn throws(&self) -> Vec<ThrowsTag> {
        self.tag("throws")
            .iter()
            .chain(self.tag("throw"))
            .filter_map(|t| match t {
                DocTag::Throws(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Split description text into `(short, long)`.
///
/// A blank line wins over a sentence break when both are present.
pub fn split_description(text: &str) -> (String, String) {
    let text = text.trim();
    if text.is_empty() {
        return (String::new(), String::new());
    }

    if let Some(idx) = blank_line(text) {
        let short = tags::collapse_lines(&text[..idx]);
        return (short, text[idx..].trim().to_string());
    }

    if let Some((short, long)) = first_sentence(text) {
        return (tags::collapse_lines(short), long.trim().to_string());
    }

    (tags::collapse_lines(text), String::new())
}

/// Byte offset of the first blank line (a line with only whitespace).
fn blank_line(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if offset > 0 && line.trim().is_empty() {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Split after the first `.`, `?` or `!` that is followed by whitespace and
/// an uppercase letter.
fn first_sentence(text: &str) -> Option<(&str, &str)> {
    for (i, c) in text.char_indices() {
        if !matches!(c, '.' | '?' | '!') {
            continue;
        }
        let end = i + c.len_utf8();
        let rest = &text[end..];
        let trimmed = rest.trim_start();
        if trimmed.len() < rest.len() && trimmed.starts_with(|n: char| n.is_uppercase()) {
            return Some((&text[..end], trimmed));
        }
    }
    None
}
