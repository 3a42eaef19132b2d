//! Data types used throughout the documentation builder.
//!
//! This module contains all the "model" structs and enums that represent
//! extracted PHP information (classes, methods, properties, constants,
//! parameters) together with the documentation payloads attached to them.
//!
//! Cross references between classes (parent, interfaces, traits, hint
//! targets) are always stored as names and resolved through the
//! [`Project`](crate::project::Project) registry, never as owned links.
//!
//! Every type here is serde-serializable: the JSON store persists
//! [`ClassInfo`] records verbatim, so field order and map types are chosen
//! to keep the encoding deterministic (`IndexMap` for display-ordered maps,
//! `BTreeMap` for everything else).

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Visibility of a class member (method, property, or constant).
///
/// In PHP, members without an explicit visibility modifier default to `Public`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// Modifier flags shared by classes and members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
}

impl Modifiers {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// One alternative of a (possibly union) type hint.
///
/// `name` is either a built-in type keyword (`string`, `int`, …) or a
/// canonical class reference with a leading `\` (e.g. `\Foo\Bar`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeHint {
    pub name: String,
    /// Whether the alternative was written as `Type[]`.
    pub is_array: bool,
}

impl TypeHint {
    pub fn new(name: impl Into<String>, is_array: bool) -> Self {
        Self {
            name: name.into(),
            is_array,
        }
    }

    /// Whether this alternative refers to a class rather than a built-in type.
    pub fn is_class(&self) -> bool {
        !crate::docblock::is_php_type_hint(&self.name)
    }

    /// Class name without the leading `\`, suitable for registry lookups.
    pub fn class_name(&self) -> Option<&str> {
        if self.is_class() {
            Some(self.name.trim_start_matches('\\'))
        } else {
            None
        }
    }
}

impl std::fmt::Display for TypeHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_array {
            write!(f, "{}[]", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// A union of type alternatives.  An empty hint means "no type information".
pub type Hint = Vec<TypeHint>;

/// Render a hint back to its `A|B[]` source form.
pub fn hint_to_string(hint: &[TypeHint]) -> String {
    hint.iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join("|")
}

/// Payload of a `@param` tag: `[type] [$name] [description]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParamTag {
    pub hint: Hint,
    /// Parameter name without `$` / `&$`, if the tag names one.
    pub name: Option<String>,
    pub description: String,
    /// Structured `@type` entries from a `{ … }` block, in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub sub_params: IndexMap<String, SubParam>,
}

/// Payload of a `@return` or `@var` tag: `[type] [description]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypedTag {
    pub hint: Hint,
    pub description: String,
}

/// Payload of a `@throws` tag: a single class name plus description.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThrowsTag {
    pub class: String,
    pub description: String,
}

/// Payload of a `@property`, `@property-read` or `@property-write` tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PropertyTag {
    pub hint: Hint,
    pub name: String,
    pub description: String,
}

/// Payload of a `@see` tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeeTag {
    /// The full tag body as written.
    pub raw: String,
    /// The reference, resolved to a canonical class name when it names a
    /// class or class member.
    pub reference: String,
    pub description: String,
}

/// Payload of an `@example <path> [description]` tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExampleTag {
    pub path: String,
    pub description: String,
    /// File contents, filled in once the example has been loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A single documentation tag occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DocTag {
    Param(ParamTag),
    Typed(TypedTag),
    Throws(ThrowsTag),
    Property(PropertyTag),
    See(SeeTag),
    Example(ExampleTag),
    /// Any other tag, stored as trimmed raw text.
    Text(String),
}

impl DocTag {
    /// The raw text of a [`DocTag::Text`] payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DocTag::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Tag name → ordered list of payloads.
pub type Tags = BTreeMap<String, Vec<DocTag>>;

/// Structured documentation for one key of an array/object parameter.
///
/// Built fresh from `@type` lines on every parse, so the tree never
/// contains cycles.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubParam {
    pub name: String,
    pub hint: Option<String>,
    pub description: String,
    pub required: bool,
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SubParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_schema: Option<Box<SubParam>>,
}

/// Which documentation fields of a member were copied from an ancestor.
///
/// Recorded so that a later run re-propagates the ancestor's current text
/// instead of treating the earlier copy as the member's own documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inherited {
    pub hint: bool,
    pub hint_desc: bool,
    pub short_desc: bool,
}

impl Inherited {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Stores extracted parameter information from a parsed PHP method.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// The parameter name WITHOUT the `$` prefix.
    pub name: String,
    /// Zero-based position in the signature.
    pub position: usize,
    pub line: usize,
    pub short_desc: String,
    /// Resolved type hint (inline hint, or the `@param` type when absent).
    pub hint: Hint,
    /// Default value as written in source, not evaluated.
    pub default: Option<String>,
    pub is_by_ref: bool,
    pub is_variadic: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub sub_params: IndexMap<String, SubParam>,
    #[serde(default, skip_serializing_if = "Inherited::is_empty")]
    pub inherited: Inherited,
}

/// Stores extracted method information from a parsed PHP class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    pub line: usize,
    pub short_desc: String,
    pub long_desc: String,
    /// Resolved return type.
    pub hint: Hint,
    /// Description from the `@return` tag.
    pub hint_desc: String,
    pub modifiers: Modifiers,
    pub is_by_ref: bool,
    /// Parameters keyed by name, in signature order.
    pub parameters: IndexMap<String, ParameterInfo>,
    pub exceptions: Vec<ThrowsTag>,
    pub tags: Tags,
    pub errors: Vec<String>,
    /// Whether a doc comment preceded the declaration.
    pub has_doc_comment: bool,
    /// Whether the doc comment asked to inherit the ancestor's documentation
    /// (or there was none).
    pub inherits_doc: bool,
    /// Synthesized from a class-level `@method` tag.
    pub is_virtual: bool,
    #[serde(default, skip_serializing_if = "Inherited::is_empty")]
    pub inherited: Inherited,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            ..Self::default()
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterInfo> {
        self.parameters.get(name)
    }

    /// Append a parameter, keeping `position` consistent with the map order.
    pub fn add_parameter(&mut self, mut parameter: ParameterInfo) {
        parameter.position = self.parameters.len();
        self.parameters.insert(parameter.name.clone(), parameter);
    }
}

/// Stores extracted property information from a parsed PHP class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PropertyInfo {
    /// The property name WITHOUT the `$` prefix.
    pub name: String,
    pub line: usize,
    pub short_desc: String,
    pub long_desc: String,
    pub hint: Hint,
    pub hint_desc: String,
    pub modifiers: Modifiers,
    pub tags: Tags,
    pub errors: Vec<String>,
    /// Synthesized from a class-level `@property` tag.
    pub is_virtual: bool,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            ..Self::default()
        }
    }
}

/// Stores extracted constant information from a parsed PHP class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstantInfo {
    pub name: String,
    pub line: usize,
    pub short_desc: String,
    pub long_desc: String,
    /// Value expression as written in source.
    pub value: Option<String>,
    /// From a `@var` tag; constants have no inline hint.
    pub hint: Hint,
    pub hint_desc: String,
    pub modifiers: Modifiers,
    pub tags: Tags,
    pub errors: Vec<String>,
}

impl ConstantInfo {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            ..Self::default()
        }
    }
}

/// The kind of class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Trait,
}

fn loaded_from_store() -> bool {
    true
}

/// Stores extracted class, interface or trait information.
/// All data is owned so we don't depend on the parser's arena lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Fully-qualified name without a leading `\`.
    pub name: String,
    pub kind: ClassKind,
    pub namespace: String,
    pub file: String,
    /// Path of `file` relative to the remote repository root, set by the
    /// source-link visitor.
    pub relative_file: Option<String>,
    pub line: usize,
    /// Content hash of the declaring file.
    pub hash: String,
    pub short_desc: String,
    pub long_desc: String,
    pub tags: Tags,
    pub modifiers: Modifiers,
    /// Parent class name from the `extends` clause (classes only).
    pub parent: Option<String>,
    /// Implemented interfaces, or extended interfaces for an interface.
    pub interfaces: Vec<String>,
    pub traits: Vec<String>,
    /// `use` aliases active where the class was declared.
    pub aliases: BTreeMap<String, String>,
    pub methods: IndexMap<String, MethodInfo>,
    pub properties: IndexMap<String, PropertyInfo>,
    pub constants: IndexMap<String, ConstantInfo>,
    pub errors: Vec<String>,
    /// `false` for declarations rejected by the member filter: they are
    /// kept for name resolution only and are never documented.
    pub is_project_class: bool,
    /// Set when the record was read from the store rather than parsed in
    /// this run.  Never persisted.
    #[serde(skip, default = "loaded_from_store")]
    pub from_cache: bool,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, kind: ClassKind, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            line,
            is_project_class: true,
            ..Self::default()
        }
    }

    /// The last segment of the fully-qualified name.
    pub fn short_name(&self) -> &str {
        crate::util::short_name(&self.name)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_trait(&self) -> bool {
        self.kind == ClassKind::Trait
    }

    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.get(name)
    }

    pub fn tag(&self, name: &str) -> &[DocTag] {
        self.tags.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_method(&mut self, method: MethodInfo) {
        self.methods.insert(method.name.clone(), method);
    }

    pub fn add_property(&mut self, property: PropertyInfo) {
        self.properties.insert(property.name.clone(), property);
    }

    pub fn add_constant(&mut self, constant: ConstantInfo) {
        self.constants.insert(constant.name.clone(), constant);
    }

    /// Names of the parent and interfaces, the classes that must be
    /// enriched before this one.
    pub fn ancestry(&self) -> impl Iterator<Item = &str> {
        self.parent
            .iter()
            .map(String::as_str)
            .chain(self.interfaces.iter().map(String::as_str))
    }
}
