//! Member filters.
//!
//! A filter decides which declarations end up in the documentation.
//! Rejected classes are still registered (so other classes can refer to
//! them) but get no members; rejected methods and properties are dropped.

use serde::{Deserialize, Serialize};

use crate::types::{ClassInfo, MethodInfo, PropertyInfo, Visibility};

pub trait Filter {
    fn accept_class(&self, class: &ClassInfo) -> bool;
    fn accept_method(&self, method: &MethodInfo) -> bool;
    fn accept_property(&self, property: &PropertyInfo) -> bool;
}

/// Accept every class and every member.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrueFilter;

impl Filter for TrueFilter {
    fn accept_class(&self, _class: &ClassInfo) -> bool {
        true
    }

    fn accept_method(&self, _method: &MethodInfo) -> bool {
        true
    }

    fn accept_property(&self, _property: &PropertyInfo) -> bool {
        true
    }
}

/// Accept every class, but only public methods and properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilter;

impl Filter for DefaultFilter {
    fn accept_class(&self, _class: &ClassInfo) -> bool {
        true
    }

    fn accept_method(&self, method: &MethodInfo) -> bool {
        method.modifiers.is_public()
    }

    fn accept_property(&self, property: &PropertyInfo) -> bool {
        property.modifiers.is_public()
    }
}

/// Accept every class and every non-private member.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcludePrivateFilter;

impl Filter for ExcludePrivateFilter {
    fn accept_class(&self, _class: &ClassInfo) -> bool {
        true
    }

    fn accept_method(&self, method: &MethodInfo) -> bool {
        method.modifiers.visibility != Visibility::Private
    }

    fn accept_property(&self, property: &PropertyInfo) -> bool {
        property.modifiers.visibility != Visibility::Private
    }
}

/// Accept only classes and public methods tagged `@api`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiFilter;

impl Filter for ApiFilter {
    fn accept_class(&self, class: &ClassInfo) -> bool {
        class.tags.contains_key("api")
    }

    fn accept_method(&self, method: &MethodInfo) -> bool {
        method.modifiers.is_public() && method.tags.contains_key("api")
    }

    fn accept_property(&self, property: &PropertyInfo) -> bool {
        property.modifiers.is_public()
    }
}

/// Configuration name of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    Default,
    All,
    #[serde(rename = "exclude_private")]
    ExcludePrivate,
    Api,
}

impl FilterKind {
    pub fn build(self) -> Box<dyn Filter> {
        match self {
            FilterKind::Default => Box::new(DefaultFilter),
            FilterKind::All => Box::new(TrueFilter),
            FilterKind::ExcludePrivate => Box::new(ExcludePrivateFilter),
            FilterKind::Api => Box::new(ApiFilter),
        }
    }
}
