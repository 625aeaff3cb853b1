//! Typed vendor-extension directives.
//!
//! Every recognized `x-*` extension is decoded once, at load time, into a
//! [`Directive`] variant. Rewrite rules match on variants; they never probe raw
//! JSON values.

pub mod catalog;

use std::fmt;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::parse::Extensions;

pub use catalog::{CatalogEntry, DirectiveCatalog, Payload};

/// The kind of document element a directive is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveScope {
    Model,
    Property,
    Operation,
    Parameter,
    Response,
}

impl DirectiveScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveScope::Model => "model",
            DirectiveScope::Property => "property",
            DirectiveScope::Operation => "operation",
            DirectiveScope::Parameter => "parameter",
            DirectiveScope::Response => "response",
        }
    }
}

impl fmt::Display for DirectiveScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a directive independently of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKey {
    IgnoreProperties,
    IncludeEmpty,
    ContainerMixin,
    Positional,
    PositionalParam,
    GetZipInfo,
    DownloadTicket,
    DownloadUrl,
    ModifyInfo,
    ModifyClassification,
    ModifyWrapper,
    DownloadFileParam,
    Default,
    Pagination,
    DefaultLimit,
    MatlabBaseName,
}

impl DirectiveKey {
    /// The vendor extension name the directive is written as.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DirectiveKey::IgnoreProperties => "x-sdk-ignore-properties",
            DirectiveKey::IncludeEmpty => "x-sdk-include-empty",
            DirectiveKey::ContainerMixin => "x-sdk-container-mixin",
            DirectiveKey::Positional => "x-sdk-positional",
            DirectiveKey::PositionalParam => "x-sdk-positional-param",
            DirectiveKey::GetZipInfo => "x-sdk-get-zip-info",
            DirectiveKey::DownloadTicket => "x-sdk-download-ticket",
            DirectiveKey::DownloadUrl => "x-sdk-download-url",
            DirectiveKey::ModifyInfo => "x-sdk-modify-info",
            DirectiveKey::ModifyClassification => "x-sdk-modify-classification",
            DirectiveKey::ModifyWrapper => "x-sdk-modify-wrapper",
            DirectiveKey::DownloadFileParam => "x-sdk-download-file-param",
            DirectiveKey::Default => "x-sdk-default",
            DirectiveKey::Pagination => "x-fw-pagination",
            DirectiveKey::DefaultLimit => "x-fw-default-limit",
            DirectiveKey::MatlabBaseName => "x-matlab-baseName",
        }
    }
}

impl fmt::Display for DirectiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name that the naming utility may still have to canonicalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameRef {
    /// As written in the OpenAPI document.
    Raw(String),
    /// Already in the generator's canonical form.
    Resolved(String),
}

impl NameRef {
    pub fn as_str(&self) -> &str {
        match self {
            NameRef::Raw(name) | NameRef::Resolved(name) => name,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, NameRef::Resolved(_))
    }

    /// Canonicalize with `f` unless already done.
    pub fn resolve_with(&mut self, f: impl FnOnce(&str) -> String) -> &str {
        if let NameRef::Raw(raw) = self {
            *self = NameRef::Resolved(f(raw));
        }
        self.as_str()
    }
}

impl Serialize for NameRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Semantic key of a modify wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapperKey {
    Set,
    Add,
    Replace,
    Delete,
}

/// One convenience variant the emitter generates for a `modify_*` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapperDescriptor {
    pub wrapper_id: String,
    pub summary: String,
    pub key: WrapperKey,
}

/// A decoded directive with its typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Model: wire names of properties to drop.
    IgnoreProperties(Vec<String>),
    /// Model: wire names of properties that serialize even when empty.
    IncludeEmpty(Vec<String>),
    /// Property: serialize even when empty.
    IncludeEmptyMarker,
    /// Model: name of a model whose fields are mixed into containers.
    ContainerMixin(NameRef),
    /// Property: constructor takes this property positionally.
    Positional,
    /// Model: the positional property's name.
    PositionalParam(String),
    /// Operation: id seed of a zip-listing sibling.
    GetZipInfo(String),
    /// Operation: id seed of the ticket half of a ticketed download.
    DownloadTicket(String),
    /// Operation: id of the operation that completes a ticketed download.
    DownloadUrl(String),
    ModifyInfo,
    ModifyClassification,
    /// Operation: set/replace/delete convenience wrappers.
    ModifyWrapper(Vec<WrapperDescriptor>),
    /// Operation or response: parameter receiving the destination file path.
    DownloadFileParam(NameRef),
    /// Parameter: default value rendered by the SDK.
    Default(String),
    /// Operation: takes the standard list query parameters.
    Pagination,
    /// Operation: default for the `limit` pagination parameter.
    DefaultLimit(String),
    /// Property: label valid as a MATLAB field name.
    MatlabBaseName(String),
}

impl Directive {
    pub fn key(&self) -> DirectiveKey {
        match self {
            Directive::IgnoreProperties(_) => DirectiveKey::IgnoreProperties,
            Directive::IncludeEmpty(_) | Directive::IncludeEmptyMarker => DirectiveKey::IncludeEmpty,
            Directive::ContainerMixin(_) => DirectiveKey::ContainerMixin,
            Directive::Positional => DirectiveKey::Positional,
            Directive::PositionalParam(_) => DirectiveKey::PositionalParam,
            Directive::GetZipInfo(_) => DirectiveKey::GetZipInfo,
            Directive::DownloadTicket(_) => DirectiveKey::DownloadTicket,
            Directive::DownloadUrl(_) => DirectiveKey::DownloadUrl,
            Directive::ModifyInfo => DirectiveKey::ModifyInfo,
            Directive::ModifyClassification => DirectiveKey::ModifyClassification,
            Directive::ModifyWrapper(_) => DirectiveKey::ModifyWrapper,
            Directive::DownloadFileParam(_) => DirectiveKey::DownloadFileParam,
            Directive::Default(_) => DirectiveKey::Default,
            Directive::Pagination => DirectiveKey::Pagination,
            Directive::DefaultLimit(_) => DirectiveKey::DefaultLimit,
            Directive::MatlabBaseName(_) => DirectiveKey::MatlabBaseName,
        }
    }
}

impl Serialize for Directive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Directive::IgnoreProperties(names) | Directive::IncludeEmpty(names) => {
                names.serialize(serializer)
            }
            Directive::IncludeEmptyMarker
            | Directive::Positional
            | Directive::ModifyInfo
            | Directive::ModifyClassification
            | Directive::Pagination => serializer.serialize_bool(true),
            Directive::ContainerMixin(name) | Directive::DownloadFileParam(name) => {
                name.serialize(serializer)
            }
            Directive::PositionalParam(text)
            | Directive::GetZipInfo(text)
            | Directive::DownloadTicket(text)
            | Directive::DownloadUrl(text)
            | Directive::Default(text)
            | Directive::DefaultLimit(text)
            | Directive::MatlabBaseName(text) => serializer.serialize_str(text),
            Directive::ModifyWrapper(wrappers) => wrappers.serialize(serializer),
        }
    }
}

/// The directives attached to one document element.
///
/// Keys are unique and kept in insertion order. Extensions the catalog does not
/// recognize for the element's scope ride along untouched in `passthrough`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directives {
    entries: IndexMap<DirectiveKey, Directive>,
    passthrough: Extensions,
}

impl Directives {
    /// Insert a directive under its own key, returning the one it replaced.
    pub fn insert(&mut self, directive: Directive) -> Option<Directive> {
        self.entries.insert(directive.key(), directive)
    }

    pub fn get(&self, key: DirectiveKey) -> Option<&Directive> {
        self.entries.get(&key)
    }

    pub fn get_mut(&mut self, key: DirectiveKey) -> Option<&mut Directive> {
        self.entries.get_mut(&key)
    }

    /// Remove a directive, keeping the order of the rest.
    pub fn remove(&mut self, key: DirectiveKey) -> Option<Directive> {
        self.entries.shift_remove(&key)
    }

    pub fn contains(&self, key: DirectiveKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.passthrough.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.entries.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = DirectiveKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn passthrough(&self) -> &Extensions {
        &self.passthrough
    }

    pub fn insert_passthrough(&mut self, name: &str, value: serde_json::Value) {
        self.passthrough.insert(name.to_string(), value);
    }

    /// The text payload of a single-string directive.
    pub fn text(&self, key: DirectiveKey) -> Option<&str> {
        match self.get(key)? {
            Directive::PositionalParam(text)
            | Directive::GetZipInfo(text)
            | Directive::DownloadTicket(text)
            | Directive::DownloadUrl(text)
            | Directive::Default(text)
            | Directive::DefaultLimit(text)
            | Directive::MatlabBaseName(text) => Some(text),
            Directive::ContainerMixin(name) | Directive::DownloadFileParam(name) => {
                Some(name.as_str())
            }
            _ => None,
        }
    }
}

impl Serialize for Directives {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, directive) in &self.entries {
            map.serialize_entry(key.as_str(), directive)?;
        }
        for (name, value) in &self.passthrough {
            if !self.entries.keys().any(|k| k.as_str() == name) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

impl FromIterator<Directive> for Directives {
    fn from_iter<I: IntoIterator<Item = Directive>>(iter: I) -> Self {
        let mut directives = Directives::default();
        for directive in iter {
            directives.insert(directive);
        }
        directives
    }
}
