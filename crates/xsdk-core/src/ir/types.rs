use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::models::Model;
use super::operations::Operation;

/// The API document the pipeline rewrites.
#[derive(Debug, Clone)]
pub struct Document {
    pub info: Info,
    pub paths: IndexMap<String, PathEntry>,
    pub models: IndexMap<String, Model>,
}

impl Document {
    /// All operations, in path then verb order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.paths.values().flat_map(|entry| entry.operations.values())
    }

    pub fn operations_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        self.paths
            .values_mut()
            .flat_map(|entry| entry.operations.values_mut())
    }
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
}

/// The operations declared on one resource path.
#[derive(Debug, Clone, Default)]
pub struct PathEntry {
    pub operations: IndexMap<HttpMethod, Operation>,
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    /// Every method, in the order operations are read from a path.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name with multiple casing variants pre-computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NormalizedName {
    pub original: String,
    pub pascal_case: String,
    pub camel_case: String,
    pub snake_case: String,
    pub screaming_snake: String,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// Container wrapping a value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Array,
    Map,
}

/// Type description shared by parameters, properties and responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeInfo {
    /// Full type, e.g. `array[FileEntry]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Innermost type, e.g. `FileEntry`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerKind>,
    pub is_primitive: bool,
    pub is_simple: bool,
    pub is_file: bool,
    pub is_binary: bool,
    /// Model named by `base_type`, when it is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl TypeInfo {
    /// A built-in scalar such as `string` or `integer`.
    pub fn primitive(name: &str) -> Self {
        Self {
            data_type: Some(name.to_string()),
            base_type: Some(name.to_string()),
            is_primitive: true,
            is_simple: true,
            ..Self::default()
        }
    }

    /// A reference to a named model.
    pub fn model(name: &str) -> Self {
        Self {
            data_type: Some(name.to_string()),
            base_type: Some(name.to_string()),
            model: Some(name.to_string()),
            is_simple: true,
            ..Self::default()
        }
    }

    /// Wrap `inner` in a container.
    pub fn contained(container: ContainerKind, inner: TypeInfo) -> Self {
        let inner_type = inner.data_type.as_deref().unwrap_or("object");
        let data_type = match container {
            ContainerKind::Array => format!("array[{inner_type}]"),
            ContainerKind::Map => format!("map[string, {inner_type}]"),
        };
        Self {
            data_type: Some(data_type),
            container: Some(container),
            is_simple: false,
            ..inner
        }
    }
}
