pub mod document;
pub mod media_type;
pub mod paths;
pub mod refs;
pub mod schema;

use indexmap::IndexMap;

use crate::error::ParseError;
use document::OpenApiSpec;

/// Vendor extensions and any other keys not modeled explicitly.
///
/// Only `x-*` entries are meaningful; the loader ignores the rest.
pub type Extensions = IndexMap<String, serde_json::Value>;

/// Parse an OpenAPI spec from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI spec from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(spec.openapi.clone()));
    }
    Ok(())
}

/// Keep only the `x-*` vendor extensions.
pub fn vendor_extensions(extensions: &Extensions) -> impl Iterator<Item = (&String, &serde_json::Value)> {
    extensions.iter().filter(|(key, _)| key.starts_with("x-"))
}
