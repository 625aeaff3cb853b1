use serde::Serialize;

use super::types::TypeInfo;
use crate::directive::Directives;

/// A named data model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    /// Class name in generated code.
    pub name: String,
    /// Component schema name.
    pub schema_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub all_vars: Vec<Property>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties_type: Option<String>,
    #[serde(rename = "vendorExtensions")]
    pub directives: Directives,
}

impl Model {
    pub fn new(name: &str, schema_name: &str) -> Self {
        Self {
            name: name.to_string(),
            schema_name: schema_name.to_string(),
            description: None,
            all_vars: Vec::new(),
            discriminator: None,
            additional_properties_type: None,
            directives: Directives::default(),
        }
    }

    pub fn find_property(&self, base_name: &str) -> Option<&Property> {
        self.all_vars.iter().find(|p| p.base_name == base_name)
    }

    pub fn find_property_mut(&mut self, base_name: &str) -> Option<&mut Property> {
        self.all_vars.iter_mut().find(|p| p.base_name == base_name)
    }
}

/// A field of a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    /// Identifier in generated code.
    pub name: String,
    /// Name on the wire.
    pub base_name: String,
    pub required: bool,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub type_info: TypeInfo,
    #[serde(rename = "vendorExtensions")]
    pub directives: Directives,
}

impl Property {
    pub fn new(name: &str, base_name: &str) -> Self {
        Self {
            name: name.to_string(),
            base_name: base_name.to_string(),
            required: false,
            read_only: false,
            description: None,
            type_info: TypeInfo::default(),
            directives: Directives::default(),
        }
    }
}
