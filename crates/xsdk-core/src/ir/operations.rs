use serde::Serialize;

use super::shared::Shared;
use super::types::{ContainerKind, HttpMethod, NormalizedName, TypeInfo};
use crate::directive::Directives;

/// One HTTP-verb-bound entry point, shaped for an SDK emitter.
///
/// `Clone` is a shallow copy: every collection is new, but parameters,
/// responses and headers stay [`Shared`] with the source until replaced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub operation_id: NormalizedName,
    pub http_method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,

    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub is_multipart: bool,

    pub all_params: Vec<Shared<Parameter>>,
    pub path_params: Vec<Shared<Parameter>>,
    pub query_params: Vec<Shared<Parameter>>,
    pub header_params: Vec<Shared<Parameter>>,
    pub form_params: Vec<Shared<Parameter>>,
    pub body_params: Vec<Shared<Parameter>>,
    pub required_params: Vec<Shared<Parameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_param: Option<Shared<Parameter>>,

    pub responses: Vec<Shared<Response>>,
    pub response_headers: Vec<Shared<Header>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_base_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_container: Option<ContainerKind>,

    pub imports: Vec<String>,
    pub auth_methods: Vec<String>,
    pub examples: Vec<serde_json::Value>,

    #[serde(rename = "vendorExtensions")]
    pub directives: Directives,
}

impl Operation {
    pub fn new(operation_id: NormalizedName, http_method: HttpMethod, path: &str) -> Self {
        Self {
            operation_id,
            http_method,
            path: path.to_string(),
            summary: None,
            notes: None,
            tags: Vec::new(),
            deprecated: false,
            consumes: Vec::new(),
            produces: Vec::new(),
            is_multipart: false,
            all_params: Vec::new(),
            path_params: Vec::new(),
            query_params: Vec::new(),
            header_params: Vec::new(),
            form_params: Vec::new(),
            body_params: Vec::new(),
            required_params: Vec::new(),
            body_param: None,
            responses: Vec::new(),
            response_headers: Vec::new(),
            return_type: None,
            return_base_type: None,
            return_container: None,
            imports: Vec::new(),
            auth_methods: Vec::new(),
            examples: Vec::new(),
            directives: Directives::default(),
        }
    }

    /// Add a parameter to `all` and to the views matching its location and
    /// required flag. All views hold the same record.
    pub fn push_param(&mut self, param: Parameter) -> Shared<Parameter> {
        let location = param.location;
        let required = param.required;
        let shared = Shared::new(param);
        self.all_params.push(shared.clone());
        match location {
            ParameterLocation::Path => self.path_params.push(shared.clone()),
            ParameterLocation::Query => self.query_params.push(shared.clone()),
            ParameterLocation::Header => self.header_params.push(shared.clone()),
            ParameterLocation::Form => self.form_params.push(shared.clone()),
            ParameterLocation::Body => {
                self.body_params.push(shared.clone());
                self.body_param = Some(shared.clone());
            }
            ParameterLocation::Cookie => {}
        }
        if required {
            self.required_params.push(shared.clone());
        }
        shared
    }

    /// Every parameter list, for edits that must reach all views.
    pub fn param_views_mut(&mut self) -> [&mut Vec<Shared<Parameter>>; 7] {
        [
            &mut self.all_params,
            &mut self.path_params,
            &mut self.query_params,
            &mut self.header_params,
            &mut self.form_params,
            &mut self.body_params,
            &mut self.required_params,
        ]
    }

    pub fn find_param(&self, base_name: &str) -> Option<&Shared<Parameter>> {
        self.all_params
            .iter()
            .find(|p| p.borrow().base_name == base_name)
    }
}

/// Where a parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    Form,
    Body,
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Identifier in generated code.
    pub param_name: String,
    /// Name on the wire.
    pub base_name: String,
    pub location: ParameterLocation,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(flatten)]
    pub type_info: TypeInfo,
    #[serde(rename = "vendorExtensions")]
    pub directives: Directives,
}

impl Parameter {
    pub fn new(param_name: &str, base_name: &str, location: ParameterLocation) -> Self {
        Self {
            param_name: param_name.to_string(),
            base_name: base_name.to_string(),
            location,
            required: false,
            description: None,
            default_value: None,
            type_info: TypeInfo::default(),
            directives: Directives::default(),
        }
    }

    pub fn is_query_param(&self) -> bool {
        self.location == ParameterLocation::Query
    }
}

/// One possible response of an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Status code as written in the OpenAPI document (`200`, `4XX`, `default`).
    pub code: String,
    pub message: String,
    pub is_default: bool,
    #[serde(flatten)]
    pub type_info: TypeInfo,
    pub headers: Vec<Shared<Header>>,
    pub examples: Vec<serde_json::Value>,
    #[serde(rename = "vendorExtensions")]
    pub directives: Directives,
}

impl Response {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            is_default: code == "default",
            type_info: TypeInfo::default(),
            headers: Vec::new(),
            examples: Vec::new(),
            directives: Directives::default(),
        }
    }
}

/// A response header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub type_info: TypeInfo,
}
