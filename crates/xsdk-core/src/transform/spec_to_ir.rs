use indexmap::IndexMap;

use crate::directive::{DirectiveCatalog, DirectiveScope};
use crate::error::TransformError;
use crate::ir::{
    Document, Header, HttpMethod, Info, Model, Operation, Parameter, ParameterLocation, PathEntry,
    Property, Response, Shared, TypeInfo,
};
use crate::naming::{NamingUtility, normalize_name, route_to_name};
use crate::parse::document::{OpenApiSpec, SecurityRequirement};
use crate::parse::media_type;
use crate::parse::paths::{
    self, MediaType, Operation as SpecOperation, PathItem, RequestBody, Response as SpecResponse,
};
use crate::parse::refs::{RefOr, RefResolver};
use crate::parse::schema::{Schema, SchemaOrRef};

use super::type_resolver::{additional_properties_type, file_type, schema_or_ref_type};

/// Build the generator document from a parsed spec.
///
/// Every vendor extension is decoded by `catalog` here; a malformed directive
/// fails the load.
pub fn load_document(
    spec: &OpenApiSpec,
    catalog: &DirectiveCatalog,
    naming: &dyn NamingUtility,
) -> Result<Document, TransformError> {
    // Phase 1: Inline parameter/response/request body refs
    let resolved = RefResolver::new(spec).resolve_spec(spec)?;

    let loader = Loader {
        catalog,
        naming,
        security: resolved.security.as_deref().unwrap_or_default(),
    };

    // Phase 2: Models from component schemas
    let mut models = IndexMap::new();
    if let Some(components) = &resolved.components {
        for (name, schema_or_ref) in &components.schemas {
            match schema_or_ref {
                RefOr::Item(schema) => {
                    models.insert(name.clone(), loader.build_model(name, schema)?);
                }
                RefOr::Ref { ref_path } => {
                    log::debug!("schema {name} aliases {ref_path}, no model generated");
                }
            }
        }
    }

    // Phase 3: Operations per path, in verb order
    let mut paths = IndexMap::new();
    for (path, item) in &resolved.paths {
        paths.insert(path.clone(), loader.build_path_entry(path, item)?);
    }

    Ok(Document {
        info: Info {
            title: resolved.info.title.clone(),
            description: resolved.info.description.clone(),
            version: resolved.info.version.clone(),
        },
        paths,
        models,
    })
}

struct Loader<'a> {
    catalog: &'a DirectiveCatalog,
    naming: &'a dyn NamingUtility,
    security: &'a [SecurityRequirement],
}

impl Loader<'_> {
    fn build_model(&self, name: &str, schema: &Schema) -> Result<Model, TransformError> {
        let owner = format!("model `{name}`");
        let mut model = Model::new(&self.naming.to_model_name(name), name);
        model.description = schema.description.clone();
        model.discriminator = schema
            .discriminator
            .as_ref()
            .map(|d| d.property_name.clone());
        model.additional_properties_type = additional_properties_type(schema, self.naming);
        model.directives = self
            .catalog
            .interpret(DirectiveScope::Model, &owner, &schema.extensions)?;

        // Inline allOf parts contribute their properties
        let parts = schema.all_of.iter().filter_map(|part| match part {
            RefOr::Item(inline) => Some(inline.as_ref()),
            RefOr::Ref { .. } => None,
        });
        for source in std::iter::once(schema).chain(parts) {
            for (prop_name, prop_schema) in &source.properties {
                let property = self.build_property(name, source, prop_name, prop_schema)?;
                model.all_vars.push(property);
            }
        }
        Ok(model)
    }

    fn build_property(
        &self,
        model_name: &str,
        parent: &Schema,
        name: &str,
        schema_or_ref: &SchemaOrRef,
    ) -> Result<Property, TransformError> {
        let mut property = Property::new(&self.naming.to_var_name(name), name);
        property.required = parent.required.iter().any(|r| r == name);
        property.type_info = schema_or_ref_type(schema_or_ref, self.naming);
        if let RefOr::Item(schema) = schema_or_ref {
            property.description = schema.description.clone();
            property.read_only = schema.read_only.unwrap_or(false);
            let owner = format!("property `{model_name}.{name}`");
            property.directives =
                self.catalog
                    .interpret(DirectiveScope::Property, &owner, &schema.extensions)?;
        }
        Ok(property)
    }

    fn build_path_entry(&self, path: &str, item: &PathItem) -> Result<PathEntry, TransformError> {
        let mut entry = PathEntry::default();

        for method in HttpMethod::ALL {
            if let Some(op) = item.operation(method.as_str()) {
                let built = self.build_operation(method, path, &item.parameters, op)?;
                entry.operations.insert(method, built);
            }
        }

        Ok(entry)
    }

    fn build_operation(
        &self,
        method: HttpMethod,
        path: &str,
        path_params: &[RefOr<paths::Parameter>],
        op: &SpecOperation,
    ) -> Result<Operation, TransformError> {
        let raw_id = op
            .operation_id
            .clone()
            .unwrap_or_else(|| route_to_name(method.as_str(), path));
        let owner = format!("operation `{raw_id}`");

        let mut operation = Operation::new(
            normalize_name(&self.naming.to_operation_id(&raw_id)),
            method,
            path,
        );
        operation.summary = op.summary.clone();
        operation.notes = op.description.clone();
        operation.tags = op.tags.clone();
        operation.deprecated = op.deprecated;
        operation.directives =
            self.catalog
                .interpret(DirectiveScope::Operation, &owner, &op.extensions)?;

        for param in merge_parameters(path_params, &op.parameters)? {
            let built = self.build_parameter(&owner, param)?;
            operation.push_param(built);
        }

        if let Some(body) = &op.request_body {
            let RefOr::Item(body) = body else {
                return Err(TransformError::Other(format!(
                    "{owner}: request body reference was not resolved"
                )));
            };
            self.add_request_body(&mut operation, body);
        }

        for (code, response) in &op.responses {
            let RefOr::Item(response) = response else {
                return Err(TransformError::Other(format!(
                    "{owner}: response `{code}` reference was not resolved"
                )));
            };
            self.add_response(&mut operation, &owner, code, response)?;
        }
        set_return_type(&mut operation);
        collect_imports(&mut operation);

        let security = op.security.as_deref().unwrap_or(self.security);
        for requirement in security {
            for scheme in requirement.keys() {
                if !operation.auth_methods.contains(scheme) {
                    operation.auth_methods.push(scheme.clone());
                }
            }
        }

        Ok(operation)
    }

    fn build_parameter(
        &self,
        owner: &str,
        param: &paths::Parameter,
    ) -> Result<Parameter, TransformError> {
        let location = match param.location {
            paths::ParameterLocation::Path => ParameterLocation::Path,
            paths::ParameterLocation::Query => ParameterLocation::Query,
            paths::ParameterLocation::Header => ParameterLocation::Header,
            paths::ParameterLocation::Cookie => ParameterLocation::Cookie,
        };
        let mut built = Parameter::new(&self.naming.to_param_name(&param.name), &param.name, location);
        // Path parameters are always required
        built.required = param.required || location == ParameterLocation::Path;
        built.description = param.description.clone();
        if let Some(schema) = &param.schema {
            built.type_info = schema_or_ref_type(schema, self.naming);
            if let RefOr::Item(inline) = schema {
                built.default_value = inline.default_value.clone();
            }
        } else {
            built.type_info = TypeInfo::primitive("string");
        }
        let param_owner = format!("parameter `{}` of {owner}", param.name);
        built.directives =
            self.catalog
                .interpret(DirectiveScope::Parameter, &param_owner, &param.extensions)?;
        Ok(built)
    }

    /// JSON-like bodies become one `body` parameter, form bodies one parameter per field.
    fn add_request_body(&self, operation: &mut Operation, body: &RequestBody) {
        operation.consumes = body.content.keys().cloned().collect();
        let Some((content_type, media)) = body.content.first() else {
            return;
        };

        let form_fields = media.schema.as_ref().and_then(|s| match s {
            RefOr::Item(schema) if !schema.properties.is_empty() => Some(schema),
            _ => None,
        });

        match form_fields {
            Some(schema) if media_type::is_form_content(content_type) => {
                operation.is_multipart = content_type == media_type::MULTIPART_FORM;
                for (name, field) in &schema.properties {
                    let mut param =
                        Parameter::new(&self.naming.to_param_name(name), name, ParameterLocation::Form);
                    param.required = schema.required.iter().any(|r| r == name);
                    param.type_info = schema_or_ref_type(field, self.naming);
                    if let RefOr::Item(inline) = field {
                        param.description = inline.description.clone();
                    }
                    operation.push_param(param);
                }
            }
            _ => {
                let mut param = Parameter::new("body", "body", ParameterLocation::Body);
                param.required = body.required;
                param.description = body.description.clone();
                param.type_info = media_type_info(content_type, media, self.naming);
                operation.push_param(param);
            }
        }
    }

    fn add_response(
        &self,
        operation: &mut Operation,
        owner: &str,
        code: &str,
        response: &SpecResponse,
    ) -> Result<(), TransformError> {
        let mut built = Response::new(code, &response.description);

        // Prefer the JSON rendition when several are offered
        let preferred = response
            .content
            .get_key_value(media_type::APPLICATION_JSON)
            .or_else(|| response.content.first());
        if let Some((content_type, media)) = preferred {
            built.type_info = media_type_info(content_type, media, self.naming);
        }
        for (content_type, media) in &response.content {
            if !operation.produces.contains(content_type) {
                operation.produces.push(content_type.clone());
            }
            if let Some(example) = &media.example {
                built.examples.push(example.clone());
            }
        }

        for (name, header) in &response.headers {
            built.headers.push(Shared::new(Header {
                name: name.clone(),
                description: header.description.clone(),
                type_info: header
                    .schema
                    .as_ref()
                    .map(|s| schema_or_ref_type(s, self.naming))
                    .unwrap_or_else(|| TypeInfo::primitive("string")),
            }));
        }

        let response_owner = format!("response `{code}` of {owner}");
        built.directives =
            self.catalog
                .interpret(DirectiveScope::Response, &response_owner, &response.extensions)?;

        operation.responses.push(Shared::new(built));
        Ok(())
    }
}

/// Path-level parameters followed by the operation's; the operation wins on
/// a (name, location) clash.
fn merge_parameters<'p>(
    path_params: &'p [RefOr<paths::Parameter>],
    op_params: &'p [RefOr<paths::Parameter>],
) -> Result<Vec<&'p paths::Parameter>, TransformError> {
    let mut merged: Vec<&paths::Parameter> = Vec::new();
    for param in path_params.iter().chain(op_params) {
        let RefOr::Item(param) = param else {
            return Err(TransformError::Other(
                "parameter reference was not resolved".to_string(),
            ));
        };
        match merged
            .iter()
            .position(|p| p.name == param.name && p.location == param.location)
        {
            Some(index) => merged[index] = param,
            None => merged.push(param),
        }
    }
    Ok(merged)
}

fn media_type_info(content_type: &str, media: &MediaType, naming: &dyn NamingUtility) -> TypeInfo {
    match &media.schema {
        Some(schema) => schema_or_ref_type(schema, naming),
        None if content_type == media_type::OCTET_STREAM => file_type(),
        None => TypeInfo::default(),
    }
}

/// Return type from the first 2xx response, else the default response.
fn set_return_type(operation: &mut Operation) {
    let success = operation
        .responses
        .iter()
        .find(|r| r.borrow().code.starts_with('2'))
        .or_else(|| operation.responses.iter().find(|r| r.borrow().is_default))
        .cloned();
    let Some(success) = success else {
        return;
    };
    let success = success.borrow();
    operation.return_type = success.type_info.data_type.clone();
    operation.return_base_type = success.type_info.base_type.clone();
    operation.return_container = success.type_info.container;
    operation.response_headers = success.headers.clone();
}

fn collect_imports(operation: &mut Operation) {
    let params = operation.all_params.iter().map(|p| p.borrow().type_info.model.clone());
    let responses = operation
        .responses
        .iter()
        .map(|r| r.borrow().type_info.model.clone());
    let mut imports: Vec<String> = Vec::new();
    for model in params.chain(responses).flatten() {
        if !imports.contains(&model) {
            imports.push(model);
        }
    }
    operation.imports = imports;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetLanguage;
    use crate::directive::{Directive, DirectiveKey};
    use crate::error::DirectiveError;
    use crate::naming::TargetNaming;
    use crate::parse;

    const SPEC: &str = r#"
openapi: 3.0.3
info:
  title: Files
  version: "1.0"
security:
  - ApiKey: []
paths:
  /projects/{id}/files/{name}:
    parameters:
      - name: id
        in: path
        schema: {type: string}
      - name: name
        in: path
        required: true
        schema: {type: string}
    get:
      operationId: download_file_from_project
      tags: [projects, files]
      x-sdk-download-ticket: get_project_download_ticket
      x-sdk-get-zip-info: get_project_file_zip_info
      x-codegen-hint: keep
      parameters:
        - name: ticket
          in: query
          schema: {type: string}
        - name: info
          in: query
          schema: {type: boolean, default: false}
      responses:
        '200':
          description: The file
          content:
            application/octet-stream: {}
            application/json:
              schema:
                $ref: '#/components/schemas/download-ticket'
        default:
          description: Error
  /projects/{id}/files:
    post:
      operationId: upload_files_to_project
      requestBody:
        content:
          multipart/form-data:
            schema:
              type: object
              required: [file]
              properties:
                file: {type: string, format: binary}
                metadata: {type: string}
      responses:
        '200':
          description: OK
  /projects/{id}/info:
    post:
      operationId: modify_project_info
      x-sdk-modify-info: true
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/info-update'
      responses:
        '200':
          description: OK
components:
  schemas:
    download-ticket:
      type: object
      x-sdk-container-mixin: ticket-mixin
      properties:
        ticket:
          type: string
          x-sdk-positional: true
        filename: {type: string}
    info-update:
      allOf:
        - $ref: '#/components/schemas/download-ticket'
        - type: object
          required: [set]
          properties:
            set: {type: object}
            delete:
              type: array
              items: {type: string}
"#;

    fn load(source: &str) -> Result<Document, TransformError> {
        let spec = parse::from_yaml(source).unwrap();
        load_document(
            &spec,
            &DirectiveCatalog::standard(),
            &TargetNaming::new(TargetLanguage::Python),
        )
    }

    #[test]
    fn loads_operations_with_directives() {
        let doc = load(SPEC).unwrap();
        let op = &doc.paths["/projects/{id}/files/{name}"].operations[&HttpMethod::Get];
        assert_eq!(op.operation_id.original, "download_file_from_project");
        assert_eq!(op.operation_id.camel_case, "downloadFileFromProject");
        assert_eq!(op.tags, vec!["projects", "files"]);
        assert_eq!(
            op.directives.get(DirectiveKey::DownloadTicket),
            Some(&Directive::DownloadTicket("get_project_download_ticket".into()))
        );
        assert!(op.directives.contains(DirectiveKey::GetZipInfo));
        assert_eq!(op.directives.passthrough()["x-codegen-hint"], "keep");
        assert_eq!(op.auth_methods, vec!["ApiKey"]);
    }

    #[test]
    fn parameter_views_share_records() {
        let doc = load(SPEC).unwrap();
        let op = &doc.paths["/projects/{id}/files/{name}"].operations[&HttpMethod::Get];
        assert_eq!(op.all_params.len(), 4);
        assert_eq!(op.path_params.len(), 2);
        assert_eq!(op.query_params.len(), 2);
        // Path parameters are required even when the document forgets to say so
        assert_eq!(op.required_params.len(), 2);
        assert!(op.all_params[2].ptr_eq(&op.query_params[0]));
        assert_eq!(
            op.query_params[1].borrow().default_value,
            Some(serde_json::json!(false))
        );
    }

    #[test]
    fn responses_prefer_json_and_set_return_type() {
        let doc = load(SPEC).unwrap();
        let op = &doc.paths["/projects/{id}/files/{name}"].operations[&HttpMethod::Get];
        assert_eq!(op.responses.len(), 2);
        assert_eq!(op.produces, vec!["application/octet-stream", "application/json"]);
        assert_eq!(op.return_type.as_deref(), Some("DownloadTicket"));
        assert_eq!(op.imports, vec!["DownloadTicket"]);
        assert!(op.responses[1].borrow().is_default);
    }

    #[test]
    fn multipart_body_becomes_form_params() {
        let doc = load(SPEC).unwrap();
        let op = &doc.paths["/projects/{id}/files"].operations[&HttpMethod::Post];
        assert!(op.is_multipart);
        assert_eq!(op.form_params.len(), 2);
        let file = op.find_param("file").unwrap().borrow().clone();
        assert!(file.type_info.is_file);
        assert!(file.required);
        assert!(op.body_param.is_none());
    }

    #[test]
    fn json_body_is_a_single_parameter() {
        let doc = load(SPEC).unwrap();
        let op = &doc.paths["/projects/{id}/info"].operations[&HttpMethod::Post];
        let body = op.body_param.as_ref().unwrap().borrow().clone();
        assert_eq!(body.base_name, "body");
        assert!(body.required);
        assert_eq!(body.type_info.model.as_deref(), Some("InfoUpdate"));
        assert_eq!(op.consumes, vec!["application/json"]);
        assert!(op.directives.contains(DirectiveKey::ModifyInfo));
    }

    #[test]
    fn models_merge_inline_all_of_parts() {
        let doc = load(SPEC).unwrap();
        let ticket = &doc.models["download-ticket"];
        assert_eq!(ticket.name, "DownloadTicket");
        assert!(ticket.directives.contains(DirectiveKey::ContainerMixin));
        assert!(
            ticket.find_property("ticket").unwrap().directives.contains(DirectiveKey::Positional)
        );

        let update = &doc.models["info-update"];
        let names: Vec<&str> = update.all_vars.iter().map(|p| p.base_name.as_str()).collect();
        assert_eq!(names, vec!["set", "delete"]);
        assert!(update.find_property("set").unwrap().required);
        assert_eq!(
            update.find_property("delete").unwrap().type_info.data_type.as_deref(),
            Some("array[string]")
        );
    }

    #[test]
    fn malformed_directive_fails_the_load() {
        let bad = SPEC.replace(
            "x-sdk-get-zip-info: get_project_file_zip_info",
            "x-sdk-get-zip-info: [oops]",
        );
        let err = load(&bad).unwrap_err();
        match err {
            TransformError::Directive(DirectiveError::Malformed { owner, key, .. }) => {
                assert_eq!(owner, "operation `download_file_from_project`");
                assert_eq!(key, "x-sdk-get-zip-info");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_operation_id_is_derived_from_route() {
        let spec = r#"
openapi: 3.0.3
info: {title: T, version: "1"}
paths:
  /projects/{id}:
    delete:
      responses:
        '200': {description: OK}
"#;
        let doc = load(spec).unwrap();
        let op = &doc.paths["/projects/{id}"].operations[&HttpMethod::Delete];
        assert_eq!(op.operation_id.original, "delete_project");
    }
}
