use crate::directive::{Directive, DirectiveKey};
use crate::ir::{Document, HttpMethod, Operation, Parameter, ParameterLocation, TypeInfo};
use crate::naming::NamingUtility;

/// Methods whose operations may take pagination parameters.
const PAGINATED_METHODS: [HttpMethod; 4] = [
    HttpMethod::Get,
    HttpMethod::Put,
    HttpMethod::Post,
    HttpMethod::Delete,
];

/// (name, type, description) of each list query parameter, in order.
const PAGINATION_PARAMS: [(&str, &str, &str); 6] = [
    (
        "filter",
        "string",
        "The filter to apply. (e.g. label=my-label,created>2018-09-22)",
    ),
    (
        "sort",
        "string",
        "The sort fields and order. (e.g. label:asc,created:desc)",
    ),
    ("limit", "integer", "The maximum number of entries to return."),
    ("skip", "integer", "The number of entries to skip."),
    ("page", "integer", "The page number (i.e. skip limit*page entries)"),
    (
        "after_id",
        "string",
        "Paginate after the given id. (Cannot be used with sort, page or skip)",
    ),
];

/// Expand `x-fw-pagination` on every eligible operation of the document.
pub fn expand_pagination(document: &mut Document, naming: &dyn NamingUtility) {
    for entry in document.paths.values_mut() {
        for (method, op) in entry.operations.iter_mut() {
            if PAGINATED_METHODS.contains(method) {
                add_pagination_params(op, naming);
            }
        }
    }
}

/// Append the list query parameters when the operation asks for them.
///
/// Consumes `x-fw-pagination` and `x-fw-default-limit`; the default limit
/// becomes the `limit` parameter's default.
pub fn add_pagination_params(op: &mut Operation, naming: &dyn NamingUtility) {
    if op.directives.remove(DirectiveKey::Pagination).is_none() {
        return;
    }
    let default_limit = match op.directives.remove(DirectiveKey::DefaultLimit) {
        Some(Directive::DefaultLimit(limit)) => Some(limit),
        _ => None,
    };

    for (name, data_type, description) in PAGINATION_PARAMS {
        let mut param = Parameter::new(&naming.to_param_name(name), name, ParameterLocation::Query);
        param.type_info = TypeInfo::primitive(data_type);
        param.description = Some(description.to_string());
        if name == "limit" {
            if let Some(limit) = &default_limit {
                param.directives.insert(Directive::Default(limit.clone()));
            }
        }
        op.push_param(param);
    }
    log::debug!("{}: added pagination parameters", op.operation_id);
}
