use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),
}

/// A directive that cannot be applied. Always fatal for the whole run.
#[derive(Debug, Error, PartialEq)]
pub enum DirectiveError {
    #[error("{owner}: directive `{key}` is malformed (expected {expected})")]
    Malformed {
        owner: String,
        key: String,
        expected: &'static str,
    },

    #[error("operation `{operation}`: directive `{key}` refers to unknown operation `{target}`")]
    UnresolvedReference {
        operation: String,
        key: String,
        target: String,
    },
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("directive error: {0}")]
    Directive(#[from] DirectiveError),

    #[error("transform failed: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_names_owner_and_key() {
        let err = DirectiveError::Malformed {
            owner: "model `Project`".to_string(),
            key: "x-sdk-ignore-properties".to_string(),
            expected: "a list of strings",
        };
        assert_eq!(
            err.to_string(),
            "model `Project`: directive `x-sdk-ignore-properties` is malformed (expected a list of strings)"
        );
    }

    #[test]
    fn directive_error_converts_into_transform_error() {
        let err: TransformError = DirectiveError::UnresolvedReference {
            operation: "get_file_ticket".to_string(),
            key: "x-sdk-download-url".to_string(),
            target: "get_file_url".to_string(),
        }
        .into();
        assert!(matches!(err, TransformError::Directive(_)));
        assert!(err.to_string().contains("get_file_url"));
    }
}
