use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level project configuration loaded from `.xsdk.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct XsdkConfig {
    pub input: String,
    /// Where to write the processed document. Stdout when unset.
    pub output: Option<String>,
    pub format: OutputFormat,
    pub target: TargetLanguage,
    pub group_by: GroupBy,
    pub references: ReferencePolicy,
    pub pagination: bool,
    pub directives: DirectiveConfig,
}

impl Default for XsdkConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: None,
            format: OutputFormat::Yaml,
            target: TargetLanguage::Python,
            group_by: GroupBy::Tag,
            references: ReferencePolicy::Warn,
            pagination: true,
            directives: DirectiveConfig::default(),
        }
    }
}

/// Serialization format of the processed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// The SDK language whose naming conventions the default naming utility follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetLanguage {
    #[default]
    Python,
    Go,
    Matlab,
}

/// How operations are split into render groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// One group per (first) tag.
    #[default]
    Tag,
    /// One group per operation.
    Operation,
    /// Group by first path segment.
    Route,
}

/// What to do when a derived `download-url` names no operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    Unchecked,
    #[default]
    Warn,
    Strict,
}

/// Directive catalog overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DirectiveConfig {
    /// Extension names (e.g. `x-sdk-modify-info`) to treat as unknown.
    pub disabled: Vec<String>,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".xsdk.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<XsdkConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: XsdkConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# xsdk configuration
input: openapi.yaml
# output: processed.yaml     # omit to write to stdout
format: yaml                 # yaml | json

target: python               # python | go | matlab
group_by: tag                # tag | route | operation

# What to do when a download ticket's companion url operation is missing.
references: warn             # unchecked | warn | strict

# Expand x-fw-pagination into filter/sort/limit/skip/page/after_id query params.
pagination: true

directives:
  disabled: []
    # - x-sdk-modify-classification
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = XsdkConfig::default();
        assert_eq!(config.input, "openapi.yaml");
        assert!(config.output.is_none());
        assert_eq!(config.format, OutputFormat::Yaml);
        assert_eq!(config.target, TargetLanguage::Python);
        assert_eq!(config.group_by, GroupBy::Tag);
        assert_eq!(config.references, ReferencePolicy::Warn);
        assert!(config.pagination);
        assert!(config.directives.disabled.is_empty());
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: swagger.yaml
output: out/processed.json
format: json
target: matlab
group_by: route
references: strict
pagination: false
directives:
  disabled:
    - x-sdk-modify-info
"#;
        let config: XsdkConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "swagger.yaml");
        assert_eq!(config.output.as_deref(), Some("out/processed.json"));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.target, TargetLanguage::Matlab);
        assert_eq!(config.group_by, GroupBy::Route);
        assert_eq!(config.references, ReferencePolicy::Strict);
        assert!(!config.pagination);
        assert_eq!(config.directives.disabled, vec!["x-sdk-modify-info"]);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: XsdkConfig = serde_yaml_ng::from_str("target: go\n").unwrap();
        assert_eq!(config.target, TargetLanguage::Go);
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.group_by, GroupBy::Tag);
    }

    #[test]
    fn test_default_content_parses() {
        let config: XsdkConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.target, TargetLanguage::Python);
        assert!(config.pagination);
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "input: api.yaml\nreferences: unchecked\n").unwrap();
        let config = load_config(&path).unwrap().unwrap();
        assert_eq!(config.input, "api.yaml");
        assert_eq!(config.references, ReferencePolicy::Unchecked);
    }

    #[test]
    fn test_load_config_reports_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "target: cobol\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.starts_with("failed to parse config"));
    }
}
