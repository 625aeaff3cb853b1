use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

use crate::config::TargetLanguage;
use crate::ir::NormalizedName;

/// Identifier conventions of the SDK being generated.
///
/// The pipeline never cases or escapes names itself; it asks this.
pub trait NamingUtility {
    /// Method name for an operation id.
    fn to_operation_id(&self, operation_id: &str) -> String;

    /// Class name for a schema name.
    fn to_model_name(&self, name: &str) -> String;

    /// Identifier for an operation parameter.
    fn to_param_name(&self, name: &str) -> String;

    /// Identifier for a model property or local variable.
    fn to_var_name(&self, name: &str) -> String;

    /// Fixed property identifier for an awkward wire name, if the target has one.
    fn property_substitution(&self, _base_name: &str) -> Option<String> {
        None
    }

    /// Alternate label for a property's wire name, if the target needs one.
    fn label_name(&self, _base_name: &str) -> Option<String> {
        None
    }
}

const PYTHON_RESERVED: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "exec", "false", "finally", "for", "from", "global", "if", "import", "in",
    "is", "lambda", "none", "nonlocal", "not", "or", "pass", "print", "property", "raise",
    "return", "self", "true", "try", "while", "with", "yield",
];

const GO_RESERVED: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for",
    "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return",
    "select", "struct", "switch", "type", "var",
];

const MATLAB_RESERVED: &[&str] = &[
    "break", "case", "catch", "classdef", "continue", "else", "elseif", "end", "for", "function",
    "global", "if", "otherwise", "parfor", "persistent", "return", "spmd", "switch", "try", "while",
];

/// The naming utility for one of the supported SDK targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetNaming {
    target: TargetLanguage,
}

impl TargetNaming {
    pub fn new(target: TargetLanguage) -> Self {
        Self { target }
    }

    pub fn target(&self) -> TargetLanguage {
        self.target
    }

    fn is_reserved(&self, name: &str) -> bool {
        let words = match self.target {
            TargetLanguage::Python => PYTHON_RESERVED,
            TargetLanguage::Go => GO_RESERVED,
            TargetLanguage::Matlab => MATLAB_RESERVED,
        };
        words.contains(&name.to_lowercase().as_str())
    }

    /// Escape reserved or digit-leading identifiers, then apply `case`.
    fn identifier(&self, name: &str, case: fn(&str) -> String) -> String {
        let words = sanitize_identifier(name);
        let cased = case(&words);
        match self.target {
            TargetLanguage::Matlab => {
                if self.is_reserved(&words) || starts_with_digit(&cased) {
                    case(&format!("x_{words}"))
                } else {
                    cased
                }
            }
            TargetLanguage::Python | TargetLanguage::Go => {
                if starts_with_digit(&cased) {
                    case(&format!("var_{words}"))
                } else if self.is_reserved(&cased) {
                    format!("{cased}_")
                } else {
                    cased
                }
            }
        }
    }
}

impl NamingUtility for TargetNaming {
    fn to_operation_id(&self, operation_id: &str) -> String {
        let words = sanitize_identifier(operation_id);
        match self.target {
            TargetLanguage::Python => {
                let id = words.to_snake_case();
                if self.is_reserved(&id) {
                    format!("{id}_")
                } else {
                    id
                }
            }
            TargetLanguage::Go => words.to_pascal_case(),
            TargetLanguage::Matlab => {
                if self.is_reserved(&words) {
                    log::warn!("{operation_id} (reserved word) cannot be used as method name");
                    format!("call_{words}").to_lower_camel_case()
                } else {
                    words.to_lower_camel_case()
                }
            }
        }
    }

    fn to_model_name(&self, name: &str) -> String {
        let words = sanitize_identifier(name);
        if starts_with_digit(&words) {
            let renamed = format!("model_{words}").to_pascal_case();
            log::warn!("{name} (model name starts with number) renamed to {renamed}");
            return renamed;
        }
        words.to_pascal_case()
    }

    fn to_param_name(&self, name: &str) -> String {
        match self.target {
            TargetLanguage::Python => self.identifier(name, |s| s.to_snake_case()),
            TargetLanguage::Go | TargetLanguage::Matlab => {
                self.identifier(name, |s| s.to_lower_camel_case())
            }
        }
    }

    fn to_var_name(&self, name: &str) -> String {
        match self.target {
            TargetLanguage::Python => self.identifier(name, |s| s.to_snake_case()),
            TargetLanguage::Go => self.identifier(name, |s| s.to_pascal_case()),
            TargetLanguage::Matlab => self.identifier(name, |s| s.to_lower_camel_case()),
        }
    }

    fn property_substitution(&self, base_name: &str) -> Option<String> {
        match (self.target, base_name) {
            (TargetLanguage::Python, "+") => Some("plus".to_string()),
            (TargetLanguage::Python, "-") => Some("minus".to_string()),
            _ => None,
        }
    }

    fn label_name(&self, base_name: &str) -> Option<String> {
        match self.target {
            TargetLanguage::Matlab => Some(matlab_label(base_name)),
            _ => None,
        }
    }
}

fn starts_with_digit(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Create a `NormalizedName` from an arbitrary string, computing all casing variants.
pub fn normalize_name(name: &str) -> NormalizedName {
    let sanitized = sanitize_identifier(name);

    NormalizedName {
        original: name.to_string(),
        pascal_case: sanitized.to_pascal_case(),
        camel_case: sanitized.to_lower_camel_case(),
        snake_case: sanitized.to_snake_case(),
        screaming_snake: sanitized.to_shouty_snake_case(),
    }
}

/// Derive a snake_case operation name from HTTP method + path.
///
/// Examples:
/// - `GET /projects` → `list_projects`
/// - `GET /projects/{id}` → `get_project`
/// - `POST /projects/{id}/files` → `create_projects_files`
pub fn route_to_name(method: &str, path: &str) -> String {
    let mut resource_parts: Vec<&str> = Vec::new();
    let mut ends_with_param = false;

    for seg in path.split('/').filter(|s| !s.is_empty()) {
        if seg.starts_with('{') && seg.ends_with('}') {
            ends_with_param = true;
        } else {
            resource_parts.push(seg);
            ends_with_param = false;
        }
    }

    let method = method.to_lowercase();
    let prefix = match method.as_str() {
        "get" if ends_with_param => "get",
        "get" => "list",
        "post" => "create",
        "put" => "update",
        other => other,
    };

    let mut name = prefix.to_string();
    for (i, part) in resource_parts.iter().enumerate() {
        let word = if i == resource_parts.len() - 1 && ends_with_param {
            singularize(part)
        } else {
            part.to_string()
        };
        name.push('_');
        name.push_str(&word.to_snake_case());
    }
    name
}

/// Naive singularization: strips trailing 's' if present.
fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Reduce a name to `_`-separated alphanumeric words.
///
/// Leading separators are dropped; runs of other characters collapse to one `_`.
pub fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_separator = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if prev_was_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            prev_was_separator = false;
        } else {
            prev_was_separator = true;
        }
    }

    if result.is_empty() {
        return "unnamed".to_string();
    }

    result
}

/// A MATLAB-valid field name for `input`, hex-escaping what MATLAB rejects.
///
/// Whitespace-separated words are joined with capitalized initials, a leading
/// `_` and every character outside `[A-Za-z0-9_]` become `0xHH`, and a name not
/// starting with a letter gets an `x` prefix.
pub fn matlab_label(input: &str) -> String {
    let mut joined = String::with_capacity(input.len());
    for part in input.split_whitespace() {
        if joined.is_empty() {
            joined.push_str(part);
        } else {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                joined.extend(first.to_uppercase());
                joined.push_str(chars.as_str());
            }
        }
    }

    let mut result = String::with_capacity(joined.len());
    for (i, c) in joined.chars().enumerate() {
        let valid = c == '_' || c.is_ascii_alphanumeric();
        if valid && !(i == 0 && c == '_') {
            result.push(c);
        } else {
            result.push_str(&format!("0x{:02X}", c as u32));
        }
    }

    if !result.starts_with(|c: char| c.is_ascii_alphabetic()) {
        result.insert(0, 'x');
    }
    result
}
