use serde::Serialize;
use serde_json::Value;

use super::{Directive, DirectiveKey, DirectiveScope, Directives, NameRef, WrapperDescriptor};
use crate::error::DirectiveError;
use crate::parse::{Extensions, vendor_extensions};

/// Expected JSON shape of a directive payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// A list of strings.
    StringList,
    /// A non-empty string.
    Text,
    /// A string, number or boolean, kept as text.
    Scalar,
    /// A boolean; `false` is the same as absent.
    Flag,
    /// Any value; only presence matters.
    Presence,
    /// A list of wrapper descriptors.
    Wrappers,
}

impl Payload {
    fn expected(&self) -> &'static str {
        match self {
            Payload::StringList => "a list of strings",
            Payload::Text => "a non-empty string",
            Payload::Scalar => "a string, number or boolean",
            Payload::Flag => "a boolean",
            Payload::Presence => "any value",
            Payload::Wrappers => "a list of {wrapperId, summary, key} records",
        }
    }
}

/// How a payload becomes a directive: the expected shape plus the variant
/// constructor for it.
#[derive(Debug, Clone, Copy)]
enum Decoder {
    StringList(fn(Vec<String>) -> Directive),
    Text(fn(String) -> Directive),
    Scalar(fn(String) -> Directive),
    Flag(fn() -> Directive),
    Presence(fn() -> Directive),
    Wrappers(fn(Vec<WrapperDescriptor>) -> Directive),
}

impl Decoder {
    const fn payload(&self) -> Payload {
        match self {
            Decoder::StringList(_) => Payload::StringList,
            Decoder::Text(_) => Payload::Text,
            Decoder::Scalar(_) => Payload::Scalar,
            Decoder::Flag(_) => Payload::Flag,
            Decoder::Presence(_) => Payload::Presence,
            Decoder::Wrappers(_) => Payload::Wrappers,
        }
    }
}

/// One recognized (extension name, scope) pair.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub scope: DirectiveScope,
    pub payload: Payload,
    /// Written by the pipeline rather than by spec authors.
    pub derived: bool,
    pub summary: &'static str,
    #[serde(skip)]
    directive: DirectiveKey,
    #[serde(skip)]
    decoder: Decoder,
}

impl CatalogEntry {
    const fn new(
        directive: DirectiveKey,
        scope: DirectiveScope,
        decoder: Decoder,
        summary: &'static str,
    ) -> Self {
        Self {
            key: directive.as_str(),
            scope,
            payload: decoder.payload(),
            derived: false,
            summary,
            directive,
            decoder,
        }
    }

    const fn derived(mut self) -> Self {
        self.derived = true;
        self
    }

    pub fn directive_key(&self) -> DirectiveKey {
        self.directive
    }

    /// Decode `value` into a directive. `Ok(None)` for a `false` flag.
    fn decode(&self, owner: &str, value: &Value) -> Result<Option<Directive>, DirectiveError> {
        let malformed = || DirectiveError::Malformed {
            owner: owner.to_string(),
            key: self.key.to_string(),
            expected: self.payload.expected(),
        };

        let directive = match self.decoder {
            Decoder::StringList(make) => make(string_list(value).ok_or_else(malformed)?),
            Decoder::Text(make) => {
                let text = value
                    .as_str()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(malformed)?;
                make(text.to_string())
            }
            Decoder::Scalar(make) => make(scalar_text(value).ok_or_else(malformed)?),
            Decoder::Flag(make) => {
                if !value.as_bool().ok_or_else(malformed)? {
                    return Ok(None);
                }
                make()
            }
            Decoder::Presence(make) => make(),
            Decoder::Wrappers(make) => {
                let wrappers = serde_json::from_value(value.clone()).map_err(|_| malformed())?;
                make(wrappers)
            }
        };
        Ok(Some(directive))
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

const STANDARD: &[CatalogEntry] = &[
    CatalogEntry::new(
        DirectiveKey::IgnoreProperties,
        DirectiveScope::Model,
        Decoder::StringList(Directive::IgnoreProperties),
        "Drop the named properties from the model.",
    ),
    CatalogEntry::new(
        DirectiveKey::IncludeEmpty,
        DirectiveScope::Model,
        Decoder::StringList(Directive::IncludeEmpty),
        "Serialize the named properties even when empty.",
    ),
    CatalogEntry::new(
        DirectiveKey::IncludeEmpty,
        DirectiveScope::Property,
        Decoder::Flag(|| Directive::IncludeEmptyMarker),
        "Serialize this property even when empty.",
    ),
    CatalogEntry::new(
        DirectiveKey::ContainerMixin,
        DirectiveScope::Model,
        Decoder::Text(|name| Directive::ContainerMixin(NameRef::Raw(name))),
        "Model whose helpers are mixed into this container model.",
    ),
    CatalogEntry::new(
        DirectiveKey::Positional,
        DirectiveScope::Property,
        Decoder::Presence(|| Directive::Positional),
        "Accept this property as the first positional constructor argument.",
    ),
    CatalogEntry::new(
        DirectiveKey::PositionalParam,
        DirectiveScope::Model,
        Decoder::Text(Directive::PositionalParam),
        "Name of the positional property.",
    )
    .derived(),
    CatalogEntry::new(
        DirectiveKey::GetZipInfo,
        DirectiveScope::Operation,
        Decoder::Text(Directive::GetZipInfo),
        "Add a sibling operation listing the zip archive's members.",
    ),
    CatalogEntry::new(
        DirectiveKey::DownloadTicket,
        DirectiveScope::Operation,
        Decoder::Text(Directive::DownloadTicket),
        "Split into a ticket operation and a file download operation.",
    ),
    CatalogEntry::new(
        DirectiveKey::DownloadUrl,
        DirectiveScope::Operation,
        Decoder::Text(Directive::DownloadUrl),
        "Operation that turns a ticket into a download url.",
    )
    .derived(),
    CatalogEntry::new(
        DirectiveKey::ModifyInfo,
        DirectiveScope::Operation,
        Decoder::Presence(|| Directive::ModifyInfo),
        "Generate set/replace/delete wrappers for an info update.",
    ),
    CatalogEntry::new(
        DirectiveKey::ModifyClassification,
        DirectiveScope::Operation,
        Decoder::Presence(|| Directive::ModifyClassification),
        "Generate add/replace/delete wrappers for a classification update.",
    ),
    CatalogEntry::new(
        DirectiveKey::ModifyWrapper,
        DirectiveScope::Operation,
        Decoder::Wrappers(Directive::ModifyWrapper),
        "Wrapper descriptors for a modify operation.",
    )
    .derived(),
    CatalogEntry::new(
        DirectiveKey::DownloadFileParam,
        DirectiveScope::Operation,
        Decoder::Text(|name| Directive::DownloadFileParam(NameRef::Raw(name))),
        "Parameter receiving the destination file path.",
    ),
    CatalogEntry::new(
        DirectiveKey::DownloadFileParam,
        DirectiveScope::Response,
        Decoder::Text(|name| Directive::DownloadFileParam(NameRef::Raw(name))),
        "Parameter receiving the destination file path.",
    ),
    CatalogEntry::new(
        DirectiveKey::Default,
        DirectiveScope::Parameter,
        Decoder::Scalar(Directive::Default),
        "Default value the SDK sends for this parameter.",
    ),
    CatalogEntry::new(
        DirectiveKey::Pagination,
        DirectiveScope::Operation,
        Decoder::Flag(|| Directive::Pagination),
        "Add filter/sort/limit/skip/page/after_id query parameters.",
    ),
    CatalogEntry::new(
        DirectiveKey::DefaultLimit,
        DirectiveScope::Operation,
        Decoder::Scalar(Directive::DefaultLimit),
        "Default for the pagination limit parameter.",
    ),
    CatalogEntry::new(
        DirectiveKey::MatlabBaseName,
        DirectiveScope::Property,
        Decoder::Text(Directive::MatlabBaseName),
        "Property label valid as a MATLAB field name.",
    )
    .derived(),
];

/// The immutable table of recognized directives.
///
/// Built once at startup and passed to the loader. Extensions it does not
/// list for a scope are kept as pass-through data.
#[derive(Debug, Clone)]
pub struct DirectiveCatalog {
    entries: Vec<CatalogEntry>,
}

impl DirectiveCatalog {
    /// Every directive the pipeline knows.
    pub fn standard() -> Self {
        Self {
            entries: STANDARD.to_vec(),
        }
    }

    /// This catalog minus the entries whose extension name is in `disabled`.
    pub fn without<S: AsRef<str>>(mut self, disabled: &[S]) -> Self {
        self.entries
            .retain(|entry| !disabled.iter().any(|name| name.as_ref() == entry.key));
        self
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn lookup(&self, name: &str, scope: DirectiveScope) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.key == name && entry.scope == scope)
    }

    /// Whether the directive is recognized anywhere.
    pub fn recognizes(&self, key: DirectiveKey) -> bool {
        self.entries.iter().any(|entry| entry.directive == key)
    }

    /// Decode the vendor extensions of one element.
    ///
    /// `owner` names the element in errors, e.g. ``operation `get_file` ``.
    pub fn interpret(
        &self,
        scope: DirectiveScope,
        owner: &str,
        extensions: &Extensions,
    ) -> Result<Directives, DirectiveError> {
        let mut directives = Directives::default();
        for (name, value) in vendor_extensions(extensions) {
            match self.lookup(name, scope) {
                Some(entry) => {
                    if let Some(directive) = entry.decode(owner, value)? {
                        directives.insert(directive);
                    }
                }
                None => directives.insert_passthrough(name, value.clone()),
            }
        }
        Ok(directives)
    }
}

impl Default for DirectiveCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
