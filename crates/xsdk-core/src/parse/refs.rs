use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::document::{Components, OpenApiSpec};
use crate::error::ResolveError;

/// A `$ref` or the object itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Item(T),
}

impl<T> RefOr<T> {
    /// The inline object, `None` for a reference.
    pub fn as_item(&self) -> Option<&T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Ref { .. } => None,
        }
    }

    /// Last segment of the reference (`#/components/schemas/Foo` → `Foo`).
    pub fn ref_name(&self) -> Option<&str> {
        match self {
            RefOr::Ref { ref_path } => ref_path.rsplit('/').next(),
            RefOr::Item(_) => None,
        }
    }
}

type Section<T> = fn(&Components) -> &IndexMap<String, RefOr<T>>;

/// Inlines `$ref`s to component parameters, responses and request bodies.
///
/// Schema references are left alone: the loader turns them into model names.
pub struct RefResolver<'a> {
    components: Option<&'a Components>,
}

impl<'a> RefResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            components: spec.components.as_ref(),
        }
    }

    /// A copy of `spec` whose path items hold no parameter, response or body refs.
    pub fn resolve_spec(&self, spec: &OpenApiSpec) -> Result<OpenApiSpec, ResolveError> {
        let mut resolved = spec.clone();
        for item in resolved.paths.values_mut() {
            for param in &mut item.parameters {
                self.inline(param, "parameters", |c| &c.parameters)?;
            }
            for op in item.operations_mut() {
                for param in &mut op.parameters {
                    self.inline(param, "parameters", |c| &c.parameters)?;
                }
                if let Some(body) = &mut op.request_body {
                    self.inline(body, "requestBodies", |c| &c.request_bodies)?;
                }
                for response in op.responses.values_mut() {
                    self.inline(response, "responses", |c| &c.responses)?;
                }
            }
        }
        Ok(resolved)
    }

    /// Replace a reference with a copy of the component it names.
    fn inline<T: Clone>(
        &self,
        value: &mut RefOr<T>,
        section: &str,
        table: Section<T>,
    ) -> Result<(), ResolveError> {
        let RefOr::Ref { ref_path } = value else {
            return Ok(());
        };
        let name = parse_ref_name(ref_path, section)?;
        let target = self
            .components
            .map(table)
            .and_then(|entries| entries.get(name))
            .and_then(RefOr::as_item)
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
        *value = RefOr::Item(target.clone());
        Ok(())
    }
}

/// Split `#/components/<section>/<name>`, checking the section.
fn parse_ref_name<'r>(ref_path: &'r str, expected_section: &str) -> Result<&'r str, ResolveError> {
    let invalid = || ResolveError::InvalidRefFormat(ref_path.to_string());
    let (section, name) = ref_path
        .strip_prefix("#/components/")
        .and_then(|rest| rest.split_once('/'))
        .ok_or_else(invalid)?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "{ref_path}: expected a {expected_section} reference"
        )));
    }
    Ok(name)
}
