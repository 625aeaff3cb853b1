//! The fixed order in which rewrites run.
//!
//! An emitter that renders unit by unit calls [`preprocess`] once and then
//! [`postprocess_models`] / [`postprocess_operations`] per unit. [`Pipeline`]
//! does the same for the whole document in one go.

use serde::Serialize;

use crate::config::{GroupBy, ReferencePolicy, XsdkConfig};
use crate::error::TransformError;
use crate::ir::{Document, Info, Model, OperationGroup, group_operations};
use crate::naming::NamingUtility;
use crate::transform::models::{finalize_model, prune_ignored_properties};
use crate::transform::operations::expand_operations;
use crate::transform::pagination::expand_pagination;
use crate::transform::references::check_download_urls;
use crate::transform::tags::normalize_tags;

/// Switches for the document-wide preprocessing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessOptions {
    pub pagination: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self { pagination: true }
    }
}

/// The model currently being rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelContext {
    pub model: Model,
}

/// The operation group currently being rendered.
pub type OperationsContext = OperationGroup;

/// Run the document-wide rewrites, once, before any rendering.
///
/// Collapses tags, expands pagination and prunes ignored properties.
pub fn preprocess(document: &mut Document, options: &PreprocessOptions, naming: &dyn NamingUtility) {
    normalize_tags(document);
    if options.pagination {
        expand_pagination(document, naming);
    }
    for model in document.models.values_mut() {
        prune_ignored_properties(model);
    }
}

/// Finalize one model for rendering.
pub fn postprocess_models(mut context: ModelContext, naming: &dyn NamingUtility) -> ModelContext {
    finalize_model(&mut context.model, naming);
    context
}

/// Expand one operation group for rendering.
///
/// Calling this again on its own output returns it unchanged.
pub fn postprocess_operations(
    mut context: OperationsContext,
    naming: &dyn NamingUtility,
) -> OperationsContext {
    context.operations = expand_operations(std::mem::take(&mut context.operations), naming);
    context
}

/// How [`Pipeline::run`] groups and checks the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub preprocess: PreprocessOptions,
    pub group_by: GroupBy,
    pub references: ReferencePolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            preprocess: PreprocessOptions::default(),
            group_by: GroupBy::Tag,
            references: ReferencePolicy::Warn,
        }
    }
}

impl From<&XsdkConfig> for PipelineOptions {
    fn from(config: &XsdkConfig) -> Self {
        Self {
            preprocess: PreprocessOptions {
                pagination: config.pagination,
            },
            group_by: config.group_by,
            references: config.references,
        }
    }
}

/// The generator-ready document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedDocument {
    pub info: Info,
    pub models: Vec<Model>,
    pub groups: Vec<OperationGroup>,
}

impl ProcessedDocument {
    pub fn operation_count(&self) -> usize {
        self.groups.iter().map(|g| g.operations.len()).sum()
    }
}

/// Runs every rewrite over a whole document.
pub struct Pipeline<'a> {
    naming: &'a dyn NamingUtility,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(naming: &'a dyn NamingUtility, options: PipelineOptions) -> Self {
        Self { naming, options }
    }

    /// Preprocess, finalize every model, expand every group, then check
    /// cross-references. Any error discards the whole document.
    pub fn run(&self, mut document: Document) -> Result<ProcessedDocument, TransformError> {
        preprocess(&mut document, &self.options.preprocess, self.naming);

        let models = document
            .models
            .into_values()
            .map(|model| postprocess_models(ModelContext { model }, self.naming).model)
            .collect();

        let groups: Vec<OperationGroup> = group_operations(document.paths, self.options.group_by)
            .into_iter()
            .map(|group| postprocess_operations(group, self.naming))
            .collect();

        check_download_urls(&groups, self.options.references)?;

        Ok(ProcessedDocument {
            info: document.info,
            models,
            groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetLanguage;
    use crate::directive::{Directive, DirectiveCatalog, DirectiveKey};
    use crate::error::DirectiveError;
    use crate::naming::TargetNaming;
    use crate::parse;
    use crate::transform::load_document;

    const SPEC: &str = r#"
openapi: 3.0.3
info: {title: Files, version: "1"}
paths:
  /files/{id}:
    get:
      operationId: download_file
      tags: [files, projects]
      x-sdk-download-ticket: get_file_ticket
      parameters:
        - {name: id, in: path, required: true, schema: {type: string}}
        - {name: ticket, in: query, schema: {type: string}}
      responses:
        '200': {description: OK}
  /projects:
    get:
      operationId: get_all_projects
      tags: [projects]
      x-fw-pagination: true
      responses:
        '200': {description: OK}
components:
  schemas:
    project:
      type: object
      x-sdk-ignore-properties: [secret]
      properties:
        label: {type: string, x-sdk-positional: true}
        secret: {type: string}
"#;

    fn document() -> Document {
        let spec = parse::from_yaml(SPEC).unwrap();
        load_document(
            &spec,
            &DirectiveCatalog::standard(),
            &TargetNaming::new(TargetLanguage::Python),
        )
        .unwrap()
    }

    #[test]
    fn preprocess_collapses_tags_and_prunes() {
        let mut doc = document();
        preprocess(
            &mut doc,
            &PreprocessOptions::default(),
            &TargetNaming::new(TargetLanguage::Python),
        );
        assert!(doc.operations().all(|op| op.tags.len() <= 1));
        let names: Vec<&str> = doc.models["project"]
            .all_vars
            .iter()
            .map(|p| p.base_name.as_str())
            .collect();
        assert_eq!(names, vec!["label"]);
    }

    #[test]
    fn pagination_can_be_disabled() {
        let mut doc = document();
        preprocess(
            &mut doc,
            &PreprocessOptions { pagination: false },
            &TargetNaming::new(TargetLanguage::Python),
        );
        let projects = doc.operations().find(|op| op.path == "/projects").unwrap();
        assert!(projects.query_params.is_empty());
        assert!(projects.directives.contains(DirectiveKey::Pagination));
    }

    #[test]
    fn postprocess_operations_twice_is_a_no_op() {
        let naming = TargetNaming::new(TargetLanguage::Python);
        let mut doc = document();
        preprocess(&mut doc, &PreprocessOptions::default(), &naming);
        let groups = group_operations(doc.paths, GroupBy::Tag);
        let once: Vec<_> = groups
            .into_iter()
            .map(|g| postprocess_operations(g, &naming))
            .collect();
        let twice: Vec<_> = once
            .clone()
            .into_iter()
            .map(|g| postprocess_operations(g, &naming))
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn run_produces_groups_and_models() {
        let naming = TargetNaming::new(TargetLanguage::Python);
        let processed = Pipeline::new(
            &naming,
            PipelineOptions {
                references: ReferencePolicy::Warn,
                ..PipelineOptions::default()
            },
        )
        .run(document())
        .unwrap();

        let groups: Vec<&str> = processed
            .groups
            .iter()
            .map(|g| g.name.original.as_str())
            .collect();
        assert_eq!(groups, vec!["files", "projects"]);
        assert_eq!(processed.operation_count(), 3);
        assert_eq!(
            processed.models[0].directives.get(DirectiveKey::PositionalParam),
            Some(&Directive::PositionalParam("label".into()))
        );
    }

    #[test]
    fn strict_references_fail_the_run() {
        let naming = TargetNaming::new(TargetLanguage::Python);
        let err = Pipeline::new(
            &naming,
            PipelineOptions {
                references: ReferencePolicy::Strict,
                ..PipelineOptions::default()
            },
        )
        .run(document())
        .unwrap_err();
        assert!(matches!(
            err,
            TransformError::Directive(DirectiveError::UnresolvedReference { ref target, .. })
                if target == "get_file_url"
        ));
    }

    #[test]
    fn options_from_config() {
        let config = XsdkConfig {
            pagination: false,
            group_by: GroupBy::Route,
            references: ReferencePolicy::Strict,
            ..XsdkConfig::default()
        };
        let options = PipelineOptions::from(&config);
        assert!(!options.preprocess.pagination);
        assert_eq!(options.group_by, GroupBy::Route);
        assert_eq!(options.references, ReferencePolicy::Strict);
    }
}
