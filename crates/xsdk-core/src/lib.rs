pub mod config;
pub mod directive;
pub mod error;
pub mod ir;
pub mod naming;
pub mod parse;
pub mod pipeline;
pub mod transform;

use config::XsdkConfig;
use directive::DirectiveCatalog;
use error::TransformError;
use naming::TargetNaming;
use parse::document::OpenApiSpec;
use pipeline::{Pipeline, PipelineOptions, ProcessedDocument};

/// Load a parsed spec and run every rewrite over it, as configured.
pub fn process(spec: &OpenApiSpec, config: &XsdkConfig) -> Result<ProcessedDocument, TransformError> {
    let catalog = DirectiveCatalog::standard().without(&config.directives.disabled);
    let naming = TargetNaming::new(config.target);
    let document = transform::load_document(spec, &catalog, &naming)?;
    Pipeline::new(&naming, PipelineOptions::from(config)).run(document)
}
