pub mod clone;
pub mod models;
pub mod operations;
pub mod pagination;
pub mod references;
pub mod spec_to_ir;
pub mod tags;
pub mod type_resolver;

pub use spec_to_ir::load_document;
