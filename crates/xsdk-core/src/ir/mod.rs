pub mod grouping;
pub mod models;
pub mod operations;
pub mod shared;
pub mod types;

pub use grouping::{OperationGroup, group_operations};
pub use models::{Model, Property};
pub use operations::{Header, Operation, Parameter, ParameterLocation, Response};
pub use shared::Shared;
pub use types::{ContainerKind, Document, HttpMethod, Info, NormalizedName, PathEntry, TypeInfo};
