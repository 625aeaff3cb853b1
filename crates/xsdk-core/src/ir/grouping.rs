use indexmap::IndexMap;
use serde::Serialize;

use super::operations::Operation;
use super::types::{NormalizedName, PathEntry};
use crate::config::GroupBy;
use crate::naming::normalize_name;

/// A render group: the operations an emitter writes out as one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationGroup {
    pub name: NormalizedName,
    pub operations: Vec<Operation>,
}

/// Move the operations of `paths` into render groups according to `group_by`.
///
/// Operations keep document order within a group.
pub fn group_operations(paths: IndexMap<String, PathEntry>, group_by: GroupBy) -> Vec<OperationGroup> {
    let operations = paths
        .into_values()
        .flat_map(|entry| entry.operations.into_values());
    match group_by {
        GroupBy::Tag => group_by_tag(operations),
        GroupBy::Operation => group_by_operation(operations),
        GroupBy::Route => group_by_route(operations),
    }
}

/// Group by first tag, `default` for untagged operations. Groups sorted by name.
fn group_by_tag(operations: impl Iterator<Item = Operation>) -> Vec<OperationGroup> {
    let mut groups: IndexMap<String, Vec<Operation>> = IndexMap::new();
    for op in operations {
        let tag = op.tags.first().cloned().unwrap_or_else(|| "default".to_string());
        groups.entry(tag).or_default().push(op);
    }
    groups.sort_keys();
    into_groups(groups)
}

/// One group per operation.
fn group_by_operation(operations: impl Iterator<Item = Operation>) -> Vec<OperationGroup> {
    operations
        .map(|op| OperationGroup {
            name: op.operation_id.clone(),
            operations: vec![op],
        })
        .collect()
}

/// Group by first path segment.
fn group_by_route(operations: impl Iterator<Item = Operation>) -> Vec<OperationGroup> {
    let mut groups: IndexMap<String, Vec<Operation>> = IndexMap::new();
    for op in operations {
        groups.entry(extract_path_prefix(&op.path)).or_default().push(op);
    }
    into_groups(groups)
}

fn into_groups(groups: IndexMap<String, Vec<Operation>>) -> Vec<OperationGroup> {
    groups
        .into_iter()
        .map(|(name, operations)| OperationGroup {
            name: normalize_name(&name),
            operations,
        })
        .collect()
}

/// Extract the first meaningful path segment as a group name.
/// e.g. "/projects/{id}" → "projects", "/download" → "download"
fn extract_path_prefix(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && !s.starts_with('{'))
        .collect();

    segments.first().unwrap_or(&"default").to_string()
}
