use std::collections::HashSet;

use crate::config::ReferencePolicy;
use crate::directive::DirectiveKey;
use crate::error::DirectiveError;
use crate::ir::{Operation, OperationGroup};

/// Check that every `download-url` names an operation of the processed document.
///
/// The companion operation may sit in another render group, so this runs once
/// after every group is expanded.
pub fn check_download_urls(
    groups: &[OperationGroup],
    policy: ReferencePolicy,
) -> Result<(), DirectiveError> {
    if policy == ReferencePolicy::Unchecked {
        return Ok(());
    }

    let known: HashSet<&str> = all_operations(groups)
        .map(|op| op.operation_id.original.as_str())
        .collect();

    for op in all_operations(groups) {
        let Some(target) = op.directives.text(DirectiveKey::DownloadUrl) else {
            continue;
        };
        if known.contains(target) {
            continue;
        }
        match policy {
            ReferencePolicy::Strict => {
                return Err(DirectiveError::UnresolvedReference {
                    operation: op.operation_id.original.clone(),
                    key: DirectiveKey::DownloadUrl.as_str().to_string(),
                    target: target.to_string(),
                });
            }
            ReferencePolicy::Warn => log::warn!(
                "{}: {} names unknown operation {target}",
                op.operation_id,
                DirectiveKey::DownloadUrl
            ),
            ReferencePolicy::Unchecked => {}
        }
    }
    Ok(())
}

fn all_operations(groups: &[OperationGroup]) -> impl Iterator<Item = &Operation> {
    groups.iter().flat_map(|group| group.operations.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Directive;
    use crate::ir::HttpMethod;
    use crate::naming::normalize_name;

    fn op(id: &str, url: Option<&str>) -> Operation {
        let mut op = Operation::new(normalize_name(id), HttpMethod::Get, "/files");
        if let Some(url) = url {
            op.directives.insert(Directive::DownloadUrl(url.into()));
        }
        op
    }

    fn groups(ops: Vec<Operation>) -> Vec<OperationGroup> {
        ops.into_iter()
            .map(|op| OperationGroup {
                name: op.operation_id.clone(),
                operations: vec![op],
            })
            .collect()
    }

    #[test]
    fn resolved_across_groups() {
        let g = groups(vec![
            op("get_file_ticket", Some("get_file_url")),
            op("get_file_url", None),
        ]);
        assert!(check_download_urls(&g, ReferencePolicy::Strict).is_ok());
    }

    #[test]
    fn strict_fails_on_missing_target() {
        let g = groups(vec![op("get_file_ticket", Some("get_file_url"))]);
        let err = check_download_urls(&g, ReferencePolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            DirectiveError::UnresolvedReference {
                operation: "get_file_ticket".into(),
                key: "x-sdk-download-url".into(),
                target: "get_file_url".into(),
            }
        );
    }

    #[test]
    fn warn_and_unchecked_pass() {
        let g = groups(vec![op("get_file_ticket", Some("get_file_url"))]);
        assert!(check_download_urls(&g, ReferencePolicy::Warn).is_ok());
        assert!(check_download_urls(&g, ReferencePolicy::Unchecked).is_ok());
    }
}
