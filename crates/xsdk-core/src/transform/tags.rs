use crate::ir::{Document, Operation};

/// Collapse every operation's tags to its first tag.
pub fn normalize_tags(document: &mut Document) {
    for op in document.operations_mut() {
        remove_extra_tags(op);
    }
}

pub fn remove_extra_tags(op: &mut Operation) {
    if op.tags.len() > 1 {
        log::debug!("{}: keeping tag {} of {:?}", op.operation_id, op.tags[0], op.tags);
        op.tags.truncate(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{HttpMethod, PathEntry};
    use crate::naming::normalize_name;

    fn document(tags: &[&[&str]]) -> Document {
        let mut entry = PathEntry::default();
        let methods = [HttpMethod::Get, HttpMethod::Post, HttpMethod::Delete];
        for (method, tags) in methods.into_iter().zip(tags) {
            let mut op = Operation::new(normalize_name("op"), method, "/projects");
            op.tags = tags.iter().map(|t| t.to_string()).collect();
            entry.operations.insert(method, op);
        }
        Document {
            info: crate::ir::Info {
                title: "T".into(),
                description: None,
                version: "1".into(),
            },
            paths: [("/projects".to_string(), entry)].into_iter().collect(),
            models: Default::default(),
        }
    }

    fn tags(doc: &Document) -> Vec<Vec<String>> {
        doc.operations().map(|op| op.tags.clone()).collect()
    }

    #[test]
    fn keeps_first_tag_only() {
        let mut doc = document(&[&["projects", "files"], &[], &["sessions"]]);
        normalize_tags(&mut doc);
        assert_eq!(
            tags(&doc),
            vec![vec!["projects".to_string()], vec![], vec!["sessions".to_string()]]
        );
    }

    #[test]
    fn idempotent() {
        let mut once = document(&[&["a", "b", "c"], &["d", "e"], &[]]);
        normalize_tags(&mut once);
        let mut twice = once.clone();
        normalize_tags(&mut twice);
        assert_eq!(tags(&once), tags(&twice));
    }
}
