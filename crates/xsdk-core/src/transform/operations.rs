//! Operation expansion: derived operations and renderer metadata.
//!
//! Each source operation is visited once. Derived operations are emitted right
//! after their source and are never themselves expanded in the same pass, and
//! every directive that triggers expansion is consumed, so expanding an already
//! expanded list changes nothing.

use crate::directive::{Directive, DirectiveKey, NameRef, WrapperDescriptor, WrapperKey};
use crate::ir::{Operation, TypeInfo};
use crate::naming::{NamingUtility, normalize_name};
use crate::parse::media_type::{APPLICATION_JSON, OCTET_STREAM};

use super::clone::{
    clone_operation, clone_response, find_response, remove_query_param, replace_response,
    update_query_param,
};

/// Schema name of the zip listing returned by zip-info operations.
pub const ZIP_INFO_MODEL: &str = "file-zip-info";

const SUCCESS_CODE: &str = "200";
const INFO_PARAM: &str = "info";
const TICKET_PARAM: &str = "ticket";
const DEST_FILE_TOKEN: &str = "dest-file";

/// Directives that make an operation spawn or rewrite operations.
const EXPANSION_TRIGGERS: [DirectiveKey; 5] = [
    DirectiveKey::GetZipInfo,
    DirectiveKey::DownloadTicket,
    DirectiveKey::ModifyInfo,
    DirectiveKey::ModifyClassification,
    DirectiveKey::DownloadFileParam,
];

/// Expand a render group's operations.
///
/// The output holds every input operation in order, each followed by the
/// operations derived from it: the zip-info sibling first, then the ticket
/// operation.
pub fn expand_operations(operations: Vec<Operation>, naming: &dyn NamingUtility) -> Vec<Operation> {
    let mut expanded = Vec::with_capacity(operations.len());
    for mut op in operations {
        let derived = expand_operation(&mut op, naming);
        expanded.push(op);
        expanded.extend(derived);
    }
    expanded
}

/// Apply the operation directives of `op`, returning the operations derived from it.
///
/// Zip-info combines with any of the others; of download-ticket, the modify
/// directives and download-file-param only the first present applies.
pub fn expand_operation(op: &mut Operation, naming: &dyn NamingUtility) -> Vec<Operation> {
    let mut derived = Vec::new();

    if let Some(zip_info) = create_zip_info_operation(op, naming) {
        derived.push(zip_info);
    }

    if let Some(ticket) = split_download_ticket(op, naming) {
        // Shadowed modify directives would otherwise fire on a later pass
        for key in [DirectiveKey::ModifyInfo, DirectiveKey::ModifyClassification] {
            if op.directives.remove(key).is_some() {
                log::debug!("{}: {key} ignored on a ticketed download", op.operation_id);
            }
        }
        derived.push(ticket);
    } else if !attach_modify_wrappers(op, naming) {
        canonicalize_download_file_param(op, naming);
    }

    derived
}

/// A clone of `src` under a new id, with no expansion directives left.
fn derive_operation(src: &Operation, operation_id: &str) -> Operation {
    let mut op = clone_operation(src);
    op.operation_id = normalize_name(operation_id);
    for key in EXPANSION_TRIGGERS {
        op.directives.remove(key);
    }
    op
}

/// `get-zip-info`: a sibling operation returning the archive listing.
///
/// The source keeps its shape; only the directive is consumed.
fn create_zip_info_operation(op: &mut Operation, naming: &dyn NamingUtility) -> Option<Operation> {
    let Some(Directive::GetZipInfo(seed)) = op.directives.remove(DirectiveKey::GetZipInfo) else {
        return None;
    };
    let zip_model = naming.to_model_name(ZIP_INFO_MODEL);
    let operation_id = naming.to_operation_id(&seed);

    let mut zip = derive_operation(op, &operation_id);
    zip.produces = vec![APPLICATION_JSON.to_string()];
    zip.return_type = Some(zip_model.clone());
    zip.return_base_type = Some(zip_model.clone());
    zip.return_container = None;
    if !zip.imports.contains(&zip_model) {
        zip.imports.push(zip_model.clone());
    }

    let found = update_query_param(&mut zip, INFO_PARAM, true, |param| {
        param.directives.insert(Directive::Default("true".to_string()));
    });
    if !found {
        log::debug!("{operation_id}: no `{INFO_PARAM}` query parameter to default");
    }

    match find_response(&zip, SUCCESS_CODE) {
        Some(index) => {
            let mut listing = clone_response(&zip.responses[index].borrow());
            listing.type_info = TypeInfo {
                data_type: Some(zip_model.clone()),
                base_type: Some(zip_model.clone()),
                container: None,
                is_primitive: true,
                is_simple: false,
                is_file: false,
                is_binary: false,
                model: Some(zip_model),
            };
            replace_response(&mut zip, index, listing);
        }
        None => log::warn!("{operation_id}: no {SUCCESS_CODE} response, response shape left as is"),
    }

    log::debug!("{}: added zip-info operation {operation_id}", op.operation_id);
    Some(zip)
}

/// `download-ticket`: split into a ticket operation and a binary download.
///
/// The clone becomes the ticket operation; the source is rewritten in place
/// into the download operation.
fn split_download_ticket(op: &mut Operation, naming: &dyn NamingUtility) -> Option<Operation> {
    let Some(Directive::DownloadTicket(seed)) = op.directives.remove(DirectiveKey::DownloadTicket)
    else {
        return None;
    };
    let ticket_id = naming.to_operation_id(&seed);
    let url_id = naming.to_operation_id(&seed.replace("_ticket", "_url"));

    let mut ticket = derive_operation(op, &ticket_id);
    ticket.produces = vec![APPLICATION_JSON.to_string()];
    ticket.directives.insert(Directive::DownloadUrl(url_id));

    let dest_file = naming.to_var_name(DEST_FILE_TOKEN);
    op.produces = vec![OCTET_STREAM.to_string()];
    op.directives
        .insert(Directive::DownloadFileParam(NameRef::Resolved(dest_file.clone())));
    remove_query_param(op, TICKET_PARAM);

    match find_response(op, SUCCESS_CODE) {
        Some(index) => {
            let mut file = clone_response(&op.responses[index].borrow());
            file.type_info = TypeInfo {
                is_file: true,
                is_simple: false,
                is_primitive: false,
                data_type: None,
                base_type: None,
                container: None,
                ..file.type_info
            };
            file.directives
                .insert(Directive::DownloadFileParam(NameRef::Resolved(dest_file)));
            replace_response(op, index, file);
        }
        None => log::warn!(
            "{}: no {SUCCESS_CODE} response, download response left as is",
            op.operation_id
        ),
    }

    log::debug!("{}: split off ticket operation {ticket_id}", op.operation_id);
    Some(ticket)
}

/// `modify-info` / `modify-classification`: attach set/replace/delete wrapper
/// descriptors. Returns whether the operation is a modify operation, including
/// one whose wrappers were attached on an earlier pass.
fn attach_modify_wrappers(op: &mut Operation, naming: &dyn NamingUtility) -> bool {
    if op.directives.contains(DirectiveKey::ModifyWrapper) {
        return true;
    }
    // modify-info takes precedence; both keys are consumed
    let info = op.directives.remove(DirectiveKey::ModifyInfo);
    let classification = op.directives.remove(DirectiveKey::ModifyClassification);
    let (name, set_key) = match (info, classification) {
        (Some(_), _) => ("info", WrapperKey::Set),
        (None, Some(_)) => ("classification", WrapperKey::Add),
        (None, None) => return false,
    };

    let seed = op.operation_id.snake_case.clone();
    let wrapper = |prefix: &str, suffix: &str, summary: String, key: WrapperKey| {
        let raw = match seed.strip_prefix("modify_") {
            Some(rest) => format!("{prefix}{rest}{suffix}"),
            None => format!("{seed}{suffix}"),
        };
        WrapperDescriptor {
            wrapper_id: naming.to_operation_id(&raw),
            summary,
            key,
        }
    };
    let wrappers = vec![
        wrapper("set_", "", format!("Update {name} with the provided fields."), set_key),
        wrapper(
            "replace_",
            "",
            format!("Entirely replace {name} with the provided fields."),
            WrapperKey::Replace,
        ),
        wrapper(
            "delete_",
            "_fields",
            format!("Delete the specified fields from {name}."),
            WrapperKey::Delete,
        ),
    ];

    op.directives.insert(Directive::ModifyWrapper(wrappers));
    log::debug!("{}: attached {name} modify wrappers", op.operation_id);
    true
}

/// `download-file-param`: canonicalize the parameter name and mirror it on the
/// 200 response.
fn canonicalize_download_file_param(op: &mut Operation, naming: &dyn NamingUtility) {
    let Some(Directive::DownloadFileParam(name)) =
        op.directives.get_mut(DirectiveKey::DownloadFileParam)
    else {
        return;
    };
    if name.is_resolved() {
        return;
    }
    let param = name.resolve_with(|raw| naming.to_param_name(raw)).to_string();

    match find_response(op, SUCCESS_CODE) {
        Some(index) => {
            op.responses[index]
                .borrow_mut()
                .directives
                .insert(Directive::DownloadFileParam(NameRef::Resolved(param)));
        }
        None => log::warn!(
            "{}: no {SUCCESS_CODE} response to carry the download file parameter",
            op.operation_id
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetLanguage;
    use crate::ir::{HttpMethod, Parameter, ParameterLocation, Response, Shared};
    use crate::naming::TargetNaming;

    fn python() -> TargetNaming {
        TargetNaming::new(TargetLanguage::Python)
    }

    fn op(id: &str, directives: Vec<Directive>) -> Operation {
        let mut op = Operation::new(normalize_name(id), HttpMethod::Get, "/files/{id}");
        op.produces = vec![OCTET_STREAM.to_string(), APPLICATION_JSON.to_string()];
        op.push_param(Parameter::new("id", "id", ParameterLocation::Path));
        let mut ticket = Parameter::new("ticket", "ticket", ParameterLocation::Query);
        ticket.required = true;
        op.push_param(ticket);
        op.push_param(Parameter::new("info", "info", ParameterLocation::Query));
        let mut ok = Response::new("200", "OK");
        ok.type_info = TypeInfo::model("DownloadTicket");
        op.responses.push(Shared::new(Response::new("default", "Error")));
        op.responses.push(Shared::new(ok));
        op.directives = directives.into_iter().collect();
        op
    }

    fn ids(ops: &[Operation]) -> Vec<&str> {
        ops.iter().map(|o| o.operation_id.original.as_str()).collect()
    }

    #[test]
    fn zip_info_adds_one_sibling() {
        let source = op(
            "get_file",
            vec![Directive::GetZipInfo("get_file_zip_info".into())],
        );
        let before = source.clone();
        let out = expand_operations(vec![source], &python());
        assert_eq!(ids(&out), vec!["get_file", "get_file_zip_info"]);

        let (src, zip) = (&out[0], &out[1]);
        assert!(src.directives.is_empty());
        assert_eq!(src.produces, before.produces);
        assert_eq!(src.responses, before.responses);
        assert!(src.query_params[1].borrow().directives.is_empty());

        assert_eq!(zip.produces, vec![APPLICATION_JSON]);
        assert_eq!(zip.return_type.as_deref(), Some("FileZipInfo"));
        assert_eq!(zip.imports, vec!["FileZipInfo"]);
        let info = zip.find_param("info").unwrap().borrow().clone();
        assert_eq!(info.directives.text(DirectiveKey::Default), Some("true"));

        let listing = zip.responses[1].borrow().clone();
        assert_eq!(listing.type_info.data_type.as_deref(), Some("FileZipInfo"));
        assert!(listing.type_info.is_primitive);
        assert!(!listing.type_info.is_simple);
        // The default response is still shared with the source
        assert!(zip.responses[0].ptr_eq(&src.responses[0]));
    }

    #[test]
    fn ticket_split_rewrites_source_and_adds_ticket_op() {
        let source = op(
            "get_file_ticket",
            vec![Directive::DownloadTicket("get_file_ticket".into())],
        );
        let out = expand_operations(vec![source], &python());
        assert_eq!(ids(&out), vec!["get_file_ticket", "get_file_ticket"]);

        let (download, ticket) = (&out[0], &out[1]);
        assert_eq!(download.produces, vec![OCTET_STREAM]);
        assert!(download.find_param("ticket").is_none());
        assert_eq!(download.query_params.len(), 1);
        assert!(download.required_params.is_empty());
        assert_eq!(
            download.directives.text(DirectiveKey::DownloadFileParam),
            Some("dest_file")
        );
        let file = download.responses[1].borrow().clone();
        assert!(file.type_info.is_file);
        assert!(!file.type_info.is_simple);
        assert!(file.type_info.data_type.is_none());
        assert_eq!(file.directives.text(DirectiveKey::DownloadFileParam), Some("dest_file"));

        assert_eq!(ticket.produces, vec![APPLICATION_JSON]);
        assert_eq!(ticket.directives.text(DirectiveKey::DownloadUrl), Some("get_file_url"));
        assert!(ticket.find_param("ticket").is_some());
        assert_eq!(
            ticket.responses[1].borrow().type_info.model.as_deref(),
            Some("DownloadTicket")
        );
    }

    #[test]
    fn zip_and_ticket_order() {
        let source = op(
            "download_file",
            vec![
                Directive::GetZipInfo("get_file_zip_info".into()),
                Directive::DownloadTicket("get_file_download_ticket".into()),
            ],
        );
        let ops = vec![op("list_files", vec![]), source, op("delete_file", vec![])];
        let out = expand_operations(ops, &python());
        insta::assert_debug_snapshot!(ids(&out), @r#"
        [
            "list_files",
            "download_file",
            "get_file_zip_info",
            "get_file_download_ticket",
            "delete_file",
        ]
        "#);
        // The zip sibling is cloned before the split, so it keeps the ticket parameter
        assert!(out[2].find_param("ticket").is_some());
        assert!(!out[2].directives.contains(DirectiveKey::DownloadTicket));
    }

    #[test]
    fn modify_info_wrappers() {
        let source = op("modify_info", vec![Directive::ModifyInfo]);
        let out = expand_operations(vec![source], &python());
        assert_eq!(out.len(), 1);
        let Some(Directive::ModifyWrapper(wrappers)) =
            out[0].directives.get(DirectiveKey::ModifyWrapper)
        else {
            panic!("no wrappers");
        };
        let summary: Vec<(&str, WrapperKey)> = wrappers
            .iter()
            .map(|w| (w.wrapper_id.as_str(), w.key))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("set_info", WrapperKey::Set),
                ("replace_info", WrapperKey::Replace),
                ("delete_info_fields", WrapperKey::Delete),
            ]
        );
        assert_eq!(wrappers[0].summary, "Update info with the provided fields.");
        assert_eq!(wrappers[2].summary, "Delete the specified fields from info.");
        assert!(!out[0].directives.contains(DirectiveKey::ModifyInfo));
    }

    #[test]
    fn modify_classification_uses_add() {
        let source = op(
            "modify_acquisition_classification",
            vec![Directive::ModifyClassification],
        );
        let out = expand_operations(vec![source], &python());
        let Some(Directive::ModifyWrapper(wrappers)) =
            out[0].directives.get(DirectiveKey::ModifyWrapper)
        else {
            panic!("no wrappers");
        };
        assert_eq!(wrappers[0].wrapper_id, "set_acquisition_classification");
        assert_eq!(wrappers[0].key, WrapperKey::Add);
        assert_eq!(wrappers[2].wrapper_id, "delete_acquisition_classification_fields");
    }

    #[test]
    fn ticket_takes_precedence_over_modify() {
        let source = op(
            "get_file",
            vec![Directive::ModifyInfo, Directive::DownloadTicket("get_file_ticket".into())],
        );
        let out = expand_operations(vec![source], &python());
        assert_eq!(out.len(), 2);
        assert!(!out[0].directives.contains(DirectiveKey::ModifyWrapper));
        assert!(!out[0].directives.contains(DirectiveKey::ModifyInfo));
        let again = expand_operations(out.clone(), &python());
        assert_eq!(again, out);
        // Derived operations carry no expansion triggers
        assert!(!out[1].directives.contains(DirectiveKey::ModifyInfo));
    }

    #[test]
    fn download_file_param_is_canonicalized_and_mirrored() {
        let source = op(
            "download_output",
            vec![Directive::DownloadFileParam(NameRef::Raw("dest-file".into()))],
        );
        let shared_ok = source.responses[1].clone();
        let out = expand_operations(vec![source], &TargetNaming::new(TargetLanguage::Go));
        assert_eq!(
            out[0].directives.get(DirectiveKey::DownloadFileParam),
            Some(&Directive::DownloadFileParam(NameRef::Resolved("destFile".into())))
        );
        assert_eq!(
            shared_ok.borrow().directives.text(DirectiveKey::DownloadFileParam),
            Some("destFile")
        );
    }

    #[test]
    fn missing_success_response_still_creates_operation() {
        let mut source = op("get_file", vec![Directive::DownloadTicket("get_file_ticket".into())]);
        source.responses.truncate(1);
        let out = expand_operations(vec![source], &python());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].produces, vec![OCTET_STREAM]);
        assert!(!out[0].responses[0].borrow().type_info.is_file);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let ops = vec![
            op(
                "download_file",
                vec![
                    Directive::GetZipInfo("get_file_zip_info".into()),
                    Directive::DownloadTicket("get_file_ticket".into()),
                ],
            ),
            op("modify_info", vec![Directive::ModifyInfo]),
            op(
                "download_output",
                vec![Directive::DownloadFileParam(NameRef::Raw("dest-file".into()))],
            ),
        ];
        let once = expand_operations(ops, &python());
        let twice = expand_operations(once.clone(), &python());
        assert_eq!(once, twice);
    }

    #[test]
    fn modify_operation_leaves_download_file_param_alone() {
        let source = op(
            "modify_info",
            vec![
                Directive::ModifyInfo,
                Directive::DownloadFileParam(NameRef::Raw("dest-file".into())),
            ],
        );
        let once = expand_operations(vec![source], &python());
        // Responses are shared with `once`, so compare against a rendering
        let rendered = format!("{once:?}");
        let twice = expand_operations(once.clone(), &python());
        assert_eq!(format!("{twice:?}"), rendered);

        assert_eq!(
            twice[0].directives.get(DirectiveKey::DownloadFileParam),
            Some(&Directive::DownloadFileParam(NameRef::Raw("dest-file".into())))
        );
        assert!(
            !twice[0].responses[1]
                .borrow()
                .directives
                .contains(DirectiveKey::DownloadFileParam)
        );
    }

    #[test]
    fn wrapper_ids_replace_only_the_leading_prefix() {
        let wrapper_ids = |id: &str| {
            let out = expand_operations(vec![op(id, vec![Directive::ModifyInfo])], &python());
            match out[0].directives.get(DirectiveKey::ModifyWrapper) {
                Some(Directive::ModifyWrapper(wrappers)) => wrappers
                    .iter()
                    .map(|w| w.wrapper_id.clone())
                    .collect::<Vec<_>>(),
                other => panic!("no wrappers: {other:?}"),
            }
        };
        assert_eq!(
            wrapper_ids("modify_modify_info"),
            vec!["set_modify_info", "replace_modify_info", "delete_modify_info_fields"]
        );
        assert_eq!(
            wrapper_ids("update_info"),
            vec!["update_info", "update_info", "update_info_fields"]
        );
    }
}
