//! Shallow copies of operations and responses.
//!
//! A copy owns every collection but shares the elements: a parameter or
//! response reached through both the source and the copy is one record until
//! one side replaces its entry.

use crate::ir::{Operation, Parameter, Response, Shared};

/// Field-complete shallow copy of an operation, directives included.
pub fn clone_operation(src: &Operation) -> Operation {
    src.clone()
}

/// Field-complete shallow copy of a response, headers shared.
pub fn clone_response(src: &Response) -> Response {
    src.clone()
}

/// A parameter record with its own identity, for edits that must not leak back.
pub fn copy_parameter(src: &Shared<Parameter>) -> Shared<Parameter> {
    src.detach()
}

/// Index of the first response with exactly this status code.
pub fn find_response(op: &Operation, code: &str) -> Option<usize> {
    op.responses.iter().position(|r| r.borrow().code == code)
}

/// Put `response` in place of the entry at `index`.
pub fn replace_response(op: &mut Operation, index: usize, response: Response) -> Shared<Response> {
    let shared = Shared::new(response);
    op.responses[index] = shared.clone();
    shared
}

/// Edit the first query parameter named `base_name`.
///
/// With `copy`, the record is detached first and the copy replaces the
/// original in every view of `op`, so operations sharing the original don't
/// see the edit. Returns whether a parameter was found.
pub fn update_query_param(
    op: &mut Operation,
    base_name: &str,
    copy: bool,
    edit: impl FnOnce(&mut Parameter),
) -> bool {
    let Some(original) = op
        .query_params
        .iter()
        .find(|p| p.borrow().base_name == base_name)
        .cloned()
    else {
        return false;
    };

    let target = if copy {
        let detached = copy_parameter(&original);
        for view in op.param_views_mut() {
            for entry in view.iter_mut() {
                if entry.ptr_eq(&original) {
                    *entry = detached.clone();
                }
            }
        }
        if let Some(body) = &mut op.body_param {
            if body.ptr_eq(&original) {
                *body = detached.clone();
            }
        }
        detached
    } else {
        original
    };

    edit(&mut target.borrow_mut());
    true
}

/// Drop the query parameter named `base_name` from the all, query and required
/// views. Each view loses at most its first match.
pub fn remove_query_param(op: &mut Operation, base_name: &str) {
    let matches = |p: &Shared<Parameter>| {
        let p = p.borrow();
        p.is_query_param() && p.base_name == base_name
    };
    for view in [
        &mut op.all_params,
        &mut op.query_params,
        &mut op.required_params,
    ] {
        if let Some(index) = view.iter().position(matches) {
            view.remove(index);
        }
    }
}
