use crate::directive::{Directive, DirectiveKey};
use crate::ir::Model;
use crate::naming::NamingUtility;

/// Drop the properties named by `ignore-properties`, keeping the order of the rest.
pub fn prune_ignored_properties(model: &mut Model) {
    let Some(Directive::IgnoreProperties(ignored)) = model.directives.get(DirectiveKey::IgnoreProperties)
    else {
        return;
    };
    let before = model.all_vars.len();
    model
        .all_vars
        .retain(|prop| !ignored.iter().any(|name| *name == prop.base_name));
    let pruned = before - model.all_vars.len();
    if pruned > 0 {
        log::debug!("model {}: pruned {pruned} ignored properties", model.name);
    }
}

/// Per-model finalization run while the model is rendered.
///
/// Safe to run more than once on the same model.
pub fn finalize_model(model: &mut Model, naming: &dyn NamingUtility) {
    apply_property_hooks(model, naming);
    propagate_include_empty(model);
    canonicalize_container_mixin(model, naming);
    mark_positional_param(model);
}

/// Target-specific property identifiers and labels.
fn apply_property_hooks(model: &mut Model, naming: &dyn NamingUtility) {
    for prop in &mut model.all_vars {
        if let Some(name) = naming.property_substitution(&prop.base_name) {
            prop.name = name;
        }
        if let Some(label) = naming.label_name(&prop.base_name) {
            prop.directives.insert(Directive::MatlabBaseName(label));
        }
    }
}

/// Push the model-level `include-empty` list down onto the named properties.
fn propagate_include_empty(model: &mut Model) {
    let Some(Directive::IncludeEmpty(names)) = model.directives.get(DirectiveKey::IncludeEmpty)
    else {
        return;
    };
    for name in names {
        match model.all_vars.iter_mut().find(|p| p.base_name == *name) {
            Some(prop) => {
                prop.directives.insert(Directive::IncludeEmptyMarker);
            }
            None => log::debug!("model {}: include-empty names unknown property {name}", model.name),
        }
    }
}

fn canonicalize_container_mixin(model: &mut Model, naming: &dyn NamingUtility) {
    if let Some(Directive::ContainerMixin(mixin)) = model.directives.get_mut(DirectiveKey::ContainerMixin)
    {
        mixin.resolve_with(|raw| naming.to_model_name(raw));
    }
}

/// Record the positional property on the model. The last marked property wins.
fn mark_positional_param(model: &mut Model) {
    let mut positional: Option<&str> = None;
    for prop in &model.all_vars {
        if prop.directives.contains(DirectiveKey::Positional) {
            if let Some(previous) = positional {
                log::warn!(
                    "model {}: positional property {previous} overridden by {}",
                    model.name,
                    prop.name
                );
            }
            positional = Some(&prop.name);
        }
    }
    if let Some(name) = positional {
        let name = name.to_string();
        model.directives.insert(Directive::PositionalParam(name));
    }
}
