use crate::ir::{ContainerKind, TypeInfo};
use crate::naming::NamingUtility;
use crate::parse::refs::RefOr;
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType, TypeSet};

/// Type info for a schema or a reference to a component schema.
pub fn schema_or_ref_type(schema_or_ref: &SchemaOrRef, naming: &dyn NamingUtility) -> TypeInfo {
    match schema_or_ref {
        RefOr::Ref { .. } => {
            let name = schema_or_ref.ref_name().unwrap_or("object");
            TypeInfo::model(&naming.to_model_name(name))
        }
        RefOr::Item(schema) => schema_type(schema, naming),
    }
}

/// Type info for an inline schema.
pub fn schema_type(schema: &Schema, naming: &dyn NamingUtility) -> TypeInfo {
    // A single allOf part is a plain alias; otherwise the first referenced part names the type
    if !schema.all_of.is_empty() {
        if schema.all_of.len() == 1 {
            return schema_or_ref_type(&schema.all_of[0], naming);
        }
        if let Some(part) = schema.all_of.iter().find(|p| p.ref_name().is_some()) {
            return schema_or_ref_type(part, naming);
        }
        return TypeInfo::primitive("object");
    }
    if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
        return TypeInfo::primitive("object");
    }

    match schema.schema_type.as_ref().and_then(TypeSet::primary) {
        Some(SchemaType::String) => match schema.format.as_deref() {
            Some("date-time") => TypeInfo::primitive("DateTime"),
            Some("date") => TypeInfo::primitive("date"),
            Some("binary" | "byte") => file_type(),
            _ => TypeInfo::primitive("string"),
        },
        Some(SchemaType::Integer) => TypeInfo::primitive("integer"),
        Some(SchemaType::Number) => TypeInfo::primitive("number"),
        Some(SchemaType::Boolean) => TypeInfo::primitive("boolean"),
        Some(SchemaType::Array) => array_type(schema, naming),
        Some(SchemaType::Object) => object_type(schema, naming),
        Some(SchemaType::Null) => TypeInfo::primitive("object"),
        None => {
            if schema.items.is_some() {
                array_type(schema, naming)
            } else {
                object_type(schema, naming)
            }
        }
    }
}

/// The value type of a map-like schema, when it has one.
pub fn additional_properties_type(schema: &Schema, naming: &dyn NamingUtility) -> Option<String> {
    match &schema.additional_properties {
        Some(AdditionalProperties::Schema(inner)) => schema_or_ref_type(inner, naming).data_type,
        Some(AdditionalProperties::Bool(true)) => Some("object".to_string()),
        Some(AdditionalProperties::Bool(false)) | None => None,
    }
}

/// A binary payload: an uploaded or downloaded file.
pub fn file_type() -> TypeInfo {
    TypeInfo {
        is_file: true,
        is_binary: true,
        ..TypeInfo::primitive("file")
    }
}

fn array_type(schema: &Schema, naming: &dyn NamingUtility) -> TypeInfo {
    let inner = match &schema.items {
        Some(items) => schema_or_ref_type(items, naming),
        None => TypeInfo::primitive("object"),
    };
    TypeInfo::contained(ContainerKind::Array, inner)
}

fn object_type(schema: &Schema, naming: &dyn NamingUtility) -> TypeInfo {
    if schema.properties.is_empty() {
        match &schema.additional_properties {
            Some(AdditionalProperties::Schema(inner)) => {
                return TypeInfo::contained(ContainerKind::Map, schema_or_ref_type(inner, naming));
            }
            Some(AdditionalProperties::Bool(true)) => {
                return TypeInfo::contained(ContainerKind::Map, TypeInfo::primitive("object"));
            }
            Some(AdditionalProperties::Bool(false)) | None => {}
        }
    }
    TypeInfo::primitive("object")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetLanguage;
    use crate::naming::TargetNaming;

    fn resolve(yaml: &str) -> TypeInfo {
        let schema: SchemaOrRef = serde_yaml_ng::from_str(yaml).unwrap();
        schema_or_ref_type(&schema, &TargetNaming::new(TargetLanguage::Python))
    }

    #[test]
    fn reference_names_a_model() {
        let t = resolve("$ref: '#/components/schemas/file-entry'");
        assert_eq!(t.data_type.as_deref(), Some("FileEntry"));
        assert_eq!(t.model.as_deref(), Some("FileEntry"));
        assert!(!t.is_primitive);
    }

    #[test]
    fn primitives() {
        assert_eq!(resolve("type: string").data_type.as_deref(), Some("string"));
        assert_eq!(resolve("type: integer").data_type.as_deref(), Some("integer"));
        let dt = resolve("{type: string, format: date-time}");
        assert_eq!(dt.data_type.as_deref(), Some("DateTime"));
        assert!(dt.is_primitive);
    }

    #[test]
    fn binary_is_a_file() {
        let t = resolve("{type: string, format: binary}");
        assert!(t.is_file);
        assert!(t.is_binary);
        assert_eq!(t.data_type.as_deref(), Some("file"));
    }

    #[test]
    fn array_of_models() {
        let t = resolve("{type: array, items: {$ref: '#/components/schemas/FileEntry'}}");
        assert_eq!(t.data_type.as_deref(), Some("array[FileEntry]"));
        assert_eq!(t.container, Some(ContainerKind::Array));
        assert_eq!(t.model.as_deref(), Some("FileEntry"));
    }

    #[test]
    fn map_of_strings() {
        let t = resolve("{type: object, additionalProperties: {type: string}}");
        assert_eq!(t.data_type.as_deref(), Some("map[string, string]"));
        assert_eq!(t.container, Some(ContainerKind::Map));
    }

    #[test]
    fn all_of_takes_referenced_part() {
        let t = resolve(
            "allOf: [{$ref: '#/components/schemas/Info'}, {type: object, properties: {x: {type: string}}}]",
        );
        assert_eq!(t.model.as_deref(), Some("Info"));
    }
}
