//! The context tree the generator visits schemas with (`spec.md` §4.8:
//! "Emission strategy is a tree of contexts, not inline templates").

use crate::spec::{Document, SchemaRef, SchemaType};

/// Whether generated entities use arena-backed borrowed types or owned
/// standard-library types (`spec.md` §4.8, `--allocator {arena,standard}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocatorMode {
    Arena,
    Standard,
}

/// Where a schema is being emitted relative to its container — the same schema
/// can need a different expression shape depending on position (`spec.md` §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitPosition {
    TopLevelValue,
    ObjectProperty,
    ArrayElement,
}

/// Threaded through every emission function: indentation depth, the allocator
/// mode, and the schema's position in its container.
#[derive(Debug, Clone, Copy)]
pub struct EmitContext {
    pub indent: usize,
    pub position: EmitPosition,
    pub allocator: AllocatorMode,
}

impl EmitContext {
    pub fn top_level(allocator: AllocatorMode) -> Self {
        EmitContext { indent: 0, position: EmitPosition::TopLevelValue, allocator }
    }

    pub fn nested(&self, position: EmitPosition) -> Self {
        EmitContext { indent: self.indent + 1, position, allocator: self.allocator }
    }

    pub fn pad(&self) -> String {
        "    ".repeat(self.indent)
    }
}

/// The Rust entity (scalar alias, struct, or enum) a schema maps to.
/// `spec.md` §4.8.1's four emission cases, named so downstream emitters
/// (codec, validator) can dispatch on it without re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityShape {
    Struct,
    StringEnum,
    ScalarAlias,
    ArrayAlias,
    /// A `$ref` cycle artifact with no properties of its own — nothing is
    /// emitted for it (`spec.md` §4.8.1).
    Placeholder,
}

pub fn entity_shape(doc: &Document, schema_ref: SchemaRef) -> EntityShape {
    let schema = doc.schema(schema_ref);
    if schema.is_placeholder() && schema.unresolved_ref.is_none() {
        return EntityShape::Placeholder;
    }
    if !schema.properties.is_empty() {
        return EntityShape::Struct;
    }
    if schema.schema_type == SchemaType::String && !schema.enum_values.is_empty() {
        return EntityShape::StringEnum;
    }
    if schema.schema_type == SchemaType::Array {
        return EntityShape::ArrayAlias;
    }
    EntityShape::ScalarAlias
}

/// The Rust type a schema resolves to, for use in a field or alias declaration.
pub fn rust_type_name(doc: &Document, schema_ref: SchemaRef, ctx: &EmitContext) -> String {
    let schema = doc.schema(schema_ref);
    if let Some(name) = &schema.name {
        if matches!(entity_shape(doc, schema_ref), EntityShape::Struct | EntityShape::StringEnum) {
            return name.clone();
        }
    }
    match schema.schema_type {
        SchemaType::String => match ctx.allocator {
            AllocatorMode::Arena => "&'a str".to_string(),
            AllocatorMode::Standard => "String".to_string(),
        },
        SchemaType::Integer => match schema.format.as_deref() {
            Some("int32") => "i32".to_string(),
            _ => "i64".to_string(),
        },
        SchemaType::Number => match schema.format.as_deref() {
            Some("float") => "f32".to_string(),
            _ => "f64".to_string(),
        },
        SchemaType::Boolean => "bool".to_string(),
        SchemaType::Array => {
            let item_ref = schema.items.unwrap_or(schema_ref);
            let item_ty = rust_type_name(doc, item_ref, &ctx.nested(EmitPosition::ArrayElement));
            match ctx.allocator {
                AllocatorMode::Arena => format!("&'a [{item_ty}]"),
                AllocatorMode::Standard => format!("Vec<{item_ty}>"),
            }
        }
        SchemaType::Object | SchemaType::Unknown => {
            schema.name.clone().unwrap_or_else(|| "serde_json::Value".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::loader::build_document;
    use serde_json::json;

    fn doc_with_component(schema: serde_json::Value) -> (Document, SchemaRef) {
        let root = json!({
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
            "paths": {},
            "components": {"schemas": {"T": schema}}
        });
        let doc = build_document(&root, false).unwrap();
        let idx = doc.component_names["T"];
        (doc, idx)
    }

    #[test]
    fn object_with_properties_is_a_struct() {
        let (doc, idx) = doc_with_component(json!({"type": "object", "properties": {"a": {"type": "string"}}}));
        assert_eq!(entity_shape(&doc, idx), EntityShape::Struct);
    }

    #[test]
    fn string_with_enum_is_a_string_enum() {
        let (doc, idx) = doc_with_component(json!({"type": "string", "enum": ["a", "b"]}));
        assert_eq!(entity_shape(&doc, idx), EntityShape::StringEnum);
    }

    #[test]
    fn scalar_maps_to_rust_primitive() {
        let (doc, idx) = doc_with_component(json!({"type": "integer", "format": "int32"}));
        let ctx = EmitContext::top_level(AllocatorMode::Standard);
        assert_eq!(rust_type_name(&doc, idx, &ctx), "i32");
    }

    #[test]
    fn arena_mode_strings_are_borrowed() {
        let (doc, idx) = doc_with_component(json!({"type": "string"}));
        let ctx = EmitContext::top_level(AllocatorMode::Arena);
        assert_eq!(rust_type_name(&doc, idx, &ctx), "&'a str");
    }
}
