//! Entity generation (`spec.md` §4.8.1).

use serde::Serialize;

use crate::generator::context::{entity_shape, rust_type_name, AllocatorMode, EmitContext, EntityShape};
use crate::spec::{Document, SchemaRef};

#[derive(Debug, Clone, Serialize)]
pub struct EntityField {
    pub name: String,
    pub ty: String,
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumCase {
    pub case_name: String,
    pub literal: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstraintEntry {
    pub field: String,
    pub constant_name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum EntityKind {
    Struct { fields: Vec<EntityField> },
    StringEnum { cases: Vec<EnumCase> },
    ScalarAlias { target: String },
    ArrayAlias { target: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityDef {
    pub name: String,
    pub kind: EntityKind,
    pub constraints: Vec<ConstraintEntry>,
}

/// Walk every named, non-placeholder schema and build its [`EntityDef`]
/// (`spec.md` §4.8.1). Schemas with no assigned name are skipped — run
/// `ensure_inline_schema_names` first.
pub fn collect_entities(doc: &Document, allocator: AllocatorMode) -> Vec<EntityDef> {
    let ctx = EmitContext::top_level(allocator);
    let mut out = Vec::new();
    for (idx, schema) in doc.schemas.iter().enumerate() {
        let Some(name) = schema.name.clone() else { continue };
        match entity_shape(doc, idx) {
            EntityShape::Placeholder => continue,
            EntityShape::Struct => {
                let fields = schema
                    .properties
                    .iter()
                    .map(|(field_name, field_ref)| EntityField {
                        name: field_name.clone(),
                        ty: rust_type_name(doc, *field_ref, &ctx),
                        optional: !schema.required.contains(field_name),
                    })
                    .collect();
                out.push(EntityDef {
                    name,
                    kind: EntityKind::Struct { fields },
                    constraints: constraint_entries(doc, idx),
                });
            }
            EntityShape::StringEnum => {
                let cases = schema
                    .enum_values
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(|literal| EnumCase { case_name: enum_case_name(literal), literal: literal.to_string() })
                    .collect();
                out.push(EntityDef {
                    name,
                    kind: EntityKind::StringEnum { cases },
                    constraints: Vec::new(),
                });
            }
            EntityShape::ScalarAlias => {
                out.push(EntityDef {
                    name,
                    kind: EntityKind::ScalarAlias { target: rust_type_name(doc, idx, &ctx) },
                    constraints: constraint_entries(doc, idx),
                });
            }
            EntityShape::ArrayAlias => {
                out.push(EntityDef {
                    name,
                    kind: EntityKind::ArrayAlias { target: rust_type_name(doc, idx, &ctx) },
                    constraints: constraint_entries(doc, idx),
                });
            }
        }
    }
    out
}

/// `MIN_LENGTH`, `MAXIMUM`, `REQUIRED`, ... plus the `min <= max` assertion pairs
/// (`spec.md` §4.8.1's "compile-time metadata block").
fn constraint_entries(doc: &Document, schema_ref: SchemaRef) -> Vec<ConstraintEntry> {
    let schema = doc.schema(schema_ref);
    let mut out = Vec::new();
    let field = schema.name.clone().unwrap_or_default();
    let mut push = |name: &str, value: String| {
        out.push(ConstraintEntry { field: field.clone(), constant_name: name.to_string(), value })
    };
    if let Some(v) = schema.min_length { push("MIN_LENGTH", v.to_string()); }
    if let Some(v) = schema.max_length { push("MAX_LENGTH", v.to_string()); }
    if let Some(v) = schema.minimum { push("MINIMUM", v.to_string()); }
    if let Some(v) = schema.maximum { push("MAXIMUM", v.to_string()); }
    if let Some(v) = schema.multiple_of { push("MULTIPLE_OF", v.to_string()); }
    if let Some(v) = schema.min_items { push("MIN_ITEMS", v.to_string()); }
    if let Some(v) = schema.max_items { push("MAX_ITEMS", v.to_string()); }
    if !schema.required.is_empty() {
        push("REQUIRED", format!("[{}]", schema.required.iter().map(|r| format!("\"{r}\"")).collect::<Vec<_>>().join(", ")));
    }
    out
}

fn enum_case_name(literal: &str) -> String {
    let sanitized = crate::spec::sanitize_identifier(literal);
    let pascal = sanitized
        .split('_')
        .filter(|s| !s.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<String>();
    if pascal.is_empty() || pascal.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        format!("Value{pascal}")
    } else {
        pascal
    }
}
