//! The `ensure_inline_schema_names` pass (`spec.md` §4.7).
//!
//! Every schema reachable from an operation's body, parameter, or response that
//! pass one left anonymous (no component name) is assigned one here, so the
//! generator never has to emit a type for "the thing with no name". Component
//! schemas (already named in the loader) are left untouched and are never
//! revisited, even when an operation also references them directly.

use std::collections::HashSet;

use crate::spec::ast::{Document, SchemaRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingStyle {
    /// `{op_id}_body_{i}`, `{op_id}_param_{name}`, `{op_id}_resp_{status}_{i}`,
    /// or `{Parent}_{Field}_t` when a named parent/field context is available.
    Operation,
    /// `InlineSchema1, InlineSchema2, ...` assigned in visitation order.
    Flat,
}

pub fn ensure_inline_schema_names(document: &mut Document, style: NamingStyle) {
    let mut assigned: HashSet<String> = document
        .schemas
        .iter()
        .filter_map(|s| s.name.clone())
        .collect();
    let mut visited: HashSet<SchemaRef> = HashSet::new();
    let mut flat_counter: usize = 1;

    let operations = document.operations.clone();
    for operation in &operations {
        let op_id = operation.operation_id.clone().unwrap_or_else(|| "op".to_string());

        let mut body_index = 0usize;
        if let Some(body) = &operation.request_body {
            for media in &body.content {
                body_index += 1;
                let fallback = format!("{op_id}_body_{body_index}");
                visit(document, media.schema, &fallback, None, None, style, &mut assigned, &mut visited, &mut flat_counter);
            }
        }

        for param in &operation.parameters {
            let fallback = format!("{op_id}_param_{}", param.name);
            visit(document, param.schema, &fallback, None, None, style, &mut assigned, &mut visited, &mut flat_counter);
        }

        let mut resp_index_by_status: std::collections::HashMap<u16, usize> = std::collections::HashMap::new();
        for response in &operation.responses {
            for media in &response.content {
                let counter = resp_index_by_status.entry(response.status).or_insert(0);
                *counter += 1;
                let fallback = format!("{op_id}_resp_{}_{}", response.status, counter);
                visit(document, media.schema, &fallback, None, None, style, &mut assigned, &mut visited, &mut flat_counter);
            }
        }
    }
}

/// Assign a name to `schema_ref` if it has none, then recurse into its children so
/// nested anonymous object/array schemas get contextual names derived from this
/// one (`{Parent}_{Field}_t`).
#[allow(clippy::too_many_arguments)]
fn visit(
    document: &mut Document,
    schema_ref: SchemaRef,
    fallback_name: &str,
    parent_name: Option<&str>,
    field_name: Option<&str>,
    style: NamingStyle,
    assigned: &mut HashSet<String>,
    visited: &mut HashSet<SchemaRef>,
    flat_counter: &mut usize,
) {
    if !visited.insert(schema_ref) {
        return;
    }

    let already_named = document.schemas[schema_ref].name.is_some();
    if !already_named {
        let candidate = match style {
            NamingStyle::Flat => {
                let name = format!("InlineSchema{flat_counter}");
                *flat_counter += 1;
                name
            }
            NamingStyle::Operation => match (parent_name, field_name) {
                (Some(parent), Some(field)) => format!("{parent}_{field}_t"),
                _ => fallback_name.to_string(),
            },
        };
        let unique = uniquify(sanitize_identifier(&candidate), assigned);
        assigned.insert(unique.clone());
        document.schemas[schema_ref].name = Some(unique);
    }

    let this_name = document.schemas[schema_ref].name.clone().unwrap_or_default();

    let properties = document.schemas[schema_ref].properties.clone();
    for (field, child_ref) in properties {
        let child_fallback = format!("{this_name}_{field}");
        visit(document, child_ref, &child_fallback, Some(&this_name), Some(&field), style, assigned, visited, flat_counter);
    }

    if let Some(items_ref) = document.schemas[schema_ref].items {
        let child_fallback = format!("{this_name}_item");
        visit(document, items_ref, &child_fallback, Some(&this_name), Some("item"), style, assigned, visited, flat_counter);
    }

    let one_of = document.schemas[schema_ref].one_of.clone();
    for (i, variant_ref) in one_of.into_iter().enumerate() {
        let child_fallback = format!("{this_name}_variant_{}", i + 1);
        visit(document, variant_ref, &child_fallback, None, None, style, assigned, visited, flat_counter);
    }

    let any_of = document.schemas[schema_ref].any_of.clone();
    for (i, variant_ref) in any_of.into_iter().enumerate() {
        let child_fallback = format!("{this_name}_variant_{}", i + 1);
        visit(document, variant_ref, &child_fallback, None, None, style, assigned, visited, flat_counter);
    }
}

/// Break collisions by appending `_1, _2, ...` (`spec.md` §4.7).
fn uniquify(base: String, assigned: &HashSet<String>) -> String {
    if !assigned.contains(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}_{n}");
        if !assigned.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Sanitize to `[A-Za-z_][A-Za-z0-9_]*` (`spec.md` §4.7).
pub fn sanitize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, ch) in raw.chars().enumerate() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if i == 0 && ch.is_ascii_digit() {
                out.push('_');
            }
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::loader::build_document;
    use serde_json::json;

    fn doc_with_inline_body() -> Document {
        let root = json!({
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/users": {
                    "post": {
                        "operationId": "create_user",
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "name": {"type": "string"},
                                            "address": {
                                                "type": "object",
                                                "properties": { "city": {"type": "string"} }
                                            }
                                        }
                                    }
                                }
                            }
                        },
                        "responses": {
                            "201": {"description": "created", "content": {"application/json": {"schema": {"type": "object"}}}}
                        }
                    }
                }
            }
        });
        build_document(&root, false).unwrap()
    }

    #[test]
    fn anonymous_body_schema_gets_operation_based_name() {
        let mut doc = doc_with_inline_body();
        ensure_inline_schema_names(&mut doc, NamingStyle::Operation);
        let body_ref = doc.operations[0].request_body.as_ref().unwrap().content[0].schema;
        assert_eq!(doc.schema(body_ref).name.as_deref(), Some("create_user_body_1"));
    }

    #[test]
    fn nested_anonymous_property_gets_contextual_name() {
        let mut doc = doc_with_inline_body();
        ensure_inline_schema_names(&mut doc, NamingStyle::Operation);
        let body_ref = doc.operations[0].request_body.as_ref().unwrap().content[0].schema;
        let body = doc.schema(body_ref).clone();
        let (_, address_ref) = body.properties.iter().find(|(n, _)| n == "address").unwrap();
        let address_name = doc.schema(*address_ref).name.clone().unwrap();
        assert_eq!(address_name, "create_user_body_1_address_t");
    }

    #[test]
    fn flat_style_assigns_sequential_names() {
        let mut doc = doc_with_inline_body();
        ensure_inline_schema_names(&mut doc, NamingStyle::Flat);
        let body_ref = doc.operations[0].request_body.as_ref().unwrap().content[0].schema;
        assert_eq!(doc.schema(body_ref).name.as_deref(), Some("InlineSchema1"));
    }

    #[test]
    fn component_schema_is_never_renamed() {
        let mut root = json!({
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/users": {
                    "get": {
                        "operationId": "list_users",
                        "responses": {
                            "200": {
                                "description": "ok",
                                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/User"}}}
                            }
                        }
                    }
                }
            }
        });
        root["components"] = json!({"schemas": {"User": {"type": "object", "properties": {"id": {"type": "string"}}}}});
        let mut doc = build_document(&root, false).unwrap();
        ensure_inline_schema_names(&mut doc, NamingStyle::Operation);
        let idx = doc.component_names["User"];
        assert_eq!(doc.schema(idx).name.as_deref(), Some("User"));
    }

    #[test]
    fn sanitize_identifier_handles_leading_digit_and_symbols() {
        assert_eq!(sanitize_identifier("2fast"), "_fast");
        assert_eq!(sanitize_identifier("a-b.c"), "a_b_c");
    }

    #[test]
    fn collisions_are_broken_with_a_numeric_suffix() {
        let mut assigned = HashSet::new();
        assigned.insert("Foo".to_string());
        assigned.insert("Foo_1".to_string());
        assert_eq!(uniquify("Foo".to_string(), &assigned), "Foo_2");
    }
}
