//! Glue (binding) generation (`spec.md` §4.8.6): per-route metadata describing
//! the six steps a generated closure performs at runtime — negotiate, extract
//! path params, extract query/header/cookie params, parse+validate the body,
//! invoke the handler, default the response `Content-Type`. This module emits
//! the *description* of each glue closure; `katana::server::dispatch::GlueHandler`
//! is the trait the emitted closures are written against.

use serde::Serialize;

use crate::generator::context::{rust_type_name, AllocatorMode, EmitContext};
use crate::spec::{Document, Operation, ParameterLocation};

#[derive(Debug, Clone, Serialize)]
pub struct GlueParam {
    pub name: String,
    pub location: String,
    pub required: bool,
    pub ty: String,
    /// `true` when `ty` is a borrowed/owned string (`&str`/`String`) and the raw
    /// extracted text can be used as-is; `false` when it must be `.parse()`d.
    pub is_string: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlueBodyBinding {
    pub content_type: String,
    pub parse_fn: String,
    pub validate_fn: String,
    pub entity_ty: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlueDef {
    pub operation_id: String,
    pub handler_method: String,
    pub path: String,
    pub method: String,
    pub produces: Vec<String>,
    /// Content types this operation's request body accepts (`spec.md` §4.4 "match
    /// `Content-Type` against `consumes`"). Empty when the operation has no request
    /// body, in which case no Content-Type check is generated at all.
    pub consumes: Vec<String>,
    pub params: Vec<GlueParam>,
    pub body_bindings: Vec<GlueBodyBinding>,
}

pub fn collect_glue(doc: &Document, allocator: AllocatorMode) -> Vec<GlueDef> {
    doc.operations.iter().filter_map(|op| build_glue(doc, op, allocator)).collect()
}

fn build_glue(doc: &Document, op: &Operation, allocator: AllocatorMode) -> Option<GlueDef> {
    let operation_id = op.operation_id.clone()?;
    let ctx = EmitContext::top_level(allocator);

    let params = op
        .parameters
        .iter()
        .map(|p| {
            let ty = rust_type_name(doc, p.schema, &ctx);
            let is_string = ty == "&str" || ty == "String" || ty.starts_with("&'a str");
            GlueParam {
                name: p.name.clone(),
                location: location_name(p.location),
                required: p.required,
                ty,
                is_string,
            }
        })
        .collect();

    let body_bindings: Vec<GlueBodyBinding> = op
        .request_body
        .iter()
        .flat_map(|body| &body.content)
        .map(|media| {
            let schema = doc.schema(media.schema);
            let entity = schema.name.clone().unwrap_or_else(|| "serde_json::Value".to_string());
            let fn_base = crate::generator::codec::snake(&entity);
            GlueBodyBinding {
                content_type: media.content_type.clone(),
                parse_fn: format!("parse_{fn_base}"),
                validate_fn: format!("validate_{fn_base}"),
                entity_ty: entity,
            }
        })
        .collect();

    let consumes: Vec<String> = body_bindings.iter().map(|b| b.content_type.clone()).collect();

    let mut produces: Vec<String> = op
        .responses
        .iter()
        .flat_map(|r| r.content.iter().map(|m| m.content_type.clone()))
        .collect();
    produces.sort();
    produces.dedup();

    Some(GlueDef {
        method: op.method.as_str().to_string(),
        path: op.path.clone(),
        handler_method: crate::generator::codec::snake(&operation_id),
        operation_id,
        produces,
        consumes,
        params,
        body_bindings,
    })
}

fn location_name(location: ParameterLocation) -> String {
    match location {
        ParameterLocation::Path => "path",
        ParameterLocation::Query => "query",
        ParameterLocation::Header => "header",
        ParameterLocation::Cookie => "cookie",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::loader::build_document;
    use serde_json::json;

    #[test]
    fn body_binding_names_parse_and_validate_functions() {
        let root = json!({
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/users": {
                    "post": {
                        "operationId": "create_user",
                        "requestBody": {
                            "content": { "application/json": { "schema": {"$ref": "#/components/schemas/UserInput"} } }
                        },
                        "responses": {}
                    }
                }
            },
            "components": { "schemas": { "UserInput": {"type": "object", "properties": {"name": {"type": "string"}}} } }
        });
        let doc = build_document(&root, false).unwrap();
        let glue = collect_glue(&doc, AllocatorMode::Standard);
        let binding = &glue[0].body_bindings[0];
        assert_eq!(binding.parse_fn, "parse_user_input");
        assert_eq!(binding.validate_fn, "validate_user_input");
    }
}
