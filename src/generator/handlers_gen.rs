//! Handler interface generation (`spec.md` §4.8.5).

use serde::Serialize;

use crate::generator::context::{AllocatorMode, EmitContext, EmitPosition};
use crate::spec::{Document, Operation, ParameterLocation};

#[derive(Debug, Clone, Serialize)]
pub struct HandlerParam {
    pub name: String,
    pub ty: String,
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HandlerMethod {
    pub method_name: String,
    pub operation_id: String,
    pub params: Vec<HandlerParam>,
    pub body_param: Option<HandlerParam>,
}

/// One [`HandlerMethod`] per `operationId`'d operation, parameter order fixed by
/// `spec.md` §4.8.5: path params first, then query/header/cookie, then the body.
pub fn collect_handler_methods(doc: &Document, allocator: AllocatorMode) -> Vec<HandlerMethod> {
    doc.operations
        .iter()
        .filter_map(|op| build_method(doc, op, allocator))
        .collect()
}

fn build_method(doc: &Document, op: &Operation, allocator: AllocatorMode) -> Option<HandlerMethod> {
    let operation_id = op.operation_id.clone()?;
    let ctx = EmitContext::top_level(allocator);

    let mut params = Vec::new();
    for p in op.parameters.iter().filter(|p| p.location == ParameterLocation::Path) {
        params.push(param_for(doc, p, &ctx));
    }
    for p in op
        .parameters
        .iter()
        .filter(|p| p.location != ParameterLocation::Path)
    {
        params.push(param_for(doc, p, &ctx));
    }

    let body_param = op.request_body.as_ref().and_then(|body| {
        let schemas: Vec<_> = body.content.iter().map(|m| m.schema).collect();
        if schemas.is_empty() {
            return None;
        }
        let ty = if schemas.len() == 1 {
            crate::generator::context::rust_type_name(doc, schemas[0], &ctx)
        } else {
            format!("{}Body", crate::spec::sanitize_identifier(&operation_id))
        };
        Some(HandlerParam { name: "body".to_string(), ty: format!("&{ty}"), optional: false })
    });

    Some(HandlerMethod {
        method_name: snake_case(&operation_id),
        operation_id,
        params,
        body_param,
    })
}

fn param_for(doc: &Document, p: &crate::spec::Parameter, ctx: &EmitContext) -> HandlerParam {
    let ty = crate::generator::context::rust_type_name(doc, p.schema, &ctx.nested(EmitPosition::ObjectProperty));
    let ty = if p.required { ty } else { format!("Option<{ty}>") };
    HandlerParam { name: p.name.clone(), ty, optional: !p.required }
}

fn snake_case(s: &str) -> String {
    crate::generator::codec::snake(s)
}
