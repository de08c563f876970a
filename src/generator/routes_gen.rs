//! Route table generation (`spec.md` §4.8.4).

use serde::Serialize;

use crate::spec::Document;

#[derive(Debug, Clone, Serialize)]
pub struct RouteEntryDef {
    pub path: String,
    pub method: String,
    pub method_variant: String,
    pub operation_id: String,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub path_param_count: usize,
    pub has_request_body: bool,
}

/// One [`RouteEntryDef`] per operation carrying an `operationId` (`spec.md` §4.8.4;
/// operations without one are skipped, mirroring §4.8.5's handler-interface rule).
pub fn collect_routes(doc: &Document) -> Vec<RouteEntryDef> {
    doc.operations
        .iter()
        .filter_map(|op| {
            let operation_id = op.operation_id.clone()?;
            let consumes = op
                .request_body
                .as_ref()
                .map(|body| body.content.iter().map(|m| m.content_type.clone()).collect())
                .unwrap_or_default();
            let mut produces: Vec<String> = op
                .responses
                .iter()
                .flat_map(|r| r.content.iter().map(|m| m.content_type.clone()))
                .collect();
            produces.sort();
            produces.dedup();
            let path_param_count = op
                .parameters
                .iter()
                .filter(|p| matches!(p.location, crate::spec::ParameterLocation::Path))
                .count();
            Some(RouteEntryDef {
                path: op.path.clone(),
                method: method_name(op.method),
                method_variant: method_variant(op.method),
                operation_id,
                consumes,
                produces,
                path_param_count,
                has_request_body: op.request_body.is_some(),
            })
        })
        .collect()
}

fn method_name(method: crate::http::Method) -> String {
    method.as_str().to_string()
}

fn method_variant(method: crate::http::Method) -> String {
    use crate::http::Method;
    match method {
        Method::Get => "Get",
        Method::Post => "Post",
        Method::Put => "Put",
        Method::Delete => "Delete",
        Method::Patch => "Patch",
        Method::Head => "Head",
        Method::Options => "Options",
        Method::Unknown => "Unknown",
    }
    .to_string()
}
