//! RFC 7807 Problem Details (`spec.md` §4.10), grounded on the original core's
//! `problem.hpp`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::http::Response;

/// `{ "type", "title", "status", "detail"?, "instance"?, <extensions> }` per RFC 7807.
/// Extension ordering is not part of the contract; a `BTreeMap` is used purely for
/// deterministic test output, not because callers may rely on any particular order.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, String>,
}

impl ProblemDetails {
    fn new(status: u16, title: &str, detail: &str) -> Self {
        ProblemDetails {
            problem_type: "about:blank".to_string(),
            title: title.to_string(),
            status,
            detail: if detail.is_empty() { None } else { Some(detail.to_string()) },
            instance: None,
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn bad_request(detail: &str) -> Self {
        Self::new(400, "Bad Request", detail)
    }

    pub fn unauthorized(detail: &str) -> Self {
        Self::new(401, "Unauthorized", detail)
    }

    pub fn forbidden(detail: &str) -> Self {
        Self::new(403, "Forbidden", detail)
    }

    pub fn not_found(detail: &str) -> Self {
        Self::new(404, "Not Found", detail)
    }

    pub fn method_not_allowed(detail: &str) -> Self {
        Self::new(405, "Method Not Allowed", detail)
    }

    pub fn not_acceptable(detail: &str) -> Self {
        Self::new(406, "Not Acceptable", detail)
    }

    pub fn conflict(detail: &str) -> Self {
        Self::new(409, "Conflict", detail)
    }

    pub fn unsupported_media_type(detail: &str) -> Self {
        Self::new(415, "Unsupported Media Type", detail)
    }

    pub fn unprocessable_entity(detail: &str) -> Self {
        Self::new(422, "Unprocessable Entity", detail)
    }

    pub fn internal_server_error(detail: &str) -> Self {
        Self::new(500, "Internal Server Error", detail)
    }

    pub fn service_unavailable(detail: &str) -> Self {
        Self::new(503, "Service Unavailable", detail)
    }

    /// Render into an HTTP response with `Content-Type: application/problem+json`.
    pub fn into_response<'a>(self, arena: &'a crate::arena::Arena) -> Response<'a> {
        let body = serde_json::to_vec(&self).unwrap_or_else(|_| b"{}".to_vec());
        let mut response = Response::with_body(self.status, body);
        response.header_map.insert(
            arena.alloc_str("Content-Type").expect("arena allocation for a short literal cannot fail"),
            arena.alloc_str("application/problem+json").expect("arena allocation for a short literal cannot fail"),
        );
        response
    }
}
