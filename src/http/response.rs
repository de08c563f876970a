//! The runtime response entity (`spec.md` §3.1).

use super::headers::HeaderMap;

/// An HTTP response whose serialization is a pure function of its fields.
#[derive(Debug, Clone)]
pub struct Response<'a> {
    pub status: u16,
    pub reason: &'static str,
    pub header_map: HeaderMap<'a>,
    pub body: Vec<u8>,
    pub chunked: bool,
}

impl<'a> Response<'a> {
    pub fn new(status: u16) -> Self {
        Response {
            status,
            reason: reason_phrase(status),
            header_map: HeaderMap::new(),
            body: Vec::new(),
            chunked: false,
        }
    }

    pub fn with_body(status: u16, body: Vec<u8>) -> Self {
        let mut response = Response::new(status);
        response.body = body;
        response
    }

    /// Serialize into a byte buffer: status line, headers, blank line, body.
    ///
    /// `Content-Length` is computed from `body.len()` unless `chunked` is set, in
    /// which case the caller is responsible for having already framed `body` as
    /// chunked octets and for setting `Transfer-Encoding: chunked` in `header_map`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"HTTP/1.1 ");
        out.extend_from_slice(self.status.to_string().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.reason.as_bytes());
        out.extend_from_slice(b"\r\n");

        for (name, value) in self.header_map.iter() {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }

        if !self.chunked && !self.header_map.contains("Content-Length") {
            out.extend_from_slice(b"Content-Length: ");
            out.extend_from_slice(self.body.len().to_string().as_bytes());
            out.extend_from_slice(b"\r\n");
        }

        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
    }
}

/// Reason phrases for the status codes this crate actually emits. Anything else
/// falls back to a generic phrase rather than failing — the status line is still
/// well-formed.
fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        409 => "Conflict",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ if (100..1000).contains(&status) => "Unknown",
        _ => "Unknown",
    }
}
