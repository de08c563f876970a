//! Zero-copy HTTP/1.1 request/response types and an incremental parser.
//!
//! Grounded on the original core's `katana::http` namespace
//! (`http.hpp`/`http_headers.hpp`/`http_field.cpp`): a closed `Method` enum, a
//! case-insensitive [`headers::HeaderMap`], and a [`parser::Parser`] state machine
//! that never allocates outside caller-controlled buffers.

pub mod headers;
pub mod method;
pub mod parser;
pub mod request;
pub mod response;

pub use headers::HeaderMap;
pub use method::Method;
pub use parser::{ParseError, Parser, State};
pub use request::Request;
pub use response::Response;

/// URI length cap (RFC 7230 does not mandate a number; this matches `spec.md` §4.2).
pub const MAX_URI_LENGTH: usize = 2 * 1024;
/// Cap on any single header line, name and value combined.
pub const MAX_HEADER_LINE: usize = 8 * 1024;
/// Cap on the number of headers in a single request.
pub const MAX_HEADER_COUNT: usize = 100;
/// Cap on request body size.
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;
