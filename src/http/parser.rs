//! Incremental HTTP/1.1 request parser (`spec.md` §4.2).
//!
//! Grounded on the original core's `http.hpp` parser state machine and size limits.
//! `Parser` itself holds no arena reference: the request line, header names/values,
//! and body are accumulated into plain owned buffers as they are recognized, and are
//! only copied into a caller-supplied [`Arena`] once, at [`request`](Parser::request)
//! time. This keeps `Parser` free of any borrowed lifetime, which matters once it is
//! embedded alongside the very `Arena` it will eventually borrow from (`spec.md`
//! §4.6's connection owns both) — a struct cannot safely own a value and a reference
//! into that same value, so the arena copy has to happen at the boundary instead of
//! incrementally during parsing.

use thiserror::Error;

use crate::arena::Arena;
use crate::http::headers::{ci_equal, HeaderMap};
use crate::http::method::Method;
use crate::http::request::Request;
use crate::http::{MAX_BODY_SIZE, MAX_HEADER_COUNT, MAX_HEADER_LINE, MAX_URI_LENGTH};

/// Parser progress, matching `spec.md` §3.1's enumerated parser state. Progression is
/// monotonic except for the `ChunkSize <-> ChunkData` cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    RequestLine,
    Headers,
    Body,
    ChunkSize,
    ChunkData,
    ChunkTrailer,
    Complete,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("request URI exceeds the maximum length")]
    UriTooLong,
    #[error("header line exceeds the maximum length")]
    HeaderLineTooLong,
    #[error("too many headers")]
    TooManyHeaders,
    #[error("body exceeds the maximum size")]
    BodyTooLarge,
    #[error("malformed request line")]
    MalformedRequestLine,
    #[error("malformed header line")]
    MalformedHeader,
    #[error("obs-fold continuation without a preceding header")]
    DanglingFold,
    #[error("invalid Content-Length value")]
    InvalidContentLength,
    #[error("invalid chunked transfer-encoding framing")]
    InvalidChunkEncoding,
    #[error("arena exhausted while materializing request data")]
    ArenaExhausted,
}

/// A header as captured during parsing: the name never requires folding, but the
/// value may have been extended by one or more obs-fold continuation lines.
#[derive(Debug, Clone)]
struct RawHeader {
    name: String,
    value: String,
}

/// Threshold (as a fraction, expressed in eighths) of the buffer that must be
/// already-consumed before a compaction pass runs.
const COMPACT_THRESHOLD_NUM: usize = 3;
const COMPACT_THRESHOLD_DEN: usize = 4;

pub struct Parser {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already consumed by request-line/header parsing.
    cursor: usize,
    state: State,

    method: Method,
    uri: Option<String>,
    version: Option<String>,
    headers: Vec<RawHeader>,

    content_length: Option<usize>,
    chunked: bool,
    /// Offset into `buffer` where the body begins, once known (Content-Length path).
    body_start: usize,
    body_buf: Vec<u8>,
    chunk_remaining: usize,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            buffer: Vec::new(),
            cursor: 0,
            state: State::RequestLine,
            method: Method::Unknown,
            uri: None,
            version: None,
            headers: Vec::new(),
            content_length: None,
            chunked: false,
            body_start: 0,
            body_buf: Vec::new(),
            chunk_remaining: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    /// Feed additional bytes and drive the state machine as far as possible.
    /// Returns the resulting state; `Ok(State::Complete)` means [`request`](Self::request)
    /// is now available.
    pub fn parse(&mut self, bytes: &[u8]) -> Result<State, ParseError> {
        self.buffer.extend_from_slice(bytes);

        loop {
            let progressed = match self.state {
                State::RequestLine => self.step_request_line()?,
                State::Headers => self.step_headers()?,
                State::Body => self.step_body()?,
                State::ChunkSize => self.step_chunk_size()?,
                State::ChunkData => self.step_chunk_data()?,
                State::ChunkTrailer => self.step_chunk_trailer()?,
                State::Complete => false,
            };
            if !progressed {
                break;
            }
            if self.state == State::Complete {
                break;
            }
        }

        self.maybe_compact();
        Ok(self.state)
    }

    /// Materialize the completed request into `arena`. `None` until
    /// `state() == State::Complete`. Every field of the returned [`Request`] borrows
    /// from `arena`, not from `self`, so it may safely outlive a subsequent call to
    /// [`reset`](Self::reset) on this parser — though doing so would simply reuse the
    /// arena's own backing blocks while the borrow checker still holds the arena
    /// borrowed, so in practice callers read the request before resetting either.
    pub fn request<'a>(&self, arena: &'a Arena) -> Option<Request<'a>> {
        if self.state != State::Complete {
            return None;
        }
        let uri = arena.alloc_str(self.uri.as_deref()?)?;
        let version = arena.alloc_str(self.version.as_deref()?)?;
        let mut header_map = HeaderMap::new();
        for header in &self.headers {
            let name = arena.alloc_str(&header.name)?;
            let value = arena.alloc_str(&header.value)?;
            header_map.insert(name, value);
        }
        let body = arena.alloc_bytes(&self.body_buf)?;
        Some(Request {
            method: self.method,
            uri,
            version,
            header_map,
            body,
        })
    }

    /// Return to `State::RequestLine`, discarding parsed state for the request that
    /// just completed. Bytes from `self.cursor` onward belong to whatever comes
    /// next on the connection — a pipelined request already sitting in the same
    /// read buffer — and are kept rather than discarded.
    /// The arena used by a prior [`request`](Self::request) call is not touched
    /// here; callers reset it separately once they are done with that borrow.
    pub fn reset(&mut self) {
        self.buffer.drain(..self.cursor);
        self.cursor = 0;
        self.state = State::RequestLine;
        self.method = Method::Unknown;
        self.uri = None;
        self.version = None;
        self.headers.clear();
        self.content_length = None;
        self.chunked = false;
        self.body_start = 0;
        self.body_buf.clear();
        self.chunk_remaining = 0;
    }

    /// Find the next CRLF-terminated line starting at `from`. A bare `\n` without a
    /// preceding `\r` is a protocol violation, not a lenient line ending.
    fn find_line(&self, from: usize) -> Result<Option<usize>, ParseError> {
        let haystack = &self.buffer[from..];
        match haystack.iter().position(|&b| b == b'\n') {
            None => Ok(None),
            Some(rel) => {
                let abs = from + rel;
                if abs == from || self.buffer[abs - 1] != b'\r' {
                    return Err(ParseError::MalformedRequestLine);
                }
                Ok(Some(abs - 1))
            }
        }
    }

    fn step_request_line(&mut self) -> Result<bool, ParseError> {
        let Some(line_end) = self.find_line(self.cursor)? else {
            if self.buffer.len() - self.cursor > MAX_URI_LENGTH + 32 {
                return Err(ParseError::UriTooLong);
            }
            return Ok(false);
        };
        let line = &self.buffer[self.cursor..line_end];
        if line.contains(&0) {
            return Err(ParseError::MalformedRequestLine);
        }
        let text = std::str::from_utf8(line).map_err(|_| ParseError::MalformedRequestLine)?;
        if text.starts_with(' ') || text.starts_with('\t') {
            return Err(ParseError::MalformedRequestLine);
        }

        let mut parts = text.splitn(3, ' ');
        let method_tok = parts.next().ok_or(ParseError::MalformedRequestLine)?;
        let uri_tok = parts.next().ok_or(ParseError::MalformedRequestLine)?;
        let version_tok = parts.next().ok_or(ParseError::MalformedRequestLine)?;

        if method_tok.is_empty() || uri_tok.is_empty() || version_tok.is_empty() {
            return Err(ParseError::MalformedRequestLine);
        }
        if method_tok.contains('\t') || uri_tok.contains('\t') || version_tok.contains(' ') {
            return Err(ParseError::MalformedRequestLine);
        }
        if uri_tok.len() > MAX_URI_LENGTH {
            return Err(ParseError::UriTooLong);
        }

        self.method = Method::parse(method_tok);
        self.uri = Some(uri_tok.to_string());
        self.version = Some(version_tok.to_string());
        self.cursor = line_end + 2;
        self.state = State::Headers;
        Ok(true)
    }

    fn step_headers(&mut self) -> Result<bool, ParseError> {
        let Some(line_end) = self.find_line(self.cursor)? else {
            if self.buffer.len() - self.cursor > MAX_HEADER_LINE {
                return Err(ParseError::HeaderLineTooLong);
            }
            return Ok(false);
        };
        let line = &self.buffer[self.cursor..line_end];

        if line.is_empty() {
            self.cursor = line_end + 2;
            self.body_start = self.cursor;
            self.finish_headers()?;
            return Ok(true);
        }
        if line.len() > MAX_HEADER_LINE {
            return Err(ParseError::HeaderLineTooLong);
        }
        let text = std::str::from_utf8(line).map_err(|_| ParseError::MalformedHeader)?;

        if text.starts_with(' ') || text.starts_with('\t') {
            let continuation = text.trim_matches(|c| c == ' ' || c == '\t');
            let Some(last) = self.headers.last_mut() else {
                return Err(ParseError::DanglingFold);
            };
            last.value.push(' ');
            last.value.push_str(continuation);
            self.cursor = line_end + 2;
            return Ok(true);
        }

        let colon = text.find(':').ok_or(ParseError::MalformedHeader)?;
        let name = &text[..colon];
        if name.is_empty() || name.contains(' ') || name.contains('\t') {
            return Err(ParseError::MalformedHeader);
        }
        let value = text[colon + 1..].trim_matches(|c| c == ' ' || c == '\t');

        if self.headers.len() >= MAX_HEADER_COUNT {
            return Err(ParseError::TooManyHeaders);
        }
        self.headers.push(RawHeader {
            name: name.to_string(),
            value: value.to_string(),
        });

        self.cursor = line_end + 2;
        Ok(true)
    }

    /// Find the first value for `name`, case-insensitively, among headers captured so far.
    fn find_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| ci_equal(&h.name, name))
            .map(|h| h.value.as_str())
    }

    fn finish_headers(&mut self) -> Result<(), ParseError> {
        if let Some(raw) = self.find_header("Content-Length") {
            let valid_digits = !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit());
            if !valid_digits {
                return Err(ParseError::InvalidContentLength);
            }
            let len: usize = raw.parse().map_err(|_| ParseError::InvalidContentLength)?;
            if len > MAX_BODY_SIZE {
                return Err(ParseError::BodyTooLarge);
            }
            self.content_length = Some(len);
            self.state = State::Body;
            return Ok(());
        }

        if let Some(te) = self.find_header("Transfer-Encoding") {
            if te.eq_ignore_ascii_case("chunked") {
                self.chunked = true;
                self.state = State::ChunkSize;
                return Ok(());
            }
        }

        self.state = State::Complete;
        Ok(())
    }

    fn step_body(&mut self) -> Result<bool, ParseError> {
        let needed = self.content_length.unwrap_or(0);
        if self.buffer.len() - self.body_start < needed {
            return Ok(false);
        }
        self.body_buf
            .extend_from_slice(&self.buffer[self.body_start..self.body_start + needed]);
        self.cursor = self.body_start + needed;
        self.state = State::Complete;
        Ok(true)
    }

    fn step_chunk_size(&mut self) -> Result<bool, ParseError> {
        let Some(line_end) = self.find_line(self.cursor)? else {
            if self.buffer.len() - self.cursor > MAX_HEADER_LINE {
                return Err(ParseError::InvalidChunkEncoding);
            }
            return Ok(false);
        };
        let line = &self.buffer[self.cursor..line_end];
        let text = std::str::from_utf8(line).map_err(|_| ParseError::InvalidChunkEncoding)?;
        let size_tok = text.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_tok, 16).map_err(|_| ParseError::InvalidChunkEncoding)?;

        if self.body_buf.len() + size > MAX_BODY_SIZE {
            return Err(ParseError::BodyTooLarge);
        }

        self.cursor = line_end + 2;
        if size == 0 {
            self.state = State::ChunkTrailer;
        } else {
            self.chunk_remaining = size;
            self.state = State::ChunkData;
        }
        Ok(true)
    }

    fn step_chunk_data(&mut self) -> Result<bool, ParseError> {
        let needed = self.chunk_remaining + 2; // chunk octets + trailing CRLF
        if self.buffer.len() - self.cursor < needed {
            return Ok(false);
        }
        let data_end = self.cursor + self.chunk_remaining;
        if &self.buffer[data_end..data_end + 2] != b"\r\n" {
            return Err(ParseError::InvalidChunkEncoding);
        }
        self.body_buf.extend_from_slice(&self.buffer[self.cursor..data_end]);
        self.cursor = data_end + 2;
        self.chunk_remaining = 0;
        self.state = State::ChunkSize;
        Ok(true)
    }

    fn step_chunk_trailer(&mut self) -> Result<bool, ParseError> {
        let Some(line_end) = self.find_line(self.cursor)? else {
            return Ok(false);
        };
        let line = &self.buffer[self.cursor..line_end];
        self.cursor = line_end + 2;
        if line.is_empty() {
            self.state = State::Complete;
        }
        // Trailer headers, if any, are accepted and discarded: spec.md §4.2 does not
        // require surfacing them on the completed request.
        Ok(true)
    }

    /// Drop already-consumed prefix bytes once the cursor has eaten most of the
    /// buffer, per `spec.md` §4.2's compaction rule.
    fn maybe_compact(&mut self) {
        if self.cursor == 0 {
            return;
        }
        if self.cursor * COMPACT_THRESHOLD_DEN < self.buffer.len() * COMPACT_THRESHOLD_NUM {
            return;
        }
        self.buffer.drain(0..self.cursor);
        self.body_start = self.body_start.saturating_sub(self.cursor);
        self.cursor = 0;
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &[u8]) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser.parse(input)?;
        Ok(parser)
    }

    #[test]
    fn parses_simple_get() {
        let arena = Arena::default();
        let parser = parse_all(b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();
        assert!(parser.is_complete());
        let req = parser.request(&arena).unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.uri, "/hello");
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(req.header_map.get("host"), Some("example.com"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn parses_body_with_content_length() {
        let arena = Arena::default();
        let input = b"POST /items HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let parser = parse_all(input).unwrap();
        assert!(parser.is_complete());
        assert_eq!(parser.request(&arena).unwrap().body, b"hello");
    }

    #[test]
    fn incremental_feed_matches_batched() {
        let arena_a = Arena::default();
        let arena_b = Arena::default();
        let whole: &[u8] = b"GET /a HTTP/1.1\r\nHost: x\r\nX-Foo: bar\r\n\r\n";

        let mut batched = Parser::new();
        batched.parse(whole).unwrap();

        let mut incremental = Parser::new();
        for byte in whole {
            incremental.parse(std::slice::from_ref(byte)).unwrap();
        }

        assert_eq!(batched.state(), incremental.state());
        let a = batched.request(&arena_a).unwrap();
        let b = incremental.request(&arena_b).unwrap();
        assert_eq!(a.method, b.method);
        assert_eq!(a.uri, b.uri);
        assert_eq!(a.header_map.get("x-foo"), b.header_map.get("x-foo"));
    }

    #[test]
    fn obs_fold_continuation_joins_with_space() {
        let arena = Arena::default();
        let input = b"GET / HTTP/1.1\r\nSubject: first\r\n second\r\n\r\n";
        let parser = parse_all(input).unwrap();
        assert_eq!(
            parser.request(&arena).unwrap().header_map.get("subject"),
            Some("first second")
        );
    }

    #[test]
    fn dangling_fold_is_an_error() {
        let input = b"GET / HTTP/1.1\r\n second\r\n\r\n";
        assert_eq!(parse_all(input).unwrap_err(), ParseError::DanglingFold);
    }

    #[test]
    fn rejects_nul_byte_in_uri() {
        let input = b"GET /a\0b HTTP/1.1\r\n\r\n".to_vec();
        assert_eq!(parse_all(&input).unwrap_err(), ParseError::MalformedRequestLine);
    }

    #[test]
    fn rejects_leading_whitespace_in_request_line() {
        let input = b" GET / HTTP/1.1\r\n\r\n";
        assert_eq!(parse_all(input).unwrap_err(), ParseError::MalformedRequestLine);
    }

    #[test]
    fn rejects_bare_lf_line_ending() {
        let input = b"GET / HTTP/1.1\nHost: x\r\n\r\n";
        assert_eq!(parse_all(input).unwrap_err(), ParseError::MalformedRequestLine);
    }

    #[test]
    fn rejects_uri_over_limit() {
        let long_uri = "/".to_string() + &"a".repeat(MAX_URI_LENGTH + 1);
        let input = format!("GET {long_uri} HTTP/1.1\r\n\r\n");
        assert_eq!(parse_all(input.as_bytes()).unwrap_err(), ParseError::UriTooLong);
    }

    #[test]
    fn rejects_content_length_with_leading_plus() {
        let input = b"POST / HTTP/1.1\r\nContent-Length: +5\r\n\r\nhello";
        assert_eq!(parse_all(input).unwrap_err(), ParseError::InvalidContentLength);
    }

    #[test]
    fn decodes_chunked_body() {
        let arena = Arena::default();
        let input = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";
        let parser = parse_all(input).unwrap();
        assert!(parser.is_complete());
        assert_eq!(parser.request(&arena).unwrap().body, b"Wikipedia");
    }

    #[test]
    fn chunk_missing_trailing_crlf_is_an_error() {
        let input = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWikiXX0\r\n\r\n";
        assert_eq!(parse_all(input).unwrap_err(), ParseError::InvalidChunkEncoding);
    }

    #[test]
    fn reset_returns_to_request_line() {
        let arena = Arena::default();
        let mut parser = Parser::new();
        parser.parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert!(parser.is_complete());
        parser.reset();
        assert_eq!(parser.state(), State::RequestLine);
        assert!(parser.request(&arena).is_none());
    }

    #[test]
    fn too_many_headers_is_rejected() {
        let mut input = String::from("GET / HTTP/1.1\r\n");
        for i in 0..(MAX_HEADER_COUNT + 1) {
            input.push_str(&format!("X-H{i}: v\r\n"));
        }
        input.push_str("\r\n");
        assert_eq!(parse_all(input.as_bytes()).unwrap_err(), ParseError::TooManyHeaders);
    }
}
