//! The per-connection state machine described in `spec.md` §4.6.

use std::io::{self, Read, Write};
use std::time::Instant;

use crate::arena::Arena;
use crate::config::ReactorConfig;
use crate::http::parser::{ParseError, State as ParseState};
use crate::http::Parser;
use crate::problem::ProblemDetails;
use crate::reactor::timeouts::{ConnectionTimeouts, TimeoutTracker};
use crate::router::{MatchOutcome, Router};
use crate::server::dispatch::{HandlerRegistry, RequestContext};

/// What a connection wants the reactor to watch for next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    WantRead,
    WantWrite,
    Close,
}

/// Owns one accepted connection's read/write buffers, arena, and parser. Does not
/// own the transport itself — `run` is handed a `&mut T` each time it is driven, so
/// the same state machine can be exercised against an in-memory buffer in tests and
/// a real socket in production.
pub struct ConnectionState {
    arena: Arena,
    parser: Parser,
    read_buf: Vec<u8>,
    write_buf: Vec<u8>,
    write_offset: usize,
    tracker: TimeoutTracker,
    limits: ConnectionTimeouts,
    request_count: u64,
    max_requests: u64,
    pending_keep_alive: bool,
}

impl ConnectionState {
    pub fn new(config: &ReactorConfig) -> Self {
        let now = Instant::now();
        ConnectionState {
            arena: Arena::default(),
            parser: Parser::new(),
            read_buf: vec![0u8; config.read_buffer_size.max(1)],
            write_buf: Vec::new(),
            write_offset: 0,
            tracker: TimeoutTracker::new(now),
            limits: ConnectionTimeouts::from_config(config),
            request_count: 0,
            max_requests: config.max_requests_per_connection,
            pending_keep_alive: false,
        }
    }

    pub fn timed_out(&self, now: Instant) -> bool {
        self.tracker.read_idle_expired(&self.limits, now)
            || self.tracker.write_idle_expired(&self.limits, now)
            || self.tracker.lifetime_expired(&self.limits, now)
    }

    /// Step 1: read what is available, feed the parser, and if a request is now
    /// complete, dispatch it and fill the write buffer (steps 2-3). Returns the
    /// event the reactor should watch for next.
    pub fn on_readable<T: Read>(
        &mut self,
        transport: &mut T,
        router: &Router,
        registry: &HandlerRegistry,
    ) -> io::Result<ConnectionEvent> {
        let n = transport.read(&mut self.read_buf)?;
        self.tracker.record_read(Instant::now());
        if n == 0 {
            return Ok(ConnectionEvent::Close);
        }

        match self.parser.parse(&self.read_buf[..n]) {
            Ok(ParseState::Complete) => {
                self.dispatch(router, registry);
                Ok(ConnectionEvent::WantWrite)
            }
            Ok(_) => Ok(ConnectionEvent::WantRead),
            Err(err) => {
                self.write_parse_error(err);
                Ok(ConnectionEvent::WantWrite)
            }
        }
    }

    /// Step 2: build the response for a completed request and serialize it.
    fn dispatch(&mut self, router: &Router, registry: &HandlerRegistry) {
        let Some(request) = self.parser.request(&self.arena) else {
            self.write_problem(ProblemDetails::internal_server_error(
                "parser reported completion without a request",
            ));
            return;
        };

        let keep_alive = self.should_keep_alive(&request);

        match router.route(request.method, request.path()) {
            MatchOutcome::Matched(route_match) => match registry.get(&route_match.route.handler_name) {
                Some(handler) => {
                    let ctx = RequestContext {
                        request,
                        params: route_match.params,
                        arena: &self.arena,
                    };
                    let response = handler.call(&ctx);
                    response.write_to(&mut self.write_buf);
                }
                None => self.write_problem(ProblemDetails::internal_server_error(
                    "no handler registered for matched route",
                )),
            },
            MatchOutcome::MethodNotAllowed => {
                self.write_problem(ProblemDetails::method_not_allowed("method not allowed for this path"))
            }
            MatchOutcome::NotFound => {
                self.write_problem(ProblemDetails::not_found("no route matches this path"))
            }
        }

        self.request_count += 1;
        self.pending_keep_alive = keep_alive && self.request_count < self.max_requests;
    }

    fn should_keep_alive(&self, request: &crate::http::Request<'_>) -> bool {
        if let Some(connection) = request.header_map.get("Connection") {
            if connection.eq_ignore_ascii_case("close") {
                return false;
            }
            if connection.eq_ignore_ascii_case("keep-alive") {
                return true;
            }
        }
        // HTTP/1.0 defaults to close unless keep-alive was requested explicitly above;
        // HTTP/1.1 defaults to keep-alive (`spec.md` §4.6 rule 4).
        request.version != "HTTP/1.0"
    }

    fn write_parse_error(&mut self, err: ParseError) {
        self.write_problem(ProblemDetails::bad_request(&err.to_string()));
        self.pending_keep_alive = false;
    }

    fn write_problem(&mut self, problem: ProblemDetails) {
        let response = problem.into_response(&self.arena);
        response.write_to(&mut self.write_buf);
    }

    /// Step 3: drain whatever of the write buffer the transport will accept.
    ///
    /// On a keep-alive connection, `reset_per_request_state` preserves any bytes
    /// already read past the request just answered (`spec.md` §4.6's pipelining
    /// rule): a second request sitting in that leftover tail is parsed and
    /// dispatched immediately rather than waiting on a future `on_readable`, since
    /// a client that already sent it may not send anything further until it gets
    /// a response.
    pub fn on_writable<T: Write>(
        &mut self,
        transport: &mut T,
        router: &Router,
        registry: &HandlerRegistry,
    ) -> io::Result<ConnectionEvent> {
        while self.write_offset < self.write_buf.len() {
            match transport.write(&self.write_buf[self.write_offset..]) {
                Ok(0) => return Ok(ConnectionEvent::Close),
                Ok(n) => {
                    self.write_offset += n;
                    self.tracker.record_write(Instant::now());
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    return Ok(ConnectionEvent::WantWrite);
                }
                Err(e) => return Err(e),
            }
        }

        let keep_alive = self.pending_keep_alive;
        self.reset_per_request_state();
        if !keep_alive {
            return Ok(ConnectionEvent::Close);
        }

        match self.parser.parse(&[]) {
            Ok(ParseState::Complete) => {
                self.dispatch(router, registry);
                Ok(ConnectionEvent::WantWrite)
            }
            Ok(_) => Ok(ConnectionEvent::WantRead),
            Err(err) => {
                self.write_parse_error(err);
                Ok(ConnectionEvent::WantWrite)
            }
        }
    }

    /// Step 5: `parser.reset()`, `arena.reset()`, header map cleared (the header map
    /// lives inside the parser's captured headers, which `parser.reset()` clears).
    fn reset_per_request_state(&mut self) {
        self.parser.reset();
        self.write_buf.clear();
        self.write_offset = 0;
        self.arena.reset();
    }
}
