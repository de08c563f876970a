//! Per-connection state machine (`spec.md` §4.6), driven by the reactor.
//!
//! `ConnectionState` is generic over its transport (`std::io::Read + std::io::Write`)
//! rather than hard-coded to a socket type, mirroring BRRTRouter's preference for
//! testing handler logic against in-memory buffers before wiring real I/O
//! (`dispatcher_tests.rs`, `static_server_tests.rs`). In production the transport is
//! a `may::net::TcpStream`: `may` parks the coroutine at the underlying blocking
//! read/write syscall and resumes it on readiness, so the suspension points
//! `spec.md` §4.5 calls out fall directly out of writing ordinary blocking-looking
//! code against that socket type — no explicit polling is needed here.

pub mod connection;
pub mod dispatch;

pub use connection::{ConnectionEvent, ConnectionState};
pub use dispatch::{GlueHandler, HandlerRegistry, RequestContext};
