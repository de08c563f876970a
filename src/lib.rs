//! # katana
//!
//! **katana** is an OpenAPI-driven HTTP service framework: a per-request bump
//! allocator, a zero-copy HTTP/1.1 parser, a radix-style router with content
//! negotiation, a reactor-per-core connection model built on `may` coroutines, and
//! a code generator that turns an OpenAPI 3.x document into routing tables,
//! request/response types, and validators.
//!
//! ## Architecture
//!
//! - **[`arena`]** — per-request bump allocator; owns variable-length strings and
//!   vectors for the lifetime of one request.
//! - **[`http`]** — `Method`, `HeaderMap`, `Request`/`Response`, and the incremental
//!   `Parser` state machine.
//! - **[`router`]** — radix-tree path matching, method dispatch, and content
//!   negotiation (`Accept`/`Content-Type`).
//! - **[`reactor`]** — the per-core event loop pool that owns connections and their
//!   arenas; suspension happens only at I/O readiness, timers, and cross-thread
//!   wakeups.
//! - **[`server`]** — the per-connection state machine driven by the reactor.
//! - **[`spec`]** — the OpenAPI 3.x AST, loader (`$ref` resolution, `allOf` merge),
//!   and the naming pass that assigns identifiers to anonymous schemas.
//! - **[`generator`]** — Askama-templated code emission: entities, codec,
//!   validator, routes, handlers, and glue.
//! - **[`problem`]** — RFC 7807 Problem Details responses.
//! - **[`validation`]** — the shared validation error vocabulary used by both
//!   generated validators and runtime JSON parsing.
//! - **[`config`]** — `ReactorConfig`/`ServerConfig`, plain `serde` structs with
//!   documented defaults; never read from the process environment by the library.
//! - **[`shutdown`]** — the graceful-shutdown coordinator, wired to `SIGINT`/`SIGTERM`
//!   on unix via `signal-hook`.
//! - **[`ids`]** — `ulid`-based request identifiers used for tracing spans.
//!
//! ## Runtime considerations
//!
//! katana uses the `may` coroutine runtime, not tokio or async-std: handlers are
//! synchronous from their own perspective, and suspension points are explicit
//! (I/O readiness, timers, cross-thread wakeup) rather than implicit `.await`
//! points. Each reactor worker owns its connections and arenas; there is no shared
//! mutable state on the hot path.

pub mod arena;
pub mod config;
pub mod generator;
pub mod http;
pub mod ids;
pub mod problem;
pub mod reactor;
pub mod router;
pub mod server;
pub mod shutdown;
pub mod spec;
pub mod validation;

pub use arena::Arena;
pub use config::{ReactorConfig, ServerConfig};
pub use http::{HeaderMap, Method, Request, Response};
pub use ids::RequestId;
pub use problem::ProblemDetails;
pub use reactor::{ConnectionTimeouts, ReactorPool};
pub use router::Router;
pub use server::{ConnectionEvent, ConnectionState, GlueHandler, HandlerRegistry};
pub use shutdown::ShutdownCoordinator;
pub use spec::Document as SpecDocument;
pub use validation::{ValidationError, ValidationErrorCode};
