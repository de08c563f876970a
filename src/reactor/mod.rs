//! Reactor / worker pool (`spec.md` §4.5).
//!
//! Grounded on BRRTRouter's `worker_pool.rs`: a bounded `may::sync::mpsc` channel
//! feeding coroutines, with atomic counters for load accounting and `tracing` spans
//! around lifecycle events. BRRTRouter pools coroutines per *handler*; here the
//! pool is per *reactor worker*, and what travels the channel is an accepted
//! connection rather than a parsed request.

pub mod pool;
pub mod timeouts;

pub use pool::ReactorPool;
pub use timeouts::ConnectionTimeouts;
