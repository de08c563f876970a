//! The seam between the router and generated handler code (`spec.md` §4.8.6's
//! glue closures). Grounded on BRRTRouter's `Dispatcher`
//! (`handler_name -> HandlerSender` map) — reworked from a channel-per-handler
//! design to a direct synchronous call, since `spec.md` §4.5 states that handlers
//! run synchronously on the reactor worker thread rather than being queued to a
//! separate pool.

use std::sync::Arc;

use dashmap::DashMap;

use crate::arena::Arena;
use crate::http::{Request, Response};
use crate::router::ParamVec;

/// Everything a glue closure needs: the parsed request, its matched path
/// parameters, and the arena both were allocated from (and in which the response
/// should be built).
pub struct RequestContext<'a> {
    pub request: Request<'a>,
    pub params: ParamVec<'a>,
    pub arena: &'a Arena,
}

/// One generated operation's glue closure: negotiate, extract, validate, invoke,
/// default `Content-Type` — the six steps of `spec.md` §4.8.6, collapsed into a
/// single call from the runtime's point of view.
pub trait GlueHandler: Send + Sync {
    fn call<'a>(&self, ctx: &RequestContext<'a>) -> Response<'a>;
}

impl<F> GlueHandler for F
where
    F: for<'a> Fn(&RequestContext<'a>) -> Response<'a> + Send + Sync,
{
    fn call<'a>(&self, ctx: &RequestContext<'a>) -> Response<'a> {
        self(ctx)
    }
}

/// `handler_name -> GlueHandler` registry populated by generated code at startup.
/// Read-mostly after startup, so a concurrent map costs nothing on the hot path and
/// avoids a `RwLock` around a `HashMap` that every request would contend on.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: Arc<DashMap<String, Arc<dyn GlueHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        HandlerRegistry::default()
    }

    pub fn register(&self, handler_name: impl Into<String>, handler: Arc<dyn GlueHandler>) {
        self.handlers.insert(handler_name.into(), handler);
    }

    pub fn get(&self, handler_name: &str) -> Option<Arc<dyn GlueHandler>> {
        self.handlers.get(handler_name).map(|entry| entry.clone())
    }
}
