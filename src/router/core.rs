//! Route entries and the small ordered param mapping handed to each handler
//! invocation (`spec.md` §3.1 "Route entry" / "Request context").

use smallvec::SmallVec;

use crate::http::Method;
use crate::router::pattern::PathPattern;

/// Stack-allocated path-parameter mapping: most routes capture only a handful of
/// segments, so the common case never touches the heap.
pub type ParamVec<'a> = SmallVec<[(&'a str, &'a str); 8]>;

/// Look up a path parameter by name. Per the original radix search's documented
/// behavior, if a name occurs more than once the last occurrence wins.
pub fn get_path_param<'a>(params: &ParamVec<'a>, name: &str) -> Option<&'a str> {
    params.iter().rev().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

/// Look up a query parameter by name in a raw (undecoded) query string. Generated
/// glue calls this for `in: query` parameters; percent-decoding is intentionally
/// not performed here, matching the arena parser's treatment of the rest of the
/// request line as opaque bytes until a handler needs otherwise.
pub fn get_query_param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    let query = query?;
    query.split('&').find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?;
        if key == name {
            Some(parts.next().unwrap_or(""))
        } else {
            None
        }
    })
}

/// `{method, path_pattern, handler_callable, consumes_list, produces_list}` from
/// `spec.md` §3.1. `handler_name` stands in for the handler callable itself: the
/// generator resolves it to a concrete trait method (§4.8); the router only needs
/// a stable key to carry through to dispatch.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub method: Method,
    pub pattern: PathPattern,
    pub handler_name: String,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
}

impl RouteEntry {
    pub fn new(method: Method, template: &str, handler_name: impl Into<String>) -> Self {
        RouteEntry {
            method,
            pattern: PathPattern::from_literal(template),
            handler_name: handler_name.into(),
            consumes: Vec::new(),
            produces: Vec::new(),
        }
    }

    pub fn consumes(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.consumes = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn produces(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.produces = types.into_iter().map(Into::into).collect();
        self
    }
}

/// A successful match: the route and the path parameters captured along the way.
#[derive(Debug, Clone)]
pub struct RouteMatch<'router, 'path> {
    pub route: &'router RouteEntry,
    pub params: ParamVec<'path>,
}

/// Outcome of a route lookup, distinguishing "no path matched" from "the path
/// matched but not for this method" (`spec.md` §4.4 rule 3).
#[derive(Debug, Clone)]
pub enum MatchOutcome<'router, 'path> {
    Matched(RouteMatch<'router, 'path>),
    MethodNotAllowed,
    NotFound,
}
