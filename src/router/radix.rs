//! Radix-tree path matcher (`spec.md` §4.4), grounded on BRRTRouter's
//! `router/radix.rs`: literal segments are children keyed by exact string, `{name}`
//! segments are a separate bucket of parameter children tried only once every
//! literal child has failed to match — this is how literal-over-capture
//! tie-breaking falls out of the search order rather than needing an explicit
//! priority field.

use std::collections::HashMap;

use crate::http::Method;
use crate::router::core::{MatchOutcome, ParamVec, RouteEntry, RouteMatch};
use crate::router::pattern::Segment;

struct Node {
    literal_children: HashMap<String, Node>,
    param_children: Vec<(String, Node)>,
    routes: HashMap<Method, usize>,
}

impl Node {
    fn empty() -> Self {
        Node {
            literal_children: HashMap::new(),
            param_children: Vec::new(),
            routes: HashMap::new(),
        }
    }

    fn insert(&mut self, segments: &[Segment], method: Method, route_index: usize) {
        match segments.split_first() {
            None => {
                self.routes.insert(method, route_index);
            }
            Some((Segment::Literal(lit), rest)) => {
                self.literal_children
                    .entry(lit.clone())
                    .or_insert_with(Node::empty)
                    .insert(rest, method, route_index);
            }
            Some((Segment::Capture(name), rest)) => {
                if let Some((_, child)) = self.param_children.iter_mut().find(|(n, _)| n == name) {
                    child.insert(rest, method, route_index);
                } else {
                    let mut child = Node::empty();
                    child.insert(rest, method, route_index);
                    self.param_children.push((name.clone(), child));
                }
            }
        }
    }

    /// Try every literal child first, then every parameter child, recording
    /// captures as we descend and popping them on backtrack.
    fn search<'p>(
        &self,
        path_segments: &[&'p str],
        method: Method,
        params: &mut ParamVec<'p>,
    ) -> SearchResult {
        match path_segments.split_first() {
            None => {
                if let Some(&idx) = self.routes.get(&method) {
                    SearchResult::Matched(idx)
                } else if !self.routes.is_empty() {
                    SearchResult::PathOnly
                } else {
                    SearchResult::NoMatch
                }
            }
            Some((head, rest)) => {
                if let Some(child) = self.literal_children.get(*head) {
                    match child.search(rest, method, params) {
                        SearchResult::NoMatch => {}
                        other => return other,
                    }
                }
                for (name, child) in &self.param_children {
                    params.push((name.as_str(), *head));
                    match child.search(rest, method, params) {
                        SearchResult::NoMatch => {
                            params.pop();
                        }
                        other => return other,
                    }
                }
                SearchResult::NoMatch
            }
        }
    }
}

enum SearchResult {
    Matched(usize),
    PathOnly,
    NoMatch,
}

/// Radix-tree router: O(path length) lookup grouped by method, built once from
/// a fixed route table (`spec.md` §4.4).
pub struct Router {
    root: Node,
    routes: Vec<RouteEntry>,
}

impl Router {
    pub fn new(routes: Vec<RouteEntry>) -> Self {
        let mut root = Node::empty();
        for (idx, route) in routes.iter().enumerate() {
            root.insert(route.pattern.segments(), route.method, idx);
        }
        Router { root, routes }
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Match `method`/`path` against the route table. `path` must already have
    /// its query string stripped (`Request::path`). Percent-decoding of captured
    /// segments is not performed (`spec.md` §4.4).
    pub fn route<'router, 'p>(&'router self, method: Method, path: &'p str) -> MatchOutcome<'router, 'p> {
        let trimmed = path.trim_start_matches('/');
        let segments: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        let mut params: ParamVec<'p> = ParamVec::new();
        match self.root.search(&segments, method, &mut params) {
            SearchResult::Matched(idx) => MatchOutcome::Matched(RouteMatch {
                route: &self.routes[idx],
                params,
            }),
            SearchResult::PathOnly => MatchOutcome::MethodNotAllowed,
            SearchResult::NoMatch => MatchOutcome::NotFound,
        }
    }
}
