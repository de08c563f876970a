//! Route table, radix-tree matching, and content negotiation (`spec.md` §4.4, §4.9).

pub mod core;
pub mod negotiate;
pub mod pattern;
pub mod radix;

pub use core::{get_path_param, get_query_param, MatchOutcome, ParamVec, RouteEntry, RouteMatch};
pub use negotiate::{extract_media_type, find_content_type, negotiate_response_type, validate_content_type};
pub use pattern::{PathPattern, Segment};
pub use radix::Router;
