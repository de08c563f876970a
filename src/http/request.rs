//! The runtime request entity (`spec.md` §3.1).

use super::headers::HeaderMap;
use super::method::Method;

/// A fully parsed HTTP request.
///
/// Every field borrows from the [`Arena`](crate::arena::Arena) passed to
/// [`Parser::request`](super::parser::Parser::request); none of it borrows from the
/// parser itself, so a request outlives the parser buffer that produced it (though
/// not the arena, which a connection resets only after dispatch has finished reading
/// this value).
#[derive(Debug, Clone)]
pub struct Request<'a> {
    pub method: Method,
    pub uri: &'a str,
    pub version: &'a str,
    pub header_map: HeaderMap<'a>,
    pub body: &'a [u8],
}

impl<'a> Request<'a> {
    /// The path component of `uri`, with any query string stripped.
    pub fn path(&self) -> &'a str {
        match self.uri.find('?') {
            Some(idx) => &self.uri[..idx],
            None => self.uri,
        }
    }

    /// The raw query string, without the leading `?`, if present.
    pub fn query(&self) -> Option<&'a str> {
        self.uri.find('?').map(|idx| &self.uri[idx + 1..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn path_strips_query_string() {
        let arena = Arena::default();
        let req = Request {
            method: Method::Get,
            uri: arena.alloc_str("/users/42?verbose=true").unwrap(),
            version: "HTTP/1.1",
            header_map: HeaderMap::new(),
            body: &[],
        };
        assert_eq!(req.path(), "/users/42");
        assert_eq!(req.query(), Some("verbose=true"));
    }

    #[test]
    fn query_is_none_without_question_mark() {
        let arena = Arena::default();
        let req = Request {
            method: Method::Get,
            uri: arena.alloc_str("/health").unwrap(),
            version: "HTTP/1.1",
            header_map: HeaderMap::new(),
            body: &[],
        };
        assert_eq!(req.query(), None);
    }
}
