//! Case-insensitive, arena-backed header storage.
//!
//! Grounded on the original core's `http_field.cpp`: a small interned enumeration of
//! "popular" header names gets a dedicated fast path (`PopularHeader`), while arbitrary
//! header names fall back to a linear scan over a `SmallVec`. Iteration order is not part
//! of the contract (`spec.md` §4.3); insertion order is preserved only incidentally.
//!
//! Names and values are `&'a str` slices borrowed from an [`Arena`](crate::arena::Arena)
//! (`spec.md` §3.1: "`header_map` is arena-backed"); callers materialize strings into the
//! arena (via [`Arena::alloc_str`](crate::arena::Arena::alloc_str)) before inserting them.

use smallvec::SmallVec;

use crate::arena::Arena;

/// Interned "popular" header names, matching the fast-path subset of the original core's
/// `popular_headers` table (the full 367-name table there backs a generic hash; here the
/// long tail is just a string compare, which is the whole point of calling it a fast path
/// rather than a closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopularHeader {
    Host,
    UserAgent,
    Accept,
    AcceptEncoding,
    AcceptLanguage,
    ContentType,
    ContentLength,
    Connection,
    CacheControl,
    Cookie,
    Authorization,
    TransferEncoding,
    SetCookie,
}

impl PopularHeader {
    pub fn canonical_name(self) -> &'static str {
        match self {
            PopularHeader::Host => "Host",
            PopularHeader::UserAgent => "User-Agent",
            PopularHeader::Accept => "Accept",
            PopularHeader::AcceptEncoding => "Accept-Encoding",
            PopularHeader::AcceptLanguage => "Accept-Language",
            PopularHeader::ContentType => "Content-Type",
            PopularHeader::ContentLength => "Content-Length",
            PopularHeader::Connection => "Connection",
            PopularHeader::CacheControl => "Cache-Control",
            PopularHeader::Cookie => "Cookie",
            PopularHeader::Authorization => "Authorization",
            PopularHeader::TransferEncoding => "Transfer-Encoding",
            PopularHeader::SetCookie => "Set-Cookie",
        }
    }

    fn classify(name: &str) -> Option<PopularHeader> {
        // Linear scan over 13 entries; this *is* the fast path (contrast with the
        // unbounded arbitrary-name fallback in `HeaderMap::get`).
        const TABLE: &[(&str, PopularHeader)] = &[
            ("Host", PopularHeader::Host),
            ("User-Agent", PopularHeader::UserAgent),
            ("Accept", PopularHeader::Accept),
            ("Accept-Encoding", PopularHeader::AcceptEncoding),
            ("Accept-Language", PopularHeader::AcceptLanguage),
            ("Content-Type", PopularHeader::ContentType),
            ("Content-Length", PopularHeader::ContentLength),
            ("Connection", PopularHeader::Connection),
            ("Cache-Control", PopularHeader::CacheControl),
            ("Cookie", PopularHeader::Cookie),
            ("Authorization", PopularHeader::Authorization),
            ("Transfer-Encoding", PopularHeader::TransferEncoding),
            ("Set-Cookie", PopularHeader::SetCookie),
        ];
        TABLE
            .iter()
            .find(|(n, _)| ci_equal(n, name))
            .map(|(_, p)| *p)
    }
}

/// ASCII case-insensitive equality. Correct for `A..Z` <-> `a..z`; any SIMD-accelerated
/// variant a platform wants to substitute must preserve this behavior exactly
/// (`spec.md` §4.3 and Design Notes "SIMD equality").
pub fn ci_equal(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes()
            .zip(b.bytes())
            .all(|(x, y)| x.to_ascii_lowercase() == y.to_ascii_lowercase())
}

/// Case-insensitive, insertion-order header store whose names and values live in an
/// [`Arena`]. Original casing is preserved for emission; lookups ignore case. A small
/// inline capacity avoids heap allocation for the common case of a handful of headers.
#[derive(Debug, Clone)]
pub struct HeaderMap<'a> {
    entries: SmallVec<[(&'a str, &'a str); 16]>,
}

impl<'a> HeaderMap<'a> {
    pub fn new() -> Self {
        HeaderMap {
            entries: SmallVec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a header whose name/value are already arena-allocated, preserving the
    /// caller's casing for emission.
    ///
    /// Per `spec.md` §4.2 rule 2, an obs-fold continuation is appended to the previous
    /// value rather than inserted as a new entry — use [`append_fold`](Self::append_fold)
    /// for that instead of calling `insert` twice.
    pub fn insert(&mut self, name: &'a str, value: &'a str) {
        self.entries.push((name, value));
    }

    /// Append a folded continuation line to the most recently inserted header, allocating
    /// the joined value in `arena`. Returns `false` if there is no prior header to fold
    /// onto (a bare continuation line is a parse failure per `spec.md` §4.2 rule 2), or if
    /// the arena is exhausted.
    pub fn append_fold(&mut self, continuation: &str, arena: &'a Arena) -> bool {
        let Some((_, value)) = self.entries.last().copied() else {
            return false;
        };
        match arena.alloc_joined(value, continuation) {
            Some(joined) => {
                let idx = self.entries.len() - 1;
                self.entries[idx].1 = joined;
                true
            }
            None => false,
        }
    }

    /// Look up the first value for `name`, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        if let Some(popular) = PopularHeader::classify(name) {
            return self
                .entries
                .iter()
                .find(|(n, _)| ci_equal(n, popular.canonical_name()))
                .map(|(_, v)| *v);
        }
        self.entries
            .iter()
            .find(|(n, _)| ci_equal(n, name))
            .map(|(_, v)| *v)
    }

    /// All values for `name`, in insertion order (headers like `Set-Cookie` may repeat).
    pub fn get_all<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'a str> + 's {
        self.entries
            .iter()
            .filter(move |(n, _)| ci_equal(n, name))
            .map(|(_, v)| *v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.entries.iter().copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> Default for HeaderMap<'a> {
    fn default() -> Self {
        HeaderMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let arena = Arena::default();
        let mut h = HeaderMap::new();
        h.insert(
            arena.alloc_str("Content-Type").unwrap(),
            arena.alloc_str("application/json").unwrap(),
        );
        assert_eq!(h.get("content-type"), Some("application/json"));
        assert_eq!(h.get("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn preserves_original_casing_on_emission() {
        let arena = Arena::default();
        let mut h = HeaderMap::new();
        h.insert(
            arena.alloc_str("X-Request-Id").unwrap(),
            arena.alloc_str("abc").unwrap(),
        );
        assert_eq!(h.iter().next(), Some(("X-Request-Id", "abc")));
    }

    #[test]
    fn obs_fold_appends_with_single_space() {
        let arena = Arena::default();
        let mut h = HeaderMap::new();
        h.insert(
            arena.alloc_str("Subject").unwrap(),
            arena.alloc_str("first").unwrap(),
        );
        assert!(h.append_fold("second line", &arena));
        assert_eq!(h.get("Subject"), Some("first second line"));
    }

    #[test]
    fn fold_without_prior_header_fails() {
        let arena = Arena::default();
        let mut h: HeaderMap = HeaderMap::new();
        assert!(!h.append_fold("orphan", &arena));
    }

    #[test]
    fn ci_equal_covers_ascii_letters() {
        assert!(ci_equal("ABCxyz", "abcXYZ"));
        assert!(!ci_equal("abc", "abcd"));
    }

    #[test]
    fn repeated_headers_all_returned() {
        let arena = Arena::default();
        let mut h = HeaderMap::new();
        h.insert(arena.alloc_str("Set-Cookie").unwrap(), arena.alloc_str("a=1").unwrap());
        h.insert(arena.alloc_str("Set-Cookie").unwrap(), arena.alloc_str("b=2").unwrap());
        let all: Vec<_> = h.get_all("set-cookie").collect();
        assert_eq!(all, vec!["a=1", "b=2"]);
    }
}
