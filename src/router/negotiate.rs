//! Content negotiation helpers (`spec.md` §4.4, §4.9), grounded on the original
//! core's `content_negotiation.hpp`.

/// Strip `;charset=...`-style parameters and surrounding OWS from a media type.
pub fn extract_media_type(content_type: &str) -> &str {
    let without_params = match content_type.find(';') {
        Some(idx) => &content_type[..idx],
        None => content_type,
    };
    without_params.trim_matches(' ')
}

/// Index of the entry in `allowed` whose media type matches the request's
/// `Content-Type` header, ignoring `;parameters`. `None` if there is no
/// `Content-Type` header, or it matches nothing in `allowed`.
pub fn find_content_type(content_type_header: Option<&str>, allowed: &[&str]) -> Option<usize> {
    let header = content_type_header?;
    let media_type = extract_media_type(header);
    allowed.iter().position(|candidate| *candidate == media_type)
}

/// `validate_content_type`: true if `allowed` is empty (no restriction declared)
/// or the request's `Content-Type` is one of `allowed`.
pub fn validate_content_type(content_type_header: Option<&str>, allowed: &[&str]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    find_content_type(content_type_header, allowed).is_some()
}

/// Resolve which of `produces` the response should be served as.
///
/// Three fast paths precede the general Accept-header walk (`spec.md` §4.4):
/// - Absent `Accept`, or `Accept: */*` → the first produced type.
/// - Exactly one produced type and it equals the whole `Accept` header verbatim
///   → that type.
/// - A single-value `Accept` header (no commas) → exact match against `produces`.
///
/// Otherwise, each comma-separated Accept token is trimmed of OWS and
/// parameters and matched against `produces` by exact match, `type/*`, or
/// `*/*`. Quality values are accepted syntactically (they do not break
/// parsing) but never change ordering — the first acceptable entry in
/// `produces` wins; this is a deliberate simplification, not an oversight.
pub fn negotiate_response_type<'p>(accept_header: Option<&str>, produces: &[&'p str]) -> Option<&'p str> {
    if produces.is_empty() {
        return None;
    }

    let accept = match accept_header {
        None => return Some(produces[0]),
        Some(a) if a.trim_matches(' ') == "*/*" || a.trim_matches(' ').is_empty() => {
            return Some(produces[0])
        }
        Some(a) => a,
    };

    if produces.len() == 1 && extract_media_type(accept) == produces[0] {
        return Some(produces[0]);
    }

    if !accept.contains(',') {
        return match_one(extract_media_type(accept), produces);
    }

    for token in accept.split(',') {
        let media_type = extract_media_type(token);
        if let Some(found) = match_one(media_type, produces) {
            return Some(found);
        }
    }

    None
}

fn match_one<'p>(media_type: &str, produces: &[&'p str]) -> Option<&'p str> {
    if media_type == "*/*" {
        return Some(produces[0]);
    }
    if let Some(prefix) = media_type.strip_suffix("/*") {
        return produces
            .iter()
            .find(|p| p.starts_with(prefix) && p[prefix.len()..].starts_with('/'))
            .copied();
    }
    produces.iter().find(|p| **p == media_type).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_media_type_strips_parameters_and_whitespace() {
        assert_eq!(extract_media_type(" application/json; charset=utf-8 "), "application/json");
        assert_eq!(extract_media_type("text/plain"), "text/plain");
    }

    #[test]
    fn find_content_type_matches_ignoring_parameters() {
        let allowed = ["application/json", "application/xml"];
        assert_eq!(find_content_type(Some("application/json; charset=utf-8"), &allowed), Some(0));
        assert_eq!(find_content_type(Some("text/plain"), &allowed), None);
        assert_eq!(find_content_type(None, &allowed), None);
    }

    #[test]
    fn validate_content_type_allows_anything_when_unrestricted() {
        assert!(validate_content_type(None, &[]));
    }

    #[test]
    fn negotiate_defaults_to_first_produced_when_accept_absent_or_wildcard() {
        let produces = ["application/json", "application/xml"];
        assert_eq!(negotiate_response_type(None, &produces), Some("application/json"));
        assert_eq!(negotiate_response_type(Some("*/*"), &produces), Some("application/json"));
    }

    #[test]
    fn negotiate_single_value_accept_is_exact_match() {
        let produces = ["application/json", "application/xml"];
        assert_eq!(negotiate_response_type(Some("application/xml"), &produces), Some("application/xml"));
        assert_eq!(negotiate_response_type(Some("text/plain"), &produces), None);
    }

    #[test]
    fn negotiate_type_wildcard_matches_first_eligible_produced() {
        let produces = ["application/json", "application/xml"];
        assert_eq!(negotiate_response_type(Some("application/*"), &produces), Some("application/json"));
    }

    #[test]
    fn negotiate_first_acceptable_wins_even_with_quality_values() {
        // q=0.1 would normally deprioritize json below xml, but ordering by quality
        // is explicitly not part of the contract: first acceptable token wins.
        let produces = ["application/xml", "application/json"];
        let result = negotiate_response_type(Some("application/json;q=0.1, application/xml;q=0.9"), &produces);
        assert_eq!(result, Some("application/json"));
    }
}
