//! Path pattern parsing (`spec.md` §3.1, §4.4).

/// One segment of a path pattern: a literal that must match exactly, or a named
/// capture (`{id}`) that matches any single path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture(String),
}

/// A route's path template, split into static segments and named capture positions.
/// Built once, at route-table construction time, from a literal template like
/// `/users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a literal template such as `/users/{id}/posts/{post_id}`.
    pub fn from_literal(template: &str) -> Self {
        let trimmed = template.trim_start_matches('/');
        let segments = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed
                .split('/')
                .map(|raw| {
                    if raw.starts_with('{') && raw.ends_with('}') && raw.len() > 2 {
                        Segment::Capture(raw[1..raw.len() - 1].to_string())
                    } else {
                        Segment::Literal(raw.to_string())
                    }
                })
                .collect()
        };
        PathPattern { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_literal_and_capture_segments() {
        let pattern = PathPattern::from_literal("/users/{id}/posts/{post_id}");
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("users".into()),
                Segment::Capture("id".into()),
                Segment::Literal("posts".into()),
                Segment::Capture("post_id".into()),
            ]
        );
    }

    #[test]
    fn root_pattern_has_no_segments() {
        let pattern = PathPattern::from_literal("/");
        assert!(pattern.segments().is_empty());
    }
}
