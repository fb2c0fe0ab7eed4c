//! Path pattern parsing and matching.
//!
//! # Responsibilities
//! - Parse route patterns (`/_user/{user_id}`, `/{index}/{*rest}`)
//! - Match request paths and capture named parameters
//! - Decide whether one pattern fully covers another (shadowing check)
//!
//! # Design Decisions
//! - Literal segments are case-sensitive
//! - `{name}` binds exactly one non-empty segment
//! - `{*name}` is only legal as the last segment and binds one or more segments
//! - A trailing slash on the request path is ignored
//! - No regex, matching is a single linear pass over the segments

use std::fmt;

use thiserror::Error;

/// Errors raised while parsing a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("pattern {0:?} contains an empty segment")]
    EmptySegment(String),

    #[error("pattern {pattern:?} has an invalid parameter segment {segment:?}")]
    InvalidParameter { pattern: String, segment: String },

    #[error("pattern {pattern:?} binds parameter {name:?} more than once")]
    DuplicateParameter { pattern: String, name: String },

    #[error("pattern {0:?} has a wildcard segment that is not last")]
    WildcardNotLast(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard(String),
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        };
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        let mut segments = Vec::new();
        if !rest.is_empty() {
            let parts: Vec<&str> = rest.split('/').collect();
            let last = parts.len() - 1;
            for (i, part) in parts.into_iter().enumerate() {
                let segment = parse_segment(pattern, part)?;
                if matches!(segment, Segment::Wildcard(_)) && i != last {
                    return Err(PatternError::WildcardNotLast(pattern.to_string()));
                }
                if let Segment::Param(name) | Segment::Wildcard(name) = &segment {
                    let taken = segments.iter().any(|s| {
                        matches!(s, Segment::Param(n) | Segment::Wildcard(n) if n == name)
                    });
                    if taken {
                        return Err(PatternError::DuplicateParameter {
                            pattern: pattern.to_string(),
                            name: name.clone(),
                        });
                    }
                }
                segments.push(segment);
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as it was declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path, returning the captured parameters on success.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let parts: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        let mut params = PathParams::default();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => match parts.get(i) {
                    Some(part) if !part.is_empty() => params.push(name, part),
                    _ => return None,
                },
                Segment::Wildcard(name) => {
                    if parts.get(i..).map_or(true, |rest| rest.iter().all(|p| p.is_empty())) {
                        return None;
                    }
                    params.push(name, &parts[i..].join("/"));
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Returns true if every path matched by `other` is also matched by `self`.
    pub fn covers(&self, other: &PathPattern) -> bool {
        let mut i = 0;
        loop {
            match (self.segments.get(i), other.segments.get(i)) {
                (None, None) => return true,
                (Some(Segment::Wildcard(_)), Some(_)) => return true,
                (Some(Segment::Literal(a)), Some(Segment::Literal(b))) if a == b => {}
                (Some(Segment::Param(_)), Some(Segment::Literal(_) | Segment::Param(_))) => {}
                _ => return false,
            }
            i += 1;
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segment(pattern: &str, part: &str) -> Result<Segment, PatternError> {
    if part.is_empty() {
        return Err(PatternError::EmptySegment(pattern.to_string()));
    }

    let invalid = || PatternError::InvalidParameter {
        pattern: pattern.to_string(),
        segment: part.to_string(),
    };

    match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
        Some(inner) => {
            let (wildcard, name) = match inner.strip_prefix('*') {
                Some(name) => (true, name),
                None => (false, inner),
            };
            let valid = !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(invalid());
            }
            Ok(if wildcard {
                Segment::Wildcard(name.to_string())
            } else {
                Segment::Param(name.to_string())
            })
        }
        None if part.contains(['{', '}']) => Err(invalid()),
        None => Ok(Segment::Literal(part.to_string())),
    }
}

/// Named parameters captured from a matched path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    pairs: Vec<(String, String)>,
}

impl PathParams {
    fn push(&mut self, name: &str, value: &str) {
        self.pairs.push((name.to_string(), value.to_string()));
    }

    /// Look up a captured parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        let pattern = PathPattern::parse("/_health").unwrap();
        assert!(pattern.matches("/_health").is_some());
        assert!(pattern.matches("/_health/").is_some()); // Trailing slash ignored
        assert!(pattern.matches("/_HEALTH").is_none()); // Case sensitive
        assert!(pattern.matches("/_health/x").is_none());
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("").is_some());
        assert!(pattern.matches("/twitter").is_none());
    }

    #[test]
    fn test_param_capture() {
        let pattern = PathPattern::parse("/_user/{user_id}").unwrap();
        let params = pattern.matches("/_user/alice").unwrap();
        assert_eq!(params.get("user_id"), Some("alice"));
        assert!(pattern.matches("/_user").is_none());
        assert!(pattern.matches("/_user//").is_none());
    }

    #[test]
    fn test_wildcard_capture() {
        let pattern = PathPattern::parse("/{index}/{*rest}").unwrap();
        let params = pattern.matches("/twitter/_doc/1").unwrap();
        assert_eq!(params.get("index"), Some("twitter"));
        assert_eq!(params.get("rest"), Some("_doc/1"));
        assert!(pattern.matches("/twitter").is_none());
    }

    #[test]
    fn test_wildcard_needs_a_segment() {
        let pattern = PathPattern::parse("/{index}/{*rest}").unwrap();
        assert!(pattern.matches("/twitter/").is_none());
        assert!(pattern.matches("/twitter//").is_none());
        assert!(pattern.matches("/twitter///").is_none());
        assert_eq!(
            pattern.matches("/twitter//_search").unwrap().get("rest"),
            Some("/_search")
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            PathPattern::parse("no-slash"),
            Err(PatternError::MissingLeadingSlash("no-slash".into()))
        );
        assert!(matches!(
            PathPattern::parse("/a//b"),
            Err(PatternError::EmptySegment(_))
        ));
        assert!(matches!(
            PathPattern::parse("/{*rest}/tail"),
            Err(PatternError::WildcardNotLast(_))
        ));
        assert!(matches!(
            PathPattern::parse("/{id}/{id}"),
            Err(PatternError::DuplicateParameter { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/{bad-name}"),
            Err(PatternError::InvalidParameter { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/half{open"),
            Err(PatternError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_covers() {
        let index = PathPattern::parse("/{index}").unwrap();
        let health = PathPattern::parse("/_health").unwrap();
        let rest = PathPattern::parse("/{index}/{*rest}").unwrap();
        let user = PathPattern::parse("/_user/{user_id}").unwrap();

        assert!(index.covers(&health));
        assert!(!health.covers(&index));
        assert!(rest.covers(&user));
        assert!(!index.covers(&user));
        assert!(!user.covers(&rest));
        assert!(index.covers(&index));
    }
}
