//! Route template compilation and path matching.
//!
//! # Responsibilities
//! - Compile a template (`/users/:id/files/*`) into segments of literal and
//!   parameter tokens
//! - Match a slash-normalized path, returning the captured parameters
//!
//! # Design Decisions
//! - Segment counts must line up exactly unless the template ends in `*`;
//!   ambiguity only exists inside a single segment
//! - Inside a segment, a parameter ends at the earliest occurrence of the
//!   next literal that still lets the rest of the segment match
//! - Adjacent parameters: the first one takes everything, the rest capture `""`
//! - An empty path segment is never captured by a parameter
//! - Segments are split on the raw path and captures are percent-decoded
//!   afterwards, so `%2F` stays inside one capture
//! - Matching never allocates state on the pattern; repeated matches are identical

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::PatternError;

const PARAM_MARKER: char = ':';
const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param(String),
}

/// One `/`-delimited piece of a template. An empty token list only matches
/// an empty path segment (the root template `/`).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    tokens: Vec<Token>,
}

/// A compiled route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
    has_wildcard: bool,
    has_trailing_slash: bool,
}

impl Pattern {
    /// Compile a route template.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        if template.is_empty() {
            return Err(PatternError::Empty);
        }
        let body = template
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(template.to_owned()))?;

        let (body, ends_with_slash) = match body.strip_suffix('/') {
            Some(stripped) => (stripped, true),
            // The root template is the only one whose body is empty.
            None => (body, body.is_empty()),
        };

        let mut parts: Vec<&str> = body.split('/').collect();
        let has_wildcard = parts.last() == Some(&WILDCARD);
        if has_wildcard {
            parts.pop();
        }
        if parts.contains(&WILDCARD) {
            return Err(PatternError::MisplacedWildcard(template.to_owned()));
        }

        let mut seen = HashSet::new();
        let mut segments = Vec::with_capacity(parts.len());
        for part in parts {
            let tokens = tokenize(template, part)?;
            for token in &tokens {
                if let Token::Param(name) = token {
                    if !seen.insert(name.clone()) {
                        return Err(PatternError::DuplicateParameter {
                            template: template.to_owned(),
                            name: name.clone(),
                        });
                    }
                }
            }
            segments.push(Segment { tokens });
        }

        Ok(Self {
            raw: template.to_owned(),
            segments,
            has_wildcard,
            has_trailing_slash: ends_with_slash && !has_wildcard,
        })
    }

    /// Compile `child` mounted under this template.
    pub fn join(&self, child: &str) -> Result<Self, PatternError> {
        if self.has_wildcard {
            return Err(PatternError::NestedUnderWildcard {
                parent: self.raw.clone(),
                child: child.to_owned(),
            });
        }
        if !child.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(child.to_owned()));
        }
        let prefix = self.raw.strip_suffix('/').unwrap_or(&self.raw);
        Self::parse(&format!("{prefix}{child}"))
    }

    /// Match a slash-normalized path.
    ///
    /// Returns `None` on no match; a match with no parameters yields empty
    /// [`Params`].
    pub fn matches(&self, path: &str) -> Option<Params> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let mut parts = path.split('/');
        let mut captured = Vec::new();

        for segment in &self.segments {
            let part = parts.next()?;
            if !segment.matches(part, &mut captured) {
                return None;
            }
        }

        if !self.has_wildcard && parts.next().is_some() {
            return None;
        }

        let entries = captured
            .into_iter()
            .map(|(name, value)| (name, decode(value)))
            .collect();
        Some(Params { entries })
    }

    /// The template this pattern was compiled from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the template ends in a `*` segment.
    pub fn has_wildcard(&self) -> bool {
        self.has_wildcard
    }

    /// True when the template ends in `/` (never set for wildcard templates).
    pub fn has_trailing_slash(&self) -> bool {
        self.has_trailing_slash
    }

    /// Parameter names in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .flat_map(|s| s.tokens.iter())
            .filter_map(|t| match t {
                Token::Param(name) => Some(name.as_str()),
                Token::Literal(_) => None,
            })
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.raw)
    }
}

impl Segment {
    fn matches(&self, input: &str, captured: &mut Vec<(String, String)>) -> bool {
        if input.is_empty() {
            return self.tokens.is_empty();
        }
        let mark = captured.len();
        if match_tokens(&self.tokens, input, captured) {
            true
        } else {
            captured.truncate(mark);
            false
        }
    }
}

/// Percent-decode a raw capture. Invalid UTF-8 is replaced, not rejected.
fn decode(raw: String) -> String {
    if !raw.contains('%') {
        return raw;
    }
    percent_decode_str(&raw).decode_utf8_lossy().into_owned()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize(template: &str, segment: &str) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = segment.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != PARAM_MARKER {
            literal.push(c);
            continue;
        }

        let start = i + c.len_utf8();
        let mut end = start;
        while let Some(&(j, next)) = chars.peek() {
            if !is_name_char(next) {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }
        if end == start {
            return Err(PatternError::EmptyParameterName {
                template: template.to_owned(),
                segment: segment.to_owned(),
            });
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }
        tokens.push(Token::Param(segment[start..end].to_owned()));
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

/// Partition `input` against `tokens`, backtracking only over the split
/// points of literal fragments inside this segment.
fn match_tokens(tokens: &[Token], input: &str, captured: &mut Vec<(String, String)>) -> bool {
    let (run, rest) = match tokens.first() {
        None => return input.is_empty(),
        Some(Token::Literal(lit)) => {
            return match input.strip_prefix(lit.as_str()) {
                Some(tail) => match_tokens(&tokens[1..], tail, captured),
                None => false,
            };
        }
        Some(Token::Param(_)) => {
            let len = tokens
                .iter()
                .position(|t| matches!(t, Token::Literal(_)))
                .unwrap_or(tokens.len());
            tokens.split_at(len)
        }
    };

    let Some((Token::Literal(lit), after)) = rest.split_first() else {
        bind_run(run, input, captured);
        return true;
    };

    let candidates = input
        .char_indices()
        .map(|(i, _)| i)
        .filter(|&i| input[i..].starts_with(lit.as_str()));
    for split in candidates {
        let mark = captured.len();
        bind_run(run, &input[..split], captured);
        if match_tokens(after, &input[split + lit.len()..], captured) {
            return true;
        }
        captured.truncate(mark);
    }
    false
}

/// The first parameter of an adjacent run takes the whole value.
fn bind_run(run: &[Token], value: &str, captured: &mut Vec<(String, String)>) {
    for (i, token) in run.iter().enumerate() {
        if let Token::Param(name) = token {
            let value = if i == 0 { value } else { "" };
            captured.push((name.clone(), value.to_owned()));
        }
    }
}

/// Parameters captured by a successful match, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// The value captured for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Params {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(template: &str, path: &str) -> Option<Vec<(String, String)>> {
        Pattern::parse(template)
            .unwrap()
            .matches(path)
            .map(|p| p.into_iter().collect())
    }

    fn pairs(items: &[(&str, &str)]) -> Option<Vec<(String, String)>> {
        Some(items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn test_root() {
        assert_eq!(capture("/", "/"), pairs(&[]));
        assert_eq!(capture("/", "/foo"), None);
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(capture("/*", "/"), pairs(&[]));
        assert_eq!(capture("/*", "/foo"), pairs(&[]));
        assert_eq!(capture("/*", "/anything/nested"), pairs(&[]));
        assert_eq!(capture("/foo/*", "/foo"), pairs(&[]));
        assert_eq!(capture("/foo/*", "/foobar"), None);
        assert_eq!(capture("/foo/:key/*", "/foo/a/bar"), pairs(&[("key", "a")]));
        assert_eq!(capture("/foo/:key/*", "/foo/a/b/c"), pairs(&[("key", "a")]));
    }

    #[test]
    fn test_single_param() {
        assert_eq!(capture("/foo/:key", "/foo/a"), pairs(&[("key", "a")]));
        assert_eq!(capture("/foo/:key", "/foo/"), None);
        assert_eq!(capture("/foo/:key", "/foo/a/b"), None);
        assert_eq!(capture("/foo/:key_a", "/foo/a"), pairs(&[("key_a", "a")]));
    }

    #[test]
    fn test_param_between_literals() {
        assert_eq!(capture("/foo/:key/bar", "/foo/a/bar"), pairs(&[("key", "a")]));
        assert_eq!(capture("/foo/:key/bar", "/foo/a"), None);
        assert_eq!(capture("/foo/:key/bar", "/foo/a/"), None);

        assert_eq!(
            capture("/foo/:key1/bar/:key2", "/foo/a/bar/b"),
            pairs(&[("key1", "a"), ("key2", "b")])
        );
        assert_eq!(capture("/foo/:key1/bar/:key2", "/foo/a/bar"), None);
        assert_eq!(capture("/foo/:key1/bar/:key2", "/foo/a/bar/"), None);
    }

    #[test]
    fn test_param_with_suffix() {
        assert_eq!(capture("/foo/:key.ext", "/foo/.ext"), pairs(&[("key", "")]));
        assert_eq!(capture("/foo/:key.ext", "/foo/a.ext"), pairs(&[("key", "a")]));
        assert_eq!(capture("/foo/:key.ext", "/foo/a.txt"), None);
        assert_eq!(capture("/foo/:key.", "/foo/."), pairs(&[("key", "")]));
        assert_eq!(capture("/foo/:key.", "/foo/a."), pairs(&[("key", "a")]));
    }

    #[test]
    fn test_suffix_backtracks_to_later_occurrence() {
        assert_eq!(
            capture("/foo/:key.ext", "/foo/a.ext.ext"),
            pairs(&[("key", "a.ext")])
        );
        assert_eq!(capture("/foo/:key.aa", "/foo/b.aa.aa"), pairs(&[("key", "b.aa")]));
        assert_eq!(capture("/foo/:key.aa", "/foo/baaa"), None);
    }

    #[test]
    fn test_param_with_prefix() {
        assert_eq!(capture("/foo/bar:key", "/foo/bar"), pairs(&[("key", "")]));
        assert_eq!(capture("/foo/bar:key", "/foo/bara"), pairs(&[("key", "a")]));
        assert_eq!(capture("/foo/bar:key", "/foo/baz"), None);
    }

    #[test]
    fn test_adjacent_params() {
        assert_eq!(
            capture("/foo/:key1:key2", "/foo/a"),
            pairs(&[("key1", "a"), ("key2", "")])
        );
        assert_eq!(
            capture("/foo/:key1:key2", "/foo/ab"),
            pairs(&[("key1", "ab"), ("key2", "")])
        );
    }

    #[test]
    fn test_params_split_by_literal() {
        let template = "/foo/:key1.:key2";
        assert_eq!(capture(template, "/foo/a.b"), pairs(&[("key1", "a"), ("key2", "b")]));
        assert_eq!(capture(template, "/foo/a."), pairs(&[("key1", "a"), ("key2", "")]));
        assert_eq!(capture(template, "/foo/.b"), pairs(&[("key1", ""), ("key2", "b")]));
        assert_eq!(
            capture(template, "/foo/a.b.c"),
            pairs(&[("key1", "a"), ("key2", "b.c")])
        );
        assert_eq!(capture(template, "/foo/ab"), None);
    }

    #[test]
    fn test_three_params_mixed() {
        assert_eq!(
            capture("/v/:major.:minor-:patch", "/v/1.2-3"),
            pairs(&[("major", "1"), ("minor", "2"), ("patch", "3")])
        );
        assert_eq!(
            capture("/v/:major.:minor-:patch", "/v/1.2.3-rc-1"),
            pairs(&[("major", "1"), ("minor", "2.3"), ("patch", "rc-1")])
        );
    }

    #[test]
    fn test_static_templates_match_exactly() {
        for template in ["/a", "/a/b", "/a.b/c-d", "/a/b/"] {
            let pattern = Pattern::parse(template).unwrap();
            let normalized = template.trim_end_matches('/');
            assert!(pattern.matches(normalized).is_some(), "{template}");
            assert!(pattern.matches(&format!("{normalized}x")).is_none());
            assert!(pattern.matches(&format!("{normalized}/x")).is_none());
        }
    }

    #[test]
    fn test_match_is_repeatable() {
        let pattern = Pattern::parse("/foo/:key1.:key2").unwrap();
        let first = pattern.matches("/foo/a.b");
        for _ in 0..3 {
            assert_eq!(pattern.matches("/foo/a.b"), first);
        }
    }

    #[test]
    fn test_trailing_slash_flags() {
        assert!(Pattern::parse("/").unwrap().has_trailing_slash());
        assert!(Pattern::parse("/d/").unwrap().has_trailing_slash());
        assert!(!Pattern::parse("/d").unwrap().has_trailing_slash());

        let wildcard = Pattern::parse("/*").unwrap();
        assert!(wildcard.has_wildcard());
        assert!(!wildcard.has_trailing_slash());
    }

    #[test]
    fn test_trailing_slash_template_matches_normalized_path() {
        let pattern = Pattern::parse("/d/").unwrap();
        assert!(pattern.matches("/d").is_some());
        assert!(pattern.matches("/e").is_none());
    }

    #[test]
    fn test_malformed_templates() {
        assert_eq!(Pattern::parse(""), Err(PatternError::Empty));
        assert!(matches!(
            Pattern::parse("foo"),
            Err(PatternError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            Pattern::parse("/foo/:"),
            Err(PatternError::EmptyParameterName { .. })
        ));
        assert!(matches!(
            Pattern::parse("/foo/:.ext"),
            Err(PatternError::EmptyParameterName { .. })
        ));
        assert!(matches!(
            Pattern::parse("/:id/x/:id"),
            Err(PatternError::DuplicateParameter { .. })
        ));
        assert!(matches!(
            Pattern::parse("/*/foo"),
            Err(PatternError::MisplacedWildcard(_))
        ));
    }

    #[test]
    fn test_join() {
        let parent = Pattern::parse("/a").unwrap();
        assert_eq!(parent.join("/b").unwrap().as_str(), "/a/b");
        assert_eq!(Pattern::parse("/a/").unwrap().join("/b").unwrap().as_str(), "/a/b");
        assert_eq!(Pattern::parse("/").unwrap().join("/b").unwrap().as_str(), "/b");

        let users = Pattern::parse("/users/:id").unwrap();
        assert!(matches!(
            users.join("/friends/:id"),
            Err(PatternError::DuplicateParameter { .. })
        ));
        assert!(matches!(
            Pattern::parse("/files/*").unwrap().join("/x"),
            Err(PatternError::NestedUnderWildcard { .. })
        ));
    }

    #[test]
    fn test_param_names() {
        let pattern = Pattern::parse("/v/:major.:minor/:rest").unwrap();
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), ["major", "minor", "rest"]);
    }

    #[test]
    fn test_params_serialize_as_map() {
        let params = Pattern::parse("/foo/:a/:b").unwrap().matches("/foo/x/y").unwrap();
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            serde_json::json!({ "a": "x", "b": "y" })
        );
    }

    #[test]
    fn test_captures_are_percent_decoded() {
        assert_eq!(capture("/files/:name", "/files/a%20b"), pairs(&[("name", "a b")]));
        assert_eq!(capture("/files/:name", "/files/a%2Fb"), pairs(&[("name", "a/b")]));
        assert_eq!(capture("/files/:name", "/files/100%"), pairs(&[("name", "100%")]));
        assert_eq!(
            capture("/files/:name.:ext", "/files/caf%C3%A9.txt"),
            pairs(&[("name", "café"), ("ext", "txt")])
        );
    }

    #[test]
    fn test_display_honors_width() {
        let pattern = Pattern::parse("/a").unwrap();
        assert_eq!(format!("[{pattern:<5}]"), "[/a   ]");
        assert_eq!(pattern.to_string(), "/a");
    }
}
