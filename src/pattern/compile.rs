use regex::Regex;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::split_segments;

/// Maximum number of captured segments before heap allocation.
pub const MAX_INLINE_CAPTURES: usize = 8;

/// Error raised when a route key cannot be compiled.
///
/// Pattern errors are reported when a route is registered, never while a
/// request is being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// `**` used inside a segment instead of as a whole segment
    MisplacedRecursiveWildcard {
        /// The route key being compiled
        pattern: String,
        /// The offending segment
        segment: String,
    },
    /// `[` without a closing `]`
    UnterminatedClass { pattern: String, segment: String },
    /// `{` without a closing `}`
    UnterminatedAlternation { pattern: String, segment: String },
    /// `[]` or `[!]`
    EmptyClass { pattern: String, segment: String },
    /// The translated segment was rejected by the regex engine
    InvalidRegex { pattern: String, message: String },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::MisplacedRecursiveWildcard { pattern, segment } => write!(
                f,
                "invalid route pattern '{pattern}': '**' must be a whole path segment, found '{segment}'"
            ),
            PatternError::UnterminatedClass { pattern, segment } => write!(
                f,
                "invalid route pattern '{pattern}': unterminated character class in '{segment}'"
            ),
            PatternError::UnterminatedAlternation { pattern, segment } => write!(
                f,
                "invalid route pattern '{pattern}': unterminated alternation in '{segment}'"
            ),
            PatternError::EmptyClass { pattern, segment } => write!(
                f,
                "invalid route pattern '{pattern}': empty character class in '{segment}'"
            ),
            PatternError::InvalidRegex { pattern, message } => {
                write!(f, "invalid route pattern '{pattern}': {message}")
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// One compiled path segment.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Exact, already percent-decoded text
    Literal(String),
    /// A single segment containing wildcards, anchored at both ends
    Glob {
        regex: Regex,
        name: Option<Arc<str>>,
    },
    /// `**`: zero or more whole segments
    Recursive { name: Option<Arc<str>> },
}

impl Segment {
    /// Binding name for captured segments, `None` for literals and unnamed wildcards
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Glob { name, .. } | Segment::Recursive { name } => name.as_deref(),
        }
    }

    #[must_use]
    pub fn is_capture(&self) -> bool {
        !matches!(self, Segment::Literal(_))
    }
}

/// A value captured from a path segment (or a `**` span, joined with `/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub name: Option<Arc<str>>,
    pub value: String,
}

/// Captured values in binding-slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(SmallVec<[Capture; MAX_INLINE_CAPTURES]>);

impl Captures {
    /// Value bound to `name`.
    ///
    /// Uses "last write wins" semantics when a pattern repeats a name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rfind(|c| c.name.as_deref() == Some(name))
            .map(|c| c.value.as_str())
    }

    /// Value of the `index`-th captured slot (0-based), named or not
    #[inline]
    #[must_use]
    pub fn nth(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(|c| c.value.as_str())
    }

    /// Named captures only, in slot order
    pub fn named(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|c| c.name.as_deref().map(|n| (n, c.value.as_str())))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capture> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Compiled form of a route key.
///
/// A `Matcher` is a pure function of its source pattern: it holds no mutable
/// state and can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct Matcher {
    pattern: Arc<str>,
    segments: Vec<Segment>,
}

impl Matcher {
    /// The route key this matcher was compiled from
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Ordered binding slots: one entry per captured segment, `None` when unnamed
    #[must_use]
    pub fn binding_slots(&self) -> Vec<Option<&str>> {
        self.segments
            .iter()
            .filter(|s| s.is_capture())
            .map(Segment::name)
            .collect()
    }

    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.match_path(path).is_some()
    }

    /// Match a decoded path, returning the captured values on success
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Captures> {
        self.match_segments(&split_segments(path))
    }

    /// Match pre-split path segments
    #[must_use]
    pub fn match_segments(&self, path: &[&str]) -> Option<Captures> {
        let mut captures = Captures::default();
        if self.walk(0, 0, path, &mut captures) {
            Some(captures)
        } else {
            None
        }
    }

    fn walk(&self, pi: usize, si: usize, path: &[&str], captures: &mut Captures) -> bool {
        let Some(segment) = self.segments.get(pi) else {
            return si == path.len();
        };

        match segment {
            Segment::Literal(literal) => {
                path.get(si).is_some_and(|s| *s == literal.as_str())
                    && self.walk(pi + 1, si + 1, path, captures)
            }
            Segment::Glob { regex, name } => {
                let Some(value) = path.get(si) else {
                    return false;
                };
                if !regex.is_match(value) {
                    return false;
                }
                captures.0.push(Capture {
                    name: name.as_ref().map(Arc::clone),
                    value: (*value).to_string(),
                });
                if self.walk(pi + 1, si + 1, path, captures) {
                    return true;
                }
                captures.0.pop();
                false
            }
            Segment::Recursive { name } => {
                let remaining = path.len().saturating_sub(si);
                let fixed = self.segments[pi + 1..]
                    .iter()
                    .filter(|s| !matches!(s, Segment::Recursive { .. }))
                    .count();
                if fixed > remaining {
                    return false;
                }
                // Greedy: try the longest span first, then shrink.
                for take in (0..=remaining - fixed).rev() {
                    captures.0.push(Capture {
                        name: name.as_ref().map(Arc::clone),
                        value: path[si..si + take].join("/"),
                    });
                    if self.walk(pi + 1, si + take, path, captures) {
                        return true;
                    }
                    captures.0.pop();
                }
                false
            }
        }
    }
}

/// Compile a route key into a [`Matcher`].
///
/// # Errors
///
/// Returns a [`PatternError`] when `**` is not a whole segment, or when a
/// character class or alternation is left unterminated.
pub fn compile(pattern: &str) -> Result<Matcher, PatternError> {
    let segments = split_segments(pattern)
        .into_iter()
        .map(|segment| compile_segment(pattern, segment))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        pattern = %pattern,
        segments = segments.len(),
        captures = segments.iter().filter(|s| s.is_capture()).count(),
        "Route pattern compiled"
    );

    Ok(Matcher {
        pattern: Arc::from(pattern),
        segments,
    })
}

fn compile_segment(pattern: &str, segment: &str) -> Result<Segment, PatternError> {
    if segment.contains("**") {
        let rest = segment.strip_prefix("**").unwrap_or(segment);
        if segment.starts_with("**") && (rest.is_empty() || is_identifier(rest)) {
            return Ok(Segment::Recursive {
                name: (!rest.is_empty()).then(|| Arc::from(rest)),
            });
        }
        return Err(PatternError::MisplacedRecursiveWildcard {
            pattern: pattern.to_string(),
            segment: segment.to_string(),
        });
    }

    if let Some((token, name)) = named_wildcard(segment) {
        return Ok(Segment::Glob {
            regex: build_regex(pattern, wildcard_regex(token))?,
            name: Some(Arc::from(name)),
        });
    }

    translate(pattern, segment)
}

/// `#id`, `*slug`, `?c`: a lone wildcard token followed by an identifier
fn named_wildcard(segment: &str) -> Option<(u8, &str)> {
    let (&token, _) = segment.as_bytes().split_first()?;
    if !matches!(token, b'?' | b'#' | b'*') {
        return None;
    }
    // The token is ASCII, so byte 1 is a char boundary
    let name = &segment[1..];
    is_identifier(name).then_some((token, name))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn wildcard_regex(token: u8) -> &'static str {
    match token {
        b'?' => ".",
        b'#' => "[0-9]+",
        _ => ".+",
    }
}

fn build_regex(pattern: &str, body: &str) -> Result<Regex, PatternError> {
    // `s` flag: `?` and `*` also match a decoded newline
    Regex::new(&format!("^(?s:{body})$")).map_err(|e| PatternError::InvalidRegex {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn translate(pattern: &str, segment: &str) -> Result<Segment, PatternError> {
    let bytes = segment.as_bytes();
    let mut body = String::with_capacity(segment.len() * 2);
    let mut pending: Vec<u8> = Vec::new();
    let mut literal: Vec<u8> = Vec::new();
    let mut wild = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let (byte, width) = match decode_hex(bytes, i) {
                    Some(byte) => (byte, 3),
                    None => (b'%', 1),
                };
                pending.push(byte);
                literal.push(byte);
                i += width;
                continue;
            }
            token @ (b'?' | b'#' | b'*') => {
                flush(&mut body, &mut pending);
                body.push_str(wildcard_regex(token));
                wild = true;
            }
            b'[' => {
                let end = find_from(bytes, i + 1, b']').ok_or_else(|| {
                    PatternError::UnterminatedClass {
                        pattern: pattern.to_string(),
                        segment: segment.to_string(),
                    }
                })?;
                flush(&mut body, &mut pending);
                body.push_str(&class_regex(pattern, segment, &segment[i + 1..end])?);
                wild = true;
                i = end + 1;
                continue;
            }
            b'{' => {
                let end = find_from(bytes, i + 1, b'}').ok_or_else(|| {
                    PatternError::UnterminatedAlternation {
                        pattern: pattern.to_string(),
                        segment: segment.to_string(),
                    }
                })?;
                flush(&mut body, &mut pending);
                let alternatives: Vec<String> = segment[i + 1..end]
                    .split(',')
                    .map(|alt| regex::escape(&percent_decode(alt)))
                    .collect();
                body.push_str("(?:");
                body.push_str(&alternatives.join("|"));
                body.push(')');
                wild = true;
                i = end + 1;
                continue;
            }
            byte => {
                pending.push(byte);
                literal.push(byte);
            }
        }
        i += 1;
    }

    if !wild {
        return Ok(Segment::Literal(String::from_utf8_lossy(&literal).into_owned()));
    }

    flush(&mut body, &mut pending);
    Ok(Segment::Glob {
        regex: build_regex(pattern, &body)?,
        name: None,
    })
}

fn class_regex(pattern: &str, segment: &str, class: &str) -> Result<String, PatternError> {
    let (negated, members) = match class.strip_prefix(['!', '^']) {
        Some(rest) => (true, rest),
        None => (false, class),
    };
    if members.is_empty() {
        return Err(PatternError::EmptyClass {
            pattern: pattern.to_string(),
            segment: segment.to_string(),
        });
    }

    let mut out = String::with_capacity(members.len() + 3);
    out.push('[');
    if negated {
        out.push('^');
    }
    for c in percent_decode(members).chars() {
        if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(']');
    Ok(out)
}

fn flush(body: &mut String, pending: &mut Vec<u8>) {
    if !pending.is_empty() {
        body.push_str(&regex::escape(&String::from_utf8_lossy(pending)));
        pending.clear();
    }
}

fn find_from(bytes: &[u8], start: usize, needle: u8) -> Option<usize> {
    bytes
        .get(start..)?
        .iter()
        .position(|b| *b == needle)
        .map(|p| p + start)
}

fn decode_hex(bytes: &[u8], at: usize) -> Option<u8> {
    let hex = bytes.get(at + 1..at + 3)?;
    if !hex.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    u8::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()
}

/// Percent-decode `s`, keeping invalid escapes as written.
pub(crate) fn percent_decode(s: &str) -> Cow<'_, str> {
    match urlencoding::decode(s) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Owned(String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned()),
    }
}
