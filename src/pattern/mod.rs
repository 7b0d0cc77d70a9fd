//! # Pattern Module
//!
//! Compiles glob-style route keys into reusable [`Matcher`]s.
//!
//! ## Overview
//!
//! A route key such as `/users/#id` or `/files/**` is split on `/` and every
//! segment is compiled once, at registration time. Segments without wildcard
//! tokens become plain string comparisons; segments with wildcards become an
//! anchored regex; a `**` segment becomes a recursive matcher that spans zero
//! or more whole path segments.
//!
//! ## Wildcards
//!
//! | token     | matches                                              |
//! |-----------|------------------------------------------------------|
//! | `?`       | exactly one character                                |
//! | `#`       | one or more digits                                   |
//! | `*`       | one or more characters within a segment              |
//! | `**`      | zero or more whole segments (standalone segment only)|
//! | `[abc]`   | one character from the set (`[!abc]` negates)        |
//! | `[a-z]`   | one character from the range                         |
//! | `{a,b,c}` | one of the literal alternatives                      |
//!
//! Characters that collide with wildcard syntax are written percent-encoded
//! (`%3F` for a literal `?`) and decoded before comparison.
//!
//! ## Captures
//!
//! Every segment containing a wildcard is captured, in order. A segment made of a
//! single wildcard token directly followed by an identifier is a *named* capture:
//!
//! ```rust
//! use globrouter::pattern::compile;
//!
//! let matcher = compile("/users/#id/files/**rest").unwrap();
//! let captures = matcher.match_path("/users/42/files/a/b.txt").unwrap();
//! assert_eq!(captures.get("id"), Some("42"));
//! assert_eq!(captures.get("rest"), Some("a/b.txt"));
//! ```
//!
//! Unnamed wildcard segments are still recorded and can be read positionally.

mod compile;

pub use compile::{compile, Capture, Captures, Matcher, PatternError, Segment, MAX_INLINE_CAPTURES};
pub(crate) use compile::percent_decode;

/// Split a path (or pattern) into its non-empty `/`-delimited segments.
///
/// Leading, trailing and repeated slashes are ignored, so `/a//b/` yields `["a", "b"]`
/// and `/` yields no segments at all.
#[must_use]
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
