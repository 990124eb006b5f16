//! Path expressions: slash-separated addresses into a [`Value`](crate::Value) tree.
//!
//! # Syntax
//!
//! - `"key"` -- an object member, matched after un-escaping
//! - `"[3]"` -- the fourth array element, or the fourth object member
//! - `"[]"` -- append a new array element (create mode only; a wildcard when reading)
//! - `""` -- wildcard, any key or index at that level
//!
//! Keys that contain `/`, `[` or the escape character `%` itself must be run
//! through [`escape_key`] before they are embedded in a path. The escaping is a
//! bijection, so `tree -> paths -> tree` never loses or merges keys.

use std::borrow::Cow;

use crate::error::{Result, TreeError};

/// One parsed path term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A plain, already un-escaped object key.
    Key(String),
    /// A positional index, `[N]`.
    Index(usize),
    /// `[]`: append in create mode.
    Append,
    /// The empty term: matches any child.
    Wildcard,
}

/// How [`path_match`] compares a concrete path against an xpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// The xpath may be shorter; its terms must match the leading path terms.
    #[default]
    Prefix,
    /// Both must have the same number of terms.
    ExactLength,
    /// Only the final terms are compared, literally.
    LastSegment,
}

/// Escape a plain object key for embedding in a path.
///
/// `%` becomes `%25`, `/` becomes `%2F` and `[` becomes `%5B`.
pub fn escape_key(key: &str) -> Cow<'_, str> {
    if !key.contains(['%', '/', '[']) {
        return Cow::Borrowed(key);
    }
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '[' => out.push_str("%5B"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Undo [`escape_key`].
///
/// A `%` that does not start one of the three escape sequences is kept as-is.
pub fn unescape_key(term: &str) -> Cow<'_, str> {
    if !term.contains('%') {
        return Cow::Borrowed(term);
    }
    let mut out = String::with_capacity(term.len());
    let mut rest = term;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = match tail.get(1..3) {
            Some("25") => Some('%'),
            Some("2F" | "2f") => Some('/'),
            Some("5B" | "5b") => Some('['),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[3..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Split a path into its raw terms. The empty path has no terms and
/// addresses the root.
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

/// The final raw term of a path.
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Interpret a single raw term. Returns `None` for a term that looks like an
/// index but is not one, such as `[x]`, `[-1]` or `a[2]`.
pub fn parse_segment(term: &str) -> Option<Segment> {
    if term.is_empty() {
        return Some(Segment::Wildcard);
    }
    if term == "[]" {
        return Some(Segment::Append);
    }
    if let Some(inner) = term.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        return inner.parse().ok().map(Segment::Index);
    }
    if term.contains('[') {
        return None;
    }
    Some(Segment::Key(unescape_key(term).into_owned()))
}

/// Parse a full path expression into segments.
pub fn parse_path(path: &str) -> Result<Vec<Segment>> {
    split_path(path)
        .into_iter()
        .map(|term| {
            parse_segment(term).ok_or_else(|| TreeError::MalformedPath {
                path: path.to_string(),
                message: format!("invalid term {term:?}"),
            })
        })
        .collect()
}

/// Append an escaped object key to a path under construction.
pub fn push_key(path: &mut String, key: &str) {
    if !path.is_empty() {
        path.push('/');
    }
    path.push_str(&escape_key(key));
}

/// Append an index term to a path under construction.
pub fn push_index(path: &mut String, index: usize) {
    if !path.is_empty() {
        path.push('/');
    }
    path.push('[');
    path.push_str(&index.to_string());
    path.push(']');
}

/// Join a plain key onto an existing path, returning a new string.
pub fn join_key(base: &str, key: &str) -> String {
    let mut path = base.to_string();
    push_key(&mut path, key);
    path
}

/// Compare a concrete path against an xpath term by term.
///
/// A term matches when both are literally equal, when both are the same index,
/// or when the xpath term is a wildcard (`""` or `[]`).
///
/// ```
/// use jtree_core::path::{path_match, MatchMode};
///
/// assert!(path_match("org/free/[1]/s2key_d", "org///s2key_d", MatchMode::Prefix));
/// assert!(path_match("org/free/[1]/s2key_d", "//[1]/s2key_d", MatchMode::Prefix));
/// assert!(!path_match("org/free/[1]/s2key_d", "//[0]/s2key_d", MatchMode::Prefix));
/// ```
pub fn path_match(path: &str, xpath: &str, mode: MatchMode) -> bool {
    if mode == MatchMode::LastSegment {
        return last_segment(path) == last_segment(xpath);
    }

    let pterms = split_path(path);
    let xterms = split_path(xpath);
    let length_ok = match mode {
        MatchMode::ExactLength => pterms.len() == xterms.len(),
        _ => pterms.len() >= xterms.len(),
    };
    length_ok
        && xterms
            .iter()
            .zip(&pterms)
            .all(|(x, p)| term_matches(p, x))
}

fn term_matches(pterm: &str, xterm: &str) -> bool {
    if pterm == xterm {
        return true;
    }
    match (parse_segment(pterm), parse_segment(xterm)) {
        (_, Some(Segment::Wildcard | Segment::Append)) => true,
        (Some(Segment::Index(p)), Some(Segment::Index(x))) => p == x,
        _ => false,
    }
}
