//! Path enumeration: list every addressable path of a tree.
//!
//! The walk is depth-first in insertion order, with a single path buffer that
//! grows on descent and is truncated on return. Callers that need
//! lexicographic order (the compact form does) sort the result themselves.

use crate::path::{parse_segment, push_index, push_key, split_path, Segment};
use crate::value::Value;

/// Which nodes [`Value::to_paths`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathFilter {
    /// Nodes without children: scalars, null and empty containers.
    Leaves,
    /// Containers that have at least one child.
    Interior,
    /// Both.
    #[default]
    All,
}

impl PathFilter {
    fn accepts(self, node: &Value) -> bool {
        match self {
            PathFilter::Leaves => node.count() == 0,
            PathFilter::Interior => node.count() > 0,
            PathFilter::All => true,
        }
    }
}

impl Value {
    /// All paths of this tree in traversal order.
    ///
    /// `max_depth` limits how many levels are visited; `0` means unlimited and
    /// `1` lists only the direct children of the root.
    ///
    /// ```
    /// use jtree_core::{PathFilter, Value};
    ///
    /// let v = Value::from_json(r#"{"a":{"b":1,"c":[true]}}"#).unwrap();
    /// assert_eq!(v.to_paths(0, PathFilter::Leaves), ["a/b", "a/c/[0]"]);
    /// assert_eq!(v.to_paths(0, PathFilter::Interior), ["a", "a/c"]);
    /// ```
    pub fn to_paths(&self, max_depth: usize, filter: PathFilter) -> Vec<String> {
        self.find_paths("", max_depth, filter)
    }

    /// Like [`Value::to_paths`], restricted by an xpath.
    ///
    /// Each xpath term limits the keys or indices visited at its level; an
    /// empty term allows any child. Only paths at least as deep as the xpath
    /// are recorded.
    pub fn find_paths(&self, xpath: &str, max_depth: usize, filter: PathFilter) -> Vec<String> {
        let terms: Vec<Option<Segment>> = split_path(xpath).into_iter().map(parse_segment).collect();
        let mut walker = Walker {
            terms: &terms,
            max_depth,
            filter,
            out: Vec::new(),
        };
        let mut path = String::new();
        walker.walk(self, 0, &mut path);
        walker.out
    }
}

struct Walker<'a> {
    /// Parsed xpath terms; `None` marks a malformed term, which matches nothing.
    terms: &'a [Option<Segment>],
    max_depth: usize,
    filter: PathFilter,
    out: Vec<String>,
}

impl Walker<'_> {
    fn walk(&mut self, node: &Value, level: usize, path: &mut String) {
        let term = self.terms.get(level);
        match node {
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    if !term_allows(term, i, None) {
                        continue;
                    }
                    let mark = path.len();
                    push_index(path, i);
                    self.visit(child, level, path);
                    path.truncate(mark);
                }
            }
            Value::Object(members) => {
                for (i, (key, child)) in members.iter().enumerate() {
                    if !term_allows(term, i, Some(key)) {
                        continue;
                    }
                    let mark = path.len();
                    push_key(path, key);
                    self.visit(child, level, path);
                    path.truncate(mark);
                }
            }
            _ => {}
        }
    }

    fn visit(&mut self, child: &Value, level: usize, path: &mut String) {
        if level + 1 >= self.terms.len() && self.filter.accepts(child) {
            self.out.push(path.clone());
        }
        if self.max_depth == 0 || level + 1 < self.max_depth {
            self.walk(child, level + 1, path);
        }
    }
}

fn term_allows(term: Option<&Option<Segment>>, pos: usize, key: Option<&str>) -> bool {
    match term {
        None => true,
        Some(None) => false,
        Some(Some(Segment::Wildcard | Segment::Append)) => true,
        Some(Some(Segment::Index(i))) => *i == pos,
        Some(Some(Segment::Key(k))) => key == Some(k.as_str()),
    }
}
