//! Navigation over a [`Value`] tree with path expressions.
//!
//! # Key design decisions
//!
//! - **Not found is not an error**: read accessors return `Option`, `delete`
//!   returns `bool`. Only create-mode failures produce a [`TreeError`].
//! - **Type coercion on write**: in create mode a node whose kind does not fit
//!   the next segment is cleared and re-typed. Creating `a/[0]` over a scalar
//!   `a` destroys the scalar and makes `a` an array. This lets callers build
//!   trees top-down without knowing their current shape. [`Coercion::Strict`]
//!   disables it; `Null` nodes are still filled in under strict mode.
//! - **Cascading delete**: removing the last child of a container removes the
//!   container too, up to the root, which is cleared to `Null` instead of
//!   being removed.

use crate::error::{Result, TreeError};
use crate::path::{parse_path, parse_segment, split_path, Segment};
use crate::value::Value;
use crate::watch;

/// Create-mode policy for nodes whose kind does not fit the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coercion {
    /// Clear and re-type mismatching nodes.
    #[default]
    Coerce,
    /// Fail with [`TreeError::TypeMismatch`] instead.
    Strict,
}

impl Value {
    /// Create a fresh tree that holds a `Null` node at `path`.
    ///
    /// ```
    /// use jtree_core::Value;
    ///
    /// let root = Value::new_at("a/[1]").unwrap();
    /// assert_eq!(root.to_json().unwrap(), r#"{"a":[null,null]}"#);
    /// ```
    pub fn new_at(path: &str) -> Result<Value> {
        let mut root = Value::Null;
        root.create(path)?;
        Ok(root)
    }

    /// Locate the node at `path`.
    ///
    /// A malformed path, a missing child or a kind mismatch all yield `None`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut node = self;
        for term in split_path(path) {
            node = step(node, &parse_segment(term)?)?;
        }
        watch::observe(path, node, "get");
        Some(node)
    }

    /// Mutable variant of [`Value::get`]; never creates nodes.
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut node = self;
        for term in split_path(path) {
            node = step_mut(node, &parse_segment(term)?)?;
        }
        watch::observe(path, node, "get");
        Some(node)
    }

    /// Locate the node at `path`, creating missing nodes and coercing
    /// mismatching ones.
    pub fn create(&mut self, path: &str) -> Result<&mut Value> {
        self.create_with(path, Coercion::Coerce)
    }

    /// Locate the node at `path`, creating missing nodes under the given
    /// coercion policy.
    ///
    /// Newly created array slots before the requested index are `Null`. An
    /// index too large to allocate fails with [`TreeError::CapacityExceeded`].
    pub fn create_with(&mut self, path: &str, coercion: Coercion) -> Result<&mut Value> {
        let segments = parse_path(path)?;
        let mut node = self;
        for segment in &segments {
            node = step_create(node, segment, coercion, path)?;
        }
        watch::observe(path, node, "create");
        Ok(node)
    }

    /// Set the node at `path` to a string, creating it if needed.
    pub fn set_string_at(&mut self, path: &str, value: impl Into<String>) -> Result<()> {
        let node = self.create(path)?;
        node.set_string(value);
        watch::observe(path, node, "set");
        Ok(())
    }

    /// Set the node at `path` to an integer, creating it if needed.
    pub fn set_int_at(&mut self, path: &str, value: i64) -> Result<()> {
        let node = self.create(path)?;
        node.set_int(value);
        watch::observe(path, node, "set");
        Ok(())
    }

    /// Set the node at `path` to a double, creating it if needed.
    pub fn set_double_at(&mut self, path: &str, value: f64) -> Result<()> {
        let node = self.create(path)?;
        node.set_double(value);
        watch::observe(path, node, "set");
        Ok(())
    }

    /// Set the node at `path` to a boolean, creating it if needed.
    pub fn set_bool_at(&mut self, path: &str, value: bool) -> Result<()> {
        let node = self.create(path)?;
        node.set_bool(value);
        watch::observe(path, node, "set");
        Ok(())
    }

    /// Remove the node at `path` and prune ancestors it leaves empty.
    ///
    /// Returns `false` when nothing was found. The root itself is never
    /// removed; it is cleared to `Null` once it has no children left.
    pub fn delete(&mut self, path: &str) -> bool {
        let Ok(segments) = parse_path(path) else {
            return false;
        };
        if segments.is_empty() {
            return false;
        }
        let Some(positions) = self.resolve_positions(&segments) else {
            return false;
        };
        if let Some(node) = self.get(path) {
            watch::observe(path, node, "delete");
        }

        let mut depth = positions.len();
        while depth > 0 {
            let Some(parent) = self.node_at_mut(&positions[..depth - 1]) else {
                return false;
            };
            parent.remove_child(positions[depth - 1]);
            if parent.count() > 0 {
                return true;
            }
            depth -= 1;
        }
        tracing::trace!(path, "delete emptied the root");
        self.clear();
        true
    }

    /// Reverse lookup: the concrete path of `node` inside this tree.
    ///
    /// `node` is compared by identity, not by content.
    pub fn path_of(&self, node: &Value) -> Option<String> {
        if std::ptr::eq(self, node) {
            return Some(String::new());
        }
        self.to_paths(0, crate::PathFilter::All)
            .into_iter()
            .find(|path| self.get(path).is_some_and(|found| std::ptr::eq(found, node)))
    }

    /// Translate segments into child positions, resolving keys and wildcards.
    fn resolve_positions(&self, segments: &[Segment]) -> Option<Vec<usize>> {
        let mut positions = Vec::with_capacity(segments.len());
        let mut node = self;
        for segment in segments {
            let pos = match (segment, node) {
                (Segment::Index(i), _) if *i < node.count() => *i,
                (Segment::Key(key), Value::Object(members)) => {
                    members.iter().position(|(k, _)| k == key)?
                }
                (Segment::Wildcard | Segment::Append, _) if node.count() > 0 => 0,
                _ => return None,
            };
            node = node.child_at(pos)?;
            positions.push(pos);
        }
        Some(positions)
    }

    fn node_at_mut(&mut self, positions: &[usize]) -> Option<&mut Value> {
        let mut node = self;
        for &pos in positions {
            node = node.child_at_mut(pos)?;
        }
        Some(node)
    }
}

/// Resolve one segment against `node` without creating anything.
fn step<'a>(node: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (segment, node) {
        (Segment::Index(i), _) => node.child_at(*i),
        (Segment::Key(key), Value::Object(members)) => {
            members.iter().find(|(k, _)| k == key).map(|(_, v)| v)
        }
        // A wildcard read picks the first child.
        (Segment::Wildcard | Segment::Append, _) => node.child_at(0),
        _ => None,
    }
}

fn step_mut<'a>(node: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match segment {
        Segment::Index(i) => node.child_at_mut(*i),
        Segment::Key(key) => match node {
            Value::Object(members) => members.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        },
        Segment::Wildcard | Segment::Append => node.child_at_mut(0),
    }
}

/// Resolve one segment against `node`, creating or coercing as needed.
fn step_create<'a>(
    node: &'a mut Value,
    segment: &Segment,
    coercion: Coercion,
    path: &str,
) -> Result<&'a mut Value> {
    match segment {
        Segment::Index(i) => {
            // An existing positional child wins, for objects as well as arrays.
            if *i < node.count() {
                return node.child_at_mut(*i).ok_or_else(|| mismatch(path));
            }
            // Reserve before touching the node so a failed allocation leaves it as it was.
            let len = i.checked_add(1).ok_or_else(|| too_large(path))?;
            match node {
                Value::Array(items) => items
                    .try_reserve(len - items.len())
                    .map_err(|_| too_large(path))?,
                _ => {
                    let mut fresh = Vec::new();
                    fresh.try_reserve(len).map_err(|_| too_large(path))?;
                    retype(node, Value::Array(fresh), coercion, path)?;
                }
            }
            let items = ensure_array(node, coercion, path)?;
            items.resize_with(len, Value::default);
            items.get_mut(*i).ok_or_else(|| mismatch(path))
        }
        Segment::Append => {
            let items = ensure_array(node, coercion, path)?;
            items.push(Value::Null);
            items.last_mut().ok_or_else(|| mismatch(path))
        }
        Segment::Key(key) => {
            let members = ensure_object(node, coercion, path)?;
            let pos = match members.iter().position(|(k, _)| k == key) {
                Some(pos) => pos,
                None => {
                    members.push((key.clone(), Value::Null));
                    members.len() - 1
                }
            };
            Ok(&mut members[pos].1)
        }
        Segment::Wildcard => {
            if node.count() == 0 {
                return Err(TreeError::MalformedPath {
                    path: path.to_string(),
                    message: "a wildcard term cannot create a node".to_string(),
                });
            }
            node.child_at_mut(0).ok_or_else(|| mismatch(path))
        }
    }
}

fn ensure_array<'a>(
    node: &'a mut Value,
    coercion: Coercion,
    path: &str,
) -> Result<&'a mut Vec<Value>> {
    if !matches!(node, Value::Array(_)) {
        retype(node, Value::Array(Vec::new()), coercion, path)?;
    }
    match node {
        Value::Array(items) => Ok(items),
        _ => Err(mismatch(path)),
    }
}

fn ensure_object<'a>(
    node: &'a mut Value,
    coercion: Coercion,
    path: &str,
) -> Result<&'a mut Vec<(String, Value)>> {
    if !matches!(node, Value::Object(_)) {
        retype(node, Value::Object(Vec::new()), coercion, path)?;
    }
    match node {
        Value::Object(members) => Ok(members),
        _ => Err(mismatch(path)),
    }
}

fn retype(node: &mut Value, empty: Value, coercion: Coercion, path: &str) -> Result<()> {
    if !node.is_null() {
        if coercion == Coercion::Strict {
            return Err(mismatch(path));
        }
        tracing::debug!(path, from = %node.kind(), to = %empty.kind(), "coercing node on write");
    }
    *node = empty;
    Ok(())
}

fn too_large(path: &str) -> TreeError {
    TreeError::CapacityExceeded {
        path: path.to_string(),
    }
}

fn mismatch(path: &str) -> TreeError {
    TreeError::TypeMismatch {
        path: path.to_string(),
    }
}
