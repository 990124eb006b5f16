//! Debug-node watch: log every accessor touching a given path.
//!
//! A watch is a path expression plus an optional substring of the node's text.
//! Once [`install`]ed, tree reads and writes whose path matches emit a
//! `tracing` event with target `jtree::watch`. Nothing is observed until a
//! watch is installed, and an installed watch never changes accessor results.
//!
//! ```
//! use jtree_core::watch::{self, DebugWatch};
//!
//! watch::install(DebugWatch::parse("org/free/key:needle").unwrap());
//! // ... accessors on "org/free/key/..." holding "needle" are now logged
//! watch::uninstall();
//! ```

use std::sync::RwLock;

use crate::path::{path_match, MatchMode};
use crate::value::Value;

/// Environment variable read by [`DebugWatch::from_env`].
pub const DEBUG_NODE_ENV: &str = "JTREE_DEBUG_NODE";

static ACTIVE: RwLock<Option<DebugWatch>> = RwLock::new(None);

/// A path (and optional value substring) to observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugWatch {
    path: String,
    value: Option<String>,
}

impl DebugWatch {
    pub fn new(path: impl Into<String>, value: Option<String>) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    /// Parse `path` or `path:value`. Returns `None` for an empty path.
    pub fn parse(spec: &str) -> Option<Self> {
        let (path, value) = match spec.split_once(':') {
            Some((path, value)) => (path, Some(value.to_string())),
            None => (spec, None),
        };
        (!path.is_empty()).then(|| Self::new(path, value))
    }

    /// Read the watch from `JTREE_DEBUG_NODE`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var(DEBUG_NODE_ENV)
            .ok()
            .and_then(|spec| Self::parse(&spec))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Whether an access to `path` yielding `node` is observed.
    pub fn matches(&self, path: &str, node: &Value) -> bool {
        if !path_match(path, &self.path, MatchMode::Prefix) {
            return false;
        }
        match &self.value {
            Some(needle) => node.to_text().is_some_and(|t| t.contains(needle.as_str())),
            None => true,
        }
    }
}

/// Activate `watch` for the whole process, replacing any previous one.
pub fn install(watch: DebugWatch) {
    if let Ok(mut active) = ACTIVE.write() {
        tracing::info!(target: "jtree::watch", path = %watch.path, value = ?watch.value, "observing");
        *active = Some(watch);
    }
}

/// Deactivate the process-wide watch, returning it.
pub fn uninstall() -> Option<DebugWatch> {
    ACTIVE.write().ok().and_then(|mut active| active.take())
}

/// The currently installed watch, if any.
pub fn active() -> Option<DebugWatch> {
    ACTIVE.read().ok().and_then(|active| active.clone())
}

pub(crate) fn observe(path: &str, node: &Value, op: &str) {
    let Ok(active) = ACTIVE.read() else {
        return;
    };
    if let Some(watch) = active.as_ref() {
        if watch.matches(path, node) {
            tracing::info!(
                target: "jtree::watch",
                path,
                op,
                kind = %node.kind(),
                text = node.to_text().unwrap_or(""),
                "watched node"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_path_and_value() {
        let w = DebugWatch::parse("a/b:needle").unwrap();
        assert_eq!(w.path(), "a/b");
        assert_eq!(w.value(), Some("needle"));
        assert_eq!(DebugWatch::parse(":x"), None);
    }

    #[test]
    fn value_substring_restricts() {
        let w = DebugWatch::parse("a/b:ee").unwrap();
        assert!(w.matches("a/b", &Value::from("needle")));
        assert!(w.matches("a/b/[0]", &Value::from("needle")));
        assert!(!w.matches("a/b", &Value::from("other")));
        assert!(!w.matches("a", &Value::from("needle")));
    }
}
