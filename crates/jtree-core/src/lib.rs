//! # jtree-core
//!
//! A generic JSON-like tree with path addressing, a compact binary form with
//! indexed lookup, and translation catalogs built on top of both.
//!
//! ## Quick start
//!
//! ```rust
//! use jtree_core::{PathFilter, Value};
//!
//! let mut tree = Value::from_json(r#"{"org":{"name":"jtree"}}"#).unwrap();
//! tree.set_int_at("org/versions/[0]", 1).unwrap();
//! assert_eq!(tree.to_paths(0, PathFilter::Leaves), ["org/name", "org/versions/[0]"]);
//!
//! // Tree -> compact form -> single-path lookup, no deserialization
//! let form = tree.to_compact().unwrap();
//! assert_eq!(form.lookup_text("org/name", None).unwrap(), Some("jtree"));
//! ```
//!
//! ## Modules
//!
//! - [`value`]: the `Value` node type and its scalar accessors
//! - [`path`]: path expressions, key escaping and path matching
//! - [`tree`]: `get`, `create` and `delete` by path
//! - [`enumerate`]: list the paths of a tree
//! - [`json`]: JSON text in and out
//! - [`compact`]: the binary compact form
//! - [`lookup`]: binary-search and linear lookup in a compact form
//! - [`catalog`]: translation catalogs and locale fallback
//! - [`registry`]: translation contexts keyed by domain
//! - [`render`]: YAML, XML and CSV output
//! - [`watch`]: debug-node tracing
//! - [`error`]: error types

pub mod catalog;
pub mod compact;
pub mod enumerate;
pub mod error;
pub mod json;
pub mod lookup;
pub mod path;
pub mod registry;
pub mod render;
pub mod tree;
pub mod value;
pub mod watch;

pub use catalog::{translate_json, Catalog, Locale, TranslateFlags, Translation, Window};
pub use compact::{deserialize, is_compact, serialize, CompactForm, Entry, Scalar};
pub use enumerate::PathFilter;
pub use error::{Result, TreeError};
pub use path::MatchMode;
pub use registry::{Registration, TranslationRegistry};
pub use render::Delimiter;
pub use tree::Coercion;
pub use value::{Kind, Number, Value};
