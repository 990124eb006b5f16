//! The generic tree node: a closed sum type over the JSON kinds.
//!
//! Objects keep their members as `Vec<(String, Value)>` so insertion order is
//! the iteration order without depending on `IndexMap`. Key uniqueness is
//! maintained by the accessors in [`crate::tree`], which look a key up before
//! appending it.
//!
//! Numbers keep their canonical text. The integer and double interpretations
//! are cached next to it and are only present when the text can be read that
//! way, so `"1e400"` is a valid number without a double and `"2.5"` is one
//! without an integer.

use std::fmt;

/// Discriminant of a [`Value`], used where only the kind matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        };
        f.write_str(name)
    }
}

/// A number with its canonical text and optional cached interpretations.
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    text: String,
    int: Option<i64>,
    double: Option<f64>,
}

impl Number {
    /// Read a number from its textual form, caching whatever interpretations
    /// the text supports.
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let int = text.parse::<i64>().ok();
        let double = text.parse::<f64>().ok().filter(|d| d.is_finite());
        Self { text, int, double }
    }

    pub fn from_i64(value: i64) -> Self {
        Self {
            text: value.to_string(),
            int: Some(value),
            double: Some(value as f64),
        }
    }

    /// Format a double locale-independently. Large and tiny magnitudes use
    /// exponent notation; the text reads back to the same number.
    pub fn from_f64(value: f64) -> Self {
        let text = if value.is_finite() && value != 0.0 && !(1e-7..1e16).contains(&value.abs()) {
            format!("{value:e}")
        } else {
            format!("{value}")
        };
        let int = text.parse::<i64>().ok();
        Self {
            text,
            int,
            double: Some(value),
        }
    }

    pub(crate) fn from_parts(text: String, int: Option<i64>, double: Option<f64>) -> Self {
        Self { text, int, double }
    }

    /// The canonical text, exactly as parsed or formatted.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.int
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.double
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A node in the generic tree.
///
/// Dropping a value drops its whole subtree; there is no separate free call.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    /// Key-value pairs in insertion order.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Allocate an empty node of the given kind.
    pub fn new(kind: Kind) -> Self {
        match kind {
            Kind::Null => Value::Null,
            Kind::Bool => Value::Bool(false),
            Kind::Number => Value::Number(Number::from_i64(0)),
            Kind::String => Value::String(String::new()),
            Kind::Array => Value::Array(Vec::new()),
            Kind::Object => Value::Object(Vec::new()),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    /// Drop all children and payload, leaving the node itself as `Null`.
    pub fn clear(&mut self) {
        *self = Value::Null;
    }

    /// Copy one level of `src` into `self`.
    ///
    /// Scalars are duplicated; containers only pass on their kind, leaving
    /// `self` as an empty array or object.
    pub fn copy_shallow(&mut self, src: &Value) {
        *self = match src {
            Value::Array(_) => Value::Array(Vec::new()),
            Value::Object(_) => Value::Object(Vec::new()),
            scalar => scalar.clone(),
        };
    }

    pub fn set_string(&mut self, value: impl Into<String>) {
        *self = Value::String(value.into());
    }

    pub fn set_int(&mut self, value: i64) {
        *self = Value::Number(Number::from_i64(value));
    }

    pub fn set_double(&mut self, value: f64) {
        *self = Value::Number(Number::from_f64(value));
    }

    pub fn set_bool(&mut self, value: bool) {
        *self = Value::Bool(value);
    }

    /// The canonical text of a scalar leaf.
    ///
    /// `Null` is a leaf and reads as `"null"`, the same text a compact form
    /// stores for it. Containers have no text.
    pub fn to_text(&self) -> Option<&str> {
        match self {
            Value::Bool(true) => Some("true"),
            Value::Bool(false) => Some("false"),
            Value::Number(n) => Some(n.as_str()),
            Value::String(s) => Some(s),
            Value::Null => Some("null"),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Number of direct children; zero for scalars.
    pub fn count(&self) -> usize {
        match self {
            Value::Array(items) => items.len(),
            Value::Object(members) => members.len(),
            _ => 0,
        }
    }

    /// Child at position `pos` of an array, or the value of the `pos`th
    /// member of an object.
    pub fn child_at(&self, pos: usize) -> Option<&Value> {
        match self {
            Value::Array(items) => items.get(pos),
            Value::Object(members) => members.get(pos).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn child_at_mut(&mut self, pos: usize) -> Option<&mut Value> {
        match self {
            Value::Array(items) => items.get_mut(pos),
            Value::Object(members) => members.get_mut(pos).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Remove and return the child at `pos`, shifting later siblings left.
    pub fn remove_child(&mut self, pos: usize) -> Option<Value> {
        match self {
            Value::Array(items) if pos < items.len() => Some(items.remove(pos)),
            Value::Object(members) if pos < members.len() => Some(members.remove(pos).1),
            _ => None,
        }
    }

    /// Look up an object member by its plain (unescaped) key.
    pub fn member(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::from_i64(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::from_f64(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}
