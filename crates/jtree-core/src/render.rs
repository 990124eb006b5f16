//! One-way text renderers: YAML, XML and CSV.
//!
//! JSON is the lossless format (see [`Value::to_json`]); these exist for
//! display and export and are not parsed back.
//!
//! - **YAML**: a `---` document header, `key:` lines, `-` list items and
//!   two-space indentation per level. Strings are double-quoted only when
//!   they would otherwise read as another scalar or break the line syntax.
//! - **XML**: the root must be an object with exactly one member, which
//!   becomes the document element. Members named `@name` become attributes,
//!   `@text` becomes inner text and `@cdata` a CDATA section. Array members
//!   repeat their key once per item.
//! - **CSV**: the root is a table of rows (array or object of arrays or
//!   objects). Cells are quoted per RFC 4180 when needed; null and nested
//!   containers render as empty cells.

use crate::error::{Result, TreeError};
use crate::value::Value;

const INDENT: usize = 2;
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>"#;
const XML_TEXT: &str = "@text";
const XML_CDATA: &str = "@cdata";

/// CSV cell separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
}

impl Delimiter {
    fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
        }
    }
}

impl Value {
    /// Render as a YAML document.
    ///
    /// ```
    /// use jtree_core::Value;
    ///
    /// let v = Value::from_json(r#"{"a":{"b":1,"c":["x","true"]}}"#).unwrap();
    /// assert_eq!(v.to_yaml(), "---\na:\n  b: 1\n  c:\n    - x\n    - \"true\"\n");
    /// ```
    pub fn to_yaml(&self) -> String {
        let mut out = String::from("---");
        yaml_node(self, 0, &mut out);
        out.push('\n');
        out
    }

    /// Render as an XML document.
    pub fn to_xml(&self) -> Result<String> {
        let (key, element) = match self {
            Value::Object(members) if members.len() == 1 => (&members[0].0, &members[0].1),
            other => {
                return Err(TreeError::Render(format!(
                    "XML needs an object with exactly one root key, found {}",
                    other.kind()
                )))
            }
        };
        let mut out = String::from(XML_DECLARATION);
        xml_member(key, element, 0, &mut out)?;
        out.push('\n');
        Ok(out)
    }

    /// Render a table of rows as CSV.
    pub fn to_csv(&self, delimiter: Delimiter) -> Result<String> {
        let rows: Vec<&Value> = match self {
            Value::Array(items) => items.iter().collect(),
            Value::Object(members) => members.iter().map(|(_, v)| v).collect(),
            other => {
                return Err(TreeError::Render(format!(
                    "CSV needs an array or object of rows, found {}",
                    other.kind()
                )))
            }
        };
        let sep = delimiter.as_char();
        let mut out = String::new();
        for row in rows {
            let cells: Vec<&Value> = match row {
                Value::Array(items) => items.iter().collect(),
                Value::Object(members) => members.iter().map(|(_, v)| v).collect(),
                scalar => vec![scalar],
            };
            for (i, cell) in cells.into_iter().enumerate() {
                if i > 0 {
                    out.push(sep);
                }
                csv_cell(cell, sep, &mut out);
            }
            out.push('\n');
        }
        Ok(out)
    }
}

fn newline(out: &mut String, level: usize) {
    out.push('\n');
    out.extend(std::iter::repeat(' ').take(level));
}

fn yaml_node(node: &Value, level: usize, out: &mut String) {
    match node {
        Value::Null => {}
        Value::Bool(_) | Value::Number(_) => {
            out.push(' ');
            out.push_str(node.to_text().unwrap_or_default());
        }
        Value::String(s) => {
            out.push(' ');
            out.push_str(&yaml_string(s));
        }
        Value::Array(items) if items.is_empty() => out.push_str(" []"),
        Value::Object(members) if members.is_empty() => out.push_str(" {}"),
        Value::Array(items) => {
            for item in items {
                newline(out, level);
                out.push('-');
                yaml_node(item, level + INDENT, out);
            }
        }
        Value::Object(members) => {
            for (key, value) in members {
                newline(out, level);
                out.push_str(&yaml_string(key));
                out.push(':');
                yaml_node(value, level + INDENT, out);
            }
        }
    }
}

fn yaml_string(s: &str) -> String {
    let ambiguous = s.is_empty()
        || matches!(s, "true" | "false" | "null" | "~" | "yes" | "no")
        || s.parse::<f64>().is_ok()
        || s.starts_with(|c: char| c.is_whitespace() || "-?:,[]{}#&*!|>'\"%@`".contains(c))
        || s.ends_with(char::is_whitespace)
        || s.contains(": ")
        || s.contains(" #")
        || s.contains(|c: char| c.is_control());
    if ambiguous {
        serde_json::Value::String(s.to_string()).to_string()
    } else {
        s.to_string()
    }
}

fn xml_member(key: &str, node: &Value, level: usize, out: &mut String) -> Result<()> {
    if key.is_empty() {
        return Err(TreeError::Render("XML element without a name".to_string()));
    }
    match node {
        Value::Array(items) => {
            for item in items {
                xml_member(key, item, level, out)?;
            }
        }
        Value::Object(members) => xml_element(key, members, level, out)?,
        scalar => {
            let text = match scalar {
                Value::Null => "",
                other => other.to_text().unwrap_or_default(),
            };
            newline(out, level);
            out.push_str(&format!("<{key}>"));
            out.push_str(&xml_escape(text));
            out.push_str(&format!("</{key}>"));
        }
    }
    Ok(())
}

fn xml_element(
    key: &str,
    members: &[(String, Value)],
    level: usize,
    out: &mut String,
) -> Result<()> {
    newline(out, level);
    out.push('<');
    out.push_str(key);
    for (name, value) in members {
        if let Some(attr) = attribute_name(name, value) {
            let text = value.to_text().unwrap_or_default();
            out.push_str(&format!(" {attr}=\"{}\"", xml_escape(text)));
        }
    }
    out.push('>');

    let mut has_elements = false;
    for (name, value) in members {
        if attribute_name(name, value).is_some() {
            continue;
        }
        match (name.as_str(), value) {
            (XML_TEXT, Value::String(text)) => out.push_str(&xml_escape(text)),
            (XML_CDATA, Value::String(text)) => {
                out.push_str("<![CDATA[");
                out.push_str(text);
                out.push_str("]]>");
            }
            _ => {
                xml_member(name, value, level + INDENT, out)?;
                has_elements = true;
            }
        }
    }
    if has_elements {
        newline(out, level);
    }
    out.push_str(&format!("</{key}>"));
    Ok(())
}

fn attribute_name<'a>(name: &'a str, value: &Value) -> Option<&'a str> {
    if name == XML_TEXT || name == XML_CDATA {
        return None;
    }
    let attr = name.strip_prefix('@')?;
    matches!(value, Value::String(_) | Value::Number(_)).then_some(attr)
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

fn csv_cell(cell: &Value, sep: char, out: &mut String) {
    let text = match cell {
        Value::Null | Value::Array(_) | Value::Object(_) => return,
        scalar => scalar.to_text().unwrap_or_default(),
    };
    if text.contains(|c: char| c == sep || c == '"' || c == '\n' || c == '\r') {
        out.push('"');
        out.push_str(&text.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_quotes_only_ambiguous_strings() {
        assert_eq!(yaml_string("plain text"), "plain text");
        assert_eq!(yaml_string("12"), "\"12\"");
        assert_eq!(yaml_string("a: b"), "\"a: b\"");
        assert_eq!(yaml_string(""), "\"\"");
        assert_eq!(yaml_string("line\nbreak"), "\"line\\nbreak\"");
    }

    #[test]
    fn xml_escapes_markup() {
        assert_eq!(xml_escape("a<b & \"c\">"), "a&lt;b &amp; &quot;c&quot;&gt;");
    }

    #[test]
    fn csv_quotes_delimiters() {
        let mut out = String::new();
        csv_cell(&Value::from("a,b"), ',', &mut out);
        assert_eq!(out, "\"a,b\"");
        out.clear();
        csv_cell(&Value::from("a,b"), ';', &mut out);
        assert_eq!(out, "a,b");
    }
}
