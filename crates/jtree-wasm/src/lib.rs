//! WASM bindings for jtree-core.
//!
//! Exposes compact-form building and lookup, catalog translation and the text
//! renderers to JavaScript via `wasm-bindgen`. Trees cross the boundary as JSON
//! strings and compact forms as byte arrays (`Uint8Array` on the JS side).
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p jtree-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/jtree-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/jtree_wasm.wasm
//! ```

use jtree_core::{
    deserialize, is_compact, Catalog, CompactForm, Delimiter, TranslateFlags, Translation, Value,
};
use wasm_bindgen::prelude::*;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_tree(json: &str) -> Result<Value, JsValue> {
    Value::from_json(json).map_err(js_error)
}

fn parse_compact(bytes: &[u8]) -> Result<CompactForm, JsValue> {
    CompactForm::from_bytes(bytes.to_vec()).map_err(js_error)
}

/// Build the compact form of a JSON document.
#[wasm_bindgen(js_name = toCompact)]
pub fn to_compact(json: &str) -> Result<Vec<u8>, JsValue> {
    let form = parse_tree(json)?.to_compact().map_err(js_error)?;
    Ok(form.into_bytes())
}

/// Rebuild a JSON document from a compact form.
#[wasm_bindgen(js_name = fromCompact)]
pub fn from_compact(bytes: &[u8]) -> Result<String, JsValue> {
    let form = parse_compact(bytes)?;
    deserialize(&form).and_then(|tree| tree.to_json()).map_err(js_error)
}

/// Text of the scalar stored at `path`, or `undefined`.
///
/// `within` restricts the search to entries under a path prefix.
#[wasm_bindgen]
pub fn lookup(bytes: &[u8], path: &str, within: Option<String>) -> Result<Option<String>, JsValue> {
    let form = parse_compact(bytes)?;
    let window = match within {
        Some(prefix) => form.prefix_range(&prefix).map_err(js_error)?,
        None => None,
    };
    let text = form.lookup_text(path, window).map_err(js_error)?;
    Ok(text.map(str::to_string))
}

/// Translate `text` for `loc` using a catalog given as compact bytes or UTF-8
/// JSON. Unknown texts come back unchanged.
#[wasm_bindgen]
pub fn translate(catalog: &[u8], loc: &str, text: &str) -> Result<String, JsValue> {
    let catalog: Catalog = if is_compact(catalog) {
        parse_compact(catalog)?.into()
    } else {
        let json = std::str::from_utf8(catalog).map_err(js_error)?;
        parse_tree(json)?.into()
    };
    let translation = Translation::new(loc, None, catalog, TranslateFlags::default());
    Ok(translation.translate(text))
}

#[wasm_bindgen(js_name = toYaml)]
pub fn to_yaml(json: &str) -> Result<String, JsValue> {
    Ok(parse_tree(json)?.to_yaml())
}

#[wasm_bindgen(js_name = toXml)]
pub fn to_xml(json: &str) -> Result<String, JsValue> {
    parse_tree(json)?.to_xml().map_err(js_error)
}

/// Render an array or object of rows as CSV, `;`-separated when `semicolon`.
#[wasm_bindgen(js_name = toCsv)]
pub fn to_csv(json: &str, semicolon: bool) -> Result<String, JsValue> {
    let delimiter = if semicolon {
        Delimiter::Semicolon
    } else {
        Delimiter::Comma
    };
    parse_tree(json)?.to_csv(delimiter).map_err(js_error)
}
