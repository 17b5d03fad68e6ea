//! WASM bindings for bsondoc.
//!
//! Exposes JSON ↔ binary document conversion and single-field lookup as
//! `#[wasm_bindgen]` functions callable from JavaScript/TypeScript. Built with
//! `wasm-bindgen-cli`:
//!
//! ```sh
//! cargo build -p bsondoc-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/bsondoc_wasm.wasm
//! ```
//!
//! Binary documents cross the boundary as `Uint8Array`. Diagnostics raised
//! while reading go to the `tracing` facade, which is silent unless the host
//! installs a subscriber.

use bsondoc::json::{self, JsonMode};
use bsondoc::Document;
use wasm_bindgen::prelude::*;

fn to_js(err: bsondoc::BsonError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Encode a JSON object string into a binary document.
///
/// Throws a JS error if the input is not valid JSON or not an object.
#[wasm_bindgen]
pub fn encode(json: &str) -> std::result::Result<Vec<u8>, JsValue> {
    Document::from_json(json)
        .map(Document::into_bytes)
        .map_err(to_js)
}

/// Decode a binary document into canonical extended JSON.
///
/// Throws a JS error if the buffer is truncated or malformed.
#[wasm_bindgen]
pub fn decode(bytes: &[u8]) -> std::result::Result<String, JsValue> {
    Document::from_bytes(bytes)
        .map(|doc| doc.to_canonical_json())
        .map_err(to_js)
}

/// Decode a binary document into relaxed extended JSON.
#[wasm_bindgen(js_name = decodeRelaxed)]
pub fn decode_relaxed(bytes: &[u8]) -> std::result::Result<String, JsValue> {
    Document::from_bytes(bytes)
        .map(|doc| doc.to_relaxed_json())
        .map_err(to_js)
}

/// Read the first field named `name` as relaxed JSON, or `undefined` if the
/// document has no such field.
#[wasm_bindgen(js_name = getField)]
pub fn get_field(bytes: &[u8], name: &str) -> std::result::Result<Option<String>, JsValue> {
    let doc = Document::from_bytes(bytes).map_err(to_js)?;
    if !doc.has_field(name) {
        return Ok(None);
    }
    Ok(Some(json::render_value(&doc.get_field(name), JsonMode::Relaxed)))
}

/// Remove the first field named `name` and return the rebuilt document.
/// The buffer comes back unchanged if the field is absent.
#[wasm_bindgen(js_name = removeField)]
pub fn remove_field(bytes: &[u8], name: &str) -> std::result::Result<Vec<u8>, JsValue> {
    let mut doc = Document::from_bytes(bytes).map_err(to_js)?;
    doc.remove_field(name);
    Ok(doc.into_bytes())
}
