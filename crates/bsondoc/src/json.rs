//! Extended-JSON text forms of a document.
//!
//! Two renderings are produced from a fully materialized document:
//!
//! - **Canonical** — type-preserving. Every number is wrapped as
//!   `{"$numberDouble":"<repr>"}` so the double survives a text round trip.
//! - **Relaxed** — readable. Finite numbers are written as plain JSON
//!   numbers; only `Infinity`, `-Infinity` and `NaN` keep the wrapper.
//!
//! Output is compact and keeps duplicate keys, in insertion order, which a
//! `serde_json::Map` could not represent. `serde_json` is still used for
//! string escaping and float formatting.
//!
//! Parsing goes the other way: any JSON object becomes a document, numbers
//! become doubles, and the numeric wrappers (`$numberDouble`, `$numberInt`,
//! `$numberLong`) are unwrapped so canonical output parses back unchanged.
//!
//! ```
//! use bsondoc::Document;
//!
//! let doc = Document::from_json(r#"{"name":"Alice","age":30}"#).unwrap();
//! assert_eq!(doc.to_relaxed_json(), r#"{"name":"Alice","age":30.0}"#);
//! assert_eq!(
//!     doc.to_canonical_json(),
//!     r#"{"name":"Alice","age":{"$numberDouble":"30.0"}}"#
//! );
//! ```

use serde_json::Map;

use crate::codec;
use crate::diagnostics::Diagnostics;
use crate::document::Document;
use crate::error::{BsonError, Result};
use crate::value::{format_number, Value};

/// Which extended-JSON dialect to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonMode {
    #[default]
    Canonical,
    Relaxed,
}

const NUMBER_DOUBLE: &str = "$numberDouble";
const NUMBER_WRAPPERS: [&str; 3] = [NUMBER_DOUBLE, "$numberInt", "$numberLong"];

// ============================================================================
// Rendering
// ============================================================================

/// Render `doc` as extended JSON in the given mode.
pub fn render(doc: &Document, mode: JsonMode) -> String {
    let mut out = String::with_capacity(doc.data_len() * 2);
    write_document(doc, mode, &mut out);
    out
}

/// Render a single value the way it would appear inside a document.
pub fn render_value(value: &Value, mode: JsonMode) -> String {
    let mut out = String::new();
    write_value(value, mode, &mut out);
    out
}

fn write_document(doc: &Document, mode: JsonMode, out: &mut String) {
    out.push('{');
    for (i, (key, value)) in doc.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(key, out);
        out.push(':');
        write_value(&value, mode, out);
    }
    out.push('}');
}

fn write_value(value: &Value, mode: JsonMode, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::String(s) => write_string(s, out),
        Value::Number(n) => write_number(*n, mode, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, mode, out);
            }
            out.push(']');
        }
        Value::Object(doc) => write_document(doc, mode, out),
    }
}

fn write_number(n: f64, mode: JsonMode, out: &mut String) {
    if mode == JsonMode::Relaxed {
        if let Some(number) = serde_json::Number::from_f64(n) {
            out.push_str(&number.to_string());
            return;
        }
    }
    out.push_str("{\"");
    out.push_str(NUMBER_DOUBLE);
    out.push_str("\":\"");
    out.push_str(&canonical_double(n));
    out.push_str("\"}");
}

/// Round-trip text for a double, always showing a fractional part or an
/// exponent so it cannot be mistaken for an integer.
fn canonical_double(n: f64) -> String {
    if n.is_finite() {
        format!("{n:?}")
    } else {
        format_number(n)
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push_str(&serde_json::Value::from(s).to_string());
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse JSON text into an encoded document.
pub fn parse(text: &str) -> Result<Vec<u8>> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    match json {
        serde_json::Value::Object(map) => encode_object(&map),
        _ => Err(BsonError::JsonNotAnObject),
    }
}

fn encode_object(map: &Map<String, serde_json::Value>) -> Result<Vec<u8>> {
    let entries = map
        .iter()
        .map(|(key, json)| Ok((key, to_value(json)?)))
        .collect::<Result<Vec<_>>>()?;
    codec::encode_document(entries)
}

fn to_value(json: &serde_json::Value) -> Result<Value> {
    let value = match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or_default()),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => {
            Value::Array(items.iter().map(to_value).collect::<Result<_>>()?)
        }
        serde_json::Value::Object(map) => match unwrap_number(map) {
            Some(n) => Value::Number(n),
            None => Value::Object(Document::from_validated(
                encode_object(map)?,
                Diagnostics::default(),
            )),
        },
    };
    Ok(value)
}

/// `{"$numberDouble": "1.5"}` and friends, as a double.
fn unwrap_number(map: &Map<String, serde_json::Value>) -> Option<f64> {
    if map.len() != 1 {
        return None;
    }
    let (key, value) = map.iter().next()?;
    if !NUMBER_WRAPPERS.contains(&key.as_str()) {
        return None;
    }
    match value.as_str()? {
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        text => text.parse().ok(),
    }
}
