//! # bsondoc
//!
//! A typed document model over a compact, BSON-style binary encoding.
//!
//! A [`Document`] is an ordered list of named [`Value`]s stored directly in
//! its wire form: a little-endian length prefix, a run of tagged elements,
//! and a terminating NUL. Values are null, string, number (double), boolean,
//! array or object. Documents can be built field by field, read back with
//! type coercion, compared, and converted to and from bytes and extended
//! JSON text.
//!
//! ## Quick start
//!
//! ```rust
//! use bsondoc::{Document, Value};
//!
//! let mut doc = Document::new();
//! doc.set_string_field("name", "Alice");
//! doc.set_number_field("age", 30.0);
//! doc.set_array_field("tags", &[Value::from("a"), Value::from("b")]);
//!
//! // Bytes → Document (roundtrip)
//! let back = Document::from_bytes(doc.as_bytes()).unwrap();
//! assert_eq!(back.get_string_field("name"), "Alice");
//! assert_eq!(back.get_integer_field("age"), 30);
//! assert_eq!(
//!     back.try_get_string_array_field("tags"),
//!     Some(vec!["a".to_string(), "b".to_string()])
//! );
//! ```
//!
//! ## Lookup semantics
//!
//! Keys are not unique. Lookups return the **first** matching field and
//! setters always append, so re-setting a key does not change what is read
//! back until the earlier field is removed.
//!
//! ## Modules
//!
//! - [`value`] — `Value` tree, coercion rules, equality
//! - [`document`] — `Document` and its strict/try accessors
//! - [`codec`] — validation, decoding and encoding of the wire format
//! - [`json`] — canonical/relaxed extended-JSON rendering and JSON parsing
//! - [`diagnostics`] — non-fatal reports and the sinks that receive them
//! - [`limits`] — decode limits (nesting depth, size)
//! - [`element`] — wire-format element type tags
//! - [`error`] — Error types for decode/encode/parse failures

pub mod codec;
pub mod diagnostics;
pub mod document;
pub mod element;
pub mod error;
pub mod json;
pub mod limits;
pub mod value;

pub use diagnostics::{
    CollectingSink, Diagnostic, DiagnosticSink, Diagnostics, Severity, TracingSink,
};
pub use document::{Document, Entries};
pub use element::ElementType;
pub use error::{BsonError, Result};
pub use json::JsonMode;
pub use limits::Limits;
pub use value::{Value, ValueKind};
