//! The `Document` type: an owned binary buffer plus the accessor layer.
//!
//! A document is an ordered list of `(key, Value)` entries stored directly
//! in its wire encoding. Keys need not be unique. Every read scans the
//! buffer from the front and the **first** matching entry wins; every write
//! appends a new entry at the end. Setting a key twice therefore leaves the
//! second value shadowed until the first is removed.
//!
//! ```
//! use bsondoc::Document;
//!
//! let mut doc = Document::new();
//! doc.set_number_field("x", 1.0);
//! doc.set_number_field("x", 2.0);
//! assert_eq!(doc.get_number_field("x"), 1.0);
//!
//! assert!(doc.remove_field("x"));
//! assert_eq!(doc.get_number_field("x"), 2.0);
//! ```

use std::fmt;

use crate::codec::{self, RawIter};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::element::ElementType;
use crate::error::Result;
use crate::json::{self, JsonMode};
use crate::limits::Limits;
use crate::value::{Value, ValueKind};

/// An ordered, duplicate-tolerant collection of named values backed by one
/// binary buffer.
///
/// The buffer is always a complete, valid document: construction either
/// succeeds fully or yields the canonical empty document. Cloning copies the
/// buffer byte-for-byte. Equality (`==` and [`Document::compare`]) is byte
/// identity of the buffers, so it is sensitive to insertion order.
#[derive(Clone)]
pub struct Document {
    bytes: Vec<u8>,
    diagnostics: Diagnostics,
}

impl Document {
    // ========================================================================
    // Construction
    // ========================================================================

    /// The canonical empty document.
    pub fn new() -> Self {
        Self::from_validated(codec::EMPTY_DOCUMENT.to_vec(), Diagnostics::default())
    }

    /// Route this document's diagnostics (and those of anything read out of
    /// it) to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(crate) fn from_validated(bytes: Vec<u8>, diagnostics: Diagnostics) -> Self {
        Self { bytes, diagnostics }
    }

    /// Decode a buffer with the default [`Limits`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, &Limits::default())
    }

    /// Decode a buffer, checking its length prefix and full structure.
    /// Field values are materialized later, on demand.
    pub fn from_bytes_with(bytes: &[u8], limits: &Limits) -> Result<Self> {
        codec::validate(bytes, limits)?;
        Ok(Self::from_validated(bytes.to_vec(), Diagnostics::default()))
    }

    /// Like [`Document::from_bytes`], but takes ownership of the buffer.
    pub fn from_vec(bytes: Vec<u8>) -> Result<Self> {
        codec::validate(&bytes, &Limits::default())?;
        Ok(Self::from_validated(bytes, Diagnostics::default()))
    }

    /// Decode a buffer, never failing: a corrupt buffer yields the empty
    /// document and a [`Diagnostic::DecodeFailed`].
    pub fn load(bytes: &[u8], diagnostics: Diagnostics) -> Self {
        Self::load_with(bytes, &Limits::default(), diagnostics)
    }

    /// [`Document::load`] with explicit limits.
    pub fn load_with(bytes: &[u8], limits: &Limits, diagnostics: Diagnostics) -> Self {
        match Self::from_bytes_with(bytes, limits) {
            Ok(doc) => doc.with_diagnostics(diagnostics),
            Err(err) => {
                diagnostics.report(Diagnostic::DecodeFailed {
                    message: err.to_string(),
                });
                Self::new().with_diagnostics(diagnostics)
            }
        }
    }

    /// Parse JSON text (plain or extended JSON). The top level must be an
    /// object; every number becomes a double.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_json_with(text, &Limits::default())
    }

    /// [`Document::from_json`] with explicit limits. The encoded result is
    /// checked the same way [`Document::from_bytes_with`] checks a buffer.
    pub fn from_json_with(text: &str, limits: &Limits) -> Result<Self> {
        let bytes = json::parse(text)?;
        codec::validate(&bytes, limits)?;
        Ok(Self::from_validated(bytes, Diagnostics::default()))
    }

    /// Parse JSON text, never failing: bad input yields the empty document
    /// and a [`Diagnostic::JsonParseFailed`].
    pub fn load_json(text: &str, diagnostics: Diagnostics) -> Self {
        match Self::from_json(text) {
            Ok(doc) => doc.with_diagnostics(diagnostics),
            Err(err) => {
                diagnostics.report(Diagnostic::JsonParseFailed {
                    message: err.to_string(),
                });
                Self::new().with_diagnostics(diagnostics)
            }
        }
    }

    // ========================================================================
    // Raw buffer access
    // ========================================================================

    /// The encoded document, suitable for embedding or writing to disk.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the encoded document in bytes.
    pub fn data_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Byte-for-byte equality of the two encodings.
    pub fn compare(&self, other: &Document) -> bool {
        self.bytes == other.bytes
    }

    // ========================================================================
    // Enumeration and text
    // ========================================================================

    /// Entries in insertion order, duplicates included.
    pub fn iter(&self) -> Entries<'_> {
        Entries {
            raw: RawIter::new(&self.bytes),
            diagnostics: &self.diagnostics,
        }
    }

    /// Keys in insertion order, duplicates included.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        RawIter::new(&self.bytes).map_while(|element| element.ok().map(|e| e.key))
    }

    /// Number of entries (duplicate keys count separately).
    pub fn len(&self) -> usize {
        self.keys().count()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.len() == codec::EMPTY_DOCUMENT.len()
    }

    /// Render as canonical extended JSON (type-preserving).
    pub fn to_canonical_json(&self) -> String {
        json::render(self, JsonMode::Canonical)
    }

    /// Render as relaxed extended JSON (numbers and booleans written directly).
    pub fn to_relaxed_json(&self) -> String {
        json::render(self, JsonMode::Relaxed)
    }

    // ========================================================================
    // Field lookup
    // ========================================================================

    /// Value of the first field named `name`, materialized with `diagnostics`.
    fn lookup(&self, name: &str, diagnostics: &Diagnostics) -> Option<Value> {
        let found = codec::find(&self.bytes, name)
            .and_then(|element| element.map(|e| codec::read_value(&e, diagnostics)).transpose());
        match found {
            Ok(value) => value,
            Err(err) => {
                diagnostics.report(Diagnostic::DecodeFailed {
                    message: err.to_string(),
                });
                None
            }
        }
    }

    fn lookup_silent(&self, name: &str) -> Option<Value> {
        self.lookup(name, &self.diagnostics.muted())
    }

    fn lookup_or_warn(&self, name: &str) -> Option<Value> {
        let value = self.lookup(name, &self.diagnostics);
        if value.is_none() {
            self.diagnostics.report(Diagnostic::FieldNotFound {
                field: name.to_string(),
            });
        }
        value
    }

    /// The first field named `name`, or `Value::Null` plus a warning if
    /// there is none.
    pub fn get_field(&self, name: &str) -> Value {
        self.lookup_or_warn(name).unwrap_or_default()
    }

    /// The first field named `name`, or `None` if it is absent or null
    /// (including element types that read as null).
    pub fn try_get_field(&self, name: &str) -> Option<Value> {
        self.lookup_silent(name).filter(|value| !value.is_null())
    }

    /// Whether any field is named `name`, whatever its type.
    pub fn has_field(&self, name: &str) -> bool {
        matches!(codec::find(&self.bytes, name), Ok(Some(_)))
    }

    /// The kind the first field named `name` would read as, without
    /// materializing it. Unsupported element types report `Null`.
    pub fn field_kind(&self, name: &str) -> Option<ValueKind> {
        let element = codec::find(&self.bytes, name).ok()??;
        let kind = match element.element_type {
            ElementType::Double => ValueKind::Number,
            ElementType::String => ValueKind::String,
            ElementType::Boolean => ValueKind::Boolean,
            ElementType::Document => ValueKind::Object,
            ElementType::Array => ValueKind::Array,
            _ => ValueKind::Null,
        };
        Some(kind)
    }

    // ========================================================================
    // Strict getters
    // ========================================================================

    pub fn get_number_field(&self, name: &str) -> f64 {
        self.lookup_or_warn(name)
            .map_or(0.0, |value| value.as_number(&self.diagnostics))
    }

    /// The number field truncated toward zero (saturating at the `i32` range).
    pub fn get_integer_field(&self, name: &str) -> i32 {
        self.get_number_field(name) as i32
    }

    pub fn get_string_field(&self, name: &str) -> String {
        self.lookup_or_warn(name)
            .map(|value| value.as_string(&self.diagnostics))
            .unwrap_or_default()
    }

    pub fn get_bool_field(&self, name: &str) -> bool {
        self.lookup_or_warn(name)
            .is_some_and(|value| value.as_bool(&self.diagnostics))
    }

    /// The array field, copied out of the buffer.
    pub fn get_array_field(&self, name: &str) -> Vec<Value> {
        self.lookup_or_warn(name)
            .map(|value| value.as_array(&self.diagnostics).to_vec())
            .unwrap_or_default()
    }

    pub fn get_object_field(&self, name: &str) -> Document {
        match self.lookup_or_warn(name) {
            Some(Value::Object(doc)) => doc,
            Some(other) => other.as_object(&self.diagnostics).into_owned(),
            None => Document::new().with_diagnostics(self.diagnostics.clone()),
        }
    }

    // ========================================================================
    // Try getters
    // ========================================================================

    pub fn try_get_number_field(&self, name: &str) -> Option<f64> {
        self.lookup_silent(name)?.try_get_number()
    }

    pub fn try_get_i32_field(&self, name: &str) -> Option<i32> {
        self.lookup_silent(name)?.try_get_i32()
    }

    pub fn try_get_u32_field(&self, name: &str) -> Option<u32> {
        self.lookup_silent(name)?.try_get_u32()
    }

    pub fn try_get_i64_field(&self, name: &str) -> Option<i64> {
        self.lookup_silent(name)?.try_get_i64()
    }

    pub fn try_get_string_field(&self, name: &str) -> Option<String> {
        self.lookup_silent(name)?
            .try_get_string()
            .map(|s| s.into_owned())
    }

    /// The field as strings, provided it is an array and *every* element
    /// converts to a string.
    pub fn try_get_string_array_field(&self, name: &str) -> Option<Vec<String>> {
        self.lookup_silent(name)?
            .try_get_array()?
            .iter()
            .map(|item| item.try_get_string().map(|s| s.into_owned()))
            .collect()
    }

    pub fn try_get_bool_field(&self, name: &str) -> Option<bool> {
        self.lookup_silent(name)?.try_get_bool()
    }

    pub fn try_get_array_field(&self, name: &str) -> Option<Vec<Value>> {
        match self.lookup_silent(name)? {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn try_get_object_field(&self, name: &str) -> Option<Document> {
        match self.lookup_silent(name)? {
            Value::Object(doc) => Some(doc),
            _ => None,
        }
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Append a field typed by the runtime kind of `value`.
    ///
    /// A null value has nothing to write: the document is left unchanged and
    /// a [`Diagnostic::NullValueIgnored`] warning is reported.
    pub fn set_field(&mut self, name: &str, value: &Value) {
        match value {
            Value::Null => self.diagnostics.report(Diagnostic::NullValueIgnored {
                field: name.to_string(),
            }),
            Value::String(s) => self.set_string_field(name, s),
            Value::Number(n) => self.set_number_field(name, *n),
            Value::Boolean(b) => self.set_bool_field(name, *b),
            Value::Array(items) => self.set_array_field(name, items),
            Value::Object(doc) => self.set_object_field(name, doc),
        }
    }

    pub fn set_number_field(&mut self, name: &str, number: f64) {
        self.append(name, |out| codec::write_number(out, name, number));
    }

    pub fn set_string_field(&mut self, name: &str, value: &str) {
        self.append(name, |out| codec::write_string(out, name, value));
    }

    pub fn set_bool_field(&mut self, name: &str, value: bool) {
        self.append(name, |out| codec::write_bool(out, name, value));
    }

    /// Append an array field. Null elements are stored as wire nulls so the
    /// positions of later elements are preserved.
    pub fn set_array_field(&mut self, name: &str, items: &[Value]) {
        self.append(name, |out| codec::write_array(out, name, items));
    }

    /// Append an embedded copy of `object`.
    pub fn set_object_field(&mut self, name: &str, object: &Document) {
        self.append(name, |out| codec::write_document(out, name, object.as_bytes()));
    }

    fn append(&mut self, name: &str, write: impl FnOnce(&mut Vec<u8>) -> Result<()>) {
        let mut element = Vec::new();
        let result =
            write(&mut element).and_then(|()| codec::append_element(&mut self.bytes, &element));
        if let Err(err) = result {
            self.diagnostics.report(Diagnostic::EncodeFailed {
                field: name.to_string(),
                message: err.to_string(),
            });
        }
    }

    /// Remove the first field named `name`, rebuilding the buffer.
    ///
    /// Returns `false` and leaves the buffer untouched if there is no such
    /// field. Later duplicates of `name` survive and become visible.
    pub fn remove_field(&mut self, name: &str) -> bool {
        match codec::without_first(&self.bytes, name) {
            Ok(Some(bytes)) => {
                self.bytes = bytes;
                true
            }
            Ok(None) => false,
            Err(err) => {
                self.diagnostics.report(Diagnostic::DecodeFailed {
                    message: err.to_string(),
                });
                false
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quiet = self.diagnostics.muted();
        let entries = RawIter::new(&self.bytes).map_while(|element| {
            let element = element.ok()?;
            let value = codec::read_value(&element, &quiet).ok()?;
            Some((element.key, value))
        });
        f.debug_map().entries(entries).finish()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a str, Value);
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for Document {
    /// Build a document by appending each pair in order. Null values are
    /// skipped, exactly as [`Document::set_field`] does.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (key, value) in iter {
            doc.set_field(key.as_ref(), &value.into());
        }
        doc
    }
}

/// Iterator over a document's entries, produced by [`Document::iter`].
pub struct Entries<'a> {
    raw: RawIter<'a>,
    diagnostics: &'a Diagnostics,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (&'a str, Value);

    fn next(&mut self) -> Option<Self::Item> {
        let element = match self.raw.next()? {
            Ok(element) => element,
            Err(err) => {
                self.diagnostics.report(Diagnostic::DecodeFailed {
                    message: err.to_string(),
                });
                return None;
            }
        };
        let value = match codec::read_value(&element, self.diagnostics) {
            Ok(value) => value,
            Err(err) => {
                self.diagnostics.report(Diagnostic::DecodeFailed {
                    message: err.to_string(),
                });
                Value::Null
            }
        };
        Some((element.key, value))
    }
}
