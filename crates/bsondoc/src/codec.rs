//! Binary document codec.
//!
//! Wire format (all integers little-endian):
//!
//! ```text
//! document := int32 total_len, element*, 0x00
//! element  := u8 tag, cstring key, payload
//! double   := 8 bytes IEEE-754
//! string   := int32 len (incl. NUL), bytes, 0x00
//! bool     := u8 (0 or 1)
//! document / array := a complete nested document
//! ```
//!
//! Arrays are documents keyed `"0"`, `"1"`, ... in order. Decoding does not
//! look at those keys; values are collected in encounter order.
//!
//! # Key design decisions
//!
//! - **Validate once, read lazily**: [`validate`] walks the whole buffer up
//!   front with a depth bound, so a stored buffer is always structurally
//!   sound. Individual values are only materialized when a field is read.
//! - **Linear first-match lookup**: `find` scans entries in order and stops
//!   at the first key match. Duplicate keys are legal and the earliest one
//!   shadows later ones.
//! - **Append-only writes**: setters serialize one element and splice it in
//!   front of the terminating NUL; nothing is overwritten or deduplicated.

use std::borrow::Borrow;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::document::Document;
use crate::element::{ElementType, PayloadRule};
use crate::error::{BsonError, Result};
use crate::limits::Limits;
use crate::value::Value;

/// The canonical empty document: length 5, no elements, terminator.
pub const EMPTY_DOCUMENT: [u8; 5] = [5, 0, 0, 0, 0];

/// Smallest possible document (length prefix + terminator).
const MIN_DOCUMENT_LEN: usize = 5;

const MAX_DOCUMENT_LEN: usize = i32::MAX as usize;

// ============================================================================
// Raw element access
// ============================================================================

/// One undecoded element inside a document buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawElement<'a> {
    pub key: &'a str,
    pub element_type: ElementType,
    /// Payload bytes only (no tag, no key).
    pub payload: &'a [u8],
    /// The complete element, tag through payload.
    pub raw: &'a [u8],
}

/// Iterates the elements of one document slice in order.
///
/// The slice must span exactly one document. Offsets in errors are shifted by
/// `base` so nested documents report positions in the outermost buffer.
pub(crate) struct RawIter<'a> {
    doc: &'a [u8],
    base: usize,
    pos: usize,
    end: usize,
    done: bool,
}

impl<'a> RawIter<'a> {
    pub fn new(doc: &'a [u8]) -> Self {
        Self::with_base(doc, 0)
    }

    fn with_base(doc: &'a [u8], base: usize) -> Self {
        Self {
            doc,
            base,
            pos: 4,
            end: doc.len().saturating_sub(1),
            done: doc.len() < MIN_DOCUMENT_LEN,
        }
    }

    fn read_element(&mut self) -> Result<RawElement<'a>> {
        let start = self.pos;
        let tag = self.doc[start];
        if tag == 0 {
            // Entry list ended before the declared length did.
            return Err(BsonError::LengthMismatch {
                declared: self.doc.len(),
                actual: start + 1,
            });
        }
        let element_type = ElementType::from_u8(tag).ok_or(BsonError::UnknownElementType {
            offset: self.base + start,
            tag,
        })?;

        let key_start = start + 1;
        let key_end = self.find_nul(key_start)?;
        let key = std::str::from_utf8(&self.doc[key_start..key_end]).map_err(|_| {
            BsonError::InvalidUtf8 {
                offset: self.base + key_start,
            }
        })?;

        let payload_start = key_end + 1;
        let payload_len = self.payload_len(element_type, payload_start)?;
        let payload_end = payload_start + payload_len;
        self.pos = payload_end;

        Ok(RawElement {
            key,
            element_type,
            payload: &self.doc[payload_start..payload_end],
            raw: &self.doc[start..payload_end],
        })
    }

    /// Index of the next NUL at or after `from`, staying clear of the
    /// document terminator.
    fn find_nul(&self, from: usize) -> Result<usize> {
        self.doc[from.min(self.end)..self.end]
            .iter()
            .position(|&b| b == 0)
            .map(|i| from + i)
            .ok_or(BsonError::MissingTerminator {
                offset: self.base + self.end,
            })
    }

    fn read_len(&self, at: usize) -> Result<i32> {
        let bytes = self
            .doc
            .get(at..at + 4)
            .filter(|_| at + 4 <= self.end)
            .ok_or(BsonError::Truncated {
                offset: self.base + at,
                needed: (at + 4).saturating_sub(self.end),
            })?;
        Ok(read_i32(bytes))
    }

    /// Byte length of the payload starting at `at`, checked against the
    /// space remaining before the terminator.
    fn payload_len(&self, element_type: ElementType, at: usize) -> Result<usize> {
        let available = self.end.saturating_sub(at);
        let len = match element_type.payload_rule() {
            PayloadRule::Fixed(n) => n,
            PayloadRule::String => self.string_len(at)?,
            PayloadRule::Document => {
                let declared = self.read_len(at)?;
                if declared < MIN_DOCUMENT_LEN as i32 {
                    return Err(self.invalid_length(at, declared));
                }
                declared as usize
            }
            PayloadRule::Binary => {
                let declared = self.read_len(at)?;
                if declared < 0 {
                    return Err(self.invalid_length(at, declared));
                }
                4 + 1 + declared as usize
            }
            PayloadRule::TwoCStrings => {
                let pattern_end = self.find_nul(at)?;
                let options_end = self.find_nul(pattern_end + 1)?;
                options_end + 1 - at
            }
            PayloadRule::StringThenFixed(n) => self.string_len(at)? + n,
            PayloadRule::LengthPrefixed => {
                let declared = self.read_len(at)?;
                if declared < (4 + MIN_DOCUMENT_LEN + MIN_DOCUMENT_LEN) as i32 {
                    return Err(self.invalid_length(at, declared));
                }
                declared as usize
            }
        };
        if len > available {
            return Err(BsonError::Truncated {
                offset: self.base + at,
                needed: len - available,
            });
        }
        Ok(len)
    }

    fn string_len(&self, at: usize) -> Result<usize> {
        let declared = self.read_len(at)?;
        if declared < 1 {
            return Err(self.invalid_length(at, declared));
        }
        Ok(4 + declared as usize)
    }

    fn invalid_length(&self, at: usize, length: i32) -> BsonError {
        BsonError::InvalidLength {
            offset: self.base + at,
            length: i64::from(length),
        }
    }
}

impl<'a> Iterator for RawIter<'a> {
    type Item = Result<RawElement<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.end {
            return None;
        }
        match self.read_element() {
            Ok(element) => Some(Ok(element)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

fn read_i32(bytes: &[u8]) -> i32 {
    let mut le = [0u8; 4];
    le.copy_from_slice(&bytes[..4]);
    i32::from_le_bytes(le)
}

// ============================================================================
// Validation
// ============================================================================

/// Check that `bytes` is one complete, well-formed document.
///
/// Verifies the length prefix against the buffer size, every element's
/// framing, UTF-8 in keys and strings, boolean bytes, and recursively every
/// embedded document and array, failing with
/// [`BsonError::NestingTooDeep`] once `limits.max_nesting_depth` is passed.
pub fn validate(bytes: &[u8], limits: &Limits) -> Result<()> {
    if bytes.len() > limits.max_document_size {
        return Err(BsonError::DocumentTooLarge {
            size: bytes.len(),
            max: limits.max_document_size,
        });
    }
    if bytes.len() < 4 {
        return Err(BsonError::Truncated {
            offset: 0,
            needed: 4 - bytes.len(),
        });
    }
    let declared = read_i32(bytes);
    if declared < 0 || declared as usize != bytes.len() {
        return Err(BsonError::LengthMismatch {
            declared: declared.max(0) as usize,
            actual: bytes.len(),
        });
    }
    validate_document(bytes, 0, 0, limits)
}

fn validate_document(doc: &[u8], base: usize, depth: usize, limits: &Limits) -> Result<()> {
    if depth > limits.max_nesting_depth {
        return Err(BsonError::NestingTooDeep {
            max: limits.max_nesting_depth,
        });
    }
    if doc.len() < MIN_DOCUMENT_LEN {
        return Err(BsonError::InvalidLength {
            offset: base,
            length: doc.len() as i64,
        });
    }
    if doc[doc.len() - 1] != 0 {
        return Err(BsonError::MissingTerminator {
            offset: base + doc.len() - 1,
        });
    }

    for element in RawIter::with_base(doc, base) {
        let element = element?;
        let payload_offset = base + offset_in(doc, element.payload);
        match element.element_type {
            ElementType::Document | ElementType::Array => {
                validate_document(element.payload, payload_offset, depth + 1, limits)?;
            }
            ElementType::Boolean => {
                let byte = element.payload[0];
                if byte > 1 {
                    return Err(BsonError::InvalidBoolean {
                        offset: payload_offset,
                        byte,
                    });
                }
            }
            ElementType::String | ElementType::JavaScript | ElementType::Symbol => {
                string_payload(element.payload, payload_offset)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Position of `inner` within `outer`; both must come from the same buffer.
fn offset_in(outer: &[u8], inner: &[u8]) -> usize {
    inner.as_ptr() as usize - outer.as_ptr() as usize
}

/// Text of a length-prefixed string payload.
fn string_payload(payload: &[u8], offset: usize) -> Result<&str> {
    let (last, body) = payload
        .split_last()
        .filter(|(_, body)| body.len() >= 4)
        .ok_or(BsonError::Truncated { offset, needed: 1 })?;
    if *last != 0 {
        return Err(BsonError::MissingTerminator {
            offset: offset + payload.len() - 1,
        });
    }
    std::str::from_utf8(&body[4..]).map_err(|_| BsonError::InvalidUtf8 { offset: offset + 4 })
}

// ============================================================================
// Decoding
// ============================================================================

/// First element whose key equals `key`.
pub(crate) fn find<'a>(doc: &'a [u8], key: &str) -> Result<Option<RawElement<'a>>> {
    for element in RawIter::new(doc) {
        let element = element?;
        if element.key == key {
            return Ok(Some(element));
        }
    }
    Ok(None)
}

/// Materialize one element into an owned [`Value`].
///
/// Embedded documents become independent [`Document`]s sharing the caller's
/// diagnostics handle; arrays are decoded recursively. Element types with no
/// `Value` counterpart become `Null` and are reported.
pub(crate) fn read_value(element: &RawElement<'_>, diagnostics: &Diagnostics) -> Result<Value> {
    let payload = element.payload;
    let value = match element.element_type {
        ElementType::Double => {
            let mut le = [0u8; 8];
            le.copy_from_slice(&payload[..8]);
            Value::Number(f64::from_le_bytes(le))
        }
        ElementType::String => Value::String(string_payload(payload, 0)?.to_string()),
        ElementType::Boolean => Value::Boolean(payload[0] != 0),
        ElementType::Null => Value::Null,
        ElementType::Document => {
            diagnostics.report(Diagnostic::NestedDocumentCopied {
                field: element.key.to_string(),
                size: payload.len(),
            });
            Value::Object(Document::from_validated(
                payload.to_vec(),
                diagnostics.unmuted(),
            ))
        }
        ElementType::Array => Value::Array(read_array(payload, diagnostics)?),
        element_type => {
            diagnostics.report(Diagnostic::UnsupportedElement {
                key: element.key.to_string(),
                element_type,
            });
            Value::Null
        }
    };
    Ok(value)
}

fn read_array(doc: &[u8], diagnostics: &Diagnostics) -> Result<Vec<Value>> {
    RawIter::new(doc)
        .map(|element| read_value(&element?, diagnostics))
        .collect()
}

/// Validate `bytes` and decode every entry eagerly, duplicates included.
pub fn decode_entries(
    bytes: &[u8],
    limits: &Limits,
    diagnostics: &Diagnostics,
) -> Result<Vec<(String, Value)>> {
    validate(bytes, limits)?;
    RawIter::new(bytes)
        .map(|element| {
            let element = element?;
            Ok((element.key.to_string(), read_value(&element, diagnostics)?))
        })
        .collect()
}

/// Copy of `doc` without the first element keyed `key`, or `None` if there
/// is no such element.
pub(crate) fn without_first(doc: &[u8], key: &str) -> Result<Option<Vec<u8>>> {
    let mut out = Vec::with_capacity(doc.len());
    out.extend_from_slice(&[0; 4]);
    let mut removed = false;
    for element in RawIter::new(doc) {
        let element = element?;
        if !removed && element.key == key {
            removed = true;
            continue;
        }
        out.extend_from_slice(element.raw);
    }
    if !removed {
        return Ok(None);
    }
    out.push(0);
    finish_length(&mut out)?;
    Ok(Some(out))
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode `(key, value)` pairs, in order, into a complete document.
pub fn encode_document<I, K, V>(entries: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Borrow<Value>,
{
    let mut out = vec![0; 4];
    for (key, value) in entries {
        write_element(&mut out, key.as_ref(), value.borrow())?;
    }
    out.push(0);
    finish_length(&mut out)?;
    Ok(out)
}

/// Encode a slice of values as an array sub-document keyed `"0"`, `"1"`, ...
pub fn encode_array(items: &[Value]) -> Result<Vec<u8>> {
    encode_document(items.iter().enumerate().map(|(i, v)| (i.to_string(), v)))
}

/// Append one serialized element to `doc`, moving the terminator and
/// rewriting the length prefix. `doc` is untouched on error.
pub(crate) fn append_element(doc: &mut Vec<u8>, element: &[u8]) -> Result<()> {
    let size = doc.len() + element.len();
    if size > MAX_DOCUMENT_LEN {
        return Err(BsonError::DocumentTooLarge {
            size,
            max: MAX_DOCUMENT_LEN,
        });
    }
    doc.pop();
    doc.extend_from_slice(element);
    doc.push(0);
    finish_length(doc)
}

pub(crate) fn write_element(out: &mut Vec<u8>, key: &str, value: &Value) -> Result<()> {
    match value {
        Value::Null => write_header(out, ElementType::Null, key),
        Value::String(s) => write_string(out, key, s),
        Value::Number(n) => write_number(out, key, *n),
        Value::Boolean(b) => write_bool(out, key, *b),
        Value::Array(items) => write_array(out, key, items),
        Value::Object(doc) => write_document(out, key, doc.as_bytes()),
    }
}

pub(crate) fn write_number(out: &mut Vec<u8>, key: &str, n: f64) -> Result<()> {
    write_header(out, ElementType::Double, key)?;
    out.extend_from_slice(&n.to_le_bytes());
    Ok(())
}

pub(crate) fn write_string(out: &mut Vec<u8>, key: &str, s: &str) -> Result<()> {
    let len = i32::try_from(s.len() + 1).map_err(|_| BsonError::DocumentTooLarge {
        size: s.len() + 1,
        max: MAX_DOCUMENT_LEN,
    })?;
    write_header(out, ElementType::String, key)?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    Ok(())
}

pub(crate) fn write_bool(out: &mut Vec<u8>, key: &str, b: bool) -> Result<()> {
    write_header(out, ElementType::Boolean, key)?;
    out.push(u8::from(b));
    Ok(())
}

pub(crate) fn write_array(out: &mut Vec<u8>, key: &str, items: &[Value]) -> Result<()> {
    let array = encode_array(items)?;
    write_header(out, ElementType::Array, key)?;
    out.extend_from_slice(&array);
    Ok(())
}

pub(crate) fn write_document(out: &mut Vec<u8>, key: &str, doc: &[u8]) -> Result<()> {
    write_header(out, ElementType::Document, key)?;
    out.extend_from_slice(doc);
    Ok(())
}

fn write_header(out: &mut Vec<u8>, element_type: ElementType, key: &str) -> Result<()> {
    if key.as_bytes().contains(&0) {
        return Err(BsonError::InvalidKey(key.to_string()));
    }
    out.push(element_type.as_u8());
    out.extend_from_slice(key.as_bytes());
    out.push(0);
    Ok(())
}

fn finish_length(out: &mut [u8]) -> Result<()> {
    let len = i32::try_from(out.len()).map_err(|_| BsonError::DocumentTooLarge {
        size: out.len(),
        max: MAX_DOCUMENT_LEN,
    })?;
    out[..4].copy_from_slice(&len.to_le_bytes());
    Ok(())
}
