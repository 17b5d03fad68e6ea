//! The `Value` tree and its coercion rules.
//!
//! A [`Value`] is exactly one of null, string, number, boolean, array or
//! object. Two families of accessors read it as a particular kind:
//!
//! - **Try** accessors (`try_get_*`) return `None` when the value cannot be
//!   read as the requested kind, and report nothing.
//! - **Strict** accessors (`as_*`) always return something. On failure they
//!   hand back the kind's zero value and report a
//!   [`Diagnostic::TypeMismatch`] to the supplied [`Diagnostics`].
//!
//! An exact kind match never coerces. Mismatched scalars coerce as follows:
//!
//! | From → To | Rule |
//! |---|---|
//! | String → Number | only if the text is a plain decimal (`-12`, `+3.5`, `.5`) |
//! | String → Boolean | `true`/`yes`/`on` (any case) are true, otherwise a non-zero leading integer |
//! | Number → Boolean | false iff exactly `0.0` |
//! | Number → String | shortest round-trip decimal |
//! | Boolean → Number | `1.0` / `0.0` |
//! | Boolean → String | `"true"` / `"false"` |
//!
//! Arrays, objects and null never coerce.

use std::borrow::Cow;
use std::fmt;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::document::Document;

/// The kind of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "Null",
            ValueKind::String => "String",
            ValueKind::Number => "Number",
            ValueKind::Boolean => "Boolean",
            ValueKind::Array => "Array",
            ValueKind::Object => "Object",
        };
        f.write_str(name)
    }
}

/// One node of a document tree.
///
/// Arrays own their elements and objects own their [`Document`] outright;
/// cloning a `Value` deep-copies everything beneath it.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Number(f64),
    Boolean(bool),
    Array(Vec<Value>),
    Object(Document),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::String(_) => ValueKind::String,
            Value::Number(_) => ValueKind::Number,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    // ------------------------------------------------------------------
    // Try accessors
    // ------------------------------------------------------------------

    /// Read as a double, coercing strings and booleans.
    pub fn try_get_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => parse_numeric(s),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Read as an `i32`, rounding half away from zero. Fails if the rounded
    /// number does not fit.
    pub fn try_get_i32(&self) -> Option<i32> {
        let rounded = self.try_get_number()?.round();
        (rounded >= i32::MIN as f64 && rounded <= i32::MAX as f64).then_some(rounded as i32)
    }

    /// Read as a `u32`, rounding half away from zero. Fails if the rounded
    /// number does not fit.
    pub fn try_get_u32(&self) -> Option<u32> {
        let rounded = self.try_get_number()?.round();
        (rounded >= 0.0 && rounded <= u32::MAX as f64).then_some(rounded as u32)
    }

    /// Read as an `i64`, rounding half away from zero. Fails if the rounded
    /// number does not fit.
    pub fn try_get_i64(&self) -> Option<i64> {
        let rounded = self.try_get_number()?.round();
        // i64::MAX is not representable as f64; 2^63 is the first value out of range.
        let upper = -(i64::MIN as f64);
        (rounded >= i64::MIN as f64 && rounded < upper).then_some(rounded as i64)
    }

    /// Read as text, coercing numbers and booleans.
    pub fn try_get_string(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(format_number(*n))),
            Value::Boolean(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Read as a boolean, coercing strings and numbers.
    pub fn try_get_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Number(n) => Some(*n != 0.0),
            Value::String(s) => Some(parse_bool_text(s)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn try_get_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn try_get_object(&self) -> Option<&Document> {
        match self {
            Value::Object(doc) => Some(doc),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Strict accessors
    // ------------------------------------------------------------------

    /// Read as a double, or `0.0` plus a diagnostic.
    pub fn as_number(&self, diagnostics: &Diagnostics) -> f64 {
        self.try_get_number()
            .unwrap_or_else(|| self.mismatch(ValueKind::Number, diagnostics))
    }

    /// Read as text, or `""` plus a diagnostic.
    pub fn as_string(&self, diagnostics: &Diagnostics) -> String {
        match self.try_get_string() {
            Some(s) => s.into_owned(),
            None => self.mismatch(ValueKind::String, diagnostics),
        }
    }

    /// Read as a boolean, or `false` plus a diagnostic.
    pub fn as_bool(&self, diagnostics: &Diagnostics) -> bool {
        self.try_get_bool()
            .unwrap_or_else(|| self.mismatch(ValueKind::Boolean, diagnostics))
    }

    /// Borrow as an array, or an empty slice plus a diagnostic.
    pub fn as_array(&self, diagnostics: &Diagnostics) -> &[Value] {
        match self.try_get_array() {
            Some(items) => items,
            None => {
                self.mismatch::<()>(ValueKind::Array, diagnostics);
                &[]
            }
        }
    }

    /// Borrow as an object, or an empty document plus a diagnostic.
    pub fn as_object(&self, diagnostics: &Diagnostics) -> Cow<'_, Document> {
        match self.try_get_object() {
            Some(doc) => Cow::Borrowed(doc),
            None => {
                self.mismatch::<()>(ValueKind::Object, diagnostics);
                Cow::Owned(Document::new().with_diagnostics(diagnostics.clone()))
            }
        }
    }

    fn mismatch<T: Default>(&self, requested: ValueKind, diagnostics: &Diagnostics) -> T {
        diagnostics.report(Diagnostic::TypeMismatch {
            found: self.kind(),
            requested,
        });
        T::default()
    }

    // ------------------------------------------------------------------
    // Equality
    // ------------------------------------------------------------------

    /// Kind-strict equality.
    ///
    /// Scalars compare by value and arrays element-wise. Objects compare by
    /// their encoded bytes, so the same fields inserted in a different order
    /// (or with different duplicates) are *not* equal.
    pub fn compare_equal(lhs: &Value, rhs: &Value) -> bool {
        match (lhs, rhs) {
            (Value::Null, Value::Null) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Value::compare_equal(x, y))
            }
            (Value::Object(a), Value::Object(b)) => a.compare(b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        Value::compare_equal(self, other)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Shortest decimal text that parses back to the same double.
///
/// Non-finite values use the spellings the extended-JSON forms use.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{n}")
    }
}

/// Parse `s` as a number only if it is a plain decimal: an optional sign,
/// digits, and at most one `.`. Exponents and whitespace are rejected.
fn parse_numeric(s: &str) -> Option<f64> {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let mut seen_dot = false;
    let mut seen_digit = false;
    for b in unsigned.bytes() {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
    }
    if !seen_digit {
        return None;
    }
    s.parse().ok()
}

/// Boolean reading of free text: the words `true`, `yes` and `on` (any
/// case) are true, `false`, `no` and `off` are false, anything else is true
/// iff it starts with a non-zero integer.
fn parse_bool_text(s: &str) -> bool {
    let t = s.trim();
    if ["true", "yes", "on"].iter().any(|w| t.eq_ignore_ascii_case(w)) {
        return true;
    }
    if ["false", "no", "off"].iter().any(|w| t.eq_ignore_ascii_case(w)) {
        return false;
    }
    let digits = t.strip_prefix(['+', '-']).unwrap_or(t);
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .any(|b| b != b'0')
}
