//! Wire-format element type tags.
//!
//! Every entry in a document starts with a one-byte tag. Only a handful of
//! tags map onto a [`Value`](crate::Value) kind; the rest are still known to
//! the codec so their payload can be measured and skipped without losing the
//! position of the following entry.

/// How many payload bytes follow the key of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PayloadRule {
    /// A fixed number of bytes.
    Fixed(usize),
    /// `int32` length (including the trailing NUL), bytes, NUL.
    String,
    /// A complete embedded document whose first 4 bytes are its total length.
    Document,
    /// `int32` byte count, one subtype byte, then the bytes.
    Binary,
    /// Two consecutive NUL-terminated strings (pattern, options).
    TwoCStrings,
    /// A length-prefixed string followed by a 12-byte ObjectId.
    StringThenFixed(usize),
    /// `int32` total length covering a string and a document.
    LengthPrefixed,
}

/// Every element type defined by the binary document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Undefined = 0x06,
    ObjectId = 0x07,
    Boolean = 0x08,
    DateTime = 0x09,
    Null = 0x0A,
    Regex = 0x0B,
    DbPointer = 0x0C,
    JavaScript = 0x0D,
    Symbol = 0x0E,
    JavaScriptWithScope = 0x0F,
    Int32 = 0x10,
    Timestamp = 0x11,
    Int64 = 0x12,
    Decimal128 = 0x13,
    MaxKey = 0x7F,
    MinKey = 0xFF,
}

impl ElementType {
    /// Map a raw tag byte to its element type, or `None` for bytes the
    /// format does not define.
    pub fn from_u8(tag: u8) -> Option<Self> {
        let ty = match tag {
            0x01 => Self::Double,
            0x02 => Self::String,
            0x03 => Self::Document,
            0x04 => Self::Array,
            0x05 => Self::Binary,
            0x06 => Self::Undefined,
            0x07 => Self::ObjectId,
            0x08 => Self::Boolean,
            0x09 => Self::DateTime,
            0x0A => Self::Null,
            0x0B => Self::Regex,
            0x0C => Self::DbPointer,
            0x0D => Self::JavaScript,
            0x0E => Self::Symbol,
            0x0F => Self::JavaScriptWithScope,
            0x10 => Self::Int32,
            0x11 => Self::Timestamp,
            0x12 => Self::Int64,
            0x13 => Self::Decimal128,
            0x7F => Self::MaxKey,
            0xFF => Self::MinKey,
            _ => return None,
        };
        Some(ty)
    }

    /// The raw tag byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::String => "string",
            Self::Document => "document",
            Self::Array => "array",
            Self::Binary => "binary",
            Self::Undefined => "undefined",
            Self::ObjectId => "objectId",
            Self::Boolean => "bool",
            Self::DateTime => "date",
            Self::Null => "null",
            Self::Regex => "regex",
            Self::DbPointer => "dbPointer",
            Self::JavaScript => "javascript",
            Self::Symbol => "symbol",
            Self::JavaScriptWithScope => "javascriptWithScope",
            Self::Int32 => "int",
            Self::Timestamp => "timestamp",
            Self::Int64 => "long",
            Self::Decimal128 => "decimal",
            Self::MaxKey => "maxKey",
            Self::MinKey => "minKey",
        }
    }

    /// Whether this element type materializes into a [`Value`](crate::Value)
    /// without loss. Everything else decodes to `Null` plus a diagnostic.
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            Self::Double
                | Self::String
                | Self::Document
                | Self::Array
                | Self::Boolean
                | Self::Null
        )
    }

    pub(crate) fn payload_rule(self) -> PayloadRule {
        match self {
            Self::Double | Self::DateTime | Self::Timestamp | Self::Int64 => PayloadRule::Fixed(8),
            Self::Int32 => PayloadRule::Fixed(4),
            Self::Boolean => PayloadRule::Fixed(1),
            Self::ObjectId => PayloadRule::Fixed(12),
            Self::Decimal128 => PayloadRule::Fixed(16),
            Self::Undefined | Self::Null | Self::MaxKey | Self::MinKey => PayloadRule::Fixed(0),
            Self::String | Self::JavaScript | Self::Symbol => PayloadRule::String,
            Self::Document | Self::Array => PayloadRule::Document,
            Self::Binary => PayloadRule::Binary,
            Self::Regex => PayloadRule::TwoCStrings,
            Self::DbPointer => PayloadRule::StringThenFixed(12),
            Self::JavaScriptWithScope => PayloadRule::LengthPrefixed,
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:#04x})", self.name(), self.as_u8())
    }
}
