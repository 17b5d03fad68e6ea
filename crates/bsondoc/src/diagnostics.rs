//! Non-fatal diagnostics and the sinks that receive them.
//!
//! Strict accessors never fail loudly: a missing field or an impossible
//! coercion is masked behind a zero value and reported here instead. Every
//! [`Document`](crate::Document) carries a [`Diagnostics`] handle pointing at
//! the sink its host wired in; documents decoded out of it inherit the same
//! handle. The default handle forwards to the `tracing` facade.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::element::ElementType;
use crate::value::ValueKind;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Warning,
    Error,
}

/// A condition worth reporting that did not stop the operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A strict getter asked for a field that does not exist.
    FieldNotFound { field: String },
    /// A strict conversion was attempted between incompatible kinds.
    TypeMismatch {
        found: ValueKind,
        requested: ValueKind,
    },
    /// A field uses a wire type that has no `Value` counterpart; it was read as null.
    UnsupportedElement {
        key: String,
        element_type: ElementType,
    },
    /// A binary buffer could not be decoded; the empty document was used instead.
    DecodeFailed { message: String },
    /// JSON text could not be turned into a document; the empty document was used instead.
    JsonParseFailed { message: String },
    /// `set_field` was handed a null value, which has nothing to write.
    NullValueIgnored { field: String },
    /// A setter could not append its field; the document is unchanged.
    EncodeFailed { field: String, message: String },
    /// An embedded document was copied out of its parent.
    NestedDocumentCopied { field: String, size: usize },
}

impl Diagnostic {
    /// The severity a sink should log this diagnostic at.
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::NestedDocumentCopied { .. } => Severity::Debug,
            Diagnostic::FieldNotFound { .. }
            | Diagnostic::UnsupportedElement { .. }
            | Diagnostic::NullValueIgnored { .. } => Severity::Warning,
            Diagnostic::TypeMismatch { .. }
            | Diagnostic::DecodeFailed { .. }
            | Diagnostic::JsonParseFailed { .. }
            | Diagnostic::EncodeFailed { .. } => Severity::Error,
        }
    }

    /// Stable machine-readable identifier, emitted as a structured field.
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::FieldNotFound { .. } => "field_not_found",
            Diagnostic::TypeMismatch { .. } => "type_mismatch",
            Diagnostic::UnsupportedElement { .. } => "unsupported_element",
            Diagnostic::DecodeFailed { .. } => "decode_failed",
            Diagnostic::JsonParseFailed { .. } => "json_parse_failed",
            Diagnostic::NullValueIgnored { .. } => "null_value_ignored",
            Diagnostic::EncodeFailed { .. } => "encode_failed",
            Diagnostic::NestedDocumentCopied { .. } => "nested_document_copied",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::FieldNotFound { field } => write!(f, "field '{field}' was not found"),
            Diagnostic::TypeMismatch { found, requested } => {
                write!(f, "value of type '{found}' used as a '{requested}'")
            }
            Diagnostic::UnsupportedElement { key, element_type } => {
                write!(f, "unsupported element type {element_type} in field '{key}'")
            }
            Diagnostic::DecodeFailed { message } => write!(f, "failed to decode document: {message}"),
            Diagnostic::JsonParseFailed { message } => {
                write!(f, "failed to parse JSON document: {message}")
            }
            Diagnostic::NullValueIgnored { field } => {
                write!(f, "cannot set field '{field}' from a null value")
            }
            Diagnostic::EncodeFailed { field, message } => {
                write!(f, "cannot set field '{field}': {message}")
            }
            Diagnostic::NestedDocumentCopied { field, size } => {
                write!(f, "copied embedded document '{field}' ({size} bytes)")
            }
        }
    }
}

/// Receives diagnostics. Implemented for closures, so a host can pass
/// `|d: &Diagnostic| ...` directly.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Forwards diagnostics to `tracing` under the `bsondoc` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        let code = diagnostic.code();
        match diagnostic.severity() {
            Severity::Debug => tracing::debug!(target: "bsondoc", code, "{diagnostic}"),
            Severity::Warning => tracing::warn!(target: "bsondoc", code, "{diagnostic}"),
            Severity::Error => tracing::error!(target: "bsondoc", code, "{diagnostic}"),
        }
    }
}

/// Records every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything reported so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Drain the recorded diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(
            &mut *self
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic.clone());
    }
}

/// Cloneable handle to the sink a document reports into.
///
/// `Diagnostics::default()` routes to [`TracingSink`].
#[derive(Clone, Default)]
pub struct Diagnostics {
    sink: Option<Arc<dyn DiagnosticSink>>,
    muted: bool,
}

impl Diagnostics {
    /// Route diagnostics to `sink`.
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            sink: Some(sink),
            muted: false,
        }
    }

    /// Discard every diagnostic.
    pub fn silent() -> Self {
        Self::new(Arc::new(|_: &Diagnostic| {}))
    }

    /// A handle to the same sink that drops reports made through it.
    /// Documents read through a muted handle get the unmuted sink back.
    pub(crate) fn muted(&self) -> Self {
        Self {
            sink: self.sink.clone(),
            muted: true,
        }
    }

    pub(crate) fn unmuted(&self) -> Self {
        Self {
            sink: self.sink.clone(),
            muted: false,
        }
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        if self.muted {
            return;
        }
        match &self.sink {
            Some(sink) => sink.report(&diagnostic),
            None => TracingSink.report(&diagnostic),
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sink = if self.sink.is_some() { "custom" } else { "tracing" };
        f.debug_struct("Diagnostics")
            .field("sink", &sink)
            .field("muted", &self.muted)
            .finish()
    }
}
