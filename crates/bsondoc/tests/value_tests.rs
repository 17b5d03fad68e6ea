use std::sync::Arc;

use bsondoc::{CollectingSink, Diagnostic, Diagnostics, Document, Value, ValueKind};

/// Helper: a diagnostics handle whose reports can be inspected afterwards.
fn collecting() -> (Arc<CollectingSink>, Diagnostics) {
    let sink = Arc::new(CollectingSink::new());
    let diagnostics = Diagnostics::new(sink.clone());
    (sink, diagnostics)
}

fn s(text: &str) -> Value {
    Value::from(text)
}

// ============================================================================
// Kinds
// ============================================================================

#[test]
fn kind_matches_variant() {
    assert_eq!(Value::Null.kind(), ValueKind::Null);
    assert_eq!(s("x").kind(), ValueKind::String);
    assert_eq!(Value::Number(1.0).kind(), ValueKind::Number);
    assert_eq!(Value::Boolean(true).kind(), ValueKind::Boolean);
    assert_eq!(Value::Array(vec![]).kind(), ValueKind::Array);
    assert_eq!(Value::Object(Document::new()).kind(), ValueKind::Object);
}

#[test]
fn default_value_is_null() {
    assert!(Value::default().is_null());
}

#[test]
fn from_option_none_is_null() {
    assert!(Value::from(None::<f64>).is_null());
    assert_eq!(Value::from(Some(2.0)), Value::Number(2.0));
}

// ============================================================================
// Exact kind matches
// ============================================================================

#[test]
fn exact_matches_do_not_coerce() {
    assert_eq!(Value::Number(2.5).try_get_number(), Some(2.5));
    assert_eq!(s("hello").try_get_string().as_deref(), Some("hello"));
    assert_eq!(Value::Boolean(false).try_get_bool(), Some(false));
    let items = vec![Value::Number(1.0)];
    assert_eq!(Value::Array(items.clone()).try_get_array(), Some(&items[..]));
}

// ============================================================================
// String → Number
// ============================================================================

#[test]
fn numeric_string_converts_to_number() {
    assert_eq!(s("42").try_get_number(), Some(42.0));
    assert_eq!(s("-12.5").try_get_number(), Some(-12.5));
    assert_eq!(s("+3").try_get_number(), Some(3.0));
    assert_eq!(s(".5").try_get_number(), Some(0.5));
    assert_eq!(s("7.").try_get_number(), Some(7.0));
}

#[test]
fn non_numeric_string_does_not_convert() {
    assert_eq!(s("abc").try_get_number(), None);
    assert_eq!(s("").try_get_number(), None);
    assert_eq!(s("-").try_get_number(), None);
    assert_eq!(s(".").try_get_number(), None);
    assert_eq!(s("1.2.3").try_get_number(), None);
    assert_eq!(s("1e5").try_get_number(), None);
    assert_eq!(s(" 42").try_get_number(), None);
    assert_eq!(s("42abc").try_get_number(), None);
    assert_eq!(s("NaN").try_get_number(), None);
}

// ============================================================================
// String → Boolean
// ============================================================================

#[test]
fn string_to_bool_words() {
    assert_eq!(s("true").try_get_bool(), Some(true));
    assert_eq!(s("TRUE").try_get_bool(), Some(true));
    assert_eq!(s("Yes").try_get_bool(), Some(true));
    assert_eq!(s("on").try_get_bool(), Some(true));
    assert_eq!(s("false").try_get_bool(), Some(false));
    assert_eq!(s("off").try_get_bool(), Some(false));
}

#[test]
fn string_to_bool_numbers_and_garbage() {
    assert_eq!(s("1").try_get_bool(), Some(true));
    assert_eq!(s("2").try_get_bool(), Some(true));
    assert_eq!(s("-3").try_get_bool(), Some(true));
    assert_eq!(s("0").try_get_bool(), Some(false));
    assert_eq!(s("000").try_get_bool(), Some(false));
    assert_eq!(s("abc").try_get_bool(), Some(false));
    assert_eq!(s("").try_get_bool(), Some(false));
}

// ============================================================================
// Number / Boolean cross-coercion
// ============================================================================

#[test]
fn number_to_bool_is_false_only_for_zero() {
    assert_eq!(Value::Number(0.0).try_get_bool(), Some(false));
    assert_eq!(Value::Number(-0.0).try_get_bool(), Some(false));
    assert_eq!(Value::Number(0.001).try_get_bool(), Some(true));
    assert_eq!(Value::Number(-7.0).try_get_bool(), Some(true));
}

#[test]
fn number_to_string_is_shortest_roundtrip() {
    assert_eq!(Value::Number(30.0).try_get_string().as_deref(), Some("30"));
    assert_eq!(Value::Number(0.1).try_get_string().as_deref(), Some("0.1"));
    assert_eq!(Value::Number(-2.5).try_get_string().as_deref(), Some("-2.5"));
    assert_eq!(
        Value::Number(f64::INFINITY).try_get_string().as_deref(),
        Some("Infinity")
    );
}

#[test]
fn bool_to_number_and_string() {
    assert_eq!(Value::Boolean(true).try_get_number(), Some(1.0));
    assert_eq!(Value::Boolean(false).try_get_number(), Some(0.0));
    assert_eq!(Value::Boolean(true).try_get_string().as_deref(), Some("true"));
    assert_eq!(Value::Boolean(false).try_get_string().as_deref(), Some("false"));
}

// ============================================================================
// Kinds that never coerce
// ============================================================================

#[test]
fn containers_never_coerce() {
    for value in [Value::Array(vec![s("1")]), Value::Object(Document::new())] {
        assert_eq!(value.try_get_number(), None);
        assert_eq!(value.try_get_string(), None);
        assert_eq!(value.try_get_bool(), None);
    }
    assert!(Value::Array(vec![]).try_get_object().is_none());
    assert!(Value::Object(Document::new()).try_get_array().is_none());
}

#[test]
fn null_never_coerces() {
    let null = Value::Null;
    assert_eq!(null.try_get_number(), None);
    assert_eq!(null.try_get_string(), None);
    assert_eq!(null.try_get_bool(), None);
    assert!(null.try_get_array().is_none());
    assert!(null.try_get_object().is_none());
}

// ============================================================================
// Integer narrowing
// ============================================================================

#[test]
fn i32_rounds_half_away_from_zero() {
    assert_eq!(Value::Number(2.5).try_get_i32(), Some(3));
    assert_eq!(Value::Number(-2.5).try_get_i32(), Some(-3));
    assert_eq!(Value::Number(2.4).try_get_i32(), Some(2));
    assert_eq!(Value::Number(-2.4).try_get_i32(), Some(-2));
}

#[test]
fn i32_range_is_checked_after_rounding() {
    assert_eq!(Value::Number(2147483647.4).try_get_i32(), Some(i32::MAX));
    assert_eq!(Value::Number(2147483647.6).try_get_i32(), None);
    assert_eq!(Value::Number(-2147483648.4).try_get_i32(), Some(i32::MIN));
    assert_eq!(Value::Number(-2147483648.6).try_get_i32(), None);
    assert_eq!(Value::Number(f64::NAN).try_get_i32(), None);
}

#[test]
fn u32_rejects_negative_numbers() {
    assert_eq!(Value::Number(-1.0).try_get_u32(), None);
    assert_eq!(Value::Number(-0.4).try_get_u32(), Some(0));
    assert_eq!(Value::Number(4294967295.0).try_get_u32(), Some(u32::MAX));
    assert_eq!(Value::Number(4294967296.0).try_get_u32(), None);
}

#[test]
fn i64_range_excludes_two_to_the_63() {
    assert_eq!(Value::Number(9007199254740992.0).try_get_i64(), Some(1 << 53));
    assert_eq!(Value::Number(9.3e18).try_get_i64(), None);
    assert_eq!(Value::Number(-9223372036854775808.0).try_get_i64(), Some(i64::MIN));
    assert_eq!(Value::Number(9223372036854775808.0).try_get_i64(), None);
}

#[test]
fn integer_narrowing_follows_number_coercion() {
    assert_eq!(s("42").try_get_i32(), Some(42));
    assert_eq!(s("abc").try_get_i32(), None);
    assert_eq!(Value::Boolean(true).try_get_i64(), Some(1));
    assert_eq!(Value::Null.try_get_u32(), None);
}

// ============================================================================
// Strict accessors
// ============================================================================

#[test]
fn strict_accessors_return_values_without_diagnostics() {
    let (sink, diagnostics) = collecting();
    assert_eq!(s("42").as_number(&diagnostics), 42.0);
    assert_eq!(Value::Number(1.5).as_string(&diagnostics), "1.5");
    assert!(Value::Number(3.0).as_bool(&diagnostics));
    assert!(sink.is_empty());
}

#[test]
fn strict_accessors_report_type_mismatch() {
    let (sink, diagnostics) = collecting();
    assert_eq!(s("abc").as_number(&diagnostics), 0.0);
    assert_eq!(
        sink.take(),
        vec![Diagnostic::TypeMismatch {
            found: ValueKind::String,
            requested: ValueKind::Number,
        }]
    );
}

#[test]
fn strict_accessors_on_null_return_zero_values() {
    let (sink, diagnostics) = collecting();
    let null = Value::Null;
    assert_eq!(null.as_number(&diagnostics), 0.0);
    assert_eq!(null.as_string(&diagnostics), "");
    assert!(!null.as_bool(&diagnostics));
    assert!(null.as_array(&diagnostics).is_empty());
    assert!(null.as_object(&diagnostics).is_empty());

    let requested: Vec<ValueKind> = sink
        .take()
        .into_iter()
        .map(|d| match d {
            Diagnostic::TypeMismatch { found, requested } => {
                assert_eq!(found, ValueKind::Null);
                requested
            }
            other => panic!("unexpected diagnostic: {other:?}"),
        })
        .collect();
    assert_eq!(
        requested,
        vec![
            ValueKind::Number,
            ValueKind::String,
            ValueKind::Boolean,
            ValueKind::Array,
            ValueKind::Object,
        ]
    );
}

#[test]
fn as_object_borrows_on_match() {
    let (sink, diagnostics) = collecting();
    let mut doc = Document::new();
    doc.set_bool_field("flag", true);
    let value = Value::Object(doc.clone());
    assert_eq!(*value.as_object(&diagnostics), doc);
    assert!(sink.is_empty());
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn equality_requires_same_kind() {
    assert_ne!(Value::Number(1.0), Value::Boolean(true));
    assert_ne!(s("1"), Value::Number(1.0));
    assert_ne!(Value::Null, Value::Array(vec![]));
    assert_eq!(Value::Null, Value::Null);
}

#[test]
fn scalar_equality_by_value() {
    assert_eq!(s("a"), s("a"));
    assert_ne!(s("a"), s("b"));
    assert_eq!(Value::Number(0.0), Value::Number(-0.0));
    assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
}

#[test]
fn array_equality_is_positional() {
    let ab = Value::Array(vec![s("a"), s("b")]);
    let ba = Value::Array(vec![s("b"), s("a")]);
    let abc = Value::Array(vec![s("a"), s("b"), s("c")]);
    assert_eq!(ab, ab.clone());
    assert_ne!(ab, ba);
    assert_ne!(ab, abc);
}

#[test]
fn object_equality_is_insertion_order_sensitive() {
    let mut first = Document::new();
    first.set_number_field("x", 1.0);
    first.set_number_field("y", 2.0);

    let mut second = Document::new();
    second.set_number_field("y", 2.0);
    second.set_number_field("x", 1.0);

    assert!(!Value::compare_equal(
        &Value::Object(first.clone()),
        &Value::Object(second)
    ));
    assert!(Value::compare_equal(
        &Value::Object(first.clone()),
        &Value::Object(first)
    ));
}

#[test]
fn object_equality_sees_duplicate_patterns() {
    let mut single = Document::new();
    single.set_number_field("x", 1.0);

    let mut duplicated = single.clone();
    duplicated.set_number_field("x", 2.0);

    assert_eq!(duplicated.get_number_field("x"), single.get_number_field("x"));
    assert_ne!(Value::Object(single), Value::Object(duplicated));
}
