//! Integration tests for the `bsondoc` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the encode, decode,
//! get, and stats subcommands through the actual binary, including stdin/stdout
//! piping of binary data, file I/O, decode limits, and error handling.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the sample.json fixture.
fn sample_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample.json")
}

/// Helper: path to the nested.json fixture (six levels of embedding).
fn nested_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/nested.json")
}

/// Helper: a scratch file path unique to one test.
fn temp_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("bsondoc-cli-{}-{name}", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

/// Helper: the `bsondoc` binary with logging configuration cleared.
fn bsondoc() -> Command {
    let mut cmd = Command::cargo_bin("bsondoc").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Helper: encode a JSON fixture and return the binary document.
fn encode_file(path: &str) -> Vec<u8> {
    bsondoc()
        .args(["encode", "-i", path])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone()
}

/// Helper: `{x: 1.0, x: 2.0}` with the key repeated.
fn duplicate_key_document() -> Vec<u8> {
    let mut bytes = vec![27, 0, 0, 0];
    for n in [1.0f64, 2.0] {
        bytes.extend_from_slice(&[0x01, b'x', 0]);
        bytes.extend_from_slice(&n.to_le_bytes());
    }
    bytes.push(0);
    bytes
}

const SAMPLE_RELAXED: &str = concat!(
    r#"{"name":"Alice","age":30.0,"active":true,"tags":["a","b"],"#,
    r#""address":{"city":"Paris","zip":"75001"},"scores":[1.5,2.0,null]}"#
);

// ─────────────────────────────────────────────────────────────────────────────
// Encode subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn encode_stdin_to_stdout() {
    let output = bsondoc()
        .arg("encode")
        .write_stdin(r#"{"a":1}"#)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(
        output,
        vec![16, 0, 0, 0, 0x01, b'a', 0, 0, 0, 0, 0, 0, 0, 0xF0, 0x3F, 0]
    );
}

#[test]
fn encode_file_to_file() {
    let output_path = temp_path("encode-output.bson");

    bsondoc()
        .args(["encode", "-i", sample_json_path(), "-o"])
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let bytes = std::fs::read(&output_path).expect("output file must exist");
    let declared = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    assert_eq!(declared as usize, bytes.len());
    assert_eq!(bytes.last(), Some(&0));

    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn encode_invalid_json_fails() {
    bsondoc()
        .arg("encode")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to encode JSON input"));
}

#[test]
fn encode_non_object_fails() {
    bsondoc()
        .arg("encode")
        .write_stdin("[1, 2, 3]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be an object"));
}

#[test]
fn encode_missing_file_fails() {
    bsondoc()
        .args(["encode", "-i", "/nonexistent/input.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Decode subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn decode_relaxed_roundtrip() {
    let bytes = encode_file(sample_json_path());
    bsondoc()
        .args(["decode", "--relaxed"])
        .write_stdin(bytes)
        .assert()
        .success()
        .stdout(SAMPLE_RELAXED);
}

#[test]
fn decode_defaults_to_canonical() {
    let bytes = encode_file(sample_json_path());
    bsondoc()
        .arg("decode")
        .write_stdin(bytes)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""age":{"$numberDouble":"30.0"}"#))
        .stdout(predicate::str::contains(r#""name":"Alice""#));
}

#[test]
fn decode_explicit_canonical_matches_default() {
    let bytes = encode_file(sample_json_path());
    let default = bsondoc()
        .arg("decode")
        .write_stdin(bytes.clone())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    bsondoc()
        .args(["decode", "--canonical"])
        .write_stdin(bytes)
        .assert()
        .success()
        .stdout(default);
}

#[test]
fn decode_file_to_file() {
    let input_path = temp_path("decode-input.bson");
    let output_path = temp_path("decode-output.json");
    std::fs::write(&input_path, encode_file(sample_json_path())).unwrap();

    bsondoc()
        .args(["decode", "--relaxed", "-i"])
        .arg(&input_path)
        .arg("-o")
        .arg(&output_path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&output_path).expect("output file must exist");
    assert_eq!(content, SAMPLE_RELAXED);

    let _ = std::fs::remove_file(&input_path);
    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn decode_output_is_valid_json() {
    let bytes = encode_file(sample_json_path());
    let output = bsondoc()
        .args(["decode", "--relaxed"])
        .write_stdin(bytes.clone())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let relaxed: serde_json::Value =
        serde_json::from_slice(&output).expect("relaxed output is valid JSON");
    assert_eq!(relaxed["address"]["city"], "Paris");
    assert_eq!(relaxed["scores"][2], serde_json::Value::Null);
    assert_eq!(relaxed["age"].as_f64(), Some(30.0));

    let output = bsondoc()
        .arg("decode")
        .write_stdin(bytes)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let canonical: serde_json::Value =
        serde_json::from_slice(&output).expect("canonical output is valid JSON");
    assert_eq!(canonical["age"]["$numberDouble"], "30.0");
    assert_eq!(canonical["scores"][0]["$numberDouble"], "1.5");
}

#[test]
fn decode_keeps_duplicate_keys() {
    bsondoc()
        .args(["decode", "--relaxed"])
        .write_stdin(duplicate_key_document())
        .assert()
        .success()
        .stdout(r#"{"x":1.0,"x":2.0}"#);
}

#[test]
fn decode_corrupt_input_fails() {
    bsondoc()
        .arg("decode")
        .write_stdin(vec![9u8, 0, 0, 0, 0x08, b't', 0, 7, 0])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to decode binary document"))
        .stderr(predicate::str::contains("invalid boolean"));
}

#[test]
fn decode_truncated_input_fails() {
    let mut bytes = encode_file(sample_json_path());
    bytes.truncate(bytes.len() / 2);
    bsondoc()
        .arg("decode")
        .write_stdin(bytes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("length prefix"));
}

#[test]
fn decode_warns_about_unsupported_elements() {
    // int32 field "n" = 5
    let bytes = vec![12u8, 0, 0, 0, 0x10, b'n', 0, 5, 0, 0, 0, 0];
    bsondoc()
        .args(["decode", "--relaxed"])
        .write_stdin(bytes)
        .assert()
        .success()
        .stdout(r#"{"n":null}"#)
        .stderr(predicate::str::contains("unsupported element type"));
}

#[test]
fn relaxed_and_canonical_conflict() {
    bsondoc()
        .args(["decode", "--relaxed", "--canonical"])
        .write_stdin(vec![5u8, 0, 0, 0, 0])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Decode limits
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn max_depth_rejects_deep_documents_on_decode() {
    let bytes = encode_file(nested_json_path());
    bsondoc()
        .args(["--max-depth", "5", "decode"])
        .write_stdin(bytes.clone())
        .assert()
        .failure()
        .stderr(predicate::str::contains("nesting depth exceeds the maximum of 5"));

    bsondoc()
        .args(["decode", "--max-depth", "6"])
        .write_stdin(bytes)
        .assert()
        .success();
}

#[test]
fn max_depth_applies_to_encode() {
    bsondoc()
        .args(["--max-depth", "3", "encode", "-i", nested_json_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to encode JSON input"))
        .stderr(predicate::str::contains("nesting depth exceeds the maximum of 3"));
}

#[test]
fn max_depth_applies_to_json_input() {
    for subcommand in [&["get", "level1"][..], &["stats"][..]] {
        bsondoc()
            .args(["--max-depth", "3"])
            .args(subcommand)
            .args(["--json", "-i", nested_json_path()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to parse JSON input"))
            .stderr(predicate::str::contains("nesting depth exceeds the maximum of 3"));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Get subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn get_field_from_binary() {
    let bytes = encode_file(sample_json_path());
    bsondoc()
        .args(["get", "name"])
        .write_stdin(bytes.clone())
        .assert()
        .success()
        .stdout("\"Alice\"\n");

    bsondoc()
        .args(["get", "address", "--relaxed"])
        .write_stdin(bytes)
        .assert()
        .success()
        .stdout("{\"city\":\"Paris\",\"zip\":\"75001\"}\n");
}

#[test]
fn get_field_from_json() {
    bsondoc()
        .args(["get", "age", "--json", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout("{\"$numberDouble\":\"30.0\"}\n");
}

#[test]
fn get_returns_first_duplicate() {
    bsondoc()
        .args(["get", "x", "--relaxed"])
        .write_stdin(duplicate_key_document())
        .assert()
        .success()
        .stdout("1.0\n");
}

#[test]
fn get_missing_field_fails() {
    bsondoc()
        .args(["get", "nope", "--json", "-i", sample_json_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Field not found: 'nope'"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Stats subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn stats_on_json_input() {
    bsondoc()
        .args(["stats", "--json", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fields:          6"))
        .stdout(predicate::str::contains("Distinct keys:   6"))
        .stdout(predicate::str::contains("Nesting depth:   1"))
        .stdout(predicate::str::contains("Binary size:"))
        .stdout(predicate::str::contains("Canonical JSON:"));
}

#[test]
fn stats_counts_duplicates_and_depth() {
    bsondoc()
        .arg("stats")
        .write_stdin(duplicate_key_document())
        .assert()
        .success()
        .stdout(predicate::str::contains("Fields:          2"))
        .stdout(predicate::str::contains("Distinct keys:   1"))
        .stdout(predicate::str::contains("Binary size:     27 bytes"));

    bsondoc()
        .args(["stats", "--json", "-i", nested_json_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nesting depth:   6"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging and help
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn verbose_flag_enables_debug_logging() {
    let bytes = encode_file(sample_json_path());
    bsondoc()
        .args(["-v", "decode"])
        .write_stdin(bytes.clone())
        .assert()
        .success()
        .stderr(predicate::str::contains("decoded document"));

    bsondoc()
        .arg("decode")
        .write_stdin(bytes)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn help_lists_subcommands() {
    bsondoc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("encode"))
        .stdout(predicate::str::contains("decode"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn missing_subcommand_fails() {
    bsondoc().assert().failure();
}
