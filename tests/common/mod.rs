//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::PathBuf;

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to an input manifest fixture.
pub fn input_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("inputs").join(name)
}

/// Get the path to an expected output fixture.
pub fn output_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("outputs").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Parse manifest text into a JSON value for structural assertions.
pub fn parse(content: &str) -> serde_json::Value {
    serde_json::from_str(content).expect("Patched manifest is not valid JSON")
}

/// A compact manifest with a single dependency.
pub fn single_dependency(name: &str, value: &str) -> String {
    serde_json::json!({ "dependencies": { name: value } }).to_string()
}
