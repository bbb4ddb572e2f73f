//! Tests for DocumentStore format detection and round-trips through disk

use std::collections::BTreeMap;

use extman_fs::{DocumentStore, Error};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use tempfile::tempdir;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Policy {
    allow_remote: bool,
    patterns: Vec<String>,
}

#[rstest]
#[case("policy.json")]
#[case("policy.toml")]
fn save_then_load_preserves_document(#[case] file_name: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(file_name);
    let policy = Policy {
        allow_remote: false,
        patterns: vec!["^https://github\\.com/acme/.*".to_string()],
    };

    DocumentStore::new().save(&path, &policy).unwrap();
    let loaded: Policy = DocumentStore::new().load(&path).unwrap();

    assert_eq!(loaded, policy);
}

#[test]
fn load_if_exists_returns_none_for_missing_file() {
    let dir = tempdir().unwrap();
    let loaded: Option<BTreeMap<String, bool>> = DocumentStore::new()
        .load_if_exists(&dir.path().join("absent.json"))
        .unwrap();
    assert!(loaded.is_none());
}

#[test]
fn malformed_json_reports_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = DocumentStore::new()
        .load::<BTreeMap<String, bool>>(&path)
        .unwrap_err();
    assert!(matches!(err, Error::Parse { ref format, .. } if format == "JSON"));
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let err = DocumentStore::new()
        .save(&dir.path().join("doc.ini"), &BTreeMap::<String, bool>::new())
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
}

#[test]
fn missing_file_error_is_not_found() {
    let dir = tempdir().unwrap();
    let err = DocumentStore::new()
        .load::<BTreeMap<String, bool>>(&dir.path().join("absent.json"))
        .unwrap_err();
    assert!(err.is_not_found());
}
