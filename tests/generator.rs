//! Generator Tests
//!
//! Artifact writing, unchanged detection, dry runs and metadata overrides
//! against a temporary output root.

use std::fs;
use std::path::Path;

use glove80_layouts::spec::ErrorCode;
use glove80_layouts::{
    generate_layouts, ComposeError, Composer, GenerateError, GenerateOptions, MetadataTable,
};
use serde_json::{json, Value};
use tempfile::TempDir;

fn options(root: &Path, family: &str) -> GenerateOptions {
    GenerateOptions {
        families: vec![family.to_string()],
        output_root: root.to_path_buf(),
        ..GenerateOptions::default()
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_generate_writes_artifacts() {
    let dir = TempDir::new().unwrap();
    let composer = Composer::builtin().unwrap();

    let results = generate_layouts(&composer, &options(dir.path(), "default")).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].variant, "factory_default");
    assert_eq!(results[1].variant, "factory_default_macos");

    for result in &results {
        assert!(result.changed);
        assert!(result.destination.starts_with(dir.path()));
        let written = read_json(&result.destination);
        let expected = composer.build_value("default", &result.variant).unwrap();
        assert_eq!(written, expected);
    }
}

#[test]
fn test_written_artifact_is_pretty_json() {
    let dir = TempDir::new().unwrap();
    let composer = Composer::builtin().unwrap();
    let mut opts = options(dir.path(), "quantum_touch");
    opts.variant = Some("default".to_string());

    let results = generate_layouts(&composer, &opts).unwrap();
    let contents = fs::read_to_string(&results[0].destination).unwrap();
    assert!(contents.starts_with("{\n  \"keyboard\": \"glove80\""));
}

#[test]
fn test_second_run_is_unchanged() {
    let dir = TempDir::new().unwrap();
    let composer = Composer::builtin().unwrap();
    let opts = options(dir.path(), "tailorkey");

    generate_layouts(&composer, &opts).unwrap();
    let results = generate_layouts(&composer, &opts).unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| !r.changed));
}

#[test]
fn test_key_order_does_not_count_as_change() {
    let dir = TempDir::new().unwrap();
    let composer = Composer::builtin().unwrap();
    let mut opts = options(dir.path(), "default");
    opts.variant = Some("factory_default".to_string());

    let first = generate_layouts(&composer, &opts).unwrap();
    let path = &first[0].destination;

    // Same content, keys reversed
    let Value::Object(map) = read_json(path) else {
        panic!("artifact is not an object");
    };
    let reversed: serde_json::Map<String, Value> = map.into_iter().rev().collect();
    fs::write(path, serde_json::to_string(&Value::Object(reversed)).unwrap()).unwrap();

    let second = generate_layouts(&composer, &opts).unwrap();
    assert!(!second[0].changed);
}

#[test]
fn test_dry_run_detects_stale_without_writing() {
    let dir = TempDir::new().unwrap();
    let composer = Composer::builtin().unwrap();
    let mut opts = options(dir.path(), "default");
    opts.dry_run = true;

    let results = generate_layouts(&composer, &opts).unwrap();
    assert!(results.iter().all(|r| r.changed));
    assert!(results.iter().all(|r| !r.destination.exists()));

    opts.dry_run = false;
    generate_layouts(&composer, &opts).unwrap();

    // Edit one artifact by hand
    let path = &results[0].destination;
    let mut edited = read_json(path);
    edited["title"] = json!("hand edited");
    fs::write(path, serde_json::to_string_pretty(&edited).unwrap()).unwrap();

    opts.dry_run = true;
    let results = generate_layouts(&composer, &opts).unwrap();
    assert!(results[0].changed);
    assert!(!results[1].changed);
    assert_eq!(read_json(path)["title"], "hand edited");
}

#[test]
fn test_digest_matches_composer() {
    let dir = TempDir::new().unwrap();
    let composer = Composer::builtin().unwrap();
    let mut opts = options(dir.path(), "tailorkey");
    opts.variant = Some("dual".to_string());

    let results = generate_layouts(&composer, &opts).unwrap();
    let digest = composer.build("tailorkey", "dual").unwrap().digest().unwrap();
    assert_eq!(results[0].digest, digest);
}

#[test]
fn test_unknown_variant_lists_metadata_variants() {
    let dir = TempDir::new().unwrap();
    let composer = Composer::builtin().unwrap();
    let mut opts = options(dir.path(), "tailorkey");
    opts.variant = Some("linux".to_string());

    match generate_layouts(&composer, &opts) {
        Err(GenerateError::Compose(ComposeError::UnknownVariant { available, .. })) => {
            assert_eq!(available, vec!["windows", "mac", "dual"]);
        }
        other => panic!("unexpected result: {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_metadata_override() {
    let dir = TempDir::new().unwrap();
    let composer = Composer::builtin().unwrap();
    let builtin = MetadataTable::builtin().unwrap();
    let original = builtin.get("default", "factory_default").unwrap();

    let mut entry = serde_json::to_value(original).unwrap();
    entry["title"] = json!("Custom build");
    entry["output"] = json!("custom/factory.json");
    let metadata_path = dir.path().join("metadata.json");
    fs::write(
        &metadata_path,
        serde_json::to_string(&json!({"factory_default": entry})).unwrap(),
    )
    .unwrap();

    let mut opts = options(dir.path(), "default");
    opts.metadata_path = Some(metadata_path);

    let results = generate_layouts(&composer, &opts).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].destination, dir.path().join("custom/factory.json"));
    assert_eq!(read_json(&results[0].destination)["title"], "Custom build");
}

#[test]
fn test_metadata_override_with_bad_uuid() {
    let dir = TempDir::new().unwrap();
    let composer = Composer::builtin().unwrap();
    let metadata_path = dir.path().join("metadata.json");
    fs::write(
        &metadata_path,
        r#"{"factory_default": {"output": "x.json", "uuid": "not-a-uuid"}}"#,
    )
    .unwrap();

    let mut opts = options(dir.path(), "default");
    opts.metadata_path = Some(metadata_path);

    let err = generate_layouts(&composer, &opts).unwrap_err();
    assert!(matches!(err, GenerateError::Metadata(_)));
    assert_eq!(err.code(), ErrorCode::ValidationError);
}

#[test]
fn test_invalid_existing_artifact() {
    let dir = TempDir::new().unwrap();
    let composer = Composer::builtin().unwrap();
    let mut opts = options(dir.path(), "default");
    opts.variant = Some("factory_default".to_string());

    let results = generate_layouts(&composer, &opts).unwrap();
    fs::write(&results[0].destination, "{ not json").unwrap();

    let err = generate_layouts(&composer, &opts).unwrap_err();
    assert!(matches!(err, GenerateError::InvalidArtifact { .. }));
    assert_eq!(err.code(), ErrorCode::JsonError);
}
