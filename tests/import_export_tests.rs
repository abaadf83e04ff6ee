use queue_desk::{
    ExclusionScope, ExclusionScopes, PersistenceError, ScopeLevel, load_scopes_from_csv,
    load_scopes_from_json, save_scopes_to_csv, save_scopes_to_json,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn build_sample_scopes() -> ExclusionScopes {
    let mut scopes = ExclusionScopes::default();
    scopes.set(
        ScopeLevel::Business,
        ExclusionScope::with_dates(["2024-12-25", "2025-01-01"]),
    );
    scopes.set(
        ScopeLevel::Commerce,
        ExclusionScope::with_dates(["2024-11-15", "not-a-date"]),
    );
    scopes
}

#[test]
fn json_round_trip_preserves_scopes() {
    let scopes = build_sample_scopes();
    let file = NamedTempFile::new().unwrap();

    save_scopes_to_json(&scopes, file.path()).unwrap();
    let loaded = load_scopes_from_json(file.path()).unwrap();

    assert_eq!(loaded, scopes);
    assert_eq!(
        loaded.get(ScopeLevel::Commerce).unwrap().declared_dates(),
        ["2024-11-15", "not-a-date"]
    );
    assert!(loaded.queue.is_none());
}

#[test]
fn json_snapshot_uses_entity_field_names() {
    let scopes = build_sample_scopes();
    let file = NamedTempFile::new().unwrap();
    save_scopes_to_json(&scopes, file.path()).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
    assert_eq!(
        raw["scopes"]["business"]["serviceInfo"]["nonWorkingDates"][0],
        "2024-12-25"
    );
    assert!(raw["savedAt"]["seconds"].is_i64());
}

#[test]
fn csv_round_trip_preserves_dates() {
    let mut scopes = build_sample_scopes();
    scopes.set(ScopeLevel::Queue, ExclusionScope::with_dates(Vec::<String>::new()));
    let file = NamedTempFile::new().unwrap();

    save_scopes_to_csv(&scopes, file.path()).unwrap();
    let loaded = load_scopes_from_csv(file.path()).unwrap();

    assert_eq!(loaded, scopes);
    assert_eq!(
        loaded.collect_exclusion_dates(),
        vec!["2024-11-15", "2024-12-25", "2025-01-01"]
    );
}

#[test]
fn csv_reload_normalizes_scope_without_service_info() {
    let mut scopes = ExclusionScopes::default();
    scopes.set(ScopeLevel::Queue, ExclusionScope::default());
    let file = NamedTempFile::new().unwrap();

    save_scopes_to_csv(&scopes, file.path()).unwrap();
    let loaded = load_scopes_from_csv(file.path()).unwrap();

    assert_eq!(
        loaded.get(ScopeLevel::Queue),
        Some(&ExclusionScope::with_dates(Vec::<String>::new()))
    );
    assert!(loaded.business.is_none());
    assert_eq!(
        loaded.collect_exclusion_dates(),
        scopes.collect_exclusion_dates()
    );
}

#[test]
fn csv_with_unknown_scope_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "scope,date").unwrap();
    writeln!(file, "region,2024-12-25").unwrap();
    file.flush().unwrap();

    let err = load_scopes_from_csv(file.path()).unwrap_err();
    match err {
        PersistenceError::InvalidData(msg) => assert!(msg.contains("region")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_scopes_from_json(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, PersistenceError::Io(_)));
}
