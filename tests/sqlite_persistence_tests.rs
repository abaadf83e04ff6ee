#![cfg(feature = "sqlite")]

use queue_desk::{ExclusionScope, ExclusionScopes, ScopeLevel, ScopeStore, SqliteScopeStore};
use tempfile::NamedTempFile;

#[test]
fn sqlite_store_round_trip_scopes() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteScopeStore::new(file.path()).unwrap();

    assert!(store.load_scopes().unwrap().is_none());

    let mut scopes = ExclusionScopes::default();
    scopes.set(
        ScopeLevel::Business,
        ExclusionScope::with_dates(["2024-12-25"]),
    );
    scopes.set(
        ScopeLevel::Queue,
        ExclusionScope::with_dates(["2024-12-24", "2024-12-31"]),
    );
    store.save_scopes(&scopes).expect("save scopes");

    let loaded = store
        .load_scopes()
        .expect("load scopes")
        .expect("scopes exist");
    assert_eq!(loaded, scopes);
    assert_eq!(
        loaded.collect_exclusion_dates(),
        vec!["2024-12-24", "2024-12-25", "2024-12-31"]
    );
}

#[test]
fn saving_replaces_previous_scopes() {
    let store = SqliteScopeStore::in_memory().unwrap();

    let mut first = ExclusionScopes::default();
    first.set(ScopeLevel::Commerce, ExclusionScope::with_dates(["2024-01-01"]));
    store.save_scopes(&first).unwrap();

    let mut second = ExclusionScopes::default();
    second.set(ScopeLevel::Business, ExclusionScope::with_dates(["2024-02-02"]));
    store.save_scopes(&second).unwrap();

    let loaded = store.load_scopes().unwrap().unwrap();
    assert!(loaded.commerce.is_none());
    assert_eq!(loaded, second);
}
