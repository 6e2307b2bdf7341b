use super::*;
use crate::test_helpers::ProbeStorage;

#[test]
fn write_then_read_returns_token() {
    let store = PersistentTokenStore::new(ExecutionContext::Interactive, ProbeStorage::new());
    store.write("T");
    assert_eq!(store.read().as_deref(), Some("T"));
}

#[test]
fn write_overwrites_previous_token() {
    let backend = ProbeStorage::new();
    let store = PersistentTokenStore::new(ExecutionContext::Interactive, backend.clone());
    store.write("first");
    store.write("second");
    assert_eq!(store.read().as_deref(), Some("second"));
    assert_eq!(backend.get_item(TOKEN_KEY).unwrap().as_deref(), Some("second"));
}

#[test]
fn clear_removes_token() {
    let store = PersistentTokenStore::new(ExecutionContext::Interactive, ProbeStorage::new());
    store.write("T");
    store.clear();
    assert_eq!(store.read(), None);
}

#[test]
fn clones_share_the_same_slot() {
    let store = PersistentTokenStore::new(ExecutionContext::Interactive, ProbeStorage::new());
    let other = store.clone();
    store.write("T");
    assert_eq!(other.read().as_deref(), Some("T"));
}

#[test]
fn empty_stored_value_reads_as_absent() {
    let backend = ProbeStorage::new();
    backend.set_item(TOKEN_KEY, "").unwrap();
    let store = PersistentTokenStore::new(ExecutionContext::Interactive, backend);
    assert_eq!(store.read(), None);
}

#[test]
fn empty_write_is_ignored() {
    let store = PersistentTokenStore::new(ExecutionContext::Interactive, ProbeStorage::new());
    store.write("T");
    store.write("");
    assert_eq!(store.read().as_deref(), Some("T"));
}

// =============================================================
// Prerender context
// =============================================================

#[test]
fn prerender_never_touches_backend() {
    let backend = ProbeStorage::new();
    let store = PersistentTokenStore::new(ExecutionContext::Prerender, backend.clone());
    store.write("T");
    assert_eq!(store.read(), None);
    store.clear();
    assert_eq!(backend.calls(), 0);
}

#[test]
fn prerender_reads_absent_even_when_backend_has_token() {
    let backend = ProbeStorage::new();
    backend.set_item(TOKEN_KEY, "T").unwrap();
    let store = PersistentTokenStore::new(ExecutionContext::Prerender, backend);
    assert_eq!(store.read(), None);
}

// =============================================================
// Backend failures
// =============================================================

#[test]
fn failing_backend_degrades_to_absent() {
    let backend = ProbeStorage::failing();
    let store = PersistentTokenStore::new(ExecutionContext::Interactive, backend.clone());
    store.write("T");
    assert_eq!(store.read(), None);
    store.clear();
    assert_eq!(backend.calls(), 3);
}

#[test]
fn debug_output_omits_backend_contents() {
    let store = PersistentTokenStore::new(ExecutionContext::Interactive, ProbeStorage::new());
    store.write("secret-token");
    let rendered = format!("{store:?}");
    assert!(rendered.contains("Interactive"));
    assert!(!rendered.contains("secret-token"));
}
