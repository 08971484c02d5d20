//! Repository seam behavior as the materializer relies on it.

use std::sync::Arc;

use foliate::{
    WriteSession,
    path::PathBuf,
    repository::{InMemory, Repository},
};

use crate::helpers::*;

#[test]
fn session_writes_become_visible_only_after_commit() {
    let repo = repo_with_dialog(false);
    let cache = PathBuf::normalize("/var/cache/entry");

    let mut session = WriteSession::open(repo.clone() as Arc<dyn Repository>).unwrap();
    let mut ancestor = PathBuf::root();
    for component in cache.components() {
        ancestor = ancestor.join(component);
        session.ensure_node(&ancestor, "sling:Folder").unwrap();
    }
    session.set_property(&cache, "jcr:title", "Entry");

    assert!(!repo.exists(&cache).unwrap());
    session.commit().unwrap();
    assert!(repo.exists(&cache).unwrap());
    assert_eq!(
        repo.get(&cache).unwrap().property("jcr:title"),
        Some(&foliate::Value::Text("Entry".into()))
    );
}

#[test]
fn unleased_writers_fall_back_to_store_conflict_semantics() {
    // Two sessions prepared against the same empty path: without a lease
    // the repository's conflict error is the last line of defense.
    let repo = repo_with_dialog(false);
    let contested = PathBuf::normalize("/var/contested");

    let mut first = WriteSession::open(repo.clone() as Arc<dyn Repository>).unwrap();
    first.ensure_node(&contested, "sling:Folder").unwrap();
    let mut second = WriteSession::open(repo.clone() as Arc<dyn Repository>).unwrap();
    second.ensure_node(&contested, "sling:Folder").unwrap();

    first.commit().unwrap();
    let err = second.commit().unwrap_err();
    assert!(err.is_persistence_failure());
    assert!(repo.exists(&contested).unwrap());
}

#[test]
fn materialized_trees_survive_a_save_load_cycle() {
    let repo = repo_with_dialog(true);
    let (materializer, _clock) = materializer(repo.clone());
    let target = materializer
        .resolve_include(&path(SOURCE_PATH), &context())
        .unwrap()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("content.json");
    repo.save_to_file(&file).unwrap();

    let reloaded = InMemory::load_from_file(&file).unwrap();
    assert_eq!(reloaded.get(&target).unwrap(), repo.get(&target).unwrap());
}
