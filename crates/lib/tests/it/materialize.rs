//! Include resolution, breakpoint expansion and invalidation.

use std::sync::Arc;
use std::thread;

use foliate::{
    IncludeConfig, Materializer, Node, RequestContext, Value,
    constants::{
        PN_DESCRIPTION, PN_LAST_MODIFIED, PN_LOOP, PN_NAME, PN_RESOURCE_TYPE, PN_TITLE,
    },
    repository::Repository,
};

use crate::helpers::*;

fn suffixed_children<'a>(node: &'a Node, stem: &str) -> Vec<&'a Node> {
    node.children()
        .iter()
        .filter(|c| c.name() != stem && c.name().starts_with(stem))
        .collect()
}

#[test]
fn resolves_to_derived_cache_path() {
    let repo = repo_with_dialog(false);
    let (materializer, _clock) = materializer(repo);

    assert_eq!(
        materializer.include_path(&path(MOUNTED_SOURCE_PATH)).as_str(),
        TARGET_PATH
    );
    // The same source served without the override mount derives the same key
    assert_eq!(
        materializer.include_path(&path(SOURCE_PATH)).as_str(),
        TARGET_PATH
    );
}

#[test]
fn no_loop_tree_materializes_one_verbatim_copy() {
    let repo = repo_with_dialog(false);
    let (materializer, _clock) = materializer(repo.clone());

    let target = materializer
        .resolve_include(&path(MOUNTED_SOURCE_PATH), &context())
        .unwrap()
        .expect("a tree must exist at the target");
    assert_eq!(target.as_str(), TARGET_PATH);

    let source = repo.get(&path(SOURCE_PATH)).unwrap();
    let copy = repo.get(&target).unwrap();

    // Children are structurally identical to the source, in order
    assert_eq!(copy.children(), source.children());

    // Root carries all source properties plus the stamps
    for (name, value) in source.properties() {
        assert_eq!(copy.property(name), Some(value));
    }
    assert!(copy.has_property(PN_LAST_MODIFIED));
    assert_eq!(
        copy.property(PN_RESOURCE_TYPE),
        Some(&Value::Text("dx/structure/tabs".into()))
    );
}

#[test]
fn loop_marked_node_fans_out_per_breakpoint() {
    let repo = repo_with_dialog(true);
    let (materializer, _clock) = materializer(repo.clone());

    let target = materializer
        .resolve_include(&path(MOUNTED_SOURCE_PATH), &context())
        .unwrap()
        .unwrap();
    let copy = repo.get(&target).unwrap();

    let expanded = suffixed_children(&copy, "tabs");
    let names: Vec<_> = expanded.iter().map(|c| c.name()).collect();
    // One sibling per breakpoint, in supplied order
    assert_eq!(names, vec!["tabsMobile", "tabsTablet", "tabsDesktop"]);

    for tier in &expanded {
        // Each copy owns the full authored child set
        let child_names: Vec<_> = tier.children().iter().map(Node::name).collect();
        assert_eq!(child_names, vec!["general", "style"]);
    }
}

#[test]
fn expansion_labels_and_suffixes_names() {
    let repo = repo_with_dialog(true);
    let (materializer, _clock) = materializer(repo.clone());

    let target = materializer
        .resolve_include(&path(MOUNTED_SOURCE_PATH), &context())
        .unwrap()
        .unwrap();
    let copy = repo.get(&target).unwrap();

    let mobile = copy.child("tabsMobile").unwrap();
    // The breakpoint label becomes the generated root's title
    assert_eq!(mobile.property(PN_TITLE), Some(&Value::Text("Mobile".into())));
    // The name property is suffixed so siblings stay addressable
    assert_eq!(mobile.property(PN_NAME), Some(&Value::Text("tabsMobile".into())));
    // ...and so are copied descendants' names, while other properties
    // copy verbatim
    let general = mobile.child("general").unwrap();
    assert_eq!(
        general.property(PN_NAME),
        Some(&Value::Text("generalMobile".into()))
    );
    assert_eq!(
        general.property("sling:orderBefore"),
        Some(&Value::Text("style".into()))
    );
    assert_eq!(
        mobile.property(PN_DESCRIPTION),
        Some(&Value::Text("Tab container".into()))
    );
}

#[test]
fn empty_breakpoint_sequence_expands_to_nothing() {
    let repo = repo_with_dialog(true);
    let (materializer, _clock) = materializer(repo.clone());

    let target = materializer
        .resolve_include(&path(SOURCE_PATH), &RequestContext::default())
        .unwrap()
        .unwrap();
    let copy = repo.get(&target).unwrap();

    assert!(suffixed_children(&copy, "tabs").is_empty());
    // The plain copy of the subtree is still there
    assert!(copy.has_child("general"));
    assert!(copy.has_child("style"));
}

#[test]
fn nested_markers_expand_at_outermost_level_only() {
    let repo = {
        let mut root = Node::new("", "rep:root");
        let mut tabs = dialog_node(true);
        // A marked descendant of a marked ancestor
        tabs.child_mut("general").unwrap().set_property(PN_LOOP, true);
        root.ensure_child("apps", "sling:Folder")
            .ensure_child("dx", "sling:Folder")
            .ensure_child("component", "nt:folder")
            .ensure_child("cq:dialog", "nt:unstructured")
            .ensure_child("content", "nt:unstructured")
            .ensure_child("items", "nt:unstructured")
            .push_child(tabs);
        Arc::new(foliate::repository::InMemory::with_root(root))
    };
    let (materializer, _clock) = materializer(repo.clone());

    let target = materializer
        .resolve_include(&path(SOURCE_PATH), &context())
        .unwrap()
        .unwrap();
    let copy = repo.get(&target).unwrap();

    for tier in suffixed_children(&copy, "tabs") {
        let general = tier.child("general").unwrap();
        // Expanded once at the ancestor; the descendant's marker does not
        // multiply the copies again
        assert!(suffixed_children(general, "general").is_empty());
        assert_eq!(general.children().len(), 0);
    }
}

#[test]
fn second_resolution_reuses_the_cached_tree() {
    let repo = repo_with_dialog(true);
    let (materializer, clock) = materializer(repo.clone());

    let first = materializer
        .resolve_include(&path(SOURCE_PATH), &context())
        .unwrap()
        .unwrap();
    let snapshot = repo.get(&first).unwrap();

    clock.advance(60_000);
    let second = materializer
        .resolve_include(&path(SOURCE_PATH), &context())
        .unwrap()
        .unwrap();

    assert_eq!(first, second);
    // Not restamped, not rewritten
    assert_eq!(repo.get(&second).unwrap(), snapshot);
}

#[test]
fn cache_hit_does_not_consult_the_source() {
    let repo = repo_with_dialog(false);
    let (materializer, _clock) = materializer(repo.clone());

    materializer
        .resolve_include(&path(SOURCE_PATH), &context())
        .unwrap()
        .unwrap();

    // Authored content disappears; the cached tree still serves
    let mut removal = foliate::repository::ChangeSet::new();
    removal.remove_tree(path(SOURCE_PATH));
    repo.apply(removal).unwrap();

    let target = materializer
        .resolve_include(&path(SOURCE_PATH), &context())
        .unwrap();
    assert_eq!(target.unwrap().as_str(), TARGET_PATH);
}

#[test]
fn missing_source_is_not_found() {
    let repo = repo_with_dialog(false);
    let (materializer, _clock) = materializer(repo);

    let err = materializer
        .resolve_include(&path("/apps/dx/component/cq:dialog/missing"), &context())
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn sources_outside_dialog_roots_are_refused() {
    let repo = repo_with_dialog(false);
    let (materializer, _clock) = materializer(repo.clone());

    let err = materializer
        .resolve_include(&path("/libs/other/component"), &context())
        .unwrap_err();
    assert!(!err.is_not_found());
    assert_eq!(err.module(), "materialize");
    // Nothing was written under the cache root
    assert!(
        !repo
            .exists(&path("/var/dx/admin/responsiveinclude/libs"))
            .unwrap()
    );
}

#[test]
fn persistence_failure_leaves_no_partial_tree() {
    let repo = repo_with_dialog(true);
    let (materializer, _clock) = materializer(repo.clone());

    repo.fail_next_apply();
    let resolved = materializer
        .resolve_include(&path(SOURCE_PATH), &context())
        .unwrap();
    assert!(resolved.is_none());
    assert!(!repo.exists(&path(TARGET_PATH)).unwrap());

    // The failure is transient; the next request rebuilds
    let resolved = materializer
        .resolve_include(&path(SOURCE_PATH), &context())
        .unwrap();
    assert_eq!(resolved.unwrap().as_str(), TARGET_PATH);
}

#[test]
fn refused_write_session_degrades_to_empty() {
    let repo = repo_with_dialog(true);
    let (materializer, _clock) = materializer(repo.clone());

    repo.deny_sessions(true);
    let resolved = materializer
        .resolve_include(&path(SOURCE_PATH), &context())
        .unwrap();
    assert!(resolved.is_none());
    assert!(!repo.exists(&path(TARGET_PATH)).unwrap());
}

#[test]
fn invalidate_removes_wholesale_and_rebuild_is_lazy() {
    let repo = repo_with_dialog(false);
    let (materializer, _clock) = materializer(repo.clone());

    materializer
        .resolve_include(&path(SOURCE_PATH), &context())
        .unwrap()
        .unwrap();

    // The authored tree changes; the cache is now stale
    let mut edit = foliate::repository::ChangeSet::new();
    edit.set_property(path(SOURCE_PATH), PN_DESCRIPTION, "Edited");
    repo.apply(edit).unwrap();

    assert!(materializer.invalidate(&path(MOUNTED_SOURCE_PATH)).unwrap());
    assert!(!repo.exists(&path(TARGET_PATH)).unwrap());
    // Invalidating an absent entry is a no-op
    assert!(!materializer.invalidate(&path(SOURCE_PATH)).unwrap());

    let rebuilt = materializer
        .resolve_include(&path(SOURCE_PATH), &context())
        .unwrap()
        .unwrap();
    assert_eq!(
        repo.get(&rebuilt).unwrap().property(PN_DESCRIPTION),
        Some(&Value::Text("Edited".into()))
    );
}

#[test]
fn concurrent_first_requests_serialize_on_the_lease() {
    let repo = repo_with_dialog(true);
    let clock = Arc::new(foliate::FixedClock::default());
    let materializer = Arc::new(
        Materializer::with_clock(repo.clone(), IncludeConfig::default(), clock).unwrap(),
    );

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let materializer = Arc::clone(&materializer);
            thread::spawn(move || {
                materializer
                    .resolve_include(&path(MOUNTED_SOURCE_PATH), &context())
                    .unwrap()
                    .unwrap()
            })
        })
        .collect();

    for worker in workers {
        assert_eq!(worker.join().unwrap().as_str(), TARGET_PATH);
    }

    // One coherent tree, not interleaved duplicates
    let copy = repo.get(&path(TARGET_PATH)).unwrap();
    let names: Vec<_> = suffixed_children(&copy, "tabs")
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["tabsMobile", "tabsTablet", "tabsDesktop"]);
}
