//! Symlink handling end-to-end: cycles terminate, nothing is watched twice,
//! and the link policy decides what may be followed at all.
#![cfg(unix)]

use std::collections::HashSet;
use std::path::PathBuf;

use pollwatch::events::Action;
use pollwatch::forest::WatchForest;
use pollwatch::types::{LinkPolicy, WatchOptions};
use pollwatch_test_utils::builders::TempTree;
use pollwatch_test_utils::init_tracing;
use pollwatch_test_utils::recording::RecordingSink;

fn follow_links() -> WatchOptions {
    WatchOptions {
        recursive: true,
        link_policy: LinkPolicy {
            follow_symlinks: true,
            allow_out_of_root: false,
        },
        ..WatchOptions::default()
    }
}

#[test]
fn cyclic_links_terminate_population() {
    let tree = TempTree::new();
    tree.dir("sub");
    tree.symlink_dir(".", "sub/back-to-root");
    tree.symlink_dir("sub", "sub/self-ish");

    init_tracing();
    let mut forest = WatchForest::new();
    let sink = RecordingSink::new();
    let id = forest
        .add_watch(tree.path(), Box::new(sink.clone()), follow_links())
        .expect("registration must terminate despite the cycle");

    let watched = forest.watched_paths(id).unwrap();
    let unique: HashSet<&PathBuf> = watched.iter().collect();
    assert_eq!(watched.len(), unique.len(), "no duplicate watches");
    assert_eq!(watched.len(), 2, "only the root and sub are watched");
}

#[test]
fn followed_link_watches_the_target_once() {
    let tree = TempTree::new();
    tree.file("real/data.txt", "x");
    tree.symlink_dir("real", "alias");

    init_tracing();
    let mut forest = WatchForest::new();
    let sink = RecordingSink::new();
    let id = forest
        .add_watch(tree.path(), Box::new(sink.clone()), follow_links())
        .unwrap();

    // Either the plain dir or the link won the race for the target, never
    // both.
    let watched = forest.watched_paths(id).unwrap();
    let real = std::fs::canonicalize(tree.join("real")).unwrap();
    assert_eq!(
        watched.iter().filter(|p| **p == real).count(),
        1,
        "target watched exactly once: {watched:?}"
    );

    // A change under the target is reported once, not mirrored.
    tree.file("real/new.txt", "y");
    forest.poll();
    assert_eq!(sink.names_for(Action::Add), vec!["new.txt"]);
}

#[test]
fn out_of_root_links_follow_policy() {
    let outside = TempTree::new();
    outside.file("escape/secret.txt", "s");
    let escape_abs = outside.join("escape");

    let tree = TempTree::new();
    tree.symlink_dir(escape_abs.to_str().unwrap(), "jump");

    init_tracing();

    // Default policy keeps the watch inside its root.
    let mut forest = WatchForest::new();
    let sink = RecordingSink::new();
    let id = forest
        .add_watch(tree.path(), Box::new(sink.clone()), follow_links())
        .unwrap();
    let watched = forest.watched_paths(id).unwrap();
    assert_eq!(watched.len(), 1, "escape target must not be watched");
    assert!(forest.stats(id).unwrap().guard_rejections >= 1);

    // Opting in follows the link out.
    let mut permissive = follow_links();
    permissive.link_policy.allow_out_of_root = true;
    let mut forest2 = WatchForest::new();
    let sink2 = RecordingSink::new();
    let id2 = forest2
        .add_watch(tree.path(), Box::new(sink2.clone()), permissive)
        .unwrap();
    let watched2 = forest2.watched_paths(id2).unwrap();
    let escape_real = std::fs::canonicalize(&escape_abs).unwrap();
    assert!(watched2.contains(&escape_real), "got {watched2:?}");
}

#[test]
fn link_into_a_sibling_watch_is_not_duplicated() {
    let tree = TempTree::new();
    tree.file("first/data/f.txt", "x");
    tree.dir("second");
    tree.symlink_dir("first/data", "second/alias");

    init_tracing();
    let mut forest = WatchForest::new();

    let sink_first = RecordingSink::new();
    forest
        .add_watch(
            tree.join("first").as_path(),
            Box::new(sink_first.clone()),
            follow_links(),
        )
        .unwrap();

    let mut permissive = follow_links();
    permissive.link_policy.allow_out_of_root = true;
    let sink_second = RecordingSink::new();
    let id_second = forest
        .add_watch(
            tree.join("second").as_path(),
            Box::new(sink_second.clone()),
            permissive,
        )
        .unwrap();

    let data_real = std::fs::canonicalize(tree.join("first/data")).unwrap();
    let watched_second = forest.watched_paths(id_second).unwrap();
    assert!(
        !watched_second.contains(&data_real),
        "second watch must not re-watch the first watch's subtree"
    );

    // The change is reported by the watch that owns the directory, once.
    tree.file("first/data/new.txt", "y");
    forest.poll();
    assert_eq!(sink_first.names_for(Action::Add), vec!["new.txt"]);
    assert!(sink_second.names_for(Action::Add).is_empty());
}

#[test]
fn unfollowed_link_removal_is_a_tolerated_orphan() {
    let tree = TempTree::new();
    tree.dir("real");
    tree.dir("holder");

    // Links are not followed by default, so no node ever exists for the
    // alias; removing it later exercises the tolerated-orphan path.
    init_tracing();
    let mut forest = WatchForest::new();
    let sink = RecordingSink::new();
    let id = forest
        .add_watch(tree.path(), Box::new(sink.clone()), WatchOptions::recursive())
        .unwrap();

    tree.symlink_dir("real", "holder/alias");
    forest.poll();
    assert_eq!(sink.names_for(Action::Add), vec!["alias"]);
    sink.take();
    assert_eq!(forest.stats(id).unwrap().guard_rejections, 1);

    tree.remove("holder/alias");
    forest.poll();

    let deletes = sink.names_for(Action::Delete);
    assert_eq!(deletes, vec!["alias"]);
    let stats = forest.stats(id).unwrap();
    assert_eq!(stats.orphan_removals, 1, "miss is counted, not swallowed");
}
