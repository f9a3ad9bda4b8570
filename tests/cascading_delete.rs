//! Deletion cascades: removing a watched subtree reports everything that was
//! watched inside it, not just the top entry.

use pollwatch::events::Action;
use pollwatch::forest::WatchForest;
use pollwatch::types::WatchOptions;
use pollwatch_test_utils::builders::TempTree;
use pollwatch_test_utils::init_tracing;
use pollwatch_test_utils::recording::RecordingSink;

fn watch(tree: &TempTree) -> (WatchForest, RecordingSink) {
    init_tracing();
    let mut forest = WatchForest::new();
    let sink = RecordingSink::new();
    forest
        .add_watch(tree.path(), Box::new(sink.clone()), WatchOptions::recursive())
        .expect("registering watch");
    (forest, sink)
}

#[test]
fn removing_a_subtree_reports_file_and_directory() {
    let tree = TempTree::new();
    tree.file("sub/leaf.txt", "x");

    let (mut forest, sink) = watch(&tree);

    tree.remove("sub");
    forest.poll();

    let deletes = sink.names_for(Action::Delete);
    assert!(deletes.contains(&"sub".to_string()), "got {deletes:?}");
    assert!(deletes.contains(&"leaf.txt".to_string()), "got {deletes:?}");

    let events = sink.take();
    let sub_pos = events.iter().position(|e| e.name == "sub").unwrap();
    let leaf_pos = events.iter().position(|e| e.name == "leaf.txt").unwrap();
    assert!(
        sub_pos < leaf_pos,
        "the directory's own event precedes the cascade"
    );
}

#[test]
fn deep_removal_reports_every_watched_entry() {
    let tree = TempTree::new();
    tree.file("top/one.txt", "1");
    tree.file("top/mid/two.txt", "2");
    tree.file("top/mid/low/three.txt", "3");

    let (mut forest, sink) = watch(&tree);

    tree.remove("top");
    forest.poll();

    let mut deletes = sink.names_for(Action::Delete);
    deletes.sort();
    assert_eq!(
        deletes,
        vec!["low", "mid", "one.txt", "three.txt", "top", "two.txt"]
    );
}

#[test]
fn second_poll_after_removal_is_quiet() {
    let tree = TempTree::new();
    tree.file("sub/leaf.txt", "x");

    let (mut forest, sink) = watch(&tree);

    tree.remove("sub");
    forest.poll();
    sink.take();

    forest.poll();
    assert!(sink.is_empty());
}

#[test]
fn cancelling_a_watch_emits_nothing() {
    let tree = TempTree::new();
    tree.file("sub/leaf.txt", "x");

    init_tracing();
    let mut forest = WatchForest::new();
    let sink = RecordingSink::new();
    let id = forest
        .add_watch(tree.path(), Box::new(sink.clone()), WatchOptions::recursive())
        .unwrap();

    forest.remove_watch(id).unwrap();

    assert!(sink.is_empty());
    assert_eq!(forest.watch_count(), 0);
    assert!(!forest.path_in_watches(tree.path()));
}
