//! Growth of the watch tree as directories appear.

use pollwatch::events::Action;
use pollwatch::forest::WatchForest;
use pollwatch::types::{WatchId, WatchOptions};
use pollwatch_test_utils::builders::TempTree;
use pollwatch_test_utils::init_tracing;
use pollwatch_test_utils::recording::RecordingSink;

fn watch(tree: &TempTree, options: WatchOptions) -> (WatchForest, WatchId, RecordingSink) {
    init_tracing();
    let mut forest = WatchForest::new();
    let sink = RecordingSink::new();
    let id = forest
        .add_watch(tree.path(), Box::new(sink.clone()), options)
        .expect("registering watch");
    (forest, id, sink)
}

#[test]
fn new_subdirectory_is_seeded_and_its_content_reported() {
    let tree = TempTree::new();
    let (mut forest, id, sink) = watch(&tree, WatchOptions::recursive());

    tree.file("sub/f.txt", "payload");
    forest.poll();

    let events = sink.take();
    let names: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
    let sub_pos = names
        .iter()
        .position(|n| *n == "sub")
        .expect("Add for the new directory");
    let f_pos = names
        .iter()
        .position(|n| *n == "f.txt")
        .expect("Add for the file already inside it");
    assert!(sub_pos < f_pos, "parent Add precedes child content");
    assert!(events.iter().all(|e| e.action == Action::Add));

    let watched = forest.watched_paths(id).unwrap();
    assert!(watched.iter().any(|p| p.ends_with("sub")));
}

#[test]
fn deeply_nested_creation_is_reported_level_by_level() {
    let tree = TempTree::new();
    let (mut forest, id, sink) = watch(&tree, WatchOptions::recursive());

    tree.file("a/b/c/leaf.txt", "x");
    forest.poll();

    let adds = sink.names_for(Action::Add);
    assert_eq!(adds, vec!["a", "b", "c", "leaf.txt"]);
    assert_eq!(forest.watched_paths(id).unwrap().len(), 4);
}

#[test]
fn later_polls_keep_covering_grown_subtrees() {
    let tree = TempTree::new();
    let (mut forest, _id, sink) = watch(&tree, WatchOptions::recursive());

    tree.dir("sub");
    forest.poll();
    sink.take();

    tree.file("sub/late.txt", "y");
    forest.poll();

    assert_eq!(sink.names_for(Action::Add), vec!["late.txt"]);
}

#[test]
fn non_recursive_watch_sees_only_its_own_listing() {
    let tree = TempTree::new();
    let options = WatchOptions::default(); // recursive: false
    let (mut forest, id, sink) = watch(&tree, options);

    tree.file("sub/inner.txt", "x");
    forest.poll();

    let names: Vec<String> = sink.take().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["sub"], "only the directory entry is reported");
    assert_eq!(
        forest.watched_paths(id).unwrap().len(),
        1,
        "no child nodes grow on a non-recursive watch"
    );
}
