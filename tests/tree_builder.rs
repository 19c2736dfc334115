use rstest::rstest;
use serde_json::json;

use config_request::{
    encode, Arg, BuildOptions, ConfigTree, ErrorKind, NodeId, TreeOptions, ValueData,
};

fn child_keys(tree: &ConfigTree<'_>, parent: NodeId) -> Vec<String> {
    tree.children(parent)
        .map(|child| tree.key(child).unwrap_or_default().to_string())
        .collect()
}

#[rstest]
fn builds_siblings_in_argument_order() {
    let mut tree = ConfigTree::new();
    let root = tree.root();
    tree.make_nodes(
        root,
        None,
        &[
            Arg::str("k1=%s", "v1"),
            Arg::int("k2=%d", 2),
            Arg::str("k3=%s", "v3"),
        ],
    )
    .unwrap();
    assert_eq!(child_keys(&tree, root), ["k1", "k2", "k3"]);
}

#[rstest]
fn size_and_name_end_to_end() {
    let tree = config_request::to_tree(&[Arg::int("size=%d", 100), Arg::str("name=%s", "vg0")])
        .unwrap();
    let first = tree.first_child(tree.root()).unwrap();
    assert_eq!(tree.key(first), Some("size"));
    assert_eq!(tree.value(first), Some(&ValueData::Int(100)));

    let second = tree.next_sibling(first).unwrap();
    assert_eq!(tree.key(second), Some("name"));
    assert_eq!(tree.as_str(second), Some("vg0"));
    assert_eq!(tree.next_sibling(second), None);
    assert_eq!(tree.parent(second), Some(tree.root()));
}

#[rstest]
#[case::long("lsize=%ld", 1 << 40)]
#[case::long_long("llsize=%lld", -7)]
fn accepts_wide_integer_markers(#[case] tag: &str, #[case] value: i64) {
    let tree = config_request::to_tree(&[Arg::int(tag, value)]).unwrap();
    let node = tree.first_child(tree.root()).unwrap();
    assert_eq!(tree.as_int(node), Some(value));
}

#[rstest]
fn second_run_lands_after_existing_children() {
    let mut tree = ConfigTree::new();
    let root = tree.root();
    let first = tree
        .make_nodes(root, None, &[Arg::int("a=%d", 1), Arg::int("d=%d", 4)])
        .unwrap()
        .unwrap();
    tree.make_nodes(root, Some(first), &[Arg::int("b=%d", 2), Arg::int("c=%d", 3)])
        .unwrap();
    tree.make_nodes(root, None, &[Arg::int("e=%d", 5)]).unwrap();
    assert_eq!(child_keys(&tree, root), ["a", "b", "c", "d", "e"]);
}

#[rstest]
fn builds_under_nested_section() {
    let mut tree = ConfigTree::new();
    let root = tree.root();
    let section = tree.make_config_node("physical_volumes", root, None).unwrap();
    let pv = tree.make_config_node("pv0", section, None).unwrap();
    tree.make_nodes(pv, None, &[Arg::str("id=%s", "abc"), Arg::int("dev_size=%d", 2048)])
        .unwrap();

    let id = tree.find_node(root, "physical_volumes/pv0/id").unwrap();
    assert_eq!(tree.as_str(id), Some("abc"));
    assert_eq!(
        encode::to_string(&tree).unwrap(),
        "physical_volumes {\n\tpv0 {\n\t\tid=\"abc\"\n\t\tdev_size=2048\n\t}\n}\n"
    );
}

#[rstest]
fn splices_a_cloned_subtree() {
    let mut metadata = ConfigTree::new();
    let meta_root = metadata.root();
    metadata
        .make_nodes(meta_root, None, &[Arg::str("id=%s", "vg-uuid"), Arg::int("seqno=%d", 9)])
        .unwrap();

    let mut request = ConfigTree::new();
    let root = request.root();
    request
        .make_nodes(
            root,
            None,
            &[
                Arg::str("request=%s", "vg_update"),
                Arg::tree("metadata=%t", &metadata),
                Arg::int("token=%d", 1),
            ],
        )
        .unwrap();

    assert_eq!(child_keys(&request, root), ["request", "metadata", "token"]);
    let seqno = request.find_node(root, "metadata/seqno").unwrap();
    assert_eq!(request.as_int(seqno), Some(9));
    // the source tree is untouched
    assert_eq!(metadata.key(meta_root), Some(""));
    assert_eq!(child_keys(&metadata, meta_root), ["id", "seqno"]);

    assert_eq!(
        config_request::to_json(&request).unwrap(),
        json!({
            "request": "vg_update",
            "metadata": {"id": "vg-uuid", "seqno": 9},
            "token": 1
        })
    );
}

#[rstest]
#[case::no_separator(Arg::int("size", 1))]
#[case::unknown_marker(Arg::int("size=%x", 1))]
#[case::wrong_value(Arg::str("size=%d", "100"))]
#[case::text_in_tree(Arg::text("note=plain"))]
fn rejects_bad_tags(#[case] arg: Arg<'static>) {
    let mut tree = ConfigTree::new();
    let root = tree.root();
    let err = tree.make_nodes(root, None, &[arg]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Build);
    assert!(err.to_string().contains("bad format string"));
}

#[rstest]
fn failure_keeps_earlier_nodes_by_default() {
    let mut tree = ConfigTree::new();
    let root = tree.root();
    let err = tree
        .make_nodes(root, None, &[Arg::int("a=%d", 1), Arg::int("b", 2), Arg::int("c=%d", 3)])
        .unwrap_err();
    assert!(err.is_build());
    assert_eq!(child_keys(&tree, root), ["a"]);
}

#[rstest]
fn atomic_failure_leaves_tree_unchanged() {
    let mut tree = ConfigTree::new();
    let root = tree.root();
    tree.make_nodes(root, None, &[Arg::int("keep=%d", 0)]).unwrap();
    let before = encode::to_string(&tree).unwrap();

    let result = tree.make_nodes_with_options(
        root,
        None,
        &[Arg::int("a=%d", 1), Arg::str("b=%s", "x"), Arg::int("c=%q", 3)],
        &BuildOptions::atomic(),
    );
    assert!(result.is_err());
    assert_eq!(encode::to_string(&tree).unwrap(), before);
    assert_eq!(tree.node_count(), 2);
}

#[rstest]
fn node_limit_surfaces_allocation_error() {
    let mut tree = ConfigTree::with_options(&TreeOptions::new().with_node_limit(Some(3)));
    let root = tree.root();
    let err = tree
        .make_nodes(
            root,
            None,
            &[Arg::int("a=%d", 1), Arg::int("b=%d", 2), Arg::int("c=%d", 3)],
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Allocation);
    assert_eq!(child_keys(&tree, root), ["a", "b"]);
}
