use cfgraph::NodeId;
use cfgraph_algo::DisjointSet;

fn n(s: &str) -> NodeId {
    NodeId::from(s)
}

#[test]
fn find_returns_a_self_parented_representative() {
    let mut ds = DisjointSet::new();
    ds.union(&n("a"), &n("b"));
    ds.union(&n("b"), &n("c"));
    let root = ds.find(&n("a"));
    assert_eq!(ds.find(&root), root);
}

#[test]
fn disjoint_sets_partitions_the_forest() {
    let mut ds = DisjointSet::new();
    ds.union(&n("a"), &n("b"));
    ds.make(&n("c"));
    ds.union(&n("x"), &n("y"));

    let mut sets: Vec<Vec<NodeId>> = ds
        .disjoint_sets()
        .into_iter()
        .map(|mut g| {
            g.sort();
            g
        })
        .collect();
    sets.sort();

    assert_eq!(
        sets,
        vec![
            vec![n("a"), n("b")],
            vec![n("c")],
            vec![n("x"), n("y")],
        ]
    );
}

#[test]
fn connectivity_matches_union_history() {
    let mut ds = DisjointSet::new();
    ds.union(&n("a"), &n("b"));
    ds.union(&n("c"), &n("d"));
    assert_eq!(ds.find(&n("a")), ds.find(&n("b")));
    assert_ne!(ds.find(&n("a")), ds.find(&n("c")));
    ds.union(&n("b"), &n("c"));
    assert_eq!(ds.find(&n("a")), ds.find(&n("d")));
}
