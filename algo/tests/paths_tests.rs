use std::collections::BTreeMap;
use std::time::Duration;

use cfgraph::{Graph, NodeId};
use cfgraph_algo::{find_paths, PathSearchConfig};

fn n(s: &str) -> NodeId {
    NodeId::from(s)
}

fn diamond() -> anyhow::Result<Graph> {
    let (a, b, c, d) = (n("a"), n("b"), n("c"), n("d"));
    let mut edges = BTreeMap::new();
    edges.insert(a.clone(), vec![b.clone(), c.clone()]);
    edges.insert(b.clone(), vec![d.clone()]);
    edges.insert(c.clone(), vec![d.clone()]);
    Ok(Graph::new(a, vec![n("a"), b, c, d], edges)?)
}

#[test]
fn diamond_has_exactly_two_simple_paths() -> anyhow::Result<()> {
    let g = diamond()?;
    let outcome = find_paths(&g, &n("a"), Some(&n("d")), PathSearchConfig::default());
    assert!(!outcome.timed_out());
    let mut paths = outcome.paths().to_vec();
    paths.sort();
    assert_eq!(
        paths,
        vec![vec![n("a"), n("b"), n("d")], vec![n("a"), n("c"), n("d")]]
    );
    Ok(())
}

#[test]
fn sink_search_without_dst_stops_at_nodes_with_no_successors() -> anyhow::Result<()> {
    let g = diamond()?;
    let outcome = find_paths(&g, &n("a"), None, PathSearchConfig::default());
    assert!(!outcome.timed_out());
    for path in outcome.paths() {
        assert_eq!(path.last(), Some(&n("d")));
    }
    Ok(())
}

#[test]
fn doubling_maxtime_never_reduces_paths_found() -> anyhow::Result<()> {
    let g = diamond()?;
    let short = find_paths(
        &g,
        &n("a"),
        Some(&n("d")),
        PathSearchConfig::with_maxtime(Duration::from_secs(1)),
    );
    let long = find_paths(
        &g,
        &n("a"),
        Some(&n("d")),
        PathSearchConfig::with_maxtime(Duration::from_secs(2)),
    );
    assert!(long.paths().len() >= short.paths().len());
    Ok(())
}

#[test]
fn unreachable_destination_yields_no_paths() -> anyhow::Result<()> {
    let (a, b, isolated) = (n("a"), n("b"), n("isolated"));
    let mut edges = BTreeMap::new();
    edges.insert(a.clone(), vec![b.clone()]);
    let graph = Graph::new(a.clone(), vec![a.clone(), b, isolated.clone()], edges)?;
    let outcome = find_paths(&graph, &a, Some(&isolated), PathSearchConfig::default());
    assert!(outcome.paths().is_empty());
    Ok(())
}
