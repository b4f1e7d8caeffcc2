use std::collections::BTreeMap;

use cfgraph::{Graph, NodeId};
use cfgraph_algo::{build_intervals, NullSink};

fn n(s: &str) -> NodeId {
    NodeId::from(s)
}

#[test]
fn if_then_else_dominators_and_rpo() -> anyhow::Result<()> {
    let (a, b, c, d) = (n("a"), n("b"), n("c"), n("d"));
    let mut edges = BTreeMap::new();
    edges.insert(a.clone(), vec![b.clone(), c.clone()]);
    edges.insert(b.clone(), vec![d.clone()]);
    edges.insert(c.clone(), vec![d.clone()]);
    let graph = Graph::new(a.clone(), vec![a.clone(), b.clone(), c.clone(), d.clone()], edges)?;

    let intervals = build_intervals(&graph, &mut NullSink);
    assert_eq!(intervals.len(), 1);
    let interval = &intervals[&a];
    assert_eq!(interval.nodes(), &[a.clone(), b.clone(), c.clone(), d.clone()].into_iter().collect());

    assert_eq!(interval.rpo()[&a], 0);
    assert_eq!(interval.idom()[&d], a);

    let mut sink = NullSink;
    let follow = interval.two_way_conditionals(&mut sink);
    assert_eq!(follow[&a], d);
    Ok(())
}

#[test]
fn straight_line_idom_chain() -> anyhow::Result<()> {
    let (a, b, c) = (n("a"), n("b"), n("c"));
    let mut edges = BTreeMap::new();
    edges.insert(a.clone(), vec![b.clone()]);
    edges.insert(b.clone(), vec![c.clone()]);
    let graph = Graph::new(a.clone(), vec![a.clone(), b.clone(), c.clone()], edges)?;

    let intervals = build_intervals(&graph, &mut NullSink);
    let interval = &intervals[&a];
    assert_eq!(interval.rpo()[&a], 0);
    assert_eq!(interval.rpo()[&b], 1);
    assert_eq!(interval.rpo()[&c], 2);
    assert_eq!(interval.idom()[&b], a);
    assert_eq!(interval.idom()[&c], b);
    Ok(())
}
