/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::{GraphError, NodeId};

/// A labeled directed graph: a designated entry node, an ordered node set,
/// and an adjacency list.
///
/// `Graph` is immutable after construction. Reverse adjacency is derived
/// lazily on first request and cached for the lifetime of the value — see
/// [`Graph::predecessors`]. There is no mutation API: callers who need a
/// different graph (for instance, a collapsed derived-sequence layer) build
/// a new `Graph`.
#[derive(Clone, Debug)]
pub struct Graph {
    faddr: NodeId,
    nodes: Vec<NodeId>,
    // Preserves the caller's order and duplicates, per the external
    // interface contract (`edges: map NodeId -> ordered list of NodeId`).
    adjacency: BTreeMap<NodeId, Vec<NodeId>>,
    reverse: OnceCell<BTreeMap<NodeId, BTreeSet<NodeId>>>,
}

impl Graph {
    /// Builds a graph from the external CFG extractor's inputs, validating
    /// that `faddr` is a known node and that every edge target is too.
    ///
    /// `nodes` must list `faddr` first, matching the data model's
    /// "first entry is faddr" invariant; this is not itself validated since
    /// nothing downstream relies on it (lookup is by value, not position).
    pub fn new(
        faddr: NodeId,
        nodes: Vec<NodeId>,
        edges: BTreeMap<NodeId, Vec<NodeId>>,
    ) -> Result<Self, GraphError> {
        let node_set: BTreeSet<&NodeId> = nodes.iter().collect();
        if !node_set.contains(&faddr) {
            return Err(GraphError::MissingEntry { faddr });
        }
        for (source, targets) in &edges {
            for target in targets {
                if !node_set.contains(target) {
                    return Err(GraphError::UnknownEdgeTarget {
                        source: source.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        log::debug!(
            "constructed graph: {} nodes, entry {}",
            nodes.len(),
            faddr
        );
        Ok(Graph {
            faddr,
            nodes,
            adjacency: edges,
            reverse: OnceCell::new(),
        })
    }

    pub fn faddr(&self) -> &NodeId {
        &self.faddr
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_node(&self, n: &NodeId) -> bool {
        // `nodes` is not sorted (it's caller-supplied order with faddr
        // first), so we cannot binary-search it; the adjacency map already
        // indexes every node that has outgoing edges, but leaf nodes may
        // not appear there, so fall back to a linear scan.
        self.adjacency.contains_key(n) || self.nodes.iter().any(|x| x == n)
    }

    pub fn has_nodes(&self, ns: &BTreeSet<NodeId>) -> bool {
        ns.iter().all(|n| self.has_node(n))
    }

    /// The raw, order-and-duplicate-preserving adjacency list for `n`, or an
    /// empty slice if `n` has no outgoing edges (known or not).
    pub fn raw_successors(&self, n: &NodeId) -> &[NodeId] {
        self.adjacency.get(n).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the successors of `n` as a set. Querying an unknown node
    /// returns the empty set rather than failing.
    pub fn successors(&self, n: &NodeId) -> BTreeSet<NodeId> {
        self.raw_successors(n).iter().cloned().collect()
    }

    /// Returns the predecessors of `n` as a set, computing (and caching) the
    /// full reverse adjacency on first call.
    pub fn predecessors(&self, n: &NodeId) -> BTreeSet<NodeId> {
        self.reverse_adjacency()
            .get(n)
            .cloned()
            .unwrap_or_default()
    }

    fn reverse_adjacency(&self) -> &BTreeMap<NodeId, BTreeSet<NodeId>> {
        self.reverse.get_or_init(|| {
            let mut reverse: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
            for (source, targets) in &self.adjacency {
                for target in targets {
                    reverse
                        .entry(target.clone())
                        .or_default()
                        .insert(source.clone());
                }
            }
            reverse
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(s: &str) -> NodeId {
        NodeId::from(s)
    }

    fn line_graph() -> Graph {
        let a = node("a");
        let b = node("b");
        let c = node("c");
        let mut edges = BTreeMap::new();
        edges.insert(a.clone(), vec![b.clone()]);
        edges.insert(b.clone(), vec![c.clone()]);
        Graph::new(a.clone(), vec![a, b, c], edges).unwrap()
    }

    #[test]
    fn rejects_missing_entry() {
        let a = node("a");
        let b = node("b");
        let err = Graph::new(a.clone(), vec![b], BTreeMap::new()).unwrap_err();
        assert_eq!(err, GraphError::MissingEntry { faddr: a });
    }

    #[test]
    fn rejects_unknown_edge_target() {
        let a = node("a");
        let mut edges = BTreeMap::new();
        edges.insert(a.clone(), vec![node("ghost")]);
        let err = Graph::new(a.clone(), vec![a.clone()], edges).unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownEdgeTarget {
                source: a,
                target: node("ghost")
            }
        );
    }

    #[test]
    fn unknown_node_queries_return_empty_sets() {
        let g = line_graph();
        assert!(g.successors(&node("nope")).is_empty());
        assert!(g.predecessors(&node("nope")).is_empty());
    }

    #[test]
    fn predecessors_are_lazily_reversed() {
        let g = line_graph();
        assert_eq!(g.predecessors(&node("c")), BTreeSet::from([node("b")]));
        assert_eq!(g.predecessors(&node("a")), BTreeSet::new());
    }

    #[test]
    fn duplicate_edges_are_deduped_in_successor_queries() {
        let a = node("a");
        let b = node("b");
        let mut edges = BTreeMap::new();
        edges.insert(a.clone(), vec![b.clone(), b.clone()]);
        let g = Graph::new(a.clone(), vec![a.clone(), b.clone()], edges).unwrap();
        assert_eq!(g.raw_successors(&a).len(), 2);
        assert_eq!(g.successors(&a), BTreeSet::from([b]));
    }
}
