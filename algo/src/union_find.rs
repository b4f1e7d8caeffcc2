/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::collections::BTreeMap;

use cfgraph::NodeId;

/// A disjoint-set (union-find) structure over [`NodeId`]s, used to merge
/// overlapping node-name lists discovered from independent sources (e.g.
/// several CFG edges computed by different front-end passes that should
/// agree on the same block).
///
/// `find` follows parent pointers without path compression: callers that
/// build the structure once and then query it repeatedly (the common case
/// here) get no benefit from compression, and an uncompressed `find` keeps
/// the parent chain inspectable for debugging.
#[derive(Debug, Default, Clone)]
pub struct DisjointSet {
    parent: BTreeMap<NodeId, NodeId>,
    rank: BTreeMap<NodeId, usize>,
}

impl DisjointSet {
    pub fn new() -> Self {
        DisjointSet::default()
    }

    /// Registers `n` as its own singleton set, if not already known.
    pub fn make(&mut self, n: &NodeId) {
        self.parent.entry(n.clone()).or_insert_with(|| n.clone());
        self.rank.entry(n.clone()).or_insert(0);
    }

    /// The representative of the set containing `n`. Implicitly calls
    /// [`Self::make`] if `n` hasn't been seen before.
    pub fn find(&mut self, n: &NodeId) -> NodeId {
        self.make(n);
        let mut cur = n.clone();
        loop {
            let parent = self.parent[&cur].clone();
            if parent == cur {
                return cur;
            }
            cur = parent;
        }
    }

    /// Merges the sets containing `a` and `b`, attaching the lower-rank
    /// root under the higher-rank one (breaking ties lexically, for
    /// determinism).
    pub fn union(&mut self, a: &NodeId, b: &NodeId) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let (lo, hi) = if self.rank[&ra] < self.rank[&rb] {
            (ra, rb)
        } else if self.rank[&rb] < self.rank[&ra] {
            (rb, ra)
        } else if ra < rb {
            (rb, ra)
        } else {
            (ra, rb)
        };
        self.parent.insert(lo, hi.clone());
        *self.rank.entry(hi).or_insert(0) += 1;
    }

    /// Every node registered so far, grouped by the set they ultimately
    /// belong to (keyed and ordered by each set's true representative, not
    /// by each node's immediate parent — a node two hops from its root is
    /// still grouped with the root's other members).
    pub fn disjoint_sets(&mut self) -> Vec<Vec<NodeId>> {
        let nodes: Vec<NodeId> = self.parent.keys().cloned().collect();
        let mut groups: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for n in nodes {
            let root = self.find(&n);
            groups.entry(root).or_default().push(n);
        }
        groups.into_values().collect()
    }
}

/// Merges any node-name lists that share a member into maximal groups.
///
/// Grounded on the same partition semantics as [`DisjointSet::disjoint_sets`]:
/// builds one `DisjointSet`, unions every list's members pairwise against its
/// first element, and reads back the partition.
pub fn coalesce(lists: &[Vec<NodeId>]) -> Vec<Vec<NodeId>> {
    let mut ds = DisjointSet::new();
    for list in lists {
        for n in list {
            ds.make(n);
        }
        if let Some(first) = list.first() {
            for n in &list[1..] {
                ds.union(first, n);
            }
        }
    }
    ds.disjoint_sets()
}
