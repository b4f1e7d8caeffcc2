/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::cell::{OnceCell, RefCell};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use cfgraph::NodeId;

use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// A maximal single-entry subgraph whose header dominates every closed path
/// through its members (Allen 1970).
///
/// `Interval` is immutable after construction: `nodes` and `edges` are fixed
/// by [`crate::build_intervals`], and the derived properties (`rpo`, `dom`,
/// `idom`, `two_way_conditionals`) are computed on first access and cached
/// for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct Interval {
    header: NodeId,
    nodes: BTreeSet<NodeId>,
    edges: BTreeMap<NodeId, BTreeSet<NodeId>>,

    rpo: OnceCell<BTreeMap<NodeId, usize>>,
    dom: OnceCell<BTreeMap<NodeId, BTreeSet<NodeId>>>,
    idom: OnceCell<BTreeMap<NodeId, NodeId>>,
    two_way: OnceCell<BTreeMap<NodeId, NodeId>>,
    reverse: OnceCell<BTreeMap<NodeId, BTreeSet<NodeId>>>,
    // Memoizes `is_descendant`'s forward-reachability sets, keyed by the
    // candidate ancestor. Populated lazily; never invalidated, since `edges`
    // is fixed once the interval is built.
    reachable_from: RefCell<HashMap<NodeId, BTreeSet<NodeId>>>,
}

impl Interval {
    pub(crate) fn new(
        header: NodeId,
        nodes: BTreeSet<NodeId>,
        edges: BTreeMap<NodeId, BTreeSet<NodeId>>,
    ) -> Self {
        Interval {
            header,
            nodes,
            edges,
            rpo: OnceCell::new(),
            dom: OnceCell::new(),
            idom: OnceCell::new(),
            two_way: OnceCell::new(),
            reverse: OnceCell::new(),
            reachable_from: RefCell::new(HashMap::new()),
        }
    }

    pub fn header(&self) -> &NodeId {
        &self.header
    }

    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    /// Internal edges: `edges(I) restricted to nodes(I) x nodes(I)`.
    pub fn edges(&self) -> &BTreeMap<NodeId, BTreeSet<NodeId>> {
        &self.edges
    }

    pub fn has_node(&self, n: &NodeId) -> bool {
        self.nodes.contains(n)
    }

    pub fn has_nodes(&self, ns: &BTreeSet<NodeId>) -> bool {
        ns.is_subset(&self.nodes)
    }

    /// In-interval successors of `n` (`post` in the source algorithm).
    pub fn successors(&self, n: &NodeId) -> BTreeSet<NodeId> {
        self.edges.get(n).cloned().unwrap_or_default()
    }

    /// In-interval predecessors of `n` (`pre` in the source algorithm).
    pub fn predecessors(&self, n: &NodeId) -> BTreeSet<NodeId> {
        self.reverse_edges().get(n).cloned().unwrap_or_default()
    }

    fn reverse_edges(&self) -> &BTreeMap<NodeId, BTreeSet<NodeId>> {
        self.reverse.get_or_init(|| {
            let mut reverse: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
            for (src, targets) in &self.edges {
                for t in targets {
                    reverse.entry(t.clone()).or_default().insert(src.clone());
                }
            }
            reverse
        })
    }

    /// Reverse postorder, by a non-recursive DFS from the header that skips
    /// edges back to the header. Ties between sibling successors break on
    /// lexical `NodeId` order so the numbering is deterministic.
    ///
    /// A node revisited before it has "finished" is removed from its
    /// earlier position and re-appended, so its final position reflects the
    /// last time it was reached — the non-recursive equivalent of
    /// postorder-on-exit.
    pub fn rpo(&self) -> &BTreeMap<NodeId, usize> {
        self.rpo.get_or_init(|| {
            let mut stack: Vec<NodeId> = vec![self.header.clone()];
            let mut order: Vec<NodeId> = Vec::new();
            while let Some(node) = stack.pop() {
                if let Some(pos) = order.iter().position(|n| *n == node) {
                    order.remove(pos);
                }
                order.push(node.clone());
                for t in self.successors(&node) {
                    if t != self.header {
                        stack.push(t);
                    }
                }
            }
            order
                .into_iter()
                .enumerate()
                .map(|(i, n)| (n, i))
                .collect()
        })
    }

    /// Dominator sets. Because the interval is acyclic modulo back-edges to
    /// the header, a single forward sweep in RPO order suffices: by the time
    /// we process `n`, every in-interval predecessor of `n` has already been
    /// processed (its RPO index is smaller).
    pub fn dom(&self) -> &BTreeMap<NodeId, BTreeSet<NodeId>> {
        self.dom.get_or_init(|| {
            let rpo = self.rpo();
            let mut ordered: Vec<NodeId> = self.nodes.iter().cloned().collect();
            ordered.sort_by_key(|n| rpo.get(n).copied().unwrap_or(usize::MAX));

            let mut dom: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
            dom.insert(self.header.clone(), BTreeSet::from([self.header.clone()]));
            for n in ordered {
                if n == self.header {
                    continue;
                }
                let mut accumulated: Option<BTreeSet<NodeId>> = None;
                for p in self.predecessors(&n) {
                    let pred_dom = dom.get(&p).cloned().unwrap_or_default();
                    accumulated = Some(match accumulated {
                        None => pred_dom,
                        Some(acc) => acc.intersection(&pred_dom).cloned().collect(),
                    });
                }
                let mut d = accumulated.unwrap_or_default();
                d.insert(n.clone());
                dom.insert(n, d);
            }
            dom
        })
    }

    /// Immediate dominators: for `n != header`, the RPO-maximal strict
    /// dominator.
    pub fn idom(&self) -> &BTreeMap<NodeId, NodeId> {
        self.idom.get_or_init(|| {
            let rpo = self.rpo();
            let dom = self.dom();
            let mut result = BTreeMap::new();
            for n in &self.nodes {
                if *n == self.header {
                    continue;
                }
                if let Some(strict_doms) = dom.get(n) {
                    if let Some(idom) = strict_doms
                        .iter()
                        .filter(|k| *k != n)
                        .max_by_key(|k| rpo.get(*k).copied().unwrap_or(0))
                    {
                        result.insert(n.clone(), idom.clone());
                    }
                }
            }
            result
        })
    }

    /// Nodes in RPO order.
    pub fn rpo_sorted_nodes(&self) -> Vec<NodeId> {
        let rpo = self.rpo();
        let mut nodes: Vec<NodeId> = self.nodes.iter().cloned().collect();
        nodes.sort_by_key(|n| rpo[n]);
        nodes
    }

    /// Nodes in reverse RPO order.
    pub fn rpo_rev_sorted_nodes(&self) -> Vec<NodeId> {
        let rpo = self.rpo();
        let mut nodes: Vec<NodeId> = self.nodes.iter().cloned().collect();
        nodes.sort_by_key(|n| Reverse(rpo[n]));
        nodes
    }

    /// Two-way-conditional follow nodes (Cifuentes, CC'96): for each branch
    /// node with exactly two successors, the nearest point at which both
    /// arms reconverge.
    ///
    /// Branches left unresolved after the pass are reported to `sink` as
    /// [`Diagnostic::UnresolvedFollow`]; this is never fatal.
    pub fn two_way_conditionals(&self, sink: &mut dyn DiagnosticSink) -> &BTreeMap<NodeId, NodeId> {
        self.two_way.get_or_init(|| self.compute_two_way_conditionals(sink))
    }

    fn compute_two_way_conditionals(&self, sink: &mut dyn DiagnosticSink) -> BTreeMap<NodeId, NodeId> {
        let rpo = self.rpo();
        let idom = self.idom();
        let mut result: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let mut unresolved: BTreeSet<NodeId> = BTreeSet::new();

        for m in self.rpo_rev_sorted_nodes() {
            let successors = self.successors(&m);
            if successors.len() != 2 {
                continue;
            }
            let is_loop_header = m == self.header && !self.predecessors(&m).is_empty();
            if is_loop_header {
                continue;
            }
            if successors.contains(&self.header) {
                continue;
            }

            let candidates: Vec<NodeId> = self
                .nodes
                .iter()
                .filter(|i| {
                    **i != self.header
                        && idom.get(*i) == Some(&m)
                        && self.predecessors(i).len() >= 2
                })
                .cloned()
                .collect();

            match candidates.iter().max_by_key(|k| rpo[*k]).cloned() {
                Some(follow) => {
                    result.insert(m.clone(), follow.clone());
                    let resolved_now: Vec<NodeId> = unresolved
                        .iter()
                        .filter(|k| self.is_descendant(&follow, k))
                        .cloned()
                        .collect();
                    for k in resolved_now {
                        unresolved.remove(&k);
                        result.insert(k, follow.clone());
                    }
                }
                None => {
                    unresolved.insert(m);
                }
            }
        }

        if !unresolved.is_empty() {
            sink.emit(Diagnostic::UnresolvedFollow {
                header: self.header.clone(),
                branches: unresolved.into_iter().collect(),
            });
        }
        result
    }

    /// Whether `child` is forward-reachable from `parent` using the
    /// interval's own edges. Iterative to avoid recursion depth limits on
    /// large intervals; the per-`parent` reachable set is memoized since
    /// `edges` never changes.
    fn is_descendant(&self, child: &NodeId, parent: &NodeId) -> bool {
        if let Some(cached) = self.reachable_from.borrow().get(parent) {
            return cached.contains(child);
        }
        let mut reachable: BTreeSet<NodeId> = BTreeSet::new();
        let mut stack: Vec<NodeId> = vec![parent.clone()];
        let mut visited: BTreeSet<NodeId> = BTreeSet::from([parent.clone()]);
        while let Some(cur) = stack.pop() {
            for next in self.successors(&cur) {
                if visited.insert(next.clone()) {
                    reachable.insert(next.clone());
                    stack.push(next);
                }
            }
        }
        let found = reachable.contains(child);
        self.reachable_from
            .borrow_mut()
            .insert(parent.clone(), reachable);
        found
    }
}
