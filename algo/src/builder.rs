/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use cfgraph::{Graph, NodeId};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::interval::Interval;

/// Computes the Allen intervals of `graph` (Allen, *Control Flow Analysis*,
/// SIGPLAN Notices, 1970).
///
/// Nodes unreachable from `graph.faddr()` are permitted — decompiled CFGs
/// can contain dead blocks — but are excluded from every interval and
/// reported to `sink` as [`Diagnostic::UnreachableNodes`].
pub fn build_intervals(
    graph: &Graph,
    sink: &mut dyn DiagnosticSink,
) -> BTreeMap<NodeId, Interval> {
    let mut headers: VecDeque<NodeId> = VecDeque::from([graph.faddr().clone()]);
    let mut covered: BTreeSet<NodeId> = BTreeSet::new();
    let mut intervals: BTreeMap<NodeId, Interval> = BTreeMap::new();

    while let Some(h) = headers.pop_front() {
        let mut nodes: BTreeSet<NodeId> = BTreeSet::from([h.clone()]);
        covered.insert(h.clone());
        let mut worklist: VecDeque<NodeId> = VecDeque::from([h.clone()]);

        while let Some(c) = worklist.pop_front() {
            for t in graph.successors(&c) {
                if worklist.contains(&t) {
                    continue;
                }
                let preds = graph.predecessors(&t);
                if preds.iter().all(|p| nodes.contains(p)) {
                    nodes.insert(t.clone());
                    worklist.push_back(t.clone());
                    covered.insert(t.clone());
                }
            }
        }

        let mut edges: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
        for n in &nodes {
            for t in graph.successors(n) {
                if nodes.contains(&t) {
                    edges.entry(n.clone()).or_default().insert(t);
                }
            }
        }

        for n in &nodes {
            for t in graph.successors(n) {
                if !nodes.contains(&t) && !headers.contains(&t) && !covered.contains(&t) {
                    headers.push_back(t);
                }
            }
        }

        log::trace!("interval {}: {} nodes", h, nodes.len());
        intervals.insert(h.clone(), Interval::new(h, nodes, edges));
    }

    let unreached: Vec<NodeId> = graph
        .nodes()
        .iter()
        .filter(|n| !covered.contains(*n))
        .cloned()
        .collect();
    if !unreached.is_empty() {
        sink.emit(Diagnostic::UnreachableNodes {
            faddr: graph.faddr().clone(),
            nodes: unreached,
        });
    }

    intervals
}
