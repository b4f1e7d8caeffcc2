/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::collections::{BTreeSet, HashSet};
use std::time::{Duration, Instant};

use cfgraph::{Graph, NodeId};

/// Tunables for [`find_paths`]. Grouped into one value rather than threading
/// a bare `Option<Duration>` through the call chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathSearchConfig {
    /// Wall-clock budget for the whole search. `None` means unbounded.
    pub maxtime: Option<Duration>,
}

impl PathSearchConfig {
    pub fn with_maxtime(maxtime: Duration) -> Self {
        PathSearchConfig {
            maxtime: Some(maxtime),
        }
    }
}

/// The result of a path search: either every simple path was enumerated, or
/// the wall-clock budget fired first and `partial` holds what was found up
/// to that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome {
    Completed(Vec<Vec<NodeId>>),
    TimedOut {
        partial: Vec<Vec<NodeId>>,
        elapsed: Duration,
    },
}

impl PathOutcome {
    /// The paths found so far, whether or not the search completed.
    pub fn paths(&self) -> &[Vec<NodeId>] {
        match self {
            PathOutcome::Completed(paths) => paths,
            PathOutcome::TimedOut { partial, .. } => partial,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, PathOutcome::TimedOut { .. })
    }
}

/// Depth-first enumeration of simple paths from `src` to `dst` (inclusive).
///
/// If `dst` is `None`, paths terminate at any node with no outgoing edges.
/// Elapsed wall-clock time is checked on every backtrack step against
/// `config.maxtime`; once exceeded, the search unwinds immediately and
/// returns whatever paths were accumulated, via [`PathOutcome::TimedOut`].
pub fn find_paths(
    graph: &Graph,
    src: &NodeId,
    dst: Option<&NodeId>,
    config: PathSearchConfig,
) -> PathOutcome {
    let start = Instant::now();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut path: Vec<NodeId> = Vec::new();
    let mut paths: Vec<Vec<NodeId>> = Vec::new();
    let mut timed_out = false;

    dfs(
        graph,
        src,
        dst,
        config.maxtime,
        start,
        &mut visited,
        &mut path,
        &mut paths,
        &mut timed_out,
    );

    if timed_out {
        log::debug!(
            "path search from {} timed out after {} path(s)",
            src,
            paths.len()
        );
        PathOutcome::TimedOut {
            partial: paths,
            elapsed: start.elapsed(),
        }
    } else {
        PathOutcome::Completed(paths)
    }
}

#[allow(clippy::too_many_arguments)]
fn dfs(
    graph: &Graph,
    cur: &NodeId,
    dst: Option<&NodeId>,
    maxtime: Option<Duration>,
    start: Instant,
    visited: &mut HashSet<NodeId>,
    path: &mut Vec<NodeId>,
    paths: &mut Vec<Vec<NodeId>>,
    timed_out: &mut bool,
) {
    if *timed_out {
        return;
    }

    visited.insert(cur.clone());
    path.push(cur.clone());

    let successors = graph.successors(cur);
    match dst {
        None if successors.is_empty() => paths.push(path.clone()),
        Some(d) if cur == d => paths.push(path.clone()),
        _ => {
            for next in successors {
                if *timed_out {
                    break;
                }
                if !visited.contains(&next) {
                    dfs(
                        graph, &next, dst, maxtime, start, visited, path, paths, timed_out,
                    );
                }
            }
        }
    }

    path.pop();
    visited.remove(cur);

    if let Some(budget) = maxtime {
        if start.elapsed() > budget {
            *timed_out = true;
        }
    }
}

/// A single call site discovered inside a basic block, as handed back by a
/// [`BlockCallOracle`]: the call target, its arguments (opaque, caller-
/// defined representation), and a free-form annotation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CallSite {
    pub target: String,
    pub args: String,
    pub annotation: String,
}

/// Supplies, for a consecutive edge on a path, the symbolic predicate that
/// must hold to take it. Never consulted by the interval machinery — only
/// by the constraint-collection helpers below.
pub trait PredicateOracle {
    type Term: Clone + Eq + Ord;

    fn predicate(&self, src: &NodeId, dst: &NodeId) -> Option<Self::Term>;
}

/// Supplies the call instructions found in a basic block.
pub trait BlockCallOracle {
    fn block_calls(&self, block: &NodeId) -> Vec<CallSite>;
}

fn path_predicates<O: PredicateOracle>(path: &[NodeId], oracle: &O) -> BTreeSet<O::Term> {
    path.windows(2)
        .filter_map(|w| oracle.predicate(&w[0], &w[1]))
        .collect()
}

/// The predicates common to every path in `paths` — the constraints any
/// feasible run through all of them must satisfy.
pub fn shared_constraints<O: PredicateOracle>(
    paths: &[Vec<NodeId>],
    oracle: &O,
) -> BTreeSet<O::Term> {
    let mut sets = paths.iter().map(|p| path_predicates(p, oracle));
    match sets.next() {
        Some(first) => sets.fold(first, |acc, s| acc.intersection(&s).cloned().collect()),
        None => BTreeSet::new(),
    }
}

/// Every predicate that appears on any path in `paths`.
pub fn all_constraints<O: PredicateOracle>(paths: &[Vec<NodeId>], oracle: &O) -> BTreeSet<O::Term> {
    paths
        .iter()
        .flat_map(|p| path_predicates(p, oracle))
        .collect()
}

fn path_calls<O: BlockCallOracle>(path: &[NodeId], oracle: &O) -> BTreeSet<CallSite> {
    path.iter().flat_map(|block| oracle.block_calls(block)).collect()
}

/// The calls common to every path in `paths`.
pub fn shared_calls<O: BlockCallOracle>(paths: &[Vec<NodeId>], oracle: &O) -> BTreeSet<CallSite> {
    let mut sets = paths.iter().map(|p| path_calls(p, oracle));
    match sets.next() {
        Some(first) => sets.fold(first, |acc, s| acc.intersection(&s).cloned().collect()),
        None => BTreeSet::new(),
    }
}

/// Every call that appears on any path in `paths`.
pub fn all_calls<O: BlockCallOracle>(paths: &[Vec<NodeId>], oracle: &O) -> BTreeSet<CallSite> {
    paths.iter().flat_map(|p| path_calls(p, oracle)).collect()
}
