/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::NodeId;

/// Fatal construction-time errors.
///
/// Per the `InvalidInput` taxonomy: a graph whose entry node is missing from
/// its own node set, or whose edges reference a node outside the node set,
/// cannot be analyzed at all. These propagate immediately — there is no
/// partial-result story for a graph that doesn't type-check.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("entry node {faddr} is not present in the node set")]
    MissingEntry { faddr: NodeId },

    #[error("edge {source} -> {target} references a node outside the node set")]
    UnknownEdgeTarget { source: NodeId, target: NodeId },
}
