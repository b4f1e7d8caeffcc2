/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![deny(unreachable_pub)]
#![deny(unconditional_recursion)]

//! Opaque-node labeled directed graph primitives.
//!
//! This crate is the leaf of the control-flow structuring stack: a
//! [`Graph`] is nothing more than a designated entry node, an ordered node
//! set, and an adjacency list, with lazily-cached reverse adjacency.
//! Everything interval- or dominance-related lives one layer up, in
//! `cfgraph-algo`.

mod error;
mod graph;
mod node;

pub use error::GraphError;
pub use graph::Graph;
pub use node::NodeId;
