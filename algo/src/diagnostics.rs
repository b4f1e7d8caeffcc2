/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use cfgraph::NodeId;

/// Warnings the core surfaces about a well-formed-but-imperfect input:
/// dead code the interval builder couldn't reach, or two-way branches the
/// Cifuentes pass couldn't match to a follow node. Neither is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Nodes with no predecessor chain from `faddr`; decompiled CFGs may
    /// legitimately contain dead blocks.
    UnreachableNodes { faddr: NodeId, nodes: Vec<NodeId> },
    /// Two-way branches inside the interval headed by `header` whose follow
    /// node could not be determined.
    UnresolvedFollow { header: NodeId, branches: Vec<NodeId> },
    /// The derived-graph sequence did not collapse to a single node; the
    /// graph is irreducible and `hrpo` will be empty.
    Irreducible { faddr: NodeId, layer_sizes: Vec<usize> },
}

/// Receives [`Diagnostic`]s as the core produces them.
///
/// The core never writes to stderr itself (see the design notes on
/// replacing print statements with an injected callback); callers route
/// diagnostics to whatever they use for user-facing warnings.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Discards every diagnostic. Useful for callers (and tests) that don't
/// care about the warning channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _diagnostic: Diagnostic) {}
}

impl<F: FnMut(Diagnostic)> DiagnosticSink for F {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self(diagnostic)
    }
}
