/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use cfgraph::{GraphError, NodeId};

/// Errors surfaced by the interval/derivation layer.
///
/// Construction failures (`GraphError`) propagate immediately, matching
/// `InvalidInput`'s fatal status. [`Error::IrreducibleGraph`] is not raised
/// by any infallible accessor — it exists only for
/// [`crate::derive::DerivedSequence::try_hrpo`], the checked alternative to
/// [`crate::derive::DerivedSequence::hrpo`] for callers who would rather get
/// an `Err` than silently read an empty map.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("derived sequence for function at {faddr} is irreducible; hrpo is undefined")]
    IrreducibleGraph { faddr: NodeId },
}
