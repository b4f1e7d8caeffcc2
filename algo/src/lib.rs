/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![deny(unreachable_pub)]
#![warn(missing_debug_implementations)]

//! Control-flow structuring core: Allen interval decomposition,
//! reducibility testing, hierarchical reverse postorder, Cifuentes
//! two-way-conditional follow nodes, and a DFS path enumerator with
//! symbolic-constraint and call collection.

mod builder;
mod derive;
mod diagnostics;
mod error;
mod interval;
mod paths;
mod union_find;

pub use builder::build_intervals;
pub use derive::DerivedSequence;
pub use diagnostics::{Diagnostic, DiagnosticSink, NullSink};
pub use error::Error;
pub use interval::Interval;
pub use paths::{
    all_calls, all_constraints, shared_calls, shared_constraints, BlockCallOracle, CallSite,
    find_paths, PathOutcome, PathSearchConfig, PredicateOracle,
};
pub use union_find::{coalesce, DisjointSet};

/// Commonly imported names, the way callers pull in `cfgraph_algo::prelude::*`
/// rather than enumerating every item above.
pub mod prelude {
    pub use crate::{
        build_intervals, coalesce, find_paths, DerivedSequence, Diagnostic, DiagnosticSink,
        DisjointSet, Error, Interval, NullSink, PathOutcome, PathSearchConfig,
    };
}
