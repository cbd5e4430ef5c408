// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error taxonomy for the search core.
//!
//! Every preallocated buffer has a fixed cap; running into a cap is fatal for
//! the search but recoverable for the caller, which is expected to report the
//! deepest line reached (see `output::deepest_lines`) and exit. Configuration
//! problems are rejected at the boundary before any buffer is allocated.

use thiserror::Error;

/// Fatal conditions raised from inside the search loops.
///
/// The four capacity variants correspond to the four preallocated buffers
/// (state queue, row buffer, compatibility bit arena, reachability bit
/// arena). The remaining variants are invariant violations: a queue
/// compaction that cannot locate a parent, and a rule whose termination
/// tables fail the stator sanity check at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The state arena ran out of slots.
    #[error("state queue full")]
    StateQueueFull,

    /// The shared row buffer overflowed while listing extension rows.
    #[error("too many extension rows for one state")]
    RowBufferFull,

    /// The compatibility bit arena overflowed.
    #[error("compatibility block space exceeded")]
    CompatibilityOverflow,

    /// The reachability bit arena overflowed.
    #[error("reachability block storage exceeded")]
    ReachabilityOverflow,

    /// Queue compaction could not find the parent of a live state.
    #[error("unable to find parent during queue compaction")]
    OrphanedState,

    /// The termination tables admit a live stator cell with no support,
    /// which no valid rule produces.
    #[error("rule fails the stator compatibility sanity check")]
    BadRuleTables,
}

/// Errors building a [`crate::SearchContext`]: either the configuration was
/// rejected at the boundary or the rule-derived tables failed their sanity
/// check.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Search(#[from] SearchError),
}
