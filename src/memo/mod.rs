// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Memoized (MEMO) data structures.
//!
//! Everything here is computed once from the rule when a search context is
//! created and never changes afterwards. The MEMO tier is what makes the
//! inner loops cheap: row extension, compatibility testing and termination
//! detection are all table lookups at search time.
//!
//! # Contents
//!
//! - **Extension tables**: windowed-evolution transitions driving the
//!   row-extension enumerator (~128 KB).
//! - **Termination tables**: block-state transitions and still-life column
//!   tables for the termination detector (~8.5 MB, dominated by the 2^22
//!   forward transition table).
//! - **Zobrist keys**: byte-level hash keys for duplicate elimination
//!   (~320 KB).

pub mod extension;
pub mod termination;
pub mod zobrist;

pub use extension::ExtensionTables;
pub use termination::TerminationTables;
pub use zobrist::ZobristKeys;

use crate::error::SearchError;
use crate::rule::Rule;

/// All immutable precomputed data for one search.
#[derive(Debug, Clone)]
pub struct MemoizedData {
    pub extension: ExtensionTables,
    pub termination: TerminationTables,
    pub zobrist: ZobristKeys,
}

impl MemoizedData {
    /// Build every table for the given rule. The termination build performs
    /// the rule sanity check and is the only fallible step.
    pub fn new(rule: Rule, zero_lot_line: bool) -> Result<Self, SearchError> {
        tracing::debug!(%rule, "building transition tables");
        let extension = ExtensionTables::build(rule);
        let termination = TerminationTables::build(rule, zero_lot_line)?;
        let zobrist = ZobristKeys::new();
        tracing::debug!(
            addl_stator_cols = termination.addl_stator_cols,
            "transition tables ready"
        );
        Ok(Self {
            extension,
            termination,
            zobrist,
        })
    }
}
