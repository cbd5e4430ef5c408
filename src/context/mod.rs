// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search context combining MEMO and DYNAMIC state.
//!
//! The SearchContext owns everything a search touches:
//!
//! - **Tier 1 (MEMO)**: the rule-derived transition tables and hash keys.
//!   Immutable after construction.
//! - **Tier 2 (DYNAMIC)**: the state arena, the shared row buffer, the
//!   compatibility/reachability bit arenas, the duplicate table, the
//!   statistics, and the live copy of the configuration (whose geometry can
//!   contract during deepening).
//!
//! Keeping every buffer in one owning struct is what stands in for the
//! process-wide arrays a C implementation of this search would use; the
//! driver borrows the fields it needs and nothing is global.

pub mod statistics;

pub use statistics::{Counter, Statistics};

use crate::config::SearchConfig;
use crate::error::SetupError;
use crate::graph::CompatGraph;
use crate::memo::MemoizedData;
use crate::queue::{DedupTable, StateArena};
use crate::rows::RowBuffer;

/// Everything one search owns. See the module docs for the tier split.
#[derive(Debug)]
pub struct SearchContext {
    /// Live configuration; `rotor_width` and the stator widths mutate when
    /// deepening contracts the rotor.
    pub config: SearchConfig,
    /// Immutable precomputed tables (Tier 1).
    pub memo: MemoizedData,
    /// State arena and breadth-first queue (Tier 2).
    pub arena: StateArena,
    /// Shared per-phase row segments (Tier 2).
    pub rows: RowBuffer,
    /// Compatibility and reachability bitmaps (Tier 2).
    pub graph: CompatGraph,
    /// Duplicate-state hash table (Tier 2).
    pub dedup: DedupTable,
    /// Search counters.
    pub statistics: Statistics,
}

impl SearchContext {
    /// Validate the configuration, build the MEMO tables and preallocate
    /// every buffer. The root state (and any seed history states) are
    /// installed in the arena.
    pub fn new(config: SearchConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let memo = MemoizedData::new(config.rule, config.zero_lot_line)?;
        let arena = StateArena::new(
            config.period,
            config.state_capacity_words,
            &config.seed_states,
        );
        let rows = RowBuffer::new(config.row_capacity);
        let graph = CompatGraph::new(config.bit_arena_words);
        let dedup = DedupTable::new(config.hash_bits);
        Ok(Self {
            config,
            memo,
            arena,
            rows,
            graph,
            dedup,
            statistics: Statistics::new(),
        })
    }
}
