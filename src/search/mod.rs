// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The search driver: breadth-first expansion with iterative-deepening
//! refresh.
//!
//! The driver repeatedly takes the oldest pending state, asks the
//! termination detector whether it is a finished oscillator, and otherwise
//! expands it: the row enumerator lists candidate next rows per phase, the
//! graph stage wires them into a P-partite compatibility graph (one stator
//! group at a time), and every consistent row tuple becomes a child state.
//!
//! When the queue reaches half the arena, [`compact`] prunes it: a bounded
//! depth-first probe re-expands every pending state and discards the ones
//! whose subtrees die out before the target depth, then the survivors are
//! slid to the front of the arena and rehashed. The probe depth grows by
//! one per compaction, which is what turns the breadth-first queue into a
//! hybrid iterative-deepening search.

mod compact;

use crate::config::{Row, SearchConfig, MAX_PERIOD};
use crate::context::{Counter, SearchContext, Statistics};
use crate::error::SearchError;
use crate::memo::ExtensionTables;
use crate::output::{self, Solution};
use crate::queue::{DedupTable, StateArena, StateId};
use crate::rows::{ExtensionScan, GroupStep};
use crate::termination;

/// How a completed search ended.
#[derive(Debug)]
pub enum Outcome {
    /// A pattern was found and rendered.
    Found(Solution),
    /// The queue ran dry without a pattern.
    Exhausted,
}

/// Driver state surviving across compactions.
#[derive(Debug, Default)]
pub struct SearchDriver {
    /// Depth of the last deepening pass; grows by one per compaction.
    last_depth: usize,
}

impl SearchDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the search to completion: first success or queue exhaustion.
    pub fn run(&mut self, ctx: &mut SearchContext) -> Result<Outcome, SearchError> {
        loop {
            if let Some(outcome) = self.step(ctx)? {
                return Ok(outcome);
            }
        }
    }

    /// One breadth-first step: compact if the queue is full, then expand
    /// the oldest pending state. Returns `Some` when the search is over.
    pub fn step(&mut self, ctx: &mut SearchContext) -> Result<Option<Outcome>, SearchError> {
        if ctx.arena.first_unprocessed() == ctx.arena.first_free() {
            return Ok(Some(Outcome::Exhausted));
        }
        if ctx.arena.queue_half_full() {
            if let Some(solution) = compact::run(self, ctx)? {
                return Ok(Some(Outcome::Found(solution)));
            }
        }
        let Some(s) = ctx.arena.pop_unprocessed() else {
            // The deepening pass can kill the whole frontier.
            return Ok(Some(Outcome::Exhausted));
        };
        if let Some(solution) = process(ctx, s)? {
            return Ok(Some(Outcome::Found(solution)));
        }
        Ok(None)
    }
}

/// Expand one state: check termination, list extension rows per phase, and
/// enqueue every consistent row tuple, one stator group at a time.
///
/// Returns a rendered solution when `s` completes the search.
pub(crate) fn process(
    ctx: &mut SearchContext,
    s: StateId,
) -> Result<Option<Solution>, SearchError> {
    ctx.statistics.increment(Counter::StatesProcessed);

    if let Some(completion) = termination::terminal(&ctx.memo, &ctx.arena, &ctx.config, s) {
        if termination::nontrivial(&ctx.arena, s) {
            if let Some(solution) =
                output::render_success(&ctx.memo, &ctx.arena, &ctx.config, s, completion)
            {
                return Ok(Some(solution));
            }
        }
    }

    let spark = spark_mask(&ctx.arena, &ctx.config, s);
    let period = ctx.config.period;
    let width = ctx.config.total_width();
    let parent = ctx.arena.parent(s);
    for phase in 0..period {
        ctx.rows.begin_phase(phase);
        let scan = ExtensionScan::new(
            &ctx.memo.extension,
            ctx.config.symmetry,
            width,
            ctx.arena.row(s, phase),
            ctx.arena.row(parent, phase),
            ctx.arena.row(s, (phase + 1) % period),
            spark,
        );
        scan.list_rows(&ctx.memo.extension, &mut ctx.rows, phase)?;
        if ctx.rows.n_rows[phase] == 0 {
            return Ok(None); // no possible extension in this phase
        }
    }

    let stator_mask = ctx.config.stator_mask();
    if stator_mask == 0 {
        process_group(ctx, s)?;
        return Ok(None);
    }

    for phase in 0..period {
        ctx.rows.sort_phase(phase, stator_mask);
    }
    ctx.rows.begin_groups(period);
    while ctx.rows.groups_remaining() {
        match ctx.rows.advance_group(period, stator_mask) {
            GroupStep::Group => process_group(ctx, s)?,
            GroupStep::Skip => {}
            GroupStep::Done => break,
        }
    }
    Ok(None)
}

/// Wire up and enumerate one stator group, enqueueing every child tuple.
fn process_group(ctx: &mut SearchContext, s: StateId) -> Result<(), SearchError> {
    let SearchContext {
        config,
        memo,
        arena,
        rows,
        graph,
        dedup,
        statistics,
    } = ctx;
    graph.build_edges(memo, rows, arena, config, s)?;
    graph.build_reach(rows, config.period)?;
    let period = config.period;
    graph.enumerate(rows, period, |locals| {
        let mut child_rows = [0 as Row; MAX_PERIOD];
        for (phase, &local) in locals.iter().enumerate() {
            child_rows[phase] = rows.row_at(rows.first_row[phase] + local);
        }
        push_child(
            arena,
            dedup,
            &memo.zobrist,
            statistics,
            s,
            &child_rows[..period],
        )
    })
}

/// Append a child state, discarding it again when it is the all-zero child
/// of the root or a duplicate of an already-queued state.
fn push_child(
    arena: &mut StateArena,
    dedup: &mut DedupTable,
    zobrist: &crate::memo::ZobristKeys,
    statistics: &mut Statistics,
    parent: StateId,
    rows: &[Row],
) -> Result<(), SearchError> {
    let child = arena.push(parent, rows)?;
    if arena.parent(parent) == parent && rows.iter().all(|&row| row == 0) {
        arena.retract(child); // zero successor of zero
        return Ok(());
    }
    if dedup.enabled && dedup.insert(arena, zobrist, child) {
        arena.retract(child);
        statistics.increment(Counter::DuplicatesDiscarded);
        return Ok(());
    }
    statistics.increment(Counter::StatesEnqueued);
    Ok(())
}

/// Sparks relax the extension lookups for the first rows of the search: the
/// pattern must work whether the seeded spark rows are present or not. How
/// much history is discounted depends on how far below the seeds `s` sits.
fn spark_mask(arena: &StateArena, config: &SearchConfig, s: StateId) -> u32 {
    if config.spark_level == 0 {
        return !0;
    }
    let mut level = 0;
    // Discount the original two rows.
    let p = arena.parent(arena.parent(s));
    if arena.parent(p) != p {
        level = 1;
        if arena.parent(arena.parent(p)) != arena.parent(p) {
            level = 2;
        }
    }
    if config.spark_level <= level {
        return !0;
    }
    if config.spark_level > level + 1 {
        // Relax the whole neighbourhood history.
        !(ExtensionTables::index(0, !0, !0, !0) as u32)
    } else {
        // Relax only the row above.
        !(ExtensionTables::index(0, 0, !0, 0) as u32)
    }
}
