// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Queue compaction: bounded depth-first probes followed by a three-pass
//! mark / slide / relink garbage collection of the state arena.
//!
//! Each compaction deepens one level further than the last. Pending states
//! whose probe cannot reach the target depth are marked dead, every
//! processed state no live state descends from is marked dead too, the
//! survivors are slid to the front of the arena, and the parent links are
//! rewritten purely from the equal/unequal pattern of the stale values:
//! consecutive slots with the same stale parent share the fixed-up parent,
//! a change in the stale value steps the fixed-up parent one slot forward.
//! Children always follow their parents in the arena, which is what makes
//! that pattern rewrite sound.
//!
//! Hashing is disabled for the probes (their transient states must not
//! pollute the table) and the whole table is rebuilt from the survivors.

use std::io::{self, Write};

use super::{process, SearchDriver};
use crate::context::{Counter, SearchContext};
use crate::error::SearchError;
use crate::output::{self, Solution};
use crate::queue::StateId;

/// Result of one bounded depth-first probe.
enum Probe {
    /// The probe ran into a finished oscillator.
    Solved(Solution),
    /// Some descendant reached the target depth.
    Deep,
    /// The subtree dies out.
    Dead,
}

/// Probe `levels` generations below `s`, reusing the arena tail as the DFS
/// stack: children are expanded in place and rolled back afterwards.
fn depth_first(
    ctx: &mut SearchContext,
    s: StateId,
    levels: usize,
) -> Result<Probe, SearchError> {
    let checkpoint = ctx.arena.first_free();
    if levels == 0 {
        return Ok(Probe::Deep);
    }
    if let Some(solution) = process(ctx, s)? {
        return Ok(Probe::Solved(solution));
    }
    while checkpoint < ctx.arena.first_free() {
        let child = ctx.arena.retreat(ctx.arena.first_free());
        match depth_first(ctx, child, levels - 1)? {
            Probe::Solved(solution) => return Ok(Probe::Solved(solution)),
            Probe::Deep => {
                ctx.arena.set_first_free(checkpoint);
                return Ok(Probe::Deep);
            }
            Probe::Dead => ctx.arena.set_first_free(child),
        }
    }
    ctx.arena.set_first_free(checkpoint);
    Ok(Probe::Dead)
}

/// Probe every pending state, marking the ones that cannot go deep enough.
/// Returns how many were killed alongside any solution a probe found.
fn deepen(
    ctx: &mut SearchContext,
    levels: usize,
) -> Result<(Option<Solution>, usize), SearchError> {
    let mut killed = 0;
    let mut s = ctx.arena.first_unprocessed();
    while s < ctx.arena.first_free() {
        ctx.statistics.increment(Counter::DeepeningProbes);
        match depth_first(ctx, s, levels)? {
            Probe::Solved(solution) => return Ok((Some(solution), killed)),
            Probe::Deep => {}
            Probe::Dead => {
                ctx.arena.set_parent(s, StateId::UNUSED);
                killed += 1;
            }
        }
        s = ctx.arena.advance(s);
    }
    Ok((None, killed))
}

/// Full compaction. Prints the status line mandated for long runs and
/// returns a solution when a probe stumbles onto one.
pub(super) fn run(
    driver: &mut SearchDriver,
    ctx: &mut SearchContext,
) -> Result<Option<Solution>, SearchError> {
    ctx.statistics.increment(Counter::Compactions);
    let old_unprocessed = ctx.arena.first_unprocessed();
    let old_free = ctx.arena.first_free();
    let period = ctx.config.period;
    let frontier_depth = ctx.arena.depth(old_unprocessed);
    if frontier_depth > driver.last_depth {
        driver.last_depth = frontier_depth;
    }
    driver.last_depth += 1;

    print!("Queue full, depth = {frontier_depth}, ");
    if ctx.config.max_deepen > 0
        && ctx.config.rotor_width > 0
        && driver.last_depth - frontier_depth > ctx.config.max_deepen
    {
        // Deepening has hit its limit: trade a rotor column for stator.
        ctx.config.rotor_width -= 1;
        ctx.config.right_stator_width += 1;
        if ctx.config.left_stator_width > 0 && ctx.config.rotor_width > 0 {
            ctx.config.left_stator_width += 1;
            ctx.config.rotor_width -= 1;
        }
        print!("shrinking rotor, ");
        driver.last_depth = frontier_depth + 1;
    }
    let levels = driver.last_depth - frontier_depth;
    print!(
        "deepening {levels}, {}/{}",
        output::approx(old_free.index() - old_unprocessed.index(), period),
        output::approx(old_free.index(), period)
    );
    io::stdout().flush().ok();

    ctx.dedup.enabled = false;
    let (solved, killed) = deepen(ctx, levels)?;
    ctx.dedup.enabled = true;
    if let Some(solution) = solved {
        println!();
        return Ok(Some(solution));
    }
    print!(" -> ");
    io::stdout().flush().ok();

    // Pass 1: walk backwards, marking processed states that no later live
    // state names as parent. `probe` trails behind looking for children of
    // the state `mark` is inspecting.
    let mut mark = ctx.arena.retreat(ctx.arena.first_unprocessed());
    let mut probe = ctx.arena.retreat(ctx.arena.first_free());
    ctx.dedup.clear();
    while ctx.arena.parent(probe) == StateId::UNUSED {
        probe = ctx.arena.retreat(probe);
    }
    let mut dead = 0usize;
    loop {
        while ctx.arena.parent(probe) != mark {
            if ctx.arena.parent(mark) == mark {
                return Err(SearchError::OrphanedState);
            }
            ctx.arena.set_parent(mark, StateId::UNUSED);
            mark = ctx.arena.retreat(mark);
            dead += 1;
        }
        if ctx.arena.parent(mark) == mark {
            break;
        }
        while ctx.arena.parent(probe) == mark || ctx.arena.parent(probe) == StateId::UNUSED {
            probe = ctx.arena.retreat(probe);
        }
        mark = ctx.arena.retreat(mark);
        if ctx.arena.parent(mark) == mark {
            break;
        }
    }

    if dead + killed > 0 {
        // Pass 2: slide live states into the leftmost free slots. Killed
        // pending states must be swept out here too, or the queue would
        // later hand out slots with the dead-sentinel parent.
        let frontier = ctx.arena.first_unprocessed();
        let mut dest = StateId::ROOT;
        while ctx.arena.parent(dest) != StateId::UNUSED {
            dest = ctx.arena.advance(dest);
        }
        let mut src = dest;
        while src < ctx.arena.first_free() {
            let live = ctx.arena.parent(src) != StateId::UNUSED;
            let copied_to = dest;
            if live {
                let parent = ctx.arena.parent(src);
                ctx.arena.set_parent(dest, parent);
                for phase in 0..period {
                    let row = ctx.arena.row(src, phase);
                    ctx.arena.set_row(dest, phase, row);
                }
                dest = ctx.arena.advance(dest);
            }
            if src == frontier {
                // The frontier head itself may have moved; keep it pending.
                let new_frontier = if live { copied_to } else { dest };
                ctx.arena.set_first_unprocessed(new_frontier);
            }
            src = ctx.arena.advance(src);
        }
        ctx.arena.set_first_free(dest);

        // Pass 3: rewrite parent links from the stale-value pattern and
        // rebuild the hash table.
        let mut slot = ctx.arena.advance(StateId::ROOT);
        let mut stale_parent = StateId::ROOT;
        while slot < ctx.arena.first_free() {
            let prev = ctx.arena.retreat(slot);
            if ctx.arena.parent(slot) == stale_parent {
                let parent = ctx.arena.parent(prev);
                ctx.arena.set_parent(slot, parent);
            } else {
                stale_parent = ctx.arena.parent(slot);
                let parent = ctx.arena.advance(ctx.arena.parent(prev));
                ctx.arena.set_parent(slot, parent);
            }
            let SearchContext {
                arena, dedup, memo, ..
            } = ctx;
            dedup.insert(arena, &memo.zobrist, slot);
            slot = ctx.arena.advance(slot);
        }
    }

    print!(
        "{}/{}",
        output::approx(
            ctx.arena.first_free().index() - ctx.arena.first_unprocessed().index(),
            period
        ),
        output::approx(ctx.arena.first_free().index(), period)
    );
    match output::deepest_lines(&ctx.memo, &ctx.arena, &ctx.config) {
        Some(lines) => {
            println!("\nCurrent line found:");
            for line in lines {
                println!("{line}");
            }
        }
        None => println!("\nUnable to find current search line."),
    }
    println!();
    io::stdout().flush().ok();
    tracing::debug!(
        dead,
        levels,
        frontier_depth,
        live_words = ctx.arena.first_free().index(),
        "compaction finished"
    );
    Ok(None)
}
