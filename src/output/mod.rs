// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Rendering found patterns, status lines and the deepest-line report.
//!
//! Rows render left to right as `.`/`o`. The layout mirrors the stored
//! half-rows for column-symmetric searches (odd symmetry shares the axis
//! column, even duplicates it), pads with the extra stator columns the
//! empty-pattern fixpoint requires, and keeps the single-dot alignment
//! column of asymmetric patterns without extra columns.
//!
//! Everything renders into `String`s. The search driver and the binary
//! decide what reaches stdout; tests assert on the rendered content.

use std::fmt;

use crate::config::{Row, SearchConfig, Symmetry};
use crate::memo::MemoizedData;
use crate::queue::{StateArena, StateId};
use crate::termination::{complete_stator, Completion, StatorPlan};

/// A successfully completed oscillator, rendered top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub lines: Vec<String>,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

// 64-bit shift: the padded render can address columns past bit 31.
#[inline]
fn cell(row: Row, bit: usize) -> char {
    if (row as u64) >> bit & 1 != 0 {
        'o'
    } else {
        '.'
    }
}

/// Render one stored row with mirroring and stator-column padding.
pub fn put_row(config: &SearchConfig, addl_cols: usize, row: Row) -> String {
    let width = config.total_width();
    let mut out = String::new();
    for _ in 0..addl_cols {
        out.push('.');
    }
    match config.symmetry {
        Symmetry::None => {
            if addl_cols == 0 {
                out.push('.'); // alignment column
            }
        }
        Symmetry::Odd => {
            for bit in (1..width).rev() {
                out.push(cell(row, bit));
            }
        }
        Symmetry::Even => {
            for bit in (0..width).rev() {
                out.push(cell(row, bit));
            }
        }
    }
    for bit in 0..=width + addl_cols - 1 {
        out.push(cell(row, bit));
    }
    out
}

/// Render the completed pattern for a terminal, nontrivial state.
///
/// For a stator-capped completion this runs the minimal-stator DP; when the
/// DP finds nothing the success was incomplete and `None` is returned so
/// the search continues.
pub fn render_success(
    memo: &MemoizedData,
    arena: &StateArena,
    config: &SearchConfig,
    s: StateId,
    completion: Completion,
) -> Option<Solution> {
    let plan = match completion {
        Completion::StatorCapped => Some(complete_stator(memo, arena, config, s)?),
        _ => None,
    };
    let addl = memo.termination.addl_stator_cols;
    let offset = completion.phase_offset();

    // Phase-0 row and phase-offset row of every ancestor, deepest first.
    // Both rows are stored explicitly so the offset-0 and offset-P/2
    // mirror branches read the same data.
    let mut pairs: Vec<(Row, Row)> = Vec::new();
    let mut t = s;
    while arena.parent(t) != t && t != StateId::ROOT {
        pairs.push((arena.row(t, 0), arena.row(t, offset)));
        t = arena.parent(t);
    }

    let mut lines = Vec::new();
    for &(row, _) in pairs.iter().rev() {
        lines.push(put_row(config, addl, row));
    }
    match completion {
        Completion::EvenRows { .. } => {
            // The deepest two rows are the mirror axis pair.
            for &(_, mirrored) in pairs.iter().skip(2) {
                lines.push(put_row(config, addl, mirrored));
            }
        }
        Completion::OddRows { .. } => {
            // The parent's row is the shared axis row.
            for &(_, mirrored) in pairs.iter().skip(3) {
                lines.push(put_row(config, addl, mirrored));
            }
        }
        Completion::StatorCapped => {
            let plan = plan.as_ref()?;
            for line in 0..5 {
                lines.push(stator_line(config, addl, plan, line));
            }
        }
    }
    Some(Solution { lines })
}

/// One of the five rows of resolved stator appended below an asymmetric
/// completion.
fn stator_line(config: &SearchConfig, addl: usize, plan: &StatorPlan, line: usize) -> String {
    let mut out = String::new();
    match config.symmetry {
        Symmetry::Odd => {
            put_stator(&mut out, config, addl, plan, line, 0, plan.fwd_best, plan.back_best, false, 1);
            put_stator(&mut out, config, addl, plan, line, -1, plan.back_best, plan.fwd_best, true, 1);
        }
        Symmetry::Even => {
            put_stator(&mut out, config, addl, plan, line, -1, plan.fwd_best, plan.back_best, false, 1);
            put_stator(&mut out, config, addl, plan, line, -1, plan.back_best, plan.fwd_best, true, 1);
        }
        Symmetry::None => {
            put_stator(
                &mut out,
                config,
                addl,
                plan,
                line,
                config.total_width() as i32,
                plan.back_best,
                plan.fwd_best,
                false,
                1,
            );
            put_stator(&mut out, config, addl, plan, line, -2, plan.fwd_best, plan.back_best, true, 1);
        }
    }
    out
}

/// Walk the DP predecessor chain from `(i, j)` at `col` and emit cells:
/// pre-order when `reversed` (ascending columns), post-order otherwise
/// (descending). `skip` suppresses the shared boundary column.
#[allow(clippy::too_many_arguments)]
fn put_stator(
    out: &mut String,
    config: &SearchConfig,
    addl: usize,
    plan: &StatorPlan,
    line: usize,
    col: i32,
    i: usize,
    j: usize,
    reversed: bool,
    skip: i32,
) {
    if skip <= 0 && reversed {
        out.push(cell(j as Row, line));
    }
    if col < (config.total_width() + addl) as i32 - 1 {
        put_stator(
            out,
            config,
            addl,
            plan,
            line,
            col + 1,
            plan.pred_at(col, i, j),
            i,
            reversed,
            skip - 1,
        );
    }
    if skip <= 0 && !reversed {
        out.push(cell(j as Row, line));
    }
}

/// The deepest partial pattern, walking parent links up from the state just
/// before the frontier. This is what exhaustion, fatal errors and the
/// compaction status report.
pub fn deepest_lines(
    memo: &MemoizedData,
    arena: &StateArena,
    config: &SearchConfig,
) -> Option<Vec<String>> {
    let mut t = arena.last_processed()?;
    let mut lines = Vec::new();
    while arena.parent(t) != t {
        lines.push(put_row(config, memo.termination.addl_stator_cols, arena.row(t, 0)));
        t = arena.parent(t);
    }
    Some(lines)
}

/// Approximate state count for the status line: divides out the period and
/// abbreviates with `k`/`M`.
pub fn approx(words: usize, period: usize) -> String {
    let mut n = words / period;
    if n <= 9999 {
        return n.to_string();
    }
    let mut unit = 'k';
    if n > 999_999 {
        n /= 1000;
        unit = 'M';
    }
    if n > 99_999 {
        format!("{}{}", n / 1000, unit)
    } else {
        format!("{}.{}{}", n / 1000, (n % 1000) / 100, unit)
    }
}
