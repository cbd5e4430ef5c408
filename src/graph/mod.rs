// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The phase-wise compatibility and reachability graph.
//!
//! For one stator group of candidate rows, this is a P-partite graph: an
//! edge from row `i` in phase k-1 to row `j` in phase k means `i` can be
//! made to evolve into `j` under the expanded state's row history. A new
//! child state is any choice of one row per phase forming a cycle through
//! these edges.
//!
//! Edges are stored as packed bit blocks, one block per (phase, row) over
//! the previous phase's rows. On top of the edges a reachability closure is
//! built backwards from the last phase: for every row, which phase-0 rows
//! can complete the cycle from here. The tuple enumeration prunes on both
//! structures, which is what keeps the cross-product affordable.

use crate::config::{SearchConfig, MAX_PERIOD};
use crate::error::SearchError;
use crate::memo::MemoizedData;
use crate::queue::{StateArena, StateId};
use crate::rows::{ExtensionScan, RowBuffer};

/// Bit blocks for edges and reachability, with per-phase segment tables.
#[derive(Debug)]
pub struct CompatGraph {
    compat_bits: Vec<u32>,
    reach_bits: Vec<u32>,
    first_compat: [usize; MAX_PERIOD],
    block_len: [usize; MAX_PERIOD],
    first_reach: [usize; MAX_PERIOD],
    reach_len: usize,
}

impl CompatGraph {
    pub fn new(capacity_words: usize) -> Self {
        Self {
            compat_bits: vec![0; capacity_words],
            reach_bits: vec![0; capacity_words],
            first_compat: [0; MAX_PERIOD],
            block_len: [0; MAX_PERIOD],
            first_reach: [0; MAX_PERIOD],
            reach_len: 0,
        }
    }

    /// Build the edge bitmaps for the current stator group. `s` is the state
    /// being expanded; its row at phase k-1 is the "row above" context for
    /// edges into phase k.
    pub fn build_edges(
        &mut self,
        memo: &MemoizedData,
        buffer: &RowBuffer,
        arena: &StateArena,
        config: &SearchConfig,
        s: StateId,
    ) -> Result<(), SearchError> {
        let period = config.period;
        let width = config.total_width();
        let stator_mask = config.stator_mask();
        for phase in 0..period {
            let prev = if phase == 0 { period - 1 } else { phase - 1 };
            self.first_compat[phase] = if phase == 0 {
                0
            } else {
                self.first_compat[prev] + self.block_len[prev] * buffer.n_rows[prev]
            };
            self.block_len[phase] = (buffer.n_rows[prev] + 31) >> 5;
            if self.first_compat[phase] + self.block_len[phase] * buffer.n_rows[phase]
                > self.compat_bits.len()
            {
                return Err(SearchError::CompatibilityOverflow);
            }
            let above = arena.row(s, prev);
            for j in 0..buffer.n_rows[phase] {
                let block = self.first_compat[phase] + self.block_len[phase] * j;
                self.compat_bits[block..block + self.block_len[phase]].fill(0);
                let row_j = buffer.row_at(buffer.first_row[phase] + j);
                for i in 0..buffer.n_rows[prev] {
                    let row_i = buffer.row_at(buffer.first_row[prev] + i);
                    if (row_i ^ row_j) & stator_mask != 0 {
                        continue;
                    }
                    let scan = ExtensionScan::new(
                        &memo.extension,
                        config.symmetry,
                        width,
                        row_i,
                        above,
                        row_j,
                        !0,
                    );
                    if scan.path_exists() {
                        self.compat_bits[block + (i >> 5)] |= 1 << (i & 31);
                    }
                }
            }
        }
        Ok(())
    }

    /// Edge test. Row indices are absolute buffer positions, as stored in
    /// `buffer.first_row[..] + local`.
    pub fn compatible(
        &self,
        buffer: &RowBuffer,
        phase: usize,
        prev_row_index: usize,
        row_index: usize,
        period: usize,
    ) -> bool {
        let prev = if phase == 0 { period - 1 } else { phase - 1 };
        let block = self.first_compat[phase]
            + self.block_len[phase] * (row_index - buffer.first_row[phase]);
        let i = prev_row_index - buffer.first_row[prev];
        self.compat_bits[block + (i >> 5)] & (1 << (i & 31)) != 0
    }

    /// Build the reachability closure backwards from the last phase.
    pub fn build_reach(
        &mut self,
        buffer: &RowBuffer,
        period: usize,
    ) -> Result<(), SearchError> {
        self.reach_len = (buffer.n_rows[0] + 31) >> 5;
        self.first_reach[period - 1] = 0;
        if buffer.n_rows[period - 1] * self.reach_len >= self.reach_bits.len() {
            return Err(SearchError::ReachabilityOverflow);
        }
        for i in 0..buffer.n_rows[period - 1] {
            let start = i * self.reach_len;
            self.reach_bits[start..start + self.reach_len].fill(0);
            for j in 0..buffer.n_rows[0] {
                if self.compatible(
                    buffer,
                    0,
                    buffer.first_row[period - 1] + i,
                    buffer.first_row[0] + j,
                    period,
                ) {
                    self.reach_bits[start + (j >> 5)] |= 1 << (j & 31);
                }
            }
        }
        for phase in (0..period.saturating_sub(1)).rev() {
            self.first_reach[phase] =
                self.first_reach[phase + 1] + buffer.n_rows[phase + 1] * self.reach_len;
            if self.first_reach[phase] + buffer.n_rows[phase] * self.reach_len
                >= self.reach_bits.len()
            {
                return Err(SearchError::ReachabilityOverflow);
            }
            for i in 0..buffer.n_rows[phase] {
                let start = self.first_reach[phase] + i * self.reach_len;
                self.reach_bits[start..start + self.reach_len].fill(0);
                for j in 0..buffer.n_rows[phase + 1] {
                    if self.compatible(
                        buffer,
                        phase + 1,
                        buffer.first_row[phase] + i,
                        buffer.first_row[phase + 1] + j,
                        period,
                    ) {
                        let from = self.first_reach[phase + 1] + j * self.reach_len;
                        for k in 0..self.reach_len {
                            self.reach_bits[start + k] |= self.reach_bits[from + k];
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Can phase-0 row `first_row_local` be reached from row `row_local` of
    /// `phase`? Both indices are local to their phase segment.
    pub fn reachable(&self, phase: usize, first_row_local: usize, row_local: usize) -> bool {
        let word = self.first_reach[phase] + row_local * self.reach_len + (first_row_local >> 5);
        self.reach_bits[word] & (1 << (first_row_local & 31)) != 0
    }

    /// Enumerate every row tuple (one row per phase) closing a compatible
    /// cycle, by coordinate-wise backtracking with reachability pruning.
    /// `emit` receives local row indices per phase.
    pub fn enumerate<F>(
        &self,
        buffer: &RowBuffer,
        period: usize,
        mut emit: F,
    ) -> Result<(), SearchError>
    where
        F: FnMut(&[usize]) -> Result<(), SearchError>,
    {
        let mut indices = [-1isize; MAX_PERIOD];
        let mut chosen = [0usize; MAX_PERIOD];
        let mut phase: isize = -1;
        loop {
            phase += 1;
            while indices[phase as usize] == buffer.n_rows[phase as usize] as isize - 1 {
                indices[phase as usize] = -1;
                phase -= 1;
                if phase < 0 {
                    return Ok(());
                }
            }
            indices[phase as usize] += 1;
            let p = phase as usize;
            let local = indices[p] as usize;
            if !self.reachable(p, indices[0] as usize, local) {
                phase -= 1;
            } else if p > 0
                && !self.compatible(
                    buffer,
                    p,
                    buffer.first_row[p - 1] + indices[p - 1] as usize,
                    buffer.first_row[p] + local,
                    period,
                )
            {
                phase -= 1;
            } else if p == period - 1 {
                if self.compatible(
                    buffer,
                    0,
                    buffer.first_row[p] + local,
                    buffer.first_row[0] + indices[0] as usize,
                    period,
                ) {
                    for (k, &index) in indices[..period].iter().enumerate() {
                        chosen[k] = index as usize;
                    }
                    emit(&chosen[..period])?;
                }
                phase -= 1;
            }
        }
    }
}
