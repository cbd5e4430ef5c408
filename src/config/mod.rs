// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search configuration.
//!
//! A [`SearchConfig`] is the fully populated parameter record the search core
//! consumes: the rule, the period, the column geometry (rotor plus optional
//! stator columns), symmetry options, optional seed history rows, and the
//! memory caps for the preallocated buffers. Validation happens once at the
//! boundary via [`SearchConfig::validate`]; the core assumes a valid record.
//!
//! The geometry fields are live state as well as configuration: when the
//! iterative-deepening limit is hit, the search contracts the rotor by moving
//! columns into the stator, so the copy owned by the context mutates during
//! long runs.

use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::rule::Rule;

/// One horizontal line of cells, packed as a bitmap. Bit `i` is the cell in
/// column `i`; column 0 is the symmetry axis when row reflection is in use.
pub type Row = u32;

/// Exclusive upper bound on the period, sized to match the per-phase
/// bookkeeping arrays.
pub const MAX_PERIOD: usize = 20;

/// Rows are packed in 32-bit words, so patterns are at most 32 columns wide.
pub const MAX_WIDTH: usize = 32;

/// Column symmetry of the searched patterns.
///
/// `Odd` and `Even` restrict every row to be a palindrome; the stored rows
/// then cover only the axis-and-right half, with column 0 on the axis. For
/// `Odd` the axis column is shared between the two halves, for `Even` it is
/// duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Symmetry {
    #[default]
    None,
    Odd,
    Even,
}

/// Rejected configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("period must be in 1..{}", MAX_PERIOD - 1)]
    PeriodOutOfRange(usize),

    #[error("rotor width must be in 1..={MAX_WIDTH}")]
    RotorWidthOutOfRange(usize),

    #[error("total width {0} exceeds {MAX_WIDTH} columns")]
    TotalWidthTooLarge(usize),

    #[error("left stator columns require symmetry 'none'")]
    LeftStatorWithSymmetry,

    #[error("spark level must be 0, 1 or 2")]
    SparkLevelOutOfRange(u8),

    #[error("at most two seed history states are allowed")]
    TooManySeedStates,

    #[error("seed state must have one row per phase ({period} rows, got {got})")]
    SeedStateLength { period: usize, got: usize },

    #[error("seed row has live cells outside the {0}-column width")]
    SeedRowTooWide(usize),

    #[error("hash table bits must be in 10..=30")]
    HashBitsOutOfRange(u32),

    #[error("{0} capacity too small")]
    CapacityTooSmall(&'static str),
}

/// The parameter record consumed by the search core.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// The 18-bit outer-totalistic rule.
    pub rule: Rule,
    /// Oscillator period, in 1..[`MAX_PERIOD`].
    pub period: usize,
    /// Column symmetry of every row.
    pub symmetry: Symmetry,
    /// Allow completing a pattern early by mirroring its rows when a
    /// row-symmetric configuration is detected.
    pub allow_row_sym: bool,
    /// Columns allowed to oscillate.
    pub rotor_width: usize,
    /// Still-life columns left of the rotor (symmetry `None` only).
    pub left_stator_width: usize,
    /// Still-life columns right of the rotor.
    pub right_stator_width: usize,
    /// Forbid the final stator rows from exceeding the width limit.
    pub zero_lot_line: bool,
    /// Contract the rotor when deepening exceeds this amount (0 = unlimited).
    pub max_deepen: usize,
    /// How many seed rows are treated as sometimes-present sparks (0..=2).
    pub spark_level: u8,
    /// Up to two seed history states, oldest first; each has one row per
    /// phase. The search frontier starts at the last seed.
    pub seed_states: Vec<Vec<Row>>,

    /// State arena size in words; each state occupies `period + 1` words and
    /// the breadth-first queue compacts itself at half this cap.
    pub state_capacity_words: usize,
    /// Shared extension-row buffer length.
    pub row_capacity: usize,
    /// Word capacity of each of the compatibility and reachability arenas.
    pub bit_arena_words: usize,
    /// log2 of the duplicate hash table size.
    pub hash_bits: u32,
}

impl SearchConfig {
    /// A configuration with the given rule and period and defaults matching
    /// an unconstrained asymmetric search.
    pub fn new(rule: Rule, period: usize) -> Self {
        Self {
            rule,
            period,
            symmetry: Symmetry::None,
            allow_row_sym: true,
            rotor_width: 4,
            left_stator_width: 0,
            right_stator_width: 0,
            zero_lot_line: false,
            max_deepen: 0,
            spark_level: 0,
            seed_states: Vec::new(),
            state_capacity_words: 1 << 22,
            row_capacity: 1 << 20,
            bit_arena_words: 1 << 21,
            hash_bits: 21,
        }
    }

    /// Set the column symmetry.
    pub fn set_symmetry(mut self, symmetry: Symmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Set rotor and stator column counts.
    pub fn set_widths(mut self, rotor: usize, left: usize, right: usize) -> Self {
        self.rotor_width = rotor;
        self.left_stator_width = left;
        self.right_stator_width = right;
        self
    }

    /// Allow or forbid symmetric completion of patterns.
    pub fn set_allow_row_sym(mut self, allow: bool) -> Self {
        self.allow_row_sym = allow;
        self
    }

    /// Forbid or allow the final stator rows to exceed the width limit.
    pub fn set_zero_lot_line(mut self, strict: bool) -> Self {
        self.zero_lot_line = strict;
        self
    }

    /// Set the deepening limit (0 = unlimited).
    pub fn set_max_deepen(mut self, max_deepen: usize) -> Self {
        self.max_deepen = max_deepen;
        self
    }

    /// Install seed history states and the spark level.
    pub fn set_seed_states(mut self, seed_states: Vec<Vec<Row>>, spark_level: u8) -> Self {
        self.seed_states = seed_states;
        self.spark_level = spark_level;
        self
    }

    /// Override the state arena capacity, in words.
    pub fn set_state_capacity_words(mut self, words: usize) -> Self {
        self.state_capacity_words = words;
        self
    }

    /// Total pattern width in stored columns.
    #[inline]
    pub fn total_width(&self) -> usize {
        self.rotor_width + self.left_stator_width + self.right_stator_width
    }

    /// Bitmap of the stator columns; the complement bits within the width
    /// form the rotor. Computed in 64 bits because rotor contraction can
    /// grow a stator to the full 32 columns.
    #[inline]
    pub fn stator_mask(&self) -> Row {
        let right = ((1u64 << self.right_stator_width) - 1)
            << (self.rotor_width + self.left_stator_width);
        let left = (1u64 << self.left_stator_width) - 1;
        (right | left) as Row
    }

    /// Check the record against the documented parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period < 1 || self.period >= MAX_PERIOD {
            return Err(ConfigError::PeriodOutOfRange(self.period));
        }
        if self.rotor_width < 1 || self.rotor_width > MAX_WIDTH {
            return Err(ConfigError::RotorWidthOutOfRange(self.rotor_width));
        }
        if self.total_width() > MAX_WIDTH {
            return Err(ConfigError::TotalWidthTooLarge(self.total_width()));
        }
        if self.symmetry != Symmetry::None && self.left_stator_width != 0 {
            return Err(ConfigError::LeftStatorWithSymmetry);
        }
        if self.spark_level > 2 {
            return Err(ConfigError::SparkLevelOutOfRange(self.spark_level));
        }
        if self.seed_states.len() > 2 {
            return Err(ConfigError::TooManySeedStates);
        }
        for state in &self.seed_states {
            if state.len() != self.period {
                return Err(ConfigError::SeedStateLength {
                    period: self.period,
                    got: state.len(),
                });
            }
            for &row in state {
                if self.total_width() < MAX_WIDTH && row >> self.total_width() != 0 {
                    return Err(ConfigError::SeedRowTooWide(self.total_width()));
                }
            }
        }
        if !(10..=30).contains(&self.hash_bits) {
            return Err(ConfigError::HashBitsOutOfRange(self.hash_bits));
        }
        // A state needs period+1 words and the queue turns over at half
        // capacity, so insist on room for a handful of states.
        if self.state_capacity_words < 8 * (self.period + 1) {
            return Err(ConfigError::CapacityTooSmall("state arena"));
        }
        if self.row_capacity < 1 << 8 {
            return Err(ConfigError::CapacityTooSmall("row buffer"));
        }
        if self.bit_arena_words < 1 << 8 {
            return Err(ConfigError::CapacityTooSmall("bit arena"));
        }
        Ok(())
    }
}
