// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Shared test helpers: an independent cellular-automaton evolver used to
//! validate found patterns, and a small deterministic generator for the
//! randomised property tests.

// Not every integration test uses every helper.
#![allow(dead_code)]

use osc_search::Rule;

/// A finite grid of cells; row-major, possibly ragged.
pub type Grid = Vec<Vec<bool>>;

/// Parse `.`/`o` lines into a grid.
pub fn parse_pattern(lines: &[String]) -> Grid {
    lines
        .iter()
        .map(|line| line.chars().map(|ch| ch == 'o' || ch == 'O').collect())
        .collect()
}

fn cell(grid: &Grid, row: i64, col: i64) -> bool {
    if row < 0 || col < 0 {
        return false;
    }
    grid.get(row as usize)
        .and_then(|cells| cells.get(col as usize))
        .copied()
        .unwrap_or(false)
}

/// One synchronous generation, growing the grid by a one-cell margin.
pub fn evolve(grid: &Grid, rule: Rule) -> Grid {
    let height = grid.len() as i64;
    let width = grid.iter().map(Vec::len).max().unwrap_or(0) as i64;
    let mut next = Vec::new();
    for row in -1..=height {
        let mut cells = Vec::new();
        for col in -1..=width {
            let mut neighbours = 0;
            for dr in -1..=1i64 {
                for dc in -1..=1i64 {
                    if (dr, dc) != (0, 0) && cell(grid, row + dr, col + dc) {
                        neighbours += 1;
                    }
                }
            }
            cells.push(rule.next_state(cell(grid, row, col), neighbours));
        }
        next.push(cells);
    }
    next
}

pub fn evolve_n(grid: &Grid, rule: Rule, generations: usize) -> Grid {
    let mut grid = grid.clone();
    for _ in 0..generations {
        grid = evolve(&grid, rule);
    }
    grid
}

/// Trim a grid to the bounding box of its live cells (empty grid -> empty).
pub fn trim(grid: &Grid) -> Grid {
    let mut top = usize::MAX;
    let mut bottom = 0;
    let mut left = usize::MAX;
    let mut right = 0;
    for (r, row) in grid.iter().enumerate() {
        for (c, &alive) in row.iter().enumerate() {
            if alive {
                top = top.min(r);
                bottom = bottom.max(r);
                left = left.min(c);
                right = right.max(c);
            }
        }
    }
    if top == usize::MAX {
        return Vec::new();
    }
    (top..=bottom)
        .map(|r| {
            (left..=right)
                .map(|c| grid[r].get(c).copied().unwrap_or(false))
                .collect()
        })
        .collect()
}

pub fn population(grid: &Grid) -> usize {
    grid.iter()
        .map(|row| row.iter().filter(|&&alive| alive).count())
        .sum()
}

/// Assert that the printed pattern is a genuine oscillator of exactly the
/// given period under `rule`.
pub fn assert_oscillator(lines: &[String], rule: Rule, period: usize) {
    let grid = trim(&parse_pattern(lines));
    assert!(!grid.is_empty(), "pattern is empty:\n{lines:?}");
    assert_eq!(
        trim(&evolve_n(&grid, rule, period)),
        grid,
        "pattern does not reproduce itself after {period} generations:\n{}",
        lines.join("\n")
    );
    for divisor in 1..period {
        if period % divisor == 0 {
            assert_ne!(
                trim(&evolve_n(&grid, rule, divisor)),
                grid,
                "pattern already repeats after {divisor} generations:\n{}",
                lines.join("\n")
            );
        }
    }
}

/// Deterministic multiplicative generator for sampling in property tests.
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform-ish index below `bound` (bound > 0).
    pub fn below(&mut self, bound: usize) -> usize {
        ((self.next_u64() >> 16) % bound as u64) as usize
    }
}
