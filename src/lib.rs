// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Rust implementation of an oscillator search for two-state
//! outer-totalistic ("B/S") cellular automata, after David Eppstein's
//! `ofind`.
//!
//! Given a rule, a period P, a width budget split into rotor and stator
//! columns, and optional symmetry constraints, the search enumerates
//! minimal patterns that return to their starting state after P
//! generations and whose oscillating cells are surrounded by a valid
//! still-life stator.
//!
//! # Architecture
//!
//! The implementation uses a two-tier memory model:
//!
//! ## Tier 1: MEMO Data (Immutable)
//!
//! Precomputed data that never changes during search:
//! - Extension tables (windowed row-evolution transitions)
//! - Termination tables (block-state column sweeps, still-life column DP)
//! - Zobrist key tables for duplicate elimination
//!
//! ## Tier 2: DYNAMIC Data (Mutable)
//!
//! Search state owned by the [`SearchContext`]:
//! - The state arena: a flat queue of P-phase states with parent links
//! - The shared row buffer with per-phase segments
//! - Compatibility/reachability bit arenas
//! - The duplicate hash table and search statistics
//!
//! # Search Algorithm
//!
//! A hybrid breadth-first / iterative-deepening depth-first search over
//! partial patterns, where each step adds one row in *every* phase at once
//! (see <https://arxiv.org/abs/cs/0004003> for the family of searches this
//! belongs to):
//!
//! 1. Dequeue a state and test it for termination (row-symmetric wrap or
//!    still-life stator cap).
//! 2. Enumerate all candidate next rows per phase, grouped by stator bits.
//! 3. Build the per-group compatibility graph across adjacent phases plus a
//!    reachability closure back to phase 0.
//! 4. Enqueue every row tuple that closes a compatible cycle.
//! 5. When the queue fills, discard subtrees that a bounded depth-first
//!    probe proves shallow, and compact the arena.
//!
//! # Example
//!
//! Find the blinker:
//!
//! ```no_run
//! use osc_search::{Outcome, Rule, SearchConfig, SearchContext, SearchDriver, Symmetry};
//!
//! let config = SearchConfig::new(Rule::LIFE, 2)
//!     .set_symmetry(Symmetry::Odd)
//!     .set_widths(3, 0, 0);
//! let mut ctx = SearchContext::new(config).unwrap();
//! let outcome = SearchDriver::new().run(&mut ctx).unwrap();
//! if let Outcome::Found(solution) = outcome {
//!     print!("{solution}");
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod memo;
pub mod output;
pub mod queue;
pub mod rows;
pub mod rule;
pub mod search;
pub mod termination;

// Re-export commonly used types
pub use config::{Row, SearchConfig, Symmetry};
pub use context::SearchContext;
pub use error::{SearchError, SetupError};
pub use output::Solution;
pub use rule::Rule;
pub use search::{Outcome, SearchDriver};
