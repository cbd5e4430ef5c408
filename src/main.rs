// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Command-line front end for the oscillator search.
//!
//! Produces the configuration record the search core consumes, runs the
//! search, and prints the result: a blank line and the pattern on success,
//! `No patterns found` plus the deepest line reached on exhaustion. Both
//! outcomes exit 0; fatal capacity overflows report a diagnostic and the
//! deepest line, and also exit 0 so batch drivers treat them like
//! exhaustion.

use anyhow::{bail, Context, Result};
use clap::Parser;

use osc_search::output;
use osc_search::{Outcome, Row, Rule, SearchConfig, SearchContext, SearchDriver, Symmetry};

/// Search for period-P oscillators in a B/S cellular automaton.
#[derive(Parser)]
#[command(name = "osc-search", version)]
struct Args {
    /// Cellular automaton rule, e.g. B3/S23.
    #[arg(long, default_value = "B3/S23")]
    rule: Rule,

    /// Oscillator period.
    #[arg(long)]
    period: usize,

    /// Column symmetry of every row (none, odd, even).
    #[arg(long, default_value = "none")]
    symmetry: Symmetry,

    /// Width of the oscillating part, in columns.
    #[arg(long)]
    rotor_width: usize,

    /// Still-life columns left of the rotor (asymmetric searches only).
    #[arg(long, default_value_t = 0)]
    left_stator: usize,

    /// Still-life columns right of the rotor.
    #[arg(long, default_value_t = 0)]
    right_stator: usize,

    /// Do not complete patterns early by mirroring symmetric rows.
    #[arg(long)]
    no_row_sym: bool,

    /// Keep the final stator rows inside the width limit.
    #[arg(long)]
    strict_width: bool,

    /// Limit iterative deepening; past the limit the rotor is contracted
    /// (0 = unlimited).
    #[arg(long, default_value_t = 0)]
    max_deepen: usize,

    /// Seed history state: one `.`/`o` row per phase, comma-separated.
    /// May be given twice; the search starts below the last seed.
    #[arg(long = "seed")]
    seeds: Vec<String>,

    /// Treat the first N seed states as sometimes-present sparks (0..=2).
    #[arg(long, default_value_t = 0)]
    spark_level: u8,

    /// State arena capacity in 32-bit words.
    #[arg(long, default_value_t = 1 << 22)]
    state_words: usize,
}

/// Parse one `.`/`o` row, least-significant column first.
fn parse_row(text: &str, width: usize) -> Result<Row> {
    let mut row = 0;
    for (bit, ch) in text.trim().chars().enumerate() {
        if bit >= width {
            bail!("too many cells in row {text:?} (width is {width})");
        }
        match ch {
            '.' => {}
            'o' | 'O' => row |= 1 << bit,
            _ => bail!("unexpected character {ch:?} in row {text:?}"),
        }
    }
    Ok(row)
}

fn build_config(args: &Args) -> Result<SearchConfig> {
    let width = args.rotor_width + args.left_stator + args.right_stator;
    let mut seed_states = Vec::new();
    for seed in &args.seeds {
        let rows: Vec<Row> = seed
            .split(',')
            .map(|row| parse_row(row, width))
            .collect::<Result<_>>()?;
        seed_states.push(rows);
    }
    Ok(SearchConfig::new(args.rule, args.period)
        .set_symmetry(args.symmetry)
        .set_widths(args.rotor_width, args.left_stator, args.right_stator)
        .set_allow_row_sym(!args.no_row_sym)
        .set_zero_lot_line(args.strict_width)
        .set_max_deepen(args.max_deepen)
        .set_seed_states(seed_states, args.spark_level)
        .set_state_capacity_words(args.state_words))
}

fn print_deepest(ctx: &SearchContext) {
    match output::deepest_lines(&ctx.memo, &ctx.arena, &ctx.config) {
        Some(lines) => {
            println!("\nDeepest line found:");
            for line in lines {
                println!("{line}");
            }
        }
        None => println!("\nUnable to find current search line."),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let mut ctx = SearchContext::new(config).context("configuration rejected")?;

    println!("Searching...");
    match SearchDriver::new().run(&mut ctx) {
        Ok(Outcome::Found(solution)) => {
            println!();
            print!("{solution}");
        }
        Ok(Outcome::Exhausted) => {
            println!("No patterns found");
            print_deepest(&ctx);
        }
        Err(error) => {
            eprintln!("{error}, aborting");
            print_deepest(&ctx);
        }
    }
    Ok(())
}
