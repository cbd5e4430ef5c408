// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Structural properties of the search: stator preservation, rule
//! consistency of enqueued states against an independent evolver, and the
//! reachability closure.

mod common;

use common::SimpleRng;
use osc_search::queue::StateId;
use osc_search::rows::ExtensionScan;
use osc_search::{Row, Rule, SearchConfig, SearchContext, SearchDriver, Symmetry};

fn run_steps(ctx: &mut SearchContext, max_steps: usize) {
    let mut driver = SearchDriver::new();
    for _ in 0..max_steps {
        match driver.step(ctx) {
            Ok(None) => {}
            _ => break,
        }
    }
}

#[test]
fn test_stator_bits_agree_across_phases() {
    let config = SearchConfig::new(Rule::LIFE, 2).set_widths(2, 1, 1);
    let stator_mask = config.stator_mask();
    let mut ctx = SearchContext::new(config).unwrap();
    run_steps(&mut ctx, 500);

    let mut checked = 0;
    for s in ctx.arena.slots() {
        if s == StateId::ROOT || ctx.arena.parent(s) == StateId::UNUSED {
            continue;
        }
        let rows = ctx.arena.rows(s);
        for phase in 1..rows.len() {
            assert_eq!(
                rows[phase] & stator_mask,
                rows[phase - 1] & stator_mask,
                "stator bits drift between phases in {rows:?}"
            );
        }
        checked += 1;
    }
    assert!(checked > 0, "nothing was enqueued");
}

/// Evolve the middle row of a three-row window one generation, restricted
/// to the stored columns. Independent of the search's transition tables.
fn evolve_middle(rule: Rule, above: Row, middle: Row, below: Row, width: usize) -> Row {
    let mut out = 0;
    for col in 0..width as i32 {
        let mut neighbours = 0;
        for dc in [-1i32, 0, 1] {
            let c = col + dc;
            if !(0..32).contains(&c) {
                continue;
            }
            neighbours += (above >> c) & 1;
            neighbours += (below >> c) & 1;
            if dc != 0 {
                neighbours += (middle >> c) & 1;
            }
        }
        if rule.next_state((middle >> col) & 1 != 0, neighbours) {
            out |= 1 << col;
        }
    }
    out
}

#[test]
fn test_enqueued_states_are_rule_consistent() {
    let config = SearchConfig::new(Rule::LIFE, 2).set_widths(3, 0, 0);
    let mut ctx = SearchContext::new(config).unwrap();
    run_steps(&mut ctx, 400);

    let slots: Vec<StateId> = ctx
        .arena
        .slots()
        .filter(|&s| s != StateId::ROOT && ctx.arena.parent(s) != StateId::UNUSED)
        .collect();
    assert!(!slots.is_empty());

    // Random sample: every state's parent must evolve into the parent's
    // next-phase row, with the grandparent above and the state below.
    let mut rng = SimpleRng::new(0x5eed);
    let period = ctx.config.period;
    let width = ctx.config.total_width();
    for _ in 0..200 {
        let s = slots[rng.below(slots.len())];
        let p = ctx.arena.parent(s);
        let pp = ctx.arena.parent(p);
        for phase in 0..period {
            let expected = ctx.arena.row(p, (phase + 1) % period);
            let evolved = evolve_middle(
                Rule::LIFE,
                ctx.arena.row(pp, phase),
                ctx.arena.row(p, phase),
                ctx.arena.row(s, phase),
                width,
            );
            assert_eq!(
                evolved, expected,
                "phase {phase}: {:#b} over {:#b} over {:#b} evolved to {evolved:#b}, stored {expected:#b}",
                ctx.arena.row(pp, phase),
                ctx.arena.row(p, phase),
                ctx.arena.row(s, phase),
            );
        }
    }
}

#[test]
fn test_reachability_closure_matches_brute_force() {
    let period = 2;
    let config = SearchConfig::new(Rule::LIFE, period).set_widths(3, 0, 0);
    let mut ctx = SearchContext::new(config).unwrap();

    // Expand the root by hand: list candidate rows per phase, then build
    // the edge and reachability bitmaps.
    let s = StateId::ROOT;
    for phase in 0..period {
        ctx.rows.begin_phase(phase);
        let scan = ExtensionScan::new(
            &ctx.memo.extension,
            Symmetry::None,
            ctx.config.total_width(),
            ctx.arena.row(s, phase),
            0,
            ctx.arena.row(s, (phase + 1) % period),
            !0,
        );
        scan.list_rows(&ctx.memo.extension, &mut ctx.rows, phase).unwrap();
        assert!(ctx.rows.n_rows[phase] > 0);
    }
    ctx.graph
        .build_edges(&ctx.memo, &ctx.rows, &ctx.arena, &ctx.config, s)
        .unwrap();
    ctx.graph.build_reach(&ctx.rows, period).unwrap();

    // Brute force: a phase-0 row `a` is reachable from row `j` of phase `k`
    // iff edges lead forward phase by phase and wrap onto `a`.
    fn brute(ctx: &SearchContext, period: usize, k: usize, j: usize, a: usize) -> bool {
        if k == period - 1 {
            return ctx.graph.compatible(
                &ctx.rows,
                0,
                ctx.rows.first_row[period - 1] + j,
                ctx.rows.first_row[0] + a,
                period,
            );
        }
        (0..ctx.rows.n_rows[k + 1]).any(|next| {
            ctx.graph.compatible(
                &ctx.rows,
                k + 1,
                ctx.rows.first_row[k] + j,
                ctx.rows.first_row[k + 1] + next,
                period,
            ) && brute(ctx, period, k + 1, next, a)
        })
    }

    for k in 0..period {
        for j in 0..ctx.rows.n_rows[k] {
            for a in 0..ctx.rows.n_rows[0] {
                assert_eq!(
                    ctx.graph.reachable(k, a, j),
                    brute(&ctx, period, k, j, a),
                    "reachability mismatch at phase {k}, row {j}, target {a}"
                );
            }
        }
    }
}
