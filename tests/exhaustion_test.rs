// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! A one-column period-2 search has no oscillator: the queue must run dry
//! and the deepest line must be reconstructible for the report.

use osc_search::{output, Outcome, Rule, SearchConfig, SearchContext, SearchDriver};

#[test]
fn test_one_column_period_two_exhausts() {
    let config = SearchConfig::new(Rule::LIFE, 2).set_widths(1, 0, 0);
    let mut ctx = SearchContext::new(config).unwrap();
    let outcome = SearchDriver::new().run(&mut ctx).unwrap();
    assert!(
        matches!(outcome, Outcome::Exhausted),
        "a single column cannot hold a period-2 oscillator"
    );

    // The give-up report walks parent links from the last processed state;
    // every reported line is a well-formed cell row.
    let deepest = output::deepest_lines(&ctx.memo, &ctx.arena, &ctx.config)
        .expect("something was processed");
    for line in &deepest {
        assert!(line.chars().all(|ch| ch == '.' || ch == 'o'));
    }
}
