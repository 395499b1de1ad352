//! Invariant checks through the public API.
//!
//! Drives games through long mixed workloads and asserts `InvariantChecker`
//! holds after every step, including at range extremes.

// Allow test-specific patterns that are appropriate for test code
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use bingo_draw::pool::BallPool;
use bingo_draw::rng::{Pcg32, SeedableRng};
use bingo_draw::telemetry::{CollectingObserver, InvariantChecker, ViolationKind};
use bingo_draw::{
    assert_invariants, assert_no_violations, assert_violation, GameBuilder, GameConfig,
    MAX_POOL_SIZE,
};
use std::sync::Arc;

#[test]
fn invariants_hold_through_mixed_workload() {
    let observer = Arc::new(CollectingObserver::new());
    let mut game = GameBuilder::new()
        .with_seed(77)
        .with_violation_observer(observer.clone())
        .start();

    for round in 0..50usize {
        let batch = round % 7 + 1;
        game.configure(1, 20 + round as i32, batch);
        assert_invariants!(game, "after configure");
        while game.draw_and_finish().is_drawn() {
            assert_invariants!(game, "after draw");
            game.events().for_each(drop);
        }
        game.reset();
        assert_invariants!(game, "after reset");
    }
    assert_no_violations!(observer);
}

#[test]
fn invariants_hold_at_i32_extremes() {
    let mut game = GameBuilder::new()
        .with_config(GameConfig::new(i32::MAX - 9, i32::MAX, 3))
        .with_seed(1)
        .start();
    while game.draw_and_finish().is_drawn() {
        assert!(game.check_invariants().is_ok());
    }
    assert_eq!(game.stats().drawn_count, 10);

    game.configure(i32::MIN, i32::MIN + 9, 4);
    while game.draw_and_finish().is_drawn() {
        assert!(game.check_invariants().is_ok());
    }
    assert_eq!(game.stats().drawn_count, 10);
}

#[test]
fn largest_pool_is_consistent() {
    let observer = Arc::new(CollectingObserver::new());
    let mut game = GameBuilder::new()
        .with_seed(2)
        .with_violation_observer(observer.clone())
        .start();
    game.configure(0, i32::MAX, 1000);

    assert_eq!(game.stats().pool_size, MAX_POOL_SIZE);
    assert_violation!(observer, ViolationKind::Configuration);
    let batch = game.draw_and_finish().into_result().unwrap();
    assert_eq!(batch.len(), 1000);
    assert!(game.check_invariants().is_ok());
}

#[test]
fn pool_invariants_directly() {
    let mut rng = Pcg32::seed_from_u64(5);
    let mut pool = BallPool::new(-3, 3, &mut rng);
    assert!(pool.check_invariants().is_ok());
    while pool.draw_one(&mut rng).is_some() {
        assert!(pool.check_invariants().is_ok());
    }
    assert!(pool.is_exhausted());
    assert_eq!(pool.drawn_count(), 7);
}
