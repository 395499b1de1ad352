//! Property-based tests for the draw-state engine.
//!
//! # Properties Tested
//!
//! - Pool completeness: a fresh pool is exactly `{min..=max}`
//! - No duplicates: drawn balls are distinct between resets
//! - Exhaustion: once every ball is drawn, draws change nothing
//! - Batch sizing: each draw yields `min(batch_size, remaining)` balls
//! - Idempotent reset: any number of resets leaves a full, undrawn pool
//! - Clamping: the effective batch size never exceeds the pool
//! - Reveal schedule: offsets are monotonic and `Complete` comes once, last
//! - Draw distribution: every ball is equally likely to be in a batch

// Allow test-specific patterns that are appropriate for test code
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use bingo_draw::telemetry::InvariantChecker;
use bingo_draw::{
    DrawOutcome, GameBuilder, GameConfig, GameState, RevealConfig, RevealPlayback,
    RevealSchedule, RevealStep,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use web_time::{Duration, Instant};

// ============================================================================
// Strategies
// ============================================================================

/// Small ranges anywhere in `i32`, including reversed ones.
fn range_strategy() -> impl Strategy<Value = (i32, i32)> {
    prop_oneof![
        (1i32..=100, 1i32..=100),
        (-50i32..=50, -50i32..=50),
        (i32::MAX - 40..=i32::MAX, i32::MAX - 40..=i32::MAX),
        (i32::MIN..=i32::MIN + 40, i32::MIN..=i32::MIN + 40),
    ]
}

fn batch_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![0usize..=12, Just(1000)]
}

/// User intents against a running game.
#[derive(Debug, Clone)]
enum Op {
    Draw,
    Finish,
    DrawAndFinish,
    Reset,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::DrawAndFinish),
        2 => Just(Op::Draw),
        2 => Just(Op::Finish),
        1 => Just(Op::Reset),
    ]
}

fn game(seed: u64, (min, max): (i32, i32), batch: usize) -> GameState {
    let mut game = GameBuilder::new().with_seed(seed).start();
    game.configure(min, max, batch);
    game
}

fn numbers(game: &GameState) -> Vec<i32> {
    game.drawn().iter().map(|ball| ball.number()).collect()
}

// ============================================================================
// Pool and draw properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A fresh pool holds every number of the normalized range exactly once.
    #[test]
    fn prop_pool_completeness(seed in any::<u64>(), range in range_strategy(), batch in batch_strategy()) {
        let game = game(seed, range, batch);
        let config = *game.config();
        let (lo, hi) = (range.0.min(range.1), range.0.max(range.1));
        prop_assert_eq!((config.min_number, config.max_number), (lo, hi));

        let mut cage: Vec<i32> = game.presentation_order().iter().map(|b| b.number()).collect();
        cage.sort_unstable();
        let expected: Vec<i32> = (lo..=hi).collect();
        prop_assert_eq!(cage, expected);
        prop_assert_eq!(game.stats().pool_size, (i64::from(hi) - i64::from(lo) + 1) as usize);
    }

    /// Any interleaving of intents keeps draws unique and the game consistent.
    #[test]
    fn prop_no_duplicate_draws(
        seed in any::<u64>(),
        range in range_strategy(),
        batch in batch_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let mut game = game(seed, range, batch);
        for op in ops {
            match op {
                Op::Draw => { let _ = game.draw(); }
                Op::Finish => game.finish_draw(),
                Op::DrawAndFinish => { let _ = game.draw_and_finish(); }
                Op::Reset => game.reset(),
            }
            let drawn = numbers(&game);
            let unique: BTreeSet<i32> = drawn.iter().copied().collect();
            prop_assert_eq!(unique.len(), drawn.len());
            prop_assert!(drawn.iter().all(|&n| game.contains(bingo_draw::Ball::new(n))));

            let stats = game.stats();
            prop_assert_eq!(stats.drawn_count + stats.remaining_count, stats.pool_size);
            prop_assert!(game.check_invariants().is_ok());
        }
    }

    /// Each draw yields `min(batch_size, remaining)` balls.
    #[test]
    fn prop_batch_sizing(seed in any::<u64>(), range in range_strategy(), batch in batch_strategy()) {
        let mut game = game(seed, range, batch);
        let batch_size = game.config().batch_size;
        prop_assert!(batch_size >= 1);
        prop_assert!(batch_size <= game.stats().pool_size);

        loop {
            let before = game.stats().remaining_count;
            match game.draw_and_finish() {
                DrawOutcome::Drawn(drawn) => {
                    prop_assert_eq!(drawn.len(), batch_size.min(before));
                    prop_assert_eq!(drawn.remaining(), before - drawn.len());
                }
                DrawOutcome::Exhausted { drawn } => {
                    prop_assert_eq!(before, 0);
                    prop_assert_eq!(drawn, game.stats().pool_size);
                    break;
                }
                DrawOutcome::Ignored => prop_assert!(false, "draw ignored while idle"),
            }
        }
    }

    /// Draws after exhaustion change nothing.
    #[test]
    fn prop_exhaustion_is_stable(seed in any::<u64>(), range in range_strategy(), extra in 1usize..5) {
        let mut game = game(seed, range, 1000);
        let _ = game.draw_and_finish();
        let snapshot = game.snapshot();
        for _ in 0..extra {
            prop_assert!(game.draw().is_exhausted());
        }
        prop_assert_eq!(game.snapshot(), snapshot);
    }

    /// Resetting any number of times leaves a full, undrawn pool.
    #[test]
    fn prop_reset_idempotent(seed in any::<u64>(), range in range_strategy(), draws in 0usize..5, resets in 1usize..4) {
        let mut game = game(seed, range, 2);
        for _ in 0..draws {
            let _ = game.draw_and_finish();
        }
        for _ in 0..resets {
            game.reset();
            let stats = game.stats();
            prop_assert_eq!(stats.drawn_count, 0);
            prop_assert_eq!(stats.remaining_count, stats.pool_size);
            prop_assert!(!stats.is_drawing);
            prop_assert_eq!(game.presentation_order().len(), stats.pool_size);
        }
    }

    /// Text entry never produces an invalid config.
    #[test]
    fn prop_from_inputs_always_valid(min in ".{0,12}", max in ".{0,12}", batch in ".{0,12}") {
        let config = GameConfig::from_inputs(&min, &max, &batch);
        prop_assert!(config.validate().is_ok());
        prop_assert!(config.batch_size >= 1);
        prop_assert!(config.batch_size <= config.pool_size());
    }
}

// ============================================================================
// Draw distribution
// ============================================================================

/// A batch of 2 from `1..=5` should contain each ball about 2/5 of the time,
/// and the second batch should cover the rest evenly too.
#[test]
fn batch_membership_is_uniform() {
    let mut first = BTreeMap::new();
    let mut second = BTreeMap::new();
    for seed in 0..3000 {
        let mut game = game(seed, (1, 5), 2);
        for ball in game.draw_and_finish().into_result().unwrap().iter() {
            *first.entry(ball.number()).or_insert(0u32) += 1;
        }
        for ball in game.draw_and_finish().into_result().unwrap().iter() {
            *second.entry(ball.number()).or_insert(0u32) += 1;
        }
    }

    for counts in [&first, &second] {
        assert_eq!(counts.len(), 5);
        for (number, &count) in counts {
            assert!(
                (1050..1350).contains(&count),
                "ball {number} counted {count} times"
            );
        }
    }
}

// ============================================================================
// Reveal schedule properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Cue offsets never decrease and `Complete` is emitted once, last.
    #[test]
    fn prop_reveal_schedule_ordering(
        seed in any::<u64>(),
        batch in 1usize..20,
        initial in 0u64..1000,
        interval in 0u64..1000,
        settle in 0u64..1000,
        poll_step in 1u64..400,
    ) {
        let mut game = game(seed, (1, 90), batch);
        let drawn = game.draw().into_result().unwrap();
        let config = RevealConfig {
            initial_delay: Duration::from_millis(initial),
            per_ball_interval: Duration::from_millis(interval),
            settle_delay: Duration::from_millis(settle),
        };
        let schedule = RevealSchedule::new(&drawn, &config);

        let offsets: Vec<Duration> = schedule.steps().map(|(at, _)| at).collect();
        prop_assert!(offsets.windows(2).all(|pair| pair[0] <= pair[1]));

        let start = Instant::now();
        let mut playback = RevealPlayback::start(schedule, start);
        let mut steps = Vec::new();
        let mut now = start;
        while !playback.is_finished() {
            steps.extend(playback.poll(now));
            now += Duration::from_millis(poll_step);
        }

        prop_assert_eq!(steps.len(), drawn.len() + 1);
        let completes = steps.iter().filter(|s| matches!(s, RevealStep::Complete { .. })).count();
        prop_assert_eq!(completes, 1);
        let ends_with_complete = matches!(steps.last(), Some(RevealStep::Complete { .. }));
        prop_assert!(ends_with_complete);
        let revealed: Vec<_> = steps
            .iter()
            .filter_map(|s| match s {
                RevealStep::Reveal(cue) => Some(cue.ball),
                RevealStep::Complete { .. } => None,
            })
            .collect();
        prop_assert_eq!(revealed.as_slice(), drawn.balls());
    }

    /// Cancelling at any point suppresses every later step.
    #[test]
    fn prop_reveal_cancellation(seed in any::<u64>(), batch in 1usize..10, cancel_after_ms in 0u64..4000) {
        let mut game = game(seed, (1, 90), batch);
        let drawn = game.draw().into_result().unwrap();
        let schedule = RevealSchedule::new(&drawn, &RevealConfig::default());

        let start = Instant::now();
        let mut playback = RevealPlayback::start(schedule, start);
        let before = playback.poll(start + Duration::from_millis(cancel_after_ms)).len();
        playback.cancel();
        prop_assert!(playback.poll(start + Duration::from_secs(60)).is_empty());
        prop_assert!(before <= drawn.len() + 1);
        prop_assert!(game.is_drawing());
    }
}
