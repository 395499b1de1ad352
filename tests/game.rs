//! Integration tests for the draw-state engine through its public API.

// Allow test-specific patterns that are appropriate for test code
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

mod common;

use bingo_draw::prelude::*;
use bingo_draw::telemetry::{CollectingObserver, ViolationKind};
use common::{draw_all, full_range, init_tracing, seeded_game, DEFAULT_SEED};
use std::collections::BTreeSet;
use std::sync::Arc;
use web_time::{Duration, Instant};

#[test]
fn scenario_one_to_five_batch_two() {
    init_tracing();
    let mut game = seeded_game(DEFAULT_SEED, 1, 5, 2);
    assert_eq!(game.stats().pool_size, 5);

    let first = game.draw_and_finish().into_result().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(game.stats().drawn_count, 2);

    let second = game.draw_and_finish().into_result().unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(game.stats().drawn_count, 4);
    assert!(second.iter().all(|ball| !first.balls().contains(ball)));

    let third = game.draw_and_finish().into_result().unwrap();
    assert_eq!(third.len(), 1);
    assert_eq!(game.stats().drawn_count, 5);

    let drawn: BTreeSet<i32> = game.drawn().iter().map(|b| b.number()).collect();
    assert_eq!(drawn, full_range(1, 5));

    assert_eq!(game.draw(), DrawOutcome::Exhausted { drawn: 5 });
    assert_eq!(game.stats().drawn_count, 5);
}

#[test]
fn exhausted_signal_repeats_until_reset() {
    let mut game = seeded_game(DEFAULT_SEED, 1, 4, 4);
    let _ = game.draw_and_finish();

    for _ in 0..3 {
        assert!(game.draw().is_exhausted());
    }
    let exhausted: Vec<_> = game
        .events()
        .filter(|event| matches!(event, BingoEvent::PoolExhausted { .. }))
        .collect();
    assert_eq!(exhausted.len(), 3);

    game.reset();
    assert!(game.draw().is_drawn());
}

#[test]
fn reconfigure_discards_progress() {
    let mut game = seeded_game(DEFAULT_SEED, 1, 90, 5);
    let _ = game.draw_and_finish();
    assert_eq!(game.stats().drawn_count, 5);

    game.configure(1, 30, 3);
    let stats = game.stats();
    assert_eq!(stats.drawn_count, 0);
    assert_eq!(stats.pool_size, 30);
    assert_eq!(stats.remaining_count, 30);
    assert!(game.last_drawn().is_none());
}

#[test]
fn draw_between_draw_and_finish_is_ignored() {
    let mut game = seeded_game(DEFAULT_SEED, 1, 90, 3);
    let batch = game.draw().into_result().unwrap();
    let stats = game.stats();
    assert!(stats.is_drawing);

    for _ in 0..5 {
        assert_eq!(game.draw(), DrawOutcome::Ignored);
    }
    assert_eq!(game.stats(), stats);
    assert_eq!(game.drawn(), batch.balls());

    game.finish_draw();
    assert!(!game.stats().is_drawing);
}

#[test]
fn full_event_stream_for_a_small_game() {
    let mut game = GameBuilder::new().with_seed(DEFAULT_SEED).start();
    game.configure(1, 3, 2);
    let batches = draw_all(&mut game);
    let _ = game.draw();

    let events: Vec<_> = game.events().collect();
    let mut expected = vec![
        BingoEvent::GameReset {
            pool_size: 90,
            batch_size: 1,
        },
        BingoEvent::GameReset {
            pool_size: 3,
            batch_size: 2,
        },
    ];
    let mut position = 1;
    for batch in &batches {
        for &ball in batch {
            expected.push(BingoEvent::BallDrawn { ball, position });
            position += 1;
        }
        expected.push(BingoEvent::BatchComplete {
            drawn: batch.len(),
            remaining: 4 - position,
        });
        expected.push(BingoEvent::DrawFinished {
            exhausted: position == 4,
        });
    }
    expected.push(BingoEvent::PoolExhausted { drawn: 3 });
    assert_eq!(events, expected);
}

#[test]
fn every_ball_of_a_large_batch_is_announced() {
    let mut game = GameBuilder::new().with_seed(DEFAULT_SEED).start();
    game.configure(1, 500, 500);

    let batch = game.draw().into_result().unwrap();
    assert_eq!(batch.len(), 500);

    let announced: Vec<(usize, Ball)> = game
        .events()
        .filter_map(|event| match event {
            BingoEvent::BallDrawn { ball, position } => Some((position, ball)),
            _ => None,
        })
        .collect();
    assert_eq!(announced.len(), 500);
    assert_eq!(announced, batch.positions().collect::<Vec<_>>());
}

#[test]
fn snapshot_tracks_cage_and_draws() {
    let mut game = seeded_game(DEFAULT_SEED, 1, 12, 4);
    let before = game.snapshot();
    assert_eq!(before.presentation_order.len(), 12);
    assert!(before.drawn.is_empty());

    let batch = game.draw().into_result().unwrap();
    let after = game.snapshot();
    assert_eq!(after.drawn, batch.balls());
    assert_eq!(after.presentation_order.len(), 8);
    assert!(after.stats.is_drawing);

    // Cage order is the original presentation order minus drawn balls.
    let expected: Vec<Ball> = before
        .presentation_order
        .iter()
        .copied()
        .filter(|ball| !batch.balls().contains(ball))
        .collect();
    assert_eq!(after.presentation_order, expected);
}

#[test]
fn snapshot_serializes() {
    let mut game = seeded_game(DEFAULT_SEED, 1, 3, 1);
    let _ = game.draw_and_finish();
    let value = serde_json::to_value(game.snapshot()).unwrap();
    assert_eq!(value["stats"]["drawn_count"], 1);
    assert_eq!(value["config"]["max_number"], 3);
    assert_eq!(value["presentation_order"].as_array().unwrap().len(), 2);
}

#[test]
fn misuse_is_reported_not_fatal() {
    let observer = Arc::new(CollectingObserver::new());
    let mut game = GameBuilder::new()
        .with_seed(DEFAULT_SEED)
        .with_violation_observer(observer.clone())
        .start();

    game.finish_draw();
    game.finish_draw();
    assert_eq!(observer.violations_of_kind(ViolationKind::DrawState).len(), 2);
    assert_eq!(observer.violations()[0].drawn_count, Some(0));
    assert!(game.draw_and_finish().is_drawn());
}

#[test]
fn paced_reveal_drives_finish_draw() {
    let mut game = seeded_game(DEFAULT_SEED, 1, 90, 3);
    let batch = game.draw().into_result().unwrap();

    let start = Instant::now();
    let mut playback =
        RevealPlayback::start(RevealSchedule::new(&batch, &RevealConfig::default()), start);

    let mut revealed = Vec::new();
    let mut now = start;
    while !playback.is_finished() {
        for step in playback.poll(now) {
            match step {
                RevealStep::Reveal(cue) => revealed.push(cue.ball),
                RevealStep::Complete { remaining } => {
                    assert_eq!(remaining, 87);
                    game.finish_draw();
                }
            }
        }
        now += Duration::from_millis(50);
    }

    assert_eq!(revealed, batch.balls());
    assert!(!game.is_drawing());
}

#[test]
fn cancelled_reveal_leaves_game_drawing() {
    let mut game = seeded_game(DEFAULT_SEED, 1, 90, 3);
    let batch = game.draw().into_result().unwrap();

    let start = Instant::now();
    let mut playback =
        RevealPlayback::start(RevealSchedule::new(&batch, &RevealConfig::default()), start);
    playback.cancel();
    assert!(playback.poll(start + Duration::from_secs(10)).is_empty());

    assert!(game.is_drawing());
    game.reset();
    assert!(!game.is_drawing());
}

#[test]
fn custom_rng_through_builder() {
    let mut game = GameBuilder::new()
        .with_rng(Pcg32::new(99, 7))
        .with_config(GameConfig::new(1, 10, 10))
        .start();
    let batch = game.draw().into_result().unwrap();
    let drawn: BTreeSet<i32> = batch.iter().map(|b| b.number()).collect();
    assert_eq!(drawn, full_range(1, 10));
}
