//! Common test infrastructure shared across integration tests.
//!
//! # Usage
//!
//! From any integration test file:
//! ```ignore
//! mod common;
//! use common::{seeded_game, draw_all};
//! ```

#![allow(dead_code)]

use bingo_draw::{Ball, DrawOutcome, GameBuilder, GameState};
use std::collections::BTreeSet;

/// Seed used when a test does not care which seed it gets.
pub const DEFAULT_SEED: u64 = 0x5eed;

/// Builds a reproducible game configured with `(min, max, batch)` and an empty event queue.
pub fn seeded_game(seed: u64, min: i32, max: i32, batch: usize) -> GameState {
    let mut game = GameBuilder::new().with_seed(seed).start();
    game.configure(min, max, batch);
    game.events().for_each(drop);
    game
}

/// Draws (and finishes) until the pool is exhausted, returning each batch's balls.
pub fn draw_all(game: &mut GameState) -> Vec<Vec<Ball>> {
    let mut batches = Vec::new();
    while let DrawOutcome::Drawn(batch) = game.draw_and_finish() {
        batches.push(batch.balls().to_vec());
    }
    batches
}

/// Returns the set of numbers in `[min, max]`.
pub fn full_range(min: i32, max: i32) -> BTreeSet<i32> {
    (min..=max).collect()
}

/// Installs a tracing subscriber for the current test, ignoring repeat installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
