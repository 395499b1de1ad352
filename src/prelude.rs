//! Convenient re-exports for common usage.
//!
//! ```rust
//! use bingo_draw::prelude::*;
//!
//! let mut game = GameBuilder::new().with_seed(8).start();
//! game.configure(1, 30, 3);
//! if let DrawOutcome::Drawn(batch) = game.draw() {
//!     let schedule = RevealSchedule::new(&batch, &RevealConfig::instant());
//!     assert_eq!(schedule.cues().len(), 3);
//! }
//! ```
//!
//! # What's Included
//!
//! - **Game**: [`GameState`], [`GameBuilder`], [`GameConfig`], [`DrawStats`], [`GameSnapshot`]
//! - **Draws and events**: [`Ball`], [`DrawBatch`], [`DrawOutcome`], [`BingoEvent`]
//! - **Reveal pacing**: [`RevealConfig`], [`RevealSchedule`], [`RevealPlayback`], [`RevealStep`]
//! - **Errors**: [`BingoError`], [`BingoResult`]
//! - **Randomness**: [`Pcg32`], [`Rng`], [`SeedableRng`]

pub use crate::config::{GameConfig, RevealConfig};
pub use crate::error::{BingoError, BingoResult};
pub use crate::rng::{Pcg32, Rng, SeedableRng};
pub use crate::{
    Ball, BingoEvent, DrawBatch, DrawOutcome, DrawStats, GameBuilder, GameSnapshot, GameState,
    RevealPlayback, RevealSchedule, RevealStep,
};
