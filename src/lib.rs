//! # Bingo Draw
//!
//! A draw-state engine for number-drawing games. A configurable pool of
//! numbered balls is shuffled for display and drawn in batches, each ball picked
//! uniformly from those still in the cage.
//!
//! The engine owns no timers and performs no I/O. [`GameState::draw`] computes a
//! whole batch at once and hands it back as an ordered [`DrawBatch`]; the
//! presentation layer decides how fast to reveal it (see [`reveal`]) and calls
//! [`GameState::finish_draw`] when it is done.
//!
//! ```
//! use bingo_draw::{DrawOutcome, GameBuilder};
//!
//! let mut game = GameBuilder::new().with_seed(42).start();
//! game.configure(1, 5, 2);
//!
//! let mut sizes = Vec::new();
//! while let DrawOutcome::Drawn(batch) = game.draw_and_finish() {
//!     sizes.push(batch.len());
//! }
//! assert_eq!(sizes, [2, 2, 1]);
//! assert!(game.stats().is_exhausted());
//! ```

#![forbid(unsafe_code)] // let us try
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::fmt;

pub use builder::GameBuilder;
pub use config::{
    ConfigAdjustment, GameConfig, RevealConfig, DEFAULT_BATCH_SIZE, DEFAULT_MAX_NUMBER,
    DEFAULT_MIN_NUMBER, MAX_POOL_SIZE,
};
pub use error::{BingoError, BingoResult, InvalidConfigKind};
pub use event_drain::EventDrain;
pub use game::{DrawBatch, DrawOutcome, DrawStats, GameSnapshot, GameState};
pub use reveal::{RevealCue, RevealPlayback, RevealSchedule, RevealStep};

mod builder;
pub mod config;
#[doc(hidden)]
pub mod error;
mod event_drain;
mod game;
pub mod pool;
pub mod prelude;
pub mod reveal;
/// Random number generation based on PCG32.
///
/// Provides the seedable source used for shuffling and draw selection.
/// See the module documentation for usage details.
pub mod rng;
pub mod telemetry;

/// A numbered ball.
///
/// Serializes as a bare integer.
///
/// # Examples
///
/// ```
/// use bingo_draw::Ball;
///
/// let ball = Ball::new(17);
/// assert_eq!(ball.number(), 17);
/// assert_eq!(ball.to_string(), "17");
/// assert!(Ball::new(3) < ball);
/// ```
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Ball(i32);

impl Ball {
    /// Creates a ball with the given number.
    #[inline]
    #[must_use]
    pub const fn new(number: i32) -> Self {
        Ball(number)
    }

    /// Returns the number printed on the ball.
    #[inline]
    #[must_use]
    pub const fn number(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Ball {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Ball {
    fn from(number: i32) -> Self {
        Ball(number)
    }
}

impl From<Ball> for i32 {
    fn from(ball: Ball) -> Self {
        ball.0
    }
}

/// Notifications emitted by a [`GameState`]. Handling them is up to the presentation layer.
///
/// Drain them with [`GameState::events`]. The queue is bounded; when it is full
/// the oldest event is dropped.
///
/// # Forward Compatibility
///
/// This enum is marked `#[non_exhaustive]` because new event types may be
/// added in future versions. Always include a wildcard arm when matching:
///
/// ```ignore
/// match event {
///     BingoEvent::BallDrawn { ball, position } => { /* animate */ }
///     BingoEvent::PoolExhausted { drawn } => { /* show notice */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum BingoEvent {
    /// The pool was regenerated, either by a reset or a reconfiguration.
    GameReset {
        /// Number of balls in the new pool.
        pool_size: usize,
        /// Balls per draw under the new configuration.
        batch_size: usize,
    },
    /// One ball of the current batch, in draw order.
    BallDrawn {
        /// The drawn ball.
        ball: Ball,
        /// 1-based position of this ball in the game's draw order.
        position: usize,
    },
    /// Every ball of the current batch has been drawn.
    ///
    /// Emitted after the batch's [`BingoEvent::BallDrawn`]s.
    BatchComplete {
        /// Number of balls in the batch.
        drawn: usize,
        /// Balls left in the pool after the batch.
        remaining: usize,
    },
    /// The presentation layer finished revealing the batch; draws are accepted again.
    DrawFinished {
        /// Whether the pool is now empty.
        exhausted: bool,
    },
    /// A draw was requested with no balls left.
    PoolExhausted {
        /// Number of balls drawn (the pool size).
        drawn: usize,
    },
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn ball_ordering_follows_number() {
        let mut balls = vec![Ball::new(5), Ball::new(-1), Ball::new(3)];
        balls.sort();
        assert_eq!(balls, vec![Ball::new(-1), Ball::new(3), Ball::new(5)]);
    }

    #[test]
    fn ball_conversions() {
        let ball: Ball = 42.into();
        let number: i32 = ball.into();
        assert_eq!(number, 42);
    }

    #[test]
    fn ball_serializes_as_integer() {
        let json = serde_json::to_string(&Ball::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: Ball = serde_json::from_str("7").unwrap();
        assert_eq!(back, Ball::new(7));
    }

    #[test]
    fn event_serializes_with_tag() {
        let event = BingoEvent::BallDrawn {
            ball: Ball::new(12),
            position: 3,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"ball_drawn","ball":12,"position":3}"#);
    }
}
