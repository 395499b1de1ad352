//! The draw-state engine.

use std::collections::VecDeque;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::config::GameConfig;
use crate::error::{BingoError, BingoResult};
use crate::event_drain::EventDrain;
use crate::pool::BallPool;
use crate::rng::{Pcg32, Rng};
use crate::telemetry::{
    InvariantChecker, InvariantViolation, ViolationKind, ViolationObserver, ViolationSeverity,
};
use crate::{debug_check_invariants, report_violation_to, Ball, BingoEvent, GameBuilder};

/// Inline capacity of a [`DrawBatch`]; larger batches spill to the heap.
const BATCH_INLINE_CAPACITY: usize = 8;

/// The balls produced by one draw, in draw order.
///
/// The order here is the order the presentation layer should reveal them in,
/// not the pool's presentation order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DrawBatch {
    balls: SmallVec<[Ball; BATCH_INLINE_CAPACITY]>,
    first_position: usize,
    remaining: usize,
}

impl DrawBatch {
    /// The drawn balls in draw order.
    #[must_use]
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Number of balls in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.balls.len()
    }

    /// Always false for batches returned by [`GameState::draw`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// 1-based position of the first ball in the game's draw order.
    #[must_use]
    pub fn first_position(&self) -> usize {
        self.first_position
    }

    /// Balls left in the pool after this batch.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Returns true if this batch emptied the pool.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.remaining == 0
    }

    /// Iterates over the balls in draw order.
    pub fn iter(&self) -> std::slice::Iter<'_, Ball> {
        self.balls.iter()
    }

    /// Iterates over `(position, ball)` pairs, positions being 1-based game-wide.
    pub fn positions(&self) -> impl Iterator<Item = (usize, Ball)> + '_ {
        (self.first_position..).zip(self.balls.iter().copied())
    }
}

impl<'a> IntoIterator for &'a DrawBatch {
    type Item = &'a Ball;
    type IntoIter = std::slice::Iter<'a, Ball>;

    fn into_iter(self) -> Self::IntoIter {
        self.balls.iter()
    }
}

/// Result of [`GameState::draw`].
///
/// Neither `Exhausted` nor `Ignored` is a failure; both leave the game
/// untouched. Use [`DrawOutcome::into_result`] to treat them as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a drawn batch should be handed to the presentation layer"]
pub enum DrawOutcome {
    /// A batch was drawn. The game stays in the drawing state until
    /// [`GameState::finish_draw`] is called.
    Drawn(DrawBatch),
    /// Every ball has already been drawn.
    Exhausted {
        /// Number of balls drawn (the pool size).
        drawn: usize,
    },
    /// The previous batch is still being revealed; the request was dropped.
    Ignored,
}

impl DrawOutcome {
    /// Returns the batch, if one was drawn.
    #[must_use]
    pub fn batch(&self) -> Option<&DrawBatch> {
        match self {
            Self::Drawn(batch) => Some(batch),
            _ => None,
        }
    }

    /// Returns true if a batch was drawn.
    #[must_use]
    pub fn is_drawn(&self) -> bool {
        matches!(self, Self::Drawn(_))
    }

    /// Returns true if the pool was already empty.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Converts the outcome into a `Result`.
    ///
    /// # Errors
    /// - [`BingoError::PoolExhausted`] for [`DrawOutcome::Exhausted`]
    /// - [`BingoError::DrawInProgress`] for [`DrawOutcome::Ignored`]
    pub fn into_result(self) -> BingoResult<DrawBatch> {
        match self {
            Self::Drawn(batch) => Ok(batch),
            Self::Exhausted { drawn } => Err(BingoError::PoolExhausted { drawn }),
            Self::Ignored => Err(BingoError::DrawInProgress),
        }
    }
}

/// Counters describing draw progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DrawStats {
    /// Balls drawn since the last reset.
    pub drawn_count: usize,
    /// Balls in the pool.
    pub pool_size: usize,
    /// Balls not yet drawn.
    pub remaining_count: usize,
    /// Balls per draw.
    pub batch_size: usize,
    /// Whether a batch is still being revealed.
    pub is_drawing: bool,
}

impl DrawStats {
    /// Returns true once every ball has been drawn.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining_count == 0
    }
}

/// A read-only view of a game, for rendering or logging.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GameSnapshot {
    /// The effective configuration.
    pub config: GameConfig,
    /// Draw counters.
    pub stats: DrawStats,
    /// Drawn balls in draw order.
    pub drawn: Vec<Ball>,
    /// Undrawn balls in presentation order.
    pub presentation_order: Vec<Ball>,
}

impl GameSnapshot {
    /// Serializes the snapshot to a JSON string.
    ///
    /// Returns `None` if serialization fails.
    #[cfg(feature = "json")]
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

/// A bingo game: configuration, ball pool, draw progress, and pending events.
///
/// Create one with [`GameBuilder`], or with [`GameState::new`] for the
/// defaults. The random source `R` drives both the display shuffle and the
/// draw selection; inject a seeded one for reproducible games.
///
/// # Drawing
///
/// [`draw`](Self::draw) computes a whole batch and puts the game in the
/// drawing state. Further draws are [`DrawOutcome::Ignored`] until the
/// presentation layer calls [`finish_draw`](Self::finish_draw). Callers without
/// a staged reveal can use [`draw_and_finish`](Self::draw_and_finish).
pub struct GameState<R: Rng = Pcg32> {
    config: GameConfig,
    pool: BallPool,
    is_drawing: bool,
    rng: R,
    event_queue: VecDeque<BingoEvent>,
    event_queue_size: usize,
    /// Set once undrained events start being dropped; cleared by [`GameState::events`].
    overflow_reported: bool,
    violation_observer: Option<Arc<dyn ViolationObserver>>,
}

impl<R: Rng> std::fmt::Debug for GameState<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            config,
            pool,
            is_drawing,
            rng: _,
            event_queue,
            event_queue_size,
            overflow_reported: _,
            violation_observer,
        } = self;

        f.debug_struct("GameState")
            .field("config", config)
            .field("drawn_count", &pool.drawn_count())
            .field("remaining_count", &pool.remaining_count())
            .field("is_drawing", is_drawing)
            .field("rng", &std::any::type_name::<R>())
            .field("pending_events", &event_queue.len())
            .field("event_queue_size", event_queue_size)
            .field("has_violation_observer", &violation_observer.is_some())
            .finish()
    }
}

impl GameState<Pcg32> {
    /// Creates a game with an entropy-seeded random source.
    ///
    /// The config is normalized as in [`GameConfig::new`].
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        GameBuilder::new().with_config(config).start()
    }

    /// Creates a reproducible game from a seed.
    #[must_use]
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        GameBuilder::new().with_config(config).with_seed(seed).start()
    }
}

impl<R: Rng> GameState<R> {
    pub(crate) fn from_parts(
        config: GameConfig,
        mut rng: R,
        violation_observer: Option<Arc<dyn ViolationObserver>>,
        event_queue_size: usize,
    ) -> Self {
        let (config, adjustments) = config.normalize();
        for adjustment in &adjustments {
            adjustment.log(violation_observer.as_ref());
        }
        let pool = BallPool::new(config.min_number, config.max_number, &mut rng);

        let mut game = Self {
            config,
            pool,
            is_drawing: false,
            rng,
            event_queue: VecDeque::new(),
            event_queue_size,
            overflow_reported: false,
            violation_observer,
        };
        game.push_event(BingoEvent::GameReset {
            pool_size: game.pool.size(),
            batch_size: game.config.batch_size,
        });
        debug!(
            min_number = config.min_number,
            max_number = config.max_number,
            batch_size = config.batch_size,
            "game created"
        );
        debug_check_invariants!(game, "after creation");
        game
    }

    /// Reconfigures the game from numeric settings and resets it.
    ///
    /// Never fails: a reversed range is swapped, a zero batch becomes one, an
    /// oversized range is narrowed (each reported to the violation observer),
    /// and a batch larger than the pool is clamped. Returns the effective config.
    pub fn configure(&mut self, min_number: i32, max_number: i32, batch_size: usize) -> GameConfig {
        self.set_config(GameConfig {
            min_number,
            max_number,
            batch_size,
        })
    }

    /// Reconfigures the game from raw text fields and resets it.
    ///
    /// Fields are parsed as in [`GameConfig::from_inputs`]. Returns the effective config.
    pub fn apply_settings(
        &mut self,
        min_number: &str,
        max_number: &str,
        batch_size: &str,
    ) -> GameConfig {
        self.set_config(GameConfig::parse_inputs(min_number, max_number, batch_size))
    }

    /// Replaces the configuration and resets the game. Returns the effective config.
    pub fn set_config(&mut self, config: GameConfig) -> GameConfig {
        let (config, adjustments) = config.normalize();
        for adjustment in &adjustments {
            adjustment.log(self.violation_observer.as_ref());
        }
        debug!(
            min_number = config.min_number,
            max_number = config.max_number,
            batch_size = config.batch_size,
            "configuration applied"
        );
        self.config = config;
        self.reset();
        config
    }

    /// Regenerates and reshuffles the pool, forgetting every draw.
    ///
    /// Also ends any draw in progress.
    pub fn reset(&mut self) {
        self.pool
            .refill(self.config.min_number, self.config.max_number, &mut self.rng);
        self.is_drawing = false;
        self.push_event(BingoEvent::GameReset {
            pool_size: self.pool.size(),
            batch_size: self.config.batch_size,
        });
        debug!(pool_size = self.pool.size(), "game reset");
        debug_check_invariants!(self, "after reset");
    }

    /// Draws the next batch.
    ///
    /// Draws `min(batch_size, remaining)` balls, each uniformly from the balls
    /// left at that moment. On success the game enters the drawing state and
    /// emits one [`BingoEvent::BallDrawn`] per ball followed by
    /// [`BingoEvent::BatchComplete`].
    ///
    /// Returns [`DrawOutcome::Ignored`] while a batch is being revealed, and
    /// [`DrawOutcome::Exhausted`] (plus [`BingoEvent::PoolExhausted`]) when no
    /// balls are left. Neither changes the game.
    pub fn draw(&mut self) -> DrawOutcome {
        if self.is_drawing {
            trace!("draw ignored, previous batch still revealing");
            return DrawOutcome::Ignored;
        }
        if self.pool.is_exhausted() {
            let drawn = self.pool.drawn_count();
            debug!(drawn, "draw requested on an exhausted pool");
            self.push_event(BingoEvent::PoolExhausted { drawn });
            return DrawOutcome::Exhausted { drawn };
        }

        let draw_count = self.config.batch_size.min(self.pool.remaining_count());
        let first_position = self.pool.drawn_count() + 1;
        let mut balls = SmallVec::with_capacity(draw_count);
        for _ in 0..draw_count {
            let Some(ball) = self.pool.draw_one(&mut self.rng) else {
                report_violation_to!(
                    self.violation_observer,
                    drawn = self.pool.drawn_count();
                    ViolationSeverity::Critical,
                    ViolationKind::InternalError,
                    "pool ran dry after {} of {} balls",
                    balls.len(),
                    draw_count
                );
                break;
            };
            balls.push(ball);
        }

        self.is_drawing = true;
        let batch = DrawBatch {
            balls,
            first_position,
            remaining: self.pool.remaining_count(),
        };
        for (position, ball) in batch.positions() {
            self.push_event(BingoEvent::BallDrawn { ball, position });
        }
        self.push_event(BingoEvent::BatchComplete {
            drawn: batch.len(),
            remaining: batch.remaining,
        });
        debug!(
            balls = ?batch.balls(),
            remaining = batch.remaining,
            "batch drawn"
        );
        debug_check_invariants!(self, "after draw");
        DrawOutcome::Drawn(batch)
    }

    /// Ends the drawing state once the presentation layer has revealed the batch.
    ///
    /// Emits [`BingoEvent::DrawFinished`]. Calling it with no draw in progress
    /// changes nothing and is reported as a `DrawState` warning.
    pub fn finish_draw(&mut self) {
        if !self.is_drawing {
            report_violation_to!(
                self.violation_observer,
                drawn = self.pool.drawn_count();
                ViolationSeverity::Warning,
                ViolationKind::DrawState,
                "finish_draw called with no draw in progress"
            );
            return;
        }
        self.is_drawing = false;
        let exhausted = self.pool.is_exhausted();
        self.push_event(BingoEvent::DrawFinished { exhausted });
        trace!(exhausted, "draw finished");
    }

    /// Draws a batch and immediately finishes it, for callers with no staged reveal.
    pub fn draw_and_finish(&mut self) -> DrawOutcome {
        let outcome = self.draw();
        if outcome.is_drawn() {
            self.finish_draw();
        }
        outcome
    }

    /// Returns the draw counters.
    #[must_use]
    pub fn stats(&self) -> DrawStats {
        DrawStats {
            drawn_count: self.pool.drawn_count(),
            pool_size: self.pool.size(),
            remaining_count: self.pool.remaining_count(),
            batch_size: self.config.batch_size,
            is_drawing: self.is_drawing,
        }
    }

    /// Captures the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            config: self.config,
            stats: self.stats(),
            drawn: self.pool.drawn().to_vec(),
            presentation_order: self.presentation_order(),
        }
    }

    /// Returns all events emitted since the last call.
    ///
    /// The queue holds at least one whole batch, so a caller that drains after
    /// every draw never loses a [`BingoEvent::BallDrawn`]. Older undrained
    /// events are dropped first, reported once per drain as an `EventQueue`
    /// warning.
    pub fn events(&mut self) -> EventDrain<'_> {
        self.overflow_reported = false;
        EventDrain::from_drain(self.event_queue.drain(..))
    }

    /// The effective (normalized) configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Whether a drawn batch is still being revealed.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.is_drawing
    }

    /// Returns true once every ball has been drawn.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pool.is_exhausted()
    }

    /// Drawn balls in draw order.
    #[must_use]
    pub fn drawn(&self) -> &[Ball] {
        self.pool.drawn()
    }

    /// The most recently drawn ball.
    #[must_use]
    pub fn last_drawn(&self) -> Option<Ball> {
        self.pool.drawn().last().copied()
    }

    /// Returns true if `ball` has been drawn since the last reset.
    #[must_use]
    pub fn is_drawn(&self, ball: Ball) -> bool {
        self.pool.is_drawn(ball)
    }

    /// Returns true if `ball` is part of the configured range.
    #[must_use]
    pub fn contains(&self, ball: Ball) -> bool {
        self.pool.contains(ball)
    }

    /// Undrawn balls in presentation order.
    #[must_use]
    pub fn presentation_order(&self) -> Vec<Ball> {
        self.pool.undrawn_in_presentation_order().collect()
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &BallPool {
        &self.pool
    }

    /// Queue bound in effect: the configured size, widened to fit a batch's
    /// `BallDrawn`s plus its `BatchComplete` and `DrawFinished`.
    fn event_capacity(&self) -> usize {
        self.event_queue_size.max(self.config.batch_size.saturating_add(2))
    }

    fn push_event(&mut self, event: BingoEvent) {
        self.event_queue.push_back(event);
        let capacity = self.event_capacity();
        let overflow = self.event_queue.len().saturating_sub(capacity);
        if overflow == 0 {
            return;
        }
        self.event_queue.drain(..overflow).for_each(drop);
        if !self.overflow_reported {
            self.overflow_reported = true;
            report_violation_to!(
                self.violation_observer,
                drawn = self.pool.drawn_count();
                ViolationSeverity::Warning,
                ViolationKind::EventQueue,
                "event queue full at {} entries, dropping oldest undrained events",
                capacity
            );
        }
    }
}

impl<R: Rng> InvariantChecker for GameState<R> {
    /// Checks the pool invariants plus:
    /// - the pool matches the configured range
    /// - `1 <= batch_size <= pool_size`
    /// - the event queue respects its bound
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.pool.check_invariants()?;

        if self.pool.min_number() != self.config.min_number
            || self.pool.max_number() != self.config.max_number
            || self.pool.size() != self.config.pool_size()
        {
            return Err(
                InvariantViolation::new("GameState", "pool does not match configuration")
                    .with_details(format!(
                        "pool=[{}, {}], config=[{}, {}]",
                        self.pool.min_number(),
                        self.pool.max_number(),
                        self.config.min_number,
                        self.config.max_number
                    )),
            );
        }
        if self.config.batch_size == 0 || self.config.batch_size > self.pool.size() {
            return Err(
                InvariantViolation::new("GameState", "batch_size outside 1..=pool_size")
                    .with_details(format!(
                        "batch_size={}, pool_size={}",
                        self.config.batch_size,
                        self.pool.size()
                    )),
            );
        }
        if self.event_queue.len() > self.event_capacity() {
            return Err(
                InvariantViolation::new("GameState", "event queue exceeds its bound")
                    .with_details(format!(
                        "len={}, capacity={}",
                        self.event_queue.len(),
                        self.event_capacity()
                    )),
            );
        }
        Ok(())
    }
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
    use crate::telemetry::CollectingObserver;
    use std::collections::BTreeSet;

    fn seeded(min: i32, max: i32, batch: usize) -> GameState {
        let mut game = GameState::with_seed(GameConfig::default(), 42);
        game.configure(min, max, batch);
        game.events().for_each(drop);
        game
    }

    #[test]
    fn new_game_uses_defaults() {
        let game = GameState::with_seed(GameConfig::default(), 1);
        let stats = game.stats();
        assert_eq!(stats.pool_size, 90);
        assert_eq!(stats.drawn_count, 0);
        assert_eq!(stats.remaining_count, 90);
        assert_eq!(stats.batch_size, 1);
        assert!(!stats.is_drawing);
        assert!(game.check_invariants().is_ok());
    }

    #[test]
    fn scenario_one_to_five_in_pairs() {
        let mut game = seeded(1, 5, 2);
        assert_eq!(game.stats().pool_size, 5);

        let mut seen = BTreeSet::new();
        for (expected_len, expected_drawn) in [(2, 2), (2, 4), (1, 5)] {
            let batch = game.draw_and_finish().into_result().unwrap();
            assert_eq!(batch.len(), expected_len);
            for &ball in &batch {
                assert!((1..=5).contains(&ball.number()));
                assert!(seen.insert(ball), "ball {ball} drawn twice");
            }
            assert_eq!(game.stats().drawn_count, expected_drawn);
        }

        assert_eq!(game.draw(), DrawOutcome::Exhausted { drawn: 5 });
        assert_eq!(game.stats().drawn_count, 5);
    }

    #[test]
    fn draw_while_drawing_is_ignored() {
        let mut game = seeded(1, 10, 3);
        let first = game.draw();
        assert!(first.is_drawn());
        assert!(game.is_drawing());

        let before = game.snapshot();
        game.events().for_each(drop);
        assert_eq!(game.draw(), DrawOutcome::Ignored);
        assert_eq!(game.snapshot(), before);
        assert_eq!(game.events().len(), 0);

        game.finish_draw();
        assert!(!game.is_drawing());
        assert!(game.draw().is_drawn());
    }

    #[test]
    fn exhausted_draw_leaves_state_unchanged() {
        let mut game = seeded(1, 3, 3);
        let _ = game.draw_and_finish();
        let before = game.snapshot();

        let outcome = game.draw();
        assert_eq!(outcome, DrawOutcome::Exhausted { drawn: 3 });
        assert_eq!(game.snapshot(), before);
        assert!(!game.is_drawing());
        assert_eq!(
            outcome.into_result(),
            Err(BingoError::PoolExhausted { drawn: 3 })
        );
    }

    #[test]
    fn batch_size_clamped_to_pool() {
        let mut game = seeded(1, 10, 1000);
        assert_eq!(game.config().batch_size, 10);
        let batch = game.draw().into_result().unwrap();
        assert_eq!(batch.len(), 10);
        assert!(batch.is_final());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut game = seeded(1, 20, 4);
        let _ = game.draw_and_finish();
        for _ in 0..3 {
            game.reset();
            assert!(game.drawn().is_empty());
            assert_eq!(game.stats().remaining_count, 20);
            assert_eq!(game.presentation_order().len(), 20);
        }
    }

    #[test]
    fn reset_ends_draw_in_progress() {
        let mut game = seeded(1, 20, 4);
        let _ = game.draw();
        game.reset();
        assert!(!game.is_drawing());
        assert!(game.draw().is_drawn());
    }

    #[test]
    fn events_follow_draw_order() {
        let mut game = seeded(1, 10, 3);
        let batch = game.draw().into_result().unwrap();
        game.finish_draw();

        let events: Vec<_> = game.events().collect();
        let mut expected: Vec<_> = batch
            .positions()
            .map(|(position, ball)| BingoEvent::BallDrawn { ball, position })
            .collect();
        expected.push(BingoEvent::BatchComplete {
            drawn: 3,
            remaining: 7,
        });
        expected.push(BingoEvent::DrawFinished { exhausted: false });
        assert_eq!(events, expected);
    }

    #[test]
    fn positions_continue_across_batches() {
        let mut game = seeded(1, 10, 3);
        let _ = game.draw_and_finish();
        let second = game.draw_and_finish().into_result().unwrap();
        assert_eq!(second.first_position(), 4);
        let positions: Vec<usize> = second.positions().map(|(p, _)| p).collect();
        assert_eq!(positions, vec![4, 5, 6]);
    }

    #[test]
    fn event_queue_drops_oldest() {
        let mut game = GameBuilder::new()
            .with_seed(3)
            .with_event_queue_size(10)
            .unwrap()
            .start();
        game.configure(1, 50, 1);
        for _ in 0..20 {
            let _ = game.draw_and_finish();
        }
        let events: Vec<_> = game.events().collect();
        assert_eq!(events.len(), 10);
        assert_eq!(
            events.last(),
            Some(&BingoEvent::DrawFinished { exhausted: false })
        );
    }

    #[test]
    fn large_batch_keeps_every_ball_event() {
        let observer = Arc::new(CollectingObserver::new());
        let mut game = GameBuilder::new()
            .with_seed(8)
            .with_violation_observer(observer.clone())
            .start();
        game.configure(1, 500, 500);
        game.events().for_each(drop);

        let batch = game.draw_and_finish().into_result().unwrap();
        let events: Vec<_> = game.events().collect();
        let announced: Vec<Ball> = events
            .iter()
            .filter_map(|event| match event {
                BingoEvent::BallDrawn { ball, .. } => Some(*ball),
                _ => None,
            })
            .collect();
        assert_eq!(announced.len(), 500);
        assert_eq!(announced, batch.balls());
        assert_eq!(
            events[500],
            BingoEvent::BatchComplete {
                drawn: 500,
                remaining: 0
            }
        );
        assert_eq!(events[501], BingoEvent::DrawFinished { exhausted: true });
        assert!(observer.is_empty());
    }

    fn overflow_reports(observer: &CollectingObserver) -> usize {
        observer.violations_of_kind(ViolationKind::EventQueue).len()
    }

    #[test]
    fn event_overflow_reported_once_per_drain() {
        let observer = Arc::new(CollectingObserver::new());
        let mut game = GameBuilder::new()
            .with_seed(3)
            .with_event_queue_size(10)
            .unwrap()
            .with_violation_observer(observer.clone())
            .start();
        game.configure(1, 50, 1);
        game.events().for_each(drop);

        for _ in 0..20 {
            let _ = game.draw_and_finish();
        }
        assert_eq!(overflow_reports(&observer), 1);

        game.events().for_each(drop);
        for _ in 0..3 {
            let _ = game.draw_and_finish();
        }
        assert_eq!(overflow_reports(&observer), 1);

        for _ in 0..3 {
            let _ = game.draw_and_finish();
        }
        assert_eq!(overflow_reports(&observer), 2);
    }

    #[test]
    fn configure_reports_swapped_range() {
        let observer = Arc::new(CollectingObserver::new());
        let mut game = GameBuilder::new()
            .with_seed(5)
            .with_violation_observer(observer.clone())
            .start();

        let config = game.configure(10, 1, 0);
        assert_eq!((config.min_number, config.max_number, config.batch_size), (1, 10, 1));
        assert_eq!(observer.violations_of_kind(ViolationKind::Configuration).len(), 2);
    }

    #[test]
    fn clamp_is_not_reported() {
        let observer = Arc::new(CollectingObserver::new());
        let mut game = GameBuilder::new()
            .with_seed(5)
            .with_violation_observer(observer.clone())
            .start();
        game.configure(1, 10, 1000);
        assert!(observer.is_empty());
    }

    #[test]
    fn finish_without_draw_is_reported() {
        let observer = Arc::new(CollectingObserver::new());
        let mut game = GameBuilder::new()
            .with_seed(5)
            .with_violation_observer(observer.clone())
            .start();
        game.events().for_each(drop);

        game.finish_draw();
        assert!(observer.has_violation(ViolationKind::DrawState));
        assert!(observer.has_severity(ViolationSeverity::Warning));
        assert_eq!(game.events().len(), 0);
    }

    #[test]
    fn apply_settings_parses_text() {
        let mut game = seeded(1, 5, 1);
        let config = game.apply_settings("10", "abc", "5 balls");
        assert_eq!(
            config,
            GameConfig {
                min_number: 10,
                max_number: 90,
                batch_size: 5
            }
        );
        assert_eq!(game.stats().pool_size, 81);
    }

    #[test]
    fn presentation_order_shrinks_as_balls_are_drawn() {
        let mut game = seeded(1, 10, 2);
        let batch = game.draw_and_finish().into_result().unwrap();
        let cage = game.presentation_order();
        assert_eq!(cage.len(), 8);
        for ball in &batch {
            assert!(!cage.contains(ball));
            assert!(game.is_drawn(*ball));
        }
        assert_eq!(game.last_drawn(), batch.balls().last().copied());
    }

    #[test]
    fn contains_follows_range() {
        let game = seeded(-3, 3, 1);
        assert!(game.contains(Ball::new(-3)));
        assert!(game.contains(Ball::new(0)));
        assert!(!game.contains(Ball::new(4)));
    }

    #[test]
    fn into_result_maps_ignored() {
        assert_eq!(
            DrawOutcome::Ignored.into_result(),
            Err(BingoError::DrawInProgress)
        );
    }

    #[test]
    fn debug_output_hides_rng_state() {
        let game = GameState::with_seed(GameConfig::default(), 9);
        let debug = format!("{game:?}");
        assert!(debug.contains("GameState"));
        assert!(debug.contains("Pcg32"));
        assert!(debug.contains("has_violation_observer: false"));
    }
}
