//! Paced reveal of a drawn batch.
//!
//! The engine hands back a whole [`DrawBatch`] at once. This module turns it
//! into timed cues for the presentation layer: ball `i` is revealed at
//! `initial_delay + i * per_ball_interval`, and the batch is complete after
//! the last reveal plus `settle_delay` (see [`RevealConfig`]).
//!
//! [`RevealPlayback`] is polled against a caller-supplied clock, so it works
//! from a frame loop, a test, or (with the `tokio` feature) the async driver in
//! [`tokio_reveal`]. Cancelling playback never touches the [`GameState`].
//!
//! ```
//! use bingo_draw::{GameBuilder, RevealConfig, RevealPlayback, RevealSchedule, RevealStep};
//! use web_time::{Duration, Instant};
//!
//! let mut game = GameBuilder::new().with_seed(3).start();
//! game.configure(1, 90, 2);
//! let batch = game.draw().into_result()?;
//!
//! let schedule = RevealSchedule::new(&batch, &RevealConfig::default());
//! let start = Instant::now();
//! let mut playback = RevealPlayback::start(schedule, start);
//!
//! assert!(playback.poll(start).is_empty());
//! let steps = playback.poll(start + Duration::from_millis(1100));
//! assert_eq!(steps.len(), 3);
//! assert!(matches!(steps[2], RevealStep::Complete { .. }));
//! game.finish_draw();
//! # Ok::<(), bingo_draw::BingoError>(())
//! ```
//!
//! [`GameState`]: crate::GameState

use smallvec::SmallVec;
use web_time::{Duration, Instant};

use crate::config::RevealConfig;
use crate::{Ball, DrawBatch};

#[cfg(feature = "tokio")]
pub mod tokio_reveal;

/// One timed reveal within a batch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RevealCue {
    /// The ball to show.
    pub ball: Ball,
    /// 1-based position of the ball in the game's draw order.
    pub position: usize,
    /// Offset from the draw action at which the ball should appear.
    pub at: Duration,
}

/// What the presentation layer should do next.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RevealStep {
    /// Show one ball.
    Reveal(RevealCue),
    /// Every ball is shown and the settle delay has passed; call
    /// [`GameState::finish_draw`](crate::GameState::finish_draw).
    Complete {
        /// Balls left in the pool after the batch.
        remaining: usize,
    },
}

/// The timing plan for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealSchedule {
    cues: SmallVec<[RevealCue; 8]>,
    complete_at: Duration,
    remaining: usize,
}

impl RevealSchedule {
    /// Plans the reveal of `batch` with the given pacing.
    #[must_use]
    pub fn new(batch: &DrawBatch, config: &RevealConfig) -> Self {
        let cues = batch
            .positions()
            .enumerate()
            .map(|(index, (position, ball))| RevealCue {
                ball,
                position,
                at: config.reveal_offset(index),
            })
            .collect();
        Self {
            cues,
            complete_at: config.total_duration(batch.len()),
            remaining: batch.remaining(),
        }
    }

    /// The reveal cues in order.
    #[must_use]
    pub fn cues(&self) -> &[RevealCue] {
        &self.cues
    }

    /// Offset at which the batch is complete.
    #[must_use]
    pub fn complete_at(&self) -> Duration {
        self.complete_at
    }

    /// Every step paired with its offset, ending with [`RevealStep::Complete`].
    pub fn steps(&self) -> impl Iterator<Item = (Duration, RevealStep)> + '_ {
        self.cues
            .iter()
            .map(|cue| (cue.at, RevealStep::Reveal(*cue)))
            .chain(std::iter::once((
                self.complete_at,
                RevealStep::Complete {
                    remaining: self.remaining,
                },
            )))
    }
}

/// Clock-driven playback of a [`RevealSchedule`].
#[derive(Debug, Clone)]
pub struct RevealPlayback {
    schedule: RevealSchedule,
    started_at: Instant,
    next_cue: usize,
    completed: bool,
    cancelled: bool,
}

impl RevealPlayback {
    /// Starts playback with `now` as the moment of the draw action.
    #[must_use]
    pub fn start(schedule: RevealSchedule, now: Instant) -> Self {
        Self {
            schedule,
            started_at: now,
            next_cue: 0,
            completed: false,
            cancelled: false,
        }
    }

    /// Returns every step that has come due since the last poll, in order.
    ///
    /// [`RevealStep::Complete`] is returned exactly once, after the last
    /// reveal. Nothing is returned after [`cancel`](Self::cancel).
    pub fn poll(&mut self, now: Instant) -> Vec<RevealStep> {
        let mut steps = Vec::new();
        if self.is_finished() {
            return steps;
        }
        let elapsed = now.saturating_duration_since(self.started_at);

        while let Some(cue) = self.schedule.cues.get(self.next_cue) {
            if cue.at > elapsed {
                return steps;
            }
            steps.push(RevealStep::Reveal(*cue));
            self.next_cue += 1;
        }
        if self.schedule.complete_at <= elapsed {
            self.completed = true;
            steps.push(RevealStep::Complete {
                remaining: self.schedule.remaining,
            });
        }
        steps
    }

    /// Stops playback. Later polls return nothing.
    pub fn cancel(&mut self) {
        if !self.is_finished() {
            tracing::trace!(revealed = self.next_cue, "reveal cancelled");
        }
        self.cancelled = true;
    }

    /// Returns true once playback has completed or been cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.completed || self.cancelled
    }

    /// Returns true if playback was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Cues revealed so far.
    #[must_use]
    pub fn revealed(&self) -> &[RevealCue] {
        self.schedule.cues.get(..self.next_cue).unwrap_or_default()
    }

    /// Time until the next step comes due, or `None` once finished.
    ///
    /// Returns `Duration::ZERO` if a step is already due.
    #[must_use]
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        if self.is_finished() {
            return None;
        }
        let due = self
            .schedule
            .cues
            .get(self.next_cue)
            .map_or(self.schedule.complete_at, |cue| cue.at);
        let elapsed = now.saturating_duration_since(self.started_at);
        Some(due.saturating_sub(elapsed))
    }

    /// The schedule being played.
    #[must_use]
    pub fn schedule(&self) -> &RevealSchedule {
        &self.schedule
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
    use crate::GameBuilder;

    fn batch(size: usize) -> DrawBatch {
        let mut game = GameBuilder::new().with_seed(11).start();
        game.configure(1, 90, size);
        game.draw().into_result().unwrap()
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn schedule_offsets_follow_config() {
        let batch = batch(3);
        let schedule = RevealSchedule::new(&batch, &RevealConfig::default());
        let offsets: Vec<Duration> = schedule.cues().iter().map(|cue| cue.at).collect();
        assert_eq!(offsets, vec![ms(300), ms(600), ms(900)]);
        assert_eq!(schedule.complete_at(), ms(1400));

        let balls: Vec<Ball> = schedule.cues().iter().map(|cue| cue.ball).collect();
        assert_eq!(balls, batch.balls());
    }

    #[test]
    fn steps_end_with_complete() {
        let schedule = RevealSchedule::new(&batch(2), &RevealConfig::default());
        let steps: Vec<_> = schedule.steps().collect();
        assert_eq!(steps.len(), 3);
        assert_eq!(
            steps[2],
            (ms(1100), RevealStep::Complete { remaining: 88 })
        );
    }

    #[test]
    fn poll_reveals_incrementally() {
        let schedule = RevealSchedule::new(&batch(3), &RevealConfig::default());
        let start = Instant::now();
        let mut playback = RevealPlayback::start(schedule, start);

        assert!(playback.poll(start + ms(299)).is_empty());
        assert_eq!(playback.poll(start + ms(300)).len(), 1);
        assert_eq!(playback.poll(start + ms(950)).len(), 2);
        assert_eq!(playback.revealed().len(), 3);
        assert!(!playback.is_finished());

        let last = playback.poll(start + ms(1400));
        assert_eq!(last, vec![RevealStep::Complete { remaining: 87 }]);
        assert!(playback.is_finished());
        assert!(playback.poll(start + ms(5000)).is_empty());
    }

    #[test]
    fn late_poll_returns_everything_in_order() {
        let schedule = RevealSchedule::new(&batch(4), &RevealConfig::default());
        let start = Instant::now();
        let mut playback = RevealPlayback::start(schedule.clone(), start);

        let steps = playback.poll(start + ms(10_000));
        let expected: Vec<RevealStep> = schedule.steps().map(|(_, step)| step).collect();
        assert_eq!(steps, expected);
    }

    #[test]
    fn cancel_suppresses_further_steps() {
        let schedule = RevealSchedule::new(&batch(3), &RevealConfig::default());
        let start = Instant::now();
        let mut playback = RevealPlayback::start(schedule, start);

        assert_eq!(playback.poll(start + ms(300)).len(), 1);
        playback.cancel();
        assert!(playback.is_cancelled());
        assert!(playback.is_finished());
        assert!(playback.poll(start + ms(10_000)).is_empty());
        assert_eq!(playback.time_until_next(start), None);
    }

    #[test]
    fn time_until_next_tracks_schedule() {
        let schedule = RevealSchedule::new(&batch(1), &RevealConfig::default());
        let start = Instant::now();
        let mut playback = RevealPlayback::start(schedule, start);

        assert_eq!(playback.time_until_next(start), Some(ms(300)));
        assert_eq!(playback.time_until_next(start + ms(400)), Some(Duration::ZERO));
        let _ = playback.poll(start + ms(300));
        assert_eq!(playback.time_until_next(start + ms(300)), Some(ms(500)));
    }

    #[test]
    fn instant_config_completes_on_first_poll() {
        let schedule = RevealSchedule::new(&batch(5), &RevealConfig::instant());
        let start = Instant::now();
        let mut playback = RevealPlayback::start(schedule, start);
        assert_eq!(playback.poll(start).len(), 6);
        assert!(playback.is_finished());
    }
}
