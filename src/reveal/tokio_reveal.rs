//! Tokio driver for a [`RevealSchedule`].
//!
//! Sleeps until each step of the schedule comes due and sends it over an
//! unbounded channel. The receiving side (a UI task) shows the ball, and on
//! [`RevealStep::Complete`] calls [`GameState::finish_draw`].
//!
//! # Example
//!
//! ```no_run
//! use bingo_draw::reveal::tokio_reveal::spawn_reveal;
//! use bingo_draw::{GameBuilder, RevealConfig, RevealSchedule, RevealStep};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), bingo_draw::BingoError> {
//!     let mut game = GameBuilder::new().start();
//!     let batch = game.draw().into_result()?;
//!
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!     let _handle = spawn_reveal(RevealSchedule::new(&batch, &RevealConfig::default()), tx);
//!     while let Some(step) = rx.recv().await {
//!         if let RevealStep::Complete { .. } = step {
//!             game.finish_draw();
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flag
//!
//! This module requires the `tokio` feature flag:
//!
//! ```toml
//! [dependencies]
//! bingo-draw = { version = "0.1", features = ["tokio"] }
//! ```
//!
//! [`GameState::finish_draw`]: crate::GameState::finish_draw

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::{RevealSchedule, RevealStep};

/// Spawns a task that plays `schedule` in real time.
///
/// Aborting the returned handle cancels the reveal; the game is not touched.
/// The task also stops early if the receiver is dropped.
///
/// Must be called from within a tokio runtime.
pub fn spawn_reveal(
    schedule: RevealSchedule,
    sender: UnboundedSender<RevealStep>,
) -> JoinHandle<()> {
    tokio::spawn(play_reveal(schedule, sender))
}

/// Plays `schedule` on the current task, returning after the `Complete` step.
pub async fn play_reveal(schedule: RevealSchedule, sender: UnboundedSender<RevealStep>) {
    let started_at = Instant::now();
    for (offset, step) in schedule.steps() {
        sleep_until(started_at + offset).await;
        if sender.send(step).is_err() {
            tracing::debug!("reveal receiver dropped, stopping playback");
            return;
        }
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
    use crate::{DrawBatch, GameBuilder, RevealConfig};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn batch(size: usize) -> DrawBatch {
        let mut game = GameBuilder::new().with_seed(17).start();
        game.configure(1, 75, size);
        game.draw().into_result().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn steps_arrive_in_schedule_order() {
        let schedule = RevealSchedule::new(&batch(3), &RevealConfig::default());
        let expected: Vec<_> = schedule.steps().map(|(_, step)| step).collect();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_reveal(schedule, tx);

        let mut received = Vec::new();
        while let Some(step) = rx.recv().await {
            received.push(step);
        }
        handle.await.unwrap();
        assert_eq!(received, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn steps_wait_for_their_offset() {
        let schedule = RevealSchedule::new(&batch(2), &RevealConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let started = Instant::now();
        let _handle = spawn_reveal(schedule, tx);

        rx.recv().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
        rx.recv().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(600));
        let complete = rx.recv().await.unwrap();
        assert!(matches!(complete, RevealStep::Complete { .. }));
        assert!(started.elapsed() >= Duration::from_millis(1100));
    }

    #[tokio::test(start_paused = true)]
    async fn abort_cancels_remaining_steps() {
        let schedule = RevealSchedule::new(&batch(5), &RevealConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_reveal(schedule, tx);

        rx.recv().await.unwrap();
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_receiver_stops_playback() {
        let schedule = RevealSchedule::new(&batch(4), &RevealConfig::default());
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        play_reveal(schedule, tx).await;
    }
}
