use std::sync::Arc;

use crate::config::GameConfig;
use crate::error::{BingoError, InvalidConfigKind};
use crate::rng::{Pcg32, Rng, SeedableRng};
use crate::telemetry::ViolationObserver;
use crate::GameState;

const DEFAULT_EVENT_QUEUE_SIZE: usize = 100;
const MIN_EVENT_QUEUE_SIZE: usize = 10;

/// The [`GameBuilder`] builds a [`GameState`] with an injected configuration,
/// random source, and violation observer.
///
/// # Example
///
/// ```
/// use bingo_draw::{GameBuilder, GameConfig};
///
/// let game = GameBuilder::new()
///     .with_config(GameConfig::seventy_five_ball())
///     .with_seed(2024)
///     .start();
/// assert_eq!(game.stats().pool_size, 75);
/// ```
#[must_use = "GameBuilder must have start() called on it to create a game"]
pub struct GameBuilder<R: Rng = Pcg32> {
    config: GameConfig,
    rng: R,
    /// Observer for config corrections and draw-state misuse.
    violation_observer: Option<Arc<dyn ViolationObserver>>,
    /// Maximum number of events to queue before oldest are dropped.
    event_queue_size: usize,
}

impl<R: Rng> std::fmt::Debug for GameBuilder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Destructure so a new field cannot be forgotten here.
        let Self {
            config,
            rng: _,
            violation_observer,
            event_queue_size,
        } = self;

        f.debug_struct("GameBuilder")
            .field("config", config)
            .field("rng", &std::any::type_name::<R>())
            .field("has_violation_observer", &violation_observer.is_some())
            .field("event_queue_size", event_queue_size)
            .finish()
    }
}

impl Default for GameBuilder<Pcg32> {
    fn default() -> Self {
        Self::new()
    }
}

impl GameBuilder<Pcg32> {
    /// Construct a new builder with the default config and an entropy-seeded [`Pcg32`].
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            rng: Pcg32::from_entropy(),
            violation_observer: None,
            event_queue_size: DEFAULT_EVENT_QUEUE_SIZE,
        }
    }

    /// Seeds the random source, making the shuffle and every draw reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg32::seed_from_u64(seed);
        self
    }
}

impl<R: Rng> GameBuilder<R> {
    /// Sets the game configuration. It is normalized when the game starts.
    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the configuration from numeric settings, rejecting anything that
    /// would otherwise be coerced.
    ///
    /// # Errors
    /// Returns [`BingoError::InvalidConfiguration`] as [`GameConfig::validated`] does.
    pub fn with_strict_config(
        mut self,
        min_number: i32,
        max_number: i32,
        batch_size: usize,
    ) -> Result<Self, BingoError> {
        self.config = GameConfig::validated(min_number, max_number, batch_size)?;
        Ok(self)
    }

    /// Replaces the random source.
    pub fn with_rng<R2: Rng>(self, rng: R2) -> GameBuilder<R2> {
        let Self {
            config,
            rng: _,
            violation_observer,
            event_queue_size,
        } = self;
        GameBuilder {
            config,
            rng,
            violation_observer,
            event_queue_size,
        }
    }

    /// Sets a custom observer for violations.
    ///
    /// Without one, violations are logged through [`TracingObserver`].
    ///
    /// [`TracingObserver`]: crate::telemetry::TracingObserver
    ///
    /// # Example
    ///
    /// ```
    /// use bingo_draw::GameBuilder;
    /// use bingo_draw::telemetry::CollectingObserver;
    /// use std::sync::Arc;
    ///
    /// let observer = Arc::new(CollectingObserver::new());
    /// let mut game = GameBuilder::new()
    ///     .with_violation_observer(observer.clone())
    ///     .start();
    ///
    /// game.finish_draw();
    /// assert!(!observer.is_empty());
    /// ```
    pub fn with_violation_observer(mut self, observer: Arc<dyn ViolationObserver>) -> Self {
        self.violation_observer = Some(observer);
        self
    }

    /// Sets how many events are kept before the oldest are dropped.
    ///
    /// Default: 100
    ///
    /// # Errors
    /// Returns [`BingoError::InvalidConfiguration`] if `size` is below 10.
    pub fn with_event_queue_size(mut self, size: usize) -> Result<Self, BingoError> {
        if size < MIN_EVENT_QUEUE_SIZE {
            return Err(InvalidConfigKind::EventQueueSizeTooSmall { size }.into());
        }
        self.event_queue_size = size;
        Ok(self)
    }

    /// Consumes the builder to create a game.
    ///
    /// The config is normalized here; corrections are reported to the violation observer.
    pub fn start(self) -> GameState<R> {
        GameState::from_parts(
            self.config,
            self.rng,
            self.violation_observer,
            self.event_queue_size,
        )
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
    use crate::telemetry::{CollectingObserver, ViolationKind};
    use crate::{BingoEvent, DrawOutcome};

    #[test]
    fn default_builder_starts_default_game() {
        let game = GameBuilder::default().start();
        assert_eq!(*game.config(), GameConfig::default());
    }

    #[test]
    fn start_emits_game_reset() {
        let mut game = GameBuilder::new().with_seed(1).start();
        let events: Vec<_> = game.events().collect();
        assert_eq!(
            events,
            vec![BingoEvent::GameReset {
                pool_size: 90,
                batch_size: 1
            }]
        );
    }

    #[test]
    fn strict_config_rejects_reversed_range() {
        let err = GameBuilder::new().with_strict_config(9, 1, 1).unwrap_err();
        assert!(matches!(
            err,
            BingoError::InvalidConfiguration {
                kind: InvalidConfigKind::EmptyRange { .. }
            }
        ));
    }

    #[test]
    fn strict_config_accepts_valid_settings() {
        let game = GameBuilder::new()
            .with_strict_config(1, 30, 5)
            .unwrap()
            .with_seed(4)
            .start();
        assert_eq!(game.stats().pool_size, 30);
        assert_eq!(game.stats().batch_size, 5);
    }

    #[test]
    fn event_queue_size_minimum() {
        assert!(GameBuilder::new().with_event_queue_size(9).is_err());
        assert!(GameBuilder::new().with_event_queue_size(10).is_ok());
    }

    #[test]
    fn lenient_config_reported_at_start() {
        let observer = Arc::new(CollectingObserver::new());
        let game = GameBuilder::new()
            .with_config(GameConfig {
                min_number: 20,
                max_number: 10,
                batch_size: 1,
            })
            .with_violation_observer(observer.clone())
            .start();
        assert_eq!(game.config().min_number, 10);
        assert!(observer.has_violation(ViolationKind::Configuration));
    }

    #[test]
    fn custom_rng_is_used() {
        // Constant output still clears the rejection threshold.
        struct Saturated;
        impl Rng for Saturated {
            fn next_u32(&mut self) -> u32 {
                u32::MAX
            }
            fn next_u64(&mut self) -> u64 {
                u64::MAX
            }
        }

        let mut game = GameBuilder::new()
            .with_config(GameConfig::new(1, 3, 3))
            .with_rng(Saturated)
            .start();
        let DrawOutcome::Drawn(batch) = game.draw() else {
            panic!("expected a batch");
        };
        assert_eq!(batch.len(), 3);
        assert_eq!(game.stats().remaining_count, 0);
    }

    #[test]
    fn debug_lists_fields() {
        let debug = format!("{:?}", GameBuilder::new().with_seed(1));
        assert!(debug.contains("event_queue_size: 100"));
        assert!(debug.contains("has_violation_observer: false"));
    }
}
