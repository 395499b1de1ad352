//! Configuration types for bingo games.
//!
//! # Overview
//!
//! | Config Type | Purpose | Key Presets |
//! |-------------|---------|-------------|
//! | `GameConfig` | Number range and batch size | `ninety_ball()`, `seventy_five_ball()`, `thirty_ball()` |
//! | `RevealConfig` | Pacing of the staged reveal | `instant()`, `dramatic()` |
//!
//! # Entry points
//!
//! Settings arrive from a form, so the default path never fails:
//!
//! - [`GameConfig::from_inputs`] parses raw text the way a browser's
//!   `parseInt(x) || default` does, then coerces.
//! - [`GameConfig::new`] coerces numeric input: a reversed range is swapped,
//!   a zero batch becomes one, an oversized range is narrowed, and a batch
//!   larger than the pool is clamped.
//! - [`GameConfig::validated`] is the strict alternative that rejects instead.
//!
//! # Example
//!
//! ```
//! use bingo_draw::GameConfig;
//!
//! let config = GameConfig::from_inputs(" 1", "10", "1000");
//! assert_eq!(config.pool_size(), 10);
//! assert_eq!(config.batch_size, 10);
//!
//! let config = GameConfig::from_inputs("abc", "", "2");
//! assert_eq!((config.min_number, config.max_number), (1, 90));
//! ```

use std::fmt;

use web_time::Duration;

use crate::error::{BingoError, InvalidConfigKind};
use crate::telemetry::{SpecViolation, ViolationKind, ViolationSeverity};

/// Lowest ball number used when no valid value is given.
pub const DEFAULT_MIN_NUMBER: i32 = 1;
/// Highest ball number used when no valid value is given.
pub const DEFAULT_MAX_NUMBER: i32 = 90;
/// Balls drawn per draw action when no valid value is given.
pub const DEFAULT_BATCH_SIZE: usize = 1;
/// Largest pool the engine will build.
///
/// Ranges are `i32`, so an unchecked range could ask for four billion balls.
pub const MAX_POOL_SIZE: usize = 1 << 20;

/// Number range and batch size for a game.
///
/// Fields are public so a config can be built with struct update syntax, but a
/// hand-built or deserialized value may be out of range. [`GameState`] always
/// passes configs through [`GameConfig::normalize`] before using them.
///
/// # Forward Compatibility
///
/// Always use `..GameConfig::default()` when constructing with struct syntax.
///
/// [`GameState`]: crate::GameState
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Lowest ball number (inclusive).
    ///
    /// Default: 1
    pub min_number: i32,

    /// Highest ball number (inclusive).
    ///
    /// Default: 90
    pub max_number: i32,

    /// Balls drawn per draw action. Never larger than the pool after normalization.
    ///
    /// Default: 1
    pub batch_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_number: DEFAULT_MIN_NUMBER,
            max_number: DEFAULT_MAX_NUMBER,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl GameConfig {
    /// Creates a config from numeric settings, coercing anything out of range.
    ///
    /// Every correction except the batch clamp is reported as a
    /// `Configuration` violation through the default tracing observer. Use
    /// [`GameState::configure`](crate::GameState::configure) to route them to
    /// a game's own observer instead.
    ///
    /// ```
    /// use bingo_draw::GameConfig;
    ///
    /// let config = GameConfig::new(10, 1, 0);
    /// assert_eq!((config.min_number, config.max_number, config.batch_size), (1, 10, 1));
    /// ```
    #[must_use]
    pub fn new(min_number: i32, max_number: i32, batch_size: usize) -> Self {
        let (config, adjustments) = Self {
            min_number,
            max_number,
            batch_size,
        }
        .normalize();
        for adjustment in &adjustments {
            adjustment.log(None);
        }
        config
    }

    /// Creates a config from raw text fields with best-effort parsing.
    ///
    /// Each field is read like `parseInt(field) || default`: leading whitespace
    /// is skipped, an optional sign and the longest run of digits are taken,
    /// and anything else is ignored. Empty, unparsable, zero, or out-of-range
    /// input falls back to the field default. A negative batch size also falls
    /// back to the default. The result is then coerced as in [`GameConfig::new`].
    #[must_use]
    pub fn from_inputs(min_number: &str, max_number: &str, batch_size: &str) -> Self {
        let parsed = Self::parse_inputs(min_number, max_number, batch_size);
        Self::new(parsed.min_number, parsed.max_number, parsed.batch_size)
    }

    /// Parses text fields with defaults but without coercing the result.
    pub(crate) fn parse_inputs(min_number: &str, max_number: &str, batch_size: &str) -> Self {
        Self {
            min_number: lenient_number(min_number, DEFAULT_MIN_NUMBER),
            max_number: lenient_number(max_number, DEFAULT_MAX_NUMBER),
            batch_size: parse_leading_int(batch_size)
                .filter(|&value| value > 0)
                .and_then(|value| usize::try_from(value).ok())
                .unwrap_or(DEFAULT_BATCH_SIZE),
        }
    }

    /// Creates a config, rejecting settings that [`GameConfig::new`] would coerce.
    ///
    /// A batch size larger than the pool is still clamped silently.
    ///
    /// # Errors
    /// Returns [`BingoError::InvalidConfiguration`] for a reversed range, a zero
    /// batch size, or a range larger than [`MAX_POOL_SIZE`].
    pub fn validated(
        min_number: i32,
        max_number: i32,
        batch_size: usize,
    ) -> Result<Self, BingoError> {
        let config = Self {
            min_number,
            max_number,
            batch_size,
        };
        config.validate()?;
        Ok(config.normalize().0)
    }

    /// Checks the config without modifying it.
    ///
    /// # Errors
    /// Returns [`BingoError::InvalidConfiguration`] describing the first problem found.
    pub fn validate(&self) -> Result<(), BingoError> {
        if self.min_number > self.max_number {
            return Err(InvalidConfigKind::EmptyRange {
                min_number: self.min_number,
                max_number: self.max_number,
            }
            .into());
        }
        if self.batch_size == 0 {
            return Err(InvalidConfigKind::ZeroBatchSize.into());
        }
        let span = range_len(self.min_number, self.max_number);
        if span > MAX_POOL_SIZE as i64 {
            return Err(InvalidConfigKind::PoolTooLarge {
                pool_size: span as u64,
                max_pool_size: MAX_POOL_SIZE,
            }
            .into());
        }
        Ok(())
    }

    /// Coerces the config into range and lists every correction made.
    ///
    /// Corrections are applied in this order: swap a reversed range, narrow a
    /// range larger than [`MAX_POOL_SIZE`], raise a zero batch size to one,
    /// clamp the batch size to the pool size.
    #[must_use]
    pub fn normalize(self) -> (Self, Vec<ConfigAdjustment>) {
        let mut adjustments = Vec::new();
        let mut min_number = self.min_number;
        let mut max_number = self.max_number;

        if min_number > max_number {
            std::mem::swap(&mut min_number, &mut max_number);
            adjustments.push(ConfigAdjustment::SwappedRange {
                min_number: self.min_number,
                max_number: self.max_number,
            });
        }

        if range_len(min_number, max_number) > MAX_POOL_SIZE as i64 {
            let applied_max = min_number.saturating_add(MAX_POOL_SIZE as i32 - 1);
            adjustments.push(ConfigAdjustment::NarrowedRange {
                requested_max: max_number,
                applied_max,
            });
            max_number = applied_max;
        }

        let pool_size = range_len(min_number, max_number) as usize;
        let mut batch_size = self.batch_size;
        if batch_size == 0 {
            batch_size = DEFAULT_BATCH_SIZE;
            adjustments.push(ConfigAdjustment::RaisedBatchSize {
                applied: batch_size,
            });
        }
        if batch_size > pool_size {
            adjustments.push(ConfigAdjustment::ClampedBatchSize {
                requested: batch_size,
                applied: pool_size,
            });
            batch_size = pool_size;
        }

        (
            Self {
                min_number,
                max_number,
                batch_size,
            },
            adjustments,
        )
    }

    /// Number of balls in the pool, `max_number - min_number + 1`.
    ///
    /// Returns 0 for a reversed range.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        range_len(self.min_number, self.max_number).max(0) as usize
    }

    /// Returns a copy with a different batch size (not yet normalized).
    pub fn with_batch_size(self, batch_size: usize) -> Self {
        Self { batch_size, ..self }
    }

    /// Classic 90-ball game (1–90), one ball per draw. Same as the default.
    pub fn ninety_ball() -> Self {
        Self::default()
    }

    /// 80-ball game (1–80), one ball per draw.
    pub fn eighty_ball() -> Self {
        Self {
            max_number: 80,
            ..Self::default()
        }
    }

    /// 75-ball game (1–75), one ball per draw.
    pub fn seventy_five_ball() -> Self {
        Self {
            max_number: 75,
            ..Self::default()
        }
    }

    /// 30-ball speed game (1–30), one ball per draw.
    pub fn thirty_ball() -> Self {
        Self {
            max_number: 30,
            ..Self::default()
        }
    }
}

/// A correction made by [`GameConfig::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigAdjustment {
    /// `min_number > max_number`; the bounds were swapped.
    SwappedRange {
        /// The requested (larger) lower bound.
        min_number: i32,
        /// The requested (smaller) upper bound.
        max_number: i32,
    },
    /// The range exceeded [`MAX_POOL_SIZE`]; the upper bound was lowered.
    NarrowedRange {
        /// The requested upper bound.
        requested_max: i32,
        /// The upper bound actually used.
        applied_max: i32,
    },
    /// A zero batch size was raised.
    RaisedBatchSize {
        /// The batch size actually used.
        applied: usize,
    },
    /// The batch size exceeded the pool size and was clamped.
    ClampedBatchSize {
        /// The requested batch size.
        requested: usize,
        /// The batch size actually used (the pool size).
        applied: usize,
    },
}

impl ConfigAdjustment {
    /// Whether this correction is applied without reporting a violation.
    ///
    /// Only the batch clamp is silent; it is logged at `debug` level.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::ClampedBatchSize { .. })
    }

    /// Builds the violation reported for this correction.
    #[must_use]
    pub fn to_violation(&self) -> SpecViolation {
        let violation = SpecViolation::new(
            ViolationSeverity::Warning,
            ViolationKind::Configuration,
            self.to_string(),
            concat!(file!(), ":", line!()),
        );
        match *self {
            Self::SwappedRange {
                min_number,
                max_number,
            } => violation
                .with_context("min_number", min_number.to_string())
                .with_context("max_number", max_number.to_string()),
            Self::NarrowedRange {
                requested_max,
                applied_max,
            } => violation
                .with_context("requested_max", requested_max.to_string())
                .with_context("applied_max", applied_max.to_string()),
            Self::RaisedBatchSize { applied } => {
                violation.with_context("applied", applied.to_string())
            }
            Self::ClampedBatchSize { requested, applied } => violation
                .with_context("requested", requested.to_string())
                .with_context("applied", applied.to_string()),
        }
    }

    /// Logs the clamp at `debug`, reports everything else as a violation.
    pub(crate) fn log(
        &self,
        observer: Option<&std::sync::Arc<dyn crate::telemetry::ViolationObserver>>,
    ) {
        if self.is_silent() {
            tracing::debug!(adjustment = %self, "batch size clamped to pool size");
        } else {
            crate::telemetry::report_to_observer(observer, &self.to_violation());
        }
    }
}

impl fmt::Display for ConfigAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SwappedRange {
                min_number,
                max_number,
            } => write!(
                f,
                "min_number {} greater than max_number {}, bounds swapped",
                min_number, max_number
            ),
            Self::NarrowedRange {
                requested_max,
                applied_max,
            } => write!(
                f,
                "range too large, max_number lowered from {} to {}",
                requested_max, applied_max
            ),
            Self::RaisedBatchSize { applied } => {
                write!(f, "batch_size 0 raised to {}", applied)
            }
            Self::ClampedBatchSize { requested, applied } => write!(
                f,
                "batch_size {} clamped to pool size {}",
                requested, applied
            ),
        }
    }
}

/// Pacing of the staged reveal of a drawn batch.
///
/// Ball `i` (0-based) of a batch is revealed at
/// `initial_delay + i * per_ball_interval`, and the batch is complete at
/// `initial_delay + n * per_ball_interval + settle_delay`.
///
/// # Example
///
/// ```
/// use bingo_draw::RevealConfig;
/// use web_time::Duration;
///
/// let config = RevealConfig {
///     per_ball_interval: Duration::from_millis(500),
///     ..RevealConfig::default()
/// };
/// assert_eq!(config.total_duration(3), Duration::from_millis(300 + 1500 + 200));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use = "RevealConfig has no effect unless passed to RevealSchedule::new()"]
pub struct RevealConfig {
    /// Pause between the draw action and the first reveal.
    ///
    /// Default: 300ms
    pub initial_delay: Duration,

    /// Gap between consecutive reveals within a batch.
    ///
    /// Default: 300ms
    pub per_ball_interval: Duration,

    /// Pause after the last reveal before the batch counts as complete.
    ///
    /// Default: 200ms
    pub settle_delay: Duration,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(300),
            per_ball_interval: Duration::from_millis(300),
            settle_delay: Duration::from_millis(200),
        }
    }
}

impl RevealConfig {
    /// Creates a new `RevealConfig` with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// No pauses at all; every cue is due immediately.
    ///
    /// Useful for headless play and tests.
    pub fn instant() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            per_ball_interval: Duration::ZERO,
            settle_delay: Duration::ZERO,
        }
    }

    /// Slow pacing for a big-screen hall display.
    pub fn dramatic() -> Self {
        Self {
            initial_delay: Duration::from_millis(800),
            per_ball_interval: Duration::from_millis(1500),
            settle_delay: Duration::from_millis(600),
        }
    }

    /// Offset of the reveal of ball `index` (0-based) from the draw action.
    #[must_use]
    pub fn reveal_offset(&self, index: usize) -> Duration {
        self.initial_delay + scale(self.per_ball_interval, index)
    }

    /// Offset at which a batch of `count` balls is complete.
    #[must_use]
    pub fn total_duration(&self, count: usize) -> Duration {
        self.initial_delay + scale(self.per_ball_interval, count) + self.settle_delay
    }
}

fn scale(interval: Duration, count: usize) -> Duration {
    interval.saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Number of integers in `[min, max]`; negative when the range is reversed.
fn range_len(min_number: i32, max_number: i32) -> i64 {
    i64::from(max_number) - i64::from(min_number) + 1
}

fn lenient_number(input: &str, default: i32) -> i32 {
    parse_leading_int(input)
        .and_then(|value| i32::try_from(value).ok())
        .filter(|&value| value != 0)
        .unwrap_or(default)
}

/// Parses the leading integer of `input`.
///
/// Skips leading whitespace, accepts one optional `+` or `-`, then reads the
/// longest run of ASCII digits. Trailing text is ignored. Returns `None` when
/// there are no digits or the value overflows `i64`.
///
/// ```
/// use bingo_draw::config::parse_leading_int;
///
/// assert_eq!(parse_leading_int("  42 balls"), Some(42));
/// assert_eq!(parse_leading_int("-7"), Some(-7));
/// assert_eq!(parse_leading_int("3.9"), Some(3));
/// assert_eq!(parse_leading_int("x1"), None);
/// ```
#[must_use]
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut digits = rest.bytes().take_while(u8::is_ascii_digit).peekable();
    digits.peek()?;

    let mut value: i64 = 0;
    for digit in digits {
        value = value
            .checked_mul(10)?
            .checked_add(i64::from(digit - b'0'))?;
    }
    Some(if negative { -value } else { value })
}
