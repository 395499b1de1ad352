use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// Reasons a strictly validated configuration or builder setting can be rejected.
///
/// The lenient entry points ([`GameConfig::new`], [`GameConfig::from_inputs`],
/// [`GameState::configure`]) coerce all of these instead of failing; only
/// [`GameConfig::validated`] and [`GameConfig::validate`] report them.
///
/// [`GameConfig::new`]: crate::GameConfig::new
/// [`GameConfig::from_inputs`]: crate::GameConfig::from_inputs
/// [`GameConfig::validated`]: crate::GameConfig::validated
/// [`GameConfig::validate`]: crate::GameConfig::validate
/// [`GameState::configure`]: crate::GameState::configure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum InvalidConfigKind {
    /// `min_number` is greater than `max_number`.
    EmptyRange {
        /// The requested lower bound.
        min_number: i32,
        /// The requested upper bound.
        max_number: i32,
    },
    /// The batch size was zero.
    ZeroBatchSize,
    /// The range holds more balls than [`MAX_POOL_SIZE`](crate::MAX_POOL_SIZE).
    PoolTooLarge {
        /// Number of balls the range would hold.
        pool_size: u64,
        /// The largest supported pool.
        max_pool_size: usize,
    },
    /// The event queue size is below the minimum of 10.
    EventQueueSizeTooSmall {
        /// The requested size.
        size: usize,
    },
}

impl Display for InvalidConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRange {
                min_number,
                max_number,
            } => write!(
                f,
                "min_number {} is greater than max_number {}",
                min_number, max_number
            ),
            Self::ZeroBatchSize => write!(f, "batch_size must be at least 1"),
            Self::PoolTooLarge {
                pool_size,
                max_pool_size,
            } => write!(
                f,
                "range holds {} balls, more than the supported {}",
                pool_size, max_pool_size
            ),
            Self::EventQueueSizeTooSmall { size } => {
                write!(f, "event queue size {} is below the minimum of 10", size)
            }
        }
    }
}

/// All errors this library can return.
///
/// Most draw-engine operations never fail: bad settings are coerced and a draw
/// on an empty pool is reported as [`DrawOutcome::Exhausted`]. `BingoError`
/// covers the strict paths and [`DrawOutcome::into_result`].
///
/// [`DrawOutcome::Exhausted`]: crate::DrawOutcome::Exhausted
/// [`DrawOutcome::into_result`]: crate::DrawOutcome::into_result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BingoError {
    /// A configuration was rejected by strict validation.
    InvalidConfiguration {
        /// Why the configuration was rejected.
        kind: InvalidConfigKind,
    },
    /// Every ball has been drawn; reset or reconfigure to play again.
    PoolExhausted {
        /// Number of balls drawn (equal to the pool size).
        drawn: usize,
    },
    /// A draw was requested while the previous batch was still being revealed.
    DrawInProgress,
}

impl Display for BingoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BingoError::InvalidConfiguration { kind } => {
                write!(f, "Invalid configuration: {}", kind)
            }
            BingoError::PoolExhausted { drawn } => {
                write!(f, "All {} balls have been drawn.", drawn)
            }
            BingoError::DrawInProgress => {
                write!(f, "A draw is already in progress.")
            }
        }
    }
}

impl Error for BingoError {}

impl From<InvalidConfigKind> for BingoError {
    fn from(kind: InvalidConfigKind) -> Self {
        Self::InvalidConfiguration { kind }
    }
}

/// Convenience alias for results returned by this crate.
pub type BingoResult<T> = Result<T, BingoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pool_exhausted() {
        let err = BingoError::PoolExhausted { drawn: 90 };
        assert_eq!(err.to_string(), "All 90 balls have been drawn.");
    }

    #[test]
    fn display_invalid_configuration_includes_kind() {
        let err = BingoError::from(InvalidConfigKind::EmptyRange {
            min_number: 10,
            max_number: 1,
        });
        assert_eq!(
            err.to_string(),
            "Invalid configuration: min_number 10 is greater than max_number 1"
        );
    }

    #[test]
    fn display_pool_too_large() {
        let kind = InvalidConfigKind::PoolTooLarge {
            pool_size: 4_294_967_296,
            max_pool_size: 1_048_576,
        };
        assert!(kind.to_string().contains("4294967296"));
    }

    #[test]
    fn error_trait_object() {
        let err: Box<dyn Error> = Box::new(BingoError::DrawInProgress);
        assert_eq!(err.to_string(), "A draw is already in progress.");
    }
}
