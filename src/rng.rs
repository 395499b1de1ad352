//! Random number generation for ball shuffling and draw selection.
//!
//! The draw engine needs two independent uses of randomness: a display-only
//! shuffle of the pool, and a uniform pick from the remaining balls on every
//! draw. Both go through the [`Rng`] trait so callers (and tests) can inject a
//! seeded source and get reproducible games.
//!
//! # PCG32 Algorithm
//!
//! [`Pcg32`] is the PCG-XSH-RR variant with 64 bits of state and 32-bit output:
//! - Period of 2^64
//! - Passes TestU01 statistical tests
//! - Fast, small, and fully deterministic for a given seed
//!
//! Reference: <https://www.pcg-random.org/>
//!
//! # Usage
//!
//! ```rust
//! use bingo_draw::rng::{Pcg32, Rng, SeedableRng};
//!
//! let mut rng = Pcg32::seed_from_u64(12345);
//! let index = rng.gen_range_usize(0..90);
//! assert!(index < 90);
//!
//! let mut balls = [1, 2, 3, 4, 5];
//! rng.shuffle(&mut balls);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    report_violation,
    telemetry::{ViolationKind, ViolationSeverity},
};

/// PCG32 random number generator.
///
/// Suitable for games and testing, but NOT cryptographically secure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcg32 {
    state: u64,
    inc: u64,
}

/// Default increment for single-stream PCG32.
const PCG_DEFAULT_INCREMENT: u64 = 1442695040888963407;

/// Multiplier constant for the LCG step.
const PCG_MULTIPLIER: u64 = 6364136223846793005;

impl Pcg32 {
    /// Creates a new PCG32 generator with the given state and stream.
    ///
    /// The stream selects one of 2^63 independent sequences.
    #[must_use]
    pub const fn new(state: u64, stream: u64) -> Self {
        // The increment must be odd
        let inc = (stream << 1) | 1;
        // Standard PCG seeding: step, add the seed, step again
        let mut pcg = Self { state: 0, inc };
        pcg.state = pcg.state.wrapping_mul(PCG_MULTIPLIER).wrapping_add(pcg.inc);
        pcg.state = pcg.state.wrapping_add(state);
        pcg.state = pcg.state.wrapping_mul(PCG_MULTIPLIER).wrapping_add(pcg.inc);
        pcg
    }

    /// Generates the next 32-bit random value.
    #[inline]
    #[must_use]
    pub fn next_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state
            .wrapping_mul(PCG_MULTIPLIER)
            .wrapping_add(self.inc);
        // XSH-RR output permutation
        let xorshifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Generates the next 64-bit random value by combining two 32-bit values.
    #[inline]
    #[must_use]
    pub fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.next_u32());
        let low = u64::from(self.next_u32());
        (high << 32) | low
    }
}

/// Trait for seeding random number generators.
pub trait SeedableRng: Sized {
    /// Creates a new RNG seeded from a 64-bit value.
    ///
    /// Equal seeds always produce equal sequences.
    #[must_use]
    fn seed_from_u64(seed: u64) -> Self;

    /// Creates a new RNG with a seed derived from the wall clock, thread
    /// identity, and a per-process call counter.
    ///
    /// Use this for live games where every session should differ. Use
    /// [`SeedableRng::seed_from_u64`] when a game must be reproducible.
    #[must_use]
    fn from_entropy() -> Self;
}

impl SeedableRng for Pcg32 {
    fn seed_from_u64(seed: u64) -> Self {
        Self::new(seed, PCG_DEFAULT_INCREMENT)
    }

    fn from_entropy() -> Self {
        Self::seed_from_u64(timing_entropy_seed())
    }
}

/// Source of uniform randomness for the draw engine.
///
/// Implementors only need [`next_u32`](Rng::next_u32) and
/// [`next_u64`](Rng::next_u64); range sampling and shuffling are provided.
pub trait Rng {
    /// Returns the next 32-bit random value.
    fn next_u32(&mut self) -> u32;

    /// Returns the next 64-bit random value.
    fn next_u64(&mut self) -> u64;

    /// Generates a uniformly distributed `usize` in `[low, high)`.
    ///
    /// # Empty Range Behavior
    /// If `range.is_empty()`, reports a violation via telemetry and returns `range.start`.
    fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        let span = range.end.wrapping_sub(range.start);
        if range.start >= range.end {
            report_violation!(
                ViolationSeverity::Error,
                ViolationKind::Configuration,
                "gen_range_usize called with empty range [{}..{})",
                range.start,
                range.end
            );
            return range.start;
        }

        if span <= u32::MAX as usize {
            // Rejection sampling keeps the result unbiased
            let threshold = (span as u32).wrapping_neg() % (span as u32);
            loop {
                let random_value = self.next_u32();
                if random_value >= threshold {
                    return range
                        .start
                        .wrapping_add((random_value % span as u32) as usize);
                }
            }
        } else {
            let span64 = span as u64;
            let threshold = span64.wrapping_neg() % span64;
            loop {
                let random_value = self.next_u64();
                if random_value >= threshold {
                    return range.start.wrapping_add((random_value % span64) as usize);
                }
            }
        }
    }

    /// Shuffles `items` in place with an unbiased Fisher-Yates pass.
    ///
    /// Walks from the last index down to the second, swapping each slot with a
    /// uniformly chosen slot from the not-yet-fixed prefix `[0, i]`, so each of
    /// the `n!` orderings is equally likely.
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.gen_range_usize(0..i + 1);
            items.swap(i, j);
        }
    }
}

impl Rng for Pcg32 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        Self::next_u32(self)
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        Self::next_u64(self)
    }
}

impl<R: Rng + ?Sized> Rng for &mut R {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }
}

/// Calls to [`timing_entropy_seed`] so far in this process.
static ENTROPY_CALLS: AtomicU64 = AtomicU64::new(0);

/// Gets a clock-based seed for RNG initialization.
///
/// Hashes the wall clock (via `web_time`, so it also works in the browser),
/// the current thread id, and a process-wide call counter. The counter keeps
/// games created within one clock tick apart; wasm timers only resolve
/// milliseconds.
///
/// # Non-Determinism Warning
///
/// This is intentionally non-deterministic and NOT cryptographically secure.
/// For reproducible games always use [`Pcg32::seed_from_u64`].
fn timing_entropy_seed() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use web_time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let call = ENTROPY_CALLS.fetch_add(1, Ordering::Relaxed);

    let mut hasher = DefaultHasher::new();
    nanos.hash(&mut hasher);
    std::thread::current().id().hash(&mut hasher);
    call.hash(&mut hasher);
    hasher.finish()
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
    fn test_pcg32_deterministic() {
        let mut rng1 = Pcg32::seed_from_u64(12345);
        let mut rng2 = Pcg32::seed_from_u64(12345);

        for _ in 0..1000 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_pcg32_different_seeds() {
        let mut rng1 = Pcg32::seed_from_u64(12345);
        let mut rng2 = Pcg32::seed_from_u64(54321);

        let mut same_count = 0;
        for _ in 0..100 {
            if rng1.next_u32() == rng2.next_u32() {
                same_count += 1;
            }
        }
        assert!(same_count < 10);
    }

    // Regression guard: these values pin the PCG-XSH-RR output for seed 0
    #[test]
    fn test_pcg32_golden() {
        let mut rng = Pcg32::seed_from_u64(0);

        let expected = [
            0x348a463f_u32,
            0x4f205a1b_u32,
            0x2946c488_u32,
            0x805e36de_u32,
            0x79f994a9_u32,
        ];

        for &exp in &expected {
            assert_eq!(rng.next_u32(), exp, "Golden test failed");
        }
    }

    #[test]
    fn test_gen_range_usize_small() {
        let mut rng = Pcg32::seed_from_u64(42);

        for _ in 0..1000 {
            let val = rng.gen_range_usize(10..20);
            assert!((10..20).contains(&val));
        }
    }

    #[test]
    fn test_gen_range_usize_single_value() {
        let mut rng = Pcg32::seed_from_u64(42);

        for _ in 0..100 {
            assert_eq!(rng.gen_range_usize(7..8), 7);
        }
    }

    #[test]
    fn test_gen_range_usize_covers_every_index() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen = [false; 90];

        for _ in 0..10_000 {
            seen[rng.gen_range_usize(0..90)] = true;
        }
        assert!(seen.iter().all(|&s| s), "some index was never produced");
    }

    /// Empty ranges report a violation and fall back to `start` instead of panicking.
    #[test]
    fn test_gen_range_usize_empty_returns_start() {
        let mut rng = Pcg32::seed_from_u64(42);

        assert_eq!(rng.gen_range_usize(500..500), 500);
        assert_eq!(rng.gen_range_usize(0..0), 0);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = Pcg32::seed_from_u64(99);
        let mut items: Vec<i32> = (1..=90).collect();
        rng.shuffle(&mut items);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=90).collect::<Vec<_>>());
        assert_ne!(items, sorted, "90 items came back in sorted order");
    }

    #[test]
    fn test_shuffle_empty_and_single() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut empty: [u8; 0] = [];
        rng.shuffle(&mut empty);

        let mut single = [42];
        rng.shuffle(&mut single);
        assert_eq!(single, [42]);
    }

    /// Every ordering of three elements should appear about 1/6 of the time.
    #[test]
    fn test_shuffle_uniform_over_permutations() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let mut counts = std::collections::BTreeMap::new();

        for _ in 0..6000 {
            let mut items = [1, 2, 3];
            rng.shuffle(&mut items);
            *counts.entry(items).or_insert(0u32) += 1;
        }

        assert_eq!(counts.len(), 6);
        for (perm, &count) in &counts {
            assert!(
                (800..1200).contains(&count),
                "ordering {perm:?} seen {count} times"
            );
        }
    }

    #[test]
    fn test_rng_by_mut_reference() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut copy = rng.clone();

        let via_ref = {
            let mut borrowed = &mut rng;
            Rng::next_u32(&mut borrowed)
        };
        assert_eq!(via_ref, copy.next_u32());
    }

    #[test]
    fn test_seedable_from_entropy() {
        let _rng = Pcg32::from_entropy();
    }

    #[test]
    fn test_entropy_seeds_differ_within_one_tick() {
        let seeds: std::collections::BTreeSet<u64> =
            (0..64).map(|_| timing_entropy_seed()).collect();
        assert_eq!(seeds.len(), 64);

        let mut first = Pcg32::from_entropy();
        let mut second = Pcg32::from_entropy();
        assert_ne!(first.next_u64(), second.next_u64());
    }
}
