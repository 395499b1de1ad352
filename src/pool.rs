//! The ball pool: every ball of the configured range, split into drawn and remaining.
//!
//! Two orderings live here and must not be confused:
//!
//! - **Presentation order** is a shuffled copy of the whole pool, used only to
//!   place balls on screen.
//! - **Draw order** is the sequence in which [`BallPool::draw_one`] removed
//!   balls, each picked uniformly from what was left at that moment.
//!
//! The shuffle has no influence on which ball is drawn next.

use crate::rng::Rng;
use crate::telemetry::{InvariantChecker, InvariantViolation};
use crate::Ball;

/// All balls of a range, with draw progress.
///
/// Construction expects a normalized range (`min_number <= max_number`, at most
/// [`MAX_POOL_SIZE`](crate::MAX_POOL_SIZE) balls); [`GameState`](crate::GameState)
/// guarantees this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallPool {
    min_number: i32,
    max_number: i32,
    /// Shuffled copy of the full pool, display only.
    presentation: Vec<Ball>,
    /// Undrawn balls. Order is irrelevant; draws pick a uniform index.
    remaining: Vec<Ball>,
    /// Drawn balls in draw order.
    drawn: Vec<Ball>,
    /// `drawn_mask[offset]` is true once `min_number + offset` has been drawn.
    drawn_mask: Vec<bool>,
}

impl BallPool {
    /// Builds a fresh pool for `[min_number, max_number]` with a shuffled presentation order.
    pub fn new<R: Rng>(min_number: i32, max_number: i32, rng: &mut R) -> Self {
        let mut pool = Self {
            min_number,
            max_number,
            presentation: Vec::new(),
            remaining: Vec::new(),
            drawn: Vec::new(),
            drawn_mask: Vec::new(),
        };
        pool.refill(min_number, max_number, rng);
        pool
    }

    /// Regenerates the pool for a (possibly new) range and forgets every draw.
    pub fn refill<R: Rng>(&mut self, min_number: i32, max_number: i32, rng: &mut R) {
        self.min_number = min_number;
        self.max_number = max_number;

        self.remaining.clear();
        self.remaining
            .extend((min_number..=max_number).map(Ball::new));

        self.presentation.clear();
        self.presentation.extend_from_slice(&self.remaining);
        rng.shuffle(&mut self.presentation);

        self.drawn.clear();
        self.drawn_mask.clear();
        self.drawn_mask.resize(self.remaining.len(), false);
    }

    /// Draws one ball uniformly from the remaining balls.
    ///
    /// Returns `None` when the pool is exhausted.
    pub fn draw_one<R: Rng>(&mut self, rng: &mut R) -> Option<Ball> {
        if self.remaining.is_empty() {
            return None;
        }
        let index = rng.gen_range_usize(0..self.remaining.len());
        let ball = self.remaining.swap_remove(index);
        if let Some(flag) = self
            .offset_of(ball)
            .and_then(|offset| self.drawn_mask.get_mut(offset))
        {
            *flag = true;
        }
        self.drawn.push(ball);
        Some(ball)
    }

    /// Lowest ball number in the pool.
    #[must_use]
    pub fn min_number(&self) -> i32 {
        self.min_number
    }

    /// Highest ball number in the pool.
    #[must_use]
    pub fn max_number(&self) -> i32 {
        self.max_number
    }

    /// Total number of balls, drawn or not.
    #[must_use]
    pub fn size(&self) -> usize {
        self.drawn_mask.len()
    }

    /// Number of balls drawn since the last refill.
    #[must_use]
    pub fn drawn_count(&self) -> usize {
        self.drawn.len()
    }

    /// Number of balls still available.
    #[must_use]
    pub fn remaining_count(&self) -> usize {
        self.remaining.len()
    }

    /// Returns true once every ball has been drawn.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Drawn balls in draw order.
    #[must_use]
    pub fn drawn(&self) -> &[Ball] {
        &self.drawn
    }

    /// Returns true if `ball` belongs to this pool's range.
    #[must_use]
    pub fn contains(&self, ball: Ball) -> bool {
        self.offset_of(ball).is_some()
    }

    /// Returns true if `ball` has been drawn since the last refill.
    #[must_use]
    pub fn is_drawn(&self, ball: Ball) -> bool {
        self.offset_of(ball)
            .and_then(|offset| self.drawn_mask.get(offset))
            .copied()
            .unwrap_or(false)
    }

    /// The whole pool in presentation order, drawn balls included.
    #[must_use]
    pub fn presentation_order(&self) -> &[Ball] {
        &self.presentation
    }

    /// Undrawn balls in presentation order (what is still in the cage).
    pub fn undrawn_in_presentation_order(&self) -> impl Iterator<Item = Ball> + '_ {
        self.presentation
            .iter()
            .copied()
            .filter(|&ball| !self.is_drawn(ball))
    }

    fn offset_of(&self, ball: Ball) -> Option<usize> {
        let number = ball.number();
        if number < self.min_number || number > self.max_number {
            return None;
        }
        usize::try_from(i64::from(number) - i64::from(self.min_number)).ok()
    }
}

impl InvariantChecker for BallPool {
    /// Checks the pool invariants:
    /// - drawn + remaining = pool size, and presentation covers the pool
    /// - every ball is in range
    /// - no ball is drawn twice, and no drawn ball is still remaining
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let size = self.size();
        if self.drawn.len() + self.remaining.len() != size {
            return Err(
                InvariantViolation::new("BallPool", "drawn + remaining != pool size")
                    .with_details(format!(
                        "drawn={}, remaining={}, size={}",
                        self.drawn.len(),
                        self.remaining.len(),
                        size
                    )),
            );
        }
        if self.presentation.len() != size {
            return Err(
                InvariantViolation::new("BallPool", "presentation order length != pool size")
                    .with_details(format!(
                        "presentation={}, size={}",
                        self.presentation.len(),
                        size
                    )),
            );
        }

        let mut seen = vec![false; size];
        for &ball in &self.drawn {
            let Some(offset) = self.offset_of(ball) else {
                return Err(InvariantViolation::new("BallPool", "drawn ball out of range")
                    .with_details(format!("ball={ball}")));
            };
            if std::mem::replace(&mut seen[offset], true) {
                return Err(InvariantViolation::new("BallPool", "ball drawn twice")
                    .with_details(format!("ball={ball}")));
            }
        }
        if seen != self.drawn_mask {
            return Err(InvariantViolation::new(
                "BallPool",
                "drawn mask disagrees with drawn list",
            ));
        }
        for &ball in &self.remaining {
            match self.offset_of(ball) {
                Some(offset) if !seen[offset] => seen[offset] = true,
                Some(_) => {
                    return Err(InvariantViolation::new(
                        "BallPool",
                        "ball both drawn and remaining (or remaining twice)",
                    )
                    .with_details(format!("ball={ball}")))
                },
                None => {
                    return Err(
                        InvariantViolation::new("BallPool", "remaining ball out of range")
                            .with_details(format!("ball={ball}")),
                    )
                },
            }
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
    use crate::rng::{Pcg32, SeedableRng};
    use std::collections::BTreeMap;

    fn pool(min: i32, max: i32, seed: u64) -> (BallPool, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let pool = BallPool::new(min, max, &mut rng);
        (pool, rng)
    }

    #[test]
    fn new_pool_is_complete() {
        let (pool, _) = pool(1, 90, 1);
        assert_eq!(pool.size(), 90);
        assert_eq!(pool.remaining_count(), 90);
        assert_eq!(pool.drawn_count(), 0);

        let mut order: Vec<i32> = pool.presentation_order().iter().map(|b| b.number()).collect();
        order.sort_unstable();
        assert_eq!(order, (1..=90).collect::<Vec<_>>());
        assert!(pool.check_invariants().is_ok());
    }

    #[test]
    fn draw_until_exhausted() {
        let (mut pool, mut rng) = pool(3, 7, 2);
        let mut drawn = Vec::new();
        while let Some(ball) = pool.draw_one(&mut rng) {
            assert!(pool.is_drawn(ball));
            drawn.push(ball.number());
            assert!(pool.check_invariants().is_ok());
        }
        drawn.sort_unstable();
        assert_eq!(drawn, vec![3, 4, 5, 6, 7]);
        assert!(pool.is_exhausted());
        assert_eq!(pool.draw_one(&mut rng), None);
    }

    #[test]
    fn refill_forgets_draws() {
        let (mut pool, mut rng) = pool(1, 10, 3);
        pool.draw_one(&mut rng).unwrap();
        pool.draw_one(&mut rng).unwrap();

        pool.refill(1, 10, &mut rng);
        assert_eq!(pool.drawn_count(), 0);
        assert_eq!(pool.remaining_count(), 10);
        assert!(pool.drawn().is_empty());
        assert!(pool.check_invariants().is_ok());
    }

    #[test]
    fn refill_with_new_range() {
        let (mut pool, mut rng) = pool(1, 10, 4);
        pool.refill(-2, 2, &mut rng);
        assert_eq!(pool.size(), 5);
        assert!(pool.contains(Ball::new(-2)));
        assert!(!pool.contains(Ball::new(3)));
    }

    #[test]
    fn undrawn_presentation_order_skips_drawn() {
        let (mut pool, mut rng) = pool(1, 6, 5);
        let ball = pool.draw_one(&mut rng).unwrap();

        let cage: Vec<Ball> = pool.undrawn_in_presentation_order().collect();
        assert_eq!(cage.len(), 5);
        assert!(!cage.contains(&ball));

        let expected: Vec<Ball> = pool
            .presentation_order()
            .iter()
            .copied()
            .filter(|&b| b != ball)
            .collect();
        assert_eq!(cage, expected);
    }

    #[test]
    fn is_drawn_out_of_range_is_false() {
        let (pool, _) = pool(1, 5, 6);
        assert!(!pool.is_drawn(Ball::new(100)));
        assert!(!pool.contains(Ball::new(0)));
    }

    #[test]
    fn extreme_range_offsets() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut pool = BallPool::new(i32::MAX - 2, i32::MAX, &mut rng);
        while pool.draw_one(&mut rng).is_some() {}
        assert!(pool.is_drawn(Ball::new(i32::MAX)));
        assert!(pool.check_invariants().is_ok());
    }

    /// The first draw from `1..=5` should pick each ball about 1/5 of the time.
    #[test]
    fn first_draw_is_uniform() {
        let mut counts = BTreeMap::new();
        for seed in 0..5000 {
            let (mut pool, mut rng) = pool(1, 5, seed);
            let ball = pool.draw_one(&mut rng).unwrap();
            *counts.entry(ball.number()).or_insert(0u32) += 1;
        }

        assert_eq!(counts.len(), 5);
        for (number, &count) in &counts {
            assert!(
                (850..1150).contains(&count),
                "ball {number} drawn first {count} times"
            );
        }
    }

    /// Once balls have been removed, each ball still in the pool is equally likely.
    #[test]
    fn later_draw_is_uniform_over_remaining() {
        let (mut partial, mut setup_rng) = pool(1, 5, 99);
        let gone = [
            partial.draw_one(&mut setup_rng).unwrap(),
            partial.draw_one(&mut setup_rng).unwrap(),
        ];

        let mut counts = BTreeMap::new();
        for seed in 0..6000 {
            let mut pool = partial.clone();
            let mut rng = Pcg32::seed_from_u64(seed);
            let ball = pool.draw_one(&mut rng).unwrap();
            assert!(!gone.contains(&ball));
            *counts.entry(ball.number()).or_insert(0u32) += 1;
        }

        assert_eq!(counts.len(), 3);
        for (number, &count) in &counts {
            assert!(
                (1800..2200).contains(&count),
                "ball {number} drawn {count} times"
            );
        }
    }

    #[test]
    fn corrupted_pool_fails_invariants() {
        let (mut pool, _) = pool(1, 5, 8);
        let ball = pool.remaining[0];
        pool.drawn.push(ball);
        assert!(pool.check_invariants().is_err());
    }
}
