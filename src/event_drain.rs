use std::collections::vec_deque::Drain;
use std::iter::FusedIterator;

use crate::BingoEvent;

/// An opaque iterator that drains events from a [`GameState`](crate::GameState).
///
/// Wraps the internal queue drain so `std::collections::vec_deque::Drain` does
/// not leak into the public API. Events that are not consumed before the drain
/// is dropped are discarded.
///
/// # Examples
///
/// ```
/// use bingo_draw::{BingoEvent, GameBuilder};
///
/// let mut game = GameBuilder::new().with_seed(1).start();
/// game.configure(1, 10, 3);
/// let _ = game.draw();
///
/// let drawn = game
///     .events()
///     .filter(|event| matches!(event, BingoEvent::BallDrawn { .. }))
///     .count();
/// assert_eq!(drawn, 3);
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct EventDrain<'a> {
    inner: Drain<'a, BingoEvent>,
}

impl<'a> EventDrain<'a> {
    pub(crate) fn from_drain(drain: Drain<'a, BingoEvent>) -> Self {
        Self { inner: drain }
    }
}

impl Iterator for EventDrain<'_> {
    type Item = BingoEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for EventDrain<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for EventDrain<'_> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl FusedIterator for EventDrain<'_> {}

impl std::fmt::Debug for EventDrain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDrain")
            .field("remaining", &self.len())
            .finish()
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
    use std::collections::VecDeque;

    fn queue(events: &[BingoEvent]) -> VecDeque<BingoEvent> {
        events.iter().copied().collect()
    }

    fn exhausted(drawn: usize) -> BingoEvent {
        BingoEvent::PoolExhausted { drawn }
    }

    #[test]
    fn drains_in_order_and_empties_queue() {
        let mut queue = queue(&[exhausted(1), exhausted(2), exhausted(3)]);
        let events: Vec<_> = EventDrain::from_drain(queue.drain(..)).collect();
        assert_eq!(events, vec![exhausted(1), exhausted(2), exhausted(3)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn exact_size_tracks_consumption() {
        let mut queue = queue(&[exhausted(1), exhausted(2)]);
        let mut drain = EventDrain::from_drain(queue.drain(..));
        assert_eq!(drain.len(), 2);
        drain.next();
        assert_eq!(drain.len(), 1);
    }

    #[test]
    fn next_back_yields_newest() {
        let mut queue = queue(&[exhausted(1), exhausted(2)]);
        let mut drain = EventDrain::from_drain(queue.drain(..));
        assert_eq!(drain.next_back(), Some(exhausted(2)));
        assert_eq!(drain.next(), Some(exhausted(1)));
        assert_eq!(drain.next(), None);
        assert_eq!(drain.next(), None);
    }

    #[test]
    fn dropped_drain_discards_rest() {
        let mut queue = queue(&[exhausted(1), exhausted(2)]);
        {
            let mut drain = EventDrain::from_drain(queue.drain(..));
            drain.next();
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn debug_shows_remaining() {
        let mut queue = queue(&[exhausted(1)]);
        let drain = EventDrain::from_drain(queue.drain(..));
        assert_eq!(format!("{drain:?}"), "EventDrain { remaining: 1 }");
    }
}
