//! Fuzz target for game operation sequences.
//!
//! Drives a game with arbitrary interleavings of configure, draw, finish
//! and reset, checking after each step that draws are unique and that
//! the drawn and remaining counts partition the pool.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;

use bingo_draw::telemetry::InvariantChecker;
use bingo_draw::{DrawOutcome, GameBuilder};

#[derive(Debug, Arbitrary)]
enum Op {
    Configure { min: i16, span: u8, batch: u8 },
    Draw,
    Finish,
    DrawAndFinish,
    Reset,
    DrainEvents,
}

#[derive(Debug, Arbitrary)]
struct FuzzGame {
    seed: u64,
    ops: Vec<Op>,
}

fuzz_target!(|input: FuzzGame| {
    let mut game = GameBuilder::new().with_seed(input.seed).start();

    for op in input.ops.into_iter().take(256) {
        match op {
            Op::Configure { min, span, batch } => {
                let min = i32::from(min);
                game.configure(min, min + i32::from(span), usize::from(batch));
            }
            Op::Draw => {
                let was_drawing = game.is_drawing();
                let outcome = game.draw();
                if was_drawing {
                    assert_eq!(outcome, DrawOutcome::Ignored);
                }
            }
            Op::Finish => game.finish_draw(),
            Op::DrawAndFinish => {
                let _ = game.draw_and_finish();
            }
            Op::Reset => game.reset(),
            Op::DrainEvents => game.events().for_each(drop),
        }

        let stats = game.stats();
        assert_eq!(stats.drawn_count + stats.remaining_count, stats.pool_size);
        let unique: HashSet<_> = game.drawn().iter().collect();
        assert_eq!(unique.len(), game.drawn().len());
        assert!(game.check_invariants().is_ok());
    }
});
