//! Fuzz target for settings text parsing.
//!
//! # Safety Properties Tested
//! - No panics on arbitrary entry-field text
//! - Parsed configurations always validate
//! - The effective batch size stays within `1..=pool_size`

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use bingo_draw::{parse_leading_int, GameBuilder, GameConfig};

#[derive(Debug, Arbitrary)]
struct FuzzInputs {
    min: String,
    max: String,
    batch: String,
    seed: u64,
}

fuzz_target!(|inputs: FuzzInputs| {
    let _ = parse_leading_int(&inputs.min);

    let config = GameConfig::from_inputs(&inputs.min, &inputs.max, &inputs.batch);
    assert!(config.validate().is_ok(), "from_inputs produced {config:?}");
    assert!(config.batch_size >= 1);
    assert!(config.batch_size <= config.pool_size());

    // Small pools only; large ones just slow the fuzzer down.
    if config.pool_size() <= 4096 {
        let mut game = GameBuilder::new().with_seed(inputs.seed).start();
        let applied = game.apply_settings(&inputs.min, &inputs.max, &inputs.batch);
        assert_eq!(applied, config);
        assert_eq!(game.stats().remaining_count, config.pool_size());
    }
});
