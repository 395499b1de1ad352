//! Plays a bingo game in the terminal with a paced reveal.
//!
//! ```text
//! cargo run --example terminal_draw -- --max 75 --batch 3 --seed 42
//! ```

#![allow(clippy::print_stdout)]

use std::sync::Arc;
use std::thread;

use bingo_draw::prelude::*;
use bingo_draw::telemetry::TracingObserver;
use clap::Parser;
use web_time::Instant;

#[derive(Parser)]
struct Opt {
    /// Lowest ball number
    #[arg(long, default_value = "1")]
    min: String,
    /// Highest ball number
    #[arg(long, default_value = "90")]
    max: String,
    /// Balls per draw
    #[arg(short, long, default_value = "1")]
    batch: String,
    /// Seed for a reproducible game
    #[arg(short, long)]
    seed: Option<u64>,
    /// Skip the reveal pauses
    #[arg(long)]
    instant: bool,
    /// Stop after this many draws
    #[arg(short = 'n', long)]
    draws: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // configure logging: output engine logs to standard out
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )?;

    let opt = Opt::parse();

    let builder = GameBuilder::new()
        .with_violation_observer(Arc::new(TracingObserver::new()));
    let builder = match opt.seed {
        Some(seed) => builder.with_seed(seed),
        None => builder,
    };
    let mut game = builder.start();
    let config = game.apply_settings(&opt.min, &opt.max, &opt.batch);
    println!(
        "Drawing {}..={} in batches of {} ({} balls)",
        config.min_number,
        config.max_number,
        config.batch_size,
        config.pool_size()
    );

    let reveal = if opt.instant {
        RevealConfig::instant()
    } else {
        RevealConfig::default()
    };

    let mut draws = 0;
    loop {
        if opt.draws.is_some_and(|limit| draws >= limit) {
            break;
        }
        let batch = match game.draw() {
            DrawOutcome::Drawn(batch) => batch,
            DrawOutcome::Exhausted { drawn } => {
                println!("All {drawn} balls drawn.");
                break;
            }
            DrawOutcome::Ignored => {
                game.finish_draw();
                continue;
            }
        };
        draws += 1;

        let schedule = RevealSchedule::new(&batch, &reveal);
        let mut playback = RevealPlayback::start(schedule, Instant::now());
        while !playback.is_finished() {
            if let Some(wait) = playback.time_until_next(Instant::now()) {
                thread::sleep(wait);
            }
            for step in playback.poll(Instant::now()) {
                match step {
                    RevealStep::Reveal(cue) => println!("  #{:<4} {}", cue.position, cue.ball),
                    RevealStep::Complete { remaining } => {
                        game.finish_draw();
                        println!("  {remaining} left in the cage");
                    }
                }
            }
        }

        for event in game.events() {
            tracing::debug!(?event, "game event");
        }
    }
    Ok(())
}
