#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Moonbound scene in a terminal.

mod config;
mod terminal;
mod timer;

use std::{io, path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result as AnyResult};
use clap::Parser;
use moonbound_core::TimerSignal;
use moonbound_rendering::{Display, FrameDriver};

use crate::{terminal::TerminalDisplay, timer::IntervalTimer};

/// Animated starfield, rocket and cycle counter for the moon-and-back display.
#[derive(Debug, Parser)]
#[command(name = "moonbound", version)]
struct Cli {
    /// TOML file with `[particles]` and `[shuttle]` tables.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of frames to run; runs until interrupted when omitted.
    #[arg(long)]
    ticks: Option<u64>,
    /// Overrides the particle system seed from the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Pause between frames in milliseconds.
    #[arg(long, default_value_t = 250)]
    frame_delay_ms: u64,
    /// Period of the emulated real-time-clock timer; zero disables it.
    #[arg(long, default_value_t = 3_000)]
    timer_period_ms: u64,
    /// Width of the text rendering in characters.
    #[arg(long, default_value_t = 80)]
    columns: u32,
    /// Logs every particle after each frame at trace level.
    #[arg(long)]
    dump: bool,
    /// Appends frames instead of redrawing the screen in place.
    #[arg(long)]
    no_clear: bool,
}

/// Entry point for the Moonbound command-line interface.
fn main() -> AnyResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut scene = config::load(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        scene.particles.rng_seed = seed;
    }

    let timer = IntervalTimer::start(Duration::from_millis(cli.timer_period_ms))
        .context("failed to start the timer thread")?;
    let display = TerminalDisplay::new(io::stdout().lock(), cli.columns, !cli.no_clear);
    let mut driver =
        FrameDriver::new(&scene, timer, display).context("invalid scene configuration")?;

    log::info!(
        "running {} particles on a {}x{} buffer",
        driver.particles().capacity(),
        driver.particles().width(),
        driver.particles().height()
    );

    run(&mut driver, &cli)
}

fn run<D, T>(driver: &mut FrameDriver<D, T>, cli: &Cli) -> AnyResult<()>
where
    D: Display,
    T: TimerSignal,
{
    let delay = Duration::from_millis(cli.frame_delay_ms);
    let mut remaining = cli.ticks;

    while remaining != Some(0) {
        let report = driver.tick()?;
        if report.counter_changed {
            log::info!("cycle counter advanced to {}", driver.counter().cycles());
        }
        if cli.dump {
            for record in driver.particles().diagnostic_dump() {
                log::trace!("{record}");
            }
        }

        remaining = remaining.map(|ticks| ticks - 1);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    log::info!("stopped after {} frames", driver.frames());
    Ok(())
}
