#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays unattended Critter Defence sessions.

mod autoplay;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use critter_defence_core::{config::GameConfig, Event, PlayMode, WavePhase};
use critter_defence_simulation::Simulation;
use tracing::info;
use tracing_subscriber::EnvFilter;

use autoplay::Autoplayer;

/// Upper bound on fixed ticks a single wave may take.
const MAX_WAVE_TICKS: u32 = 100_000;

/// Runs a seeded Critter Defence session on a preset map and prints a summary.
#[derive(Debug, Parser)]
#[command(name = "critter-defence", version)]
struct Args {
    /// TOML file overriding the stock tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Name of the preset map to play.
    #[arg(long, default_value = "straight")]
    preset: String,
    /// Number of waves to play.
    #[arg(long, default_value_t = 3)]
    waves: u32,
    /// Seed for the tower placement strategy.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Length of a fixed tick in milliseconds.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Outcome of a single wave.
#[derive(Clone, Copy, Debug, Default)]
struct WaveReport {
    kills: u32,
    leaks: u32,
    shots: u32,
    ticks: u32,
}

/// Entry point for the Critter Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = load_config(args.config.as_deref())?;
    let preset = config
        .preset(&args.preset)
        .cloned()
        .with_context(|| format!("unknown preset map `{}`", args.preset))?;

    let mut simulation = Simulation::new(config);

    let path = simulation
        .build_from_preset(&preset)
        .with_context(|| format!("preset map `{}` is not a valid path", preset.name))?;
    println!(
        "map `{}`: {} cells from {} to {}",
        preset.name,
        path.cell_count(),
        path.start(),
        path.end()
    );

    let tick = Duration::from_millis(args.tick_ms.max(1));
    let mut autoplayer = Autoplayer::new(args.seed);
    for _ in 0..args.waves {
        let spending = autoplayer.spend(&mut simulation);
        let wave = simulation
            .start_wave()
            .context("the next wave could not be started")?;
        info!(level = wave.level, placed = spending.placed, "playing wave");

        let report = play_wave(&mut simulation, tick)?;
        println!(
            "wave {}: {} {:?} critters, {} killed, {} leaked, {} shots, \
             {} towers placed, {} upgraded, cash {}, lives {}, {:.1}s",
            wave.level,
            wave.spawn_amount,
            wave.critter_kind,
            report.kills,
            report.leaks,
            report.shots,
            spending.placed,
            spending.upgraded,
            simulation.cash(),
            simulation.lives(),
            tick.as_secs_f64() * f64::from(report.ticks),
        );

        if simulation.play_mode() == PlayMode::GameOver {
            println!("game over at level {}", wave.level);
            return Ok(());
        }
    }

    println!(
        "survived {} waves with {} lives and {} cash",
        simulation.wave().level,
        simulation.lives(),
        simulation.cash()
    );
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    GameConfig::from_toml_str(&contents)
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

/// Ticks until the running wave is cleared or the game is lost.
fn play_wave(simulation: &mut Simulation, tick: Duration) -> Result<WaveReport> {
    let mut report = WaveReport::default();
    while report.ticks < MAX_WAVE_TICKS {
        simulation.on_fixed_tick(tick);
        simulation.on_frame_tick(tick);
        report.ticks += 1;

        for event in simulation.drain_events() {
            match event {
                Event::CritterKilled { .. } => report.kills += 1,
                Event::CritterLeaked { .. } => report.leaks += 1,
                Event::ProjectileFired { .. } => report.shots += 1,
                _ => {}
            }
        }

        if simulation.play_mode() == PlayMode::GameOver
            || simulation.wave().phase == WavePhase::Prompting
        {
            return Ok(report);
        }
    }
    bail!("wave did not finish within {MAX_WAVE_TICKS} ticks")
}
