#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Bastion session.

mod layout;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Result};
use bastion_core::{Event, WELCOME_BANNER};
use bastion_simulation::{GameConfig, Simulation};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::layout::{kind_name, Placement};

/// Runs a scripted Bastion session without rendering and prints a summary.
#[derive(Parser, Debug)]
#[command(name = "bastion")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML game configuration; built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulated seconds to run.
    #[arg(short = 't', long, default_value_t = 120.0)]
    seconds: f32,

    /// Length of a single frame in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Overrides the spawner seed from the configuration.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Defense to buy before the first frame, as `kind@column,row`.
    #[arg(short, long = "place", value_name = "KIND@COLUMN,ROW")]
    placements: Vec<Placement>,

    /// Skip every between-wave countdown as soon as it is allowed.
    #[arg(long)]
    rush: bool,
}

/// Entry point for the Bastion command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    if args.frame_ms == 0 {
        bail!("frame length must be at least one millisecond");
    }
    if !(args.seconds.is_finite() && args.seconds >= 0.0) {
        bail!("run length must be a non-negative number of seconds");
    }

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }

    let mut simulation = Simulation::new(config);
    println!("{WELCOME_BANNER}");

    for placement in &args.placements {
        match simulation.place_defense(placement.kind, placement.column, placement.row) {
            Ok(defense) => info!(
                defense = defense.get(),
                kind = kind_name(placement.kind),
                column = placement.column,
                row = placement.row,
                "defense placed"
            ),
            Err(reason) => warn!(
                %reason,
                kind = kind_name(placement.kind),
                column = placement.column,
                row = placement.row,
                "placement rejected"
            ),
        }
    }

    let frame = Duration::from_millis(args.frame_ms);
    let frames = (f64::from(args.seconds) * 1000.0 / args.frame_ms as f64).ceil() as u64;
    let mut summary = Summary::default();
    for _ in 0..frames {
        summary.record(simulation.advance(frame));
        if simulation.is_game_over() {
            break;
        }
        if args.rush {
            let _ = simulation.skip_wave_timer();
        }
    }

    summary.print(&simulation, frame);
    Ok(())
}

#[derive(Debug, Default)]
struct Summary {
    spawned: u32,
    killed: u32,
    shots: u32,
    strikes: u32,
    defenses_lost: u32,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::EnemyKilled { .. } => self.killed += 1,
                Event::ProjectileFired { .. } => self.shots += 1,
                Event::EnemyStruck { .. } => self.strikes += 1,
                Event::DefenseDestroyed { .. } => self.defenses_lost += 1,
                _ => {}
            }
        }
    }

    fn print(&self, simulation: &Simulation, frame: Duration) {
        let elapsed = frame.saturating_mul(simulation.tick_index() as u32);
        let outcome = if simulation.is_game_over() {
            "main tower fell"
        } else {
            "main tower standing"
        };
        println!("{outcome} after {:.1}s", elapsed.as_secs_f32());
        println!("wave {}, score {}, gold {}", simulation.wave(), simulation.score(), simulation.gold());
        println!(
            "enemies: {} spawned, {} killed, {} alive",
            self.spawned,
            self.killed,
            simulation.enemies().len()
        );
        println!(
            "combat: {} shots fired, {} strikes taken, {} defenses lost",
            self.shots, self.strikes, self.defenses_lost
        );
        for defense in simulation.defenses().iter() {
            println!(
                "  {} #{} level {} at ({}, {}) health {}/{}",
                kind_name(defense.kind),
                defense.id.get(),
                defense.level,
                defense.region.origin().column(),
                defense.region.origin().row(),
                defense.health,
                defense.max_health
            );
        }
    }
}
