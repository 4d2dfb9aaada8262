#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave spawner responsible for emitting wave and enemy spawn
//! commands.

use std::time::Duration;

use bastion_core::{CellCoord, Command, EnemyKind, Event};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

const MAX_WAVE_SIZE: u32 = 30;
const BOSS_WAVE_INTERVAL: u32 = 10;

const EARLY_TABLE: &[(EnemyKind, u32)] = &[(EnemyKind::Zombie, 100)];
const RUNNER_TABLE: &[(EnemyKind, u32)] = &[(EnemyKind::Zombie, 70), (EnemyKind::Runner, 30)];
const TANK_TABLE: &[(EnemyKind, u32)] = &[
    (EnemyKind::Zombie, 50),
    (EnemyKind::Runner, 30),
    (EnemyKind::Tank, 20),
];
const LATE_TABLE: &[(EnemyKind, u32)] = &[
    (EnemyKind::Zombie, 40),
    (EnemyKind::Runner, 30),
    (EnemyKind::Tank, 30),
];

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration seeding the enemy type and spawn tile rolls.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Wave state machine alternating between an idle countdown and spawning.
#[derive(Debug)]
pub struct Spawning {
    rng_seed: u64,
    rng: ChaCha8Rng,
    wave: u32,
    is_spawning: bool,
    wave_timer: Duration,
    spawn_timer: Duration,
    enemies_left: u32,
    wave_ended: bool,
}

impl Spawning {
    /// Creates a new spawning system in its reset state.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng_seed: config.rng_seed,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            wave: 0,
            is_spawning: false,
            wave_timer: Duration::ZERO,
            spawn_timer: Duration::ZERO,
            enemies_left: 0,
            wave_ended: true,
        }
    }

    /// Consumes tick events to advance the wave timers.
    ///
    /// `enemies_alive` gates the idle countdown: the next wave only counts
    /// down once the previous one was cleared. `spawn_tile` picks the cell a
    /// new enemy appears on and draws from the spawner's own generator.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        enemies_alive: usize,
        mut spawn_tile: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(&mut dyn RngCore) -> Option<CellCoord>,
    {
        let mut elapsed = None;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = Some(elapsed.unwrap_or(Duration::ZERO).saturating_add(*dt));
            }
        }
        let Some(mut elapsed) = elapsed else {
            return;
        };

        if !self.is_spawning {
            if !self.wave_ended && enemies_alive == 0 {
                self.wave_ended = true;
            }
            if !self.wave_ended || enemies_alive > 0 {
                return;
            }

            self.wave_timer = self.wave_timer.saturating_sub(elapsed);
            if !self.wave_timer.is_zero() {
                return;
            }
            self.start_wave(out);
            elapsed = Duration::ZERO;
        }

        self.spawn_timer = self.spawn_timer.saturating_sub(elapsed);
        if self.spawn_timer.is_zero() {
            self.spawn_next(&mut spawn_tile, out);
        }
    }

    /// Forces the between-wave countdown to expire. Only honoured while idle
    /// with no enemy left alive; returns whether the skip took effect.
    pub fn skip_wave_timer(&mut self, enemies_alive: usize) -> bool {
        if self.is_spawning || enemies_alive > 0 {
            return false;
        }
        self.wave_ended = true;
        self.wave_timer = Duration::ZERO;
        true
    }

    /// Returns the spawner to wave zero and rewinds its generator.
    pub fn reset(&mut self) {
        *self = Self::new(Config::new(self.rng_seed));
    }

    /// Number of the most recently started wave, zero before the first.
    #[must_use]
    pub const fn wave_number(&self) -> u32 {
        self.wave
    }

    /// Reports whether the current wave still has enemies to release.
    #[must_use]
    pub const fn is_spawning(&self) -> bool {
        self.is_spawning
    }

    /// Time left before the next wave starts.
    #[must_use]
    pub const fn wave_timer(&self) -> Duration {
        self.wave_timer
    }

    /// Enemies of the current wave that have not been released yet.
    #[must_use]
    pub const fn enemies_left_to_spawn(&self) -> u32 {
        self.enemies_left
    }

    /// Reports whether the previous wave was fully cleared.
    #[must_use]
    pub const fn wave_ended(&self) -> bool {
        self.wave_ended
    }

    fn start_wave(&mut self, out: &mut Vec<Command>) {
        self.wave = self.wave.saturating_add(1);
        self.enemies_left = wave_size(self.wave);
        self.is_spawning = true;
        self.spawn_timer = Duration::ZERO;
        debug!(
            wave = self.wave,
            enemies = self.enemies_left,
            "wave started"
        );
        out.push(Command::BeginWave {
            wave: self.wave,
            enemies: self.enemies_left,
        });
    }

    fn spawn_next<F>(&mut self, spawn_tile: &mut F, out: &mut Vec<Command>)
    where
        F: FnMut(&mut dyn RngCore) -> Option<CellCoord>,
    {
        let kind = self.pick_kind();
        let rng: &mut dyn RngCore = &mut self.rng;
        match spawn_tile(rng) {
            Some(cell) => out.push(Command::SpawnEnemy {
                kind,
                cell,
                health_multiplier: health_multiplier(self.wave),
            }),
            None => warn!(wave = self.wave, ?kind, "no free edge tile, spawn skipped"),
        }

        self.enemies_left = self.enemies_left.saturating_sub(1);
        self.spawn_timer = spawn_interval(self.wave);
        if self.enemies_left == 0 {
            self.is_spawning = false;
            self.wave_ended = false;
            self.wave_timer = wave_delay(self.wave);
        }
    }

    fn pick_kind(&mut self) -> EnemyKind {
        if self.wave % BOSS_WAVE_INTERVAL == 0 {
            return EnemyKind::Boss;
        }

        let table = spawn_table(self.wave);
        let total: u32 = table.iter().map(|(_, weight)| weight).sum();
        let mut roll = self.rng.gen_range(0..total);
        for &(kind, weight) in table {
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        EnemyKind::Zombie
    }
}

fn spawn_table(wave: u32) -> &'static [(EnemyKind, u32)] {
    match wave {
        0..=2 => EARLY_TABLE,
        3..=4 => RUNNER_TABLE,
        5..=7 => TANK_TABLE,
        _ => LATE_TABLE,
    }
}

fn wave_size(wave: u32) -> u32 {
    (3 + wave.saturating_mul(6) / 5).min(MAX_WAVE_SIZE)
}

fn health_multiplier(wave: u32) -> f32 {
    1.0 + wave.saturating_sub(1) as f32 * 0.1
}

fn wave_delay(wave: u32) -> Duration {
    let seconds = match wave {
        0..=2 => 30,
        3..=5 => 25,
        6..=9 => 20,
        _ => 15,
    };
    Duration::from_secs(seconds)
}

fn spawn_interval(wave: u32) -> Duration {
    let millis = match wave {
        0..=4 => 1000,
        5..=9 => 800,
        10..=14 => 650,
        _ => 500,
    };
    Duration::from_millis(millis)
}
