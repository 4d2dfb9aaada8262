#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick driver that wires the Bastion world to its systems and exposes the
//! in-process game API.

mod config;

use std::time::Duration;

use bastion_core::{
    CellCoord, Command, DefenseId, DefenseKind, DefenseSnapshot, DefenseView, Economy, EnemyView,
    Event, PlacementError, ProjectileSnapshot, RemovalError, SaleError, TowerTarget, UpgradeError,
};
use bastion_system_movement::Movement;
use bastion_system_spawning::{Config as SpawningConfig, Spawning};
use bastion_system_tower_combat::TowerCombat;
use bastion_system_tower_targeting::{aim_commands, TowerTargeting};
use bastion_world::{self as world, query, World};
use tracing::info;

pub use config::GameConfig;

/// A running Bastion session.
///
/// Player requests apply immediately; their events are reported by the next
/// call to [`Simulation::advance`] ahead of that tick's own events.
#[derive(Debug)]
pub struct Simulation {
    config: GameConfig,
    world: World,
    targeting: TowerTargeting,
    combat: TowerCombat,
    movement: Movement,
    spawning: Spawning,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    pending: Vec<Event>,
    events: Vec<Event>,
}

impl Simulation {
    /// Starts a session with the main tower in place and no enemies.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let world = World::new(config.world_config());
        let spawning = Spawning::new(SpawningConfig::new(config.rng_seed));
        Self {
            config,
            world,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            movement: Movement::new(),
            spawning,
            targets: Vec::new(),
            commands: Vec::new(),
            pending: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Runs one tick of `dt` and returns every event it produced.
    ///
    /// Defenses act first (regeneration, collapse countdowns, projectiles,
    /// targeting and firing), then enemies, then the spawner; casualties are
    /// reaped last. Once the game is over only pending events are reported.
    pub fn advance(&mut self, dt: Duration) -> &[Event] {
        self.events.clear();
        self.events.append(&mut self.pending);
        if query::is_game_over(&self.world) {
            return &self.events;
        }
        let start = self.events.len();

        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        let defenses = query::defense_view(&self.world);
        self.targeting.handle(
            &defenses,
            &query::enemy_view(&self.world),
            query::tile_length(&self.world),
            &mut self.targets,
        );
        aim_commands(&defenses, &self.targets, &mut self.commands);
        self.flush_commands();

        self.combat
            .handle(&defenses, &self.targets, &mut self.commands);
        self.flush_commands();

        let tuning = query::catalog(&self.world).tuning;
        self.movement.handle(
            &query::enemy_view(&self.world),
            &query::defense_view(&self.world),
            query::occupancy_view(&self.world),
            query::tile_length(&self.world),
            &tuning,
            &mut self.commands,
        );
        self.flush_commands();

        let alive = self.alive_enemies();
        let world = &self.world;
        self.spawning.handle(
            &self.events[start..],
            alive,
            |rng| query::edge_spawn_tile(world, rng),
            &mut self.commands,
        );
        self.flush_commands();

        world::apply(
            &mut self.world,
            Command::CollectCasualties,
            &mut self.events,
        );

        for event in &self.events[start..] {
            match event {
                Event::WaveStarted { wave, enemies } => info!(wave, enemies, "wave started"),
                Event::GameOver { wave, score } => info!(wave, score, "main tower fell"),
                _ => {}
            }
        }

        &self.events
    }

    /// Buys and places a defense with its upper-left tile at `(column, row)`.
    pub fn place_defense(
        &mut self,
        kind: DefenseKind,
        column: i32,
        row: i32,
    ) -> Result<DefenseId, PlacementError> {
        let start = self.submit(Command::PlaceDefense {
            kind,
            origin: CellCoord::new(column, row),
        });
        self.verdict(start, PlacementError::OutOfBounds, |event| match event {
            Event::DefensePlaced { defense, .. } => Some(Ok(*defense)),
            Event::PlacementRejected { reason, .. } => Some(Err(*reason)),
            _ => None,
        })
    }

    /// Finds the defense covering the tile at `(column, row)`, if any.
    #[must_use]
    pub fn select_defense_at(&self, column: i32, row: i32) -> Option<DefenseSnapshot> {
        query::defense_at(&self.world, CellCoord::new(column, row))
    }

    /// Upgrades a defense by one level, returning the level reached.
    pub fn upgrade(&mut self, defense: DefenseId) -> Result<u32, UpgradeError> {
        let start = self.submit(Command::UpgradeDefense { defense });
        self.verdict(start, UpgradeError::MissingDefense, |event| match event {
            Event::DefenseUpgraded { level, .. } => Some(Ok(*level)),
            Event::UpgradeRejected { reason, .. } => Some(Err(*reason)),
            _ => None,
        })
    }

    /// Sells a defense, returning the refunded gold.
    pub fn sell(&mut self, defense: DefenseId) -> Result<u32, SaleError> {
        let start = self.submit(Command::SellDefense { defense });
        self.verdict(start, SaleError::MissingDefense, |event| match event {
            Event::DefenseSold { refund, .. } => Some(Ok(*refund)),
            Event::SaleRejected { reason, .. } => Some(Err(*reason)),
            _ => None,
        })
    }

    /// Removes a defense without refund.
    pub fn remove_defense(&mut self, defense: DefenseId) -> Result<(), RemovalError> {
        let start = self.submit(Command::RemoveDefense { defense });
        self.verdict(start, RemovalError::MissingDefense, |event| match event {
            Event::DefenseRemoved { .. } => Some(Ok(())),
            Event::RemovalRejected { reason, .. } => Some(Err(*reason)),
            _ => None,
        })
    }

    /// Cuts the between-wave countdown short. Ignored while a wave is still
    /// spawning or alive; returns whether the skip took effect.
    pub fn skip_wave_timer(&mut self) -> bool {
        let alive = self.alive_enemies();
        self.spawning.skip_wave_timer(alive)
    }

    /// Discards the session and starts over from the original configuration.
    pub fn reset(&mut self) {
        self.world = World::new(self.config.world_config());
        self.spawning.reset();
        self.targets.clear();
        self.commands.clear();
        self.pending.clear();
        self.events.clear();
        info!("simulation reset");
    }

    /// Configuration the session was started with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read-only access to the underlying world for adapters.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Gold available to spend.
    #[must_use]
    pub fn gold(&self) -> u32 {
        query::economy(&self.world).gold
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(&self) -> u32 {
        query::economy(&self.world).score
    }

    /// Gold and score together.
    #[must_use]
    pub fn economy(&self) -> Economy {
        query::economy(&self.world)
    }

    /// Number of the most recent wave, zero before the first one starts.
    #[must_use]
    pub fn wave(&self) -> u32 {
        query::wave(&self.world)
    }

    /// Time left before the next wave may start.
    #[must_use]
    pub fn wave_timer(&self) -> Duration {
        self.spawning.wave_timer()
    }

    /// Reports whether the current wave is still releasing enemies.
    #[must_use]
    pub fn is_spawning(&self) -> bool {
        self.spawning.is_spawning()
    }

    /// Enemies of the current wave not released yet.
    #[must_use]
    pub fn enemies_left_to_spawn(&self) -> u32 {
        self.spawning.enemies_left_to_spawn()
    }

    /// Reports whether the main tower has fallen.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        query::is_game_over(&self.world)
    }

    /// Number of ticks run so far.
    #[must_use]
    pub fn tick_index(&self) -> u64 {
        query::tick_index(&self.world)
    }

    /// Identifier of the main tower.
    #[must_use]
    pub fn main_tower(&self) -> DefenseId {
        query::main_tower(&self.world)
    }

    /// Snapshot of every defense.
    #[must_use]
    pub fn defenses(&self) -> DefenseView {
        query::defense_view(&self.world)
    }

    /// Snapshot of every enemy.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Snapshot of every projectile in flight.
    #[must_use]
    pub fn projectiles(&self) -> Vec<ProjectileSnapshot> {
        query::projectiles(&self.world)
    }

    fn submit(&mut self, command: Command) -> usize {
        let start = self.pending.len();
        world::apply(&mut self.world, command, &mut self.pending);
        start
    }

    /// Outcome the world reported for the request queued at `start`.
    ///
    /// Every player request is answered with exactly one success or
    /// rejection event, so `unanswered` is only a release-build fallback.
    fn verdict<T, E>(
        &self,
        start: usize,
        unanswered: E,
        pick: impl Fn(&Event) -> Option<Result<T, E>>,
    ) -> Result<T, E> {
        let verdict = self.pending[start..].iter().find_map(pick);
        debug_assert!(verdict.is_some(), "player request left unanswered");
        verdict.unwrap_or(Err(unanswered))
    }

    fn alive_enemies(&self) -> usize {
        query::enemy_view(&self.world)
            .iter()
            .filter(|enemy| enemy.is_alive())
            .count()
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}
