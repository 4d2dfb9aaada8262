#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Bastion.

mod defenses;
mod enemies;
mod grid;
mod projectiles;

use std::time::Duration;

use bastion_core::{
    Catalog, CellCoord, CellRect, Command, DefenseId, DefenseKind, Economy, EnemyId, EnemyIntent,
    EnemyKind, Event, PlacementError, RemovalError, SaleError, UpgradeError,
};
use tracing::debug;

use crate::{defenses::DefenseRegistry, enemies::Enemy, grid::Grid};

const DEFAULT_GRID_COLUMNS: u32 = 20;
const DEFAULT_GRID_ROWS: u32 = 15;
const DEFAULT_TILE_LENGTH: f32 = 40.0;
const DEFAULT_STARTING_GOLD: u32 = 100;

/// Parameters injected into the world at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Side length of a single square tile in pixels.
    pub tile_length: f32,
    /// Gold available before the first purchase.
    pub starting_gold: u32,
    /// Stats of every defense, enemy and projectile kind.
    pub catalog: Catalog,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_GRID_COLUMNS,
            rows: DEFAULT_GRID_ROWS,
            tile_length: DEFAULT_TILE_LENGTH,
            starting_gold: DEFAULT_STARTING_GOLD,
            catalog: Catalog::default(),
        }
    }
}

/// Represents the authoritative Bastion world state.
#[derive(Debug)]
pub struct World {
    catalog: Catalog,
    grid: Grid,
    defenses: DefenseRegistry,
    main_tower: DefenseId,
    enemies: Vec<Enemy>,
    next_enemy_id: EnemyId,
    economy: Economy,
    wave: u32,
    game_over: bool,
    tick_dt: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a world with the main tower placed at the centre of the map.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        let mut grid = Grid::new(config.columns, config.rows, config.tile_length);
        let mut defenses = DefenseRegistry::new();
        let origin = CellCoord::new((config.columns / 2) as i32, (config.rows / 2) as i32);
        let main_tower = defenses.insert(
            DefenseKind::MainTower,
            origin,
            config.catalog.defense(DefenseKind::MainTower),
            config.catalog.tuning.barrel_rotation_speed,
        );
        if let Some(defense) = defenses.get(main_tower) {
            grid.set_occupied(defense.region, true);
        }

        Self {
            catalog: config.catalog,
            grid,
            defenses,
            main_tower,
            enemies: Vec::new(),
            next_enemy_id: EnemyId::new(0),
            economy: Economy {
                gold: config.starting_gold,
                score: 0,
            },
            wave: 0,
            game_over: false,
            tick_dt: Duration::ZERO,
            tick_index: 0,
        }
    }

    fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id == id && enemy.is_alive())
    }

    fn advance_defenses(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let enemy_radius = self.catalog.tuning.enemy_radius;
        let mut collapsed = Vec::new();
        for defense in self.defenses.iter_mut() {
            if defense.advance(dt) {
                collapsed.push(defense.id);
            }
            if let Some(tower) = defense.tower.as_mut() {
                tower.update_projectiles(dt, &mut self.enemies, enemy_radius, out_events);
            }
        }

        for id in collapsed {
            if id == self.main_tower {
                continue;
            }
            if let Some(defense) = self.defenses.remove(id) {
                self.grid.set_occupied(defense.region, false);
                debug!(defense = id.get(), kind = ?defense.kind, "collapsed defense removed");
                out_events.push(Event::DefenseRemoved {
                    defense: id,
                    region: defense.region,
                });
            }
        }
    }

    fn place_defense(
        &mut self,
        kind: DefenseKind,
        origin: CellCoord,
    ) -> Result<(DefenseId, CellRect, u32), PlacementError> {
        if self.game_over {
            return Err(PlacementError::GameOver);
        }
        if !kind.is_purchasable() {
            return Err(PlacementError::NotPurchasable);
        }

        let profile = self.catalog.defense(kind);
        let region = CellRect::from_origin_and_size(origin, profile.footprint());
        if !self.grid.contains(region) {
            return Err(PlacementError::OutOfBounds);
        }
        if !self.grid.can_place(region) {
            return Err(PlacementError::Occupied);
        }
        if self.economy.gold < profile.cost {
            return Err(PlacementError::InsufficientFunds {
                required: profile.cost,
                available: self.economy.gold,
            });
        }

        let cost = profile.cost;
        self.economy.gold -= cost;
        let id = self.defenses.insert(
            kind,
            origin,
            profile,
            self.catalog.tuning.barrel_rotation_speed,
        );
        self.grid.set_occupied(region, true);
        Ok((id, region, cost))
    }

    fn upgrade_defense(&mut self, id: DefenseId) -> Result<(u32, u32), UpgradeError> {
        if self.game_over {
            return Err(UpgradeError::GameOver);
        }
        let defense = self
            .defenses
            .get_mut(id)
            .ok_or(UpgradeError::MissingDefense)?;
        let cost = defense.upgrade_quote()?;
        if self.economy.gold < cost {
            return Err(UpgradeError::InsufficientFunds {
                required: cost,
                available: self.economy.gold,
            });
        }
        self.economy.gold -= cost;
        let level = defense.upgrade()?;
        Ok((level, cost))
    }

    fn sell_defense(&mut self, id: DefenseId) -> Result<(u32, CellRect), SaleError> {
        if self.game_over {
            return Err(SaleError::GameOver);
        }
        if id == self.main_tower {
            return Err(SaleError::MainTower);
        }
        let defense = self.defenses.get(id).ok_or(SaleError::MissingDefense)?;
        if defense.is_destroying() {
            return Err(SaleError::Destroying);
        }
        let refund = defense.sell_value();
        let region = self.release(id).ok_or(SaleError::MissingDefense)?;
        self.economy.gold = self.economy.gold.saturating_add(refund);
        Ok((refund, region))
    }

    fn remove_defense(&mut self, id: DefenseId) -> Result<CellRect, RemovalError> {
        if id == self.main_tower {
            return Err(RemovalError::MainTower);
        }
        self.release(id).ok_or(RemovalError::MissingDefense)
    }

    fn release(&mut self, id: DefenseId) -> Option<CellRect> {
        let defense = self.defenses.remove(id)?;
        self.grid.set_occupied(defense.region, false);
        Some(defense.region)
    }

    fn aim_tower(&mut self, tower: DefenseId, target: Option<EnemyId>) {
        let tile_length = self.grid.tile_length();
        let resolved = target
            .and_then(|id| self.enemy(id))
            .map(|enemy| (enemy.id, enemy.position()));
        let Some(defense) = self.defenses.get_mut(tower) else {
            return;
        };
        if defense.is_destroying() {
            return;
        }
        let center = defense.center(tile_length);
        if let Some(state) = defense.tower.as_mut() {
            state.aim(resolved, center, self.tick_dt);
        }
    }

    fn fire_projectile(&mut self, tower: DefenseId, target: EnemyId, out_events: &mut Vec<Event>) {
        let tile_length = self.grid.tile_length();
        let Some(target_position) = self.enemy(target).map(Enemy::position) else {
            return;
        };
        let Some(defense) = self.defenses.get_mut(tower) else {
            return;
        };
        if defense.is_destroying() {
            return;
        }
        let origin = defense.center(tile_length);
        let Some(state) = defense.tower.as_mut() else {
            return;
        };
        let kind = state.projectile;
        if state.fire(target, target_position, origin, self.catalog.projectile(kind)) {
            out_events.push(Event::ProjectileFired {
                tower,
                target,
                kind,
            });
        }
    }

    fn direct_enemy(&mut self, id: EnemyId, intent: EnemyIntent, out_events: &mut Vec<Event>) {
        let tuning = self.catalog.tuning;
        let tile_length = self.grid.tile_length();
        let Some(enemy) = self
            .enemies
            .iter_mut()
            .find(|enemy| enemy.id == id && enemy.is_alive())
        else {
            return;
        };
        enemy.tick_clocks(self.tick_dt, &tuning);

        match intent {
            EnemyIntent::Strike { defense: target } => {
                if !enemy.can_strike() {
                    return;
                }
                let Some(defense) = self.defenses.get_mut(target) else {
                    return;
                };
                if defense.is_destroying() {
                    return;
                }

                let damage = enemy.begin_strike(defense.center(tile_length));
                let depleted = defense.take_damage(damage, tuning.destroy_duration());
                out_events.push(Event::EnemyStruck {
                    enemy: id,
                    defense: target,
                    damage,
                });
                if depleted {
                    debug!(defense = target.get(), kind = ?defense.kind, "defense destroyed");
                    out_events.push(Event::DefenseDestroyed {
                        defense: target,
                        kind: defense.kind,
                    });
                    if target == self.main_tower && !self.game_over {
                        self.game_over = true;
                        out_events.push(Event::GameOver {
                            wave: self.wave,
                            score: self.economy.score,
                        });
                    }
                }
            }
            EnemyIntent::Advance { destination } => {
                enemy.disengage();
                enemy.step_towards(destination, self.tick_dt, tile_length);
            }
            EnemyIntent::Hold => enemy.disengage(),
        }
    }

    fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        cell: CellCoord,
        health_multiplier: f32,
        out_events: &mut Vec<Event>,
    ) {
        if self.game_over {
            return;
        }
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        self.enemies.push(Enemy::spawn(
            id,
            kind,
            cell,
            self.catalog.enemy(kind),
            health_multiplier,
            self.grid.tile_length(),
        ));
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            cell,
        });
    }

    fn collect_casualties(&mut self, out_events: &mut Vec<Event>) {
        let economy = &mut self.economy;
        self.enemies.retain(|enemy| {
            if enemy.is_alive() {
                return true;
            }
            economy.gold = economy.gold.saturating_add(enemy.gold());
            economy.score = economy.score.saturating_add(enemy.gold());
            out_events.push(Event::EnemyKilled {
                enemy: enemy.id,
                kind: enemy.kind,
                gold: enemy.gold(),
            });
            false
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.tick_dt = dt;
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_defenses(dt, out_events);
        }
        Command::PlaceDefense { kind, origin } => match world.place_defense(kind, origin) {
            Ok((defense, region, cost)) => out_events.push(Event::DefensePlaced {
                defense,
                kind,
                region,
                cost,
            }),
            Err(reason) => out_events.push(Event::PlacementRejected {
                kind,
                origin,
                reason,
            }),
        },
        Command::UpgradeDefense { defense } => match world.upgrade_defense(defense) {
            Ok((level, cost)) => out_events.push(Event::DefenseUpgraded {
                defense,
                level,
                cost,
            }),
            Err(reason) => out_events.push(Event::UpgradeRejected { defense, reason }),
        },
        Command::SellDefense { defense } => match world.sell_defense(defense) {
            Ok((refund, region)) => {
                out_events.push(Event::DefenseSold { defense, refund });
                out_events.push(Event::DefenseRemoved { defense, region });
            }
            Err(reason) => out_events.push(Event::SaleRejected { defense, reason }),
        },
        Command::RemoveDefense { defense } => match world.remove_defense(defense) {
            Ok(region) => out_events.push(Event::DefenseRemoved { defense, region }),
            Err(reason) => out_events.push(Event::RemovalRejected { defense, reason }),
        },
        Command::AimTower { tower, target } => world.aim_tower(tower, target),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::DirectEnemy { enemy, intent } => world.direct_enemy(enemy, intent, out_events),
        Command::BeginWave { wave, enemies } => {
            world.wave = wave;
            out_events.push(Event::WaveStarted { wave, enemies });
        }
        Command::SpawnEnemy {
            kind,
            cell,
            health_multiplier,
        } => world.spawn_enemy(kind, cell, health_multiplier, out_events),
        Command::CollectCasualties => world.collect_casualties(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use bastion_core::{
        Catalog, CellCoord, DefenseId, DefenseSnapshot, DefenseView, Economy, EnemyView,
        OccupancyView, ProjectileSnapshot,
    };
    use rand::Rng;

    /// Number of tile columns and rows.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.grid.columns(), world.grid.rows())
    }

    /// Side length of a single tile in pixels.
    #[must_use]
    pub fn tile_length(world: &World) -> f32 {
        world.grid.tile_length()
    }

    /// Stat tables the world was built with.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.grid.view()
    }

    /// Captures a read-only view of every defense, main tower included.
    #[must_use]
    pub fn defense_view(world: &World) -> DefenseView {
        let tile_length = world.grid.tile_length();
        DefenseView::from_snapshots(
            world
                .defenses
                .iter()
                .map(|defense| defense.snapshot(tile_length))
                .collect(),
        )
    }

    /// Snapshot of the defense whose footprint covers the cell, if any.
    #[must_use]
    pub fn defense_at(world: &World, cell: CellCoord) -> Option<DefenseSnapshot> {
        world
            .defenses
            .at(cell)
            .map(|defense| defense.snapshot(world.grid.tile_length()))
    }

    /// Identifier of the main tower.
    #[must_use]
    pub fn main_tower(world: &World) -> DefenseId {
        world.main_tower
    }

    /// Captures a read-only view of the enemies on the map, including those
    /// that died this tick and await collection.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Snapshots of every projectile in flight, grouped by tower.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .defenses
            .iter()
            .filter_map(|defense| defense.tower.as_ref().map(|tower| (defense.id, tower)))
            .flat_map(|(id, tower)| tower.projectile_snapshots(id))
            .collect()
    }

    /// Gold and score held by the player.
    #[must_use]
    pub fn economy(world: &World) -> Economy {
        world.economy
    }

    /// Most recently started wave, zero before the first.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Reports whether the main tower has fallen.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Picks a free perimeter tile for a new enemy.
    pub fn edge_spawn_tile<R: Rng + ?Sized>(world: &World, rng: &mut R) -> Option<CellCoord> {
        world.grid.find_edge_spawn_tile(rng)
    }
}
