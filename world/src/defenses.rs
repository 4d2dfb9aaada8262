//! Authoritative defense state: health, upgrades, collapse and towers.

use std::{
    collections::BTreeMap,
    f32::consts::{PI, TAU},
    time::Duration,
};

use bastion_core::{
    rate_period, sell_value, CellCoord, CellRect, DefenseId, DefenseKind, DefenseProfile,
    DefenseSnapshot, EnemyId, Event, ProjectileKind, ProjectileProfile, ProjectileSnapshot,
    RegenProfile, TowerSnapshot, UpgradeError, UpgradeProfile, MAX_DEFENSE_LEVEL,
};
use glam::Vec2;

use crate::{enemies::Enemy, projectiles::Projectile};

/// A wall, tower or the main tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Defense {
    pub(crate) id: DefenseId,
    pub(crate) kind: DefenseKind,
    pub(crate) region: CellRect,
    level: u32,
    total_spent: u32,
    upgrade_cost: u32,
    health: u32,
    max_health: u32,
    regen: Option<RegenProfile>,
    regen_elapsed: Duration,
    collapse: Option<Duration>,
    extras: UpgradeProfile,
    pub(crate) tower: Option<Tower>,
}

impl Defense {
    pub(crate) fn new(
        id: DefenseId,
        kind: DefenseKind,
        origin: CellCoord,
        profile: &DefenseProfile,
        rotation_speed: f32,
    ) -> Self {
        Self {
            id,
            kind,
            region: CellRect::from_origin_and_size(origin, profile.footprint()),
            level: 1,
            total_spent: profile.cost,
            upgrade_cost: profile.upgrade_cost,
            health: profile.health,
            max_health: profile.health,
            regen: profile.regen,
            regen_elapsed: Duration::ZERO,
            collapse: None,
            extras: profile.upgrade,
            tower: match (profile.tower, kind.projectile()) {
                (Some(stats), Some(projectile)) => Some(Tower {
                    range: stats.range,
                    damage: stats.damage,
                    fire_rate: stats.fire_rate,
                    fire_timer: Duration::ZERO,
                    target: None,
                    barrel_angle: 0.0,
                    target_angle: 0.0,
                    rotation_speed,
                    projectile,
                    projectiles: Vec::new(),
                }),
                _ => None,
            },
        }
    }

    pub(crate) fn center(&self, tile_length: f32) -> Vec2 {
        self.region.center(tile_length)
    }

    pub(crate) const fn is_destroying(&self) -> bool {
        self.collapse.is_some()
    }

    pub(crate) const fn sell_value(&self) -> u32 {
        sell_value(self.total_spent)
    }

    /// Gold required for the next upgrade, or the reason it is impossible.
    pub(crate) fn upgrade_quote(&self) -> Result<u32, UpgradeError> {
        if self.is_destroying() {
            Err(UpgradeError::Destroying)
        } else if self.level >= MAX_DEFENSE_LEVEL {
            Err(UpgradeError::MaxLevel)
        } else {
            Ok(self.upgrade_cost)
        }
    }

    /// Raises the level by one after the caller paid [`Self::upgrade_quote`].
    ///
    /// Every defense gains 20% health and fully heals; towers gain 20% damage,
    /// half a tile of range and 10% fire rate. Kind-specific extras are layered
    /// on top.
    pub(crate) fn upgrade(&mut self) -> Result<u32, UpgradeError> {
        let cost = self.upgrade_quote()?;
        self.level += 1;
        self.total_spent = self.total_spent.saturating_add(cost);
        self.upgrade_cost = scale(self.upgrade_cost, 1.5);

        self.max_health = scale(self.max_health, 1.2);
        if let Some(tower) = self.tower.as_mut() {
            tower.damage = scale(tower.damage, 1.2);
            tower.range += 0.5;
            tower.fire_rate *= 1.1;

            tower.damage = scale(tower.damage, self.extras.damage_multiplier);
            tower.range += self.extras.range_bonus;
        }
        self.max_health = scale(self.max_health, self.extras.health_multiplier);
        self.health = self.max_health;
        Ok(self.level)
    }

    /// Clamps health at zero, starting the collapse the first time it gets
    /// there. Reports whether health is depleted.
    pub(crate) fn take_damage(&mut self, amount: u32, collapse_duration: Duration) -> bool {
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 && self.collapse.is_none() {
            self.collapse = Some(collapse_duration);
        }
        self.health == 0
    }

    /// Runs regeneration, the collapse countdown and the fire timer. Returns
    /// `true` once a collapse has run its course.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        if let Some(remaining) = self.collapse.as_mut() {
            *remaining = remaining.saturating_sub(dt);
            return remaining.is_zero();
        }

        if let Some(regen) = self.regen {
            if self.health < self.max_health {
                self.regen_elapsed = self.regen_elapsed.saturating_add(dt);
                if self.regen_elapsed >= regen.interval() {
                    self.health = self.health.saturating_add(regen.amount).min(self.max_health);
                    self.regen_elapsed = Duration::ZERO;
                }
            }
        }

        if let Some(tower) = self.tower.as_mut() {
            tower.fire_timer = tower.fire_timer.saturating_sub(dt);
        }
        false
    }

    pub(crate) fn snapshot(&self, tile_length: f32) -> DefenseSnapshot {
        DefenseSnapshot {
            id: self.id,
            kind: self.kind,
            region: self.region,
            center: self.center(tile_length),
            level: self.level,
            health: self.health,
            max_health: self.max_health,
            upgrade_cost: self.upgrade_cost,
            sell_value: self.sell_value(),
            is_destroying: self.is_destroying(),
            tower: self.tower.as_ref().map(Tower::snapshot),
        }
    }
}

/// Targeting and firing state carried by towers.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    range: f32,
    damage: u32,
    fire_rate: f32,
    fire_timer: Duration,
    target: Option<EnemyId>,
    barrel_angle: f32,
    target_angle: f32,
    rotation_speed: f32,
    pub(crate) projectile: ProjectileKind,
    projectiles: Vec<Projectile>,
}

impl Tower {
    pub(crate) const fn ready_in(&self) -> Duration {
        self.fire_timer
    }

    /// Stores the target chosen for this tick and turns the barrel toward it.
    pub(crate) fn aim(&mut self, target: Option<(EnemyId, Vec2)>, center: Vec2, dt: Duration) {
        self.target = target.map(|(id, _)| id);
        if let Some((_, position)) = target {
            let offset = position - center;
            self.target_angle = offset.y.atan2(offset.x);
            self.barrel_angle = rotate_towards(
                self.barrel_angle,
                self.target_angle,
                self.rotation_speed * dt.as_secs_f32(),
            );
        }
    }

    /// Launches a projectile from `origin` when the fire timer has run out.
    pub(crate) fn fire(
        &mut self,
        target: EnemyId,
        target_position: Vec2,
        origin: Vec2,
        profile: &ProjectileProfile,
    ) -> bool {
        if !self.fire_timer.is_zero() {
            return false;
        }
        self.projectiles.push(Projectile::launch(
            self.projectile,
            profile,
            origin,
            target,
            target_position,
            self.damage,
        ));
        self.fire_timer = rate_period(self.fire_rate);
        true
    }

    /// Advances owned projectiles and drops the spent ones.
    pub(crate) fn update_projectiles(
        &mut self,
        dt: Duration,
        enemies: &mut [Enemy],
        enemy_radius: f32,
        out_events: &mut Vec<Event>,
    ) {
        for projectile in &mut self.projectiles {
            projectile.update(dt, enemies, enemy_radius, out_events);
        }
        self.projectiles.retain(Projectile::is_active);
    }

    pub(crate) fn projectile_snapshots(
        &self,
        tower: DefenseId,
    ) -> impl Iterator<Item = ProjectileSnapshot> + '_ {
        self.projectiles
            .iter()
            .map(move |projectile| projectile.snapshot(tower))
    }

    fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            range: self.range,
            damage: self.damage,
            fire_rate: self.fire_rate,
            barrel_angle: self.barrel_angle,
            target: self.target,
            projectiles: self.projectiles.len(),
            ready_in: self.ready_in(),
        }
    }
}

/// Registry that stores defenses and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct DefenseRegistry {
    entries: BTreeMap<DefenseId, Defense>,
    next_defense_id: DefenseId,
}

impl DefenseRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_defense_id: DefenseId::new(0),
        }
    }

    /// Stores a new defense under a fresh identifier.
    pub(crate) fn insert(
        &mut self,
        kind: DefenseKind,
        origin: CellCoord,
        profile: &DefenseProfile,
        rotation_speed: f32,
    ) -> DefenseId {
        let id = self.next_defense_id;
        self.next_defense_id = DefenseId::new(id.get().saturating_add(1));
        let _ = self
            .entries
            .insert(id, Defense::new(id, kind, origin, profile, rotation_speed));
        id
    }

    pub(crate) fn get(&self, id: DefenseId) -> Option<&Defense> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: DefenseId) -> Option<&mut Defense> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: DefenseId) -> Option<Defense> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Defense> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Defense> {
        self.entries.values_mut()
    }

    /// Defense whose footprint covers the cell.
    pub(crate) fn at(&self, cell: CellCoord) -> Option<&Defense> {
        self.iter().find(|defense| defense.region.contains(cell))
    }
}

fn scale(value: u32, factor: f32) -> u32 {
    (value as f32 * factor).floor() as u32
}

/// Wraps an angle difference into `(-π, π]`.
fn shortest_arc(delta: f32) -> f32 {
    let wrapped = delta.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Wraps an angle into `[0, 2π)`.
fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Turns `current` toward `target` along the shorter arc by at most
/// `max_step` radians, landing exactly on `target` when it is within reach.
pub(crate) fn rotate_towards(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = shortest_arc(target - current);
    if delta.abs() <= max_step {
        normalize_angle(target)
    } else {
        normalize_angle(current + max_step.copysign(delta))
    }
}
