//! Enemy state: health, walking and the melee animation cycle.

use std::time::Duration;

use bastion_core::{
    CellCoord, EnemyId, EnemyKind, EnemyPhase, EnemyProfile, EnemySnapshot, Tuning,
};
use glam::Vec2;

/// Melee animation cycle of an enemy.
///
/// `base` is the position the strike started from and `direction` the unit
/// vector toward the struck defense.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Animation {
    Moving,
    Attacking {
        elapsed: Duration,
        base: Vec2,
        direction: Vec2,
    },
    Recoiling {
        elapsed: Duration,
        base: Vec2,
        direction: Vec2,
    },
}

impl Animation {
    /// Advances the cycle by `dt`, yielding the next state and the position the
    /// enemy should be drawn at. Moving enemies report no position.
    pub(crate) fn advance(self, dt: Duration, tuning: &Tuning) -> (Self, Option<Vec2>) {
        match self {
            Self::Moving => (Self::Moving, None),
            Self::Attacking {
                elapsed,
                base,
                direction,
            } => {
                let elapsed = elapsed.saturating_add(dt);
                let duration = tuning.attack_duration();
                if elapsed < duration {
                    let t = progress(elapsed, duration);
                    let offset = tuning.dash_distance * t * (2.0 - t);
                    (
                        Self::Attacking {
                            elapsed,
                            base,
                            direction,
                        },
                        Some(base + direction * offset),
                    )
                } else {
                    Self::Recoiling {
                        elapsed: Duration::ZERO,
                        base,
                        direction,
                    }
                    .advance(elapsed - duration, tuning)
                }
            }
            Self::Recoiling {
                elapsed,
                base,
                direction,
            } => {
                let elapsed = elapsed.saturating_add(dt);
                let duration = tuning.recoil_duration();
                if elapsed < duration {
                    let t = progress(elapsed, duration);
                    let offset = tuning.dash_distance * (1.0 - t * t);
                    (
                        Self::Recoiling {
                            elapsed,
                            base,
                            direction,
                        },
                        Some(base + direction * offset),
                    )
                } else {
                    (Self::Moving, Some(base))
                }
            }
        }
    }

    pub(crate) const fn phase(&self) -> EnemyPhase {
        match self {
            Self::Moving => EnemyPhase::Moving,
            Self::Attacking { .. } => EnemyPhase::Attacking,
            Self::Recoiling { .. } => EnemyPhase::Recoiling,
        }
    }
}

fn progress(elapsed: Duration, duration: Duration) -> f32 {
    let total = duration.as_secs_f32();
    if total <= 0.0 {
        1.0
    } else {
        (elapsed.as_secs_f32() / total).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    cell: CellCoord,
    position: Vec2,
    health: f32,
    max_health: f32,
    speed: f32,
    damage: u32,
    gold: u32,
    attack_interval: Duration,
    attack_cooldown: Duration,
    animation: Animation,
}

impl Enemy {
    pub(crate) fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        cell: CellCoord,
        profile: &EnemyProfile,
        health_multiplier: f32,
        tile_length: f32,
    ) -> Self {
        let health = profile.health * health_multiplier;
        Self {
            id,
            kind,
            cell,
            position: cell.center(tile_length),
            health,
            max_health: health,
            speed: profile.speed,
            damage: profile.damage,
            gold: profile.gold,
            attack_interval: profile.attack_cooldown(),
            attack_cooldown: Duration::ZERO,
            animation: Animation::Moving,
        }
    }

    pub(crate) const fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) const fn gold(&self) -> u32 {
        self.gold
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Clamps health at zero and reports whether the enemy died.
    pub(crate) fn take_damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount).max(0.0);
        self.health <= 0.0
    }

    /// Runs the cooldown and animation clocks for one tick.
    pub(crate) fn tick_clocks(&mut self, dt: Duration, tuning: &Tuning) {
        self.attack_cooldown = self.attack_cooldown.saturating_sub(dt);
        let (animation, position) = self.animation.advance(dt, tuning);
        self.animation = animation;
        if let Some(position) = position {
            self.position = position;
        }
    }

    pub(crate) fn is_animating(&self) -> bool {
        self.animation != Animation::Moving
    }

    pub(crate) fn can_strike(&self) -> bool {
        !self.is_animating() && self.attack_cooldown.is_zero()
    }

    /// Starts the dash toward `target` and returns the damage of the strike.
    pub(crate) fn begin_strike(&mut self, target: Vec2) -> u32 {
        self.animation = Animation::Attacking {
            elapsed: Duration::ZERO,
            base: self.position,
            direction: (target - self.position).normalize_or_zero(),
        };
        self.attack_cooldown = self.attack_interval;
        self.damage
    }

    /// Abandons a strike in progress and snaps back to where it started.
    pub(crate) fn disengage(&mut self) {
        if let Animation::Attacking { base, .. } | Animation::Recoiling { base, .. } =
            self.animation
        {
            self.position = base;
        }
        self.animation = Animation::Moving;
    }

    /// Walks toward the centre of `destination`, landing exactly on it when the
    /// tick's movement would overshoot.
    pub(crate) fn step_towards(&mut self, destination: CellCoord, dt: Duration, tile_length: f32) {
        let target = destination.center(tile_length);
        let offset = target - self.position;
        let distance = offset.length();
        let step = self.speed * dt.as_secs_f32();
        if step >= distance {
            self.position = target;
            self.cell = destination;
        } else {
            self.position += offset / distance * step;
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            phase: self.animation.phase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::Catalog;

    const TILE: f32 = 40.0;
    const FRAME: Duration = Duration::from_millis(16);

    fn zombie(cell: CellCoord) -> Enemy {
        let catalog = Catalog::default();
        Enemy::spawn(
            EnemyId::new(0),
            EnemyKind::Zombie,
            cell,
            catalog.enemy(EnemyKind::Zombie),
            1.0,
            TILE,
        )
    }

    #[test]
    fn health_multiplier_scales_health_and_maximum() {
        let catalog = Catalog::default();
        let enemy = Enemy::spawn(
            EnemyId::new(4),
            EnemyKind::Tank,
            CellCoord::new(0, 0),
            catalog.enemy(EnemyKind::Tank),
            1.5,
            TILE,
        );
        let snapshot = enemy.snapshot();
        assert!((snapshot.health - 300.0).abs() < 1e-3);
        assert!((snapshot.max_health - 300.0).abs() < 1e-3);
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut enemy = zombie(CellCoord::new(0, 0));
        assert!(!enemy.take_damage(40.0));
        assert!(enemy.take_damage(500.0));
        assert_eq!(enemy.snapshot().health, 0.0);
        assert!(!enemy.is_alive());
    }

    #[test]
    fn step_snaps_onto_tile_centre() {
        let mut enemy = zombie(CellCoord::new(0, 0));
        let destination = CellCoord::new(1, 0);
        enemy.step_towards(destination, Duration::from_millis(500), TILE);
        assert!((enemy.position().x - 40.0).abs() < 1e-3);
        assert_eq!(enemy.snapshot().cell, CellCoord::new(0, 0));

        enemy.step_towards(destination, Duration::from_millis(500), TILE);
        assert_eq!(enemy.position(), destination.center(TILE));
        assert_eq!(enemy.snapshot().cell, destination);
    }

    #[test]
    fn strike_round_trip_returns_to_base() {
        let tuning = Tuning::default();
        let mut enemy = zombie(CellCoord::new(3, 3));
        let base = enemy.position();
        let damage = enemy.begin_strike(base + Vec2::new(100.0, 0.0));
        assert_eq!(damage, 10);
        assert!(!enemy.can_strike());

        let mut furthest = 0.0f32;
        let mut phases = Vec::new();
        for _ in 0..40 {
            enemy.tick_clocks(FRAME, &tuning);
            furthest = furthest.max(enemy.position().x - base.x);
            phases.push(enemy.snapshot().phase);
            assert!((enemy.position().y - base.y).abs() < 1e-4);
        }

        assert!(phases.contains(&EnemyPhase::Attacking));
        assert!(phases.contains(&EnemyPhase::Recoiling));
        assert_eq!(enemy.snapshot().phase, EnemyPhase::Moving);
        assert_eq!(enemy.position(), base);
        assert!(furthest > 0.0 && furthest <= tuning.dash_distance + 1e-4);
    }

    #[test]
    fn disengaging_snaps_back_to_base() {
        let tuning = Tuning::default();
        let mut enemy = zombie(CellCoord::new(3, 3));
        let base = enemy.position();
        let _ = enemy.begin_strike(base + Vec2::new(0.0, 50.0));
        enemy.tick_clocks(Duration::from_millis(100), &tuning);
        assert_ne!(enemy.position(), base);

        enemy.disengage();
        assert_eq!(enemy.position(), base);
        assert!(!enemy.is_animating());
    }

    #[test]
    fn cooldown_gates_the_next_strike() {
        let tuning = Tuning::default();
        let mut enemy = zombie(CellCoord::new(3, 3));
        let _ = enemy.begin_strike(Vec2::ZERO);
        enemy.tick_clocks(Duration::from_millis(500), &tuning);
        assert!(!enemy.is_animating());
        assert!(!enemy.can_strike());
        enemy.tick_clocks(Duration::from_millis(500), &tuning);
        assert!(enemy.can_strike());
    }

    #[test]
    fn long_frame_finishes_the_whole_cycle() {
        let tuning = Tuning::default();
        let base = Vec2::new(10.0, 10.0);
        let animation = Animation::Attacking {
            elapsed: Duration::ZERO,
            base,
            direction: Vec2::X,
        };
        let (next, position) = animation.advance(Duration::from_millis(400), &tuning);
        assert_eq!(next, Animation::Moving);
        assert_eq!(position, Some(base));
    }
}
