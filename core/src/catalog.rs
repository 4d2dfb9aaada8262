//! Data-driven stat tables for every defense, enemy and projectile kind.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellRectSize, DefenseKind, EnemyKind, ProjectileKind};

/// Complete set of tunable stats injected into the world at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Stats of the base.
    pub main_tower: DefenseProfile,
    /// Stats of the splash tower.
    pub cannon: DefenseProfile,
    /// Stats of the piercing tower.
    pub sniper: DefenseProfile,
    /// Stats of the passive blocker.
    pub wall: DefenseProfile,
    /// Stats of the baseline enemy.
    pub zombie: EnemyProfile,
    /// Stats of the fast enemy.
    pub runner: EnemyProfile,
    /// Stats of the sturdy enemy.
    pub tank: EnemyProfile,
    /// Stats of the boss enemy.
    pub boss: EnemyProfile,
    /// Flight parameters of cannon balls.
    pub cannon_shot: ProjectileProfile,
    /// Flight parameters of sniper rounds.
    pub sniper_shot: ProjectileProfile,
    /// Flight parameters of main tower shots.
    pub main_tower_shot: ProjectileProfile,
    /// Shared timings and distances.
    pub tuning: Tuning,
}

impl Catalog {
    /// Stats for the provided defense kind.
    #[must_use]
    pub fn defense(&self, kind: DefenseKind) -> &DefenseProfile {
        match kind {
            DefenseKind::MainTower => &self.main_tower,
            DefenseKind::Cannon => &self.cannon,
            DefenseKind::Sniper => &self.sniper,
            DefenseKind::Wall => &self.wall,
        }
    }

    /// Stats for the provided enemy kind.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind) -> &EnemyProfile {
        match kind {
            EnemyKind::Zombie => &self.zombie,
            EnemyKind::Runner => &self.runner,
            EnemyKind::Tank => &self.tank,
            EnemyKind::Boss => &self.boss,
        }
    }

    /// Flight parameters for the provided projectile kind.
    #[must_use]
    pub fn projectile(&self, kind: ProjectileKind) -> &ProjectileProfile {
        match kind {
            ProjectileKind::Cannon => &self.cannon_shot,
            ProjectileKind::Sniper => &self.sniper_shot,
            ProjectileKind::MainTower => &self.main_tower_shot,
        }
    }
}

impl Catalog {
    /// Checks that every rate, speed and distance can drive the simulation.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (kind, defense) in [
            ("main_tower", &self.main_tower),
            ("cannon", &self.cannon),
            ("sniper", &self.sniper),
            ("wall", &self.wall),
        ] {
            if let Some(tower) = defense.tower {
                check_stat(kind, "range", tower.range)?;
                check_rate(kind, "fire_rate", tower.fire_rate)?;
            }
        }
        for (kind, enemy) in [
            ("zombie", &self.zombie),
            ("runner", &self.runner),
            ("tank", &self.tank),
            ("boss", &self.boss),
        ] {
            check_stat(kind, "health", enemy.health)?;
            check_stat(kind, "speed", enemy.speed)?;
            check_rate(kind, "attack_rate", enemy.attack_rate)?;
        }
        for (kind, shot) in [
            ("cannon_shot", &self.cannon_shot),
            ("sniper_shot", &self.sniper_shot),
            ("main_tower_shot", &self.main_tower_shot),
        ] {
            check_stat(kind, "speed", shot.speed)?;
            check_stat(kind, "splash_radius", shot.splash_radius)?;
        }
        let tuning = &self.tuning;
        check_stat("tuning", "barrel_rotation_speed", tuning.barrel_rotation_speed)?;
        check_stat("tuning", "enemy_radius", tuning.enemy_radius)?;
        check_stat("tuning", "dash_distance", tuning.dash_distance)?;
        check_stat("tuning", "reach_margin", tuning.reach_margin)
    }
}

/// Stat that cannot drive the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum CatalogError {
    /// The stat is negative, infinite or not a number.
    #[error("{kind}.{stat} must be finite and non-negative, got {value}")]
    OutOfRange {
        /// Catalog entry holding the stat.
        kind: &'static str,
        /// Name of the stat.
        stat: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// The rate is positive but its period does not fit a `Duration`.
    #[error("{kind}.{stat} of {value} per second is too slow to schedule")]
    RateTooSlow {
        /// Catalog entry holding the rate.
        kind: &'static str,
        /// Name of the rate.
        stat: &'static str,
        /// Rejected value.
        value: f32,
    },
}

fn check_stat(kind: &'static str, stat: &'static str, value: f32) -> Result<(), CatalogError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CatalogError::OutOfRange { kind, stat, value })
    }
}

fn check_rate(kind: &'static str, stat: &'static str, value: f32) -> Result<(), CatalogError> {
    check_stat(kind, stat, value)?;
    if value > 0.0 && Duration::try_from_secs_f32(value.recip()).is_err() {
        return Err(CatalogError::RateTooSlow { kind, stat, value });
    }
    Ok(())
}

/// Interval between two events repeating `rate` times per second.
///
/// Rates that are not positive never repeat. Rates too slow to represent
/// saturate at `Duration::MAX` as well.
#[must_use]
pub fn rate_period(rate: f32) -> Duration {
    if rate > 0.0 {
        Duration::try_from_secs_f32(rate.recip()).unwrap_or(Duration::MAX)
    } else {
        Duration::MAX
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            main_tower: DefenseProfile {
                cost: 0,
                upgrade_cost: 100,
                width: 2,
                height: 2,
                health: 1000,
                regen: None,
                tower: Some(TowerProfile {
                    range: 5.0,
                    damage: 10,
                    fire_rate: 1.0,
                }),
                upgrade: UpgradeProfile::default(),
            },
            cannon: DefenseProfile {
                cost: 50,
                upgrade_cost: 40,
                width: 2,
                height: 2,
                health: 250,
                regen: Some(RegenProfile::default()),
                tower: Some(TowerProfile {
                    range: 4.0,
                    damage: 20,
                    fire_rate: 0.8,
                }),
                upgrade: UpgradeProfile {
                    damage_multiplier: 1.3,
                    ..UpgradeProfile::default()
                },
            },
            sniper: DefenseProfile {
                cost: 75,
                upgrade_cost: 60,
                width: 2,
                height: 2,
                health: 200,
                regen: Some(RegenProfile::default()),
                tower: Some(TowerProfile {
                    range: 7.0,
                    damage: 30,
                    fire_rate: 0.5,
                }),
                upgrade: UpgradeProfile {
                    damage_multiplier: 1.4,
                    range_bonus: 0.8,
                    ..UpgradeProfile::default()
                },
            },
            wall: DefenseProfile {
                cost: 10,
                upgrade_cost: 20,
                width: 1,
                height: 1,
                health: 375,
                regen: Some(RegenProfile::default()),
                tower: None,
                upgrade: UpgradeProfile {
                    health_multiplier: 1.5,
                    ..UpgradeProfile::default()
                },
            },
            zombie: EnemyProfile {
                health: 100.0,
                speed: 40.0,
                damage: 10,
                gold: 10,
                attack_rate: 1.0,
            },
            runner: EnemyProfile {
                health: 60.0,
                speed: 80.0,
                damage: 5,
                gold: 15,
                attack_rate: 1.2,
            },
            tank: EnemyProfile {
                health: 200.0,
                speed: 30.0,
                damage: 20,
                gold: 25,
                attack_rate: 0.7,
            },
            boss: EnemyProfile {
                health: 500.0,
                speed: 25.0,
                damage: 50,
                gold: 100,
                attack_rate: 0.5,
            },
            cannon_shot: ProjectileProfile {
                penetration: 1,
                splash_radius: 40.0,
                splash_multiplier: 0.5,
                speed: 200.0,
                shape: ProjectileShape::Circle { diameter: 8.0 },
                lifespan_ms: 3000,
            },
            sniper_shot: ProjectileProfile {
                penetration: 3,
                splash_radius: 0.0,
                splash_multiplier: 0.5,
                speed: 500.0,
                shape: ProjectileShape::Rectangle {
                    width: 10.0,
                    height: 2.0,
                },
                lifespan_ms: 3000,
            },
            main_tower_shot: ProjectileProfile {
                penetration: 1,
                splash_radius: 0.0,
                splash_multiplier: 0.5,
                speed: 350.0,
                shape: ProjectileShape::Circle { diameter: 4.0 },
                lifespan_ms: 3000,
            },
            tuning: Tuning::default(),
        }
    }
}

/// Stats of a single defense kind at level one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefenseProfile {
    /// Gold required to construct the defense.
    pub cost: u32,
    /// Gold required for the first upgrade.
    pub upgrade_cost: u32,
    /// Footprint width in tiles.
    pub width: u32,
    /// Footprint height in tiles.
    pub height: u32,
    /// Health at level one.
    pub health: u32,
    /// Passive regeneration, absent for defenses that never heal.
    pub regen: Option<RegenProfile>,
    /// Targeting and firing stats, absent for walls.
    pub tower: Option<TowerProfile>,
    /// Kind-specific extras applied after the common upgrade step.
    pub upgrade: UpgradeProfile,
}

impl DefenseProfile {
    /// Footprint of the defense in tiles.
    #[must_use]
    pub const fn footprint(&self) -> CellRectSize {
        CellRectSize::new(self.width, self.height)
    }
}

/// Passive regeneration parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenProfile {
    /// Health restored per interval.
    pub amount: u32,
    /// Milliseconds between regeneration pulses.
    pub interval_ms: u64,
}

impl RegenProfile {
    /// Interval between regeneration pulses.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for RegenProfile {
    fn default() -> Self {
        Self {
            amount: 5,
            interval_ms: 5000,
        }
    }
}

/// Targeting and firing stats of a tower at level one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerProfile {
    /// Targeting range in tiles.
    pub range: f32,
    /// Damage carried by each projectile.
    pub damage: u32,
    /// Shots per second.
    pub fire_rate: f32,
}

/// Kind-specific upgrade extras layered on top of the common upgrade step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeProfile {
    /// Additional damage multiplier, floored after application.
    pub damage_multiplier: f32,
    /// Additional range in tiles.
    pub range_bonus: f32,
    /// Additional maximum health multiplier, floored after application.
    pub health_multiplier: f32,
}

impl Default for UpgradeProfile {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            range_bonus: 0.0,
            health_multiplier: 1.0,
        }
    }
}

/// Stats of a single enemy kind before wave scaling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    /// Health at wave one.
    pub health: f32,
    /// Walking speed in pixels per second.
    pub speed: f32,
    /// Damage dealt by each melee strike.
    pub damage: u32,
    /// Gold awarded when the enemy dies.
    pub gold: u32,
    /// Melee strikes per second.
    pub attack_rate: f32,
}

impl EnemyProfile {
    /// Minimum time between two strikes.
    #[must_use]
    pub fn attack_cooldown(&self) -> Duration {
        rate_period(self.attack_rate)
    }
}

/// Flight and impact parameters of a projectile kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileProfile {
    /// Maximum number of enemies hit directly before the projectile expires.
    pub penetration: u32,
    /// Radius around the primary hit that receives splash damage; zero disables splash.
    pub splash_radius: f32,
    /// Fraction of the projectile damage dealt by splash.
    pub splash_multiplier: f32,
    /// Flight speed in pixels per second.
    pub speed: f32,
    /// Hitbox of the projectile.
    pub shape: ProjectileShape,
    /// Milliseconds before the projectile expires on its own.
    pub lifespan_ms: u64,
}

impl ProjectileProfile {
    /// Time before the projectile expires on its own.
    #[must_use]
    pub const fn lifespan(&self) -> Duration {
        Duration::from_millis(self.lifespan_ms)
    }
}

/// Hitbox of a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectileShape {
    /// Round projectile.
    Circle {
        /// Diameter in pixels.
        diameter: f32,
    },
    /// Thin slug rotated to its direction of travel.
    Rectangle {
        /// Length along the direction of travel in pixels.
        width: f32,
        /// Thickness across the direction of travel in pixels.
        height: f32,
    },
}

impl ProjectileShape {
    /// Distance from the projectile centre to its leading edge.
    #[must_use]
    pub fn leading_extent(&self) -> f32 {
        match *self {
            Self::Circle { diameter } => diameter / 2.0,
            Self::Rectangle { width, .. } => width / 2.0,
        }
    }
}

/// Timings and distances shared by every entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Milliseconds a destroyed defense keeps its tiles before removal.
    pub destroy_duration_ms: u64,
    /// Barrel rotation speed in radians per second.
    pub barrel_rotation_speed: f32,
    /// Collision radius of every enemy in pixels.
    pub enemy_radius: f32,
    /// Milliseconds of the forward dash of a strike.
    pub attack_duration_ms: u64,
    /// Milliseconds of the return after a strike.
    pub recoil_duration_ms: u64,
    /// Pixels covered by the forward dash.
    pub dash_distance: f32,
    /// Extra pixels added to the radius sum when testing reach.
    pub reach_margin: f32,
}

impl Tuning {
    /// Time a destroyed defense keeps its tiles before removal.
    #[must_use]
    pub const fn destroy_duration(&self) -> Duration {
        Duration::from_millis(self.destroy_duration_ms)
    }

    /// Duration of the forward dash of a strike.
    #[must_use]
    pub const fn attack_duration(&self) -> Duration {
        Duration::from_millis(self.attack_duration_ms)
    }

    /// Duration of the return after a strike.
    #[must_use]
    pub const fn recoil_duration(&self) -> Duration {
        Duration::from_millis(self.recoil_duration_ms)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            destroy_duration_ms: 800,
            barrel_rotation_speed: std::f32::consts::PI,
            enemy_radius: 15.0,
            attack_duration_ms: 150,
            recoil_duration_ms: 200,
            dash_distance: 8.0,
            reach_margin: 10.0,
        }
    }
}
