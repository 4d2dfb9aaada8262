//! Projectiles in flight: seeking, collision, splash and pierce.

use std::time::Duration;

use bastion_core::{DefenseId, EnemyId, Event, ProjectileKind, ProjectileProfile, ProjectileSnapshot};
use glam::Vec2;
use tracing::trace;

use crate::enemies::Enemy;

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    kind: ProjectileKind,
    position: Vec2,
    heading: f32,
    target: EnemyId,
    damage: f32,
    speed: f32,
    reach: f32,
    penetration: usize,
    splash_radius: f32,
    splash_multiplier: f32,
    life: Duration,
    hits: Vec<EnemyId>,
    splashed: Vec<EnemyId>,
    active: bool,
}

impl Projectile {
    pub(crate) fn launch(
        kind: ProjectileKind,
        profile: &ProjectileProfile,
        origin: Vec2,
        target: EnemyId,
        target_position: Vec2,
        damage: u32,
    ) -> Self {
        let aim = target_position - origin;
        Self {
            kind,
            position: origin,
            heading: aim.y.atan2(aim.x),
            target,
            damage: damage as f32,
            speed: profile.speed,
            reach: profile.shape.leading_extent(),
            penetration: usize::try_from(profile.penetration)
                .unwrap_or(usize::MAX)
                .max(1),
            splash_radius: profile.splash_radius,
            splash_multiplier: profile.splash_multiplier,
            life: profile.lifespan(),
            hits: Vec::new(),
            splashed: Vec::new(),
            active: true,
        }
    }

    pub(crate) const fn is_active(&self) -> bool {
        self.active
    }

    /// Advances the projectile by one tick against the live enemy list.
    pub(crate) fn update(
        &mut self,
        dt: Duration,
        enemies: &mut [Enemy],
        enemy_radius: f32,
        out_events: &mut Vec<Event>,
    ) {
        if !self.active {
            return;
        }

        self.life = self.life.saturating_sub(dt);
        if self.life.is_zero() {
            self.active = false;
            return;
        }

        let Some(index) = self.resolve_target(enemies) else {
            self.active = false;
            return;
        };

        let target_position = enemies[index].position();
        let offset = target_position - self.position;
        let distance = offset.length();
        if distance > 0.0 {
            let step = (self.speed * dt.as_secs_f32()).min(distance);
            self.position += offset / distance * step;
            self.heading = offset.y.atan2(offset.x);
        }

        if self.position.distance(target_position) <= self.reach + enemy_radius {
            self.collide(index, enemies, out_events);
        }
    }

    /// Index of the enemy to chase: the current target while it is alive and
    /// unhit, otherwise the nearest live enemy not hit yet.
    fn resolve_target(&mut self, enemies: &[Enemy]) -> Option<usize> {
        let current = enemies.iter().position(|enemy| {
            enemy.id == self.target && enemy.is_alive() && !self.hits.contains(&enemy.id)
        });
        if current.is_some() {
            return current;
        }

        let mut best: Option<(usize, f32)> = None;
        for (index, enemy) in enemies.iter().enumerate() {
            if !enemy.is_alive() || self.hits.contains(&enemy.id) {
                continue;
            }
            let distance = enemy.position().distance_squared(self.position);
            if best.map_or(true, |(_, closest)| distance < closest) {
                best = Some((index, distance));
            }
        }

        let (index, _) = best?;
        self.target = enemies[index].id;
        Some(index)
    }

    fn collide(&mut self, index: usize, enemies: &mut [Enemy], out_events: &mut Vec<Event>) {
        let primary = &mut enemies[index];
        let primary_id = primary.id;
        if self.hits.contains(&primary_id) {
            return;
        }

        let _ = primary.take_damage(self.damage);
        let impact = primary.position();
        self.hits.push(primary_id);
        out_events.push(Event::EnemyDamaged {
            enemy: primary_id,
            amount: self.damage,
            splash: false,
        });
        trace!(enemy = primary_id.get(), damage = self.damage, "projectile hit");

        if self.splash_radius > 0.0 {
            let splash_damage = self.damage * self.splash_multiplier;
            for enemy in enemies.iter_mut() {
                if enemy.id == primary_id
                    || !enemy.is_alive()
                    || self.hits.contains(&enemy.id)
                    || self.splashed.contains(&enemy.id)
                {
                    continue;
                }
                if enemy.position().distance(impact) <= self.splash_radius {
                    let _ = enemy.take_damage(splash_damage);
                    self.splashed.push(enemy.id);
                    out_events.push(Event::EnemyDamaged {
                        enemy: enemy.id,
                        amount: splash_damage,
                        splash: true,
                    });
                }
            }
        }

        if self.hits.len() >= self.penetration {
            self.active = false;
        }
    }

    pub(crate) fn snapshot(&self, tower: DefenseId) -> ProjectileSnapshot {
        ProjectileSnapshot {
            tower,
            kind: self.kind,
            position: self.position,
            heading: self.heading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{Catalog, CellCoord, EnemyKind};

    const TILE: f32 = 40.0;
    const RADIUS: f32 = 15.0;
    const FRAME: Duration = Duration::from_millis(16);

    fn enemy(id: u32, column: i32, row: i32) -> Enemy {
        let catalog = Catalog::default();
        Enemy::spawn(
            EnemyId::new(id),
            EnemyKind::Tank,
            CellCoord::new(column, row),
            catalog.enemy(EnemyKind::Tank),
            1.0,
            TILE,
        )
    }

    fn launch(kind: ProjectileKind, target: &Enemy, damage: u32) -> Projectile {
        let catalog = Catalog::default();
        Projectile::launch(
            kind,
            catalog.projectile(kind),
            Vec2::ZERO,
            target.id,
            target.position(),
            damage,
        )
    }

    fn fly(projectile: &mut Projectile, enemies: &mut [Enemy], events: &mut Vec<Event>) {
        for _ in 0..400 {
            if !projectile.is_active() {
                return;
            }
            projectile.update(FRAME, enemies, RADIUS, events);
            assert!(projectile.hits.len() <= projectile.penetration);
        }
    }

    fn damage_to(events: &[Event], id: u32) -> Vec<(f32, bool)> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::EnemyDamaged {
                    enemy,
                    amount,
                    splash,
                } if enemy.get() == id => Some((*amount, *splash)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn splash_reaches_neighbours_of_the_primary_only() {
        let mut enemies = vec![enemy(0, 4, 4), enemy(1, 5, 4), enemy(2, 9, 9)];
        let mut projectile = launch(ProjectileKind::Cannon, &enemies[0], 20);
        let mut events = Vec::new();

        fly(&mut projectile, &mut enemies, &mut events);

        assert!(!projectile.is_active());
        assert_eq!(damage_to(&events, 0), vec![(20.0, false)]);
        assert_eq!(damage_to(&events, 1), vec![(10.0, true)]);
        assert!(damage_to(&events, 2).is_empty());
        assert_eq!(projectile.hits, vec![EnemyId::new(0)]);
    }

    #[test]
    fn pierce_stops_after_penetration_distinct_hits() {
        let mut enemies = vec![
            enemy(0, 2, 0),
            enemy(1, 4, 0),
            enemy(2, 6, 0),
            enemy(3, 8, 0),
        ];
        let mut projectile = launch(ProjectileKind::Sniper, &enemies[0], 30);
        let mut events = Vec::new();

        fly(&mut projectile, &mut enemies, &mut events);

        assert!(!projectile.is_active());
        assert_eq!(projectile.hits.len(), 3);
        assert_eq!(damage_to(&events, 0).len(), 1);
        assert_eq!(damage_to(&events, 1).len(), 1);
        assert_eq!(damage_to(&events, 2).len(), 1);
        assert!(damage_to(&events, 3).is_empty());
    }

    #[test]
    fn dead_target_is_replaced_by_nearest_unhit_enemy() {
        let mut enemies = vec![enemy(0, 9, 0), enemy(1, 3, 0), enemy(2, 6, 0)];
        let mut projectile = launch(ProjectileKind::MainTower, &enemies[0], 10);
        let mut events = Vec::new();

        projectile.update(FRAME, &mut enemies, RADIUS, &mut events);
        let _ = enemies[0].take_damage(1_000.0);
        fly(&mut projectile, &mut enemies, &mut events);

        assert_eq!(projectile.hits, vec![EnemyId::new(1)]);
        assert!(damage_to(&events, 0).is_empty());
    }

    #[test]
    fn projectile_without_candidates_deactivates() {
        let mut enemies = vec![enemy(0, 3, 0)];
        let mut projectile = launch(ProjectileKind::MainTower, &enemies[0], 10);
        let _ = enemies[0].take_damage(1_000.0);
        let mut events = Vec::new();

        projectile.update(FRAME, &mut enemies, RADIUS, &mut events);

        assert!(!projectile.is_active());
        assert!(events.is_empty());
    }

    #[test]
    fn lifespan_expiry_deactivates() {
        let mut enemies = vec![enemy(0, 3, 0)];
        let mut projectile = launch(ProjectileKind::MainTower, &enemies[0], 10);
        let mut events = Vec::new();

        projectile.update(Duration::from_secs(3), &mut enemies, RADIUS, &mut events);

        assert!(!projectile.is_active());
        assert!(projectile.hits.is_empty());
    }
}
