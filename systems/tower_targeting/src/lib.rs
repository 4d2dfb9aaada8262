#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects the nearest enemy in range for every tower.

use bastion_core::{Command, DefenseId, DefenseView, EnemyId, EnemyView, TowerTarget};
use glam::Vec2;

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Range is measured in tiles and converted to pixels with `tile_length`.
    /// Collapsing towers and dead enemies are skipped. The output buffer is
    /// cleared before populating it with the latest assignments.
    pub fn handle(
        &mut self,
        defenses: &DefenseView,
        enemies: &EnemyView,
        tile_length: f32,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        self.prepare_tower_workspace(defenses, tile_length);
        if self.tower_workspace.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);
        if self.enemy_workspace.is_empty() {
            return;
        }

        for tower in &self.tower_workspace {
            let max_distance = tower.range * tower.range;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance_sq = candidate.position.distance_squared(tower.center);
                if distance_sq > max_distance {
                    continue;
                }

                let current = BestCandidate {
                    distance_sq,
                    enemy: candidate.id,
                    position: candidate.position,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                    tower_center: tower.center,
                    enemy_position: best_candidate.position,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, defenses: &DefenseView, tile_length: f32) {
        self.tower_workspace.clear();

        for snapshot in defenses.iter() {
            if snapshot.is_destroying {
                continue;
            }
            let Some(tower) = snapshot.tower else {
                continue;
            };

            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                center: snapshot.center,
                range: tower.range * tile_length,
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter().filter(|snapshot| snapshot.is_alive()) {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
            });
        }
    }
}

/// Emits one `Command::AimTower` per live tower, carrying its target when
/// one was selected and `None` otherwise.
pub fn aim_commands(defenses: &DefenseView, targets: &[TowerTarget], out: &mut Vec<Command>) {
    for snapshot in defenses.iter() {
        if snapshot.tower.is_none() || snapshot.is_destroying {
            continue;
        }
        out.push(Command::AimTower {
            tower: snapshot.id,
            target: find_target(targets, snapshot.id),
        });
    }
}

fn find_target(targets: &[TowerTarget], tower: DefenseId) -> Option<EnemyId> {
    targets
        .iter()
        .find(|target| target.tower == tower)
        .map(|target| target.enemy)
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: DefenseId,
    center: Vec2,
    range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    enemy: EnemyId,
    position: Vec2,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.enemy < other.enemy
    }
}

#[cfg(test)]
mod tests {
    use super::{aim_commands, TowerTargeting};
    use bastion_core::{
        CellCoord, CellRect, CellRectSize, Command, DefenseId, DefenseKind, DefenseSnapshot,
        DefenseView, EnemyId, EnemyKind, EnemyPhase, EnemySnapshot, EnemyView, TowerSnapshot,
    };
    use glam::Vec2;
    use std::time::Duration;

    const TILE: f32 = 40.0;

    fn tower(id: u32, center: Vec2, range: f32) -> DefenseSnapshot {
        DefenseSnapshot {
            id: DefenseId::new(id),
            kind: DefenseKind::Cannon,
            region: CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(2, 2)),
            center,
            level: 1,
            health: 250,
            max_health: 250,
            upgrade_cost: 40,
            sell_value: 25,
            is_destroying: false,
            tower: Some(TowerSnapshot {
                range,
                damage: 20,
                fire_rate: 0.8,
                barrel_angle: 0.0,
                target: None,
                projectiles: 0,
                ready_in: Duration::ZERO,
            }),
        }
    }

    fn wall(id: u32) -> DefenseSnapshot {
        DefenseSnapshot {
            kind: DefenseKind::Wall,
            tower: None,
            ..tower(id, Vec2::ZERO, 0.0)
        }
    }

    fn enemy(id: u32, position: Vec2) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Zombie,
            cell: CellCoord::new(
                (position.x / TILE).floor() as i32,
                (position.y / TILE).floor() as i32,
            ),
            position,
            health: 100.0,
            max_health: 100.0,
            phase: EnemyPhase::Moving,
        }
    }

    fn run(defenses: Vec<DefenseSnapshot>, enemies: Vec<EnemySnapshot>) -> Vec<super::TowerTarget> {
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();
        system.handle(
            &DefenseView::from_snapshots(defenses),
            &EnemyView::from_snapshots(enemies),
            TILE,
            &mut out,
        );
        out
    }

    #[test]
    fn enemy_inside_range_is_selected() {
        let center = Vec2::new(200.0, 200.0);
        let out = run(
            vec![tower(1, center, 3.0)],
            vec![enemy(2, center + Vec2::new(100.0, 0.0))],
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tower, DefenseId::new(1));
        assert_eq!(out[0].enemy, EnemyId::new(2));
        assert_eq!(out[0].tower_center, center);
        assert_eq!(out[0].enemy_position, center + Vec2::new(100.0, 0.0));
    }

    #[test]
    fn enemy_outside_range_is_ignored() {
        let center = Vec2::new(200.0, 200.0);
        let out = run(
            vec![tower(1, center, 3.0)],
            vec![enemy(2, center + Vec2::new(0.0, 130.0))],
        );

        assert!(out.is_empty());
    }

    #[test]
    fn nearest_enemy_wins() {
        let center = Vec2::new(200.0, 200.0);
        let out = run(
            vec![tower(1, center, 5.0)],
            vec![
                enemy(1, center + Vec2::new(150.0, 0.0)),
                enemy(2, center + Vec2::new(-60.0, 0.0)),
                enemy(3, center + Vec2::new(0.0, 90.0)),
            ],
        );

        assert_eq!(out[0].enemy, EnemyId::new(2));
    }

    #[test]
    fn earlier_enemy_wins_ties() {
        let center = Vec2::new(200.0, 200.0);
        let out = run(
            vec![tower(1, center, 5.0)],
            vec![
                enemy(9, center + Vec2::new(0.0, 80.0)),
                enemy(4, center + Vec2::new(80.0, 0.0)),
            ],
        );

        assert_eq!(out[0].enemy, EnemyId::new(4));
    }

    #[test]
    fn dead_enemies_and_collapsing_towers_are_skipped() {
        let center = Vec2::new(200.0, 200.0);
        let mut corpse = enemy(1, center + Vec2::new(10.0, 0.0));
        corpse.health = 0.0;
        let mut collapsing = tower(2, center, 5.0);
        collapsing.is_destroying = true;

        let out = run(
            vec![tower(1, center, 5.0), collapsing, wall(3)],
            vec![corpse, enemy(5, center + Vec2::new(50.0, 0.0))],
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tower, DefenseId::new(1));
        assert_eq!(out[0].enemy, EnemyId::new(5));
    }

    #[test]
    fn every_live_tower_is_aimed() {
        let center = Vec2::new(200.0, 200.0);
        let defenses = DefenseView::from_snapshots(vec![
            tower(1, center, 3.0),
            wall(2),
            tower(3, Vec2::new(900.0, 900.0), 3.0),
        ]);
        let enemies = EnemyView::from_snapshots(vec![enemy(7, center + Vec2::new(20.0, 0.0))]);
        let mut system = TowerTargeting::new();
        let mut targets = Vec::new();
        system.handle(&defenses, &enemies, TILE, &mut targets);

        let mut commands = Vec::new();
        aim_commands(&defenses, &targets, &mut commands);

        assert_eq!(
            commands,
            vec![
                Command::AimTower {
                    tower: DefenseId::new(1),
                    target: Some(EnemyId::new(7)),
                },
                Command::AimTower {
                    tower: DefenseId::new(3),
                    target: None,
                },
            ]
        );
    }

    #[test]
    fn output_is_cleared_between_runs() {
        let center = Vec2::new(200.0, 200.0);
        let defenses = DefenseView::from_snapshots(vec![tower(1, center, 3.0)]);
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();

        system.handle(
            &defenses,
            &EnemyView::from_snapshots(vec![enemy(1, center)]),
            TILE,
            &mut out,
        );
        assert_eq!(out.len(), 1);

        system.handle(&defenses, &EnemyView::default(), TILE, &mut out);
        assert!(out.is_empty());
    }
}
