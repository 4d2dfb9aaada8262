#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that picks a defense for every enemy and
//! proposes its next move.

use bastion_core::{
    CellCoord, CellRect, Command, DefenseId, DefenseView, EnemyIntent, EnemySnapshot, EnemyView,
    OccupancyView, Tuning,
};
use glam::Vec2;

const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Pure system that turns enemy and defense snapshots into `DirectEnemy`
/// commands.
#[derive(Debug, Default)]
pub struct Movement {
    targets: Vec<DefenseTarget>,
}

impl Movement {
    /// Creates a movement system with an empty defense workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits exactly one `Command::DirectEnemy` for every enemy in the view,
    /// in ascending identifier order.
    ///
    /// The nearest live defense is chosen fresh every call by centre-to-centre
    /// pixel distance. Enemies within reach strike it; the rest take one greedy
    /// step toward its closest footprint tile, or hold when boxed in.
    pub fn handle(
        &mut self,
        enemies: &EnemyView,
        defenses: &DefenseView,
        occupancy: OccupancyView<'_>,
        tile_length: f32,
        tuning: &Tuning,
        out: &mut Vec<Command>,
    ) {
        self.prepare_targets(defenses, tile_length);
        out.reserve(enemies.len());

        for enemy in enemies.iter() {
            out.push(Command::DirectEnemy {
                enemy: enemy.id,
                intent: self.decide(enemy, occupancy, tuning),
            });
        }
    }

    fn prepare_targets(&mut self, defenses: &DefenseView, tile_length: f32) {
        self.targets.clear();

        for snapshot in defenses.iter() {
            if snapshot.is_destroying || snapshot.health == 0 {
                continue;
            }
            let size = snapshot.region.size();
            let extent = size.width().max(size.height()) as f32;
            self.targets.push(DefenseTarget {
                id: snapshot.id,
                region: snapshot.region,
                center: snapshot.center,
                radius: extent * tile_length / 2.0,
            });
        }
    }

    fn decide(
        &self,
        enemy: &EnemySnapshot,
        occupancy: OccupancyView<'_>,
        tuning: &Tuning,
    ) -> EnemyIntent {
        if !enemy.is_alive() {
            return EnemyIntent::Hold;
        }
        let Some(target) = nearest_target(&self.targets, enemy.position) else {
            return EnemyIntent::Hold;
        };

        if target.within_reach(enemy, tuning) {
            return EnemyIntent::Strike {
                defense: target.id,
            };
        }

        let goal = target.closest_tile(enemy.cell);
        match next_step(enemy.cell, goal, occupancy) {
            Some(destination) => EnemyIntent::Advance { destination },
            None => EnemyIntent::Hold,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DefenseTarget {
    id: DefenseId,
    region: CellRect,
    center: Vec2,
    radius: f32,
}

impl DefenseTarget {
    fn within_reach(&self, enemy: &EnemySnapshot, tuning: &Tuning) -> bool {
        let reach = tuning.enemy_radius + self.radius + tuning.reach_margin;
        enemy.position.distance(self.center) <= reach || self.region.touches(enemy.cell)
    }

    fn closest_tile(&self, from: CellCoord) -> CellCoord {
        self.region
            .cells()
            .min_by_key(|tile| tile.distance_squared(from))
            .unwrap_or_else(|| self.region.origin())
    }
}

fn nearest_target(targets: &[DefenseTarget], position: Vec2) -> Option<&DefenseTarget> {
    let mut best: Option<(&DefenseTarget, f32)> = None;
    for target in targets {
        let distance = target.center.distance_squared(position);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((target, distance)),
        }
    }
    best.map(|(target, _)| target)
}

/// Greedy single-tile step from `from` toward `goal`.
///
/// The axis with the larger remaining delta is tried first, then the
/// perpendicular one. When both are blocked the enemy settles for whichever of
/// its free neighbours and its own tile lies closest to the goal; `None` means
/// staying put won, ties included.
fn next_step(from: CellCoord, goal: CellCoord, occupancy: OccupancyView<'_>) -> Option<CellCoord> {
    let delta_column = goal.column() - from.column();
    let delta_row = goal.row() - from.row();
    if delta_column == 0 && delta_row == 0 {
        return None;
    }

    let horizontal = (delta_column != 0).then(|| from.offset(delta_column.signum(), 0));
    let vertical = (delta_row != 0).then(|| from.offset(0, delta_row.signum()));
    let (primary, secondary) = if delta_column.abs() >= delta_row.abs() {
        (horizontal, vertical)
    } else {
        (vertical, horizontal)
    };

    for candidate in [primary, secondary].into_iter().flatten() {
        if !occupancy.is_occupied(candidate) {
            return Some(candidate);
        }
    }

    let mut best = (from, from.distance_squared(goal));
    for (column, row) in NEIGHBOR_OFFSETS {
        let candidate = from.offset(column, row);
        if occupancy.is_occupied(candidate) {
            continue;
        }
        let distance = candidate.distance_squared(goal);
        if distance < best.1 {
            best = (candidate, distance);
        }
    }
    (best.0 != from).then_some(best.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{
        CellRectSize, DefenseKind, DefenseSnapshot, EnemyId, EnemyKind, EnemyPhase,
    };

    const TILE: f32 = 40.0;

    fn grid(columns: u32, rows: u32, blocked: &[CellCoord]) -> Vec<bool> {
        let mut cells = vec![false; (columns * rows) as usize];
        for cell in blocked {
            cells[(cell.row() as u32 * columns + cell.column() as u32) as usize] = true;
        }
        cells
    }

    fn defense(id: u32, origin: CellCoord, size: u32) -> DefenseSnapshot {
        let region = CellRect::from_origin_and_size(origin, CellRectSize::new(size, size));
        DefenseSnapshot {
            id: DefenseId::new(id),
            kind: if size == 1 {
                DefenseKind::Wall
            } else {
                DefenseKind::MainTower
            },
            region,
            center: region.center(TILE),
            level: 1,
            health: 100,
            max_health: 100,
            upgrade_cost: 20,
            sell_value: 5,
            is_destroying: false,
            tower: None,
        }
    }

    fn enemy(id: u32, cell: CellCoord) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Zombie,
            cell,
            position: cell.center(TILE),
            health: 100.0,
            max_health: 100.0,
            phase: EnemyPhase::Moving,
        }
    }

    fn run(
        enemies: Vec<EnemySnapshot>,
        defenses: Vec<DefenseSnapshot>,
        cells: &[bool],
        columns: u32,
        rows: u32,
    ) -> Vec<Command> {
        let mut movement = Movement::new();
        let mut out = Vec::new();
        movement.handle(
            &EnemyView::from_snapshots(enemies),
            &DefenseView::from_snapshots(defenses),
            OccupancyView::new(cells, columns, rows),
            TILE,
            &Tuning::default(),
            &mut out,
        );
        out
    }

    fn intent_of(commands: &[Command], id: u32) -> EnemyIntent {
        commands
            .iter()
            .find_map(|command| match command {
                Command::DirectEnemy { enemy, intent } if *enemy == EnemyId::new(id) => {
                    Some(*intent)
                }
                _ => None,
            })
            .expect("enemy received an intent")
    }

    #[test]
    fn larger_delta_axis_is_tried_first() {
        let cells = grid(10, 10, &[]);
        let view = OccupancyView::new(&cells, 10, 10);

        assert_eq!(
            next_step(CellCoord::new(0, 1), CellCoord::new(5, 3), view),
            Some(CellCoord::new(1, 1))
        );
        assert_eq!(
            next_step(CellCoord::new(4, 0), CellCoord::new(5, 6), view),
            Some(CellCoord::new(4, 1))
        );
    }

    #[test]
    fn blocked_primary_axis_falls_back_to_perpendicular() {
        let cells = grid(10, 10, &[CellCoord::new(1, 1)]);
        let view = OccupancyView::new(&cells, 10, 10);

        assert_eq!(
            next_step(CellCoord::new(0, 1), CellCoord::new(5, 3), view),
            Some(CellCoord::new(0, 2))
        );
    }

    #[test]
    fn blocked_straight_line_holds_when_every_sidestep_is_farther() {
        let cells = grid(10, 10, &[CellCoord::new(4, 5)]);
        let view = OccupancyView::new(&cells, 10, 10);

        assert_eq!(
            next_step(CellCoord::new(4, 6), CellCoord::new(4, 1), view),
            None
        );
    }

    #[test]
    fn diagonal_approach_with_both_axes_walled_holds() {
        let cells = grid(10, 10, &[CellCoord::new(5, 5), CellCoord::new(4, 4)]);
        let view = OccupancyView::new(&cells, 10, 10);

        assert_eq!(
            next_step(CellCoord::new(4, 5), CellCoord::new(6, 3), view),
            None
        );
    }

    #[test]
    fn walled_enemy_is_told_to_hold() {
        let wall = CellCoord::new(4, 5);
        let cells = grid(10, 10, &[wall, CellCoord::new(4, 1)]);
        let commands = run(
            vec![enemy(0, CellCoord::new(4, 6))],
            vec![defense(0, CellCoord::new(4, 1), 1)],
            &cells,
            10,
            10,
        );

        assert_eq!(intent_of(&commands, 0), EnemyIntent::Hold);
    }

    #[test]
    fn boxed_in_enemy_holds() {
        let from = CellCoord::new(0, 0);
        let cells = grid(10, 10, &[CellCoord::new(1, 0), CellCoord::new(0, 1)]);
        let view = OccupancyView::new(&cells, 10, 10);

        assert_eq!(next_step(from, CellCoord::new(5, 5), view), None);
    }

    #[test]
    fn nearest_defense_is_struck_when_adjacent() {
        let wall = CellCoord::new(3, 3);
        let cells = grid(20, 15, &[wall, CellCoord::new(10, 7)]);
        let commands = run(
            vec![enemy(0, CellCoord::new(4, 4))],
            vec![
                defense(0, CellCoord::new(10, 7), 2),
                defense(1, wall, 1),
            ],
            &cells,
            20,
            15,
        );

        assert_eq!(
            intent_of(&commands, 0),
            EnemyIntent::Strike {
                defense: DefenseId::new(1)
            }
        );
    }

    #[test]
    fn distant_enemy_steps_toward_the_closest_footprint_tile() {
        let origin = CellCoord::new(10, 7);
        let footprint = [
            origin,
            CellCoord::new(11, 7),
            CellCoord::new(10, 8),
            CellCoord::new(11, 8),
        ];
        let cells = grid(20, 15, &footprint);
        let commands = run(
            vec![enemy(0, CellCoord::new(19, 8))],
            vec![defense(0, origin, 2)],
            &cells,
            20,
            15,
        );

        assert_eq!(
            intent_of(&commands, 0),
            EnemyIntent::Advance {
                destination: CellCoord::new(18, 8)
            }
        );
    }

    #[test]
    fn collapsing_defenses_are_ignored() {
        let cells = grid(20, 15, &[]);
        let mut collapsing = defense(1, CellCoord::new(3, 3), 1);
        collapsing.is_destroying = true;
        let commands = run(
            vec![enemy(0, CellCoord::new(4, 4))],
            vec![defense(0, CellCoord::new(10, 7), 2), collapsing],
            &cells,
            20,
            15,
        );

        assert_eq!(
            intent_of(&commands, 0),
            EnemyIntent::Advance {
                destination: CellCoord::new(5, 4)
            }
        );
    }

    #[test]
    fn every_enemy_receives_exactly_one_intent() {
        let cells = grid(20, 15, &[]);
        let mut corpse = enemy(3, CellCoord::new(0, 0));
        corpse.health = 0.0;
        let commands = run(
            vec![enemy(7, CellCoord::new(1, 1)), corpse, enemy(5, CellCoord::new(2, 2))],
            Vec::new(),
            &cells,
            20,
            15,
        );

        let ids: Vec<_> = commands
            .iter()
            .map(|command| match command {
                Command::DirectEnemy { enemy, intent } => {
                    assert_eq!(*intent, EnemyIntent::Hold);
                    enemy.get()
                }
                other => panic!("unexpected command {other:?}"),
            })
            .collect();
        assert_eq!(ids, vec![3, 5, 7]);
    }

    #[test]
    fn equidistant_defenses_resolve_to_the_lower_id() {
        let targets = [
            DefenseTarget {
                id: DefenseId::new(2),
                region: CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(1, 1)),
                center: Vec2::new(20.0, 100.0),
                radius: 20.0,
            },
            DefenseTarget {
                id: DefenseId::new(4),
                region: CellRect::from_origin_and_size(CellCoord::new(9, 0), CellRectSize::new(1, 1)),
                center: Vec2::new(180.0, 100.0),
                radius: 20.0,
            },
        ];

        let nearest = nearest_target(&targets, Vec2::new(100.0, 100.0)).map(|target| target.id);
        assert_eq!(nearest, Some(DefenseId::new(2)));
    }
}
