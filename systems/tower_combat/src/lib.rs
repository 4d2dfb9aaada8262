#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns tower targets into firing orders.
//!
//! A tower fires when it is standing, its fire timer has run out and the
//! targeting pass handed it an enemy this tick. Both inputs arrive ordered by
//! defense id, so the two lists are walked side by side.

use bastion_core::{Command, DefenseSnapshot, DefenseView, TowerTarget};

/// Tower combat system that issues `Command::FireProjectile` orders.
#[derive(Debug, Default)]
pub struct TowerCombat;

impl TowerCombat {
    /// Creates a new tower combat system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Appends one firing order per armed tower in `tower_targets`.
    ///
    /// `tower_targets` must be sorted by tower, which is the order the
    /// targeting system emits them in.
    pub fn handle(
        &mut self,
        defenses: &DefenseView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        debug_assert!(tower_targets
            .windows(2)
            .all(|pair| pair[0].tower < pair[1].tower));

        let mut armed = defenses.iter().filter(|defense| is_armed(defense)).peekable();
        for target in tower_targets {
            while armed.next_if(|defense| defense.id < target.tower).is_some() {}
            if armed.next_if(|defense| defense.id == target.tower).is_some() {
                out.push(Command::FireProjectile {
                    tower: target.tower,
                    target: target.enemy,
                });
            }
        }
    }
}

fn is_armed(defense: &DefenseSnapshot) -> bool {
    !defense.is_destroying
        && defense.health > 0
        && defense
            .tower
            .is_some_and(|tower| tower.ready_in.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{
        CellCoord, CellRect, CellRectSize, DefenseId, DefenseKind, EnemyId, TowerSnapshot,
    };
    use glam::Vec2;
    use std::time::Duration;

    fn cannon(id: u32, ready_in: Duration) -> DefenseSnapshot {
        DefenseSnapshot {
            id: DefenseId::new(id),
            kind: DefenseKind::Cannon,
            region: CellRect::from_origin_and_size(
                CellCoord::new(id as i32, 0),
                CellRectSize::new(1, 1),
            ),
            center: Vec2::ZERO,
            level: 1,
            health: 250,
            max_health: 250,
            upgrade_cost: 40,
            sell_value: 25,
            is_destroying: false,
            tower: Some(TowerSnapshot {
                range: 4.0,
                damage: 20,
                fire_rate: 0.8,
                barrel_angle: 0.0,
                target: None,
                projectiles: 0,
                ready_in,
            }),
        }
    }

    fn target(tower: u32, enemy: u32) -> TowerTarget {
        TowerTarget {
            tower: DefenseId::new(tower),
            enemy: EnemyId::new(enemy),
            tower_center: Vec2::ZERO,
            enemy_position: Vec2::ZERO,
        }
    }

    fn fire(tower: u32, enemy: u32) -> Command {
        Command::FireProjectile {
            tower: DefenseId::new(tower),
            target: EnemyId::new(enemy),
        }
    }

    fn run(defenses: Vec<DefenseSnapshot>, targets: &[TowerTarget]) -> Vec<Command> {
        let mut out = Vec::new();
        TowerCombat::new().handle(&DefenseView::from_snapshots(defenses), targets, &mut out);
        out
    }

    #[test]
    fn ready_towers_with_targets_fire_in_id_order() {
        let out = run(
            vec![cannon(5, Duration::ZERO), cannon(2, Duration::ZERO)],
            &[target(2, 4), target(5, 1)],
        );

        assert_eq!(out, vec![fire(2, 4), fire(5, 1)]);
    }

    #[test]
    fn idle_towers_hold_fire() {
        assert!(run(vec![cannon(1, Duration::ZERO)], &[]).is_empty());
    }

    #[test]
    fn reloading_collapsing_and_unknown_towers_are_skipped() {
        let collapsing = DefenseSnapshot {
            is_destroying: true,
            ..cannon(4, Duration::ZERO)
        };
        let out = run(
            vec![
                cannon(3, Duration::from_millis(250)),
                collapsing,
                cannon(8, Duration::ZERO),
            ],
            &[target(3, 9), target(4, 7), target(8, 2), target(42, 3)],
        );

        assert_eq!(out, vec![fire(8, 2)]);
    }

    #[test]
    fn walls_never_fire_even_when_listed() {
        let wall = DefenseSnapshot {
            kind: DefenseKind::Wall,
            tower: None,
            ..cannon(1, Duration::ZERO)
        };

        assert_eq!(
            run(vec![wall, cannon(6, Duration::ZERO)], &[target(1, 1), target(6, 2)]),
            vec![fire(6, 2)]
        );
    }
}
