#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bastion engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

mod catalog;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use catalog::{
    rate_period, Catalog, CatalogError, DefenseProfile, EnemyProfile, ProjectileProfile,
    ProjectileShape, RegenProfile, TowerProfile, Tuning, UpgradeProfile,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Bastion.";

/// Highest level any defense may be upgraded to.
pub const MAX_DEFENSE_LEVEL: u32 = 3;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock and runs the defense phase of a tick.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests construction of a defense anchored at the provided origin cell.
    PlaceDefense {
        /// Type of defense to construct.
        kind: DefenseKind,
        /// Upper-left cell that defines the defense footprint.
        origin: CellCoord,
    },
    /// Requests that a defense be upgraded by one level.
    UpgradeDefense {
        /// Identifier of the defense to upgrade.
        defense: DefenseId,
    },
    /// Requests that a defense be sold for half of its accumulated value.
    SellDefense {
        /// Identifier of the defense to sell.
        defense: DefenseId,
    },
    /// Requests removal of a defense without any refund.
    RemoveDefense {
        /// Identifier of the defense to remove.
        defense: DefenseId,
    },
    /// Points a tower at the provided enemy, or clears its target.
    AimTower {
        /// Tower being aimed.
        tower: DefenseId,
        /// Enemy selected by targeting, if any was in range.
        target: Option<EnemyId>,
    },
    /// Requests that a tower launch a projectile at its target.
    FireProjectile {
        /// Tower that should fire.
        tower: DefenseId,
        /// Enemy the projectile will seek.
        target: EnemyId,
    },
    /// Advances a single enemy by one tick using the supplied intent.
    DirectEnemy {
        /// Enemy being driven.
        enemy: EnemyId,
        /// Decision computed by the movement system.
        intent: EnemyIntent,
    },
    /// Announces that the spawner opened a new wave.
    BeginWave {
        /// One-based wave number.
        wave: u32,
        /// Number of enemies the wave will spawn.
        enemies: u32,
    },
    /// Requests that an enemy be created on the provided cell.
    SpawnEnemy {
        /// Type of enemy to create.
        kind: EnemyKind,
        /// Cell the enemy appears on.
        cell: CellCoord,
        /// Factor applied to the kind's base health.
        health_multiplier: f32,
    },
    /// Reaps enemies whose health reached zero and pays out their rewards.
    CollectCasualties,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a defense was placed into the world.
    DefensePlaced {
        /// Identifier assigned to the defense by the world.
        defense: DefenseId,
        /// Type of defense that was placed.
        kind: DefenseKind,
        /// Region of cells occupied by the defense.
        region: CellRect,
        /// Gold deducted for the construction.
        cost: u32,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Type of defense requested for placement.
        kind: DefenseKind,
        /// Origin cell provided in the placement request.
        origin: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a defense gained a level.
    DefenseUpgraded {
        /// Identifier of the upgraded defense.
        defense: DefenseId,
        /// Level reached after the upgrade.
        level: u32,
        /// Gold deducted for the upgrade.
        cost: u32,
    },
    /// Reports that an upgrade request was rejected.
    UpgradeRejected {
        /// Identifier of the defense targeted by the request.
        defense: DefenseId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a defense was sold.
    DefenseSold {
        /// Identifier of the defense that was sold.
        defense: DefenseId,
        /// Gold credited to the player.
        refund: u32,
    },
    /// Reports that a sale request was rejected.
    SaleRejected {
        /// Identifier of the defense targeted by the request.
        defense: DefenseId,
        /// Specific reason the sale failed.
        reason: SaleError,
    },
    /// Announces that a defense ran out of health and started collapsing.
    DefenseDestroyed {
        /// Identifier of the collapsing defense.
        defense: DefenseId,
        /// Type of the collapsing defense.
        kind: DefenseKind,
    },
    /// Confirms that a defense left the world and released its tiles.
    DefenseRemoved {
        /// Identifier of the removed defense.
        defense: DefenseId,
        /// Region of cells previously occupied by the defense.
        region: CellRect,
    },
    /// Reports that a removal request was rejected.
    RemovalRejected {
        /// Identifier of the defense targeted by the request.
        defense: DefenseId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Tower that fired.
        tower: DefenseId,
        /// Enemy the projectile seeks.
        target: EnemyId,
        /// Type of projectile launched.
        kind: ProjectileKind,
    },
    /// Reports damage dealt to an enemy by a projectile.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Amount of health removed before clamping.
        amount: f32,
        /// Indicates whether the damage came from splash.
        splash: bool,
    },
    /// Confirms that an enemy entered the map.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Type of the enemy.
        kind: EnemyKind,
        /// Cell the enemy spawned on.
        cell: CellCoord,
    },
    /// Reports a melee strike landing on a defense.
    EnemyStruck {
        /// Enemy that attacked.
        enemy: EnemyId,
        /// Defense that absorbed the strike.
        defense: DefenseId,
        /// Damage dealt by the strike.
        damage: u32,
    },
    /// Confirms that a dead enemy was reaped.
    EnemyKilled {
        /// Identifier of the reaped enemy.
        enemy: EnemyId,
        /// Type of the reaped enemy.
        kind: EnemyKind,
        /// Gold credited for the kill.
        gold: u32,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Number of enemies the wave will spawn.
        enemies: u32,
    },
    /// Announces that the main tower fell.
    GameOver {
        /// Wave that was active when the base fell.
        wave: u32,
        /// Final score.
        score: u32,
    },
}

/// Location of a single grid tile expressed as column and row coordinates.
///
/// Coordinates are signed so that neighbours of edge tiles can be expressed
/// and rejected by bounds checks instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the cell displaced by the provided column and row deltas.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self::new(self.column + columns, self.row + rows)
    }

    /// Squared Euclidean distance between two cells measured in tiles.
    #[must_use]
    pub fn distance_squared(self, other: CellCoord) -> i64 {
        let dc = i64::from(self.column) - i64::from(other.column);
        let dr = i64::from(self.row) - i64::from(other.row);
        dc * dc + dr * dr
    }

    /// Pixel position of the centre of the cell.
    #[must_use]
    pub fn center(self, tile_length: f32) -> Vec2 {
        Vec2::new(
            (self.column as f32 + 0.5) * tile_length,
            (self.row as f32 + 0.5) * tile_length,
        )
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = i64::from(cell.column()) - i64::from(self.origin.column());
        let row = i64::from(cell.row()) - i64::from(self.origin.row());
        column >= 0
            && row >= 0
            && column < i64::from(self.size.width())
            && row < i64::from(self.size.height())
    }

    /// Reports whether the cell is inside the rectangle or touches it,
    /// diagonals included.
    #[must_use]
    pub fn touches(&self, cell: CellCoord) -> bool {
        self.cells().any(|tile| {
            cell.column().abs_diff(tile.column()) <= 1 && cell.row().abs_diff(tile.row()) <= 1
        })
    }

    /// Iterates over every cell covered by the rectangle in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let width = self.size.width() as i32;
        let height = self.size.height() as i32;
        (0..height).flat_map(move |row| (0..width).map(move |column| origin.offset(column, row)))
    }

    /// Pixel position of the rectangle's centre.
    #[must_use]
    pub fn center(&self, tile_length: f32) -> Vec2 {
        Vec2::new(
            (self.origin.column() as f32 + self.size.width() as f32 / 2.0) * tile_length,
            (self.origin.row() as f32 + self.size.height() as f32 / 2.0) * tile_length,
        )
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Unique identifier assigned to a defense. Identifiers are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefenseId(u32);

impl DefenseId {
    /// Creates a new defense identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy. Identifiers are never reused, so a
/// stale handle simply fails to resolve once its enemy has been reaped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Types of defenses that can exist on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseKind {
    /// The base. Placed once by the world and never purchasable or sellable.
    MainTower,
    /// Slow-firing tower whose shots splash nearby enemies.
    Cannon,
    /// Long-range tower whose shots pierce several enemies.
    Sniper,
    /// Passive blocker that soaks melee damage.
    Wall,
}

impl DefenseKind {
    /// Kinds the player may construct.
    pub const PURCHASABLE: [Self; 3] = [Self::Cannon, Self::Sniper, Self::Wall];

    /// Reports whether the player may construct the kind.
    #[must_use]
    pub const fn is_purchasable(self) -> bool {
        !matches!(self, Self::MainTower)
    }

    /// Projectile launched by the kind, if it fires at all.
    #[must_use]
    pub const fn projectile(self) -> Option<ProjectileKind> {
        match self {
            Self::MainTower => Some(ProjectileKind::MainTower),
            Self::Cannon => Some(ProjectileKind::Cannon),
            Self::Sniper => Some(ProjectileKind::Sniper),
            Self::Wall => None,
        }
    }
}

/// Types of enemies the spawner can create.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Baseline walker.
    Zombie,
    /// Fast and fragile.
    Runner,
    /// Slow and sturdy.
    Tank,
    /// Spawned exclusively on every tenth wave.
    Boss,
}

/// Types of projectiles launched by towers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    /// Splashing cannon ball.
    Cannon,
    /// Piercing sniper round.
    Sniper,
    /// Baseline shot fired by the main tower.
    MainTower,
}

/// Decision computed for a single enemy during the enemy phase of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyIntent {
    /// Walk toward the centre of the provided neighbouring cell.
    Advance {
        /// Cell the enemy should step onto.
        destination: CellCoord,
    },
    /// Stay put; the enemy is out of reach of any defense and cannot step.
    Hold,
    /// The enemy is within reach of the provided defense.
    Strike {
        /// Defense that should absorb the strike once the cooldown allows it.
        defense: DefenseId,
    },
}

/// Animation phase of an enemy's melee cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyPhase {
    /// Walking along its path, or idling in place.
    Moving,
    /// Dashing toward the struck defense.
    Attacking,
    /// Returning to the position it struck from.
    Recoiling,
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested kind cannot be constructed by the player.
    #[error("this defense cannot be purchased")]
    NotPurchasable,
    /// The player cannot afford the construction.
    #[error("insufficient gold: need {required}, have {available}")]
    InsufficientFunds {
        /// Gold required by the construction.
        required: u32,
        /// Gold currently available.
        available: u32,
    },
    /// The requested region extends beyond the configured grid bounds.
    #[error("footprint extends beyond the map")]
    OutOfBounds,
    /// The requested footprint overlaps an occupied cell.
    #[error("footprint overlaps an existing defense")]
    Occupied,
    /// The game already ended.
    #[error("the game is over")]
    GameOver,
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// No defense with the provided identifier exists.
    #[error("no such defense")]
    MissingDefense,
    /// The defense already reached the maximum level.
    #[error("defense is already at the maximum level")]
    MaxLevel,
    /// The defense is collapsing and can no longer be upgraded.
    #[error("defense is being destroyed")]
    Destroying,
    /// The player cannot afford the upgrade.
    #[error("insufficient gold: need {required}, have {available}")]
    InsufficientFunds {
        /// Gold required by the upgrade.
        required: u32,
        /// Gold currently available.
        available: u32,
    },
    /// The game already ended.
    #[error("the game is over")]
    GameOver,
}

/// Reasons a sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SaleError {
    /// No defense with the provided identifier exists.
    #[error("no such defense")]
    MissingDefense,
    /// The main tower can never be sold.
    #[error("the main tower cannot be sold")]
    MainTower,
    /// The defense is collapsing and is worth nothing.
    #[error("defense is being destroyed")]
    Destroying,
    /// The game already ended.
    #[error("the game is over")]
    GameOver,
}

/// Reasons a removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RemovalError {
    /// No defense with the provided identifier exists.
    #[error("no such defense")]
    MissingDefense,
    /// The main tower can never be removed.
    #[error("the main tower cannot be removed")]
    MainTower,
}

/// Immutable representation of a single defense used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefenseSnapshot {
    /// Identifier allocated to the defense by the world.
    pub id: DefenseId,
    /// Kind of defense that was constructed.
    pub kind: DefenseKind,
    /// Region of cells occupied by the defense.
    pub region: CellRect,
    /// Pixel position of the footprint centre.
    pub center: Vec2,
    /// Current level, starting at one.
    pub level: u32,
    /// Remaining health.
    pub health: u32,
    /// Maximum health at the current level.
    pub max_health: u32,
    /// Gold required for the next upgrade.
    pub upgrade_cost: u32,
    /// Gold credited if the defense were sold now.
    pub sell_value: u32,
    /// Indicates whether the defense is collapsing.
    pub is_destroying: bool,
    /// Tower-specific state, absent for walls.
    pub tower: Option<TowerSnapshot>,
}

/// Tower-specific portion of a [`DefenseSnapshot`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Targeting range measured in tiles.
    pub range: f32,
    /// Damage carried by each projectile.
    pub damage: u32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Current barrel orientation in radians within `[0, 2π)`.
    pub barrel_angle: f32,
    /// Enemy the tower is currently aiming at.
    pub target: Option<EnemyId>,
    /// Number of projectiles in flight.
    pub projectiles: usize,
    /// Time until the fire timer runs out.
    pub ready_in: Duration,
}

/// Read-only snapshot describing all defenses on the map.
#[derive(Clone, Debug, Default)]
pub struct DefenseView {
    snapshots: Vec<DefenseSnapshot>,
}

impl DefenseView {
    /// Creates a new defense view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DefenseSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured defense snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &DefenseSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single defense.
    #[must_use]
    pub fn get(&self, id: DefenseId) -> Option<&DefenseSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DefenseSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Type of the enemy.
    pub kind: EnemyKind,
    /// Grid cell the enemy is anchored to.
    pub cell: CellCoord,
    /// Pixel position, including any attack animation offset.
    pub position: Vec2,
    /// Remaining health.
    pub health: f32,
    /// Health at spawn after wave scaling.
    pub max_health: f32,
    /// Current phase of the melee animation cycle.
    pub phase: EnemyPhase,
}

impl EnemySnapshot {
    /// Reports whether the enemy still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// Read-only snapshot describing all enemies on the map.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Tower that launched the projectile.
    pub tower: DefenseId,
    /// Type of the projectile.
    pub kind: ProjectileKind,
    /// Pixel position of the projectile.
    pub position: Vec2,
    /// Direction of travel in radians.
    pub heading: f32,
}

/// Target selected for a tower during the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: DefenseId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Pixel position of the tower's centre.
    pub tower_center: Vec2,
    /// Pixel position of the targeted enemy.
    pub enemy_position: Vec2,
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [bool],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major cells.
    #[must_use]
    pub fn new(cells: &'a [bool], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Reports whether the cell is covered by a defense. Cells outside the
    /// grid always read as occupied.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(true, |index| self.cells.get(index).copied().unwrap_or(true))
    }

    /// Reports whether every cell of the region is inside the grid and free.
    #[must_use]
    pub fn can_place(&self, region: CellRect) -> bool {
        region.cells().all(|cell| !self.is_occupied(cell))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column < self.columns && row < self.rows {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Player resources tracked by the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    /// Gold available for construction and upgrades.
    pub gold: u32,
    /// Accumulated score.
    pub score: u32,
}

/// Computes the refund for a defense worth `total_value` gold.
#[must_use]
pub const fn sell_value(total_value: u32) -> u32 {
    total_value / 2
}
