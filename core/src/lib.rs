#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Critter Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

pub mod config;

use std::{fmt, time::Duration};

pub use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::PresetMap;

/// Highest level a tower can be upgraded to.
pub const MAX_TOWER_LEVEL: u32 = 5;

/// Upper bound applied to the player's cash balance.
pub const MAX_CASH: u32 = 9_999_999;

/// Describes the active gameplay mode for the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// No session is running; the map editor accepts cell edits.
    Editor,
    /// A session is running on a built path and critters may attack.
    Attack,
    /// The player ran out of lives; everything was torn down.
    GameOver,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the editor grid with an all-scenery grid of the given size.
    ///
    /// The world clamps the dimensions to the configured bounds.
    ConfigureEditorGrid {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
    /// Reclassifies a single editor cell.
    EditCell {
        /// Cell to reclassify.
        cell: CellCoord,
        /// New classification for the cell.
        kind: CellKind,
    },
    /// Validates the editor grid and launches a session on the resulting path.
    BuildEditorMap {
        /// Which of the two endpoint candidates becomes the start.
        start: EndpointChoice,
    },
    /// Launches a session on a predefined path.
    LoadPresetMap {
        /// Preset describing the grid size and ordered path cells.
        map: PresetMap,
    },
    /// Tears down the running session and returns to the editor.
    EndSession,
    /// Requests that the next wave begins spawning.
    StartWave,
    /// Requests that a critter of the provided kind enters at the spawn point.
    SpawnCritter {
        /// Variant of critter to spawn.
        kind: CritterKind,
    },
    /// Requests placement of a tower on a scenery cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell that will host the tower.
        cell: CellCoord,
    },
    /// Requests that a tower is sold back for its sell price.
    SellTower {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
    /// Requests that a tower is upgraded by one level.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Marks a tower as the single selected tower.
    SelectTower {
        /// Identifier of the tower to select.
        tower: TowerId,
    },
    /// Clears the current tower selection.
    DeselectAll,
    /// Requests that a tower fires a projectile at a critter.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Critter the projectile will chase.
        target: CritterId,
    },
    /// Advances frame-rate bound timers such as slow effects.
    FrameTick {
        /// Duration of simulated time since the previous frame tick.
        dt: Duration,
    },
    /// Advances the fixed-step simulation: movement, cooldowns and projectiles.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the fixed-step simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Indicates that frame-bound timers advanced.
    FrameAdvanced {
        /// Duration of simulated time that elapsed in the frame.
        dt: Duration,
    },
    /// Announces that the simulation entered a new play mode.
    PlayModeChanged {
        /// Mode that became active after processing commands.
        mode: PlayMode,
    },
    /// Confirms that a fresh editor grid was created.
    EditorGridConfigured {
        /// Number of columns after clamping.
        columns: u32,
        /// Number of rows after clamping.
        rows: u32,
    },
    /// Confirms that an editor cell changed classification.
    CellEdited {
        /// Cell that changed.
        cell: CellCoord,
        /// Classification now applied to the cell.
        kind: CellKind,
    },
    /// Reports that an editor cell edit was rejected.
    CellEditRejected {
        /// Cell targeted by the edit.
        cell: CellCoord,
        /// Specific reason the edit failed.
        reason: EditError,
    },
    /// Confirms that a path was built and a session started on it.
    MapBuilt {
        /// First cell of the path.
        start: CellCoord,
        /// Last cell of the path.
        end: CellCoord,
        /// Number of cells in the path.
        length: usize,
    },
    /// Reports that a map build request was rejected.
    MapRejected {
        /// Specific reason the build failed.
        reason: PathGraphError,
    },
    /// Confirms that the economy and wave state were reset for a new session.
    SessionStarted {
        /// Starting cash balance.
        cash: u32,
        /// Starting number of lives.
        lives: u32,
    },
    /// Confirms that the running session was torn down on request.
    SessionEnded,
    /// Announces that the player ran out of lives.
    GameLost {
        /// Wave level that was active when the game was lost.
        level: u32,
    },
    /// Confirms that a wave began spawning.
    WaveStarted {
        /// Level of the wave.
        level: u32,
        /// Number of critters the wave will spawn.
        spawn_amount: u32,
    },
    /// Reports that a wave start request was rejected.
    WaveStartRejected {
        /// Specific reason the request failed.
        reason: WaveError,
    },
    /// Announces that every critter of the current wave has been spawned.
    WaveSpawningFinished {
        /// Level of the wave.
        level: u32,
    },
    /// Announces that every critter of a wave was killed or leaked.
    WaveCompleted {
        /// Level of the completed wave.
        level: u32,
        /// Level the next wave will run at.
        next_level: u32,
    },
    /// Confirms that a critter entered the map.
    CritterSpawned {
        /// Identifier assigned to the critter.
        critter: CritterId,
        /// Variant of the critter.
        kind: CritterKind,
        /// Spawn position in world units.
        position: Vec2,
    },
    /// Confirms that a critter moved on to its next waypoint.
    CritterAdvanced {
        /// Identifier of the critter.
        critter: CritterId,
        /// Index of the waypoint the critter now targets.
        waypoint: usize,
    },
    /// Confirms that a critter survived a hit.
    CritterDamaged {
        /// Identifier of the critter.
        critter: CritterId,
        /// Damage applied by the hit.
        damage: f32,
        /// Health left after the hit.
        remaining: f32,
    },
    /// Confirms that a slow effect started on a critter.
    CritterSlowed {
        /// Identifier of the critter.
        critter: CritterId,
        /// Fraction of speed removed by the effect.
        magnitude: f32,
    },
    /// Confirms that a slow effect ran out.
    CritterSlowExpired {
        /// Identifier of the critter.
        critter: CritterId,
    },
    /// Confirms that a critter was killed.
    CritterKilled {
        /// Identifier of the critter.
        critter: CritterId,
        /// Cash credited to the player.
        reward: u32,
    },
    /// Confirms that a critter reached the exit.
    CritterLeaked {
        /// Identifier of the critter.
        critter: CritterId,
        /// Lives left after the leak.
        lives_remaining: u32,
    },
    /// Reports the player's cash balance after any change.
    CashChanged {
        /// New cash balance.
        cash: u32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell hosting the tower.
        cell: CellCoord,
        /// Price debited for the tower.
        price: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower gained a level.
    TowerUpgraded {
        /// Identifier of the tower.
        tower: TowerId,
        /// Level reached by the upgrade.
        level: u32,
        /// Cash debited for the upgrade.
        cost: u32,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Identifier of the tower.
        tower: TowerId,
        /// Cash credited for the sale.
        refund: u32,
    },
    /// Reports that a sell, upgrade or select request was rejected.
    TowerActionRejected {
        /// Identifier of the tower targeted by the request.
        tower: TowerId,
        /// Specific reason the request failed.
        reason: TowerActionError,
    },
    /// Confirms that a tower became the selected tower.
    TowerSelected {
        /// Identifier of the selected tower.
        tower: TowerId,
    },
    /// Confirms that no tower is selected anymore.
    SelectionCleared,
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Critter the projectile chases.
        target: CritterId,
    },
    /// Confirms that a projectile reached its target and resolved damage.
    ProjectileImpacted {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Critter that was hit directly.
        target: CritterId,
        /// Number of other critters hit by splash damage.
        splashed: u32,
    },
    /// Confirms that a projectile vanished because its target no longer exists.
    ProjectileFizzled {
        /// Identifier of the projectile.
        projectile: ProjectileId,
    },
}

/// Classification of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Empty terrain that may host a tower.
    Scenery,
    /// Part of the critter route.
    Path,
    /// Path endpoint where critters enter.
    Start,
    /// Path endpoint where critters leave.
    End,
}

impl CellKind {
    /// Reports whether the cell belongs to the critter route.
    #[must_use]
    pub const fn is_path(self) -> bool {
        !matches!(self, Self::Scenery)
    }
}

/// Selects which validator endpoint candidate becomes the path start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointChoice {
    /// The first candidate in scan order is the start.
    First,
    /// The second candidate in scan order is the start.
    Second,
}

/// Variants of critters that waves may spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CritterKind {
    /// Baseline critter.
    Normal,
    /// Quick, fragile critter.
    Fast,
    /// Slow critter with a large health pool.
    Tank,
}

impl CritterKind {
    /// Selects the variant spawned by waves at the provided level.
    ///
    /// Multiples of three spawn fast critters, remaining multiples of five
    /// spawn tanks, everything else is normal. Level fifteen is therefore a
    /// fast wave.
    #[must_use]
    pub const fn for_level(level: u32) -> Self {
        if level % 3 == 0 {
            Self::Fast
        } else if level % 5 == 0 {
            Self::Tank
        } else {
            Self::Normal
        }
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Single-target tower.
    Normal,
    /// Tower whose projectiles damage critters around the impact.
    Splash,
    /// Tower whose projectiles slow critters down.
    Slow,
}

impl TowerKind {
    /// Every tower kind in shop order.
    pub const ALL: [TowerKind; 3] = [Self::Normal, Self::Splash, Self::Slow];
}

/// Unique identifier assigned to a critter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CritterId(u32);

impl CritterId {
    /// Creates a new critter identifier with the provided numeric value.
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

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether the cells differ by one unit along exactly one axis.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Centre of the cell in world units for the provided cell edge length.
    #[must_use]
    pub fn center(self, cell_length: f32) -> Vec2 {
        Vec2::new(
            (self.column as f32 + 0.5) * cell_length,
            (self.row as f32 + 0.5) * cell_length,
        )
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Dense rectangular grid of cell classifications.
///
/// The grid only stores classifications; adjacency is derived on demand using
/// 4-connectivity so no neighbour lists have to be kept in sync with edits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Creates a grid filled with scenery cells.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![CellKind::Scenery; capacity],
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Classification of the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reclassifies a cell, returning `false` when it lies outside the grid.
    pub fn set_kind(&mut self, cell: CellCoord, kind: CellKind) -> bool {
        let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) else {
            return false;
        };
        *slot = kind;
        true
    }

    /// Iterates every cell with its classification in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, kind)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *kind)
        })
    }

    /// Iterates the in-bounds 4-connected neighbours of a cell.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        let mut candidates = [None; 4];
        let mut count = 0;

        if let Some(row) = cell.row().checked_sub(1) {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }

        if let Some(column) = cell.column().checked_add(1) {
            if column < self.columns {
                candidates[count] = Some(CellCoord::new(column, cell.row()));
                count += 1;
            }
        }

        if let Some(row) = cell.row().checked_add(1) {
            if row < self.rows {
                candidates[count] = Some(CellCoord::new(cell.column(), row));
                count += 1;
            }
        }

        if let Some(column) = cell.column().checked_sub(1) {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }

        candidates.into_iter().take(count).flatten()
    }

    /// Iterates the neighbours of a cell that belong to the critter route.
    pub fn path_neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        self.neighbors(cell)
            .filter(|neighbor| self.kind(*neighbor).is_some_and(CellKind::is_path))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Ordered route critters follow from the start cell to the end cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CellCoord>", into = "Vec<CellCoord>")]
pub struct Path {
    cells: Vec<CellCoord>,
}

impl TryFrom<Vec<CellCoord>> for Path {
    type Error = PathGraphError;

    fn try_from(cells: Vec<CellCoord>) -> Result<Self, Self::Error> {
        let found = cells.len();
        Self::new(cells).ok_or(PathGraphError::TooFewCells { found })
    }
}

impl From<Path> for Vec<CellCoord> {
    fn from(path: Path) -> Self {
        path.cells
    }
}

impl Path {
    /// Creates a path from ordered cells, requiring at least two of them.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>) -> Option<Self> {
        if cells.len() < 2 {
            return None;
        }
        Some(Self { cells })
    }

    /// Ordered cells composing the path.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Cell where critters enter.
    #[must_use]
    pub fn start(&self) -> CellCoord {
        self.cells[0]
    }

    /// Cell where critters leave.
    #[must_use]
    pub fn end(&self) -> CellCoord {
        self.cells[self.cells.len() - 1]
    }

    /// Number of cells in the path; always at least two.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the cell is part of the path.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }
}

/// Circle in world units used for overlap queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    /// Centre of the circle.
    pub center: Vec2,
    /// Radius of the circle; zero describes a point.
    pub radius: f32,
}

impl Circle {
    /// Creates a new circle.
    #[must_use]
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Spatial query capability used to decide whether two shapes touch.
///
/// Systems never compute range checks on their own; they ask the detector so
/// adapters can swap in a spatial index or an engine-provided collision query.
pub trait OverlapDetector {
    /// Reports whether the two circles overlap.
    fn overlaps(&self, a: Circle, b: Circle) -> bool;
}

/// Overlap detector that compares centre distances against summed radii.
#[derive(Clone, Copy, Debug, Default)]
pub struct CircleOverlap;

impl OverlapDetector for CircleOverlap {
    fn overlaps(&self, a: Circle, b: Circle) -> bool {
        let reach = a.radius + b.radius;
        a.center.distance_squared(b.center) <= reach * reach
    }
}

/// Phase of the wave scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WavePhase {
    /// Idle, waiting for the player to start the next wave.
    Prompting,
    /// Emitting critters at the wave cadence.
    Spawning,
    /// Every critter was emitted; waiting for them to die or leak.
    Clearing,
    /// Disabled after game over until a new session starts.
    Halted,
}

/// Immutable representation of the wave scheduler state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveSnapshot {
    /// Current wave level.
    pub level: u32,
    /// Current scheduler phase.
    pub phase: WavePhase,
    /// Critters emitted by the current wave.
    pub spawned: u32,
    /// Critters of the current wave that were killed or leaked.
    pub killed: u32,
    /// Critters the current wave will emit.
    pub spawn_amount: u32,
    /// Delay between consecutive spawns.
    pub time_between_spawns: Duration,
    /// Variant of critter emitted by the current wave.
    pub critter_kind: CritterKind,
}

impl WaveSnapshot {
    /// Number of critters still to be emitted by the current wave.
    #[must_use]
    pub fn remaining_spawns(&self) -> u32 {
        if self.phase != WavePhase::Spawning {
            return 0;
        }
        self.spawn_amount.saturating_sub(self.spawned)
    }
}

/// Immutable representation of a single critter's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CritterSnapshot {
    /// Unique identifier assigned to the critter.
    pub id: CritterId,
    /// Variant of the critter.
    pub kind: CritterKind,
    /// Position in world units.
    pub position: Vec2,
    /// Current health.
    pub health: f32,
    /// Health at spawn after difficulty scaling.
    pub max_health: f32,
    /// Index of the waypoint the critter is heading for.
    pub target_waypoint: usize,
    /// Indicates whether a slow effect is active.
    pub slowed: bool,
}

impl CritterSnapshot {
    /// Remaining health relative to the scaled maximum, clamped to `[0, 1]`.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// Read-only snapshot describing all critters on the map.
#[derive(Clone, Debug, Default)]
pub struct CritterView {
    snapshots: Vec<CritterSnapshot>,
}

impl CritterView {
    /// Creates a new critter view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CritterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured critter snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &CritterSnapshot> {
        self.snapshots.iter()
    }

    /// Finds the snapshot of a single critter.
    #[must_use]
    pub fn get(&self, id: CritterId) -> Option<&CritterSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CritterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell hosting the tower.
    pub cell: CellCoord,
    /// Centre of the tower in world units.
    pub position: Vec2,
    /// Targeting radius in world units.
    pub range: f32,
    /// Current upgrade level.
    pub level: u32,
    /// Accumulated price of the tower.
    pub price: u32,
    /// Cash required for the next upgrade.
    pub upgrade_cost: u32,
    /// Cash refunded when the tower is sold.
    pub sell_price: u32,
    /// Whether the tower can be upgraded with the player's current cash.
    pub can_upgrade: bool,
    /// Whether the cooldown elapsed; cooling towers do not look for critters.
    pub ready: bool,
    /// Whether this tower is the selected tower.
    pub selected: bool,
}

/// Read-only snapshot describing all towers placed on the map.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Finds the snapshot of a single tower.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Cooldown state of a single tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Identifier of the tower.
    pub tower: TowerId,
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Time left until the tower may fire again.
    pub ready_in: Duration,
}

/// Read-only view of every tower's cooldown, sorted by tower identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the cooldown snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Assignment of a critter to a tower produced by the targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Critter that was acquired.
    pub critter: CritterId,
    /// Centre of the tower in world units.
    pub tower_position: Vec2,
    /// Position of the critter in world units.
    pub critter_position: Vec2,
}

/// Reasons an editor cell edit may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum EditError {
    /// A session is running, so the editor is locked.
    #[error("the map editor is only available outside of a session")]
    InvalidMode,
    /// The cell lies outside the editor grid.
    #[error("cell lies outside the editor grid")]
    OutOfBounds,
}

/// Reasons a grid cannot be turned into a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PathGraphError {
    /// Fewer than two path cells were drawn.
    #[error("a path needs at least two cells, found {found}")]
    TooFewCells {
        /// Number of path cells present.
        found: usize,
    },
    /// The number of cells with a single path neighbour is not two.
    #[error("a path needs exactly two endpoints, found {found}")]
    EndpointCount {
        /// Number of endpoint candidates present.
        found: usize,
    },
    /// A path cell has no path neighbour or more than two of them.
    #[error("cell {cell} has {degree} path neighbours")]
    Branching {
        /// First offending cell in scan order.
        cell: CellCoord,
        /// Number of path neighbours of the cell.
        degree: usize,
    },
    /// The path cells form more than one piece.
    #[error("path cells are not connected: walk visited {visited} of {total}")]
    Disconnected {
        /// Cells reached by walking from the first endpoint.
        visited: usize,
        /// Path cells present in the grid.
        total: usize,
    },
    /// The requested start cell is not an endpoint.
    #[error("cell {cell} is not a path endpoint")]
    InvalidStart {
        /// Cell requested as start.
        cell: CellCoord,
    },
    /// A preset path coordinate lies outside the grid.
    #[error("cell {cell} lies outside the grid")]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
    },
    /// A preset path lists fewer than two cells.
    #[error("a preset path needs at least two cells")]
    PathTooShort,
    /// A session is running, so no map may be built.
    #[error("a map can only be built outside of a session")]
    InvalidMode,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// No session is running, so placement is disabled.
    #[error("towers can only be placed during a session")]
    InvalidMode,
    /// The requested cell lies outside the grid.
    #[error("cell lies outside the map")]
    OutOfBounds,
    /// The requested cell is part of the path.
    #[error("towers cannot be placed on the path")]
    NotScenery,
    /// The requested cell already hosts a tower.
    #[error("cell already hosts a tower")]
    Occupied,
    /// The player cannot afford the tower.
    #[error("insufficient funds: need {price}, have {cash}")]
    InsufficientFunds {
        /// Price of the tower.
        price: u32,
        /// Cash available.
        cash: u32,
    },
}

/// Reasons a sell, upgrade or select request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum TowerActionError {
    /// No session is running.
    #[error("tower actions are only available during a session")]
    InvalidMode,
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// The tower already reached the maximum level.
    #[error("tower already reached the maximum level")]
    UpgradeCapReached,
    /// The player cannot afford the upgrade.
    #[error("insufficient funds: need {cost}, have {cash}")]
    InsufficientFunds {
        /// Cost of the upgrade.
        cost: u32,
        /// Cash available.
        cash: u32,
    },
}

/// Reasons a wave start request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum WaveError {
    /// No session is running.
    #[error("waves can only start during a session")]
    InvalidMode,
    /// The current wave has not finished yet.
    #[error("the current wave is still running")]
    AlreadyRunning,
}
