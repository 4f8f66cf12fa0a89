//! Tuning tables and map presets loaded from TOML.
//!
//! Every table implements [`Default`] with the stock game balance, and every
//! struct is marked `#[serde(default)]` so configuration files only need to
//! list the values they override.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, CritterKind, TowerKind};

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The grid bounds are inverted or zero.
    #[error("grid bounds are invalid: min {min}, max {max}")]
    GridBounds {
        /// Configured minimum edge length.
        min: u32,
        /// Configured maximum edge length.
        max: u32,
    },
    /// A preset path lists fewer than two cells.
    #[error("preset `{name}` needs at least two path cells")]
    PresetTooShort {
        /// Name of the offending preset.
        name: String,
    },
    /// A preset path references a cell outside its grid.
    #[error("preset `{name}` references cell {cell} outside its {columns}x{rows} grid")]
    PresetOutOfBounds {
        /// Name of the offending preset.
        name: String,
        /// Offending cell.
        cell: CellCoord,
        /// Columns of the preset grid after clamping.
        columns: u32,
        /// Rows of the preset grid after clamping.
        rows: u32,
    },
    /// A tower or wave value is out of its meaningful range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable explanation.
        reason: &'static str,
    },
}

/// Longest timer accepted by the configuration, in seconds.
const MAX_TIMER_SECONDS: f32 = 86_400.0;

const POSITIVE: &str = "must be a positive finite number";
const NON_NEGATIVE: &str = "must be a finite number no lower than zero";
const TIMER: &str = "must be a positive number of seconds no longer than a day";

fn ensure(valid: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, reason })
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn is_non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

fn is_timer(seconds: f32) -> bool {
    is_positive(seconds) && seconds <= MAX_TIMER_SECONDS
}

/// Converts validated seconds into a duration, saturating on overflow.
fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.max(0.0)).unwrap_or(Duration::MAX)
}

/// Complete tuning of a game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Grid size bounds and cell geometry.
    pub grid: GridConfig,
    /// Starting resources of the player.
    pub player: PlayerConfig,
    /// Wave cadence and difficulty.
    pub waves: WaveConfig,
    /// Tower stats per kind.
    pub towers: TowerTable,
    /// Critter stats per kind.
    pub critters: CritterTable,
    /// Thresholds used by movement and projectile resolution.
    pub combat: CombatConfig,
    /// Predefined maps.
    pub presets: Vec<PresetMap>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            player: PlayerConfig::default(),
            waves: WaveConfig::default(),
            towers: TowerTable::default(),
            critters: CritterTable::default(),
            combat: CombatConfig::default(),
            presets: PresetMap::built_in(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a configuration document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints that serde cannot express.
    ///
    /// Every value that later becomes a [`Duration`] or feeds movement maths
    /// is checked here, so a tick never meets a non-finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.min_size == 0 || self.grid.min_size > self.grid.max_size {
            return Err(ConfigError::GridBounds {
                min: self.grid.min_size,
                max: self.grid.max_size,
            });
        }
        ensure(is_positive(self.grid.cell_length), "grid.cell_length", POSITIVE)?;
        self.waves.validate()?;
        if !(1.0..2.0).contains(&self.towers.upgrade_modifier) {
            return Err(ConfigError::InvalidValue {
                field: "towers.upgrade_modifier",
                reason: "must lie in [1, 2)",
            });
        }
        for kind in TowerKind::ALL {
            self.towers.stats(kind).validate(kind)?;
        }
        for kind in [CritterKind::Normal, CritterKind::Fast, CritterKind::Tank] {
            self.critters.stats(kind).validate(kind)?;
        }
        self.combat.validate()?;
        for preset in &self.presets {
            self.grid.validate_preset(preset)?;
        }
        Ok(())
    }

    /// Finds a preset by name.
    #[must_use]
    pub fn preset(&self, name: &str) -> Option<&PresetMap> {
        self.presets.iter().find(|preset| preset.name == name)
    }
}

/// Grid size bounds and cell geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Smallest permitted edge length, in cells.
    pub min_size: u32,
    /// Largest permitted edge length, in cells.
    pub max_size: u32,
    /// Edge length of a cell in world units.
    pub cell_length: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_size: 10,
            max_size: 20,
            cell_length: 1.0,
        }
    }
}

impl GridConfig {
    /// Clamps requested grid dimensions into the configured bounds.
    #[must_use]
    pub fn clamp(&self, columns: u32, rows: u32) -> (u32, u32) {
        (
            columns.clamp(self.min_size, self.max_size),
            rows.clamp(self.min_size, self.max_size),
        )
    }

    fn validate_preset(&self, preset: &PresetMap) -> Result<(), ConfigError> {
        if preset.path.len() < 2 {
            return Err(ConfigError::PresetTooShort {
                name: preset.name.clone(),
            });
        }
        let (columns, rows) = self.clamp(preset.columns, preset.rows);
        if let Some(cell) = preset
            .path
            .iter()
            .find(|cell| cell.column() >= columns || cell.row() >= rows)
        {
            return Err(ConfigError::PresetOutOfBounds {
                name: preset.name.clone(),
                cell: *cell,
                columns,
                rows,
            });
        }
        Ok(())
    }
}

/// Starting resources of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Cash available when a session starts.
    pub starting_cash: u32,
    /// Lives available when a session starts.
    pub starting_lives: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            starting_cash: 50,
            starting_lives: 20,
        }
    }
}

/// Wave cadence and difficulty progression.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Critters spawned by the first wave.
    pub base_amount: u32,
    /// Period of the extra critter count: `base + level % increase_rate`.
    pub increase_rate: u32,
    /// Spawn interval at level zero, in seconds.
    pub base_interval_seconds: f32,
    /// Lower bound of the spawn interval, in seconds.
    pub min_interval_seconds: f32,
    /// Difficulty increase per level, in percent.
    pub difficulty_percent: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            base_amount: 5,
            increase_rate: 5,
            base_interval_seconds: 1.0,
            min_interval_seconds: 0.1,
            difficulty_percent: 5.0,
        }
    }
}

impl WaveConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        ensure(
            is_timer(self.base_interval_seconds),
            "waves.base_interval_seconds",
            TIMER,
        )?;
        ensure(
            is_timer(self.min_interval_seconds),
            "waves.min_interval_seconds",
            TIMER,
        )?;
        ensure(
            is_non_negative(self.difficulty_percent),
            "waves.difficulty_percent",
            NON_NEGATIVE,
        )?;
        ensure(
            self.increase_rate > 0,
            "waves.increase_rate",
            "must be at least one",
        )
    }

    /// Difficulty increase as a fraction.
    #[must_use]
    pub fn difficulty_increase(&self) -> f32 {
        self.difficulty_percent / 100.0
    }

    /// Delay between spawns for a wave at the provided level.
    #[must_use]
    pub fn time_between_spawns(&self, level: u32) -> Duration {
        let interval = self.base_interval_seconds - level as f32 * self.difficulty_increase();
        seconds(interval.max(self.min_interval_seconds))
    }

    /// Critters spawned by a wave at the provided level.
    #[must_use]
    pub fn spawn_amount(&self, level: u32) -> u32 {
        self.base_amount + level % self.increase_rate.max(1)
    }
}

/// Splash behaviour of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplashProfile {
    /// Whether impacts damage nearby critters.
    pub enabled: bool,
    /// Fraction of the damage applied to splashed critters.
    pub modifier: f32,
    /// Radius around the impact point, in world units.
    pub radius: f32,
}

/// Slow behaviour of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowProfile {
    /// Whether impacts slow critters down.
    pub enabled: bool,
    /// Fraction of speed removed while slowed.
    pub amount: f32,
}

/// Base stats of a tower kind at level one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Purchase price.
    pub price: u32,
    /// Damage applied by a direct hit.
    pub damage: f32,
    /// Projectile speed in world units per second.
    pub projectile_speed: f32,
    /// Cooldown between shots in seconds.
    pub fire_rate_seconds: f32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Splash behaviour.
    pub splash: SplashProfile,
    /// Slow behaviour.
    pub slow: SlowProfile,
}

impl TowerStats {
    /// Cooldown between shots, saturating for out-of-range values.
    #[must_use]
    pub fn fire_rate(&self) -> Duration {
        seconds(self.fire_rate_seconds)
    }

    fn validate(&self, kind: TowerKind) -> Result<(), ConfigError> {
        let field = match kind {
            TowerKind::Normal => "towers.normal",
            TowerKind::Splash => "towers.splash",
            TowerKind::Slow => "towers.slow",
        };
        ensure(
            is_timer(self.fire_rate_seconds),
            field,
            "fire_rate_seconds must be a positive number of seconds no longer than a day",
        )?;
        ensure(
            is_positive(self.projectile_speed),
            field,
            "projectile_speed must be a positive finite number",
        )?;
        let magnitudes = [
            self.damage,
            self.range,
            self.splash.modifier,
            self.splash.radius,
            self.slow.amount,
        ];
        ensure(
            magnitudes.into_iter().all(is_non_negative),
            field,
            "damage, range, splash and slow values must be finite and not negative",
        )
    }

    const fn base(price: u32) -> Self {
        Self {
            price,
            damage: 20.0,
            projectile_speed: 2.0,
            fire_rate_seconds: 0.5,
            range: 1.5,
            splash: SplashProfile {
                enabled: false,
                modifier: 0.25,
                radius: 0.3,
            },
            slow: SlowProfile {
                enabled: false,
                amount: 0.25,
            },
        }
    }
}

/// Tower stats per kind plus the upgrade multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerTable {
    /// Stats of the single-target tower.
    pub normal: TowerStats,
    /// Stats of the splash tower.
    pub splash: TowerStats,
    /// Stats of the slow tower.
    pub slow: TowerStats,
    /// Multiplier applied to stats on each upgrade.
    pub upgrade_modifier: f32,
}

impl Default for TowerTable {
    fn default() -> Self {
        let mut splash = TowerStats::base(15);
        splash.splash.enabled = true;
        let mut slow = TowerStats::base(12);
        slow.slow.enabled = true;
        Self {
            normal: TowerStats::base(10),
            splash,
            slow,
            upgrade_modifier: 1.25,
        }
    }
}

impl TowerTable {
    /// Stats of the provided tower kind.
    #[must_use]
    pub const fn stats(&self, kind: TowerKind) -> &TowerStats {
        match kind {
            TowerKind::Normal => &self.normal,
            TowerKind::Splash => &self.splash,
            TowerKind::Slow => &self.slow,
        }
    }

    /// Purchase price of the provided tower kind.
    #[must_use]
    pub const fn price(&self, kind: TowerKind) -> u32 {
        self.stats(kind).price
    }
}

/// Base stats of a critter kind before difficulty scaling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CritterStats {
    /// Health at level zero.
    pub health: f32,
    /// Cash credited on kill at level zero.
    pub reward: u32,
    /// Movement speed in world units per second.
    pub speed: f32,
}

impl CritterStats {
    fn validate(&self, kind: CritterKind) -> Result<(), ConfigError> {
        let field = match kind {
            CritterKind::Normal => "critters.normal",
            CritterKind::Fast => "critters.fast",
            CritterKind::Tank => "critters.tank",
        };
        ensure(
            is_positive(self.health) && is_positive(self.speed),
            field,
            "health and speed must be positive finite numbers",
        )
    }

    /// Applies the difficulty scaling for a spawn.
    ///
    /// Health grows by `1 + d` and the reward gains `floor(reward * 2 * d)`.
    #[must_use]
    pub fn scaled(self, difficulty: f32) -> Self {
        let bonus = (self.reward as f32 * 2.0 * difficulty).max(0.0).floor() as u32;
        Self {
            health: self.health * (1.0 + difficulty),
            reward: self.reward.saturating_add(bonus),
            speed: self.speed,
        }
    }
}

/// Critter stats per kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CritterTable {
    /// Stats of the baseline critter.
    pub normal: CritterStats,
    /// Stats of the quick critter.
    pub fast: CritterStats,
    /// Stats of the armoured critter.
    pub tank: CritterStats,
}

impl Default for CritterTable {
    fn default() -> Self {
        Self {
            normal: CritterStats {
                health: 100.0,
                reward: 2,
                speed: 1.0,
            },
            fast: CritterStats {
                health: 60.0,
                reward: 2,
                speed: 1.8,
            },
            tank: CritterStats {
                health: 250.0,
                reward: 5,
                speed: 0.6,
            },
        }
    }
}

impl CritterTable {
    /// Stats of the provided critter kind.
    #[must_use]
    pub const fn stats(&self, kind: CritterKind) -> CritterStats {
        match kind {
            CritterKind::Normal => self.normal,
            CritterKind::Fast => self.fast,
            CritterKind::Tank => self.tank,
        }
    }
}

/// Thresholds used by movement and projectile resolution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Duration of a slow effect, in seconds.
    pub slow_duration_seconds: f32,
    /// Distance under which a critter counts as having reached a waypoint.
    pub waypoint_threshold: f32,
    /// Distance under which a projectile counts as having hit its target.
    pub impact_threshold: f32,
    /// Collision radius of a critter used for range checks.
    pub critter_radius: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            slow_duration_seconds: 4.0,
            waypoint_threshold: 0.1,
            impact_threshold: 0.01,
            critter_radius: 0.25,
        }
    }
}

impl CombatConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        ensure(
            is_non_negative(self.slow_duration_seconds)
                && self.slow_duration_seconds <= MAX_TIMER_SECONDS,
            "combat.slow_duration_seconds",
            "must be a number of seconds between zero and a day",
        )?;
        ensure(
            is_non_negative(self.waypoint_threshold),
            "combat.waypoint_threshold",
            NON_NEGATIVE,
        )?;
        ensure(
            is_non_negative(self.impact_threshold),
            "combat.impact_threshold",
            NON_NEGATIVE,
        )?;
        ensure(
            is_non_negative(self.critter_radius),
            "combat.critter_radius",
            NON_NEGATIVE,
        )
    }

    /// Duration of a slow effect.
    #[must_use]
    pub fn slow_duration(&self) -> Duration {
        seconds(self.slow_duration_seconds)
    }
}

/// Predefined map: a grid size plus an ordered path taken as given.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetMap {
    /// Name used to pick the preset.
    pub name: String,
    /// Requested number of columns.
    pub columns: u32,
    /// Requested number of rows.
    pub rows: u32,
    /// Ordered path cells from start to end.
    pub path: Vec<CellCoord>,
}

impl PresetMap {
    /// The three maps shipped with the game.
    #[must_use]
    pub fn built_in() -> Vec<Self> {
        vec![Self::straight(), Self::serpentine(), Self::hook()]
    }

    /// 10x10 map crossed by a straight horizontal path.
    #[must_use]
    pub fn straight() -> Self {
        Self {
            name: String::from("straight"),
            columns: 10,
            rows: 10,
            path: (0..10).map(|column| CellCoord::new(column, 5)).collect(),
        }
    }

    /// 20x10 map with a winding path that doubles back on itself.
    #[must_use]
    pub fn serpentine() -> Self {
        const CELLS: [(u32, u32); 32] = [
            (0, 2),
            (1, 2),
            (2, 2),
            (3, 2),
            (4, 2),
            (4, 3),
            (4, 4),
            (4, 5),
            (4, 6),
            (5, 6),
            (6, 6),
            (7, 6),
            (8, 6),
            (8, 5),
            (8, 4),
            (7, 4),
            (6, 4),
            (6, 3),
            (6, 2),
            (7, 2),
            (8, 2),
            (9, 2),
            (10, 2),
            (11, 2),
            (12, 2),
            (12, 3),
            (12, 4),
            (12, 5),
            (12, 6),
            (12, 7),
            (12, 8),
            (12, 9),
        ];
        Self {
            name: String::from("serpentine"),
            columns: 20,
            rows: 10,
            path: CELLS
                .iter()
                .map(|&(column, row)| CellCoord::new(column, row))
                .collect(),
        }
    }

    /// 20x20 map whose path hugs three borders.
    #[must_use]
    pub fn hook() -> Self {
        let down = (0..20).rev().map(|row| CellCoord::new(0, row));
        let across = (1..20).map(|column| CellCoord::new(column, 0));
        let back = (1..20).map(|row| CellCoord::new(19, row));
        Self {
            name: String::from("hook"),
            columns: 20,
            rows: 20,
            path: down.chain(across).chain(back).collect(),
        }
    }
}
