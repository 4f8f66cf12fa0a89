//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, fmt::Write as _, time::Duration};

use critter_defence_core::{
    config::{SlowProfile, SplashProfile, TowerStats},
    CellCoord, TowerId, TowerKind, Vec2, MAX_TOWER_LEVEL,
};

use crate::economy;

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Cell hosting the tower.
    pub(crate) cell: CellCoord,
    /// Centre of the hosting cell in world units.
    pub(crate) position: Vec2,
    /// Current stats, including every upgrade applied so far.
    pub(crate) stats: TowerStats,
    /// Upgrade level, starting at one.
    pub(crate) level: u32,
    /// Time left until the tower may fire again.
    pub(crate) cooldown: Duration,
}

impl TowerState {
    pub(crate) fn new(
        id: TowerId,
        kind: TowerKind,
        cell: CellCoord,
        position: Vec2,
        stats: TowerStats,
    ) -> Self {
        Self {
            id,
            kind,
            cell,
            position,
            stats,
            level: 1,
            cooldown: Duration::ZERO,
        }
    }

    pub(crate) const fn upgrade_cost(&self) -> u32 {
        economy::upgrade_cost(self.stats.price)
    }

    pub(crate) const fn sell_price(&self) -> u32 {
        economy::sell_price(self.stats.price)
    }

    pub(crate) const fn at_level_cap(&self) -> bool {
        self.level >= MAX_TOWER_LEVEL
    }

    /// Applies one upgrade step scaled by the modifier and returns its cost.
    pub(crate) fn upgrade(&mut self, modifier: f32) -> u32 {
        let cost = self.upgrade_cost();
        let stats = &mut self.stats;
        stats.damage *= modifier;
        stats.range *= modifier;
        stats.fire_rate_seconds *= 2.0 - modifier;
        stats.splash.modifier *= modifier;
        stats.splash.radius *= modifier;
        stats.slow.amount *= modifier;
        stats.price = stats.price.saturating_add(cost);
        self.level += 1;
        cost
    }

    /// Lowers the cooldown by the elapsed time.
    pub(crate) fn cool_down(&mut self, dt: Duration) {
        self.cooldown = self.cooldown.saturating_sub(dt);
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.cooldown.is_zero()
    }

    /// Restarts the cooldown after a shot.
    pub(crate) fn reload(&mut self) {
        self.cooldown = self.stats.fire_rate();
    }

    /// Splash parameters copied into projectiles; zeroed when splash is off.
    pub(crate) fn projectile_splash(&self) -> SplashProfile {
        if self.stats.splash.enabled {
            self.stats.splash
        } else {
            SplashProfile {
                enabled: false,
                modifier: 0.0,
                radius: 0.0,
            }
        }
    }

    /// Slow parameters copied into projectiles; zeroed when slow is off.
    pub(crate) fn projectile_slow(&self) -> SlowProfile {
        if self.stats.slow.enabled {
            self.stats.slow
        } else {
            SlowProfile {
                enabled: false,
                amount: 0.0,
            }
        }
    }

    /// Multi-line summary of the tower for presentation layers.
    pub(crate) fn describe(&self) -> String {
        let stats = &self.stats;
        let mut text = format!(
            "Tower Info:\n\t-Level: {}\n\t-Damage: {}\n\t-Range: {:.2}\n\t-Fire Rate: {:.2}\n\t-Bullet Speed: {:.2}",
            self.level, stats.damage, stats.range, stats.fire_rate_seconds, stats.projectile_speed,
        );
        if stats.splash.enabled {
            let _ = write!(
                text,
                "\nSplash Info:\n\t-Splash Radius: {:.2}\n\t-Splash %: {}",
                stats.splash.radius,
                (stats.splash.modifier * 100.0) as u32,
            );
        }
        if stats.slow.enabled {
            let _ = write!(
                text,
                "\nSlow Info:\n\t-Slow %: {}",
                (stats.slow.amount * 100.0) as u32
            );
        }
        text
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower and returns the identifier allocated for it.
    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
        position: Vec2,
        stats: TowerStats,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self
            .entries
            .insert(id, TowerState::new(id, kind, cell, position, stats));
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    /// Reports whether a tower already stands on the cell.
    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.entries.values().any(|tower| tower.cell == cell)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
