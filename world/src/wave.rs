//! Wave level, spawn and kill bookkeeping.

use critter_defence_core::{config::WaveConfig, CritterKind, WavePhase, WaveSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WaveState {
    level: u32,
    phase: WavePhase,
    spawned: u32,
    killed: u32,
    spawn_amount: u32,
}

impl WaveState {
    pub(crate) fn new(config: &WaveConfig) -> Self {
        Self {
            level: 0,
            phase: WavePhase::Prompting,
            spawned: 0,
            killed: 0,
            spawn_amount: config.spawn_amount(0),
        }
    }

    pub(crate) const fn level(&self) -> u32 {
        self.level
    }

    pub(crate) const fn phase(&self) -> WavePhase {
        self.phase
    }

    pub(crate) const fn spawn_amount(&self) -> u32 {
        self.spawn_amount
    }

    /// Leaves `Prompting` and starts emitting the wave.
    pub(crate) fn begin(&mut self, config: &WaveConfig) {
        self.phase = WavePhase::Spawning;
        self.spawned = 0;
        self.killed = 0;
        self.spawn_amount = config.spawn_amount(self.level);
    }

    pub(crate) fn accepts_spawn(&self) -> bool {
        self.phase == WavePhase::Spawning && self.spawned < self.spawn_amount
    }

    /// Counts a spawn and returns `true` once the whole wave was emitted.
    pub(crate) fn record_spawn(&mut self) -> bool {
        self.spawned += 1;
        if self.spawned >= self.spawn_amount {
            self.phase = WavePhase::Clearing;
            return true;
        }
        false
    }

    /// Counts a kill or leak of a critter tagged with the provided level.
    pub(crate) fn record_removal(&mut self, critter_level: u32) {
        if critter_level == self.level && self.phase != WavePhase::Halted {
            self.killed += 1;
        }
    }

    /// Advances to the next level when every critter of the wave is gone.
    ///
    /// Returns the completed level.
    pub(crate) fn try_complete(&mut self, config: &WaveConfig) -> Option<u32> {
        if self.phase != WavePhase::Clearing || self.killed < self.spawn_amount {
            return None;
        }
        let completed = self.level;
        self.level += 1;
        self.phase = WavePhase::Prompting;
        self.spawned = 0;
        self.killed = 0;
        self.spawn_amount = config.spawn_amount(self.level);
        Some(completed)
    }

    pub(crate) fn halt(&mut self) {
        self.phase = WavePhase::Halted;
    }

    pub(crate) fn snapshot(&self, config: &WaveConfig) -> WaveSnapshot {
        WaveSnapshot {
            level: self.level,
            phase: self.phase,
            spawned: self.spawned,
            killed: self.killed,
            spawn_amount: self.spawn_amount,
            time_between_spawns: config.time_between_spawns(self.level),
            critter_kind: CritterKind::for_level(self.level),
        }
    }
}
