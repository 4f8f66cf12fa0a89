#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stepped Critter Defence simulation that owns the world and its systems.
//!
//! The world only reacts to commands. [`Simulation`] feeds it the commands a
//! running game needs: wave spawns paced by the spawning system, the fixed
//! tick, and one firing command per target the targeting system acquired. Player
//! actions are forwarded as commands too, and their rejection events are
//! turned back into `Err` values. Every event produced along the way is kept
//! until [`Simulation::drain_events`] hands it to presentation collaborators.

use std::time::Duration;

use critter_defence_core::{
    config::GameConfig, CellCoord, CellKind, CircleOverlap, Command, CritterId, CritterView,
    EditError, EndpointChoice, Event, OverlapDetector, Path, PathGraphError, PlacementError,
    PlayMode, PresetMap, TowerActionError, TowerId, TowerKind, TowerTarget, TowerView, WaveError,
    WaveSnapshot,
};
use critter_defence_system_path_graph::{self as path_graph, GraphReport};
use critter_defence_system_spawning::Spawning;
use critter_defence_system_tower_targeting::TowerTargeting;
use critter_defence_world::{self as world, query, World};
use tracing::{debug, trace};

/// Owns the authoritative world, the pure systems and the pending event log.
#[derive(Debug)]
pub struct Simulation<D: OverlapDetector = CircleOverlap> {
    world: World,
    detector: D,
    spawning: Spawning,
    targeting: TowerTargeting,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a simulation using circle-distance overlap checks.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self::with_detector(config, CircleOverlap)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl<D: OverlapDetector> Simulation<D> {
    /// Creates a simulation that answers range queries with the provided detector.
    #[must_use]
    pub fn with_detector(config: GameConfig, detector: D) -> Self {
        Self {
            world: World::with_config(config),
            detector,
            spawning: Spawning::new(),
            targeting: TowerTargeting::new(),
            targets: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Read-only access to the world for [`query`] functions.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Applies a command and returns the events it produced.
    fn execute(&mut self, command: Command) -> &[Event] {
        let start = self.events.len();
        world::apply(&mut self.world, command, &mut self.events);
        &self.events[start..]
    }

    /// Resizes the editor grid, clamped to the configured bounds.
    pub fn configure_editor(&mut self, columns: u32, rows: u32) {
        let _ = self.execute(Command::ConfigureEditorGrid { columns, rows });
    }

    /// Classifies a single editor cell.
    pub fn edit_cell(&mut self, cell: CellCoord, kind: CellKind) -> Result<(), EditError> {
        let rejection = self
            .execute(Command::EditCell { cell, kind })
            .iter()
            .find_map(|event| match event {
                Event::CellEditRejected { reason, .. } => Some(*reason),
                _ => None,
            });
        rejection.map_or(Ok(()), Err)
    }

    /// Reports the degree statistics and endpoint candidates of the editor grid.
    #[must_use]
    pub fn inspect_editor(&self) -> GraphReport {
        path_graph::inspect(query::editor_grid(&self.world))
    }

    /// Builds the drawn editor map and starts a session on it.
    pub fn build_from_editor(&mut self, start: EndpointChoice) -> Result<&Path, PathGraphError> {
        let outcome = map_outcome(self.execute(Command::BuildEditorMap { start }));
        self.finish_map_build(outcome)
    }

    /// Builds a preset map and starts a session on it.
    pub fn build_from_preset(&mut self, preset: &PresetMap) -> Result<&Path, PathGraphError> {
        let outcome = map_outcome(self.execute(Command::LoadPresetMap {
            map: preset.clone(),
        }));
        self.finish_map_build(outcome)
    }

    fn finish_map_build(
        &mut self,
        outcome: Option<PathGraphError>,
    ) -> Result<&Path, PathGraphError> {
        if let Some(reason) = outcome {
            debug!(%reason, "map build refused");
            return Err(reason);
        }
        self.reset_systems();
        query::path(&self.world).ok_or(PathGraphError::InvalidMode)
    }

    /// Starts the next wave when the scheduler is prompting.
    pub fn start_wave(&mut self) -> Result<WaveSnapshot, WaveError> {
        let rejection = self
            .execute(Command::StartWave)
            .iter()
            .find_map(|event| match event {
                Event::WaveStartRejected { reason } => Some(*reason),
                _ => None,
            });
        match rejection {
            Some(reason) => Err(reason),
            None => Ok(query::wave(&self.world)),
        }
    }

    /// Buys and places a tower on a scenery cell.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
    ) -> Result<TowerId, PlacementError> {
        let events = self.execute(Command::PlaceTower { kind, cell });
        for event in events {
            match event {
                Event::TowerPlaced { tower, .. } => return Ok(*tower),
                Event::TowerPlacementRejected { reason, .. } => return Err(*reason),
                _ => {}
            }
        }
        Err(PlacementError::InvalidMode)
    }

    /// Sells a tower, returning the refund.
    pub fn sell_tower(&mut self, tower: TowerId) -> Result<u32, TowerActionError> {
        let events = self.execute(Command::SellTower { tower });
        for event in events {
            match event {
                Event::TowerSold { refund, .. } => return Ok(*refund),
                Event::TowerActionRejected { reason, .. } => return Err(*reason),
                _ => {}
            }
        }
        Err(TowerActionError::MissingTower)
    }

    /// Upgrades a tower one level, returning the cost that was paid.
    pub fn upgrade_tower(&mut self, tower: TowerId) -> Result<u32, TowerActionError> {
        let events = self.execute(Command::UpgradeTower { tower });
        for event in events {
            match event {
                Event::TowerUpgraded { cost, .. } => return Ok(*cost),
                Event::TowerActionRejected { reason, .. } => return Err(*reason),
                _ => {}
            }
        }
        Err(TowerActionError::MissingTower)
    }

    /// Makes the tower the single selected tower.
    pub fn select_tower(&mut self, tower: TowerId) -> Result<(), TowerActionError> {
        let rejection = self
            .execute(Command::SelectTower { tower })
            .iter()
            .find_map(|event| match event {
                Event::TowerActionRejected { reason, .. } => Some(*reason),
                _ => None,
            });
        rejection.map_or(Ok(()), Err)
    }

    /// Clears the tower selection.
    pub fn deselect_all(&mut self) {
        let _ = self.execute(Command::DeselectAll);
    }

    /// Tears the session down and returns to the editor.
    pub fn end_session(&mut self) {
        let _ = self.execute(Command::EndSession);
        self.reset_systems();
    }

    /// Advances presentation time, which drives slow effect decay.
    pub fn on_frame_tick(&mut self, dt: Duration) {
        let _ = self.execute(Command::FrameTick { dt });
    }

    /// Advances the fixed simulation step.
    ///
    /// Spawn requests run first, then the world moves critters, cools towers
    /// down, flies projectiles and updates the wave. Ready towers acquire
    /// targets last and fire at them, so new projectiles start flying on the
    /// next step.
    pub fn on_fixed_tick(&mut self, dt: Duration) {
        let play_mode = query::play_mode(&self.world);
        let wave = query::wave(&self.world);
        self.spawning.handle(dt, play_mode, &wave, &mut self.commands);
        self.flush_commands();

        let _ = self.execute(Command::Tick { dt });

        let play_mode = query::play_mode(&self.world);
        let towers = query::tower_view(&self.world);
        let critters = query::critter_view(&self.world);
        self.targeting.handle(
            play_mode,
            &towers,
            &critters,
            &self.detector,
            query::config(&self.world).combat.critter_radius,
            &mut self.targets,
        );
        self.commands
            .extend(self.targets.iter().map(|target| Command::FireProjectile {
                tower: target.tower,
                target: target.critter,
            }));
        trace!(shots = self.targets.len(), "fixed tick resolved");
        self.flush_commands();
    }

    fn flush_commands(&mut self) {
        let commands = std::mem::take(&mut self.commands);
        for command in commands {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn reset_systems(&mut self) {
        self.spawning = Spawning::new();
        self.targets.clear();
    }

    /// Returns the events produced since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Active play mode.
    #[must_use]
    pub fn play_mode(&self) -> PlayMode {
        query::play_mode(&self.world)
    }

    /// Player cash balance.
    #[must_use]
    pub fn cash(&self) -> u32 {
        query::cash(&self.world)
    }

    /// Player lives.
    #[must_use]
    pub fn lives(&self) -> u32 {
        query::lives(&self.world)
    }

    /// Wave scheduler state.
    #[must_use]
    pub fn wave(&self) -> WaveSnapshot {
        query::wave(&self.world)
    }

    /// Path of the current session.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        query::path(&self.world)
    }

    /// Towers with their upgrade cost, sell price and upgrade availability.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Critters currently on the map.
    #[must_use]
    pub fn critters(&self) -> CritterView {
        query::critter_view(&self.world)
    }

    /// Remaining health fraction of a critter.
    #[must_use]
    pub fn critter_health_fraction(&self, critter: CritterId) -> Option<f32> {
        query::critter_health_fraction(&self.world, critter)
    }

    /// Currently selected tower.
    #[must_use]
    pub fn selected_tower(&self) -> Option<TowerId> {
        query::selected_tower(&self.world)
    }

    /// Targets acquired during the latest fixed tick.
    #[must_use]
    pub fn targets(&self) -> &[TowerTarget] {
        &self.targets
    }
}

fn map_outcome(events: &[Event]) -> Option<PathGraphError> {
    events.iter().find_map(|event| match event {
        Event::MapRejected { reason } => Some(*reason),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_edits_surface_as_errors() {
        let mut simulation = Simulation::default();
        assert_eq!(
            simulation.edit_cell(CellCoord::new(40, 0), CellKind::Path),
            Err(EditError::OutOfBounds)
        );
        assert_eq!(
            simulation.edit_cell(CellCoord::new(0, 0), CellKind::Path),
            Ok(())
        );
        assert_eq!(simulation.inspect_editor().path_cells(), 1);
    }

    #[test]
    fn failed_builds_keep_the_editor_open() {
        let mut simulation = Simulation::default();
        let result = simulation.build_from_editor(EndpointChoice::First);
        assert_eq!(result, Err(PathGraphError::TooFewCells { found: 0 }));
        assert_eq!(simulation.play_mode(), PlayMode::Editor);
    }

    #[test]
    fn towers_fire_once_per_cooldown() {
        let mut simulation = Simulation::default();
        let _ = simulation
            .build_from_preset(&PresetMap::straight())
            .expect("preset builds");
        let tower = simulation
            .place_tower(TowerKind::Normal, CellCoord::new(1, 4))
            .expect("scenery cell");
        let _ = simulation.start_wave().expect("wave starts");

        let step = Duration::from_millis(50);
        let mut shots = Vec::new();
        for tick in 0..60 {
            simulation.on_fixed_tick(step);
            let fired = simulation.drain_events().iter().any(|event| {
                matches!(event, Event::ProjectileFired { tower: shooter, .. } if *shooter == tower)
            });
            if fired {
                shots.push(tick);
            }
        }

        assert!(shots.len() >= 2, "the tower keeps firing: {shots:?}");
        for pair in shots.windows(2) {
            assert!(pair[1] - pair[0] >= 10, "shots closer than the cooldown: {shots:?}");
        }
    }

    #[test]
    fn drained_events_are_not_repeated() {
        let mut simulation = Simulation::default();
        let _ = simulation
            .build_from_preset(&PresetMap::straight())
            .expect("preset builds");
        assert!(!simulation.drain_events().is_empty());
        assert!(simulation.drain_events().is_empty());
    }
}
