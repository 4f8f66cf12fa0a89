#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Critter Defence.

mod critters;
mod economy;
mod projectiles;
mod selection;
mod towers;
mod wave;

use std::time::Duration;

use critter_defence_core::{
    config::GameConfig, CellCoord, CellKind, Circle, CircleOverlap, Command, CritterId,
    CritterKind, EditError, EndpointChoice, Event, Grid, OverlapDetector, Path, PathGraphError,
    PlacementError, PlayMode, PresetMap, TowerActionError, TowerId, TowerKind, Vec2, WaveError,
    WavePhase,
};
use critter_defence_system_path_graph as path_graph;
use tracing::{debug, info, warn};

use critters::{CritterRoster, HitOutcome, Movement};
use economy::Economy;
use projectiles::{Flight, Payload, ProjectileField};
use selection::Selection;
use towers::TowerRegistry;
use wave::WaveState;

/// Built map a session runs on.
#[derive(Clone, Debug)]
pub struct GameMap {
    grid: Grid,
    path: Path,
    waypoints: Vec<Vec2>,
    spawn_point: Vec2,
    cell_length: f32,
}

impl GameMap {
    fn new(grid: Grid, path: Path, cell_length: f32) -> Self {
        let mut waypoints: Vec<Vec2> = path
            .cells()
            .iter()
            .map(|cell| cell.center(cell_length))
            .collect();

        let count = waypoints.len();
        let exit = waypoints[count - 1] + (waypoints[count - 1] - waypoints[count - 2]) * 0.5;
        let spawn_point = waypoints[0] + (waypoints[0] - waypoints[1]) * 0.5;
        waypoints[count - 1] = exit;

        Self {
            grid,
            path,
            waypoints,
            spawn_point,
            cell_length,
        }
    }

    /// Grid of the map, with every path cell classified as [`CellKind::Path`].
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Ordered path critters follow.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// World-space waypoints; the last one lies half a cell beyond the end cell.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Point half a cell outside the start cell where critters appear.
    #[must_use]
    pub const fn spawn_point(&self) -> Vec2 {
        self.spawn_point
    }

    /// Edge length of a cell in world units.
    #[must_use]
    pub const fn cell_length(&self) -> f32 {
        self.cell_length
    }
}

/// Represents the authoritative Critter Defence world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    play_mode: PlayMode,
    editor: Grid,
    map: Option<GameMap>,
    economy: Economy,
    critters: CritterRoster,
    towers: TowerRegistry,
    projectiles: ProjectileField,
    wave: WaveState,
    selection: Selection,
    tick_index: u64,
}

impl World {
    /// Creates a new world using the stock tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    /// Creates a new world in editor mode using the provided tuning.
    #[must_use]
    pub fn with_config(config: GameConfig) -> Self {
        let (columns, rows) = config.grid.clamp(config.grid.min_size, config.grid.min_size);
        Self {
            play_mode: PlayMode::Editor,
            editor: Grid::new(columns, rows),
            map: None,
            economy: Economy::new(&config.player),
            critters: CritterRoster::new(),
            towers: TowerRegistry::new(),
            projectiles: ProjectileField::new(),
            wave: WaveState::new(&config.waves),
            selection: Selection::default(),
            tick_index: 0,
            config,
        }
    }

    fn set_play_mode(&mut self, mode: PlayMode, out_events: &mut Vec<Event>) {
        if self.play_mode == mode {
            return;
        }
        self.play_mode = mode;
        out_events.push(Event::PlayModeChanged { mode });
    }

    fn clear_entities(&mut self) {
        self.critters.clear();
        self.towers.clear();
        self.projectiles.clear();
        let _ = self.selection.clear();
    }

    fn configure_editor(&mut self, columns: u32, rows: u32, out_events: &mut Vec<Event>) {
        if self.play_mode == PlayMode::Attack {
            warn!("editor grid cannot be reconfigured during a session");
            return;
        }

        let (columns, rows) = self.config.grid.clamp(columns, rows);
        self.editor = Grid::new(columns, rows);
        out_events.push(Event::EditorGridConfigured { columns, rows });
    }

    fn edit_cell(&mut self, cell: CellCoord, kind: CellKind, out_events: &mut Vec<Event>) {
        if self.play_mode == PlayMode::Attack {
            out_events.push(Event::CellEditRejected {
                cell,
                reason: EditError::InvalidMode,
            });
            return;
        }

        if !self.editor.set_kind(cell, kind) {
            out_events.push(Event::CellEditRejected {
                cell,
                reason: EditError::OutOfBounds,
            });
            return;
        }

        out_events.push(Event::CellEdited { cell, kind });
    }

    fn build_editor_map(&mut self, start: EndpointChoice, out_events: &mut Vec<Event>) {
        if self.play_mode == PlayMode::Attack {
            reject_map(PathGraphError::InvalidMode, out_events);
            return;
        }

        match path_graph::build_from_editor(&self.editor, start) {
            Ok(path) => {
                let grid = path_graph::stamp(self.editor.columns(), self.editor.rows(), &path);
                self.start_session(grid, path, out_events);
            }
            Err(reason) => reject_map(reason, out_events),
        }
    }

    fn load_preset(&mut self, preset: &PresetMap, out_events: &mut Vec<Event>) {
        if self.play_mode == PlayMode::Attack {
            reject_map(PathGraphError::InvalidMode, out_events);
            return;
        }

        let (columns, rows) = self.config.grid.clamp(preset.columns, preset.rows);
        match path_graph::build_from_preset(preset, columns, rows) {
            Ok(path) => {
                let grid = path_graph::stamp(columns, rows, &path);
                self.start_session(grid, path, out_events);
            }
            Err(reason) => reject_map(reason, out_events),
        }
    }

    fn start_session(&mut self, grid: Grid, path: Path, out_events: &mut Vec<Event>) {
        self.clear_entities();
        let start = path.start();
        let end = path.end();
        let length = path.cell_count();

        self.map = Some(GameMap::new(grid, path, self.config.grid.cell_length));
        self.economy = Economy::new(&self.config.player);
        self.wave = WaveState::new(&self.config.waves);

        info!(%start, %end, length, "map built");
        out_events.push(Event::MapBuilt { start, end, length });
        out_events.push(Event::SessionStarted {
            cash: self.economy.cash(),
            lives: self.economy.lives(),
        });
        self.set_play_mode(PlayMode::Attack, out_events);
    }

    fn end_session(&mut self, out_events: &mut Vec<Event>) {
        if self.play_mode == PlayMode::Editor {
            return;
        }

        self.clear_entities();
        self.map = None;
        self.wave.halt();
        info!("session ended");
        out_events.push(Event::SessionEnded);
        self.set_play_mode(PlayMode::Editor, out_events);
    }

    fn game_over(&mut self, out_events: &mut Vec<Event>) {
        let level = self.wave.level();
        self.clear_entities();
        self.wave.halt();
        info!(level, "game lost");
        out_events.push(Event::GameLost { level });
        self.set_play_mode(PlayMode::GameOver, out_events);
    }

    fn start_wave(&mut self, out_events: &mut Vec<Event>) {
        if self.play_mode != PlayMode::Attack {
            out_events.push(Event::WaveStartRejected {
                reason: WaveError::InvalidMode,
            });
            return;
        }

        if self.wave.phase() != WavePhase::Prompting {
            out_events.push(Event::WaveStartRejected {
                reason: WaveError::AlreadyRunning,
            });
            return;
        }

        self.wave.begin(&self.config.waves);
        let level = self.wave.level();
        let spawn_amount = self.wave.spawn_amount();
        info!(level, spawn_amount, "wave started");
        out_events.push(Event::WaveStarted {
            level,
            spawn_amount,
        });
    }

    fn spawn_critter(&mut self, kind: CritterKind, out_events: &mut Vec<Event>) {
        if self.play_mode != PlayMode::Attack || !self.wave.accepts_spawn() {
            return;
        }
        let Some(map) = self.map.as_ref() else {
            return;
        };

        let stats = self
            .config
            .critters
            .stats(kind)
            .scaled(self.config.waves.difficulty_increase());
        let position = map.spawn_point();
        let critter = self
            .critters
            .spawn(kind, self.wave.level(), position, stats);
        debug!(critter = critter.get(), ?kind, "critter spawned");
        out_events.push(Event::CritterSpawned {
            critter,
            kind,
            position,
        });

        if self.wave.record_spawn() {
            out_events.push(Event::WaveSpawningFinished {
                level: self.wave.level(),
            });
        }
    }

    fn place_tower(&mut self, kind: TowerKind, cell: CellCoord, out_events: &mut Vec<Event>) {
        match self.try_place_tower(kind, cell) {
            Ok((tower, price)) => {
                debug!(tower = tower.get(), ?kind, %cell, price, "tower placed");
                out_events.push(Event::TowerPlaced {
                    tower,
                    kind,
                    cell,
                    price,
                });
                out_events.push(Event::CashChanged {
                    cash: self.economy.cash(),
                });
            }
            Err(reason) => {
                out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            }
        }
    }

    fn try_place_tower(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
    ) -> Result<(TowerId, u32), PlacementError> {
        if self.play_mode != PlayMode::Attack {
            return Err(PlacementError::InvalidMode);
        }
        let Some(map) = self.map.as_ref() else {
            return Err(PlacementError::InvalidMode);
        };

        match map.grid().kind(cell) {
            None => return Err(PlacementError::OutOfBounds),
            Some(CellKind::Scenery) => {}
            Some(_) => return Err(PlacementError::NotScenery),
        }

        if self.towers.is_occupied(cell) {
            return Err(PlacementError::Occupied);
        }

        let stats = *self.config.towers.stats(kind);
        let position = cell.center(map.cell_length());
        if !self.economy.debit(stats.price) {
            return Err(PlacementError::InsufficientFunds {
                price: stats.price,
                cash: self.economy.cash(),
            });
        }

        let tower = self.towers.insert(kind, cell, position, stats);
        Ok((tower, stats.price))
    }

    fn sell_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        if self.play_mode != PlayMode::Attack {
            reject_tower_action(tower, TowerActionError::InvalidMode, out_events);
            return;
        }
        let Some(state) = self.towers.remove(tower) else {
            reject_tower_action(tower, TowerActionError::MissingTower, out_events);
            return;
        };

        let refund = state.sell_price();
        self.economy.credit(refund);
        debug!(tower = tower.get(), refund, "tower sold");
        out_events.push(Event::TowerSold { tower, refund });
        out_events.push(Event::CashChanged {
            cash: self.economy.cash(),
        });
        if self.selection.forget(tower) {
            out_events.push(Event::SelectionCleared);
        }
    }

    fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        if self.play_mode != PlayMode::Attack {
            reject_tower_action(tower, TowerActionError::InvalidMode, out_events);
            return;
        }
        let Some(state) = self.towers.get_mut(tower) else {
            reject_tower_action(tower, TowerActionError::MissingTower, out_events);
            return;
        };

        if state.at_level_cap() {
            reject_tower_action(tower, TowerActionError::UpgradeCapReached, out_events);
            return;
        }

        let cost = state.upgrade_cost();
        if !self.economy.can_afford_upgrade(state.stats.price) || !self.economy.debit(cost) {
            let reason = TowerActionError::InsufficientFunds {
                cost,
                cash: self.economy.cash(),
            };
            reject_tower_action(tower, reason, out_events);
            return;
        }

        let cost = state.upgrade(self.config.towers.upgrade_modifier);
        let level = state.level;
        debug!(tower = tower.get(), level, cost, "tower upgraded");
        out_events.push(Event::TowerUpgraded { tower, level, cost });
        out_events.push(Event::CashChanged {
            cash: self.economy.cash(),
        });
    }

    fn select_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        if self.play_mode != PlayMode::Attack {
            reject_tower_action(tower, TowerActionError::InvalidMode, out_events);
            return;
        }
        if self.towers.get(tower).is_none() {
            reject_tower_action(tower, TowerActionError::MissingTower, out_events);
            return;
        }

        if self.selection.select(tower) {
            out_events.push(Event::TowerSelected { tower });
        }
    }

    fn fire_projectile(
        &mut self,
        tower: TowerId,
        target: CritterId,
        out_events: &mut Vec<Event>,
    ) {
        if self.play_mode != PlayMode::Attack || self.critters.get(target).is_none() {
            return;
        }
        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        if !state.is_ready() {
            return;
        }

        let splash = state.projectile_splash();
        let payload = Payload {
            damage: state.stats.damage,
            splash_modifier: splash.modifier,
            splash_radius: splash.radius,
            slow: state.projectile_slow().amount,
        };
        state.reload();

        let projectile = self.projectiles.launch(
            tower,
            target,
            state.position,
            state.stats.projectile_speed,
            payload,
        );
        out_events.push(Event::ProjectileFired {
            projectile,
            tower,
            target,
        });
    }

    fn frame_tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::FrameAdvanced { dt });
        if self.play_mode != PlayMode::Attack {
            return;
        }

        for critter in self.critters.iter_mut() {
            if critter.decay_slow(dt) {
                out_events.push(Event::CritterSlowExpired {
                    critter: critter.id,
                });
            }
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });
        if self.play_mode != PlayMode::Attack {
            return;
        }

        if self.advance_critters(dt, out_events) {
            return;
        }

        for tower in self.towers.iter_mut() {
            tower.cool_down(dt);
        }

        self.advance_projectiles(dt, out_events);

        if let Some(level) = self.wave.try_complete(&self.config.waves) {
            let next_level = self.wave.level();
            info!(level, next_level, "wave completed");
            out_events.push(Event::WaveCompleted { level, next_level });
        }
    }

    /// Moves every critter and resolves leaks, returning `true` on game over.
    fn advance_critters(&mut self, dt: Duration, out_events: &mut Vec<Event>) -> bool {
        let Some(map) = self.map.as_ref() else {
            return false;
        };
        let threshold = self.config.combat.waypoint_threshold;

        let mut leaked = Vec::new();
        for critter in self.critters.iter_mut() {
            match critter.advance(dt, map.waypoints(), threshold) {
                Movement::Travelling => {}
                Movement::Advanced(waypoint) => out_events.push(Event::CritterAdvanced {
                    critter: critter.id,
                    waypoint,
                }),
                Movement::Leaked => leaked.push(critter.id),
            }
        }

        for id in leaked {
            let Some(critter) = self.critters.remove(id) else {
                continue;
            };
            let lives_remaining = self.economy.lose_life();
            self.wave.record_removal(critter.level);
            debug!(critter = id.get(), lives_remaining, "critter leaked");
            out_events.push(Event::CritterLeaked {
                critter: id,
                lives_remaining,
            });

            if lives_remaining == 0 {
                self.game_over(out_events);
                return true;
            }
        }

        false
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let threshold = self.config.combat.impact_threshold;

        for id in self.projectiles.ids() {
            let Some(projectile) = self.projectiles.get_mut(id) else {
                continue;
            };
            let Some(target) = self.critters.get(projectile.target) else {
                let _ = self.projectiles.remove(id);
                out_events.push(Event::ProjectileFizzled { projectile: id });
                continue;
            };

            let Flight::Impact(point) = projectile.fly(target.position, dt, threshold) else {
                continue;
            };
            let target = projectile.target;
            let payload = projectile.payload;
            let _ = self.projectiles.remove(id);

            let splashed = self.resolve_impact(target, point, payload, out_events);
            out_events.push(Event::ProjectileImpacted {
                projectile: id,
                target,
                splashed,
            });
        }
    }

    /// Applies direct and splash damage, returning the number of splashed critters.
    fn resolve_impact(
        &mut self,
        target: CritterId,
        point: Vec2,
        payload: Payload,
        out_events: &mut Vec<Event>,
    ) -> u32 {
        self.hit_critter(target, payload.damage, payload.slow, out_events);
        if payload.splash_modifier <= 0.0 {
            return 0;
        }

        let blast = Circle::new(point, payload.splash_radius);
        let victims: Vec<CritterId> = self
            .critters
            .iter()
            .filter(|critter| critter.id != target)
            .filter(|critter| CircleOverlap.overlaps(blast, Circle::new(critter.position, 0.0)))
            .map(|critter| critter.id)
            .collect();

        let damage = payload.splash_modifier * payload.damage;
        for victim in &victims {
            self.hit_critter(*victim, damage, payload.slow, out_events);
        }
        u32::try_from(victims.len()).unwrap_or(u32::MAX)
    }

    fn hit_critter(
        &mut self,
        id: CritterId,
        damage: f32,
        slow: f32,
        out_events: &mut Vec<Event>,
    ) {
        let slow_duration = self.config.combat.slow_duration();
        let Some(critter) = self.critters.get_mut(id) else {
            return;
        };

        match critter.hit(damage, slow, slow_duration) {
            HitOutcome::Damaged { remaining, slowed } => {
                out_events.push(Event::CritterDamaged {
                    critter: id,
                    damage,
                    remaining,
                });
                if let Some(magnitude) = slowed {
                    out_events.push(Event::CritterSlowed {
                        critter: id,
                        magnitude,
                    });
                }
            }
            HitOutcome::Killed => {
                let Some(critter) = self.critters.remove(id) else {
                    return;
                };
                self.economy.credit(critter.reward);
                self.wave.record_removal(critter.level);
                debug!(critter = id.get(), reward = critter.reward, "critter killed");
                out_events.push(Event::CritterKilled {
                    critter: id,
                    reward: critter.reward,
                });
                out_events.push(Event::CashChanged {
                    cash: self.economy.cash(),
                });
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn reject_map(reason: PathGraphError, out_events: &mut Vec<Event>) {
    warn!(%reason, "map build rejected");
    out_events.push(Event::MapRejected { reason });
}

fn reject_tower_action(tower: TowerId, reason: TowerActionError, out_events: &mut Vec<Event>) {
    debug!(tower = tower.get(), %reason, "tower action rejected");
    out_events.push(Event::TowerActionRejected { tower, reason });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureEditorGrid { columns, rows } => {
            world.configure_editor(columns, rows, out_events);
        }
        Command::EditCell { cell, kind } => world.edit_cell(cell, kind, out_events),
        Command::BuildEditorMap { start } => world.build_editor_map(start, out_events),
        Command::LoadPresetMap { map } => world.load_preset(&map, out_events),
        Command::EndSession => world.end_session(out_events),
        Command::StartWave => world.start_wave(out_events),
        Command::SpawnCritter { kind } => world.spawn_critter(kind, out_events),
        Command::PlaceTower { kind, cell } => world.place_tower(kind, cell, out_events),
        Command::SellTower { tower } => world.sell_tower(tower, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::SelectTower { tower } => world.select_tower(tower, out_events),
        Command::DeselectAll => {
            if world.selection.clear() {
                out_events.push(Event::SelectionCleared);
            }
        }
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::FrameTick { dt } => world.frame_tick(dt, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{GameMap, World};
    use critter_defence_core::{
        config::GameConfig, CritterId, CritterView, Grid, Path, PlayMode, ProjectileId,
        TowerCooldownSnapshot, TowerCooldownView, TowerId, TowerKind, TowerSnapshot, TowerView,
        Vec2, WaveSnapshot,
    };

    /// Reports the active play mode.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.play_mode
    }

    /// Provides the tuning the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Number of fixed ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Provides read-only access to the map editor grid.
    #[must_use]
    pub fn editor_grid(world: &World) -> &Grid {
        &world.editor
    }

    /// Map of the running or most recently lost session.
    #[must_use]
    pub fn map(world: &World) -> Option<&GameMap> {
        world.map.as_ref()
    }

    /// Path of the running or most recently lost session.
    #[must_use]
    pub fn path(world: &World) -> Option<&Path> {
        world.map.as_ref().map(GameMap::path)
    }

    /// Player cash balance.
    #[must_use]
    pub fn cash(world: &World) -> u32 {
        world.economy.cash()
    }

    /// Player lives.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.economy.lives()
    }

    /// Purchase price of a tower kind.
    #[must_use]
    pub fn tower_price(world: &World, kind: TowerKind) -> u32 {
        world.config.towers.price(kind)
    }

    /// Reports whether the player can buy a tower of the provided kind.
    #[must_use]
    pub fn can_afford(world: &World, kind: TowerKind) -> bool {
        world.economy.can_afford(tower_price(world, kind))
    }

    /// Captures the wave scheduler state.
    #[must_use]
    pub fn wave(world: &World) -> WaveSnapshot {
        world.wave.snapshot(&world.config.waves)
    }

    /// Captures a read-only view of the critters on the map.
    #[must_use]
    pub fn critter_view(world: &World) -> CritterView {
        CritterView::from_snapshots(
            world
                .critters
                .iter()
                .map(|critter| critter.snapshot())
                .collect(),
        )
    }

    /// Number of critters on the map.
    #[must_use]
    pub fn critter_count(world: &World) -> usize {
        world.critters.len()
    }

    /// Remaining health of a critter relative to its scaled maximum.
    #[must_use]
    pub fn critter_health_fraction(world: &World, critter: CritterId) -> Option<f32> {
        world
            .critters
            .get(critter)
            .map(|critter| critter.snapshot().health_fraction())
    }

    /// Captures a read-only view of the towers on the map.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let selected = world.selection.current();
        let snapshots = world
            .towers
            .iter()
            .map(|tower| {
                let upgrade_cost = tower.upgrade_cost();
                TowerSnapshot {
                    id: tower.id,
                    kind: tower.kind,
                    cell: tower.cell,
                    position: tower.position,
                    range: tower.stats.range,
                    level: tower.level,
                    price: tower.stats.price,
                    upgrade_cost,
                    sell_price: tower.sell_price(),
                    can_upgrade: !tower.at_level_cap()
                        && world.economy.can_afford_upgrade(tower.stats.price),
                    ready: tower.is_ready(),
                    selected: selected == Some(tower.id),
                }
            })
            .collect();
        TowerView::from_snapshots(snapshots)
    }

    /// Captures the cooldown of every tower.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| TowerCooldownSnapshot {
                    tower: tower.id,
                    kind: tower.kind,
                    ready_in: tower.cooldown,
                })
                .collect(),
        )
    }

    /// Human readable summary of a tower's stats.
    #[must_use]
    pub fn tower_description(world: &World, tower: TowerId) -> Option<String> {
        world.towers.get(tower).map(|tower| tower.describe())
    }

    /// Tower that is currently selected, if any.
    #[must_use]
    pub fn selected_tower(world: &World) -> Option<TowerId> {
        world.selection.current()
    }

    /// Captures the projectiles in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                tower: projectile.tower,
                target: projectile.target,
                position: projectile.position,
            })
            .collect()
    }

    /// Immutable representation of a projectile in flight.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Identifier of the projectile.
        pub id: ProjectileId,
        /// Tower that fired the projectile.
        pub tower: TowerId,
        /// Critter the projectile chases.
        pub target: CritterId,
        /// Position in world units.
        pub position: Vec2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_pushes_exit_and_spawn_half_a_cell_out() {
        let path = Path::new(vec![
            CellCoord::new(0, 5),
            CellCoord::new(1, 5),
            CellCoord::new(2, 5),
        ])
        .expect("path");
        let map = GameMap::new(Grid::new(10, 10), path, 1.0);

        assert_eq!(map.spawn_point(), Vec2::new(0.0, 5.5));
        assert_eq!(
            map.waypoints(),
            &[
                Vec2::new(0.5, 5.5),
                Vec2::new(1.5, 5.5),
                Vec2::new(3.0, 5.5)
            ]
        );
    }

    #[test]
    fn new_world_starts_in_editor_mode() {
        let world = World::new();
        assert_eq!(query::play_mode(&world), PlayMode::Editor);
        assert_eq!(query::editor_grid(&world).columns(), 10);
        assert!(query::map(&world).is_none());
    }

    fn two_critter_session() -> (World, CritterId, CritterId) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadPresetMap {
                map: PresetMap::straight(),
            },
            &mut events,
        );
        apply(&mut world, Command::StartWave, &mut events);
        apply(&mut world, Command::SpawnCritter { kind: CritterKind::Fast }, &mut events);
        apply(&mut world, Command::SpawnCritter { kind: CritterKind::Fast }, &mut events);
        (world, CritterId::new(0), CritterId::new(1))
    }

    fn splash_payload() -> Payload {
        Payload {
            damage: 20.0,
            splash_modifier: 0.25,
            splash_radius: 0.3,
            slow: 0.0,
        }
    }

    #[test]
    fn splash_ignores_critters_beyond_the_blast_radius() {
        let (mut world, target, neighbour) = two_critter_session();
        let impact = Vec2::new(5.0, 5.0);
        for (id, position) in [(target, impact), (neighbour, Vec2::new(5.5, 5.0))] {
            world.critters.get_mut(id).expect("spawned").position = position;
        }

        let mut events = Vec::new();
        let splashed = world.resolve_impact(target, impact, splash_payload(), &mut events);

        assert_eq!(splashed, 0);
        assert!(events.iter().all(|event| !matches!(
            event,
            Event::CritterDamaged { critter, .. } if *critter == neighbour
        )));
    }

    #[test]
    fn splash_reaches_critters_inside_the_blast_radius() {
        let (mut world, target, neighbour) = two_critter_session();
        let impact = Vec2::new(5.0, 5.0);
        for (id, position) in [(target, impact), (neighbour, Vec2::new(5.25, 5.0))] {
            world.critters.get_mut(id).expect("spawned").position = position;
        }

        let mut events = Vec::new();
        let splashed = world.resolve_impact(target, impact, splash_payload(), &mut events);

        assert_eq!(splashed, 1);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::CritterDamaged { critter, damage, .. }
                if *critter == neighbour && (*damage - 5.0).abs() < 1e-4
        )));
    }
}
