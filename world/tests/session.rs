use critter_defence_core::{
    config::{GameConfig, PlayerConfig},
    CellCoord, CellKind, Command, EditError, EndpointChoice, Event, PathGraphError,
    PlacementError, PlayMode, PresetMap, TowerActionError, TowerId, TowerKind, WaveError,
    WavePhase,
};
use critter_defence_world::{self as world, query, World};

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn straight_session(config: GameConfig) -> World {
    let mut world = World::with_config(config);
    let events = run(
        &mut world,
        Command::LoadPresetMap {
            map: PresetMap::straight(),
        },
    );
    assert!(
        events.contains(&Event::PlayModeChanged {
            mode: PlayMode::Attack
        }),
        "preset must start a session: {events:?}"
    );
    world
}

fn rich() -> GameConfig {
    GameConfig {
        player: PlayerConfig {
            starting_cash: 1_000,
            starting_lives: 20,
        },
        ..GameConfig::default()
    }
}

fn place(world: &mut World, kind: TowerKind, cell: CellCoord) -> TowerId {
    let events = run(world, Command::PlaceTower { kind, cell });
    events
        .iter()
        .find_map(|event| match event {
            Event::TowerPlaced { tower, .. } => Some(*tower),
            _ => None,
        })
        .unwrap_or_else(|| panic!("placement failed: {events:?}"))
}

#[test]
fn preset_launch_resets_session() {
    let mut world = World::new();
    let events = run(
        &mut world,
        Command::LoadPresetMap {
            map: PresetMap::straight(),
        },
    );

    assert_eq!(
        events,
        vec![
            Event::MapBuilt {
                start: CellCoord::new(0, 5),
                end: CellCoord::new(9, 5),
                length: 10,
            },
            Event::SessionStarted {
                cash: 50,
                lives: 20
            },
            Event::PlayModeChanged {
                mode: PlayMode::Attack
            },
        ]
    );
    assert_eq!(query::wave(&world).phase, WavePhase::Prompting);
    assert_eq!(query::wave(&world).level, 0);
}

#[test]
fn preset_dimensions_are_clamped() {
    let mut world = World::new();
    let preset = PresetMap {
        name: String::from("tiny"),
        columns: 3,
        rows: 40,
        path: vec![CellCoord::new(0, 0), CellCoord::new(0, 1)],
    };
    let _ = run(&mut world, Command::LoadPresetMap { map: preset });

    let map = query::map(&world).expect("map");
    assert_eq!(map.grid().columns(), 10);
    assert_eq!(map.grid().rows(), 20);
}

#[test]
fn editor_drawing_builds_a_session() {
    let mut world = World::new();
    let configured = run(
        &mut world,
        Command::ConfigureEditorGrid {
            columns: 4,
            rows: 25,
        },
    );
    assert_eq!(
        configured,
        vec![Event::EditorGridConfigured {
            columns: 10,
            rows: 20
        }]
    );

    for column in 0..3 {
        let cell = CellCoord::new(column, 0);
        let events = run(
            &mut world,
            Command::EditCell {
                cell,
                kind: CellKind::Path,
            },
        );
        assert_eq!(
            events,
            vec![Event::CellEdited {
                cell,
                kind: CellKind::Path
            }]
        );
    }

    let events = run(
        &mut world,
        Command::BuildEditorMap {
            start: EndpointChoice::Second,
        },
    );
    assert_eq!(
        events[0],
        Event::MapBuilt {
            start: CellCoord::new(2, 0),
            end: CellCoord::new(0, 0),
            length: 3,
        }
    );
    assert_eq!(query::play_mode(&world), PlayMode::Attack);

    let locked = run(
        &mut world,
        Command::EditCell {
            cell: CellCoord::new(5, 5),
            kind: CellKind::Path,
        },
    );
    assert_eq!(
        locked,
        vec![Event::CellEditRejected {
            cell: CellCoord::new(5, 5),
            reason: EditError::InvalidMode,
        }]
    );
}

#[test]
fn invalid_editor_map_is_rejected_without_leaving_the_editor() {
    let mut world = World::new();
    let _ = run(
        &mut world,
        Command::EditCell {
            cell: CellCoord::new(3, 3),
            kind: CellKind::Start,
        },
    );
    let events = run(
        &mut world,
        Command::BuildEditorMap {
            start: EndpointChoice::First,
        },
    );

    assert_eq!(
        events,
        vec![Event::MapRejected {
            reason: PathGraphError::TooFewCells { found: 1 }
        }]
    );
    assert_eq!(query::play_mode(&world), PlayMode::Editor);
    assert!(query::path(&world).is_none());

    let outside = run(
        &mut world,
        Command::EditCell {
            cell: CellCoord::new(30, 3),
            kind: CellKind::Path,
        },
    );
    assert_eq!(
        outside,
        vec![Event::CellEditRejected {
            cell: CellCoord::new(30, 3),
            reason: EditError::OutOfBounds,
        }]
    );
}

#[test]
fn maps_cannot_be_rebuilt_during_a_session() {
    let mut world = straight_session(GameConfig::default());
    let events = run(
        &mut world,
        Command::LoadPresetMap {
            map: PresetMap::hook(),
        },
    );
    assert_eq!(
        events,
        vec![Event::MapRejected {
            reason: PathGraphError::InvalidMode
        }]
    );
}

#[test]
fn placement_validates_cell_and_funds() {
    let mut world = straight_session(GameConfig::default());

    let on_path = run(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Normal,
            cell: CellCoord::new(3, 5),
        },
    );
    assert_eq!(
        on_path,
        vec![Event::TowerPlacementRejected {
            kind: TowerKind::Normal,
            cell: CellCoord::new(3, 5),
            reason: PlacementError::NotScenery,
        }]
    );

    let outside = run(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Normal,
            cell: CellCoord::new(10, 0),
        },
    );
    assert!(matches!(
        outside.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::OutOfBounds,
            ..
        }]
    ));

    let first = run(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Normal,
            cell: CellCoord::new(0, 4),
        },
    );
    assert_eq!(
        first,
        vec![
            Event::TowerPlaced {
                tower: TowerId::new(0),
                kind: TowerKind::Normal,
                cell: CellCoord::new(0, 4),
                price: 10,
            },
            Event::CashChanged { cash: 40 },
        ]
    );

    let occupied = run(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Slow,
            cell: CellCoord::new(0, 4),
        },
    );
    assert!(matches!(
        occupied.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::Occupied,
            ..
        }]
    ));

    for column in 1..5 {
        let _ = place(&mut world, TowerKind::Normal, CellCoord::new(column, 4));
    }
    assert_eq!(query::cash(&world), 0);
    assert!(!query::can_afford(&world, TowerKind::Normal));

    let broke = run(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Normal,
            cell: CellCoord::new(6, 4),
        },
    );
    assert_eq!(
        broke,
        vec![Event::TowerPlacementRejected {
            kind: TowerKind::Normal,
            cell: CellCoord::new(6, 4),
            reason: PlacementError::InsufficientFunds { price: 10, cash: 0 },
        }]
    );
}

#[test]
fn placement_requires_a_session() {
    let mut world = World::new();
    let events = run(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Normal,
            cell: CellCoord::new(0, 0),
        },
    );
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::InvalidMode,
            ..
        }]
    ));
}

#[test]
fn upgrades_follow_price_formula_and_cap() {
    let mut world = straight_session(rich());
    let tower = place(&mut world, TowerKind::Normal, CellCoord::new(2, 4));
    assert_eq!(query::cash(&world), 990);

    let expected_costs = [6, 10, 17, 28];
    for (step, cost) in expected_costs.into_iter().enumerate() {
        let snapshot = *query::tower_view(&world).get(tower).expect("tower");
        assert_eq!(snapshot.upgrade_cost, cost);
        assert!(snapshot.can_upgrade);

        let events = run(&mut world, Command::UpgradeTower { tower });
        assert_eq!(
            events[0],
            Event::TowerUpgraded {
                tower,
                level: step as u32 + 2,
                cost,
            }
        );
    }

    let snapshot = *query::tower_view(&world).get(tower).expect("tower");
    assert_eq!(snapshot.level, 5);
    assert_eq!(snapshot.price, 71);
    assert!(!snapshot.can_upgrade);
    assert_eq!(query::cash(&world), 990 - 61);

    let capped = run(&mut world, Command::UpgradeTower { tower });
    assert_eq!(
        capped,
        vec![Event::TowerActionRejected {
            tower,
            reason: TowerActionError::UpgradeCapReached,
        }]
    );
}

#[test]
fn first_upgrade_matches_reference_numbers() {
    let mut world = straight_session(GameConfig::default());
    let tower = place(&mut world, TowerKind::Normal, CellCoord::new(2, 4));
    let _ = run(&mut world, Command::UpgradeTower { tower });

    let snapshot = *query::tower_view(&world).get(tower).expect("tower");
    assert_eq!(snapshot.price, 16);
    assert_eq!(query::cash(&world), 34);
    assert!((snapshot.range - 1.875).abs() < 1e-4);

    let description = query::tower_description(&world, tower).expect("description");
    assert!(description.contains("-Level: 2"));
    assert!(description.contains("-Damage: 25"));
}

#[test]
fn upgrade_without_cash_is_rejected() {
    let mut world = straight_session(GameConfig::default());
    let mut towers = Vec::new();
    for column in 0..5 {
        towers.push(place(&mut world, TowerKind::Normal, CellCoord::new(column, 4)));
    }

    let events = run(&mut world, Command::UpgradeTower { tower: towers[0] });
    assert_eq!(
        events,
        vec![Event::TowerActionRejected {
            tower: towers[0],
            reason: TowerActionError::InsufficientFunds { cost: 6, cash: 0 },
        }]
    );
}

fn with_cash(starting_cash: u32) -> GameConfig {
    GameConfig {
        player: PlayerConfig {
            starting_cash,
            starting_lives: 20,
        },
        ..GameConfig::default()
    }
}

#[test]
fn upgrade_requires_the_unrounded_cost() {
    let mut world = straight_session(with_cash(16));
    let tower = place(&mut world, TowerKind::Normal, CellCoord::new(2, 4));
    assert_eq!(query::cash(&world), 6);
    assert!(!query::tower_view(&world).get(tower).expect("tower").can_upgrade);

    let refused = run(&mut world, Command::UpgradeTower { tower });
    assert_eq!(
        refused,
        vec![Event::TowerActionRejected {
            tower,
            reason: TowerActionError::InsufficientFunds { cost: 6, cash: 6 },
        }]
    );
    assert_eq!(query::cash(&world), 6);

    let mut world = straight_session(with_cash(17));
    let tower = place(&mut world, TowerKind::Normal, CellCoord::new(2, 4));
    assert!(query::tower_view(&world).get(tower).expect("tower").can_upgrade);

    let upgraded = run(&mut world, Command::UpgradeTower { tower });
    assert_eq!(
        upgraded,
        vec![
            Event::TowerUpgraded {
                tower,
                level: 2,
                cost: 6
            },
            Event::CashChanged { cash: 1 },
        ]
    );
}

#[test]
fn selling_refunds_and_clears_selection() {
    let mut world = straight_session(GameConfig::default());
    let tower = place(&mut world, TowerKind::Splash, CellCoord::new(4, 6));
    assert_eq!(query::cash(&world), 35);

    let selected = run(&mut world, Command::SelectTower { tower });
    assert_eq!(selected, vec![Event::TowerSelected { tower }]);
    assert_eq!(query::selected_tower(&world), Some(tower));

    let sold = run(&mut world, Command::SellTower { tower });
    assert_eq!(
        sold,
        vec![
            Event::TowerSold { tower, refund: 11 },
            Event::CashChanged { cash: 46 },
            Event::SelectionCleared,
        ]
    );
    assert_eq!(query::selected_tower(&world), None);

    let again = run(&mut world, Command::SellTower { tower });
    assert_eq!(
        again,
        vec![Event::TowerActionRejected {
            tower,
            reason: TowerActionError::MissingTower,
        }]
    );
}

#[test]
fn selection_is_single_owner() {
    let mut world = straight_session(GameConfig::default());
    let first = place(&mut world, TowerKind::Normal, CellCoord::new(1, 4));
    let second = place(&mut world, TowerKind::Normal, CellCoord::new(2, 4));

    let _ = run(&mut world, Command::SelectTower { tower: first });
    let _ = run(&mut world, Command::SelectTower { tower: second });

    let view = query::tower_view(&world);
    let selected: Vec<_> = view.iter().filter(|tower| tower.selected).collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, second);

    assert_eq!(
        run(&mut world, Command::DeselectAll),
        vec![Event::SelectionCleared]
    );
    assert!(run(&mut world, Command::DeselectAll).is_empty());
}

#[test]
fn waves_reject_overlapping_starts() {
    let mut world = World::new();
    assert_eq!(
        run(&mut world, Command::StartWave),
        vec![Event::WaveStartRejected {
            reason: WaveError::InvalidMode
        }]
    );

    let mut world = straight_session(GameConfig::default());
    assert_eq!(
        run(&mut world, Command::StartWave),
        vec![Event::WaveStarted {
            level: 0,
            spawn_amount: 5
        }]
    );
    assert_eq!(
        run(&mut world, Command::StartWave),
        vec![Event::WaveStartRejected {
            reason: WaveError::AlreadyRunning
        }]
    );
}

#[test]
fn end_session_tears_everything_down() {
    let mut world = straight_session(GameConfig::default());
    let _ = place(&mut world, TowerKind::Normal, CellCoord::new(1, 4));
    let _ = run(&mut world, Command::StartWave);

    let events = run(&mut world, Command::EndSession);
    assert_eq!(
        events,
        vec![
            Event::SessionEnded,
            Event::PlayModeChanged {
                mode: PlayMode::Editor
            },
        ]
    );
    assert_eq!(query::tower_view(&world).iter().count(), 0);
    assert!(query::path(&world).is_none());
    assert_eq!(query::wave(&world).phase, WavePhase::Halted);

    assert!(run(&mut world, Command::EndSession).is_empty());
}
