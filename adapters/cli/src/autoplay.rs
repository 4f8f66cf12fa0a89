//! Seeded spending strategy used to drive unattended sessions.

use critter_defence_core::{CellCoord, CellKind, TowerKind};
use critter_defence_simulation::Simulation;
use critter_defence_world::query;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Purchases made before a wave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Spending {
    pub(crate) placed: u32,
    pub(crate) upgraded: u32,
}

/// Places and upgrades towers at random, reproducibly for a given seed.
#[derive(Debug)]
pub(crate) struct Autoplayer {
    rng: ChaCha8Rng,
}

impl Autoplayer {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Buys towers beside the path while cash allows, then upgrades with what is left.
    pub(crate) fn spend(&mut self, simulation: &mut Simulation) -> Spending {
        let mut spending = Spending::default();
        let mut candidates = free_cells_beside_path(simulation);

        loop {
            let affordable: Vec<TowerKind> = TowerKind::ALL
                .into_iter()
                .filter(|kind| query::can_afford(simulation.world(), *kind))
                .collect();
            let Some(&kind) = affordable.choose(&mut self.rng) else {
                break;
            };
            if candidates.is_empty() {
                break;
            }

            let index = self.rng.gen_range(0..candidates.len());
            let cell = candidates.swap_remove(index);
            match simulation.place_tower(kind, cell) {
                Ok(_) => spending.placed += 1,
                Err(reason) => {
                    debug!(%cell, %reason, "autoplayer placement refused");
                    break;
                }
            }
        }

        let mut upgradable: Vec<_> = simulation
            .towers()
            .iter()
            .filter(|tower| tower.can_upgrade)
            .map(|tower| tower.id)
            .collect();
        upgradable.shuffle(&mut self.rng);
        for tower in upgradable {
            if simulation.upgrade_tower(tower).is_ok() {
                spending.upgraded += 1;
            }
        }

        spending
    }
}

fn free_cells_beside_path(simulation: &Simulation) -> Vec<CellCoord> {
    let Some(map) = query::map(simulation.world()) else {
        return Vec::new();
    };
    let towers = simulation.towers();
    let path = map.path().cells();

    map.grid()
        .iter()
        .filter(|(_, kind)| *kind == CellKind::Scenery)
        .map(|(cell, _)| cell)
        .filter(|cell| path.iter().any(|step| step.is_adjacent(*cell)))
        .filter(|cell| towers.iter().all(|tower| tower.cell != *cell))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use critter_defence_core::{config::GameConfig, PresetMap};

    fn session() -> Simulation {
        let mut simulation = Simulation::new(GameConfig::default());
        let _ = simulation
            .build_from_preset(&PresetMap::straight())
            .expect("preset builds");
        simulation
    }

    #[test]
    fn candidates_flank_the_path() {
        let simulation = session();
        let cells = free_cells_beside_path(&simulation);
        assert_eq!(cells.len(), 20);
        assert!(cells.iter().all(|cell| cell.row() == 4 || cell.row() == 6));
    }

    #[test]
    fn same_seed_spends_identically() {
        let mut first = session();
        let mut second = session();
        let a = Autoplayer::new(11).spend(&mut first);
        let b = Autoplayer::new(11).spend(&mut second);

        assert_eq!(a, b);
        assert!(a.placed > 0);
        assert_eq!(first.towers().into_vec(), second.towers().into_vec());
        assert_eq!(first.cash(), second.cash());
    }
}
