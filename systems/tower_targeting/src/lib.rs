#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use critter_defence_core::{
    Circle, CritterId, CritterView, OverlapDetector, PlayMode, TowerId, TowerTarget, TowerView,
    Vec2,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    critter_workspace: Vec<CritterCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Only towers whose cooldown elapsed look for critters, so every target
    /// produced here is a shot the tower may take right away. A critter is in
    /// range when the detector reports an overlap between the tower's range
    /// circle and the critter's body. Each tower picks the nearest critter in
    /// range; equal distances prefer the smaller critter identifier. The
    /// output buffer is cleared before populating it with the latest
    /// assignments.
    pub fn handle<D: OverlapDetector + ?Sized>(
        &mut self,
        play_mode: PlayMode,
        towers: &TowerView,
        critters: &CritterView,
        detector: &D,
        critter_radius: f32,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if play_mode != PlayMode::Attack {
            return;
        }

        if towers.iter().next().is_none() || critters.iter().next().is_none() {
            return;
        }

        self.prepare_tower_workspace(towers);
        if self.tower_workspace.is_empty() {
            return;
        }

        self.prepare_critter_workspace(critters, critter_radius.max(0.0));

        for tower in &self.tower_workspace {
            let reach = Circle::new(tower.position, tower.range);
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.critter_workspace {
                if !detector.overlaps(reach, candidate.body) {
                    continue;
                }

                let current = BestCandidate {
                    distance_sq: tower.position.distance_squared(candidate.body.center),
                    critter: candidate.id,
                    position: candidate.body.center,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    critter: best_candidate.critter,
                    tower_position: tower.position,
                    critter_position: best_candidate.position,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        let (lower, _) = towers.iter().size_hint();
        self.tower_workspace.reserve(lower);

        for snapshot in towers.iter() {
            if !snapshot.ready || snapshot.range <= 0.0 {
                continue;
            }

            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                position: snapshot.position,
                range: snapshot.range,
            });
        }
    }

    fn prepare_critter_workspace(&mut self, critters: &CritterView, radius: f32) {
        self.critter_workspace.clear();
        let (lower, _) = critters.iter().size_hint();
        self.critter_workspace.reserve(lower);

        for snapshot in critters.iter() {
            self.critter_workspace.push(CritterCandidate {
                id: snapshot.id,
                body: Circle::new(snapshot.position, radius),
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: Vec2,
    range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CritterCandidate {
    id: CritterId,
    body: Circle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    critter: CritterId,
    position: Vec2,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.critter < other.critter
    }
}
