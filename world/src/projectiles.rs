//! Projectiles in flight and their homing motion.

use std::{collections::BTreeMap, time::Duration};

use critter_defence_core::{CritterId, ProjectileId, TowerId, Vec2};

/// Damage payload copied from the firing tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Payload {
    pub(crate) damage: f32,
    /// Fraction of the damage applied around the impact; zero disables splash.
    pub(crate) splash_modifier: f32,
    pub(crate) splash_radius: f32,
    /// Slow magnitude; zero disables slowing.
    pub(crate) slow: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) tower: TowerId,
    pub(crate) target: CritterId,
    pub(crate) position: Vec2,
    pub(crate) speed: f32,
    pub(crate) payload: Payload,
}

/// Result of advancing a projectile for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Flight {
    /// Still chasing the target.
    Homing,
    /// Reached the target at the provided point.
    Impact(Vec2),
}

impl Projectile {
    /// Moves toward the target, reporting an impact when it is reached.
    pub(crate) fn fly(&mut self, target: Vec2, dt: Duration, threshold: f32) -> Flight {
        let offset = target - self.position;
        let distance = offset.length();
        let step = self.speed * dt.as_secs_f32();

        if distance < threshold || distance <= step {
            self.position = target;
            return Flight::Impact(target);
        }

        self.position += offset / distance * step;
        Flight::Homing
    }
}

/// Registry storing projectiles in flight in identifier order.
#[derive(Debug)]
pub(crate) struct ProjectileField {
    entries: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: ProjectileId,
}

impl ProjectileField {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn launch(
        &mut self,
        tower: TowerId,
        target: CritterId,
        position: Vec2,
        speed: f32,
        payload: Payload,
    ) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            Projectile {
                id,
                tower,
                target,
                position,
                speed,
                payload,
            },
        );
        id
    }

    pub(crate) fn ids(&self) -> Vec<ProjectileId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn get_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: ProjectileId) -> Option<Projectile> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.entries.values()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
