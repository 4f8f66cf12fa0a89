//! Critter state and movement along the waypoint chain.

use std::{collections::BTreeMap, time::Duration};

use critter_defence_core::{config::CritterStats, CritterId, CritterKind, CritterSnapshot, Vec2};

/// Timed speed reduction applied to a critter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SlowEffect {
    remaining: Duration,
    magnitude: f32,
}

/// Authoritative state of a single critter.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Critter {
    pub(crate) id: CritterId,
    pub(crate) kind: CritterKind,
    /// Wave level the critter belongs to.
    pub(crate) level: u32,
    pub(crate) position: Vec2,
    pub(crate) target_waypoint: usize,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) reward: u32,
    speed: f32,
    slow: Option<SlowEffect>,
}

/// Result of advancing a critter for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Movement {
    /// Still travelling toward the same waypoint.
    Travelling,
    /// Reached a waypoint and now targets the provided index.
    Advanced(usize),
    /// Reached the final waypoint.
    Leaked,
}

/// Result of applying a hit to a critter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum HitOutcome {
    /// The critter survived with the provided health.
    Damaged {
        remaining: f32,
        /// Magnitude of a slow effect that started with this hit.
        slowed: Option<f32>,
    },
    /// Health dropped to zero or below.
    Killed,
}

impl Critter {
    fn spawn(
        id: CritterId,
        kind: CritterKind,
        level: u32,
        position: Vec2,
        stats: CritterStats,
    ) -> Self {
        Self {
            id,
            kind,
            level,
            position,
            target_waypoint: 0,
            health: stats.health,
            max_health: stats.health,
            reward: stats.reward,
            speed: stats.speed,
            slow: None,
        }
    }

    /// Speed after the active slow effect is applied.
    pub(crate) fn current_speed(&self) -> f32 {
        let magnitude = self.slow.map_or(0.0, |slow| slow.magnitude.clamp(0.0, 1.0));
        self.speed - magnitude * self.speed
    }

    /// Moves toward the current waypoint without overshooting it.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        waypoints: &[Vec2],
        threshold: f32,
    ) -> Movement {
        let Some(&target) = waypoints.get(self.target_waypoint) else {
            return Movement::Leaked;
        };

        let offset = target - self.position;
        let distance = offset.length();
        let step = self.current_speed() * dt.as_secs_f32();
        if distance <= step {
            self.position = target;
        } else if distance > 0.0 {
            self.position += offset / distance * step;
        }

        if self.position.distance(target) >= threshold {
            return Movement::Travelling;
        }

        if self.target_waypoint + 1 >= waypoints.len() {
            return Movement::Leaked;
        }

        self.target_waypoint += 1;
        Movement::Advanced(self.target_waypoint)
    }

    /// Subtracts damage and starts a slow effect on survivors.
    ///
    /// A slow that is already running is left untouched.
    pub(crate) fn hit(&mut self, damage: f32, slow: f32, slow_duration: Duration) -> HitOutcome {
        self.health -= damage;
        if self.health <= 0.0 {
            return HitOutcome::Killed;
        }

        let mut slowed = None;
        if slow > 0.0 && self.slow.is_none() {
            self.slow = Some(SlowEffect {
                remaining: slow_duration,
                magnitude: slow,
            });
            slowed = Some(slow);
        }

        HitOutcome::Damaged {
            remaining: self.health,
            slowed,
        }
    }

    /// Counts down the slow effect, returning `true` when it expired.
    pub(crate) fn decay_slow(&mut self, dt: Duration) -> bool {
        let Some(slow) = self.slow.as_mut() else {
            return false;
        };
        slow.remaining = slow.remaining.saturating_sub(dt);
        if slow.remaining.is_zero() {
            self.slow = None;
            return true;
        }
        false
    }

    pub(crate) fn snapshot(&self) -> CritterSnapshot {
        CritterSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            target_waypoint: self.target_waypoint,
            slowed: self.slow.is_some(),
        }
    }
}

/// Registry storing live critters in identifier order.
#[derive(Debug)]
pub(crate) struct CritterRoster {
    entries: BTreeMap<CritterId, Critter>,
    next_critter_id: CritterId,
}

impl CritterRoster {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_critter_id: CritterId::new(0),
        }
    }

    /// Creates a critter with already scaled stats and returns its identifier.
    pub(crate) fn spawn(
        &mut self,
        kind: CritterKind,
        level: u32,
        position: Vec2,
        stats: CritterStats,
    ) -> CritterId {
        let id = self.next_critter_id;
        self.next_critter_id = CritterId::new(id.get().wrapping_add(1));
        let _ = self
            .entries
            .insert(id, Critter::spawn(id, kind, level, position, stats));
        id
    }

    pub(crate) fn get(&self, id: CritterId) -> Option<&Critter> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: CritterId) -> Option<&mut Critter> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: CritterId) -> Option<Critter> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Critter> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Critter> {
        self.entries.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes every critter without resetting identifier allocation.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
