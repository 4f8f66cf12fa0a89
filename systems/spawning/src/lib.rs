#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave cadence system responsible for emitting critter spawn commands.

use std::time::Duration;

use critter_defence_core::{Command, PlayMode, WavePhase, WaveSnapshot};

/// Pure system that paces the spawns of the running wave.
#[derive(Debug, Default)]
pub struct Spawning {
    accumulator: Duration,
}

impl Spawning {
    /// Creates a new spawning system with an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates elapsed time and emits one spawn per elapsed interval.
    ///
    /// Time only accumulates while the wave is spawning, so the first critter
    /// of a wave appears one full interval after the wave started. Never more
    /// than the remaining spawns of the wave are emitted.
    pub fn handle(
        &mut self,
        dt: Duration,
        play_mode: PlayMode,
        wave: &WaveSnapshot,
        out: &mut Vec<Command>,
    ) {
        if play_mode != PlayMode::Attack || wave.phase != WavePhase::Spawning {
            self.accumulator = Duration::ZERO;
            return;
        }

        if dt.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let attempts = self.resolve_spawn_attempts(wave.time_between_spawns);
        let spawns = attempts.min(wave.remaining_spawns());

        for _ in 0..spawns {
            out.push(Command::SpawnCritter {
                kind: wave.critter_kind,
            });
        }
    }

    fn resolve_spawn_attempts(&mut self, interval: Duration) -> u32 {
        if interval.is_zero() {
            self.accumulator = Duration::ZERO;
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= interval {
            self.accumulator -= interval;
            attempts += 1;
        }
        attempts
    }
}
