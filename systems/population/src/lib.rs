#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Periodic population routines: the around-target spawn loop and difficulty
//! escalation.
//!
//! The system only proposes commands. The world re-checks the population
//! ceiling when it applies a spawn, so concurrent spawners can never push the
//! live set past its limit.

use std::time::Duration;

use dread_core::{
    config::PopulationConfig, timer, timer::Interval, Command, EnemyTypeId, Event,
    PopulationSnapshot, Vec3, WorldQuery,
};
use dread_system_placement::{find_valid_position, SearchRegion, DEFAULT_ATTEMPTS};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pure system driving the spawn and escalation routines.
#[derive(Debug)]
pub struct PopulationDirector {
    spawn: Interval,
    escalation: Interval,
    halted: bool,
    rng: ChaCha8Rng,
}

impl PopulationDirector {
    /// Creates the routines for a session starting at `now`.
    ///
    /// The spawn routine runs right away; escalation waits one full period.
    #[must_use]
    pub fn new(config: &PopulationConfig, now: Duration, seed: u64) -> Self {
        Self {
            spawn: Interval::immediate(timer::seconds(config.spawn_interval), now),
            escalation: Interval::delayed(
                timer::seconds(config.difficulty_increase_interval),
                now,
            ),
            halted: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Session time of the next spawn attempt.
    #[must_use]
    pub fn next_spawn(&self) -> Duration {
        self.spawn.next_due()
    }

    /// Session time of the next escalation.
    #[must_use]
    pub fn next_escalation(&self) -> Duration {
        self.escalation.next_due()
    }

    /// Reports whether the routines were stopped.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Consumes world events and views to emit spawn and escalation commands.
    pub fn handle<Q: WorldQuery + ?Sized>(
        &mut self,
        events: &[Event],
        now: Duration,
        population: PopulationSnapshot,
        target: Vec3,
        query: &Q,
        out: &mut Vec<Command>,
    ) {
        if self.halted {
            return;
        }
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        self.spawn.set_period(population.spawn_interval);
        if self.spawn.poll(now) {
            self.try_spawn(population, target, query, out);
        }

        if self.escalation.poll(now) {
            out.push(Command::EscalateDifficulty);
        }
    }

    fn try_spawn<Q: WorldQuery + ?Sized>(
        &mut self,
        population: PopulationSnapshot,
        target: Vec3,
        query: &Q,
        out: &mut Vec<Command>,
    ) {
        if population.headroom() == 0 || population.catalog_len == 0 {
            return;
        }

        let kind = EnemyTypeId::new(self.rng.gen_range(0..population.catalog_len));
        let position = find_valid_position(
            query,
            SearchRegion::AroundTarget,
            target,
            DEFAULT_ATTEMPTS,
            &mut self.rng,
        );
        log::debug!("population routine spawning type {} at {position}", kind.get());
        out.push(Command::SpawnEnemy {
            kind,
            position,
            tension_bonus: 0.0,
        });
    }

    /// Stops both routines and force-kills every live enemy.
    pub fn teardown(&mut self, out: &mut Vec<Command>) {
        self.halted = true;
        out.push(Command::KillAllEnemies);
    }
}
