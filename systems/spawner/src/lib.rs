#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tension-driven spawner that releases small batches of enemies at the
//! level's spawn anchors.

use std::time::Duration;

use dread_core::{
    config::SpawnerConfig,
    timer,
    timer::{Cooldown, Interval},
    Command, EnemyTypeId, Event, PopulationSnapshot, SpawnAnchor, Vec3, WorldQuery,
};
use dread_system_placement::{
    choose_anchor, eligible_anchors, find_valid_position, SearchRegion, DEFAULT_ATTEMPTS,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Tension granted for every enemy an anchor batch spawns.
pub const SPAWN_TENSION_BONUS: f32 = 20.0;

/// Read-only inputs the spawner needs on every pass.
#[derive(Clone, Copy, Debug)]
pub struct SpawnerView<'a> {
    /// Current session time.
    pub now: Duration,
    /// Current tension.
    pub tension: f32,
    /// Population figures.
    pub population: PopulationSnapshot,
    /// Spawn anchors with their activation flags.
    pub anchors: &'a [SpawnAnchor],
    /// Position of the target.
    pub target: Vec3,
}

/// Pure system that spawns batches at eligible anchors once tension is high.
#[derive(Debug)]
pub struct AnchorSpawner {
    check: Interval,
    cooldown: Cooldown,
    tension_threshold: f32,
    max_per_spawn: u32,
    halted: bool,
    rng: ChaCha8Rng,
}

impl AnchorSpawner {
    /// Creates a spawner for a session starting at `now`.
    ///
    /// The batch cooldown counts from `now`, so the first batch cannot
    /// appear before one full cooldown has passed.
    #[must_use]
    pub fn new(config: &SpawnerConfig, now: Duration, seed: u64) -> Self {
        Self {
            check: Interval::immediate(timer::seconds(config.spawn_check_interval), now),
            cooldown: Cooldown::started_at(timer::seconds(config.spawn_cooldown), now),
            tension_threshold: config.tension_threshold,
            max_per_spawn: config.max_enemies_per_spawn,
            halted: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Time of the last batch, or of session start before any batch.
    #[must_use]
    pub const fn last_batch(&self) -> Option<Duration> {
        self.cooldown.last()
    }

    /// Stops future checks. Idempotent.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// Consumes world events and views to emit anchor spawn commands.
    pub fn handle<Q: WorldQuery + ?Sized>(
        &mut self,
        events: &[Event],
        view: SpawnerView<'_>,
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
        if !self.check.poll(view.now) {
            return;
        }

        if !self.cooldown.is_ready(view.now) || view.tension < self.tension_threshold {
            return;
        }
        let headroom = view.population.headroom();
        if headroom == 0 || view.population.catalog_len == 0 || self.max_per_spawn == 0 {
            return;
        }

        let eligible = eligible_anchors(view.anchors, view.target);
        if eligible.is_empty() {
            log::debug!("no spawn anchor admits the target; skipping batch");
            return;
        }

        let batch = self.rng.gen_range(1..=self.max_per_spawn).min(headroom);
        for _ in 0..batch {
            let Some(anchor) = choose_anchor(&eligible, &mut self.rng) else {
                break;
            };
            let kind = EnemyTypeId::new(self.rng.gen_range(0..view.population.catalog_len));
            let position = find_valid_position(
                query,
                SearchRegion::Anchor(anchor),
                view.target,
                DEFAULT_ATTEMPTS,
                &mut self.rng,
            );
            out.push(Command::SpawnEnemy {
                kind,
                position,
                tension_bonus: SPAWN_TENSION_BONUS,
            });
        }
        log::debug!("anchor spawner released a batch of {batch}");
        self.cooldown.trigger(view.now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_counts_from_session_start() {
        let spawner = AnchorSpawner::new(&SpawnerConfig::default(), Duration::from_secs(2), 1);
        assert_eq!(spawner.last_batch(), Some(Duration::from_secs(2)));
    }
}
