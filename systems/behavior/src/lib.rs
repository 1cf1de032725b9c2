#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-enemy chase, attack, scream and patrol decisions.

use std::{collections::BTreeMap, time::Duration};

use dread_core::{
    config::BehaviorConfig, timer, timer::Interval, Command, EnemyId, EnemySnapshot, EnemyState,
    EnemyView, Event, NavigationMode, Vec3, WorldQuery,
};
use dread_system_placement::sample_disk;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Pure system that gives every live enemy its own think timer.
#[derive(Debug)]
pub struct Behavior {
    think_interval: Duration,
    arrival_tolerance: f32,
    thinkers: BTreeMap<EnemyId, Interval>,
    rng: ChaCha8Rng,
}

impl Behavior {
    /// Creates the behaviour system.
    #[must_use]
    pub fn new(config: &BehaviorConfig, seed: u64) -> Self {
        Self {
            think_interval: timer::seconds(config.think_interval),
            arrival_tolerance: config.arrival_tolerance.max(0.0),
            thinkers: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Number of enemies currently holding a think timer.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.thinkers.len()
    }

    /// Consumes world events and the enemy view to emit behaviour commands.
    pub fn handle<Q: WorldQuery + ?Sized>(
        &mut self,
        events: &[Event],
        now: Duration,
        enemies: &EnemyView,
        target: Vec3,
        query: &Q,
        out: &mut Vec<Command>,
    ) {
        let mut advanced = false;
        for event in events {
            match event {
                Event::EnemySpawned { enemy, .. } => {
                    let _ = self
                        .thinkers
                        .insert(*enemy, Interval::immediate(self.think_interval, now));
                }
                Event::EnemyDied { enemy } => {
                    let _ = self.thinkers.remove(enemy);
                }
                Event::TimeAdvanced { .. } => advanced = true,
                _ => {}
            }
        }
        if !advanced {
            return;
        }

        self.thinkers.retain(|enemy, _| enemies.get(*enemy).is_some());
        for snapshot in enemies.iter() {
            if snapshot.paused || snapshot.state == EnemyState::Dead {
                continue;
            }
            let think_interval = self.think_interval;
            let timer = self
                .thinkers
                .entry(snapshot.id)
                .or_insert_with(|| Interval::immediate(think_interval, now));
            if timer.poll(now) {
                self.think(snapshot, target, query, out);
            }
        }
    }

    fn think<Q: WorldQuery + ?Sized>(
        &mut self,
        enemy: &EnemySnapshot,
        target: Vec3,
        query: &Q,
        out: &mut Vec<Command>,
    ) {
        let distance = enemy.position.distance(target);
        if distance <= enemy.stats.detection_range {
            out.push(Command::NavigateEnemy {
                enemy: enemy.id,
                destination: target,
                mode: NavigationMode::Chase,
            });
            if distance <= enemy.stats.attack_range && enemy.attack_ready {
                out.push(Command::EnemyAttack { enemy: enemy.id });
            }
            if enemy.scream_ready {
                out.push(Command::EnemyScream { enemy: enemy.id });
            }
            return;
        }

        // A lost target is still followed to its last known position.
        let needs_point = enemy.destination.map_or(true, |destination| {
            enemy.position.distance(destination) <= self.arrival_tolerance
        });
        if !needs_point {
            return;
        }

        let radius = enemy.stats.patrol_radius;
        let candidate = sample_disk(enemy.position, radius, &mut self.rng);
        match query.snap_to_navigable(candidate, radius) {
            Some(destination) => out.push(Command::NavigateEnemy {
                enemy: enemy.id,
                destination,
                mode: NavigationMode::Patrol,
            }),
            None => log::trace!("enemy {} found no patrol point", enemy.id.get()),
        }
    }
}
