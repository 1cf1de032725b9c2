#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session wiring for the Dread director.
//!
//! A [`Session`] owns the authoritative world, every pure system and the
//! host's collaborators. Each host call enqueues one command; the session
//! applies it, hands the resulting events to the sound sink, the tension
//! observers and the systems, and keeps applying the commands the systems
//! propose until the queue is empty.

mod config;
mod observers;

use std::{collections::VecDeque, time::Duration};

use dread_core::{Command, Event, SoundSink, Vec3, WorldQuery};
use dread_system_behavior::Behavior;
use dread_system_horror_events::{HorrorEventScheduler, SchedulerView};
use dread_system_population::PopulationDirector;
use dread_system_spawner::{AnchorSpawner, SpawnerView};
use dread_world::{self as world, query, World};

pub use config::{ConfigError, SessionConfig};
pub use observers::{ObserverId, TensionObservers, TensionSignal};

const POPULATION_STREAM: u64 = 0x5a17_3c0f_9e21_6b44;
const SPAWNER_STREAM: u64 = 0x1d8e_47a2_c3f9_0b65;
const SCHEDULER_STREAM: u64 = 0x7b3c_e915_02da_4f87;
const BEHAVIOR_STREAM: u64 = 0x2f64_a8d1_5c07_e393;

/// Running game session.
pub struct Session<Q: WorldQuery, S: SoundSink> {
    world: World,
    population: PopulationDirector,
    spawner: AnchorSpawner,
    scheduler: HorrorEventScheduler,
    behavior: Behavior,
    query: Q,
    sound: S,
    observers: TensionObservers,
    outbox: Vec<Event>,
    torn_down: bool,
}

impl<Q: WorldQuery, S: SoundSink> Session<Q, S> {
    /// Starts a session at time zero and runs the first pass of every
    /// periodic routine.
    pub fn new(config: &SessionConfig, query: Q, sound: S) -> Self {
        let start = Duration::ZERO;
        let mut session = Self {
            world: World::new(config.world_config()),
            population: PopulationDirector::new(
                &config.population,
                start,
                config.seed ^ POPULATION_STREAM,
            ),
            spawner: AnchorSpawner::new(&config.spawner, start, config.seed ^ SPAWNER_STREAM),
            scheduler: HorrorEventScheduler::new(
                &config.scheduler,
                start,
                config.seed ^ SCHEDULER_STREAM,
            ),
            behavior: Behavior::new(&config.behavior, config.seed ^ BEHAVIOR_STREAM),
            query,
            sound,
            observers: TensionObservers::new(),
            outbox: Vec::new(),
            torn_down: false,
        };
        log::info!(
            "session started with {} enemy type(s), {} horror event(s), {} anchor(s)",
            config.enemy_types.len(),
            config.horror_events.len(),
            config.anchors.len()
        );
        session.apply(Command::Tick { dt: Duration::ZERO });
        session
    }

    /// Advances session time by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.apply(Command::Tick { dt });
    }

    /// Reports the target's new position.
    pub fn move_target(&mut self, position: Vec3) {
        self.apply(Command::MoveTarget { position });
    }

    /// Raises tension by `amount`.
    pub fn add_tension(&mut self, amount: f32) {
        self.apply(Command::AddTension { amount });
    }

    /// Triggers a horror event by name, bypassing every gate.
    pub fn trigger_horror_event(&mut self, name: impl Into<String>) {
        self.apply(Command::TriggerHorrorEvent { name: name.into() });
    }

    /// Freezes or resumes every enemy.
    pub fn pause_enemies(&mut self, paused: bool) {
        self.apply(Command::PauseEnemies { paused });
    }

    /// Applies `command` and every command the systems propose in response.
    pub fn apply(&mut self, command: Command) {
        let mut queue = VecDeque::from([command]);
        while let Some(command) = queue.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);
            if events.is_empty() {
                continue;
            }
            self.dispatch(&events);

            let mut proposals = Vec::new();
            self.run_systems(&events, &mut proposals);
            queue.extend(proposals);
            self.outbox.extend(events);
        }
    }

    fn dispatch(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::SoundRequested { id, fade_in } => self.sound.play_named(id, *fade_in),
                Event::TensionChanged { value } => {
                    self.observers.notify(TensionSignal::Changed(*value));
                }
                Event::TensionThresholdReached { value } => {
                    log::debug!("tension threshold reached at {value:.1}");
                    self.observers
                        .notify(TensionSignal::ThresholdReached(*value));
                }
                _ => {}
            }
        }
    }

    fn run_systems(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let now = query::now(&self.world);
        let target = query::target(&self.world);
        let population = query::population(&self.world);
        let tension = query::tension(&self.world).current();

        self.population
            .handle(events, now, population, target, &self.query, out);
        self.spawner.handle(
            events,
            SpawnerView {
                now,
                tension,
                population,
                anchors: query::anchors(&self.world),
                target,
            },
            &self.query,
            out,
        );
        self.scheduler.handle(
            events,
            SchedulerView {
                now,
                tension,
                catalog: query::horror_events(&self.world),
                ledger: query::trigger_ledger(&self.world),
            },
            out,
        );
        self.behavior.handle(
            events,
            now,
            &query::enemy_view(&self.world),
            target,
            &self.query,
            out,
        );
    }

    /// Removes and returns every event produced since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    /// Registry of tension observers.
    pub fn observers_mut(&mut self) -> &mut TensionObservers {
        &mut self.observers
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The host's sound sink.
    #[must_use]
    pub fn sound(&self) -> &S {
        &self.sound
    }

    /// The host's spatial queries.
    #[must_use]
    pub fn world_query(&self) -> &Q {
        &self.query
    }

    /// Reports whether the session was torn down.
    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Stops every routine and force-kills all live enemies. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.spawner.halt();
        self.scheduler.halt();

        let mut commands = Vec::new();
        self.population.teardown(&mut commands);
        for command in commands {
            self.apply(command);
        }
        log::info!(
            "session torn down at {:.1}s",
            query::now(&self.world).as_secs_f32()
        );
    }
}

impl<Q: WorldQuery, S: SoundSink> Drop for Session<Q, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
