#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Dread director.
//!
//! The world owns the tension scalar, the live enemy set and the horror event
//! trigger ledger. Every mutation arrives as a [`Command`] through [`apply`],
//! which reports what happened as [`Event`] values.

mod enemy;
mod incidents;
mod population;
pub mod tension;

use std::time::Duration;

use dread_core::{
    config::{BehaviorConfig, PopulationConfig, TensionConfig},
    timer, Command, EnemyId, EnemyTypeSpec, Event, HorrorEventSpec, SpawnAnchor, Vec3,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use incidents::{Effect, Incidents};
use population::Population;
pub use population::{
    ESCALATION_MULTIPLIER_STEP, ESCALATION_STAT_GROWTH, POPULATION_HARD_CEILING,
    SPAWN_INTERVAL_DECAY, SPAWN_INTERVAL_FLOOR,
};
use tension::TensionEngine;

/// Tension added when an enemy attacks the target.
pub const ATTACK_TENSION: f32 = 10.0;
/// Tension added when an enemy screams.
pub const SCREAM_TENSION: f32 = 25.0;
/// Tension added when an enemy dies.
pub const DEATH_TENSION: f32 = 15.0;

/// Everything the world needs to start a session.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Tension scalar tuning.
    pub tension: TensionConfig,
    /// Population ceiling and cadence tuning.
    pub population: PopulationConfig,
    /// Per-enemy lifecycle tuning.
    pub behavior: BehaviorConfig,
    /// Initial enemy catalog.
    pub enemy_types: Vec<EnemyTypeSpec>,
    /// Initial horror event catalog.
    pub horror_events: Vec<HorrorEventSpec>,
    /// Spawn anchors placed in the level.
    pub anchors: Vec<SpawnAnchor>,
    /// Seed for the world's sound variant selection.
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tension: TensionConfig::default(),
            population: PopulationConfig::default(),
            behavior: BehaviorConfig::default(),
            enemy_types: vec![EnemyTypeSpec::default()],
            horror_events: Vec::new(),
            anchors: Vec::new(),
            seed: 0,
        }
    }
}

/// Represents the authoritative state of a running session.
#[derive(Debug)]
pub struct World {
    now: Duration,
    target: Vec3,
    tension: TensionEngine,
    population: Population,
    incidents: Incidents,
    anchors: Vec<SpawnAnchor>,
    corpse_grace: Duration,
    enemies_paused: bool,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world at session time zero.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            now: Duration::ZERO,
            target: Vec3::ZERO,
            tension: TensionEngine::new(&config.tension),
            population: Population::new(&config.population, config.enemy_types),
            incidents: Incidents::new(config.horror_events),
            anchors: config.anchors,
            corpse_grace: timer::seconds(config.behavior.corpse_grace),
            enemies_paused: false,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    fn request_sound(&mut self, variants: &[String], out_events: &mut Vec<Event>) {
        if let Some(id) = variants.choose(&mut self.rng) {
            out_events.push(Event::SoundRequested {
                id: id.clone(),
                fade_in: false,
            });
        }
    }

    fn release_effects(&mut self, out_events: &mut Vec<Event>) {
        for effect in self.incidents.release_due(self.now) {
            match effect {
                Effect::PlaySound(id) => {
                    out_events.push(Event::SoundRequested { id, fade_in: false });
                }
                Effect::AddTension(amount) => self.tension.add(amount, self.now, out_events),
                Effect::Finish { name, objects } => {
                    for object in objects {
                        out_events.push(Event::ObjectDeactivated { object });
                    }
                    log::debug!("horror event {name} finished");
                    out_events.push(Event::HorrorEventFinished { name });
                }
            }
        }
    }

    fn despawn_corpses(&mut self, out_events: &mut Vec<Event>) {
        for enemy in self.population.despawn_due(self.now) {
            out_events.push(Event::EnemyDespawned { enemy });
        }
    }

    /// Completes the death of an instance that just entered `Dead`.
    fn bury(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let death_sounds = self
            .population
            .live_mut(enemy)
            .map(|instance| instance.sounds.death.clone())
            .unwrap_or_default();
        let despawn_at = self.now.saturating_add(self.corpse_grace);
        if !self.population.retire(enemy, despawn_at) {
            return;
        }

        log::debug!("enemy {} died", enemy.get());
        out_events.push(Event::EnemyDied { enemy });
        self.request_sound(&death_sounds, out_events);
        self.tension.add(DEATH_TENSION, self.now, out_events);
    }

    fn difficulty_changed(&self, out_events: &mut Vec<Event>) {
        out_events.push(Event::DifficultyChanged {
            multiplier: self.population.difficulty_multiplier(),
            max_enemies: self.population.max_enemies(),
            spawn_interval: self.population.spawn_interval(),
            catalog_version: self.population.catalog().version(),
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.now = world.now.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.tension.decay(dt, out_events);
            world.release_effects(out_events);
            world.despawn_corpses(out_events);
        }
        Command::MoveTarget { position } => {
            world.target = position;
            out_events.push(Event::TargetMoved { position });
        }
        Command::AddTension { amount } => {
            world.tension.add(amount, world.now, out_events);
        }
        Command::ConfigureTensionEvents {
            threshold,
            cooldown,
        } => {
            world.tension.configure_events(threshold, cooldown);
        }
        Command::SpawnEnemy {
            kind,
            position,
            tension_bonus,
        } => match world.population.spawn(kind, position) {
            Ok(enemy) => {
                if world.enemies_paused {
                    if let Some(instance) = world.population.live_mut(enemy) {
                        let _ = instance.set_paused(true);
                    }
                }
                log::debug!("enemy {} spawned at {position}", enemy.get());
                out_events.push(Event::EnemySpawned {
                    enemy,
                    kind,
                    position,
                });
                if tension_bonus > 0.0 {
                    world.tension.add(tension_bonus, world.now, out_events);
                }
            }
            Err(reason) => {
                log::warn!("spawn of type {} rejected: {reason:?}", kind.get());
                out_events.push(Event::SpawnRejected { kind, reason });
            }
        },
        Command::EscalateDifficulty => {
            world.population.escalate();
            log::info!(
                "difficulty escalated to x{:.1}: max enemies {}, spawn interval {:.1}s",
                world.population.difficulty_multiplier(),
                world.population.max_enemies(),
                world.population.spawn_interval().as_secs_f32()
            );
            world.difficulty_changed(out_events);
        }
        Command::ResetDifficulty => {
            world.population.reset_difficulty();
            log::info!("difficulty reset to baseline");
            world.difficulty_changed(out_events);
        }
        Command::DamageEnemy { enemy, amount } => {
            let killed = world
                .population
                .live_mut(enemy)
                .is_some_and(|instance| instance.take_damage(amount));
            if killed {
                world.bury(enemy, out_events);
            }
        }
        Command::KillEnemy { enemy } => {
            let killed = world
                .population
                .live_mut(enemy)
                .is_some_and(|instance| instance.die());
            if killed {
                world.bury(enemy, out_events);
            }
        }
        Command::KillAllEnemies => {
            for enemy in world.population.live_ids() {
                let killed = world
                    .population
                    .live_mut(enemy)
                    .is_some_and(|instance| instance.die());
                if killed {
                    world.bury(enemy, out_events);
                }
            }
        }
        Command::PauseEnemies { paused } => {
            world.enemies_paused = paused;
            for instance in world.population.live_iter_mut() {
                if instance.set_paused(paused) {
                    out_events.push(Event::EnemyPauseChanged {
                        enemy: instance.id(),
                        paused,
                    });
                }
            }
        }
        Command::NavigateEnemy {
            enemy,
            destination,
            mode,
        } => {
            if let Some(instance) = world.population.live_mut(enemy) {
                if !instance.is_idle() {
                    instance.navigate(destination, mode);
                    out_events.push(Event::NavigationRequested { enemy, destination });
                }
            }
        }
        Command::ReportEnemyPosition { enemy, position } => {
            if let Some(instance) = world.population.live_mut(enemy) {
                if !instance.is_idle() {
                    instance.relocate(position);
                }
            }
        }
        Command::EnemyAttack { enemy } => {
            let now = world.now;
            let Some(instance) = world.population.live_mut(enemy) else {
                return;
            };
            if instance.is_idle() || !instance.try_attack(now) {
                return;
            }
            let damage = instance.stats().damage;
            let sounds = instance.sounds.attack.clone();
            world.request_sound(&sounds, out_events);
            out_events.push(Event::EnemyAttacked { enemy, damage });
            world.tension.add(ATTACK_TENSION, now, out_events);
        }
        Command::EnemyScream { enemy } => {
            let now = world.now;
            let Some(instance) = world.population.live_mut(enemy) else {
                return;
            };
            if instance.is_idle() || !instance.try_scream(now) {
                return;
            }
            let sounds = instance.sounds.scream.clone();
            if sounds.is_empty() {
                return;
            }
            world.request_sound(&sounds, out_events);
            out_events.push(Event::EnemyScreamed { enemy });
            world.tension.add(SCREAM_TENSION, now, out_events);
        }
        Command::TriggerHorrorEvent { name } => {
            if world.incidents.trigger(&name, world.now, out_events) {
                log::debug!("horror event {name} triggered");
                world.release_effects(out_events);
            } else {
                log::warn!("unknown horror event {name}");
                out_events.push(Event::HorrorEventRejected { name });
            }
        }
        Command::AddHorrorEvent { spec } => {
            world.incidents.add(spec);
        }
        Command::RemoveHorrorEvent { name } => {
            let removed = world.incidents.remove(&name);
            log::debug!("removed {removed} horror event(s) named {name}");
        }
        Command::ResetOneTimeEvents => {
            world.incidents.reset_one_time();
        }
        Command::SetAnchorActive { index, active } => {
            if let Some(anchor) = world.anchors.get_mut(index) {
                anchor.is_active = active;
                out_events.push(Event::AnchorToggled { index, active });
            }
        }
        Command::SetAllAnchorsActive { active } => {
            for (index, anchor) in world.anchors.iter_mut().enumerate() {
                anchor.is_active = active;
                out_events.push(Event::AnchorToggled { index, active });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{tension::TensionEngine, World};
    use dread_core::{
        EnemyId, EnemySnapshot, EnemyTypeSpec, EnemyView, HorrorEventSpec, PopulationSnapshot,
        SpawnAnchor, TriggerLedger, Vec3,
    };

    /// Session time elapsed since the world was created.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Last reported position of the target.
    #[must_use]
    pub fn target(world: &World) -> Vec3 {
        world.target
    }

    /// Read-only access to the tension engine.
    #[must_use]
    pub fn tension(world: &World) -> &TensionEngine {
        &world.tension
    }

    /// Population figures used by spawning systems.
    #[must_use]
    pub fn population(world: &World) -> PopulationSnapshot {
        world.population.snapshot()
    }

    /// Captures a read-only view of every live enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .population
                .live()
                .map(|instance| instance.snapshot(world.now))
                .collect(),
        )
    }

    /// Snapshot of a single live enemy.
    #[must_use]
    pub fn enemy(world: &World, enemy: EnemyId) -> Option<EnemySnapshot> {
        world
            .population
            .get(enemy)
            .map(|instance| instance.snapshot(world.now))
    }

    /// Whether enemies are currently frozen.
    #[must_use]
    pub fn enemies_paused(world: &World) -> bool {
        world.enemies_paused
    }

    /// Number of dead instances waiting for their despawn.
    #[must_use]
    pub fn corpse_count(world: &World) -> usize {
        world.population.corpse_count()
    }

    /// Current enemy catalog, including escalation.
    #[must_use]
    pub fn enemy_catalog(world: &World) -> &[EnemyTypeSpec] {
        world.population.catalog().types()
    }

    /// Spawn anchors with their current activation flags.
    #[must_use]
    pub fn anchors(world: &World) -> &[SpawnAnchor] {
        &world.anchors
    }

    /// Current horror event catalog.
    #[must_use]
    pub fn horror_events(world: &World) -> &[HorrorEventSpec] {
        world.incidents.catalog()
    }

    /// Runtime bookkeeping for horror events.
    #[must_use]
    pub fn trigger_ledger(world: &World) -> &TriggerLedger {
        world.incidents.ledger()
    }

    /// Names of horror events whose active window is still open.
    #[must_use]
    pub fn active_horror_events(world: &World) -> Vec<String> {
        world.incidents.active().keys().cloned().collect()
    }

    /// Number of deferred horror event effects still queued.
    #[must_use]
    pub fn pending_effects(world: &World) -> usize {
        world.incidents.pending_effects()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dread_core::{
        EnemySounds, EnemyState, EnemyTypeId, NavigationMode, SpawnRejection, TimedSound,
    };

    fn spawn(world: &mut World, events: &mut Vec<Event>) -> EnemyId {
        apply(
            world,
            Command::SpawnEnemy {
                kind: EnemyTypeId::new(0),
                position: Vec3::ZERO,
                tension_bonus: 0.0,
            },
            events,
        );
        events
            .iter()
            .rev()
            .find_map(|event| match event {
                Event::EnemySpawned { enemy, .. } => Some(*enemy),
                _ => None,
            })
            .expect("spawned")
    }

    fn screaming_world() -> World {
        World::new(WorldConfig {
            enemy_types: vec![EnemyTypeSpec {
                sounds: EnemySounds {
                    scream: vec![String::from("shriek")],
                    attack: vec![String::from("slash")],
                    death: vec![String::from("gurgle")],
                },
                ..EnemyTypeSpec::default()
            }],
            ..WorldConfig::default()
        })
    }

    #[test]
    fn tick_advances_clock_and_decays() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(&mut world, Command::AddTension { amount: 20.0 }, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
            &mut events,
        );

        assert_eq!(query::now(&world), Duration::from_secs(2));
        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced {
                    dt: Duration::from_secs(2)
                },
                Event::TensionChanged { value: 10.0 },
            ]
        );
    }

    #[test]
    fn death_shrinks_live_set_and_raises_tension_once() {
        let mut world = screaming_world();
        let mut events = Vec::new();
        let enemy = spawn(&mut world, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::DamageEnemy {
                enemy,
                amount: 150.0,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DamageEnemy {
                enemy,
                amount: 150.0,
            },
            &mut events,
        );
        apply(&mut world, Command::KillEnemy { enemy }, &mut events);

        assert_eq!(query::population(&world).live, 0);
        assert_eq!(query::corpse_count(&world), 1);
        assert!((query::tension(&world).current() - DEATH_TENSION).abs() < f32::EPSILON);
        assert_eq!(
            events,
            vec![
                Event::EnemyDied { enemy },
                Event::SoundRequested {
                    id: String::from("gurgle"),
                    fade_in: false
                },
                Event::TensionChanged { value: 15.0 },
            ]
        );
    }

    #[test]
    fn corpses_despawn_after_grace_delay() {
        let mut world = World::default();
        let mut events = Vec::new();
        let enemy = spawn(&mut world, &mut events);
        apply(&mut world, Command::KillEnemy { enemy }, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(4),
            },
            &mut events,
        );
        assert!(!events.contains(&Event::EnemyDespawned { enemy }));
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert!(events.contains(&Event::EnemyDespawned { enemy }));
        assert_eq!(query::corpse_count(&world), 0);
    }

    #[test]
    fn spawn_at_ceiling_is_rejected() {
        let mut world = World::new(WorldConfig {
            population: PopulationConfig {
                max_enemies: 1,
                ..PopulationConfig::default()
            },
            ..WorldConfig::default()
        });
        let mut events = Vec::new();
        let _ = spawn(&mut world, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyTypeId::new(0),
                position: Vec3::ONE,
                tension_bonus: 20.0,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::SpawnRejected {
                kind: EnemyTypeId::new(0),
                reason: SpawnRejection::PopulationCeiling
            }]
        );
        assert_eq!(query::tension(&world).current(), 0.0);
    }

    #[test]
    fn scream_without_sounds_restarts_cooldown_silently() {
        let mut world = World::default();
        let mut events = Vec::new();
        let enemy = spawn(&mut world, &mut events);
        events.clear();

        apply(&mut world, Command::EnemyScream { enemy }, &mut events);
        assert!(events.is_empty());
        let snapshot = query::enemy(&world, enemy).expect("live");
        assert!(!snapshot.scream_ready);
    }

    #[test]
    fn attack_respects_cooldown() {
        let mut world = screaming_world();
        let mut events = Vec::new();
        let enemy = spawn(&mut world, &mut events);
        events.clear();

        apply(&mut world, Command::EnemyAttack { enemy }, &mut events);
        apply(&mut world, Command::EnemyAttack { enemy }, &mut events);
        let attacks = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyAttacked { .. }))
            .count();
        assert_eq!(attacks, 1);
        assert!((query::tension(&world).current() - ATTACK_TENSION).abs() < f32::EPSILON);
    }

    #[test]
    fn paused_enemies_ignore_navigation() {
        let mut world = World::default();
        let mut events = Vec::new();
        let enemy = spawn(&mut world, &mut events);
        apply(&mut world, Command::PauseEnemies { paused: true }, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::NavigateEnemy {
                enemy,
                destination: Vec3::X,
                mode: NavigationMode::Chase,
            },
            &mut events,
        );
        assert!(events.is_empty());
        let snapshot = query::enemy(&world, enemy).expect("live");
        assert!(snapshot.paused);
        assert_eq!(snapshot.state, EnemyState::Patrol);

        let moved = Vec3::new(3.0, 0.0, 0.0);
        let report = Command::ReportEnemyPosition {
            enemy,
            position: moved,
        };
        apply(&mut world, report.clone(), &mut events);
        let held = query::enemy(&world, enemy).expect("live").position;
        assert_eq!(held, snapshot.position);

        let late = spawn(&mut world, &mut events);
        assert!(query::enemy(&world, late).expect("live").paused);

        apply(&mut world, Command::PauseEnemies { paused: false }, &mut events);
        apply(&mut world, report, &mut events);
        assert_eq!(query::enemy(&world, enemy).expect("live").position, moved);
    }

    #[test]
    fn horror_event_runs_its_full_timeline() {
        let mut world = World::new(WorldConfig {
            horror_events: vec![HorrorEventSpec {
                name: String::from("lights"),
                objects: vec![String::from("lamp")],
                sounds: vec![TimedSound {
                    sound: String::from("buzz"),
                    delay: 0.0,
                }],
                tension_amount: 30.0,
                event_duration: 2.0,
                ..HorrorEventSpec::default()
            }],
            ..WorldConfig::default()
        });
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::TriggerHorrorEvent {
                name: String::from("lights"),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::HorrorEventTriggered {
                    name: String::from("lights")
                },
                Event::ObjectActivated {
                    object: String::from("lamp")
                },
                Event::SoundRequested {
                    id: String::from("buzz"),
                    fade_in: false
                },
                Event::TensionChanged { value: 30.0 },
            ]
        );
        assert_eq!(query::active_horror_events(&world), vec![String::from("lights")]);

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
            &mut events,
        );
        assert!(events.contains(&Event::ObjectDeactivated {
            object: String::from("lamp")
        }));
        assert!(events.contains(&Event::HorrorEventFinished {
            name: String::from("lights")
        }));
        assert!(query::active_horror_events(&world).is_empty());
        assert_eq!(query::pending_effects(&world), 0);
    }

    #[test]
    fn unknown_horror_event_is_rejected() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::TriggerHorrorEvent {
                name: String::from("nope"),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::HorrorEventRejected {
                name: String::from("nope")
            }]
        );
    }

    #[test]
    fn anchors_toggle_individually_and_together() {
        let mut world = World::new(WorldConfig {
            anchors: vec![SpawnAnchor::at(Vec3::X), SpawnAnchor::at(Vec3::Z)],
            ..WorldConfig::default()
        });
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetAnchorActive {
                index: 1,
                active: false,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetAnchorActive {
                index: 9,
                active: false,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::AnchorToggled {
                index: 1,
                active: false
            }]
        );
        assert!(query::anchors(&world)[0].is_active);
        assert!(!query::anchors(&world)[1].is_active);

        apply(&mut world, Command::SetAllAnchorsActive { active: false }, &mut events);
        assert!(query::anchors(&world)
            .iter()
            .all(|anchor| !anchor.is_active));
    }
}
