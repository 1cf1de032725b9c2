#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dread director.
//!
//! This crate defines the message surface that connects the session, the
//! authoritative world, and pure systems. Hosts and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and observers to react to deterministically. Systems consume
//! event streams, query immutable snapshots, and respond exclusively with new
//! command batches.

pub mod config;
pub mod timer;

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

pub use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Unique identifier assigned to a spawned enemy instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of an enemy type within the enemy catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyTypeId(u32);

impl EnemyTypeId {
    /// Creates a new type identifier from a catalog index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the catalog index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Catalog index as a `usize`, when representable.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

/// Sound ids an enemy type draws from when it screams, attacks or dies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySounds {
    /// Variants played when the enemy screams.
    pub scream: Vec<String>,
    /// Variants played when the enemy attacks.
    pub attack: Vec<String>,
    /// Variants played when the enemy dies.
    pub death: Vec<String>,
}

/// Catalog template describing one kind of enemy.
///
/// Difficulty escalation scales these values in place; instances copy them
/// out as [`EnemyStats`] when they spawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTypeSpec {
    /// Designer-facing name of the type.
    pub name: String,
    /// Starting health of new instances.
    pub health: f32,
    /// Damage dealt by a single attack.
    pub damage: f32,
    /// Distance within which the enemy attacks.
    pub attack_range: f32,
    /// Distance within which the enemy notices and chases the target.
    pub detection_range: f32,
    /// Radius of the area explored while patrolling.
    pub patrol_radius: f32,
    /// Seconds between attacks.
    pub attack_cooldown: f32,
    /// Seconds between screams.
    pub scream_cooldown: f32,
    /// Sound sets used by the instance.
    pub sounds: EnemySounds,
}

impl Default for EnemyTypeSpec {
    fn default() -> Self {
        Self {
            name: String::from("enemy"),
            health: 100.0,
            damage: 20.0,
            attack_range: 2.0,
            detection_range: 10.0,
            patrol_radius: 5.0,
            attack_cooldown: 1.0,
            scream_cooldown: 30.0,
            sounds: EnemySounds::default(),
        }
    }
}

/// Scalar stats copied out of the catalog when an instance spawns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Health the instance spawned with.
    pub max_health: f32,
    /// Damage dealt by a single attack.
    pub damage: f32,
    /// Distance within which the instance attacks.
    pub attack_range: f32,
    /// Distance within which the instance chases the target.
    pub detection_range: f32,
    /// Radius of the patrol area.
    pub patrol_radius: f32,
    /// Minimum time between attacks.
    pub attack_cooldown: Duration,
    /// Minimum time between screams.
    pub scream_cooldown: Duration,
}

impl From<&EnemyTypeSpec> for EnemyStats {
    fn from(spec: &EnemyTypeSpec) -> Self {
        Self {
            max_health: spec.health,
            damage: spec.damage,
            attack_range: spec.attack_range,
            detection_range: spec.detection_range,
            patrol_radius: spec.patrol_radius,
            attack_cooldown: timer::seconds(spec.attack_cooldown),
            scream_cooldown: timer::seconds(spec.scream_cooldown),
        }
    }
}

/// Candidate world location for spawning enemies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnAnchor {
    /// Centre of the anchor.
    pub position: Vec3,
    /// Whether the anchor currently participates in spawning.
    pub is_active: bool,
    /// Radius of the disk sampled around the anchor.
    pub spawn_radius: f32,
    /// Smallest allowed distance between the anchor and the target.
    pub min_distance_to_target: f32,
    /// Largest allowed distance between the anchor and the target.
    pub max_distance_to_target: f32,
}

impl Default for SpawnAnchor {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            is_active: true,
            spawn_radius: 2.0,
            min_distance_to_target: 10.0,
            max_distance_to_target: 30.0,
        }
    }
}

impl SpawnAnchor {
    /// Creates an active anchor at `position` with default radii.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Reports whether the anchor may be used for a target at `target`.
    #[must_use]
    pub fn admits(&self, target: Vec3) -> bool {
        if !self.is_active {
            return false;
        }
        let distance = self.position.distance(target);
        distance >= self.min_distance_to_target && distance <= self.max_distance_to_target
    }
}

/// Sound played a fixed delay after the previous sound of the same event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedSound {
    /// Sound id handed to the sound sink.
    pub sound: String,
    /// Seconds to wait before playing, counted from the previous sound.
    #[serde(default)]
    pub delay: f32,
}

/// Catalog entry describing a scripted horror event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorrorEventSpec {
    /// Unique name used for bookkeeping and manual triggering.
    pub name: String,
    /// Probability in `[0, 1]` that an eligible evaluation triggers the event.
    pub trigger_chance: f32,
    /// Tension required before the event is considered.
    pub min_tension_required: f32,
    /// Tension added once the event's sounds have played.
    pub tension_amount: f32,
    /// Seconds before the event may trigger again.
    pub cooldown: f32,
    /// Whether the event may trigger at most once per catalog lifetime.
    pub is_one_time: bool,
    /// Scene objects switched on for the duration of the event.
    pub objects: Vec<String>,
    /// Sounds played in sequence after the event starts.
    pub sounds: Vec<TimedSound>,
    /// Seconds the objects stay active after the last sound.
    pub event_duration: f32,
}

impl Default for HorrorEventSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            trigger_chance: 0.5,
            min_tension_required: 30.0,
            tension_amount: 20.0,
            cooldown: 60.0,
            is_one_time: false,
            objects: Vec::new(),
            sounds: Vec::new(),
            event_duration: 5.0,
        }
    }
}

/// High-level behaviour state of an enemy instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyState {
    /// Wandering around its patrol area.
    Patrol,
    /// Pursuing the target.
    Chase,
    /// Terminal state; the instance no longer acts.
    Dead,
}

/// Why a navigation request was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavigationMode {
    /// Heading for the target.
    Chase,
    /// Heading for a patrol point.
    Patrol,
}

/// Reasons a spawn request may be declined by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnRejection {
    /// The live set already holds `max_enemies` instances.
    PopulationCeiling,
    /// The requested type is not part of the catalog.
    UnknownEnemyType,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Updates the position of the target the enemies hunt.
    MoveTarget {
        /// New target position.
        position: Vec3,
    },
    /// Raises tension by a non-negative amount.
    AddTension {
        /// Amount to add; negative values are treated as zero.
        amount: f32,
    },
    /// Replaces the threshold notification tuning.
    ConfigureTensionEvents {
        /// Tension at or above which the notification may fire.
        threshold: f32,
        /// Minimum time between notifications.
        cooldown: Duration,
    },
    /// Requests a new enemy instance.
    SpawnEnemy {
        /// Catalog entry to instantiate.
        kind: EnemyTypeId,
        /// Validated spawn position.
        position: Vec3,
        /// Tension added when the spawn succeeds.
        tension_bonus: f32,
    },
    /// Applies one step of difficulty escalation.
    EscalateDifficulty,
    /// Restores the enemy catalog and population tuning to their baseline.
    ResetDifficulty,
    /// Applies damage to an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Health removed.
        amount: f32,
    },
    /// Forces a single enemy into its death transition.
    KillEnemy {
        /// Enemy to kill.
        enemy: EnemyId,
    },
    /// Forces every live enemy into its death transition.
    KillAllEnemies,
    /// Freezes or resumes every live enemy.
    PauseEnemies {
        /// Whether enemies should be paused.
        paused: bool,
    },
    /// Asks the host navigation layer to move an enemy.
    NavigateEnemy {
        /// Enemy to move.
        enemy: EnemyId,
        /// Point to navigate towards.
        destination: Vec3,
        /// Behaviour that requested the move.
        mode: NavigationMode,
    },
    /// Reports the position the host navigation layer moved an enemy to.
    ReportEnemyPosition {
        /// Enemy that moved.
        enemy: EnemyId,
        /// Current position.
        position: Vec3,
    },
    /// Requests an attack against the target.
    EnemyAttack {
        /// Attacking enemy.
        enemy: EnemyId,
    },
    /// Requests a scream.
    EnemyScream {
        /// Screaming enemy.
        enemy: EnemyId,
    },
    /// Triggers a horror event by name, bypassing every gate.
    TriggerHorrorEvent {
        /// Name of the catalog entry.
        name: String,
    },
    /// Appends an entry to the horror event catalog. Names are unique: an
    /// entry whose name is already known replaces the old one in place.
    AddHorrorEvent {
        /// Entry to add.
        spec: HorrorEventSpec,
    },
    /// Removes the catalog entry with the given name.
    RemoveHorrorEvent {
        /// Name of the entry to remove.
        name: String,
    },
    /// Allows one-time events to trigger again.
    ResetOneTimeEvents,
    /// Toggles a single spawn anchor.
    SetAnchorActive {
        /// Index of the anchor.
        index: usize,
        /// Whether the anchor participates in spawning.
        active: bool,
    },
    /// Toggles every spawn anchor.
    SetAllAnchorsActive {
        /// Whether the anchors participate in spawning.
        active: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the target moved.
    TargetMoved {
        /// New target position.
        position: Vec3,
    },
    /// Reports the new tension value after a change.
    TensionChanged {
        /// Tension after the change.
        value: f32,
    },
    /// Reports that tension crossed the event threshold outside its cooldown.
    TensionThresholdReached {
        /// Tension when the threshold was reached.
        value: f32,
    },
    /// Confirms that a new enemy joined the live set.
    EnemySpawned {
        /// Identifier assigned to the instance.
        enemy: EnemyId,
        /// Catalog entry it was created from.
        kind: EnemyTypeId,
        /// Spawn position.
        position: Vec3,
    },
    /// Reports that a spawn request was declined.
    SpawnRejected {
        /// Catalog entry that was requested.
        kind: EnemyTypeId,
        /// Specific reason the spawn failed.
        reason: SpawnRejection,
    },
    /// Reports the outcome of a difficulty escalation or reset.
    DifficultyChanged {
        /// Cumulative difficulty multiplier.
        multiplier: f32,
        /// Population ceiling after the change.
        max_enemies: u32,
        /// Spawn cadence after the change.
        spawn_interval: Duration,
        /// Enemy catalog version after the change.
        catalog_version: u32,
    },
    /// Asks the host navigation layer to move an enemy.
    NavigationRequested {
        /// Enemy to move.
        enemy: EnemyId,
        /// Destination point.
        destination: Vec3,
    },
    /// Reports that an enemy was paused or resumed.
    EnemyPauseChanged {
        /// Affected enemy.
        enemy: EnemyId,
        /// Whether the enemy is now paused.
        paused: bool,
    },
    /// Reports that an enemy attacked the target.
    EnemyAttacked {
        /// Attacking enemy.
        enemy: EnemyId,
        /// Damage dealt to the target.
        damage: f32,
    },
    /// Reports that an enemy screamed.
    EnemyScreamed {
        /// Screaming enemy.
        enemy: EnemyId,
    },
    /// Death notification, delivered exactly once per instance.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
    },
    /// Reports that a corpse was removed after its grace delay.
    EnemyDespawned {
        /// Enemy that was removed.
        enemy: EnemyId,
    },
    /// Announces that a horror event started.
    HorrorEventTriggered {
        /// Name of the event.
        name: String,
    },
    /// Announces that a horror event's active window closed.
    HorrorEventFinished {
        /// Name of the event.
        name: String,
    },
    /// Reports that a trigger request named an unknown event.
    HorrorEventRejected {
        /// Name that was requested.
        name: String,
    },
    /// Asks the host to switch a scene object on.
    ObjectActivated {
        /// Scene object id.
        object: String,
    },
    /// Asks the host to switch a scene object off.
    ObjectDeactivated {
        /// Scene object id.
        object: String,
    },
    /// Asks the host to play a named sound.
    SoundRequested {
        /// Sound id.
        id: String,
        /// Whether the sound should fade in.
        fade_in: bool,
    },
    /// Reports that a spawn anchor was toggled.
    AnchorToggled {
        /// Index of the anchor.
        index: usize,
        /// Whether the anchor now participates in spawning.
        active: bool,
    },
}

/// Surface hit reported by a raycast.
#[derive(Clone, Debug, PartialEq)]
pub struct RaycastHit {
    /// Point where the ray met the surface.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
    /// Optional tag attached to the surface.
    pub tag: Option<String>,
}

/// Spatial queries answered by the host's physics and navigation layers.
pub trait WorldQuery {
    /// Casts a ray and returns the nearest hit within `max_distance`.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit>;

    /// Snaps `point` onto the navigable surface if one lies within `tolerance`.
    fn snap_to_navigable(&self, point: Vec3, tolerance: f32) -> Option<Vec3>;
}

/// Fire-and-forget sound playback provided by the host.
pub trait SoundSink {
    /// Plays the sound registered under `id`.
    fn play_named(&mut self, id: &str, fade_in: bool);
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Catalog entry the enemy was spawned from.
    pub kind: EnemyTypeId,
    /// Catalog version the stats were copied from.
    pub catalog_version: u32,
    /// Current position.
    pub position: Vec3,
    /// Destination of the last navigation request, if any.
    pub destination: Option<Vec3>,
    /// Behaviour state.
    pub state: EnemyState,
    /// Remaining health.
    pub health: f32,
    /// Stats copied at spawn time.
    pub stats: EnemyStats,
    /// Whether the attack cooldown has elapsed.
    pub attack_ready: bool,
    /// Whether the scream cooldown has elapsed.
    pub scream_ready: bool,
    /// Whether the enemy is paused.
    pub paused: bool,
}

/// Read-only snapshot describing every live enemy.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for `enemy`.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Population figures systems need to decide whether to spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PopulationSnapshot {
    /// Number of live enemies.
    pub live: u32,
    /// Current population ceiling.
    pub max_enemies: u32,
    /// Current spawn cadence.
    pub spawn_interval: Duration,
    /// Cumulative difficulty multiplier.
    pub difficulty_multiplier: f32,
    /// Number of enemy types in the catalog.
    pub catalog_len: u32,
    /// Enemy catalog version.
    pub catalog_version: u32,
}

impl PopulationSnapshot {
    /// Number of additional enemies the ceiling still admits.
    #[must_use]
    pub const fn headroom(&self) -> u32 {
        self.max_enemies.saturating_sub(self.live)
    }
}

/// Runtime bookkeeping for horror events, keyed by event name.
///
/// Catalog entries are stateless templates; everything that changes when an
/// event fires lives here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerLedger {
    last_trigger: BTreeMap<String, Duration>,
    triggered_once: BTreeSet<String>,
}

impl TriggerLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a trigger of `name` at `now`.
    pub fn record(&mut self, name: &str, now: Duration, one_time: bool) {
        let _ = self.last_trigger.insert(name.to_owned(), now);
        if one_time {
            let _ = self.triggered_once.insert(name.to_owned());
        }
    }

    /// Time `name` last triggered, if ever.
    #[must_use]
    pub fn last_trigger(&self, name: &str) -> Option<Duration> {
        self.last_trigger.get(name).copied()
    }

    /// Reports whether a one-time event named `name` already fired.
    #[must_use]
    pub fn has_fired_once(&self, name: &str) -> bool {
        self.triggered_once.contains(name)
    }

    /// Earliest last-trigger time across every tracked event.
    #[must_use]
    pub fn earliest(&self) -> Option<Duration> {
        self.last_trigger.values().copied().min()
    }

    /// Most recent last-trigger time across every tracked event.
    #[must_use]
    pub fn latest(&self) -> Option<Duration> {
        self.last_trigger.values().copied().max()
    }

    /// Forgets which one-time events fired. Cooldowns are kept.
    pub fn reset_one_time(&mut self) {
        self.triggered_once.clear();
    }

    /// Number of events with a recorded trigger.
    #[must_use]
    pub fn len(&self) -> usize {
        self.last_trigger.len()
    }

    /// Reports whether no event has triggered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_trigger.is_empty()
    }
}
