//! Tuning surface recognised by the director.
//!
//! Durations are expressed in seconds so the records read naturally in TOML
//! files; use [`crate::timer::seconds`] to convert them.

use serde::{Deserialize, Serialize};

/// Tension scalar bounds, decay and threshold notification tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TensionConfig {
    /// Upper bound of the tension scalar.
    pub max: f32,
    /// Tension removed per second while above zero.
    pub decay_rate: f32,
    /// Tension at or above which the threshold notification may fire.
    pub threshold_for_events: f32,
    /// Minimum seconds between two threshold notifications.
    pub event_cooldown: f32,
}

impl Default for TensionConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            decay_rate: 5.0,
            threshold_for_events: 70.0,
            event_cooldown: 30.0,
        }
    }
}

/// Population ceiling and the cadence of the spawn and escalation routines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Initial ceiling on simultaneously live enemies.
    pub max_enemies: u32,
    /// Initial seconds between spawn attempts.
    pub spawn_interval: f32,
    /// Seconds between difficulty escalations.
    pub difficulty_increase_interval: f32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            max_enemies: 5,
            spawn_interval: 30.0,
            difficulty_increase_interval: 300.0,
        }
    }
}

/// Which last-trigger timestamp the scheduler's global rate limiter compares
/// against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitBasis {
    /// Earliest last-trigger time across every tracked event.
    ///
    /// Once any event has a stale entry the limiter effectively stops
    /// blocking; kept as the default for parity with shipped tuning.
    #[default]
    EarliestTrigger,
    /// Most recent last-trigger time across every tracked event.
    LatestTrigger,
}

/// Horror event scheduler cadence and global rate limiting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between catalog evaluations.
    pub event_check_interval: f32,
    /// Minimum seconds that must separate triggers across all events.
    pub min_time_between_events: f32,
    /// Timestamp the global rate limiter measures from.
    pub rate_limit_basis: RateLimitBasis,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            event_check_interval: 5.0,
            min_time_between_events: 15.0,
            rate_limit_basis: RateLimitBasis::default(),
        }
    }
}

/// Tension-driven anchor spawner tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Seconds between spawn checks.
    pub spawn_check_interval: f32,
    /// Tension required before the spawner considers spawning.
    pub tension_threshold: f32,
    /// Largest batch spawned by a single check.
    pub max_enemies_per_spawn: u32,
    /// Seconds that must pass between batches, counted from session start.
    pub spawn_cooldown: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            spawn_check_interval: 5.0,
            tension_threshold: 50.0,
            max_enemies_per_spawn: 2,
            spawn_cooldown: 60.0,
        }
    }
}

/// Per-enemy behaviour cadence and lifecycle tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Seconds between behaviour decisions for a single enemy.
    pub think_interval: f32,
    /// Distance under which a patrol destination counts as reached.
    pub arrival_tolerance: f32,
    /// Seconds a corpse lingers before it is despawned.
    pub corpse_grace: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            think_interval: 0.1,
            arrival_tolerance: 0.1,
            corpse_grace: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_tables_fall_back_to_defaults() {
        let config: SchedulerConfig =
            toml::from_str("rate_limit_basis = \"latest_trigger\"").expect("parse");
        assert_eq!(config.rate_limit_basis, RateLimitBasis::LatestTrigger);
        assert!((config.event_check_interval - 5.0).abs() < f32::EPSILON);
        assert!((config.min_time_between_events - 15.0).abs() < f32::EPSILON);
    }

    #[test]
    fn spawner_defaults_match_shipped_tuning() {
        let config = SpawnerConfig::default();
        assert_eq!(config.max_enemies_per_spawn, 2);
        assert!((config.tension_threshold - 50.0).abs() < f32::EPSILON);
    }
}
