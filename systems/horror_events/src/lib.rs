#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Periodic horror event scheduler.
//!
//! Every check walks the catalog in order and proposes a trigger for each
//! entry that clears all gates. Gates are evaluated in a fixed order and the
//! first failing one short-circuits, so the random draw is only consumed by
//! entries that are otherwise eligible. Triggers proposed earlier in the same
//! pass count toward the global rate limiter.

use std::time::Duration;

use dread_core::{
    config::{RateLimitBasis, SchedulerConfig},
    timer,
    timer::Interval,
    Command, Event, HorrorEventSpec, TriggerLedger,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Gate that kept a catalog entry from triggering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Blocked {
    /// A one-time entry already fired.
    AlreadyFired,
    /// The entry's own cooldown has not elapsed.
    CoolingDown,
    /// Tension is below the entry's requirement.
    TooCalm,
    /// The random draw exceeded the entry's trigger chance.
    ChanceMissed,
    /// Another event fired too recently.
    RateLimited,
}

/// Read-only inputs the scheduler needs on every pass.
#[derive(Clone, Copy, Debug)]
pub struct SchedulerView<'a> {
    /// Current session time.
    pub now: Duration,
    /// Current tension.
    pub tension: f32,
    /// Horror event catalog in evaluation order.
    pub catalog: &'a [HorrorEventSpec],
    /// Trigger bookkeeping owned by the world.
    pub ledger: &'a TriggerLedger,
}

/// Pure system proposing horror event triggers.
#[derive(Debug)]
pub struct HorrorEventScheduler {
    check: Interval,
    min_between: Duration,
    basis: RateLimitBasis,
    halted: bool,
    rng: ChaCha8Rng,
}

impl HorrorEventScheduler {
    /// Creates a scheduler whose first pass happens at `now`.
    #[must_use]
    pub fn new(config: &SchedulerConfig, now: Duration, seed: u64) -> Self {
        Self {
            check: Interval::immediate(timer::seconds(config.event_check_interval), now),
            min_between: timer::seconds(config.min_time_between_events),
            basis: config.rate_limit_basis,
            halted: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Stops future passes. Idempotent.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// Consumes world events and views to emit trigger commands.
    pub fn handle(&mut self, events: &[Event], view: SchedulerView<'_>, out: &mut Vec<Command>) {
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

        let mut ledger = view.ledger.clone();
        for spec in view.catalog {
            match self.evaluate(spec, &ledger, view.now, view.tension) {
                Ok(()) => {
                    log::debug!("scheduling horror event {}", spec.name);
                    ledger.record(&spec.name, view.now, spec.is_one_time);
                    out.push(Command::TriggerHorrorEvent {
                        name: spec.name.clone(),
                    });
                }
                Err(reason) => log::trace!("horror event {} blocked: {reason:?}", spec.name),
            }
        }
    }

    /// Runs every gate for `spec` in order.
    pub fn evaluate(
        &mut self,
        spec: &HorrorEventSpec,
        ledger: &TriggerLedger,
        now: Duration,
        tension: f32,
    ) -> Result<(), Blocked> {
        if spec.is_one_time && ledger.has_fired_once(&spec.name) {
            return Err(Blocked::AlreadyFired);
        }
        if let Some(last) = ledger.last_trigger(&spec.name) {
            if now.saturating_sub(last) < timer::seconds(spec.cooldown) {
                return Err(Blocked::CoolingDown);
            }
        }
        if tension < spec.min_tension_required {
            return Err(Blocked::TooCalm);
        }
        // NaN counts as a zero chance.
        let chance = if spec.trigger_chance.is_nan() {
            0.0
        } else {
            spec.trigger_chance
        };
        let draw: f32 = self.rng.gen();
        if draw > chance {
            return Err(Blocked::ChanceMissed);
        }
        if self.rate_limited(ledger, now) {
            return Err(Blocked::RateLimited);
        }
        Ok(())
    }

    fn rate_limited(&self, ledger: &TriggerLedger, now: Duration) -> bool {
        let basis = match self.basis {
            RateLimitBasis::EarliestTrigger => ledger.earliest(),
            RateLimitBasis::LatestTrigger => ledger.latest(),
        };
        basis.is_some_and(|basis| now.saturating_sub(basis) < self.min_between)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(basis: RateLimitBasis) -> HorrorEventScheduler {
        let config = SchedulerConfig {
            rate_limit_basis: basis,
            ..SchedulerConfig::default()
        };
        HorrorEventScheduler::new(&config, Duration::ZERO, 5)
    }

    fn certain(name: &str) -> HorrorEventSpec {
        HorrorEventSpec {
            name: name.to_owned(),
            trigger_chance: 1.0,
            min_tension_required: 0.0,
            cooldown: 10.0,
            ..HorrorEventSpec::default()
        }
    }

    #[test]
    fn gates_short_circuit_in_order() {
        let mut scheduler = scheduler(RateLimitBasis::EarliestTrigger);
        let mut ledger = TriggerLedger::new();
        let spec = HorrorEventSpec {
            is_one_time: true,
            min_tension_required: 50.0,
            ..certain("door")
        };

        assert_eq!(
            scheduler.evaluate(&spec, &ledger, Duration::ZERO, 10.0),
            Err(Blocked::TooCalm)
        );
        ledger.record("door", Duration::ZERO, false);
        assert_eq!(
            scheduler.evaluate(&spec, &ledger, Duration::from_secs(5), 10.0),
            Err(Blocked::CoolingDown)
        );
        ledger.record("door", Duration::ZERO, true);
        assert_eq!(
            scheduler.evaluate(&spec, &ledger, Duration::from_secs(5), 10.0),
            Err(Blocked::AlreadyFired)
        );
    }

    #[test]
    fn zero_chance_only_fires_on_an_exact_zero_draw() {
        let mut scheduler = scheduler(RateLimitBasis::EarliestTrigger);
        let spec = HorrorEventSpec {
            trigger_chance: 0.0,
            ..certain("never")
        };
        let ledger = TriggerLedger::new();
        let fired = (0..100)
            .filter(|_| scheduler.evaluate(&spec, &ledger, Duration::ZERO, 0.0).is_ok())
            .count();
        assert_eq!(fired, 0);
    }

    #[test]
    fn nan_chance_never_fires() {
        let mut scheduler = scheduler(RateLimitBasis::EarliestTrigger);
        let spec = HorrorEventSpec {
            trigger_chance: f32::NAN,
            ..certain("broken")
        };
        let ledger = TriggerLedger::new();
        let fired = (0..100)
            .filter(|_| scheduler.evaluate(&spec, &ledger, Duration::ZERO, 0.0).is_ok())
            .count();
        assert_eq!(fired, 0);
    }

    #[test]
    fn earliest_basis_stops_blocking_once_any_entry_is_stale() {
        let mut ledger = TriggerLedger::new();
        ledger.record("old", Duration::from_secs(0), false);
        ledger.record("fresh", Duration::from_secs(95), false);
        let now = Duration::from_secs(100);

        let mut earliest = scheduler(RateLimitBasis::EarliestTrigger);
        assert_eq!(earliest.evaluate(&certain("new"), &ledger, now, 0.0), Ok(()));

        let mut latest = scheduler(RateLimitBasis::LatestTrigger);
        assert_eq!(
            latest.evaluate(&certain("new"), &ledger, now, 0.0),
            Err(Blocked::RateLimited)
        );
    }
}
