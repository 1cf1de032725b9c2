//! Bounded tension scalar with decay and threshold notifications.

use std::time::Duration;

use dread_core::{config::TensionConfig, timer, timer::Cooldown, Event};

/// Peak pitch multiplier of the heartbeat layer at full tension.
pub const HEARTBEAT_PEAK: f32 = 1.5;
/// Peak pitch multiplier of the breathing layer at full tension.
pub const BREATHING_PEAK: f32 = 2.0;

/// Owns the tension scalar `current ∈ [0, max]`.
///
/// `current` only moves through [`TensionEngine::add`] (clamped increase) and
/// [`TensionEngine::decay`] (clamped decrease). Every change is reported as an
/// [`Event::TensionChanged`]; crossing the threshold outside its cooldown also
/// reports [`Event::TensionThresholdReached`], synchronously in the same call.
#[derive(Clone, Debug)]
pub struct TensionEngine {
    current: f32,
    max: f32,
    decay_rate: f32,
    threshold: f32,
    threshold_cooldown: Cooldown,
}

impl TensionEngine {
    /// Creates an engine at zero tension.
    #[must_use]
    pub fn new(config: &TensionConfig) -> Self {
        Self {
            current: 0.0,
            max: config.max.max(0.0),
            decay_rate: config.decay_rate.max(0.0),
            threshold: config.threshold_for_events,
            threshold_cooldown: Cooldown::ready(timer::seconds(config.event_cooldown)),
        }
    }

    /// Current tension.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Upper bound of the scalar.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Tension expressed as a fraction of `max`; zero when `max` is zero.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// Tension at or above which the threshold notification may fire.
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Time of the last threshold notification.
    #[must_use]
    pub const fn last_threshold_event(&self) -> Option<Duration> {
        self.threshold_cooldown.last()
    }

    /// Raises tension by `amount`, clamped to `max`. Negative or NaN amounts
    /// count as zero.
    pub fn add(&mut self, amount: f32, now: Duration, out: &mut Vec<Event>) {
        let amount = amount.max(0.0);
        self.current = (self.current + amount).min(self.max);
        out.push(Event::TensionChanged {
            value: self.current,
        });

        if self.current >= self.threshold && self.threshold_cooldown.is_ready(now) {
            self.threshold_cooldown.trigger(now);
            out.push(Event::TensionThresholdReached {
                value: self.current,
            });
        }
    }

    /// Bleeds off `decay_rate · dt`, never below zero. Silent at zero.
    pub fn decay(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if self.current <= 0.0 {
            return;
        }

        let drop = self.decay_rate * dt.as_secs_f32();
        self.current = (self.current - drop).max(0.0);
        out.push(Event::TensionChanged {
            value: self.current,
        });
    }

    /// Replaces the threshold notification tuning.
    pub fn configure_events(&mut self, threshold: f32, cooldown: Duration) {
        self.threshold = threshold;
        self.threshold_cooldown.set_period(cooldown);
    }
}

/// Pitch-style intensity for a layer that peaks at `peak` at full tension.
#[must_use]
pub fn intensity(ratio: f32, peak: f32) -> f32 {
    1.0 + ratio.clamp(0.0, 1.0) * (peak - 1.0)
}
