//! Horror event catalog, trigger bookkeeping and deferred event effects.

use std::{collections::BTreeMap, time::Duration};

use dread_core::{timer, timer::Schedule, Event, HorrorEventSpec, TriggerLedger};

/// Effect released by the world clock once its due time passes.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Effect {
    PlaySound(String),
    AddTension(f32),
    Finish { name: String, objects: Vec<String> },
}

#[derive(Debug, Default)]
pub(crate) struct Incidents {
    catalog: Vec<HorrorEventSpec>,
    ledger: TriggerLedger,
    effects: Schedule<Effect>,
    active: BTreeMap<String, u32>,
}

impl Incidents {
    /// Builds the catalog entry by entry, so a repeated name keeps the
    /// later definition at the earlier position.
    pub(crate) fn new(catalog: Vec<HorrorEventSpec>) -> Self {
        let mut incidents = Self::default();
        for spec in catalog {
            incidents.add(spec);
        }
        incidents
    }

    pub(crate) fn catalog(&self) -> &[HorrorEventSpec] {
        &self.catalog
    }

    pub(crate) fn ledger(&self) -> &TriggerLedger {
        &self.ledger
    }

    /// Names of events whose active window is still open, with multiplicity.
    pub(crate) fn active(&self) -> &BTreeMap<String, u32> {
        &self.active
    }

    /// Names are unique: an entry with a known name replaces the old one in
    /// place.
    pub(crate) fn add(&mut self, spec: HorrorEventSpec) {
        match self.catalog.iter_mut().find(|entry| entry.name == spec.name) {
            Some(entry) => {
                log::warn!("horror event {} redefined; keeping the newer entry", spec.name);
                *entry = spec;
            }
            None => self.catalog.push(spec),
        }
    }

    /// Drops the entry named `name`, returning how many were removed.
    pub(crate) fn remove(&mut self, name: &str) -> usize {
        let before = self.catalog.len();
        self.catalog.retain(|spec| spec.name != name);
        before - self.catalog.len()
    }

    pub(crate) fn reset_one_time(&mut self) {
        self.ledger.reset_one_time();
    }

    /// Starts the event named `name`; `false` when the catalog lacks it.
    ///
    /// Objects switch on immediately. Sounds and the tension contribution are
    /// queued on the effect schedule; the caller releases whatever is already
    /// due.
    pub(crate) fn trigger(&mut self, name: &str, now: Duration, out: &mut Vec<Event>) -> bool {
        let Some(spec) = self.catalog.iter().find(|spec| spec.name == name) else {
            return false;
        };

        self.ledger.record(&spec.name, now, spec.is_one_time);
        *self.active.entry(spec.name.clone()).or_insert(0) += 1;

        out.push(Event::HorrorEventTriggered {
            name: spec.name.clone(),
        });
        for object in &spec.objects {
            out.push(Event::ObjectActivated {
                object: object.clone(),
            });
        }

        let mut cursor = now;
        for sound in &spec.sounds {
            cursor = cursor.saturating_add(timer::seconds(sound.delay));
            self.effects
                .push(cursor, Effect::PlaySound(sound.sound.clone()));
        }
        self.effects
            .push(cursor, Effect::AddTension(spec.tension_amount));
        self.effects.push(
            cursor.saturating_add(timer::seconds(spec.event_duration)),
            Effect::Finish {
                name: spec.name.clone(),
                objects: spec.objects.clone(),
            },
        );
        true
    }

    /// Releases every effect due at `now`. Finished windows are closed here;
    /// the remaining effects are handed back for the world to apply.
    pub(crate) fn release_due(&mut self, now: Duration) -> Vec<Effect> {
        let due = self.effects.drain_due(now);
        for effect in &due {
            if let Effect::Finish { name, .. } = effect {
                if let Some(count) = self.active.get_mut(name) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        let _ = self.active.remove(name);
                    }
                }
            }
        }
        due
    }

    pub(crate) fn pending_effects(&self) -> usize {
        self.effects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dread_core::TimedSound;

    fn creak() -> HorrorEventSpec {
        HorrorEventSpec {
            name: String::from("creak"),
            objects: vec![String::from("door")],
            sounds: vec![
                TimedSound {
                    sound: String::from("creak_a"),
                    delay: 1.0,
                },
                TimedSound {
                    sound: String::from("creak_b"),
                    delay: 2.0,
                },
            ],
            tension_amount: 12.0,
            event_duration: 4.0,
            ..HorrorEventSpec::default()
        }
    }

    #[test]
    fn trigger_schedules_sounds_with_accumulated_delays() {
        let mut incidents = Incidents::new(vec![creak()]);
        let mut events = Vec::new();
        assert!(incidents.trigger("creak", Duration::from_secs(10), &mut events));
        assert_eq!(
            events,
            vec![
                Event::HorrorEventTriggered {
                    name: String::from("creak")
                },
                Event::ObjectActivated {
                    object: String::from("door")
                },
            ]
        );

        assert!(incidents.release_due(Duration::from_secs(10)).is_empty());
        assert_eq!(
            incidents.release_due(Duration::from_secs(11)),
            vec![Effect::PlaySound(String::from("creak_a"))]
        );
        assert_eq!(
            incidents.release_due(Duration::from_secs(13)),
            vec![
                Effect::PlaySound(String::from("creak_b")),
                Effect::AddTension(12.0)
            ]
        );
        assert_eq!(incidents.active().get("creak"), Some(&1));
        assert_eq!(incidents.release_due(Duration::from_secs(17)).len(), 1);
        assert!(incidents.active().is_empty());
        assert_eq!(incidents.pending_effects(), 0);
    }

    #[test]
    fn unknown_names_are_not_triggered() {
        let mut incidents = Incidents::new(vec![creak()]);
        let mut events = Vec::new();
        assert!(!incidents.trigger("missing", Duration::ZERO, &mut events));
        assert!(events.is_empty());
        assert!(incidents.ledger().is_empty());
    }

    #[test]
    fn remove_drops_the_named_entry() {
        let mut incidents = Incidents::new(vec![creak()]);
        incidents.add(HorrorEventSpec {
            name: String::from("knock"),
            ..HorrorEventSpec::default()
        });
        assert_eq!(incidents.remove("creak"), 1);
        assert_eq!(incidents.remove("creak"), 0);
        assert_eq!(incidents.catalog().len(), 1);
    }

    #[test]
    fn repeated_names_keep_the_newer_definition() {
        let newer = HorrorEventSpec {
            objects: vec![String::from("window")],
            ..creak()
        };
        let knock = HorrorEventSpec {
            name: String::from("knock"),
            ..HorrorEventSpec::default()
        };
        let mut incidents = Incidents::new(vec![creak(), knock, newer]);
        assert_eq!(incidents.catalog().len(), 2);
        assert_eq!(incidents.catalog()[0].objects, vec![String::from("window")]);

        let mut events = Vec::new();
        assert!(incidents.trigger("creak", Duration::ZERO, &mut events));
        assert!(events.contains(&Event::ObjectActivated {
            object: String::from("window")
        }));
        assert!(!events.contains(&Event::ObjectActivated {
            object: String::from("door")
        }));
    }
}
