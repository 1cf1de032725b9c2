//! Headless stand-ins for the engine collaborators a session needs.

use std::collections::{BTreeMap, BTreeSet};

use dread_core::{Command, EnemyId, Event, RaycastHit, SoundSink, Vec3, WorldQuery};

/// Flat circular arena centred on the origin with its floor at `y = 0`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Arena {
    radius: f32,
}

impl Arena {
    pub(crate) const fn new(radius: f32) -> Self {
        Self { radius }
    }

    fn contains(&self, point: Vec3) -> bool {
        Vec3::new(point.x, 0.0, point.z).length() <= self.radius
    }
}

impl WorldQuery for Arena {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        if direction.y >= 0.0 || origin.y < 0.0 {
            return None;
        }
        let distance = origin.y / -direction.y;
        let point = origin + direction * distance;
        (distance <= max_distance && self.contains(point)).then(|| RaycastHit {
            point,
            normal: Vec3::Y,
            tag: Some(String::from("floor")),
        })
    }

    fn snap_to_navigable(&self, point: Vec3, tolerance: f32) -> Option<Vec3> {
        let flat = Vec3::new(point.x, 0.0, point.z);
        if self.contains(flat) {
            return Some(flat);
        }
        let edge = flat.normalize_or_zero() * self.radius;
        (edge.distance(flat) <= tolerance).then_some(edge)
    }
}

/// Sound sink that logs every request and keeps a tally.
#[derive(Debug, Default)]
pub(crate) struct LoggedSounds {
    played: BTreeMap<String, u32>,
}

impl LoggedSounds {
    pub(crate) fn played(&self) -> &BTreeMap<String, u32> {
        &self.played
    }
}

impl SoundSink for LoggedSounds {
    fn play_named(&mut self, id: &str, fade_in: bool) {
        log::debug!("sound {id} (fade in: {fade_in})");
        *self.played.entry(id.to_owned()).or_insert(0) += 1;
    }
}

/// Moves enemies towards their requested destinations at a fixed speed.
///
/// Paused enemies keep their destination but stand still until resumed.
#[derive(Debug)]
pub(crate) struct Navigator {
    speed: f32,
    destinations: BTreeMap<EnemyId, Vec3>,
    paused: BTreeSet<EnemyId>,
}

impl Navigator {
    pub(crate) fn new(speed: f32) -> Self {
        Self {
            speed,
            destinations: BTreeMap::new(),
            paused: BTreeSet::new(),
        }
    }

    /// Records navigation requests and pause changes, and forgets enemies
    /// that died.
    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::NavigationRequested { enemy, destination } => {
                    let _ = self.destinations.insert(*enemy, *destination);
                }
                Event::EnemyPauseChanged {
                    enemy,
                    paused: true,
                } => {
                    let _ = self.paused.insert(*enemy);
                }
                Event::EnemyPauseChanged {
                    enemy,
                    paused: false,
                } => {
                    let _ = self.paused.remove(enemy);
                }
                Event::EnemyDied { enemy } => {
                    let _ = self.destinations.remove(enemy);
                    let _ = self.paused.remove(enemy);
                }
                _ => {}
            }
        }
    }

    /// Steps every moving enemy and reports the new positions.
    pub(crate) fn step(
        &mut self,
        positions: impl Iterator<Item = (EnemyId, Vec3)>,
        dt: f32,
        out: &mut Vec<Command>,
    ) {
        let reach = self.speed * dt;
        for (enemy, position) in positions {
            if self.paused.contains(&enemy) {
                continue;
            }
            let Some(destination) = self.destinations.get(&enemy).copied() else {
                continue;
            };
            let offset = destination - position;
            let next = if offset.length() <= reach {
                let _ = self.destinations.remove(&enemy);
                destination
            } else {
                position + offset.normalize_or_zero() * reach
            };
            out.push(Command::ReportEnemyPosition {
                enemy,
                position: next,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_snaps_points_just_outside_the_edge() {
        let arena = Arena::new(10.0);
        assert_eq!(
            arena.snap_to_navigable(Vec3::new(3.0, 1.0, 0.0), 0.5),
            Some(Vec3::new(3.0, 0.0, 0.0))
        );
        assert_eq!(
            arena.snap_to_navigable(Vec3::new(11.0, 0.0, 0.0), 2.0),
            Some(Vec3::new(10.0, 0.0, 0.0))
        );
        assert!(arena
            .snap_to_navigable(Vec3::new(15.0, 0.0, 0.0), 2.0)
            .is_none());
    }

    #[test]
    fn arena_raycast_hits_the_floor_only_inside() {
        let arena = Arena::new(10.0);
        let hit = arena
            .raycast(Vec3::new(2.0, 2.0, 2.0), Vec3::NEG_Y, 4.0)
            .expect("floor hit");
        assert_eq!(hit.point, Vec3::new(2.0, 0.0, 2.0));
        assert!(arena
            .raycast(Vec3::new(20.0, 2.0, 0.0), Vec3::NEG_Y, 4.0)
            .is_none());
        assert!(arena
            .raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 4.0)
            .is_none());
    }

    #[test]
    fn navigator_holds_paused_enemies_in_place() {
        let enemy = EnemyId::new(0);
        let mut navigator = Navigator::new(2.0);
        navigator.observe(&[
            Event::NavigationRequested {
                enemy,
                destination: Vec3::new(6.0, 0.0, 0.0),
            },
            Event::EnemyPauseChanged {
                enemy,
                paused: true,
            },
        ]);

        let mut commands = Vec::new();
        navigator.step([(enemy, Vec3::ZERO)].into_iter(), 1.0, &mut commands);
        assert!(commands.is_empty());

        navigator.observe(&[Event::EnemyPauseChanged {
            enemy,
            paused: false,
        }]);
        navigator.step([(enemy, Vec3::ZERO)].into_iter(), 1.0, &mut commands);
        assert_eq!(
            commands,
            vec![Command::ReportEnemyPosition {
                enemy,
                position: Vec3::new(2.0, 0.0, 0.0)
            }]
        );
    }

    #[test]
    fn navigator_walks_and_stops_at_destination() {
        let enemy = EnemyId::new(0);
        let mut navigator = Navigator::new(2.0);
        navigator.observe(&[Event::NavigationRequested {
            enemy,
            destination: Vec3::new(3.0, 0.0, 0.0),
        }]);

        let mut commands = Vec::new();
        navigator.step([(enemy, Vec3::ZERO)].into_iter(), 1.0, &mut commands);
        navigator.step(
            [(enemy, Vec3::new(2.0, 0.0, 0.0))].into_iter(),
            1.0,
            &mut commands,
        );
        navigator.step(
            [(enemy, Vec3::new(3.0, 0.0, 0.0))].into_iter(),
            1.0,
            &mut commands,
        );
        assert_eq!(
            commands,
            vec![
                Command::ReportEnemyPosition {
                    enemy,
                    position: Vec3::new(2.0, 0.0, 0.0)
                },
                Command::ReportEnemyPosition {
                    enemy,
                    position: Vec3::new(3.0, 0.0, 0.0)
                },
            ]
        );
    }
}
