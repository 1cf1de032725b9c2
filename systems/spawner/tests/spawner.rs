use std::time::Duration;

use dread_core::{
    config::{PopulationConfig, SpawnerConfig},
    Command, Event, RaycastHit, SpawnAnchor, Vec3, WorldQuery,
};
use dread_system_spawner::{AnchorSpawner, SpawnerView, SPAWN_TENSION_BONUS};
use dread_world::{self as world, query, World, WorldConfig};

struct FlatGround;

impl WorldQuery for FlatGround {
    fn raycast(&self, origin: Vec3, _direction: Vec3, _max_distance: f32) -> Option<RaycastHit> {
        Some(RaycastHit {
            point: Vec3::new(origin.x, 0.0, origin.z),
            normal: Vec3::Y,
            tag: None,
        })
    }

    fn snap_to_navigable(&self, point: Vec3, _tolerance: f32) -> Option<Vec3> {
        Some(point)
    }
}

fn world_with_anchors(anchors: Vec<SpawnAnchor>, max_enemies: u32) -> World {
    World::new(WorldConfig {
        population: PopulationConfig {
            max_enemies,
            ..PopulationConfig::default()
        },
        anchors,
        ..WorldConfig::default()
    })
}

/// Advances the world by `dt` and returns the spawner's proposals.
fn step(world: &mut World, spawner: &mut AnchorSpawner, dt: Duration) -> Vec<Command> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);
    let mut commands = Vec::new();
    spawner.handle(
        &events,
        SpawnerView {
            now: query::now(world),
            tension: query::tension(world).current(),
            population: query::population(world),
            anchors: query::anchors(world),
            target: query::target(world),
        },
        &FlatGround,
        &mut commands,
    );
    commands
}

fn keep_tension_high(world: &mut World) {
    let mut events = Vec::new();
    world::apply(world, Command::AddTension { amount: 100.0 }, &mut events);
}

#[test]
fn waits_for_cooldown_from_session_start() {
    let mut world = world_with_anchors(vec![SpawnAnchor::at(Vec3::new(20.0, 0.0, 0.0))], 5);
    let mut spawner = AnchorSpawner::new(&SpawnerConfig::default(), Duration::ZERO, 4);

    for _ in 0..11 {
        keep_tension_high(&mut world);
        assert!(step(&mut world, &mut spawner, Duration::from_secs(5)).is_empty());
    }
    keep_tension_high(&mut world);
    let commands = step(&mut world, &mut spawner, Duration::from_secs(5));
    assert!(!commands.is_empty() && commands.len() <= 2);
    assert_eq!(spawner.last_batch(), Some(Duration::from_secs(60)));
}

#[test]
fn batches_spawn_near_eligible_anchors_and_add_tension() {
    let anchor = SpawnAnchor::at(Vec3::new(0.0, 0.0, 15.0));
    let far = SpawnAnchor::at(Vec3::new(0.0, 0.0, 80.0));
    let mut world = world_with_anchors(vec![anchor.clone(), far], 5);
    let config = SpawnerConfig {
        spawn_cooldown: 0.0,
        ..SpawnerConfig::default()
    };
    let mut spawner = AnchorSpawner::new(&config, Duration::ZERO, 8);

    keep_tension_high(&mut world);
    let commands = step(&mut world, &mut spawner, Duration::ZERO);
    assert!(!commands.is_empty());
    for command in &commands {
        match command {
            Command::SpawnEnemy {
                position,
                tension_bonus,
                ..
            } => {
                assert!(position.distance(anchor.position) <= anchor.spawn_radius + 1e-3);
                assert!((tension_bonus - SPAWN_TENSION_BONUS).abs() < f32::EPSILON);
            }
            other => panic!("unexpected command emitted: {other:?}"),
        }
    }
}

#[test]
fn low_tension_blocks_spawning() {
    let mut world = world_with_anchors(vec![SpawnAnchor::at(Vec3::new(20.0, 0.0, 0.0))], 5);
    let config = SpawnerConfig {
        spawn_cooldown: 0.0,
        ..SpawnerConfig::default()
    };
    let mut spawner = AnchorSpawner::new(&config, Duration::ZERO, 8);

    let mut events = Vec::new();
    world::apply(&mut world, Command::AddTension { amount: 49.0 }, &mut events);
    assert!(step(&mut world, &mut spawner, Duration::ZERO).is_empty());
}

#[test]
fn missing_anchors_do_not_consume_the_cooldown() {
    let mut world = world_with_anchors(vec![SpawnAnchor::at(Vec3::new(20.0, 0.0, 0.0))], 5);
    let config = SpawnerConfig {
        spawn_cooldown: 0.0,
        ..SpawnerConfig::default()
    };
    let mut spawner = AnchorSpawner::new(&config, Duration::ZERO, 8);
    let mut events = Vec::new();
    world::apply(&mut world, Command::SetAllAnchorsActive { active: false }, &mut events);

    keep_tension_high(&mut world);
    assert!(step(&mut world, &mut spawner, Duration::ZERO).is_empty());
    assert_eq!(spawner.last_batch(), Some(Duration::ZERO));

    world::apply(
        &mut world,
        Command::SetAnchorActive {
            index: 0,
            active: true,
        },
        &mut events,
    );
    keep_tension_high(&mut world);
    assert!(!step(&mut world, &mut spawner, Duration::from_secs(5)).is_empty());
    assert_eq!(spawner.last_batch(), Some(Duration::from_secs(5)));
}

#[test]
fn batch_never_exceeds_headroom() {
    let mut world = world_with_anchors(vec![SpawnAnchor::at(Vec3::new(20.0, 0.0, 0.0))], 1);
    let config = SpawnerConfig {
        spawn_cooldown: 0.0,
        max_enemies_per_spawn: 5,
        ..SpawnerConfig::default()
    };
    let mut spawner = AnchorSpawner::new(&config, Duration::ZERO, 21);

    keep_tension_high(&mut world);
    let commands = step(&mut world, &mut spawner, Duration::ZERO);
    assert_eq!(commands.len(), 1);

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert_eq!(query::population(&world).live, 1);
    assert!(events.iter().any(|event| matches!(event, Event::EnemySpawned { .. })));
}
