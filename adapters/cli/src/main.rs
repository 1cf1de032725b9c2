#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Dread director session.
//!
//! The adapter plays the part of the engine: a player walks a circle through
//! a flat arena, enemies walk wherever the director sends them and the player
//! strikes whatever gets too close.

mod host;
mod logging;

use std::{f32::consts::TAU, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use dread_core::{
    Command, EnemySounds, EnemyTypeSpec, Event, HorrorEventSpec, SpawnAnchor, TimedSound, Vec3,
};
use dread_session::{Session, SessionConfig};
use dread_world::{
    query,
    tension::{intensity, BREATHING_PEAK, HEARTBEAT_PEAK},
};

use host::{Arena, LoggedSounds, Navigator};

const ARENA_RADIUS: f32 = 60.0;
const PLAYER_ORBIT: f32 = 15.0;
const PLAYER_LAP_SECONDS: f32 = 40.0;
const ENEMY_SPEED: f32 = 3.0;
const STRIKE_RANGE: f32 = 2.5;
const STRIKE_DAMAGE: f32 = 35.0;
const STRIKE_PERIOD: Duration = Duration::from_secs(1);

/// Command-line arguments accepted by the simulator.
#[derive(Debug, Parser)]
#[command(name = "dread", about = "Runs a headless horror director session")]
struct Args {
    /// TOML session config; a built-in demo level is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulated session length in seconds.
    #[arg(long, default_value_t = 120)]
    seconds: u64,
    /// Length of one simulation step in milliseconds.
    #[arg(long = "step-ms", default_value_t = 100)]
    step_ms: u64,
    /// Overrides the seed from the config.
    #[arg(long)]
    seed: Option<u64>,
    /// Enables debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Running totals printed at the end of the session.
#[derive(Debug, Default)]
struct Tally {
    spawned: u32,
    rejected: u32,
    died: u32,
    horror_events: u32,
    thresholds: u32,
    escalations: u32,
    damage_taken: f32,
    peak_tension: f32,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::SpawnRejected { .. } => self.rejected += 1,
                Event::EnemyDied { .. } => self.died += 1,
                Event::HorrorEventTriggered { name } => {
                    log::info!("horror event: {name}");
                    self.horror_events += 1;
                }
                Event::TensionThresholdReached { value } => {
                    log::info!("tension threshold reached at {value:.1}");
                    self.thresholds += 1;
                }
                Event::DifficultyChanged { .. } => self.escalations += 1,
                Event::EnemyAttacked { damage, .. } => self.damage_taken += damage,
                Event::TensionChanged { value } => {
                    self.peak_tension = self.peak_tension.max(*value);
                }
                _ => {}
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);
    ensure!(args.step_ms > 0, "--step-ms must be greater than zero");

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load session config {}", path.display()))?,
        None => demo_level(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let step = Duration::from_millis(args.step_ms);
    let steps = args.seconds.saturating_mul(1_000) / args.step_ms;
    let mut session = Session::new(&config, Arena::new(ARENA_RADIUS), LoggedSounds::default());
    let mut navigator = Navigator::new(ENEMY_SPEED);
    let mut tally = Tally::default();
    let mut since_strike = Duration::ZERO;

    let events = session.drain_events();
    tally.record(&events);
    navigator.observe(&events);

    for index in 1..=steps {
        let elapsed = step.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
        let player = player_position(elapsed);
        session.move_target(player);
        session.tick(step);

        let mut commands = Vec::new();
        let view = query::enemy_view(session.world());
        navigator.step(
            view.iter().map(|enemy| (enemy.id, enemy.position)),
            step.as_secs_f32(),
            &mut commands,
        );

        since_strike = since_strike.saturating_add(step);
        if since_strike >= STRIKE_PERIOD {
            since_strike = Duration::ZERO;
            commands.extend(
                view.iter()
                    .filter(|enemy| enemy.position.distance(player) <= STRIKE_RANGE)
                    .map(|enemy| Command::DamageEnemy {
                        enemy: enemy.id,
                        amount: STRIKE_DAMAGE,
                    }),
            );
        }
        for command in commands {
            session.apply(command);
        }

        let events = session.drain_events();
        tally.record(&events);
        navigator.observe(&events);
    }

    let world = session.world();
    let tension = query::tension(world).current();
    let ratio = query::tension(world).ratio();
    let population = query::population(world);
    let elapsed = query::now(world);
    session.teardown();
    tally.record(&session.drain_events());

    println!("session length      {:.1}s", elapsed.as_secs_f32());
    println!("final tension       {tension:.1} (peak {:.1})", tally.peak_tension);
    println!(
        "audio intensity     heartbeat x{:.2}, breathing x{:.2}",
        intensity(ratio, HEARTBEAT_PEAK),
        intensity(ratio, BREATHING_PEAK)
    );
    println!("threshold alerts    {}", tally.thresholds);
    println!(
        "enemies             {} spawned, {} rejected, {} died, {} live at teardown",
        tally.spawned, tally.rejected, tally.died, population.live
    );
    println!(
        "difficulty          x{:.1} after {} escalation(s)",
        population.difficulty_multiplier, tally.escalations
    );
    println!("horror events       {}", tally.horror_events);
    println!("damage taken        {:.1}", tally.damage_taken);
    for (sound, count) in session.sound().played() {
        println!("sound {sound:<14}{count}");
    }
    Ok(())
}

fn player_position(elapsed: Duration) -> Vec3 {
    let angle = TAU * elapsed.as_secs_f32() / PLAYER_LAP_SECONDS;
    Vec3::new(angle.cos(), 0.0, angle.sin()) * PLAYER_ORBIT
}

fn demo_level() -> SessionConfig {
    let sounds = |prefix: &str| EnemySounds {
        scream: vec![format!("{prefix}_scream")],
        attack: vec![format!("{prefix}_attack_1"), format!("{prefix}_attack_2")],
        death: vec![format!("{prefix}_death")],
    };
    let anchors = (0..6)
        .map(|index| {
            let angle = TAU * index as f32 / 6.0;
            SpawnAnchor::at(Vec3::new(angle.cos(), 0.0, angle.sin()) * 30.0)
        })
        .collect();

    SessionConfig {
        seed: 0x0d2e_ad00,
        enemy_types: vec![
            EnemyTypeSpec {
                name: String::from("stalker"),
                sounds: sounds("stalker"),
                ..EnemyTypeSpec::default()
            },
            EnemyTypeSpec {
                name: String::from("crawler"),
                health: 60.0,
                damage: 10.0,
                detection_range: 14.0,
                sounds: sounds("crawler"),
                ..EnemyTypeSpec::default()
            },
        ],
        horror_events: vec![
            HorrorEventSpec {
                name: String::from("lights_flicker"),
                trigger_chance: 0.6,
                min_tension_required: 10.0,
                objects: vec![String::from("hall_lamp")],
                sounds: vec![TimedSound {
                    sound: String::from("electric_buzz"),
                    delay: 0.2,
                }],
                ..HorrorEventSpec::default()
            },
            HorrorEventSpec {
                name: String::from("door_slam"),
                trigger_chance: 0.3,
                min_tension_required: 40.0,
                tension_amount: 30.0,
                sounds: vec![
                    TimedSound {
                        sound: String::from("footsteps"),
                        delay: 0.0,
                    },
                    TimedSound {
                        sound: String::from("slam"),
                        delay: 1.5,
                    },
                ],
                ..HorrorEventSpec::default()
            },
            HorrorEventSpec {
                name: String::from("whisper_behind"),
                trigger_chance: 1.0,
                min_tension_required: 80.0,
                is_one_time: true,
                sounds: vec![TimedSound {
                    sound: String::from("whisper"),
                    delay: 0.0,
                }],
                ..HorrorEventSpec::default()
            },
        ],
        anchors,
        ..SessionConfig::default()
    }
}
