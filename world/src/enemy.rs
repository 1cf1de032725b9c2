//! Per-instance enemy state owned by the population.

use std::time::Duration;

use dread_core::{
    timer::Cooldown, EnemyId, EnemySnapshot, EnemySounds, EnemyState, EnemyStats, EnemyTypeId,
    NavigationMode, Vec3,
};

#[derive(Clone, Debug)]
pub(crate) struct EnemyInstance {
    id: EnemyId,
    kind: EnemyTypeId,
    catalog_version: u32,
    stats: EnemyStats,
    pub(crate) sounds: EnemySounds,
    health: f32,
    position: Vec3,
    destination: Option<Vec3>,
    state: EnemyState,
    attack: Cooldown,
    scream: Cooldown,
    paused: bool,
}

impl EnemyInstance {
    pub(crate) fn spawn(
        id: EnemyId,
        kind: EnemyTypeId,
        catalog_version: u32,
        stats: EnemyStats,
        sounds: EnemySounds,
        position: Vec3,
    ) -> Self {
        Self {
            id,
            kind,
            catalog_version,
            health: stats.max_health,
            attack: Cooldown::ready(stats.attack_cooldown),
            scream: Cooldown::ready(stats.scream_cooldown),
            stats,
            sounds,
            position,
            destination: None,
            state: EnemyState::Patrol,
            paused: false,
        }
    }

    pub(crate) fn id(&self) -> EnemyId {
        self.id
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.paused || self.is_dead()
    }

    pub(crate) fn stats(&self) -> &EnemyStats {
        &self.stats
    }

    /// Removes health and reports whether this call killed the instance.
    pub(crate) fn take_damage(&mut self, amount: f32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health -= amount.max(0.0);
        if self.health <= 0.0 {
            return self.die();
        }
        false
    }

    /// Enters the terminal state; `false` when already dead.
    pub(crate) fn die(&mut self) -> bool {
        if self.is_dead() {
            return false;
        }
        self.state = EnemyState::Dead;
        self.destination = None;
        true
    }

    /// Flips the pause flag and reports whether it changed.
    pub(crate) fn set_paused(&mut self, paused: bool) -> bool {
        if self.paused == paused {
            return false;
        }
        self.paused = paused;
        true
    }

    pub(crate) fn navigate(&mut self, destination: Vec3, mode: NavigationMode) {
        self.destination = Some(destination);
        self.state = match mode {
            NavigationMode::Chase => EnemyState::Chase,
            NavigationMode::Patrol => EnemyState::Patrol,
        };
    }

    pub(crate) fn relocate(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Starts the attack cooldown if it elapsed; `false` otherwise.
    pub(crate) fn try_attack(&mut self, now: Duration) -> bool {
        if !self.attack.is_ready(now) {
            return false;
        }
        self.attack.trigger(now);
        true
    }

    /// Starts the scream cooldown if it elapsed; `false` otherwise.
    pub(crate) fn try_scream(&mut self, now: Duration) -> bool {
        if !self.scream.is_ready(now) {
            return false;
        }
        self.scream.trigger(now);
        true
    }

    pub(crate) fn snapshot(&self, now: Duration) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            catalog_version: self.catalog_version,
            position: self.position,
            destination: self.destination,
            state: self.state,
            health: self.health,
            stats: self.stats,
            attack_ready: self.attack.is_ready(now),
            scream_ready: self.scream.is_ready(now),
            paused: self.paused,
        }
    }
}
