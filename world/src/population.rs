//! Live enemy set, versioned enemy catalog and difficulty escalation.

use std::{collections::BTreeMap, time::Duration};

use dread_core::{
    config::PopulationConfig, timer, timer::Schedule, EnemyId, EnemyStats, EnemyTypeId,
    EnemyTypeSpec, PopulationSnapshot, SpawnRejection, Vec3,
};

use crate::enemy::EnemyInstance;

/// Amount added to the difficulty multiplier by each escalation.
pub const ESCALATION_MULTIPLIER_STEP: f32 = 0.2;
/// Factor applied to health, damage, detection and attack range per escalation.
pub const ESCALATION_STAT_GROWTH: f32 = 1.1;
/// Hard ceiling the population limit never grows past.
pub const POPULATION_HARD_CEILING: u32 = 10;
/// Factor applied to the spawn interval per escalation.
pub const SPAWN_INTERVAL_DECAY: f32 = 0.9;
/// Shortest spawn interval escalation can reach.
pub const SPAWN_INTERVAL_FLOOR: Duration = Duration::from_secs(10);

/// Enemy templates plus a version bumped on every in-place mutation.
#[derive(Clone, Debug)]
pub(crate) struct EnemyCatalog {
    version: u32,
    types: Vec<EnemyTypeSpec>,
}

impl EnemyCatalog {
    fn new(types: Vec<EnemyTypeSpec>) -> Self {
        Self { version: 0, types }
    }

    pub(crate) fn version(&self) -> u32 {
        self.version
    }

    pub(crate) fn types(&self) -> &[EnemyTypeSpec] {
        &self.types
    }

    fn get(&self, kind: EnemyTypeId) -> Option<&EnemyTypeSpec> {
        kind.index().and_then(|index| self.types.get(index))
    }

    fn escalate(&mut self) {
        for spec in &mut self.types {
            spec.health *= ESCALATION_STAT_GROWTH;
            spec.damage *= ESCALATION_STAT_GROWTH;
            spec.detection_range *= ESCALATION_STAT_GROWTH;
            spec.attack_range *= ESCALATION_STAT_GROWTH;
        }
        self.version = self.version.wrapping_add(1);
    }

    fn replace(&mut self, types: Vec<EnemyTypeSpec>) {
        self.types = types;
        self.version = self.version.wrapping_add(1);
    }
}

/// Owner of live-set membership.
#[derive(Debug)]
pub(crate) struct Population {
    catalog: EnemyCatalog,
    baseline_types: Vec<EnemyTypeSpec>,
    baseline: PopulationConfig,
    max_enemies: u32,
    spawn_interval: Duration,
    difficulty_multiplier: f32,
    next_id: u32,
    live: BTreeMap<EnemyId, EnemyInstance>,
    corpses: BTreeMap<EnemyId, EnemyInstance>,
    despawns: Schedule<EnemyId>,
}

impl Population {
    pub(crate) fn new(config: &PopulationConfig, types: Vec<EnemyTypeSpec>) -> Self {
        Self {
            catalog: EnemyCatalog::new(types.clone()),
            baseline_types: types,
            baseline: config.clone(),
            max_enemies: config.max_enemies,
            spawn_interval: timer::seconds(config.spawn_interval),
            difficulty_multiplier: 1.0,
            next_id: 0,
            live: BTreeMap::new(),
            corpses: BTreeMap::new(),
            despawns: Schedule::new(),
        }
    }

    pub(crate) fn catalog(&self) -> &EnemyCatalog {
        &self.catalog
    }

    pub(crate) fn max_enemies(&self) -> u32 {
        self.max_enemies
    }

    pub(crate) fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    pub(crate) fn difficulty_multiplier(&self) -> f32 {
        self.difficulty_multiplier
    }

    pub(crate) fn live_count(&self) -> u32 {
        u32::try_from(self.live.len()).unwrap_or(u32::MAX)
    }

    pub(crate) fn corpse_count(&self) -> usize {
        self.corpses.len()
    }

    pub(crate) fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot {
            live: self.live_count(),
            max_enemies: self.max_enemies,
            spawn_interval: self.spawn_interval,
            difficulty_multiplier: self.difficulty_multiplier,
            catalog_len: u32::try_from(self.catalog.types().len())
                .unwrap_or(u32::MAX),
            catalog_version: self.catalog.version(),
        }
    }

    pub(crate) fn live(&self) -> impl Iterator<Item = &EnemyInstance> {
        self.live.values()
    }

    pub(crate) fn live_ids(&self) -> Vec<EnemyId> {
        self.live.keys().copied().collect()
    }

    pub(crate) fn get(&self, enemy: EnemyId) -> Option<&EnemyInstance> {
        self.live.get(&enemy)
    }

    pub(crate) fn live_mut(&mut self, enemy: EnemyId) -> Option<&mut EnemyInstance> {
        self.live.get_mut(&enemy)
    }

    pub(crate) fn live_iter_mut(&mut self) -> impl Iterator<Item = &mut EnemyInstance> {
        self.live.values_mut()
    }

    /// Instantiates `kind` at `position`, copying its current stats.
    pub(crate) fn spawn(
        &mut self,
        kind: EnemyTypeId,
        position: Vec3,
    ) -> Result<EnemyId, SpawnRejection> {
        if self.live_count() >= self.max_enemies {
            return Err(SpawnRejection::PopulationCeiling);
        }
        let spec = self
            .catalog
            .get(kind)
            .ok_or(SpawnRejection::UnknownEnemyType)?;

        let id = EnemyId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let instance = EnemyInstance::spawn(
            id,
            kind,
            self.catalog.version(),
            EnemyStats::from(spec),
            spec.sounds.clone(),
            position,
        );
        let _ = self.live.insert(id, instance);
        Ok(id)
    }

    /// Moves a dead instance out of the live set and queues its removal.
    pub(crate) fn retire(&mut self, enemy: EnemyId, despawn_at: Duration) -> bool {
        let Some(instance) = self.live.remove(&enemy) else {
            return false;
        };
        let _ = self.corpses.insert(enemy, instance);
        self.despawns.push(despawn_at, enemy);
        true
    }

    /// Drops corpses whose grace delay elapsed.
    pub(crate) fn despawn_due(&mut self, now: Duration) -> Vec<EnemyId> {
        let due = self.despawns.drain_due(now);
        for enemy in &due {
            let _ = self.corpses.remove(enemy);
        }
        due
    }

    pub(crate) fn escalate(&mut self) {
        self.difficulty_multiplier += ESCALATION_MULTIPLIER_STEP;
        self.catalog.escalate();
        self.max_enemies = self
            .max_enemies
            .saturating_add(1)
            .min(POPULATION_HARD_CEILING);
        self.spawn_interval = self
            .spawn_interval
            .mul_f32(SPAWN_INTERVAL_DECAY)
            .max(SPAWN_INTERVAL_FLOOR);
    }

    pub(crate) fn reset_difficulty(&mut self) {
        self.catalog.replace(self.baseline_types.clone());
        self.difficulty_multiplier = 1.0;
        self.max_enemies = self.baseline.max_enemies;
        self.spawn_interval = timer::seconds(self.baseline.spawn_interval);
    }
}
