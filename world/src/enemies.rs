//! Authoritative enemy state and identifier allocation.

use std::collections::BTreeMap;

use arena_core::{
    Archetype, BehaviorState, EnemyId, EnemySnapshot, Health, PathingState, Vec3,
};

/// Enemy stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) id: EnemyId,
    pub(crate) archetype: Archetype,
    pub(crate) position: Vec3,
    pub(crate) health: Health,
    pub(crate) speed: f32,
    pub(crate) behavior: BehaviorState,
    pub(crate) pathing: PathingState,
}

impl EnemyState {
    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            archetype: self.archetype,
            position: self.position,
            health: self.health,
            speed: self.speed,
            behavior: self.behavior,
            pathing: self.pathing,
        }
    }
}

/// Registry that stores live enemies keyed by identifier.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, EnemyState>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    /// Stores a new enemy and returns the identifier allocated to it.
    pub(crate) fn insert(
        &mut self,
        position: Vec3,
        health: Health,
        speed: f32,
        behavior: BehaviorState,
    ) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        let state = EnemyState {
            id,
            archetype: behavior.archetype(),
            position,
            health,
            speed,
            behavior,
            pathing: PathingState::at(position),
        };
        let _ = self.entries.insert(id, state);
        id
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&EnemyState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut EnemyState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: EnemyId) -> Option<EnemyState> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &EnemyState> {
        self.entries.values()
    }

    /// Identifiers of every live enemy in ascending order.
    pub(crate) fn ids(&self) -> Vec<EnemyId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
