//! Projectile engine: flight, hit resolution and expiry.

use std::{collections::BTreeMap, time::Duration};

use arena_core::{Event, ProjectileId, ProjectileKind, ProjectileSnapshot, Vec3};
use log::trace;

use crate::{combat, World};

/// Distance from an enemy center at which a projectile connects.
pub(crate) const ENEMY_HIT_DISTANCE: f32 = 0.8;
/// Distance from the player center at which a hostile projectile connects.
pub(crate) const PLAYER_HIT_DISTANCE: f32 = 1.0;
const GROUND_HEIGHT: f32 = 0.1;
const BLAST_STANDOFF: f32 = 0.1;

/// Projectile stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) id: ProjectileId,
    pub(crate) kind: ProjectileKind,
    pub(crate) position: Vec3,
    pub(crate) direction: Vec3,
    pub(crate) speed: f32,
    pub(crate) damage: u32,
    pub(crate) distance: f32,
    pub(crate) max_distance: f32,
    pub(crate) age: Duration,
}

impl ProjectileState {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            direction: self.direction,
            distance: self.distance,
            max_distance: self.max_distance,
        }
    }

    /// Moves the projectile along its heading and returns the previous position.
    fn advance(&mut self, dt: Duration) -> Vec3 {
        let previous = self.position;
        let step = self.speed * dt.as_secs_f32();
        self.position += self.direction * step;
        self.distance += step;
        self.age = self.age.saturating_add(dt);
        previous
    }

    fn is_expired(&self) -> bool {
        self.distance > self.max_distance || self.age > self.kind.lifetime()
    }
}

/// Launch request validated by the world.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Launch {
    pub(crate) kind: ProjectileKind,
    pub(crate) origin: Vec3,
    pub(crate) direction: Vec3,
    pub(crate) speed: f32,
    pub(crate) damage: u32,
    pub(crate) max_distance: f32,
}

/// Registry that stores projectiles in flight keyed by identifier.
#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: BTreeMap<ProjectileId, ProjectileState>,
    next_projectile_id: ProjectileId,
}

impl ProjectileRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    /// Stores a new projectile, returning `None` when the direction is degenerate.
    pub(crate) fn launch(&mut self, launch: Launch) -> Option<ProjectileId> {
        let direction = launch.direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
        let state = ProjectileState {
            id,
            kind: launch.kind,
            position: launch.origin,
            direction,
            speed: launch.speed,
            damage: launch.damage,
            distance: 0.0,
            max_distance: launch.max_distance,
            age: Duration::ZERO,
        };
        let _ = self.entries.insert(id, state);
        Some(id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ProjectileState> {
        self.entries.values()
    }

    fn ids(&self) -> Vec<ProjectileId> {
        self.entries.keys().copied().collect()
    }
}

/// Advances every projectile by `dt` and resolves hits in order: enemy or
/// player contact, then static geometry or ground, then range and age expiry.
pub(crate) fn advance_projectiles(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    for id in world.projectiles.ids() {
        let Some(projectile) = world.projectiles.entries.get_mut(&id) else {
            continue;
        };
        let previous = projectile.advance(dt);
        let projectile = projectile.clone();

        if resolve_contact(world, &projectile, out_events) {
            let _ = world.projectiles.entries.remove(&id);
            continue;
        }

        if resolve_environment(world, &projectile, previous, out_events) {
            let _ = world.projectiles.entries.remove(&id);
            continue;
        }

        if projectile.is_expired() {
            let _ = world.projectiles.entries.remove(&id);
            out_events.push(Event::ProjectileExpired { projectile: id });
        }
    }
}

fn resolve_contact(
    world: &mut World,
    projectile: &ProjectileState,
    out_events: &mut Vec<Event>,
) -> bool {
    if projectile.kind.is_hostile() {
        let player_position = world.player.position;
        if player_position.distance(projectile.position) >= PLAYER_HIT_DISTANCE {
            return false;
        }
        out_events.push(Event::ProjectileImpact {
            projectile: projectile.id,
            point: projectile.position,
        });
        combat::damage_player(world, projectile.damage, projectile.position, out_events);
        return true;
    }

    let target = world
        .enemies
        .iter()
        .find(|enemy| enemy.position.distance(projectile.position) < ENEMY_HIT_DISTANCE)
        .map(|enemy| enemy.id);
    let Some(enemy) = target else {
        return false;
    };

    trace!("projectile {} struck enemy {}", projectile.id.get(), enemy.get());
    if projectile.kind.explodes() {
        combat::explode(world, projectile.position, out_events);
    } else {
        combat::damage_enemy(world, enemy, projectile.damage, out_events);
    }
    true
}

fn resolve_environment(
    world: &mut World,
    projectile: &ProjectileState,
    previous: Vec3,
    out_events: &mut Vec<Event>,
) -> bool {
    let reach = previous.distance(projectile.position) + projectile.kind.environment_lookahead();
    let hit = world
        .geometry
        .raycast(previous, projectile.direction, reach)
        .map(|hit| hit.point);
    let grounded = projectile.position.y <= GROUND_HEIGHT;
    if hit.is_none() && !grounded {
        return false;
    }

    let point = hit.unwrap_or(Vec3::new(
        projectile.position.x,
        0.0,
        projectile.position.z,
    ));
    trace!(
        "projectile {} hit the environment at {point}",
        projectile.id.get()
    );
    if projectile.kind.explodes() {
        // Blast centers sit just off the struck surface.
        let center = point - projectile.direction * BLAST_STANDOFF;
        combat::explode(world, center, out_events);
    } else {
        out_events.push(Event::ProjectileImpact {
            projectile: projectile.id,
            point,
        });
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullet(direction: Vec3) -> Launch {
        Launch {
            kind: ProjectileKind::Bullet,
            origin: Vec3::new(0.0, 1.0, 0.0),
            direction,
            speed: 20.0,
            damage: 50,
            max_distance: 100.0,
        }
    }

    #[test]
    fn launch_normalizes_direction() {
        let mut registry = ProjectileRegistry::new();
        let id = registry
            .launch(bullet(Vec3::new(3.0, 0.0, 4.0)))
            .expect("valid direction");
        let stored = registry.entries.get(&id).expect("stored");
        assert!((stored.direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn launch_rejects_zero_direction() {
        let mut registry = ProjectileRegistry::new();
        assert!(registry.launch(bullet(Vec3::ZERO)).is_none());
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn advance_accumulates_distance_and_age() {
        let mut registry = ProjectileRegistry::new();
        let id = registry.launch(bullet(Vec3::X)).expect("valid direction");
        let projectile = registry.entries.get_mut(&id).expect("stored");
        let previous = projectile.advance(Duration::from_millis(500));
        assert_eq!(previous, Vec3::new(0.0, 1.0, 0.0));
        assert!((projectile.distance - 10.0).abs() < 1e-5);
        assert_eq!(projectile.age, Duration::from_millis(500));
        assert!(!projectile.is_expired());
    }
}
