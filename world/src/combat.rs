//! Combat resolution: player damage, enemy damage and defeat, explosions and loot.

use std::time::Duration;

use arena_core::{
    flatten, BehaviorState, EnemyId, Event, Health, Pickup, SpiderGeneration, Vec3, WeaponKind,
};
use log::debug;
use rand::Rng;

use crate::{World, ENEMY_RADIUS};

/// Minimum spacing between two applied player hits, regardless of attacker.
pub const PLAYER_DAMAGE_COOLDOWN: Duration = Duration::from_millis(500);
/// Multiplier applied to every damage amount reported against the player.
pub const PLAYER_DAMAGE_SCALE: u32 = 5;
/// Radius of a rocket explosion.
pub const EXPLOSION_RADIUS: f32 = 5.0;
/// Damage dealt at the center of a rocket explosion.
pub const EXPLOSION_DAMAGE: f32 = 200.0;
/// Points awarded per defeated enemy.
pub const SCORE_PER_DEFEAT: u64 = 100;
/// Probability of a health pickup dropping.
pub const HEALTH_DROP_CHANCE: f32 = 0.03;
/// Upper bound of the loot roll that still drops a weapon; adds a 15% weapon
/// chance on top of the health chance.
pub const WEAPON_DROP_CEILING: f32 = 0.18;

const KNOCKBACK_HORIZONTAL: f32 = 8.0;
const KNOCKBACK_VERTICAL: f32 = 2.0;
const EXPLOSION_PUSH: f32 = 2.0;
const SPIDER_SPAWN_SPREAD: f32 = 1.0;

/// Damage a rocket explosion deals at `distance` from its center.
///
/// Falls off linearly from 200 at the center to zero at the radius.
#[must_use]
pub fn explosion_damage(distance: f32) -> u32 {
    if distance >= EXPLOSION_RADIUS {
        return 0;
    }
    let falloff = 1.0 - distance.max(0.0) / EXPLOSION_RADIUS;
    (EXPLOSION_DAMAGE * falloff).round() as u32
}

/// Decides which pickup a defeated enemy drops.
///
/// `roll` selects the branch over `[0, 0.03)` health, `[0.03, 0.18)` weapon
/// and `[0.18, 1)` nothing. `pick` chooses uniformly among the weapons other
/// than `current`; when none remain the weapon branch drops nothing.
#[must_use]
pub fn roll_loot(roll: f32, pick: f32, current: WeaponKind) -> Option<Pickup> {
    if roll < HEALTH_DROP_CHANCE {
        return Some(Pickup::Health);
    }
    if roll >= WEAPON_DROP_CEILING {
        return None;
    }

    let eligible: Vec<WeaponKind> = WeaponKind::ALL
        .iter()
        .copied()
        .filter(|weapon| *weapon != current)
        .collect();
    if eligible.is_empty() {
        return None;
    }
    let index = ((pick.clamp(0.0, 1.0) * eligible.len() as f32) as usize).min(eligible.len() - 1);
    Some(Pickup::Weapon(eligible[index]))
}

/// Applies damage to the player unless a hit landed within the cooldown window.
pub(crate) fn damage_player(
    world: &mut World,
    amount: u32,
    source: Vec3,
    out_events: &mut Vec<Event>,
) {
    let now = world.clock;
    let player = &mut world.player;
    if player.defeated {
        return;
    }
    if let Some(last) = player.last_damage_at {
        if now.saturating_sub(last) < PLAYER_DAMAGE_COOLDOWN {
            return;
        }
    }

    let scaled = amount.saturating_mul(PLAYER_DAMAGE_SCALE);
    player.last_damage_at = Some(now);
    player.health = player.health.damaged(scaled);
    out_events.push(Event::PlayerDamaged {
        amount: scaled,
        health: player.health,
    });

    let away = flatten(player.position - source).normalize_or_zero();
    out_events.push(Event::PlayerKnockedBack {
        impulse: away * KNOCKBACK_HORIZONTAL + Vec3::Y * KNOCKBACK_VERTICAL,
    });

    if player.health.is_depleted() {
        player.defeated = true;
        debug!("player defeated at {:.1}s", now.as_secs_f32());
        out_events.push(Event::PlayerDefeated);
    }
}

/// Applies direct damage to an enemy, defeating it once its health is depleted.
pub(crate) fn damage_enemy(
    world: &mut World,
    enemy: EnemyId,
    amount: u32,
    out_events: &mut Vec<Event>,
) {
    let Some(state) = world.enemies.get_mut(enemy) else {
        return;
    };
    state.health = state.health.damaged(amount);
    if state.health.is_depleted() {
        defeat_enemy(world, enemy, out_events);
    } else {
        out_events.push(Event::EnemyDamaged {
            enemy,
            amount,
            remaining: state.health,
        });
    }
}

/// Detonates a rocket blast at `center`.
pub(crate) fn explode(world: &mut World, center: Vec3, out_events: &mut Vec<Event>) {
    out_events.push(Event::Explosion {
        center,
        radius: EXPLOSION_RADIUS,
    });

    for id in world.enemies.ids() {
        let Some(state) = world.enemies.get(id) else {
            continue;
        };
        let offset = state.position - center;
        let distance = offset.length();
        if distance >= EXPLOSION_RADIUS {
            continue;
        }

        let falloff = 1.0 - distance / EXPLOSION_RADIUS;
        let pushed = state.position + offset.normalize_or_zero() * EXPLOSION_PUSH * falloff;
        if world.geometry.is_position_valid(pushed, ENEMY_RADIUS) {
            if let Some(state) = world.enemies.get_mut(id) {
                state.position = pushed;
            }
        }

        let amount = explosion_damage(distance);
        if amount > 0 {
            damage_enemy(world, id, amount, out_events);
        }
    }

    let player_distance = world.player.position.distance(center);
    if player_distance < EXPLOSION_RADIUS {
        out_events.push(Event::CameraShake {
            intensity: 1.0 - player_distance / EXPLOSION_RADIUS,
        });
    }
}

/// Removes a defeated enemy, releasing spider offspring, awarding score and rolling loot.
pub(crate) fn defeat_enemy(world: &mut World, enemy: EnemyId, out_events: &mut Vec<Event>) {
    let Some(state) = world.enemies.remove(enemy) else {
        return;
    };
    debug!(
        "{} {} defeated at {}",
        state.archetype.label(),
        enemy.get(),
        state.position
    );
    out_events.push(Event::EnemyDefeated {
        enemy,
        archetype: state.archetype,
        position: state.position,
    });

    if let Some(generation) = state.behavior.spider_generation() {
        if let Some((child, count)) = generation.offspring(world.wave) {
            for _ in 0..count {
                spawn_spider_child(world, state.position, child, out_events);
            }
        }
    }

    world.score = world.score.saturating_add(SCORE_PER_DEFEAT);
    out_events.push(Event::ScoreChanged {
        score: world.score,
        delta: SCORE_PER_DEFEAT,
    });

    let roll: f32 = world.rng.gen();
    let pick: f32 = world.rng.gen();
    if let Some(pickup) = roll_loot(roll, pick, world.player.weapon) {
        debug!("enemy {} dropped {pickup:?}", enemy.get());
        out_events.push(Event::PickupDropped {
            pickup,
            position: state.position,
        });
    }
}

fn spawn_spider_child(
    world: &mut World,
    parent: Vec3,
    generation: SpiderGeneration,
    out_events: &mut Vec<Event>,
) {
    let angle = world.rng.gen_range(0.0..std::f32::consts::TAU);
    let radius = world.rng.gen_range(0.0..SPIDER_SPAWN_SPREAD);
    let candidate = parent + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
    let position = if world.geometry.is_position_valid(candidate, ENEMY_RADIUS) {
        candidate
    } else {
        parent
    };

    let behavior = BehaviorState::Spider { generation };
    let id = world.enemies.insert(
        position,
        Health::new(generation.health()),
        generation.speed(),
        behavior,
    );
    out_events.push(Event::EnemySpawned {
        enemy: id,
        archetype: behavior.archetype(),
        position,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explosion_damage_falls_off_linearly() {
        assert_eq!(explosion_damage(0.0), 200);
        assert_eq!(explosion_damage(2.5), 100);
        assert_eq!(explosion_damage(EXPLOSION_RADIUS), 0);
        assert_eq!(explosion_damage(7.0), 0);
    }

    #[test]
    fn loot_roll_boundaries() {
        let current = WeaponKind::Pistol;
        assert_eq!(roll_loot(0.029, 0.5, current), Some(Pickup::Health));
        assert!(matches!(
            roll_loot(0.03, 0.5, current),
            Some(Pickup::Weapon(_))
        ));
        assert!(matches!(
            roll_loot(0.179, 0.5, current),
            Some(Pickup::Weapon(_))
        ));
        assert_eq!(roll_loot(0.18, 0.5, current), None);
    }

    #[test]
    fn weapon_drops_exclude_current_weapon() {
        for weapon in WeaponKind::ALL {
            for step in 0..=10 {
                let pick = step as f32 / 10.0;
                let drop = roll_loot(0.1, pick, weapon);
                assert!(matches!(drop, Some(Pickup::Weapon(kind)) if kind != weapon));
            }
        }
    }
}
