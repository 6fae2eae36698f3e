use std::time::Duration;

use arena_core::{flatten, EnemySnapshot, EnemyView, PlayerSnapshot, Vec3, WeaponKind};
use arena_world::geometry::StaticGeometry;

use crate::pickups::PickupField;

const ORBIT_RADIUS: f32 = 4.0;
const ORBIT_SPEED: f32 = 0.5;
const WALK_SPEED: f32 = 5.0;
const ARRIVAL_DISTANCE: f32 = 0.1;
const PICKUP_DETOUR: f32 = 12.0;
const ENGAGE_SHARE: f32 = 0.9;
const SCOPE_DISTANCE: f32 = 15.0;

/// What the scripted player wants to do this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intent {
    /// Walking velocity in world units per second.
    pub walk: Vec3,
    /// Direction to face and aim.
    pub forward: Vec3,
    /// Whether to look through the sniper scope.
    pub zoomed: bool,
    /// Whether to hold the trigger.
    pub trigger_held: bool,
}

/// Scripted player that circles the arena center, grabs nearby pickups and
/// shoots the closest visible enemy.
#[derive(Clone, Copy, Debug, Default)]
pub struct Autopilot {
    orbit_angle: f32,
}

impl Autopilot {
    /// Decides movement and aim for the current frame.
    pub fn decide(
        &mut self,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        geometry: &StaticGeometry,
        pickups: &PickupField,
        dt: Duration,
    ) -> Intent {
        if player.defeated {
            return Intent {
                walk: Vec3::ZERO,
                forward: player.forward,
                zoomed: false,
                trigger_held: false,
            };
        }

        self.orbit_angle = (self.orbit_angle + ORBIT_SPEED * dt.as_secs_f32())
            % std::f32::consts::TAU;
        let destination = pickups
            .nearest(player.position)
            .map(|item| item.position)
            .filter(|position| flatten(*position - player.position).length() <= PICKUP_DETOUR)
            .unwrap_or_else(|| {
                Vec3::new(
                    self.orbit_angle.cos() * ORBIT_RADIUS,
                    player.position.y,
                    self.orbit_angle.sin() * ORBIT_RADIUS,
                )
            });
        let heading = flatten(destination - player.position);
        let walk = if heading.length() < ARRIVAL_DISTANCE {
            Vec3::ZERO
        } else {
            heading.normalize_or_zero() * WALK_SPEED
        };

        let visible = nearest(player.position, enemies.iter().filter(|enemy| {
            geometry.line_of_sight(player.position, enemy.position)
        }));
        let Some(target) = visible.or_else(|| nearest(player.position, enemies.iter())) else {
            return Intent {
                walk,
                forward: player.forward,
                zoomed: false,
                trigger_held: false,
            };
        };

        let distance = target.position.distance(player.position);
        let forward = (target.position - player.position)
            .try_normalize()
            .unwrap_or(player.forward);
        let in_range = distance <= player.weapon.stats().max_distance * ENGAGE_SHARE;
        Intent {
            walk,
            forward,
            zoomed: player.weapon == WeaponKind::SniperRifle && distance > SCOPE_DISTANCE,
            trigger_held: visible.is_some() && in_range,
        }
    }
}

fn nearest<'a>(
    from: Vec3,
    enemies: impl Iterator<Item = &'a EnemySnapshot>,
) -> Option<&'a EnemySnapshot> {
    enemies.min_by(|a, b| {
        a.position
            .distance_squared(from)
            .total_cmp(&b.position.distance_squared(from))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{
        Aabb, Archetype, BehaviorState, EnemyId, Event, Health, PathingState, Pickup,
    };

    fn player() -> PlayerSnapshot {
        PlayerSnapshot {
            position: Vec3::new(0.0, 1.0, 0.0),
            forward: Vec3::new(0.0, 0.0, -1.0),
            health: Health::new(100),
            max_health: Health::new(100),
            ammo: 10,
            weapon: WeaponKind::Shotgun,
            zoomed: false,
            reloading: false,
            defeated: false,
        }
    }

    fn regular(id: u32, position: Vec3) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            archetype: Archetype::Regular,
            position,
            health: Health::new(100),
            speed: 0.035,
            behavior: BehaviorState::Regular,
            pathing: PathingState::at(position),
        }
    }

    #[test]
    fn shoots_closest_visible_enemy_in_range() {
        let geometry = StaticGeometry::new(vec![Aabb::from_footprint(5.0, 0.0, 1.0, 4.0, 4.0)]);
        let enemies = EnemyView::from_snapshots(vec![
            regular(1, Vec3::new(8.0, 1.0, 0.0)),
            regular(2, Vec3::new(0.0, 1.0, -12.0)),
        ]);
        let mut pilot = Autopilot::default();
        let intent = pilot.decide(
            &player(),
            &enemies,
            &geometry,
            &PickupField::default(),
            Duration::from_millis(16),
        );
        assert!((intent.forward - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert!(intent.trigger_held);
    }

    #[test]
    fn holds_fire_beyond_weapon_range() {
        let enemies = EnemyView::from_snapshots(vec![regular(1, Vec3::new(0.0, 1.0, -30.0))]);
        let mut pilot = Autopilot::default();
        let intent = pilot.decide(
            &player(),
            &enemies,
            &StaticGeometry::default(),
            &PickupField::default(),
            Duration::from_millis(16),
        );
        assert!(!intent.trigger_held);
    }

    #[test]
    fn detours_for_nearby_pickups() {
        let mut pickups = PickupField::default();
        pickups.record(&[Event::PickupDropped {
            pickup: Pickup::Health,
            position: Vec3::new(-6.0, 0.5, 0.0),
        }]);
        let mut pilot = Autopilot::default();
        let intent = pilot.decide(
            &player(),
            &EnemyView::default(),
            &StaticGeometry::default(),
            &pickups,
            Duration::from_millis(16),
        );
        assert!((intent.walk - Vec3::new(-WALK_SPEED, 0.0, 0.0)).length() < 1e-4);
        assert!(!intent.trigger_held);
    }
}
