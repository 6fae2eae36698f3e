use std::time::Duration;

use arena_core::{flatten, Event, Pickup, Vec3};

/// Time a dropped pickup stays in the arena before fading.
pub const PICKUP_LIFETIME: Duration = Duration::from_secs(15);
/// Horizontal distance at which the player collects a pickup.
pub const COLLECT_RANGE: f32 = 1.5;

/// Pickup lying in the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DroppedPickup {
    /// What the pickup grants.
    pub pickup: Pickup,
    /// Where it lies.
    pub position: Vec3,
    /// Simulation time at which it fades.
    pub expires_at: Duration,
}

/// Adapter-owned collection of pickups dropped by defeated enemies.
#[derive(Clone, Debug, Default)]
pub struct PickupField {
    clock: Duration,
    items: Vec<DroppedPickup>,
}

impl PickupField {
    /// Tracks drops and the passage of time reported by the world.
    pub fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.clock = self.clock.saturating_add(*dt),
                Event::PickupDropped { pickup, position } => self.items.push(DroppedPickup {
                    pickup: *pickup,
                    position: *position,
                    expires_at: self.clock + PICKUP_LIFETIME,
                }),
                _ => {}
            }
        }
        let now = self.clock;
        self.items.retain(|item| item.expires_at > now);
    }

    /// Removes and returns every pickup within reach of `position`.
    pub fn collect(&mut self, position: Vec3) -> Vec<Pickup> {
        let mut collected = Vec::new();
        self.items.retain(|item| {
            if flatten(item.position - position).length() <= COLLECT_RANGE {
                collected.push(item.pickup);
                false
            } else {
                true
            }
        });
        collected
    }

    /// Pickup closest to `position`, if any remain.
    #[must_use]
    pub fn nearest(&self, position: Vec3) -> Option<&DroppedPickup> {
        self.items.iter().min_by(|a, b| {
            a.position
                .distance_squared(position)
                .total_cmp(&b.position.distance_squared(position))
        })
    }

    /// Pickups currently lying in the arena.
    #[must_use]
    pub fn items(&self) -> &[DroppedPickup] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::WeaponKind;

    fn drop_at(pickup: Pickup, position: Vec3) -> Event {
        Event::PickupDropped { pickup, position }
    }

    #[test]
    fn pickups_fade_after_their_lifetime() {
        let mut field = PickupField::default();
        field.record(&[drop_at(Pickup::Health, Vec3::new(5.0, 0.5, 0.0))]);
        field.record(&[Event::TimeAdvanced {
            dt: PICKUP_LIFETIME - Duration::from_millis(1),
        }]);
        assert_eq!(field.items().len(), 1);
        field.record(&[Event::TimeAdvanced {
            dt: Duration::from_millis(1),
        }]);
        assert!(field.items().is_empty());
    }

    #[test]
    fn only_nearby_pickups_are_collected() {
        let mut field = PickupField::default();
        field.record(&[
            drop_at(Pickup::Health, Vec3::new(1.0, 0.5, 1.0)),
            drop_at(Pickup::Weapon(WeaponKind::Shotgun), Vec3::new(10.0, 0.5, 0.0)),
        ]);

        assert_eq!(
            field.nearest(Vec3::ZERO).map(|item| item.pickup),
            Some(Pickup::Health)
        );
        assert_eq!(field.collect(Vec3::new(0.0, 1.0, 0.0)), vec![Pickup::Health]);
        assert_eq!(field.items().len(), 1);
        assert_eq!(
            field.nearest(Vec3::ZERO).map(|item| item.pickup),
            Some(Pickup::Weapon(WeaponKind::Shotgun))
        );
    }
}
