use std::time::Duration;

use arena_core::{Vec3, REFERENCE_FRAME_RATE};
use arena_world::{geometry::StaticGeometry, PLAYER_RADIUS, PLAYER_SPAWN};

const GRAVITY: f32 = 20.0;
const KNOCKBACK_DAMPING: f32 = 0.9;

/// Integrates knockback impulses into the player's position.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerMotion {
    velocity: Vec3,
}

impl PlayerMotion {
    /// Adds an impulse to the player's velocity.
    pub fn push(&mut self, impulse: Vec3) {
        self.velocity += impulse;
    }

    /// Velocity left over from knockback.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Moves the player by its walking velocity plus knockback, stopping at walls.
    pub fn integrate(
        &mut self,
        position: Vec3,
        walk: Vec3,
        dt: Duration,
        geometry: &StaticGeometry,
    ) -> Vec3 {
        let dt_secs = dt.as_secs_f32();
        self.velocity.y -= GRAVITY * dt_secs;

        let mut next = position + (walk + self.velocity) * dt_secs;
        if next.y <= PLAYER_SPAWN.y {
            next.y = PLAYER_SPAWN.y;
            self.velocity.y = self.velocity.y.max(0.0);
        }

        let damping = KNOCKBACK_DAMPING.powf(dt_secs * REFERENCE_FRAME_RATE);
        self.velocity.x *= damping;
        self.velocity.z *= damping;

        if geometry.is_position_valid(next, PLAYER_RADIUS) {
            return next;
        }

        self.velocity.x = 0.0;
        self.velocity.z = 0.0;
        let upright = Vec3::new(position.x, next.y, position.z);
        if geometry.is_position_valid(upright, PLAYER_RADIUS) {
            upright
        } else {
            position
        }
    }
}
