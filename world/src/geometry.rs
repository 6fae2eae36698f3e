//! Read-only queries against the static collision volumes of the arena.

use arena_core::{Aabb, RayHit, Vec3};

const PARALLEL_EPSILON: f32 = 1e-8;

/// Immutable set of axis-aligned volumes making up buildings and boundary walls.
#[derive(Clone, Debug, Default)]
pub struct StaticGeometry {
    volumes: Vec<Aabb>,
}

impl StaticGeometry {
    /// Wraps the provided collision volumes.
    #[must_use]
    pub fn new(volumes: Vec<Aabb>) -> Self {
        Self { volumes }
    }

    /// Collision volumes in the order they were supplied.
    #[must_use]
    pub fn volumes(&self) -> &[Aabb] {
        &self.volumes
    }

    /// Nearest intersection of a ray with any volume within `max_distance`.
    ///
    /// A ray that starts inside a volume reports a hit at distance zero whose
    /// normal points back along the ray.
    #[must_use]
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || max_distance < 0.0 {
            return None;
        }

        self.volumes
            .iter()
            .filter_map(|volume| intersect(volume, origin, direction))
            .filter(|(distance, _)| *distance <= max_distance)
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(distance, normal)| RayHit {
                distance,
                point: origin + direction * distance,
                normal,
            })
    }

    /// Reports whether the segment between two points is free of static geometry.
    #[must_use]
    pub fn line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return true;
        }
        self.raycast(from, delta / length, length).is_none()
    }

    /// Reports whether a sphere overlaps any volume.
    #[must_use]
    pub fn sphere_intersects_any(&self, center: Vec3, radius: f32) -> bool {
        let radius_squared = radius * radius;
        self.volumes.iter().any(|volume| {
            volume.contains_point(center)
                || volume.closest_point(center).distance_squared(center) < radius_squared
        })
    }

    /// Reports whether a point lies inside any volume.
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.volumes
            .iter()
            .any(|volume| volume.contains_point(point))
    }

    /// Reports whether a body of the given radius may occupy `center`.
    #[must_use]
    pub fn is_position_valid(&self, center: Vec3, radius: f32) -> bool {
        !self.sphere_intersects_any(center, radius)
    }
}

// Slab test returning the entry distance and the outward normal of the entry face.
fn intersect(volume: &Aabb, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
    let min = volume.min();
    let max = volume.max();
    let mut near = f32::NEG_INFINITY;
    let mut far = f32::INFINITY;
    let mut normal = -direction;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < PARALLEL_EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        let (enter, exit) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        if enter > near {
            near = enter;
            let mut face = Vec3::ZERO;
            face[axis] = -d.signum();
            normal = face;
        }
        far = far.min(exit);
        if near > far {
            return None;
        }
    }

    if far < 0.0 {
        return None;
    }
    if near < 0.0 {
        return Some((0.0, -direction));
    }
    Some((near, normal))
}
