#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy steering: direct pursuit blended with local obstacle avoidance,
//! stuck detection, candidate-direction re-pathing and escape teleports.

use std::{f32::consts::TAU, time::Duration};

use arena_core::{
    flatten, BehaviorState, Command, DetourSide, EnemySnapshot, EnemyView, Event, PathingState,
    PlayerSnapshot, Vec3, REFERENCE_FRAME_RATE,
};
use arena_world::{geometry::StaticGeometry, ENEMY_RADIUS};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DIRECTION_COUNT: usize = 16;
/// Minimum movement per reference frame that counts as movement.
const STUCK_EPSILON: f32 = 0.01;
/// Rate at which stuck time accrues while moving without gaining ground.
const STALL_RATE: f32 = 0.25;
const STUCK_ESCAPE_SECS: f32 = 3.0;
const STUCK_REPATH_SECS: f32 = 0.5;
const BLOCK_PROBE_RANGE: f32 = 5.0;
const PROXIMITY_RANGE: f32 = 2.5;
const PROXIMITY_WARNING: f32 = 1.0;
const PROXIMITY_ACCELERANT: f32 = 0.8;
const CLEARANCE_RANGE: f32 = 4.0;
const SIGHT_PROBE_DISTANCE: f32 = 3.0;
const AVOIDANCE_WEIGHT: f32 = 0.8;
const SIGHT_BONUS: f32 = 0.5;
const BLOCKED_AMPLIFICATION: f32 = 2.5;
const REPATH_INTERVAL: Duration = Duration::from_millis(800);
const DECAY_DELAY: Duration = Duration::from_millis(1_500);
const OFFSET_DECAY: f32 = 0.92;
const OBSTACLE_SLOWDOWN: f32 = 0.7;
const SLIDE_SPEED_FACTOR: f32 = 0.5;
const SLIDE_NUDGE: f32 = 0.1;
const COLLISION_JITTER: f32 = 0.2;
const ESCAPE_ATTEMPTS: usize = 20;
const ESCAPE_MIN_DISTANCE: f32 = 8.0;
const ESCAPE_MAX_DISTANCE: f32 = 15.0;
const ESCAPE_FALLBACK_DISTANCE: f32 = 8.0;
const PREFERRED_CASTER_DISTANCE: f32 = 10.0;
const CASTER_ADVANCE_MARGIN: f32 = 5.0;
const SIDE_TOLERANCE: f32 = 0.1;

/// Configuration parameters required to construct the steering system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided random seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that emits movement and escape commands for every live enemy.
#[derive(Debug)]
pub struct Steering {
    rng: ChaCha8Rng,
}

impl Steering {
    /// Creates a new steering system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and immutable views to emit steering commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        player: &PlayerSnapshot,
        geometry: &StaticGeometry,
        now: Duration,
        out: &mut Vec<Command>,
    ) {
        let mut dt = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt: step } = event {
                dt = dt.saturating_add(*step);
            }
        }

        if dt.is_zero() {
            return;
        }

        for enemy in enemies.iter() {
            if let Some(command) = self.steer(enemy, player.position, geometry, now, dt) {
                out.push(command);
            }
        }
    }

    fn steer(
        &mut self,
        enemy: &EnemySnapshot,
        player: Vec3,
        geometry: &StaticGeometry,
        now: Duration,
        dt: Duration,
    ) -> Option<Command> {
        let dt_secs = dt.as_secs_f32();
        let position = enemy.position;
        let mut pathing = enemy.pathing;

        let offset_to_player = flatten(player - position);
        let distance = offset_to_player.length();
        let to_player = offset_to_player.normalize_or_zero();
        if to_player == Vec3::ZERO {
            return None;
        }

        let heading = pursuit_heading(enemy, to_player, distance);
        let threshold = STUCK_EPSILON * REFERENCE_FRAME_RATE * dt_secs;
        let moved = flatten(position - pathing.last_position);
        if moved.dot(heading) >= threshold {
            pathing.stuck_time = (pathing.stuck_time - dt_secs).max(0.0);
        } else if moved.length() >= threshold {
            pathing.stuck_time += dt_secs * STALL_RATE;
        } else {
            pathing.stuck_time += dt_secs;
        }
        pathing.last_position = position;

        if pathing.stuck_time > STUCK_ESCAPE_SECS {
            return Some(self.escape(enemy, player, geometry));
        }

        let probes = Probes::sense(position, heading, distance, geometry);
        if let Some((_, nearest)) = probes.nearest_obstacle {
            if nearest < PROXIMITY_WARNING {
                pathing.stuck_time += dt_secs * PROXIMITY_ACCELERANT;
            }
        }
        if !probes.path_blocked && probes.nearest_obstacle.is_none() {
            pathing.detour = None;
        }

        let wants_repath = probes.path_blocked
            || probes.nearest_obstacle.is_some()
            || pathing.stuck_time > STUCK_REPATH_SECS;
        let repath_due = pathing
            .last_path_change
            .map_or(true, |changed| now.saturating_sub(changed) >= REPATH_INTERVAL);
        if wants_repath && repath_due {
            let (offset, detour) =
                self.choose_offset(position, heading, player, &probes, geometry, pathing.detour);
            pathing.offset = offset;
            pathing.detour = detour;
            pathing.last_path_change = Some(now);
        } else if pathing.stuck_time < STUCK_REPATH_SECS
            && pathing
                .last_path_change
                .is_some_and(|changed| now.saturating_sub(changed) >= DECAY_DELAY)
        {
            pathing.offset *= OFFSET_DECAY;
        }

        let direction = flatten(heading + pathing.offset)
            .try_normalize()
            .unwrap_or(heading);
        let mut step = enemy.speed * REFERENCE_FRAME_RATE * dt_secs;
        if probes.nearest_obstacle.is_some() {
            step *= OBSTACLE_SLOWDOWN;
        }

        let movement = match geometry.raycast(position, direction, step + ENEMY_RADIUS) {
            Some(hit) => {
                let slide = flatten(clip_velocity(direction, hit.normal)).normalize_or_zero();
                pathing.offset = pathing.offset.lerp(slide, SLIDE_NUDGE);
                slide * step * SLIDE_SPEED_FACTOR
            }
            None => direction * step,
        };

        let mut destination = position + movement;
        if !geometry.is_position_valid(destination, ENEMY_RADIUS) {
            destination = position;
            pathing.stuck_time = (pathing.stuck_time * 2.0).max(dt_secs);
            pathing.last_path_change = None;
            pathing.offset += Vec3::new(
                self.rng.gen_range(-COLLISION_JITTER..COLLISION_JITTER),
                0.0,
                self.rng.gen_range(-COLLISION_JITTER..COLLISION_JITTER),
            );
        }

        Some(Command::SteerEnemy {
            enemy: enemy.id,
            position: destination,
            pathing,
        })
    }

    /// Picks a new pathfinding offset and the detour side it commits to.
    ///
    /// A committed side is kept while any clear candidate remains on it.
    fn choose_offset(
        &mut self,
        position: Vec3,
        heading: Vec3,
        player: Vec3,
        probes: &Probes,
        geometry: &StaticGeometry,
        detour: Option<DetourSide>,
    ) -> (Vec3, Option<DetourSide>) {
        let obstacle = probes.nearest_obstacle;
        let clear: Vec<Vec3> = (0..DIRECTION_COUNT)
            .map(compass)
            .filter(|candidate| {
                geometry
                    .raycast(position, *candidate, CLEARANCE_RANGE)
                    .is_none()
            })
            .collect();
        let score = |candidate: Vec3| {
            let avoidance = obstacle.map_or(1.0, |(direction, _)| {
                1.0 - candidate.dot(direction).max(0.0)
            });
            let lookout = position + candidate * SIGHT_PROBE_DISTANCE;
            let sight = if geometry.line_of_sight(lookout, player) {
                SIGHT_BONUS
            } else {
                0.0
            };
            candidate.dot(heading) + AVOIDANCE_WEIGHT * avoidance + sight
        };

        let on_side = detour.and_then(|side| {
            let lateral = side.lateral(heading);
            highest(
                clear
                    .iter()
                    .copied()
                    .filter(|candidate| candidate.dot(lateral) >= -SIDE_TOLERANCE),
                &score,
            )
        });

        match on_side.or_else(|| highest(clear.iter().copied(), &score)) {
            Some(candidate) => {
                let amplification = obstacle.map_or(1.0, |(_, distance)| {
                    1.5 + (1.0 - distance.min(1.0))
                });
                let side = DetourSide::of(candidate, heading, SIDE_TOLERANCE).or(detour);
                ((candidate - heading) * amplification, side)
            }
            None => {
                let random = compass_angle(self.rng.gen_range(0.0..TAU));
                ((random - heading) * BLOCKED_AMPLIFICATION, None)
            }
        }
    }

    fn escape(&mut self, enemy: &EnemySnapshot, player: Vec3, geometry: &StaticGeometry) -> Command {
        let height = enemy.position.y;
        let usable = |candidate: Vec3| {
            geometry.is_position_valid(candidate, ENEMY_RADIUS)
                && geometry.line_of_sight(candidate, Vec3::new(player.x, height, player.z))
        };

        for _ in 0..ESCAPE_ATTEMPTS {
            let angle = self.rng.gen_range(0.0..TAU);
            let radius = self
                .rng
                .gen_range(ESCAPE_MIN_DISTANCE..ESCAPE_MAX_DISTANCE);
            let candidate = Vec3::new(player.x, height, player.z) + compass_angle(angle) * radius;
            if usable(candidate) {
                debug!("enemy {} escaped a dead end", enemy.id.get());
                return Command::TeleportEnemy {
                    enemy: enemy.id,
                    destination: candidate,
                };
            }
        }

        let away = flatten(enemy.position - player)
            .try_normalize()
            .unwrap_or(Vec3::X);
        let fallback = Vec3::new(player.x, height, player.z) - away * ESCAPE_FALLBACK_DISTANCE;
        if geometry.is_position_valid(fallback, ENEMY_RADIUS) {
            debug!("enemy {} escaped to the fallback point", enemy.id.get());
            return Command::TeleportEnemy {
                enemy: enemy.id,
                destination: fallback,
            };
        }

        debug!("enemy {} found no escape point", enemy.id.get());
        Command::SteerEnemy {
            enemy: enemy.id,
            position: enemy.position,
            pathing: PathingState::at(enemy.position),
        }
    }
}

/// Obstacle information gathered by the probe rays of one update.
#[derive(Clone, Copy, Debug)]
struct Probes {
    path_blocked: bool,
    nearest_obstacle: Option<(Vec3, f32)>,
}

impl Probes {
    fn sense(position: Vec3, heading: Vec3, distance: f32, geometry: &StaticGeometry) -> Self {
        let path_blocked = geometry
            .raycast(position, heading, distance.min(BLOCK_PROBE_RANGE))
            .is_some();

        let mut nearest_obstacle: Option<(Vec3, f32)> = None;
        for direction in (0..DIRECTION_COUNT).map(compass) {
            if let Some(hit) = geometry.raycast(position, direction, PROXIMITY_RANGE) {
                if nearest_obstacle.map_or(true, |(_, nearest)| hit.distance < nearest) {
                    nearest_obstacle = Some((direction, hit.distance));
                }
            }
        }

        Self {
            path_blocked,
            nearest_obstacle,
        }
    }
}

/// Desired travel direction before obstacle avoidance.
///
/// Fireball casters with sight of the player hold a preferred distance,
/// retreating when too close and strafing inside the comfort band.
fn pursuit_heading(enemy: &EnemySnapshot, to_player: Vec3, distance: f32) -> Vec3 {
    match enemy.behavior {
        BehaviorState::Fireball {
            line_of_sight: true,
            ..
        } => {
            if distance < PREFERRED_CASTER_DISTANCE {
                -to_player
            } else if distance > PREFERRED_CASTER_DISTANCE + CASTER_ADVANCE_MARGIN {
                to_player
            } else {
                let side = if enemy.id.get() % 2 == 0 { 1.0 } else { -1.0 };
                Vec3::new(-to_player.z, 0.0, to_player.x) * side
            }
        }
        _ => to_player,
    }
}

/// Highest-scoring candidate; ties keep the earliest.
fn highest(candidates: impl Iterator<Item = Vec3>, score: impl Fn(Vec3) -> f32) -> Option<Vec3> {
    candidates
        .map(|candidate| (candidate, score(candidate)))
        .fold(None, |best: Option<(Vec3, f32)>, scored| match best {
            Some((_, top)) if scored.1 <= top => best,
            _ => Some(scored),
        })
        .map(|(candidate, _)| candidate)
}

/// Removes the component of `velocity` that points into a surface.
fn clip_velocity(velocity: Vec3, normal: Vec3) -> Vec3 {
    velocity - normal * velocity.dot(normal)
}

fn compass(index: usize) -> Vec3 {
    compass_angle(index as f32 * TAU / DIRECTION_COUNT as f32)
}

fn compass_angle(angle: f32) -> Vec3 {
    Vec3::new(angle.cos(), 0.0, angle.sin())
}
