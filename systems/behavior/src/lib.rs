#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-archetype enemy state machines: contact damage, ninja teleports and
//! slashes, cyclops club swings, fireball casting and flight bobbing.
//!
//! Timed phases are stored as deadlines inside each enemy's
//! [`BehaviorState`] and polled every frame, so a phase whose enemy has been
//! defeated simply stops being polled.

use std::{f32::consts::TAU, ops::Range, time::Duration};

use arena_core::{
    flatten, BehaviorState, CastPhase, Command, EnemySnapshot, EnemyView, Event, FlightPattern,
    PlayerSnapshot, StrikePhase, TeleportPhase, Vec3,
};
use arena_world::{geometry::StaticGeometry, ENEMY_RADIUS};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CONTACT_RANGE: f32 = 1.5;
const CONTACT_DAMAGE: u32 = 2;

const TELEPORT_WINDUP: Duration = Duration::from_millis(1_000);
const TELEPORT_COOLDOWN_SECS: Range<f32> = 3.0..5.0;
const TELEPORT_DISTANCE: Range<f32> = 5.0..10.0;
const TELEPORT_ATTEMPTS: usize = 10;

const SLASH_RANGE: f32 = 3.0;
const SLASH_HIT_RANGE: f32 = 2.0;
const SLASH_DAMAGE: u32 = 10;
const SLASH_DURATION: Duration = Duration::from_millis(500);
const SLASH_COOLDOWN_SECS: Range<f32> = 2.0..3.0;

const SWING_RANGE: f32 = 5.0;
const SWING_HIT_RANGE: f32 = 4.0;
const SWING_DAMAGE: u32 = 25;
const SWING_DURATION: Duration = Duration::from_millis(800);
const SWING_COOLDOWN_SECS: Range<f32> = 3.0..4.0;
const SWING_KNOCKBACK: f32 = 5.0;
const SWING_SHAKE: f32 = 0.6;

const FIREBALL_RANGE: f32 = 20.0;
const FIREBALL_CHARGE: Duration = Duration::from_millis(1_000);
const FIREBALL_COOLDOWN: Duration = Duration::from_secs(3);

const MAX_CLIMB_PER_TICK: f32 = 0.05;

/// Configuration parameters required to construct the behavior system.
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

/// Pure system that advances enemy state machines and emits their effects.
#[derive(Debug)]
pub struct Behavior {
    rng: ChaCha8Rng,
}

impl Behavior {
    /// Creates a new behavior system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and immutable views to emit behavior commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        player: &PlayerSnapshot,
        geometry: &StaticGeometry,
        now: Duration,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        for enemy in enemies.iter() {
            let distance = enemy.position.distance(player.position);
            if distance < CONTACT_RANGE {
                out.push(Command::DamagePlayer {
                    amount: CONTACT_DAMAGE,
                    source: enemy.position,
                });
            }

            let next = match enemy.behavior {
                BehaviorState::Ninja { teleport, slash } => BehaviorState::Ninja {
                    teleport: self.ninja_teleport(enemy, teleport, player, geometry, now, out),
                    slash: self.ninja_slash(enemy, slash, distance, now, out),
                },
                BehaviorState::Cyclops { swing } => BehaviorState::Cyclops {
                    swing: self.club_swing(enemy, swing, player, distance, now, out),
                },
                BehaviorState::Fireball { cast, .. } => {
                    let line_of_sight = geometry.line_of_sight(enemy.position, player.position);
                    BehaviorState::Fireball {
                        cast: cast_fireball(enemy, cast, player, line_of_sight, distance, now, out),
                        line_of_sight,
                    }
                }
                BehaviorState::Flying { pattern } => {
                    hover(enemy, &pattern, now, out);
                    enemy.behavior
                }
                BehaviorState::Spider { .. } | BehaviorState::Regular => enemy.behavior,
            };

            if next != enemy.behavior {
                out.push(Command::SetBehavior {
                    enemy: enemy.id,
                    behavior: next,
                });
            }
        }
    }

    fn ninja_teleport(
        &mut self,
        enemy: &EnemySnapshot,
        phase: TeleportPhase,
        player: &PlayerSnapshot,
        geometry: &StaticGeometry,
        now: Duration,
        out: &mut Vec<Command>,
    ) -> TeleportPhase {
        match phase {
            TeleportPhase::Cooling { ready_at } if now >= ready_at => TeleportPhase::Charging {
                fire_at: now + TELEPORT_WINDUP,
            },
            TeleportPhase::Charging { fire_at } if now >= fire_at => {
                match self.teleport_target(enemy, player.position, geometry) {
                    Some(destination) => out.push(Command::TeleportEnemy {
                        enemy: enemy.id,
                        destination,
                    }),
                    None => debug!("ninja {} found no teleport target", enemy.id.get()),
                }
                TeleportPhase::Cooling {
                    ready_at: now + self.cooldown(TELEPORT_COOLDOWN_SECS),
                }
            }
            unchanged => unchanged,
        }
    }

    fn teleport_target(
        &mut self,
        enemy: &EnemySnapshot,
        player: Vec3,
        geometry: &StaticGeometry,
    ) -> Option<Vec3> {
        let height = enemy.position.y;
        for _ in 0..TELEPORT_ATTEMPTS {
            let angle = self.rng.gen_range(0.0..TAU);
            let radius = self.rng.gen_range(TELEPORT_DISTANCE);
            let candidate = Vec3::new(
                player.x + angle.cos() * radius,
                height,
                player.z + angle.sin() * radius,
            );
            if geometry.is_position_valid(candidate, ENEMY_RADIUS) {
                return Some(candidate);
            }
        }
        None
    }

    fn ninja_slash(
        &mut self,
        enemy: &EnemySnapshot,
        phase: StrikePhase,
        distance: f32,
        now: Duration,
        out: &mut Vec<Command>,
    ) -> StrikePhase {
        match phase {
            StrikePhase::Cooling { ready_at } if now >= ready_at && distance < SLASH_RANGE => {
                if distance < SLASH_HIT_RANGE {
                    out.push(Command::DamagePlayer {
                        amount: SLASH_DAMAGE,
                        source: enemy.position,
                    });
                }
                StrikePhase::Active {
                    until: now + SLASH_DURATION,
                    ready_at: now + self.cooldown(SLASH_COOLDOWN_SECS),
                }
            }
            StrikePhase::Active { until, ready_at } if now >= until => {
                StrikePhase::Cooling { ready_at }
            }
            unchanged => unchanged,
        }
    }

    fn club_swing(
        &mut self,
        enemy: &EnemySnapshot,
        phase: StrikePhase,
        player: &PlayerSnapshot,
        distance: f32,
        now: Duration,
        out: &mut Vec<Command>,
    ) -> StrikePhase {
        match phase {
            StrikePhase::Cooling { ready_at } if now >= ready_at && distance < SWING_RANGE => {
                if distance < SWING_HIT_RANGE {
                    let away = flatten(player.position - enemy.position).normalize_or_zero();
                    out.push(Command::DamagePlayer {
                        amount: SWING_DAMAGE,
                        source: enemy.position,
                    });
                    out.push(Command::ShakeCamera {
                        intensity: SWING_SHAKE,
                    });
                    out.push(Command::KnockbackPlayer {
                        impulse: away * SWING_KNOCKBACK,
                    });
                }
                StrikePhase::Active {
                    until: now + SWING_DURATION,
                    ready_at: now + self.cooldown(SWING_COOLDOWN_SECS),
                }
            }
            StrikePhase::Active { until, ready_at } if now >= until => {
                StrikePhase::Cooling { ready_at }
            }
            unchanged => unchanged,
        }
    }

    fn cooldown(&mut self, seconds: Range<f32>) -> Duration {
        Duration::from_secs_f32(self.rng.gen_range(seconds))
    }
}

fn cast_fireball(
    enemy: &EnemySnapshot,
    phase: CastPhase,
    player: &PlayerSnapshot,
    line_of_sight: bool,
    distance: f32,
    now: Duration,
    out: &mut Vec<Command>,
) -> CastPhase {
    match phase {
        CastPhase::Cooling { ready_at }
            if now >= ready_at && line_of_sight && distance <= FIREBALL_RANGE =>
        {
            CastPhase::Charging {
                release_at: now + FIREBALL_CHARGE,
            }
        }
        CastPhase::Charging { release_at } if now >= release_at => {
            out.push(Command::LaunchFireball {
                enemy: enemy.id,
                direction: player.position - enemy.position,
            });
            CastPhase::Cooling {
                ready_at: now + FIREBALL_COOLDOWN,
            }
        }
        unchanged => unchanged,
    }
}

fn hover(enemy: &EnemySnapshot, pattern: &FlightPattern, now: Duration, out: &mut Vec<Command>) {
    let target = pattern.target_height(now);
    let climb = (target - enemy.position.y).clamp(-MAX_CLIMB_PER_TICK, MAX_CLIMB_PER_TICK);
    if climb.abs() > f32::EPSILON {
        out.push(Command::SetEnemyAltitude {
            enemy: enemy.id,
            altitude: enemy.position.y + climb,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{Archetype, EnemyId, Health, PathingState, WeaponKind};

    fn player_at(position: Vec3) -> PlayerSnapshot {
        PlayerSnapshot {
            position,
            forward: Vec3::new(0.0, 0.0, -1.0),
            health: Health::new(100),
            max_health: Health::new(100),
            ammo: 10,
            weapon: WeaponKind::Pistol,
            zoomed: false,
            reloading: false,
            defeated: false,
        }
    }

    fn enemy(behavior: BehaviorState, position: Vec3) -> EnemySnapshot {
        let archetype = behavior.archetype();
        EnemySnapshot {
            id: EnemyId::new(1),
            archetype,
            position,
            health: Health::new(archetype.base_health()),
            speed: archetype.base_speed(),
            behavior,
            pathing: PathingState::at(position),
        }
    }

    fn enemy_at_height(snapshot: &EnemySnapshot, height: f32) -> EnemySnapshot {
        let mut raised = snapshot.clone();
        raised.position.y = height;
        raised
    }

    fn tick(dt: Duration) -> Vec<Event> {
        vec![Event::TimeAdvanced { dt }]
    }

    #[test]
    fn contact_damage_applies_within_range() {
        let mut behavior = Behavior::new(Config::new(1));
        let view = EnemyView::from_snapshots(vec![enemy(
            BehaviorState::Regular,
            Vec3::new(1.0, 1.0, 0.0),
        )]);
        let mut out = Vec::new();
        behavior.handle(
            &tick(Duration::from_millis(16)),
            &view,
            &player_at(Vec3::new(0.0, 1.0, 0.0)),
            &StaticGeometry::default(),
            Duration::from_secs(1),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::DamagePlayer {
                amount: CONTACT_DAMAGE,
                source: Vec3::new(1.0, 1.0, 0.0),
            }]
        );
    }

    #[test]
    fn nothing_happens_without_time_passing() {
        let mut behavior = Behavior::new(Config::new(1));
        let view = EnemyView::from_snapshots(vec![enemy(
            BehaviorState::Regular,
            Vec3::new(1.0, 1.0, 0.0),
        )]);
        let mut out = Vec::new();
        behavior.handle(
            &[],
            &view,
            &player_at(Vec3::new(0.0, 1.0, 0.0)),
            &StaticGeometry::default(),
            Duration::from_secs(1),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn slash_damages_only_when_close_at_start() {
        let mut behavior = Behavior::new(Config::new(2));
        let snapshot = enemy(
            BehaviorState::Ninja {
                teleport: TeleportPhase::Cooling {
                    ready_at: Duration::from_secs(60),
                },
                slash: StrikePhase::Cooling {
                    ready_at: Duration::ZERO,
                },
            },
            Vec3::new(2.5, 1.0, 0.0),
        );
        let mut out = Vec::new();
        let next = behavior.ninja_slash(
            &snapshot,
            StrikePhase::Cooling {
                ready_at: Duration::ZERO,
            },
            2.5,
            Duration::from_secs(1),
            &mut out,
        );
        assert!(out.is_empty());
        let StrikePhase::Active { until, ready_at } = next else {
            panic!("slash should start");
        };
        assert_eq!(until, Duration::from_millis(1_500));
        assert!(ready_at >= Duration::from_secs(3) && ready_at <= Duration::from_secs(4));

        let next = behavior.ninja_slash(
            &snapshot,
            StrikePhase::Cooling {
                ready_at: Duration::ZERO,
            },
            1.5,
            Duration::from_secs(1),
            &mut out,
        );
        assert!(matches!(next, StrikePhase::Active { .. }));
        assert_eq!(
            out,
            vec![Command::DamagePlayer {
                amount: SLASH_DAMAGE,
                source: snapshot.position,
            }]
        );
    }

    #[test]
    fn club_swing_knocks_player_away() {
        let mut behavior = Behavior::new(Config::new(4));
        let snapshot = enemy(
            BehaviorState::Cyclops {
                swing: StrikePhase::Cooling {
                    ready_at: Duration::ZERO,
                },
            },
            Vec3::new(0.0, 1.5, -3.0),
        );
        let player = player_at(Vec3::new(0.0, 1.0, 0.0));
        let mut out = Vec::new();
        let _ = behavior.club_swing(
            &snapshot,
            StrikePhase::Cooling {
                ready_at: Duration::ZERO,
            },
            &player,
            3.0,
            Duration::from_secs(2),
            &mut out,
        );
        assert_eq!(out.len(), 3);
        assert!(matches!(
            out[0],
            Command::DamagePlayer {
                amount: SWING_DAMAGE,
                ..
            }
        ));
        assert!(matches!(out[1], Command::ShakeCamera { .. }));
        let Command::KnockbackPlayer { impulse } = out[2] else {
            panic!("expected knockback");
        };
        assert!((impulse - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn fireball_requires_sight_and_range() {
        let snapshot = enemy(
            BehaviorState::Fireball {
                cast: CastPhase::Cooling {
                    ready_at: Duration::ZERO,
                },
                line_of_sight: false,
            },
            Vec3::new(0.0, 1.0, -12.0),
        );
        let player = player_at(Vec3::new(0.0, 1.0, 0.0));
        let idle = CastPhase::Cooling {
            ready_at: Duration::ZERO,
        };
        let mut out = Vec::new();
        let now = Duration::from_secs(5);

        assert_eq!(
            cast_fireball(&snapshot, idle, &player, false, 12.0, now, &mut out),
            idle
        );
        assert_eq!(
            cast_fireball(&snapshot, idle, &player, true, 25.0, now, &mut out),
            idle
        );
        let charging = cast_fireball(&snapshot, idle, &player, true, 12.0, now, &mut out);
        assert_eq!(
            charging,
            CastPhase::Charging {
                release_at: now + FIREBALL_CHARGE
            }
        );
        assert!(out.is_empty());

        let released = cast_fireball(
            &snapshot,
            charging,
            &player,
            false,
            12.0,
            now + FIREBALL_CHARGE,
            &mut out,
        );
        assert_eq!(
            released,
            CastPhase::Cooling {
                ready_at: now + FIREBALL_CHARGE + FIREBALL_COOLDOWN
            }
        );
        assert_eq!(
            out,
            vec![Command::LaunchFireball {
                enemy: snapshot.id,
                direction: Vec3::new(0.0, 0.0, 12.0),
            }]
        );
    }

    #[test]
    fn flyers_climb_at_bounded_rate() {
        let pattern = FlightPattern {
            cruise_height: 6.0,
            float_speed: 1.0,
            float_amount: 0.0,
            phase: 0.0,
        };
        let snapshot = enemy(
            BehaviorState::Flying { pattern },
            Vec3::new(5.0, 4.0, 5.0),
        );
        let mut out = Vec::new();
        hover(&snapshot, &pattern, Duration::from_secs(1), &mut out);
        let [Command::SetEnemyAltitude { enemy, altitude }] = out.as_slice() else {
            panic!("expected a single altitude change, got {out:?}");
        };
        assert_eq!(*enemy, snapshot.id);
        assert!((altitude - 4.05).abs() < 1e-5);

        out.clear();
        let settled = enemy_at_height(&snapshot, 6.0);
        hover(&settled, &pattern, Duration::from_secs(1), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn ninja_teleport_waits_for_windup() {
        let mut behavior = Behavior::new(Config::new(8));
        let snapshot = enemy(
            BehaviorState::Ninja {
                teleport: TeleportPhase::Cooling {
                    ready_at: Duration::ZERO,
                },
                slash: StrikePhase::Cooling {
                    ready_at: Duration::ZERO,
                },
            },
            Vec3::new(0.0, 1.0, -20.0),
        );
        let player = player_at(Vec3::new(0.0, 1.0, 0.0));
        let geometry = StaticGeometry::default();
        let mut out = Vec::new();

        let charging = behavior.ninja_teleport(
            &snapshot,
            TeleportPhase::Cooling {
                ready_at: Duration::ZERO,
            },
            &player,
            &geometry,
            Duration::from_secs(1),
            &mut out,
        );
        assert_eq!(
            charging,
            TeleportPhase::Charging {
                fire_at: Duration::from_secs(2)
            }
        );
        let still = behavior.ninja_teleport(
            &snapshot,
            charging,
            &player,
            &geometry,
            Duration::from_millis(1_900),
            &mut out,
        );
        assert_eq!(still, charging);
        assert!(out.is_empty());

        let cooled = behavior.ninja_teleport(
            &snapshot,
            charging,
            &player,
            &geometry,
            Duration::from_secs(2),
            &mut out,
        );
        assert!(matches!(cooled, TeleportPhase::Cooling { ready_at }
            if ready_at >= Duration::from_secs(5) && ready_at <= Duration::from_secs(7)));
        let Some(Command::TeleportEnemy { destination, .. }) = out.first() else {
            panic!("expected a teleport");
        };
        let distance = flatten(*destination).length();
        assert!((5.0..=10.0).contains(&distance));
        assert_eq!(snapshot.archetype, Archetype::Ninja);
    }
}
