#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the arena simulation.
//!
//! The world owns every enemy, every projectile in flight, the player's
//! combat state, the wave counter and the score. [`apply`] is the only way to
//! mutate it; [`query`] exposes read-only views for systems and adapters.

use std::time::Duration;

use arena_core::{
    Aabb, Archetype, BehaviorState, CastPhase, Command, Event, FlightPattern, Health, Pickup,
    ProjectileKind, SpiderGeneration, StrikePhase, TeleportPhase, Vec3, WaveNumber, WeaponKind,
    FIREBALL_DAMAGE, FIREBALL_MAX_DISTANCE, FIREBALL_SPEED, WELCOME_BANNER,
};
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

mod combat;
mod enemies;
pub mod geometry;
mod projectiles;

pub use combat::{
    explosion_damage, roll_loot, EXPLOSION_DAMAGE, EXPLOSION_RADIUS, HEALTH_DROP_CHANCE,
    PLAYER_DAMAGE_COOLDOWN, PLAYER_DAMAGE_SCALE, SCORE_PER_DEFEAT, WEAPON_DROP_CEILING,
};

use enemies::EnemyRegistry;
use geometry::StaticGeometry;
use projectiles::{Launch, ProjectileRegistry};

/// Radius of every enemy body when moving through the arena.
pub const ENEMY_RADIUS: f32 = 0.5;
/// Radius of the player's body.
pub const PLAYER_RADIUS: f32 = 0.5;
/// Ammunition granted at the start of every wave.
pub const WAVE_AMMO_BONUS: u32 = 5;
/// Health restored by a health pickup.
pub const HEALTH_PICKUP_AMOUNT: u32 = 25;
/// Ammunition granted alongside a weapon pickup.
pub const WEAPON_PICKUP_AMMO: u32 = 10;
/// Position the player occupies when the world is created.
pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 1.0, 0.0);

const NINJA_INITIAL_TELEPORT_COOLDOWN_SECS: (f32, f32) = (5.0, 7.0);

/// Player state the world starts with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerLoadout {
    /// Starting and maximum health.
    pub health: u32,
    /// Starting ammunition.
    pub ammo: u32,
    /// Starting weapon.
    pub weapon: WeaponKind,
}

impl Default for PlayerLoadout {
    fn default() -> Self {
        Self {
            health: 100,
            ammo: 50,
            weapon: WeaponKind::Pistol,
        }
    }
}

/// Parameters required to construct a world.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Seed for the world's random stream (spider offspring, loot, initial cooldowns).
    pub seed: u64,
    /// Half the side length of the square arena centered on the origin.
    pub arena_half_extent: f32,
    /// Static collision volumes, including the boundary walls.
    pub volumes: Vec<Aabb>,
    /// Player state at the start of the session.
    pub player: PlayerLoadout,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            arena_half_extent: 50.0,
            volumes: Vec::new(),
            player: PlayerLoadout::default(),
        }
    }
}

#[derive(Clone, Debug)]
struct PlayerState {
    position: Vec3,
    forward: Vec3,
    health: Health,
    max_health: Health,
    ammo: u32,
    weapon: WeaponKind,
    zoomed: bool,
    reloading: bool,
    last_damage_at: Option<Duration>,
    defeated: bool,
}

impl PlayerState {
    fn new(loadout: PlayerLoadout) -> Self {
        Self {
            position: PLAYER_SPAWN,
            forward: Vec3::new(0.0, 0.0, -1.0),
            health: Health::new(loadout.health),
            max_health: Health::new(loadout.health),
            ammo: loadout.ammo,
            weapon: loadout.weapon,
            zoomed: false,
            reloading: false,
            last_damage_at: None,
            defeated: false,
        }
    }
}

/// Represents the authoritative arena world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    geometry: StaticGeometry,
    arena_half_extent: f32,
    clock: Duration,
    tick_index: u64,
    enemies: EnemyRegistry,
    projectiles: ProjectileRegistry,
    player: PlayerState,
    wave: WaveNumber,
    score: u64,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world with the provided arena, geometry and player loadout.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            geometry: StaticGeometry::new(config.volumes),
            arena_half_extent: config.arena_half_extent,
            clock: Duration::ZERO,
            tick_index: 0,
            enemies: EnemyRegistry::new(),
            projectiles: ProjectileRegistry::new(),
            player: PlayerState::new(config.player),
            wave: WaveNumber::new(0),
            score: 0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    fn spawn_enemy(&mut self, archetype: Archetype, position: Vec3, out_events: &mut Vec<Event>) {
        if !self.geometry.is_position_valid(position, ENEMY_RADIUS) {
            debug!(
                "rejected {} spawn inside geometry at {position}",
                archetype.label()
            );
            return;
        }

        let behavior = self.initial_behavior(archetype, position);
        let id = self.enemies.insert(
            position,
            Health::new(archetype.base_health()),
            archetype.base_speed(),
            behavior,
        );
        out_events.push(Event::EnemySpawned {
            enemy: id,
            archetype,
            position,
        });
    }

    fn initial_behavior(&mut self, archetype: Archetype, position: Vec3) -> BehaviorState {
        let now = self.clock;
        match archetype {
            Archetype::Regular => BehaviorState::Regular,
            Archetype::Spider => BehaviorState::Spider {
                generation: SpiderGeneration::First,
            },
            Archetype::Flying => BehaviorState::Flying {
                pattern: FlightPattern {
                    cruise_height: position.y,
                    float_speed: self.rng.gen_range(1.0..2.0),
                    float_amount: self.rng.gen_range(0.3..0.6),
                    phase: self.rng.gen_range(0.0..std::f32::consts::TAU),
                },
            },
            Archetype::Ninja => {
                let (low, high) = NINJA_INITIAL_TELEPORT_COOLDOWN_SECS;
                let cooldown = Duration::from_secs_f32(self.rng.gen_range(low..high));
                BehaviorState::Ninja {
                    teleport: TeleportPhase::Cooling {
                        ready_at: now + cooldown,
                    },
                    slash: StrikePhase::Cooling { ready_at: now },
                }
            }
            Archetype::Cyclops => BehaviorState::Cyclops {
                swing: StrikePhase::Cooling { ready_at: now },
            },
            Archetype::Fireball => BehaviorState::Fireball {
                cast: CastPhase::Cooling { ready_at: now },
                line_of_sight: false,
            },
        }
    }

    fn fire_weapon(
        &mut self,
        weapon: WeaponKind,
        launches: Vec<arena_core::ProjectileLaunch>,
        out_events: &mut Vec<Event>,
    ) {
        let player = &self.player;
        if launches.is_empty()
            || weapon != player.weapon
            || player.reloading
            || player.ammo == 0
            || player.defeated
        {
            out_events.push(Event::WeaponFireRejected { weapon });
            return;
        }

        self.player.ammo -= 1;
        let stats = weapon.stats();
        let mut fired = 0_u32;
        for launch in launches {
            let launched = self.projectiles.launch(Launch {
                kind: stats.projectile,
                origin: launch.origin,
                direction: launch.direction,
                speed: stats.projectile_speed,
                damage: stats.damage,
                max_distance: stats.max_distance,
            });
            if let Some(projectile) = launched {
                fired += 1;
                out_events.push(Event::ProjectileLaunched {
                    projectile,
                    kind: stats.projectile,
                    position: launch.origin,
                });
            }
        }

        out_events.push(Event::WeaponFired {
            weapon,
            projectiles: fired,
            ammo: self.player.ammo,
        });
    }

    fn collect_pickup(&mut self, pickup: Pickup, out_events: &mut Vec<Event>) {
        let player = &mut self.player;
        match pickup {
            Pickup::Health => {
                player.health = player
                    .health
                    .healed(HEALTH_PICKUP_AMOUNT, player.max_health);
            }
            Pickup::Weapon(weapon) => {
                player.weapon = weapon;
                player.ammo = player.ammo.saturating_add(WEAPON_PICKUP_AMMO);
            }
        }
        out_events.push(Event::PickupCollected { pickup });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            projectiles::advance_projectiles(world, dt, out_events);
        }
        Command::UpdatePlayer {
            position,
            forward,
            weapon,
            zoomed,
            reloading,
        } => {
            let player = &mut world.player;
            player.position = position;
            player.forward = forward.normalize_or_zero();
            player.weapon = weapon;
            player.zoomed = zoomed && weapon == WeaponKind::SniperRifle;
            player.reloading = reloading;
        }
        Command::SpawnEnemy {
            archetype,
            position,
        } => world.spawn_enemy(archetype, position, out_events),
        Command::SteerEnemy {
            enemy,
            position,
            pathing,
        } => {
            let valid = world.geometry.is_position_valid(position, ENEMY_RADIUS);
            if let Some(state) = world.enemies.get_mut(enemy) {
                state.pathing = pathing;
                if valid {
                    state.position = position;
                } else {
                    out_events.push(Event::EnemyMoveRejected { enemy });
                }
            }
        }
        Command::TeleportEnemy { enemy, destination } => {
            if !world.geometry.is_position_valid(destination, ENEMY_RADIUS) {
                debug!("skipped teleport of enemy {} into geometry", enemy.get());
                return;
            }
            if let Some(state) = world.enemies.get_mut(enemy) {
                let from = state.position;
                state.position = destination;
                state.pathing = arena_core::PathingState::at(destination);
                out_events.push(Event::EnemyTeleported {
                    enemy,
                    from,
                    to: destination,
                });
            }
        }
        Command::SetBehavior { enemy, behavior } => {
            if let Some(state) = world.enemies.get_mut(enemy) {
                if behavior.archetype() != state.archetype {
                    return;
                }
                for ability in behavior.started_abilities(&state.behavior) {
                    out_events.push(Event::AbilityStarted { enemy, ability });
                }
                state.behavior = behavior;
            }
        }
        Command::SetEnemyAltitude { enemy, altitude } => {
            let Some(state) = world.enemies.get(enemy) else {
                return;
            };
            let raised = Vec3::new(state.position.x, altitude, state.position.z);
            if world.geometry.is_position_valid(raised, ENEMY_RADIUS) {
                if let Some(state) = world.enemies.get_mut(enemy) {
                    state.position = raised;
                }
            }
        }
        Command::DamagePlayer { amount, source } => {
            combat::damage_player(world, amount, source, out_events);
        }
        Command::KnockbackPlayer { impulse } => {
            if !world.player.defeated {
                out_events.push(Event::PlayerKnockedBack { impulse });
            }
        }
        Command::ShakeCamera { intensity } => {
            out_events.push(Event::CameraShake {
                intensity: intensity.clamp(0.0, 1.0),
            });
        }
        Command::LaunchFireball { enemy, direction } => {
            let Some(origin) = world.enemies.get(enemy).map(|state| state.position) else {
                return;
            };
            let launched = world.projectiles.launch(Launch {
                kind: ProjectileKind::Fireball,
                origin,
                direction,
                speed: FIREBALL_SPEED,
                damage: FIREBALL_DAMAGE,
                max_distance: FIREBALL_MAX_DISTANCE,
            });
            if let Some(projectile) = launched {
                out_events.push(Event::ProjectileLaunched {
                    projectile,
                    kind: ProjectileKind::Fireball,
                    position: origin,
                });
            }
        }
        Command::FireWeapon { weapon, launches } => world.fire_weapon(weapon, launches, out_events),
        Command::AdvanceWave => {
            world.wave = world.wave.next();
            world.player.ammo = world.player.ammo.saturating_add(WAVE_AMMO_BONUS);
            info!(
                "wave {} started at {:.1}s (score {})",
                world.wave.get(),
                world.clock.as_secs_f32(),
                world.score
            );
            out_events.push(Event::WaveStarted {
                wave: world.wave,
                ammo_granted: WAVE_AMMO_BONUS,
            });
        }
        Command::CollectPickup { pickup } => world.collect_pickup(pickup, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use arena_core::{EnemyView, PlayerSnapshot, ProjectileView, WaveNumber};

    use super::{geometry::StaticGeometry, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Simulated time elapsed since the world was created.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Provides read-only access to the static collision volumes.
    #[must_use]
    pub fn geometry(world: &World) -> &StaticGeometry {
        &world.geometry
    }

    /// Half the side length of the square arena.
    #[must_use]
    pub fn arena_half_extent(world: &World) -> f32 {
        world.arena_half_extent
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Number of enemies currently alive.
    #[must_use]
    pub fn live_enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Captures the player's combat state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        let player = &world.player;
        PlayerSnapshot {
            position: player.position,
            forward: player.forward,
            health: player.health,
            max_health: player.max_health,
            ammo: player.ammo,
            weapon: player.weapon,
            zoomed: player.zoomed,
            reloading: player.reloading,
            defeated: player.defeated,
        }
    }

    /// Number of the wave currently in progress.
    #[must_use]
    pub fn wave(world: &World) -> WaveNumber {
        world.wave
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(world: &World) -> u64 {
        world.score
    }
}
