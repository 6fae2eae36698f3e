#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the arena simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! effect sinks to react to. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

pub use glam::Vec3;
use serde::{Deserialize, Serialize};

mod archetype;
mod wave;
mod weapon;

pub use archetype::{
    Ability, Archetype, BehaviorState, CastPhase, FlightPattern, SpiderGeneration, StrikePhase,
    TeleportPhase,
};
pub use wave::{WaveNumber, WaveQuota};
pub use weapon::{
    ProjectileKind, WeaponKind, WeaponStats, FIREBALL_DAMAGE, FIREBALL_MAX_DISTANCE,
    FIREBALL_SPEED, ZOOMED_SPREAD_FACTOR,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the Arena.";

/// Frame rate assumed by tuning values expressed per frame, such as enemy speeds.
pub const REFERENCE_FRAME_RATE: f32 = 60.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Mirrors the externally owned player transform and weapon state into the world.
    UpdatePlayer {
        /// Position of the player's body center.
        position: Vec3,
        /// Direction the player is facing.
        forward: Vec3,
        /// Weapon currently held by the player.
        weapon: WeaponKind,
        /// Whether the player is aiming down the sniper scope.
        zoomed: bool,
        /// Whether the held weapon is reloading.
        reloading: bool,
    },
    /// Requests that a new enemy of the given archetype enter the arena.
    SpawnEnemy {
        /// Archetype of the enemy to create.
        archetype: Archetype,
        /// Position the enemy should occupy after spawning.
        position: Vec3,
    },
    /// Requests that an enemy move to a new position and adopt new pathing state.
    SteerEnemy {
        /// Identifier of the enemy being steered.
        enemy: EnemyId,
        /// Position the enemy should occupy after the move.
        position: Vec3,
        /// Pathing bookkeeping computed by the steering system.
        pathing: PathingState,
    },
    /// Requests that an enemy relocate instantly, ignoring obstacles along the way.
    TeleportEnemy {
        /// Identifier of the enemy being relocated.
        enemy: EnemyId,
        /// Position the enemy should occupy after the teleport.
        destination: Vec3,
    },
    /// Replaces the archetype-specific state machine payload of an enemy.
    SetBehavior {
        /// Identifier of the enemy whose behavior changes.
        enemy: EnemyId,
        /// New behavior payload.
        behavior: BehaviorState,
    },
    /// Sets the vertical position of an airborne enemy.
    SetEnemyAltitude {
        /// Identifier of the enemy being raised or lowered.
        enemy: EnemyId,
        /// Height the enemy should hover at.
        altitude: f32,
    },
    /// Requests that the player take damage from the provided source position.
    DamagePlayer {
        /// Unscaled damage amount reported by the attacker.
        amount: u32,
        /// Position the damage originated from, used for knockback.
        source: Vec3,
    },
    /// Adds an impulse to the player's velocity.
    KnockbackPlayer {
        /// Velocity change applied to the player.
        impulse: Vec3,
    },
    /// Requests a camera shake with the given intensity.
    ShakeCamera {
        /// Relative shake strength in the range 0.0..=1.0.
        intensity: f32,
    },
    /// Requests that an enemy release a fireball in the given direction.
    LaunchFireball {
        /// Identifier of the casting enemy.
        enemy: EnemyId,
        /// Direction the fireball travels.
        direction: Vec3,
    },
    /// Requests that the player's weapon fire the provided projectiles.
    FireWeapon {
        /// Weapon that produced the shot.
        weapon: WeaponKind,
        /// Launch parameters for every projectile created by the shot.
        launches: Vec<ProjectileLaunch>,
    },
    /// Advances the wave counter and grants the wave-start ammunition bonus.
    AdvanceWave,
    /// Reports that the external pickup collection handed a pickup to the player.
    CollectPickup {
        /// Pickup that was collected.
        pickup: Pickup,
    },
}

/// Events broadcast by the world after processing commands.
///
/// Every event doubles as a fire-and-forget effect signal; see
/// [`Event::signal_name`].
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the arena.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        archetype: Archetype,
        /// Position the enemy occupies after spawning.
        position: Vec3,
    },
    /// Reports that a requested enemy move would have entered static geometry.
    EnemyMoveRejected {
        /// Identifier of the enemy whose move was reverted.
        enemy: EnemyId,
    },
    /// Confirms that an enemy teleported between two points.
    EnemyTeleported {
        /// Identifier of the enemy that teleported.
        enemy: EnemyId,
        /// Position the enemy left.
        from: Vec3,
        /// Position the enemy arrived at.
        to: Vec3,
    },
    /// Announces that an enemy began a special ability.
    AbilityStarted {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Ability that started.
        ability: Ability,
    },
    /// Reports that an enemy took damage without being defeated.
    EnemyDamaged {
        /// Identifier of the damaged enemy.
        enemy: EnemyId,
        /// Damage applied.
        amount: u32,
        /// Health remaining after the hit.
        remaining: Health,
    },
    /// Reports that an enemy was defeated and removed from the arena.
    EnemyDefeated {
        /// Identifier of the defeated enemy.
        enemy: EnemyId,
        /// Archetype of the defeated enemy.
        archetype: Archetype,
        /// Position the enemy occupied when defeated.
        position: Vec3,
    },
    /// Confirms that a projectile was created.
    ProjectileLaunched {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Kind of projectile launched.
        kind: ProjectileKind,
        /// Launch position.
        position: Vec3,
    },
    /// Reports that a projectile struck static geometry or the ground.
    ProjectileImpact {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Point of impact.
        point: Vec3,
    },
    /// Reports that a projectile exceeded its range or lifetime.
    ProjectileExpired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
    },
    /// Reports a rocket explosion.
    Explosion {
        /// Center of the blast.
        center: Vec3,
        /// Radius of the blast.
        radius: f32,
    },
    /// Reports that the player lost health.
    PlayerDamaged {
        /// Health removed from the player after scaling.
        amount: u32,
        /// Health remaining after the hit.
        health: Health,
    },
    /// Reports that the player's health reached zero.
    PlayerDefeated,
    /// Reports an impulse applied to the player's velocity.
    PlayerKnockedBack {
        /// Velocity change applied to the player.
        impulse: Vec3,
    },
    /// Requests camera shake feedback.
    CameraShake {
        /// Relative shake strength in the range 0.0..=1.0.
        intensity: f32,
    },
    /// Confirms that the player's weapon fired.
    WeaponFired {
        /// Weapon that fired.
        weapon: WeaponKind,
        /// Number of projectiles created by the shot.
        projectiles: u32,
        /// Ammunition left after the shot.
        ammo: u32,
    },
    /// Reports that a fire request was refused because no ammunition remained.
    WeaponFireRejected {
        /// Weapon that failed to fire.
        weapon: WeaponKind,
    },
    /// Reports a score change.
    ScoreChanged {
        /// Score after the change.
        score: u64,
        /// Points added.
        delta: u64,
    },
    /// Reports that a defeated enemy dropped a pickup.
    PickupDropped {
        /// Pickup that dropped.
        pickup: Pickup,
        /// Position the pickup should appear at.
        position: Vec3,
    },
    /// Confirms that a collected pickup took effect.
    PickupCollected {
        /// Pickup that was applied.
        pickup: Pickup,
    },
    /// Announces the start of a new wave.
    WaveStarted {
        /// Number of the wave that started.
        wave: WaveNumber,
        /// Ammunition granted for the new wave.
        ammo_granted: u32,
    },
}

impl Event {
    /// Name of the audio/visual signal associated with the event.
    #[must_use]
    pub fn signal_name(&self) -> &'static str {
        match self {
            Self::TimeAdvanced { .. } => "tick",
            Self::EnemySpawned { .. } => "enemySpawn",
            Self::EnemyMoveRejected { .. } => "enemyBlocked",
            Self::EnemyTeleported { .. } => "teleport",
            Self::AbilityStarted { ability, .. } => ability.signal_name(),
            Self::EnemyDamaged { .. } => "hitFlash",
            Self::EnemyDefeated { .. } => "enemyDeath",
            Self::ProjectileLaunched { kind, .. } => match kind {
                ProjectileKind::Fireball => "fireball",
                ProjectileKind::Rocket => "rocket",
                ProjectileKind::Bullet | ProjectileKind::Pellet => "shot",
            },
            Self::ProjectileImpact { .. } => "impact",
            Self::ProjectileExpired { .. } => "projectileExpired",
            Self::Explosion { .. } => "explosion",
            Self::PlayerDamaged { .. } => "playerHit",
            Self::PlayerDefeated => "playerDeath",
            Self::PlayerKnockedBack { .. } => "knockback",
            Self::CameraShake { .. } => "cameraShake",
            Self::WeaponFired { .. } => "weaponFire",
            Self::WeaponFireRejected { .. } => "emptyClick",
            Self::ScoreChanged { .. } => "score",
            Self::PickupDropped { .. } => "pickupDrop",
            Self::PickupCollected { .. } => "pickup",
            Self::WaveStarted { .. } => "waveStart",
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Integer hit points of an enemy or the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw hit point count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the health left after subtracting `amount`, clamped at zero.
    #[must_use]
    pub const fn damaged(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    /// Returns the health after restoring `amount`, capped at `maximum`.
    #[must_use]
    pub fn healed(self, amount: u32, maximum: Health) -> Self {
        Self(self.0.saturating_add(amount).min(maximum.0))
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }
}

/// Axis-aligned box describing a piece of static world geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Creates a box spanning the two corners, in any order.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a box resting on the ground plane, centered on `(x, z)`.
    #[must_use]
    pub fn from_footprint(x: f32, z: f32, width: f32, depth: f32, height: f32) -> Self {
        let half = Vec3::new(width * 0.5, 0.0, depth * 0.5);
        let base = Vec3::new(x, 0.0, z);
        Self::new(base - half, base + half + Vec3::new(0.0, height, 0.0))
    }

    /// Corner with the smallest coordinates.
    #[must_use]
    pub const fn min(&self) -> Vec3 {
        self.min
    }

    /// Corner with the largest coordinates.
    #[must_use]
    pub const fn max(&self) -> Vec3 {
        self.max
    }

    /// Reports whether the point lies inside or on the surface of the box.
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Point of the box closest to `point`.
    #[must_use]
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }
}

/// Nearest intersection reported by a ray query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance travelled along the ray before the hit.
    pub distance: f32,
    /// World-space point of the hit.
    pub point: Vec3,
    /// Outward surface normal at the hit.
    pub normal: Vec3,
}

/// Steering bookkeeping carried by every enemy.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PathingState {
    /// Position observed at the previous steering update.
    pub last_position: Vec3,
    /// Seconds the enemy has failed to make meaningful progress.
    pub stuck_time: f32,
    /// Steering bias blended with direct pursuit.
    pub offset: Vec3,
    /// Simulation time of the last path change, or `None` when a re-path is due.
    pub last_path_change: Option<Duration>,
    /// Side of the direct line the enemy keeps to while routing around an obstacle.
    pub detour: Option<DetourSide>,
}

/// Side of the line toward its target that a detouring enemy keeps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetourSide {
    /// Passes obstacles with the target on the right.
    Left,
    /// Passes obstacles with the target on the left.
    Right,
}

impl DetourSide {
    /// Horizontal unit vector perpendicular to `heading` on this side.
    #[must_use]
    pub fn lateral(self, heading: Vec3) -> Vec3 {
        match self {
            Self::Left => Vec3::new(heading.z, 0.0, -heading.x),
            Self::Right => Vec3::new(-heading.z, 0.0, heading.x),
        }
    }

    /// Side that `direction` leans toward relative to `heading`, if it leans
    /// by more than `tolerance`.
    #[must_use]
    pub fn of(direction: Vec3, heading: Vec3, tolerance: f32) -> Option<Self> {
        let lean = direction.dot(Self::Left.lateral(heading));
        if lean > tolerance {
            Some(Self::Left)
        } else if lean < -tolerance {
            Some(Self::Right)
        } else {
            None
        }
    }
}

impl PathingState {
    /// Fresh pathing state for an enemy standing at `position`.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            last_position: position,
            stuck_time: 0.0,
            offset: Vec3::ZERO,
            last_path_change: None,
            detour: None,
        }
    }
}

/// Pickup dropped by a defeated enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pickup {
    /// Restores player health when collected.
    Health,
    /// Hands the player a different weapon when collected.
    Weapon(WeaponKind),
}

/// Launch parameters for a single player projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileLaunch {
    /// Position the projectile starts from.
    pub origin: Vec3,
    /// Unit direction of travel.
    pub direction: Vec3,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub archetype: Archetype,
    /// Center of the enemy's body.
    pub position: Vec3,
    /// Remaining hit points.
    pub health: Health,
    /// Base speed in world units per reference frame.
    pub speed: f32,
    /// Archetype-specific state machine payload.
    pub behavior: BehaviorState,
    /// Steering bookkeeping.
    pub pathing: PathingState,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Retrieves the snapshot of a specific enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of live enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Kind of projectile.
    pub kind: ProjectileKind,
    /// Current position.
    pub position: Vec3,
    /// Unit direction of travel.
    pub direction: Vec3,
    /// Distance travelled since launch.
    pub distance: f32,
    /// Maximum travel distance before expiry.
    pub max_distance: f32,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectiles are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of the player's combat state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Position of the player's body center.
    pub position: Vec3,
    /// Direction the player is facing.
    pub forward: Vec3,
    /// Remaining hit points.
    pub health: Health,
    /// Maximum hit points.
    pub max_health: Health,
    /// Ammunition available to the held weapon.
    pub ammo: u32,
    /// Weapon currently held.
    pub weapon: WeaponKind,
    /// Whether the player is aiming down the sniper scope.
    pub zoomed: bool,
    /// Whether the held weapon is reloading.
    pub reloading: bool,
    /// Whether the player's health has been depleted.
    pub defeated: bool,
}

/// Removes the vertical component of a vector.
#[must_use]
pub fn flatten(vector: Vec3) -> Vec3 {
    Vec3::new(vector.x, 0.0, vector.z)
}
