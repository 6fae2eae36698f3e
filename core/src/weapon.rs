//! Player weapons and the projectiles they create.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Spread multiplier applied while the sniper rifle is zoomed.
pub const ZOOMED_SPREAD_FACTOR: f32 = 0.1;

/// Damage dealt to the player by an enemy fireball before scaling.
pub const FIREBALL_DAMAGE: u32 = 15;

/// Travel speed of an enemy fireball in world units per second.
pub const FIREBALL_SPEED: f32 = 12.0;

/// Range of an enemy fireball.
pub const FIREBALL_MAX_DISTANCE: f32 = 100.0;

const DEFAULT_PROJECTILE_SPEED: f32 = 20.0;
const DEFAULT_MAX_DISTANCE: f32 = 100.0;

/// Weapons the player can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    /// Baseline sidearm.
    Pistol,
    /// Automatic rifle with a fast cadence.
    MachineGun,
    /// High-damage rifle with a zoom scope.
    SniperRifle,
    /// Short-range spread of pellets.
    Shotgun,
    /// Rockets that explode on impact.
    RocketLauncher,
    /// Rotary gun with a small fixed spread.
    GatlingGun,
}

/// Static tuning of a weapon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponStats {
    /// Projectiles created per trigger pull.
    pub projectiles_per_shot: u32,
    /// Direct damage of each projectile.
    pub damage: u32,
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
    /// Range before a projectile expires.
    pub max_distance: f32,
    /// Maximum random deviation applied to each projectile direction.
    pub spread: f32,
    /// Recoil added to the aim after each shot.
    pub recoil: f32,
    /// Minimum time between shots.
    pub fire_interval: Duration,
    /// Kind of projectile created.
    pub projectile: ProjectileKind,
}

impl WeaponKind {
    /// Every weapon, in pickup order.
    pub const ALL: [WeaponKind; 6] = [
        Self::Pistol,
        Self::MachineGun,
        Self::SniperRifle,
        Self::Shotgun,
        Self::RocketLauncher,
        Self::GatlingGun,
    ];

    /// Static tuning for the weapon.
    #[must_use]
    pub const fn stats(self) -> WeaponStats {
        match self {
            Self::Pistol => WeaponStats {
                projectiles_per_shot: 1,
                damage: 50,
                projectile_speed: DEFAULT_PROJECTILE_SPEED,
                max_distance: DEFAULT_MAX_DISTANCE,
                spread: 0.01,
                recoil: 0.02,
                fire_interval: Duration::from_millis(400),
                projectile: ProjectileKind::Bullet,
            },
            Self::MachineGun => WeaponStats {
                projectiles_per_shot: 1,
                damage: 30,
                projectile_speed: DEFAULT_PROJECTILE_SPEED,
                max_distance: DEFAULT_MAX_DISTANCE,
                spread: 0.03,
                recoil: 0.015,
                fire_interval: Duration::from_millis(100),
                projectile: ProjectileKind::Bullet,
            },
            Self::SniperRifle => WeaponStats {
                projectiles_per_shot: 1,
                damage: 200,
                projectile_speed: 30.0,
                max_distance: DEFAULT_MAX_DISTANCE,
                spread: 0.02,
                recoil: 0.06,
                fire_interval: Duration::from_millis(1_200),
                projectile: ProjectileKind::Bullet,
            },
            Self::Shotgun => WeaponStats {
                projectiles_per_shot: 8,
                damage: 25,
                projectile_speed: DEFAULT_PROJECTILE_SPEED,
                max_distance: 20.0,
                spread: 0.1,
                recoil: 0.05,
                fire_interval: Duration::from_millis(900),
                projectile: ProjectileKind::Pellet,
            },
            Self::RocketLauncher => WeaponStats {
                projectiles_per_shot: 1,
                damage: 0,
                projectile_speed: DEFAULT_PROJECTILE_SPEED,
                max_distance: DEFAULT_MAX_DISTANCE,
                spread: 0.0,
                recoil: 0.08,
                fire_interval: Duration::from_millis(1_500),
                projectile: ProjectileKind::Rocket,
            },
            Self::GatlingGun => WeaponStats {
                projectiles_per_shot: 1,
                damage: 35,
                projectile_speed: DEFAULT_PROJECTILE_SPEED,
                max_distance: DEFAULT_MAX_DISTANCE,
                spread: 0.02,
                recoil: 0.01,
                fire_interval: Duration::from_millis(60),
                projectile: ProjectileKind::Bullet,
            },
        }
    }

    /// Multiplier applied to spread and recoil bias for the current zoom state.
    #[must_use]
    pub const fn spread_factor(self, zoomed: bool) -> f32 {
        match self {
            Self::SniperRifle if zoomed => ZOOMED_SPREAD_FACTOR,
            _ => 1.0,
        }
    }

    /// Lowercase human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pistol => "pistol",
            Self::MachineGun => "machine gun",
            Self::SniperRifle => "sniper rifle",
            Self::Shotgun => "shotgun",
            Self::RocketLauncher => "rocket launcher",
            Self::GatlingGun => "gatling gun",
        }
    }
}

/// Kinds of in-flight combat entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    /// Single bullet from a pistol, rifle or gun.
    Bullet,
    /// Shotgun pellet.
    Pellet,
    /// Rocket that explodes instead of dealing direct damage.
    Rocket,
    /// Enemy fireball aimed at the player.
    Fireball,
}

impl ProjectileKind {
    /// Maximum age before the projectile is discarded.
    #[must_use]
    pub const fn lifetime(self) -> Duration {
        match self {
            Self::Fireball => Duration::from_secs(8),
            Self::Bullet | Self::Pellet | Self::Rocket => Duration::from_secs(5),
        }
    }

    /// Base distance probed ahead of the projectile for environment hits.
    #[must_use]
    pub const fn environment_lookahead(self) -> f32 {
        match self {
            Self::Rocket => 0.5,
            Self::Bullet | Self::Pellet | Self::Fireball => 0.2,
        }
    }

    /// Reports whether impacts trigger an explosion.
    #[must_use]
    pub const fn explodes(self) -> bool {
        matches!(self, Self::Rocket)
    }

    /// Reports whether the projectile targets the player rather than enemies.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Fireball)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shotgun_fires_short_range_pellets() {
        let stats = WeaponKind::Shotgun.stats();
        assert_eq!(stats.projectiles_per_shot, 8);
        assert_eq!(stats.damage, 25);
        assert!((stats.max_distance - 20.0).abs() < f32::EPSILON);
        assert_eq!(stats.projectile, ProjectileKind::Pellet);
    }

    #[test]
    fn rocket_launcher_deals_no_direct_damage() {
        let stats = WeaponKind::RocketLauncher.stats();
        assert_eq!(stats.damage, 0);
        assert!(stats.projectile.explodes());
    }

    #[test]
    fn only_zoomed_sniper_narrows_spread() {
        assert!((WeaponKind::SniperRifle.spread_factor(true) - 0.1).abs() < f32::EPSILON);
        assert!((WeaponKind::SniperRifle.spread_factor(false) - 1.0).abs() < f32::EPSILON);
        assert!((WeaponKind::Pistol.spread_factor(true) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn fireballs_outlive_bullets() {
        assert_eq!(ProjectileKind::Fireball.lifetime(), Duration::from_secs(8));
        assert_eq!(ProjectileKind::Bullet.lifetime(), Duration::from_secs(5));
        assert!(ProjectileKind::Fireball.is_hostile());
    }
}
