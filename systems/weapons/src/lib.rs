#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player weapon handling: fire cadence, per-weapon projectile fan-out and
//! the shared recoil vector that biases follow-up shots.

use std::time::Duration;

use arena_core::{Command, Event, PlayerSnapshot, ProjectileLaunch, Vec3};
use log::trace;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Distance in front of the player at which projectiles appear.
pub const MUZZLE_OFFSET: f32 = 0.6;
/// Time for a recoil kick to decay back to zero.
pub const RECOIL_RECOVERY: Duration = Duration::from_millis(250);

const RECOIL_SIDEWAYS_SHARE: f32 = 0.5;

/// Configuration parameters required to construct the weapon system.
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

/// Pure system that turns trigger input into `FireWeapon` commands.
#[derive(Debug)]
pub struct Weapons {
    rng: ChaCha8Rng,
    clock: Duration,
    last_shot: Option<Duration>,
    kick: Vec3,
    kicked_at: Duration,
}

impl Weapons {
    /// Creates a new weapon system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            clock: Duration::ZERO,
            last_shot: None,
            kick: Vec3::ZERO,
            kicked_at: Duration::ZERO,
        }
    }

    /// Consumes world events, the player view and the trigger state to emit fire commands.
    ///
    /// A pull with an empty magazine still emits a `FireWeapon` without
    /// launches so the world can report the dry fire.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        trigger_held: bool,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.clock = self.clock.saturating_add(*dt);
            }
        }

        if !trigger_held || player.reloading || player.defeated {
            return;
        }

        let stats = player.weapon.stats();
        if let Some(last) = self.last_shot {
            if self.clock.saturating_sub(last) < stats.fire_interval {
                return;
            }
        }
        self.last_shot = Some(self.clock);

        if player.ammo == 0 {
            trace!("{} is empty", player.weapon.label());
            out.push(Command::FireWeapon {
                weapon: player.weapon,
                launches: Vec::new(),
            });
            return;
        }

        let spread_factor = player.weapon.spread_factor(player.zoomed);
        let Some(aim) = (player.forward + self.recoil() * spread_factor).try_normalize() else {
            return;
        };
        let (right, up) = aim_basis(aim);
        let origin = player.position + aim * MUZZLE_OFFSET;
        let spread = stats.spread * spread_factor;
        let launches = (0..stats.projectiles_per_shot)
            .map(|_| ProjectileLaunch {
                origin,
                direction: self.deviate(aim, right, up, spread),
            })
            .collect();

        self.add_kick(right, up, stats.recoil);
        out.push(Command::FireWeapon {
            weapon: player.weapon,
            launches,
        });
    }

    /// Current recoil offset, decaying linearly after every shot.
    #[must_use]
    pub fn recoil(&self) -> Vec3 {
        let since = self.clock.saturating_sub(self.kicked_at);
        let remaining = 1.0 - since.as_secs_f32() / RECOIL_RECOVERY.as_secs_f32();
        self.kick * remaining.max(0.0)
    }

    fn deviate(&mut self, aim: Vec3, right: Vec3, up: Vec3, spread: f32) -> Vec3 {
        if spread <= 0.0 {
            return aim;
        }
        let sideways = self.rng.gen_range(-spread..=spread);
        let lift = self.rng.gen_range(-spread..=spread);
        (aim + right * sideways + up * lift)
            .try_normalize()
            .unwrap_or(aim)
    }

    fn add_kick(&mut self, right: Vec3, up: Vec3, magnitude: f32) {
        let sway = magnitude * RECOIL_SIDEWAYS_SHARE;
        let sideways = if sway > 0.0 {
            self.rng.gen_range(-sway..=sway)
        } else {
            0.0
        };
        self.kick = self.recoil() + up * magnitude + right * sideways;
        self.kicked_at = self.clock;
    }
}

/// Right and up vectors perpendicular to the aim direction.
fn aim_basis(aim: Vec3) -> (Vec3, Vec3) {
    let right = aim.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
    (right, right.cross(aim))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{Health, WeaponKind};

    const FRAME: Duration = Duration::from_millis(16);

    fn player(weapon: WeaponKind) -> PlayerSnapshot {
        PlayerSnapshot {
            position: Vec3::new(0.0, 1.0, 0.0),
            forward: Vec3::new(0.0, 0.0, -1.0),
            health: Health::new(100),
            max_health: Health::new(100),
            ammo: 20,
            weapon,
            zoomed: false,
            reloading: false,
            defeated: false,
        }
    }

    fn frame() -> Vec<Event> {
        vec![Event::TimeAdvanced { dt: FRAME }]
    }

    fn launches(commands: &[Command]) -> Vec<ProjectileLaunch> {
        commands
            .iter()
            .flat_map(|command| match command {
                Command::FireWeapon { launches, .. } => launches.clone(),
                _ => Vec::new(),
            })
            .collect()
    }

    #[test]
    fn fire_interval_limits_cadence() {
        let mut weapons = Weapons::new(Config::new(1));
        let pistol = player(WeaponKind::Pistol);
        let mut out = Vec::new();
        for _ in 0..62 {
            weapons.handle(&frame(), &pistol, true, &mut out);
        }
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn released_trigger_never_fires() {
        let mut weapons = Weapons::new(Config::new(1));
        let mut out = Vec::new();
        for _ in 0..30 {
            weapons.handle(&frame(), &player(WeaponKind::GatlingGun), false, &mut out);
        }
        assert!(out.is_empty());
    }

    #[test]
    fn reloading_or_defeated_players_hold_fire() {
        let mut weapons = Weapons::new(Config::new(1));
        let mut reloading = player(WeaponKind::Pistol);
        reloading.reloading = true;
        let mut defeated = player(WeaponKind::Pistol);
        defeated.defeated = true;
        let mut out = Vec::new();
        weapons.handle(&frame(), &reloading, true, &mut out);
        weapons.handle(&frame(), &defeated, true, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_magazine_dry_fires() {
        let mut weapons = Weapons::new(Config::new(1));
        let mut empty = player(WeaponKind::Shotgun);
        empty.ammo = 0;
        let mut out = Vec::new();
        weapons.handle(&frame(), &empty, true, &mut out);
        assert_eq!(
            out,
            vec![Command::FireWeapon {
                weapon: WeaponKind::Shotgun,
                launches: Vec::new(),
            }]
        );
        assert_eq!(weapons.recoil(), Vec3::ZERO);
    }

    #[test]
    fn shotgun_fans_out_eight_pellets() {
        let mut weapons = Weapons::new(Config::new(5));
        let mut out = Vec::new();
        weapons.handle(&frame(), &player(WeaponKind::Shotgun), true, &mut out);
        let pellets = launches(&out);
        assert_eq!(pellets.len(), 8);
        for pellet in &pellets {
            assert!((pellet.direction.length() - 1.0).abs() < 1e-4);
            assert!(pellet.direction.z < -0.98);
            assert_eq!(pellet.origin, Vec3::new(0.0, 1.0, -MUZZLE_OFFSET));
        }
        assert!(pellets
            .windows(2)
            .any(|pair| pair[0].direction != pair[1].direction));
    }

    #[test]
    fn zoomed_sniper_is_more_accurate() {
        let mut weapons = Weapons::new(Config::new(7));
        let mut sniper = player(WeaponKind::SniperRifle);
        sniper.zoomed = true;
        let mut out = Vec::new();
        weapons.handle(&frame(), &sniper, true, &mut out);
        let shot = launches(&out)[0];
        assert!((shot.direction - sniper.forward).length() <= 0.003);
    }

    #[test]
    fn recoil_biases_next_shot_then_recovers() {
        let mut weapons = Weapons::new(Config::new(3));
        let rocket = player(WeaponKind::RocketLauncher);
        let mut out = Vec::new();
        weapons.handle(&frame(), &rocket, true, &mut out);
        assert_eq!(launches(&out)[0].direction, rocket.forward);

        let recoil = weapons.recoil();
        assert!(recoil.y > 0.07);

        weapons.kick = Vec3::new(0.0, 0.1, 0.0);
        weapons.kicked_at = weapons.clock;
        weapons.last_shot = None;
        out.clear();
        weapons.handle(&[], &rocket, true, &mut out);
        let biased = launches(&out)[0].direction;
        let expected = Vec3::new(0.0, 0.1, -1.0).normalize();
        assert!((biased - expected).length() < 1e-5);

        weapons.handle(
            &[Event::TimeAdvanced {
                dt: RECOIL_RECOVERY,
            }],
            &rocket,
            false,
            &mut out,
        );
        assert_eq!(weapons.recoil(), Vec3::ZERO);
    }
}
