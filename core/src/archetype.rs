//! Enemy archetypes and the state machine payloads they carry.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::WaveNumber;

/// The six fixed enemy behavior categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Steering only, no special ability.
    Regular,
    /// Splits into smaller spiders when defeated.
    Spider,
    /// Hovers above the ground on a bobbing flight path.
    Flying,
    /// Teleports around the player and slashes at close range.
    Ninja,
    /// Heavy brute that swings a club with knockback.
    Cyclops,
    /// Keeps its distance and casts fireballs.
    Fireball,
}

impl Archetype {
    /// Every archetype in spawn order.
    pub const ALL: [Archetype; 6] = [
        Self::Regular,
        Self::Spider,
        Self::Flying,
        Self::Ninja,
        Self::Cyclops,
        Self::Fireball,
    ];

    /// Hit points a freshly spawned enemy starts with.
    #[must_use]
    pub const fn base_health(self) -> u32 {
        match self {
            Self::Regular => 100,
            Self::Spider => 80,
            Self::Flying => 60,
            Self::Ninja => 120,
            Self::Cyclops => 400,
            Self::Fireball => 90,
        }
    }

    /// Movement speed in world units per reference frame.
    #[must_use]
    pub const fn base_speed(self) -> f32 {
        match self {
            Self::Regular => 0.035,
            Self::Spider => 0.045,
            Self::Flying => 0.03,
            Self::Ninja => 0.05,
            Self::Cyclops => 0.025,
            Self::Fireball => 0.03,
        }
    }

    /// Height of the body center above the ground when spawned.
    #[must_use]
    pub const fn spawn_height(self) -> f32 {
        match self {
            Self::Spider => 0.6,
            Self::Flying => 4.0,
            Self::Cyclops => 1.5,
            Self::Regular | Self::Ninja | Self::Fireball => 1.0,
        }
    }

    /// Clearance required around a spawn point.
    ///
    /// Movement always uses a 0.5 unit sphere; only spawn placement accounts for
    /// the cyclops' larger body.
    #[must_use]
    pub const fn placement_radius(self) -> f32 {
        match self {
            Self::Cyclops => 1.0,
            _ => 0.5,
        }
    }

    /// Lowercase human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Spider => "spider",
            Self::Flying => "flying",
            Self::Ninja => "ninja",
            Self::Cyclops => "cyclops",
            Self::Fireball => "fireball",
        }
    }
}

/// Generation of a spider within its split chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpiderGeneration {
    /// Spawned by the wave director.
    First,
    /// Spawned by a defeated first-generation spider.
    Second,
    /// Spawned by a defeated second-generation spider.
    Third,
}

impl SpiderGeneration {
    /// Reports whether the spider descends from another spider.
    #[must_use]
    pub const fn is_child(self) -> bool {
        !matches!(self, Self::First)
    }

    /// Reports whether the spider descends from a child spider.
    #[must_use]
    pub const fn is_grandchild(self) -> bool {
        matches!(self, Self::Third)
    }

    /// Hit points of a spider of this generation.
    #[must_use]
    pub const fn health(self) -> u32 {
        match self {
            Self::First => Archetype::Spider.base_health(),
            Self::Second => 50,
            Self::Third => 30,
        }
    }

    /// Speed of a spider of this generation in world units per reference frame.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::First => Archetype::Spider.base_speed(),
            Self::Second => 0.03,
            Self::Third => 0.035,
        }
    }

    /// Generation and count of the spiders released when this spider is defeated.
    ///
    /// First-generation spiders always split in two. Second-generation spiders
    /// split in three only after wave 5. Third-generation spiders never split.
    #[must_use]
    pub fn offspring(self, wave: WaveNumber) -> Option<(SpiderGeneration, u32)> {
        match self {
            Self::First => Some((Self::Second, 2)),
            Self::Second if wave.get() > 5 => Some((Self::Third, 3)),
            Self::Second | Self::Third => None,
        }
    }
}

/// Teleport cycle of a ninja.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TeleportPhase {
    /// Waiting for the cooldown to elapse.
    Cooling {
        /// Simulation time at which the next windup may begin.
        ready_at: Duration,
    },
    /// Winding up; the relocation fires once the deadline passes.
    Charging {
        /// Simulation time at which the teleport fires.
        fire_at: Duration,
    },
}

impl TeleportPhase {
    /// Whether the windup is in progress.
    #[must_use]
    pub const fn is_charging(&self) -> bool {
        matches!(self, Self::Charging { .. })
    }
}

/// Melee strike cycle shared by the ninja slash and the cyclops club swing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrikePhase {
    /// Waiting for the cooldown to elapse.
    Cooling {
        /// Simulation time at which the next strike may begin.
        ready_at: Duration,
    },
    /// Strike animation in progress.
    Active {
        /// Simulation time at which the animation ends.
        until: Duration,
        /// Simulation time at which the next strike may begin.
        ready_at: Duration,
    },
}

impl StrikePhase {
    /// Whether the strike animation is playing.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

/// Fireball casting cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CastPhase {
    /// Waiting for the cooldown to elapse.
    Cooling {
        /// Simulation time at which the next charge may begin.
        ready_at: Duration,
    },
    /// Charging; the fireball is released once the deadline passes.
    Charging {
        /// Simulation time at which the fireball is released.
        release_at: Duration,
    },
}

/// Bobbing flight parameters of an airborne enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightPattern {
    /// Mean hover height.
    pub cruise_height: f32,
    /// Angular speed of the bobbing motion in radians per second.
    pub float_speed: f32,
    /// Amplitude of the bobbing motion.
    pub float_amount: f32,
    /// Phase offset so flocks do not bob in unison.
    pub phase: f32,
}

impl FlightPattern {
    /// Height the enemy should hover at after `elapsed` simulated time.
    #[must_use]
    pub fn target_height(&self, elapsed: Duration) -> f32 {
        let t = elapsed.as_secs_f32();
        self.cruise_height + (t * self.float_speed + self.phase).sin() * self.float_amount
    }
}

/// Archetype-specific state machine payload carried by every enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BehaviorState {
    /// Regular enemies have no special state.
    Regular,
    /// Spider state.
    Spider {
        /// Position within the split chain.
        generation: SpiderGeneration,
    },
    /// Flying state.
    Flying {
        /// Bobbing flight parameters.
        pattern: FlightPattern,
    },
    /// Ninja state; the teleport and slash cycles run independently.
    Ninja {
        /// Teleport cycle.
        teleport: TeleportPhase,
        /// Slash cycle.
        slash: StrikePhase,
    },
    /// Cyclops state.
    Cyclops {
        /// Club swing cycle.
        swing: StrikePhase,
    },
    /// Fireball caster state.
    Fireball {
        /// Casting cycle.
        cast: CastPhase,
        /// Whether the caster saw the player on its last update.
        line_of_sight: bool,
    },
}

impl BehaviorState {
    /// Archetype that owns this payload.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        match self {
            Self::Regular => Archetype::Regular,
            Self::Spider { .. } => Archetype::Spider,
            Self::Flying { .. } => Archetype::Flying,
            Self::Ninja { .. } => Archetype::Ninja,
            Self::Cyclops { .. } => Archetype::Cyclops,
            Self::Fireball { .. } => Archetype::Fireball,
        }
    }

    /// Spider generation, if the payload belongs to a spider.
    #[must_use]
    pub const fn spider_generation(&self) -> Option<SpiderGeneration> {
        match self {
            Self::Spider { generation } => Some(*generation),
            _ => None,
        }
    }

    /// Abilities that become active when moving from `previous` to `self`.
    ///
    /// A ninja can enter its teleport windup and its slash on the same
    /// update, so both are reported in that order.
    #[must_use]
    pub fn started_abilities(&self, previous: &BehaviorState) -> Vec<Ability> {
        let mut started = Vec::new();
        match (previous, self) {
            (
                Self::Ninja {
                    teleport: teleport_before,
                    slash: slash_before,
                },
                Self::Ninja { teleport, slash },
            ) => {
                if teleport.is_charging() && !teleport_before.is_charging() {
                    started.push(Ability::TeleportCharge);
                }
                if slash.is_active() && !slash_before.is_active() {
                    started.push(Ability::Slash);
                }
            }
            (Self::Cyclops { swing: before }, Self::Cyclops { swing })
                if swing.is_active() && !before.is_active() =>
            {
                started.push(Ability::ClubSwing);
            }
            (
                Self::Fireball { cast: before, .. },
                Self::Fireball {
                    cast: CastPhase::Charging { .. },
                    ..
                },
            ) if !matches!(before, CastPhase::Charging { .. }) => {
                started.push(Ability::FireballCharge);
            }
            _ => {}
        }
        started
    }
}

/// Special abilities announced to effect sinks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ability {
    /// Ninja teleport windup.
    TeleportCharge,
    /// Ninja slash.
    Slash,
    /// Cyclops club swing.
    ClubSwing,
    /// Fireball caster charge.
    FireballCharge,
}

impl Ability {
    /// Name of the effect signal announcing the ability.
    #[must_use]
    pub const fn signal_name(self) -> &'static str {
        match self {
            Self::TeleportCharge => "teleportCharge",
            Self::Slash => "slash",
            Self::ClubSwing => "clubSwing",
            Self::FireballCharge => "fireballCharge",
        }
    }
}
