#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless frame loop that owns the world and every system and steps them
//! in a fixed order, standing in for the game's render loop.

mod motion;
mod pickups;
mod pilot;
mod stats;

use std::time::Duration;

use arena_core::{Command, Event, Vec3, WeaponKind};
use arena_system_behavior::{self as behavior, Behavior};
use arena_system_bootstrap::Bootstrap;
use arena_system_steering::{self as steering, Steering};
use arena_system_waves::{self as waves, ArenaView, WaveDirector};
use arena_system_weapons::{self as weapons, Weapons};
use arena_world::{self as world, query, World};
use log::debug;

pub use motion::PlayerMotion;
pub use pickups::{DroppedPickup, PickupField, COLLECT_RANGE, PICKUP_LIFETIME};
pub use pilot::{Autopilot, Intent};
pub use stats::SessionStats;

/// Player state supplied by whoever controls the player for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerInput {
    /// Position of the player's body center.
    pub position: Vec3,
    /// Direction the player faces.
    pub forward: Vec3,
    /// Weapon the player holds.
    pub weapon: WeaponKind,
    /// Whether the sniper scope is raised.
    pub zoomed: bool,
    /// Whether the held weapon is reloading.
    pub reloading: bool,
    /// Whether the trigger is held.
    pub trigger_held: bool,
}

/// Simulation context: the world plus every system that drives it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    steering: Steering,
    behavior: Behavior,
    weapons: Weapons,
    waves: WaveDirector,
    autopilot: Autopilot,
    motion: PlayerMotion,
    pickups: PickupField,
    stats: SessionStats,
}

impl Simulation {
    /// Builds the world and seeds every system from the bootstrap.
    #[must_use]
    pub fn new(bootstrap: &Bootstrap) -> Self {
        let seeds = bootstrap.seeds();
        Self {
            world: bootstrap.world(),
            steering: Steering::new(steering::Config::new(seeds.steering)),
            behavior: Behavior::new(behavior::Config::new(seeds.behavior)),
            weapons: Weapons::new(weapons::Config::new(seeds.weapons)),
            waves: WaveDirector::new(waves::Config::new(seeds.waves)),
            autopilot: Autopilot::default(),
            motion: PlayerMotion::default(),
            pickups: PickupField::default(),
            stats: SessionStats::default(),
        }
    }

    /// Advances the simulation by one frame and returns every event it produced.
    ///
    /// Order: player update, clock tick and projectiles, steering, enemy
    /// behavior, weapons, pickup collection, wave director.
    pub fn step(&mut self, dt: Duration, input: PlayerInput) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::UpdatePlayer {
                position: input.position,
                forward: input.forward,
                weapon: input.weapon,
                zoomed: input.zoomed,
                reloading: input.reloading,
            },
            &mut events,
        );
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        self.steering.handle(
            &events,
            &query::enemy_view(&self.world),
            &query::player(&self.world),
            query::geometry(&self.world),
            query::elapsed(&self.world),
            &mut commands,
        );
        self.submit(&mut commands, &mut events);

        self.behavior.handle(
            &events,
            &query::enemy_view(&self.world),
            &query::player(&self.world),
            query::geometry(&self.world),
            query::elapsed(&self.world),
            &mut commands,
        );
        self.submit(&mut commands, &mut events);

        self.weapons.handle(
            &events,
            &query::player(&self.world),
            input.trigger_held,
            &mut commands,
        );
        self.submit(&mut commands, &mut events);

        self.pickups.record(&events);
        let player = query::player(&self.world);
        if !player.defeated {
            for pickup in self.pickups.collect(player.position) {
                debug!("player collected {pickup:?}");
                commands.push(Command::CollectPickup { pickup });
            }
            self.submit(&mut commands, &mut events);
        }

        let arena = ArenaView {
            geometry: query::geometry(&self.world),
            half_extent: query::arena_half_extent(&self.world),
            wave: query::wave(&self.world),
            live_enemies: query::live_enemy_count(&self.world),
        };
        self.waves.handle(&events, arena, &mut commands);
        self.submit(&mut commands, &mut events);

        for event in &events {
            if let Event::PlayerKnockedBack { impulse } = event {
                self.motion.push(*impulse);
            }
        }
        self.stats.record(&events);
        events
    }

    /// Advances one frame with the scripted player in control.
    pub fn step_autopilot(&mut self, dt: Duration) -> Vec<Event> {
        let player = query::player(&self.world);
        let intent = self.autopilot.decide(
            &player,
            &query::enemy_view(&self.world),
            query::geometry(&self.world),
            &self.pickups,
            dt,
        );
        let position = self.motion.integrate(
            player.position,
            intent.walk,
            dt,
            query::geometry(&self.world),
        );
        self.step(
            dt,
            PlayerInput {
                position,
                forward: intent.forward,
                weapon: player.weapon,
                zoomed: intent.zoomed,
                reloading: false,
                trigger_held: intent.trigger_held,
            },
        )
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Totals accumulated since the simulation started.
    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Pickups currently lying in the arena.
    #[must_use]
    pub fn pickups(&self) -> &PickupField {
        &self.pickups
    }

    /// Time left before the next wave spawns, if one is pending.
    #[must_use]
    pub fn wave_countdown(&self) -> Option<Duration> {
        self.waves.countdown()
    }

    fn submit(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }
}
