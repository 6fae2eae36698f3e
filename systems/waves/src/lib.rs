#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director: advances the wave once the arena is cleared, waits out the
//! intermission and then places the next wave's enemies.

use std::time::Duration;

use arena_core::{flatten, Archetype, Command, Event, Vec3, WaveNumber, WaveQuota};
use arena_world::geometry::StaticGeometry;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pause between a wave starting and its enemies appearing.
pub const WAVE_INTERMISSION: Duration = Duration::from_millis(2_000);
/// Radius around the arena center kept clear of spawns.
pub const SPAWN_EXCLUSION_RADIUS: f32 = 10.0;
/// Attempts made to place a single enemy before skipping it.
pub const SPAWN_ATTEMPTS: usize = 50;

/// Configuration parameters required to construct the wave director.
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

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingWave {
    wave: WaveNumber,
    spawn_at: Duration,
}

/// Read-only arena facts the director needs each frame.
#[derive(Clone, Copy, Debug)]
pub struct ArenaView<'a> {
    /// Static collision volumes used to validate spawn points.
    pub geometry: &'a StaticGeometry,
    /// Half the side length of the square arena.
    pub half_extent: f32,
    /// Wave currently recorded by the world.
    pub wave: WaveNumber,
    /// Number of enemies still alive.
    pub live_enemies: usize,
}

/// System that sequences waves and emits the commands that populate them.
#[derive(Debug)]
pub struct WaveDirector {
    rng: ChaCha8Rng,
    clock: Duration,
    pending: Option<PendingWave>,
}

impl WaveDirector {
    /// Creates a new wave director using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            clock: Duration::ZERO,
            pending: None,
        }
    }

    /// Consumes world events and the arena view to emit wave commands.
    pub fn handle(&mut self, events: &[Event], arena: ArenaView<'_>, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.clock = self.clock.saturating_add(*dt),
                Event::WaveStarted { wave, .. } => self.schedule(*wave),
                _ => {}
            }
        }

        match self.pending {
            Some(pending) if self.clock >= pending.spawn_at => {
                self.pending = None;
                self.populate(pending.wave, &arena, out);
            }
            Some(_) => {}
            None if arena.live_enemies == 0 => {
                out.push(Command::AdvanceWave);
                self.schedule(arena.wave.next());
            }
            None => {}
        }
    }

    /// Time left before the pending wave spawns, if one is waiting.
    #[must_use]
    pub fn countdown(&self) -> Option<Duration> {
        self.pending
            .map(|pending| pending.spawn_at.saturating_sub(self.clock))
    }

    fn schedule(&mut self, wave: WaveNumber) {
        if self.pending.map(|pending| pending.wave) == Some(wave) {
            return;
        }
        self.pending = Some(PendingWave {
            wave,
            spawn_at: self.clock + WAVE_INTERMISSION,
        });
    }

    fn populate(&mut self, wave: WaveNumber, arena: &ArenaView<'_>, out: &mut Vec<Command>) {
        let quota = WaveQuota::for_wave(wave);
        info!("spawning wave {} with {} enemies", wave.get(), quota.total());

        for archetype in Archetype::ALL {
            for _ in 0..quota.count(archetype) {
                match self.placement(archetype, arena) {
                    Some(position) => out.push(Command::SpawnEnemy {
                        archetype,
                        position,
                    }),
                    None => debug!(
                        "no clear spot for a {} in wave {}",
                        archetype.label(),
                        wave.get()
                    ),
                }
            }
        }
    }

    fn placement(&mut self, archetype: Archetype, arena: &ArenaView<'_>) -> Option<Vec3> {
        let radius = archetype.placement_radius();
        let limit = arena.half_extent - radius;
        if limit <= 0.0 {
            return None;
        }

        for _ in 0..SPAWN_ATTEMPTS {
            let candidate = Vec3::new(
                self.rng.gen_range(-limit..=limit),
                archetype.spawn_height(),
                self.rng.gen_range(-limit..=limit),
            );
            if flatten(candidate).length() < SPAWN_EXCLUSION_RADIUS {
                continue;
            }
            if arena.geometry.is_position_valid(candidate, radius) {
                return Some(candidate);
            }
        }
        None
    }
}
