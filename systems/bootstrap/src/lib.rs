#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that turns an arena description into a ready world and
//! the seeds for every simulation system.

mod config;

use arena_world::{query, World, WorldConfig};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use config::{ArenaConfig, BuildingConfig, ConfigError, PlayerConfig};

/// Independent random seeds derived from the arena's root seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemSeeds {
    /// Seed for the world's own stream.
    pub world: u64,
    /// Seed for the steering system.
    pub steering: u64,
    /// Seed for the behavior system.
    pub behavior: u64,
    /// Seed for the weapon system.
    pub weapons: u64,
    /// Seed for the wave director.
    pub waves: u64,
}

impl SystemSeeds {
    /// Derives one seed per system from the root seed.
    #[must_use]
    pub fn derive(root: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(root);
        Self {
            world: rng.gen(),
            steering: rng.gen(),
            behavior: rng.gen(),
            weapons: rng.gen(),
            waves: rng.gen(),
        }
    }
}

/// Validated arena description ready to build worlds from.
#[derive(Clone, Debug)]
pub struct Bootstrap {
    config: ArenaConfig,
    seeds: SystemSeeds,
}

impl Bootstrap {
    /// Validates the configuration and derives the system seeds.
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seeds = SystemSeeds::derive(config.seed);
        Ok(Self { config, seeds })
    }

    /// Configuration the bootstrap was created from.
    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Seeds for every simulation system.
    #[must_use]
    pub fn seeds(&self) -> SystemSeeds {
        self.seeds
    }

    /// Builds a fresh world described by the configuration.
    #[must_use]
    pub fn world(&self) -> World {
        let volumes = self.config.volumes();
        info!(
            "building arena of half extent {} with {} buildings",
            self.config.arena_half_extent,
            self.config.buildings.len()
        );
        World::new(WorldConfig {
            seed: self.seeds.world,
            arena_half_extent: self.config.arena_half_extent,
            volumes,
            player: self.config.loadout(),
        })
    }

    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }
}

impl Default for Bootstrap {
    fn default() -> Self {
        let config = ArenaConfig::default();
        let seeds = SystemSeeds::derive(config.seed);
        Self { config, seeds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::WELCOME_BANNER;

    #[test]
    fn seeds_are_stable_and_distinct() {
        let seeds = SystemSeeds::derive(42);
        assert_eq!(seeds, SystemSeeds::derive(42));
        assert_ne!(seeds, SystemSeeds::derive(43));

        let all = [
            seeds.world,
            seeds.steering,
            seeds.behavior,
            seeds.weapons,
            seeds.waves,
        ];
        for (index, seed) in all.iter().enumerate() {
            assert!(!all[index + 1..].contains(seed));
        }
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = ArenaConfig {
            wall_height: -1.0,
            ..ArenaConfig::default()
        };
        assert!(matches!(
            Bootstrap::new(config),
            Err(ConfigError::InvalidExtent {
                name: "wall_height",
                ..
            })
        ));
    }

    #[test]
    fn world_carries_arena_geometry() {
        let bootstrap = Bootstrap::default();
        let world = bootstrap.world();
        assert_eq!(bootstrap.welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(
            query::geometry(&world).volumes().len(),
            bootstrap.config().volumes().len()
        );
        assert_eq!(query::arena_half_extent(&world), 50.0);
        assert_eq!(query::player(&world).ammo, 50);
    }
}
