use std::{fs, io, path::Path, path::PathBuf};

use arena_core::{Aabb, Vec3, WeaponKind};
use arena_world::{PlayerLoadout, PLAYER_RADIUS, PLAYER_SPAWN};
use serde::Deserialize;
use thiserror::Error;

const BOUNDARY_THICKNESS: f32 = 1.0;
const RING_RADIUS: f32 = 25.0;
const RING_SIZE: usize = 8;

/// Errors raised while loading or validating an arena description.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read arena config {}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration is not valid TOML or does not match the schema.
    #[error("failed to parse arena config")]
    Parse(#[from] toml::de::Error),
    /// An arena dimension is zero, negative or not finite.
    #[error("{name} must be positive and finite, got {value}")]
    InvalidExtent {
        /// Name of the offending field.
        name: &'static str,
        /// Value found in the configuration.
        value: f32,
    },
    /// A building has a zero, negative or non-finite dimension.
    #[error("building {index} must have positive width, depth and height")]
    InvalidBuilding {
        /// Position of the building in the configuration.
        index: usize,
    },
    /// A building pokes through the boundary walls or covers the player start.
    #[error("building {index} must lie inside the arena and clear of the player start")]
    BuildingOutsideArena {
        /// Position of the building in the configuration.
        index: usize,
    },
}

/// Box-shaped building resting on the ground.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingConfig {
    /// Center of the footprint along the x axis.
    pub x: f32,
    /// Center of the footprint along the z axis.
    pub z: f32,
    /// Extent along the x axis.
    pub width: f32,
    /// Extent along the z axis.
    pub depth: f32,
    /// Height above the ground.
    pub height: f32,
}

impl BuildingConfig {
    fn volume(&self) -> Aabb {
        Aabb::from_footprint(self.x, self.z, self.width, self.depth, self.height)
    }
}

/// Player state at the start of a session.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Starting and maximum health.
    pub health: u32,
    /// Starting ammunition.
    pub ammo: u32,
    /// Starting weapon.
    pub weapon: WeaponKind,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let loadout = PlayerLoadout::default();
        Self {
            health: loadout.health,
            ammo: loadout.ammo,
            weapon: loadout.weapon,
        }
    }
}

/// Complete description of an arena session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Root seed every random stream is derived from.
    pub seed: u64,
    /// Half the side length of the square arena centered on the origin.
    pub arena_half_extent: f32,
    /// Height of the generated boundary walls.
    pub wall_height: f32,
    /// Static buildings placed inside the arena.
    pub buildings: Vec<BuildingConfig>,
    /// Starting player loadout.
    pub player: PlayerConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        let buildings = (0..RING_SIZE)
            .map(|index| {
                let angle = index as f32 * std::f32::consts::TAU / RING_SIZE as f32;
                let wide = index % 2 == 0;
                BuildingConfig {
                    x: angle.cos() * RING_RADIUS,
                    z: angle.sin() * RING_RADIUS,
                    width: if wide { 8.0 } else { 5.0 },
                    depth: if wide { 5.0 } else { 8.0 },
                    height: 4.0 + (index % 3) as f32 * 2.0,
                }
            })
            .collect();

        Self {
            seed: 0x00a1_e7a5,
            arena_half_extent: 50.0,
            wall_height: 6.0,
            buildings,
            player: PlayerConfig::default(),
        }
    }
}

impl ArenaConfig {
    /// Parses and validates an arena description written in TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates an arena description from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks the dimensions and building placement.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("arena_half_extent", self.arena_half_extent)?;
        positive("wall_height", self.wall_height)?;

        let spawn = Vec3::new(PLAYER_SPAWN.x, 0.0, PLAYER_SPAWN.z);
        for (index, building) in self.buildings.iter().enumerate() {
            let dimensions = [building.width, building.depth, building.height];
            if dimensions.iter().any(|value| !(value.is_finite() && *value > 0.0))
                || !building.x.is_finite()
                || !building.z.is_finite()
            {
                return Err(ConfigError::InvalidBuilding { index });
            }

            let inside = building.x.abs() + building.width * 0.5 <= self.arena_half_extent
                && building.z.abs() + building.depth * 0.5 <= self.arena_half_extent;
            let footprint = building.volume();
            let clearance = footprint.closest_point(spawn).distance(spawn);
            if !inside || clearance <= PLAYER_RADIUS {
                return Err(ConfigError::BuildingOutsideArena { index });
            }
        }
        Ok(())
    }

    /// Collision volumes for the buildings and the four boundary walls.
    #[must_use]
    pub fn volumes(&self) -> Vec<Aabb> {
        let half = self.arena_half_extent;
        let outer = half + BOUNDARY_THICKNESS;
        let height = self.wall_height;
        let mut volumes: Vec<Aabb> = self.buildings.iter().map(BuildingConfig::volume).collect();
        volumes.extend([
            Aabb::new(Vec3::new(-outer, 0.0, -outer), Vec3::new(outer, height, -half)),
            Aabb::new(Vec3::new(-outer, 0.0, half), Vec3::new(outer, height, outer)),
            Aabb::new(Vec3::new(-outer, 0.0, -half), Vec3::new(-half, height, half)),
            Aabb::new(Vec3::new(half, 0.0, -half), Vec3::new(outer, height, half)),
        ]);
        volumes
    }

    /// Player loadout described by the configuration.
    #[must_use]
    pub fn loadout(&self) -> PlayerLoadout {
        PlayerLoadout {
            health: self.player.health,
            ammo: self.player.ammo,
            weapon: self.player.weapon,
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidExtent { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_arena_is_valid() {
        let config = ArenaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.buildings.len(), RING_SIZE);
        assert_eq!(config.volumes().len(), RING_SIZE + 4);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = ArenaConfig::from_toml_str("seed = 7\n").expect("valid config");
        assert_eq!(config.seed, 7);
        assert_eq!(config.arena_half_extent, 50.0);
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn player_weapon_uses_snake_case_names() {
        let config = ArenaConfig::from_toml_str(
            "buildings = []\n[player]\nweapon = \"rocket_launcher\"\nammo = 3\n",
        )
        .expect("valid config");
        assert_eq!(config.player.weapon, WeaponKind::RocketLauncher);
        assert_eq!(config.player.ammo, 3);
        assert_eq!(config.player.health, 100);
        assert_eq!(config.volumes().len(), 4);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = ArenaConfig::from_toml_str("gravity = 9.8\n").expect_err("unknown field");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn non_positive_extent_is_rejected() {
        let error =
            ArenaConfig::from_toml_str("arena_half_extent = 0.0\n").expect_err("zero extent");
        assert!(matches!(
            error,
            ConfigError::InvalidExtent {
                name: "arena_half_extent",
                ..
            }
        ));
    }

    #[test]
    fn degenerate_building_is_rejected() {
        let error = ArenaConfig::from_toml_str(
            "[[buildings]]\nx = 20.0\nz = 0.0\nwidth = 0.0\ndepth = 4.0\nheight = 4.0\n",
        )
        .expect_err("flat building");
        assert!(matches!(error, ConfigError::InvalidBuilding { index: 0 }));
    }

    #[test]
    fn buildings_must_stay_inside_and_off_the_spawn() {
        let outside = ArenaConfig::from_toml_str(
            "[[buildings]]\nx = 48.0\nz = 0.0\nwidth = 6.0\ndepth = 4.0\nheight = 4.0\n",
        )
        .expect_err("building crosses the wall");
        assert!(matches!(
            outside,
            ConfigError::BuildingOutsideArena { index: 0 }
        ));

        let covering = ArenaConfig::from_toml_str(
            "[[buildings]]\nx = 20.0\nz = 0.0\nwidth = 4.0\ndepth = 4.0\nheight = 4.0\n\
             [[buildings]]\nx = 1.0\nz = 0.0\nwidth = 1.5\ndepth = 4.0\nheight = 4.0\n",
        )
        .expect_err("building covers the player");
        assert!(matches!(
            covering,
            ConfigError::BuildingOutsideArena { index: 1 }
        ));
    }

    #[test]
    fn boundary_walls_enclose_the_arena() {
        let config = ArenaConfig {
            buildings: Vec::new(),
            ..ArenaConfig::default()
        };
        let volumes = config.volumes();
        for probe in [
            Vec3::new(0.0, 1.0, -50.5),
            Vec3::new(0.0, 1.0, 50.5),
            Vec3::new(-50.5, 1.0, 0.0),
            Vec3::new(50.5, 1.0, 0.0),
        ] {
            assert!(volumes.iter().any(|volume| volume.contains_point(probe)));
        }
        assert!(!volumes
            .iter()
            .any(|volume| volume.contains_point(Vec3::new(49.0, 1.0, 49.0))));
    }
}
