use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on grid resolution per axis.
pub const MAX_SEGMENTS: u32 = 1024;
/// Largest accepted map side in meters.
pub const MAX_MAP_SIZE: f64 = 10_000.0;
pub const MAX_CHECKPOINTS: u32 = 64;
// Preset grid resolution, capped by map size
pub const DEFAULT_SEGMENTS: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Advanced,
    Expert,
}

impl Difficulty {
    pub fn base_rating(self) -> f64 {
        match self {
            Difficulty::Beginner => 1.0,
            Difficulty::Advanced => 2.0,
            Difficulty::Expert => 3.0,
        }
    }
}

/// The catalogue of maps. A variant selects both default dimensions and
/// variant-specific features (park paths, swamp pools, cliffs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapVariant {
    SmallDetailed,
    #[default]
    ForestPark,
    HillyTerrain,
    MountainPass,
    SwampArea,
    LargeWilderness,
    Custom,
}

impl MapVariant {
    pub const ALL: [MapVariant; 7] = [
        MapVariant::SmallDetailed,
        MapVariant::ForestPark,
        MapVariant::HillyTerrain,
        MapVariant::MountainPass,
        MapVariant::SwampArea,
        MapVariant::LargeWilderness,
        MapVariant::Custom,
    ];

    pub fn id(self) -> &'static str {
        match self {
            MapVariant::SmallDetailed => "small_detailed",
            MapVariant::ForestPark => "forest_park",
            MapVariant::HillyTerrain => "hilly_terrain",
            MapVariant::MountainPass => "mountain_pass",
            MapVariant::SwampArea => "swamp_area",
            MapVariant::LargeWilderness => "large_wilderness",
            MapVariant::Custom => "custom",
        }
    }

    /// Look up a variant by id, ignoring case and treating `-` like `_`.
    pub fn parse(id: &str) -> Result<Self, ConfigError> {
        let normalized = id.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|v| v.id() == normalized)
            .ok_or_else(|| ConfigError::UnknownVariant(id.to_string()))
    }

    pub fn default_size(self) -> f64 {
        match self {
            MapVariant::SmallDetailed => 100.0,
            MapVariant::ForestPark => 200.0,
            MapVariant::HillyTerrain => 300.0,
            MapVariant::MountainPass => 400.0,
            MapVariant::SwampArea => 500.0,
            MapVariant::LargeWilderness => 1000.0,
            MapVariant::Custom => 500.0,
        }
    }

    pub fn default_checkpoints(self) -> u32 {
        match self {
            MapVariant::SmallDetailed => 3,
            MapVariant::ForestPark => 5,
            MapVariant::HillyTerrain => 7,
            MapVariant::MountainPass => 8,
            MapVariant::SwampArea => 10,
            MapVariant::LargeWilderness => 15,
            MapVariant::Custom => 5,
        }
    }

    pub fn difficulty(self) -> Difficulty {
        match self {
            MapVariant::SmallDetailed | MapVariant::ForestPark => Difficulty::Beginner,
            MapVariant::HillyTerrain | MapVariant::Custom => Difficulty::Advanced,
            MapVariant::MountainPass | MapVariant::SwampArea | MapVariant::LargeWilderness => {
                Difficulty::Expert
            }
        }
    }

    // Small maps get the hand-laid footpath chain
    pub fn has_park_paths(self) -> bool {
        matches!(self, MapVariant::SmallDetailed | MapVariant::ForestPark)
    }

    // Marsh maps pool their water instead of running rivers
    pub fn has_pools(self) -> bool {
        self == MapVariant::SwampArea
    }

    pub fn has_cliffs(self) -> bool {
        matches!(self, MapVariant::MountainPass | MapVariant::LargeWilderness)
    }
}

impl std::fmt::Display for MapVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Immutable input to the whole generation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub seed: u64,
    /// Side length of the square map in meters.
    pub map_size: f64,
    /// Grid cells per axis; the height grid has `segments + 1` samples per axis.
    pub segments: u32,
    pub checkpoint_count: u32,
    #[serde(default)]
    pub map_variant: MapVariant,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::from_variant(MapVariant::default(), 0)
    }
}

impl GenerationConfig {
    pub fn from_variant(variant: MapVariant, seed: u64) -> Self {
        let map_size = variant.default_size();
        Self {
            seed,
            map_size,
            segments: DEFAULT_SEGMENTS.min(map_size as u32).max(1),
            checkpoint_count: variant.default_checkpoints(),
            map_variant: variant,
        }
    }

    pub fn half_size(&self) -> f64 {
        self.map_size / 2.0
    }

    pub fn has_area(&self) -> bool {
        self.map_size.is_finite() && self.map_size > 0.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.map_size.is_finite() || self.map_size < 0.0 {
            return Err(ConfigError::InvalidMapSize(self.map_size));
        }
        if self.map_size > MAX_MAP_SIZE {
            return Err(ConfigError::MapTooLarge {
                got: self.map_size,
                max: MAX_MAP_SIZE,
            });
        }
        if self.segments == 0 || self.segments > MAX_SEGMENTS {
            return Err(ConfigError::InvalidSegments {
                got: self.segments,
                max: MAX_SEGMENTS,
            });
        }
        if self.checkpoint_count > MAX_CHECKPOINTS {
            return Err(ConfigError::TooManyCheckpoints {
                got: self.checkpoint_count,
                max: MAX_CHECKPOINTS,
            });
        }
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GenerationConfig = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(ConfigError::Serialize)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_toml_str(&contents)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = self.to_toml_string()?;
        fs::write(path, contents).map_err(ConfigError::Write)
    }
}
