use std::time::{SystemTime, UNIX_EPOCH};

use bson::oid::ObjectId;
use orienteer_core::utils::checksum2;
use orienteer_core::{GenerationConfig, MapVariant, WorldData};
use serde::{Deserialize, Serialize};

// BSON has no unsigned 64-bit type, so seed and checksum are stored as the
// i64 with the same bit pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    pub seed: i64,
    pub map_size: f64,
    pub segments: u32,
    pub checkpoint_count: u32,
    pub map_variant: MapVariant,
}

impl From<&GenerationConfig> for StoredConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            seed: config.seed as i64,
            map_size: config.map_size,
            segments: config.segments,
            checkpoint_count: config.checkpoint_count,
            map_variant: config.map_variant,
        }
    }
}

impl From<&StoredConfig> for GenerationConfig {
    fn from(stored: &StoredConfig) -> Self {
        Self {
            seed: stored.seed as u64,
            map_size: stored.map_size,
            segments: stored.segments,
            checkpoint_count: stored.checkpoint_count,
            map_variant: stored.map_variant,
        }
    }
}

/// A named map in the catalogue. Only the config is stored; the world is
/// regenerated on load and checked against both checksums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub name: String,
    pub config: StoredConfig,
    pub height_checksum: i64,
    // roads, water, objects and checkpoints
    #[serde(default)]
    pub feature_checksum: i64,
    pub checkpoint_count: u32,
    pub created_at_unix: i64,
}

impl MapDoc {
    pub fn from_world(name: impl Into<String>, world: &WorldData) -> Self {
        let created_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as i64);
        Self {
            id: None,
            name: name.into(),
            config: StoredConfig::from(&world.config),
            height_checksum: checksum2(world.height_grid.rows()) as i64,
            feature_checksum: world.feature_checksum() as i64,
            checkpoint_count: world.checkpoints.len() as u32,
            created_at_unix,
        }
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig::from(&self.config)
    }

    pub fn checksum(&self) -> u64 {
        self.height_checksum as u64
    }

    /// Whether `world` reproduces the stored map bit for bit.
    pub fn matches(&self, world: &WorldData) -> bool {
        checksum2(world.height_grid.rows()) == self.checksum()
            && world.feature_checksum() == self.feature_checksum as u64
            && world.checkpoints.len() as u32 == self.checkpoint_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orienteer_core::generate_world;

    fn small_world(seed: u64) -> WorldData {
        let mut config = GenerationConfig::from_variant(MapVariant::SmallDetailed, seed);
        config.segments = 32;
        generate_world(&config)
    }

    #[test]
    fn regenerated_world_matches_doc() {
        let world = small_world(u64::MAX - 3);
        let doc = MapDoc::from_world("ridge", &world);
        assert_eq!(doc.name, "ridge");
        assert_eq!(doc.checkpoint_count, 3);
        assert_eq!(doc.generation_config(), world.config);

        let again = generate_world(&doc.generation_config());
        assert!(doc.matches(&again));
        assert!(!doc.matches(&small_world(1)));
    }

    #[test]
    fn shifted_features_fail_verification() {
        let world = small_world(5);
        let doc = MapDoc::from_world("shifted", &world);

        // same terrain, one tree moved
        let mut moved = world.clone();
        moved.objects[0].position.x += 1.0;
        assert_eq!(checksum2(moved.height_grid.rows()), doc.checksum());
        assert!(!doc.matches(&moved));

        let mut relocated = world;
        relocated.checkpoints[2].position.z -= 0.25;
        assert!(!doc.matches(&relocated));
    }

    #[test]
    fn doc_survives_bson() {
        let doc = MapDoc::from_world("bog", &small_world(u64::MAX));
        let encoded = bson::to_document(&doc).unwrap();
        assert!(!encoded.contains_key("_id"));
        assert_eq!(encoded.get_str("name").unwrap(), "bog");
        let decoded: MapDoc = bson::from_document(encoded).unwrap();
        assert_eq!(decoded, doc);
        assert_eq!(decoded.generation_config().seed, u64::MAX);
    }
}
