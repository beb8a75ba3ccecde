// core holds the terrain, path, placement and checkpoint pipeline
pub mod checkpoints;
pub mod config;
pub mod error;
pub mod geometry;
pub mod heightfield;
pub mod noise_field;
pub mod paths;
pub mod placement;
pub mod preview;
pub mod seed;
pub mod utils;
pub mod world;

pub use checkpoints::{
    Advance, CAPTURE_RADIUS, Checkpoint, CheckpointPlanner, CheckpointState, advance_checkpoint,
    course_length,
};
pub use config::{Difficulty, GenerationConfig, MapVariant};
pub use error::{ConfigError, PreviewError};
pub use geometry::{
    CompassPoint, RelativeDirection, bearing, compass_point, distance_to_segment, height_query,
    planar_distance, relative_direction, slope,
};
pub use heightfield::{HeightGrid, HeightfieldGenerator};
pub use noise_field::NoiseField;
pub use paths::{CircularFeature, ExclusionZones, FeatureKind, LineFeature, PathNetworkBuilder};
pub use placement::{
    ObjectClass, ObjectKind, PlacedObject, Placement, PlacementReport, SpatialFeaturePlacer,
    TreeSpecies,
};
pub use utils::checksum2;
pub use world::{
    TerrainClass, WorldData, classify_terrain, compute_bearing, compute_slope, generate_world,
    query_distance_to_nearest_river, query_distance_to_nearest_road, query_height,
};

// 2D noise source sampled by the heightfield
pub trait NoiseGenerator {
    // Sample 2D noise at (x, y).
    fn get2(&self, x: f64, y: f64) -> f64;
}
