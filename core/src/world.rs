use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::checkpoints::{Checkpoint, CheckpointPlanner};
use crate::config::GenerationConfig;
use crate::geometry::{bearing, height_query, planar, slope};
use crate::heightfield::{HeightGrid, HeightfieldGenerator};
use crate::paths::{CircularFeature, ExclusionZones, LineFeature, PathNetworkBuilder};
use crate::placement::{PlacedObject, PlacementReport, SpatialFeaturePlacer};
use crate::utils::checksum_f64;

// Lowland below, mountain above
const SWAMP_BELOW: f64 = 2.0;
const ROCKY_ABOVE: f64 = 15.0;

/// Everything one generation pass produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldData {
    pub config: GenerationConfig,
    pub height_grid: HeightGrid,
    // roads and park footpaths
    pub roads: Vec<LineFeature>,
    pub rivers: Vec<LineFeature>,
    pub pools: Vec<CircularFeature>,
    pub objects: Vec<PlacedObject>,
    pub checkpoints: Vec<Checkpoint>,
    pub report: PlacementReport,
}

impl WorldData {
    pub fn exclusions(&self) -> ExclusionZones<'_> {
        ExclusionZones::of(&self.roads, &self.rivers, &self.pools)
    }

    // Bit pattern hash of every feature, object and checkpoint placement
    pub fn feature_checksum(&self) -> u64 {
        let lines = self
            .roads
            .iter()
            .chain(&self.rivers)
            .flat_map(|l| [l.p1.x, l.p1.y, l.p2.x, l.p2.y, l.width]);
        let pools = self
            .pools
            .iter()
            .flat_map(|c| [c.center.x, c.center.y, c.radius]);
        let objects = self
            .objects
            .iter()
            .flat_map(|o| [o.position.x, o.position.y, o.position.z, o.rotation_y, o.scale]);
        let checkpoints = self
            .checkpoints
            .iter()
            .flat_map(|c| [c.position.x, c.position.y, c.position.z]);
        checksum_f64(lines.chain(pools).chain(objects).chain(checkpoints))
    }
}

// Heightfield, paths and water, objects, then the checkpoint course.
// Deterministic in `config` and never fails.
pub fn generate_world(config: &GenerationConfig) -> WorldData {
    let _world = info_span!("generate_world", seed = config.seed, variant = %config.map_variant).entered();

    if !config.has_area() {
        warn!(map_size = config.map_size, "map has no area, generating an empty world");
    }

    let height_grid = {
        let _span = info_span!("heightfield").entered();
        HeightfieldGenerator::new(config.seed).generate(config)
    };

    let (roads, rivers, pools) = {
        let _span = info_span!("paths").entered();
        let builder = PathNetworkBuilder::new(&height_grid);
        let roads = builder.build_roads(config);
        let (rivers, pools) = builder.build_rivers(config);
        (roads, rivers, pools)
    };

    let zones = ExclusionZones::of(&roads, &rivers, &pools);

    let (objects, report) = {
        let _span = info_span!("placement").entered();
        SpatialFeaturePlacer::new(&height_grid).populate(config, &zones)
    };
    if report.total_skipped() > 0 {
        warn!(skipped = report.total_skipped(), "some objects found no free spot");
    }

    let checkpoints = {
        let _span = info_span!("checkpoints").entered();
        CheckpointPlanner::new(&height_grid).plan(config, &zones)
    };

    info!(
        roads = roads.len(),
        rivers = rivers.len(),
        pools = pools.len(),
        objects = objects.len(),
        checkpoints = checkpoints.len(),
        "world generated"
    );

    WorldData {
        config: config.clone(),
        height_grid,
        roads,
        rivers,
        pools,
        objects,
        checkpoints,
        report,
    }
}

pub fn query_height(world: &WorldData, x: f64, z: f64) -> f64 {
    height_query(&world.height_grid, x, z)
}

// Distance to the closest road or path centreline, None without roads
pub fn query_distance_to_nearest_road(world: &WorldData, x: f64, z: f64) -> Option<f64> {
    let p = DVec2::new(x, z);
    world
        .roads
        .iter()
        .map(|r| r.distance_to(p))
        .min_by(f64::total_cmp)
}

// Closest river centreline or pool edge, negative inside a pool
pub fn query_distance_to_nearest_river(world: &WorldData, x: f64, z: f64) -> Option<f64> {
    let p = DVec2::new(x, z);
    let rivers = world.rivers.iter().map(|r| r.distance_to(p));
    let pools = world.pools.iter().map(|c| c.distance_to(p) - c.radius);
    rivers.chain(pools).min_by(f64::total_cmp)
}

pub fn compute_bearing(from: DVec3, to: DVec3) -> f64 {
    bearing(planar(from), planar(to))
}

pub fn compute_slope(world: &WorldData, x: f64, z: f64) -> f64 {
    slope(|x, z| query_height(world, x, z), x, z)
}

/// Coarse ground type used for movement and hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainClass {
    Swamp,
    Rocky,
    Road,
    River,
    Forest,
}

pub fn classify_terrain(world: &WorldData, x: f64, z: f64) -> TerrainClass {
    let height = query_height(world, x, z);
    if height > ROCKY_ABOVE {
        return TerrainClass::Rocky;
    }
    if height < SWAMP_BELOW {
        return TerrainClass::Swamp;
    }
    let p = DVec2::new(x, z);
    if world.roads.iter().any(|r| r.contains(p)) {
        TerrainClass::Road
    } else if world.rivers.iter().any(|r| r.contains(p)) || world.pools.iter().any(|c| c.contains(p)) {
        TerrainClass::River
    } else {
        TerrainClass::Forest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapVariant;
    use crate::paths::FeatureKind;

    fn flat_world(height: f32) -> WorldData {
        let config = GenerationConfig {
            seed: 0,
            map_size: 0.0,
            segments: 1,
            checkpoint_count: 0,
            map_variant: MapVariant::Custom,
        };
        let mut world = generate_world(&config);
        world.height_grid = HeightGrid::filled(100.0, 4, height);
        world
    }

    #[test]
    fn empty_config_gives_empty_world() {
        let world = flat_world(0.0);
        assert!(world.roads.is_empty() && world.rivers.is_empty() && world.pools.is_empty());
        assert!(world.objects.is_empty() && world.checkpoints.is_empty());
        assert_eq!(query_distance_to_nearest_road(&world, 0.0, 0.0), None);
        assert_eq!(query_distance_to_nearest_river(&world, 0.0, 0.0), None);
    }

    #[test]
    fn terrain_classes_follow_height_then_features() {
        let mut world = flat_world(5.0);
        world.roads.push(LineFeature::new(
            DVec2::new(-50.0, 0.0),
            DVec2::new(50.0, 0.0),
            6.0,
            FeatureKind::Road,
        ));
        world.pools.push(CircularFeature {
            center: DVec2::new(0.0, 30.0),
            radius: 10.0,
            kind: FeatureKind::Pool,
            elevation: 5.0,
        });
        assert_eq!(classify_terrain(&world, 10.0, 1.0), TerrainClass::Road);
        assert_eq!(classify_terrain(&world, 0.0, 30.0), TerrainClass::River);
        assert_eq!(classify_terrain(&world, 30.0, -30.0), TerrainClass::Forest);
        assert_eq!(classify_terrain(&world, 500.0, 0.0), TerrainClass::Swamp);

        assert_eq!(classify_terrain(&flat_world(20.0), 0.0, 0.0), TerrainClass::Rocky);
        assert_eq!(classify_terrain(&flat_world(0.5), 0.0, 0.0), TerrainClass::Swamp);
        assert_eq!(classify_terrain(&flat_world(1.5), 0.0, 0.0), TerrainClass::Swamp);
        assert_eq!(classify_terrain(&flat_world(2.0), 0.0, 0.0), TerrainClass::Forest);
    }

    #[test]
    fn water_distance_counts_pool_edges() {
        let mut world = flat_world(5.0);
        world.pools.push(CircularFeature {
            center: DVec2::new(0.0, 0.0),
            radius: 10.0,
            kind: FeatureKind::Pool,
            elevation: 5.0,
        });
        assert_eq!(query_distance_to_nearest_river(&world, 25.0, 0.0), Some(15.0));
    }

    #[test]
    fn flat_ground_has_no_slope() {
        let world = flat_world(3.0);
        assert_eq!(compute_slope(&world, 0.0, 0.0), 0.0);
        assert_eq!(query_height(&world, 10.0, -10.0), 3.0);
    }

    #[test]
    fn bearing_ignores_height() {
        let a = DVec3::new(0.0, 100.0, 0.0);
        let b = DVec3::new(5.0, -3.0, 0.0);
        assert!((compute_bearing(a, b) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn world_serializes_to_json() {
        let config = GenerationConfig::from_variant(MapVariant::SmallDetailed, 12);
        let world = generate_world(&config);
        let json = serde_json::to_string(&world).unwrap();
        assert!(json.contains("\"map_variant\":\"small_detailed\""));
        let back: WorldData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.checkpoints, world.checkpoints);
        assert_eq!(back.height_grid, world.height_grid);
        assert_eq!(back.feature_checksum(), world.feature_checksum());
    }

    #[test]
    fn world_exclusions_cover_all_water_and_roads() {
        let config = GenerationConfig::from_variant(MapVariant::SwampArea, 3);
        let world = generate_world(&config);
        assert!(world.rivers.is_empty());
        assert_eq!(world.pools.len(), 5);
        let zones = world.exclusions();
        let pool = &world.pools[0];
        assert!(zones.blocks(pool.center));
    }

    #[test]
    fn feature_checksum_tracks_placements() {
        let config = GenerationConfig::from_variant(MapVariant::SmallDetailed, 21);
        let world = generate_world(&config);
        assert_eq!(world.feature_checksum(), generate_world(&config).feature_checksum());

        let mut moved = world.clone();
        moved.checkpoints[0].position.x += 0.5;
        assert_ne!(moved.feature_checksum(), world.feature_checksum());

        let mut thinned = world.clone();
        thinned.objects.pop();
        assert_ne!(thinned.feature_checksum(), world.feature_checksum());
    }
}
