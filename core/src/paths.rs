//! Roads, footpaths, rivers and pools, plus the exclusion zones they cast.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GenerationConfig;
use crate::geometry::{distance_to_segment, height_query};
use crate::heightfield::HeightGrid;
use crate::seed::{Stage, stage_rng};

const MAX_ROADS: usize = 5;
const MAX_RIVERS: usize = 3;
const POOL_COUNT: usize = 5;
const PARK_PATH_WIDTH: f64 = 3.0;
// Lifts flat features just above the terrain surface
const ROAD_LIFT: f64 = 0.02;
const WATER_LIFT: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Road,
    /// Narrow hand-laid footpath on park maps.
    Path,
    River,
    Pool,
}

/// A straight road or river segment on the world plane.
///
/// The endpoints are already pushed out by half the width along the
/// segment, so the exclusion test only needs the raw segment distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFeature {
    pub p1: DVec2,
    pub p2: DVec2,
    pub width: f64,
    pub kind: FeatureKind,
    /// Terrain height at the midpoint, slightly lifted.
    pub elevation: f64,
}

impl LineFeature {
    /// Build a feature from its centreline endpoints, extending both ends
    /// by half the width.
    pub fn new(a: DVec2, b: DVec2, width: f64, kind: FeatureKind) -> Self {
        let extend = (b - a).normalize_or_zero() * (width / 2.0);
        Self {
            p1: a - extend,
            p2: b + extend,
            width,
            kind,
            elevation: 0.0,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn midpoint(&self) -> DVec2 {
        (self.p1 + self.p2) * 0.5
    }

    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }

    pub fn distance_to(&self, p: DVec2) -> f64 {
        distance_to_segment(p, self.p1, self.p2)
    }

    pub fn contains(&self, p: DVec2) -> bool {
        self.distance_to(p) < self.width / 2.0
    }
}

/// A round body of pooled water.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularFeature {
    pub center: DVec2,
    pub radius: f64,
    pub kind: FeatureKind,
    pub elevation: f64,
}

impl CircularFeature {
    pub fn distance_to(&self, p: DVec2) -> f64 {
        self.center.distance(p)
    }

    pub fn contains(&self, p: DVec2) -> bool {
        self.distance_to(p) < self.radius
    }
}

/// The set of regions where objects and checkpoints may not be placed.
#[derive(Debug, Clone, Default)]
pub struct ExclusionZones<'a> {
    lines: Vec<&'a LineFeature>,
    circles: Vec<&'a CircularFeature>,
}

impl<'a> ExclusionZones<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines(mut self, lines: &'a [LineFeature]) -> Self {
        self.lines.extend(lines);
        self
    }

    pub fn with_circles(mut self, circles: &'a [CircularFeature]) -> Self {
        self.circles.extend(circles);
        self
    }

    // Every road, river and pool of one world
    pub fn of(
        roads: &'a [LineFeature],
        rivers: &'a [LineFeature],
        pools: &'a [CircularFeature],
    ) -> Self {
        Self::new().with_lines(roads).with_lines(rivers).with_circles(pools)
    }

    /// Whether `p` falls inside any zone.
    pub fn blocks(&self, p: DVec2) -> bool {
        self.lines.iter().any(|l| l.contains(p)) || self.circles.iter().any(|c| c.contains(p))
    }
}

/// Lays out roads and water features. Endpoints never depend on the height
/// grid; it is only queried for each feature's elevation.
pub struct PathNetworkBuilder<'a> {
    grid: &'a HeightGrid,
}

impl<'a> PathNetworkBuilder<'a> {
    pub fn new(grid: &'a HeightGrid) -> Self {
        Self { grid }
    }

    fn lifted(&self, p: DVec2, lift: f64) -> f64 {
        height_query(self.grid, p.x, p.y) + lift
    }

    fn line(&self, a: DVec2, b: DVec2, width: f64, kind: FeatureKind, lift: f64) -> LineFeature {
        let feature = LineFeature::new(a, b, width, kind);
        let elevation = self.lifted(feature.midpoint(), lift);
        feature.with_elevation(elevation)
    }

    /// Radial roads through the centre, plus the park footpath chain on
    /// small park maps.
    pub fn build_roads(&self, config: &GenerationConfig) -> Vec<LineFeature> {
        if !config.has_area() {
            return Vec::new();
        }
        let mut rng = stage_rng(config.seed, Stage::Roads);
        let half = config.half_size();
        let count = MAX_ROADS.min((config.map_size / 100.0).floor() as usize);
        let reach = half * 0.8;

        let mut roads = Vec::with_capacity(count + 4);
        for i in 0..count {
            let angle = (i as f64 / count as f64) * TAU;
            let width = rng.random_range(4.0..8.0);
            let dir = DVec2::new(angle.cos(), angle.sin());
            roads.push(self.line(-dir * reach, dir * reach, width, FeatureKind::Road, ROAD_LIFT));
        }

        if config.map_variant.has_park_paths() {
            let chain = [
                DVec2::new(-half * 0.4, -half * 0.6),
                DVec2::new(-half * 0.2, -half * 0.4),
                DVec2::new(0.0, -half * 0.5),
                DVec2::new(half * 0.2, -half * 0.3),
                DVec2::new(half * 0.4, -half * 0.5),
            ];
            for pair in chain.windows(2) {
                roads.push(self.line(
                    pair[0],
                    pair[1],
                    PARK_PATH_WIDTH,
                    FeatureKind::Path,
                    ROAD_LIFT,
                ));
            }
        }

        debug!(count = roads.len(), "roads built");
        roads
    }

    /// Edge-to-edge rivers, or scattered pools on marsh maps.
    pub fn build_rivers(
        &self,
        config: &GenerationConfig,
    ) -> (Vec<LineFeature>, Vec<CircularFeature>) {
        if !config.has_area() {
            return (Vec::new(), Vec::new());
        }
        let mut rng = stage_rng(config.seed, Stage::Rivers);
        let size = config.map_size;
        let half = config.half_size();
        let coord = |rng: &mut ChaCha8Rng| rng.random_range(-half..=half);

        if config.map_variant.has_pools() {
            let pools: Vec<CircularFeature> = (0..POOL_COUNT)
                .map(|_| {
                    let center = DVec2::new(coord(&mut rng), coord(&mut rng));
                    let radius = rng.random_range(10.0..30.0);
                    CircularFeature {
                        center,
                        radius,
                        kind: FeatureKind::Pool,
                        elevation: self.lifted(center, WATER_LIFT),
                    }
                })
                .collect();
            debug!(count = pools.len(), "pools built");
            return (Vec::new(), pools);
        }

        let count = MAX_RIVERS.min((size / 200.0).floor() as usize);
        let mut rivers = Vec::with_capacity(count);
        for _ in 0..count {
            // Enter from one border side, leave through the opposite one
            let (a, b) = match rng.random_range(0..4) {
                0 => (
                    DVec2::new(coord(&mut rng), -half),
                    DVec2::new(coord(&mut rng), half),
                ),
                1 => (
                    DVec2::new(half, coord(&mut rng)),
                    DVec2::new(-half, coord(&mut rng)),
                ),
                2 => (
                    DVec2::new(coord(&mut rng), half),
                    DVec2::new(coord(&mut rng), -half),
                ),
                _ => (
                    DVec2::new(-half, coord(&mut rng)),
                    DVec2::new(half, coord(&mut rng)),
                ),
            };
            let width = rng.random_range(3.0..10.0);
            rivers.push(self.line(a, b, width, FeatureKind::River, WATER_LIFT));
        }

        debug!(count = rivers.len(), "rivers built");
        (rivers, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapVariant;
    use crate::heightfield::HeightfieldGenerator;

    fn world_config(variant: MapVariant, size: f64) -> GenerationConfig {
        GenerationConfig {
            seed: 11,
            map_size: size,
            segments: 32,
            checkpoint_count: 0,
            map_variant: variant,
        }
    }

    fn grid(config: &GenerationConfig) -> HeightGrid {
        HeightfieldGenerator::new(config.seed).generate(config)
    }

    #[test]
    fn line_is_extended_by_half_width() {
        let l = LineFeature::new(DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), 4.0, FeatureKind::Road);
        assert_eq!(l.p1, DVec2::new(-2.0, 0.0));
        assert_eq!(l.p2, DVec2::new(12.0, 0.0));
        assert!(l.contains(DVec2::new(-1.5, 1.0)));
        assert!(!l.contains(DVec2::new(5.0, 2.0)));
    }

    #[test]
    fn road_count_scales_with_size() {
        let config = world_config(MapVariant::HillyTerrain, 300.0);
        let g = grid(&config);
        let roads = PathNetworkBuilder::new(&g).build_roads(&config);
        assert_eq!(roads.len(), 3);
        for road in &roads {
            assert!((4.0..8.0).contains(&road.width));
            assert_eq!(road.kind, FeatureKind::Road);
            // centreline reach is 80% of half-size, plus the half-width extension
            let expected = 2.0 * 150.0 * 0.8 + road.width;
            assert!((road.length() - expected).abs() < 1e-9);
            assert!(road.elevation >= ROAD_LIFT);
        }

        let big = world_config(MapVariant::Custom, 2000.0);
        let g = grid(&big);
        assert_eq!(PathNetworkBuilder::new(&g).build_roads(&big).len(), MAX_ROADS);
    }

    #[test]
    fn park_maps_get_footpaths() {
        let config = world_config(MapVariant::ForestPark, 200.0);
        let g = grid(&config);
        let roads = PathNetworkBuilder::new(&g).build_roads(&config);
        let paths: Vec<_> = roads.iter().filter(|r| r.kind == FeatureKind::Path).collect();
        assert_eq!(paths.len(), 4);
        assert!(paths.iter().all(|p| p.width == PARK_PATH_WIDTH));
        assert_eq!(roads.len(), 6);
    }

    #[test]
    fn rivers_cross_the_map() {
        let config = world_config(MapVariant::MountainPass, 600.0);
        let g = grid(&config);
        let (rivers, pools) = PathNetworkBuilder::new(&g).build_rivers(&config);
        assert!(pools.is_empty());
        assert_eq!(rivers.len(), 3);
        for river in &rivers {
            assert!((3.0..10.0).contains(&river.width));
            // span at least the full map side once the extension is removed
            assert!(river.length() >= 600.0);
        }
    }

    #[test]
    fn swamp_gets_pools() {
        let config = world_config(MapVariant::SwampArea, 500.0);
        let g = grid(&config);
        let (rivers, pools) = PathNetworkBuilder::new(&g).build_rivers(&config);
        assert!(rivers.is_empty());
        assert_eq!(pools.len(), POOL_COUNT);
        for pool in &pools {
            assert!((10.0..30.0).contains(&pool.radius));
            assert!(pool.center.x.abs() <= 250.0 && pool.center.y.abs() <= 250.0);
        }
    }

    #[test]
    fn builds_are_deterministic() {
        let config = world_config(MapVariant::HillyTerrain, 500.0);
        let g = grid(&config);
        let builder = PathNetworkBuilder::new(&g);
        assert_eq!(builder.build_roads(&config), builder.build_roads(&config));
        assert_eq!(builder.build_rivers(&config), builder.build_rivers(&config));
    }

    #[test]
    fn empty_map_has_no_features() {
        let config = world_config(MapVariant::ForestPark, 0.0);
        let g = HeightGrid::empty();
        let builder = PathNetworkBuilder::new(&g);
        assert!(builder.build_roads(&config).is_empty());
        let (rivers, pools) = builder.build_rivers(&config);
        assert!(rivers.is_empty() && pools.is_empty());
    }

    #[test]
    fn exclusion_zones_combine_lines_and_circles() {
        let lines = [LineFeature::new(DVec2::new(-10.0, 0.0), DVec2::new(10.0, 0.0), 2.0, FeatureKind::Road)];
        let circles = [CircularFeature {
            center: DVec2::new(0.0, 20.0),
            radius: 5.0,
            kind: FeatureKind::Pool,
            elevation: 0.0,
        }];
        let zones = ExclusionZones::new().with_lines(&lines).with_circles(&circles);
        assert!(zones.blocks(DVec2::new(0.0, 0.5)));
        assert!(zones.blocks(DVec2::new(1.0, 18.0)));
        assert!(!zones.blocks(DVec2::new(0.0, 10.0)));

        let all = ExclusionZones::of(&lines, &[], &circles);
        assert!(all.blocks(DVec2::new(0.0, 0.5)) && all.blocks(DVec2::new(1.0, 18.0)));
        assert!(!ExclusionZones::new().blocks(DVec2::ZERO));
    }

    #[test]
    fn vanishing_map_still_places_pools() {
        // half-size underflows to zero, leaving a single admissible coordinate
        let config = world_config(MapVariant::SwampArea, 5e-324);
        let g = HeightGrid::empty();
        let (rivers, pools) = PathNetworkBuilder::new(&g).build_rivers(&config);
        assert!(rivers.is_empty());
        assert_eq!(pools.len(), POOL_COUNT);
        assert!(pools.iter().all(|p| p.center == DVec2::ZERO));
    }
}
