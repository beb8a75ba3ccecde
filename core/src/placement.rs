//! Rejection-sampling placement of vegetation, rocks and debris.
//!
//! Every class is drawn from its own seeded stream. An instance that cannot
//! find a free spot within its attempt budget is skipped, so the final
//! object count is best-effort rather than exact.

use std::f64::consts::{PI, TAU};

use glam::{DVec2, DVec3};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GenerationConfig;
use crate::geometry::height_query;
use crate::heightfield::HeightGrid;
use crate::paths::ExclusionZones;
use crate::seed::{Stage, stage_rng};

/// Effectively unbounded budget for ground cover, which tolerates overlap
/// but must still terminate on a fully covered map.
pub const GROUND_COVER_ATTEMPTS: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeSpecies {
    Pine,
    Oak,
    Birch,
    Spruce,
    Poplar,
    Willow,
}

impl TreeSpecies {
    pub const ALL: [TreeSpecies; 6] = [
        TreeSpecies::Pine,
        TreeSpecies::Oak,
        TreeSpecies::Birch,
        TreeSpecies::Spruce,
        TreeSpecies::Poplar,
        TreeSpecies::Willow,
    ];
}

/// What a placed object is, as handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Tree(TreeSpecies),
    Rock,
    FallenTree,
    Bush,
    Grass,
    Cliff,
}

impl ObjectKind {
    pub fn class(self) -> ObjectClass {
        match self {
            ObjectKind::Tree(_) => ObjectClass::Trees,
            ObjectKind::Rock => ObjectClass::Rocks,
            ObjectKind::FallenTree => ObjectClass::FallenTrees,
            ObjectKind::Bush => ObjectClass::Bushes,
            ObjectKind::Grass => ObjectClass::Grass,
            ObjectKind::Cliff => ObjectClass::Cliffs,
        }
    }
}

/// How many instances of a class a map receives.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Density {
    /// `size² / divisor`, roughly constant objects per unit area.
    PerArea(f64),
    /// `size / divisor`, for sparse debris that scales with the map side.
    PerSide(f64),
}

/// A group of objects sharing count, attempt and variation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    Trees,
    Rocks,
    FallenTrees,
    Bushes,
    Grass,
    Cliffs,
}

impl ObjectClass {
    pub const ALL: [ObjectClass; 6] = [
        ObjectClass::Trees,
        ObjectClass::Rocks,
        ObjectClass::Cliffs,
        ObjectClass::FallenTrees,
        ObjectClass::Bushes,
        ObjectClass::Grass,
    ];

    fn stage(self) -> Stage {
        match self {
            ObjectClass::Trees => Stage::Trees,
            ObjectClass::Rocks => Stage::Rocks,
            ObjectClass::FallenTrees => Stage::FallenTrees,
            ObjectClass::Bushes => Stage::Bushes,
            ObjectClass::Grass => Stage::Grass,
            ObjectClass::Cliffs => Stage::Cliffs,
        }
    }

    fn density(self) -> Density {
        match self {
            ObjectClass::Trees => Density::PerArea(100.0),
            ObjectClass::Rocks => Density::PerArea(500.0),
            ObjectClass::FallenTrees => Density::PerSide(10.0),
            ObjectClass::Bushes => Density::PerSide(5.0),
            ObjectClass::Grass => Density::PerArea(10.0),
            ObjectClass::Cliffs => Density::PerSide(200.0),
        }
    }

    // Upper bound on instances per map
    fn class_cap(self) -> usize {
        match self {
            ObjectClass::Trees => 500,
            ObjectClass::Rocks => 200,
            ObjectClass::FallenTrees => 50,
            ObjectClass::Bushes => 100,
            ObjectClass::Grass => 1000,
            ObjectClass::Cliffs => 20,
        }
    }

    /// Draws allowed per instance before it is skipped. `None` means the
    /// class ignores exclusion zones entirely.
    pub fn attempt_limit(self) -> Option<u32> {
        match self {
            ObjectClass::Trees => Some(100),
            ObjectClass::Rocks | ObjectClass::FallenTrees | ObjectClass::Bushes => Some(50),
            ObjectClass::Grass => Some(GROUND_COVER_ATTEMPTS),
            ObjectClass::Cliffs => None,
        }
    }

    /// Default instance count for a map.
    pub fn count_for(self, config: &GenerationConfig) -> usize {
        if !config.has_area() {
            return 0;
        }
        if self == ObjectClass::Cliffs && !config.map_variant.has_cliffs() {
            return 0;
        }
        let size = config.map_size;
        let raw = match self.density() {
            Density::PerArea(divisor) => size * size / divisor,
            Density::PerSide(divisor) => size / divisor,
        };
        (raw.floor() as usize).min(self.class_cap())
    }
}

/// A single placed instance. Never mutated after generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    pub position: DVec3,
    pub kind: ObjectKind,
    pub rotation_y: f64,
    pub scale: f64,
}

/// Result of placing one class.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Placement {
    pub objects: Vec<PlacedObject>,
    /// Instances dropped after exhausting their attempt budget.
    pub skipped: usize,
}

/// Per-class outcome of a placement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    pub class: ObjectClass,
    pub requested: usize,
    pub placed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlacementReport {
    pub classes: Vec<ClassReport>,
}

impl PlacementReport {
    pub fn total_placed(&self) -> usize {
        self.classes.iter().map(|c| c.placed).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.classes.iter().map(|c| c.skipped).sum()
    }

    pub fn get(&self, class: ObjectClass) -> Option<&ClassReport> {
        self.classes.iter().find(|c| c.class == class)
    }
}

/// Draw candidates until one escapes every exclusion zone, giving up after
/// `max_attempts` draws.
pub fn rejection_sample<F>(
    max_attempts: u32,
    exclusions: &ExclusionZones<'_>,
    mut draw: F,
) -> Option<DVec2>
where
    F: FnMut() -> DVec2,
{
    (0..max_attempts)
        .map(|_| draw())
        .find(|&p| !exclusions.blocks(p))
}

/// Uniform point in the square `[-half, half]²`.
pub fn uniform_point(rng: &mut ChaCha8Rng, half: f64) -> DVec2 {
    DVec2::new(rng.random_range(-half..=half), rng.random_range(-half..=half))
}

// Cliffs sit on a ring at 60% of the half-size
fn ring_point(rng: &mut ChaCha8Rng, half: f64) -> DVec2 {
    let angle = rng.random_range(0.0..TAU);
    DVec2::new(angle.cos(), angle.sin()) * (half * 0.6)
}

/// Scatters objects over the map, resolving each accepted point's height
/// from the grid.
pub struct SpatialFeaturePlacer<'a> {
    grid: &'a HeightGrid,
}

impl<'a> SpatialFeaturePlacer<'a> {
    pub fn new(grid: &'a HeightGrid) -> Self {
        Self { grid }
    }

    /// Place up to `count` objects of `class`.
    pub fn place(
        &self,
        class: ObjectClass,
        count: usize,
        config: &GenerationConfig,
        exclusions: &ExclusionZones<'_>,
    ) -> Placement {
        if !config.has_area() || count == 0 {
            return Placement::default();
        }
        let mut rng = stage_rng(config.seed, class.stage());
        let half = config.half_size();

        let mut placement = Placement {
            objects: Vec::with_capacity(count),
            skipped: 0,
        };

        for _ in 0..count {
            let spot = match class.attempt_limit() {
                Some(limit) => rejection_sample(limit, exclusions, || uniform_point(&mut rng, half)),
                None => Some(ring_point(&mut rng, half)),
            };
            match spot {
                Some(p) => placement.objects.push(self.finish(class, p, &mut rng)),
                None => placement.skipped += 1,
            }
        }

        debug!(
            ?class,
            requested = count,
            placed = placement.objects.len(),
            skipped = placement.skipped,
            "class placed"
        );
        placement
    }

    /// Place every class at its default density for the map.
    pub fn populate(
        &self,
        config: &GenerationConfig,
        exclusions: &ExclusionZones<'_>,
    ) -> (Vec<PlacedObject>, PlacementReport) {
        let mut objects = Vec::new();
        let mut report = PlacementReport::default();
        for class in ObjectClass::ALL {
            let requested = class.count_for(config);
            let placement = self.place(class, requested, config, exclusions);
            report.classes.push(ClassReport {
                class,
                requested,
                placed: placement.objects.len(),
                skipped: placement.skipped,
            });
            objects.extend(placement.objects);
        }
        (objects, report)
    }

    fn finish(&self, class: ObjectClass, p: DVec2, rng: &mut ChaCha8Rng) -> PlacedObject {
        let ground = height_query(self.grid, p.x, p.y);
        let (kind, scale, rotation_y, lift) = match class {
            ObjectClass::Trees => {
                let species = TreeSpecies::ALL[rng.random_range(0..TreeSpecies::ALL.len())];
                let scale = rng.random_range(0.5..1.5);
                (ObjectKind::Tree(species), scale, rng.random_range(0.0..TAU), 0.0)
            }
            ObjectClass::Rocks => {
                // Rocks rest on the ground, lifted by their own size
                let scale = rng.random_range(0.3..2.3);
                (ObjectKind::Rock, scale, rng.random_range(0.0..PI), scale)
            }
            ObjectClass::FallenTrees => {
                let radius = rng.random_range(0.2..0.5);
                (ObjectKind::FallenTree, radius, rng.random_range(0.0..TAU), radius)
            }
            ObjectClass::Bushes => {
                let scale = rng.random_range(0.3..0.7);
                (ObjectKind::Bush, scale, rng.random_range(0.0..TAU), 0.0)
            }
            ObjectClass::Grass => {
                let scale = rng.random_range(0.5..1.0);
                (ObjectKind::Grass, scale, rng.random_range(0.0..TAU), 0.0)
            }
            ObjectClass::Cliffs => {
                // Face along the ring
                let angle = p.y.atan2(p.x);
                let width = rng.random_range(20.0..50.0);
                (ObjectKind::Cliff, width, angle + PI / 2.0, 0.0)
            }
        };
        PlacedObject {
            position: DVec3::new(p.x, ground + lift, p.y),
            kind,
            rotation_y,
            scale,
        }
    }
}
