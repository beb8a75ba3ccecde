use std::f64::consts::TAU;

use glam::{DVec2, DVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GenerationConfig;
use crate::geometry::{height_query, planar};
use crate::heightfield::HeightGrid;
use crate::paths::ExclusionZones;
use crate::placement::{rejection_sample, uniform_point};
use crate::seed::{Stage, stage_rng};

// Planar capture distance
pub const CAPTURE_RADIUS: f64 = 8.0;
pub const CHECKPOINT_ATTEMPTS: u32 = 100;
const MAX_DIFFICULTY: f64 = 5.0;

// Only `collected` changes after generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    // 1-based
    pub id: u32,
    pub position: DVec3,
    pub collected: bool,
    pub name: String,
    pub difficulty: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointState {
    NotReached,
    Current,
    Collected,
}

impl Checkpoint {
    pub fn state(&self, index: usize, current_index: usize) -> CheckpointState {
        if self.collected {
            CheckpointState::Collected
        } else if index == current_index {
            CheckpointState::Current
        } else {
            CheckpointState::NotReached
        }
    }
}

// Aim radius for checkpoint `index`, non-decreasing so courses spiral outward
pub fn target_radius(index: usize, count: usize, half_size: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let t = index as f64 / count as f64;
    half_size * 0.7 * (0.3 + 0.7 * t)
}

pub struct CheckpointPlanner<'a> {
    grid: &'a HeightGrid,
}

impl<'a> CheckpointPlanner<'a> {
    pub fn new(grid: &'a HeightGrid) -> Self {
        Self { grid }
    }

    /// Exactly `config.checkpoint_count` checkpoints, ids `1..=N`. An index
    /// whose jittered draws all land in a zone falls back to one
    /// unconstrained draw.
    pub fn plan(&self, config: &GenerationConfig, exclusions: &ExclusionZones<'_>) -> Vec<Checkpoint> {
        let count = config.checkpoint_count as usize;
        if !config.has_area() || count == 0 {
            return Vec::new();
        }
        let mut rng = stage_rng(config.seed, Stage::Checkpoints);
        let half = config.half_size();
        let jitter = half * 0.1;
        let base = config.map_variant.difficulty().base_rating();

        let mut fallbacks = 0usize;
        let mut checkpoints = Vec::with_capacity(count);
        for i in 0..count {
            let angle = (i as f64 / count as f64) * TAU;
            let target = DVec2::new(angle.cos(), angle.sin()) * target_radius(i, count, half);

            let spot = rejection_sample(CHECKPOINT_ATTEMPTS, exclusions, || {
                target
                    + DVec2::new(
                        rng.random_range(-jitter..=jitter),
                        rng.random_range(-jitter..=jitter),
                    )
            });
            let p = match spot {
                Some(p) => p,
                None => {
                    fallbacks += 1;
                    uniform_point(&mut rng, half)
                }
            };

            let id = i as u32 + 1;
            let difficulty = (base + (i as f64 / count as f64) * 0.5).min(MAX_DIFFICULTY);
            checkpoints.push(Checkpoint {
                id,
                position: DVec3::new(p.x, height_query(self.grid, p.x, p.y), p.y),
                collected: false,
                name: format!("CP {id}"),
                difficulty,
            });
        }

        if fallbacks > 0 {
            warn!(fallbacks, "checkpoints placed without exclusion constraints");
        }
        debug!(count = checkpoints.len(), "checkpoints planned");
        checkpoints
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub new_index: usize,
    pub just_collected: bool,
    // final checkpoint captured on this call
    pub run_complete: bool,
}

impl Advance {
    pub fn as_tuple(self) -> (usize, bool) {
        (self.new_index, self.just_collected)
    }
}

/// Capture the current checkpoint if the player is within `capture_radius`
/// of it on the (x, z) plane. An index past the end changes nothing.
pub fn advance_checkpoint(
    checkpoints: &mut [Checkpoint],
    current_index: usize,
    player_pos: DVec3,
    capture_radius: f64,
) -> Advance {
    let unchanged = Advance {
        new_index: current_index,
        just_collected: false,
        run_complete: false,
    };
    let Some(current) = checkpoints.get_mut(current_index) else {
        return unchanged;
    };
    if current.collected || planar(current.position).distance(planar(player_pos)) >= capture_radius {
        return unchanged;
    }

    current.collected = true;
    let new_index = current_index + 1;
    let run_complete = new_index == checkpoints.len();
    debug!(id = current_index + 1, run_complete, "checkpoint collected");
    Advance {
        new_index,
        just_collected: true,
        run_complete,
    }
}

pub fn course_length(checkpoints: &[Checkpoint], start: DVec2) -> f64 {
    checkpoints
        .iter()
        .fold((start, 0.0), |(from, total), cp| {
            let to = planar(cp.position);
            (to, total + from.distance(to))
        })
        .1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapVariant;
    use crate::heightfield::HeightfieldGenerator;
    use crate::paths::{CircularFeature, FeatureKind};

    fn config(map_size: f64, checkpoint_count: u32) -> GenerationConfig {
        GenerationConfig {
            seed: 7,
            map_size,
            segments: 32,
            checkpoint_count,
            map_variant: MapVariant::ForestPark,
        }
    }

    fn checkpoint(id: u32, x: f64, z: f64) -> Checkpoint {
        Checkpoint {
            id,
            position: DVec3::new(x, 0.0, z),
            collected: false,
            name: format!("CP {id}"),
            difficulty: 1.0,
        }
    }

    #[test]
    fn radius_grows_with_index() {
        let radii: Vec<f64> = (0..10).map(|i| target_radius(i, 10, 100.0)).collect();
        assert!(radii.windows(2).all(|w| w[0] <= w[1]));
        assert!((radii[0] - 21.0).abs() < 1e-12);
        assert_eq!(target_radius(0, 0, 100.0), 0.0);
    }

    #[test]
    fn plans_exact_count_with_names() {
        let cfg = config(200.0, 6);
        let grid = HeightfieldGenerator::new(cfg.seed).generate(&cfg);
        let cps = CheckpointPlanner::new(&grid).plan(&cfg, &ExclusionZones::new());
        assert_eq!(cps.len(), 6);
        for (i, cp) in cps.iter().enumerate() {
            assert_eq!(cp.id as usize, i + 1);
            assert_eq!(cp.name, format!("CP {}", i + 1));
            assert!(!cp.collected);
            assert!(cp.difficulty >= 1.0 && cp.difficulty < 1.5);
        }
    }

    #[test]
    fn fallback_keeps_cardinality_under_full_exclusion() {
        let cfg = config(100.0, 4);
        let grid = HeightfieldGenerator::new(cfg.seed).generate(&cfg);
        let flood = [CircularFeature {
            center: DVec2::ZERO,
            radius: 500.0,
            kind: FeatureKind::Pool,
            elevation: 0.0,
        }];
        let zones = ExclusionZones::new().with_circles(&flood);
        let cps = CheckpointPlanner::new(&grid).plan(&cfg, &zones);
        assert_eq!(cps.len(), 4);
        assert!(cps.iter().all(|c| c.position.x.abs() <= 50.0 && c.position.z.abs() <= 50.0));
    }

    #[test]
    fn no_area_or_count_means_no_course() {
        let grid = HeightGrid::empty();
        let planner = CheckpointPlanner::new(&grid);
        assert!(planner.plan(&config(0.0, 5), &ExclusionZones::new()).is_empty());
        assert!(planner.plan(&config(200.0, 0), &ExclusionZones::new()).is_empty());
    }

    #[test]
    fn capture_advances_and_completes() {
        let mut cps = vec![checkpoint(1, 10.0, 0.0), checkpoint(2, 40.0, 0.0)];

        let miss = advance_checkpoint(&mut cps, 0, DVec3::new(30.0, 0.0, 0.0), CAPTURE_RADIUS);
        assert_eq!(miss.as_tuple(), (0, false));

        // Height difference does not matter
        let hit = advance_checkpoint(&mut cps, 0, DVec3::new(12.0, 50.0, 3.0), CAPTURE_RADIUS);
        assert_eq!(hit.as_tuple(), (1, true));
        assert!(!hit.run_complete);
        assert_eq!(cps[0].state(0, 1), CheckpointState::Collected);
        assert_eq!(cps[1].state(1, 1), CheckpointState::Current);

        let last = advance_checkpoint(&mut cps, 1, DVec3::new(40.0, 0.0, 0.0), CAPTURE_RADIUS);
        assert_eq!(last.as_tuple(), (2, true));
        assert!(last.run_complete);

        let after = advance_checkpoint(&mut cps, 2, DVec3::new(40.0, 0.0, 0.0), CAPTURE_RADIUS);
        assert_eq!(after.as_tuple(), (2, false));
        assert!(!after.run_complete);
    }

    #[test]
    fn out_of_order_checkpoints_stay_not_reached() {
        let cps = [checkpoint(1, 0.0, 0.0), checkpoint(2, 5.0, 0.0)];
        assert_eq!(cps[1].state(1, 0), CheckpointState::NotReached);
    }

    #[test]
    fn course_length_sums_legs() {
        let cps = [checkpoint(1, 3.0, 4.0), checkpoint(2, 3.0, 10.0)];
        assert_eq!(course_length(&cps, DVec2::ZERO), 11.0);
        assert_eq!(course_length(&[], DVec2::ZERO), 0.0);
    }
}
