//! Heightfield synthesis: layered noise octaves plus radial and valley shaping.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::NoiseGenerator;
use crate::config::GenerationConfig;
use crate::noise_field::NoiseField;
use crate::utils::HeightMap2D;

/// Sampled terrain elevation over a square domain centred on the origin.
///
/// Rows run along +z and columns along +x; there are `segments + 1` samples
/// per axis. Every stored value is `>= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightGrid {
    map_size: f64,
    segments: u32,
    rows: HeightMap2D,
}

impl HeightGrid {
    /// A grid with no samples. Every query against it returns 0.
    pub fn empty() -> Self {
        Self {
            map_size: 0.0,
            segments: 0,
            rows: Vec::new(),
        }
    }

    /// A flat grid at constant `height`, clamped to `>= 0`.
    pub fn filled(map_size: f64, segments: u32, height: f32) -> Self {
        let n = segments as usize + 1;
        Self {
            map_size,
            segments,
            rows: vec![vec![height.max(0.0); n]; n],
        }
    }

    pub fn map_size(&self) -> f64 {
        self.map_size
    }

    pub fn half_size(&self) -> f64 {
        self.map_size / 2.0
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Samples per axis (`segments + 1`), 0 for an empty grid.
    pub fn resolution(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn rows(&self) -> &HeightMap2D {
        &self.rows
    }

    /// World-plane coordinate of a grid index along either axis.
    pub fn world_coord(&self, index: usize) -> f64 {
        -self.half_size() + index as f64 * self.cell_size()
    }

    pub fn cell_size(&self) -> f64 {
        if self.segments == 0 {
            return 0.0;
        }
        self.map_size / self.segments as f64
    }
}

/// Constants shaping the relief. The defaults give rolling forest terrain
/// with a raised centre and occasional carved valleys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainShape {
    /// Frequency of the first octave, in cycles per meter.
    pub base_frequency: f64,
    /// Weights of the base, ×2 and ×4 frequency octaves.
    pub octave_weights: [f64; 3],
    /// Height of the exponential rise toward the map centre.
    pub central_bump: f64,
    /// Fraction of the half-size that receives the plateau bonus.
    pub plateau_radius: f64,
    pub plateau_bonus: f64,
    pub valley_frequency: f64,
    /// Valley noise below this value carves the terrain.
    pub valley_threshold: f64,
    pub valley_depth: f64,
}

impl Default for TerrainShape {
    fn default() -> Self {
        Self {
            base_frequency: 0.005,
            octave_weights: [20.0, 10.0, 5.0],
            central_bump: 10.0,
            plateau_radius: 0.3,
            plateau_bonus: 3.0,
            valley_frequency: 0.003,
            valley_threshold: -0.3,
            valley_depth: 5.0,
        }
    }
}

/// Builds a [`HeightGrid`] from a seeded [`NoiseField`].
#[derive(Debug, Clone)]
pub struct HeightfieldGenerator {
    noise: NoiseField,
    shape: TerrainShape,
}

impl HeightfieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            noise: NoiseField::new(seed),
            shape: TerrainShape::default(),
        }
    }

    pub fn with_shape(mut self, shape: TerrainShape) -> Self {
        self.shape = shape;
        self
    }

    /// Elevation at world coordinates (x, z) on a map of the given half-size.
    ///
    /// A pure function of the seed and its arguments, clamped to `>= 0`.
    pub fn height_at(&self, x: f64, z: f64, half_size: f64) -> f64 {
        let s = &self.shape;
        let mut height = 0.0;

        // Fractal octaves: frequency doubles, weight halves
        let mut freq = s.base_frequency;
        for weight in s.octave_weights {
            height += self.noise.get2(x * freq, z * freq) * weight;
            freq *= 2.0;
        }

        let distance_from_center = (x * x + z * z).sqrt();
        height += (-distance_from_center / half_size).exp() * s.central_bump;

        if distance_from_center < half_size * s.plateau_radius {
            height += s.plateau_bonus;
        }

        let valley = self
            .noise
            .get2(x * s.valley_frequency, z * s.valley_frequency);
        if valley < s.valley_threshold {
            height -= s.valley_depth * valley.abs();
        }

        height.max(0.0)
    }

    /// Sample the full grid. Rows are evaluated in parallel; the result is
    /// bit-identical to a serial evaluation.
    pub fn generate(&self, config: &GenerationConfig) -> HeightGrid {
        if !config.has_area() || config.segments == 0 {
            return HeightGrid::empty();
        }

        let map_size = config.map_size;
        let half = map_size / 2.0;
        let segments = config.segments;
        let step = map_size / segments as f64;
        let n = segments as usize + 1;

        let rows: HeightMap2D = (0..n)
            .into_par_iter()
            .map(|row| {
                let z = -half + row as f64 * step;
                (0..n)
                    .map(|col| {
                        let x = -half + col as f64 * step;
                        self.height_at(x, z, half) as f32
                    })
                    .collect()
            })
            .collect();

        debug!(samples = n * n, map_size, "heightfield sampled");

        HeightGrid {
            map_size,
            segments,
            rows,
        }
    }
}
