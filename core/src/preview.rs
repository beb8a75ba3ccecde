//! Top-down map preview for inspecting generated worlds.
//!
//! The image is north-up: image row 0 is the +z edge of the map and column
//! 0 the -x edge.

use std::path::Path;

use glam::DVec2;
use image::{Rgb, RgbImage};
use palette::{Gradient, LinSrgb};
use tracing::info;

use crate::error::PreviewError;
use crate::geometry::{height_query, planar};
use crate::placement::ObjectKind;
use crate::utils::{HeightMap2D, normalized2};
use crate::world::WorldData;

const WATER: Rgb<u8> = Rgb([40, 90, 200]);
const ROAD: Rgb<u8> = Rgb([150, 105, 60]);
const STONE: Rgb<u8> = Rgb([60, 60, 60]);
const CHECKPOINT: Rgb<u8> = Rgb([255, 140, 0]);

/// Maps pixel indices to world coordinates and back.
#[derive(Debug, Clone, Copy)]
struct Projection {
    half: f64,
    step: f64,
    pixels: u32,
}

impl Projection {
    fn new(map_size: f64, pixels: u32) -> Self {
        Self {
            half: map_size / 2.0,
            step: map_size / pixels as f64,
            pixels,
        }
    }

    // Centre of the pixel in world space
    fn to_world(self, px: u32, py: u32) -> DVec2 {
        DVec2::new(
            -self.half + (px as f64 + 0.5) * self.step,
            self.half - (py as f64 + 0.5) * self.step,
        )
    }

    fn to_pixel(self, p: DVec2) -> Option<(u32, u32)> {
        if self.step <= 0.0 {
            return None;
        }
        let px = ((p.x + self.half) / self.step).floor();
        let py = ((self.half - p.y) / self.step).floor();
        let limit = self.pixels as f64;
        if (0.0..limit).contains(&px) && (0.0..limit).contains(&py) {
            Some((px as u32, py as u32))
        } else {
            None
        }
    }
}

// Lambertian shading with the light at 45° azimuth and altitude
fn hillshade(map: &HeightMap2D, z_scale: f32) -> Vec<Vec<f32>> {
    let h = map.len();
    let w = map.first().map_or(0, Vec::len);
    let mut shade = vec![vec![1.0; w]; h];
    if h < 3 || w < 3 {
        return shade;
    }
    let azimuth = std::f32::consts::FRAC_PI_4;
    let altitude = std::f32::consts::FRAC_PI_4;
    let (sin_alt, cos_alt) = altitude.sin_cos();
    let (lx, ly, lz) = (azimuth.cos() * cos_alt, azimuth.sin() * cos_alt, sin_alt);

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let dzdx = ((map[y][x + 1] - map[y][x - 1]) / 2.0) * z_scale;
            let dzdy = ((map[y + 1][x] - map[y - 1][x]) / 2.0) * z_scale;
            let (nx, ny, nz) = (-dzdx, -dzdy, 1.0f32);
            let len = (nx * nx + ny * ny + nz * nz).sqrt();
            shade[y][x] = ((nx * lx + ny * ly + nz * lz) / len).max(0.0);
        }
    }
    shade
}

fn fill_disc(img: &mut RgbImage, cx: u32, cy: u32, radius: u32, color: Rgb<u8>) {
    let r = radius as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let (x, y) = (cx as i64 + dx, cy as i64 + dy);
            if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Render a `pixels × pixels` hill-shaded elevation map with water, roads,
/// rocks, cliffs and checkpoints drawn on top.
pub fn render_map(world: &WorldData, pixels: u32) -> Result<RgbImage, PreviewError> {
    if pixels < 2 {
        return Err(PreviewError::TooSmall(pixels));
    }
    let grid = &world.height_grid;
    let proj = Projection::new(grid.map_size(), pixels);

    let heights: HeightMap2D = (0..pixels)
        .map(|py| {
            (0..pixels)
                .map(|px| {
                    let p = proj.to_world(px, py);
                    height_query(grid, p.x, p.y) as f32
                })
                .collect()
        })
        .collect();

    // Exaggerate relief so gentle hills still read at small sizes
    let z_scale = (pixels as f64 / grid.map_size().max(1.0)) as f32 * 2.0;
    let shade = hillshade(&heights, z_scale.max(1.0));
    let norm = normalized2(&heights);

    let gradient = Gradient::with_domain(vec![
        (0.00, LinSrgb::new(0.35, 0.40, 0.25)), // marsh
        (0.35, LinSrgb::new(0.15, 0.45, 0.15)), // forest floor
        (0.70, LinSrgb::new(0.40, 0.50, 0.25)), // open hillside
        (1.00, LinSrgb::new(0.60, 0.55, 0.50)), // bare rock
    ]);

    let mut img = RgbImage::new(pixels, pixels);
    for (py, row) in norm.iter().enumerate() {
        for (px, &h) in row.iter().enumerate() {
            let p = proj.to_world(px as u32, py as u32);
            let color = if world.rivers.iter().any(|r| r.contains(p))
                || world.pools.iter().any(|c| c.contains(p))
            {
                WATER
            } else if world.roads.iter().any(|r| r.contains(p)) {
                ROAD
            } else {
                let col: LinSrgb = gradient.get(h);
                let rgb = col.into_format::<u8>();
                let light = (shade[py][px] * 0.5 + 0.5).clamp(0.0, 1.0);
                Rgb([
                    (rgb.red as f32 * light) as u8,
                    (rgb.green as f32 * light) as u8,
                    (rgb.blue as f32 * light) as u8,
                ])
            };
            img.put_pixel(px as u32, py as u32, color);
        }
    }

    for object in &world.objects {
        if matches!(object.kind, ObjectKind::Rock | ObjectKind::Cliff) {
            if let Some((x, y)) = proj.to_pixel(planar(object.position)) {
                img.put_pixel(x, y, STONE);
            }
        }
    }

    let marker = (pixels / 100).max(2);
    for cp in &world.checkpoints {
        if let Some((x, y)) = proj.to_pixel(planar(cp.position)) {
            fill_disc(&mut img, x, y, marker, CHECKPOINT);
        }
    }

    Ok(img)
}

/// Render and write the preview; the format follows the file extension.
pub fn save_map<P: AsRef<Path>>(world: &WorldData, pixels: u32, path: P) -> Result<(), PreviewError> {
    let img = render_map(world, pixels)?;
    img.save(path.as_ref())?;
    info!(path = %path.as_ref().display(), pixels, "map preview saved");
    Ok(())
}
