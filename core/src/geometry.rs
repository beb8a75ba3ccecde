//! Stateless navigation geometry over the world plane.
//!
//! Planar points are `DVec2` with `x` = world x and `y` = world z.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::heightfield::HeightGrid;

/// Offset used for the central-difference slope estimate.
const SLOPE_PROBE: f64 = 0.5;

/// Project a 3D world position onto the (x, z) plane.
#[inline]
pub fn planar(p: DVec3) -> DVec2 {
    DVec2::new(p.x, p.z)
}

#[inline]
pub fn planar_distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Distance from `p` to the closest point of segment `ab`.
///
/// A degenerate segment (`a == b`) reduces to the distance to `a`.
pub fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Compass bearing from `from` to `to` in degrees, in `[0, 360)`.
///
/// 0° points along +z and 90° along +x.
pub fn bearing(from: DVec2, to: DVec2) -> f64 {
    let d = to - from;
    let degrees = d.x.atan2(d.y).to_degrees();
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Terrain inclination at (x, z) in degrees, from a central difference of
/// the height function at ±0.5 m on both axes.
pub fn slope<F>(height: F, x: f64, z: f64) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    let span = 2.0 * SLOPE_PROBE;
    let gx = (height(x + SLOPE_PROBE, z) - height(x - SLOPE_PROBE, z)) / span;
    let gz = (height(x, z + SLOPE_PROBE) - height(x, z - SLOPE_PROBE)) / span;
    (gx * gx + gz * gz).sqrt().atan().to_degrees()
}

/// O(1) nearest-sample height lookup. Returns 0 outside the grid.
pub fn height_query(grid: &HeightGrid, x: f64, z: f64) -> f64 {
    if grid.is_empty() {
        return 0.0;
    }
    let size = grid.map_size();
    let half = grid.half_size();
    let u = (x + half) / size;
    let v = (z + half) / size;
    // Also rejects NaN
    if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
        return 0.0;
    }
    let segments = grid.segments() as f64;
    let col = (u * segments).round() as usize;
    let row = (v * segments).round() as usize;
    grid.get(row, col).map_or(0.0, f64::from)
}

/// Eight-way compass rose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassPoint {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassPoint {
    const ROSE: [CompassPoint; 8] = [
        CompassPoint::N,
        CompassPoint::NE,
        CompassPoint::E,
        CompassPoint::SE,
        CompassPoint::S,
        CompassPoint::SW,
        CompassPoint::W,
        CompassPoint::NW,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CompassPoint::N => "north",
            CompassPoint::NE => "north-east",
            CompassPoint::E => "east",
            CompassPoint::SE => "south-east",
            CompassPoint::S => "south",
            CompassPoint::SW => "south-west",
            CompassPoint::W => "west",
            CompassPoint::NW => "north-west",
        }
    }
}

/// Nearest of the eight compass points to a bearing in degrees.
pub fn compass_point(bearing_deg: f64) -> CompassPoint {
    let sector = (bearing_deg.rem_euclid(360.0) / 45.0).round() as usize % 8;
    CompassPoint::ROSE[sector]
}

/// Direction of a target relative to the way the player is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeDirection {
    Ahead,
    AheadRight,
    Right,
    BehindRight,
    Behind,
    BehindLeft,
    Left,
    AheadLeft,
}

/// Classify a target bearing against the player's heading, both in degrees.
/// Sectors are 45° wide and centred on straight ahead.
pub fn relative_direction(target_bearing: f64, heading: f64) -> RelativeDirection {
    let rel = (target_bearing - heading).rem_euclid(360.0);
    match rel {
        r if !(22.5..337.5).contains(&r) => RelativeDirection::Ahead,
        r if r < 67.5 => RelativeDirection::AheadRight,
        r if r < 112.5 => RelativeDirection::Right,
        r if r < 157.5 => RelativeDirection::BehindRight,
        r if r < 202.5 => RelativeDirection::Behind,
        r if r < 247.5 => RelativeDirection::BehindLeft,
        r if r < 292.5 => RelativeDirection::Left,
        _ => RelativeDirection::AheadLeft,
    }
}
