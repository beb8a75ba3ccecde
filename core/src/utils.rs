// 2D height map: row‐major Vec<Vec<f32>>, rows follow +z and columns +x
// access as `map[row][col]`.
pub type HeightMap2D = Vec<Vec<f32>>;

// Min and max over every sample, None for an empty map
pub fn min_max2(map: &HeightMap2D) -> Option<(f32, f32)> {
    let mut values = map.iter().flatten().copied();
    let first = values.next()?;
    Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

// Copy of the map rescaled to [0, 1]
pub fn normalized2(map: &HeightMap2D) -> HeightMap2D {
    let Some((min, max)) = min_max2(map) else {
        return Vec::new();
    };
    let range = (max - min).max(0.001); // prevent zero-division
    map.iter()
        .map(|row| row.iter().map(|&v| (v - min) / range).collect())
        .collect()
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(hash: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(hash, |h, &b| (h ^ b as u64).wrapping_mul(FNV_PRIME))
}

// FNV-1a over the bit patterns of every sample, row-major
// Two maps hash equal only if they are bit-identical
pub fn checksum2(map: &HeightMap2D) -> u64 {
    map.iter()
        .flatten()
        .fold(FNV_OFFSET, |h, v| fnv1a(h, &v.to_bits().to_le_bytes()))
}

// FNV-1a over the bit patterns of a sequence of coordinates
pub fn checksum_f64(values: impl IntoIterator<Item = f64>) -> u64 {
    values
        .into_iter()
        .fold(FNV_OFFSET, |h, v| fnv1a(h, &v.to_bits().to_le_bytes()))
}
