use crate::NoiseGenerator;

// Approximate value of sqrt(3)
const SQRT_3: f64 = 1.732_050_807_568_877_293_5;
// Skewing/unskewing factors for the 2D simplex lattice
const F2: f64 = 0.5 * (SQRT_3 - 1.0);
const G2: f64 = (3.0 - SQRT_3) / 6.0;
// Brings the summed corner contributions to roughly [-1, 1]
const AMPLITUDE_SCALE: f64 = 70.0;

// Gradient directions, picked by hash % 12
const GRAD3: [(i8, i8); 12] = [
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
    (1, 0),
    (-1, 0),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (0, 1),
    (0, -1),
];

/// Seeded 2D simplex noise, the numeric primitive behind all terrain shaping.
///
/// A `NoiseField` is immutable once built, so a single instance can be sampled
/// from many threads at once.
#[derive(Clone)]
pub struct NoiseField {
    // 256 shuffled entries duplicated to 512 for wrap-free indexing
    perm: [u8; 512],
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        let mut p: Vec<u8> = (0..256).map(|i| i as u8).collect();
        let mut x = seed ^ 0x1234_5678_9ABC_DEF0_u64;
        // xorshift state must never be zero
        if x == 0 {
            x = 0x9E37_79B9_7F4A_7C15;
        }
        let mut rng = || {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        };
        for i in (1..256).rev() {
            let j = (rng() % (i as u64 + 1)) as usize;
            p.swap(i, j);
        }
        let mut perm = [0u8; 512];
        for i in 0..512 {
            perm[i] = p[i & 255];
        }

        Self { perm }
    }

    #[inline]
    fn dot(g: (i8, i8), x: f64, y: f64) -> f64 {
        (g.0 as f64) * x + (g.1 as f64) * y
    }

    // Squared-falloff kernel (0.5 - dx² - dy²)^4 times the gradient dot product
    #[inline]
    fn corner(gi: usize, x: f64, y: f64) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            return 0.0;
        }
        let t_sq = t * t;
        t_sq * t_sq * Self::dot(GRAD3[gi], x, y)
    }

    /// Raw noise at (xin, yin), roughly in [-1, 1].
    pub fn sample(&self, xin: f64, yin: f64) -> f64 {
        // Skew input space to find the simplex cell
        let s = (xin + yin) * F2;
        let i = (xin + s).floor() as i64;
        let j = (yin + s).floor() as i64;

        // Unskew back to get the offset from the cell origin
        let t = (i + j) as f64 * G2;
        let x0 = xin - (i as f64 - t);
        let y0 = yin - (j as f64 - t);

        // Lower or upper triangle of the rhombus
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        // Hash the three simplex corners
        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let gi0 = (self.perm[ii + self.perm[jj] as usize] as usize) % 12;
        let gi1 = (self.perm[ii + i1 + self.perm[jj + j1] as usize] as usize) % 12;
        let gi2 = (self.perm[ii + 1 + self.perm[jj + 1] as usize] as usize) % 12;

        let n0 = Self::corner(gi0, x0, y0);
        let n1 = Self::corner(gi1, x1, y1);
        let n2 = Self::corner(gi2, x2, y2);

        AMPLITUDE_SCALE * (n0 + n1 + n2)
    }
}

impl NoiseGenerator for NoiseField {
    fn get2(&self, x: f64, y: f64) -> f64 {
        self.sample(x, y)
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").finish_non_exhaustive()
    }
}
