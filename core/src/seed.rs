//! Per-stage random streams.
//!
//! Each pipeline stage draws from its own ChaCha stream of the world seed,
//! so adding draws in one stage never shifts the output of another. Stream
//! ids are fixed numbers: reordering `Stage` must not renumber them.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Pipeline stages that consume random draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Roads = 1,
    Rivers = 2,
    Trees = 3,
    Rocks = 4,
    Cliffs = 5,
    FallenTrees = 6,
    Bushes = 7,
    Grass = 8,
    Checkpoints = 9,
}

impl Stage {
    pub fn stream(self) -> u64 {
        self as u64
    }
}

/// Deterministic RNG for one stage of one world.
pub fn stage_rng(world_seed: u64, stage: Stage) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(world_seed);
    rng.set_stream(stage.stream());
    rng
}
