// src/analysis/engine.rs
use rand::prelude::*;
use rand_distr::StandardNormal;

/// Seedable source of Gaussian variates.
///
/// An engine always knows its seed: when none is supplied one is drawn from
/// OS entropy, so an unseeded run can still be replayed from its logs.
#[derive(Debug, Clone)]
pub struct RandomVariateEngine {
    seed: u64,
    rng: StdRng,
}

impl RandomVariateEngine {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| StdRng::from_entropy().gen());
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    // Restarts the stream; same semantics as `new`
    pub fn initialize(&mut self, seed: Option<u64>) {
        *self = Self::new(seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw from N(mean, std_dev). A zero width always returns `mean`.
    pub fn sample(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev == 0.0 {
            return mean;
        }
        let z: f64 = self.rng.sample(StandardNormal);
        mean + std_dev * z
    }

    /// Independent engine for one (bin, source) pair.
    ///
    /// The child seed depends only on this engine's seed, the bin index and
    /// the source name, never on how far this engine's own stream has advanced.
    pub fn substream(&self, bin_index: usize, source_name: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(&(bin_index as u64).to_le_bytes());
        hasher.update(source_name.as_bytes());
        let hash = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        Self::seeded(u64::from_le_bytes(bytes))
    }
}
