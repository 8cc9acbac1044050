use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, StandardUniform};

/// Source of randomness for the simulator.
#[derive(Debug, Clone)]
pub struct Roller {
    rng: StdRng,
}

impl Roller {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let rng = StdRng::from_os_rng();
        Roller { rng }
    }

    /// Creates a new `Roller` instance with a different random seed, drawn
    /// from this one. Useful for running independent simulations in parallel.
    pub fn fork(&mut self) -> Self {
        let mut seed = [0u8; 32];
        self.rng.fill(&mut seed);
        let rng = StdRng::from_seed(seed);
        Roller { rng }
    }

    pub fn from_seed(seed: u64) -> Self {
        let rng = StdRng::seed_from_u64(seed);
        Roller { rng }
    }

    /// Uniform draw from `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        StandardUniform.sample(&mut self.rng)
    }

    #[cfg(test)]
    pub fn test_rng() -> Self {
        Self::from_seed(42)
    }
}
