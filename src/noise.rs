//! The source of the Wiener process increments which perturb vehicle speeds.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

/// A seeded stream of standard normal samples.
///
/// Each simulation owns its own source, so identically seeded simulations
/// produce identical trajectories regardless of what else is running.
#[derive(Clone, Debug)]
pub struct NoiseSource {
    seed: u64,
    rng: ChaCha8Rng,
}

impl NoiseSource {
    /// Creates a noise source from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The seed the source was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws a single standard normal sample.
    pub fn sample(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }

    /// Overwrites `out` with independent standard normal samples.
    pub fn fill(&mut self, out: &mut [f64]) {
        for value in out {
            *value = self.sample();
        }
    }
}

#[cfg(test)]
mod test {
    use super::NoiseSource;

    #[test]
    fn same_seed_same_stream() {
        let mut a = NoiseSource::new(7);
        let mut b = NoiseSource::new(7);
        let mut xs = [0.0; 16];
        let mut ys = [0.0; 16];
        a.fill(&mut xs);
        b.fill(&mut ys);
        assert_eq!(xs, ys);
    }

    #[test]
    fn different_seeds_differ() {
        let mut a = NoiseSource::new(1);
        let mut b = NoiseSource::new(2);
        let xs: Vec<f64> = (0..8).map(|_| a.sample()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.sample()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn roughly_standard_normal() {
        let mut source = NoiseSource::new(0);
        let mut samples = vec![0.0; 20_000];
        source.fill(&mut samples);
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.05);
        assert!((var - 1.0).abs() < 0.05);
    }
}
