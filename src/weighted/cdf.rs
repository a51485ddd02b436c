use super::{validate_weights, Categorical};
use crate::error::{Error, Result};
use rand::Rng;

/// Inverse-CDF sampler: prefix sums plus a binary search per draw.
///
/// Without replacement it uses the same reject-then-rebuild policy as
/// [`super::AliasSampler`].
#[derive(Debug, Clone)]
pub struct CdfSampler {
    replace: bool,
    weights: Vec<f64>,
    used: Vec<bool>,
    active: Vec<usize>,
    /// `cdf[0] == 0`, `cdf[k + 1] == cdf[k] + weights[active[k]]`.
    cdf: Vec<f64>,
    taken: f64,
}

impl CdfSampler {
    /// # Errors
    ///
    /// Returns [`Error::InvalidWeight`] for a NaN, infinite, or negative weight
    /// and [`Error::WeightSumOverflow`] when the total is not finite.
    pub fn new(weights: &[f64], replace: bool) -> Result<Self> {
        let mut s = Self {
            replace,
            weights: Vec::new(),
            used: Vec::new(),
            active: Vec::new(),
            cdf: vec![0.0],
            taken: 0.0,
        };
        s.reset_state(weights)?;
        Ok(s)
    }

    fn accum(&self) -> f64 {
        self.cdf[self.cdf.len() - 1]
    }

    fn rebuild(&mut self) {
        self.active.clear();
        self.cdf.clear();
        self.cdf.push(0.0);
        self.taken = 0.0;
        let mut accum = 0.0;
        for (i, (&w, &used)) in self.weights.iter().zip(&self.used).enumerate() {
            if !used && w > 0.0 {
                accum += w;
                self.active.push(i);
                self.cdf.push(accum);
            }
        }
    }

    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let u = rng.random_range(0.0..self.accum());
        // Last prefix sum <= u. `cdf[0] == 0 <= u`, so the position is >= 1.
        let pos = self.cdf.partition_point(|&c| c <= u);
        self.active[(pos - 1).min(self.active.len() - 1)]
    }
}

impl Categorical for CdfSampler {
    fn reset_state(&mut self, weights: &[f64]) -> Result<()> {
        validate_weights(weights)?;
        self.weights.clear();
        self.weights.extend_from_slice(weights);
        self.used.clear();
        self.used.resize(weights.len(), false);
        self.rebuild();
        Ok(())
    }

    fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize> {
        if self.replace {
            if self.active.is_empty() {
                return Err(Error::PopulationExhausted);
            }
            return Ok(self.pick(rng));
        }

        if self.active.is_empty() || 2.0 * self.taken >= self.accum() {
            self.rebuild();
        }
        if self.active.is_empty() {
            return Err(Error::PopulationExhausted);
        }
        loop {
            let i = self.pick(rng);
            if !self.used[i] {
                self.used[i] = true;
                self.taken += self.weights[i];
                return Ok(i);
            }
        }
    }

    fn len(&self) -> usize {
        self.weights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn prefix_sums_skip_zero_weights() {
        let s = CdfSampler::new(&[2.0, 0.0, 1.0, 3.0], true).unwrap();
        assert_eq!(s.cdf, vec![0.0, 2.0, 3.0, 6.0]);
        assert_eq!(s.active, vec![0, 2, 3]);
    }

    #[test]
    fn rebuild_after_half_the_mass() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut s = CdfSampler::new(&[1.0; 8], false).unwrap();
        for _ in 0..4 {
            s.draw(&mut rng).unwrap();
        }
        assert_eq!(s.active.len(), 8);
        s.draw(&mut rng).unwrap();
        // Rebuilt over the four survivors before the fifth draw.
        assert_eq!(s.active.len(), 4);
        assert!(s.active.iter().all(|&i| i < 8));
    }
}
