//! Weighted categorical sampling.
//!
//! Three interchangeable strategies draw an index `i` with probability
//! `w_i / sum(w)`:
//!
//! | strategy | build | draw (with replacement) | draw (without) |
//! |---|---|---|---|
//! | [`AliasSampler`] | O(n) | O(1) | amortized O(log n) |
//! | [`CdfSampler`] | O(n) | O(log n) | amortized O(log n) |
//! | [`TreeSampler`] | O(n) | O(log n) | O(log n) |
//!
//! Without replacement, an index is returned at most once until the next
//! [`Categorical::reset_state`]. Zero-weight items are never returned and do
//! not count toward the population.
//!
//! ## References
//!
//! - Walker (1977); Vose (1991): the alias method.
//! - Wong & Easton (1980): sum trees for dynamic weighted sampling.

mod alias;
mod cdf;
mod tree;

pub use alias::AliasSampler;
pub use cdf::CdfSampler;
pub use tree::TreeSampler;

use crate::error::{Error, Result};
use rand::Rng;

/// Common contract of the categorical samplers.
pub trait Categorical {
    /// Rebuild from `weights`, forgetting which items were already drawn.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWeight`] for a NaN, infinite, or negative weight
    /// and [`Error::WeightSumOverflow`] when the weights do not sum to a finite value.
    fn reset_state(&mut self, weights: &[f64]) -> Result<()>;

    /// Draw one index in `0..len()`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PopulationExhausted`] when no positive-weight item is
    /// left to draw.
    fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize>;

    /// Size of the weight sequence the sampler was built over.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Draw `k` indices in draw order.
    ///
    /// # Errors
    ///
    /// Propagates the first failing [`Categorical::draw`].
    fn draw_many<R: Rng + ?Sized>(&mut self, k: usize, rng: &mut R) -> Result<Vec<usize>> {
        (0..k).map(|_| self.draw(rng)).collect()
    }
}

/// Which strategy a [`WeightedSampler`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SamplerKind {
    #[default]
    Alias,
    Cdf,
    Tree,
}

/// A sampler whose strategy is picked at construction time.
#[derive(Debug, Clone)]
pub enum WeightedSampler {
    Alias(AliasSampler),
    Cdf(CdfSampler),
    Tree(TreeSampler),
}

impl WeightedSampler {
    /// Build a sampler of the given `kind` over `weights`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWeight`] for a NaN, infinite, or negative weight
    /// and [`Error::WeightSumOverflow`] when the total is not finite.
    pub fn new(kind: SamplerKind, weights: &[f64], replace: bool) -> Result<Self> {
        Ok(match kind {
            SamplerKind::Alias => Self::Alias(AliasSampler::new(weights, replace)?),
            SamplerKind::Cdf => Self::Cdf(CdfSampler::new(weights, replace)?),
            SamplerKind::Tree => Self::Tree(TreeSampler::new(weights, replace)?),
        })
    }

    pub fn kind(&self) -> SamplerKind {
        match self {
            Self::Alias(_) => SamplerKind::Alias,
            Self::Cdf(_) => SamplerKind::Cdf,
            Self::Tree(_) => SamplerKind::Tree,
        }
    }
}

impl Categorical for WeightedSampler {
    fn reset_state(&mut self, weights: &[f64]) -> Result<()> {
        match self {
            Self::Alias(s) => s.reset_state(weights),
            Self::Cdf(s) => s.reset_state(weights),
            Self::Tree(s) => s.reset_state(weights),
        }
    }

    fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize> {
        match self {
            Self::Alias(s) => s.draw(rng),
            Self::Cdf(s) => s.draw(rng),
            Self::Tree(s) => s.draw(rng),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Alias(s) => s.len(),
            Self::Cdf(s) => s.len(),
            Self::Tree(s) => s.len(),
        }
    }
}

/// Reject NaN, infinite, and negative weights, and sequences whose total
/// is not a finite `f64`.
pub(crate) fn validate_weights(weights: &[f64]) -> Result<()> {
    let mut total = 0.0f64;
    for (index, &weight) in weights.iter().enumerate() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidWeight { index, weight });
        }
        total += weight;
        if !total.is_finite() {
            return Err(Error::WeightSumOverflow { index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    const KINDS: [SamplerKind; 3] = [SamplerKind::Alias, SamplerKind::Cdf, SamplerKind::Tree];

    fn frequencies(sampler: &mut WeightedSampler, draws: usize, seed: u64) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut counts = vec![0usize; sampler.len()];
        for _ in 0..draws {
            counts[sampler.draw(&mut rng).unwrap()] += 1;
        }
        counts.iter().map(|&c| c as f64 / draws as f64).collect()
    }

    #[test]
    fn rejects_bad_weights() {
        for kind in KINDS {
            let err = WeightedSampler::new(kind, &[1.0, -2.0], true).unwrap_err();
            let expected = Error::InvalidWeight {
                index: 1,
                weight: -2.0,
            };
            assert_eq!(err, expected);
            let err = WeightedSampler::new(kind, &[f64::NAN], false).unwrap_err();
            assert!(matches!(err, Error::InvalidWeight { index: 0, .. }));
        }
    }

    #[test]
    fn rejects_weights_with_an_infinite_total() {
        for kind in KINDS {
            let err = WeightedSampler::new(kind, &[f64::MAX, f64::MAX], true).unwrap_err();
            assert_eq!(err, Error::WeightSumOverflow { index: 1 });

            let mut s = WeightedSampler::new(kind, &[1.0], true).unwrap();
            let err = s.reset_state(&[1.0, f64::MAX, f64::MAX]).unwrap_err();
            assert_eq!(err, Error::WeightSumOverflow { index: 2 });
        }
    }

    #[test]
    fn huge_finite_weights_keep_proportions() {
        let weights = [1e307, 1e307, 1.0];
        for kind in KINDS {
            let mut s = WeightedSampler::new(kind, &weights, true).unwrap();
            let freq = frequencies(&mut s, 3_000, 5);
            assert_eq!(freq[2], 0.0, "{kind:?}: {freq:?}");
            assert!((freq[0] - 0.5).abs() < 0.05, "{kind:?}: {freq:?}");
        }
    }

    #[test]
    fn subnormal_weights_are_all_reachable() {
        let weights = [5e-324, 5e-324];
        for kind in KINDS {
            let mut s = WeightedSampler::new(kind, &weights, true).unwrap();
            let freq = frequencies(&mut s, 2_000, 13);
            assert!(freq.iter().all(|&f| f > 0.1), "{kind:?}: {freq:?}");
        }
    }

    #[test]
    fn frequencies_follow_weights() {
        let weights = [1.0, 2.0, 3.0, 4.0];
        let total: f64 = weights.iter().sum();
        for kind in KINDS {
            let mut s = WeightedSampler::new(kind, &weights, true).unwrap();
            assert_eq!(s.kind(), kind);
            let freq = frequencies(&mut s, 40_000, 7);
            for (f, w) in freq.iter().zip(weights) {
                assert!((f - w / total).abs() < 0.02, "{kind:?}: freq={freq:?}");
            }
        }
    }

    #[test]
    fn zero_weight_items_are_never_drawn() {
        let weights = [0.0, 1.0, 0.0, 1.0];
        for kind in KINDS {
            let mut s = WeightedSampler::new(kind, &weights, true).unwrap();
            let freq = frequencies(&mut s, 2_000, 11);
            assert_eq!(freq[0], 0.0, "{kind:?}");
            assert_eq!(freq[2], 0.0, "{kind:?}");
        }
    }

    #[test]
    fn without_replacement_exhausts_then_fails() {
        let weights = [5.0, 1.0, 0.5, 3.0, 2.0];
        for kind in KINDS {
            let mut rng = ChaCha8Rng::seed_from_u64(3);
            let mut s = WeightedSampler::new(kind, &weights, false).unwrap();
            let drawn: HashSet<usize> = s.draw_many(5, &mut rng).unwrap().into_iter().collect();
            assert_eq!(drawn.len(), 5, "{kind:?}");
            let err = s.draw(&mut rng).unwrap_err();
            assert_eq!(err, Error::PopulationExhausted, "{kind:?}");

            s.reset_state(&weights).unwrap();
            assert!(s.draw(&mut rng).is_ok(), "{kind:?} after reset");
        }
    }

    #[test]
    fn empty_population_fails() {
        for kind in KINDS {
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            let mut s = WeightedSampler::new(kind, &[], true).unwrap();
            assert!(s.is_empty());
            assert_eq!(s.draw(&mut rng), Err(Error::PopulationExhausted));
            let mut s = WeightedSampler::new(kind, &[0.0, 0.0], false).unwrap();
            assert_eq!(s.draw(&mut rng), Err(Error::PopulationExhausted));
        }
    }

    #[test]
    fn reset_matches_fresh_construction() {
        let weights = [3.0, 1.0, 6.0];
        let skewed = [0.0, 10.0, 0.1];
        for kind in KINDS {
            let mut fresh = WeightedSampler::new(kind, &weights, true).unwrap();
            let mut reset = WeightedSampler::new(kind, &skewed, true).unwrap();
            reset.reset_state(&weights).unwrap();
            let a = frequencies(&mut fresh, 30_000, 21);
            let b = frequencies(&mut reset, 30_000, 22);
            for (x, y) in a.iter().zip(&b) {
                assert!((x - y).abs() < 0.02, "{kind:?}: fresh={a:?} reset={b:?}");
            }
        }
    }

    #[test]
    fn first_draw_without_replacement_follows_weights() {
        // Exercises the rejection path: the first pick of each fresh run
        // must still be proportional to weight.
        let weights = [1.0, 1.0, 8.0];
        for kind in KINDS {
            let mut rng = ChaCha8Rng::seed_from_u64(99);
            let mut heavy = 0usize;
            let trials = 5_000;
            for _ in 0..trials {
                let mut s = WeightedSampler::new(kind, &weights, false).unwrap();
                if s.draw(&mut rng).unwrap() == 2 {
                    heavy += 1;
                }
            }
            let freq = heavy as f64 / trials as f64;
            assert!((freq - 0.8).abs() < 0.03, "{kind:?}: {freq}");
        }
    }
}
