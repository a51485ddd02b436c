use super::{validate_weights, Categorical};
use crate::error::{Error, Result};
use rand::Rng;

/// Sum-tree sampler.
///
/// Weights sit in the leaves of a complete binary tree (padded to a power of
/// two); every internal node holds the mass of its subtree, with the root at
/// index 1. A draw descends from the root. Without replacement the drawn
/// leaf is zeroed and its ancestors are recomputed, so no rebuild is needed.
#[derive(Debug, Clone)]
pub struct TreeSampler {
    replace: bool,
    len: usize,
    num_leaves: usize,
    tree: Vec<f64>,
}

impl TreeSampler {
    /// # Errors
    ///
    /// Returns [`Error::InvalidWeight`] for a NaN, infinite, or negative weight
    /// and [`Error::WeightSumOverflow`] when the total is not finite.
    pub fn new(weights: &[f64], replace: bool) -> Result<Self> {
        let mut s = Self {
            replace,
            len: 0,
            num_leaves: 1,
            tree: vec![0.0; 2],
        };
        s.reset_state(weights)?;
        Ok(s)
    }

    /// Mass still available to draw.
    pub fn total(&self) -> f64 {
        self.tree[1]
    }
}

impl Categorical for TreeSampler {
    fn reset_state(&mut self, weights: &[f64]) -> Result<()> {
        validate_weights(weights)?;
        self.len = weights.len();
        self.num_leaves = weights.len().max(1).next_power_of_two();
        self.tree.clear();
        self.tree.resize(2 * self.num_leaves, 0.0);
        self.tree[self.num_leaves..self.num_leaves + weights.len()].copy_from_slice(weights);
        for node in (1..self.num_leaves).rev() {
            self.tree[node] = self.tree[2 * node] + self.tree[2 * node + 1];
        }
        Ok(())
    }

    fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize> {
        let total = self.total();
        if total <= 0.0 {
            return Err(Error::PopulationExhausted);
        }
        let p = rng.random_range(0.0..total);
        let mut node = 1;
        let mut accum = 0.0;
        while node < self.num_leaves {
            let left = self.tree[2 * node];
            let right = self.tree[2 * node + 1];
            let pivot = accum + left;
            // A zero-mass right subtree is never entered, whatever rounding did to `p`.
            if p >= pivot && right > 0.0 {
                accum = pivot;
                node = 2 * node + 1;
            } else {
                node *= 2;
            }
        }
        let drawn = node - self.num_leaves;

        if !self.replace {
            self.tree[node] = 0.0;
            node /= 2;
            while node >= 1 {
                self.tree[node] = self.tree[2 * node] + self.tree[2 * node + 1];
                node /= 2;
            }
        }
        Ok(drawn)
    }

    fn len(&self) -> usize {
        self.len
    }
}
