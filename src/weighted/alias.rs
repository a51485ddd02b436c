use super::{validate_weights, Categorical};
use crate::error::{Error, Result};
use rand::Rng;
use std::collections::VecDeque;

/// Alias-method sampler (Vose's pairing of under- and over-average slots).
///
/// Without replacement, drawn items are marked in `used` and rejected on
/// later hits. Once half of the table's mass has been drawn the table is
/// rebuilt over the remaining items, which keeps the expected number of
/// rejections per draw below two.
#[derive(Debug, Clone)]
pub struct AliasSampler {
    replace: bool,
    weights: Vec<f64>,
    used: Vec<bool>,
    /// Slot -> original index. Only positive, unused items get a slot.
    active: Vec<usize>,
    /// Acceptance threshold of each slot, in weight units.
    threshold: Vec<f64>,
    /// Slot -> slot taken when the threshold test fails.
    alias: Vec<usize>,
    accum: f64,
    taken: f64,
}

impl AliasSampler {
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
            threshold: Vec::new(),
            alias: Vec::new(),
            accum: 0.0,
            taken: 0.0,
        };
        s.reset_state(weights)?;
        Ok(s)
    }

    fn rebuild(&mut self) {
        self.active.clear();
        self.accum = 0.0;
        self.taken = 0.0;
        for (i, (&w, &used)) in self.weights.iter().zip(&self.used).enumerate() {
            if !used && w > 0.0 {
                self.active.push(i);
                self.accum += w;
            }
        }

        let n = self.active.len();
        self.alias.clear();
        self.alias.extend(0..n);
        self.threshold.clear();
        if n == 0 {
            return;
        }
        let avg = self.accum / n as f64;
        self.threshold.resize(n, avg);

        let mut under = VecDeque::new();
        let mut over = VecDeque::new();
        for (slot, &i) in self.active.iter().enumerate() {
            let w = self.weights[i];
            if w > avg {
                over.push_back((slot, w));
            } else {
                under.push_back((slot, w));
            }
        }

        while let (Some((u, pu)), Some((o, po))) = (under.pop_front(), over.pop_front()) {
            self.alias[u] = o;
            self.threshold[u] = pu;
            let rest = po + pu - avg;
            if po + pu > 2.0 * avg {
                over.push_back((o, rest));
            } else if po + pu < 2.0 * avg {
                under.push_back((o, rest));
            }
        }
    }

    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let n = self.active.len();
        let avg = self.accum / n as f64;
        let dice = rng.random_range(0.0..n as f64);
        let slot = (dice as usize).min(n - 1);
        let p = (dice - slot as f64) * avg;
        if p <= self.threshold[slot] {
            self.active[slot]
        } else {
            self.active[self.alias[slot]]
        }
    }
}

impl Categorical for AliasSampler {
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

        if self.active.is_empty() || 2.0 * self.taken >= self.accum {
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
