//! Per-vertex neighbor subsampling.
//!
//! The inner step of multi-hop expansion: given one adjacency row, keep at
//! most `fanout` of its entries, uniformly or in proportion to a per-vertex
//! weight. Selections are appended to caller-owned buffers so the expander
//! can lay every row out in one shared neighbor/edge buffer.

use crate::error::Result;
use crate::graph::{EdgeId, VertexId};
use crate::weighted::{Categorical, SamplerKind, WeightedSampler};
use rand::prelude::*;
use std::collections::HashSet;

/// Fan-out-bounded neighbor selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborSelector {
    fanout: usize,
    sampler: SamplerKind,
}

impl NeighborSelector {
    /// Keep at most `fanout` neighbors per row.
    pub fn new(fanout: usize) -> Self {
        Self {
            fanout,
            sampler: SamplerKind::Alias,
        }
    }

    /// Strategy used by [`Self::select_weighted`].
    pub fn with_sampler(mut self, sampler: SamplerKind) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn fanout(&self) -> usize {
        self.fanout
    }

    /// Uniformly keep `fanout` entries of a row, in their original order.
    ///
    /// Rows no longer than `fanout` are copied verbatim. Returns the number of
    /// pairs appended to `out_vertices` / `out_edges`.
    pub fn select_uniform<R: Rng + ?Sized>(
        &self,
        neighbors: &[VertexId],
        edges: &[EdgeId],
        rng: &mut R,
        out_vertices: &mut Vec<VertexId>,
        out_edges: &mut Vec<EdgeId>,
    ) -> usize {
        debug_assert_eq!(neighbors.len(), edges.len());
        let len = neighbors.len();
        if len <= self.fanout {
            out_vertices.extend_from_slice(neighbors);
            out_edges.extend_from_slice(edges);
            return len;
        }

        // Close to the full row, draw the smaller set of positions to drop.
        let keep = if len > 2 * self.fanout {
            sorted_unique_indices(len, self.fanout, rng)
        } else {
            let drop = sorted_unique_indices(len, len - self.fanout, rng);
            complement(&drop, len)
        };
        debug_assert_eq!(keep.len(), self.fanout);

        for idx in keep {
            out_vertices.push(neighbors[idx]);
            out_edges.push(edges[idx]);
        }
        self.fanout
    }

    /// Keep `fanout` entries of a row without replacement, each neighbor
    /// weighted by `weights[neighbor]`.
    ///
    /// Rows no longer than `fanout` are copied verbatim, zero-weight
    /// neighbors included. Longer rows never yield a zero-weight neighbor, so
    /// fewer than `fanout` pairs come back when fewer positive-weight
    /// neighbors exist; those pairs are sorted by vertex id (ties by edge id)
    /// and stay paired.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::Error::InvalidWeight`] from the sampler. Callers are
    /// expected to have checked that `weights` covers every neighbor id.
    pub fn select_weighted<R: Rng + ?Sized>(
        &self,
        neighbors: &[VertexId],
        edges: &[EdgeId],
        weights: &[f64],
        rng: &mut R,
        out_vertices: &mut Vec<VertexId>,
        out_edges: &mut Vec<EdgeId>,
    ) -> Result<usize> {
        debug_assert_eq!(neighbors.len(), edges.len());
        let len = neighbors.len();
        if len <= self.fanout {
            out_vertices.extend_from_slice(neighbors);
            out_edges.extend_from_slice(edges);
            return Ok(len);
        }

        let row_weights: Vec<f64> = neighbors.iter().map(|&v| weights[v]).collect();
        let positive = row_weights.iter().filter(|&&w| w > 0.0).count();
        let mut sampler = WeightedSampler::new(self.sampler, &row_weights, false)?;
        let mut picked: Vec<(VertexId, EdgeId)> = sampler
            .draw_many(self.fanout.min(positive), rng)?
            .into_iter()
            .map(|idx| (neighbors[idx], edges[idx]))
            .collect();
        picked.sort_unstable();

        out_vertices.extend(picked.iter().map(|&(v, _)| v));
        out_edges.extend(picked.iter().map(|&(_, e)| e));
        Ok(picked.len())
    }
}

/// `num` distinct positions from `0..len`, ascending.
///
/// Rejection into a set: cheap while `num` is at most half of `len`, which is
/// the only way [`NeighborSelector::select_uniform`] calls it.
fn sorted_unique_indices<R: Rng + ?Sized>(len: usize, num: usize, rng: &mut R) -> Vec<usize> {
    debug_assert!(num <= len);
    let mut picked = HashSet::with_capacity(num);
    while picked.len() < num {
        picked.insert(rng.random_range(0..len));
    }
    let mut out: Vec<usize> = picked.into_iter().collect();
    out.sort_unstable();
    out
}

/// Positions of `0..len` missing from the ascending `excluded`.
fn complement(excluded: &[usize], len: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(len - excluded.len());
    let mut skip = excluded.iter().peekable();
    for i in 0..len {
        if skip.peek() == Some(&&i) {
            skip.next();
        } else {
            out.push(i);
        }
    }
    out
}
