//! Hop-by-hop frontier expansion.
//!
//! Starting from the seeds, every vertex of the newest layer has its row
//! subsampled; neighbors not yet seen during the current hop form the next
//! layer. A vertex may show up again at a deeper hop, but never twice in one.
//!
//! The result is raw: layers in hop order, one shared neighbor/edge buffer,
//! and a [`NeighborRecord`] per expanded vertex pointing into that buffer.
//! [`crate::nodeflow`] turns it into a reindexed [`crate::NodeFlow`].

use crate::error::{Error, Result};
use crate::graph::{Csr, EdgeId, VertexId, SELF_LOOP_EDGE};
use crate::neighbor::NeighborSelector;
use rand::Rng;
use std::collections::HashSet;
use tracing::trace;

/// Where one expanded vertex's sampled neighbors live in the shared buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NeighborRecord {
    pub vertex: VertexId,
    pub offset: usize,
    pub count: usize,
}

/// Raw output of an expansion, in hop order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Frontier {
    /// Layer vertices back to back; layer `d` is
    /// `vertices[layer_offsets[d]..layer_offsets[d + 1]]`.
    pub vertices: Vec<VertexId>,
    pub layer_offsets: Vec<usize>,
    pub neighbors: Vec<VertexId>,
    pub edges: Vec<EdgeId>,
    /// One record per vertex of every layer but the deepest, aligned with `vertices`.
    pub records: Vec<NeighborRecord>,
}

impl Frontier {
    pub fn num_layers(&self) -> usize {
        self.layer_offsets.len() - 1
    }

    pub fn layer(&self, depth: usize) -> &[VertexId] {
        &self.vertices[self.layer_offsets[depth]..self.layer_offsets[depth + 1]]
    }
}

/// Drives a [`NeighborSelector`] over one CSR view.
pub(crate) struct FrontierExpander<'a> {
    csr: &'a Csr,
    selector: NeighborSelector,
    weights: Option<&'a [f64]>,
    self_loops: bool,
}

impl<'a> FrontierExpander<'a> {
    pub fn new(csr: &'a Csr, selector: NeighborSelector) -> Self {
        Self {
            csr,
            selector,
            weights: None,
            self_loops: false,
        }
    }

    /// Give every expanded vertex an edge to itself when sampling did not
    /// already pick one, so it reappears in the next layer.
    pub fn with_self_loops(mut self, self_loops: bool) -> Self {
        self.self_loops = self_loops;
        self
    }

    /// Sample neighbors in proportion to `weights[vertex]`.
    pub fn weighted(mut self, weights: &'a [f64]) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Expand `seeds` into `num_layers` layers (the seed layer included).
    ///
    /// Duplicate seeds are kept once, at their first position.
    pub fn expand<R: Rng + ?Sized>(
        &self,
        seeds: &[VertexId],
        num_layers: usize,
        rng: &mut R,
    ) -> Result<Frontier> {
        if num_layers == 0 {
            return Err(Error::InvalidParameter(
                "a node flow needs at least one layer".into(),
            ));
        }
        let num_vertices = self.csr.num_vertices();
        if let Some(&vertex) = seeds.iter().find(|&&v| v >= num_vertices) {
            return Err(Error::VertexOutOfRange {
                vertex,
                num_vertices,
            });
        }

        let mut frontier = Frontier {
            vertices: Vec::with_capacity(seeds.len() * 10),
            layer_offsets: Vec::with_capacity(num_layers + 1),
            ..Frontier::default()
        };
        let mut seen: HashSet<VertexId> = HashSet::with_capacity(seeds.len());
        for &seed in seeds {
            if seen.insert(seed) {
                frontier.vertices.push(seed);
            }
        }
        frontier.layer_offsets.push(0);
        frontier.layer_offsets.push(frontier.vertices.len());

        for depth in 1..num_layers {
            seen.clear();
            let (start, end) = (
                frontier.layer_offsets[depth - 1],
                frontier.layer_offsets[depth],
            );
            for idx in start..end {
                let vertex = frontier.vertices[idx];
                let offset = frontier.neighbors.len();
                let mut count = self.sample_row(vertex, rng, &mut frontier)?;
                if self.self_loops && !frontier.neighbors[offset..].contains(&vertex) {
                    frontier.neighbors.push(vertex);
                    frontier.edges.push(SELF_LOOP_EDGE);
                    count += 1;
                }
                frontier.records.push(NeighborRecord {
                    vertex,
                    offset,
                    count,
                });

                for &nbr in &frontier.neighbors[offset..offset + count] {
                    if seen.insert(nbr) {
                        frontier.vertices.push(nbr);
                    }
                }
            }
            frontier.layer_offsets.push(frontier.vertices.len());
            trace!(
                depth,
                layer_size = seen.len(),
                sampled_edges = frontier.edges.len(),
                "expanded hop"
            );
        }
        Ok(frontier)
    }

    fn sample_row<R: Rng + ?Sized>(
        &self,
        vertex: VertexId,
        rng: &mut R,
        frontier: &mut Frontier,
    ) -> Result<usize> {
        let (nbrs, eids) = self.csr.row(vertex);
        match self.weights {
            None => Ok(self.selector.select_uniform(
                nbrs,
                eids,
                rng,
                &mut frontier.neighbors,
                &mut frontier.edges,
            )),
            Some(weights) => self.selector.select_weighted(
                nbrs,
                eids,
                weights,
                rng,
                &mut frontier.neighbors,
                &mut frontier.edges,
            ),
        }
    }
}
