//! Neighbor-sampling entry points.
//!
//! `sample_neighbors*` expand a seed set hop by hop, keeping at most `fanout`
//! neighbors per vertex, and return the reindexed [`NodeFlow`].

use crate::error::{Error, Result};
use crate::expand::FrontierExpander;
use crate::graph::{AdjacencyProvider, Csr, Orientation, VertexId};
use crate::neighbor::NeighborSelector;
use crate::nodeflow::{self, NodeFlow};
use crate::weighted::{validate_weights, SamplerKind};
use rand::Rng;
use tracing::debug;

/// Parameters of one neighbor-sampling call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeighborSamplingConfig {
    /// Adjacency followed during expansion.
    pub orientation: Orientation,
    /// Layers in the produced node flow, seed layer included (so
    /// `num_hops - 1` expansion steps). Must be at least 1.
    pub num_hops: usize,
    /// Maximum neighbors kept per vertex per hop.
    pub fanout: usize,
    /// Strategy for weighted sampling; ignored by uniform sampling.
    pub sampler: SamplerKind,
    /// Give every expanded vertex a self-loop (edge id [`crate::SELF_LOOP_EDGE`])
    /// unless one was sampled, so it also appears in the next layer.
    #[cfg_attr(feature = "serde", serde(default))]
    pub add_self_loop: bool,
}

impl Default for NeighborSamplingConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::In,
            num_hops: 2,
            fanout: 10,
            sampler: SamplerKind::Alias,
            add_self_loop: false,
        }
    }
}

impl NeighborSamplingConfig {
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `num_hops == 0`.
    pub fn validate(&self) -> Result<()> {
        if self.num_hops == 0 {
            return Err(Error::InvalidParameter("num_hops must be >= 1".into()));
        }
        Ok(())
    }

    fn selector(&self) -> NeighborSelector {
        NeighborSelector::new(self.fanout).with_sampler(self.sampler)
    }

    fn expander<'a>(&self, csr: &'a Csr) -> FrontierExpander<'a> {
        FrontierExpander::new(csr, self.selector()).with_self_loops(self.add_self_loop)
    }
}

/// Uniform neighbor sampling with the thread-local RNG.
///
/// # Errors
///
/// See [`sample_neighbors_with_rng`].
pub fn sample_neighbors<G: AdjacencyProvider + ?Sized>(
    graph: &G,
    seeds: &[VertexId],
    config: &NeighborSamplingConfig,
) -> Result<NodeFlow> {
    let mut rng = rand::rng();
    sample_neighbors_with_rng(graph, seeds, config, &mut rng)
}

/// Uniform neighbor sampling with a caller-supplied RNG.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] for `num_hops == 0` and
/// [`Error::VertexOutOfRange`] for an unknown seed. Invariant violations found
/// while building the node flow are returned as is.
pub fn sample_neighbors_with_rng<G: AdjacencyProvider + ?Sized, R: Rng + ?Sized>(
    graph: &G,
    seeds: &[VertexId],
    config: &NeighborSamplingConfig,
    rng: &mut R,
) -> Result<NodeFlow> {
    config.validate()?;
    let csr = graph.csr(config.orientation);
    let frontier = config.expander(csr).expand(seeds, config.num_hops, rng)?;
    let nf = nodeflow::build(frontier, config.orientation)?;
    debug!(
        seeds = seeds.len(),
        layers = nf.num_layers(),
        vertices = nf.num_vertices(),
        edges = nf.num_edges(),
        "sampled node flow"
    );
    Ok(nf)
}

/// Weighted neighbor sampling with the thread-local RNG.
///
/// # Errors
///
/// See [`sample_neighbors_weighted_with_rng`].
pub fn sample_neighbors_weighted<G: AdjacencyProvider + ?Sized>(
    graph: &G,
    seeds: &[VertexId],
    weights: &[f64],
    config: &NeighborSamplingConfig,
) -> Result<NodeFlow> {
    let mut rng = rand::rng();
    sample_neighbors_weighted_with_rng(graph, seeds, weights, config, &mut rng)
}

/// Weighted neighbor sampling: a neighbor `u` is kept with probability
/// proportional to `weights[u]`, without replacement within a row.
///
/// # Errors
///
/// Everything [`sample_neighbors_with_rng`] returns, plus
/// [`Error::WeightLengthMismatch`] when `weights` does not have one entry per
/// vertex, [`Error::InvalidWeight`] for a NaN, infinite, or negative weight, and
/// [`Error::WeightSumOverflow`] when the whole table does not sum to a finite value.
pub fn sample_neighbors_weighted_with_rng<G: AdjacencyProvider + ?Sized, R: Rng + ?Sized>(
    graph: &G,
    seeds: &[VertexId],
    weights: &[f64],
    config: &NeighborSamplingConfig,
    rng: &mut R,
) -> Result<NodeFlow> {
    config.validate()?;
    if weights.len() != graph.num_vertices() {
        return Err(Error::WeightLengthMismatch {
            expected: graph.num_vertices(),
            got: weights.len(),
        });
    }
    validate_weights(weights)?;

    let csr = graph.csr(config.orientation);
    let frontier = config
        .expander(csr)
        .weighted(weights)
        .expand(seeds, config.num_hops, rng)?;
    let nf = nodeflow::build(frontier, config.orientation)?;
    debug!(
        seeds = seeds.len(),
        layers = nf.num_layers(),
        vertices = nf.num_vertices(),
        edges = nf.num_edges(),
        sampler = ?config.sampler,
        "sampled weighted node flow"
    );
    Ok(nf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SELF_LOOP_EDGE;
    use crate::graph::CsrGraph;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn star(leaves: usize) -> CsrGraph {
        let edges: Vec<(usize, usize)> = (1..=leaves).map(|v| (v, 0)).collect();
        CsrGraph::from_edges(leaves + 1, &edges).unwrap()
    }

    #[test]
    fn in_orientation_samples_predecessors() {
        let g = star(20);
        let config = NeighborSamplingConfig {
            fanout: 4,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let nf = sample_neighbors_with_rng(&g, &[0], &config, &mut rng).unwrap();
        assert_eq!(nf.num_layers(), 2);
        assert_eq!(nf.seed_nodes(), &[0]);
        assert_eq!(nf.layer_nodes(0).len(), 4);
        assert_eq!(nf.num_edges(), 4);
        // Every sampled edge runs leaf -> hub in local ids.
        let hub = nf.layer_range(1).start;
        for (src, dst, eid) in nf.edges() {
            assert_eq!(dst, hub);
            assert_eq!(nf.edge_mapping()[eid] + 1, nf.node_mapping()[src]);
        }
    }

    #[test]
    fn same_seed_same_flow() {
        let g = star(50);
        let config = NeighborSamplingConfig {
            fanout: 5,
            num_hops: 3,
            ..Default::default()
        };
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            sample_neighbors_with_rng(&g, &[0], &config, &mut rng).unwrap()
        };
        assert_eq!(run(4), run(4));
    }

    #[test]
    fn thread_rng_entry_point_works() {
        let g = star(3);
        let nf = sample_neighbors(&g, &[0], &NeighborSamplingConfig::default()).unwrap();
        assert_eq!(nf.layer_nodes(0), &[1, 2, 3]);
    }

    #[test]
    fn weighted_checks_weight_table() {
        let g = star(3);
        let config = NeighborSamplingConfig::default();
        let err = sample_neighbors_weighted(&g, &[0], &[1.0; 3], &config).unwrap_err();
        let expected = Error::WeightLengthMismatch {
            expected: 4,
            got: 3,
        };
        assert_eq!(err, expected);

        let weights = [1.0, 1.0, f64::INFINITY, 1.0];
        let err = sample_neighbors_weighted(&g, &[0], &weights, &config).unwrap_err();
        let expected = Error::InvalidWeight {
            index: 2,
            weight: f64::INFINITY,
        };
        assert_eq!(err, expected);
    }

    #[test]
    fn weighted_rejects_overflowing_weight_table() {
        let g = star(5);
        let weights = vec![f64::MAX; 6];
        for sampler in [SamplerKind::Alias, SamplerKind::Cdf, SamplerKind::Tree] {
            let config = NeighborSamplingConfig {
                fanout: 2,
                sampler,
                ..Default::default()
            };
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            assert_eq!(
                sample_neighbors_weighted_with_rng(&g, &[0], &weights, &config, &mut rng)
                    .unwrap_err(),
                Error::WeightSumOverflow { index: 1 }
            );
        }
    }

    #[test]
    fn weighted_follows_vertex_weights() {
        let g = star(10);
        let mut weights = vec![0.0; 11];
        weights[3] = 1.0;
        weights[7] = 1.0;
        for sampler in [SamplerKind::Alias, SamplerKind::Cdf, SamplerKind::Tree] {
            let config = NeighborSamplingConfig {
                fanout: 2,
                sampler,
                ..Default::default()
            };
            let mut rng = ChaCha8Rng::seed_from_u64(6);
            let nf = sample_neighbors_weighted_with_rng(&g, &[0], &weights, &config, &mut rng)
                .unwrap();
            assert_eq!(nf.layer_nodes(0), &[3, 7]);
            // Edge i is (i + 1) -> 0, so pairing survived the sort.
            assert_eq!(nf.block_edge_ids(0), &[2, 6]);
        }
    }

    #[test]
    fn self_loops_keep_every_vertex_in_the_next_layer() {
        let g = star(6);
        let config = NeighborSamplingConfig {
            fanout: 2,
            num_hops: 3,
            add_self_loop: true,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let nf = sample_neighbors_with_rng(&g, &[0], &config, &mut rng).unwrap();
        for layer in 1..nf.num_layers() {
            for &v in nf.layer_nodes(layer) {
                assert!(
                    nf.layer_nodes(layer - 1).contains(&v),
                    "{v} in layer {layer}"
                );
            }
        }
        // Hub: two sampled leaves plus its self-loop.
        let hub = nf.layer_range(2).start;
        assert_eq!(nf.adjacency().degree(hub), 3);
        let loops = nf
            .edges()
            .filter(|&(src, dst, eid)| {
                let is_loop = nf.edge_mapping()[eid] == SELF_LOOP_EDGE;
                assert_eq!(is_loop, nf.node_mapping()[src] == nf.node_mapping()[dst]);
                is_loop
            })
            .count();
        // Hub at hop 0, hub and both leaves at hop 1.
        assert_eq!(loops, 4);
        nf.check_invariants().unwrap();
    }

    #[test]
    fn zero_hops_rejected() {
        let g = star(1);
        let config = NeighborSamplingConfig {
            num_hops: 0,
            ..Default::default()
        };
        assert!(matches!(
            sample_neighbors(&g, &[0], &config),
            Err(Error::InvalidParameter(_))
        ));
    }
}
