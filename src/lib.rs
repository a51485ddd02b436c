//! `hopflow`: graph-neighborhood sampling for mini-batch training.
//!
//! Given a large directed graph in compressed adjacency form, this crate
//! produces small layered subgraphs ("node flows") around a seed set, and
//! fixed-length random walks.
//!
//! Exposed modules:
//! - `weighted`: alias / CDF / sum-tree categorical samplers, with or without replacement.
//! - `neighbor`: fan-out-bounded neighbor selection for one adjacency row.
//! - `sample`: multi-hop neighbor sampling into a reindexed [`NodeFlow`].
//! - `loader`: batched, parallel node-flow iteration over a seed list.
//! - `random_walk`: parallel uniform random walks.
//! - `graph`: the CSR adjacency the samplers read.
//!
//! Every randomized entry point has a form that takes a caller-supplied RNG
//! (or seed) so results are reproducible.
//!
//! ```
//! use hopflow::{sample_neighbors, CsrGraph, NeighborSamplingConfig, Orientation};
//!
//! # fn main() -> hopflow::Result<()> {
//! let graph = CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)])?;
//! let config = NeighborSamplingConfig {
//!     orientation: Orientation::Out,
//!     num_hops: 2,
//!     fanout: 10,
//!     ..Default::default()
//! };
//! let nf = sample_neighbors(&graph, &[0], &config)?;
//! assert_eq!(nf.node_mapping(), &[1, 0]);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
mod expand;
pub mod graph;
pub mod loader;
pub mod neighbor;
pub mod nodeflow;
pub mod random_walk;
mod rng;
pub mod sample;
pub mod weighted;

pub use error::{Error, Result};
pub use graph::{
    AdjacencyProvider, Csr, CsrGraph, EdgeId, Orientation, VertexId, SELF_LOOP_EDGE,
};
pub use loader::{LoaderConfig, NodeFlowLoader};
pub use neighbor::NeighborSelector;
pub use nodeflow::NodeFlow;
pub use random_walk::{random_walk, random_walk_with_rng, Traces, WalkConfig};
pub use sample::{
    sample_neighbors, sample_neighbors_weighted, sample_neighbors_weighted_with_rng,
    sample_neighbors_with_rng, NeighborSamplingConfig,
};
pub use weighted::{
    AliasSampler, Categorical, CdfSampler, SamplerKind, TreeSampler, WeightedSampler,
};
