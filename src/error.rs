//! Error type shared by every sampling entry point.

/// Failures surfaced by samplers, the node-flow builder, and random walks.
///
/// Degenerate inputs (isolated vertices, fan-out above the degree, empty seed
/// lists) are not errors; they are handled inline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A weight is NaN, infinite, or negative.
    #[error("weight at index {index} must be finite and >= 0 (got {weight})")]
    InvalidWeight { index: usize, weight: f64 },
    /// The weights are finite one by one but their sum is not.
    #[error("weights overflow f64 once the weight at index {index} is added")]
    WeightSumOverflow { index: usize },
    /// Sampling without replacement ran out of positive-weight items.
    #[error("cannot draw more samples than the remaining population")]
    PopulationExhausted,
    /// The adjacency arrays violate the CSR layout.
    #[error("malformed adjacency: {0}")]
    MalformedGraph(String),
    /// A vertex id does not exist in the graph.
    #[error("vertex {vertex} is out of range for a graph with {num_vertices} vertices")]
    VertexOutOfRange { vertex: usize, num_vertices: usize },
    /// The per-vertex weight table does not cover every vertex.
    #[error("weight table has {got} entries but the graph has {expected} vertices")]
    WeightLengthMismatch { expected: usize, got: usize },
    /// A sampled neighbor was never assigned a local id in the adjacent layer.
    #[error("sampled neighbor {neighbor} of vertex {vertex} has no local id in layer {layer}")]
    UnresolvedNeighbor {
        vertex: usize,
        neighbor: usize,
        layer: usize,
    },
    /// The expansion buffers disagree with each other.
    #[error("corrupt frontier: {0}")]
    CorruptFrontier(String),
    /// A random walk needed a successor of a vertex that has none.
    #[error("random walk reached vertex {vertex}, which has no successors")]
    DeadEnd { vertex: usize },
    /// A configuration value is outside its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl Error {
    /// True for data-integrity failures, as opposed to bad caller parameters.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::PopulationExhausted
                | Self::MalformedGraph(_)
                | Self::UnresolvedNeighbor { .. }
                | Self::CorruptFrontier(_)
                | Self::DeadEnd { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
