//! Compressed adjacency consumed by the samplers.
//!
//! Sampling never mutates a graph; everything here is built once and read
//! through [`AdjacencyProvider`].

use crate::error::{Error, Result};

/// Vertex id in the source graph.
pub type VertexId = usize;
/// Edge id in the source graph.
pub type EdgeId = usize;

/// Edge id recorded for a self-loop added during sampling, which has no
/// counterpart in the source graph.
pub const SELF_LOOP_EDGE: EdgeId = EdgeId::MAX;

/// Which adjacency an expansion follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    /// Follow reverse edges: a row lists the predecessors of a vertex.
    #[default]
    In,
    /// Follow forward edges: a row lists the successors of a vertex.
    Out,
}

/// Compressed sparse row adjacency with a parallel edge-id column.
///
/// `indices[indptr[v]..indptr[v + 1]]` are the neighbors of `v`, and
/// `edge_ids` at the same positions name the edges that reach them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Csr {
    indptr: Vec<usize>,
    indices: Vec<VertexId>,
    edge_ids: Vec<EdgeId>,
}

impl Csr {
    /// Wrap raw CSR arrays after validating their layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedGraph`] if `indptr` is empty, does not start
    /// at 0, decreases, or does not end at `indices.len()`; if `edge_ids` and
    /// `indices` differ in length; or if a column id is not a vertex.
    pub fn new(indptr: Vec<usize>, indices: Vec<VertexId>, edge_ids: Vec<EdgeId>) -> Result<Self> {
        let Some(&first) = indptr.first() else {
            return Err(Error::MalformedGraph(
                "indptr must have at least one entry".into(),
            ));
        };
        if first != 0 {
            return Err(Error::MalformedGraph(format!(
                "indptr[0] must be 0 (got {first})"
            )));
        }
        if let Some(w) = indptr.windows(2).position(|w| w[1] < w[0]) {
            return Err(Error::MalformedGraph(format!(
                "indptr decreases at row {w}"
            )));
        }
        let last = indptr[indptr.len() - 1];
        if last != indices.len() {
            return Err(Error::MalformedGraph(format!(
                "indptr ends at {last} but there are {} column entries",
                indices.len()
            )));
        }
        if edge_ids.len() != indices.len() {
            return Err(Error::MalformedGraph(format!(
                "{} edge ids for {} column entries",
                edge_ids.len(),
                indices.len()
            )));
        }
        let num_vertices = indptr.len() - 1;
        if let Some(&bad) = indices.iter().find(|&&c| c >= num_vertices) {
            return Err(Error::MalformedGraph(format!(
                "column id {bad} out of range for {num_vertices} vertices"
            )));
        }
        Ok(Self {
            indptr,
            indices,
            edge_ids,
        })
    }

    /// Build the forward adjacency of an edge list. Edge `i` gets id `i`.
    ///
    /// Rows keep the relative order of the input edges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VertexOutOfRange`] if an endpoint is `>= num_vertices`.
    pub fn from_edges(num_vertices: usize, edges: &[(VertexId, VertexId)]) -> Result<Self> {
        for &(src, dst) in edges {
            for v in [src, dst] {
                if v >= num_vertices {
                    return Err(Error::VertexOutOfRange {
                        vertex: v,
                        num_vertices,
                    });
                }
            }
        }
        let triples: Vec<(VertexId, VertexId, EdgeId)> = edges
            .iter()
            .enumerate()
            .map(|(eid, &(src, dst))| (src, dst, eid))
            .collect();
        Ok(Self::bucket(num_vertices, &triples))
    }

    /// Counting sort of `(row, column, edge id)` triples into CSR; stable per row.
    fn bucket(num_vertices: usize, triples: &[(VertexId, VertexId, EdgeId)]) -> Self {
        let mut indptr = vec![0usize; num_vertices + 1];
        for &(row, _, _) in triples {
            indptr[row + 1] += 1;
        }
        for i in 0..num_vertices {
            indptr[i + 1] += indptr[i];
        }
        let mut cursor = indptr.clone();
        let mut indices = vec![0; triples.len()];
        let mut edge_ids = vec![0; triples.len()];
        for &(row, col, eid) in triples {
            let slot = cursor[row];
            indices[slot] = col;
            edge_ids[slot] = eid;
            cursor[row] += 1;
        }
        Self {
            indptr,
            indices,
            edge_ids,
        }
    }

    /// The same edges with every row/column swapped (out-CSR <-> in-CSR).
    pub fn transpose(&self) -> Self {
        let mut triples = Vec::with_capacity(self.indices.len());
        for row in 0..self.num_vertices() {
            let (cols, eids) = self.row(row);
            triples.extend(cols.iter().zip(eids).map(|(&col, &eid)| (col, row, eid)));
        }
        Self::bucket(self.num_vertices(), &triples)
    }

    pub fn num_vertices(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn num_edges(&self) -> usize {
        self.indices.len()
    }

    /// Number of entries in the row of `vertex` (0 for unknown vertices).
    pub fn degree(&self, vertex: VertexId) -> usize {
        self.neighbors(vertex).len()
    }

    /// Neighbor ids of `vertex`; empty for unknown vertices.
    pub fn neighbors(&self, vertex: VertexId) -> &[VertexId] {
        self.row(vertex).0
    }

    /// Neighbor ids and the matching edge ids of `vertex`.
    pub fn row(&self, vertex: VertexId) -> (&[VertexId], &[EdgeId]) {
        match (self.indptr.get(vertex), self.indptr.get(vertex + 1)) {
            (Some(&start), Some(&end)) => (&self.indices[start..end], &self.edge_ids[start..end]),
            _ => (&[], &[]),
        }
    }

    pub fn max_degree(&self) -> usize {
        self.indptr.windows(2).map(|w| w[1] - w[0]).max().unwrap_or(0)
    }

    pub fn indptr(&self) -> &[usize] {
        &self.indptr
    }

    pub fn indices(&self) -> &[VertexId] {
        &self.indices
    }

    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.edge_ids
    }
}

/// Read-only adjacency source for the samplers.
pub trait AdjacencyProvider {
    fn num_vertices(&self) -> usize;

    /// The CSR view that expansion in `orientation` walks.
    fn csr(&self, orientation: Orientation) -> &Csr;

    /// Successors of `vertex` (its forward row).
    fn successors(&self, vertex: VertexId) -> &[VertexId] {
        self.csr(Orientation::Out).neighbors(vertex)
    }
}

/// A graph holding both its forward and reverse CSR.
#[derive(Debug, Clone)]
pub struct CsrGraph {
    out_csr: Csr,
    in_csr: Csr,
}

impl CsrGraph {
    /// Build from a directed edge list; edge `i` gets id `i`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VertexOutOfRange`] if an endpoint is `>= num_vertices`.
    pub fn from_edges(num_vertices: usize, edges: &[(VertexId, VertexId)]) -> Result<Self> {
        Ok(Self::from_out_csr(Csr::from_edges(num_vertices, edges)?))
    }

    /// Build from an existing forward CSR, deriving the reverse view.
    pub fn from_out_csr(out_csr: Csr) -> Self {
        let in_csr = out_csr.transpose();
        Self { out_csr, in_csr }
    }

    pub fn num_edges(&self) -> usize {
        self.out_csr.num_edges()
    }
}

impl AdjacencyProvider for CsrGraph {
    fn num_vertices(&self) -> usize {
        self.out_csr.num_vertices()
    }

    fn csr(&self, orientation: Orientation) -> &Csr {
        match orientation {
            Orientation::In => &self.in_csr,
            Orientation::Out => &self.out_csr,
        }
    }
}
