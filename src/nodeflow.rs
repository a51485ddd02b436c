//! The layered, reindexed subgraph produced by one sampling call.
//!
//! Layers are exposed deepest hop first: layer 0 holds the vertices reached
//! last ("inputs") and the final layer holds the seeds. Block `i` is the set
//! of sampled edges between layer `i` and layer `i + 1`.
//!
//! Local vertex ids are positions in [`NodeFlow::node_mapping`]; local edge
//! ids are positions in [`NodeFlow::edge_mapping`]. Within a layer, vertices
//! are sorted by original id.

use crate::error::{Error, Result};
use crate::expand::Frontier;
use crate::graph::{Csr, EdgeId, Orientation, VertexId};
use std::collections::HashMap;
use std::ops::Range;

/// Layered subgraph with global-to-local id remapping.
///
/// The adjacency has one row per local vertex. A row of layer `i + 1` lists
/// the local ids (in layer `i`) of the neighbors sampled for it; rows of
/// layer 0 are empty. For [`Orientation::In`] a row is a destination and its
/// columns are sources; for [`Orientation::Out`] the other way round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFlow {
    adjacency: Csr,
    orientation: Orientation,
    node_mapping: Vec<VertexId>,
    edge_mapping: Vec<EdgeId>,
    layer_offsets: Vec<usize>,
    flow_offsets: Vec<usize>,
}

impl NodeFlow {
    /// Original vertex id of every local vertex.
    pub fn node_mapping(&self) -> &[VertexId] {
        &self.node_mapping
    }

    /// Original edge id of every local edge; [`crate::SELF_LOOP_EDGE`] for
    /// self-loops added by sampling.
    pub fn edge_mapping(&self) -> &[EdgeId] {
        &self.edge_mapping
    }

    /// `num_layers() + 1` boundaries into [`Self::node_mapping`].
    pub fn layer_offsets(&self) -> &[usize] {
        &self.layer_offsets
    }

    /// `num_layers()` boundaries into [`Self::edge_mapping`].
    pub fn flow_offsets(&self) -> &[usize] {
        &self.flow_offsets
    }

    pub fn adjacency(&self) -> &Csr {
        &self.adjacency
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn num_layers(&self) -> usize {
        self.layer_offsets.len() - 1
    }

    pub fn num_blocks(&self) -> usize {
        self.num_layers() - 1
    }

    pub fn num_vertices(&self) -> usize {
        self.node_mapping.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edge_mapping.len()
    }

    /// Local id range of layer `layer`.
    pub fn layer_range(&self, layer: usize) -> Range<usize> {
        self.layer_offsets[layer]..self.layer_offsets[layer + 1]
    }

    /// Original ids of layer `layer`, ascending.
    pub fn layer_nodes(&self, layer: usize) -> &[VertexId] {
        &self.node_mapping[self.layer_range(layer)]
    }

    /// The seed layer (the last one).
    pub fn seed_nodes(&self) -> &[VertexId] {
        self.layer_nodes(self.num_layers() - 1)
    }

    /// Local edge id range of block `block`.
    pub fn block_range(&self, block: usize) -> Range<usize> {
        self.flow_offsets[block]..self.flow_offsets[block + 1]
    }

    /// Original edge ids of block `block`.
    pub fn block_edge_ids(&self, block: usize) -> &[EdgeId] {
        &self.edge_mapping[self.block_range(block)]
    }

    /// Every sampled edge as `(src, dst, local edge id)` in local vertex ids,
    /// directed as in the source graph.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let indptr = self.adjacency.indptr();
        let indices = self.adjacency.indices();
        (0..self.adjacency.num_vertices()).flat_map(move |row| {
            (indptr[row]..indptr[row + 1]).map(move |eid| match self.orientation {
                Orientation::In => (indices[eid], row, eid),
                Orientation::Out => (row, indices[eid], eid),
            })
        })
    }

    /// Re-validate the structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptFrontier`] naming the first broken invariant.
    pub fn check_invariants(&self) -> Result<()> {
        let corrupt = |msg: String| Err(Error::CorruptFrontier(msg));
        let num_layers = self.num_layers();
        if num_layers == 0 || self.flow_offsets.len() != num_layers {
            return corrupt(format!(
                "{} layer offsets but {} flow offsets",
                self.layer_offsets.len(),
                self.flow_offsets.len()
            ));
        }
        if self.layer_offsets[0] != 0 || self.layer_offsets[num_layers] != self.num_vertices() {
            return corrupt(format!(
                "layer offsets {:?} do not span the vertices",
                self.layer_offsets
            ));
        }
        if self.flow_offsets[0] != 0 || self.flow_offsets[num_layers - 1] != self.num_edges() {
            return corrupt(format!(
                "flow offsets {:?} do not span the edges",
                self.flow_offsets
            ));
        }
        if self.adjacency.num_vertices() != self.num_vertices()
            || self.adjacency.num_edges() != self.num_edges()
        {
            return corrupt("adjacency shape differs from the mappings".into());
        }
        for layer in 1..num_layers {
            let below = self.layer_range(layer - 1);
            let mut block_edges = 0;
            for row in self.layer_range(layer) {
                let cols = self.adjacency.neighbors(row);
                if let Some(col) = cols.iter().find(|&&c| !below.contains(&c)) {
                    return corrupt(format!(
                        "local vertex {row} in layer {layer} points at {col}, outside layer {}",
                        layer - 1
                    ));
                }
                block_edges += cols.len();
            }
            if block_edges != self.block_range(layer - 1).len() {
                return corrupt(format!(
                    "block {} edge count disagrees with flow offsets",
                    layer - 1
                ));
            }
        }
        if self.layer_range(0).any(|row| self.adjacency.degree(row) != 0) {
            return corrupt("the deepest layer must have no sampled neighbors".into());
        }
        Ok(())
    }
}

/// Reindex a raw expansion into a [`NodeFlow`].
///
/// Deterministic; consumes the frontier so layers can be sorted in place.
pub(crate) fn build(mut frontier: Frontier, orientation: Orientation) -> Result<NodeFlow> {
    let num_layers = frontier.num_layers();
    let num_vertices = frontier.vertices.len();
    let num_edges = frontier.neighbors.len();
    if frontier.records.len() != frontier.layer_offsets[num_layers - 1] {
        return Err(Error::CorruptFrontier(format!(
            "{} neighbor records for {} expanded vertices",
            frontier.records.len(),
            frontier.layer_offsets[num_layers - 1]
        )));
    }

    // Assign local ids deepest layer first, each layer sorted by original id.
    let mut node_mapping = Vec::with_capacity(num_vertices);
    let mut local_ids: Vec<HashMap<VertexId, usize>> = vec![HashMap::new(); num_layers];
    for depth in (0..num_layers).rev() {
        let range = frontier.layer_offsets[depth]..frontier.layer_offsets[depth + 1];
        let layer = &mut frontier.vertices[range];
        layer.sort_unstable();
        local_ids[depth].reserve(layer.len());
        for &v in layer.iter() {
            local_ids[depth].insert(v, node_mapping.len());
            node_mapping.push(v);
        }
    }

    let mut indptr = Vec::with_capacity(num_vertices + 1);
    let mut indices = Vec::with_capacity(num_edges);
    let mut edge_mapping = Vec::with_capacity(num_edges);
    indptr.push(0);
    indptr.resize(1 + frontier.layer(num_layers - 1).len(), 0);

    let mut layer_offsets = Vec::with_capacity(num_layers + 1);
    let mut flow_offsets = Vec::with_capacity(num_layers);
    layer_offsets.push(0);
    layer_offsets.push(indptr.len() - 1);
    flow_offsets.push(0);

    for depth in (0..num_layers.saturating_sub(1)).rev() {
        let range = frontier.layer_offsets[depth]..frontier.layer_offsets[depth + 1];
        let records = &mut frontier.records[range.clone()];
        records.sort_unstable_by_key(|r| r.vertex);
        let deeper = &local_ids[depth + 1];
        for (record, &vertex) in records.iter().zip(&frontier.vertices[range]) {
            if record.vertex != vertex {
                return Err(Error::CorruptFrontier(format!(
                    "record for vertex {} is aligned with vertex {vertex}",
                    record.vertex
                )));
            }
            let end = record.offset + record.count;
            if end > num_edges {
                return Err(Error::CorruptFrontier(format!(
                    "record for vertex {vertex} ends at {end} past {num_edges} sampled edges"
                )));
            }
            for &neighbor in &frontier.neighbors[record.offset..end] {
                let local = deeper.get(&neighbor).ok_or(Error::UnresolvedNeighbor {
                    vertex,
                    neighbor,
                    layer: depth + 1,
                })?;
                indices.push(*local);
            }
            edge_mapping.extend_from_slice(&frontier.edges[record.offset..end]);
            indptr.push(indices.len());
        }
        layer_offsets.push(indptr.len() - 1);
        flow_offsets.push(indices.len());
    }

    let local_edge_ids = (0..indices.len()).collect();
    let adjacency = Csr::new(indptr, indices, local_edge_ids)?;
    let nf = NodeFlow {
        adjacency,
        orientation,
        node_mapping,
        edge_mapping,
        layer_offsets,
        flow_offsets,
    };
    nf.check_invariants()?;
    Ok(nf)
}
