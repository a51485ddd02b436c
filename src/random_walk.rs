//! Fixed-length uniform random walks.
//!
//! Every `(seed, trace)` pair is an independent job on the rayon pool with
//! its own generator derived from `(WalkConfig::seed, pair index)`, so traces
//! are reproducible for a fixed seed regardless of thread count.

use crate::error::{Error, Result};
use crate::graph::{AdjacencyProvider, VertexId};
use crate::rng::task_rng;
use rand::prelude::*;
use rayon::prelude::*;
use tracing::debug;

/// Parameters for [`random_walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkConfig {
    /// Walks started from each seed.
    pub num_traces: usize,
    /// Steps per walk; a trace holds `num_hops + 1` vertices.
    pub num_hops: usize,
    /// Base seed. `None` draws one from the thread-local RNG.
    pub seed: Option<u64>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            num_traces: 10,
            num_hops: 80,
            seed: None,
        }
    }
}

/// Dense walk buffer of shape `(num_seeds, num_traces, num_hops + 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traces {
    data: Vec<VertexId>,
    num_seeds: usize,
    num_traces: usize,
    trace_len: usize,
}

impl Traces {
    /// `(num_seeds, num_traces, trace_len)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.num_seeds, self.num_traces, self.trace_len)
    }

    /// Walk number `trace` started from the `seed`-th seed.
    pub fn trace(&self, seed: usize, trace: usize) -> &[VertexId] {
        let start = (seed * self.num_traces + trace) * self.trace_len;
        &self.data[start..start + self.trace_len]
    }

    /// Row-major contents.
    pub fn as_slice(&self) -> &[VertexId] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<VertexId> {
        self.data
    }
}

/// Walk `config.num_traces` times from every seed, `config.num_hops` steps each.
///
/// Each step moves to a successor chosen uniformly at random. The first
/// entry of a trace is its seed. Without `config.seed`, the base seed comes
/// from the thread-local RNG.
///
/// # Errors
///
/// Returns [`Error::VertexOutOfRange`] for an unknown seed and
/// [`Error::DeadEnd`] when a walk must step out of a vertex with no successors.
pub fn random_walk<G: AdjacencyProvider + Sync + ?Sized>(
    graph: &G,
    seeds: &[VertexId],
    config: &WalkConfig,
) -> Result<Traces> {
    random_walk_with_rng(graph, seeds, config, &mut rand::rng())
}

/// [`random_walk`] drawing the base seed from `rng` when `config.seed` is `None`.
///
/// Only the base seed comes from `rng`; every `(seed, trace)` pair then runs
/// on its own stream, so the output does not depend on the thread count.
///
/// # Errors
///
/// See [`random_walk`].
pub fn random_walk_with_rng<G, R>(
    graph: &G,
    seeds: &[VertexId],
    config: &WalkConfig,
    rng: &mut R,
) -> Result<Traces>
where
    G: AdjacencyProvider + Sync + ?Sized,
    R: Rng + ?Sized,
{
    let num_vertices = graph.num_vertices();
    if let Some(&vertex) = seeds.iter().find(|&&v| v >= num_vertices) {
        return Err(Error::VertexOutOfRange {
            vertex,
            num_vertices,
        });
    }
    let trace_len = config.num_hops + 1;
    let base = config.seed.unwrap_or_else(|| rng.random());
    let mut data = vec![0; seeds.len() * config.num_traces * trace_len];

    data.par_chunks_mut(trace_len)
        .enumerate()
        .try_for_each(|(job, trace)| {
            let start = seeds[job / config.num_traces];
            let mut job_rng = task_rng(base, job as u64);
            walk(graph, start, trace, &mut job_rng)
        })?;

    debug!(
        seeds = seeds.len(),
        num_traces = config.num_traces,
        num_hops = config.num_hops,
        "generated random walks"
    );
    Ok(Traces {
        data,
        num_seeds: seeds.len(),
        num_traces: config.num_traces,
        trace_len,
    })
}

/// Fill `trace` with a walk from `start`.
fn walk<G: AdjacencyProvider + ?Sized, R: Rng + ?Sized>(
    graph: &G,
    start: VertexId,
    trace: &mut [VertexId],
    rng: &mut R,
) -> Result<()> {
    let Some((first, rest)) = trace.split_first_mut() else {
        return Ok(());
    };
    let mut cur = start;
    *first = cur;
    for slot in rest {
        cur = *graph
            .successors(cur)
            .choose(rng)
            .ok_or(Error::DeadEnd { vertex: cur })?;
        *slot = cur;
    }
    Ok(())
}
