//! Mini-batch iteration over node flows.
//!
//! A seed list (every vertex by default) is cut into batches of
//! `batch_size`; `num_workers` batches are sampled at a time on the rayon
//! pool and handed out in batch order. Batch `b` always uses the stream
//! `(seed, b)`, so the sequence of node flows does not depend on how many
//! threads ran it.
//!
//! With [`LoaderConfig::prefetch`], [`NodeFlowLoader::try_for_each_flow`]
//! samples on a background thread, up to `2 * num_workers` node flows ahead
//! of the consumer. Plain iteration always samples on demand.

use crate::error::{Error, Result};
use crate::graph::{AdjacencyProvider, VertexId};
use crate::nodeflow::NodeFlow;
use crate::rng::task_rng;
use crate::sample::{
    sample_neighbors_weighted_with_rng, sample_neighbors_with_rng, NeighborSamplingConfig,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::VecDeque;
use std::sync::mpsc;
use std::thread;
use tracing::debug;

/// Batching parameters of a [`NodeFlowLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoaderConfig {
    /// Seeds per node flow (the last batch may be smaller).
    pub batch_size: usize,
    /// Shuffle the seed list once before batching.
    pub shuffle: bool,
    /// Batches sampled concurrently per refill.
    pub num_workers: usize,
    /// Base seed for shuffling and for every batch's stream.
    pub seed: u64,
    /// Sample ahead of the consumer in [`NodeFlowLoader::try_for_each_flow`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub prefetch: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            shuffle: false,
            num_workers: 1,
            seed: 42,
            prefetch: false,
        }
    }
}

/// Iterator of node flows, one per seed batch.
pub struct NodeFlowLoader<'g, G: ?Sized> {
    graph: &'g G,
    seeds: Vec<VertexId>,
    weights: Option<&'g [f64]>,
    sampling: NeighborSamplingConfig,
    config: LoaderConfig,
    next_batch: usize,
    ready: VecDeque<Result<NodeFlow>>,
}

impl<'g, G: AdjacencyProvider + Sync + ?Sized> NodeFlowLoader<'g, G> {
    /// Batches over every vertex of `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a zero `batch_size` or
    /// `num_workers`, or an invalid `sampling` config.
    pub fn new(
        graph: &'g G,
        sampling: NeighborSamplingConfig,
        config: LoaderConfig,
    ) -> Result<Self> {
        let seeds = (0..graph.num_vertices()).collect();
        Self::with_seeds(graph, seeds, sampling, config)
    }

    /// Batches over an explicit seed list.
    ///
    /// # Errors
    ///
    /// As [`Self::new`], plus [`Error::VertexOutOfRange`] for an unknown seed.
    pub fn with_seeds(
        graph: &'g G,
        mut seeds: Vec<VertexId>,
        sampling: NeighborSamplingConfig,
        config: LoaderConfig,
    ) -> Result<Self> {
        sampling.validate()?;
        if config.batch_size == 0 {
            return Err(Error::InvalidParameter("batch_size must be >= 1".into()));
        }
        if config.num_workers == 0 {
            return Err(Error::InvalidParameter("num_workers must be >= 1".into()));
        }
        let num_vertices = graph.num_vertices();
        if let Some(&vertex) = seeds.iter().find(|&&v| v >= num_vertices) {
            return Err(Error::VertexOutOfRange {
                vertex,
                num_vertices,
            });
        }
        if config.shuffle {
            seeds.shuffle(&mut ChaCha8Rng::seed_from_u64(config.seed));
        }
        Ok(Self {
            graph,
            seeds,
            weights: None,
            sampling,
            config,
            next_batch: 0,
            ready: VecDeque::new(),
        })
    }

    /// Sample neighbors in proportion to `weights[vertex]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WeightLengthMismatch`] unless there is one weight per vertex.
    pub fn weighted(mut self, weights: &'g [f64]) -> Result<Self> {
        if weights.len() != self.graph.num_vertices() {
            return Err(Error::WeightLengthMismatch {
                expected: self.graph.num_vertices(),
                got: weights.len(),
            });
        }
        self.weights = Some(weights);
        Ok(self)
    }

    pub fn num_batches(&self) -> usize {
        self.seeds.len().div_ceil(self.config.batch_size)
    }

    /// Seeds of every batch, in order, after the optional shuffle.
    pub fn seeds(&self) -> &[VertexId] {
        &self.seeds
    }

    fn refill(&mut self) {
        let first = self.next_batch;
        let last = (first + self.config.num_workers).min(self.num_batches());
        if first >= last {
            return;
        }
        let batch_size = self.config.batch_size;
        let (graph, seeds, weights) = (self.graph, &self.seeds, self.weights);
        let (sampling, base) = (&self.sampling, self.config.seed);

        let flows: Vec<Result<NodeFlow>> = (first..last)
            .into_par_iter()
            .map(|batch| {
                let start = batch * batch_size;
                let end = (start + batch_size).min(seeds.len());
                let mut rng = task_rng(base, batch as u64);
                let batch_seeds = &seeds[start..end];
                match weights {
                    None => sample_neighbors_with_rng(graph, batch_seeds, sampling, &mut rng),
                    Some(w) => sample_neighbors_weighted_with_rng(
                        graph,
                        batch_seeds,
                        w,
                        sampling,
                        &mut rng,
                    ),
                }
            })
            .collect();
        debug!(first, last, "sampled node flow batches");
        self.ready.extend(flows);
        self.next_batch = last;
    }
}

impl<'g, G: AdjacencyProvider + Sync + ?Sized> NodeFlowLoader<'g, G> {
    /// Hand every node flow, in batch order, to `consume`.
    ///
    /// Stops at the first sampling error or the first error `consume`
    /// returns. With [`LoaderConfig::prefetch`] the sampling runs on a scoped
    /// background thread feeding a bounded queue of `2 * num_workers` flows;
    /// the output is the same either way.
    ///
    /// # Errors
    ///
    /// The first error from sampling or from `consume`.
    pub fn try_for_each_flow<F>(self, mut consume: F) -> Result<()>
    where
        F: FnMut(NodeFlow) -> Result<()>,
    {
        if !self.config.prefetch {
            for flow in self {
                consume(flow?)?;
            }
            return Ok(());
        }

        let capacity = 2 * self.config.num_workers;
        let (sender, receiver) = mpsc::sync_channel(capacity);
        thread::scope(|scope| {
            scope.spawn(move || {
                for flow in self {
                    if sender.send(flow).is_err() {
                        return;
                    }
                }
            });
            drain(receiver, &mut consume)
        })
    }
}

/// Feed queued flows to `consume`. Dropping `receiver` on return unblocks
/// a producer still waiting to send.
fn drain<F>(receiver: mpsc::Receiver<Result<NodeFlow>>, consume: &mut F) -> Result<()>
where
    F: FnMut(NodeFlow) -> Result<()>,
{
    for flow in receiver {
        consume(flow?)?;
    }
    Ok(())
}

impl<'g, G: AdjacencyProvider + Sync + ?Sized> Iterator for NodeFlowLoader<'g, G> {
    type Item = Result<NodeFlow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ready.is_empty() {
            self.refill();
        }
        self.ready.pop_front()
    }
}
