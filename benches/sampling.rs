use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hopflow::{
    random_walk, sample_neighbors_with_rng, Categorical, CsrGraph, NeighborSamplingConfig,
    SamplerKind, WalkConfig, WeightedSampler,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Ring with `extra` long-range chords per vertex.
fn chorded_ring(n: usize, extra: usize) -> CsrGraph {
    let edges: Vec<(usize, usize)> = (0..n)
        .flat_map(|v| (0..=extra).map(move |j| (v, (v + 1 + j * 97) % n)))
        .collect();
    CsrGraph::from_edges(n, &edges).expect("valid edges")
}

fn bench_weighted_draws(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighted");
    let sizes = [100, 10_000];
    let kinds = [SamplerKind::Alias, SamplerKind::Cdf, SamplerKind::Tree];

    for &size in &sizes {
        let weights: Vec<f64> = (0..size).map(|i| 1.0 + (i % 7) as f64).collect();
        for kind in kinds {
            group.bench_function(format!("{kind:?}_replace_n{size}"), |b| {
                let mut rng = ChaCha8Rng::seed_from_u64(0);
                let mut sampler = WeightedSampler::new(kind, &weights, true).expect("weights ok");
                b.iter(|| black_box(sampler.draw(&mut rng)))
            });
            // Draw half the population, then reset.
            group.bench_function(format!("{kind:?}_half_without_n{size}"), |b| {
                let mut rng = ChaCha8Rng::seed_from_u64(0);
                let mut sampler = WeightedSampler::new(kind, &weights, false).expect("weights ok");
                b.iter(|| {
                    sampler.reset_state(black_box(&weights)).expect("weights ok");
                    black_box(sampler.draw_many(size / 2, &mut rng))
                })
            });
        }
    }
    group.finish();
}

fn bench_neighbor_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_neighbors");
    let graph = chorded_ring(100_000, 15);
    let seeds: Vec<usize> = (0..1_000).map(|i| i * 97).collect();

    for &fanout in &[5, 10] {
        let config = NeighborSamplingConfig {
            num_hops: 3,
            fanout,
            ..Default::default()
        };
        group.bench_function(format!("hops3_fanout{fanout}_seeds1000"), |b| {
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            b.iter(|| {
                let nf = sample_neighbors_with_rng(&graph, &seeds, &config, &mut rng);
                black_box(nf)
            })
        });
    }
    group.finish();
}

fn bench_random_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_walk");
    let graph = chorded_ring(100_000, 3);
    let seeds: Vec<usize> = (0..1_000).collect();
    let config = WalkConfig {
        num_traces: 4,
        num_hops: 40,
        seed: Some(0),
    };

    group.bench_function("seeds1000_traces4_hops40", |b| {
        b.iter(|| {
            let traces = random_walk(&graph, black_box(&seeds), &config);
            black_box(traces)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_weighted_draws,
    bench_neighbor_sampling,
    bench_random_walk
);
criterion_main!(benches);
