//! Per-task random streams for parallel work.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// SplitMix64 finalizer: spreads nearby inputs across the whole `u64` range.
pub(crate) fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    x
}

/// Independent generator for work item `stream` under `base`.
///
/// Depends only on `(base, stream)`, never on which thread runs the item.
pub(crate) fn task_rng(base: u64, stream: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(mix64(base ^ mix64(stream)))
}
