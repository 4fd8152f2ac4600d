//! Workload generators for benchmarking Furrow arenas.
//!
//! - [`token_sizes`]: short, tokenizer-like request sizes from a seed
//! - [`mixed_sizes`]: mostly small requests with occasional large ones
//! - [`fill`]: drive an arena through a size sequence

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use furrow_arena::{Arena, ArenaError, HostMemory};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `n` request sizes in `1..=max_token`, deterministic in `seed`.
pub fn token_sizes(n: usize, max_token: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let max = max_token.max(1) as u64;
    (0..n)
        .map(|_| (rng.next_u64() % max) as usize + 1)
        .collect()
}

/// `n` request sizes where roughly one in `large_every` is `large`, the rest
/// drawn from `1..=small`.
pub fn mixed_sizes(n: usize, small: usize, large: usize, large_every: u32, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let small = small.max(1) as u64;
    let every = large_every.max(1);
    (0..n)
        .map(|_| {
            if rng.next_u32() % every == 0 {
                large
            } else {
                (rng.next_u64() % small) as usize + 1
            }
        })
        .collect()
}

/// Allocate every size in order, returning the total bytes served.
pub fn fill<H: HostMemory>(arena: &mut Arena<H>, sizes: &[usize]) -> Result<usize, ArenaError> {
    let mut total = 0;
    for &size in sizes {
        let alloc = arena.alloc(size)?;
        total += alloc.len();
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use furrow_arena::SystemHost;

    #[test]
    fn token_sizes_are_deterministic_and_bounded() {
        let a = token_sizes(256, 12, 7);
        let b = token_sizes(256, 12, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|&s| (1..=12).contains(&s)));
    }

    #[test]
    fn mixed_sizes_include_large_requests() {
        let sizes = mixed_sizes(1000, 16, 4000, 10, 3);
        assert!(sizes.contains(&4000));
        assert!(sizes.iter().all(|&s| s == 4000 || (1..=16).contains(&s)));
    }

    #[test]
    fn fill_serves_every_byte() {
        let sizes = token_sizes(100, 8, 1);
        let mut arena = Arena::with_block_size(SystemHost, 64).unwrap();
        assert_eq!(fill(&mut arena, &sizes).unwrap(), sizes.iter().sum::<usize>());
        assert_eq!(arena.sanity_code(), 0);
    }
}
