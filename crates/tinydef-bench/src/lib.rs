//! Benchmark workloads for tinydef.
//!
//! - [`frame_sizes`]: deterministic mix of allocation sizes resembling one
//!   frame of scratch traffic
//! - [`bench_arena`]: an arena with every page the workload touches already
//!   committed, so timings measure the cursor and not page faults

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tinydef_mem::{Arena, ArenaConfig};

/// Generate `count` allocation sizes between 8 and 4096 bytes.
///
/// Uses a fixed xorshift sequence seeded by `seed`, so every run of a
/// benchmark sees the same sizes.
pub fn frame_sizes(seed: u64, count: usize) -> Vec<usize> {
    let mut state = seed.max(1);
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            8 + (state % 4089) as usize
        })
        .collect()
}

/// Build an arena of `capacity` bytes and pre-commit its first `warm` bytes.
pub fn bench_arena(capacity: usize, warm: usize) -> Arena {
    let mut arena = Arena::with_config(ArenaConfig::new(capacity)).unwrap();
    arena.push(warm.min(arena.capacity()));
    arena.clear();
    arena
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_sizes_are_deterministic_and_bounded() {
        let a = frame_sizes(42, 256);
        assert_eq!(a, frame_sizes(42, 256));
        assert!(a.iter().all(|&s| (8..=4096).contains(&s)));
        assert_ne!(a, frame_sizes(7, 256));
    }

    #[test]
    fn bench_arena_starts_empty_and_warm() {
        let arena = bench_arena(1 << 20, 64 * 1024);
        assert_eq!(arena.used(), 0);
        assert!(arena.committed() >= 64 * 1024);
    }
}
