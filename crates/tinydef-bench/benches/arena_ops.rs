//! Criterion micro-benchmarks for arena push, pop, scope and scratch operations.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tinydef_bench::{bench_arena, frame_sizes};
use tinydef_core::Stack;
use tinydef_mem::{mem_close, mem_init, Arena, ArenaConfig};

const CAPACITY: usize = 64 * 1024 * 1024;
const WARM: usize = 8 * 1024 * 1024;

/// Benchmark: 1K mixed-size pushes followed by a single clear.
fn bench_push_clear_1k(c: &mut Criterion) {
    let sizes = frame_sizes(42, 1024);
    let mut arena = bench_arena(CAPACITY, WARM);
    c.bench_function("arena_push_clear_1k", |b| {
        b.iter(|| {
            for &size in &sizes {
                black_box(arena.push(size).as_ptr());
            }
            arena.clear();
        });
    });
}

/// Benchmark: push then pop the same size, the reuse fast path.
fn bench_push_pop(c: &mut Criterion) {
    let mut arena = bench_arena(CAPACITY, WARM);
    c.bench_function("arena_push_pop_256", |b| {
        b.iter(|| {
            black_box(arena.push(256).as_ptr());
            arena.pop(256);
        });
    });
}

/// Benchmark: nested scopes four deep, each with a few typed pushes.
fn bench_nested_scopes(c: &mut Criterion) {
    let mut arena = bench_arena(CAPACITY, WARM);
    c.bench_function("arena_nested_scopes_4", |b| {
        b.iter(|| {
            let mut outer = arena.scope();
            outer.push_value(1u64);
            let mut mid = outer.scope();
            mid.push_slice_copy(&[0u32; 16]);
            let mut inner = mid.scope();
            inner.push_aligned(100, 64);
            let deepest = inner.scope();
            black_box(deepest.push_value(3.0f32));
        });
    });
}

/// Benchmark: copy a 4 KiB buffer into the arena.
fn bench_push_copy_4k(c: &mut Criterion) {
    let src = vec![0xA5u8; 4096];
    let mut arena = bench_arena(CAPACITY, WARM);
    c.bench_function("arena_push_copy_4k", |b| {
        b.iter(|| {
            let scope = arena.scope();
            black_box(scope.push_copy(&src)[4095]);
        });
    });
}

/// Benchmark: first touch of fresh pages, including commit cost.
fn bench_cold_commit_1m(c: &mut Criterion) {
    c.bench_function("arena_cold_commit_1m", |b| {
        b.iter_batched(
            || Arena::with_config(ArenaConfig::new(CAPACITY)).unwrap(),
            |arena| {
                black_box(arena.push(1024 * 1024).as_ptr());
                arena.teardown().unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: scratch scope from the process scratch arena, as a callee would use it.
fn bench_scratch_scope(c: &mut Criterion) {
    let mut memory = mem_init().unwrap();
    let sizes = frame_sizes(7, 32);
    c.bench_function("scratch_scope_32", |b| {
        b.iter(|| {
            let scratch = memory.scratch_scope();
            let mut marks = Stack::<usize, 32>::new();
            for &size in &sizes {
                scratch.push(size);
                let _ = marks.push(scratch.used());
            }
            black_box(marks.peek().copied());
        });
    });
    mem_close(memory).unwrap();
}

criterion_group!(
    benches,
    bench_push_clear_1k,
    bench_push_pop,
    bench_nested_scopes,
    bench_push_copy_4k,
    bench_cold_commit_1m,
    bench_scratch_scope
);
criterion_main!(benches);
