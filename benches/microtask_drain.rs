//! Event loop throughput benchmarks for settle.
//!
//! These benchmarks measure:
//! - Microtask checkpoint drain (raw closures)
//! - Reaction fan-out on a single settled promise
//! - Chain depth (one microtask per link)
//! - Combinators over many members
//! - Virtual timer expiry

#![allow(missing_docs)]
#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::cell::Cell;
use std::rc::Rc;

use settle::combinator::{all, all_settled, timeout};
use settle::{EventLoop, LoopConfig, Promise};

fn bench_loop() -> EventLoop {
    EventLoop::with_config(LoopConfig::new().no_step_limit())
}

// =============================================================================
// MICROTASK DRAIN
// =============================================================================

fn bench_microtask_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("microtask_drain");

    for count in [100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("closures", count), &count, |b, &count| {
            b.iter(|| {
                let lp = bench_loop();
                let h = lp.handle();
                let hits = Rc::new(Cell::new(0u64));
                for _ in 0..count {
                    let hits = Rc::clone(&hits);
                    h.queue_microtask(move || hits.set(hits.get() + 1));
                }
                lp.run_microtasks().unwrap();
                black_box(hits.get())
            })
        });

        group.bench_with_input(BenchmarkId::new("fan_out", count), &count, |b, &count| {
            b.iter(|| {
                let lp = bench_loop();
                let h = lp.handle();
                let settled = Promise::<u64, ()>::resolved(&h, 1);
                let derived: Vec<_> = (0..count).map(|_| settled.map(|v| v + 1)).collect();
                lp.run_microtasks().unwrap();
                black_box(derived.len())
            })
        });
    }

    group.finish();
}

// =============================================================================
// CHAIN DEPTH
// =============================================================================

fn bench_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_depth");

    for depth in [10u64, 100, 1_000] {
        group.throughput(Throughput::Elements(depth));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| {
                let lp = bench_loop();
                let h = lp.handle();
                let mut tail = Promise::<u64, ()>::resolved(&h, 0);
                for _ in 0..depth {
                    tail = tail.map(|v| v + 1);
                }
                black_box(lp.block_on(&tail).unwrap())
            })
        });
    }

    group.finish();
}

// =============================================================================
// COMBINATORS
// =============================================================================

fn bench_combinators(c: &mut Criterion) {
    let mut group = c.benchmark_group("combinators");

    for members in [10u64, 100, 1_000] {
        group.throughput(Throughput::Elements(members));
        group.bench_with_input(BenchmarkId::new("all", members), &members, |b, &members| {
            b.iter(|| {
                let lp = bench_loop();
                let h = lp.handle();
                let combined = all(&h, (0..members).map(|i| Promise::<u64, ()>::delay(&h, i % 16, i)));
                black_box(lp.block_on(&combined).unwrap())
            })
        });
        group.bench_with_input(
            BenchmarkId::new("all_settled", members),
            &members,
            |b, &members| {
                b.iter(|| {
                    let lp = bench_loop();
                    let h = lp.handle();
                    let combined = all_settled(
                        &h,
                        (0..members).map(|i| Promise::<u64, u64>::rejected_after(&h, i % 16, i)),
                    );
                    black_box(lp.block_on(&combined).unwrap())
                })
            },
        );
    }

    group.finish();
}

// =============================================================================
// TIMERS
// =============================================================================

fn bench_timer_expiry(c: &mut Criterion) {
    let mut group = c.benchmark_group("timer_expiry");

    for count in [100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let lp = bench_loop();
                let h = lp.handle();
                for i in 0..count {
                    h.set_timeout(i % 1_000, || {});
                }
                black_box(lp.run().unwrap().stats.timers_fired)
            })
        });
    }

    group.finish();
}

fn bench_timeouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeouts");

    for count in [100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("settle_early", count), &count, |b, &count| {
            b.iter(|| {
                let lp = bench_loop();
                let h = lp.handle();
                let bounded: Vec<_> = (0..count)
                    .map(|i| {
                        let target = Promise::<u64, u64>::resolved(&h, i);
                        timeout(&h, &target, 1_000 + i, i)
                    })
                    .collect();
                let joined = all(&h, bounded);
                black_box(lp.block_on(&joined).unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_microtask_drain,
    bench_chain_depth,
    bench_combinators,
    bench_timer_expiry,
    bench_timeouts,
);

criterion_main!(benches);
