//! Criterion benchmarks for the ticket queue.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use courtside_queue::TicketQueue;

fn fill_and_drain(n: usize) -> usize {
    let queue = TicketQueue::with_capacity(n);
    for i in 0..n {
        let _ = queue.enqueue(i);
    }
    std::iter::from_fn(|| queue.try_dequeue()).count()
}

fn drain_concurrently(n: usize, consumers: usize) -> usize {
    let queue = TicketQueue::with_capacity(n);
    for i in 0..n {
        let _ = queue.enqueue(i);
    }
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..consumers)
            .map(|_| s.spawn(|| std::iter::from_fn(|| queue.try_dequeue()).count()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap_or(0)).sum()
    })
}

fn bench_queue(c: &mut Criterion) {
    let sizes: Vec<usize> = vec![64, 512, 4_096];

    let mut group = c.benchmark_group("SingleThread");
    for &n in &sizes {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| fill_and_drain(n));
        });
    }
    group.finish();

    let mut group = c.benchmark_group("FourConsumers");
    for &n in &sizes {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| drain_concurrently(n, 4));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_queue);
criterion_main!(benches);
