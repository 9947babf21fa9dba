use core_affinity::*;
use criterion::measurement::WallTime;
use criterion::BenchmarkGroup;
use criterion::BenchmarkId;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use std::{
    sync::Barrier,
    thread::{self, available_parallelism},
};

extern crate libstack;

use libstack::{ConcurrentStack, StackType};

const ITERATION: u64 = 1000;

pub fn stack_bench(bencher: &mut Criterion) {
    let cpu_count = available_parallelism().unwrap().get();

    let mut group = bencher.benchmark_group("Treiber Stack");

    for (label, thread) in [("LowContention", 1), ("HighContention", 4)] {
        bench_inner(StackType::guarded(), label, &mut group, cpu_count, thread);
        bench_inner(StackType::naive(), label, &mut group, cpu_count, thread);
    }

    group.finish();
}

#[inline]
fn bench_inner(
    stack: StackType<u32>,
    label: &str,
    bencher: &mut BenchmarkGroup<WallTime>,
    cpu_count: usize,
    thread_count: usize,
) {
    let name = format!("{}_{}", stack, label);

    bencher.bench_with_input(BenchmarkId::new(name, thread_count), &cpu_count, |b, _i| {
        b.iter(|| {
            black_box(push_pop_rounds(&stack, cpu_count, thread_count, ITERATION));
            assert!(stack.is_empty());
        });
    });
}

fn push_pop_rounds(
    stack: &StackType<u32>,
    cpu_count: usize,
    thread_count: usize,
    iteration: u64,
) -> u64 {
    let start = Barrier::new(thread_count);

    thread::scope(|scope| {
        let handles = (0..thread_count)
            .map(|id| {
                let start = &start;
                scope.spawn(move || {
                    set_for_current(CoreId {
                        id: (id % cpu_count),
                    });
                    let rng = &mut rand::thread_rng();
                    let mut popped = 0;

                    start.wait();
                    for _ in 0..iteration {
                        stack.push(rng.gen::<u32>());
                        if stack.pop().is_some() {
                            popped += 1;
                        }
                    }
                    popped
                })
            })
            .collect::<Vec<_>>();

        handles.into_iter().map(|h| h.join().unwrap()).sum()
    })
}

criterion_group!(benches, stack_bench);

criterion_main!(benches);
