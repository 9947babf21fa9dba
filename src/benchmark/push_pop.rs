use std::{
    hint::black_box,
    sync::{
        atomic::{AtomicBool, Ordering},
        Barrier,
    },
    thread,
    time::Duration,
};

use core_affinity::CoreId;
use debug_print::debug_println;
use libstack::{ConcurrentStack, StackType};

use crate::{
    benchmark::{
        bencher::{Bencher, Workload},
        payload::PayloadSource,
        records::Records,
        report::{Contention, LatencySamples, LatencySummary, RunOutcome},
    },
    command_parser::stack_target::StackTarget,
    error::BenchError,
};

/// Run one configuration on a fresh stack of `target`'s variant.
///
/// Every worker pushes a payload and pops right after; the whole run is timed
/// from the moment all workers are released until the last one is joined.
pub fn push_pop_benchmark<S, F>(
    bencher: &Bencher,
    target: StackTarget,
    payloads: F,
) -> Result<(RunOutcome, Vec<Records>), BenchError>
where
    S: PayloadSource,
    F: Fn(usize) -> S + Sync,
{
    let stack = target.to_stacktype::<u32>();
    let contention = Contention::from_threads(bencher.num_thread);

    debug_println!(
        "Start benchmark for {} with {} threads on {} cpus",
        stack,
        bencher.num_thread,
        bencher.num_cpu
    );

    let (mut records, elapsed) = start_benchmark(bencher, &stack, &payloads)?;

    let pushed: u64 = records.iter().map(|r| r.push_count).sum();
    let popped: u64 = records.iter().map(|r| r.pop_count).sum();
    let empty_pops: u64 = records.iter().map(|r| r.empty_pops).sum();
    let drained = stack.is_empty();

    if pushed != popped || empty_pops > 0 || !drained {
        return Err(BenchError::Conservation {
            target,
            pushed,
            popped,
            empty_pops,
            drained,
        });
    }

    let cas_stat = stack.cas_stat();
    for record in records.iter_mut() {
        record.target = target.to_string();
        record.contention = contention.to_string();
        record.cas_attempts = cas_stat.map(|s| s.attempts);
        record.cas_failures = cas_stat.map(|s| s.failures);
        record.cas_skipped = cas_stat.map(|s| s.skipped);
    }

    let latency = if bencher.stat_latency {
        LatencySummary::merge(records.iter().map(|r| &r.latencies))
    } else {
        None
    };

    let outcome = RunOutcome {
        target,
        contention,
        num_thread: bencher.num_thread,
        elapsed,
        pairs: popped,
        cas_stat,
        latency,
    };

    Ok((outcome, records))
}

fn start_benchmark<S, F>(
    bencher: &Bencher,
    stack: &StackType<u32>,
    payloads: &F,
) -> Result<(Vec<Records>, Duration), BenchError>
where
    S: PayloadSource,
    F: Fn(usize) -> S + Sync,
{
    let stop_signal = AtomicBool::new(false);
    let start = Barrier::new(bencher.num_thread + 1);

    let core_ids: Vec<CoreId> = core_affinity::get_core_ids()
        .unwrap_or_default()
        .into_iter()
        .take(bencher.num_cpu)
        .collect();

    thread::scope(|scope| {
        let handles = (0..bencher.num_thread)
            .map(|id| {
                let core_id = (!core_ids.is_empty()).then(|| core_ids[id % core_ids.len()]);
                let clock = bencher.clock.clone();
                let workload = bencher.workload;
                let stat_latency = bencher.stat_latency;
                let base = Records::from_bencher(bencher);
                let stop_signal = &stop_signal;
                let start = &start;

                scope.spawn(move || {
                    if let Some(core_id) = core_id {
                        core_affinity::set_for_current(core_id);
                    }

                    let mut payloads = payloads(id);
                    let mut latencies = LatencySamples::default();
                    let mut push_count = 0u64;
                    let mut pop_count = 0u64;
                    let mut empty_pops = 0u64;

                    start.wait();
                    let begin = clock.now();

                    loop {
                        let keep_going = match workload {
                            Workload::Ops(ops) => push_count < ops,
                            Workload::Duration(_) => !stop_signal.load(Ordering::Acquire),
                        };
                        if !keep_going {
                            break;
                        }

                        let op_begin = stat_latency.then(|| clock.now());

                        stack.push(payloads.next_payload());
                        push_count += 1;

                        match stack.pop() {
                            Some(value) => {
                                black_box(value);
                                pop_count += 1;
                            }
                            None => empty_pops += 1,
                        }

                        if let Some(op_begin) = op_begin {
                            latencies.record(clock.now().duration_since(op_begin).as_nanos() as u64);
                        }
                    }

                    let elapsed = clock.now().duration_since(begin);

                    debug_println!("worker {} finished {} pairs in {:?}", id, pop_count, elapsed);

                    Records {
                        id,
                        cpu_id: core_id.map(|c| c.id),
                        push_count,
                        pop_count,
                        empty_pops,
                        elapsed,
                        mean_latency: latencies.mean().map(|mean| mean.as_nanos() as u64),
                        latencies,
                        ..base
                    }
                })
            })
            .collect::<Vec<_>>();

        start.wait();
        let begin = bencher.clock.now();

        if let Workload::Duration(duration) = bencher.workload {
            thread::sleep(duration);
            stop_signal.store(true, Ordering::Release);
        }

        let records = handles
            .into_iter()
            .enumerate()
            .map(|(id, h)| h.join().map_err(|_| BenchError::WorkerPanicked(id)))
            .collect::<Result<Vec<_>, _>>()?;

        let elapsed = bencher.clock.now().duration_since(begin);

        Ok((records, elapsed))
    })
}
