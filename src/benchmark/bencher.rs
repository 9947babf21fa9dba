use std::time::Duration;

use quanta::Clock;

use crate::{
    benchmark::{
        push_pop::push_pop_benchmark,
        records::RecordWriter,
        report::{latency_histogram, RunOutcome},
    },
    command_parser::stack_target::StackTarget,
    error::BenchError,
};

/// How long each worker keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    /// Push/pop pairs per worker.
    Ops(u64),
    /// Wall-clock budget for the whole run; workers stop between iterations.
    Duration(Duration),
}

#[derive(Debug)]
pub struct Bencher {
    pub num_cpu: usize,
    pub num_thread: usize,
    pub targets: Vec<StackTarget>,
    pub workload: Workload,
    pub stat_latency: bool,
    pub verbose: bool,
    pub clock: Clock,
}

impl Bencher {
    pub fn new(
        num_cpu: usize,
        num_thread: usize,
        targets: Vec<StackTarget>,
        workload: Workload,
        stat_latency: bool,
        verbose: bool,
        clock: Clock,
    ) -> Result<Self, BenchError> {
        if num_thread == 0 {
            return Err(BenchError::ZeroThreads);
        }
        if num_cpu == 0 {
            return Err(BenchError::ZeroCpus);
        }
        match workload {
            Workload::Ops(0) => return Err(BenchError::ZeroOps),
            Workload::Duration(d) if d.is_zero() => return Err(BenchError::ZeroDuration),
            _ => {}
        }

        Ok(Self {
            num_cpu,
            num_thread,
            targets,
            workload,
            stat_latency,
            verbose,
            clock,
        })
    }

    pub fn benchmark(
        &self,
        mut writer: Option<&mut RecordWriter>,
    ) -> Result<Vec<RunOutcome>, BenchError> {
        let mut outcomes = Vec::with_capacity(self.targets.len());

        for target in self.targets.iter() {
            let (outcome, records) = push_pop_benchmark(self, *target, |_| rand::thread_rng())?;

            println!("{}", outcome);
            for line in outcome.details() {
                println!("{}", line);
            }

            if self.verbose && outcome.latency.is_some() {
                println!(
                    "{}",
                    latency_histogram(records.iter().map(|r| &r.latencies))
                );
            }

            if let Some(writer) = writer.as_deref_mut() {
                writer.write_results(&records)?;
            }

            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}
