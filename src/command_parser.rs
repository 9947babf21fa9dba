use std::{iter::repeat, thread::available_parallelism, time::Duration};

use clap::*;

use crate::{benchmark::bencher::Workload, error::BenchError};

use self::stack_target::StackTarget;

pub mod stack_target;

#[derive(Debug, Parser)]
#[clap(name = "treiber stack contention benchmark", version)]
/// Benchmark Utility
pub struct App {
    #[command(flatten)]
    pub global_opts: GlobalOpts,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Stack variants to benchmark (default: all)
    #[arg(num_args(0..), value_delimiter = ',', value_terminator("."), long)]
    pub targets: Option<Vec<StackTarget>>,
    #[arg(num_args(0..), value_delimiter = ',', value_terminator("."), long, short, default_values_t = vec![1usize, 4])]
    pub threads: Vec<usize>,
    /// Cores to pin workers to, one value per thread count (a single value is reused)
    #[arg(num_args(0..), value_delimiter = ',', value_terminator("."), long, short)]
    pub cpus: Vec<usize>,
    /// Push/pop pairs per worker
    #[arg(long, default_value = "1000000")]
    pub ops: u64,
    /// Run each configuration for this many seconds instead of a fixed op count
    #[arg(long, short)]
    pub duration: Option<u64>,
    #[arg(long, short)]
    pub output_path: Option<String>,
    #[arg(long, default_value = "push_pop")]
    pub file_name: String,
    /// Sample the latency of every push/pop pair
    #[arg(long, short)]
    pub latency: bool,
    #[arg(long, short)]
    pub verbose: bool,
}

impl GlobalOpts {
    pub fn workload(&self) -> Workload {
        match self.duration {
            Some(secs) => Workload::Duration(Duration::from_secs(secs)),
            None => Workload::Ops(self.ops),
        }
    }

    pub fn targets(&self) -> Vec<StackTarget> {
        self.targets
            .clone()
            .unwrap_or_else(StackTarget::to_vec)
    }

    /// Cpu count for every entry of `threads`.
    pub fn cpu_counts(&self) -> Result<Vec<usize>, BenchError> {
        if self.threads.is_empty() {
            return Err(BenchError::NoThreadCounts);
        }

        let cpus: Vec<usize> = match self.cpus.len() {
            0 => {
                let available = available_parallelism().map(|n| n.get()).unwrap_or(1);
                repeat(available).take(self.threads.len()).collect()
            }
            1 => repeat(self.cpus[0]).take(self.threads.len()).collect(),
            len if len == self.threads.len() => self.cpus.clone(),
            len => {
                return Err(BenchError::CpuThreadMismatch {
                    cpus: len,
                    threads: self.threads.len(),
                })
            }
        };

        if cpus.contains(&0) {
            return Err(BenchError::ZeroCpus);
        }

        Ok(cpus)
    }
}
