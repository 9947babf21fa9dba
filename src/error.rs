use thiserror::Error;

use crate::command_parser::stack_target::StackTarget;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("thread count must be positive")]
    ZeroThreads,
    #[error("no thread counts to run")]
    NoThreadCounts,
    #[error("cpu count must be positive")]
    ZeroCpus,
    #[error("operations per thread must be positive")]
    ZeroOps,
    #[error("run duration must be positive")]
    ZeroDuration,
    #[error("got {cpus} cpu counts for {threads} thread counts")]
    CpuThreadMismatch { cpus: usize, threads: usize },
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
    #[error(
        "{target} stack lost track of nodes: {pushed} pushed, {popped} popped, \
         {empty_pops} pops saw an empty stack, drained: {drained}"
    )]
    Conservation {
        target: StackTarget,
        pushed: u64,
        popped: u64,
        empty_pops: u64,
        drained: bool,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
