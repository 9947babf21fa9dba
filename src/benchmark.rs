use quanta::Clock;

use crate::{command_parser::GlobalOpts, error::BenchError};

use self::{bencher::Bencher, records::RecordWriter, report::RunOutcome};

pub mod bencher;
mod helper;
pub mod payload;
pub mod push_pop;
pub mod records;
pub mod report;

pub fn benchmark(
    num_cpu: usize,
    num_thread: usize,
    options: &GlobalOpts,
    writer: Option<&mut RecordWriter>,
) -> Result<Vec<RunOutcome>, BenchError> {
    let bencher = Bencher::new(
        num_cpu,
        num_thread,
        options.targets(),
        options.workload(),
        options.latency,
        options.verbose,
        Clock::new(),
    )?;

    bencher.benchmark(writer)
}
