use std::{fs::File, path::Path, time::Duration};

use csv::Writer;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationNanoSeconds};

use crate::{
    benchmark::{bencher::Bencher, helper::create_writer, report::LatencySamples},
    error::BenchError,
};

/// One row per worker thread.
#[serde_as]
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Records {
    pub id: usize,
    pub cpu_id: Option<usize>,
    pub thread_num: usize,
    pub cpu_num: usize,
    pub target: String,
    pub contention: String,
    pub push_count: u64,
    pub pop_count: u64,
    pub empty_pops: u64,
    #[serde_as(as = "DurationNanoSeconds")]
    pub elapsed: Duration,
    pub mean_latency: Option<u64>,
    pub cas_attempts: Option<u64>,
    pub cas_failures: Option<u64>,
    pub cas_skipped: Option<u64>,
    #[serde(skip)]
    pub latencies: LatencySamples,
}

impl Records {
    pub fn from_bencher(bencher: &Bencher) -> Self {
        Self {
            thread_num: bencher.num_thread,
            cpu_num: bencher.num_cpu,
            ..Default::default()
        }
    }
}

/// CSV sink shared by every configuration of one invocation.
pub struct RecordWriter {
    writer: Writer<File>,
}

impl RecordWriter {
    pub fn create(output_path: &Path, file_name: &str) -> Result<Self, BenchError> {
        let writer = create_writer(&output_path.join(format!("{file_name}.csv")))?;
        Ok(Self { writer })
    }

    pub fn write_results(&mut self, records: &[Records]) -> Result<(), BenchError> {
        for record in records {
            self.writer.serialize(record)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), BenchError> {
        self.writer.flush()?;
        Ok(())
    }
}
