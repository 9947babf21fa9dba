use std::{
    fmt::{self, Display},
    time::Duration,
};

use histo::Histogram;
use libstack::CasStat;
use serde::Serialize;
use strum::Display;

use crate::command_parser::stack_target::StackTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum Contention {
    LowContention,
    HighContention,
}

impl Contention {
    pub fn from_threads(num_thread: usize) -> Self {
        if num_thread <= 1 {
            Contention::LowContention
        } else {
            Contention::HighContention
        }
    }
}

/// Most latencies one worker keeps for the histogram.
pub const LATENCY_SAMPLES: usize = 1 << 16;

/// Latencies of one worker. Count, mean and max are exact. The samples kept
/// for the histogram are thinned to every `stride`-th pair, and the stride
/// doubles whenever `LATENCY_SAMPLES` would be exceeded.
#[derive(Debug, Clone)]
pub struct LatencySamples {
    count: u64,
    total: u128,
    max: u64,
    stride: u64,
    kept: Vec<u64>,
}

impl Default for LatencySamples {
    fn default() -> Self {
        Self {
            count: 0,
            total: 0,
            max: 0,
            stride: 1,
            kept: vec![],
        }
    }
}

impl LatencySamples {
    #[inline]
    pub fn record(&mut self, nanos: u64) {
        if self.count % self.stride == 0 {
            if self.kept.len() >= LATENCY_SAMPLES {
                let mut index = 0;
                self.kept.retain(|_| {
                    index += 1;
                    index % 2 == 1
                });
                self.stride *= 2;
            }
            if self.count % self.stride == 0 {
                self.kept.push(nanos);
            }
        }

        self.count += 1;
        self.total += nanos as u128;
        self.max = self.max.max(nanos);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn kept(&self) -> &[u64] {
        &self.kept
    }

    pub fn mean(&self) -> Option<Duration> {
        (self.count > 0).then(|| Duration::from_nanos((self.total / self.count as u128) as u64))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub samples: u64,
    pub mean: Duration,
    pub max: Duration,
}

impl LatencySummary {
    pub fn merge<'a>(workers: impl Iterator<Item = &'a LatencySamples>) -> Option<Self> {
        let (samples, total, max) = workers.fold((0u64, 0u128, 0u64), |(n, sum, max), w| {
            (n + w.count, sum + w.total, max.max(w.max))
        });

        (samples > 0).then(|| LatencySummary {
            samples,
            mean: Duration::from_nanos((total / samples as u128) as u64),
            max: Duration::from_nanos(max),
        })
    }
}

pub fn latency_histogram<'a>(workers: impl Iterator<Item = &'a LatencySamples>) -> Histogram {
    let mut histogram = Histogram::with_buckets(10);
    for latency in workers.flat_map(|w| w.kept.iter()) {
        histogram.add(*latency);
    }
    histogram
}

/// Result of one (variant, thread count) configuration.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub target: StackTarget,
    pub contention: Contention,
    pub num_thread: usize,
    pub elapsed: Duration,
    /// Completed push/pop pairs over all workers.
    pub pairs: u64,
    pub cas_stat: Option<CasStat>,
    pub latency: Option<LatencySummary>,
}

impl RunOutcome {
    pub fn pairs_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.pairs as f64 / secs
        }
    }

    /// Extra lines printed under the report line.
    pub fn details(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "  {} pairs, {:.0} pairs/s",
            self.pairs,
            self.pairs_per_sec()
        )];

        if let Some(stat) = &self.cas_stat {
            lines.push(format!(
                "  cas attempts {} failures {} ({:.2}%) skipped {}",
                stat.attempts,
                stat.failures,
                stat.failure_rate() * 100.0,
                stat.skipped
            ));
        }

        if let Some(latency) = &self.latency {
            lines.push(format!(
                "  latency mean {:?} max {:?} over {} samples",
                latency.mean, latency.max, latency.samples
            ));
        }

        lines
    }
}

impl Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} took {:?}",
            self.target, self.contention, self.num_thread, self.elapsed
        )
    }
}
