use std::{
    iter::Sum,
    ops::{Add, AddAssign},
    sync::atomic::{AtomicU64, Ordering},
};

/// CAS activity on one stack, summed over every thread that touched it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CasStat {
    /// CAS instructions issued.
    pub attempts: u64,
    /// Issued CAS instructions that lost the race.
    pub failures: u64,
    /// CAS instructions the policy decided not to issue.
    pub skipped: u64,
}

impl CasStat {
    pub fn successes(&self) -> u64 {
        self.attempts.saturating_sub(self.failures)
    }

    /// Fraction of issued CAS instructions that failed.
    pub fn failure_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.failures as f64 / self.attempts as f64
        }
    }
}

impl Add for CasStat {
    type Output = CasStat;

    fn add(self, rhs: Self) -> Self::Output {
        CasStat {
            attempts: self.attempts + rhs.attempts,
            failures: self.failures + rhs.failures,
            skipped: self.skipped + rhs.skipped,
        }
    }
}

impl AddAssign for CasStat {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for CasStat {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(CasStat::default(), Add::add)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum CasEvent {
    Attempt,
    Failure,
    Skip,
}

/// Per-thread counters. Only the owning thread writes, so relaxed increments
/// are enough. The stack keeps each one on its own cache line.
#[cfg_attr(not(feature = "cas_stat"), allow(dead_code))]
#[derive(Debug, Default)]
pub(crate) struct CasCounter {
    attempts: AtomicU64,
    failures: AtomicU64,
    skipped: AtomicU64,
}

#[cfg_attr(not(feature = "cas_stat"), allow(dead_code))]
impl CasCounter {
    #[inline]
    pub(crate) fn record(&self, event: CasEvent) {
        let counter = match event {
            CasEvent::Attempt => &self.attempts,
            CasEvent::Failure => &self.failures,
            CasEvent::Skip => &self.skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CasStat {
        CasStat {
            attempts: self.attempts.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}
