use std::fmt::{self, Display};

use enum_dispatch::enum_dispatch;

use crate::{
    cas_stat::CasStat,
    policy::{Guarded, Naive},
};

use self::atomic_linked::AtomicLinkedStack;

pub mod atomic_linked;

/// The capability every stack variant offers to the benchmark.
#[enum_dispatch]
pub trait ConcurrentStack<T>: Send + Sync {
    fn push(&self, value: T);

    /// `None` means the stack was observed empty; it is not an error.
    fn pop(&self) -> Option<T>;

    fn is_empty(&self) -> bool;

    /// Summed CAS counters, or `None` when built without `cas_stat`.
    fn cas_stat(&self) -> Option<CasStat>;
}

/// A stack whose variant is picked at construction time.
#[enum_dispatch(ConcurrentStack<T>)]
#[derive(Debug)]
pub enum StackType<T>
where
    T: Send + 'static,
{
    Naive(AtomicLinkedStack<T, Naive>),
    Guarded(AtomicLinkedStack<T, Guarded>),
}

impl<T> StackType<T>
where
    T: Send + 'static,
{
    pub fn naive() -> Self {
        StackType::Naive(AtomicLinkedStack::new())
    }

    pub fn guarded() -> Self {
        StackType::Guarded(AtomicLinkedStack::new())
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            StackType::Naive(stack) => stack.variant_name(),
            StackType::Guarded(stack) => stack.variant_name(),
        }
    }
}

impl<T> Display for StackType<T>
where
    T: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.variant_name())
    }
}
