use crossbeam::epoch::{Guard, Shared};

use crate::{head::AtomicHead, node::Node};

/// Decides, once per retry iteration, whether a CAS on the head is issued.
///
/// A CAS takes the head's cache line in exclusive state whether it succeeds or
/// not, a load only needs it shared. Policies differ in how much they are
/// willing to pay before committing to the CAS.
pub trait CasPolicy: Send + Sync + 'static {
    const NAME: &'static str;

    fn should_attempt_cas<T>(
        head: &AtomicHead<T>,
        snapshot: Shared<'_, Node<T>>,
        guard: &Guard,
    ) -> bool;
}

/// Load, then CAS unconditionally.
#[derive(Debug, Default, Clone, Copy)]
pub struct Naive;

/// Load, re-load right before the CAS, and only CAS when both loads agree.
#[derive(Debug, Default, Clone, Copy)]
pub struct Guarded;

impl CasPolicy for Naive {
    const NAME: &'static str = "Naive";

    #[inline(always)]
    fn should_attempt_cas<T>(_: &AtomicHead<T>, _: Shared<'_, Node<T>>, _: &Guard) -> bool {
        true
    }
}

impl CasPolicy for Guarded {
    const NAME: &'static str = "Guarded";

    #[inline(always)]
    fn should_attempt_cas<T>(
        head: &AtomicHead<T>,
        snapshot: Shared<'_, Node<T>>,
        guard: &Guard,
    ) -> bool {
        head.load(guard) == snapshot
    }
}
