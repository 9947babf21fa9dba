use std::{
    fmt::{self, Display},
    marker::PhantomData,
    mem::ManuallyDrop,
    ptr,
    sync::atomic::Ordering,
};

use crossbeam::epoch;
#[cfg(feature = "cas_stat")]
use crossbeam::utils::CachePadded;
#[cfg(feature = "cas_stat")]
use thread_local::ThreadLocal;

#[cfg(feature = "cas_stat")]
use crate::cas_stat::CasCounter;
use crate::{
    cas_stat::{CasEvent, CasStat},
    head::AtomicHead,
    node::Node,
    policy::{CasPolicy, Guarded, Naive},
};

use super::ConcurrentStack;

pub type NaiveStack<T> = AtomicLinkedStack<T, Naive>;
pub type GuardedStack<T> = AtomicLinkedStack<T, Guarded>;

/// Treiber stack whose CAS loop is shaped by the policy `P`.
///
/// Nodes are reclaimed through `crossbeam::epoch`: every operation stays
/// pinned for its whole retry loop and popped nodes are only retired, so an
/// address observed in a snapshot cannot be freed and handed out again while
/// that snapshot is still in use. This keeps the head CAS free of ABA.
#[derive(Debug)]
pub struct AtomicLinkedStack<T, P: CasPolicy> {
    head: AtomicHead<T>,
    #[cfg(feature = "cas_stat")]
    pub(crate) stat: ThreadLocal<CachePadded<CasCounter>>,
    policy: PhantomData<P>,
}

unsafe impl<T: Send, P: CasPolicy> Send for AtomicLinkedStack<T, P> {}
unsafe impl<T: Send, P: CasPolicy> Sync for AtomicLinkedStack<T, P> {}

impl<T, P: CasPolicy> AtomicLinkedStack<T, P> {
    pub fn new() -> Self {
        Self {
            head: AtomicHead::null(),
            #[cfg(feature = "cas_stat")]
            stat: ThreadLocal::new(),
            policy: PhantomData,
        }
    }

    pub fn variant_name(&self) -> &'static str {
        P::NAME
    }

    pub fn push(&self, value: T) {
        let mut node = Node::new(value);
        let guard = epoch::pin();

        loop {
            let snapshot = self.head.load(&guard);
            node.next.store(snapshot, Ordering::Relaxed);

            if !P::should_attempt_cas(&self.head, snapshot, &guard) {
                self.record(CasEvent::Skip);
                continue;
            }

            self.record(CasEvent::Attempt);
            match self.head.compare_and_swap(snapshot, node, &guard) {
                Ok(_) => return,
                Err(e) => {
                    self.record(CasEvent::Failure);
                    node = e.new;
                }
            }
        }
    }

    pub fn pop(&self) -> Option<T> {
        let guard = epoch::pin();

        loop {
            let snapshot = self.head.load(&guard);

            // Safety: the guard keeps every node reachable from the snapshot alive.
            let top = match unsafe { snapshot.as_ref() } {
                Some(top) => top,
                None => return None,
            };
            let next = top.next.load(Ordering::Acquire, &guard);

            if !P::should_attempt_cas(&self.head, snapshot, &guard) {
                self.record(CasEvent::Skip);
                continue;
            }

            self.record(CasEvent::Attempt);
            if self.head.compare_and_swap(snapshot, next, &guard).is_ok() {
                // Safety: the successful CAS unlinked `top`, no other pop can
                // win it, so the value is read out exactly once. The node is
                // freed after every thread pinned now has unpinned.
                unsafe {
                    let value = ManuallyDrop::into_inner(ptr::read(&top.value));
                    guard.defer_destroy(snapshot);
                    return Some(value);
                }
            }

            self.record(CasEvent::Failure);
        }
    }

    pub fn is_empty(&self) -> bool {
        let guard = epoch::pin();
        self.head.load(&guard).is_null()
    }

    #[cfg(feature = "cas_stat")]
    pub fn cas_stat(&self) -> Option<CasStat> {
        Some(self.stat.iter().map(|counter| counter.snapshot()).sum())
    }

    #[cfg(not(feature = "cas_stat"))]
    pub fn cas_stat(&self) -> Option<CasStat> {
        None
    }

    #[cfg(feature = "cas_stat")]
    #[inline(always)]
    fn record(&self, event: CasEvent) {
        self.stat.get_or_default().record(event);
    }

    #[cfg(not(feature = "cas_stat"))]
    #[inline(always)]
    fn record(&self, _: CasEvent) {}
}

impl<T, P: CasPolicy> Default for AtomicLinkedStack<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: CasPolicy> Display for AtomicLinkedStack<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", P::NAME)
    }
}

impl<T, P> ConcurrentStack<T> for AtomicLinkedStack<T, P>
where
    T: Send,
    P: CasPolicy,
{
    #[inline]
    fn push(&self, value: T) {
        AtomicLinkedStack::push(self, value)
    }

    #[inline]
    fn pop(&self) -> Option<T> {
        AtomicLinkedStack::pop(self)
    }

    fn is_empty(&self) -> bool {
        AtomicLinkedStack::is_empty(self)
    }

    fn cas_stat(&self) -> Option<CasStat> {
        AtomicLinkedStack::cas_stat(self)
    }
}

impl<T, P: CasPolicy> Drop for AtomicLinkedStack<T, P> {
    fn drop(&mut self) {
        // `&mut self` means no operation is in flight.
        unsafe {
            let guard = epoch::unprotected();
            let mut current = self.head.load(guard);

            while let Some(node) = current.as_ref() {
                let next = node.next.load(Ordering::Relaxed, guard);
                let mut owned = current.into_owned();
                ManuallyDrop::drop(&mut owned.value);
                current = next;
            }
        }
    }
}
