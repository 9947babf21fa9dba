use std::sync::atomic::Ordering;

use crossbeam::{
    epoch::{Atomic, CompareExchangeError, Guard, Pointer, Shared},
    utils::CachePadded,
};

use crate::node::Node;

/// The top-of-stack pointer.
///
/// Only `load` and `compare_and_swap` are exposed: nothing outside this type
/// can issue a plain store to the head.
#[derive(Debug)]
pub struct AtomicHead<T> {
    ptr: CachePadded<Atomic<Node<T>>>,
}

impl<T> AtomicHead<T> {
    pub(crate) fn null() -> Self {
        Self {
            ptr: CachePadded::new(Atomic::null()),
        }
    }

    #[inline]
    pub fn load<'g>(&self, guard: &'g Guard) -> Shared<'g, Node<T>> {
        self.ptr.load(Ordering::Acquire, guard)
    }

    /// Replace `current` with `new`. On failure the caller gets `new` back
    /// inside the error so an owned node can be relinked and retried.
    #[inline]
    pub fn compare_and_swap<'g, P>(
        &self,
        current: Shared<'_, Node<T>>,
        new: P,
        guard: &'g Guard,
    ) -> Result<Shared<'g, Node<T>>, CompareExchangeError<'g, Node<T>, P>>
    where
        P: Pointer<Node<T>>,
    {
        self.ptr
            .compare_exchange(current, new, Ordering::AcqRel, Ordering::Acquire, guard)
    }
}
