use std::mem::ManuallyDrop;

use crossbeam::epoch::{Atomic, Owned};

/// A link in the stack's chain.
///
/// The value sits in a `ManuallyDrop` because a successful pop moves it out
/// with `ptr::read` while the node itself is still reachable by pinned
/// readers; the node's own destructor must never touch it again.
#[derive(Debug)]
pub struct Node<T> {
    pub(crate) value: ManuallyDrop<T>,
    pub(crate) next: Atomic<Node<T>>,
}

impl<T> Node<T> {
    pub(crate) fn new(value: T) -> Owned<Self> {
        Owned::new(Self {
            value: ManuallyDrop::new(value),
            next: Atomic::null(),
        })
    }
}
