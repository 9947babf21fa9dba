pub mod cas_stat;
pub mod head;
pub mod node;
pub mod policy;
pub mod stack;


pub use cas_stat::CasStat;
pub use policy::{CasPolicy, Guarded, Naive};
pub use stack::{
    atomic_linked::{AtomicLinkedStack, GuardedStack, NaiveStack},
    ConcurrentStack, StackType,
};
