use clap::ValueEnum;
use libstack::StackType;
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

#[derive(Debug, ValueEnum, EnumIter, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum StackTarget {
    /// CAS right after every load
    Naive,
    /// Re-load the head and only CAS when it has not moved
    Guarded,
}

impl StackTarget {
    pub fn to_vec() -> Vec<Self> {
        StackTarget::iter().collect()
    }

    pub fn to_stacktype<T: Send + 'static>(&self) -> StackType<T> {
        match self {
            StackTarget::Naive => StackType::naive(),
            StackTarget::Guarded => StackType::guarded(),
        }
    }
}
