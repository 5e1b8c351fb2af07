//! Host file source and the canonical graph built from it.

mod canonical;
mod source;

pub use canonical::{CanonicalGraph, SharedGraph};
pub use source::{FileRecord, FileSource, MemoryVault};
