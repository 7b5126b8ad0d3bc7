mod cache;
mod source;

pub use cache::SnapshotCache;
pub use source::{HttpSource, SnapshotSource};
