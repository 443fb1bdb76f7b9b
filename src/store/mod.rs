//! Snapshot persistence and collection queries
//!
//! Everything the product remembers lives in per-user namespaced
//! key/value snapshots: each write replaces the whole JSON-serialized
//! collection, never a delta. `queries` holds the pure grouping and
//! filtering logic the dashboard is built on.

mod queries;
mod snapshot;

pub use queries::{
    filter_groups, group_by_client, history_for, ClientGroup, ScorePoint, UNNAMED_CLIENT_LABEL,
};
pub use snapshot::{DataStore, FileStore, MemoryStore, SnapshotStore};
