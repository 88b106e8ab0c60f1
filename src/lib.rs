// ============================================================================
// backup_warden
// ============================================================================
//
// Lifecycle management for hierarchical entity-store backups: cursor-based
// paginated listing, recursive ancestor-scoped tree hydration, retention
// sweeps with cascading deletion, and export of accepted backup objects into
// an analytical warehouse.

pub mod core;
pub mod export;
pub mod index;
pub mod model;
pub mod query;
pub mod queue;
pub mod service;
pub mod store;
pub mod sweep;
pub mod warehouse;
pub mod watcher;

// Re-export main types for convenience
pub use crate::core::{Key, KeyId, Result, WardenError};
pub use crate::index::{EntityIndex, KeyQuery, MemoryIndex};
pub use crate::model::{BackupRecord, KindFiles, KindMarker, KindTypeInfo, Operation};
pub use crate::query::{exec_query, ListLoader, ListRequest, ListResponse};
pub use crate::queue::{MemoryQueue, WorkItem, WorkQueue};
pub use crate::service::{warden_router, AppState, ManagementConfig, WatcherConfig};
pub use crate::store::BackupStore;
pub use crate::warehouse::{LoadJob, LoadJobRequest, Warehouse};
