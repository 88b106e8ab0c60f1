//! Retention-based expiry scan over root backup records.
//!
//! One invocation processes exactly one page: it emits one deletion
//! work-item per expired record and, when the page was truncated, one
//! continuation work-item that resumes the scan from the returned cursor.

use crate::core::{Key, Result};
use crate::index::EntityIndex;
use crate::queue::{WorkItem, WorkQueue};
use crate::query::ListRequest;
use crate::service::ManagementConfig;
use crate::store::BackupStore;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

/// Scans one page of backup records and enqueues deletion work for every
/// record whose completion timestamp fell behind the retention threshold.
/// Returns the number of deletion work-items emitted.
///
/// A non-positive retention disables the sweep entirely.
pub async fn run_expiry_sweep(
    index: &dyn EntityIndex,
    queue: &dyn WorkQueue,
    req: &ListRequest,
    cfg: &ManagementConfig,
    now: DateTime<Utc>,
) -> Result<usize> {
    if cfg.retention <= Duration::zero() {
        return Ok(0);
    }

    let store = BackupStore::new(index);
    let (records, resp) = store.list_backups(req).await?;
    if records.is_empty() {
        return Ok(0);
    }

    let threshold = now - cfg.retention;
    let mut expired = 0;
    for record in &records {
        if record.complete_time < threshold {
            let key = record.key();
            info!(key = %key, complete_time = %record.complete_time, "backup expired, scheduling removal");
            let path = format!("{}?key={}", cfg.delete_backup_path, key.encode());
            queue.push(WorkItem::delete(path)).await?;
            expired += 1;
        }
    }

    if !resp.cursor.is_empty() {
        let path = format!(
            "{}?limit={}&offset={}&cursor={}",
            cfg.delete_old_backups_path, req.limit, req.offset, resp.cursor
        );
        queue.push(WorkItem::delete(path)).await?;
    }

    Ok(expired)
}

/// Executes one deletion work-item: decodes the record key and cascades the
/// delete over its ancestor root. Returns the deleted keys.
pub async fn run_delete(index: &dyn EntityIndex, encoded_key: &str) -> Result<Vec<Key>> {
    let key = Key::decode(encoded_key)?;
    let store = BackupStore::new(index);
    store.delete_backup_cascade(&key).await
}
