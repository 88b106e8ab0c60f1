//! Recursive ancestor-scoped tree assembly.
//!
//! Levels are hydrated strictly parent-before-child and siblings strictly in
//! index order; there is no concurrency across levels or subtrees because
//! each deeper query is scoped by a key captured at the level above. Any
//! storage failure aborts the whole fetch for that root — a root entity is
//! only handed to a caller with its full tree attached.

use crate::core::{Result, WardenError};
use crate::index::{EntityIndex, KeyQuery};
use crate::model::{
    BackupRecord, KindFiles, KindMarker, KindTypeInfo, Operation, BACKUP_RECORD_KIND,
    KIND_FILES_KIND, KIND_TYPE_INFO_KIND,
};
use tracing::{debug, warn};

/// Populates both child collections of an operation: its backup records
/// (stored) and its kind markers (synthesized, one per kind name listed on
/// each record).
pub async fn fetch_operation_children(
    index: &dyn EntityIndex,
    operation: &mut Operation,
) -> Result<()> {
    let operation_key = Operation::key(operation.id);

    let record_keys = index
        .keys(KeyQuery::kind(BACKUP_RECORD_KIND).ancestor(operation_key.clone()))
        .await?;
    let mut records = Vec::with_capacity(record_keys.len());
    for key in record_keys {
        let raw = index
            .get(&key)
            .await?
            .ok_or_else(|| WardenError::NotFound(format!("backup record {}", key)))?;
        let mut record = BackupRecord::from_raw(&key, raw)?;
        if record.parent.is_none() {
            // Restored from another app's backup. Keep it in the list but do
            // not descend into it.
            warn!(record = record.id, "backup record without parent key, skipping descent");
            records.push(record);
            continue;
        }
        fetch_backup_children(index, &mut record).await?;
        records.push(record);
    }
    operation.backups = records;

    // Kind markers have no stored entity; one is synthesized per kind name
    // and only its children are queried.
    let mut markers = Vec::new();
    for record in &operation.backups {
        for kind in &record.kinds {
            let mut marker = KindMarker::new(record.key(), kind.clone());
            fetch_kind_marker_children(index, &mut marker).await?;
            markers.push(marker);
        }
    }
    operation.kind_markers = markers;

    Ok(())
}

/// Attaches the per-kind file lists stored under a backup record. Leaf level.
pub async fn fetch_backup_children(
    index: &dyn EntityIndex,
    record: &mut BackupRecord,
) -> Result<()> {
    let record_key = record.key();
    let file_keys = index
        .keys(KeyQuery::kind(KIND_FILES_KIND).ancestor(record_key))
        .await?;
    let mut files = Vec::with_capacity(file_keys.len());
    for key in file_keys {
        let raw = index
            .get(&key)
            .await?
            .ok_or_else(|| WardenError::NotFound(format!("kind files {}", key)))?;
        files.push(KindFiles::from_raw(&key, raw)?);
    }
    record.kind_files = files;
    Ok(())
}

/// Attaches the type infos stored under a synthesized kind marker and parses
/// each schema blob. A kind listed on the record with no stored type info is
/// tolerated; a blob that fails to parse is not, because load-job shaping
/// depends on the schema.
pub async fn fetch_kind_marker_children(
    index: &dyn EntityIndex,
    marker: &mut KindMarker,
) -> Result<()> {
    let marker_key = marker.key();
    let info_keys = index
        .keys(KeyQuery::kind(KIND_TYPE_INFO_KIND).ancestor(marker_key.clone()))
        .await?;
    if info_keys.is_empty() {
        debug!(marker = %marker_key, "kind listed with no stored type info");
    }
    let mut infos = Vec::with_capacity(info_keys.len());
    for key in info_keys {
        let raw = index
            .get(&key)
            .await?
            .ok_or_else(|| WardenError::NotFound(format!("kind type info {}", key)))?;
        let mut info = KindTypeInfo::from_raw(&key, raw)?;
        if let Err(err) = info.parse_schema() {
            warn!(key = %key, blob = %info.entity_type_info, "type schema blob did not parse");
            return Err(err);
        }
        infos.push(info);
    }
    marker.type_infos = infos;
    Ok(())
}
