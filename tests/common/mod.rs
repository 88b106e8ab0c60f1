//! Shared fixtures: seed backup metadata trees into a MemoryIndex.

#![allow(dead_code)]

use backup_warden::model::{
    BackupRecord, KindFiles, KindTypeInfo, Operation, KIND_FILES_KIND, KIND_MARKER_KIND,
    KIND_TYPE_INFO_KIND,
};
use backup_warden::{EntityIndex, Key, KeyId, MemoryIndex};
use chrono::{DateTime, TimeZone, Utc};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn operation(id: i64) -> Operation {
    Operation {
        id,
        status: "Completed".into(),
        status_info: String::new(),
        description: format!("backup operation {}", id),
        active_jobs: 0,
        completed_jobs: 1,
        active_job_ids: vec![],
        last_updated: t0(),
        backups: vec![],
        kind_markers: vec![],
    }
}

pub fn backup_record(
    id: i64,
    parent: Option<Key>,
    kinds: &[&str],
    complete_time: DateTime<Utc>,
) -> BackupRecord {
    BackupRecord {
        id,
        parent,
        name: format!("backup-{}", id),
        destination: "gs://example-backup/out".into(),
        filesystem: "gs".into(),
        storage_handle: String::new(),
        original_app: String::new(),
        kinds: kinds.iter().map(|k| k.to_string()).collect(),
        active_jobs: vec![],
        completed_jobs: vec![format!("job-{}", id)],
        start_time: complete_time - chrono::Duration::hours(1),
        complete_time,
        kind_files: vec![],
    }
}

pub async fn put_operation(index: &MemoryIndex, op: &Operation) {
    index
        .put(Operation::key(op.id), op.to_raw().unwrap())
        .await
        .unwrap();
}

pub async fn put_backup(index: &MemoryIndex, record: &BackupRecord) {
    index
        .put(record.key(), record.to_raw().unwrap())
        .await
        .unwrap();
}

pub fn schema_blob(kind: &str) -> String {
    format!(
        r#"{{"kind":"{}","properties":[{{"name":"title","is_repeated":false,"primitive_types":[9],"embedded_entities":[]}}]}}"#,
        kind
    )
}

/// Stores the per-kind leaves for one backup record: a KindFiles entity under
/// the record and a KindTypeInfo entity under the synthesized marker key.
pub async fn put_kind_leaves(index: &MemoryIndex, record_key: &Key, kind: &str, blob: &str) {
    let files = KindFiles {
        id: kind.to_string(),
        parent: Some(record_key.clone()),
        files: vec![format!("gs://example-backup/{}-00000.backup", kind)],
    };
    index
        .put(
            Key::with_parent(record_key.clone(), KIND_FILES_KIND, KeyId::Name(kind.into())),
            files.to_raw().unwrap(),
        )
        .await
        .unwrap();

    let marker_key = Key::with_parent(record_key.clone(), KIND_MARKER_KIND, KeyId::Name(kind.into()));
    let info = KindTypeInfo {
        id: kind.to_string(),
        parent: Some(marker_key.clone()),
        entity_type_info: blob.to_string(),
        is_partial: false,
        schema: None,
    };
    index
        .put(
            Key::with_parent(marker_key, KIND_TYPE_INFO_KIND, KeyId::Name(kind.into())),
            info.to_raw().unwrap(),
        )
        .await
        .unwrap();
}

/// Seeds one complete four-level tree and returns the backup record key.
pub async fn seed_tree(index: &MemoryIndex, op_id: i64, backup_id: i64, kinds: &[&str]) -> Key {
    put_operation(index, &operation(op_id)).await;
    let record = backup_record(backup_id, Some(Operation::key(op_id)), kinds, t0());
    put_backup(index, &record).await;
    let record_key = record.key();
    for kind in kinds {
        put_kind_leaves(index, &record_key, kind, &schema_blob(kind)).await;
    }
    record_key
}
