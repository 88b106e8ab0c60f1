//! Entities of the backup metadata tree.
//!
//! Four hierarchy levels: `Operation` → `BackupRecord` → `KindMarker` →
//! `KindTypeInfo`, plus `KindFiles` hanging directly off a `BackupRecord`.
//! All entities are read-only facades over the index: this crate hydrates,
//! enumerates and deletes them, it never creates or mutates them.

use crate::core::{Key, KeyId, Result, WardenError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const OPERATION_KIND: &str = "Operation";
pub const BACKUP_RECORD_KIND: &str = "BackupRecord";
pub const KIND_MARKER_KIND: &str = "Kind";
pub const KIND_FILES_KIND: &str = "BackupKindFiles";
pub const KIND_TYPE_INFO_KIND: &str = "BackupKindTypeInfo";

/// Stored property map of one entity, as the index returns it.
pub type RawEntity = serde_json::Value;

fn check_kind(key: &Key, expected: &str) -> Result<()> {
    if key.kind() != expected {
        return Err(WardenError::InvalidArgument(format!(
            "expected {} key, got {}",
            expected,
            key.kind()
        )));
    }
    Ok(())
}

/// Root of the tree: one admin backup operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip)]
    pub id: i64,
    pub status: String,
    #[serde(default)]
    pub status_info: String,
    #[serde(default)]
    pub description: String,
    pub active_jobs: i64,
    pub completed_jobs: i64,
    #[serde(default)]
    pub active_job_ids: Vec<String>,
    pub last_updated: DateTime<Utc>,

    #[serde(skip)]
    pub backups: Vec<BackupRecord>,
    #[serde(skip)]
    pub kind_markers: Vec<KindMarker>,
}

impl Operation {
    pub fn key(id: i64) -> Key {
        Key::new(OPERATION_KIND, KeyId::Int(id))
    }

    pub fn from_raw(key: &Key, raw: RawEntity) -> Result<Self> {
        check_kind(key, OPERATION_KIND)?;
        let mut entity: Operation = serde_json::from_value(raw)?;
        entity.id = key
            .int_id()
            .ok_or_else(|| WardenError::InvalidArgument("operation id must be numeric".into()))?;
        Ok(entity)
    }

    pub fn to_raw(&self) -> Result<RawEntity> {
        Ok(serde_json::to_value(self)?)
    }
}

/// One backup slice. The parent operation key may be absent when the record
/// was restored from another application's backup; that is a tolerated
/// anomaly, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub parent: Option<Key>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub filesystem: String,
    #[serde(default)]
    pub storage_handle: String,
    #[serde(default)]
    pub original_app: String,
    #[serde(default)]
    pub kinds: Vec<String>,
    #[serde(default)]
    pub active_jobs: Vec<String>,
    #[serde(default)]
    pub completed_jobs: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub complete_time: DateTime<Utc>,

    #[serde(skip)]
    pub kind_files: Vec<KindFiles>,
}

impl BackupRecord {
    pub fn key_for(parent: Option<&Key>, id: i64) -> Key {
        match parent {
            Some(parent) => Key::with_parent(parent.clone(), BACKUP_RECORD_KIND, KeyId::Int(id)),
            None => Key::new(BACKUP_RECORD_KIND, KeyId::Int(id)),
        }
    }

    pub fn key(&self) -> Key {
        Self::key_for(self.parent.as_ref(), self.id)
    }

    pub fn from_raw(key: &Key, raw: RawEntity) -> Result<Self> {
        check_kind(key, BACKUP_RECORD_KIND)?;
        let mut entity: BackupRecord = serde_json::from_value(raw)?;
        entity.id = key
            .int_id()
            .ok_or_else(|| WardenError::InvalidArgument("backup record id must be numeric".into()))?;
        entity.parent = key.parent().cloned();
        Ok(entity)
    }

    pub fn to_raw(&self) -> Result<RawEntity> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Level-2 placeholder node, one per distinct kind name listed on a backup
/// record. Markers are synthesized by the tree assembler, never read from
/// the index; only their children (`KindTypeInfo`) are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct KindMarker {
    pub parent: Key,
    pub id: String,
    pub type_infos: Vec<KindTypeInfo>,
}

impl KindMarker {
    pub fn new(parent: Key, id: impl Into<String>) -> Self {
        Self {
            parent,
            id: id.into(),
            type_infos: Vec::new(),
        }
    }

    pub fn key(&self) -> Key {
        Key::with_parent(self.parent.clone(), KIND_MARKER_KIND, KeyId::Name(self.id.clone()))
    }
}

/// Backup file paths of one kind within one backup record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindFiles {
    #[serde(skip)]
    pub id: String,
    #[serde(skip)]
    pub parent: Option<Key>,
    #[serde(default)]
    pub files: Vec<String>,
}

impl KindFiles {
    pub fn from_raw(key: &Key, raw: RawEntity) -> Result<Self> {
        check_kind(key, KIND_FILES_KIND)?;
        let mut entity: KindFiles = serde_json::from_value(raw)?;
        entity.id = key.id().to_string();
        entity.parent = key.parent().cloned();
        Ok(entity)
    }

    pub fn to_raw(&self) -> Result<RawEntity> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Serialized type schema of one backed-up kind. The blob is stored as an
/// opaque string and parsed lazily; downstream load-job shaping depends on
/// it, so a parse failure is fatal to the surrounding tree fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindTypeInfo {
    #[serde(skip)]
    pub id: String,
    #[serde(skip)]
    pub parent: Option<Key>,
    pub entity_type_info: String,
    #[serde(default)]
    pub is_partial: bool,

    #[serde(skip)]
    pub schema: Option<EntityTypeInfo>,
}

impl KindTypeInfo {
    pub fn from_raw(key: &Key, raw: RawEntity) -> Result<Self> {
        check_kind(key, KIND_TYPE_INFO_KIND)?;
        let mut entity: KindTypeInfo = serde_json::from_value(raw)?;
        entity.id = key.id().to_string();
        entity.parent = key.parent().cloned();
        Ok(entity)
    }

    pub fn to_raw(&self) -> Result<RawEntity> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parses the stored schema blob into [`EntityTypeInfo`].
    pub fn parse_schema(&mut self) -> Result<()> {
        let parsed: EntityTypeInfo = serde_json::from_str(&self.entity_type_info)
            .map_err(|err| WardenError::SchemaParse(err.to_string()))?;
        self.schema = Some(parsed);
        Ok(())
    }
}

/// Structured form of the type-schema blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTypeInfo {
    pub kind: String,
    #[serde(default)]
    pub properties: Vec<PropertyInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(default)]
    pub is_repeated: bool,
    #[serde(default)]
    pub primitive_types: Vec<i64>,
    #[serde(default)]
    pub embedded_entities: Vec<String>,
}
