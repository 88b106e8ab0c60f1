//! Read/list/delete facade over the backup metadata tree.

pub mod tree;

use crate::core::{Key, Result, WardenError};
use crate::index::{EntityIndex, KeyQuery};
use crate::model::{BackupRecord, Operation, BACKUP_RECORD_KIND, OPERATION_KIND};
use crate::query::{exec_query, BackupListLoader, ListRequest, ListResponse, OperationListLoader};
use tracing::{debug, info};

/// Entry point for every read and delete over backup metadata. Holds no
/// state of its own; each call operates on an independent in-memory tree.
pub struct BackupStore<'a> {
    index: &'a dyn EntityIndex,
}

impl<'a> BackupStore<'a> {
    pub fn new(index: &'a dyn EntityIndex) -> Self {
        Self { index }
    }

    /// Returns the operation with its full four-level descendant tree.
    pub async fn get_operation(&self, id: i64) -> Result<Operation> {
        if id == 0 {
            return Err(WardenError::InvalidArgument("missing operation id".into()));
        }
        let key = Operation::key(id);
        let raw = self
            .index
            .get(&key)
            .await?
            .ok_or_else(|| WardenError::NotFound(format!("operation {}", key)))?;
        let mut operation = Operation::from_raw(&key, raw)?;
        tree::fetch_operation_children(self.index, &mut operation).await?;
        Ok(operation)
    }

    /// One page of operations, each with its full tree.
    pub async fn list_operations(
        &self,
        req: &ListRequest,
    ) -> Result<(Vec<Operation>, ListResponse)> {
        let mut req = req.clone();
        if req.limit == 0 {
            req.limit = crate::query::DEFAULT_PAGE_SIZE;
        }
        let mut loader = OperationListLoader::new(req);
        exec_query(self.index, KeyQuery::kind(OPERATION_KIND), &mut loader).await?;
        Ok(loader.into_parts())
    }

    /// Returns the backup record with its file lists attached.
    pub async fn get_backup(&self, parent: Option<&Key>, id: i64) -> Result<BackupRecord> {
        if id == 0 {
            return Err(WardenError::InvalidArgument("missing backup record id".into()));
        }
        let key = BackupRecord::key_for(parent, id);
        let raw = self
            .index
            .get(&key)
            .await?
            .ok_or_else(|| WardenError::NotFound(format!("backup record {}", key)))?;
        let mut record = BackupRecord::from_raw(&key, raw)?;
        tree::fetch_backup_children(self.index, &mut record).await?;
        Ok(record)
    }

    /// One page of backup records, each with its file lists attached.
    pub async fn list_backups(
        &self,
        req: &ListRequest,
    ) -> Result<(Vec<BackupRecord>, ListResponse)> {
        let mut loader = BackupListLoader::new(req.clone());
        exec_query(self.index, KeyQuery::kind(BACKUP_RECORD_KIND), &mut loader).await?;
        Ok(loader.into_parts())
    }

    /// Deletes a backup record together with everything under its ancestor
    /// root. For a parented record the scope deliberately widens to the whole
    /// operation: removing one backup slice removes the operation it belonged
    /// to as a whole. A parentless record is its own root, so only its own
    /// subtree goes. Returns the deleted keys.
    ///
    /// Replaying the deletion after the subtree is gone collects zero keys
    /// and succeeds, which makes at-least-once redelivery safe.
    pub async fn delete_backup_cascade(&self, key: &Key) -> Result<Vec<Key>> {
        if key.kind() != BACKUP_RECORD_KIND {
            return Err(WardenError::WrongKind(key.kind().to_string()));
        }

        let root = key.parent().unwrap_or(key).clone();
        info!(root = %root, "cascading backup deletion");

        let keys = self.index.keys(KeyQuery::any().ancestor(root)).await?;
        for key in &keys {
            debug!(key = %key, "remove target");
        }
        self.index.delete_all(&keys).await?;
        Ok(keys)
    }
}
