use super::pager::{ListLoader, ListRequest, ListResponse};
use crate::core::{Key, Result, WardenError};
use crate::index::EntityIndex;
use crate::model::{BackupRecord, Operation};
use crate::store::tree;
use async_trait::async_trait;

/// Loader for pages of root [`Operation`] entities. Hydration is shallow;
/// the post-process pass assembles each operation's full descendant tree, so
/// one broken tree aborts the whole page.
pub struct OperationListLoader {
    pub list: Vec<Operation>,
    req: ListRequest,
    resp: ListResponse,
}

impl OperationListLoader {
    pub fn new(req: ListRequest) -> Self {
        let capacity = if req.limit > 0 { req.limit as usize } else { 0 };
        Self {
            list: Vec::with_capacity(capacity),
            req,
            resp: ListResponse::default(),
        }
    }

    pub fn into_parts(self) -> (Vec<Operation>, ListResponse) {
        (self.list, self.resp)
    }
}

#[async_trait]
impl ListLoader for OperationListLoader {
    type Entity = Operation;

    async fn hydrate(&mut self, index: &dyn EntityIndex, key: &Key) -> Result<Operation> {
        let raw = index
            .get(key)
            .await?
            .ok_or_else(|| WardenError::NotFound(format!("operation {}", key)))?;
        Operation::from_raw(key, raw)
    }

    fn accumulate(&mut self, entity: Operation) -> Result<()> {
        self.list.push(entity);
        Ok(())
    }

    async fn post_process(&mut self, index: &dyn EntityIndex) -> Result<()> {
        for operation in &mut self.list {
            tree::fetch_operation_children(index, operation).await?;
        }
        Ok(())
    }

    fn request(&self) -> &ListRequest {
        &self.req
    }

    fn response_mut(&mut self) -> &mut ListResponse {
        &mut self.resp
    }
}

/// Loader for pages of root [`BackupRecord`] entities.
pub struct BackupListLoader {
    pub list: Vec<BackupRecord>,
    req: ListRequest,
    resp: ListResponse,
}

impl BackupListLoader {
    pub fn new(req: ListRequest) -> Self {
        let capacity = if req.limit > 0 { req.limit as usize } else { 0 };
        Self {
            list: Vec::with_capacity(capacity),
            req,
            resp: ListResponse::default(),
        }
    }

    pub fn into_parts(self) -> (Vec<BackupRecord>, ListResponse) {
        (self.list, self.resp)
    }
}

#[async_trait]
impl ListLoader for BackupListLoader {
    type Entity = BackupRecord;

    async fn hydrate(&mut self, index: &dyn EntityIndex, key: &Key) -> Result<BackupRecord> {
        let raw = index
            .get(key)
            .await?
            .ok_or_else(|| WardenError::NotFound(format!("backup record {}", key)))?;
        BackupRecord::from_raw(key, raw)
    }

    fn accumulate(&mut self, entity: BackupRecord) -> Result<()> {
        self.list.push(entity);
        Ok(())
    }

    async fn post_process(&mut self, index: &dyn EntityIndex) -> Result<()> {
        for record in &mut self.list {
            tree::fetch_backup_children(index, record).await?;
        }
        Ok(())
    }

    fn request(&self) -> &ListRequest {
        &self.req
    }

    fn response_mut(&mut self) -> &mut ListResponse {
        &mut self.resp
    }
}
