//! Durable work-queue boundary.
//!
//! Work-items are deferred HTTP-shaped calls delivered at least once by an
//! external queue. Submission failure fails the surrounding request; redelivery
//! of a failed item is the queue's job, never this crate's.

use crate::core::{Result, WardenError};
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub id: Uuid,
    pub method: String,
    pub path: String,
    pub payload: Option<Vec<u8>>,
    pub headers: Vec<(String, String)>,
}

impl WorkItem {
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: "DELETE".into(),
            path: path.into(),
            payload: None,
            headers: Vec::new(),
        }
    }

    pub fn post_json<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self> {
        let payload = serde_json::to_vec_pretty(body)
            .map_err(|err| WardenError::Serialization(err.to_string()))?;
        Ok(Self {
            id: Uuid::new_v4(),
            method: "POST".into(),
            path: path.into(),
            payload: Some(payload),
            headers: vec![(
                http::header::CONTENT_TYPE.to_string(),
                "application/json".into(),
            )],
        })
    }
}

#[async_trait]
pub trait WorkQueue: Send + Sync {
    async fn push(&self, item: WorkItem) -> Result<()>;
}

/// In-process queue for tests and the demo binary.
#[derive(Default)]
pub struct MemoryQueue {
    items: Mutex<Vec<WorkItem>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn items(&self) -> Vec<WorkItem> {
        self.items.lock().await.clone()
    }

    pub async fn drain(&self) -> Vec<WorkItem> {
        std::mem::take(&mut *self.items.lock().await)
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

#[async_trait]
impl WorkQueue for MemoryQueue {
    async fn push(&self, item: WorkItem) -> Result<()> {
        self.items.lock().await.push(item);
        Ok(())
    }
}
