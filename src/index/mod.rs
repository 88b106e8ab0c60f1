//! Ordered key-value index boundary.
//!
//! The real backing store is external; the crate talks to it through
//! [`EntityIndex`], which is the minimum surface the query executor and tree
//! assembler need: point reads, key-only ancestor-scoped queries with a
//! stable total order, and batch deletes. [`MemoryIndex`] is the in-process
//! implementation used by tests and the demo service.

mod memory;

pub use memory::MemoryIndex;

use crate::core::{Key, Result};
use crate::model::RawEntity;
use async_trait::async_trait;

/// Key-only query over the index's total key order.
#[derive(Debug, Clone, Default)]
pub struct KeyQuery {
    kind: Option<String>,
    ancestor: Option<Key>,
    offset: usize,
    limit: Option<usize>,
    start_after: Option<Key>,
}

impl KeyQuery {
    /// Query restricted to a single kind.
    pub fn kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Query over all kinds. Used by the cascade delete, which collects every
    /// key under the deletion root regardless of kind.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn ancestor(mut self, key: Key) -> Self {
        self.ancestor = Some(key);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume strictly after the given key in iteration order.
    pub fn start_after(mut self, key: Key) -> Self {
        self.start_after = Some(key);
        self
    }

    pub fn offset_value(&self) -> usize {
        self.offset
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    pub fn start_after_key(&self) -> Option<&Key> {
        self.start_after.as_ref()
    }

    /// Kind and ancestor-scope filter.
    pub fn matches(&self, key: &Key) -> bool {
        if let Some(kind) = &self.kind {
            if key.kind() != kind {
                return false;
            }
        }
        if let Some(ancestor) = &self.ancestor {
            if !ancestor.is_ancestor_of(key) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait EntityIndex: Send + Sync {
    /// Point read of one stored entity.
    async fn get(&self, key: &Key) -> Result<Option<RawEntity>>;

    /// Store one entity. Lifecycle management never creates entities; this
    /// exists for fixtures and for the in-memory engine's ingest path.
    async fn put(&self, key: Key, raw: RawEntity) -> Result<()>;

    /// Key-only projection of a query, in the stable total key order.
    async fn keys(&self, query: KeyQuery) -> Result<Vec<Key>>;

    /// Batch delete. Keys that are already absent are skipped, so replaying
    /// a deletion over a vanished subtree is a successful zero-row delete.
    async fn delete_all(&self, keys: &[Key]) -> Result<()>;
}
