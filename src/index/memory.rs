use super::{EntityIndex, KeyQuery};
use crate::core::{Key, Result};
use crate::model::RawEntity;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-memory ordered index. `BTreeMap` iteration over [`Key`]'s root-first
/// path ordering gives the stable total order the executor's cursors rely on.
#[derive(Default)]
pub struct MemoryIndex {
    entities: RwLock<BTreeMap<Key, RawEntity>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }

    pub async fn contains(&self, key: &Key) -> bool {
        self.entities.read().await.contains_key(key)
    }
}

#[async_trait]
impl EntityIndex for MemoryIndex {
    async fn get(&self, key: &Key) -> Result<Option<RawEntity>> {
        Ok(self.entities.read().await.get(key).cloned())
    }

    async fn put(&self, key: Key, raw: RawEntity) -> Result<()> {
        self.entities.write().await.insert(key, raw);
        Ok(())
    }

    async fn keys(&self, query: KeyQuery) -> Result<Vec<Key>> {
        let entities = self.entities.read().await;
        let mut out = Vec::new();
        let mut skipped = 0;
        for key in entities.keys() {
            if !query.matches(key) {
                continue;
            }
            match query.start_after_key() {
                // A resume position wins over offset; re-applying the offset
                // on a cursor resume would skip live rows.
                Some(after) => {
                    if key <= after {
                        continue;
                    }
                }
                None => {
                    if skipped < query.offset_value() {
                        skipped += 1;
                        continue;
                    }
                }
            }
            out.push(key.clone());
            if let Some(limit) = query.limit_value() {
                if out.len() >= limit {
                    break;
                }
            }
        }
        Ok(out)
    }

    async fn delete_all(&self, keys: &[Key]) -> Result<()> {
        let mut entities = self.entities.write().await;
        for key in keys {
            entities.remove(key);
        }
        Ok(())
    }
}
