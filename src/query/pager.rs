use super::cursor::{decode_cursor, encode_cursor, Position};
use crate::core::{Key, Result};
use crate::index::{EntityIndex, KeyQuery};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Page request shared by every list operation. `limit == 0` means the
/// default page size, `limit == -1` means fetch-all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub cursor: String,
}

/// Page response. The cursor is empty when the stream was exhausted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cursor: String,
}

/// Per-entity-kind strategy plugged into [`exec_query`]. Implementations
/// hydrate a raw key into an entity, collect hydrated entities, and run one
/// post-processing pass over the full page (used to batch-hydrate descendant
/// trees).
#[async_trait]
pub trait ListLoader: Send {
    type Entity: Send;

    async fn hydrate(&mut self, index: &dyn EntityIndex, key: &Key) -> Result<Self::Entity>;

    fn accumulate(&mut self, entity: Self::Entity) -> Result<()>;

    async fn post_process(&mut self, index: &dyn EntityIndex) -> Result<()>;

    fn request(&self) -> &ListRequest;

    fn response_mut(&mut self) -> &mut ListResponse;
}

/// Executes one page of an ordered-key query through a loader.
///
/// Requests `limit + 1` keys: the extra probe row only answers "does more
/// exist". When it shows up the result is truncated at `limit`, the probe is
/// never hydrated, and the resumption cursor is the position of the
/// `limit`-th returned item. Changing this strategy would invalidate every
/// already-issued cursor.
///
/// Any failure — malformed cursor, index iteration, loader hydrate,
/// accumulate or post-process — aborts the page; partial results are never
/// surfaced.
pub async fn exec_query<L: ListLoader>(
    index: &dyn EntityIndex,
    mut query: KeyQuery,
    loader: &mut L,
) -> Result<()> {
    let req = loader.request().clone();

    let mut limit = req.limit;
    if limit == 0 {
        limit = DEFAULT_PAGE_SIZE;
    }
    if limit < -1 {
        return Err(crate::core::WardenError::InvalidArgument(format!(
            "limit must be -1 or non-negative, got {}",
            limit
        )));
    }
    if limit != -1 {
        query = query.limit((limit + 1) as usize);
    }
    if req.offset > 0 {
        query = query.offset(req.offset as usize);
    }
    if !req.cursor.is_empty() {
        let position = decode_cursor(&req.cursor)?;
        query = query.start_after(position.last_key);
    }

    let keys = index.keys(query).await?;

    let mut count: i64 = 0;
    let mut has_next = false;
    let mut resume_at: Option<Position> = None;
    for key in keys {
        count += 1;
        if limit != -1 && limit < count {
            // the +1 probe row
            has_next = true;
            break;
        }
        let entity = loader.hydrate(index, &key).await?;
        loader.accumulate(entity)?;
        if limit == count {
            resume_at = Some(Position { last_key: key });
        }
    }

    loader.post_process(index).await?;

    if has_next {
        if let Some(position) = resume_at {
            loader.response_mut().cursor = encode_cursor(&position);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{KeyId, WardenError};
    use crate::index::MemoryIndex;
    use serde_json::json;

    /// Keeps raw keys; enough to exercise the executor's windowing without
    /// dragging the entity model in.
    struct KeyCollector {
        keys: Vec<Key>,
        post_processed: usize,
        req: ListRequest,
        resp: ListResponse,
    }

    impl KeyCollector {
        fn new(req: ListRequest) -> Self {
            Self {
                keys: Vec::new(),
                post_processed: 0,
                req,
                resp: ListResponse::default(),
            }
        }
    }

    #[async_trait]
    impl ListLoader for KeyCollector {
        type Entity = Key;

        async fn hydrate(&mut self, _index: &dyn EntityIndex, key: &Key) -> Result<Key> {
            Ok(key.clone())
        }

        fn accumulate(&mut self, entity: Key) -> Result<()> {
            self.keys.push(entity);
            Ok(())
        }

        async fn post_process(&mut self, _index: &dyn EntityIndex) -> Result<()> {
            self.post_processed += 1;
            Ok(())
        }

        fn request(&self) -> &ListRequest {
            &self.req
        }

        fn response_mut(&mut self) -> &mut ListResponse {
            &mut self.resp
        }
    }

    fn key(id: i64) -> Key {
        Key::new("Operation", KeyId::Int(id))
    }

    async fn seeded(n: i64) -> MemoryIndex {
        let index = MemoryIndex::new();
        for id in 1..=n {
            index.put(key(id), json!({})).await.unwrap();
        }
        index
    }

    #[tokio::test]
    async fn truncates_at_limit_and_issues_cursor() {
        let index = seeded(5).await;
        let mut loader = KeyCollector::new(ListRequest {
            limit: 3,
            ..Default::default()
        });
        exec_query(&index, KeyQuery::kind("Operation"), &mut loader)
            .await
            .unwrap();

        assert_eq!(loader.keys, vec![key(1), key(2), key(3)]);
        assert!(!loader.resp.cursor.is_empty());
        assert_eq!(loader.post_processed, 1);
    }

    #[tokio::test]
    async fn exhausted_stream_has_no_cursor() {
        let index = seeded(3).await;
        let mut loader = KeyCollector::new(ListRequest {
            limit: 3,
            ..Default::default()
        });
        exec_query(&index, KeyQuery::kind("Operation"), &mut loader)
            .await
            .unwrap();

        assert_eq!(loader.keys.len(), 3);
        assert!(loader.resp.cursor.is_empty());
    }

    #[tokio::test]
    async fn zero_limit_defaults_to_ten() {
        let index = seeded(12).await;
        let mut loader = KeyCollector::new(ListRequest::default());
        exec_query(&index, KeyQuery::kind("Operation"), &mut loader)
            .await
            .unwrap();

        assert_eq!(loader.keys.len(), 10);
        assert!(!loader.resp.cursor.is_empty());
    }

    #[tokio::test]
    async fn unbounded_limit_fetches_all_without_cursor() {
        let index = seeded(25).await;
        let mut loader = KeyCollector::new(ListRequest {
            limit: -1,
            ..Default::default()
        });
        exec_query(&index, KeyQuery::kind("Operation"), &mut loader)
            .await
            .unwrap();

        assert_eq!(loader.keys.len(), 25);
        assert!(loader.resp.cursor.is_empty());
    }

    #[tokio::test]
    async fn resume_covers_stream_without_gaps_or_duplicates() {
        let index = seeded(7).await;
        let mut first = KeyCollector::new(ListRequest {
            limit: 3,
            ..Default::default()
        });
        exec_query(&index, KeyQuery::kind("Operation"), &mut first)
            .await
            .unwrap();

        let mut second = KeyCollector::new(ListRequest {
            limit: 3,
            cursor: first.resp.cursor.clone(),
            ..Default::default()
        });
        exec_query(&index, KeyQuery::kind("Operation"), &mut second)
            .await
            .unwrap();

        let mut combined = first.keys.clone();
        combined.extend(second.keys.clone());
        assert_eq!(
            combined,
            vec![key(1), key(2), key(3), key(4), key(5), key(6)]
        );

        // two consecutive pages of `limit` equal one page of `2 * limit`
        let mut wide = KeyCollector::new(ListRequest {
            limit: 6,
            ..Default::default()
        });
        exec_query(&index, KeyQuery::kind("Operation"), &mut wide)
            .await
            .unwrap();
        assert_eq!(combined, wide.keys);
    }

    #[tokio::test]
    async fn malformed_cursor_aborts() {
        let index = seeded(3).await;
        let mut loader = KeyCollector::new(ListRequest {
            limit: 2,
            cursor: "garbage!".into(),
            ..Default::default()
        });
        let err = exec_query(&index, KeyQuery::kind("Operation"), &mut loader)
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::MalformedCursor(_)));
        assert!(loader.keys.is_empty());
    }

    #[tokio::test]
    async fn offset_skips_leading_keys() {
        let index = seeded(5).await;
        let mut loader = KeyCollector::new(ListRequest {
            limit: 2,
            offset: 2,
            ..Default::default()
        });
        exec_query(&index, KeyQuery::kind("Operation"), &mut loader)
            .await
            .unwrap();
        assert_eq!(loader.keys, vec![key(3), key(4)]);
        assert!(!loader.resp.cursor.is_empty());
    }
}
