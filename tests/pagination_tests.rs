//! Pagination contract, exercised through both root-entity list operations.

mod common;

use backup_warden::model::Operation;
use backup_warden::{BackupStore, ListRequest, MemoryIndex, WardenError};
use common::{backup_record, operation, put_backup, put_operation, t0};

async fn seeded_operations(n: i64) -> MemoryIndex {
    let index = MemoryIndex::new();
    for id in 1..=n {
        put_operation(&index, &operation(id)).await;
    }
    index
}

#[tokio::test]
async fn limit_window_and_cursor_for_operations() {
    let index = seeded_operations(4).await;
    let store = BackupStore::new(&index);

    let (page, resp) = store
        .list_operations(&ListRequest {
            limit: 3,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.iter().map(|op| op.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(!resp.cursor.is_empty(), "truncated page must carry a cursor");

    let (rest, resp) = store
        .list_operations(&ListRequest {
            limit: 3,
            cursor: resp.cursor,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(rest.iter().map(|op| op.id).collect::<Vec<_>>(), vec![4]);
    assert!(resp.cursor.is_empty(), "exhausted stream must not carry a cursor");
}

#[tokio::test]
async fn exactly_limit_entities_return_all_without_cursor() {
    let index = seeded_operations(3).await;
    let store = BackupStore::new(&index);

    let (page, resp) = store
        .list_operations(&ListRequest {
            limit: 3,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 3);
    assert!(resp.cursor.is_empty());
}

#[tokio::test]
async fn two_pages_equal_one_double_page() {
    let index = seeded_operations(9).await;
    let store = BackupStore::new(&index);

    let (first, resp) = store
        .list_operations(&ListRequest {
            limit: 4,
            ..Default::default()
        })
        .await
        .unwrap();
    let (second, _) = store
        .list_operations(&ListRequest {
            limit: 4,
            cursor: resp.cursor,
            ..Default::default()
        })
        .await
        .unwrap();

    let (wide, _) = store
        .list_operations(&ListRequest {
            limit: 8,
            ..Default::default()
        })
        .await
        .unwrap();

    let narrow_ids: Vec<i64> = first.iter().chain(second.iter()).map(|op| op.id).collect();
    let wide_ids: Vec<i64> = wide.iter().map(|op| op.id).collect();
    assert_eq!(narrow_ids, wide_ids);
}

#[tokio::test]
async fn default_and_unbounded_limits() {
    let index = seeded_operations(12).await;
    let store = BackupStore::new(&index);

    let (page, resp) = store.list_operations(&ListRequest::default()).await.unwrap();
    assert_eq!(page.len(), 10, "limit 0 normalizes to 10");
    assert!(!resp.cursor.is_empty());

    let (all, resp) = store
        .list_operations(&ListRequest {
            limit: -1,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 12, "limit -1 fetches everything");
    assert!(resp.cursor.is_empty());
}

#[tokio::test]
async fn malformed_cursor_propagates() {
    let index = seeded_operations(2).await;
    let store = BackupStore::new(&index);

    let err = store
        .list_operations(&ListRequest {
            limit: 1,
            cursor: "definitely-not-a-cursor".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::MalformedCursor(_)));
}

#[tokio::test]
async fn same_executor_pages_backup_records() {
    let index = MemoryIndex::new();
    put_operation(&index, &operation(1)).await;
    for id in 1..=5 {
        put_backup(
            &index,
            &backup_record(id, Some(Operation::key(1)), &[], t0()),
        )
        .await;
    }
    let store = BackupStore::new(&index);

    let (page, resp) = store
        .list_backups(&ListRequest {
            limit: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(!resp.cursor.is_empty());

    let (rest, resp) = store
        .list_backups(&ListRequest {
            limit: 10,
            cursor: resp.cursor,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(rest.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 4, 5]);
    assert!(resp.cursor.is_empty());
}
