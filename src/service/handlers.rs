use super::{ManagementConfig, WatcherConfig};
use crate::core::Result;
use crate::index::EntityIndex;
use crate::queue::{WorkItem, WorkQueue};
use crate::query::ListRequest;
use crate::sweep;
use crate::warehouse::{submit_backup_load, LoadJobRequest, Warehouse};
use crate::watcher::{is_import_target, EventHeaders, StorageObject};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::{delete, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Collaborators and configuration shared by all handlers. Each request gets
/// its own in-memory tree; nothing here is mutated per request.
pub struct AppState {
    pub index: Arc<dyn EntityIndex>,
    pub queue: Arc<dyn WorkQueue>,
    pub warehouse: Arc<dyn Warehouse>,
    pub management: ManagementConfig,
    pub watcher: WatcherConfig,
}

/// Empty success body.
#[derive(Debug, Serialize)]
pub struct Noop {}

#[derive(Debug, Deserialize)]
pub struct DeleteBackupQuery {
    pub key: String,
}

/// Builds the router for the five lifecycle operations. Paths come from the
/// configs held in `state`.
pub fn warden_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(&state.management.api_delete_backups_path, delete(trigger_sweep))
        .route(&state.management.delete_old_backups_path, delete(run_sweep_page))
        .route(&state.management.delete_backup_path, delete(delete_backup))
        .route(&state.watcher.notification_path, post(receive_notification))
        .route(&state.watcher.load_job_path, post(submit_load_job))
        .with_state(state)
}

fn log_failure<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        error!(operation, error = %err, "handler failed");
    }
    result
}

/// Public trigger: delegate one sweep run to the work queue.
async fn trigger_sweep(State(state): State<Arc<AppState>>) -> Result<Json<Noop>> {
    let item = WorkItem::delete(state.management.delete_old_backups_path.clone());
    log_failure("trigger_sweep", state.queue.push(item).await)?;
    Ok(Json(Noop {}))
}

/// Queue worker: scan one page of backup records for expired entries.
async fn run_sweep_page(
    State(state): State<Arc<AppState>>,
    Query(req): Query<ListRequest>,
) -> Result<Json<Noop>> {
    log_failure(
        "run_sweep_page",
        sweep::run_expiry_sweep(
            state.index.as_ref(),
            state.queue.as_ref(),
            &req,
            &state.management,
            Utc::now(),
        )
        .await,
    )?;
    Ok(Json(Noop {}))
}

/// Queue worker: cascade-delete one backup subtree.
async fn delete_backup(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeleteBackupQuery>,
) -> Result<Json<Noop>> {
    log_failure(
        "delete_backup",
        sweep::run_delete(state.index.as_ref(), &query.key).await,
    )?;
    Ok(Json(Noop {}))
}

/// Webhook receiver. Discarded events answer success with no side effect;
/// a queue submission failure fails the request so the sender retries.
async fn receive_notification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(object): Json<StorageObject>,
) -> Result<Json<Noop>> {
    let event = EventHeaders::from_headers(&headers);
    if !is_import_target(&object, &event, &state.watcher.bucket, &state.watcher.target_kinds) {
        return Ok(Json(Noop {}));
    }

    let request = object.to_load_request();
    let item = log_failure(
        "receive_notification",
        WorkItem::post_json(state.watcher.load_job_path.clone(), &request),
    )?;
    log_failure("receive_notification", state.queue.push(item).await)?;
    Ok(Json(Noop {}))
}

/// Queue worker: shape and submit one warehouse load job.
async fn submit_load_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoadJobRequest>,
) -> Result<Json<Noop>> {
    log_failure(
        "submit_load_job",
        submit_backup_load(
            state.warehouse.as_ref(),
            &request,
            &state.watcher.project_id,
            &state.watcher.dataset_id,
        )
        .await,
    )?;
    Ok(Json(Noop {}))
}
