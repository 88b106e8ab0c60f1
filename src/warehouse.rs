//! Analytical-warehouse load-job shaping and submission.

use crate::core::{Result, WardenError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const SOURCE_FORMAT_BACKUP: &str = "DATASTORE_BACKUP";
pub const WRITE_DISPOSITION_REPLACE: &str = "WRITE_TRUNCATE";

/// Deferred load request carried through the work queue: one backup object
/// destined for one warehouse table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadJobRequest {
    pub bucket: String,
    pub file_path: String,
    pub kind_name: String,
    pub time_created: Option<DateTime<Utc>>,
}

/// Fully shaped load job as the warehouse API expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadJob {
    pub source_uris: Vec<String>,
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
    pub source_format: String,
    pub write_disposition: String,
}

impl LoadJob {
    /// The destination table is named after the backed-up kind; its previous
    /// contents are replaced on every load.
    pub fn from_request(req: &LoadJobRequest, project_id: &str, dataset_id: &str) -> Self {
        Self {
            source_uris: vec![format!("gs://{}/{}", req.bucket, req.file_path)],
            project_id: project_id.to_string(),
            dataset_id: dataset_id.to_string(),
            table_id: req.kind_name.clone(),
            source_format: SOURCE_FORMAT_BACKUP.to_string(),
            write_disposition: WRITE_DISPOSITION_REPLACE.to_string(),
        }
    }
}

#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn submit_load(&self, job: &LoadJob) -> Result<()>;
}

/// Submits the load job for a dequeued request.
///
/// Incomplete requests are logged and dropped. A submission failure here is
/// also logged and swallowed: the work-item was already dequeued, and erroring
/// would make the at-least-once queue redeliver it forever.
pub async fn submit_backup_load(
    warehouse: &dyn Warehouse,
    req: &LoadJobRequest,
    project_id: &str,
    dataset_id: &str,
) -> Result<()> {
    info!(bucket = %req.bucket, file_path = %req.file_path, kind = %req.kind_name, "submitting warehouse load");

    if req.bucket.is_empty() || req.file_path.is_empty() || req.kind_name.is_empty() {
        warn!(?req, "load request missing bucket, path or kind; dropping");
        return Ok(());
    }

    let job = LoadJob::from_request(req, project_id, dataset_id);
    if let Err(err) = warehouse.submit_load(&job).await {
        warn!(error = %err, table = %job.table_id, "warehouse load submission failed");
    }

    Ok(())
}

/// Warehouse client posting shaped jobs to an HTTP endpoint.
pub struct HttpWarehouse {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpWarehouse {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Warehouse for HttpWarehouse {
    async fn submit_load(&self, job: &LoadJob) -> Result<()> {
        let response = self.client.post(&self.endpoint).json(job).send().await?;
        if !response.status().is_success() {
            return Err(WardenError::Upstream(format!(
                "load job rejected with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
