//! Backup-export trigger boundary.
//!
//! The admin export API is an external contract; this module shapes the
//! request and bounds the wait. It is the one place that imposes its own
//! deadline instead of relying on the caller's.

use crate::core::{Result, WardenError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_EXPORT_DEADLINE: Duration = Duration::from_secs(9 * 60);

/// Entity condition to export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespace_ids: Vec<String>,
}

/// Minimal handle on the long-running export operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOperation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
}

#[async_trait]
pub trait ExportService: Send + Sync {
    async fn export(
        &self,
        output_url_prefix: &str,
        filter: &EntityFilter,
    ) -> Result<ExportOperation>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRequest<'a> {
    output_url_prefix: &'a str,
    entity_filter: &'a EntityFilter,
}

/// Export trigger over the admin HTTP API, with a self-imposed bounded wait.
pub struct HttpExportService {
    client: reqwest::Client,
    endpoint: String,
    deadline: Duration,
}

impl HttpExportService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            deadline: DEFAULT_EXPORT_DEADLINE,
        }
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    async fn send(&self, output_url_prefix: &str, filter: &EntityFilter) -> Result<ExportOperation> {
        let body = ExportRequest {
            output_url_prefix,
            entity_filter: filter,
        };
        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(WardenError::Upstream(format!(
                "export trigger rejected with status {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ExportService for HttpExportService {
    async fn export(
        &self,
        output_url_prefix: &str,
        filter: &EntityFilter,
    ) -> Result<ExportOperation> {
        tokio::time::timeout(self.deadline, self.send(output_url_prefix, filter))
            .await
            .map_err(|_| WardenError::Upstream("export trigger timed out".into()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_fields_are_omitted() {
        let filter = EntityFilter {
            kinds: vec!["Article".into()],
            namespace_ids: vec![],
        };
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, serde_json::json!({"kinds": ["Article"]}));
    }

    #[test]
    fn operation_handle_tolerates_missing_done() {
        let op: ExportOperation =
            serde_json::from_value(serde_json::json!({"name": "projects/p/operations/1"})).unwrap();
        assert_eq!(op.name, "projects/p/operations/1");
        assert!(!op.done);
    }
}
