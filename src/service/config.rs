use crate::core::{Result, WardenError};
use chrono::Duration;

/// Configuration of the backup lifecycle endpoints.
///
/// Paths and queue names are configuration, not contract; the defaults match
/// the conventional layout of one public API trigger plus two queue-worker
/// endpoints.
#[derive(Debug, Clone)]
pub struct ManagementConfig {
    /// Queue the sweep and deletion work-items go to.
    pub queue_name: String,

    /// How long a completed backup is kept. Non-positive disables expiry.
    pub retention: Duration,

    /// Public trigger that enqueues a sweep.
    pub api_delete_backups_path: String,

    /// Worker endpoint running one sweep page.
    pub delete_old_backups_path: String,

    /// Worker endpoint deleting one backup subtree.
    pub delete_backup_path: String,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            queue_name: "exec-rm-old-datastore-backups".into(),
            retention: Duration::days(30),
            api_delete_backups_path: "/api/datastore-management/delete-old-backups".into(),
            delete_old_backups_path: "/tq/datastore-management/delete-old-backups".into(),
            delete_backup_path: "/tq/datastore-management/delete-backup".into(),
        }
    }
}

impl ManagementConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_name(mut self, name: &str) -> Self {
        self.queue_name = name.to_string();
        self
    }

    pub fn retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn paths(mut self, api: &str, sweep: &str, delete: &str) -> Self {
        self.api_delete_backups_path = api.to_string();
        self.delete_old_backups_path = sweep.to_string();
        self.delete_backup_path = delete.to_string();
        self
    }
}

/// Configuration of the change-notification watcher and warehouse loads.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub queue_name: String,

    /// Backup bucket to accept events from. Empty accepts any bucket.
    pub bucket: String,

    /// Kinds whose backup objects are loaded into the warehouse.
    pub target_kinds: Vec<String>,

    pub project_id: String,
    pub dataset_id: String,

    /// Public endpoint receiving change notifications.
    pub notification_path: String,

    /// Worker endpoint submitting one load job.
    pub load_job_path: String,
}

impl WatcherConfig {
    pub fn new(project_id: &str, dataset_id: &str) -> Self {
        Self {
            queue_name: "datastore-to-bq".into(),
            bucket: String::new(),
            target_kinds: Vec::new(),
            project_id: project_id.to_string(),
            dataset_id: dataset_id.to_string(),
            notification_path: "/api/gcs/object-change-notification".into(),
            load_job_path: "/tq/gcs/object-to-bq".into(),
        }
    }

    pub fn queue_name(mut self, name: &str) -> Self {
        self.queue_name = name.to_string();
        self
    }

    pub fn bucket(mut self, bucket: &str) -> Self {
        self.bucket = bucket.to_string();
        self
    }

    pub fn target_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    pub fn paths(mut self, notification: &str, load_job: &str) -> Self {
        self.notification_path = notification.to_string();
        self.load_job_path = load_job.to_string();
        self
    }

    /// A watcher without target kinds or a dataset cannot do anything useful.
    pub fn validate(&self) -> Result<()> {
        if self.target_kinds.is_empty() {
            return Err(WardenError::InvalidArgument(
                "watcher requires at least one target kind".into(),
            ));
        }
        if self.dataset_id.is_empty() {
            return Err(WardenError::InvalidArgument(
                "watcher requires a dataset id".into(),
            ));
        }
        Ok(())
    }
}
