//! Object-storage change-notification handling.
//!
//! Validates "object created" webhook events and turns accepted backup
//! objects into deferred warehouse load requests.

use crate::warehouse::LoadJobRequest;
use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const RESOURCE_STATE_EXISTS: &str = "exists";

/// Webhook payload describing the stored object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageObject {
    pub id: String,
    pub self_link: String,
    pub name: String,
    pub bucket: String,
    pub generation: String,
    pub metageneration: String,
    pub content_type: String,
    pub updated: Option<DateTime<Utc>>,
    pub size: String,
    pub md5_hash: String,
    pub media_link: String,
    pub crc32c: String,
    pub etag: String,
    pub time_created: Option<DateTime<Utc>>,
    pub time_deleted: Option<DateTime<Utc>>,
}

impl StorageObject {
    /// Kind name encoded in the object path, or empty when the path matches
    /// neither supported naming convention.
    pub fn kind_name(&self) -> String {
        extract_kind_name(&self.name)
    }

    pub fn to_load_request(&self) -> LoadJobRequest {
        LoadJobRequest {
            bucket: self.bucket.clone(),
            file_path: self.name.clone(),
            kind_name: self.kind_name(),
            time_created: self.time_created,
        }
    }
}

/// Channel headers accompanying a change notification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventHeaders {
    pub channel_id: String,
    pub client_token: String,
    pub resource_id: String,
    pub resource_state: String,
    pub resource_uri: String,
}

impl EventHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        Self {
            channel_id: get("x-goog-channel-id"),
            client_token: get("x-goog-channel-token"),
            resource_id: get("x-goog-resource-id"),
            resource_state: get("x-goog-resource-state"),
            resource_uri: get("x-goog-resource-uri"),
        }
    }
}

/// Extracts the backed-up kind name from an object path.
///
/// Two conventions are supported: the admin-export dotted form
/// `<handle>.<Kind>.backup_info` and the managed-export form
/// `.../kind_<Kind>/..._kind_<Kind>.export_metadata`. Anything else yields
/// an empty string and the event is discarded by the caller.
pub fn extract_kind_name(name: &str) -> String {
    if let Some(kind) = extract_admin_export_kind(name) {
        return kind;
    }
    if let Some(kind) = extract_managed_export_kind(name) {
        return kind;
    }
    String::new()
}

fn extract_admin_export_kind(name: &str) -> Option<String> {
    let id = match name.rfind('/') {
        Some(i) => &name[i + 1..],
        None => name,
    };
    let parts: Vec<&str> = id.split('.').collect();
    if parts.len() != 3 || parts[2] != "backup_info" {
        return None;
    }
    Some(parts[1].to_string())
}

fn extract_managed_export_kind(name: &str) -> Option<String> {
    if !name.ends_with(".export_metadata") {
        return None;
    }
    name.split('/')
        .find_map(|segment| segment.strip_prefix("kind_"))
        .filter(|kind| !kind.contains('.'))
        .map(|kind| kind.to_string())
}

/// Gate applied to every incoming event. Failing a check is not an error;
/// the event is logged and discarded.
pub fn is_import_target(
    object: &StorageObject,
    headers: &EventHeaders,
    bucket: &str,
    target_kinds: &[String],
) -> bool {
    if !bucket.is_empty() && object.bucket != bucket {
        info!(bucket = %object.bucket, "event from unexpected bucket");
        return false;
    }
    if headers.resource_state != RESOURCE_STATE_EXISTS {
        info!(state = %headers.resource_state, "event with unexpected resource state");
        return false;
    }
    let kind = object.kind_name();
    if kind.is_empty() {
        info!(name = %object.name, "object is not a backup file");
        return false;
    }
    if !target_kinds.iter().any(|target| *target == kind) {
        info!(kind = %kind, "kind is not an import target");
        return false;
    }
    info!(name = %object.name, kind = %kind, "object accepted for import");
    true
}
