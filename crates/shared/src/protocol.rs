use serde::{Deserialize, Serialize};

use crate::domain::SnapshotId;

pub const UPLOAD_FOLDER_ROUTE: &str = "/snapshot/upload-folder";
pub const DIFF_ROUTE: &str = "/diff";

/// Multipart field carrying the snapshot id.
pub const UPLOAD_ID_FIELD: &str = "id";
/// Multipart field repeated once per uploaded file; the part filename is the relative path.
pub const UPLOAD_FILES_FIELD: &str = "files[]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSnapshotResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SnapshotId>,
    pub file_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRequest {
    #[serde(default)]
    pub id_a: Option<String>,
    #[serde(default)]
    pub id_b: Option<String>,
}

impl DiffRequest {
    pub fn new(id_a: &SnapshotId, id_b: &SnapshotId) -> Self {
        Self {
            id_a: Some(id_a.to_string()),
            id_b: Some(id_b.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: u64,
    pub deleted: u64,
    pub modified: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffDetails {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub deleted: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
}

impl DiffDetails {
    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            added: self.added.len() as u64,
            deleted: self.deleted.len() as u64,
            modified: self.modified.len() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResponse {
    pub summary: DiffSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_details: Option<DiffDetails>,
}
