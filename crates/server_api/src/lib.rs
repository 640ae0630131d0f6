use sha2::{Digest, Sha256};
use shared::{
    domain::SnapshotId,
    error::ApiError,
    protocol::{DiffDetails, DiffResponse, UploadSnapshotResponse},
};
use storage::{Manifest, Storage};
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

/// One `files[]` part as received: the client-side relative path and its bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub relative_path: String,
    pub contents: Vec<u8>,
}

impl UploadedFile {
    pub fn new(relative_path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            relative_path: relative_path.into(),
            contents: contents.into(),
        }
    }
}

pub async fn create_snapshot(
    ctx: &ApiContext,
    raw_snapshot_id: Option<&str>,
    files: Vec<UploadedFile>,
) -> Result<UploadSnapshotResponse, ApiError> {
    let snapshot_id = raw_snapshot_id
        .and_then(SnapshotId::parse)
        .ok_or_else(|| ApiError::validation("Snapshot ID missing"))?;
    if files.is_empty() {
        return Err(ApiError::validation("No files were uploaded"));
    }

    let manifest = build_manifest(&files)?;
    let file_count = ctx
        .storage
        .replace_snapshot(&snapshot_id, &manifest)
        .await
        .map_err(internal)?;

    info!(
        snapshot_id = %snapshot_id,
        uploaded = files.len(),
        file_count,
        "snapshot stored"
    );

    Ok(UploadSnapshotResponse {
        status: Some("success".to_string()),
        id: Some(snapshot_id),
        file_count: file_count as u64,
    })
}

pub async fn diff_snapshots(
    ctx: &ApiContext,
    raw_id_a: Option<&str>,
    raw_id_b: Option<&str>,
) -> Result<DiffResponse, ApiError> {
    let snapshot_a = load_existing(ctx, raw_id_a).await?;
    let snapshot_b = load_existing(ctx, raw_id_b).await?;
    let (Some(snapshot_a), Some(snapshot_b)) = (snapshot_a, snapshot_b) else {
        return Err(ApiError::not_found("Snapshot ID not found"));
    };

    let details = diff_manifests(&snapshot_a, &snapshot_b);
    let summary = details.summary();
    info!(
        added = summary.added,
        deleted = summary.deleted,
        modified = summary.modified,
        "snapshot diff computed"
    );

    Ok(DiffResponse {
        summary,
        diff_details: Some(details),
    })
}

/// Paths only in `after` are added, only in `before` deleted, in both with a different
/// hash modified. Each list comes out sorted.
pub fn diff_manifests(before: &Manifest, after: &Manifest) -> DiffDetails {
    let mut details = DiffDetails::default();
    for (path, hash) in after {
        match before.get(path) {
            None => details.added.push(path.clone()),
            Some(previous) if previous != hash => details.modified.push(path.clone()),
            Some(_) => {}
        }
    }
    details.deleted = before
        .keys()
        .filter(|path| !after.contains_key(*path))
        .cloned()
        .collect();
    details
}

/// Hashes every upload. A path sent twice keeps the last contents.
pub fn build_manifest(files: &[UploadedFile]) -> Result<Manifest, ApiError> {
    let mut manifest = Manifest::new();
    for file in files {
        let path = normalize_relative_path(&file.relative_path)?;
        manifest.insert(path, content_hash(&file.contents));
    }
    Ok(manifest)
}

pub fn content_hash(contents: &[u8]) -> String {
    format!("{:x}", Sha256::digest(contents))
}

/// Folds `\` into `/` and drops empty and `.` segments. Rejects anything that would
/// leave the snapshot root.
pub fn normalize_relative_path(raw: &str) -> Result<String, ApiError> {
    let unified = raw.trim().replace('\\', "/");
    let invalid = || ApiError::validation(format!("Invalid file path: {raw}"));

    if unified.starts_with('/') || has_drive_prefix(&unified) {
        return Err(invalid());
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(invalid()),
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Err(invalid());
    }
    Ok(segments.join("/"))
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

async fn load_existing(ctx: &ApiContext, raw: Option<&str>) -> Result<Option<Manifest>, ApiError> {
    let Some(snapshot_id) = raw.and_then(SnapshotId::parse) else {
        return Ok(None);
    };
    ctx.storage
        .load_snapshot(&snapshot_id)
        .await
        .map_err(internal)
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
