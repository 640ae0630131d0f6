use async_trait::async_trait;
use shared::{
    domain::SnapshotId,
    protocol::{DiffResponse, UploadSnapshotResponse},
};

pub mod controller;
pub mod error;
pub mod http;
pub mod selection;

pub use controller::{ActionOutcome, FormController, FormView};
pub use error::{ClientError, SelectionError};
pub use http::HttpSnapshotApi;
pub use selection::{FileSelection, SelectedFile};

/// Remote side of the form: one call per user action, no retries.
#[async_trait]
pub trait SnapshotApi: Send + Sync {
    async fn upload_folder(
        &self,
        snapshot_id: &SnapshotId,
        selection: &FileSelection,
    ) -> Result<UploadSnapshotResponse, ClientError>;

    async fn diff(
        &self,
        id_a: &SnapshotId,
        id_b: &SnapshotId,
    ) -> Result<DiffResponse, ClientError>;
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
