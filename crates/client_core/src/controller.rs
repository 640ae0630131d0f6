//! Form controller: validates user input, issues one request per action and
//! reports the result through an injected [`FormView`].

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{
    domain::SnapshotId,
    protocol::{DiffDetails, DiffSummary},
};
use tracing::{info, warn};

use crate::{selection::FileSelection, SnapshotApi};

pub const SELECT_FOLDER_MESSAGE: &str = "Please select a folder.";
pub const MISSING_SNAPSHOT_ID_MESSAGE: &str = "Please enter Snapshot ID.";
pub const MISSING_DIFF_IDS_MESSAGE: &str = "Enter both snapshot IDs.";
pub const SNAPSHOT_FAILED_MESSAGE: &str = "Snapshot failed";
pub const DIFF_FAILED_MESSAGE: &str = "Diff failed";
pub const SNAPSHOT_CREATED_MESSAGE: &str = "Snapshot created!";
pub const DIFF_COMPLETED_MESSAGE: &str = "Diff completed!";
pub const REQUEST_IN_PROGRESS_MESSAGE: &str = "A request is already in progress.";

/// Output surface of the form.
pub trait FormView: Send + Sync {
    /// Blocking, user-facing notification.
    fn notify(&self, message: &str);

    fn set_snapshot_status(&self, text: &str);

    /// Replaces whatever the diff list showed before.
    fn replace_diff_summary(&self, items: &[String]);

    fn show_diff_details(&self, _details: &DiffDetails) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Input failed a presence check; nothing was sent.
    Rejected,
    /// The same action was already pending; nothing was sent.
    Busy,
    Failed { message: String },
    Completed,
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

pub struct FormController {
    api: Arc<dyn SnapshotApi>,
    view: Arc<dyn FormView>,
    upload_in_flight: AtomicBool,
    diff_in_flight: AtomicBool,
}

impl FormController {
    pub fn new(api: Arc<dyn SnapshotApi>, view: Arc<dyn FormView>) -> Self {
        Self {
            api,
            view,
            upload_in_flight: AtomicBool::new(false),
            diff_in_flight: AtomicBool::new(false),
        }
    }

    pub async fn upload_snapshot(
        &self,
        selection: &FileSelection,
        raw_snapshot_id: &str,
    ) -> ActionOutcome {
        if selection.is_empty() {
            return self.reject(SELECT_FOLDER_MESSAGE);
        }
        let Some(snapshot_id) = SnapshotId::parse(raw_snapshot_id) else {
            return self.reject(MISSING_SNAPSHOT_ID_MESSAGE);
        };
        let Some(_in_flight) = InFlight::acquire(&self.upload_in_flight) else {
            return self.busy();
        };

        info!(snapshot_id = %snapshot_id, files = selection.len(), "uploading snapshot");
        match self.api.upload_folder(&snapshot_id, selection).await {
            Ok(response) => {
                self.view.set_snapshot_status(&format!(
                    "Snapshot created with {} files",
                    response.file_count
                ));
                self.view.notify(SNAPSHOT_CREATED_MESSAGE);
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!(snapshot_id = %snapshot_id, error = %err, "snapshot upload failed");
                self.fail(err.server_message().unwrap_or(SNAPSHOT_FAILED_MESSAGE))
            }
        }
    }

    pub async fn run_diff(&self, raw_id_a: &str, raw_id_b: &str) -> ActionOutcome {
        let (Some(id_a), Some(id_b)) = (SnapshotId::parse(raw_id_a), SnapshotId::parse(raw_id_b))
        else {
            return self.reject(MISSING_DIFF_IDS_MESSAGE);
        };
        let Some(_in_flight) = InFlight::acquire(&self.diff_in_flight) else {
            return self.busy();
        };

        info!(id_a = %id_a, id_b = %id_b, "requesting snapshot diff");
        match self.api.diff(&id_a, &id_b).await {
            Ok(response) => {
                self.view
                    .replace_diff_summary(&summary_items(&response.summary));
                if let Some(details) = &response.diff_details {
                    self.view.show_diff_details(details);
                }
                self.view.notify(DIFF_COMPLETED_MESSAGE);
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!(id_a = %id_a, id_b = %id_b, error = %err, "snapshot diff failed");
                self.fail(err.server_message().unwrap_or(DIFF_FAILED_MESSAGE))
            }
        }
    }

    fn reject(&self, message: &str) -> ActionOutcome {
        self.view.notify(message);
        ActionOutcome::Rejected
    }

    fn busy(&self) -> ActionOutcome {
        self.view.notify(REQUEST_IN_PROGRESS_MESSAGE);
        ActionOutcome::Busy
    }

    fn fail(&self, message: &str) -> ActionOutcome {
        self.view.notify(message);
        ActionOutcome::Failed {
            message: message.to_string(),
        }
    }
}

/// The three list lines, always in added/deleted/modified order.
pub fn summary_items(summary: &DiffSummary) -> Vec<String> {
    vec![
        format!("Added: {}", summary.added),
        format!("Deleted: {}", summary.deleted),
        format!("Modified: {}", summary.modified),
    ]
}

/// Holds an action's in-flight flag; clears it on drop.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
