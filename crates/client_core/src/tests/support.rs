use std::sync::Mutex;

use shared::protocol::DiffDetails;

use crate::controller::FormView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ViewEvent {
    Notify(String),
    Status(String),
    DiffSummary(Vec<String>),
    DiffDetails(DiffDetails),
}

#[derive(Default)]
pub(crate) struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub(crate) fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().expect("view lock").clone()
    }

    pub(crate) fn notifications(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Notify(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().expect("view lock").push(event);
    }
}

impl FormView for RecordingView {
    fn notify(&self, message: &str) {
        self.push(ViewEvent::Notify(message.to_string()));
    }

    fn set_snapshot_status(&self, text: &str) {
        self.push(ViewEvent::Status(text.to_string()));
    }

    fn replace_diff_summary(&self, items: &[String]) {
        self.push(ViewEvent::DiffSummary(items.to_vec()));
    }

    fn show_diff_details(&self, details: &DiffDetails) {
        self.push(ViewEvent::DiffDetails(details.clone()));
    }
}
