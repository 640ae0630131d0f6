use std::io::{self, Write};

use client_core::FormView;
use shared::protocol::DiffDetails;

/// Renders the form's output on the terminal: notifications and status on stdout,
/// the diff list as bullet lines.
pub struct TerminalView {
    show_details: bool,
}

impl TerminalView {
    pub fn new(show_details: bool) -> Self {
        Self { show_details }
    }

    fn write_lines<I>(&self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for line in lines {
            // Best effort once stdout is closed.
            let _ = writeln!(out, "{line}");
        }
    }
}

impl FormView for TerminalView {
    fn notify(&self, message: &str) {
        self.write_lines([message.to_string()]);
    }

    fn set_snapshot_status(&self, text: &str) {
        self.write_lines([text.to_string()]);
    }

    fn replace_diff_summary(&self, items: &[String]) {
        self.write_lines(items.iter().map(|item| format!("- {item}")));
    }

    fn show_diff_details(&self, details: &DiffDetails) {
        if self.show_details {
            self.write_lines(detail_lines(details));
        }
    }
}

fn detail_lines(details: &DiffDetails) -> Vec<String> {
    let sections = [
        ("added", &details.added),
        ("deleted", &details.deleted),
        ("modified", &details.modified),
    ];
    sections
        .into_iter()
        .flat_map(|(label, paths)| {
            paths
                .iter()
                .map(move |path| format!("  {label}: {path}"))
        })
        .collect()
}
