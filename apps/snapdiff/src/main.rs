use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{FileSelection, FormController, HttpSnapshotApi};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod view;

use config::load_settings;
use view::TerminalView;

const DEFAULT_LOG_FILTER: &str = "warn,snapdiff=info";

#[derive(Parser, Debug)]
#[command(name = "snapdiff", about = "Upload folder snapshots and compare them")]
struct Cli {
    /// Snapshot server origin; overrides snapdiff.toml and the environment.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload every file under FOLDER as snapshot ID.
    Upload {
        folder: PathBuf,
        #[arg(long)]
        id: String,
    },
    /// Compare two snapshots.
    Diff {
        id_a: String,
        id_b: String,
        /// Also list the affected paths.
        #[arg(long)]
        details: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();
    info!("snapshot client loaded");

    let cli = Cli::parse();
    let settings = load_settings();
    let server_url = cli.server_url.unwrap_or(settings.server_url);
    let timeout = settings.request_timeout_secs.map(Duration::from_secs);

    let api = HttpSnapshotApi::with_timeout(&server_url, timeout)
        .with_context(|| format!("invalid server url '{server_url}'"))?;

    let outcome = match cli.command {
        Command::Upload { folder, id } => {
            let selection = FileSelection::from_folder(&folder)
                .with_context(|| format!("failed to read folder '{}'", folder.display()))?;
            let controller =
                FormController::new(Arc::new(api), Arc::new(TerminalView::new(false)));
            controller.upload_snapshot(&selection, &id).await
        }
        Command::Diff {
            id_a,
            id_b,
            details,
        } => {
            let controller =
                FormController::new(Arc::new(api), Arc::new(TerminalView::new(details)));
            controller.run_diff(&id_a, &id_b).await
        }
    };

    info!(?outcome, "action finished");
    Ok(if outcome.is_completed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
