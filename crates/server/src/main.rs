use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::BytesRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use server_api::{create_snapshot, diff_snapshots, ApiContext, UploadedFile};
use shared::{
    error::{ApiError, ErrorBody, ErrorCode},
    protocol::{
        DiffRequest, DiffResponse, UploadSnapshotResponse, DIFF_ROUTE, UPLOAD_FILES_FIELD,
        UPLOAD_FOLDER_ROUTE, UPLOAD_ID_FIELD,
    },
};
use storage::Storage;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

type HttpError = (StatusCode, Json<ErrorBody>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let database_url = settings.database_url;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(
        Arc::new(state),
        settings.max_upload_bytes,
        settings.static_dir,
    );

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(
    state: Arc<AppState>,
    max_upload_bytes: usize,
    static_dir: Option<PathBuf>,
) -> Router {
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route(UPLOAD_FOLDER_ROUTE, post(upload_folder))
        .route(DIFF_ROUTE, post(http_diff))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state);

    match static_dir {
        Some(dir) => {
            info!(static_dir = %dir.display(), "serving static files");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    }
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, HttpError> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|e| http_error(ApiError::internal(e.to_string())))?;
    Ok("ok")
}

async fn upload_folder(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadSnapshotResponse>, HttpError> {
    let mut multipart = multipart.map_err(|rejection| {
        http_error(body_error(rejection.status(), rejection.body_text()))
    })?;

    let mut snapshot_id: Option<String> = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(UPLOAD_ID_FIELD) => {
                let text = field.text().await.map_err(multipart_error)?;
                snapshot_id = Some(text);
            }
            Some(UPLOAD_FILES_FIELD) => {
                let relative_path = field.file_name().unwrap_or_default().to_string();
                let contents: Bytes = field.bytes().await.map_err(multipart_error)?;
                files.push(UploadedFile::new(relative_path, contents.to_vec()));
            }
            other => {
                warn!(field = ?other, "ignoring unexpected multipart field");
            }
        }
    }

    create_snapshot(&state.api, snapshot_id.as_deref(), files)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_diff(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DiffResponse>, HttpError> {
    let body = body.map_err(|rejection| {
        http_error(body_error(rejection.status(), rejection.body_text()))
    })?;
    let request: DiffRequest = serde_json::from_slice(&body)
        .map_err(|_| http_error(ApiError::validation("Invalid JSON body")))?;

    diff_snapshots(&state.api, request.id_a.as_deref(), request.id_b.as_deref())
        .await
        .map(Json)
        .map_err(http_error)
}

fn multipart_error(err: MultipartError) -> HttpError {
    warn!(error = %err, "malformed multipart upload");
    http_error(body_error(err.status(), err.body_text()))
}

/// Request body failures are client errors; an exceeded body limit keeps its 413.
fn body_error(status: StatusCode, message: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(ErrorCode::PayloadTooLarge, message)
    } else {
        ApiError::validation(message)
    }
}

fn http_error(err: ApiError) -> HttpError {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(message = %err.message, "request failed");
    }
    (status, Json(ErrorBody::from(err)))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
