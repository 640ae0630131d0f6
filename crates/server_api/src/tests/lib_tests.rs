use super::*;
use shared::error::ErrorCode;

async fn setup() -> ApiContext {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    ApiContext { storage }
}

fn files(entries: &[(&str, &str)]) -> Vec<UploadedFile> {
    entries
        .iter()
        .map(|(path, body)| UploadedFile::new(*path, body.as_bytes()))
        .collect()
}

#[tokio::test]
async fn create_snapshot_counts_distinct_paths() {
    let ctx = setup().await;
    let response = create_snapshot(
        &ctx,
        Some("v1"),
        files(&[("proj/a.txt", "a"), ("proj/b.txt", "b"), ("proj/a.txt", "a2")]),
    )
    .await
    .expect("snapshot");

    assert_eq!(response.file_count, 2);
    assert_eq!(response.status.as_deref(), Some("success"));
    assert_eq!(response.id.as_ref().map(SnapshotId::as_str), Some("v1"));

    let stored = ctx
        .storage
        .load_snapshot(&SnapshotId::parse("v1").expect("id"))
        .await
        .expect("load")
        .expect("stored");
    assert_eq!(stored.get("proj/a.txt"), Some(&content_hash(b"a2")));
}

#[tokio::test]
async fn create_snapshot_requires_id_before_files() {
    let ctx = setup().await;
    let err = create_snapshot(&ctx, Some("   "), Vec::new())
        .await
        .expect_err("blank id");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.message, "Snapshot ID missing");

    let err = create_snapshot(&ctx, None, files(&[("a", "a")]))
        .await
        .expect_err("missing id");
    assert_eq!(err.message, "Snapshot ID missing");
}

#[tokio::test]
async fn create_snapshot_rejects_empty_upload() {
    let ctx = setup().await;
    let err = create_snapshot(&ctx, Some("v1"), Vec::new())
        .await
        .expect_err("no files");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.message, "No files were uploaded");
}

#[tokio::test]
async fn create_snapshot_rejects_escaping_paths_without_storing() {
    let ctx = setup().await;
    let err = create_snapshot(
        &ctx,
        Some("v1"),
        files(&[("proj/ok.txt", "ok"), ("proj/../../etc/passwd", "x")]),
    )
    .await
    .expect_err("traversal");
    assert_eq!(err.code, ErrorCode::Validation);

    let stored = ctx
        .storage
        .load_snapshot(&SnapshotId::parse("v1").expect("id"))
        .await
        .expect("load");
    assert!(stored.is_none());
}

#[tokio::test]
async fn diff_reports_added_deleted_and_modified() {
    let ctx = setup().await;
    create_snapshot(
        &ctx,
        Some("before"),
        files(&[("p/same.txt", "1"), ("p/gone.txt", "2"), ("p/edit.txt", "3")]),
    )
    .await
    .expect("before");
    create_snapshot(
        &ctx,
        Some("after"),
        files(&[
            ("p/same.txt", "1"),
            ("p/edit.txt", "changed"),
            ("p/new-b.txt", "4"),
            ("p/new-a.txt", "5"),
        ]),
    )
    .await
    .expect("after");

    let response = diff_snapshots(&ctx, Some("before"), Some("after"))
        .await
        .expect("diff");
    assert_eq!(response.summary.added, 2);
    assert_eq!(response.summary.deleted, 1);
    assert_eq!(response.summary.modified, 1);

    let details = response.diff_details.expect("details");
    assert_eq!(details.added, vec!["p/new-a.txt", "p/new-b.txt"]);
    assert_eq!(details.deleted, vec!["p/gone.txt"]);
    assert_eq!(details.modified, vec!["p/edit.txt"]);
}

#[tokio::test]
async fn diff_of_unknown_snapshot_is_not_found() {
    let ctx = setup().await;
    create_snapshot(&ctx, Some("known"), files(&[("a", "a")]))
        .await
        .expect("known");

    let err = diff_snapshots(&ctx, Some("known"), Some("unknown"))
        .await
        .expect_err("unknown b");
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.message, "Snapshot ID not found");

    let err = diff_snapshots(&ctx, None, Some("known"))
        .await
        .expect_err("missing a");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn diff_of_snapshot_with_itself_is_empty() {
    let ctx = setup().await;
    create_snapshot(&ctx, Some("v1"), files(&[("a", "a"), ("b", "b")]))
        .await
        .expect("v1");

    let response = diff_snapshots(&ctx, Some("v1"), Some("v1"))
        .await
        .expect("diff");
    assert_eq!(response.summary, shared::protocol::DiffSummary::default());
}

#[test]
fn normalize_relative_path_folds_separators_and_dots() {
    assert_eq!(
        normalize_relative_path("proj\\src\\.\\main.rs").expect("path"),
        "proj/src/main.rs"
    );
    assert_eq!(
        normalize_relative_path("proj//a.txt").expect("path"),
        "proj/a.txt"
    );
}

#[test]
fn normalize_relative_path_rejects_roots_and_parents() {
    for raw in ["", "  ", "/etc/passwd", "C:\\Windows\\x", "a/../b", "./."] {
        assert!(
            normalize_relative_path(raw).is_err(),
            "expected rejection for {raw:?}"
        );
    }
}

#[test]
fn content_hash_is_lowercase_sha256_hex() {
    assert_eq!(
        content_hash(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}
