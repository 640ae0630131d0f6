use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::SnapshotId;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://./data/snapshots.db";

/// Relative path -> lowercase hex SHA-256 of the file contents.
pub type Manifest = BTreeMap<String, String>;

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    /// Accepts `sqlx` URLs as well as plain file paths; a file-backed database gets its
    /// parent directory created.
    pub async fn new(database_url: &str) -> Result<Self> {
        let database_url = normalize_database_url(database_url);
        ensure_sqlite_parent_dir_exists(&database_url)?;

        let connect_options = SqliteConnectOptions::from_str(&database_url)
            .with_context(|| format!("invalid database url '{database_url}'"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Drops whatever was stored under `snapshot_id` and writes `manifest` in its place.
    /// Returns the number of entries written.
    pub async fn replace_snapshot(
        &self,
        snapshot_id: &SnapshotId,
        manifest: &Manifest,
    ) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM snapshots WHERE id = ?")
            .bind(snapshot_id.as_str())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to clear snapshot '{snapshot_id}'"))?;

        for (filepath, hash) in manifest {
            sqlx::query("INSERT INTO snapshots (id, filepath, hash) VALUES (?, ?, ?)")
                .bind(snapshot_id.as_str())
                .bind(filepath)
                .bind(hash)
                .execute(&mut *tx)
                .await
                .with_context(|| {
                    format!("failed to insert '{filepath}' into snapshot '{snapshot_id}'")
                })?;
        }

        tx.commit().await?;
        Ok(manifest.len())
    }

    /// `None` when no file was ever recorded under `snapshot_id`.
    pub async fn load_snapshot(&self, snapshot_id: &SnapshotId) -> Result<Option<Manifest>> {
        let rows = sqlx::query("SELECT filepath, hash FROM snapshots WHERE id = ?")
            .bind(snapshot_id.as_str())
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("failed to load snapshot '{snapshot_id}'"))?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut manifest = Manifest::new();
        for row in rows {
            let filepath: String = row.try_get("filepath")?;
            let hash: String = row.try_get("hash")?;
            manifest.insert(filepath, hash);
        }
        Ok(Some(manifest))
    }
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return DEFAULT_DATABASE_URL.to_string();
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    let path = raw_database_url
        .strip_prefix("sqlite:")
        .unwrap_or(raw_database_url)
        .replace('\\', "/");
    format!("sqlite://{path}")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
