//! Persistent lyrics storage.
//!
//! The engine depends only on the [`LyricsStore`] contract - get, put,
//! delete-by-TTL - not on a storage technology. The shipped implementation
//! uses SQLx with SQLite for lightweight, embedded storage, one row per
//! normalized query key. Only positive results are persisted; negative
//! caching stays in the memory tier where its short TTL belongs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::warn;

use crate::error::{Result, ResultExt};
use crate::resolver::{LyricsResult, SourceId};

/// Abstract key-value store for resolved lyrics.
#[async_trait]
pub trait LyricsStore: Send + Sync {
    /// Fetch an unexpired result by key.
    async fn get(&self, key: &str) -> Result<Option<LyricsResult>>;

    /// Insert or overwrite the result for its key.
    async fn put(&self, result: &LyricsResult) -> Result<()>;

    /// Delete rows whose TTL has elapsed. Returns the number removed.
    async fn purge_expired(&self) -> Result<u64>;
}

/// SQLite-backed store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) a database file and ensure the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite:{}", path.display());
        if !sqlx::Sqlite::database_exists(&db_url).await.unwrap_or(false) {
            sqlx::Sqlite::create_database(&db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        Self::init_schema(&pool)
            .await
            .with_context("initialising lyrics schema")?;
        Ok(Self { pool })
    }

    /// In-memory database, mainly for tests. A single connection keeps every
    /// query on the same memory database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS lyrics (
                key TEXT PRIMARY KEY,
                lyrics TEXT NOT NULL,
                source TEXT NOT NULL,
                score REAL NOT NULL,
                resolved_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl LyricsStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<LyricsResult>> {
        let row = sqlx::query(
            "SELECT key, lyrics, source, score, resolved_at, expires_at
             FROM lyrics WHERE key = ? AND expires_at > ?",
        )
        .bind(key)
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let source_name: String = row.get("source");
        let Some(source) = SourceId::from_name(&source_name) else {
            // Row written by a build that knew other providers; treat as absent.
            warn!(key, source = %source_name, "unknown source in store, ignoring row");
            return Ok(None);
        };

        Ok(Some(LyricsResult {
            key: row.get("key"),
            lyrics: row.get("lyrics"),
            source,
            score: row.get("score"),
            resolved_at: timestamp(row.get("resolved_at")),
            expires_at: timestamp(row.get("expires_at")),
        }))
    }

    async fn put(&self, result: &LyricsResult) -> Result<()> {
        sqlx::query(
            "INSERT INTO lyrics (key, lyrics, source, score, resolved_at, expires_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                lyrics = excluded.lyrics,
                source = excluded.source,
                score = excluded.score,
                resolved_at = excluded.resolved_at,
                expires_at = excluded.expires_at",
        )
        .bind(&result.key)
        .bind(&result.lyrics)
        .bind(result.source.as_str())
        .bind(result.score)
        .bind(result.resolved_at.timestamp())
        .bind(result.expires_at.timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM lyrics WHERE expires_at <= ?")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Second-precision epoch to DateTime; out-of-range values clamp to epoch.
fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
