//! SQLite-backed persistent store.
//!
//! Split into focused submodules:
//! - `subscriptions`: subscription CRUD with soft delete and reactivation
//! - `notifications`: per-user reminder settings, defaulted on first read
//! - `sessions`: persisted dialogue sessions with lazy idle expiry
//! - `support`: messages users leave for support

mod notifications;
mod sessions;
mod subscriptions;
mod support;

use subtrack_core::{
    config::{SessionConfig, StorageConfig},
    error::SubtrackError,
    shellexpand,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Persistent store backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
    /// Idle minutes after which a stored dialogue session is dropped.
    session_timeout_minutes: i64,
}

impl Store {
    /// Create a new store, running migrations on first use.
    pub async fn new(config: &StorageConfig, sessions: &SessionConfig) -> Result<Self, SubtrackError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SubtrackError::Storage(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| SubtrackError::Storage(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| SubtrackError::Storage(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("Store initialized at {db_path}");

        Ok(Self {
            pool,
            session_timeout_minutes: sessions.timeout_minutes,
        })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the database file size in bytes.
    pub async fn db_size(&self) -> Result<u64, SubtrackError> {
        let (page_count,): (i64,) = sqlx::query_as("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SubtrackError::Storage(format!("pragma failed: {e}")))?;

        let (page_size,): (i64,) = sqlx::query_as("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SubtrackError::Storage(format!("pragma failed: {e}")))?;

        Ok((page_count * page_size) as u64)
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), SubtrackError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("failed to create migrations table: {e}")))?;

        let migrations: &[(&str, &str)] = &[
            ("001_init", include_str!("../../migrations/001_init.sql")),
            (
                "002_sessions",
                include_str!("../../migrations/002_sessions.sql"),
            ),
            (
                "003_support_messages",
                include_str!("../../migrations/003_support_messages.sql"),
            ),
        ];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        SubtrackError::Storage(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| SubtrackError::Storage(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    SubtrackError::Storage(format!("failed to record migration {name}: {e}"))
                })?;

            info!("applied migration {name}");
        }
        Ok(())
    }
}
