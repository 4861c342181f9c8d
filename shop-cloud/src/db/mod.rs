//! Database Module
//!
//! Handles the SQLite connection pool and migrations

pub mod repository;
pub mod tokenizer;

use shared::error::AppError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

const HEALTH_CHECK_ATTEMPTS: u32 = 5;
const HEALTH_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Database service, owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database at `url` in WAL mode and apply migrations
    pub async fn new(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::database(format!("Invalid database url: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!(url = %url, "Database connection established (SQLite WAL, busy_timeout=5000ms)");

        Self::from_pool(pool).await
    }

    /// Private in-memory database, one connection so every query sees the same data
    pub async fn in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations")
            .set_ignore_missing(true)
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::debug!("Database migrations applied");

        let folded = repository::backfill_folded(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to fold search text: {e}")))?;
        if folded > 0 {
            tracing::info!(rows = folded, "Search text backfilled");
        }

        Ok(Self { pool })
    }

    /// Ping the database, retrying a few times before giving up
    pub async fn health_check(&self) -> Result<(), AppError> {
        let mut last_err = None;
        for attempt in 1..=HEALTH_CHECK_ATTEMPTS {
            match sqlx::query("SELECT 1").execute(&self.pool).await {
                Ok(_) => return Ok(()),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Database health check failed");
                    last_err = Some(e);
                    if attempt < HEALTH_CHECK_ATTEMPTS {
                        tokio::time::sleep(HEALTH_CHECK_INTERVAL).await;
                    }
                }
            }
        }
        Err(AppError::database(format!(
            "Database unreachable: {}",
            last_err.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}
