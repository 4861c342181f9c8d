//! Transfer configuration, loaded from environment variables

use anyhow::{Context, Result};

pub const DEFAULT_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone)]
pub struct TransferConfig {
    pub source_database_url: Option<String>,
    pub target_database_url: Option<String>,
    /// Rows read per page when copying a collection
    pub page_size: i64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            source_database_url: None,
            target_database_url: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TransferConfig {
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            source_database_url: non_empty("SOURCE_DATABASE_URL"),
            target_database_url: non_empty("TARGET_DATABASE_URL"),
            page_size: non_empty("TRANSFER_PAGE_SIZE")
                .and_then(|v| v.trim().parse().ok())
                .filter(|n: &i64| *n > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Command-line values win over the environment
    pub fn with_overrides(
        mut self,
        source: Option<String>,
        target: Option<String>,
        page_size: Option<i64>,
    ) -> Self {
        if source.is_some() {
            self.source_database_url = source;
        }
        if target.is_some() {
            self.target_database_url = target;
        }
        if let Some(size) = page_size.filter(|n| *n > 0) {
            self.page_size = size;
        }
        self
    }

    pub fn source_url(&self) -> Result<&str> {
        self.source_database_url
            .as_deref()
            .context("SOURCE_DATABASE_URL is not set (or pass --source)")
    }

    pub fn target_url(&self) -> Result<&str> {
        self.target_database_url
            .as_deref()
            .context("TARGET_DATABASE_URL is not set (or pass --target)")
    }
}
