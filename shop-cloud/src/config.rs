//! Server configuration

use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for shop user authentication
    pub jwt_secret: String,
    pub log_level: String,
    /// Rolling log file directory; stdout when unset
    pub log_dir: Option<String>,
    /// Publish document events on the in-process broadcast queue
    pub mq_enabled: bool,
    pub mq_channel_capacity: usize,
    /// Lifetime of the last issued doc number in the cache
    pub doc_no_cache_ttl: Duration,
    /// Upper bound on a single request
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:shop-cloud.db".into(),
            http_port: 8080,
            environment: "development".into(),
            jwt_secret: "dev-JWT_SECRET-not-for-production".into(),
            log_level: "info".into(),
            log_dir: None,
            mq_enabled: false,
            mq_channel_capacity: 1024,
            doc_no_cache_ttl: Duration::from_secs(24 * 60 * 60),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
        std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let defaults = Self::default();
        let environment = std::env::var("ENVIRONMENT").unwrap_or(defaults.environment);

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            http_port: Self::env_parse("HTTP_PORT").unwrap_or(defaults.http_port),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            environment,
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            mq_enabled: Self::env_parse("MQ_ENABLED").unwrap_or(defaults.mq_enabled),
            mq_channel_capacity: Self::env_parse("MQ_CHANNEL_CAPACITY")
                .filter(|c| *c > 0)
                .unwrap_or(defaults.mq_channel_capacity),
            doc_no_cache_ttl: Self::env_parse("DOC_NO_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.doc_no_cache_ttl),
            request_timeout: Self::env_parse("REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_secret_in_development() {
        let val = Config::require_secret("SHOP_CLOUD_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(val, "dev-SHOP_CLOUD_TEST_UNSET_SECRET-not-for-production");
    }

    #[test]
    fn test_require_secret_outside_development() {
        assert!(Config::require_secret("SHOP_CLOUD_TEST_UNSET_SECRET", "production").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.doc_no_cache_ttl, Duration::from_secs(86_400));
        assert!(!config.mq_enabled);
        assert!(!config.is_production());
    }
}
