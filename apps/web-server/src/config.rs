//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use yatube_core::pagination::DEFAULT_PER_PAGE;
use yatube_infra::{DatabaseConfig, JwtConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Page size shared by every feed.
    pub posts_per_page: u64,
    pub jwt: JwtConfig,
}

/// Trimmed and parsed value of `key`, `None` when unset or malformed.
fn parsed<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|s| s.trim().parse().ok())
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key/value source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            var(key)
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false)
        };

        let database = var("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections: parsed(&var, "DB_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parsed(&var, "DB_MIN_CONNECTIONS").unwrap_or(2),
            auto_migrate: flag("DB_AUTO_MIGRATE"),
        });

        let defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: var("JWT_SECRET").unwrap_or(defaults.secret),
            expiration_hours: parsed(&var, "JWT_EXPIRATION_HOURS")
                .unwrap_or(defaults.expiration_hours),
            issuer: var("JWT_ISSUER").unwrap_or(defaults.issuer),
        };

        Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parsed(&var, "PORT").unwrap_or(8080),
            database,
            posts_per_page: parsed(&var, "POSTS_PER_PAGE")
                .filter(|&n: &u64| n > 0)
                .unwrap_or(DEFAULT_PER_PAGE),
            jwt,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.posts_per_page, 10);
        assert!(config.database.is_none());
        assert!(config.jwt.uses_default_secret());
    }

    #[test]
    fn test_database_settings() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/yatube"),
            ("DB_MAX_CONNECTIONS", "50"),
            ("DB_AUTO_MIGRATE", "true"),
        ]);
        let db = config.database.unwrap();
        assert_eq!(db.url, "postgres://localhost/yatube");
        assert_eq!(db.max_connections, 50);
        assert_eq!(db.min_connections, 2);
        assert!(db.auto_migrate);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let fallback = config(&[("PORT", "eighty"), ("POSTS_PER_PAGE", "0")]);
        assert_eq!(fallback.port, 8080);
        assert_eq!(fallback.posts_per_page, 10);

        let padded = config(&[("POSTS_PER_PAGE", " 25 "), ("JWT_EXPIRATION_HOURS", "48")]);
        assert_eq!(padded.posts_per_page, 25);
        assert_eq!(padded.jwt.expiration_hours, 48);
    }
}
