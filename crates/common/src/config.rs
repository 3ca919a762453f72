//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Engagement (reactions, favorites, comments) configuration.
    #[serde(default)]
    pub engagement: EngagementConfig,
    /// Nearby-search configuration.
    #[serde(default)]
    pub proximity: ProximityConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Engagement configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngagementConfig {
    /// How many comments the artwork summary surfaces.
    #[serde(default = "default_recent_comments_limit")]
    pub recent_comments_limit: u64,
    /// Whether newly created artworks start out approved.
    #[serde(default = "default_true")]
    pub auto_approve_artworks: bool,
    /// Maximum comment length in characters.
    #[serde(default = "default_max_comment_length")]
    pub max_comment_length: usize,
}

/// Nearby-search configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProximityConfig {
    /// Largest radius a caller may ask for.
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,
    /// Radius used when the caller does not pass one.
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            recent_comments_limit: default_recent_comments_limit(),
            auto_approve_artworks: default_true(),
            max_comment_length: default_max_comment_length(),
        }
    }
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            max_radius_km: default_max_radius_km(),
            default_radius_km: default_radius_km(),
        }
    }
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_recent_comments_limit() -> u64 {
    3
}

const fn default_true() -> bool {
    true
}

const fn default_max_comment_length() -> usize {
    1000
}

const fn default_max_radius_km() -> f64 {
    100.0
}

const fn default_radius_km() -> f64 {
    5.0
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `TOKAPU_ENV`)
    /// 3. Environment variables with `TOKAPU_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("TOKAPU_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TOKAPU")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TOKAPU")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Result<Config, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_defaults_applied() {
        let config = from_toml(
            r#"
            [database]
            url = "postgres://localhost/tokapu"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.min_connections, 2);
        assert_eq!(config.engagement.recent_comments_limit, 3);
        assert!(config.engagement.auto_approve_artworks);
        assert_eq!(config.engagement.max_comment_length, 1000);
        assert_eq!(config.proximity.max_radius_km, 100.0);
        assert_eq!(config.proximity.default_radius_km, 5.0);
    }

    #[test]
    fn test_overrides() {
        let config = from_toml(
            r#"
            [database]
            url = "postgres://localhost/tokapu"
            max_connections = 50

            [engagement]
            auto_approve_artworks = false

            [proximity]
            max_radius_km = 25.0
            "#,
        )
        .unwrap();

        assert_eq!(config.database.max_connections, 50);
        assert!(!config.engagement.auto_approve_artworks);
        assert_eq!(config.engagement.recent_comments_limit, 3);
        assert_eq!(config.proximity.max_radius_km, 25.0);
    }

    #[test]
    fn test_missing_database_is_error() {
        assert!(from_toml("[engagement]\nrecent_comments_limit = 5\n").is_err());
    }
}
