use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub recommendations: RecommendationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_category_capacity")]
    pub category_capacity: u64,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            category_capacity: default_category_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_category_capacity() -> u64 { 10_000 }
fn default_cache_ttl() -> u64 { 3600 }

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    /// Radius used when a request does not give one
    #[serde(default = "default_radius_m")]
    pub default_radius_m: u32,
    /// Upper bound applied to requested radii
    #[serde(default = "default_max_radius_m")]
    pub max_radius_m: u32,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_radius_m: default_radius_m(),
            max_radius_m: default_max_radius_m(),
        }
    }
}

impl RecommendationSettings {
    /// Resolve the effective radius for a request
    pub fn effective_radius(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_radius_m)
            .min(self.max_radius_m)
    }
}

fn default_radius_m() -> u32 { 20_000 }
fn default_max_radius_m() -> u32 { 50_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with RECOMMENDER__)
    /// 5. DATABASE_URL, if set
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., RECOMMENDER__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("RECOMMENDER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }

        builder.build()?.try_deserialize()
    }
}
