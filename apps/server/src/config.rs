//! # Server Configuration
//!
//! ## Load Order (later overrides earlier)
//! 1. Default values
//! 2. Config file (`stockhub.toml`, default location from `ProjectDirs`)
//! 3. `STOCKHUB_*` environment variables
//!
//! The result is validated before the server starts.
//!
//! ## Example File
//! ```toml
//! [http]
//! bind_addr = "0.0.0.0"
//! port = 8780
//! allowed_origins = ["https://pos.example.com"]
//!
//! [database]
//! path = "/var/lib/stockhub/stockhub.db"
//!
//! [auth]
//! jwt_secret = "change-me-to-something-long"
//! token_lifetime_secs = 43200
//!
//! [stock]
//! utc_offset_minutes = 330
//! low_stock_threshold = 10
//!
//! [broadcast]
//! redis_url = "redis://127.0.0.1:6379"
//! ```

use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use stockhub_core::validation::validate_utc_offset_minutes;
use stockhub_core::LOW_STOCK_THRESHOLD;

/// Shortest accepted JWT signing secret.
pub const MIN_JWT_SECRET_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Browser origins allowed by CORS (admin hub and terminal UI).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8780
}

fn default_allowed_origins() -> Vec<String> {
    ["http://localhost:5173", "http://127.0.0.1:5173", "http://localhost:3000"]
        .iter()
        .map(|o| o.to_string())
        .collect()
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "stockhub", "server")
        .map(|dirs| dirs.data_dir().join("stockhub.db"))
        .unwrap_or_else(|| PathBuf::from("./stockhub.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// HS256 signing secret. Required.
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: i64,
}

fn default_token_lifetime() -> i64 {
    12 * 3600
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            jwt_secret: String::new(),
            token_lifetime_secs: default_token_lifetime(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSettings {
    /// Offset of the organization's local day from UTC.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// On-ground quantity at or below which settlement raises an advisory.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
}

fn default_low_stock_threshold() -> i64 {
    LOW_STOCK_THRESHOLD
}

impl Default for StockSettings {
    fn default() -> Self {
        StockSettings {
            utc_offset_minutes: 0,
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BroadcastSettings {
    /// Mirror advisories to Redis pub/sub when set.
    #[serde(default)]
    pub redis_url: Option<String>,
}

// =============================================================================
// ServerConfig
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub stock: StockSettings,
    #[serde(default)]
    pub broadcast: BroadcastSettings,
}

impl ServerConfig {
    /// Loads defaults, then the config file (if present), then environment
    /// overrides, then validates.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading server config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "auth.jwt_secret must be at least {} characters (set STOCKHUB_JWT_SECRET)",
                MIN_JWT_SECRET_LEN
            )));
        }

        if self.auth.token_lifetime_secs <= 0 {
            return Err(ConfigError::Invalid(
                "auth.token_lifetime_secs must be greater than 0".into(),
            ));
        }

        validate_utc_offset_minutes(self.stock.utc_offset_minutes)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.stock.low_stock_threshold < 0 {
            return Err(ConfigError::Invalid(
                "stock.low_stock_threshold must not be negative".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if let Some(ref url) = self.broadcast.redis_url {
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(ConfigError::Invalid(format!(
                    "broadcast.redis_url must start with redis:// or rediss://, got: {}",
                    url
                )));
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `STOCKHUB_*` overrides from `lookup`. Unparseable numbers are
    /// logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("STOCKHUB_BIND_ADDR") {
            self.http.bind_addr = addr;
        }

        if let Some(port) = lookup("STOCKHUB_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.http.port = p;
                }
                Err(_) => warn!(value = %port, "Ignoring invalid STOCKHUB_PORT"),
            }
        }

        if let Some(path) = lookup("STOCKHUB_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(secret) = lookup("STOCKHUB_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Some(secs) = lookup("STOCKHUB_TOKEN_LIFETIME_SECS") {
            match secs.parse::<i64>() {
                Ok(s) => self.auth.token_lifetime_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid STOCKHUB_TOKEN_LIFETIME_SECS"),
            }
        }

        if let Some(minutes) = lookup("STOCKHUB_UTC_OFFSET_MINUTES") {
            match minutes.parse::<i32>() {
                Ok(m) => self.stock.utc_offset_minutes = m,
                Err(_) => warn!(value = %minutes, "Ignoring invalid STOCKHUB_UTC_OFFSET_MINUTES"),
            }
        }

        if let Some(threshold) = lookup("STOCKHUB_LOW_STOCK_THRESHOLD") {
            match threshold.parse::<i64>() {
                Ok(t) => self.stock.low_stock_threshold = t,
                Err(_) => warn!(value = %threshold, "Ignoring invalid STOCKHUB_LOW_STOCK_THRESHOLD"),
            }
        }

        if let Some(url) = lookup("STOCKHUB_REDIS_URL") {
            self.broadcast.redis_url = (!url.is_empty()).then_some(url);
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockhub", "server")
            .map(|dirs| dirs.config_dir().join("stockhub.toml"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http.bind_addr, self.http.port)
    }

    /// The organization's local-day offset. Falls back to UTC for an offset
    /// `validate` would reject.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.stock.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid() -> ServerConfig {
        ServerConfig {
            auth: AuthSettings {
                jwt_secret: "0123456789abcdef".to_string(),
                ..AuthSettings::default()
            },
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http.port, 8780);
        assert_eq!(config.stock.low_stock_threshold, 10);
        assert_eq!(config.auth.token_lifetime_secs, 43200);
        assert!(config.broadcast.redis_url.is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(ServerConfig::default().validate().is_err());

        let mut config = valid();
        assert!(config.validate().is_ok());

        config.stock.utc_offset_minutes = 900;
        assert!(config.validate().is_err());

        config.stock.utc_offset_minutes = 330;
        config.broadcast.redis_url = Some("http://localhost".to_string());
        assert!(config.validate().is_err());

        config.broadcast.redis_url = Some("redis://127.0.0.1:6379".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("STOCKHUB_PORT", "9000"),
            ("STOCKHUB_JWT_SECRET", "from-the-environment"),
            ("STOCKHUB_UTC_OFFSET_MINUTES", "330"),
            ("STOCKHUB_LOW_STOCK_THRESHOLD", "not-a-number"),
            ("STOCKHUB_REDIS_URL", ""),
        ]);

        let mut config = ServerConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.http.port, 9000);
        assert_eq!(config.auth.jwt_secret, "from-the-environment");
        assert_eq!(config.utc_offset().local_minus_utc(), 330 * 60);
        assert_eq!(config.stock.low_stock_threshold, 10);
        assert!(config.broadcast.redis_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_sections_are_optional() {
        let config: ServerConfig = toml::from_str(
            r#"
            [auth]
            jwt_secret = "0123456789abcdef0123"

            [stock]
            utc_offset_minutes = -300
            "#,
        )
        .unwrap();

        assert_eq!(config.http.port, 8780);
        assert_eq!(config.stock.utc_offset_minutes, -300);
        assert_eq!(config.stock.low_stock_threshold, 10);
        assert!(config.validate().is_ok());
    }
}
