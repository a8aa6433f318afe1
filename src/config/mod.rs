//! Configuration management
//!
//! This module provides YAML-based configuration management with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS; empty allows any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8400
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_expiry")]
    pub token_expiry_hours: u64,
}

fn default_token_expiry() -> u64 {
    24
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default = "default_log_target")]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Log file name prefix
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    /// Enable daily log rotation
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
    /// Maximum number of log files to keep (0 = unlimited)
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to console (stdout/stderr)
    #[default]
    Console,
    /// Log to file with optional rotation
    File,
    /// Log to both console and file
    Both,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_log_target() -> LogTarget {
    LogTarget::Console
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/skillnexus/admin")
}

fn default_log_prefix() -> String {
    "skillnexus-admin".to_string()
}

fn default_log_rotation() -> bool {
    true
}

fn default_max_log_files() -> usize {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: default_log_target(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
            max_log_files: default_max_log_files(),
        }
    }
}

/// Dashboard aggregation limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Number of the caller's own ledger entries in `recent_activity`
    #[serde(default = "default_recent_activity_limit")]
    pub recent_activity_limit: u32,
    /// Number of users returned by the user management view
    #[serde(default = "default_user_management_limit")]
    pub user_management_limit: u32,
}

fn default_recent_activity_limit() -> u32 {
    10
}

fn default_user_management_limit() -> u32 {
    50
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_activity_limit: default_recent_activity_limit(),
            user_management_limit: default_user_management_limit(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                cors_allowed_origins: Vec::new(),
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production-minimum-32-characters-long".to_string(),
                token_expiry_hours: default_token_expiry(),
            },
            database: DatabaseConfig {
                url: "sqlite://./data/skillnexus.db".to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            logging: LoggingConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables (prefixed with SKILLNEXUS_)
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("SKILLNEXUS_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = match config_path {
            Some(ref path) if path.exists() => {
                eprintln!("[CONFIG] Loading configuration from: {:?}", path);
                Self::from_file(path)?
            }
            Some(ref path) => {
                eprintln!("[CONFIG] Config file not found: {:?}, using defaults", path);
                AppConfig::default()
            }
            None => {
                eprintln!("[CONFIG] No config file found, using defaults");
                AppConfig::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_norway::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            PathBuf::from("/etc/skillnexus-admin/config.yaml"),
            dirs::config_dir()
                .map(|p| p.join("skillnexus-admin/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("SKILLNEXUS_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("SKILLNEXUS_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SKILLNEXUS_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
        if let Ok(target) = std::env::var("SKILLNEXUS_LOG_TARGET") {
            self.logging.target = match target.to_lowercase().as_str() {
                "file" => LogTarget::File,
                "both" => LogTarget::Both,
                _ => LogTarget::Console,
            };
        }
        if let Ok(dir) = std::env::var("SKILLNEXUS_LOG_DIR") {
            self.logging.log_dir = PathBuf::from(dir);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < 32 {
            anyhow::bail!("JWT secret must be at least 32 characters long");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.dashboard.recent_activity_limit == 0 {
            anyhow::bail!("dashboard.recent_activity_limit must be at least 1");
        }
        if self.dashboard.user_management_limit == 0 {
            anyhow::bail!("dashboard.user_management_limit must be at least 1");
        }

        Ok(())
    }
}
