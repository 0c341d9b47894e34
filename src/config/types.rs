// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Pending connection queue size passed to `listen(2)`
    pub backlog: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            workers: None,
            backlog: 1024,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Log file path (optional, stdout if not set)
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: "combined".to_string(),
            log_file: None,
        }
    }
}

/// Connection handling limits, all durations in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Keep-alive switch: `0` closes after each response, any other value
    /// keeps the connection open. Idle connections are still bounded by the
    /// per-connection `max(read_timeout, write_timeout)` limit.
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Grace period for in-flight connections after a shutdown signal
    pub shutdown_timeout: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
            shutdown_timeout: 10,
        }
    }
}

/// What the server publishes: the index page, mounted directories and the health route
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Directory that `index_file` and relative mount directories are resolved against
    #[serde(default = "default_site_root")]
    pub root: String,
    #[serde(default = "default_index_file")]
    pub index_file: String,
    #[serde(default = "default_mounts")]
    pub mounts: Vec<MountConfig>,
    #[serde(default)]
    pub health: HealthConfig,
}

/// A URL prefix served from a directory
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MountConfig {
    pub prefix: String,
    pub dir: String,
}

/// Fixed JSON health endpoint
#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    #[serde(default = "default_health_path")]
    pub path: String,
    #[serde(default = "default_health_message")]
    pub message: String,
}

fn default_site_root() -> String {
    ".".to_string()
}

fn default_index_file() -> String {
    "index.html".to_string()
}

fn default_mounts() -> Vec<MountConfig> {
    vec![
        MountConfig {
            prefix: "/src".to_string(),
            dir: "src".to_string(),
        },
        MountConfig {
            prefix: "/static".to_string(),
            dir: "static".to_string(),
        },
    ]
}

fn default_health_path() -> String {
    "/api/hello".to_string()
}

fn default_health_message() -> String {
    "Backend connected successfully!".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: default_site_root(),
            index_file: default_index_file(),
            mounts: default_mounts(),
            health: HealthConfig::default(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            path: default_health_path(),
            message: default_health_message(),
        }
    }
}
