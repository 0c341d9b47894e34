// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    Config, HealthConfig, LoggingConfig, MountConfig, PerformanceConfig, ServerConfig, SiteConfig,
};

/// Config file looked up when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `PORTAL_SERVER__PORT=9000`
const ENV_PREFIX: &str = "PORTAL";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources in increasing priority: built-in defaults, the optional config
    /// file, then `PORTAL_*` environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let settings = config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("server.backlog", i64::from(defaults.server.backlog))?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.access_log", defaults.logging.access_log)?
            .set_default("logging.access_log_format", defaults.logging.access_log_format)?
            .set_default(
                "performance.keep_alive_timeout",
                defaults.performance.keep_alive_timeout,
            )?
            .set_default("performance.read_timeout", defaults.performance.read_timeout)?
            .set_default("performance.write_timeout", defaults.performance.write_timeout)?
            .set_default(
                "performance.shutdown_timeout",
                defaults.performance.shutdown_timeout,
            )?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/portal-config").unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.site.index_file, "index.html");
        assert_eq!(cfg.site.health.path, "/api/hello");
        assert_eq!(cfg.site.health.message, "Backend connected successfully!");
        let prefixes: Vec<_> = cfg.site.mounts.iter().map(|m| m.prefix.as_str()).collect();
        assert_eq!(prefixes, ["/src", "/static"]);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100
workers = 2

[performance]
max_connections = 64

[site]
index_file = "home.html"
mounts = [{{ prefix = "/assets", dir = "public" }}]
"#
        )
        .unwrap();

        let stem = dir.path().join("portal");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.performance.max_connections, Some(64));
        assert_eq!(cfg.performance.read_timeout, 30);
        assert_eq!(cfg.site.index_file, "home.html");
        assert_eq!(
            cfg.site.mounts,
            vec![MountConfig {
                prefix: "/assets".to_string(),
                dir: "public".to_string(),
            }]
        );
        // Unset fields in a partially written section keep their defaults
        assert_eq!(cfg.site.health.path, "/api/hello");
    }

    #[test]
    fn test_env_overrides_file_and_defaults() {
        // Keys read by no other test in this module
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal-env.toml");
        std::fs::write(&path, "[server]\nbacklog = 128\n").unwrap();

        std::env::set_var("PORTAL_SERVER__BACKLOG", "256");
        std::env::set_var("PORTAL_LOGGING__ACCESS_LOG_FORMAT", "json");
        std::env::set_var("PORTAL_PERFORMANCE__SHUTDOWN_TIMEOUT", "3");
        std::env::set_var("PORTAL_SITE__ROOT", "/srv/portal");

        let stem = dir.path().join("portal-env");
        let loaded = Config::load_from(stem.to_str().unwrap());

        std::env::remove_var("PORTAL_SERVER__BACKLOG");
        std::env::remove_var("PORTAL_LOGGING__ACCESS_LOG_FORMAT");
        std::env::remove_var("PORTAL_PERFORMANCE__SHUTDOWN_TIMEOUT");
        std::env::remove_var("PORTAL_SITE__ROOT");

        let cfg = loaded.unwrap();
        assert_eq!(cfg.server.backlog, 256);
        assert_eq!(cfg.logging.access_log_format, "json");
        assert_eq!(cfg.performance.shutdown_timeout, 3);
        assert_eq!(cfg.site.root, "/srv/portal");
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::default();
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "127.0.0.1:8000");

        let mut bad = Config::default();
        bad.server.host = "not a host".to_string();
        assert!(bad.get_socket_addr().is_err());
    }
}
