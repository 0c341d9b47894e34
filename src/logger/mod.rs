//! Logger module
//!
//! Diagnostics go through `tracing`. This module installs the subscriber and
//! owns the access log, which is emitted on the `access` target so it can be
//! filtered separately (`RUST_LOG=info,access=off`).

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::fs::OpenOptions;
use std::io;
use std::net::SocketAddr;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over `logging.level`. Should be called once at startup.
pub fn init(config: &LoggingConfig) -> io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.log_file.as_deref() {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.try_init(),
    };
    installed.map_err(io::Error::other)
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        %addr,
        workers = ?config.server.workers,
        max_connections = ?config.performance.max_connections,
        "server listening on http://{addr}"
    );
    for mount in &config.site.mounts {
        tracing::info!(prefix = %mount.prefix, dir = %mount.dir, "mounted directory");
    }
    tracing::info!(
        index = %config.site.index_file,
        health = %config.site.health.path,
        "routes ready"
    );
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_connection_error(peer_addr: &SocketAddr, err: &hyper::Error) {
    // Clients hanging up mid-response are routine
    if err.is_incomplete_message() || err.is_canceled() {
        tracing::debug!(%peer_addr, error = %err, "connection closed early");
    } else {
        tracing::warn!(%peer_addr, error = %err, "failed to serve connection");
    }
}
