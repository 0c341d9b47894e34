//! Error types
//!
//! `AssetError` is request-scoped and always becomes an HTTP response.
//! `RouteTableError` is raised while building the route table and aborts startup.

use hyper::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to serve a file from disk
#[derive(Debug, Error)]
pub enum AssetError {
    /// The requested file does not exist or is not a regular file
    #[error("asset not found")]
    NotFound,
    /// The requested path resolves outside its mounted directory
    #[error("path escapes the mounted directory")]
    Forbidden,
    /// The file exists but could not be read
    #[error("failed to read asset: {0}")]
    Io(#[source] io::Error),
}

impl AssetError {
    /// Classify an I/O error raised while opening or reading a file
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::Forbidden,
            _ => Self::Io(err),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Invalid route configuration detected at startup
#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("route path '{0}' must start with '/' and must not be the bare root")]
    InvalidPath(String),

    #[error("route '{0}' is defined more than once")]
    Duplicate(String),

    #[error("directory '{}' mounted at '{prefix}' is not accessible: {source}", .dir.display())]
    MountUnavailable {
        prefix: String,
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("path '{}' mounted at '{prefix}' is not a directory", .dir.display())]
    NotADirectory { prefix: String, dir: PathBuf },
}
