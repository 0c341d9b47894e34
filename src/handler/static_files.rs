//! Static file serving module
//!
//! Resolves request paths inside mounted directories, loads files and builds
//! cache-aware responses. Also serves the fixed index page.

use crate::error::AssetError;
use crate::handler::router::RequestContext;
use crate::http::{self, mime, Validators};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

/// A file read from disk
#[derive(Debug)]
pub struct Asset {
    pub content: Vec<u8>,
    pub content_type: &'static str,
    pub modified: Option<SystemTime>,
}

/// Serve a file below a mounted directory
///
/// `root` must already be canonical; `remainder` is the request path with the
/// mount prefix stripped, still percent-encoded.
pub async fn serve_mounted(
    ctx: &RequestContext,
    root: &Path,
    remainder: &str,
) -> Response<Full<Bytes>> {
    match load_from_mount(root, remainder).await {
        Ok(asset) => respond_with_asset(ctx, asset),
        Err(e) => error_response(ctx, &e),
    }
}

/// Serve one fixed file, e.g. the index page
pub async fn serve_file(ctx: &RequestContext, path: &Path) -> Response<Full<Bytes>> {
    match load_file(path).await {
        Ok(asset) => respond_with_asset(ctx, asset),
        Err(e) => error_response(ctx, &e),
    }
}

/// Load a file from a mounted directory, enforcing containment
pub async fn load_from_mount(root: &Path, remainder: &str) -> Result<Asset, AssetError> {
    let candidate = resolve_mount_path(root, remainder)?;

    // Missing files and broken symlinks both end up here
    let Ok(canonical) = fs::canonicalize(&candidate).await else {
        return Err(AssetError::NotFound);
    };
    if !canonical.starts_with(root) {
        tracing::warn!(
            requested = remainder,
            resolved = %canonical.display(),
            "path traversal attempt blocked"
        );
        return Err(AssetError::Forbidden);
    }

    load_file(&canonical).await
}

/// Load a single regular file
pub async fn load_file(path: &Path) -> Result<Asset, AssetError> {
    let metadata = fs::metadata(path).await.map_err(AssetError::from_io)?;
    if !metadata.is_file() {
        return Err(AssetError::NotFound);
    }
    let content = fs::read(path).await.map_err(AssetError::from_io)?;

    Ok(Asset {
        content,
        content_type: mime::content_type_for(path),
        modified: metadata.modified().ok(),
    })
}

/// Map a request remainder onto a path under `root` without touching the disk
///
/// The remainder is percent-decoded and normalized segment by segment: empty
/// and `.` segments are dropped, `..` removes the previous segment. Climbing
/// above `root`, backslashes and NUL bytes are rejected as `Forbidden`.
pub fn resolve_mount_path(root: &Path, remainder: &str) -> Result<PathBuf, AssetError> {
    let decoded = percent_decode_str(remainder)
        .decode_utf8()
        .map_err(|_| AssetError::NotFound)?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(AssetError::Forbidden);
                }
            }
            s if s.contains(['\\', '\0']) => return Err(AssetError::Forbidden),
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        // The mount root itself; directories are never listed
        return Err(AssetError::NotFound);
    }

    let mut path = root.to_path_buf();
    path.extend(segments);
    Ok(path)
}

fn respond_with_asset(ctx: &RequestContext, asset: Asset) -> Response<Full<Bytes>> {
    let validators = Validators::new(&asset.content, asset.modified);

    if validators.is_not_modified(
        ctx.if_none_match.as_deref(),
        ctx.if_modified_since.as_deref(),
    ) {
        return http::build_304_response(&validators);
    }

    http::build_file_response(
        Bytes::from(asset.content),
        asset.content_type,
        &validators,
        ctx.is_head,
    )
}

fn error_response(ctx: &RequestContext, err: &AssetError) -> Response<Full<Bytes>> {
    match err {
        AssetError::NotFound => http::build_404_response(ctx.is_head),
        AssetError::Forbidden => http::build_403_response(ctx.is_head),
        AssetError::Io(source) => {
            tracing::error!(path = %ctx.path, error = %source, "failed to read file");
            http::build_500_response(ctx.is_head)
        }
    }
}
