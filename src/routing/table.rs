//! Route table
//!
//! Ordered list of patterns built once from [`SiteConfig`]. Mounted prefixes are
//! checked first, then exact paths; the first match wins.

use crate::config::SiteConfig;
use crate::error::RouteTableError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// How a route matches the request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    /// Matches the prefix itself and anything below `prefix/`
    Prefix(String),
    /// Matches exactly one path
    Exact(String),
}

impl RoutePattern {
    /// Return the unmatched remainder of `path` if this pattern applies
    ///
    /// The remainder is empty for exact matches and starts with `/` (or is
    /// empty) for prefix matches.
    pub fn matches<'p>(&self, path: &'p str) -> Option<&'p str> {
        match self {
            Self::Exact(exact) => (path == exact).then_some(""),
            Self::Prefix(prefix) => {
                let rest = path.strip_prefix(prefix.as_str())?;
                (rest.is_empty() || rest.starts_with('/')).then_some(rest)
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Prefix(p) | Self::Exact(p) => p,
        }
    }
}

/// What handles a matched request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    /// Serve files below a canonicalized directory
    Mount { root: PathBuf },
    /// Serve one fixed file, read on every request
    File { path: PathBuf },
    /// Fixed JSON health response
    Health { message: String },
}

#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: RoutePattern,
    pub target: RouteTarget,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build the table: one prefix route per mount, then `/` and the health path
    pub fn from_site(site: &SiteConfig) -> Result<Self, RouteTableError> {
        let site_root = Path::new(&site.root);
        let mut routes = Vec::with_capacity(site.mounts.len() + 2);

        for mount in &site.mounts {
            let prefix = normalize_prefix(&mount.prefix)?;
            let root = canonical_mount_dir(&prefix, &site_root.join(&mount.dir))?;
            routes.push(Route {
                pattern: RoutePattern::Prefix(prefix),
                target: RouteTarget::Mount { root },
            });
        }

        routes.push(Route {
            pattern: RoutePattern::Exact("/".to_string()),
            target: RouteTarget::File {
                path: site_root.join(&site.index_file),
            },
        });

        if !site.health.path.starts_with('/') || site.health.path == "/" {
            return Err(RouteTableError::InvalidPath(site.health.path.clone()));
        }
        routes.push(Route {
            pattern: RoutePattern::Exact(site.health.path.clone()),
            target: RouteTarget::Health {
                message: site.health.message.clone(),
            },
        });

        let mut seen = HashSet::new();
        for route in &routes {
            if !seen.insert(route.pattern.as_str()) {
                return Err(RouteTableError::Duplicate(route.pattern.as_str().to_string()));
            }
        }

        Ok(Self { routes })
    }

    /// Find the route for `path` and the part of the path it did not consume
    pub fn resolve<'p>(&self, path: &'p str) -> Option<(&Route, &'p str)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|rest| (route, rest)))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

/// Require a leading slash and strip trailing ones; `/` alone would shadow every route
fn normalize_prefix(prefix: &str) -> Result<String, RouteTableError> {
    let trimmed = prefix.trim_end_matches('/');
    if !prefix.starts_with('/') || trimmed.is_empty() {
        return Err(RouteTableError::InvalidPath(prefix.to_string()));
    }
    Ok(trimmed.to_string())
}

fn canonical_mount_dir(prefix: &str, dir: &Path) -> Result<PathBuf, RouteTableError> {
    let canonical = dir
        .canonicalize()
        .map_err(|source| RouteTableError::MountUnavailable {
            prefix: prefix.to_string(),
            dir: dir.to_path_buf(),
            source,
        })?;
    if !canonical.is_dir() {
        return Err(RouteTableError::NotADirectory {
            prefix: prefix.to_string(),
            dir: dir.to_path_buf(),
        });
    }
    Ok(canonical)
}
