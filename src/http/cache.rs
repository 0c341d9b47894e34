//! HTTP cache validators
//!
//! `ETag` and `Last-Modified` generation plus conditional request evaluation
//! (RFC 9110 section 13).

use chrono::{DateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

/// Validators attached to every file response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validators {
    pub etag: String,
    modified: Option<DateTime<Utc>>,
}

impl Validators {
    pub fn new(content: &[u8], modified: Option<SystemTime>) -> Self {
        Self {
            etag: generate_etag(content),
            modified: modified.map(DateTime::<Utc>::from),
        }
    }

    /// `Last-Modified` header value, if the filesystem reported an mtime
    pub fn last_modified(&self) -> Option<String> {
        self.modified.map(format_http_date)
    }

    /// Whether the client's cached copy is still current (respond with 304)
    ///
    /// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
    /// when it is absent.
    pub fn is_not_modified(
        &self,
        if_none_match: Option<&str>,
        if_modified_since: Option<&str>,
    ) -> bool {
        if let Some(header) = if_none_match {
            return etag_matches(header, &self.etag);
        }
        match (if_modified_since.and_then(parse_http_date), self.modified) {
            // HTTP dates have one second resolution
            (Some(since), Some(modified)) => modified.timestamp() <= since.timestamp(),
            _ => false,
        }
    }
}

/// Generate `ETag` from file content
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Weak comparison of an `If-None-Match` list against our strong `ETag`
///
/// Supports a single tag, a comma separated list, `W/` prefixed tags and `*`.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
