//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route lookup, method validation,
//! dispatch to the matched handler and access logging.

use crate::config::AppState;
use crate::handler::{health, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{Route, RouteTarget};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{HeaderMap, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Raw (still percent-encoded) request path
    pub path: String,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
}

impl RequestContext {
    fn from_parts(parts: &Parts) -> Self {
        Self {
            path: parts.uri.path().to_string(),
            is_head: parts.method == Method::HEAD,
            if_none_match: header_string(&parts.headers, &IF_NONE_MATCH),
            if_modified_since: header_string(&parts.headers, &IF_MODIFIED_SINCE),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// The request body is never read; every route answers from the path alone.
pub async fn handle_request<B: Send>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _body) = req.into_parts();

    let response = route_request(&parts, &state).await;

    let logging = &state.config.logging;
    if logging.access_log {
        log_access(&parts, &response, peer_addr, started, &logging.access_log_format);
    }
    Ok(response)
}

/// Resolve the route, then check the method, then dispatch
async fn route_request(parts: &Parts, state: &AppState) -> Response<Full<Bytes>> {
    let ctx = RequestContext::from_parts(parts);

    let Some((route, remainder)) = state.routes.resolve(&ctx.path) else {
        return http::build_route_not_found_response(ctx.is_head);
    };

    if let Some(resp) = check_http_method(&parts.method, &ctx.path) {
        return resp;
    }

    dispatch_route(&ctx, route, remainder).await
}

/// Only GET and HEAD are served
fn check_http_method(method: &Method, path: &str) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            tracing::debug!(%method, path, "method not allowed");
            Some(http::build_405_response())
        }
    }
}

async fn dispatch_route(
    ctx: &RequestContext,
    route: &Route,
    remainder: &str,
) -> Response<Full<Bytes>> {
    match &route.target {
        RouteTarget::Mount { root } => static_files::serve_mounted(ctx, root, remainder).await,
        RouteTarget::File { path } => static_files::serve_file(ctx, path).await,
        RouteTarget::Health { message } => health::serve(message, ctx.is_head),
    }
}

fn log_access(
    parts: &Parts,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    format: &str,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header_string(&parts.headers, &REFERER);
    entry.user_agent = header_string(&parts.headers, &USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, format);
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SiteConfig};
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use std::fs;

    const INDEX: &[u8] = b"<!DOCTYPE html><title>Portal</title>";

    fn site(with_index: bool) -> (tempfile::TempDir, Arc<AppState>) {
        let tmp = tempfile::tempdir().unwrap();
        let web = tmp.path().join("web");
        fs::create_dir_all(web.join("src/components")).unwrap();
        fs::create_dir_all(web.join("static")).unwrap();
        fs::write(web.join("src/main.js"), b"console.log('hi');").unwrap();
        fs::write(web.join("src/components/App.tsx"), b"export default App;").unwrap();
        fs::write(web.join("static/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
        fs::write(tmp.path().join("secret.txt"), b"outside").unwrap();
        if with_index {
            fs::write(web.join("index.html"), INDEX).unwrap();
        }

        let mut config = Config::default();
        config.logging.access_log = false;
        config.site = SiteConfig {
            root: web.to_str().unwrap().to_string(),
            ..SiteConfig::default()
        };
        let state = Arc::new(AppState::new(config).unwrap());
        (tmp, state)
    }

    async fn send<B: Send>(state: &Arc<AppState>, req: Request<B>) -> (StatusCode, HeaderMap, Bytes) {
        let peer = "127.0.0.1:40000".parse().unwrap();
        let response = handle_request(req, Arc::clone(state), peer).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body)
    }

    fn get(uri: &str) -> Request<()> {
        Request::get(uri).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (_tmp, state) = site(true);
        let (status, headers, body) = send(&state, get("/api/hello")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "application/json");
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "Backend connected successfully!" })
        );
    }

    #[tokio::test]
    async fn test_health_ignores_query_and_body() {
        let (_tmp, state) = site(true);
        let (_, _, plain) = send(&state, get("/api/hello")).await;

        let req = Request::get("/api/hello?verbose=1&x=%20")
            .body("ignored payload".to_string())
            .unwrap();
        let (status, _, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, plain);
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let (_tmp, state) = site(true);
        let req = Request::head("/api/hello").body(()).unwrap();
        let (status, headers, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_ne!(headers["content-length"], "0");
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let (_tmp, state) = site(true);
        let (status, headers, body) = send(&state, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/html; charset=utf-8");
        assert!(headers.contains_key("etag"));
        assert!(headers.contains_key("last-modified"));
        assert_eq!(body, INDEX);
    }

    #[tokio::test]
    async fn test_root_without_index() {
        let (_tmp, state) = site(false);
        let (status, _, _) = send(&state, get("/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_mounted_files() {
        let (_tmp, state) = site(true);

        let (status, headers, body) = send(&state, get("/src/main.js")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/javascript; charset=utf-8");
        assert_eq!(body, "console.log('hi');");

        let (status, headers, body) = send(&state, get("/src/components/App.tsx")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "application/octet-stream");
        assert_eq!(body, "export default App;");

        let (status, headers, _) = send(&state, get("/static/logo.png")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "image/png");
    }

    #[tokio::test]
    async fn test_missing_static_asset() {
        let (_tmp, state) = site(true);
        let (status, _, body) = send(&state, get("/static/missing.png")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not Found");
    }

    #[tokio::test]
    async fn test_mount_root_is_not_listed() {
        let (_tmp, state) = site(true);
        for uri in ["/static", "/static/", "/src/components/"] {
            let (status, _, _) = send(&state, get(uri)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_traversal_never_leaks() {
        let (_tmp, state) = site(true);
        for uri in [
            "/static/../secret.txt",
            "/static/../../secret.txt",
            "/src/%2e%2e/secret.txt",
            "/src/components/..%2f..%2f..%2fsecret.txt",
        ] {
            let (status, _, body) = send(&state, get(uri)).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
            assert_ne!(body, "outside");
        }
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (_tmp, state) = site(true);
        let (status, _, body) = send(&state, get("/index.html")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"detail":"Not Found"}"#);
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let (_tmp, state) = site(true);
        for uri in ["/", "/api/hello", "/static/logo.png"] {
            let req = Request::post(uri).body(()).unwrap();
            let (status, headers, _) = send(&state, req).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{uri}");
            assert_eq!(headers["allow"], "GET, HEAD");
        }

        // Unrouted paths stay 404 whatever the method
        let req = Request::delete("/nowhere").body(()).unwrap();
        let (status, _, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_repeated_requests_are_identical() {
        let (_tmp, state) = site(true);
        for uri in ["/", "/api/hello", "/src/main.js"] {
            let first = send(&state, get(uri)).await;
            let second = send(&state, get(uri)).await;
            assert_eq!(first.0, second.0);
            assert_eq!(first.2, second.2);
            assert_eq!(first.1.get("etag"), second.1.get("etag"));
        }
    }

    #[tokio::test]
    async fn test_revalidation_with_etag() {
        let (_tmp, state) = site(true);
        let (_, headers, _) = send(&state, get("/")).await;
        let req = Request::get("/")
            .header("if-none-match", headers["etag"].clone())
            .body(())
            .unwrap();
        let (status, _, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::NOT_MODIFIED);
        assert!(body.is_empty());
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
