//! HTTP response building module
//!
//! Builders for every status the server emits. A builder never panics: if
//! `http` rejects a header the failure is logged and a bare response is returned.

use super::cache::Validators;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED,
};
use hyper::{Response, StatusCode};
use serde::Serialize;

const JSON: &str = "application/json";
const PLAIN: &str = "text/plain; charset=utf-8";

/// Methods every route accepts
pub const ALLOWED_METHODS: &str = "GET, HEAD";

/// Build 200 response for a file with its cache validators
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    validators: &Validators,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ETAG, validators.etag.as_str());
    if let Some(last_modified) = validators.last_modified() {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 304 Not Modified response
pub fn build_304_response(validators: &Validators) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, validators.etag.as_str());
    if let Some(last_modified) = validators.last_modified() {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("304", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build a compact JSON response
pub fn build_json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build_bytes_response(status, JSON, Bytes::from(json), is_head),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response body");
            build_500_response(is_head)
        }
    }
}

/// Build 404 for a missing file under a matched route
pub fn build_404_response(is_head: bool) -> Response<Full<Bytes>> {
    build_bytes_response(
        StatusCode::NOT_FOUND,
        PLAIN,
        Bytes::from_static(b"Not Found"),
        is_head,
    )
}

/// Build 404 for a path no route matches
pub fn build_route_not_found_response(is_head: bool) -> Response<Full<Bytes>> {
    build_bytes_response(
        StatusCode::NOT_FOUND,
        JSON,
        Bytes::from_static(br#"{"detail":"Not Found"}"#),
        is_head,
    )
}

/// Build 403 for a path that escapes its mounted directory
pub fn build_403_response(is_head: bool) -> Response<Full<Bytes>> {
    build_bytes_response(
        StatusCode::FORBIDDEN,
        PLAIN,
        Bytes::from_static(b"Forbidden"),
        is_head,
    )
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut response = build_bytes_response(
        StatusCode::METHOD_NOT_ALLOWED,
        JSON,
        Bytes::from_static(br#"{"detail":"Method Not Allowed"}"#),
        false,
    );
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build 500 Internal Server Error response
pub fn build_500_response(is_head: bool) -> Response<Full<Bytes>> {
    build_bytes_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        PLAIN,
        Bytes::from_static(b"Internal Server Error"),
        is_head,
    )
}

fn build_bytes_response(
    status: StatusCode,
    content_type: &str,
    data: Bytes,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut fallback = Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = status;
            fallback
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    tracing::error!(%error, "failed to build {status} response");
}
