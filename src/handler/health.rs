//! Health check endpoint

use crate::http;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse<'a> {
    pub message: &'a str,
}

/// Fixed `{"message": ...}` document, independent of the request
pub fn serve(message: &str, is_head: bool) -> Response<Full<Bytes>> {
    http::build_json_response(StatusCode::OK, &HealthResponse { message }, is_head)
}
