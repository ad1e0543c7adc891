use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::HOST, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::config::Config;

/// Header set by the TLS-terminating proxy
pub const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";

fn is_secure(request: &Request) -> bool {
    let forwarded = request
        .headers()
        .get(FORWARDED_PROTO_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|proto| proto.eq_ignore_ascii_case("https"));

    forwarded.unwrap_or_else(|| request.uri().scheme_str() == Some("https"))
}

/// Redirects plain-HTTP requests to HTTPS when `secure_ssl_redirect` is on.
pub async fn https_redirect(
    State(config): State<Arc<Config>>,
    request: Request,
    next: Next,
) -> Response {
    if !config.secure_ssl_redirect || is_secure(&request) {
        return next.run(request).await;
    }

    let Some(host) = request.headers().get(HOST).and_then(|h| h.to_str().ok()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Redirect::permanent(&format!("https://{}{}", host, path)).into_response()
}
