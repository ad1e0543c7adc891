use std::sync::Arc;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use axum::{
    async_trait,
    body::{to_bytes, Body, Bytes},
    extract::{FromRequest, FromRequestParts, Request, State},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;

/// Cookie carrying the CSRF token
pub const CSRF_COOKIE: &str = "csrftoken";

/// Form field a submitted page echoes the token in
pub const CSRF_FORM_FIELD: &str = "csrfmiddlewaretoken";

/// Header alternative to the form field
pub const CSRF_HEADER: &str = "x-csrftoken";

pub const CSRF_FAILED: &str = "CSRF verification failed. Request aborted.";

const MAX_FORM_BYTES: usize = 64 * 1024;

/// Token for the current request, embedded in rendered forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CsrfToken>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[derive(Debug, Default, Deserialize)]
struct CsrfField {
    #[serde(default)]
    csrfmiddlewaretoken: String,
}

/// Generates a random 32-byte token, URL-safe base64 encoded
pub fn generate_token() -> String {
    let mut token_bytes = [0u8; 32];
    OsRng.fill_bytes(&mut token_bytes);
    URL_SAFE_NO_PAD.encode(token_bytes)
}

/// CSRF cookie; readable by page scripts so they can echo it in a header
pub fn csrf_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE, token))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn tokens_match(submitted: &str, expected: &str) -> bool {
    submitted.len() == expected.len()
        && submitted
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Token sent with an unsafe request, from the header or the form body
async fn submitted_token(headers: &HeaderMap, body: &Bytes) -> Option<String> {
    if let Some(token) = headers.get(CSRF_HEADER).and_then(|h| h.to_str().ok()) {
        return Some(token.to_string());
    }

    let content_type = headers.get(CONTENT_TYPE)?.clone();
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body.clone()))
        .ok()?;

    let Form(field) = Form::<CsrfField>::from_request(request, &()).await.ok()?;
    Some(field.csrfmiddlewaretoken).filter(|token| !token.is_empty())
}

fn reject(reason: &str, path: &str) -> Response {
    tracing::warn!(reason, path, "Forbidden (CSRF)");
    (StatusCode::FORBIDDEN, Json(json!({ "error": CSRF_FAILED }))).into_response()
}

/// Double-submit CSRF check for every unsafe request.
///
/// The token lives in [`CSRF_COOKIE`]; unsafe requests must echo it in the
/// [`CSRF_FORM_FIELD`] form field or the [`CSRF_HEADER`] header. Requests
/// without the cookie get a fresh one on the response.
pub async fn csrf_protect(
    State(config): State<Arc<Config>>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = CookieJar::from_headers(request.headers())
        .get(CSRF_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|token| !token.is_empty());

    if !is_safe(request.method()) {
        let path = request.uri().path().to_string();
        let Some(expected) = existing.as_deref() else {
            return reject("CSRF cookie not set", &path);
        };

        let (parts, body) = request.into_parts();
        let Ok(bytes) = to_bytes(body, MAX_FORM_BYTES).await else {
            return reject("Request body unreadable", &path);
        };

        let matched = submitted_token(&parts.headers, &bytes)
            .await
            .is_some_and(|token| tokens_match(&token, expected));
        if !matched {
            return reject("CSRF token missing or incorrect", &path);
        }

        request = Request::from_parts(parts, Body::from(bytes));
    }

    let (token, minted) = match existing {
        Some(token) => (token, false),
        None => (generate_token(), true),
    };
    request.extensions_mut().insert(CsrfToken(token.clone()));

    let response = next.run(request).await;

    if minted {
        let jar = CookieJar::new().add(csrf_cookie(token, config.csrf_cookie_secure));
        (jar, response).into_response()
    } else {
        response
    }
}
