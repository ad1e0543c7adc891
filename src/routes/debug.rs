use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::AppState;

/// Effective security flags, keyed the way operators set them
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SecuritySettings {
    pub secure_ssl_redirect: bool,
    pub session_cookie_secure: bool,
    pub csrf_cookie_secure: bool,
    pub debug: bool,
}

/// Security settings report; only routed when debug mode is on
pub async fn settings(State(state): State<AppState>) -> Json<SecuritySettings> {
    let config = &state.config;
    Json(SecuritySettings {
        secure_ssl_redirect: config.secure_ssl_redirect,
        session_cookie_secure: config.session_cookie_secure,
        csrf_cookie_secure: config.csrf_cookie_secure,
        debug: config.debug,
    })
}
