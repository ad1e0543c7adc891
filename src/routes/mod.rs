use axum::{
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::{
    api::{AppState, CurrentAccount, LOGIN_PATH},
    error::{AppError, AppResult, PROFILE_LIST_PATH},
    middleware::{csrf_protect, https_redirect, make_span_with_request_id, request_id_middleware},
};

pub mod accounts;
pub mod debug;
pub mod movies;
pub mod profiles;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        // Accounts
        .route(
            "/accounts/login",
            get(accounts::login_page).post(accounts::login),
        )
        .route(
            "/accounts/register",
            get(accounts::register_page).post(accounts::register),
        )
        .route("/accounts/logout", post(accounts::logout))
        // Profiles
        .route("/profiles", get(profiles::list))
        .route(
            "/profiles/new",
            get(profiles::new_form).post(profiles::create),
        )
        .route("/profiles/:profile_id/movies", get(movies::movie_list))
        // Catalog
        .route("/movies/:movie_id", get(movies::movie_detail))
        .route("/movies/:movie_id/play", get(movies::play_movie));

    if state.config.debug {
        router = router.route("/debug/settings", get(debug::settings));
    }

    router
        .layer(from_fn_with_state(state.config.clone(), csrf_protect))
        .layer(from_fn_with_state(state.config.clone(), https_redirect))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Landing page; signed-in visitors go straight to their profiles
async fn home(account: Option<CurrentAccount>) -> Response {
    if account.is_some() {
        return Redirect::to(PROFILE_LIST_PATH).into_response();
    }

    Json(json!({
        "page": "index",
        "login": LOGIN_PATH,
        "register": "/accounts/register",
    }))
    .into_response()
}

/// Parses a UUID path segment; anything malformed is treated as a missing record
fn parse_uuid(raw: &str, entity: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{}: {}", entity, raw)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Config, db::MemoryStore, services::providers::MockMetadataProvider};

    fn test_state(debug: bool) -> AppState {
        let config: Config = envy::from_iter(vec![
            ("OMDB_API_KEY".to_string(), "test-key".to_string()),
            ("DEBUG".to_string(), debug.to_string()),
        ])
        .unwrap();
        AppState::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(MockMetadataProvider::new()),
        )
    }

    #[tokio::test]
    async fn test_anonymous_home_is_landing_page() {
        let response = create_router(test_state(false))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_unsafe_request_without_csrf_cookie_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/accounts/logout")
            .body(Body::empty())
            .unwrap();

        let response = create_router(test_state(false)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get("set-cookie").is_none());
    }

    #[tokio::test]
    async fn test_debug_route_absent_by_default() {
        let request = || Request::builder().uri("/debug/settings").body(Body::empty()).unwrap();

        let response = create_router(test_state(false)).oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = create_router(test_state(true)).oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_parse_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string(), "movie").unwrap(), id);
        assert!(matches!(
            parse_uuid("42", "movie"),
            Err(AppError::NotFound(_))
        ));
    }
}
