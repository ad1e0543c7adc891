//! Cookie-backed login sessions for Axum handlers.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{api::AppState, models::Account, services::auth};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "sessionid";

/// Login entry point unauthenticated requests are sent to
pub const LOGIN_PATH: &str = "/accounts/login";

/// The logged-in account, extracted from the session cookie.
///
/// Handlers that take this extractor are only reached with a live session;
/// everyone else is redirected to [`LOGIN_PATH`] with a `next` parameter.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// Rejection that sends the browser to the login page
#[derive(Debug)]
pub struct LoginRedirect {
    pub next: String,
}

impl LoginRedirect {
    pub fn location(&self) -> String {
        format!("{}?next={}", LOGIN_PATH, urlencoding::encode(&self.next))
    }
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        Redirect::to(&self.location()).into_response()
    }
}

/// Plaintext session token from the request cookies, if any
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Session cookie as issued after a successful login
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie that clears the session on logout
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = LoginRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let next = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = session_token(&jar) else {
            return Err(LoginRedirect { next });
        };

        match auth::resolve_session(state.store.as_ref(), &token).await {
            Ok(Some(account)) => Ok(CurrentAccount(account)),
            Ok(None) => Err(LoginRedirect { next }),
            Err(e) => {
                tracing::error!(error = %e, "Session lookup failed");
                Err(LoginRedirect { next })
            }
        }
    }
}
