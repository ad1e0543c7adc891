use axum::{
    extract::{rejection::FormRejection, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::{
        session::{removal_cookie, session_cookie, session_token},
        AppState,
    },
    error::PROFILE_LIST_PATH,
    middleware::CsrfToken,
    models::Account,
    services::{
        auth::{self, LoginForm, RegisterError, RegisterForm, INVALID_CREDENTIALS},
        forms::FormErrors,
    },
};

const LOGIN_FAILED: &str = "An error occurred while logging in.";
const REGISTER_FAILED: &str = "An error occurred while creating the account.";

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub form: LoginForm,
    pub errors: FormErrors,
    pub csrf_token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterPage {
    pub form: RegisterForm,
    pub errors: FormErrors,
    pub csrf_token: String,
}

fn login_page_with(form: LoginForm, errors: FormErrors, csrf: CsrfToken) -> Response {
    Json(LoginPage {
        form,
        errors,
        csrf_token: csrf.0,
    })
    .into_response()
}

fn register_page_with(form: RegisterForm, errors: FormErrors, csrf: CsrfToken) -> Response {
    Json(RegisterPage {
        form,
        errors,
        csrf_token: csrf.0,
    })
    .into_response()
}

/// Login form
pub async fn login_page(csrf: CsrfToken, Query(query): Query<NextQuery>) -> Response {
    let form = LoginForm {
        next: query.next,
        ..LoginForm::default()
    };
    login_page_with(form, FormErrors::default(), csrf)
}

/// Starts a session and sets the cookie, then follows `next`
async fn sign_in(
    state: &AppState,
    jar: CookieJar,
    csrf: CsrfToken,
    account: &Account,
    next: Option<&str>,
) -> Response {
    match auth::start_session(state.store.as_ref(), account, state.session_ttl()).await {
        Ok(token) => {
            let jar = jar.add(session_cookie(token, state.config.session_cookie_secure));
            let target = auth::safe_next_path(next).unwrap_or(PROFILE_LIST_PATH);
            (jar, Redirect::to(target)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, account_id = account.id, "Error starting session");
            let form = LoginForm {
                username: account.username.clone(),
                next: next.map(str::to_string),
                ..LoginForm::default()
            };
            login_page_with(form, FormErrors::non_field(LOGIN_FAILED), csrf)
        }
    }
}

/// Login submission
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    csrf: CsrfToken,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::info!(error = %rejection, "Unreadable login submission");
            let errors = FormErrors::required_fields(&["username", "password"]);
            return login_page_with(LoginForm::default(), errors, csrf);
        }
    };

    let result =
        auth::authenticate(state.store.as_ref(), form.username.trim(), &form.password).await;

    match result {
        Ok(Some(account)) => sign_in(&state, jar, csrf, &account, form.next.as_deref()).await,
        Ok(None) => login_page_with(form, FormErrors::non_field(INVALID_CREDENTIALS), csrf),
        Err(e) => {
            tracing::error!(error = %e, "Error authenticating");
            login_page_with(form, FormErrors::non_field(LOGIN_FAILED), csrf)
        }
    }
}

/// Registration form
pub async fn register_page(csrf: CsrfToken) -> Response {
    register_page_with(RegisterForm::default(), FormErrors::default(), csrf)
}

/// Registration submission; a new account is signed in immediately
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    csrf: CsrfToken,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::info!(error = %rejection, "Unreadable registration submission");
            let errors = FormErrors::required_fields(&["username", "password"]);
            return register_page_with(RegisterForm::default(), errors, csrf);
        }
    };

    let result = auth::register(state.store.as_ref(), &form).await;

    match result {
        Ok(account) => sign_in(&state, jar, csrf, &account, None).await,
        Err(RegisterError::Validation(errors)) => register_page_with(form, errors, csrf),
        Err(RegisterError::Persistence(e)) => {
            tracing::error!(error = %e, "Error creating account");
            register_page_with(form, FormErrors::non_field(REGISTER_FAILED), csrf)
        }
    }
}

/// Ends the session and clears the cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(token) = session_token(&jar) {
        if let Err(e) = auth::end_session(state.store.as_ref(), &token).await {
            tracing::error!(error = %e, "Error ending session");
        }
    }

    (jar.remove(removal_cookie()), Redirect::to("/"))
}
