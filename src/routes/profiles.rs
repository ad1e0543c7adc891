use axum::{
    extract::{rejection::FormRejection, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;

use crate::{
    api::{AppState, CurrentAccount},
    error::{AppResult, PROFILE_LIST_PATH},
    middleware::CsrfToken,
    models::Profile,
    services::{
        forms::FormErrors,
        profiles::{self, ProfileCreateError, ProfileForm, PROFILE_CREATE_FAILED},
    },
};

#[derive(Debug, Serialize)]
pub struct ProfileListPage {
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Serialize)]
pub struct ProfileFormPage {
    pub form: ProfileForm,
    pub errors: FormErrors,
    pub csrf_token: String,
}

fn form_page(form: ProfileForm, errors: FormErrors, csrf: CsrfToken) -> Response {
    Json(ProfileFormPage {
        form,
        errors,
        csrf_token: csrf.0,
    })
    .into_response()
}

/// "Who's watching?" listing of the caller's profiles
pub async fn list(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
) -> AppResult<Json<ProfileListPage>> {
    let profiles = profiles::list_profiles(state.store.as_ref(), &account).await?;
    Ok(Json(ProfileListPage { profiles }))
}

/// Empty profile creation form
pub async fn new_form(CurrentAccount(_account): CurrentAccount, csrf: CsrfToken) -> Response {
    form_page(ProfileForm::default(), FormErrors::default(), csrf)
}

/// Profile creation submission
///
/// Invalid or unreadable input and storage failures all re-render the form;
/// storage detail is only logged.
pub async fn create(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
    csrf: CsrfToken,
    form: Result<Form<ProfileForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::info!(error = %rejection, account_id = account.id, "Unreadable profile form");
            let form = ProfileForm::default();
            let errors = form.clean().err().unwrap_or_default();
            return form_page(form, errors, csrf);
        }
    };

    let result = profiles::create_profile(state.store.as_ref(), &account, &form).await;

    match result {
        Ok(_) => Redirect::to(PROFILE_LIST_PATH).into_response(),
        Err(ProfileCreateError::Validation(errors)) => form_page(form, errors, csrf),
        Err(ProfileCreateError::Persistence(e)) => {
            tracing::error!(error = %e, account_id = account.id, "Error creating profile");
            form_page(form, FormErrors::non_field(PROFILE_CREATE_FAILED), csrf)
        }
    }
}
