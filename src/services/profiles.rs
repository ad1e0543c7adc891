use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    db::ProfileStore,
    error::{AppError, AppResult},
    models::{Account, AgeLimit, NewProfile, Profile},
    services::forms::{self, FormErrors},
};

/// Generic message shown when the profile could not be stored
pub const PROFILE_CREATE_FAILED: &str = "An error occurred while creating the profile.";

const MAX_PROFILE_NAME_CHARS: usize = 200;

/// Profile creation form as posted by the browser
///
/// Fields default to empty so a missing field fails validation instead of
/// being rejected before the form can be re-rendered.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, PartialEq)]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(custom(function = "validate_profile_name"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_age_limit"))]
    pub age_limit: String,
}

fn validate_profile_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(forms::required());
    }
    if value.chars().count() > MAX_PROFILE_NAME_CHARS {
        return Err(ValidationError::new("length").with_message(
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                MAX_PROFILE_NAME_CHARS,
                value.chars().count()
            )
            .into(),
        ));
    }
    Ok(())
}

fn validate_age_limit(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(forms::required());
    }
    value.parse::<AgeLimit>().map(|_| ()).map_err(|_| {
        ValidationError::new("choice").with_message(
            format!("Select a valid choice. {} is not one of the available choices.", value).into(),
        )
    })
}

impl ProfileForm {
    fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            age_limit: self.age_limit.trim().to_string(),
        }
    }

    /// Validates the form into the record to be created
    pub fn clean(&self) -> Result<NewProfile, FormErrors> {
        let form = self.normalized();
        form.validate().map_err(|e| FormErrors::from(&e))?;

        let age_limit = form
            .age_limit
            .parse::<AgeLimit>()
            .map_err(|e| FormErrors::field("age_limit", &e))?;

        Ok(NewProfile {
            name: form.name,
            age_limit,
        })
    }
}

/// Why a profile was not created
#[derive(Debug, thiserror::Error)]
pub enum ProfileCreateError {
    #[error("invalid profile form")]
    Validation(FormErrors),

    #[error(transparent)]
    Persistence(#[from] AppError),
}

/// Profiles owned by the account, in storage order
pub async fn list_profiles<S>(store: &S, account: &Account) -> AppResult<Vec<Profile>>
where
    S: ProfileStore + ?Sized,
{
    store.list_profiles(account.id).await
}

/// Validates the form, creates the profile and links it to the account
///
/// Nothing is stored unless validation passes; creation and linking are a
/// single store operation.
pub async fn create_profile<S>(
    store: &S,
    account: &Account,
    form: &ProfileForm,
) -> Result<Profile, ProfileCreateError>
where
    S: ProfileStore + ?Sized,
{
    let new_profile = form.clean().map_err(ProfileCreateError::Validation)?;
    let profile = store.create_profile(account.id, &new_profile).await?;

    tracing::info!(
        account_id = account.id,
        profile_id = %profile.uuid,
        age_limit = %profile.age_limit,
        "Profile created"
    );

    Ok(profile)
}
