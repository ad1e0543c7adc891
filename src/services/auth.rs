//! Password hashing, session tokens, and the login/registration flows.
//!
//! Passwords are stored as Argon2id PHC strings. Session tokens are opaque
//! random strings handed to the browser; only their SHA-256 digest is stored
//! so a database leak does not expose live sessions.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::AccountStore,
    error::{AppError, AppResult},
    models::Account,
    services::forms::FormErrors,
};

/// Shown for any failed login so usernames cannot be probed
pub const INVALID_CREDENTIALS: &str = "Please enter a correct username and password.";

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted hash.
///
/// Returns `Ok(false)` on mismatch; malformed hashes are errors.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Generate a session token, returning `(plaintext, sha256_hex_hash)`.
pub fn generate_session_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let hash = hash_session_token(&plaintext);
    (plaintext, hash)
}

/// SHA-256 hex digest of a session token.
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Only same-site absolute paths are honoured as post-login targets.
pub fn safe_next_path(next: Option<&str>) -> Option<&str> {
    next.filter(|path| path.starts_with('/') && !path.starts_with("//") && !path.contains('\\'))
}

/// Login form as posted by the browser
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Registration form as posted by the browser
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Username must be between 1 and 150 characters."))]
    pub username: String,
    #[serde(default, skip_serializing)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters long."))]
    pub password: String,
}

/// Why a registration was not completed
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("invalid registration form")]
    Validation(FormErrors),

    #[error(transparent)]
    Persistence(#[from] AppError),
}

/// Creates a session for the account and returns the plaintext token
pub async fn start_session<S>(store: &S, account: &Account, ttl: Duration) -> AppResult<String>
where
    S: AccountStore + ?Sized,
{
    let (token, token_hash) = generate_session_token();
    store
        .create_session(&token_hash, account.id, Utc::now() + ttl)
        .await?;

    tracing::info!(account_id = account.id, "Session started");
    Ok(token)
}

/// Resolves the account behind a session token, if the session is live
pub async fn resolve_session<S>(store: &S, token: &str) -> AppResult<Option<Account>>
where
    S: AccountStore + ?Sized,
{
    store
        .find_session_account(&hash_session_token(token), Utc::now())
        .await
}

pub async fn end_session<S>(store: &S, token: &str) -> AppResult<()>
where
    S: AccountStore + ?Sized,
{
    store.delete_session(&hash_session_token(token)).await
}

/// Checks credentials; `Ok(None)` means they did not match
pub async fn authenticate<S>(store: &S, username: &str, password: &str) -> AppResult<Option<Account>>
where
    S: AccountStore + ?Sized,
{
    let Some(account) = store.find_account_by_username(username).await? else {
        tracing::info!(username = %username, "Login attempt for unknown username");
        return Ok(None);
    };

    let matches = verify_password(password, &account.password_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash unreadable: {}", e)))?;

    if matches {
        Ok(Some(account))
    } else {
        tracing::info!(account_id = account.id, "Login attempt with wrong password");
        Ok(None)
    }
}

/// Validates the form and creates the account
pub async fn register<S>(store: &S, form: &RegisterForm) -> Result<Account, RegisterError>
where
    S: AccountStore + ?Sized,
{
    let form = RegisterForm {
        username: form.username.trim().to_string(),
        password: form.password.clone(),
    };
    form.validate()
        .map_err(|e| RegisterError::Validation(FormErrors::from(&e)))?;

    let password_hash = hash_password(&form.password)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

    match store.create_account(&form.username, &password_hash).await {
        Ok(account) => {
            tracing::info!(account_id = account.id, "Account registered");
            Ok(account)
        }
        Err(AppError::InvalidInput(_)) => Err(RegisterError::Validation(FormErrors::field(
            "username",
            "A user with that username already exists.",
        ))),
        Err(e) => Err(RegisterError::Persistence(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct-horse-battery-staple").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery-staple", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_session_token_hash_is_stable() {
        let (plaintext, hash) = generate_session_token();
        assert_eq!(hash, hash_session_token(&plaintext));
        assert_eq!(hash.len(), 64);
        assert_ne!(plaintext, hash);
    }

    #[test]
    fn test_safe_next_path() {
        assert_eq!(safe_next_path(Some("/profiles")), Some("/profiles"));
        assert_eq!(safe_next_path(Some("//evil.example")), None);
        assert_eq!(safe_next_path(Some("https://evil.example")), None);
        assert_eq!(safe_next_path(Some("/\\evil.example")), None);
        assert_eq!(safe_next_path(None), None);
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let store = MemoryStore::new();
        let form = RegisterForm {
            username: "  alice ".to_string(),
            password: "long-enough-pw".to_string(),
        };

        let account = register(&store, &form).await.unwrap();
        assert_eq!(account.username, "alice");

        let found = authenticate(&store, "alice", "long-enough-pw").await.unwrap();
        assert_eq!(found.map(|a| a.id), Some(account.id));
        assert!(authenticate(&store, "alice", "nope").await.unwrap().is_none());
        assert!(authenticate(&store, "bob", "long-enough-pw").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_short_password_and_duplicates() {
        let store = MemoryStore::new();
        let short = RegisterForm {
            username: "alice".to_string(),
            password: "short".to_string(),
        };
        match register(&store, &short).await {
            Err(RegisterError::Validation(errors)) => assert!(errors.has_field("password")),
            other => panic!("expected validation failure, got {:?}", other),
        }

        let form = RegisterForm {
            username: "alice".to_string(),
            password: "long-enough-pw".to_string(),
        };
        register(&store, &form).await.unwrap();
        match register(&store, &form).await {
            Err(RegisterError::Validation(errors)) => assert!(errors.has_field("username")),
            other => panic!("expected duplicate username failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = MemoryStore::new();
        let account = store.create_account("alice", "unused").await.unwrap();

        let token = start_session(&store, &account, Duration::hours(1)).await.unwrap();
        assert_eq!(
            resolve_session(&store, &token).await.unwrap().map(|a| a.id),
            Some(account.id)
        );

        end_session(&store, &token).await.unwrap();
        assert!(resolve_session(&store, &token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_ignored() {
        let store = MemoryStore::new();
        let account = store.create_account("alice", "unused").await.unwrap();

        let token = start_session(&store, &account, Duration::seconds(-1)).await.unwrap();
        assert!(resolve_session(&store, &token).await.unwrap().is_none());
    }
}
