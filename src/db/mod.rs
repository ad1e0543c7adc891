use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Account, Movie, NewProfile, Profile, Video},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, run_migrations, PgStore};

/// Accounts and their login sessions
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts an account; a taken username is `AppError::InvalidInput`
    async fn create_account(&self, username: &str, password_hash: &str) -> AppResult<Account>;

    async fn find_account_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    /// Stores a session keyed by the SHA-256 digest of its token
    async fn create_session(
        &self,
        token_hash: &str,
        account_id: i64,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Resolves a session that has not expired at `now`
    async fn find_session_account(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Account>>;

    async fn delete_session(&self, token_hash: &str) -> AppResult<()>;
}

/// Profiles and the account/profile join collection
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Profiles linked to the account, in storage order
    async fn list_profiles(&self, account_id: i64) -> AppResult<Vec<Profile>>;

    /// Creates the profile and links it to the account as one unit
    async fn create_profile(&self, account_id: i64, profile: &NewProfile) -> AppResult<Profile>;

    async fn find_profile(&self, uuid: Uuid) -> AppResult<Option<Profile>>;

    /// Membership query over the join collection
    async fn owns_profile(&self, account_id: i64, profile_id: i64) -> AppResult<bool>;
}

/// Read-only view of the administrator-managed catalog
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_movie(&self, uuid: Uuid) -> AppResult<Option<Movie>>;

    /// Videos attached to the movie, in storage order
    async fn list_movie_videos(&self, movie_id: i64) -> AppResult<Vec<Video>>;
}

/// Everything the HTTP layer needs from persistence
pub trait Store: AccountStore + ProfileStore + CatalogStore {}

impl<T> Store for T where T: AccountStore + ProfileStore + CatalogStore {}
