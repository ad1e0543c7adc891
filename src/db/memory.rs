use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::{AccountStore, CatalogStore, ProfileStore},
    error::{AppError, AppResult},
    models::{Account, Movie, NewMovie, NewProfile, Profile, Video},
};

/// In-process store backed by plain collections
///
/// Mirrors the relational schema (including the join collections) so the
/// HTTP layer behaves identically against it and against Postgres.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    next_id: i64,
    accounts: Vec<Account>,
    sessions: HashMap<String, (i64, DateTime<Utc>)>,
    profiles: Vec<Profile>,
    account_profiles: Vec<(i64, i64)>,
    movies: Vec<Movie>,
    videos: Vec<Video>,
    movie_videos: Vec<(i64, i64)>,
}

impl MemoryStoreInner {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog title, as an administrator would
    pub async fn insert_movie(&self, movie: NewMovie) -> Movie {
        let mut inner = self.inner.write().await;
        let movie = Movie {
            id: inner.allocate_id(),
            uuid: Uuid::new_v4(),
            title: movie.title,
            description: movie.description,
            created: Utc::now(),
            movie_type: movie.movie_type,
            image: movie.image,
            age_limit: movie.age_limit,
        };
        inner.movies.push(movie.clone());
        movie
    }

    /// Adds a media file; titles are unique
    pub async fn insert_video(&self, title: &str, file: &str) -> AppResult<Video> {
        let mut inner = self.inner.write().await;
        if inner.videos.iter().any(|v| v.title == title) {
            return Err(AppError::InvalidInput(format!(
                "video title already exists: {}",
                title
            )));
        }

        let video = Video {
            id: inner.allocate_id(),
            title: title.to_string(),
            file: file.to_string(),
        };
        inner.videos.push(video.clone());
        Ok(video)
    }

    /// Links a video to a movie; linking twice is a no-op
    pub async fn attach_video(&self, movie_id: i64, video_id: i64) {
        let mut inner = self.inner.write().await;
        if !inner.movie_videos.contains(&(movie_id, video_id)) {
            inner.movie_videos.push((movie_id, video_id));
        }
    }

    /// Number of stored sessions, expired ones included until pruned
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    /// Total number of profiles across all accounts
    pub async fn profile_count(&self) -> usize {
        self.inner.read().await.profiles.len()
    }
}

#[async_trait::async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, username: &str, password_hash: &str) -> AppResult<Account> {
        let mut inner = self.inner.write().await;
        if inner.accounts.iter().any(|a| a.username == username) {
            return Err(AppError::InvalidInput(format!(
                "username already taken: {}",
                username
            )));
        }

        let account = Account {
            id: inner.allocate_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        inner.accounts.push(account.clone());
        Ok(account)
    }

    async fn find_account_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn create_session(
        &self,
        token_hash: &str,
        account_id: i64,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        inner.sessions.retain(|_, (_, expires)| *expires > now);
        inner
            .sessions
            .insert(token_hash.to_string(), (account_id, expires_at));
        Ok(())
    }

    async fn find_session_account(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Account>> {
        let mut inner = self.inner.write().await;
        let Some(&(account_id, expires_at)) = inner.sessions.get(token_hash) else {
            return Ok(None);
        };

        if expires_at <= now {
            inner.sessions.remove(token_hash);
            return Ok(None);
        }

        Ok(inner.accounts.iter().find(|a| a.id == account_id).cloned())
    }

    async fn delete_session(&self, token_hash: &str) -> AppResult<()> {
        self.inner.write().await.sessions.remove(token_hash);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryStore {
    async fn list_profiles(&self, account_id: i64) -> AppResult<Vec<Profile>> {
        let inner = self.inner.read().await;
        let profiles = inner
            .profiles
            .iter()
            .filter(|p| inner.account_profiles.contains(&(account_id, p.id)))
            .cloned()
            .collect();
        Ok(profiles)
    }

    async fn create_profile(&self, account_id: i64, profile: &NewProfile) -> AppResult<Profile> {
        let mut inner = self.inner.write().await;
        if !inner.accounts.iter().any(|a| a.id == account_id) {
            return Err(AppError::Internal(format!(
                "account {} does not exist",
                account_id
            )));
        }

        let profile = Profile {
            id: inner.allocate_id(),
            uuid: Uuid::new_v4(),
            name: profile.name.clone(),
            age_limit: profile.age_limit,
        };
        inner.profiles.push(profile.clone());
        inner.account_profiles.push((account_id, profile.id));
        Ok(profile)
    }

    async fn find_profile(&self, uuid: Uuid) -> AppResult<Option<Profile>> {
        let inner = self.inner.read().await;
        Ok(inner.profiles.iter().find(|p| p.uuid == uuid).cloned())
    }

    async fn owns_profile(&self, account_id: i64, profile_id: i64) -> AppResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.account_profiles.contains(&(account_id, profile_id)))
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryStore {
    async fn find_movie(&self, uuid: Uuid) -> AppResult<Option<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner.movies.iter().find(|m| m.uuid == uuid).cloned())
    }

    async fn list_movie_videos(&self, movie_id: i64) -> AppResult<Vec<Video>> {
        let inner = self.inner.read().await;
        let videos = inner
            .videos
            .iter()
            .filter(|v| inner.movie_videos.contains(&(movie_id, v.id)))
            .cloned()
            .collect();
        Ok(videos)
    }
}
