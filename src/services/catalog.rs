use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{CatalogStore, ProfileStore},
    error::{AppError, AppResult},
    models::{Account, Movie, MovieSummary, Video},
    services::providers::MetadataProvider,
};

/// Shown in place of the catalog when the metadata provider fails
pub const MOVIES_UNAVAILABLE: &str = "Unable to fetch movies at this time.";

/// Movie list for one profile
///
/// A provider failure still produces a page: no movies, the generic error
/// message, and the requested profile id.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieListPage {
    pub movies: Vec<MovieSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub profile_id: Uuid,
}

/// Resolves the profile, checks ownership, then fetches the catalog
///
/// The provider is only called once the caller is known to own the profile.
pub async fn movie_list<S>(
    store: &S,
    provider: &dyn MetadataProvider,
    account: &Account,
    profile_id: Uuid,
) -> AppResult<MovieListPage>
where
    S: ProfileStore + ?Sized,
{
    let profile = store
        .find_profile(profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile: {}", profile_id)))?;

    if !store.owns_profile(account.id, profile.id).await? {
        return Err(AppError::Forbidden(format!(
            "profile {} is not owned by account {}",
            profile_id, account.id
        )));
    }

    let page = match provider.search_movies().await {
        Ok(movies) => MovieListPage {
            movies,
            error: None,
            profile_id,
        },
        Err(_) => MovieListPage {
            movies: Vec::new(),
            error: Some(MOVIES_UNAVAILABLE.to_string()),
            profile_id,
        },
    };

    Ok(page)
}

/// Looks up a title by its external identifier
pub async fn movie_detail<S>(store: &S, movie_id: Uuid) -> AppResult<Movie>
where
    S: CatalogStore + ?Sized,
{
    store
        .find_movie(movie_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("movie: {}", movie_id)))
}

/// Resolves the playable assets of a title, in storage order
pub async fn play_movie<S>(store: &S, movie_id: Uuid) -> AppResult<Vec<Video>>
where
    S: CatalogStore + ?Sized,
{
    let movie = store
        .find_movie(movie_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("movie to play: {}", movie_id)))?;

    let videos = store.list_movie_videos(movie.id).await?;
    tracing::debug!(movie_id = %movie.uuid, videos = videos.len(), "Playback resolved");

    Ok(videos)
}
