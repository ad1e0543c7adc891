use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;

use crate::{
    api::{AppState, CurrentAccount},
    error::AppResult,
    middleware::RequestId,
    models::{Movie, Video},
    routes::parse_uuid,
    services::catalog::{self, MovieListPage},
};

#[derive(Debug, Serialize)]
pub struct MovieDetailPage {
    pub movie: Movie,
}

/// Playback payload; `movie` holds the flattened video records
#[derive(Debug, Serialize)]
pub struct PlayMoviePage {
    pub movie: Vec<Video>,
}

/// Catalog listing for one of the caller's profiles
pub async fn movie_list(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    CurrentAccount(account): CurrentAccount,
    Path(profile_id): Path<String>,
) -> AppResult<Json<MovieListPage>> {
    let profile_id = parse_uuid(&profile_id, "profile")?;

    let page = catalog::movie_list(
        state.store.as_ref(),
        state.metadata.as_ref(),
        &account,
        profile_id,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        profile_id = %profile_id,
        movies = page.movies.len(),
        degraded = page.error.is_some(),
        "Movie list rendered"
    );

    Ok(Json(page))
}

/// Title detail
pub async fn movie_detail(
    State(state): State<AppState>,
    CurrentAccount(_account): CurrentAccount,
    Path(movie_id): Path<String>,
) -> AppResult<Json<MovieDetailPage>> {
    let movie_id = parse_uuid(&movie_id, "movie")?;
    let movie = catalog::movie_detail(state.store.as_ref(), movie_id).await?;
    Ok(Json(MovieDetailPage { movie }))
}

/// Playable assets of a title
pub async fn play_movie(
    State(state): State<AppState>,
    CurrentAccount(_account): CurrentAccount,
    Path(movie_id): Path<String>,
) -> AppResult<Json<PlayMoviePage>> {
    let movie_id = parse_uuid(&movie_id, "movie to play")?;
    let videos = catalog::play_movie(state.store.as_ref(), movie_id).await?;
    Ok(Json(PlayMoviePage { movie: videos }))
}
