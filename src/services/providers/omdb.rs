//! OMDb search provider
//!
//! Issues a single `GET {api_url}/?s={term}&apikey={key}` per call. The HTTP
//! client carries the configured timeout, so a slow provider surfaces as
//! [`MetadataError::Timeout`] rather than holding the request open.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    config::Config,
    models::{MovieSummary, OmdbSearchResponse},
    services::providers::{MetadataError, MetadataProvider},
};

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    search_term: String,
    timeout: Duration,
}

impl OmdbProvider {
    pub fn new(
        api_key: String,
        api_url: String,
        search_term: String,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            search_term,
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        Self::new(
            config.omdb_api_key.clone(),
            config.omdb_api_url.clone(),
            config.omdb_search_term.clone(),
            config.metadata_timeout(),
        )
    }

    fn search_url(&self) -> String {
        format!("{}/", self.api_url.trim_end_matches('/'))
    }

    fn classify(&self, error: reqwest::Error) -> MetadataError {
        if error.is_timeout() {
            MetadataError::Timeout(self.timeout)
        } else {
            MetadataError::Transport(error.to_string())
        }
    }

    async fn fetch(&self) -> Result<Vec<MovieSummary>, MetadataError> {
        let response = self
            .http_client
            .get(self.search_url())
            .query(&[
                ("s", self.search_term.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let parsed: OmdbSearchResponse =
            serde_json::from_slice(&body).map_err(|e| MetadataError::Parse(e.to_string()))?;

        Ok(parsed.search)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for OmdbProvider {
    async fn search_movies(&self) -> Result<Vec<MovieSummary>, MetadataError> {
        match self.fetch().await {
            Ok(movies) => {
                tracing::info!(
                    results = movies.len(),
                    provider = self.name(),
                    "Movie search completed"
                );
                Ok(movies)
            }
            Err(e) => {
                tracing::error!(error = %e, provider = self.name(), "OMDb API error");
                Err(e)
            }
        }
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::time::Instant;

    /// Serves `router` on an ephemeral port and returns its base URL
    async fn spawn_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(api_url: String, timeout: Duration) -> OmdbProvider {
        OmdbProvider::new(
            "test_key".to_string(),
            api_url,
            "movie".to_string(),
            timeout,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_success_sends_key_and_term() {
        let router = Router::new().route(
            "/",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("apikey").map(String::as_str) != Some("test_key")
                    || params.get("s").map(String::as_str) != Some("movie")
                {
                    return (StatusCode::UNAUTHORIZED, Json(json!({"Response": "False"})));
                }
                (
                    StatusCode::OK,
                    Json(json!({
                        "Search": [
                            {"Title": "Movie 43", "imdbID": "tt1333125"},
                            {"Title": "Scary Movie", "imdbID": "tt0175142"}
                        ],
                        "Response": "True"
                    })),
                )
            }),
        );
        let url = spawn_provider(router).await;

        let movies = provider(url, Duration::from_secs(5))
            .search_movies()
            .await
            .unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0]["Title"], "Movie 43");
        assert_eq!(movies[1]["imdbID"], "tt0175142");
    }

    #[tokio::test]
    async fn test_missing_search_array_is_empty_result() {
        let router = Router::new().route(
            "/",
            get(|| async { Json(json!({"Response": "False", "Error": "Movie not found!"})) }),
        );
        let url = spawn_provider(router).await;

        let movies = provider(url, Duration::from_secs(5))
            .search_movies()
            .await
            .unwrap();
        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let router = Router::new().route(
            "/",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
        );
        let url = spawn_provider(router).await;

        let result = provider(url, Duration::from_secs(5)).search_movies().await;
        assert!(matches!(result, Err(MetadataError::Status(500))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_failure() {
        let router = Router::new().route("/", get(|| async { "<html>not json</html>" }));
        let url = spawn_provider(router).await;

        let result = provider(url, Duration::from_secs(5)).search_movies().await;
        assert!(matches!(result, Err(MetadataError::Parse(_))));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let router = Router::new().route(
            "/",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"Search": []}))
            }),
        );
        let url = spawn_provider(router).await;

        let started = Instant::now();
        let result = provider(url, Duration::from_millis(200))
            .search_movies()
            .await;

        assert!(matches!(result, Err(MetadataError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_failure() {
        // Bind then drop to obtain a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = provider(format!("http://{}", addr), Duration::from_secs(2))
            .search_movies()
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_search_url_normalizes_trailing_slash() {
        let p = provider("http://www.omdbapi.com/".to_string(), Duration::from_secs(1));
        assert_eq!(p.search_url(), "http://www.omdbapi.com/");

        let p = provider("http://www.omdbapi.com".to_string(), Duration::from_secs(1));
        assert_eq!(p.search_url(), "http://www.omdbapi.com/");
    }

    #[test]
    fn test_from_config_uses_configured_timeout() {
        let config: Config = envy::from_iter(vec![
            ("OMDB_API_KEY".to_string(), "k".to_string()),
            ("METADATA_TIMEOUT_SECS".to_string(), "3".to_string()),
        ])
        .unwrap();

        let p = OmdbProvider::from_config(&config).unwrap();
        assert_eq!(p.timeout, Duration::from_secs(3));
        assert_eq!(p.api_key, "k");
    }
}
