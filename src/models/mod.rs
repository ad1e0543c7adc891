use serde::Deserialize;

mod account;
mod movie;
mod profile;

pub use account::Account;
pub use movie::{Movie, MovieType, NewMovie, Video};
pub use profile::{AgeLimit, NewProfile, Profile};

// ============================================================================
// OMDb API Types
// ============================================================================

/// One search hit from the metadata provider, passed through untouched
pub type MovieSummary = serde_json::Map<String, serde_json::Value>;

/// Raw response from the provider's search endpoint
///
/// A well-formed body without a `Search` array (e.g. `{"Response":"False"}`)
/// yields an empty result list.
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<MovieSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_keeps_provider_fields() {
        let body = r#"{
            "Search": [
                {"Title": "Movie 43", "Year": "2013", "imdbID": "tt1333125", "Type": "movie"},
                {"Title": "Scary Movie", "Year": "2000", "imdbID": "tt0175142", "Type": "movie"}
            ],
            "totalResults": "2",
            "Response": "True"
        }"#;

        let response: OmdbSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.search.len(), 2);
        assert_eq!(response.search[0]["Title"], "Movie 43");
        assert_eq!(response.search[1]["imdbID"], "tt0175142");
    }

    #[test]
    fn test_search_response_without_results() {
        let body = r#"{"Response": "False", "Error": "Invalid API key!"}"#;

        let response: OmdbSearchResponse = serde_json::from_str(body).unwrap();
        assert!(response.search.is_empty());
    }

    #[test]
    fn test_search_response_rejects_non_object() {
        assert!(serde_json::from_str::<OmdbSearchResponse>("[1, 2, 3]").is_err());
        assert!(serde_json::from_str::<OmdbSearchResponse>("<html>").is_err());
    }
}
