use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

use super::AgeLimit;

/// Whether a title is episodic or a single feature
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MovieType {
    Seasonal,
    Single,
}

impl MovieType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieType::Seasonal => "seasonal",
            MovieType::Single => "single",
        }
    }
}

impl Display for MovieType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovieType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seasonal" => Ok(MovieType::Seasonal),
            "single" => Ok(MovieType::Single),
            other => Err(format!("unknown movie type: {}", other)),
        }
    }
}

/// A playable catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    #[serde(rename = "type")]
    pub movie_type: MovieType,
    /// Cover image path relative to the media root (e.g. "covers/heat.jpg")
    pub image: String,
    pub age_limit: AgeLimit,
}

/// A single media file attached to one or more titles
///
/// Serializes to the plain stored record used by the playback page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Video {
    pub id: i64,
    pub title: String,
    /// Media file path relative to the media root (e.g. "movies/heat.mp4")
    pub file: String,
}

/// Administrator-supplied title record
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub description: Option<String>,
    pub movie_type: MovieType,
    pub image: String,
    pub age_limit: AgeLimit,
}
