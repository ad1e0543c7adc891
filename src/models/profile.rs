use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

/// Audience restriction shared by profiles and titles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AgeLimit {
    All,
    Kids,
}

impl AgeLimit {
    /// Stored and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeLimit::All => "All",
            AgeLimit::Kids => "Kids",
        }
    }
}

impl Display for AgeLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" => Ok(AgeLimit::All),
            "Kids" => Ok(AgeLimit::Kids),
            other => Err(format!("unknown age limit: {}", other)),
        }
    }
}

/// A named viewing persona owned by one or more accounts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Storage key, never exposed over HTTP
    #[serde(skip)]
    pub id: i64,
    /// Stable external identifier
    pub uuid: Uuid,
    pub name: String,
    pub age_limit: AgeLimit,
}

/// Validated input for a profile about to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub name: String,
    pub age_limit: AgeLimit,
}
