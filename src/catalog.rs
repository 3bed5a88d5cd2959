use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{CatalogError, InvalidImdbId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Externals {
    pub tvrage: Option<u32>,
    pub thetvdb: Option<u32>,
    pub imdb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Show {
    pub id: u32,
    #[serde(default)]
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub externals: Externals,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Episode {
    pub id: u32,
    pub url: String,
    pub name: String,
    pub season: u32,
    pub number: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

/// IMDb identifier of a show, e.g. `tt0944947`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImdbId(String);

impl ImdbId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ImdbId {
    type Err = InvalidImdbId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix("tt") {
            Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                Ok(Self(s.to_string()))
            }
            _ => Err(InvalidImdbId(s.to_string())),
        }
    }
}

impl fmt::Display for ImdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of show and episode metadata.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up a show by its IMDb identifier.
    async fn show_by_imdb(&self, imdb: &ImdbId) -> Result<Show, CatalogError>;

    /// Fetch every episode of `show`.
    async fn episodes(&self, show: &Show) -> Result<Vec<Episode>, CatalogError>;
}
