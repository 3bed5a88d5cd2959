//! TVmaze catalog client.
//!
//! Uses the public API documented at https://www.tvmaze.com/api

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

use crate::{
    catalog::{Catalog, Episode, ImdbId, Show},
    error::CatalogError,
};

pub const DEFAULT_BASE_URL: &str = "https://api.tvmaze.com/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("mediarename/", env!("CARGO_PKG_VERSION"));

// Specials come back without a season or number and cannot be indexed.
#[derive(Debug, Deserialize)]
struct EpisodeRecord {
    id: u32,
    #[serde(default)]
    url: String,
    name: String,
    season: Option<u32>,
    number: Option<u32>,
    #[serde(rename = "type", default)]
    kind: String,
}

impl EpisodeRecord {
    fn into_episode(self) -> Option<Episode> {
        Some(Episode {
            season: self.season?,
            number: self.number?,
            id: self.id,
            url: self.url,
            name: self.name,
            kind: self.kind,
        })
    }
}

pub struct TvMazeClient {
    client: reqwest::Client,
    base_url: Url,
}

impl TvMazeClient {
    pub fn new(mut base_url: Url, timeout: Duration) -> reqwest::Result<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()?,
            base_url,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = self.base_url.join(path).map_err(|e| CatalogError::Url {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        debug!(url = %url, "catalog request");

        let resp = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|source| CatalogError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        debug!(url = %url, status = %status, "catalog response");
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status,
            });
        }

        resp.json().await.map_err(|source| CatalogError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Catalog for TvMazeClient {
    async fn show_by_imdb(&self, imdb: &ImdbId) -> Result<Show, CatalogError> {
        debug!(id = %imdb, "looking up show by imdb ID");
        self.get("lookup/shows", &[("imdb", imdb.as_str())]).await
    }

    async fn episodes(&self, show: &Show) -> Result<Vec<Episode>, CatalogError> {
        debug!(id = show.id, "looking up episodes by native ID");
        let records: Vec<EpisodeRecord> = self
            .get(&format!("shows/{}/episodes", show.id), &[])
            .await?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let id = record.id;
                let episode = record.into_episode();
                if episode.is_none() {
                    debug!(id, "skipping episode without season or number");
                }
                episode
            })
            .collect())
    }
}
