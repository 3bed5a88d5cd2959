use std::collections::HashMap;
use tracing::warn;

use crate::catalog::Episode;

/// Episodes of one show keyed by `(season, number)`.
#[derive(Debug, Clone, Default)]
pub struct EpisodeIndex {
    episodes: HashMap<(u32, u32), Episode>,
}

impl EpisodeIndex {
    /// Index `episodes`. When two entries share a key the later one wins.
    pub fn build(episodes: impl IntoIterator<Item = Episode>) -> Self {
        let mut index = HashMap::new();
        for episode in episodes {
            let key = (episode.season, episode.number);
            if let Some(previous) = index.insert(key, episode) {
                warn!(
                    season = key.0,
                    number = key.1,
                    replaced = %previous.name,
                    "duplicate episode in catalog, keeping the later entry"
                );
            }
        }
        Self { episodes: index }
    }

    pub fn lookup(&self, season: u32, number: u32) -> Option<&Episode> {
        self.episodes.get(&(season, number))
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }
}
