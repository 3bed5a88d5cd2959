use std::path::PathBuf;
use thiserror::Error;

/// Why a single file could not be given a new name.
///
/// These never abort a batch: the planner logs them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("bad season or episode metadata: could not find season and episode in {file}")]
    BadMetadata { file: String },

    #[error("unknown episode: trying to match s{season:02}e{number:02} from {file}")]
    UnknownEpisode {
        file: String,
        season: u32,
        number: u32,
    },

    #[error("{file} would be renamed to {destination:?}, which is already claimed by another file")]
    DuplicateDestination { file: String, destination: PathBuf },

    #[error("{file} already has its canonical name")]
    AlreadyNamed { file: String },
}

/// Failure talking to the remote catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unable to build URL for {path}: {message}")]
    Url { path: String, message: String },

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("nothing found at {url}")]
    NotFound { url: String },

    #[error("non-success status code {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unable to deserialize JSON from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Fatal planner error: the show or its episodes could not be fetched.
#[derive(Debug, Error)]
pub enum CatalogFetchError {
    #[error("show lookup error for imdb ID {imdb}")]
    Show {
        imdb: String,
        #[source]
        source: CatalogError,
    },

    #[error("episode lookup error for show {name} ({id})")]
    Episodes {
        name: String,
        id: u32,
        #[source]
        source: CatalogError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid IMDb ID {0:?}: expected \"tt\" followed by digits")]
pub struct InvalidImdbId(pub String);
