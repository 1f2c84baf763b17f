use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can stop a crawl. Nothing is retried; each variant is
/// propagated as-is up to the caller of [`crate::crawler::run`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid redirect location {location:?}: {source}")]
    Redirect {
        location: String,
        source: url::ParseError,
    },

    #[error("stopped after {0} redirects")]
    TooManyRedirects(usize),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("fail to read api key from {}: {source}", .path.display())]
    ApiKey {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Failures reported by the search API itself, or bodies it sent that we
/// could not read.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Zero results, with the server's `Message` element.
    #[error("api error: {0}")]
    Message(String),

    /// Zero results and no message at all.
    #[error("api returned no results")]
    NoResults,

    #[error("malformed api response: {0}")]
    Malformed(#[from] quick_xml::Error),

    #[error("api response ended before its root element was closed")]
    Incomplete,

    #[error("invalid {element} value {value:?}")]
    InvalidValue { element: String, value: String },
}
