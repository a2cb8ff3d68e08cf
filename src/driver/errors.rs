use std::time::Duration;

use thiserror::Error;

use super::session::SessionError;
use super::state::Stage;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: SessionError,
    },

    #[error("navigation to {url} timed out after {after:?}")]
    NavigationTimeout { url: String, after: Duration },

    #[error("browser session closed while {stage}")]
    SessionClosed { stage: Stage },

    #[error(transparent)]
    InsufficientContent(#[from] InsufficientContentError),
}

/// Every extraction stage came back short. Both lengths are kept so near
/// misses can be told apart from empty pages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "insufficient content at {url}: primary extraction gave {primary_length} chars, retry gave {retry_length}"
)]
pub struct InsufficientContentError {
    pub url: String,
    pub primary_length: usize,
    pub retry_length: usize,
}
