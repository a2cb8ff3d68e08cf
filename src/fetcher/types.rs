use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use url::Url;

/// A decoded HTML page as served, without any script execution.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Address after redirects.
    pub url: Url,
    pub status: StatusCode,
    /// Name of the encoding the body was decoded from.
    pub encoding: &'static str,
    pub html: String,
    pub fetched_at: DateTime<Utc>,
}
