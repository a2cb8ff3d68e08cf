use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, ClientBuilder, header};
use tracing::{debug, instrument};
use url::Url;

use super::charset::decode_html;
use super::errors::FetchError;
use super::types::FetchedPage;

pub const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// HTTP client for documentation pages. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT_HTML));

        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed_url = Url::parse(url)?;

        let response = self.client.get(parsed_url).send().await?;

        // Reject oversized pages before reading them
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let final_url = response.url().clone();
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();
        if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let body = response.bytes().await.map_err(|e| FetchError::Io(e.to_string()))?;

        // The header can be absent or lie
        if body.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body.len() as u64));
        }

        let (html, encoding) = decode_html(&content_type, &body);
        debug!(final_url = %final_url, bytes = body.len(), encoding = encoding.name(), "fetched page");

        Ok(FetchedPage {
            url: final_url,
            status,
            encoding: encoding.name(),
            html,
            fetched_at: Utc::now(),
        })
    }
}
