//! Finding documentation pages for a search term.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::driver::{ElementInfo, PageSession, SessionError, SessionFactory};

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("search page failed: {0}")]
    Session(#[from] SessionError),
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError>;
}

/// Scrapes result anchors from a documentation site's own search page.
pub struct PageSearch<F> {
    factory: Arc<F>,
    template: String,
    selector: String,
    wait: Duration,
}

impl<F: SessionFactory> PageSearch<F> {
    pub fn new(factory: Arc<F>, template: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            factory,
            template: template.into(),
            selector: selector.into(),
            wait: Duration::from_secs(5),
        }
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }
}

#[async_trait]
impl<F: SessionFactory> SearchProvider for PageSearch<F> {
    #[instrument(skip(self), fields(template = %self.template))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        let url = search_url(&self.template, query)?;
        let session = self.factory.open().await?;
        let anchors = self.read_anchors(&session, &url).await;
        if let Err(err) = session.close().await {
            warn!(error = %err, "search session was not closed cleanly");
        }

        let results = collect_results(&url, anchors?, limit);
        debug!(count = results.len(), "search results collected");
        Ok(results)
    }
}

impl<F: SessionFactory> PageSearch<F> {
    async fn read_anchors(&self, session: &F::Session, url: &Url) -> Result<Vec<ElementInfo>, SessionError> {
        session.navigate(url.as_str()).await?;
        if !session.wait_for_selector(&self.selector, self.wait).await? {
            debug!(selector = %self.selector, "no result anchors on the search page");
            return Ok(Vec::new());
        }
        session.query_all(&self.selector).await
    }
}

/// Fill the `{query}` placeholder with the form-encoded term.
pub fn search_url(template: &str, query: &str) -> Result<Url, SearchError> {
    let encoded: String = url::form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
    Ok(Url::parse(&template.replace("{query}", &encoded))?)
}

/// Resolve anchors against the search page, dropping duplicates, fragments
/// and anything that is not http(s).
pub fn collect_results(base: &Url, anchors: Vec<ElementInfo>, limit: usize) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    anchors
        .into_iter()
        .filter_map(|anchor| {
            let href = anchor.href?;
            let mut url = base.join(href.trim()).ok()?;
            if !matches!(url.scheme(), "http" | "https") {
                return None;
            }
            url.set_fragment(None);
            let title = match anchor.text.split_whitespace().collect::<Vec<_>>().join(" ") {
                text if !text.is_empty() => text,
                _ => anchor.title.unwrap_or_else(|| url.to_string()),
            };
            Some(SearchResult {
                url: url.to_string(),
                title,
            })
        })
        .filter(|result| seen.insert(result.url.clone()))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(href: &str, text: &str) -> ElementInfo {
        ElementInfo {
            href: Some(href.to_string()),
            text: text.to_string(),
            visible: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = search_url("https://docs.example.com/search?q={query}", " destination service ").unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/search?q=destination+service");

        let url = search_url("https://docs.example.com/search?q={query}", "a&b=c").unwrap();
        assert_eq!(url.query(), Some("q=a%26b%3Dc"));
    }

    #[test]
    fn test_collect_results_resolves_and_dedupes() {
        let base = Url::parse("https://docs.example.com/search?q=keys").unwrap();
        let anchors = vec![
            anchor("/docs/keys", "Service   Keys"),
            anchor("/docs/keys#create", "Service Keys again"),
            anchor("https://other.example.com/page", ""),
            anchor("mailto:team@example.com", "Mail"),
            anchor("/docs/bindings", "Bindings"),
        ];

        let results = collect_results(&base, anchors, 10);
        assert_eq!(
            results,
            vec![
                SearchResult {
                    url: "https://docs.example.com/docs/keys".to_string(),
                    title: "Service Keys".to_string(),
                },
                SearchResult {
                    url: "https://other.example.com/page".to_string(),
                    title: "https://other.example.com/page".to_string(),
                },
                SearchResult {
                    url: "https://docs.example.com/docs/bindings".to_string(),
                    title: "Bindings".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_collect_results_honours_limit() {
        let base = Url::parse("https://docs.example.com/").unwrap();
        let anchors = (0..5).map(|i| anchor(&format!("/p/{i}"), "Page")).collect();
        assert_eq!(collect_results(&base, anchors, 2).len(), 2);
        assert!(collect_results(&base, Vec::new(), 2).is_empty());
    }
}
