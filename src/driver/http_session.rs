//! Static backend: pages are fetched over HTTP and never run scripts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::dom::{Document, inner_text, query_all, query_first};
use crate::fetcher::{FetchedPage, Fetcher};

use super::session::{ElementInfo, PageSession, SessionError, SessionFactory};

/// A [`PageSession`] over plain HTTP. Selectors are answered from the
/// served markup, so only declarative shadow roots are visible.
#[derive(Debug)]
pub struct HttpSession {
    fetcher: Fetcher,
    page: Mutex<Option<FetchedPage>>,
    closed: AtomicBool,
}

impl HttpSession {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            page: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    async fn html(&self) -> Result<String, SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        self.page
            .lock()
            .await
            .as_ref()
            .map(|page| page.html.clone())
            .ok_or(SessionError::NoPage)
    }
}

#[async_trait]
impl PageSession for HttpSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        let page = self.fetcher.fetch(url).await?;
        debug!(url = %page.url, status = %page.status, encoding = page.encoding, "page loaded");
        *self.page.lock().await = Some(page);
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<bool, SessionError> {
        let html = self.html().await?;
        let doc = Document::parse(&html);
        Ok(query_first(doc.root(), selector).is_some())
    }

    async fn evaluate(&self, _script: &str, _args: Value) -> Result<Value, SessionError> {
        Err(SessionError::Unsupported("script evaluation"))
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementInfo>, SessionError> {
        let html = self.html().await?;
        let doc = Document::parse(&html);
        let elements = query_all(doc.root(), selector)
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                let value = element.value();
                ElementInfo {
                    index,
                    text: inner_text(element),
                    visible: value.attr("hidden").is_none()
                        && value.attr("aria-hidden") != Some("true"),
                    href: value.attr("href").map(str::to_string),
                    title: value.attr("title").map(str::to_string),
                }
            })
            .collect();
        Ok(elements)
    }

    async fn click(&self, _selector: &str, _index: usize) -> Result<(), SessionError> {
        Err(SessionError::Unsupported("click"))
    }

    async fn snapshot(&self) -> Result<String, SessionError> {
        self.html().await
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.closed.store(true, Ordering::SeqCst);
        self.page.lock().await.take();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Hands out independent [`HttpSession`]s sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
    fetcher: Fetcher,
}

impl HttpSessionFactory {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    type Session = HttpSession;

    async fn open(&self) -> Result<HttpSession, SessionError> {
        Ok(HttpSession::new(self.fetcher.clone()))
    }
}
