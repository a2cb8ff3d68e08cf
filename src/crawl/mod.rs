//! Crawling many search results with bounded concurrency.

pub mod markdown;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{Instrument, error, info, info_span};

use crate::driver::{CrawlOutcome, Driver, SessionFactory};
use crate::search::SearchResult;

/// Outcome of one page in a batch. Exactly one of `content` and `error` is set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport {
    pub title: String,
    pub url: String,
    pub content: Option<String>,
    pub error: Option<String>,
    pub crawled_at: DateTime<Utc>,
}

impl PageReport {
    fn from_result(result: SearchResult, outcome: anyhow::Result<CrawlOutcome>) -> Self {
        let (content, error) = match outcome {
            Ok(outcome) => (Some(outcome.content), None),
            Err(err) => (None, Some(format!("{err:#}"))),
        };
        Self {
            title: result.title,
            url: result.url,
            content,
            error,
            crawled_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.content.is_some()
    }
}

/// Runs one driver attempt per page, each on its own session.
pub struct BatchCrawler<F> {
    factory: Arc<F>,
    driver: Arc<Driver>,
    concurrency: usize,
}

impl<F> BatchCrawler<F>
where
    F: SessionFactory + 'static,
{
    pub fn new(factory: Arc<F>, driver: Arc<Driver>, concurrency: usize) -> Self {
        Self {
            factory,
            driver,
            concurrency: concurrency.max(1),
        }
    }

    /// Crawl a single url on a fresh session.
    pub async fn crawl_one(&self, url: &str) -> anyhow::Result<CrawlOutcome> {
        crawl_page(self.factory.as_ref(), &self.driver, url).await
    }

    /// Crawl every result, in input order. One failure never stops the others.
    pub async fn crawl_all(&self, results: Vec<SearchResult>) -> Vec<PageReport> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        info!(pages = results.len(), concurrency = self.concurrency, "starting batch crawl");

        let handles = results.into_iter().map(|result| {
            let semaphore = Arc::clone(&semaphore);
            let factory = Arc::clone(&self.factory);
            let driver = Arc::clone(&self.driver);
            let span = info_span!("page", url = %result.url);
            tokio::spawn(
                async move {
                    // Hold the permit until the page is done
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(err) => return PageReport::from_result(result, Err(err.into())),
                    };
                    let outcome = crawl_page(factory.as_ref(), &driver, &result.url).await;
                    PageReport::from_result(result, outcome)
                }
                .instrument(span),
            )
        });

        let mut reports = Vec::new();
        for joined in join_all(handles).await {
            match joined {
                Ok(report) => reports.push(report),
                Err(err) => error!(error = %err, "page task panicked"),
            }
        }
        let failed = reports.iter().filter(|report| !report.is_success()).count();
        info!(pages = reports.len(), failed, "batch crawl finished");
        reports
    }
}

async fn crawl_page<F: SessionFactory>(
    factory: &F,
    driver: &Driver,
    url: &str,
) -> anyhow::Result<CrawlOutcome> {
    let session = factory.open().await?;
    let outcome = driver.crawl(&session, url).await;
    driver.release(&session).await;
    Ok(outcome?)
}
