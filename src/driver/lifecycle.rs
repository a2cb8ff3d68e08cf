use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::{DriverConfig, HeuristicConfig};
use crate::dom::char_len;
use crate::extractor::DebugInfo;

use super::bounded;
use super::consent::{self, ConsentOutcome};
use super::errors::{CrawlError, InsufficientContentError};
use super::readiness;
use super::session::{PageSession, SessionError};
use super::stages::{ExtractionStages, PipelineStages};
use super::state::{AttemptState, Stage};

/// What a successful attempt produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlOutcome {
    pub attempt_id: Uuid,
    pub url: String,
    pub content: String,
    /// Stage whose output was kept.
    pub stage: Stage,
    pub primary_length: usize,
    pub fallback_length: Option<usize>,
    pub retry_length: Option<usize>,
    /// Diagnostics of the primary extraction, when it ran to completion.
    pub debug: Option<DebugInfo>,
    pub consent: ConsentOutcome,
    pub marker: Option<&'static str>,
    pub elapsed_ms: u128,
}

/// Runs the page lifecycle against any [`PageSession`].
#[derive(Clone)]
pub struct Driver {
    config: DriverConfig,
    heuristics: Arc<HeuristicConfig>,
    stages: Arc<dyn ExtractionStages>,
}

impl Driver {
    pub fn new(config: DriverConfig, heuristics: Arc<HeuristicConfig>) -> Self {
        let stages = Arc::new(PipelineStages::new(Arc::clone(&heuristics)));
        Self::with_stages(config, heuristics, stages)
    }

    pub fn with_stages(
        config: DriverConfig,
        heuristics: Arc<HeuristicConfig>,
        stages: Arc<dyn ExtractionStages>,
    ) -> Self {
        Self {
            config,
            heuristics,
            stages,
        }
    }

    /// Close `session` once its attempt is over. Failures are only logged.
    pub async fn release<S>(&self, session: &S)
    where
        S: PageSession + ?Sized,
    {
        if bounded(self.config.close_timeout, session.close()).await.is_none() {
            warn!("session was not closed cleanly");
        }
    }

    #[instrument(skip(self, session), fields(url = %url))]
    pub async fn crawl<S>(&self, session: &S, url: &str) -> Result<CrawlOutcome, CrawlError>
    where
        S: PageSession + ?Sized,
    {
        let mut state = AttemptState::new(url);
        let result = self.run(session, &mut state).await;

        match &result {
            Ok(outcome) => info!(
                attempt = %outcome.attempt_id,
                stage = ?outcome.stage,
                length = char_len(&outcome.content),
                elapsed_ms = outcome.elapsed_ms,
                "page crawled"
            ),
            Err(err) => {
                state.enter(Stage::Failed);
                warn!(attempt = %state.id, error = %err, elapsed_ms = state.elapsed_ms(), "page crawl failed");
            }
        }
        result
    }

    async fn run<S>(&self, session: &S, state: &mut AttemptState) -> Result<CrawlOutcome, CrawlError>
    where
        S: PageSession + ?Sized,
    {
        let config = &self.config;
        let lengths = &self.heuristics.lengths;
        let url = state.url.clone();

        // 1. Navigate; any failure here ends the attempt
        self.ensure_open(session, state.stage())?;
        match timeout(config.navigation_timeout, session.navigate(&url)).await {
            Err(_) => {
                return Err(CrawlError::NavigationTimeout {
                    url,
                    after: config.navigation_timeout,
                });
            }
            Ok(Err(SessionError::Closed)) => {
                return Err(CrawlError::SessionClosed {
                    stage: Stage::Navigating,
                });
            }
            Ok(Err(source)) => return Err(CrawlError::Navigation { url, source }),
            Ok(Ok(())) => {}
        }

        // 2. Let the page settle and get banners out of the way
        state.enter(Stage::Settling);
        sleep(config.initial_settle).await;
        self.ensure_open(session, state.stage())?;

        state.enter(Stage::DismissingConsent);
        let consent = consent::dismiss(session, config).await;
        self.ensure_open(session, state.stage())?;

        // 3. Wait for real content before extracting
        state.enter(Stage::WaitingForMarker);
        let marker = readiness::wait_for_marker(session, config).await;
        if marker.is_some() {
            state.enter(Stage::RenderSettle);
            readiness::wait_for_content(session, &self.stages, config).await;
            readiness::scroll(session, config).await;
        }

        // 4. Primary extraction
        self.ensure_open(session, state.stage())?;
        state.enter(Stage::ExtractPrimary);
        let debug = match self
            .run_stage(session, Stage::ExtractPrimary, config.primary_timeout, |stages, html| {
                stages.primary(html)
            })
            .await
        {
            Some(result) => {
                state.offer(result.content);
                Some(result.debug)
            }
            None => None,
        };
        state.primary_length = state.best_length();

        // 5. Simplified fallback when primary came back short
        if state.best_length() < lengths.minimal {
            self.ensure_open(session, state.stage())?;
            state.enter(Stage::ExtractFallback);
            if let Some(text) = self
                .run_stage(session, Stage::ExtractFallback, config.fallback_timeout, |stages, html| {
                    stages.fallback(html)
                })
                .await
            {
                state.fallback_length = Some(char_len(&text));
                state.offer(text);
            }
        }

        // 6. One delayed text-node retry, then give up
        if state.best_length() < lengths.retry_trigger {
            sleep(config.retry_delay).await;
            self.ensure_open(session, state.stage())?;
            state.enter(Stage::ExtractRetry);
            let retry = self
                .run_stage(session, Stage::ExtractRetry, config.retry_timeout, |stages, html| {
                    stages.retry(html)
                })
                .await
                .unwrap_or_default();
            let retry_length = char_len(&retry);
            state.retry_length = Some(retry_length);

            if retry_length < lengths.short {
                return Err(InsufficientContentError {
                    url,
                    primary_length: state.best_length(),
                    retry_length,
                }
                .into());
            }
            state.offer(retry);
        }

        state.enter(Stage::Done);
        let stage = state.best_stage().unwrap_or(Stage::ExtractPrimary);
        Ok(CrawlOutcome {
            attempt_id: state.id,
            url,
            stage,
            primary_length: state.primary_length,
            fallback_length: state.fallback_length,
            retry_length: state.retry_length,
            debug,
            consent,
            marker,
            elapsed_ms: state.elapsed_ms(),
            content: state.take_best(),
        })
    }

    fn ensure_open<S>(&self, session: &S, stage: Stage) -> Result<(), CrawlError>
    where
        S: PageSession + ?Sized,
    {
        if session.is_closed() {
            return Err(CrawlError::SessionClosed { stage });
        }
        Ok(())
    }

    /// Snapshot the page and run one extraction stage off the async
    /// workers, bounded by `limit`. Any failure reads as no output.
    async fn run_stage<S, T, F>(&self, session: &S, stage: Stage, limit: Duration, run: F) -> Option<T>
    where
        S: PageSession + ?Sized,
        T: Send + 'static,
        F: FnOnce(&dyn ExtractionStages, &str) -> T + Send + 'static,
    {
        let stages = Arc::clone(&self.stages);
        let work = async move {
            let html = match session.snapshot().await {
                Ok(html) => html,
                Err(err) => {
                    warn!(%stage, error = %err, "snapshot failed");
                    return None;
                }
            };
            debug!(%stage, bytes = html.len(), "running extraction stage");
            match tokio::task::spawn_blocking(move || run(stages.as_ref(), &html)).await {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!(%stage, error = %err, "extraction stage aborted");
                    None
                }
            }
        };

        match timeout(limit, work).await {
            Ok(value) => value,
            Err(_) => {
                warn!(%stage, after = ?limit, "extraction stage timed out");
                None
            }
        }
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
