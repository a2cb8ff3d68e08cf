use std::fmt::{Display, Formatter};
use std::time::Instant;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::dom::char_len;

/// Lifecycle stages of one crawl attempt, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Navigating,
    Settling,
    DismissingConsent,
    WaitingForMarker,
    RenderSettle,
    ExtractPrimary,
    ExtractFallback,
    ExtractRetry,
    Done,
    Failed,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Navigating => "navigating",
            Stage::Settling => "settling",
            Stage::DismissingConsent => "dismissing consent",
            Stage::WaitingForMarker => "waiting for a content marker",
            Stage::RenderSettle => "waiting for rendering",
            Stage::ExtractPrimary => "running primary extraction",
            Stage::ExtractFallback => "running fallback extraction",
            Stage::ExtractRetry => "running retry extraction",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Transient state of one attempt. Created at navigation start and dropped
/// when the attempt finishes; never shared.
#[derive(Debug)]
pub struct AttemptState {
    pub id: Uuid,
    pub url: String,
    stage: Stage,
    started: Instant,
    best: String,
    best_length: usize,
    best_stage: Option<Stage>,
    pub primary_length: usize,
    pub fallback_length: Option<usize>,
    pub retry_length: Option<usize>,
}

impl AttemptState {
    pub fn new(url: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.to_string(),
            stage: Stage::Navigating,
            started: Instant::now(),
            best: String::new(),
            best_length: 0,
            best_stage: None,
            primary_length: 0,
            fallback_length: None,
            retry_length: None,
        }
    }

    pub fn enter(&mut self, stage: Stage) {
        debug!(attempt = %self.id, from = ?self.stage, to = ?stage, elapsed_ms = self.elapsed_ms(), "stage transition");
        self.stage = stage;
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Keep `content` if it is strictly longer than the current best.
    pub fn offer(&mut self, content: String) -> bool {
        let length = char_len(&content);
        if length <= self.best_length {
            return false;
        }
        self.best = content;
        self.best_length = length;
        self.best_stage = Some(self.stage);
        true
    }

    pub fn best_length(&self) -> usize {
        self.best_length
    }

    pub fn best_stage(&self) -> Option<Stage> {
        self.best_stage
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    /// Move the best content out, leaving the attempt empty.
    pub fn take_best(&mut self) -> String {
        self.best_length = 0;
        std::mem::take(&mut self.best)
    }
}
