use std::sync::Arc;

use crate::config::HeuristicConfig;
use crate::dom::Document;
use crate::extractor::{self, ExtractionResult, Readiness};

/// The three extraction stages the driver escalates through, each a pure
/// function of a page snapshot.
pub trait ExtractionStages: Send + Sync {
    /// Full arbitration plus the fallback cascade.
    fn primary(&self, html: &str) -> ExtractionResult;

    /// Body text with obvious chrome stripped.
    fn fallback(&self, html: &str) -> String;

    /// Raw text-node walk, banner text filtered.
    fn retry(&self, html: &str) -> String;

    /// Whether the page has rendered enough text to extract from.
    fn ready(&self, html: &str) -> bool;
}

/// The stages backed by the extraction engine.
#[derive(Debug, Clone, Default)]
pub struct PipelineStages {
    heuristics: Arc<HeuristicConfig>,
}

impl PipelineStages {
    pub fn new(heuristics: Arc<HeuristicConfig>) -> Self {
        Self { heuristics }
    }
}

impl ExtractionStages for PipelineStages {
    fn primary(&self, html: &str) -> ExtractionResult {
        extractor::extract_html(html, &self.heuristics)
    }

    fn fallback(&self, html: &str) -> String {
        extractor::simplified(&Document::parse(html), &self.heuristics)
    }

    fn retry(&self, html: &str) -> String {
        extractor::text_node_retry(&Document::parse(html), &self.heuristics)
    }

    fn ready(&self, html: &str) -> bool {
        Readiness::measure(&Document::parse(html), &self.heuristics).is_ready(&self.heuristics)
    }
}
