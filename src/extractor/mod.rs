pub mod arbiter;
pub mod candidates;
pub mod fallback;
pub mod model;
pub mod sanitizer;
pub mod signals;

#[cfg(test)]
mod tests;

pub use fallback::{Readiness, simplified, text_node_retry};
pub use model::{Candidate, DebugInfo, ExtractionResult, FallbackTier, Source, Strategy};

use tracing::debug;

use crate::config::HeuristicConfig;
use crate::dom::{Document, char_len, inner_text};

/// Extract the best prose from a document snapshot.
///
/// Pure: the same document and configuration always give the same result.
/// When no strategy produces a candidate the fallback cascade runs; if that
/// declines too, `content` is empty.
pub fn extract(doc: &Document, config: &HeuristicConfig) -> ExtractionResult {
    // 1. Run every strategy and arbitrate
    let verdict = arbiter::arbitrate(doc, config);
    let shadow_dom_content_used = verdict.shadow_used();

    // 2. Fall back to the cascade on total failure
    let (content, source) = match verdict.winner {
        Some(winner) => (winner.text, Some(Source::Strategy(winner.strategy))),
        None => match fallback::cascade(doc, config) {
            Some(rescue) => (rescue.text, Some(Source::Fallback(rescue.tier))),
            None => (String::new(), None),
        },
    };

    // 3. Build diagnostics once
    let info = DebugInfo {
        source,
        shadow_dom_content_used,
        container_found: verdict.container_found,
        candidate_lengths: verdict.lengths,
        anchor_title_count: verdict.anchor_titles,
        body_text_length: doc.body().map_or(0, |body| char_len(&inner_text(body))),
        content_length: char_len(&content),
    };
    debug!(source = ?info.source, length = info.content_length, "extraction finished");

    ExtractionResult {
        content,
        debug: info,
    }
}

/// Parse `html` and extract from it.
pub fn extract_html(html: &str, config: &HeuristicConfig) -> ExtractionResult {
    extract(&Document::parse(html), config)
}
