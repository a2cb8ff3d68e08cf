use tracing::debug;

use crate::config::HeuristicConfig;
use crate::dom::Document;

use super::candidates::{
    main_element, paragraph_aggregation, selector_scan, shadow_container, text_element_aggregation,
};
use super::model::{Candidate, CandidateLengths, Strategy};

/// Outcome of running every strategy on one document.
#[derive(Debug, Clone, Default)]
pub struct Verdict {
    pub winner: Option<Candidate>,
    pub lengths: CandidateLengths,
    pub container_found: bool,
    pub via_shadow: bool,
    pub anchor_titles: usize,
}

impl Verdict {
    /// Whether the shadow/container strategy produced the winner from inside
    /// a shadow root.
    pub fn shadow_used(&self) -> bool {
        self.via_shadow
            && self
                .winner
                .as_ref()
                .is_some_and(|winner| winner.strategy == Strategy::ShadowContainer)
    }
}

/// Run all five strategies and pick a winner.
///
/// Every strategy runs even when the container strategy already has a
/// candidate; the container result still wins outright. Among the others the
/// first to strictly exceed the running best length keeps the lead.
pub fn arbitrate(doc: &Document, config: &HeuristicConfig) -> Verdict {
    let shadow = shadow_container(doc, config);
    let others = [
        main_element(doc, shadow.container, config),
        paragraph_aggregation(doc, config),
        text_element_aggregation(doc, config),
        selector_scan(doc, config),
    ];

    let mut lengths = CandidateLengths::default();
    lengths.record(shadow.candidate.as_ref());
    for candidate in &others {
        lengths.record(candidate.as_ref());
    }

    let winner = match shadow.candidate {
        Some(candidate) => Some(candidate),
        None => others.into_iter().flatten().fold(None, |best: Option<Candidate>, candidate| {
            match best {
                Some(best) if best.length >= candidate.length => Some(best),
                _ => Some(candidate),
            }
        }),
    };

    match &winner {
        Some(winner) => debug!(strategy = ?winner.strategy, length = winner.length, "arbiter winner"),
        None => debug!("no strategy produced a candidate"),
    }

    Verdict {
        winner: winner.filter(|winner| winner.length > 0),
        lengths,
        container_found: shadow.container.is_some(),
        via_shadow: shadow.via_shadow,
        anchor_titles: shadow.anchor_titles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_has_no_winner() {
        let doc = Document::parse("<html><body></body></html>");
        let verdict = arbitrate(&doc, &HeuristicConfig::default());
        assert!(verdict.winner.is_none());
        assert_eq!(verdict.lengths, CandidateLengths::default());
        assert!(!verdict.container_found);
    }

    #[test]
    fn ties_keep_the_earlier_strategy() {
        let prose = "Installing the agent requires a supported operating system. ".repeat(5);
        let html = format!("<html><body><main><p>{prose}</p></main></body></html>");
        let doc = Document::parse(&html);
        let verdict = arbitrate(&doc, &HeuristicConfig::default());

        let winner = verdict.winner.unwrap();
        assert_eq!(winner.strategy, Strategy::MainElement);
        assert_eq!(verdict.lengths.main_element, winner.length);
        assert_eq!(verdict.lengths.selector_scan, winner.length);
    }

    #[test]
    fn container_wins_even_when_shorter() {
        let inner = "Configure the destination in the cockpit before deploying. ".repeat(5);
        let outer = "A much longer landing text that talks about the product overview. ".repeat(20);
        let html = format!(
            r#"<html><body>
                <main><p>{outer}</p></main>
                <div data-name="content"><div class="body conbody"><p>{inner}</p></div></div>
            </body></html>"#
        );
        let doc = Document::parse(&html);
        let verdict = arbitrate(&doc, &HeuristicConfig::default());

        assert!(verdict.container_found);
        assert!(!verdict.shadow_used());
        let winner = verdict.winner.unwrap();
        assert_eq!(winner.strategy, Strategy::ShadowContainer);
        assert!(verdict.lengths.main_element > winner.length);
    }
}
