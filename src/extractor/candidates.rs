//! The five independent candidate strategies.
//!
//! Each strategy reads the document and the heuristic table and either
//! produces a [`Candidate`] or nothing. None of them mutate the document;
//! sanitisation always works on a clone.

use scraper::ElementRef;
use tracing::debug;

use crate::config::HeuristicConfig;
use crate::dom::{
    Document, char_len, inner_text, light_children, locate, parse_selector, query_all,
    query_first, select_light,
};

use super::model::{Candidate, Strategy};
use super::sanitizer::Sanitizer;
use super::signals::{
    cookie_keyword_count, cookie_ratio, has_script_token, looks_like_code, mentions_any,
    script_token_count,
};

/// What the shadow/container strategy found, including the container itself
/// so the main-element strategy can reuse it.
#[derive(Debug, Clone)]
pub struct ShadowOutcome<'a> {
    pub container: Option<ElementRef<'a>>,
    pub via_shadow: bool,
    pub anchor_titles: usize,
    pub candidate: Option<Candidate>,
}

impl ShadowOutcome<'_> {
    fn empty() -> Self {
        Self {
            container: None,
            via_shadow: false,
            anchor_titles: 0,
            candidate: None,
        }
    }
}

/// Locate the content container across shadow boundaries, falling back to a
/// plain top-level query.
pub fn find_container<'a>(doc: &'a Document, config: &HeuristicConfig) -> Option<(ElementRef<'a>, bool)> {
    let root = doc.root();
    let selectors = config.selectors.container;
    let max_depth = config.limits.shadow_depth;

    selectors
        .iter()
        .find_map(|selector| locate(root, selector, max_depth))
        .map(|container| (container, true))
        .or_else(|| {
            selectors
                .iter()
                .find_map(|selector| query_first(root, selector))
                .map(|container| (container, false))
        })
}

/// The node inside a container that holds the prose.
pub fn container_body<'a>(container: ElementRef<'a>, config: &HeuristicConfig) -> Option<ElementRef<'a>> {
    if let Some(body) = config
        .selectors
        .container_body
        .iter()
        .find_map(|selector| query_first(container, selector))
    {
        return Some(body);
    }

    let paragraphs = parse_selector(config.selectors.container_paragraphs)?;
    let total: usize = light_children(container)
        .filter(|child| paragraphs.matches(child))
        .map(|child| char_len(&inner_text(child)))
        .sum();
    (total > config.lengths.medium).then_some(container)
}

/// Strategy 1. A candidate here wins outright.
pub fn shadow_container<'a>(doc: &'a Document, config: &HeuristicConfig) -> ShadowOutcome<'a> {
    let Some((container, via_shadow)) = find_container(doc, config) else {
        debug!("no content container");
        return ShadowOutcome::empty();
    };

    let mut outcome = ShadowOutcome {
        container: Some(container),
        via_shadow,
        ..ShadowOutcome::empty()
    };
    let Some(body) = container_body(container, config) else {
        debug!(via_shadow, "container has no usable body");
        return outcome;
    };

    let titles = anchor_titles(body, config);
    outcome.anchor_titles = titles.len();

    let text = Sanitizer::new(config).clean_text(body, config.selectors.standard_exclusions);
    let text = with_titles(text, &titles);
    let length = char_len(&text);
    debug!(via_shadow, length, titles = titles.len(), "container candidate");

    if length > config.lengths.short {
        outcome.candidate = Some(Candidate::new(Strategy::ShadowContainer, text));
    }
    outcome
}

/// Strategy 2: `<main>` (or the container from strategy 1), aggressively
/// sanitised. Script-polluted text is rebuilt from its clean fragments.
pub fn main_element(
    doc: &Document,
    container: Option<ElementRef<'_>>,
    config: &HeuristicConfig,
) -> Option<Candidate> {
    let element = query_first(doc.root(), config.selectors.main).or(container)?;
    let titles = anchor_titles(element, config);
    let lengths = &config.lengths;

    let (text, fragments) = Sanitizer::new(config).with_clean(
        element,
        config.selectors.aggressive_exclusions,
        |clean| (inner_text(clean), prose_fragments(clean, config)),
    );
    let text = with_titles(text, &titles);
    let length = char_len(&text);

    if length > lengths.short && script_token_count(&text, config) >= config.limits.main_script_tokens {
        let rebuilt = with_titles(fragments.join("\n"), &titles);
        let rebuilt_length = char_len(&rebuilt);
        debug!(length, rebuilt_length, "main text is script polluted, rebuilt from fragments");
        return (rebuilt_length >= lengths.short && !looks_like_code(&rebuilt, config))
            .then(|| Candidate::new(Strategy::MainElement, rebuilt));
    }

    let cookie_heavy = cookie_ratio(&text, config) > config.ratios.standard && length < lengths.medium;
    debug!(length, cookie_heavy, "main candidate");
    (length > lengths.short && !cookie_heavy && !looks_like_code(&text, config))
        .then(|| Candidate::new(Strategy::MainElement, text))
}

/// Strategy 3: long paragraphs that never mention cookies.
pub fn paragraph_aggregation(doc: &Document, config: &HeuristicConfig) -> Option<Candidate> {
    let paragraphs: Vec<String> = query_all(doc.root(), config.selectors.paragraphs)
        .into_iter()
        .map(inner_text)
        .filter(|text| char_len(text) > config.lengths.paragraph)
        .filter(|text| !mentions_any(text, config.keywords.paragraph_banner))
        .take(config.limits.paragraphs)
        .collect();

    aggregate(Strategy::ParagraphAggregation, paragraphs, config)
}

/// Strategy 4: every text-bearing element, deduplicated by containment.
pub fn text_element_aggregation(doc: &Document, config: &HeuristicConfig) -> Option<Candidate> {
    let texts = query_all(doc.root(), config.selectors.text_elements)
        .into_iter()
        .map(inner_text)
        .filter(|text| char_len(text) > config.lengths.text_element)
        .filter(|text| !mentions_any(text, config.keywords.banner))
        .filter(|text| !looks_like_code(text, config))
        .take(config.limits.text_elements);

    aggregate(Strategy::TextElementAggregation, dedupe(texts), config)
}

/// Drop texts contained in one already kept; a text containing kept ones
/// takes the place of the first of them.
fn dedupe(texts: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for text in texts {
        if kept.iter().any(|existing| existing.contains(text.as_str())) {
            continue;
        }
        let contained: Vec<usize> = kept
            .iter()
            .enumerate()
            .filter(|(_, existing)| text.contains(existing.as_str()))
            .map(|(index, _)| index)
            .collect();
        match contained.first().copied() {
            Some(first) => {
                for index in contained.into_iter().rev() {
                    kept.remove(index);
                }
                kept.insert(first, text);
            }
            None => kept.push(text),
        }
    }
    kept
}

/// Strategy 5: the longest clean match of the priority selector list.
pub fn selector_scan(doc: &Document, config: &HeuristicConfig) -> Option<Candidate> {
    let sanitizer = Sanitizer::new(config);
    let lengths = &config.lengths;
    let mut best: Option<Candidate> = None;

    for selector in config.selectors.priority {
        for element in query_all(doc.root(), selector) {
            let floor = best.as_ref().map_or(lengths.short, |b| b.length.max(lengths.short));
            // Sanitising never lengthens text, so short raw text cannot win.
            if char_len(&inner_text(element)) <= floor {
                continue;
            }

            let text = sanitizer.clean_text(element, config.selectors.standard_exclusions);
            let length = char_len(&text);
            let cookie_dominated = cookie_keyword_count(&text, config) > config.limits.scan_cookie_keywords
                && length < lengths.long;
            if length > floor && !cookie_dominated && !looks_like_code(&text, config) {
                debug!(selector, length, "selector scan match");
                best = Some(Candidate::new(Strategy::SelectorScan, text));
            }
        }
    }
    best
}

/// Rendered text of paragraph-like descendants that are long enough and free
/// of script tokens. Descendants of an element already taken are skipped.
pub(crate) fn prose_fragments(scope: ElementRef<'_>, config: &HeuristicConfig) -> Vec<String> {
    let Some(selector) = parse_selector(config.selectors.paragraph_like) else {
        return Vec::new();
    };

    let mut taken = Vec::new();
    let mut fragments = Vec::new();
    for element in select_light(scope, &selector) {
        if element.ancestors().any(|ancestor| taken.contains(&ancestor.id())) {
            continue;
        }
        let text = inner_text(element);
        if char_len(&text) > config.lengths.fragment && !has_script_token(&text, config) {
            taken.push(element.id());
            fragments.push(text);
        }
    }
    fragments
}

/// Distinct, non-empty `title` attributes of anchors under `scope`.
pub(crate) fn anchor_titles(scope: ElementRef<'_>, config: &HeuristicConfig) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    for anchor in query_all(scope, config.selectors.anchor_titles) {
        let Some(title) = anchor.value().attr("title") else {
            continue;
        };
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
        if !title.is_empty() && !titles.contains(&title) {
            titles.push(title);
        }
    }
    titles
}

pub(crate) fn with_titles(mut text: String, titles: &[String]) -> String {
    for title in titles {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(title);
    }
    text
}

fn aggregate(strategy: Strategy, parts: Vec<String>, config: &HeuristicConfig) -> Option<Candidate> {
    if parts.is_empty() {
        return None;
    }
    let text = parts.join("\n\n");
    debug!(?strategy, parts = parts.len(), length = char_len(&text), "aggregated candidate");
    (!looks_like_code(&text, config)).then(|| Candidate::new(strategy, text))
}
