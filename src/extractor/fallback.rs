//! Last-resort extraction, plus the two reduced extractors the driver
//! escalates to when the full pipeline comes back short.

use tracing::debug;

use crate::config::HeuristicConfig;
use crate::dom::{
    Document, char_len, inner_text, light_descendants, query_all, query_first, text_nodes,
};

use super::candidates::{container_body, find_container, prose_fragments};
use super::model::FallbackTier;
use super::sanitizer::Sanitizer;
use super::signals::{
    cookie_keyword_count, cookie_ratio, cookie_tolerable, looks_like_code, mentions_any,
    script_token_count,
};

/// Content accepted by one cascade tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rescue {
    pub tier: FallbackTier,
    pub text: String,
}

/// Try each tier in order and stop at the first that accepts.
pub fn cascade(doc: &Document, config: &HeuristicConfig) -> Option<Rescue> {
    let sanitizer = Sanitizer::new(config);
    let tiers: [(FallbackTier, fn(&Document, &Sanitizer<'_>, &HeuristicConfig) -> Option<String>); 5] = [
        (FallbackTier::FirstLargeElement, first_large_element),
        (FallbackTier::MainSelectors, main_selectors),
        (FallbackTier::CleanedBody, cleaned_body),
        (FallbackTier::StrippedBody, stripped_body),
        (FallbackTier::RawBody, raw_body),
    ];

    for (tier, run) in tiers {
        if let Some(text) = run(doc, &sanitizer, config) {
            debug!(?tier, length = char_len(&text), "fallback tier accepted");
            return Some(Rescue { tier, text });
        }
        debug!(?tier, "fallback tier declined");
    }
    None
}

fn first_large_element(doc: &Document, sanitizer: &Sanitizer<'_>, config: &HeuristicConfig) -> Option<String> {
    let lengths = &config.lengths;
    let root = doc.root();
    let element = std::iter::once(root)
        .chain(light_descendants(root))
        .find(|element| {
            let text = inner_text(*element);
            let length = char_len(&text);
            length > lengths.medium
                && (cookie_keyword_count(&text, config) < config.limits.element_cookie_keywords
                    || length > lengths.extended)
                && !looks_like_code(&text, config)
        })?;

    let text = sanitizer.clean_text(element, config.selectors.standard_exclusions);
    (char_len(&text) > lengths.medium && !looks_like_code(&text, config)).then_some(text)
}

fn main_selectors(doc: &Document, sanitizer: &Sanitizer<'_>, config: &HeuristicConfig) -> Option<String> {
    let lengths = &config.lengths;
    let mut best: Option<String> = None;

    for selector in config.selectors.cascade_main {
        for element in query_all(doc.root(), selector) {
            // Sanitizing only shrinks text, so short raw matches can never pass.
            if char_len(&inner_text(element)) <= lengths.long {
                continue;
            }
            let text = sanitizer.clean_text(element, config.selectors.standard_exclusions);
            let length = char_len(&text);
            if length <= lengths.long || looks_like_code(&text, config) {
                continue;
            }
            let acceptable = cookie_ratio(&text, config) < config.ratios.tight || length > lengths.massive;
            let longer = best.as_ref().is_none_or(|current| length > char_len(current));
            if acceptable && longer {
                best = Some(text);
            }
        }
    }
    best
}

fn cleaned_body(doc: &Document, sanitizer: &Sanitizer<'_>, config: &HeuristicConfig) -> Option<String> {
    let body = doc.body()?;
    let lengths = &config.lengths;
    let (text, fragments) = sanitizer.with_clean(body, config.selectors.broad_exclusions, |clean| {
        (inner_text(clean), prose_fragments(clean, config))
    });

    if script_token_count(&text, config) > config.limits.body_script_tokens {
        let rebuilt = fragments.join("\n");
        debug!(length = char_len(&rebuilt), "cleaned body is script polluted, rebuilt from fragments");
        return (char_len(&rebuilt) > lengths.medium && !looks_like_code(&rebuilt, config))
            .then_some(rebuilt);
    }

    let length = char_len(&text);
    (length > lengths.medium
        && cookie_tolerable(&text, length, config.ratios.loose, config)
        && !looks_like_code(&text, config))
        .then_some(text)
}

fn stripped_body(doc: &Document, sanitizer: &Sanitizer<'_>, config: &HeuristicConfig) -> Option<String> {
    let body = doc.body()?;
    let text = sanitizer.strip_text(body, config.selectors.chrome_exclusions);
    body_rule(text, config)
}

fn raw_body(doc: &Document, _sanitizer: &Sanitizer<'_>, config: &HeuristicConfig) -> Option<String> {
    let body = doc.body()?;
    body_rule(inner_text(body), config)
}

fn body_rule(text: String, config: &HeuristicConfig) -> Option<String> {
    let length = char_len(&text);
    (length > config.lengths.minimal
        && !looks_like_code(&text, config)
        && cookie_tolerable(&text, length, config.ratios.loose, config))
        .then_some(text)
}

/// The driver's simplified extractor: body text with obvious chrome removed.
pub fn simplified(doc: &Document, config: &HeuristicConfig) -> String {
    doc.body()
        .map(|body| {
            Sanitizer::new(config)
                .strip_text(body, config.selectors.chrome_exclusions)
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

/// The driver's last retry: every text node under body, ignoring markup,
/// minus anything that mentions cookie banners.
pub fn text_node_retry(doc: &Document, config: &HeuristicConfig) -> String {
    doc.body()
        .map(|body| {
            text_nodes(body)
                .into_iter()
                .filter(|text| !mentions_any(text, config.keywords.banner))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

/// Cleaned text lengths of the structured container and of `<main>`, used to
/// decide whether a page has finished rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub container_length: usize,
    pub main_length: usize,
}

impl Readiness {
    pub fn measure(doc: &Document, config: &HeuristicConfig) -> Self {
        let sanitizer = Sanitizer::new(config);
        let selectors = &config.selectors;

        let container_length = find_container(doc, config)
            .map(|(container, _)| container_body(container, config).unwrap_or(container))
            .map_or(0, |body| char_len(&sanitizer.clean_text(body, selectors.standard_exclusions)));
        let main_length = query_first(doc.root(), selectors.main)
            .map_or(0, |main| char_len(&sanitizer.clean_text(main, selectors.aggressive_exclusions)));

        Self {
            container_length,
            main_length,
        }
    }

    pub fn is_ready(&self, config: &HeuristicConfig) -> bool {
        self.container_length >= config.lengths.long || self.main_length >= config.lengths.extended
    }
}
