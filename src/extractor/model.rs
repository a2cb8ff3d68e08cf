use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dom::char_len;

/// The five candidate extraction strategies, in arbitration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ShadowContainer,
    MainElement,
    ParagraphAggregation,
    TextElementAggregation,
    SelectorScan,
}

/// Last-resort tiers, tried in order once every strategy came up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackTier {
    FirstLargeElement,
    MainSelectors,
    CleanedBody,
    StrippedBody,
    RawBody,
}

/// Where the final content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum Source {
    Strategy(Strategy),
    Fallback(FallbackTier),
}

/// Text produced by one strategy invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub length: usize,
    pub strategy: Strategy,
}

impl Candidate {
    pub fn new(strategy: Strategy, text: String) -> Self {
        Self {
            length: char_len(&text),
            text,
            strategy,
        }
    }
}

/// Candidate lengths per strategy; zero when a strategy produced nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLengths {
    pub shadow_container: usize,
    pub main_element: usize,
    pub paragraph_aggregation: usize,
    pub text_element_aggregation: usize,
    pub selector_scan: usize,
}

impl CandidateLengths {
    pub fn record(&mut self, candidate: Option<&Candidate>) {
        let Some(candidate) = candidate else {
            return;
        };
        let slot = match candidate.strategy {
            Strategy::ShadowContainer => &mut self.shadow_container,
            Strategy::MainElement => &mut self.main_element,
            Strategy::ParagraphAggregation => &mut self.paragraph_aggregation,
            Strategy::TextElementAggregation => &mut self.text_element_aggregation,
            Strategy::SelectorScan => &mut self.selector_scan,
        };
        *slot = candidate.length;
    }
}

/// Diagnostics for one extraction, built once alongside the content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub source: Option<Source>,
    #[serde(rename = "shadowDOMContentUsed")]
    pub shadow_dom_content_used: bool,
    pub container_found: bool,
    pub candidate_lengths: CandidateLengths,
    pub anchor_title_count: usize,
    pub body_text_length: usize,
    pub content_length: usize,
}

impl DebugInfo {
    pub fn fallback_tier(&self) -> Option<FallbackTier> {
        match self.source {
            Some(Source::Fallback(tier)) => Some(tier),
            _ => None,
        }
    }

    /// The loosely-typed view: camelCase keys to JSON values.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Final output of the engine. `content` may be empty but is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub content: String,
    pub debug: DebugInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_length_counts_chars() {
        let candidate = Candidate::new(Strategy::MainElement, "ünïcode".to_string());
        assert_eq!(candidate.length, 7);
    }

    #[test]
    fn debug_map_uses_camel_case_keys() {
        let debug = DebugInfo {
            source: Some(Source::Strategy(Strategy::ShadowContainer)),
            shadow_dom_content_used: true,
            content_length: 640,
            ..DebugInfo::default()
        };
        let map = debug.to_map();
        assert_eq!(map["shadowDOMContentUsed"], Value::Bool(true));
        assert_eq!(map["contentLength"], Value::from(640));
        assert_eq!(map["source"]["name"], Value::from("shadow_container"));
        assert!(map["candidateLengths"].is_object());
    }

    #[test]
    fn fallback_tier_is_exposed() {
        let debug = DebugInfo {
            source: Some(Source::Fallback(FallbackTier::RawBody)),
            ..DebugInfo::default()
        };
        assert_eq!(debug.fallback_tier(), Some(FallbackTier::RawBody));
    }
}
