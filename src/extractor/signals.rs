//! Cheap text measurements the strategies gate on.

use crate::config::HeuristicConfig;
use crate::dom::char_len;

/// Total occurrences of every cookie keyword, case-insensitive.
pub fn cookie_keyword_count(text: &str, config: &HeuristicConfig) -> usize {
    let lower = text.to_lowercase();
    config
        .keywords
        .cookie
        .iter()
        .map(|keyword| lower.matches(keyword).count())
        .sum()
}

/// Cookie keyword occurrences per whitespace-separated word.
pub fn cookie_ratio(text: &str, config: &HeuristicConfig) -> f64 {
    let words = text.split_whitespace().count();
    if words == 0 {
        return 0.0;
    }
    cookie_keyword_count(text, config) as f64 / words as f64
}

/// Share of characters drawn from the code-punctuation set.
pub fn code_ratio(text: &str, config: &HeuristicConfig) -> f64 {
    let length = char_len(text);
    if length == 0 {
        return 0.0;
    }
    let code = text
        .chars()
        .filter(|c| config.keywords.code_chars.contains(*c))
        .count();
    code as f64 / length as f64
}

pub fn looks_like_code(text: &str, config: &HeuristicConfig) -> bool {
    code_ratio(text, config) >= config.ratios.standard
}

/// How many distinct script tokens appear in `text`.
pub fn script_token_count(text: &str, config: &HeuristicConfig) -> usize {
    config
        .keywords
        .script_tokens
        .iter()
        .filter(|token| text.contains(*token))
        .count()
}

pub fn has_script_token(text: &str, config: &HeuristicConfig) -> bool {
    script_token_count(text, config) > 0
}

/// Whether `text` mentions any of `terms`, case-insensitive.
pub fn mentions_any(text: &str, terms: &[&str]) -> bool {
    let lower = text.to_lowercase();
    terms.iter().any(|term| lower.contains(term))
}

/// Acceptance rule for cookie-sensitive whole-page text: either the cookie
/// ratio stays under `ceiling` or the text is long enough to carry a banner.
pub fn cookie_tolerable(text: &str, length: usize, ceiling: f64, config: &HeuristicConfig) -> bool {
    length > config.lengths.massive || cookie_ratio(text, config) < ceiling
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> HeuristicConfig {
        HeuristicConfig::default()
    }

    #[test]
    fn counts_cookie_keywords_case_insensitively() {
        let text = "Cookie settings: we use COOKIES. Accept All or Do Not Accept consent.";
        // cookie x2, accept all, do not accept, consent
        assert_eq!(cookie_keyword_count(text, &cfg()), 5);
    }

    #[test]
    fn cookie_ratio_of_banner_text_is_high() {
        let banner = "cookie consent accept all do not accept ".repeat(5);
        assert!(cookie_ratio(&banner, &cfg()) > 0.5);
        assert_eq!(cookie_ratio("", &cfg()), 0.0);
        assert!(cookie_ratio("plain prose about installation steps", &cfg()) < 0.05);
    }

    #[test]
    fn code_ratio_flags_punctuation_soup() {
        assert!(looks_like_code("{}();=;{}();=;", &cfg()));
        assert!(!looks_like_code("Configure the service (optional).", &cfg()));
        assert_eq!(code_ratio("", &cfg()), 0.0);
    }

    #[test]
    fn script_tokens_are_distinct_and_case_sensitive() {
        let snippet = "const a = () => fetch('/x'); const b = 1;";
        assert_eq!(script_token_count(snippet, &cfg()), 3);
        assert_eq!(script_token_count("Function keys and Const values", &cfg()), 0);
        assert!(has_script_token("let x", &cfg()));
    }

    #[test]
    fn long_text_tolerates_cookie_mentions() {
        let config = cfg();
        let banner = "cookie consent ".repeat(10);
        assert!(!cookie_tolerable(&banner, char_len(&banner), 0.2, &config));
        assert!(cookie_tolerable(&banner, 6000, 0.2, &config));
    }
}
