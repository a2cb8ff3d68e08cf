//! The threshold table every extraction strategy reads from.

/// Minimum text lengths, in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthThresholds {
    /// Floor for the last-resort body tiers; below it the driver escalates.
    pub minimal: usize,
    /// Floor for a strategy candidate.
    pub short: usize,
    /// Floor for the first cascade tiers; also the container paragraph total.
    pub medium: usize,
    /// Floor for the cascade main-selector tier and the cookie override of
    /// the selector scan.
    pub long: usize,
    pub extended: usize,
    /// Above this, cookie-heavy text is accepted anyway.
    pub massive: usize,
    /// Per-element floor for paragraph aggregation.
    pub paragraph: usize,
    /// Per-element floor for text-element aggregation.
    pub text_element: usize,
    /// Per-element floor when re-deriving prose from script-polluted text.
    pub fragment: usize,
    /// The driver runs the text-node retry below this.
    pub retry_trigger: usize,
}

impl Default for LengthThresholds {
    fn default() -> Self {
        Self {
            minimal: 100,
            short: 200,
            medium: 500,
            long: 1000,
            extended: 2000,
            massive: 5000,
            paragraph: 100,
            text_element: 50,
            fragment: 30,
            retry_trigger: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ratios {
    /// Cookie ratio ceiling for the cascade main-selector tier.
    pub tight: f64,
    /// Code ratio ceiling everywhere, cookie ratio ceiling for `<main>`.
    pub standard: f64,
    /// Cookie ratio ceiling for the whole-body tiers.
    pub loose: f64,
}

impl Default for Ratios {
    fn default() -> Self {
        Self {
            tight: 0.05,
            standard: 0.1,
            loose: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    pub paragraphs: usize,
    pub text_elements: usize,
    /// Distinct script tokens that mark `<main>` text as polluted (at least).
    pub main_script_tokens: usize,
    /// Distinct script tokens that mark cleaned body text as polluted (more than).
    pub body_script_tokens: usize,
    /// Selector-scan matches with more cookie keywords than this are suspect.
    pub scan_cookie_keywords: usize,
    /// First-element scan accepts fewer cookie keywords than this.
    pub element_cookie_keywords: usize,
    pub shadow_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            paragraphs: 50,
            text_elements: 300,
            main_script_tokens: 3,
            body_script_tokens: 2,
            scan_cookie_keywords: 2,
            element_cookie_keywords: 3,
            shadow_depth: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keywords {
    /// Counted case-insensitively for cookie ratios.
    pub cookie: &'static [&'static str],
    /// Script-source markers, matched case-sensitively.
    pub script_tokens: &'static [&'static str],
    pub code_chars: &'static str,
    /// Paragraph aggregation drops elements mentioning any of these.
    pub paragraph_banner: &'static [&'static str],
    /// Text aggregation and the text-node retry drop text mentioning any of these.
    pub banner: &'static [&'static str],
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            cookie: &["cookie", "consent", "accept all", "do not accept"],
            script_tokens: &[
                "function",
                "=>",
                "document.querySelector",
                "addEventListener",
                "fetch(",
                "const ",
                "let ",
                "var ",
            ],
            code_chars: "{}();=",
            paragraph_banner: &["cookie", "consent"],
            banner: &["cookie", "consent", "accept all"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    /// Content container variants, most specific first.
    pub container: &'static [&'static str],
    /// Body node variants inside the container, most specific first.
    pub container_body: &'static [&'static str],
    /// Direct children of a container that count as prose.
    pub container_paragraphs: &'static str,
    pub main: &'static str,
    pub paragraphs: &'static str,
    pub text_elements: &'static str,
    pub paragraph_like: &'static str,
    /// Selector-scan order: site vocabulary first, generic tags last.
    pub priority: &'static [&'static str],
    pub cascade_main: &'static [&'static str],
    pub anchor_titles: &'static str,
    pub standard_exclusions: &'static str,
    pub aggressive_exclusions: &'static str,
    pub broad_exclusions: &'static str,
    pub chrome_exclusions: &'static str,
    /// Tags the sanitizer always drops.
    pub chrome_tags: &'static [&'static str],
    /// Class/id fragments the sanitizer always drops (case-insensitive).
    pub chrome_fragments: &'static [&'static str],
}

const STANDARD_EXCLUSIONS: &str = "script, style, noscript, iframe, nav, header, footer, button, \
    [role=\"navigation\"], [class*=\"cookie\"], [id*=\"cookie\"], [class*=\"consent\"], [id*=\"consent\"]";

const AGGRESSIVE_EXCLUSIONS: &str = "script, style, noscript, iframe, nav, header, footer, button, \
    [role=\"navigation\"], [class*=\"cookie\"], [id*=\"cookie\"], [class*=\"consent\"], [id*=\"consent\"], \
    aside, form, dialog, [role=\"banner\"], [role=\"contentinfo\"], [role=\"dialog\"], \
    [class*=\"breadcrumb\"], [class*=\"sidebar\"], [class*=\"toolbar\"], [class*=\"feedback\"], \
    [class*=\"banner\"], [aria-hidden=\"true\"]";

const BROAD_EXCLUSIONS: &str = "script, style, noscript, iframe, nav, header, footer, button, \
    [role=\"navigation\"], [class*=\"cookie\"], [id*=\"cookie\"], [class*=\"consent\"], [id*=\"consent\"], \
    aside, form, dialog, [role=\"banner\"], [role=\"contentinfo\"], [role=\"dialog\"], \
    [class*=\"breadcrumb\"], [class*=\"sidebar\"], [class*=\"toolbar\"], [class*=\"feedback\"], \
    [class*=\"banner\"], [aria-hidden=\"true\"], [class*=\"menu\"], [class*=\"nav\"], [id*=\"nav\"], \
    [class*=\"modal\"], [class*=\"popup\"], [class*=\"overlay\"], [class*=\"gdpr\"], [id*=\"onetrust\"]";

impl Default for Selectors {
    fn default() -> Self {
        Self {
            container: &[
                "div[data-name=\"content\"]",
                "[data-name=\"content\"]",
                "[data-name*=\"content\"]",
            ],
            container_body: &[".body.conbody", ".conbody", ".body"],
            container_paragraphs: "p, div, section, ul, ol, dl, table, pre, h1, h2, h3, h4, h5, h6",
            main: "main, [role=\"main\"]",
            paragraphs: "p, div[class*=\"text\"], div[class*=\"content\"], div[class*=\"article\"]",
            text_elements: "p, div, span, li, td, th, dd, dt, section, article",
            paragraph_like: "p, div, span, li, td, th, dd, dt, h1, h2, h3, h4, h5, h6",
            priority: &[
                "[data-name=\"content\"] .body.conbody",
                ".body.conbody",
                ".conbody",
                "[data-name=\"content\"]",
                ".doc-content",
                ".topic-content",
                ".documentation-content",
                ".docs-content",
                ".markdown-body",
                ".article-body",
                ".article-content",
                ".page-content",
                ".content-body",
                ".main-content",
                "#main-content",
                "[itemprop=\"articleBody\"]",
                "#content",
                ".content",
                "[role=\"main\"]",
                "main",
                "article",
                "#main",
                ".main",
                ".container",
                "section",
            ],
            cascade_main: &[
                "main",
                "[role=\"main\"]",
                "article",
                ".main-content",
                "#main",
                "[id*=\"content\"]",
                "[class*=\"content\"]",
            ],
            anchor_titles: "a[title]",
            standard_exclusions: STANDARD_EXCLUSIONS,
            aggressive_exclusions: AGGRESSIVE_EXCLUSIONS,
            broad_exclusions: BROAD_EXCLUSIONS,
            chrome_exclusions: "script, style, nav, footer, header, iframe, dialog, [class*=\"modal\"]",
            chrome_tags: &["nav", "header", "footer", "noscript", "iframe"],
            chrome_fragments: &[
                "cookie",
                "consent",
                "onetrust",
                "truste",
                "osano",
                "gdpr",
                "cmp-",
                "navbar",
                "breadcrumb",
                "skip-link",
                "traffic-label",
            ],
        }
    }
}

/// Immutable heuristic table. Every strategy reads its thresholds here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeuristicConfig {
    pub lengths: LengthThresholds,
    pub ratios: Ratios,
    pub limits: Limits,
    pub keywords: Keywords,
    pub selectors: Selectors,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let cfg = HeuristicConfig::default();
        let lengths = [
            cfg.lengths.minimal,
            cfg.lengths.short,
            cfg.lengths.medium,
            cfg.lengths.long,
            cfg.lengths.extended,
            cfg.lengths.massive,
        ];
        assert_eq!(lengths, [100, 200, 500, 1000, 2000, 5000]);
        assert_eq!(cfg.keywords.code_chars, "{}();=");
        assert_eq!(cfg.keywords.script_tokens.len(), 8);
        assert_eq!(cfg.limits.shadow_depth, 10);
        assert_eq!(cfg.selectors.priority.len(), 25);
        assert_eq!(
            [cfg.ratios.tight, cfg.ratios.standard, cfg.ratios.loose],
            [0.05, 0.1, 0.2]
        );
    }

    #[test]
    fn selector_tables_parse() {
        let cfg = HeuristicConfig::default();
        let s = &cfg.selectors;
        let singles = [
            s.container_paragraphs,
            s.main,
            s.paragraphs,
            s.text_elements,
            s.paragraph_like,
            s.anchor_titles,
            s.standard_exclusions,
            s.aggressive_exclusions,
            s.broad_exclusions,
            s.chrome_exclusions,
        ];
        let lists = s
            .container
            .iter()
            .chain(s.container_body)
            .chain(s.priority)
            .chain(s.cascade_main);
        for selector in singles.into_iter().chain(lists.copied()) {
            assert!(
                scraper::Selector::parse(selector).is_ok(),
                "selector should parse: {selector}"
            );
        }
    }
}
