use std::fs;

use crate::config::HeuristicConfig;
use crate::dom::Document;
use crate::extractor::{FallbackTier, Source, Strategy, extract, extract_html};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

fn page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head><title>Test</title></head><body>{body}</body></html>")
}

#[test]
fn test_documents_without_text_yield_empty_content() {
    let config = HeuristicConfig::default();
    for html in [
        "",
        "<html><body></body></html>",
        "<div><span></span><p></p></div>",
        "<script>const x = 1;</script><style>p { color: red }</style>",
    ] {
        let result = extract_html(html, &config);
        assert_eq!(result.content, "", "input: {html:?}");
        assert_eq!(result.debug.content_length, 0);
        assert_eq!(result.debug.source, None);
    }
}

#[test]
fn test_scenario_a_plain_main() {
    let html = page(&format!("<main><p>{}</p></main>", "Doc ".repeat(60)));
    let result = extract_html(&html, &HeuristicConfig::default());

    assert!(result.content.contains("Doc "));
    assert!(result.content.chars().count() > 200);
    assert_eq!(result.debug.source, Some(Source::Strategy(Strategy::MainElement)));
}

#[test]
fn test_passing_main_is_returned_with_anchor_titles() {
    let prose = "Audit logs are retained for ninety days and can be exported to a storage bucket \
                 for longer retention. Exports run nightly and include every administrative \
                 action taken in the subaccount, including role assignments.";
    let title = "Opens the retention policy";
    let html = page(&format!(
        r#"<main><p>{prose} <a href="/retention" title="{title}">More</a></p></main>"#
    ));
    let result = extract_html(&html, &HeuristicConfig::default());

    assert_eq!(result.content, format!("{prose} More\n{title}"));
}

#[test]
fn test_extraction_is_idempotent() {
    let config = HeuristicConfig::default();
    let doc = Document::parse(&fixture("shadow_doc.html"));

    let first = extract(&doc, &config);
    let second = extract(&doc, &config);

    assert_eq!(first.content, second.content);
    assert_eq!(first.debug, second.debug);
}

#[test]
fn test_scenario_b_shadow_container() {
    let result = extract_html(&fixture("shadow_doc.html"), &HeuristicConfig::default());
    let content = &result.content;

    assert!(content.contains("The destination service stores connection details"));
    assert!(content.contains("Trust stores can be managed per subaccount"));
    assert!(content.contains("Opens the setup guide overview"));
    assert!(content.contains("Shows the service plan details"));
    assert!(!content.contains("Accept All Cookies"));
    assert!(!content.contains("querySelectorAll"));
    assert!(!content.contains("Was this page helpful"));

    let debug = result.debug.to_map();
    assert_eq!(debug["shadowDOMContentUsed"], serde_json::Value::Bool(true));
    assert_eq!(result.debug.anchor_title_count, 2);
    assert!(result.debug.container_found);
}

#[test]
fn test_shadow_container_beats_top_level_main() {
    let result = extract_html(&fixture("shadow_doc.html"), &HeuristicConfig::default());

    // The landing <main> passes on its own but must not win.
    assert!(result.debug.candidate_lengths.main_element > 200);
    assert_eq!(result.debug.source, Some(Source::Strategy(Strategy::ShadowContainer)));
    assert!(!result.content.contains("The help portal collects"));
}

#[test]
fn test_nested_shadow_roots_use_container_paragraphs() {
    let result = extract_html(&fixture("nested_shadow.html"), &HeuristicConfig::default());

    assert!(result.debug.shadow_dom_content_used);
    assert!(result.content.starts_with("Service keys grant a client scoped access"));
    assert!(result.content.contains("revoking a key never affects the bindings"));
}

#[test]
fn test_cookie_suppression() {
    let config = HeuristicConfig::default();
    let banner = "cookie consent accept all do not accept ";

    let short = banner.repeat(10);
    assert!(short.trim().len() < 500);
    let result = extract_html(&page(&short), &config);
    assert!(result.content.chars().count() < 100);

    let long = banner.repeat(130);
    assert!(long.trim().len() > 5000);
    let result = extract_html(&page(&long), &config);
    assert_eq!(result.content, long.trim());
}

#[test]
fn test_code_suppression() {
    let config = HeuristicConfig::default();
    for repeat in [15, 50, 140] {
        let code = "{}();=;".repeat(repeat);
        assert!(code.len() > 100 && code.len() < 1000);
        let result = extract_html(&page(&code), &config);
        assert!(result.content.chars().count() < 100, "repeat {repeat}");
    }
}

const PARAGRAPHS: [&str; 3] = [
    "Provisioning a subaccount assigns quotas for every service plan you have bought.",
    "Entitlements must be granted before instances of a service can be created there.",
    "Role collections bundle scopes so administrators can assign them to user groups.",
];

const SNIPPET: &str = "const toggle = function (el) { el.addEventListener('click', () => \
                       { fetch('/api/v1/toggle/state').then((res) => res.json()); }); };";

#[test]
fn test_scenario_c_inline_snippet() {
    let html = page(&format!(
        "<main><p>{SNIPPET}</p><p>{}</p><p>{}</p><p>{}</p></main>",
        PARAGRAPHS[0], PARAGRAPHS[1], PARAGRAPHS[2]
    ));
    let result = extract_html(&html, &HeuristicConfig::default());

    for paragraph in PARAGRAPHS {
        assert!(result.content.contains(paragraph));
    }
    assert!(!result.content.contains("addEventListener"));
    assert!(!result.content.contains("const toggle"));
}

#[test]
fn test_scenario_c_script_element() {
    let html = page(&format!(
        "<main><script>{SNIPPET}</script><p>{}</p><p>{}</p><p>{}</p></main>",
        PARAGRAPHS[0], PARAGRAPHS[1], PARAGRAPHS[2]
    ));
    let result = extract_html(&html, &HeuristicConfig::default());

    for paragraph in PARAGRAPHS {
        assert!(result.content.contains(paragraph));
    }
    assert!(!result.content.contains("addEventListener"));
}

#[test]
fn test_consent_dialog_is_ignored() {
    let result = extract_html(&fixture("consent_page.html"), &HeuristicConfig::default());

    assert_eq!(result.debug.source, Some(Source::Strategy(Strategy::MainElement)));
    assert!(result.content.starts_with("Rotating credentials"));
    assert!(result.content.contains("Automated rotation is available for service keys."));
    assert!(!result.content.contains("Your privacy"));
    assert!(!result.content.contains("Accept All"));
    assert!(!result.content.contains("Security"));
}

#[test]
fn test_unstructured_body_falls_back() {
    let text = "Release 2.14 fixes the login redirect and speeds up exports. ".repeat(4);
    let result = extract_html(&page(&text), &HeuristicConfig::default());

    assert_eq!(result.debug.fallback_tier(), Some(FallbackTier::StrippedBody));
    assert_eq!(result.content, text.trim());
    assert_eq!(result.debug.body_text_length, text.trim().chars().count());
}

#[test]
fn test_malformed_html() {
    let html = "<html><head><title>Broken</title><body><main><p>Unclosed tags<div>More content";
    let result = extract_html(html, &HeuristicConfig::default());

    // Too short to pass any tier, but never panics.
    assert_eq!(result.content, "");
}

#[test]
fn test_deeply_nested_page_is_handled_on_a_blocking_pool_stack() {
    let depth = 8_000;
    let html = page(&format!(
        "{}<p>{}</p>{}",
        "<div>".repeat(depth),
        "Deep text ".repeat(30),
        "</div>".repeat(depth)
    ));
    // Blocking-pool threads get a 2 MiB stack.
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || extract_html(&html, &HeuristicConfig::default()))
        .unwrap();
    let result = handle.join().unwrap();

    assert!(result.debug.body_text_length > 0);
    assert_eq!(result.debug.content_length, result.content.chars().count());
}

#[test]
fn test_many_content_blocks_extract_in_linear_time() {
    let block = r#"<div class="content-item"><pre>const handler = () => render(items);</pre><p>Item note</p></div>"#;
    let html = page(&block.repeat(6_000));

    let started = std::time::Instant::now();
    let result = extract_html(&html, &HeuristicConfig::default());
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    assert_eq!(result.debug.content_length, result.content.chars().count());
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let _ = extract_html(&html, &HeuristicConfig::default());
        }

        #[test]
        fn test_content_length_matches_debug(
            words in proptest::collection::vec("[a-z]{1,12}", 0..400),
        ) {
            let html = page(&format!("<main><p>{}</p></main>", words.join(" ")));
            let result = extract_html(&html, &HeuristicConfig::default());
            prop_assert_eq!(result.debug.content_length, result.content.chars().count());
        }
    }
}
