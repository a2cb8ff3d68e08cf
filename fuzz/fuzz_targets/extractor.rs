#![no_main]

use libfuzzer_sys::fuzz_target;

use docsift::config::HeuristicConfig;
use docsift::extractor::extract_html;
use docsift::fetcher::decode_html;

fuzz_target!(|data: &[u8]| {
    // Raw bytes go through charset sniffing first, like a fetched page
    let (html, _) = decode_html("text/html", data);

    // Extraction must never panic, and the reported length must match
    let result = extract_html(&html, &HeuristicConfig::default());
    assert_eq!(result.debug.content_length, result.content.chars().count());
});
