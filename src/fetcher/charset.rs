use std::sync::LazyLock;

use encoding_rs::Encoding;
use regex::Regex;
use tracing::warn;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

/// Bytes scanned for `<meta charset>` declarations and fed to detection.
const SNIFF_LEN: usize = 4096;

/// Decode an HTML body, returning the text and the encoding used.
///
/// The encoding comes from the Content-Type header, then a `<meta>`
/// declaration (`charset` or `http-equiv`), then statistical detection.
/// Malformed sequences are replaced rather than rejected.
pub fn decode_html(content_type: &str, body: &[u8]) -> (String, &'static Encoding) {
    let encoding = sniff_encoding(content_type, body);
    let (decoded, used, had_errors) = encoding.decode(body);
    if had_errors {
        warn!(encoding = used.name(), "body contained malformed sequences");
    }
    (decoded.into_owned(), used)
}

fn sniff_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = label_from(&CHARSET_REGEX, content_type) {
        return encoding;
    }

    let head = &body[..body.len().min(SNIFF_LEN)];
    // `http-equiv` declarations carry `charset=` inside their content
    // attribute, which the header pattern already matches.
    let head_text = String::from_utf8_lossy(head);
    if let Some(encoding) = label_from(&META_CHARSET_REGEX, &head_text)
        .or_else(|| label_from(&CHARSET_REGEX, &head_text))
    {
        return encoding;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, body.len() <= SNIFF_LEN);
    detector.guess(None, true)
}

fn label_from(pattern: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = pattern.captures(haystack)?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}
