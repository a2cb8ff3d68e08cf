use std::fmt::Write;

use super::PageReport;

/// Assemble a dump of crawled pages: a heading per page, its source link,
/// then the extracted text or the reason it failed.
pub fn assemble(query: &str, reports: &[PageReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", query.trim());

    for report in reports {
        let _ = writeln!(out, "## {}\n", single_line(&report.title));
        let _ = writeln!(out, "Source: <{}>\n", report.url);
        match (&report.content, &report.error) {
            (Some(content), _) => {
                let _ = writeln!(out, "{}\n", content.trim());
            }
            (None, Some(error)) => {
                let _ = writeln!(out, "> Extraction failed: {}\n", single_line(error));
            }
            (None, None) => {
                let _ = writeln!(out, "> No content\n");
            }
        }
    }
    out
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
