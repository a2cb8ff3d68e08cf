use ego_tree::NodeId;
use ego_tree::iter::Edge;
use scraper::{ElementRef, Node};

/// Subtrees that never contribute rendered text.
const SILENT: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "meta", "link",
];

const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "dialog",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section",
    "summary", "table", "tr", "ul",
];

/// Rendered text of an element, approximating `innerText`: block elements
/// start new lines, whitespace inside a line collapses, blank lines drop.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect(element, &mut raw);
    normalize_text(&raw)
}

fn collect(element: ElementRef<'_>, out: &mut String) {
    // Id of the silent element whose subtree is being skipped.
    let mut silenced: Option<NodeId> = None;
    for edge in element.traverse() {
        match edge {
            Edge::Open(node) => {
                if silenced.is_some() {
                    continue;
                }
                match node.value() {
                    Node::Text(text) => out.push_str(text),
                    Node::Element(value) => {
                        let name = value.name();
                        if SILENT.contains(&name) {
                            silenced = Some(node.id());
                        } else if name == "br" || BLOCKS.contains(&name) {
                            out.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Edge::Close(node) => {
                if let Some(id) = silenced {
                    if id == node.id() {
                        silenced = None;
                    }
                    continue;
                }
                if let Node::Element(value) = node.value() {
                    let name = value.name();
                    if BLOCKS.contains(&name) {
                        out.push('\n');
                    } else if matches!(name, "td" | "th") {
                        out.push(' ');
                    }
                }
            }
        }
    }
}

pub fn normalize_text(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every non-blank text node under `element` in document order, ignoring
/// element semantics. Template, script and style content is not part of the
/// walk.
pub fn text_nodes(element: ElementRef<'_>) -> Vec<String> {
    let mut out = Vec::new();
    walk_text(element, &mut out);
    out
}

fn walk_text(element: ElementRef<'_>, out: &mut Vec<String>) {
    let mut skipped: Option<NodeId> = None;
    for edge in element.traverse() {
        match edge {
            Edge::Open(node) if skipped.is_none() => match node.value() {
                Node::Text(text) => {
                    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
                    if !collapsed.is_empty() {
                        out.push(collapsed);
                    }
                }
                Node::Element(value)
                    if matches!(value.name(), "template" | "script" | "style") =>
                {
                    skipped = Some(node.id());
                }
                _ => {}
            },
            Edge::Close(node) if skipped == Some(node.id()) => skipped = None,
            _ => {}
        }
    }
}

/// Length in characters, the unit every threshold is expressed in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, query_first};

    #[test]
    fn blocks_break_lines_and_inline_runs_join() {
        let doc = Document::parse(
            "<body><h1>Title</h1><p>First <b>bold</b>   words</p><div>Second<br>line</div></body>",
        );
        let text = inner_text(doc.body().unwrap());
        assert_eq!(text, "Title\nFirst bold words\nSecond\nline");
    }

    #[test]
    fn skips_scripts_styles_and_shadow_templates() {
        let doc = Document::parse(
            r#"<body><script>var x = 1;</script><style>p{}</style>
            <x-host><template shadowrootmode="open"><p>hidden</p></template></x-host>
            <p>Visible</p></body>"#,
        );
        assert_eq!(inner_text(doc.body().unwrap()), "Visible");
    }

    #[test]
    fn table_cells_are_separated() {
        let doc = Document::parse("<body><table><tr><td>a</td><td>b</td></tr></table></body>");
        let table = query_first(doc.root(), "table").unwrap();
        assert_eq!(inner_text(table), "a b");
    }

    #[test]
    fn text_node_walk_ignores_structure() {
        let doc = Document::parse(
            "<body><div>One<span> two </span></div><script>three()</script><p>\n\n</p><li>four</li></body>",
        );
        assert_eq!(text_nodes(doc.body().unwrap()), vec!["One", "two", "four"]);
    }

    fn deeply_nested(depth: usize) -> String {
        let mut html = String::with_capacity(depth * 11 + 64);
        html.push_str("<body>");
        for _ in 0..depth {
            html.push_str("<div>");
        }
        html.push_str("bottom<script>x()</script>");
        for _ in 0..depth {
            html.push_str("</div>");
        }
        html.push_str("<p>after</p></body>");
        html
    }

    #[test]
    fn walks_survive_very_deep_nesting() {
        let html = deeply_nested(20_000);
        // Run on a deliberately small stack: walking must not grow with depth.
        let handle = std::thread::Builder::new()
            .stack_size(1024 * 1024)
            .spawn(move || {
                let doc = Document::parse(&html);
                let body = doc.body().unwrap();
                (inner_text(body), text_nodes(body))
            })
            .unwrap();
        let (text, nodes) = handle.join().unwrap();
        assert_eq!(text, "bottom\nafter");
        assert_eq!(nodes, vec!["bottom", "after"]);
    }

    #[test]
    fn char_len_counts_characters_not_bytes() {
        assert_eq!(char_len("héllo"), 5);
    }
}
