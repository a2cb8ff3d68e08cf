//! Depth-bounded search across nested shadow roots.

use scraper::{ElementRef, Selector};

use super::{light_children, light_descendants, parse_selector, select_light, shadow_root};

/// Find the first element matching `selector` starting from `host`.
///
/// If `host` owns a shadow root, the root is queried directly; failing that,
/// every element inside the root is searched one level deeper. If the shadow
/// root yields nothing, the host's light children are searched at the same
/// depth, since hosts can sit deep in the light tree without owning a root
/// themselves. Depths beyond `max_depth` yield nothing.
pub fn find_in_shadow<'a>(
    host: ElementRef<'a>,
    selector: &Selector,
    depth: usize,
    max_depth: usize,
) -> Option<ElementRef<'a>> {
    // Pending hosts, popped in document order.
    let mut pending = vec![(host, depth)];
    while let Some((host, depth)) = pending.pop() {
        if depth > max_depth {
            continue;
        }

        let children: Vec<_> = light_children(host).collect();
        pending.extend(children.into_iter().rev().map(|child| (child, depth)));

        if let Some(root) = shadow_root(host) {
            if let Some(found) = select_light(root, selector).into_iter().next() {
                return Some(found);
            }
            let inner: Vec<_> = light_descendants(root).collect();
            pending.extend(inner.into_iter().rev().map(|element| (element, depth + 1)));
        }
    }
    None
}

/// Parse `selector` and search from `host` at depth zero.
pub fn locate<'a>(host: ElementRef<'a>, selector: &str, max_depth: usize) -> Option<ElementRef<'a>> {
    let selector = parse_selector(selector)?;
    find_in_shadow(host, &selector, 0, max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, inner_text};

    fn nested(levels: usize) -> String {
        let mut html = String::from(r#"<div class="target">deepest</div>"#);
        for level in (0..levels).rev() {
            html = format!(
                r#"<x-level-{level}><template shadowrootmode="open">{html}</template></x-level-{level}>"#
            );
        }
        format!("<html><body><section>{html}</section></body></html>")
    }

    #[test]
    fn finds_content_inside_a_shadow_root() {
        let doc = Document::parse(
            r#"<body><doc-xml-content><template shadowrootmode="open">
                <div data-name="content"><p>Inside</p></div>
            </template></doc-xml-content></body>"#,
        );
        let found = locate(doc.root(), "[data-name=\"content\"]", 10).unwrap();
        assert_eq!(inner_text(found), "Inside");
    }

    #[test]
    fn descends_through_nested_roots() {
        let html = nested(4);
        let doc = Document::parse(&html);
        let found = locate(doc.root(), ".target", 10).unwrap();
        assert_eq!(inner_text(found), "deepest");
    }

    #[test]
    fn respects_depth_cap() {
        let html = nested(4);
        let doc = Document::parse(&html);
        // Four roots deep means the match sits at depth 3.
        assert!(locate(doc.root(), ".target", 3).is_some());
        assert!(locate(doc.root(), ".target", 2).is_none());
    }

    #[test]
    fn ignores_plain_light_dom_matches_at_top_level() {
        let doc = Document::parse(r#"<body><div class="target">light</div></body>"#);
        // No shadow root anywhere: the locator only reports shadow matches.
        assert!(locate(doc.root(), ".target", 10).is_none());
    }

    #[test]
    fn deep_light_nesting_does_not_exhaust_the_stack() {
        let mut html = String::from("<body>");
        html.push_str(&"<div>".repeat(20_000));
        html.push_str(r#"<x-host><template shadowrootmode="open"><p class="target">found</p></template></x-host>"#);
        html.push_str(&"</div>".repeat(20_000));
        html.push_str("</body>");

        let handle = std::thread::Builder::new()
            .stack_size(1024 * 1024)
            .spawn(move || {
                let doc = Document::parse(&html);
                locate(doc.root(), ".target", 10).map(inner_text)
            })
            .unwrap();
        assert_eq!(handle.join().unwrap().as_deref(), Some("found"));
    }

    #[test]
    fn earlier_hosts_win_over_later_ones() {
        let doc = Document::parse(
            r#"<body>
                <first-host><template shadowrootmode="open"><p class="target">first</p></template></first-host>
                <second-host><template shadowrootmode="open"><p class="target">second</p></template></second-host>
            </body>"#,
        );
        let found = locate(doc.root(), ".target", 10).unwrap();
        assert_eq!(inner_text(found), "first");
    }

    #[test]
    fn malformed_selector_is_swallowed() {
        let html = nested(1);
        let doc = Document::parse(&html);
        assert!(locate(doc.root(), "div[", 10).is_none());
    }
}
