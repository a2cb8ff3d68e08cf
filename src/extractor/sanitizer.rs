use std::collections::{HashMap, HashSet};

use ego_tree::{NodeId, Tree};
use scraper::{ElementRef, Node};

use crate::config::HeuristicConfig;
use crate::dom::{has_inline_handler, inner_text, parse_selector};

/// Removes noise from a disposable copy of a subtree.
///
/// The source document is never touched: every call copies the node's subtree
/// without the unwanted descendants and hands the cleaned copy to a closure.
/// The node itself is never removed.
pub struct Sanitizer<'c> {
    config: &'c HeuristicConfig,
}

impl<'c> Sanitizer<'c> {
    pub fn new(config: &'c HeuristicConfig) -> Self {
        Self { config }
    }

    /// Drop every descendant matching `exclusions`, then every script, style,
    /// inline-handler, script-text or chrome element that survived.
    pub fn with_clean<T>(
        &self,
        node: ElementRef<'_>,
        exclusions: &str,
        f: impl FnOnce(ElementRef<'_>) -> T,
    ) -> T {
        self.prune(node, exclusions, true, f)
    }

    /// Only the exclusion pass.
    pub fn with_stripped<T>(
        &self,
        node: ElementRef<'_>,
        exclusions: &str,
        f: impl FnOnce(ElementRef<'_>) -> T,
    ) -> T {
        self.prune(node, exclusions, false, f)
    }

    pub fn clean_text(&self, node: ElementRef<'_>, exclusions: &str) -> String {
        self.with_clean(node, exclusions, inner_text)
    }

    pub fn strip_text(&self, node: ElementRef<'_>, exclusions: &str) -> String {
        self.with_stripped(node, exclusions, inner_text)
    }

    fn prune<T>(
        &self,
        node: ElementRef<'_>,
        exclusions: &str,
        second_pass: bool,
        f: impl FnOnce(ElementRef<'_>) -> T,
    ) -> T {
        let excluded: HashSet<NodeId> = parse_selector(exclusions)
            .map(|selector| node.select(&selector).map(|element| element.id()).collect())
            .unwrap_or_default();
        let mut tree = copy_subtree(node, &excluded);

        if second_pass {
            // Decide against the first-pass copy, then apply, so removals
            // never change what later checks see.
            let mut noisy = HashSet::new();
            if let Some(first) = ElementRef::wrap(tree.root()) {
                for element in first.descendants().skip(1).filter_map(ElementRef::wrap) {
                    let covered = element
                        .ancestors()
                        .any(|ancestor| noisy.contains(&ancestor.id()));
                    if !covered && self.is_noise(element) {
                        noisy.insert(element.id());
                    }
                }
            }
            for doomed in noisy {
                if let Some(mut detached) = tree.get_mut(doomed) {
                    detached.detach();
                }
            }
        }

        match ElementRef::wrap(tree.root()) {
            Some(clean) => f(clean),
            None => f(node),
        }
    }

    fn is_noise(&self, element: ElementRef<'_>) -> bool {
        let value = element.value();
        let name = value.name();
        if matches!(name, "script" | "style") || has_inline_handler(element) {
            return true;
        }
        if self.is_chrome(name, value.attr("class"), value.attr("id")) {
            return true;
        }
        let text = inner_text(element);
        text.contains("function") && text.contains("=>")
    }

    fn is_chrome(&self, name: &str, class: Option<&str>, id: Option<&str>) -> bool {
        let selectors = &self.config.selectors;
        if selectors.chrome_tags.contains(&name) {
            return true;
        }
        [class, id].into_iter().flatten().any(|value| {
            let lower = value.to_lowercase();
            selectors
                .chrome_fragments
                .iter()
                .any(|fragment| lower.contains(fragment))
        })
    }
}

/// Copy `node` and its descendants into a fresh tree, leaving out every
/// subtree rooted at an `excluded` id. The node itself is always copied.
fn copy_subtree(node: ElementRef<'_>, excluded: &HashSet<NodeId>) -> Tree<Node> {
    let mut tree = Tree::new(Node::Element(node.value().clone()));
    let mut copies = HashMap::from([(node.id(), tree.root().id())]);
    for source in node.descendants().skip(1) {
        if excluded.contains(&source.id()) {
            continue;
        }
        let Some(parent) = source.parent().and_then(|parent| copies.get(&parent.id()).copied())
        else {
            continue;
        };
        if let Some(mut parent) = tree.get_mut(parent) {
            let copy = parent.append(source.value().clone()).id();
            copies.insert(source.id(), copy);
        }
    }
    tree
}
