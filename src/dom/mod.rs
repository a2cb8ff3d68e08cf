//! Parsed document snapshots.
//!
//! A snapshot is the serialised DOM of a rendered page. Shadow roots appear in
//! it the way browsers serialise them declaratively: a
//! `<template shadowrootmode="open">` element placed as the first child of its
//! host. Ordinary ("light") queries never descend into a `template`, matching
//! how `querySelectorAll` stops at shadow boundaries, and rendered text never
//! includes template content.

mod shadow;
mod text;

pub use shadow::{find_in_shadow, locate};
pub use text::{char_len, inner_text, normalize_text, text_nodes};

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const SHADOW_ROOT_ATTRS: [&str; 2] = ["shadowrootmode", "shadowroot"];

/// A read-only document snapshot.
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    pub fn body(&self) -> Option<ElementRef<'_>> {
        query_first(self.root(), "body")
    }
}

/// Parse a selector, logging instead of failing on malformed input.
pub fn parse_selector(source: &str) -> Option<Selector> {
    match Selector::parse(source) {
        Ok(selector) => Some(selector),
        Err(err) => {
            debug!(selector = source, error = ?err, "ignoring unparsable selector");
            None
        }
    }
}

/// Descendants of `scope` matching `selector`, in document order, without
/// crossing into templates below `scope`.
pub fn select_light<'a>(scope: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    scope
        .select(selector)
        .filter(|element| !inside_template(*element, scope))
        .collect()
}

pub fn query_all<'a>(scope: ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    parse_selector(selector)
        .map(|selector| select_light(scope, &selector))
        .unwrap_or_default()
}

pub fn query_first<'a>(scope: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = parse_selector(selector)?;
    scope
        .select(&selector)
        .find(|element| !inside_template(*element, scope))
}

/// Every element under `scope` (excluding `scope`) outside nested templates.
pub fn light_descendants<'a>(scope: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |element| !inside_template(*element, scope))
}

/// Element children of `element`, excluding its shadow root.
pub fn light_children<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| !is_shadow_root(*child))
}

/// The declarative shadow root owned by `host`, if any.
pub fn shadow_root<'a>(host: ElementRef<'a>) -> Option<ElementRef<'a>> {
    host.children()
        .filter_map(ElementRef::wrap)
        .find(|child| is_shadow_root(*child))
}

fn is_shadow_root(element: ElementRef<'_>) -> bool {
    let value = element.value();
    value.name() == "template" && SHADOW_ROOT_ATTRS.iter().any(|attr| value.attr(attr).is_some())
}

fn inside_template(element: ElementRef<'_>, scope: ElementRef<'_>) -> bool {
    for ancestor in element.ancestors() {
        if ancestor.id() == scope.id() {
            return false;
        }
        if let Some(value) = ancestor.value().as_element()
            && value.name() == "template"
        {
            return true;
        }
    }
    false
}

/// Global event handler content attributes, sorted for binary search.
const EVENT_HANDLERS: &[&str] = &[
    "onabort", "onafterprint", "onanimationend", "onanimationiteration", "onanimationstart",
    "onauxclick", "onbeforeinput", "onbeforeprint", "onbeforeunload", "onblur", "oncancel",
    "oncanplay", "oncanplaythrough", "onchange", "onclick", "onclose", "oncontextmenu", "oncopy",
    "oncuechange", "oncut", "ondblclick", "ondrag", "ondragend", "ondragenter", "ondragleave",
    "ondragover", "ondragstart", "ondrop", "ondurationchange", "onemptied", "onended", "onerror",
    "onfocus", "onfocusin", "onfocusout", "onformdata", "onhashchange", "oninput", "oninvalid",
    "onkeydown", "onkeypress", "onkeyup", "onload", "onloadeddata", "onloadedmetadata",
    "onloadstart", "onmessage", "onmousedown", "onmouseenter", "onmouseleave", "onmousemove",
    "onmouseout", "onmouseover", "onmouseup", "onoffline", "ononline", "onpagehide", "onpageshow",
    "onpaste", "onpause", "onplay", "onplaying", "onpointercancel", "onpointerdown",
    "onpointerenter", "onpointerleave", "onpointermove", "onpointerout", "onpointerover",
    "onpointerup", "onpopstate", "onprogress", "onratechange", "onreset", "onresize", "onscroll",
    "onscrollend", "onsearch", "onseeked", "onseeking", "onselect", "onselectionchange",
    "onselectstart", "onstalled", "onstorage", "onsubmit", "onsuspend", "ontimeupdate",
    "ontoggle", "ontouchcancel", "ontouchend", "ontouchmove", "ontouchstart", "ontransitionend",
    "onunload", "onvolumechange", "onwaiting", "onwheel",
];

/// Whether any attribute is an inline event handler (`onclick`, `onload`, ...).
pub fn has_inline_handler(element: ElementRef<'_>) -> bool {
    element.value().attrs().any(|(name, _)| {
        name.starts_with("on")
            && EVENT_HANDLERS
                .binary_search(&name.to_ascii_lowercase().as_str())
                .is_ok()
    })
}
