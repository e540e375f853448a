//! Capture target resolution.
//!
//! The page is parsed once per export; the matched element is copied into an
//! owned [`SnapshotNode`] tree so the rest of the pipeline can rewrite asset
//! URLs without touching the live page.

use std::collections::HashMap;
use std::fmt::Write as _;

use scraper::{ElementRef, Html, Node, Selector};

use crate::core::error::ExportError;
use crate::export::assets::AssetStatus;

/// Elements dropped while copying: they carry no visible content.
const SKIPPED_TAGS: [&str; 5] = ["script", "style", "noscript", "template", "button"];

/// Attribute that keeps an element (typically the export trigger itself) out of snapshots.
pub const IGNORE_ATTR: &str = "data-export-ignore";

/// Attribute set on `<img>` elements that replaced a frozen `<canvas>`.
pub const FROZEN_CANVAS_ATTR: &str = "data-snapshot-canvas";

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<SnapshotNode>,
    },
    Text(String),
}

impl SnapshotNode {
    pub fn element(tag: &str, attrs: &[(&str, &str)], children: Vec<SnapshotNode>) -> Self {
        SnapshotNode::Element {
            tag: tag.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children,
        }
    }

    pub fn text(value: &str) -> Self {
        SnapshotNode::Text(value.to_string())
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            SnapshotNode::Element { tag, .. } => Some(tag.as_str()),
            SnapshotNode::Text(_) => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            SnapshotNode::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            SnapshotNode::Text(_) => None,
        }
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let SnapshotNode::Element { attrs, .. } = self {
            match attrs.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
                Some(entry) => entry.1 = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn children(&self) -> &[SnapshotNode] {
        match self {
            SnapshotNode::Element { children, .. } => children,
            SnapshotNode::Text(_) => &[],
        }
    }

    /// Text of the subtree with whitespace collapsed.
    pub fn text_content(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        collapse_whitespace(&raw)
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            SnapshotNode::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            SnapshotNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Every `<img src>` in the subtree, in document order.
    pub fn image_sources(&self) -> Vec<String> {
        let mut sources = Vec::new();
        self.visit(&mut |node| {
            if node.tag() == Some("img") {
                if let Some(src) = node.attr("src").filter(|s| !s.trim().is_empty()) {
                    sources.push(src.to_string());
                }
            }
        });
        sources
    }

    pub fn visit(&self, f: &mut impl FnMut(&SnapshotNode)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Point every `<img>` at its inlined data URI. Images whose asset did not
    /// load are removed from the copy; their URLs are returned.
    pub(crate) fn inline_images(&mut self, assets: &HashMap<String, AssetStatus>) -> Vec<String> {
        let mut skipped = Vec::new();
        self.inline_images_into(assets, &mut skipped);
        skipped
    }

    fn inline_images_into(
        &mut self,
        assets: &HashMap<String, AssetStatus>,
        skipped: &mut Vec<String>,
    ) {
        let SnapshotNode::Element { children, .. } = self else {
            return;
        };

        children.retain(|child| {
            if child.tag() != Some("img") {
                return true;
            }
            let src = child.attr("src").unwrap_or_default();
            let loaded = matches!(assets.get(src), Some(AssetStatus::Loaded(_)));
            if !loaded {
                skipped.push(src.to_string());
            }
            loaded
        });

        for child in children.iter_mut() {
            if child.tag() == Some("img") {
                let src = child.attr("src").unwrap_or_default().to_string();
                if let Some(AssetStatus::Loaded(asset)) = assets.get(&src) {
                    child.set_attr("src", &asset.data_uri);
                    if let Some((width, height)) = asset.size {
                        if child.attr("width").is_none() {
                            child.set_attr("width", &format!("{width}"));
                        }
                        if child.attr("height").is_none() {
                            child.set_attr("height", &format!("{height}"));
                        }
                    }
                }
            } else {
                child.inline_images_into(assets, skipped);
            }
        }
    }

    /// XML serialization, used to pass inline SVG charts through unchanged.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            SnapshotNode::Text(text) => out.push_str(&escape_xml(text)),
            SnapshotNode::Element {
                tag,
                attrs,
                children,
            } => {
                let _ = write!(out, "<{tag}");
                for (key, value) in attrs {
                    let _ = write!(out, " {key}=\"{}\"", escape_xml(value));
                }
                if children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for child in children {
                        child.write_markup(out);
                    }
                    let _ = write!(out, "</{tag}>");
                }
            }
        }
    }
}

/// Parsed copy of the page an export starts from.
pub struct CaptureSource {
    document: Html,
}

impl CaptureSource {
    pub fn parse(markup: &str) -> Self {
        Self {
            document: Html::parse_document(markup),
        }
    }

    /// The first element `selector` matches, copied.
    pub fn resolve(&self, selector: &str) -> Result<SnapshotNode, ExportError> {
        let parsed = Selector::parse(selector)
            .map_err(|_| ExportError::InvalidSelector(selector.to_string()))?;
        self.document
            .select(&parsed)
            .next()
            .map(copy_element)
            .ok_or_else(|| ExportError::ElementNotFound(selector.to_string()))
    }

    pub fn find(&self, selector: &str) -> Option<SnapshotNode> {
        let parsed = Selector::parse(selector).ok()?;
        self.document.select(&parsed).next().map(copy_element)
    }
}

fn copy_element(element: ElementRef<'_>) -> SnapshotNode {
    let value = element.value();
    let attrs = value
        .attrs()
        .map(|(key, val)| (key.to_string(), val.to_string()))
        .collect();
    let children = element
        .children()
        .filter_map(|child| match child.value() {
            Node::Element(inner) => {
                if SKIPPED_TAGS.contains(&inner.name()) || inner.attr(IGNORE_ATTR).is_some() {
                    None
                } else {
                    ElementRef::wrap(child).map(copy_element)
                }
            }
            Node::Text(text) => Some(SnapshotNode::Text(text.to_string())),
            _ => None,
        })
        .collect();

    SnapshotNode::Element {
        tag: value.name().to_string(),
        attrs,
        children,
    }
}

pub(crate) fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
