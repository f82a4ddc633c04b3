//! Flattening of the Android accessibility hierarchy dump
//!
//! The dump is markup with one `<node .../>` per view. Nodes are visited in document order
//! and turned into [`UiElement`]s; nodes whose `bounds` attribute cannot be parsed are skipped.

use crate::ui::element::{Bounds, UiElement};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn node_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<node((?:\s+[\w:.-]+\s*=\s*"[^"]*")*)\s*/?>"#).expect("valid node pattern")
    })
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"([\w:.-]+)\s*=\s*"([^"]*)""#).expect("valid attribute pattern"))
}

fn bounds_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*\[(-?\d+),(-?\d+)\]\[(-?\d+),(-?\d+)\]\s*$").expect("valid bounds pattern")
    })
}

/// Locate the hierarchy document inside raw bridge output
///
/// Direct dumps are followed by a status line ("UI hierchary dumped to: ...") and may be
/// preceded by warnings, so the document is cut out by its markers.
pub fn extract_hierarchy(raw: &str) -> Option<&str> {
    let start = raw.find("<?xml").or_else(|| raw.find("<hierarchy"))?;
    let rest = &raw[start..];
    match rest.find("</hierarchy>") {
        Some(end) => Some(&rest[..end + "</hierarchy>".len()]),
        None => Some(rest),
    }
}

/// Parse a `[x1,y1][x2,y2]` rectangle
pub fn parse_bounds(value: &str) -> Option<Bounds> {
    let caps = bounds_regex().captures(value)?;
    let n = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<i32>().ok());
    Some(Bounds::from_corners(n(1)?, n(2)?, n(3)?, n(4)?))
}

/// Last segment of a fully qualified class name
pub fn short_type(class: &str) -> &str {
    class.rsplit('.').next().unwrap_or(class)
}

/// Strip a package prefix ("com.app:id/submit" -> "submit")
pub fn strip_resource_prefix(resource_id: &str) -> &str {
    resource_id.rsplit('/').next().unwrap_or(resource_id)
}

fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#10;", "\n")
        .replace("&#13;", "\r")
        .replace("&amp;", "&")
}

fn parse_flag(value: Option<&String>) -> Option<bool> {
    match value.map(String::as_str) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

/// Flatten a hierarchy dump into canonical elements in document order
pub fn parse_hierarchy(xml: &str) -> Vec<UiElement> {
    let mut elements = Vec::new();

    for node in node_regex().captures_iter(xml) {
        let raw_attrs = node.get(1).map_or("", |m| m.as_str());
        let attrs: HashMap<&str, String> = attribute_regex()
            .captures_iter(raw_attrs)
            .filter_map(|c| Some((c.get(1)?.as_str(), decode_entities(c.get(2)?.as_str()))))
            .collect();

        let Some(bounds) = attrs.get("bounds").and_then(|b| parse_bounds(b)) else {
            continue;
        };

        let class = attrs.get("class").map_or("", String::as_str);
        let text = match attrs.get("text") {
            Some(text) if !text.is_empty() => text.clone(),
            _ => attrs.get("content-desc").cloned().unwrap_or_default(),
        };

        let mut element = UiElement::new(elements.len(), short_type(class), bounds)
            .with_text(text)
            .with_clickable(attrs.get("clickable").is_some_and(|v| v == "true"));

        if let Some(id) = attrs.get("resource-id").filter(|id| !id.is_empty()) {
            element = element.with_resource_id(strip_resource_prefix(id));
        }
        element.enabled = parse_flag(attrs.get("enabled"));
        element.focused = parse_flag(attrs.get("focused"));

        elements.push(element);
    }

    elements
}
