//! Waiting for, finding and tapping specific elements

use crate::device::PlatformAdapter;
use crate::error::{MobileError, Result};
use crate::observe::poll::{PollConfig, PollOutcome, poll_until};
use crate::ui::UiElement;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Criteria an element must satisfy; all given criteria must match
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ElementQuery {
    /// Exact text (case-insensitive, surrounding whitespace ignored)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Substring of the text (case-insensitive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_contains: Option<String>,

    /// Resource identifier without package prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    /// Element type such as "Button"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,

    /// Only match clickable elements
    #[serde(default)]
    pub clickable_only: bool,
}

impl ElementQuery {
    pub fn by_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn by_resource_id(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(resource_id.into()),
            ..Default::default()
        }
    }

    /// True when no criterion is set; an empty query would match anything
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.text_contains.is_none()
            && self.resource_id.is_none()
            && self.element_type.is_none()
    }

    pub fn matches(&self, element: &UiElement) -> bool {
        if self.clickable_only && !element.clickable {
            return false;
        }
        if let Some(text) = &self.text {
            if !element.text.trim().eq_ignore_ascii_case(text.trim()) {
                return false;
            }
        }
        if let Some(needle) = &self.text_contains {
            if !element.text.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(id) = &self.resource_id {
            if element.resource_id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if let Some(element_type) = &self.element_type {
            if !element.element_type.eq_ignore_ascii_case(element_type) {
                return false;
            }
        }
        true
    }

    /// Human readable form for error messages
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(text) = &self.text {
            parts.push(format!("text=\"{}\"", text));
        }
        if let Some(needle) = &self.text_contains {
            parts.push(format!("text contains \"{}\"", needle));
        }
        if let Some(id) = &self.resource_id {
            parts.push(format!("resource_id=\"{}\"", id));
        }
        if let Some(element_type) = &self.element_type {
            parts.push(format!("type=\"{}\"", element_type));
        }
        if self.clickable_only {
            parts.push("clickable".to_string());
        }
        parts.join(", ")
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(MobileError::InvalidArgument(
                "element query needs at least one of text, text_contains, resource_id or element_type".to_string(),
            ));
        }
        Ok(())
    }
}

/// All elements of one capture matching the query, in traversal order
pub fn find_elements(elements: &[UiElement], query: &ElementQuery) -> Vec<UiElement> {
    elements.iter().filter(|e| query.matches(e)).cloned().collect()
}

/// Poll the UI tree until an element matches; fails with `ElementNotFound` at the deadline
pub async fn wait_for_element(
    adapter: &dyn PlatformAdapter,
    device_id: &str,
    query: &ElementQuery,
    config: PollConfig,
) -> Result<UiElement> {
    query.validate()?;

    let outcome = poll_until(
        config,
        || adapter.get_ui_tree(device_id),
        |tree| tree.iter().any(|e| query.matches(e)),
    )
    .await?;

    match outcome {
        PollOutcome::Matched { value, .. } => value
            .into_iter()
            .find(|e| query.matches(e))
            .ok_or_else(|| MobileError::ElementNotFound(query.describe())),
        PollOutcome::TimedOut { attempts, .. } => Err(MobileError::ElementNotFound(format!(
            "{} (gave up after {:?}, {} captures)",
            query.describe(),
            config.timeout,
            attempts
        ))),
    }
}

/// Wait for a matching element, then tap its center
pub async fn tap_element(
    adapter: &dyn PlatformAdapter,
    device_id: &str,
    query: &ElementQuery,
    config: PollConfig,
) -> Result<UiElement> {
    let element = wait_for_element(adapter, device_id, query, config).await?;
    adapter
        .tap(device_id, element.center_x, element.center_y)
        .await?;
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Bounds;

    fn tree() -> Vec<UiElement> {
        vec![
            UiElement::new(0, "TextView", Bounds::new(0, 100, 500, 50)).with_text("Welcome back"),
            UiElement::new(1, "Button", Bounds::new(0, 200, 500, 50))
                .with_text("Sign In")
                .with_clickable(true)
                .with_resource_id("sign_in"),
            UiElement::new(2, "Button", Bounds::new(0, 300, 500, 50)).with_text("Sign in later"),
        ]
    }

    #[test]
    fn test_exact_text_is_case_insensitive() {
        let found = find_elements(&tree(), &ElementQuery::by_text("sign in"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].index, 1);
    }

    #[test]
    fn test_contains_and_type() {
        let query = ElementQuery {
            text_contains: Some("SIGN".to_string()),
            element_type: Some("button".to_string()),
            ..Default::default()
        };
        let indices: Vec<usize> = find_elements(&tree(), &query).iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_clickable_only_and_resource_id() {
        let query = ElementQuery {
            text_contains: Some("sign".to_string()),
            clickable_only: true,
            ..Default::default()
        };
        assert_eq!(find_elements(&tree(), &query).len(), 1);
        assert_eq!(find_elements(&tree(), &ElementQuery::by_resource_id("sign_in")).len(), 1);
        assert!(find_elements(&tree(), &ElementQuery::by_resource_id("missing")).is_empty());
    }

    #[test]
    fn test_empty_query_is_rejected() {
        assert!(ElementQuery::default().is_empty());
        assert!(ElementQuery::default().validate().is_err());
        assert!(!ElementQuery::by_text("x").is_empty());
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let query: ElementQuery = serde_json::from_value(serde_json::json!({
            "textContains": "sign",
            "clickableOnly": true
        }))
        .unwrap();
        assert_eq!(query.text_contains.as_deref(), Some("sign"));
        assert!(query.clickable_only);
    }

    #[test]
    fn test_describe() {
        let query = ElementQuery {
            text: Some("OK".to_string()),
            clickable_only: true,
            ..Default::default()
        };
        assert_eq!(query.describe(), "text=\"OK\", clickable");
    }
}
