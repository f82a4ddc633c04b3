use serde::{Deserialize, Serialize};

/// Canonical, platform independent UI element
///
/// `index` is the element's position in one capture's traversal order. It is not a
/// stable identity: the same logical element may receive a different index next time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiElement {
    /// Traversal position within the capture
    pub index: usize,

    /// Short element type (e.g. "Button", "TextView")
    #[serde(rename = "type")]
    pub element_type: String,

    /// Label text, falling back to the accessibility description; never absent
    #[serde(default)]
    pub text: String,

    /// Element rectangle in device pixels (Android) or points (iOS)
    pub bounds: Bounds,

    pub center_x: i32,

    pub center_y: i32,

    #[serde(default)]
    pub clickable: bool,

    /// Identifier with any package prefix stripped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub focused: Option<bool>,
}

/// Element rectangle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl UiElement {
    /// Create an element; the center is derived from the bounds
    pub fn new(index: usize, element_type: impl Into<String>, bounds: Bounds) -> Self {
        let (center_x, center_y) = bounds.center();
        Self {
            index,
            element_type: element_type.into(),
            text: String::new(),
            bounds,
            center_x,
            center_y,
            clickable: false,
            resource_id: None,
            enabled: None,
            focused: None,
        }
    }

    /// Builder method: set text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder method: set clickable flag
    pub fn with_clickable(mut self, clickable: bool) -> Self {
        self.clickable = clickable;
        self
    }

    /// Builder method: set resource identifier
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Builder method: set enabled state
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Builder method: set focus state
    pub fn with_focused(mut self, focused: bool) -> Self {
        self.focused = Some(focused);
        self
    }

    /// Whether the element carries a visible label
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Build bounds from two corner points
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Center point, rounded half away from zero
    pub fn center(&self) -> (i32, i32) {
        let cx = (self.x as f64 + self.width as f64 / 2.0).round() as i32;
        let cy = (self.y as f64 + self.height as f64 / 2.0).round() as i32;
        (cx, cy)
    }

    /// Check if the rectangle has non-zero area
    pub fn is_visible(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_derived() {
        let element = UiElement::new(0, "Button", Bounds::from_corners(0, 100, 540, 150));
        assert_eq!(element.bounds, Bounds::new(0, 100, 540, 50));
        assert_eq!((element.center_x, element.center_y), (270, 125));
    }

    #[test]
    fn test_center_rounds_odd_sizes() {
        let bounds = Bounds::new(10, 10, 5, 3);
        assert_eq!(bounds.center(), (13, 12));
    }

    #[test]
    fn test_builder() {
        let element = UiElement::new(3, "EditText", Bounds::new(0, 0, 10, 10))
            .with_text("Search")
            .with_clickable(true)
            .with_resource_id("search_box")
            .with_enabled(true)
            .with_focused(false);

        assert_eq!(element.index, 3);
        assert_eq!(element.text, "Search");
        assert!(element.clickable);
        assert_eq!(element.resource_id.as_deref(), Some("search_box"));
        assert_eq!(element.enabled, Some(true));
        assert_eq!(element.focused, Some(false));
    }

    #[test]
    fn test_has_text_ignores_whitespace() {
        let element = UiElement::new(0, "View", Bounds::default()).with_text("  \n");
        assert!(!element.has_text());
    }

    #[test]
    fn test_json_shape() {
        let element = UiElement::new(1, "Button", Bounds::new(0, 0, 100, 40)).with_text("OK");
        let json = serde_json::to_value(&element).unwrap();

        assert_eq!(json["type"], "Button");
        assert_eq!(json["center_x"], 50);
        assert_eq!(json["bounds"]["height"], 40);
        assert!(json.get("resource_id").is_none());
    }

    #[test]
    fn test_bounds_visibility_and_contains() {
        let bounds = Bounds::new(10, 20, 100, 50);
        assert!(bounds.is_visible());
        assert!(bounds.contains(10, 20));
        assert!(!bounds.contains(110, 20));
        assert!(!Bounds::new(0, 0, 0, 10).is_visible());
    }
}
