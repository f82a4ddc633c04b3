use crate::ui::element::UiElement;

/// Reduce a tree to the elements worth showing a caller
///
/// With `include_all` the input is returned unchanged. Otherwise only elements with
/// non-blank text or a clickable flag survive; order is preserved.
pub fn filter_elements(elements: Vec<UiElement>, include_all: bool) -> Vec<UiElement> {
    if include_all {
        return elements;
    }
    elements
        .into_iter()
        .filter(|element| element.has_text() || element.clickable)
        .collect()
}
