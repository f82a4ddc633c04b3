//! Canonical UI element model
//!
//! This module provides the platform independent view of a screen:
//! - UiElement: one element of a flattened UI tree
//! - filter_elements: noise reduction applied before returning trees
//! - hierarchy: flattening of the Android accessibility dump

pub mod element;
pub mod filter;
pub mod hierarchy;

pub use element::{Bounds, UiElement};
pub use filter::filter_elements;
