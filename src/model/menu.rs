//! Sidebar menu items.

use std::collections::HashSet;

use crate::error::MenuError;

/// One sidebar entry. Order in the menu is display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    /// Optional glyph shown before the label.
    pub icon: Option<String>,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Check that every id is non-empty and unique.
pub fn validate_menu(items: &[MenuItem]) -> Result<(), MenuError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.id.trim().is_empty() {
            return Err(MenuError::EmptyId);
        }
        if !seen.insert(item.id.as_str()) {
            return Err(MenuError::DuplicateId(item.id.clone()));
        }
    }
    Ok(())
}

/// Menu the shell populates at bootstrap: one entry per routed page.
pub fn default_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("/", "Home").with_icon("⌂"),
        MenuItem::new("/about", "About").with_icon("ℹ"),
        MenuItem::new("/about/vision", "Vision"),
        MenuItem::new("/about/mision", "Mission"),
        MenuItem::new("/about/internal", "Internal").with_icon("🔒"),
    ]
}
