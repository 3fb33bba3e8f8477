//! Feature areas: each owns a store and the event listeners that keep it
//! in sync with the rest of the shell.
//!
//! - [`navbar`]: authoritative access flag, menu and title
//! - [`sidebar`]: dark mode, collapse state, access buttons, menu items

pub mod navbar;
pub mod sidebar;

pub use navbar::{NavbarController, NavbarStore};
pub use sidebar::{SidebarController, SidebarStore};

/// Listener lifecycle shared by every store that reacts to channel events.
pub trait EventListeners {
    /// Subscribe to every event this store reacts to.
    ///
    /// Calling it again replaces the previous subscriptions; it never
    /// accumulates duplicates.
    fn initialize_event_listeners(&self);

    /// Drop every subscription. Safe to call when never initialized, and a
    /// no-op the second time.
    fn cleanup(&self);

    /// Whether listeners are currently registered.
    fn is_listening(&self) -> bool;
}

/// Which feature a command or lifecycle call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Navbar,
    Sidebar,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Navbar => crate::model::NAVBAR_FEATURE,
            Feature::Sidebar => crate::model::SIDEBAR_FEATURE,
        }
    }
}

impl std::str::FromStr for Feature {
    type Err = crate::error::CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "navbar" => Ok(Feature::Navbar),
            "sidebar" => Ok(Feature::Sidebar),
            other => Err(crate::error::CommandError::UnknownFeature(other.to_string())),
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
