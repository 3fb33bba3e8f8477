//! Sidebar feature: dark mode, collapse state and the navbar access buttons.

pub mod controller;
pub mod store;

pub use controller::SidebarController;
pub use store::{SidebarField, SidebarPatch, SidebarState, SidebarStore};
