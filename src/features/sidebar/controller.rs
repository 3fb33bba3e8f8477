//! Sidebar controller.

use std::cell::Cell;

use log::info;

use super::store::SidebarStore;
use crate::features::EventListeners;
use crate::model::{AccessState, MenuItem, Theme};
use crate::store::GlobalStore;

/// Presentation side of the sidebar. Same lifecycle rules as the navbar
/// controller.
#[derive(Debug)]
pub struct SidebarController {
    store: SidebarStore,
    global: GlobalStore,
    active: Cell<bool>,
}

impl SidebarController {
    pub fn new(store: SidebarStore, global: GlobalStore) -> Self {
        Self {
            store,
            global,
            active: Cell::new(false),
        }
    }

    pub fn store(&self) -> &SidebarStore {
        &self.store
    }

    pub fn activate(&self) {
        if self.active.replace(true) {
            return;
        }
        self.store.initialize_event_listeners();
        info!("sidebar mounted");
    }

    pub fn deactivate(&self) {
        if !self.active.replace(false) {
            return;
        }
        self.store.cleanup();
        info!("sidebar unmounted");
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn click_grant(&self) {
        self.store.set_navbar_access(true);
    }

    pub fn click_deny(&self) {
        self.store.set_navbar_access(false);
    }

    pub fn click_toggle_access(&self) {
        self.store.toggle_navbar_access();
    }

    pub fn click_dark_mode(&self) -> bool {
        self.store.toggle_dark_sidebar()
    }

    pub fn click_collapse(&self) -> bool {
        self.store.toggle_collapsed()
    }

    /// Access as last seen on the channel.
    pub fn access(&self) -> AccessState {
        self.store.navbar_access()
    }

    pub fn access_indicator(&self) -> &'static str {
        self.access().label()
    }

    pub fn menu_items(&self) -> Vec<MenuItem> {
        self.store.state().read(|s| s.menu_items.clone())
    }

    /// The sidebar's own dark switch wins over the global theme.
    pub fn theme(&self) -> Theme {
        if self.store.is_dark_sidebar() {
            Theme::Dark
        } else {
            self.global.theme()
        }
    }
}

impl Drop for SidebarController {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use crate::features::NavbarStore;
    use crate::storage::MemoryStorage;
    use std::rc::Rc;

    fn wired() -> (NavbarStore, SidebarController) {
        let channel = EventChannel::new();
        let navbar = NavbarStore::new(channel.clone());
        navbar.initialize_event_listeners();
        let store = SidebarStore::new(channel, Rc::new(MemoryStorage::new()));
        let sidebar = SidebarController::new(store, GlobalStore::new());
        sidebar.activate();
        (navbar, sidebar)
    }

    #[test]
    fn test_grant_and_deny_drive_navbar_and_mirror() {
        let (navbar, sidebar) = wired();

        sidebar.click_grant();
        assert!(navbar.has_access());
        assert_eq!(sidebar.access_indicator(), "Access Granted");

        sidebar.click_deny();
        assert!(!navbar.has_access());
        assert_eq!(sidebar.access(), AccessState::Denied);
    }

    #[test]
    fn test_toggle_access_round_trip() {
        let (navbar, sidebar) = wired();
        sidebar.click_toggle_access();
        assert!(navbar.has_access());
        sidebar.click_toggle_access();
        assert!(!navbar.has_access());
        assert_eq!(sidebar.access(), AccessState::Denied);
    }

    #[test]
    fn test_dark_switch_overrides_global_theme() {
        let (_navbar, sidebar) = wired();
        assert_eq!(sidebar.theme(), Theme::Light);
        assert!(sidebar.click_dark_mode());
        assert_eq!(sidebar.theme(), Theme::Dark);
    }

    #[test]
    fn test_collapse_button() {
        let (_navbar, sidebar) = wired();
        assert!(sidebar.click_collapse());
        assert!(!sidebar.click_collapse());
    }
}
