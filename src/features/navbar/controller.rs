//! Navbar controller: mount lifecycle, the access toggle button and the
//! values the navbar shows.

use std::cell::Cell;

use log::info;

use super::store::NavbarStore;
use crate::features::EventListeners;
use crate::model::{AccessState, Theme};
use crate::store::GlobalStore;

/// Presentation side of the navbar.
///
/// `activate` registers the store's event listeners and `deactivate`
/// releases them. Both are idempotent; dropping an active controller
/// deactivates it.
#[derive(Debug)]
pub struct NavbarController {
    store: NavbarStore,
    global: GlobalStore,
    active: Cell<bool>,
}

impl NavbarController {
    pub fn new(store: NavbarStore, global: GlobalStore) -> Self {
        Self {
            store,
            global,
            active: Cell::new(false),
        }
    }

    pub fn store(&self) -> &NavbarStore {
        &self.store
    }

    pub fn activate(&self) {
        if self.active.replace(true) {
            return;
        }
        self.store.initialize_event_listeners();
        info!("navbar mounted");
    }

    pub fn deactivate(&self) {
        if !self.active.replace(false) {
            return;
        }
        self.store.cleanup();
        info!("navbar unmounted");
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// The "Grant/Revoke Access" button. Returns the new access state.
    pub fn click_toggle_access(&self) -> AccessState {
        AccessState::from(self.store.toggle_access())
    }

    pub fn click_menu(&self) -> bool {
        self.store.toggle_menu()
    }

    pub fn access(&self) -> AccessState {
        self.store.access()
    }

    pub fn access_indicator(&self) -> &'static str {
        self.access().label()
    }

    pub fn button_label(&self) -> &'static str {
        if self.access().is_granted() {
            "Revoke Access"
        } else {
            "Grant Access"
        }
    }

    pub fn denied_banner_visible(&self) -> bool {
        !self.access().is_granted()
    }

    pub fn title(&self) -> String {
        self.store.state().read(|s| s.title.clone())
    }

    pub fn theme(&self) -> Theme {
        self.global.theme()
    }
}

impl Drop for NavbarController {
    fn drop(&mut self) {
        self.deactivate();
    }
}
