//! Navbar store.
//!
//! `has_access` here is the single authoritative access flag. Every change
//! made through `toggle_access` / `set_access` is broadcast as
//! `NavbarAccessChanged` so the sidebar and the access gate mirror it within
//! the same call.

use std::rc::{Rc, Weak};

use log::{debug, info};

use crate::error::HandlerError;
use crate::events::{AppEvent, EventChannel, EventName, HandlerResult, SubscriptionToken, WeakChannel};
use crate::features::EventListeners;
use crate::model::{AccessState, AccessTransition, DEFAULT_TITLE, NAVBAR_FEATURE};
use crate::store::{assign, Store, StoreState, Subscriptions, WeakStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavbarState {
    pub has_access: bool,
    pub is_open: bool,
    pub title: String,
}

impl Default for NavbarState {
    fn default() -> Self {
        Self {
            has_access: false,
            is_open: false,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl NavbarState {
    pub fn access(&self) -> AccessState {
        AccessState::from(self.has_access)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavbarField {
    HasAccess,
    IsOpen,
    Title,
}

#[derive(Debug, Default)]
pub struct NavbarPatch {
    pub has_access: Option<bool>,
    pub is_open: Option<bool>,
    pub title: Option<String>,
}

impl StoreState for NavbarState {
    type Field = NavbarField;
    type Patch = NavbarPatch;

    fn apply(&mut self, patch: NavbarPatch) -> Vec<NavbarField> {
        let mut changed = Vec::new();
        assign(&mut self.has_access, patch.has_access, NavbarField::HasAccess, &mut changed);
        assign(&mut self.is_open, patch.is_open, NavbarField::IsOpen, &mut changed);
        assign(&mut self.title, patch.title, NavbarField::Title, &mut changed);
        changed
    }
}

/// Navbar state plus its actions and event listeners.
#[derive(Debug, Clone)]
pub struct NavbarStore {
    store: Store<NavbarState>,
    channel: EventChannel,
    subscriptions: Rc<Subscriptions>,
}

/// Non-owning handle captured by the navbar's own event handlers.
#[derive(Clone)]
struct WeakNavbar {
    store: WeakStore<NavbarState>,
    channel: WeakChannel,
    subscriptions: Weak<Subscriptions>,
}

impl WeakNavbar {
    fn upgrade(&self) -> Option<NavbarStore> {
        Some(NavbarStore {
            store: self.store.upgrade()?,
            channel: self.channel.upgrade()?,
            subscriptions: self.subscriptions.upgrade()?,
        })
    }
}

impl NavbarStore {
    pub fn new(channel: EventChannel) -> Self {
        Self {
            store: Store::new("NavbarStore", NavbarState::default()),
            channel,
            subscriptions: Rc::new(Subscriptions::new()),
        }
    }

    /// The underlying reactive container, for snapshots and watchers.
    pub fn state(&self) -> &Store<NavbarState> {
        &self.store
    }

    pub fn snapshot(&self) -> NavbarState {
        self.store.get()
    }

    pub fn has_access(&self) -> bool {
        self.store.read(|s| s.has_access)
    }

    pub fn access(&self) -> AccessState {
        self.store.read(NavbarState::access)
    }

    /// Flip the access flag and broadcast the new value. Returns it.
    pub fn toggle_access(&self) -> bool {
        self.transition(AccessTransition::Toggle)
    }

    /// Force the access flag and broadcast it, even when unchanged.
    pub fn set_access(&self, value: bool) {
        self.transition(AccessTransition::Set(value));
    }

    fn transition(&self, transition: AccessTransition) -> bool {
        let next = self.access().next(transition).is_granted();
        self.store.set(NavbarPatch {
            has_access: Some(next),
            ..Default::default()
        });
        info!("[NavbarStore] access {:?} -> {}", transition, AccessState::from(next));
        self.channel.publish(AppEvent::NavbarAccessChanged(next));
        next
    }

    /// Adopt an access value observed elsewhere while this store was not
    /// listening. Nothing is published: every listener already holds it.
    pub fn sync_access(&self, access: AccessState) {
        let changed = self.store.set(NavbarPatch {
            has_access: Some(access.is_granted()),
            ..Default::default()
        });
        if !changed.is_empty() {
            info!("[NavbarStore] access resynced to {access}");
        }
    }

    pub fn toggle_menu(&self) -> bool {
        let open = !self.store.read(|s| s.is_open);
        self.store.set(NavbarPatch {
            is_open: Some(open),
            ..Default::default()
        });
        open
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.store.set(NavbarPatch {
            title: Some(title.into()),
            ..Default::default()
        });
    }

    fn downgrade(&self) -> WeakNavbar {
        WeakNavbar {
            store: self.store.downgrade(),
            channel: self.channel.downgrade(),
            subscriptions: Rc::downgrade(&self.subscriptions),
        }
    }

    fn listen(
        &self,
        name: EventName,
        on_event: impl Fn(&NavbarStore, &AppEvent) -> HandlerResult + 'static,
    ) -> SubscriptionToken {
        let weak = self.downgrade();
        self.channel.subscribe_as(NAVBAR_FEATURE, name, move |event| match weak.upgrade() {
            Some(navbar) => on_event(&navbar, event),
            None => Ok(()),
        })
    }
}

impl EventListeners for NavbarStore {
    fn initialize_event_listeners(&self) {
        let tokens = vec![
            self.listen(EventName::UserLoggedIn, |navbar, _| {
                let granted = navbar.access().next(AccessTransition::LoggedIn).is_granted();
                navbar.store.set(NavbarPatch {
                    has_access: Some(granted),
                    ..Default::default()
                });
                Ok(())
            }),
            self.listen(EventName::UserLoggedOut, |navbar, _| {
                let granted = navbar.access().next(AccessTransition::LoggedOut).is_granted();
                navbar.store.set(NavbarPatch {
                    has_access: Some(granted),
                    is_open: Some(false),
                    ..Default::default()
                });
                Ok(())
            }),
            self.listen(EventName::NavbarAccessChanged, |navbar, event| {
                let AppEvent::NavbarAccessChanged(value) = event else {
                    return Err(unexpected(event));
                };
                navbar.store.set(NavbarPatch {
                    has_access: Some(*value),
                    ..Default::default()
                });
                Ok(())
            }),
            self.listen(EventName::NavbarToggleAccessRequested, |navbar, _| {
                navbar.toggle_access();
                Ok(())
            }),
            self.listen(EventName::NavbarSetAccessRequested, |navbar, event| {
                let AppEvent::NavbarSetAccessRequested(value) = event else {
                    return Err(unexpected(event));
                };
                navbar.set_access(*value);
                Ok(())
            }),
        ];
        debug!("[NavbarStore] {} event listener(s) registered", tokens.len());
        self.subscriptions.replace(tokens);
    }

    fn cleanup(&self) {
        let released = self.subscriptions.release();
        if released > 0 {
            debug!("[NavbarStore] released {released} event listener(s)");
        }
    }

    fn is_listening(&self) -> bool {
        self.subscriptions.is_active()
    }
}

fn unexpected(event: &AppEvent) -> HandlerError {
    HandlerError::msg(format!("navbar handler received unexpected event {event}"))
}
