//! Sidebar store.
//!
//! Owns presentation state (dark mode, collapse, menu) and a mirror of the
//! navbar's access flag. It never writes the navbar's state: its access
//! buttons publish requests that the navbar store acts on.
//!
//! Only `is_dark_sidebar` is persisted, under `sidebar-storage`.

use std::rc::{Rc, Weak};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{HandlerError, MenuError};
use crate::events::{AppEvent, EventChannel, EventName, HandlerResult, SubscriptionToken, WeakChannel};
use crate::features::EventListeners;
use crate::model::{
    validate_menu, AccessState, AccessTransition, MenuItem, SIDEBAR_FEATURE, SIDEBAR_STORAGE_KEY,
    SIDEBAR_STORAGE_VERSION,
};
use crate::storage::KeyValueStorage;
use crate::store::{assign, Store, StoreState, Subscriptions, WeakStore};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SidebarState {
    pub is_dark_sidebar: bool,
    pub is_collapsed: bool,
    /// Mirror of the navbar's access flag, for the access control panel.
    pub navbar_access: bool,
    pub menu_items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarField {
    IsDarkSidebar,
    IsCollapsed,
    NavbarAccess,
    MenuItems,
}

#[derive(Debug, Default)]
pub struct SidebarPatch {
    pub is_dark_sidebar: Option<bool>,
    pub is_collapsed: Option<bool>,
    pub navbar_access: Option<bool>,
    pub menu_items: Option<Vec<MenuItem>>,
}

impl StoreState for SidebarState {
    type Field = SidebarField;
    type Patch = SidebarPatch;

    fn apply(&mut self, patch: SidebarPatch) -> Vec<SidebarField> {
        let mut changed = Vec::new();
        assign(&mut self.is_dark_sidebar, patch.is_dark_sidebar, SidebarField::IsDarkSidebar, &mut changed);
        assign(&mut self.is_collapsed, patch.is_collapsed, SidebarField::IsCollapsed, &mut changed);
        assign(&mut self.navbar_access, patch.navbar_access, SidebarField::NavbarAccess, &mut changed);
        assign(&mut self.menu_items, patch.menu_items, SidebarField::MenuItems, &mut changed);
        changed
    }
}

/// Serializable slice written under `sidebar-storage`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct PersistedSidebar {
    state: PersistedSidebarState,
    version: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct PersistedSidebarState {
    is_dark_sidebar: bool,
}

/// Sidebar state plus its actions and event listeners.
#[derive(Clone)]
pub struct SidebarStore {
    store: Store<SidebarState>,
    channel: EventChannel,
    storage: Rc<dyn KeyValueStorage>,
    subscriptions: Rc<Subscriptions>,
}

struct WeakSidebar {
    store: WeakStore<SidebarState>,
    channel: WeakChannel,
    storage: Weak<dyn KeyValueStorage>,
    subscriptions: Weak<Subscriptions>,
}

impl WeakSidebar {
    fn upgrade(&self) -> Option<SidebarStore> {
        Some(SidebarStore {
            store: self.store.upgrade()?,
            channel: self.channel.upgrade()?,
            storage: self.storage.upgrade()?,
            subscriptions: self.subscriptions.upgrade()?,
        })
    }
}

impl std::fmt::Debug for SidebarStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SidebarStore")
            .field("store", &self.store)
            .field("listening", &self.subscriptions.is_active())
            .finish()
    }
}

impl SidebarStore {
    /// Create the store, hydrating the persisted slice from `storage`.
    pub fn new(channel: EventChannel, storage: Rc<dyn KeyValueStorage>) -> Self {
        let initial = SidebarState {
            is_dark_sidebar: load_dark_flag(storage.as_ref()),
            ..Default::default()
        };
        Self {
            store: Store::new("SidebarStore", initial),
            channel,
            storage,
            subscriptions: Rc::new(Subscriptions::new()),
        }
    }

    pub fn state(&self) -> &Store<SidebarState> {
        &self.store
    }

    pub fn snapshot(&self) -> SidebarState {
        self.store.get()
    }

    pub fn is_dark_sidebar(&self) -> bool {
        self.store.read(|s| s.is_dark_sidebar)
    }

    pub fn is_collapsed(&self) -> bool {
        self.store.read(|s| s.is_collapsed)
    }

    pub fn navbar_access(&self) -> AccessState {
        self.store.read(|s| AccessState::from(s.navbar_access))
    }

    /// Adopt an access value observed while this store was not listening.
    pub fn sync_access(&self, access: AccessState) {
        self.mirror_access(AccessTransition::Set(access.is_granted()));
    }

    /// Flip dark mode and write it to persistent storage. Returns the new value.
    pub fn toggle_dark_sidebar(&self) -> bool {
        let dark = !self.is_dark_sidebar();
        self.store.set(SidebarPatch {
            is_dark_sidebar: Some(dark),
            ..Default::default()
        });
        self.persist();
        dark
    }

    pub fn toggle_collapsed(&self) -> bool {
        let collapsed = !self.is_collapsed();
        self.store.set(SidebarPatch {
            is_collapsed: Some(collapsed),
            ..Default::default()
        });
        collapsed
    }

    /// Replace the menu. Ids must be unique and non-empty.
    pub fn set_menu_items(&self, items: Vec<MenuItem>) -> Result<(), MenuError> {
        validate_menu(&items)?;
        debug!("[SidebarStore] menu set to {} item(s)", items.len());
        self.store.set(SidebarPatch {
            menu_items: Some(items),
            ..Default::default()
        });
        Ok(())
    }

    /// Ask the navbar to flip its access flag.
    pub fn toggle_navbar_access(&self) {
        info!("[SidebarStore] requested navbar access toggle");
        self.channel.publish(AppEvent::NavbarToggleAccessRequested);
    }

    /// Ask the navbar to force its access flag.
    pub fn set_navbar_access(&self, value: bool) {
        info!("[SidebarStore] requested navbar access = {value}");
        self.channel.publish(AppEvent::NavbarSetAccessRequested(value));
    }

    /// Broadcast a collapse/expand request to whoever listens.
    pub fn request_toggle(&self) {
        self.channel.publish(AppEvent::SidebarToggleRequested);
    }

    fn persist(&self) {
        let slice = PersistedSidebar {
            state: PersistedSidebarState {
                is_dark_sidebar: self.is_dark_sidebar(),
            },
            version: SIDEBAR_STORAGE_VERSION,
        };
        let result = serde_json::to_value(&slice)
            .map_err(Into::into)
            .and_then(|value| self.storage.set_item(SIDEBAR_STORAGE_KEY, value));
        if let Err(err) = result {
            warn!("[SidebarStore] failed to persist dark mode: {err}");
        }
    }

    fn downgrade(&self) -> WeakSidebar {
        WeakSidebar {
            store: self.store.downgrade(),
            channel: self.channel.downgrade(),
            storage: Rc::downgrade(&self.storage),
            subscriptions: Rc::downgrade(&self.subscriptions),
        }
    }

    fn listen(
        &self,
        name: EventName,
        on_event: impl Fn(&SidebarStore, &AppEvent) -> HandlerResult + 'static,
    ) -> SubscriptionToken {
        let weak = self.downgrade();
        self.channel.subscribe_as(SIDEBAR_FEATURE, name, move |event| match weak.upgrade() {
            Some(sidebar) => on_event(&sidebar, event),
            None => Ok(()),
        })
    }

    fn mirror_access(&self, transition: AccessTransition) {
        let next = self.navbar_access().next(transition).is_granted();
        self.store.set(SidebarPatch {
            navbar_access: Some(next),
            ..Default::default()
        });
    }
}

fn load_dark_flag(storage: &dyn KeyValueStorage) -> bool {
    let value = match storage.get_item(SIDEBAR_STORAGE_KEY) {
        Ok(Some(value)) => value,
        Ok(None) => return false,
        Err(err) => {
            warn!("[SidebarStore] failed to read persisted state: {err}");
            return false;
        }
    };
    match serde_json::from_value::<PersistedSidebar>(value) {
        Ok(slice) => slice.state.is_dark_sidebar,
        Err(err) => {
            warn!("[SidebarStore] ignoring malformed persisted state: {err}");
            false
        }
    }
}

impl EventListeners for SidebarStore {
    fn initialize_event_listeners(&self) {
        let tokens = vec![
            self.listen(EventName::NavbarAccessChanged, |sidebar, event| {
                let AppEvent::NavbarAccessChanged(value) = event else {
                    return Err(HandlerError::msg(format!("sidebar mirror received {event}")));
                };
                sidebar.mirror_access(AccessTransition::Set(*value));
                Ok(())
            }),
            self.listen(EventName::UserLoggedIn, |sidebar, _| {
                sidebar.mirror_access(AccessTransition::LoggedIn);
                Ok(())
            }),
            self.listen(EventName::UserLoggedOut, |sidebar, _| {
                sidebar.mirror_access(AccessTransition::LoggedOut);
                sidebar.store.set(SidebarPatch {
                    is_collapsed: Some(false),
                    ..Default::default()
                });
                Ok(())
            }),
            self.listen(EventName::SidebarToggleRequested, |sidebar, _| {
                sidebar.toggle_collapsed();
                Ok(())
            }),
        ];
        debug!("[SidebarStore] {} event listener(s) registered", tokens.len());
        self.subscriptions.replace(tokens);
    }

    fn cleanup(&self) {
        let released = self.subscriptions.release();
        if released > 0 {
            debug!("[SidebarStore] released {released} event listener(s)");
        }
    }

    fn is_listening(&self) -> bool {
        self.subscriptions.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn sidebar_with(storage: Rc<MemoryStorage>) -> (EventChannel, SidebarStore) {
        let channel = EventChannel::new();
        let sidebar = SidebarStore::new(channel.clone(), storage);
        (channel, sidebar)
    }

    #[test]
    fn test_initial_state_without_persisted_slice() {
        let (_channel, sidebar) = sidebar_with(Rc::new(MemoryStorage::new()));
        assert_eq!(sidebar.snapshot(), SidebarState::default());
    }

    #[test]
    fn test_dark_mode_is_persisted_in_expected_shape() {
        let storage = Rc::new(MemoryStorage::new());
        let (_channel, sidebar) = sidebar_with(Rc::clone(&storage));

        assert!(sidebar.toggle_dark_sidebar());
        assert_eq!(
            storage.get_item(SIDEBAR_STORAGE_KEY).unwrap(),
            Some(json!({ "state": { "isDarkSidebar": true }, "version": 0 }))
        );
    }

    #[test]
    fn test_dark_mode_is_hydrated() {
        let storage = Rc::new(MemoryStorage::new());
        storage
            .set_item(SIDEBAR_STORAGE_KEY, json!({ "state": { "isDarkSidebar": true }, "version": 0 }))
            .unwrap();
        let (_channel, sidebar) = sidebar_with(storage);
        assert!(sidebar.is_dark_sidebar());
        assert!(!sidebar.is_collapsed());
    }

    #[test]
    fn test_malformed_slice_falls_back_to_default() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item(SIDEBAR_STORAGE_KEY, json!("dark")).unwrap();
        let (_channel, sidebar) = sidebar_with(storage);
        assert!(!sidebar.is_dark_sidebar());
    }

    #[test]
    fn test_access_buttons_publish_requests() {
        let (channel, sidebar) = sidebar_with(Rc::new(MemoryStorage::new()));
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let tokens: Vec<SubscriptionToken> = [EventName::NavbarToggleAccessRequested, EventName::NavbarSetAccessRequested]
            .into_iter()
            .map(|name| {
                let sink = Rc::clone(&seen);
                channel.subscribe(name, move |event| {
                    sink.borrow_mut().push(event.clone());
                    Ok(())
                })
            })
            .collect();
        assert!(tokens.iter().all(SubscriptionToken::is_subscribed));

        sidebar.toggle_navbar_access();
        sidebar.set_navbar_access(true);
        assert_eq!(
            *seen.borrow(),
            vec![
                AppEvent::NavbarToggleAccessRequested,
                AppEvent::NavbarSetAccessRequested(true)
            ]
        );
    }

    #[test]
    fn test_mirror_follows_access_events() {
        let (channel, sidebar) = sidebar_with(Rc::new(MemoryStorage::new()));
        sidebar.initialize_event_listeners();

        channel.publish(AppEvent::NavbarAccessChanged(true));
        assert_eq!(sidebar.navbar_access(), AccessState::Granted);

        channel.publish(AppEvent::UserLoggedOut);
        assert_eq!(sidebar.navbar_access(), AccessState::Denied);
    }

    #[test]
    fn test_logout_resets_collapse() {
        let (channel, sidebar) = sidebar_with(Rc::new(MemoryStorage::new()));
        sidebar.initialize_event_listeners();
        sidebar.request_toggle();
        assert!(sidebar.is_collapsed());

        channel.publish(AppEvent::UserLoggedOut);
        assert!(!sidebar.is_collapsed());
    }

    #[test]
    fn test_menu_rejects_duplicate_ids() {
        let (_channel, sidebar) = sidebar_with(Rc::new(MemoryStorage::new()));
        let items = vec![MenuItem::new("home", "Home"), MenuItem::new("home", "Again")];
        assert_eq!(
            sidebar.set_menu_items(items),
            Err(MenuError::DuplicateId("home".into()))
        );
        assert!(sidebar.snapshot().menu_items.is_empty());
    }

    #[test]
    fn test_menu_keeps_display_order() {
        let (_channel, sidebar) = sidebar_with(Rc::new(MemoryStorage::new()));
        sidebar
            .set_menu_items(vec![MenuItem::new("b", "B"), MenuItem::new("a", "A").with_icon("*")])
            .unwrap();
        let ids: Vec<String> = sidebar.snapshot().menu_items.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
