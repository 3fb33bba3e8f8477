//! The application shell: one channel, every store, the gate and the router.

use std::rc::Rc;

use log::{debug, info};

use crate::config::{ShellConfig, StorageLocation};
use crate::error::ShellError;
use crate::events::{AppEvent, EventChannel};
use crate::features::{EventListeners, Feature, NavbarController, NavbarStore, SidebarController, SidebarStore};
use crate::guards::{AccessGate, GuardDecision, RouteGuard};
use crate::model::default_menu;
use crate::routes::Router;
use crate::storage::{JsonFileStorage, KeyValueStorage, MemoryStorage};
use crate::store::GlobalStore;

/// Result of navigating to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    /// Normalized path.
    pub path: String,
    pub decision: GuardDecision,
}

/// Wires the feature stores to a shared channel and owns their lifetimes.
///
/// Both features are mounted by [`Shell::new`], the way the layout renders
/// navbar and sidebar on every page. The access gate listens for as long as
/// the shell lives.
pub struct Shell {
    channel: EventChannel,
    global: GlobalStore,
    navbar: NavbarController,
    sidebar: SidebarController,
    gate: AccessGate,
    router: Router,
    guard: RouteGuard,
    storage: Rc<dyn KeyValueStorage>,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("channel", &self.channel)
            .field("navbar", &self.navbar)
            .field("sidebar", &self.sidebar)
            .field("gate", &self.gate.snapshot())
            .finish()
    }
}

impl Shell {
    pub fn new(config: ShellConfig) -> Result<Self, ShellError> {
        let storage: Rc<dyn KeyValueStorage> = match &config.storage {
            StorageLocation::File(path) => {
                info!("using storage file {}", path.display());
                Rc::new(JsonFileStorage::open(path.clone())?)
            }
            StorageLocation::Memory => {
                info!("using in-memory storage");
                Rc::new(MemoryStorage::new())
            }
        };
        let session: Rc<dyn KeyValueStorage> = Rc::new(MemoryStorage::new());

        let channel = EventChannel::new();
        let global = GlobalStore::new();

        let navbar_store = NavbarStore::new(channel.clone());
        navbar_store.set_title(config.title.clone());

        let sidebar_store = SidebarStore::new(channel.clone(), Rc::clone(&storage));
        sidebar_store.set_menu_items(default_menu())?;

        let gate = AccessGate::new(channel.clone());
        gate.initialize_event_listeners();
        let guard = RouteGuard::new(gate.clone(), session, config.fallback_message.clone());

        let shell = Self {
            navbar: NavbarController::new(navbar_store, global.clone()),
            sidebar: SidebarController::new(sidebar_store, global.clone()),
            channel,
            global,
            gate,
            router: Router::new(),
            guard,
            storage,
        };
        shell.mount(Feature::Navbar);
        shell.mount(Feature::Sidebar);
        debug!("shell ready: {:?}", shell.channel);
        Ok(shell)
    }

    pub fn channel(&self) -> &EventChannel {
        &self.channel
    }

    pub fn global(&self) -> &GlobalStore {
        &self.global
    }

    pub fn navbar(&self) -> &NavbarController {
        &self.navbar
    }

    pub fn sidebar(&self) -> &SidebarController {
        &self.sidebar
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Activate a feature and bring its access view up to date with the gate,
    /// which keeps listening while features are unmounted.
    pub fn mount(&self, feature: Feature) {
        let access = self.gate.snapshot();
        match feature {
            Feature::Navbar => {
                self.navbar.activate();
                self.navbar.store().sync_access(access);
            }
            Feature::Sidebar => {
                self.sidebar.activate();
                self.sidebar.store().sync_access(access);
            }
        }
    }

    pub fn unmount(&self, feature: Feature) {
        match feature {
            Feature::Navbar => self.navbar.deactivate(),
            Feature::Sidebar => self.sidebar.deactivate(),
        }
    }

    pub fn is_mounted(&self, feature: Feature) -> bool {
        match feature {
            Feature::Navbar => self.navbar.is_active(),
            Feature::Sidebar => self.sidebar.is_active(),
        }
    }

    /// Resolve `path` and pass protected views through the guard.
    pub fn visit(&self, path: &str) -> Visit {
        let resolved = self.router.resolve(path);
        let decision = if resolved.protected {
            self.guard.check(&resolved.path, resolved.view)
        } else {
            GuardDecision::Render(resolved.view)
        };
        debug!("visit {} -> {:?}", resolved.path, decision);
        Visit {
            path: resolved.path,
            decision,
        }
    }

    /// Simulated login. Returns the number of handlers notified.
    pub fn login(&self, user: Option<String>) -> usize {
        info!("login as {}", user.as_deref().unwrap_or("<anonymous>"));
        self.channel.publish(AppEvent::UserLoggedIn(user))
    }

    pub fn logout(&self) -> usize {
        info!("logout");
        self.channel.publish(AppEvent::UserLoggedOut)
    }

    /// Unmount both features, stop the gate and flush durable storage.
    pub fn shutdown(&self) -> Result<(), ShellError> {
        self.unmount(Feature::Navbar);
        self.unmount(Feature::Sidebar);
        self.gate.cleanup();
        self.storage.flush()?;
        info!("shell shut down");
        Ok(())
    }
}
