//! Dashboard shell core.
//!
//! Feature stores (navbar, sidebar) never hold references to each other.
//! They share one [`EventChannel`] and keep themselves in sync by
//! publishing and reacting to [`AppEvent`]s. An [`AccessGate`] mirrors the
//! navbar's access flag and a [`RouteGuard`] uses it to decide whether a
//! protected page renders.
//!
//! Everything is single-threaded: handles are `Rc`-based and publishing is
//! a synchronous fan-out that completes before `publish` returns.

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod features;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod storage;
pub mod store;

pub use app::{Shell, Visit};
pub use config::{ShellConfig, StorageLocation};
pub use error::{CommandError, HandlerError, MenuError, ShellError, StorageError};
pub use events::{AppEvent, EventChannel, EventName, Scope, SubscriptionToken};
pub use features::{EventListeners, Feature, NavbarController, NavbarStore, SidebarController, SidebarStore};
pub use guards::{AccessGate, GuardDecision, RouteGuard};
pub use model::{AccessState, AccessTransition, MenuItem, Theme};
pub use routes::{Router, View};
pub use storage::{JsonFileStorage, KeyValueStorage, MemoryStorage};
pub use store::{GlobalStore, Store, StoreState, WatchId};
