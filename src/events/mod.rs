//! Event system for decoupled cross-feature communication.
//!
//! Feature stores never reference each other. They publish [`AppEvent`]s on
//! a shared [`EventChannel`] and react to the events they subscribed to.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  toggle_access()      ┌─────────────┐
//! │   Navbar    │ ───────────────┐      │   Sidebar   │
//! │   store     │                │      │    store    │
//! └──────▲──────┘                │      └──────┬──────┘
//!        │                       │             │ set_navbar_access(v)
//!        │                       ▼             ▼
//! ┌──────┴──────────────────────────────────────────────┐
//! │                    EventChannel                     │
//! │     name → ordered handlers, synchronous fan-out    │
//! └──────┬──────────────────────┬───────────────┬───────┘
//!        │ NavbarAccessChanged  │               │
//!        ▼                      ▼               ▼
//!    navbar handler      sidebar mirror     AccessGate
//! ```
//!
//! # Usage
//!
//! ```
//! use dashgate::events::{AppEvent, EventChannel, EventName};
//!
//! let channel = EventChannel::new();
//! let token = channel.subscribe(EventName::NavbarAccessChanged, |event| {
//!     println!("access changed: {event}");
//!     Ok(())
//! });
//!
//! assert_eq!(channel.publish(AppEvent::NavbarAccessChanged(true)), 1);
//! token.unsubscribe();
//! assert_eq!(channel.publish(AppEvent::NavbarAccessChanged(false)), 0);
//! ```
//!
//! # Module Structure
//!
//! - [`types`]: Event definitions (`EventName`, `AppEvent`)
//! - [`channel`]: `EventChannel`, `SubscriptionToken` and removal `Scope`

pub mod channel;
pub mod types;

pub use channel::{EventChannel, HandlerResult, Scope, SubscriptionToken, WeakChannel};
pub use types::{AppEvent, EventName};
pub use crate::error::{PayloadMismatch, UnrecognizedEvent};
