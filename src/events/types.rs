//! Application events for cross-feature coordination.
//!
//! Events are the only contract between feature stores: a store never holds
//! a reference to another feature's state, it publishes an `AppEvent` and
//! the interested stores react. This module is pure Rust, fully testable.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{PayloadMismatch, UnrecognizedEvent};

/// The closed set of recognized event names.
///
/// Used as the registration key on the channel. Names are case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    UserLoggedIn,
    UserLoggedOut,
    NavbarAccessChanged,
    NavbarToggleAccessRequested,
    NavbarSetAccessRequested,
    SidebarToggleRequested,
}

impl EventName {
    pub const ALL: [EventName; 6] = [
        EventName::UserLoggedIn,
        EventName::UserLoggedOut,
        EventName::NavbarAccessChanged,
        EventName::NavbarToggleAccessRequested,
        EventName::NavbarSetAccessRequested,
        EventName::SidebarToggleRequested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::UserLoggedIn => "UserLoggedIn",
            EventName::UserLoggedOut => "UserLoggedOut",
            EventName::NavbarAccessChanged => "NavbarAccessChanged",
            EventName::NavbarToggleAccessRequested => "NavbarToggleAccessRequested",
            EventName::NavbarSetAccessRequested => "NavbarSetAccessRequested",
            EventName::SidebarToggleRequested => "SidebarToggleRequested",
        }
    }

    /// Returns true if events with this name carry a boolean payload.
    pub fn expects_bool(&self) -> bool {
        matches!(
            self,
            EventName::NavbarAccessChanged | EventName::NavbarSetAccessRequested
        )
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = UnrecognizedEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnrecognizedEvent(s.to_string()))
    }
}

/// Application-level events, one variant per recognized name.
///
/// Handlers match on the variant instead of coercing an untyped payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    // === Session ===
    /// Simulated login; carries the user name when one was given.
    UserLoggedIn(Option<String>),

    /// Simulated logout.
    UserLoggedOut,

    // === Navbar ===
    /// The navbar's authoritative access flag changed to the given value.
    NavbarAccessChanged(bool),

    /// Another feature asks the navbar to flip its access flag.
    NavbarToggleAccessRequested,

    /// Another feature asks the navbar to force its access flag.
    NavbarSetAccessRequested(bool),

    // === Sidebar ===
    /// Ask the sidebar to collapse or expand.
    SidebarToggleRequested,
}

impl AppEvent {
    /// The registration key this event is delivered under.
    pub fn name(&self) -> EventName {
        match self {
            AppEvent::UserLoggedIn(_) => EventName::UserLoggedIn,
            AppEvent::UserLoggedOut => EventName::UserLoggedOut,
            AppEvent::NavbarAccessChanged(_) => EventName::NavbarAccessChanged,
            AppEvent::NavbarToggleAccessRequested => EventName::NavbarToggleAccessRequested,
            AppEvent::NavbarSetAccessRequested(_) => EventName::NavbarSetAccessRequested,
            AppEvent::SidebarToggleRequested => EventName::SidebarToggleRequested,
        }
    }

    /// The payload as JSON, if the event carries one.
    pub fn payload(&self) -> Option<Value> {
        match self {
            AppEvent::UserLoggedIn(user) => user.clone().map(Value::String),
            AppEvent::NavbarAccessChanged(value) | AppEvent::NavbarSetAccessRequested(value) => {
                Some(Value::Bool(*value))
            }
            AppEvent::UserLoggedOut
            | AppEvent::NavbarToggleAccessRequested
            | AppEvent::SidebarToggleRequested => None,
        }
    }

    /// Build an event from a recognized name and an untyped payload.
    ///
    /// Payload-less events ignore whatever payload they are given. Boolean
    /// events require a JSON boolean.
    pub fn from_parts(name: EventName, payload: Option<Value>) -> Result<Self, PayloadMismatch> {
        let mismatch = |payload: Option<Value>| PayloadMismatch { name, payload };
        match name {
            EventName::UserLoggedIn => match payload {
                None | Some(Value::Null) => Ok(AppEvent::UserLoggedIn(None)),
                Some(Value::String(user)) => Ok(AppEvent::UserLoggedIn(Some(user))),
                Some(Value::Object(ref map)) => match map.get("name").and_then(Value::as_str) {
                    Some(user) => Ok(AppEvent::UserLoggedIn(Some(user.to_string()))),
                    None => Ok(AppEvent::UserLoggedIn(None)),
                },
                other => Err(mismatch(other)),
            },
            EventName::UserLoggedOut => Ok(AppEvent::UserLoggedOut),
            EventName::NavbarToggleAccessRequested => Ok(AppEvent::NavbarToggleAccessRequested),
            EventName::SidebarToggleRequested => Ok(AppEvent::SidebarToggleRequested),
            EventName::NavbarAccessChanged => match payload {
                Some(Value::Bool(value)) => Ok(AppEvent::NavbarAccessChanged(value)),
                other => Err(mismatch(other)),
            },
            EventName::NavbarSetAccessRequested => match payload {
                Some(Value::Bool(value)) => Ok(AppEvent::NavbarSetAccessRequested(value)),
                other => Err(mismatch(other)),
            },
        }
    }

    /// Returns a human-readable description of the event for logging.
    pub fn description(&self) -> &'static str {
        match self {
            AppEvent::UserLoggedIn(_) => "User logged in",
            AppEvent::UserLoggedOut => "User logged out",
            AppEvent::NavbarAccessChanged(_) => "Navbar access changed",
            AppEvent::NavbarToggleAccessRequested => "Navbar access toggle requested",
            AppEvent::NavbarSetAccessRequested(_) => "Navbar access set requested",
            AppEvent::SidebarToggleRequested => "Sidebar toggle requested",
        }
    }
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Some(payload) => write!(f, "{}({})", self.name(), payload),
            None => write!(f, "{}", self.name()),
        }
    }
}
