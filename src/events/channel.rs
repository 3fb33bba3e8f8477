//! Synchronous publish/subscribe channel.
//!
//! The channel keeps, per event name, the ordered list of registered
//! handlers. `publish` runs every handler registered at call time, in
//! subscription order, on the calling thread, before returning:
//!
//! - A handler returning `Err` or panicking is logged and skipped; delivery
//!   continues with the next handler and the publisher never sees it.
//! - The handler list is snapshotted when `publish` starts, so a handler
//!   registered during delivery does not receive that same event.
//! - A handler unregistered during delivery is not invoked afterwards.
//!
//! No `RefCell` borrow is held while handlers run, so handlers may publish,
//! subscribe or unsubscribe re-entrantly.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use log::{debug, error, warn};
use serde_json::Value;

use super::types::{AppEvent, EventName};
use crate::error::HandlerError;

/// Result returned by every event handler.
pub type HandlerResult = Result<(), HandlerError>;

type Handler = dyn Fn(&AppEvent) -> HandlerResult;

struct Registration {
    id: u64,
    feature: Option<String>,
    live: Cell<bool>,
    handler: Box<Handler>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    by_name: HashMap<EventName, Vec<Rc<Registration>>>,
}

impl Registry {
    /// Detach every registration matching `pred` and hand them back.
    ///
    /// The caller must drop the returned registrations only after releasing
    /// its borrow of the registry: a handler may own the last handle to a
    /// store whose `Drop` unsubscribes from this same registry.
    #[must_use]
    fn remove_where(&mut self, mut pred: impl FnMut(EventName, &Registration) -> bool) -> Vec<Rc<Registration>> {
        let mut removed = Vec::new();
        for (name, list) in self.by_name.iter_mut() {
            let (gone, kept): (Vec<_>, Vec<_>) = list.drain(..).partition(|reg| pred(*name, &**reg));
            *list = kept;
            for reg in &gone {
                reg.live.set(false);
            }
            removed.extend(gone);
        }
        self.by_name.retain(|_, list| !list.is_empty());
        removed
    }
}

/// Selects registrations for bulk removal with [`EventChannel::unsubscribe_all`].
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// Exactly the registration behind this token.
    Token(&'a SubscriptionToken),
    /// Every handler registered under this name.
    Event(EventName),
    /// Every handler registered by this feature.
    Feature(&'a str),
    /// Handlers registered by this feature under this name.
    FeatureEvent(&'a str, EventName),
}

/// Handle returned by `subscribe`.
///
/// Its only capability is removing the registration it was issued for.
/// Removal is idempotent, and the token does not keep the channel alive.
/// Dropping a token does NOT unsubscribe.
#[derive(Debug)]
#[must_use = "dropping the token makes the subscription impossible to remove individually"]
pub struct SubscriptionToken {
    name: Option<EventName>,
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl SubscriptionToken {
    /// A token that refers to nothing (unrecognized event names).
    fn inert() -> Self {
        Self {
            name: None,
            id: 0,
            registry: Weak::new(),
        }
    }

    /// The event name this token is registered under, if any.
    pub fn event_name(&self) -> Option<EventName> {
        self.name
    }

    /// Remove the registration. Returns true only on the call that removed it.
    pub fn unsubscribe(&self) -> bool {
        let (Some(name), Some(registry)) = (self.name, self.registry.upgrade()) else {
            return false;
        };
        let id = self.id;
        let removed = registry.borrow_mut().remove_where(|n, reg| n == name && reg.id == id);
        !removed.is_empty()
    }

    /// Whether the registration is still present on the channel.
    pub fn is_subscribed(&self) -> bool {
        let (Some(name), Some(registry)) = (self.name, self.registry.upgrade()) else {
            return false;
        };
        let registry = registry.borrow();
        registry
            .by_name
            .get(&name)
            .is_some_and(|list| list.iter().any(|reg| reg.id == self.id))
    }
}

/// In-process event channel. Cloning yields another handle to the same
/// registration table.
#[derive(Clone, Default)]
pub struct EventChannel {
    registry: Rc<RefCell<Registry>>,
}

impl EventChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`.
    pub fn subscribe<F>(&self, name: EventName, handler: F) -> SubscriptionToken
    where
        F: Fn(&AppEvent) -> HandlerResult + 'static,
    {
        self.register(None, name, Box::new(handler))
    }

    /// Register `handler` under `name` on behalf of `feature`.
    ///
    /// The label allows `unsubscribe_all(Scope::Feature(..))` teardown.
    pub fn subscribe_as<F>(&self, feature: &str, name: EventName, handler: F) -> SubscriptionToken
    where
        F: Fn(&AppEvent) -> HandlerResult + 'static,
    {
        self.register(Some(feature.to_string()), name, Box::new(handler))
    }

    /// Register by name string. Unrecognized names are accepted and yield
    /// an inert token; nothing is ever delivered to such a handler.
    pub fn subscribe_named<F>(&self, name: &str, handler: F) -> SubscriptionToken
    where
        F: Fn(&AppEvent) -> HandlerResult + 'static,
    {
        match name.parse::<EventName>() {
            Ok(name) => self.subscribe(name, handler),
            Err(err) => {
                debug!("[EventChannel] {err}; subscription ignored");
                SubscriptionToken::inert()
            }
        }
    }

    fn register(&self, feature: Option<String>, name: EventName, handler: Box<Handler>) -> SubscriptionToken {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.by_name.entry(name).or_default().push(Rc::new(Registration {
            id,
            feature,
            live: Cell::new(true),
            handler,
        }));
        debug!("[EventChannel] subscribed #{id} to {name}");

        SubscriptionToken {
            name: Some(name),
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every handler registered under its name.
    ///
    /// Returns the number of handlers invoked, failed ones included.
    pub fn publish(&self, event: AppEvent) -> usize {
        let name = event.name();
        let snapshot: Vec<Rc<Registration>> = self
            .registry
            .borrow()
            .by_name
            .get(&name)
            .cloned()
            .unwrap_or_default();

        if snapshot.is_empty() {
            debug!("[EventChannel] {event} published with no subscribers");
            return 0;
        }

        debug!(
            "[EventChannel] publishing {event} ({}) to {} handler(s)",
            event.description(),
            snapshot.len()
        );
        let mut invoked = 0;
        for registration in snapshot {
            if !registration.live.get() {
                continue;
            }
            invoked += 1;
            if let Err(err) = invoke(&registration, &event) {
                error!("Error executing event {name}: {err}");
            }
        }
        invoked
    }

    /// Publish by name string with an untyped JSON payload.
    ///
    /// Unrecognized names are a silent no-op. A recognized name with a
    /// payload of the wrong shape is logged and dropped.
    pub fn publish_named(&self, name: &str, payload: Option<Value>) -> usize {
        let name = match name.parse::<EventName>() {
            Ok(name) => name,
            Err(err) => {
                debug!("[EventChannel] {err}; nothing delivered");
                return 0;
            }
        };
        match AppEvent::from_parts(name, payload) {
            Ok(event) => self.publish(event),
            Err(err) => {
                warn!("[EventChannel] {err}; nothing delivered");
                0
            }
        }
    }

    /// Bulk removal. Returns the number of registrations removed.
    pub fn unsubscribe_all(&self, scope: Scope<'_>) -> usize {
        if let Scope::Token(token) = scope {
            return usize::from(token.unsubscribe());
        }
        let detached = self.registry.borrow_mut().remove_where(|name, reg| match scope {
            Scope::Event(target) => name == target,
            Scope::Feature(feature) => reg.feature.as_deref() == Some(feature),
            Scope::FeatureEvent(feature, target) => {
                name == target && reg.feature.as_deref() == Some(feature)
            }
            Scope::Token(_) => false,
        });
        let removed = detached.len();
        drop(detached);
        debug!("[EventChannel] removed {removed} registration(s) for {scope:?}");
        removed
    }

    /// Remove every registration.
    pub fn clear(&self) {
        let detached = self.registry.borrow_mut().remove_where(|_, _| true);
        debug!("[EventChannel] cleared {} registration(s)", detached.len());
    }

    /// Number of live handlers registered under `name`.
    pub fn subscriber_count(&self, name: EventName) -> usize {
        self.registry
            .borrow()
            .by_name
            .get(&name)
            .map_or(0, |list| list.len())
    }

    /// Total number of live registrations.
    pub fn total_subscribers(&self) -> usize {
        self.registry.borrow().by_name.values().map(Vec::len).sum()
    }
}

impl EventChannel {
    /// A handle that does not keep the registration table alive.
    ///
    /// Handlers that need to publish capture this instead of a clone, so a
    /// registration never owns the channel it lives in.
    pub fn downgrade(&self) -> WeakChannel {
        WeakChannel {
            registry: Rc::downgrade(&self.registry),
        }
    }
}

/// Non-owning counterpart of [`EventChannel`].
#[derive(Clone, Default)]
pub struct WeakChannel {
    registry: Weak<RefCell<Registry>>,
}

impl WeakChannel {
    pub fn upgrade(&self) -> Option<EventChannel> {
        self.registry.upgrade().map(|registry| EventChannel { registry })
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        let mut map = f.debug_map();
        for (name, list) in registry.by_name.iter() {
            map.entry(name, &list.len());
        }
        map.finish()
    }
}

/// Run one handler, turning a panic into a `HandlerError`.
fn invoke(registration: &Registration, event: &AppEvent) -> HandlerResult {
    match panic::catch_unwind(AssertUnwindSafe(|| (registration.handler)(event))) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            Err(HandlerError::Panicked(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Box<dyn Fn(&AppEvent) -> HandlerResult>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_for_factory = Rc::clone(&log);
        let factory = move |label: &'static str| -> Box<dyn Fn(&AppEvent) -> HandlerResult> {
            let log = Rc::clone(&log_for_factory);
            Box::new(move |event: &AppEvent| {
                log.borrow_mut().push(format!("{label}:{event}"));
                Ok(())
            })
        };
        (log, factory)
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let channel = EventChannel::new();
        assert_eq!(channel.publish(AppEvent::UserLoggedOut), 0);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let channel = EventChannel::new();
        let (log, handler) = recorder();
        let _a = channel.subscribe(EventName::NavbarAccessChanged, handler("a"));
        let _b = channel.subscribe(EventName::NavbarAccessChanged, handler("b"));
        let _c = channel.subscribe(EventName::NavbarAccessChanged, handler("c"));

        assert_eq!(channel.publish(AppEvent::NavbarAccessChanged(true)), 3);
        assert_eq!(
            *log.borrow(),
            vec![
                "a:NavbarAccessChanged(true)",
                "b:NavbarAccessChanged(true)",
                "c:NavbarAccessChanged(true)",
            ]
        );
    }

    #[test]
    fn test_only_matching_name_is_delivered() {
        let channel = EventChannel::new();
        let (log, handler) = recorder();
        let _t = channel.subscribe(EventName::UserLoggedIn, handler("login"));

        channel.publish(AppEvent::UserLoggedOut);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_failing_handler_does_not_stop_delivery() {
        let channel = EventChannel::new();
        let (log, handler) = recorder();
        let _a = channel.subscribe(EventName::UserLoggedOut, |_| Err(HandlerError::msg("boom")));
        let _b = channel.subscribe(EventName::UserLoggedOut, handler("b"));

        assert_eq!(channel.publish(AppEvent::UserLoggedOut), 2);
        assert_eq!(*log.borrow(), vec!["b:UserLoggedOut"]);
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let channel = EventChannel::new();
        let (log, handler) = recorder();
        let _a = channel.subscribe(EventName::UserLoggedOut, |_| panic!("handler exploded"));
        let _b = channel.subscribe(EventName::UserLoggedOut, handler("b"));

        channel.publish(AppEvent::UserLoggedOut);
        assert_eq!(*log.borrow(), vec!["b:UserLoggedOut"]);
    }

    #[test]
    fn test_token_unsubscribe_is_idempotent() {
        let channel = EventChannel::new();
        let (log, handler) = recorder();
        let token = channel.subscribe(EventName::SidebarToggleRequested, handler("x"));

        assert!(token.is_subscribed());
        assert!(token.unsubscribe());
        assert!(!token.unsubscribe());
        assert!(!token.is_subscribed());

        assert_eq!(channel.publish(AppEvent::SidebarToggleRequested), 0);
        assert!(log.borrow().is_empty());
        assert_eq!(channel.subscriber_count(EventName::SidebarToggleRequested), 0);
    }

    #[test]
    fn test_token_removes_only_its_registration() {
        let channel = EventChannel::new();
        let (log, handler) = recorder();
        let first = channel.subscribe(EventName::UserLoggedOut, handler("first"));
        let _second = channel.subscribe(EventName::UserLoggedOut, handler("second"));

        first.unsubscribe();
        channel.publish(AppEvent::UserLoggedOut);
        assert_eq!(*log.borrow(), vec!["second:UserLoggedOut"]);
    }

    #[test]
    fn test_handler_added_during_publish_misses_that_event() {
        let channel = EventChannel::new();
        let calls = Rc::new(Cell::new(0));
        let inner_channel = channel.clone();
        let inner_calls = Rc::clone(&calls);
        let _outer = channel.subscribe(EventName::UserLoggedIn, move |_| {
            let calls = Rc::clone(&inner_calls);
            let token = inner_channel.subscribe(EventName::UserLoggedIn, move |_| {
                calls.set(calls.get() + 1);
                Ok(())
            });
            std::mem::forget(token);
            Ok(())
        });

        channel.publish(AppEvent::UserLoggedIn(None));
        assert_eq!(calls.get(), 0);

        channel.publish(AppEvent::UserLoggedIn(None));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_handler_removed_during_publish_is_not_invoked() {
        let channel = EventChannel::new();
        let (log, handler) = recorder();
        let victim: Rc<RefCell<Option<SubscriptionToken>>> = Rc::new(RefCell::new(None));

        let victim_for_first = Rc::clone(&victim);
        let _first = channel.subscribe(EventName::UserLoggedOut, move |_| {
            if let Some(token) = victim_for_first.borrow().as_ref() {
                token.unsubscribe();
            }
            Ok(())
        });
        *victim.borrow_mut() = Some(channel.subscribe(EventName::UserLoggedOut, handler("victim")));

        assert_eq!(channel.publish(AppEvent::UserLoggedOut), 1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_reentrant_publish_is_delivered_synchronously() {
        let channel = EventChannel::new();
        let (log, handler) = recorder();
        let relay = channel.clone();
        let _relay = channel.subscribe(EventName::NavbarSetAccessRequested, move |event| {
            if let AppEvent::NavbarSetAccessRequested(value) = event {
                relay.publish(AppEvent::NavbarAccessChanged(*value));
            }
            Ok(())
        });
        let _listener = channel.subscribe(EventName::NavbarAccessChanged, handler("listener"));

        channel.publish(AppEvent::NavbarSetAccessRequested(true));
        assert_eq!(*log.borrow(), vec!["listener:NavbarAccessChanged(true)"]);
    }

    #[test]
    fn test_unsubscribe_all_by_event() {
        let channel = EventChannel::new();
        let (_log, handler) = recorder();
        let _a = channel.subscribe(EventName::UserLoggedIn, handler("a"));
        let _b = channel.subscribe(EventName::UserLoggedIn, handler("b"));
        let _c = channel.subscribe(EventName::UserLoggedOut, handler("c"));

        assert_eq!(channel.unsubscribe_all(Scope::Event(EventName::UserLoggedIn)), 2);
        assert_eq!(channel.subscriber_count(EventName::UserLoggedIn), 0);
        assert_eq!(channel.subscriber_count(EventName::UserLoggedOut), 1);
    }

    #[test]
    fn test_unsubscribe_all_by_feature() {
        let channel = EventChannel::new();
        let (log, handler) = recorder();
        let _a = channel.subscribe_as("navbar", EventName::UserLoggedIn, handler("navbar"));
        let _b = channel.subscribe_as("navbar", EventName::UserLoggedOut, handler("navbar"));
        let _c = channel.subscribe_as("sidebar", EventName::UserLoggedIn, handler("sidebar"));

        assert_eq!(channel.unsubscribe_all(Scope::Feature("navbar")), 2);
        channel.publish(AppEvent::UserLoggedIn(None));
        assert_eq!(*log.borrow(), vec!["sidebar:UserLoggedIn"]);
    }

    #[test]
    fn test_unsubscribe_all_by_feature_and_event() {
        let channel = EventChannel::new();
        let (_log, handler) = recorder();
        let _a = channel.subscribe_as("navbar", EventName::UserLoggedIn, handler("a"));
        let _b = channel.subscribe_as("navbar", EventName::UserLoggedOut, handler("b"));

        assert_eq!(
            channel.unsubscribe_all(Scope::FeatureEvent("navbar", EventName::UserLoggedOut)),
            1
        );
        assert_eq!(channel.total_subscribers(), 1);
    }

    #[test]
    fn test_unsubscribe_all_by_token() {
        let channel = EventChannel::new();
        let (_log, handler) = recorder();
        let token = channel.subscribe(EventName::UserLoggedIn, handler("a"));

        assert_eq!(channel.unsubscribe_all(Scope::Token(&token)), 1);
        assert_eq!(channel.unsubscribe_all(Scope::Token(&token)), 0);
    }

    #[test]
    fn test_clear_removes_everything() {
        let channel = EventChannel::new();
        let (log, handler) = recorder();
        let token = channel.subscribe(EventName::UserLoggedIn, handler("a"));
        let _b = channel.subscribe(EventName::UserLoggedOut, handler("b"));

        channel.clear();
        assert_eq!(channel.total_subscribers(), 0);
        assert!(!token.is_subscribed());
        channel.publish(AppEvent::UserLoggedIn(None));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_unrecognized_names_are_silent() {
        let channel = EventChannel::new();
        let (log, handler) = recorder();
        let token = channel.subscribe_named("NotAnEvent", handler("ghost"));

        assert_eq!(token.event_name(), None);
        assert!(!token.unsubscribe());
        assert_eq!(channel.total_subscribers(), 0);
        assert_eq!(channel.publish_named("NotAnEvent", None), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_publish_named_parses_payload() {
        let channel = EventChannel::new();
        let (log, handler) = recorder();
        let _t = channel.subscribe_named("NavbarAccessChanged", handler("a"));

        assert_eq!(channel.publish_named("NavbarAccessChanged", Some(Value::Bool(false))), 1);
        assert_eq!(channel.publish_named("NavbarAccessChanged", None), 0);
        assert_eq!(*log.borrow(), vec!["a:NavbarAccessChanged(false)"]);
    }

    #[test]
    fn test_token_outliving_channel_is_harmless() {
        let token = {
            let channel = EventChannel::new();
            channel.subscribe(EventName::UserLoggedIn, |_| Ok(()))
        };
        assert!(!token.unsubscribe());
        assert!(!token.is_subscribed());
    }
}
