//! Access gate: a derived `Granted`/`Denied` mirror fed by the channel.

use std::rc::{Rc, Weak};

use log::debug;

use crate::error::HandlerError;
use crate::events::{AppEvent, EventChannel, EventName, HandlerResult, SubscriptionToken, WeakChannel};
use crate::features::EventListeners;
use crate::model::{AccessState, AccessTransition, ACCESS_GATE_FEATURE};
use crate::store::{assign, Store, StoreState, Subscriptions, WeakStore};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GateState {
    pub access: AccessState,
    /// Name carried by the last `UserLoggedIn`, cleared on logout.
    pub user: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateField {
    Access,
    User,
}

#[derive(Debug, Default)]
pub struct GatePatch {
    pub access: Option<AccessState>,
    pub user: Option<Option<String>>,
}

impl StoreState for GateState {
    type Field = GateField;
    type Patch = GatePatch;

    fn apply(&mut self, patch: GatePatch) -> Vec<GateField> {
        let mut changed = Vec::new();
        assign(&mut self.access, patch.access, GateField::Access, &mut changed);
        assign(&mut self.user, patch.user, GateField::User, &mut changed);
        changed
    }
}

/// Read-only view of access for the route guard.
///
/// The navbar store owns the authoritative flag; the gate only follows
/// `NavbarAccessChanged`, `UserLoggedIn` and `UserLoggedOut`.
#[derive(Debug, Clone)]
pub struct AccessGate {
    store: Store<GateState>,
    channel: EventChannel,
    subscriptions: Rc<Subscriptions>,
}

struct WeakGate {
    store: WeakStore<GateState>,
    subscriptions: Weak<Subscriptions>,
    channel: WeakChannel,
}

impl WeakGate {
    fn upgrade(&self) -> Option<AccessGate> {
        Some(AccessGate {
            store: self.store.upgrade()?,
            channel: self.channel.upgrade()?,
            subscriptions: self.subscriptions.upgrade()?,
        })
    }
}

impl AccessGate {
    pub fn new(channel: EventChannel) -> Self {
        Self {
            store: Store::new("AccessGate", GateState::default()),
            channel,
            subscriptions: Rc::new(Subscriptions::new()),
        }
    }

    pub fn state(&self) -> &Store<GateState> {
        &self.store
    }

    pub fn snapshot(&self) -> AccessState {
        self.store.read(|s| s.access)
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_granted()
    }

    pub fn user(&self) -> Option<String> {
        self.store.read(|s| s.user.clone())
    }

    fn apply(&self, transition: AccessTransition, user: Option<Option<String>>) {
        let next = self.snapshot().next(transition);
        self.store.set(GatePatch { access: Some(next), user });
        debug!("[AccessGate] {transition:?} -> {next}");
    }

    fn listen(
        &self,
        name: EventName,
        on_event: impl Fn(&AccessGate, &AppEvent) -> HandlerResult + 'static,
    ) -> SubscriptionToken {
        let weak = WeakGate {
            store: self.store.downgrade(),
            subscriptions: Rc::downgrade(&self.subscriptions),
            channel: self.channel.downgrade(),
        };
        self.channel.subscribe_as(ACCESS_GATE_FEATURE, name, move |event| match weak.upgrade() {
            Some(gate) => on_event(&gate, event),
            None => Ok(()),
        })
    }
}

impl EventListeners for AccessGate {
    fn initialize_event_listeners(&self) {
        let tokens = vec![
            self.listen(EventName::NavbarAccessChanged, |gate, event| match event {
                AppEvent::NavbarAccessChanged(value) => {
                    gate.apply(AccessTransition::Set(*value), None);
                    Ok(())
                }
                other => Err(HandlerError::msg(format!("access gate received {other}"))),
            }),
            self.listen(EventName::UserLoggedIn, |gate, event| {
                let user = match event {
                    AppEvent::UserLoggedIn(user) => user.clone(),
                    _ => None,
                };
                gate.apply(AccessTransition::LoggedIn, Some(user));
                Ok(())
            }),
            self.listen(EventName::UserLoggedOut, |gate, _| {
                gate.apply(AccessTransition::LoggedOut, Some(None));
                Ok(())
            }),
        ];
        self.subscriptions.replace(tokens);
    }

    fn cleanup(&self) {
        self.subscriptions.release();
    }

    fn is_listening(&self) -> bool {
        self.subscriptions.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_starts_denied() {
        let gate = AccessGate::new(EventChannel::new());
        assert_eq!(gate.snapshot(), AccessState::Denied);
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn test_gate_mirrors_access_events() {
        let channel = EventChannel::new();
        let gate = AccessGate::new(channel.clone());
        gate.initialize_event_listeners();

        channel.publish(AppEvent::NavbarAccessChanged(true));
        assert!(gate.is_authenticated());
        channel.publish(AppEvent::NavbarAccessChanged(false));
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn test_login_records_user_and_logout_clears_it() {
        let channel = EventChannel::new();
        let gate = AccessGate::new(channel.clone());
        gate.initialize_event_listeners();

        channel.publish(AppEvent::UserLoggedIn(Some("alice".into())));
        assert_eq!(gate.snapshot(), AccessState::Granted);
        assert_eq!(gate.user().as_deref(), Some("alice"));

        channel.publish(AppEvent::UserLoggedOut);
        assert_eq!(gate.snapshot(), AccessState::Denied);
        assert_eq!(gate.user(), None);
    }

    #[test]
    fn test_requests_do_not_move_the_gate() {
        let channel = EventChannel::new();
        let gate = AccessGate::new(channel.clone());
        gate.initialize_event_listeners();

        // Without a navbar store listening, nobody answers the request.
        channel.publish(AppEvent::NavbarSetAccessRequested(true));
        assert!(!gate.is_authenticated());
    }
}
