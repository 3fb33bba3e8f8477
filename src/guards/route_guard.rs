//! Route guard for protected views.

use std::rc::Rc;

use log::{info, warn};
use serde_json::Value;

use super::gate::AccessGate;
use crate::model::REDIRECT_AFTER_LOGIN_KEY;
use crate::routes::View;
use crate::storage::KeyValueStorage;

/// What the shell should render for a protected path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render(View),
    Fallback { message: String, attempted: String },
}

impl GuardDecision {
    pub fn is_rendered(&self) -> bool {
        matches!(self, GuardDecision::Render(_))
    }
}

/// Renders the protected view while the gate is granted, the fallback
/// message otherwise.
///
/// Denied paths are remembered in session storage, last write wins. Nothing
/// navigates there automatically once access is granted.
pub struct RouteGuard {
    gate: AccessGate,
    session: Rc<dyn KeyValueStorage>,
    fallback_message: String,
}

impl std::fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard")
            .field("gate", &self.gate.snapshot())
            .field("fallback_message", &self.fallback_message)
            .finish()
    }
}

impl RouteGuard {
    pub fn new(gate: AccessGate, session: Rc<dyn KeyValueStorage>, fallback_message: impl Into<String>) -> Self {
        Self {
            gate,
            session,
            fallback_message: fallback_message.into(),
        }
    }

    pub fn fallback_message(&self) -> &str {
        &self.fallback_message
    }

    pub fn check(&self, path: &str, view: View) -> GuardDecision {
        if self.gate.is_authenticated() {
            return GuardDecision::Render(view);
        }
        info!("[RouteGuard] denied {path}");
        if let Err(err) = self.session.set_item(REDIRECT_AFTER_LOGIN_KEY, Value::String(path.to_string())) {
            warn!("[RouteGuard] could not record denied path: {err}");
        }
        GuardDecision::Fallback {
            message: self.fallback_message.clone(),
            attempted: path.to_string(),
        }
    }

    /// Last denied path, if any.
    pub fn pending_redirect(&self) -> Option<String> {
        match self.session.get_item(REDIRECT_AFTER_LOGIN_KEY) {
            Ok(Some(Value::String(path))) => Some(path),
            Ok(_) => None,
            Err(err) => {
                warn!("[RouteGuard] could not read denied path: {err}");
                None
            }
        }
    }

    /// Like [`pending_redirect`](Self::pending_redirect), but clears it.
    pub fn take_pending_redirect(&self) -> Option<String> {
        let path = self.pending_redirect()?;
        if let Err(err) = self.session.remove_item(REDIRECT_AFTER_LOGIN_KEY) {
            warn!("[RouteGuard] could not clear denied path: {err}");
        }
        Some(path)
    }
}
