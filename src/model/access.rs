//! Access state machine shared by the navbar store and the access gate.

use std::fmt;

/// Two-state access flag. Starts `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessState {
    Granted,
    #[default]
    Denied,
}

/// Inputs that move the access state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTransition {
    /// Flip the current state.
    Toggle,
    /// Force `Granted` when true, `Denied` otherwise.
    Set(bool),
    /// Simulated login.
    LoggedIn,
    /// Simulated logout.
    LoggedOut,
}

impl AccessState {
    /// Next state after `transition`.
    pub fn next(self, transition: AccessTransition) -> Self {
        match transition {
            AccessTransition::Toggle => match self {
                AccessState::Granted => AccessState::Denied,
                AccessState::Denied => AccessState::Granted,
            },
            AccessTransition::Set(value) => AccessState::from(value),
            AccessTransition::LoggedIn => AccessState::Granted,
            AccessTransition::LoggedOut => AccessState::Denied,
        }
    }

    pub fn is_granted(self) -> bool {
        self == AccessState::Granted
    }

    /// Indicator label shown next to the navbar title.
    pub fn label(self) -> &'static str {
        match self {
            AccessState::Granted => "Access Granted",
            AccessState::Denied => "Access Denied",
        }
    }
}

impl From<bool> for AccessState {
    fn from(value: bool) -> Self {
        if value {
            AccessState::Granted
        } else {
            AccessState::Denied
        }
    }
}

impl From<AccessState> for bool {
    fn from(state: AccessState) -> Self {
        state.is_granted()
    }
}

impl fmt::Display for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessState::Granted => f.write_str("Granted"),
            AccessState::Denied => f.write_str("Denied"),
        }
    }
}
