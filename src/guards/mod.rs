//! Access gate and route guard.
//!
//! - [`gate`]: derived access state, fed by channel events
//! - [`route_guard`]: protected view or fallback, plus the remembered path

pub mod gate;
pub mod route_guard;

pub use gate::{AccessGate, GateField, GatePatch, GateState};
pub use route_guard::{GuardDecision, RouteGuard};
