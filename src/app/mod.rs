//! Application shell.
//!
//! Builds every store on one shared channel and exposes the operations the
//! command dispatcher drives: mount, visit, login, logout, shutdown.

pub mod shell;

pub use shell::{Shell, Visit};
