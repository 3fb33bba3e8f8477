//! Command handling.
//!
//! This module contains the dispatcher that turns text commands into
//! shell operations.

pub mod dispatcher;

pub use dispatcher::{dispatch, run_line, status_lines, Click, Command, NavbarButton, SidebarButton};
