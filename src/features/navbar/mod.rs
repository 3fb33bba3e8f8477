//! Navbar feature: holds the authoritative access flag.

pub mod controller;
pub mod store;

pub use controller::NavbarController;
pub use store::{NavbarField, NavbarPatch, NavbarState, NavbarStore};
