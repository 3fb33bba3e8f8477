//! Application domain model.
//!
//! Pure values with no event or storage dependencies: the access state
//! machine, sidebar menu items, the theme, and configuration constants.

pub mod access;
pub mod constants;
pub mod menu;
pub mod theme;

pub use access::{AccessState, AccessTransition};
pub use constants::*;
pub use menu::{default_menu, validate_menu, MenuItem};
pub use theme::Theme;
