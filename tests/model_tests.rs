//! Tests for the model layer (access state machine, menu, theme).

use dashgate::model::constants::*;
use dashgate::model::{default_menu, validate_menu, AccessState, AccessTransition, MenuItem, Theme};
use dashgate::MenuError;

#[test]
fn access_starts_denied() {
    assert_eq!(AccessState::default(), AccessState::Denied);
}

#[test]
fn toggle_flips_both_ways() {
    assert_eq!(AccessState::Denied.next(AccessTransition::Toggle), AccessState::Granted);
    assert_eq!(AccessState::Granted.next(AccessTransition::Toggle), AccessState::Denied);
}

#[test]
fn set_forces_regardless_of_current() {
    for current in [AccessState::Granted, AccessState::Denied] {
        assert_eq!(current.next(AccessTransition::Set(true)), AccessState::Granted);
        assert_eq!(current.next(AccessTransition::Set(false)), AccessState::Denied);
    }
}

#[test]
fn login_grants_and_logout_denies() {
    assert_eq!(AccessState::Denied.next(AccessTransition::LoggedIn), AccessState::Granted);
    assert_eq!(AccessState::Granted.next(AccessTransition::LoggedIn), AccessState::Granted);
    assert_eq!(AccessState::Granted.next(AccessTransition::LoggedOut), AccessState::Denied);
}

#[test]
fn access_labels() {
    assert_eq!(AccessState::Granted.label(), "Access Granted");
    assert_eq!(AccessState::Denied.label(), "Access Denied");
    assert!(bool::from(AccessState::from(true)));
}

#[test]
fn default_menu_is_valid_and_ordered() {
    let menu = default_menu();
    assert_eq!(validate_menu(&menu), Ok(()));
    assert_eq!(menu.first().map(|m| m.id.as_str()), Some("/"));
    assert_eq!(menu.len(), 5);
}

#[test]
fn menu_rejects_empty_id() {
    let items = vec![MenuItem::new(" ", "Blank")];
    assert_eq!(validate_menu(&items), Err(MenuError::EmptyId));
}

#[test]
fn theme_toggles() {
    assert_eq!(Theme::default(), Theme::Light);
    assert_eq!(Theme::Light.toggled(), Theme::Dark);
    assert!(Theme::Dark.is_dark());
    assert_eq!(Theme::Dark.to_string(), "dark");
}

#[test]
fn storage_constants() {
    assert_eq!(SIDEBAR_STORAGE_KEY, "sidebar-storage");
    assert_eq!(SIDEBAR_STORAGE_VERSION, 0);
    assert_eq!(REDIRECT_AFTER_LOGIN_KEY, "redirectAfterLogin");
}
