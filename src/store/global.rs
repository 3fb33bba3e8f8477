//! Global presentation state shared by every feature.

use log::debug;

use super::{assign, Store, StoreState};
use crate::model::Theme;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlobalState {
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalField {
    Theme,
}

#[derive(Debug, Default)]
pub struct GlobalPatch {
    pub theme: Option<Theme>,
}

impl StoreState for GlobalState {
    type Field = GlobalField;
    type Patch = GlobalPatch;

    fn apply(&mut self, patch: GlobalPatch) -> Vec<GlobalField> {
        let mut changed = Vec::new();
        assign(&mut self.theme, patch.theme, GlobalField::Theme, &mut changed);
        changed
    }
}

/// Theme holder read by the navbar and sidebar.
#[derive(Debug, Clone)]
pub struct GlobalStore {
    store: Store<GlobalState>,
}

impl Default for GlobalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalStore {
    pub fn new() -> Self {
        Self {
            store: Store::new("GlobalStore", GlobalState::default()),
        }
    }

    pub fn state(&self) -> &Store<GlobalState> {
        &self.store
    }

    pub fn theme(&self) -> Theme {
        self.store.read(|s| s.theme)
    }

    pub fn set_theme(&self, theme: Theme) {
        debug!("[GlobalStore] theme -> {theme}");
        self.store.set(GlobalPatch { theme: Some(theme) });
    }

    pub fn toggle_theme(&self) -> Theme {
        let next = self.theme().toggled();
        self.set_theme(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme_is_light() {
        assert_eq!(GlobalStore::new().theme(), Theme::Light);
    }

    #[test]
    fn test_toggle_theme_flips() {
        let global = GlobalStore::new();
        assert_eq!(global.toggle_theme(), Theme::Dark);
        assert_eq!(global.theme(), Theme::Dark);
        assert_eq!(global.toggle_theme(), Theme::Light);
    }
}
