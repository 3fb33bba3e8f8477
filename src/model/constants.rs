//! Application constants and default values.
//!
//! Storage keys, feature labels and the defaults every store starts from.

// === Store Defaults ===

/// Default navbar title.
pub const DEFAULT_TITLE: &str = "Dashboard";

/// Message rendered by the route guard when access is denied.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "You are not authorized to view this route";

// === Persisted Storage ===

/// Key under which the sidebar's persisted slice is stored.
pub const SIDEBAR_STORAGE_KEY: &str = "sidebar-storage";

/// Schema version written alongside the persisted sidebar slice.
pub const SIDEBAR_STORAGE_VERSION: u32 = 0;

/// Directory name under the user config dir.
pub const APP_DIR_NAME: &str = "dashgate";

/// File name of the persisted key-value storage.
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Environment variable overriding the storage file location.
pub const STORAGE_PATH_ENV: &str = "DASHGATE_STORAGE_PATH";

// === Session Storage ===

/// Session key holding the last path denied by the route guard.
pub const REDIRECT_AFTER_LOGIN_KEY: &str = "redirectAfterLogin";

// === Feature Labels ===

/// Channel label for navbar registrations.
pub const NAVBAR_FEATURE: &str = "navbar";

/// Channel label for sidebar registrations.
pub const SIDEBAR_FEATURE: &str = "sidebar";

/// Channel label for access gate registrations.
pub const ACCESS_GATE_FEATURE: &str = "access-gate";
