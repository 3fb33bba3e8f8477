//! Route table and path resolution.
//!
//! Five pages, one of them protected. Lookup is exact on the normalized
//! path; anything else resolves to [`View::NotFound`].

use std::fmt;

/// A page the shell can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    About,
    Vision,
    Mission,
    Internal,
    NotFound,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::About => "About",
            View::Vision => "Vision",
            View::Mission => "Mission",
            View::Internal => "Internal",
            View::NotFound => "Not Found",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            View::Home => "Welcome to the dashboard.",
            View::About => "About this dashboard.",
            View::Vision => "Where we are going.",
            View::Mission => "What we do every day.",
            View::Internal => "Internal page: authorized staff only.",
            View::NotFound => "Nothing lives at this address.",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub view: View,
    /// Rendered only while access is granted.
    pub protected: bool,
}

const ROUTES: &[Route] = &[
    Route { path: "/", view: View::Home, protected: false },
    Route { path: "/about", view: View::About, protected: false },
    Route { path: "/about/vision", view: View::Vision, protected: false },
    Route { path: "/about/mision", view: View::Mission, protected: false },
    Route { path: "/about/internal", view: View::Internal, protected: true },
];

/// Outcome of looking a path up in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The normalized path.
    pub path: String,
    pub view: View,
    pub protected: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Router;

impl Router {
    pub fn new() -> Self {
        Router
    }

    pub fn routes(&self) -> &'static [Route] {
        ROUTES
    }

    pub fn resolve(&self, path: &str) -> Resolved {
        let path = normalize_path(path);
        match ROUTES.iter().find(|r| r.path == path) {
            Some(route) => Resolved {
                path,
                view: route.view,
                protected: route.protected,
            },
            None => Resolved {
                path,
                view: View::NotFound,
                protected: false,
            },
        }
    }
}

/// Collapse repeated slashes, drop a trailing slash, and ensure a leading one.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.trim().split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}
