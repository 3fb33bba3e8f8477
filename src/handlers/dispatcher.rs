//! Text command dispatcher for the shell.
//!
//! Each input line is parsed into a [`Command`] and executed against a
//! [`Shell`]. The result is a list of output lines for the caller to print.
//!
//! # Architecture
//!
//! ```text
//! line → Command::from_str() → dispatch() → Shell / controllers → output
//! ```
//!
//! # Commands
//!
//! | Command                          | Effect                                   |
//! |----------------------------------|------------------------------------------|
//! | `mount <navbar\|sidebar>`        | activate a feature                       |
//! | `unmount <navbar\|sidebar>`      | deactivate a feature                     |
//! | `click navbar <toggle\|menu>`    | navbar buttons                           |
//! | `click sidebar <button>`         | `grant`, `deny`, `toggle`, `dark`, `collapse` |
//! | `login [user]` / `logout`        | simulated session                        |
//! | `visit <path>`                   | navigate, through the guard if protected |
//! | `publish <Name> [json]`          | raw publish on the channel               |
//! | `theme`                          | flip the global theme                    |
//! | `redirect`                       | consume the remembered denied path       |
//! | `status` / `help`                | print state / this list                  |

use std::str::FromStr;

use log::debug;
use serde_json::Value;

use crate::app::Shell;
use crate::error::CommandError;
use crate::events::EventName;
use crate::features::Feature;
use crate::guards::GuardDecision;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavbarButton {
    ToggleAccess,
    Menu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarButton {
    Grant,
    Deny,
    ToggleAccess,
    DarkMode,
    Collapse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    Navbar(NavbarButton),
    Sidebar(SidebarButton),
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Mount(Feature),
    Unmount(Feature),
    Click(Click),
    Login(Option<String>),
    Logout,
    Visit(String),
    Publish { name: String, payload: Option<Value> },
    Theme,
    Redirect,
    Status,
    Help,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandError::Empty);
        };

        match verb {
            "mount" => Ok(Command::Mount(feature_arg(words.next())?)),
            "unmount" => Ok(Command::Unmount(feature_arg(words.next())?)),
            "click" => {
                let feature = feature_arg(words.next())?;
                let button = words.next().ok_or(CommandError::MissingArgument("button"))?;
                parse_click(feature, button).map(Command::Click)
            }
            "login" => Ok(Command::Login(words.next().map(str::to_string))),
            "logout" => Ok(Command::Logout),
            "visit" => {
                let path = words.next().ok_or(CommandError::MissingArgument("path"))?;
                Ok(Command::Visit(path.to_string()))
            }
            "publish" => {
                let name = words.next().ok_or(CommandError::MissingArgument("event name"))?;
                let rest = remainder(line, 2);
                let payload = if rest.is_empty() {
                    None
                } else {
                    Some(serde_json::from_str(rest).map_err(|_| CommandError::InvalidPayload(rest.to_string()))?)
                };
                Ok(Command::Publish {
                    name: name.to_string(),
                    payload,
                })
            }
            "theme" => Ok(Command::Theme),
            "redirect" => Ok(Command::Redirect),
            "status" => Ok(Command::Status),
            "help" => Ok(Command::Help),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// The text after the first `skip` words, inner whitespace untouched.
fn remainder(line: &str, skip: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..skip {
        rest = rest.find(char::is_whitespace).map_or("", |at| &rest[at..]).trim_start();
    }
    rest.trim_end()
}

fn feature_arg(word: Option<&str>) -> Result<Feature, CommandError> {
    word.ok_or(CommandError::MissingArgument("feature"))?.parse()
}

fn parse_click(feature: Feature, button: &str) -> Result<Click, CommandError> {
    let click = match (feature, button) {
        (Feature::Navbar, "toggle") => Click::Navbar(NavbarButton::ToggleAccess),
        (Feature::Navbar, "menu") => Click::Navbar(NavbarButton::Menu),
        (Feature::Sidebar, "grant") => Click::Sidebar(SidebarButton::Grant),
        (Feature::Sidebar, "deny") => Click::Sidebar(SidebarButton::Deny),
        (Feature::Sidebar, "toggle") => Click::Sidebar(SidebarButton::ToggleAccess),
        (Feature::Sidebar, "dark") => Click::Sidebar(SidebarButton::DarkMode),
        (Feature::Sidebar, "collapse") => Click::Sidebar(SidebarButton::Collapse),
        _ => {
            return Err(CommandError::UnknownButton {
                feature: feature.to_string(),
                button: button.to_string(),
            })
        }
    };
    Ok(click)
}

/// Parse and run one line. Blank lines and `#` comments produce no output.
pub fn run_line(shell: &Shell, line: &str) -> Result<Vec<String>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(Vec::new());
    }
    let command: Command = line.parse()?;
    Ok(dispatch(shell, &command))
}

/// Execute a parsed command.
pub fn dispatch(shell: &Shell, command: &Command) -> Vec<String> {
    debug!("dispatching {command:?}");
    match command {
        Command::Mount(feature) => {
            shell.mount(*feature);
            vec![format!("{feature} mounted")]
        }
        Command::Unmount(feature) => {
            shell.unmount(*feature);
            vec![format!("{feature} unmounted")]
        }
        Command::Click(click) => dispatch_click(shell, *click),
        Command::Login(user) => {
            let notified = shell.login(user.clone());
            vec![format!("logged in ({notified} handler(s) notified)")]
        }
        Command::Logout => {
            let notified = shell.logout();
            vec![format!("logged out ({notified} handler(s) notified)")]
        }
        Command::Visit(path) => {
            let visit = shell.visit(path);
            match visit.decision {
                GuardDecision::Render(view) => vec![format!("{} => {}: {}", visit.path, view.title(), view.body())],
                GuardDecision::Fallback { message, .. } => vec![format!("{} => {message}", visit.path)],
            }
        }
        Command::Publish { name, payload } => {
            let delivered = shell.channel().publish_named(name, payload.clone());
            vec![format!("{name} delivered to {delivered} handler(s)")]
        }
        Command::Theme => vec![format!("theme: {}", shell.global().toggle_theme())],
        Command::Redirect => match shell.guard().take_pending_redirect() {
            Some(path) => vec![format!("pending redirect: {path}")],
            None => vec!["no pending redirect".to_string()],
        },
        Command::Status => status_lines(shell),
        Command::Help => help_lines(),
    }
}

fn dispatch_click(shell: &Shell, click: Click) -> Vec<String> {
    let navbar = shell.navbar();
    let sidebar = shell.sidebar();
    match click {
        Click::Navbar(NavbarButton::ToggleAccess) => {
            navbar.click_toggle_access();
        }
        Click::Navbar(NavbarButton::Menu) => {
            let open = navbar.click_menu();
            return vec![format!("navbar menu {}", if open { "open" } else { "closed" })];
        }
        Click::Sidebar(SidebarButton::Grant) => sidebar.click_grant(),
        Click::Sidebar(SidebarButton::Deny) => sidebar.click_deny(),
        Click::Sidebar(SidebarButton::ToggleAccess) => sidebar.click_toggle_access(),
        Click::Sidebar(SidebarButton::DarkMode) => {
            let dark = sidebar.click_dark_mode();
            return vec![format!("sidebar dark mode {}", on_off(dark))];
        }
        Click::Sidebar(SidebarButton::Collapse) => {
            let collapsed = sidebar.click_collapse();
            return vec![format!("sidebar {}", if collapsed { "collapsed" } else { "expanded" })];
        }
    }
    vec![
        format!("navbar: {}", navbar.access_indicator()),
        format!("sidebar: {}", sidebar.access_indicator()),
    ]
}

/// Snapshot of every store, one line per concern.
pub fn status_lines(shell: &Shell) -> Vec<String> {
    let navbar = shell.navbar();
    let sidebar = shell.sidebar();
    let sidebar_state = sidebar.store().snapshot();
    let mut lines = vec![
        format!(
            "navbar [{}] title={:?} {} button={:?} banner={} menu={}",
            mounted(navbar.is_active()),
            navbar.title(),
            navbar.access_indicator(),
            navbar.button_label(),
            on_off(navbar.denied_banner_visible()),
            if navbar.store().snapshot().is_open { "open" } else { "closed" },
        ),
        format!(
            "sidebar [{}] {} dark={} collapsed={} theme={}",
            mounted(sidebar.is_active()),
            sidebar.access_indicator(),
            on_off(sidebar_state.is_dark_sidebar),
            sidebar_state.is_collapsed,
            sidebar.theme(),
        ),
        format!(
            "gate: {} user={}",
            shell.gate().snapshot(),
            shell.gate().user().unwrap_or_else(|| "-".to_string())
        ),
        format!("theme: {}", shell.global().theme()),
        format!("subscribers: {}", shell.channel().total_subscribers()),
    ];
    if let Some(path) = shell.guard().pending_redirect() {
        lines.push(format!("pending redirect: {path}"));
    }
    lines
}

fn help_lines() -> Vec<String> {
    let mut lines: Vec<String> = [
        "mount|unmount <navbar|sidebar>",
        "click navbar <toggle|menu>",
        "click sidebar <grant|deny|toggle|dark|collapse>",
        "login [user] | logout",
        "visit <path>",
        "publish <EventName> [json payload]",
        "theme | redirect | status | help",
        "events:",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for name in EventName::ALL {
        let payload = if name.expects_bool() {
            " <true|false>"
        } else if name == EventName::UserLoggedIn {
            " [\"user\"]"
        } else {
            ""
        };
        lines.push(format!("  {name}{payload}"));
    }
    lines
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn mounted(value: bool) -> &'static str {
    if value {
        "mounted"
    } else {
        "unmounted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShellConfig;
    use serde_json::json;

    #[test]
    fn test_parse_commands() {
        assert_eq!("mount navbar".parse::<Command>(), Ok(Command::Mount(Feature::Navbar)));
        assert_eq!(
            "click sidebar grant".parse::<Command>(),
            Ok(Command::Click(Click::Sidebar(SidebarButton::Grant)))
        );
        assert_eq!("login".parse::<Command>(), Ok(Command::Login(None)));
        assert_eq!("login alice".parse::<Command>(), Ok(Command::Login(Some("alice".into()))));
        assert_eq!(
            "publish NavbarAccessChanged true".parse::<Command>(),
            Ok(Command::Publish {
                name: "NavbarAccessChanged".into(),
                payload: Some(json!(true))
            })
        );
        assert_eq!(
            r#"publish UserLoggedIn {"name": "bo"}"#.parse::<Command>(),
            Ok(Command::Publish {
                name: "UserLoggedIn".into(),
                payload: Some(json!({ "name": "bo" }))
            })
        );
    }

    #[test]
    fn test_publish_payload_keeps_inner_whitespace() {
        assert_eq!(
            r#"publish  UserLoggedIn   "ann  lee" "#.parse::<Command>(),
            Ok(Command::Publish {
                name: "UserLoggedIn".into(),
                payload: Some(json!("ann  lee"))
            })
        );
        assert_eq!(
            "publish UserLoggedOut   ".parse::<Command>(),
            Ok(Command::Publish {
                name: "UserLoggedOut".into(),
                payload: None
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!("jump".parse::<Command>(), Err(CommandError::Unknown("jump".into())));
        assert_eq!("mount footer".parse::<Command>(), Err(CommandError::UnknownFeature("footer".into())));
        assert_eq!("visit".parse::<Command>(), Err(CommandError::MissingArgument("path")));
        assert_eq!(
            "click navbar dark".parse::<Command>(),
            Err(CommandError::UnknownButton {
                feature: "navbar".into(),
                button: "dark".into()
            })
        );
        assert_eq!(
            "publish NavbarAccessChanged yes".parse::<Command>(),
            Err(CommandError::InvalidPayload("yes".into()))
        );
    }

    #[test]
    fn test_help_lists_every_event() {
        let help = help_lines();
        assert!(help.iter().any(|l| l == "  NavbarAccessChanged <true|false>"));
        assert!(help.iter().any(|l| l == "  SidebarToggleRequested"));
    }

    #[test]
    fn test_run_line_skips_blank_and_comments() {
        let shell = Shell::new(ShellConfig::default()).unwrap();
        assert!(run_line(&shell, "   ").unwrap().is_empty());
        assert!(run_line(&shell, "# setup").unwrap().is_empty());
    }

    #[test]
    fn test_sidebar_grant_then_visit_internal() {
        let shell = Shell::new(ShellConfig::default()).unwrap();
        let denied = run_line(&shell, "visit /about/internal").unwrap();
        assert_eq!(denied, vec!["/about/internal => You are not authorized to view this route"]);

        let clicked = run_line(&shell, "click sidebar grant").unwrap();
        assert_eq!(clicked, vec!["navbar: Access Granted", "sidebar: Access Granted"]);

        let granted = run_line(&shell, "visit /about/internal").unwrap();
        assert!(granted[0].starts_with("/about/internal => Internal"));
    }

    #[test]
    fn test_publish_unknown_name_delivers_nothing() {
        let shell = Shell::new(ShellConfig::default()).unwrap();
        assert_eq!(
            run_line(&shell, "publish navbaraccesschanged true").unwrap(),
            vec!["navbaraccesschanged delivered to 0 handler(s)"]
        );
    }

    #[test]
    fn test_redirect_is_consumed_once() {
        let shell = Shell::new(ShellConfig::default()).unwrap();
        run_line(&shell, "visit //about/internal/").unwrap();
        assert_eq!(run_line(&shell, "redirect").unwrap(), vec!["pending redirect: /about/internal"]);
        assert_eq!(run_line(&shell, "redirect").unwrap(), vec!["no pending redirect"]);
    }
}
