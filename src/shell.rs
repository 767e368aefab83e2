//! View shell: wraps a routing decision in layout chrome that depends on the
//! session.

use std::fmt;

use crate::identity::Session;
use crate::router::{Route, View};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidePanel {
    /// Full navigation for a logged-in user, with a link to their profile.
    Authenticated { username: String },
    /// Reduced navigation offering login and signup.
    Anonymous,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chrome {
    pub navbar: bool,
    pub side_panel: Option<SidePanel>,
    pub right_panel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// The single global loading indicator. No chrome at all.
    Loading,
    Page { view: View, chrome: Chrome },
}

impl Frame {
    pub fn view(&self) -> Option<&View> {
        match self {
            Frame::Loading => None,
            Frame::Page { view, .. } => Some(view),
        }
    }

    pub fn chrome(&self) -> Option<&Chrome> {
        match self {
            Frame::Loading => None,
            Frame::Page { chrome, .. } => Some(chrome),
        }
    }
}

/// Chrome for `route` under `session`. The side panel is hidden on the auth
/// forms; the navbar and right panel need a logged-in user.
pub fn chrome_for(route: Option<&Route>, session: &Session) -> Chrome {
    let hide_side = route.map(Route::is_auth_form).unwrap_or(false);
    let side_panel = if hide_side {
        None
    } else {
        match session {
            Session::Authenticated { identity } => Some(SidePanel::Authenticated { username: identity.username.clone() }),
            _ => Some(SidePanel::Anonymous),
        }
    };
    let authed = session.is_authenticated();
    Chrome { navbar: authed, side_panel, right_panel: authed }
}

/// Composes the rendered view for `location` with its chrome. An unresolved
/// session, or a loading view, collapses to [`Frame::Loading`].
pub fn compose(location: &str, view: View, session: &Session) -> Frame {
    if !session.is_resolved() || view == View::Loading {
        return Frame::Loading;
    }
    let route = Route::parse(location);
    Frame::Page { view, chrome: chrome_for(route.as_ref(), session) }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Loading => f.write_str("[loading]"),
            Frame::Page { view, chrome } => {
                write!(f, "[{}]", view)?;
                if chrome.navbar {
                    f.write_str(" navbar")?;
                }
                match &chrome.side_panel {
                    Some(SidePanel::Authenticated { username }) => write!(f, " sidebar(@{})", username)?,
                    Some(SidePanel::Anonymous) => f.write_str(" sidebar(guest)")?,
                    None => {}
                }
                if chrome.right_panel {
                    f.write_str(" right-panel")?;
                }
                Ok(())
            }
        }
    }
}
