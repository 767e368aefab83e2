//! Route authorization gate: a pure function of the requested route and the
//! session kind.

use std::fmt;

use super::route::{Route, HOME_PATH, LOGIN_PATH};
use crate::identity::{Session, SessionKind};

/// What the shell should render in its main slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Global loading placeholder; replaces the whole view tree.
    Loading,
    /// Public landing page with the shared post list.
    Landing,
    Feed,
    LoginForm,
    SignupForm,
    Notifications,
    Profile { username: String },
    NotFound { path: String },
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Loading => "loading",
            View::Landing => "landing",
            View::Feed => "feed",
            View::LoginForm => "login-form",
            View::SignupForm => "signup-form",
            View::Notifications => "notifications",
            View::Profile { .. } => "profile",
            View::NotFound { .. } => "not-found",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Profile { username } => write!(f, "profile({})", username),
            View::NotFound { path } => write!(f, "not-found({})", path),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    Render(View),
    Redirect(String),
}

impl RoutingDecision {
    pub fn is_redirect(&self) -> bool { matches!(self, RoutingDecision::Redirect(_)) }
}

/// A requested location paired with the session it is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub path: String,
    pub session: Session,
}

impl RouteRequest {
    pub fn new<S: Into<String>>(path: S, session: Session) -> Self { Self { path: path.into(), session } }

    pub fn decide(&self) -> RoutingDecision { decide_path(&self.path, &self.session) }
}

/// The gate's decision table.
pub fn decide(route: &Route, session: SessionKind) -> RoutingDecision {
    use RoutingDecision::{Redirect, Render};
    use SessionKind::{Anonymous, Authenticated, Unresolved};

    match (route, session) {
        (_, Unresolved) => Render(View::Loading),

        (Route::Home, Anonymous) => Render(View::Landing),
        (Route::Home, Authenticated) => Render(View::Feed),

        (Route::Login, Anonymous) => Render(View::LoginForm),
        (Route::Signup, Anonymous) => Render(View::SignupForm),
        (Route::Login | Route::Signup, Authenticated) => Redirect(HOME_PATH.to_string()),

        (Route::Notifications | Route::Profile { .. }, Anonymous) => Redirect(LOGIN_PATH.to_string()),
        (Route::Notifications, Authenticated) => Render(View::Notifications),
        (Route::Profile { username }, Authenticated) => Render(View::Profile { username: username.clone() }),
    }
}

/// Parses `path` and decides against `session`. Unknown paths render the
/// not-found view once the session has settled.
pub fn decide_path(path: &str, session: &Session) -> RoutingDecision {
    let kind = session.kind();
    match Route::parse(path) {
        Some(route) => decide(&route, kind),
        None if kind == SessionKind::Unresolved => RoutingDecision::Render(View::Loading),
        None => RoutingDecision::Render(View::NotFound { path: path.to_string() }),
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod gate_tests;
