use std::fmt;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";
pub const NOTIFICATIONS_PATH: &str = "/notifications";
const PROFILE_PREFIX: &str = "/profile/";

/// The client routes the shell knows about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Signup,
    Notifications,
    Profile { username: String },
}

impl Route {
    /// Parses a location into a route. Query string and fragment are ignored,
    /// as is a single trailing slash. Returns `None` for unknown paths.
    pub fn parse(location: &str) -> Option<Route> {
        let path = normalize(location);
        match path {
            HOME_PATH => Some(Route::Home),
            LOGIN_PATH => Some(Route::Login),
            SIGNUP_PATH => Some(Route::Signup),
            NOTIFICATIONS_PATH => Some(Route::Notifications),
            _ => {
                let username = path.strip_prefix(PROFILE_PREFIX)?;
                if username.is_empty() || username.contains('/') {
                    return None;
                }
                Some(Route::Profile { username: username.to_string() })
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => HOME_PATH.to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::Signup => SIGNUP_PATH.to_string(),
            Route::Notifications => NOTIFICATIONS_PATH.to_string(),
            Route::Profile { username } => format!("{}{}", PROFILE_PREFIX, username),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Login => "login",
            Route::Signup => "signup",
            Route::Notifications => "notifications",
            Route::Profile { .. } => "profile",
        }
    }

    /// `/login` and `/signup`: the side chrome is hidden there.
    pub fn is_auth_form(&self) -> bool { matches!(self, Route::Login | Route::Signup) }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.path()) }
}

/// Strips query, fragment and one trailing slash; an empty path means `/`.
pub fn normalize(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    let path = &location[..end];
    let path = if path.len() > 1 { path.strip_suffix('/').unwrap_or(path) } else { path };
    if path.is_empty() { HOME_PATH } else { path }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_routes() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse(""), Some(Route::Home));
        assert_eq!(Route::parse("/login"), Some(Route::Login));
        assert_eq!(Route::parse("/signup/"), Some(Route::Signup));
        assert_eq!(Route::parse("/notifications?tab=all"), Some(Route::Notifications));
        assert_eq!(Route::parse("/profile/alice#posts"), Some(Route::Profile { username: "alice".into() }));
    }

    #[test]
    fn rejects_unknown_paths() {
        for p in ["/profile", "/profile/", "/profile/a/b", "/settings", "login", "/LOGIN"] {
            assert_eq!(Route::parse(p), None, "{p}");
        }
    }

    #[test]
    fn path_round_trips_for_profiles() {
        let r = Route::Profile { username: "bob_1".into() };
        assert_eq!(r.path(), "/profile/bob_1");
        assert_eq!(Route::parse(&r.path()), Some(r));
    }
}
