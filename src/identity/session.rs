use std::fmt;

use super::user::Identity;

/// The client's belief about who is logged in.
///
/// Starts as `Unresolved`, settles to `Anonymous` or `Authenticated` once the
/// session check completes, and is forced back to `Unresolved` whenever a
/// login, signup or logout succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Unresolved,
    Anonymous,
    Authenticated { identity: Identity },
}

/// Fieldless view of [`Session`], used for table lookups and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    Unresolved,
    Anonymous,
    Authenticated,
}

impl Session {
    pub fn authenticated(identity: Identity) -> Self { Session::Authenticated { identity } }

    pub fn kind(&self) -> SessionKind {
        match self {
            Session::Unresolved => SessionKind::Unresolved,
            Session::Anonymous => SessionKind::Anonymous,
            Session::Authenticated { .. } => SessionKind::Authenticated,
        }
    }

    pub fn is_resolved(&self) -> bool { !matches!(self, Session::Unresolved) }

    pub fn is_authenticated(&self) -> bool { matches!(self, Session::Authenticated { .. }) }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated { identity } => Some(identity),
            _ => None,
        }
    }
}

impl SessionKind {
    pub const ALL: [SessionKind; 3] = [SessionKind::Unresolved, SessionKind::Anonymous, SessionKind::Authenticated];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Unresolved => "unresolved",
            SessionKind::Anonymous => "anonymous",
            SessionKind::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Authenticated { identity } => write!(f, "authenticated as {}", identity.username),
            other => f.write_str(other.kind().as_str()),
        }
    }
}
