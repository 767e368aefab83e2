use tracing::{debug, info};

use super::gate::{decide_path, RoutingDecision, View};
use super::route::normalize;
use crate::identity::Session;
use crate::shell::{compose, Frame};

const HISTORY_LIMIT: usize = 128;

/// Result of one navigation or re-evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    /// Where the navigator ended up after following any redirect.
    pub location: String,
    pub redirected_from: Option<String>,
    pub frame: Frame,
}

/// Holds the current location and follows the gate's redirects.
///
/// The gate never redirects to a path that redirects again for the same
/// session, so at most one hop is followed; a second redirect renders the
/// not-found view rather than looping.
#[derive(Debug, Clone)]
pub struct Navigator {
    location: String,
    history: Vec<String>,
}

impl Default for Navigator {
    fn default() -> Self { Self::new("/") }
}

impl Navigator {
    pub fn new<S: Into<String>>(start: S) -> Self {
        let location = start.into();
        Self { history: vec![location.clone()], location }
    }

    pub fn location(&self) -> &str { &self.location }

    pub fn history(&self) -> &[String] { &self.history }

    /// Moves to `path` and evaluates it against `session`.
    pub fn navigate(&mut self, path: &str, session: &Session) -> Navigation {
        let requested = normalize(path).to_string();
        debug!(target: "murmur::router", path = %requested, session = %session.kind(), "navigate");
        self.settle_at(requested, session)
    }

    /// Re-evaluates the current location, e.g. after the session changed.
    pub fn reevaluate(&mut self, session: &Session) -> Navigation {
        let requested = self.location.clone();
        self.settle_at(requested, session)
    }

    fn settle_at(&mut self, requested: String, session: &Session) -> Navigation {
        let (location, redirected_from, view) = match decide_path(&requested, session) {
            RoutingDecision::Render(view) => (requested.clone(), None, view),
            RoutingDecision::Redirect(target) => {
                info!(target: "murmur::router", from = %requested, to = %target, session = %session.kind(), "redirect");
                let view = match decide_path(&target, session) {
                    RoutingDecision::Render(view) => view,
                    RoutingDecision::Redirect(again) => View::NotFound { path: again },
                };
                (target, Some(requested.clone()), view)
            }
        };
        if self.history.last() != Some(&location) {
            if self.history.len() == HISTORY_LIMIT {
                self.history.remove(0);
            }
            self.history.push(location.clone());
        }
        self.location = location.clone();
        let frame = compose(&location, view, session);
        Navigation { requested, location, redirected_from, frame }
    }
}
