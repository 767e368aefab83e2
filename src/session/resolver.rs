use std::sync::Arc;

use tracing::{debug, info};

use super::inflight::{InflightMap, Ticket};
use super::store::{session_cell, SessionHandle, SessionWriter};
use crate::api::Backend;
use crate::error::AppError;
use crate::identity::Session;

/// Cache key of the session query.
pub const SESSION_QUERY_KEY: &str = "authUser";

/// Owns the session cell's writer and turns `GET /api/auth/me` outcomes
/// into settled [`Session`] values.
///
/// Each [`SessionResolver::refresh`] issues exactly one request. There is no
/// retry: a failed check settles to `Anonymous` and stays there until the next
/// explicit refresh. A refresh started while another is in flight aborts the
/// older request and its result, should it still arrive, is discarded.
#[derive(Clone)]
pub struct SessionResolver {
    backend: Arc<dyn Backend>,
    writer: Arc<SessionWriter>,
    handle: SessionHandle,
    inflight: Arc<InflightMap<&'static str>>,
    transport_errors_anonymous: bool,
}

impl SessionResolver {
    pub fn new(backend: Arc<dyn Backend>, transport_errors_anonymous: bool) -> Self {
        let (writer, handle) = session_cell();
        Self {
            backend,
            writer: Arc::new(writer),
            handle,
            inflight: Arc::new(InflightMap::new()),
            transport_errors_anonymous,
        }
    }

    pub fn handle(&self) -> SessionHandle { self.handle.clone() }

    pub fn current(&self) -> Session { self.handle.current() }

    /// Invalidates the session and starts a fresh check. Must be called from
    /// within a tokio runtime.
    pub fn refresh(&self) -> Ticket<&'static str> {
        let backend = Arc::clone(&self.backend);
        let writer = Arc::clone(&self.writer);
        let invalidate = Arc::clone(&self.writer);
        let transport_errors_anonymous = self.transport_errors_anonymous;
        let ticket = self.inflight.spawn_keyed(
            SESSION_QUERY_KEY,
            move || invalidate.invalidate(),
            async move { backend.current_user().await },
            move |outcome| {
                let settled = match outcome {
                    Ok(identity) => Session::authenticated(identity),
                    Err(err) => settle_failure(&err, writer.last_settled(), transport_errors_anonymous),
                };
                writer.publish(settled);
            },
        );
        debug!(target: "murmur::session", generation = ticket.generation, "session refresh issued");
        ticket
    }

    /// Refreshes and waits for the outcome.
    pub async fn resolve(&self) -> Session {
        self.refresh();
        self.handle.wait_resolved().await
    }

    pub fn in_flight(&self) -> bool { self.inflight.in_flight(&SESSION_QUERY_KEY) }

    /// Session checks issued so far.
    pub fn refresh_count(&self) -> u64 { self.inflight.issued() }

    /// In-flight checks cancelled by a newer refresh.
    pub fn aborted_count(&self) -> u64 { self.inflight.aborted() }

    /// Results dropped because a newer check superseded them.
    pub fn discarded_count(&self) -> u64 { self.inflight.discarded() }
}

/// Maps a failed check to a settled session. Everything collapses to
/// `Anonymous` unless the failure is a transport error and the caller asked to
/// keep the last settled value across those.
fn settle_failure(err: &AppError, last_settled: Session, transport_errors_anonymous: bool) -> Session {
    if !transport_errors_anonymous && err.is_transport() && last_settled.is_resolved() {
        info!(target: "murmur::session", error = %err, "session check failed in transport; keeping last settled session");
        return last_settled;
    }
    debug!(target: "murmur::session", error = %err, "session check failed; treating as anonymous");
    Session::Anonymous
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;

    #[test]
    fn failures_collapse_to_anonymous() {
        let alice = Session::authenticated(Identity::new("alice"));
        for err in [
            AppError::rejected(401, Some("Unauthorized: No Token Provided".into())),
            AppError::rejected(500, None),
            AppError::decode("expected value at line 1"),
            AppError::transport("connection refused"),
        ] {
            assert_eq!(settle_failure(&err, alice.clone(), true), Session::Anonymous, "{err}");
        }
    }

    #[test]
    fn transport_failure_can_keep_last_session() {
        let alice = Session::authenticated(Identity::new("alice"));
        assert_eq!(settle_failure(&AppError::transport("reset"), alice.clone(), false), alice);
        // non-transport failures still log out
        assert_eq!(settle_failure(&AppError::rejected(401, None), alice.clone(), false), Session::Anonymous);
        assert_eq!(settle_failure(&AppError::decode("garbage"), alice, false), Session::Anonymous);
        // nothing settled yet
        assert_eq!(settle_failure(&AppError::transport("reset"), Session::Unresolved, false), Session::Anonymous);
    }
}
