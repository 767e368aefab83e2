//! The single process-wide session cell.
//!
//! [`session_cell`] hands out exactly one [`SessionWriter`] and a cloneable
//! [`SessionHandle`]. Only the resolver owns the writer; every other component
//! reads or subscribes through a handle.

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::info;

use crate::identity::Session;

pub struct SessionWriter {
    tx: watch::Sender<Session>,
    last_settled: Mutex<Session>,
}

#[derive(Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<Session>,
}

/// Creates the cell in the `Unresolved` state.
pub fn session_cell() -> (SessionWriter, SessionHandle) {
    let (tx, rx) = watch::channel(Session::Unresolved);
    (SessionWriter { tx, last_settled: Mutex::new(Session::Unresolved) }, SessionHandle { rx })
}

impl SessionWriter {
    /// Publishes a settled value. Publishing `Unresolved` is what
    /// [`SessionWriter::invalidate`] is for.
    pub fn publish(&self, session: Session) {
        let kind = session.kind();
        let user = session.identity().map(|i| i.username.clone());
        if session.is_resolved() {
            *self.last_settled.lock() = session.clone();
        }
        let prev = self.tx.send_replace(session);
        info!(target: "murmur::session", from = %prev.kind(), to = %kind, user = ?user, "session settled");
    }

    /// Forces the cell back to `Unresolved` ahead of a re-fetch.
    pub fn invalidate(&self) {
        let prev = self.tx.send_replace(Session::Unresolved);
        if prev.is_resolved() {
            info!(target: "murmur::session", from = %prev.kind(), "session invalidated");
        }
    }

    /// Most recent resolved value, or `Unresolved` if none settled yet.
    pub fn last_settled(&self) -> Session { self.last_settled.lock().clone() }

    pub fn current(&self) -> Session { self.tx.borrow().clone() }
}

impl SessionHandle {
    pub fn current(&self) -> Session { self.rx.borrow().clone() }

    /// A fresh receiver for observers that want change notifications.
    pub fn subscribe(&self) -> watch::Receiver<Session> { self.rx.clone() }

    /// Resolves once the session leaves `Unresolved`. Returns immediately if
    /// it already has.
    pub async fn wait_resolved(&self) -> Session {
        let mut rx = self.rx.clone();
        if let Ok(s) = rx.wait_for(|s| s.is_resolved()).await {
            return s.clone();
        }
        // writer gone; report whatever was last published
        let last = rx.borrow().clone();
        last
    }
}
