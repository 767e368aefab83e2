//! Transient user-facing notifications (toasts).
//!
//! Mutations push here; the shell layer drains or subscribes. Entries expire
//! from the visible set after a fixed lifetime but stay in the bounded history
//! until drained.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{info, warn};

pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);
const HISTORY_CAP: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Notifier {
    queue: Arc<Mutex<VecDeque<Notification>>>,
    tx: broadcast::Sender<Notification>,
    next_id: Arc<AtomicU64>,
}

impl Default for Notifier {
    fn default() -> Self { Self::new() }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(HISTORY_CAP);
        Self { queue: Arc::new(Mutex::new(VecDeque::new())), tx, next_id: Arc::new(AtomicU64::new(1)) }
    }

    pub fn push<S: Into<String>>(&self, kind: ToastKind, message: S) -> Notification {
        let n = Notification {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            kind,
            message: message.into(),
            at: Utc::now(),
        };
        match kind {
            ToastKind::Success => info!(target: "murmur::toast", id = n.id, "{}", n.message),
            ToastKind::Error => warn!(target: "murmur::toast", id = n.id, "{}", n.message),
        }
        {
            let mut q = self.queue.lock();
            if q.len() == HISTORY_CAP {
                q.pop_front();
            }
            q.push_back(n.clone());
        }
        // no subscribers is fine
        let _ = self.tx.send(n.clone());
        n
    }

    pub fn success<S: Into<String>>(&self, message: S) -> Notification { self.push(ToastKind::Success, message) }

    pub fn error<S: Into<String>>(&self, message: S) -> Notification { self.push(ToastKind::Error, message) }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> { self.tx.subscribe() }

    /// Removes and returns everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<Notification> { self.queue.lock().drain(..).collect() }

    pub fn snapshot(&self) -> Vec<Notification> { self.queue.lock().iter().cloned().collect() }

    /// Entries younger than [`TOAST_LIFETIME`] at `now`.
    pub fn visible_at(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let lifetime = chrono::Duration::from_std(TOAST_LIFETIME).unwrap_or_else(|_| chrono::Duration::seconds(5));
        self.queue.lock().iter().filter(|n| now - n.at < lifetime).cloned().collect()
    }

    pub fn count(&self, kind: ToastKind) -> usize { self.queue.lock().iter().filter(|n| n.kind == kind).count() }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut q = self.queue.lock();
        let before = q.len();
        q.retain(|n| n.id != id);
        q.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_and_drain() {
        let n = Notifier::new();
        n.success("Login successful!");
        n.error("bad credentials");
        assert_eq!(n.count(ToastKind::Error), 1);
        assert_eq!(n.count(ToastKind::Success), 1);
        let drained = n.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].message, "bad credentials");
        assert!(n.drain().is_empty());
    }

    #[test]
    fn history_is_bounded() {
        let n = Notifier::new();
        for i in 0..(HISTORY_CAP + 10) {
            n.error(format!("e{}", i));
        }
        let all = n.snapshot();
        assert_eq!(all.len(), HISTORY_CAP);
        assert_eq!(all[0].message, "e10");
    }

    #[test]
    fn expiry_and_dismiss() {
        let n = Notifier::new();
        let a = n.success("a");
        assert_eq!(n.visible_at(a.at).len(), 1);
        assert!(n.visible_at(a.at + chrono::Duration::seconds(6)).is_empty());
        assert!(n.dismiss(a.id));
        assert!(!n.dismiss(a.id));
    }

    #[tokio::test]
    async fn subscribers_see_pushes() {
        let n = Notifier::new();
        let mut rx = n.subscribe();
        n.error("boom");
        let got = rx.recv().await.unwrap();
        assert_eq!(got.kind, ToastKind::Error);
        assert_eq!(got.message, "boom");
    }
}
