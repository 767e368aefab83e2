//! Keyed in-flight request map.
//!
//! Every key has at most one live request. Starting a new request for a key
//! bumps the key's generation and aborts the previous task; a task's result is
//! applied only if its generation is still current when it completes. The
//! generation check and the apply step run under the same lock, so a
//! superseded result can never land after its successor started.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    pub key: K,
    pub generation: u64,
}

struct Entry {
    generation: u64,
    abort: Option<AbortHandle>,
}

pub struct InflightMap<K> {
    entries: Mutex<HashMap<K, Entry>>,
    next_generation: AtomicU64,
    issued: AtomicU64,
    aborted: AtomicU64,
    discarded: AtomicU64,
}

impl<K> Default for InflightMap<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
{
    fn default() -> Self { Self::new() }
}

impl<K> InflightMap<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
            issued: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Registers a new request for `key`, aborting whatever was in flight for
    /// it. `on_begin` runs under the map lock right after the generation bump.
    pub fn begin_with(&self, key: K, on_begin: impl FnOnce()) -> Ticket<K> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let mut map = self.entries.lock();
        if let Some(prev) = map.insert(key.clone(), Entry { generation, abort: None }) {
            if let Some(h) = prev.abort {
                h.abort();
                self.aborted.fetch_add(1, Ordering::SeqCst);
            }
            debug!(target: "murmur::inflight", key = ?key, superseded = prev.generation, generation, "request superseded");
        }
        on_begin();
        self.issued.fetch_add(1, Ordering::SeqCst);
        Ticket { key, generation }
    }

    pub fn begin(&self, key: K) -> Ticket<K> { self.begin_with(key, || {}) }

    /// Attaches the abort handle of the task serving `ticket`. If the ticket
    /// was superseded in the meantime the task is aborted right away.
    pub fn attach(&self, ticket: &Ticket<K>, handle: AbortHandle) {
        let mut map = self.entries.lock();
        match map.get_mut(&ticket.key) {
            Some(e) if e.generation == ticket.generation => e.abort = Some(handle),
            Some(_) => {
                handle.abort();
                self.aborted.fetch_add(1, Ordering::SeqCst);
            }
            // already completed
            None => {}
        }
    }

    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        self.entries.lock().get(&ticket.key).map(|e| e.generation == ticket.generation).unwrap_or(false)
    }

    /// Runs `apply` and clears the entry if `ticket` is still current.
    /// Returns false, without calling `apply`, for a stale ticket.
    pub fn complete(&self, ticket: &Ticket<K>, apply: impl FnOnce()) -> bool {
        let mut map = self.entries.lock();
        let current = map.get(&ticket.key).map(|e| e.generation == ticket.generation).unwrap_or(false);
        if !current {
            self.discarded.fetch_add(1, Ordering::SeqCst);
            debug!(target: "murmur::inflight", key = ?ticket.key, generation = ticket.generation, "stale result discarded");
            return false;
        }
        map.remove(&ticket.key);
        apply();
        true
    }

    pub fn in_flight(&self, key: &K) -> bool { self.entries.lock().contains_key(key) }

    pub fn len(&self) -> usize { self.entries.lock().len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Requests started since creation.
    pub fn issued(&self) -> u64 { self.issued.load(Ordering::SeqCst) }

    /// Tasks cancelled because a newer request for the same key started.
    pub fn aborted(&self) -> u64 { self.aborted.load(Ordering::SeqCst) }

    /// Results dropped because a newer request for the same key had started.
    pub fn discarded(&self) -> u64 { self.discarded.load(Ordering::SeqCst) }

    /// Starts `fut` for `key` on the tokio runtime, superseding any earlier
    /// request for that key, and hands its output to `apply` if still current.
    pub fn spawn_keyed<F, T, A>(self: &Arc<Self>, key: K, on_begin: impl FnOnce(), fut: F, apply: A) -> Ticket<K>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        A: FnOnce(T) + Send + 'static,
    {
        let ticket = self.begin_with(key, on_begin);
        let map = Arc::clone(self);
        let task_ticket = ticket.clone();
        let handle = tokio::spawn(async move {
            let out = fut.await;
            map.complete(&task_ticket, move || apply(out));
        });
        self.attach(&ticket, handle.abort_handle());
        ticket
    }
}
