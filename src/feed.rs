//! Post feed query over `GET /api/posts/all`.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{Backend, Post};
use crate::session::{InflightMap, Ticket};

pub const FEED_QUERY_KEY: &str = "posts";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FeedState {
    /// Nothing requested yet.
    #[default]
    Idle,
    Loading,
    /// The backend answered with no posts.
    Empty,
    Loaded(Vec<Post>),
    Failed(String),
}

impl FeedState {
    pub fn is_settled(&self) -> bool { !matches!(self, FeedState::Idle | FeedState::Loading) }

    pub fn posts(&self) -> &[Post] {
        match self {
            FeedState::Loaded(posts) => posts,
            _ => &[],
        }
    }
}

/// Keyed, superseding fetch of the shared post list. Unlike the session
/// check, failures surface as [`FeedState::Failed`].
#[derive(Clone)]
pub struct FeedQuery {
    backend: Arc<dyn Backend>,
    inflight: Arc<InflightMap<&'static str>>,
    tx: Arc<watch::Sender<FeedState>>,
    rx: watch::Receiver<FeedState>,
}

impl FeedQuery {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (tx, rx) = watch::channel(FeedState::Idle);
        Self { backend, inflight: Arc::new(InflightMap::new()), tx: Arc::new(tx), rx }
    }

    pub fn state(&self) -> FeedState { self.rx.borrow().clone() }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> { self.rx.clone() }

    /// Starts a fetch, superseding any in flight. Must run inside a tokio
    /// runtime.
    pub fn refetch(&self) -> Ticket<&'static str> {
        let backend = Arc::clone(&self.backend);
        let loading = Arc::clone(&self.tx);
        let tx = Arc::clone(&self.tx);
        self.inflight.spawn_keyed(
            FEED_QUERY_KEY,
            move || {
                loading.send_replace(FeedState::Loading);
            },
            async move { backend.all_posts().await },
            move |outcome| {
                let state = match outcome {
                    Ok(posts) if posts.is_empty() => FeedState::Empty,
                    Ok(posts) => {
                        debug!(target: "murmur::feed", count = posts.len(), "posts loaded");
                        FeedState::Loaded(posts)
                    }
                    Err(err) => {
                        warn!(target: "murmur::feed", error = %err, "posts fetch failed");
                        FeedState::Failed(err.user_message("Something went wrong"))
                    }
                };
                tx.send_replace(state);
            },
        )
    }

    /// Fetches and waits for the settled state.
    pub async fn load(&self) -> FeedState {
        self.refetch();
        let mut rx = self.rx.clone();
        if let Ok(s) = rx.wait_for(|s| s.is_settled()).await {
            return s.clone();
        }
        let last = rx.borrow().clone();
        last
    }

    pub fn in_flight(&self) -> bool { self.inflight.in_flight(&FEED_QUERY_KEY) }

    pub fn discarded_count(&self) -> u64 { self.inflight.discarded() }
}
