//! Client wiring: one backend, one session resolver, one navigator.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::{Backend, HttpBackend};
use crate::auth::{AuthMutations, MutationOutcome};
use crate::config::ClientConfig;
use crate::error::AppResult;
use crate::feed::{FeedQuery, FeedState};
use crate::identity::{LoginForm, Session, SignupForm};
use crate::notify::Notifier;
use crate::router::{Navigation, Navigator};
use crate::session::{SessionHandle, SessionResolver};
use crate::shell::Frame;

#[derive(Clone)]
pub struct App {
    resolver: SessionResolver,
    auth: AuthMutations,
    feed: FeedQuery,
    notifier: Notifier,
    navigator: Arc<Mutex<Navigator>>,
}

impl App {
    /// Client over HTTP, configured from `cfg`.
    pub fn new(cfg: &ClientConfig) -> AppResult<Self> {
        let backend = HttpBackend::new(cfg)?;
        debug!(target: "murmur::app", base = %backend.base(), "http backend ready");
        Ok(Self::with_backend(Arc::new(backend), cfg.transport_errors_anonymous))
    }

    pub fn with_backend(backend: Arc<dyn Backend>, transport_errors_anonymous: bool) -> Self {
        let notifier = Notifier::new();
        let resolver = SessionResolver::new(Arc::clone(&backend), transport_errors_anonymous);
        let auth = AuthMutations::new(Arc::clone(&backend), resolver.clone(), notifier.clone());
        let feed = FeedQuery::new(backend);
        Self { resolver, auth, feed, notifier, navigator: Arc::new(Mutex::new(Navigator::default())) }
    }

    /// Issues the initial session check. Must run inside a tokio runtime.
    pub fn start(&self) { self.resolver.refresh(); }

    pub fn session(&self) -> Session { self.resolver.current() }

    pub fn session_handle(&self) -> SessionHandle { self.resolver.handle() }

    pub fn resolver(&self) -> &SessionResolver { &self.resolver }

    pub fn auth(&self) -> &AuthMutations { &self.auth }

    pub fn feed(&self) -> &FeedQuery { &self.feed }

    pub fn notifier(&self) -> &Notifier { &self.notifier }

    pub fn location(&self) -> String { self.navigator.lock().location().to_string() }

    pub fn navigate(&self, path: &str) -> Navigation {
        let session = self.session();
        self.navigator.lock().navigate(path, &session)
    }

    /// Re-evaluates the current location against the current session.
    pub fn current(&self) -> Navigation {
        let session = self.session();
        self.navigator.lock().reevaluate(&session)
    }

    pub fn current_frame(&self) -> Frame { self.current().frame }

    /// Waits until the session has settled, then re-evaluates the location.
    pub async fn settle(&self) -> Navigation {
        self.resolver.handle().wait_resolved().await;
        self.current()
    }

    pub async fn login(&self, form: &LoginForm) -> MutationOutcome { self.auth.login(form).await }

    pub async fn signup(&self, form: &mut SignupForm) -> MutationOutcome { self.auth.signup(form).await }

    pub async fn logout(&self) -> MutationOutcome { self.auth.logout().await }

    pub async fn load_posts(&self) -> FeedState { self.feed.load().await }

    /// Spawns a task that re-evaluates the location on every session change,
    /// so a page that becomes forbidden redirects on its own.
    pub fn follow_session(&self) -> JoinHandle<()> {
        let mut rx = self.resolver.handle().subscribe();
        let navigator = Arc::clone(&self.navigator);
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let session = rx.borrow_and_update().clone();
                let nav = navigator.lock().reevaluate(&session);
                debug!(target: "murmur::app", location = %nav.location, frame = %nav.frame, "session change applied");
            }
        })
    }
}
