//! Auth mutation executor: login, signup, logout.
//!
//! Each mutation validates locally, sends at most one request, and on success
//! refreshes the session exactly once after its own success handling has run.
//! Failures become a single error toast and leave the session alone. Only one
//! mutation may be outstanding at a time; a second trigger while one is
//! pending is ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::Backend;
use crate::error::AppError;
use crate::identity::{LoginForm, SignupForm};
use crate::notify::Notifier;
use crate::session::SessionResolver;

pub const MSG_LOGIN_OK: &str = "Login successful!";
pub const MSG_SIGNUP_OK: &str = "Account created successfully!";
pub const MSG_LOGOUT_OK: &str = "Logged out";
pub const MSG_LOGIN_FAILED: &str = "Login failed! Please check your credentials.";
pub const MSG_SIGNUP_FAILED: &str = "Signup failed! Please try again.";
pub const MSG_LOGOUT_FAILED: &str = "Logout failed!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Login,
    Signup,
    Logout,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Login => "login",
            MutationKind::Signup => "signup",
            MutationKind::Logout => "logout",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            MutationKind::Login => MSG_LOGIN_OK,
            MutationKind::Signup => MSG_SIGNUP_OK,
            MutationKind::Logout => MSG_LOGOUT_OK,
        }
    }

    fn failure_fallback(&self) -> &'static str {
        match self {
            MutationKind::Login => MSG_LOGIN_FAILED,
            MutationKind::Signup => MSG_SIGNUP_FAILED,
            MutationKind::Logout => MSG_LOGOUT_FAILED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Succeeded,
    /// Rejected by local validation; no request was sent.
    Invalid { message: String },
    /// The request was sent and failed.
    Failed { message: String },
    /// Another mutation was still pending; nothing happened.
    Busy,
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool { matches!(self, MutationOutcome::Succeeded) }
}

/// Clears the pending flag when the mutation finishes or its future is dropped.
struct PendingGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) { self.flag.store(false, Ordering::SeqCst); }
}

#[derive(Clone)]
pub struct AuthMutations {
    backend: Arc<dyn Backend>,
    resolver: SessionResolver,
    notifier: Notifier,
    pending: Arc<AtomicBool>,
}

impl AuthMutations {
    pub fn new(backend: Arc<dyn Backend>, resolver: SessionResolver, notifier: Notifier) -> Self {
        Self { backend, resolver, notifier, pending: Arc::new(AtomicBool::new(false)) }
    }

    /// True while a request is outstanding; the submit trigger is disabled.
    pub fn is_pending(&self) -> bool { self.pending.load(Ordering::SeqCst) }

    /// Label of the login form's submit trigger.
    pub fn login_label(&self) -> &'static str { if self.is_pending() { "Logging in..." } else { "Login" } }

    fn try_begin(&self, kind: MutationKind) -> Option<PendingGuard> {
        if self.pending.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            info!(target: "murmur::auth", mutation = kind.as_str(), "ignored: another mutation is pending");
            return None;
        }
        Some(PendingGuard { flag: Arc::clone(&self.pending) })
    }

    fn reject_locally(&self, kind: MutationKind, err: AppError) -> MutationOutcome {
        let message = err.user_message(kind.failure_fallback());
        info!(target: "murmur::auth", mutation = kind.as_str(), reason = %message, "rejected before sending");
        self.notifier.error(message.clone());
        MutationOutcome::Invalid { message }
    }

    fn fail(&self, kind: MutationKind, err: AppError) -> MutationOutcome {
        let message = err.user_message(kind.failure_fallback());
        warn!(target: "murmur::auth", mutation = kind.as_str(), error = %err, "mutation failed");
        self.notifier.error(message.clone());
        MutationOutcome::Failed { message }
    }

    fn succeed(&self, kind: MutationKind) -> MutationOutcome {
        self.notifier.success(kind.success_message());
        self.resolver.refresh();
        MutationOutcome::Succeeded
    }

    pub async fn login(&self, form: &LoginForm) -> MutationOutcome {
        let kind = MutationKind::Login;
        let Some(_guard) = self.try_begin(kind) else { return MutationOutcome::Busy; };
        let req = match form.validate() {
            Ok(r) => r,
            Err(e) => return self.reject_locally(kind, e),
        };
        match self.backend.login(&req).await {
            Ok(identity) => {
                info!(target: "murmur::auth", user = %identity.username, "login accepted");
                self.succeed(kind)
            }
            Err(e) => self.fail(kind, e),
        }
    }

    /// On success the form is cleared before the session refresh is issued.
    pub async fn signup(&self, form: &mut SignupForm) -> MutationOutcome {
        let kind = MutationKind::Signup;
        let Some(_guard) = self.try_begin(kind) else { return MutationOutcome::Busy; };
        let req = match form.validate() {
            Ok(r) => r,
            Err(e) => return self.reject_locally(kind, e),
        };
        match self.backend.signup(&req).await {
            Ok(identity) => {
                info!(target: "murmur::auth", user = %identity.username, "signup accepted");
                form.clear();
                self.succeed(kind)
            }
            Err(e) => self.fail(kind, e),
        }
    }

    pub async fn logout(&self) -> MutationOutcome {
        let kind = MutationKind::Logout;
        let Some(_guard) = self.try_begin(kind) else { return MutationOutcome::Busy; };
        match self.backend.logout().await {
            Ok(()) => {
                info!(target: "murmur::auth", "logout accepted");
                self.succeed(kind)
            }
            Err(e) => self.fail(kind, e),
        }
    }
}
