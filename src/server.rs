//!
//! murmur development backend
//! --------------------------
//! In-memory axum server speaking the REST contract the client consumes:
//! `/api/auth/{me,login,signup,logout}` and `/api/posts/all`.
//!
//! Responsibilities:
//! - Session management with a simple HttpOnly cookie.
//! - Signup/login backed by argon2-hashed passwords in [`store::DevStore`].
//! - Errors as `{ "error": "..." }` bodies with the status from [`AppError`].
//! - Optional demo account and posts for manual runs.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::{LOGIN_PATH, LOGOUT_PATH, ME_PATH, POSTS_ALL_PATH, SIGNUP_PATH};
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::identity::{LoginRequest, SignupRequest};

pub mod store;

use store::DevStore;

pub const SESSION_COOKIE: &str = "murmur_session";

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<DevStore>>,
}

impl AppState {
    pub fn new(store: DevStore) -> Self { Self { store: Arc::new(RwLock::new(store)) } }

    pub fn store(&self) -> Arc<RwLock<DevStore>> { Arc::clone(&self.store) }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match &self {
            AppError::Validation { message } | AppError::Unauthorized { message } => message.clone(),
            AppError::Rejected { message: Some(m), .. } => m.clone(),
            other => {
                error!(target: "murmur::server", error = %other, "request failed");
                "Internal Server Error".to_string()
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Deserialized request bodies. Missing fields become empty strings so that
/// the store answers with its own validation message instead of a 422.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SignupPayload {
    email: String,
    username: String,
    full_name: String,
    password: String,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LoginPayload {
    username: String,
    password: String,
}

pub const MSG_BAD_BODY: &str = "Request body must be a JSON object";

/// Missing, mistyped or unparsable bodies answer `400 {error}` like every
/// other failure instead of axum's plain-text rejection.
fn body_error(rejection: JsonRejection) -> AppError {
    debug!(target: "murmur::server", status = rejection.status().as_u16(), detail = %rejection.body_text(), "request body rejected");
    AppError::validation(MSG_BAD_BODY)
}

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(s) = value.to_str() else { continue; };
        for part in s.split(';') {
            if let Some((k, v)) = part.trim().split_once('=') {
                if k == name && !v.is_empty() {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}

fn session_cookie(sid: &str) -> Result<HeaderValue, AppError> {
    // HttpOnly, scoped to /, SameSite=Strict. Not Secure: the dev backend is plain HTTP.
    HeaderValue::from_str(&format!("{}={}; HttpOnly; SameSite=Strict; Path=/", SESSION_COOKIE, sid))
        .map_err(|e| AppError::internal(e.to_string()))
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("murmur_session=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Strict; Path=/")
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let sid = parse_cookie(&headers, SESSION_COOKIE);
    let identity = state.store.read().await.me(sid.as_deref())?;
    Ok(Json(identity).into_response())
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(body_error)?;
    let req = LoginRequest { username: payload.username, password: payload.password };
    let result = state.store.write().await.login(&req);
    match result {
        Ok((identity, sid)) => {
            info!(target: "murmur::server", user = %identity.username, "login");
            Ok(([(header::SET_COOKIE, session_cookie(&sid)?)], Json(identity)).into_response())
        }
        Err(e) => {
            warn!(target: "murmur::server", user = %req.username, "login rejected");
            Err(e)
        }
    }
}

async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(body_error)?;
    let req = SignupRequest {
        email: payload.email,
        username: payload.username,
        full_name: payload.full_name,
        password: payload.password,
    };
    let (identity, sid) = state.store.write().await.signup(&req)?;
    info!(target: "murmur::server", user = %identity.username, "signup");
    Ok(([(header::SET_COOKIE, session_cookie(&sid)?)], Json(identity)).into_response())
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sid = parse_cookie(&headers, SESSION_COOKIE);
    state.store.write().await.logout(sid.as_deref());
    info!(target: "murmur::server", had_session = sid.is_some(), "logout");
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
        .into_response()
}

async fn all_posts(State(state): State<AppState>) -> Response {
    let posts = state.store.read().await.all_posts();
    Json(posts).into_response()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "murmur ok" }))
        .route(ME_PATH, get(me))
        .route(LOGIN_PATH, post(login))
        .route(SIGNUP_PATH, post(signup))
        .route(LOGOUT_PATH, post(logout))
        .route(POSTS_ALL_PATH, get(all_posts))
        .with_state(state)
}

fn build_state(seed_demo: bool) -> anyhow::Result<AppState> {
    let mut store = DevStore::new();
    if seed_demo {
        store.seed_demo().context("while seeding demo data")?;
        info!(target: "murmur::server", user = store::DEMO_USERNAME, "demo account seeded");
    }
    Ok(AppState::new(store))
}

pub async fn run_with_config(cfg: &ServerConfig) -> anyhow::Result<()> {
    let addr = cfg.socket_addr()?;
    let app = router(build_state(cfg.seed_demo)?);
    info!(target: "murmur::server", %addr, "starting development backend");
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Binds `bind:0` and serves in the background. Returns the bound address.
pub async fn spawn(bind: &str, seed_demo: bool) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let app = router(build_state(seed_demo)?);
    let listener = tokio::net::TcpListener::bind(format!("{}:0", bind)).await.context("binding ephemeral port")?;
    let addr = listener.local_addr()?;
    info!(target: "murmur::server", %addr, "development backend listening");
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(target: "murmur::server", "server error: {}", e);
        }
    });
    Ok((addr, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_parsing() {
        let mut h = HeaderMap::new();
        h.insert(header::COOKIE, HeaderValue::from_static("theme=dark; murmur_session=abc123; x=1"));
        assert_eq!(parse_cookie(&h, SESSION_COOKIE).as_deref(), Some("abc123"));
        assert_eq!(parse_cookie(&h, "missing"), None);

        let mut cleared = HeaderMap::new();
        cleared.insert(header::COOKIE, HeaderValue::from_static("murmur_session="));
        assert_eq!(parse_cookie(&cleared, SESSION_COOKIE), None);
    }

    #[test]
    fn error_responses_carry_status() {
        assert_eq!(AppError::validation("bad").into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::unauthorized("no").into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::internal("boom").into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
