use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{Backend, Post, LOGIN_PATH, LOGOUT_PATH, ME_PATH, POSTS_ALL_PATH, SIGNUP_PATH};
use crate::config::ClientConfig;
use crate::error::{AppError, AppResult};
use crate::identity::{Identity, LoginRequest, SignupRequest};

/// reqwest-backed [`Backend`]. The client keeps a cookie jar so the session
/// cookie set by login/signup rides along on every later request.
#[derive(Clone)]
pub struct HttpBackend {
    cfg: ClientConfig,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(cfg: &ClientConfig) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(t) = cfg.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().map_err(|e| AppError::config(format!("http client: {}", e)))?;
        Ok(Self { cfg: cfg.clone(), client })
    }

    pub fn base(&self) -> &Url { &self.cfg.base_url }

    fn url(&self, path: &str) -> AppResult<Url> { self.cfg.endpoint(path) }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let resp = self.client.post(url).json(body).send().await?;
        decode_response(resp).await
    }
}

async fn decode_response<T: DeserializeOwned>(resp: reqwest::Response) -> AppResult<T> {
    let status = resp.status().as_u16();
    let bytes = resp.bytes().await?;
    decode_body(status, &bytes)
}

/// Non-2xx answers become `Rejected` with the body's `error` string when
/// there is one. A 2xx body whose `error` field is set (not null, false or
/// an empty string) is treated the same way.
pub(crate) fn decode_body<T: DeserializeOwned>(status: u16, bytes: &[u8]) -> AppResult<T> {
    if !(200..300).contains(&status) {
        return Err(AppError::rejected(status, error_field(bytes)));
    }
    let val: Value = serde_json::from_slice(bytes)?;
    if val.get("error").is_some_and(is_set) {
        return Err(AppError::rejected(status, error_field(bytes)));
    }
    Ok(serde_json::from_value(val)?)
}

fn is_set(v: &Value) -> bool {
    match v {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Extracts `{"error": "..."}` from a body, if present.
pub(crate) fn error_field(bytes: &[u8]) -> Option<String> {
    let v: Value = serde_json::from_slice(bytes).ok()?;
    match v.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn current_user(&self) -> AppResult<Identity> {
        let url = self.url(ME_PATH)?;
        let resp = self.client.get(url).send().await?;
        debug!(target: "murmur::api", status = resp.status().as_u16(), "GET {}", ME_PATH);
        decode_response(resp).await
    }

    async fn login(&self, req: &LoginRequest) -> AppResult<Identity> {
        debug!(target: "murmur::api", username = %req.username, "POST {}", LOGIN_PATH);
        self.post_json(LOGIN_PATH, req).await
    }

    async fn signup(&self, req: &SignupRequest) -> AppResult<Identity> {
        debug!(target: "murmur::api", username = %req.username, "POST {}", SIGNUP_PATH);
        self.post_json(SIGNUP_PATH, req).await
    }

    async fn logout(&self) -> AppResult<()> {
        let url = self.url(LOGOUT_PATH)?;
        let resp = self.client.post(url).send().await?;
        let status = resp.status().as_u16();
        debug!(target: "murmur::api", status, "POST {}", LOGOUT_PATH);
        if !(200..300).contains(&status) {
            let bytes = resp.bytes().await.unwrap_or_default();
            return Err(AppError::rejected(status, error_field(&bytes)));
        }
        Ok(())
    }

    async fn all_posts(&self) -> AppResult<Vec<Post>> {
        let url = self.url(POSTS_ALL_PATH)?;
        let resp = self.client.get(url).send().await?;
        decode_response(resp).await
    }
}
