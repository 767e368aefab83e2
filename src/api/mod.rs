//! REST backend contract.
//!
//! [`Backend`] is the seam between the client state machinery (resolver,
//! mutations, feed) and the transport. [`HttpBackend`] speaks the real
//! endpoints over reqwest; tests plug in scripted implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::identity::{Identity, LoginRequest, SignupRequest};

mod http;

pub use http::HttpBackend;

pub const ME_PATH: &str = "/api/auth/me";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const SIGNUP_PATH: &str = "/api/auth/signup";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const POSTS_ALL_PATH: &str = "/api/posts/all";

#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// `GET /api/auth/me`. Any `Err` means the caller could not establish an
    /// identity; callers decide how to interpret it.
    async fn current_user(&self) -> AppResult<Identity>;

    /// `POST /api/auth/login`.
    async fn login(&self, req: &LoginRequest) -> AppResult<Identity>;

    /// `POST /api/auth/signup`.
    async fn signup(&self, req: &SignupRequest) -> AppResult<Identity>;

    /// `POST /api/auth/logout`. No body contract beyond the status.
    async fn logout(&self) -> AppResult<()>;

    /// `GET /api/posts/all`.
    async fn all_posts(&self) -> AppResult<Vec<Post>>;
}

/// A feed entry. The backend owns this shape; only the fields the client
/// displays are modelled and all but the id are optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub user: Option<PostAuthor>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub comments: Vec<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub profile_img: Option<String>,
}

impl Post {
    pub fn author_name(&self) -> &str {
        self.user.as_ref().map(|u| u.username.as_str()).unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_decodes_with_sparse_fields() {
        let raw = r#"[
            {"_id":"p1","text":"hello","user":{"_id":"u1","username":"alice","fullName":"Alice"},
             "likes":["u2"],"comments":[],"createdAt":"2025-01-02T03:04:05Z"},
            {"_id":"p2"}
        ]"#;
        let posts: Vec<Post> = serde_json::from_str(raw).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].author_name(), "alice");
        assert_eq!(posts[0].likes.len(), 1);
        assert!(posts[0].created_at.is_some());
        assert_eq!(posts[1].author_name(), "unknown");
        assert!(posts[1].text.is_none());
    }
}
