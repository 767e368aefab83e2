//! In-memory users, sessions and posts for the development backend.
//!
//! Passwords are argon2-hashed with a random salt. Session ids are 16 random
//! bytes, hex encoded.

use std::collections::HashMap;
use std::fmt::Write as _;

use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use chrono::{DateTime, Duration, Utc};
use password_hash::{PasswordHash, SaltString};
use uuid::Uuid;

use crate::api::{Post, PostAuthor};
use crate::error::{AppError, AppResult};
use crate::identity::{Identity, LoginRequest, SignupRequest, MIN_PASSWORD_LEN};

pub const MSG_INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const MSG_INVALID_EMAIL: &str = "Invalid email format";
pub const MSG_USERNAME_TAKEN: &str = "Username is already taken";
pub const MSG_EMAIL_TAKEN: &str = "Email is already taken";
pub const MSG_PASSWORD_SHORT: &str = "Password must be at least 6 characters long";
pub const MSG_NO_SESSION: &str = "Unauthorized: No Token Provided";
pub const MSG_SESSION_EXPIRED: &str = "Unauthorized: Invalid Token";

pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo123";

#[derive(Debug, Clone)]
struct UserRecord {
    id: String,
    username: String,
    full_name: String,
    email: String,
    password_hash: String,
}

impl UserRecord {
    fn identity(&self) -> Identity {
        let mut identity = Identity::new(self.username.clone()).with_full_name(self.full_name.clone());
        identity.id = Some(self.id.clone());
        identity.email = Some(self.email.clone());
        identity
    }

    fn author(&self) -> PostAuthor {
        PostAuthor {
            id: Some(self.id.clone()),
            username: self.username.clone(),
            full_name: Some(self.full_name.clone()),
            profile_img: None,
        }
    }
}

#[derive(Debug, Clone)]
struct PostRecord {
    id: String,
    author_id: String,
    text: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct DevStore {
    users: HashMap<String, UserRecord>,
    /// username -> user id
    by_username: HashMap<String, String>,
    /// session id -> user id
    sessions: HashMap<String, String>,
    posts: Vec<PostRecord>,
}

fn argon2() -> Argon2<'static> {
    // Light parameters; this backend is for local development and tests.
    let params = Params::new(4096, 1, 1, None).unwrap_or_default();
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

fn hash_password(password: &str) -> AppResult<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| AppError::internal(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AppError::internal(e.to_string()))?;
    let phc = argon2().hash_password(password.as_bytes(), &salt).map_err(|e| AppError::internal(e.to_string()))?;
    Ok(phc.to_string())
}

fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => argon2().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

fn new_session_id() -> AppResult<String> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes).map_err(|e| AppError::internal(e.to_string()))?;
    let mut sid = String::with_capacity(32);
    for b in &bytes {
        let _ = write!(&mut sid, "{:02x}", b);
    }
    Ok(sid)
}

/// `local@domain.tld` with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else { return false; };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

impl DevStore {
    pub fn new() -> Self { Self::default() }

    pub fn user_count(&self) -> usize { self.users.len() }

    pub fn session_count(&self) -> usize { self.sessions.len() }

    /// Creates the account and opens a session for it.
    pub fn signup(&mut self, req: &SignupRequest) -> AppResult<(Identity, String)> {
        let email = req.email.trim();
        let username = req.username.trim();
        if email.is_empty() || username.is_empty() || req.full_name.trim().is_empty() || req.password.is_empty() {
            return Err(AppError::validation("All fields are required"));
        }
        if !is_valid_email(email) {
            return Err(AppError::validation(MSG_INVALID_EMAIL));
        }
        if self.by_username.contains_key(username) {
            return Err(AppError::validation(MSG_USERNAME_TAKEN));
        }
        if self.users.values().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(AppError::validation(MSG_EMAIL_TAKEN));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(MSG_PASSWORD_SHORT));
        }
        let record = UserRecord {
            id: Uuid::new_v4().simple().to_string(),
            username: username.to_string(),
            full_name: req.full_name.trim().to_string(),
            email: email.to_string(),
            password_hash: hash_password(&req.password)?,
        };
        let identity = record.identity();
        self.by_username.insert(record.username.clone(), record.id.clone());
        let sid = self.open_session(&record.id)?;
        self.users.insert(record.id.clone(), record);
        Ok((identity, sid))
    }

    /// Checks credentials and opens a session.
    pub fn login(&mut self, req: &LoginRequest) -> AppResult<(Identity, String)> {
        let record = self
            .by_username
            .get(req.username.trim())
            .and_then(|id| self.users.get(id))
            .filter(|u| verify_password(&u.password_hash, &req.password))
            .cloned()
            .ok_or_else(|| AppError::validation(MSG_INVALID_CREDENTIALS))?;
        let sid = self.open_session(&record.id)?;
        Ok((record.identity(), sid))
    }

    fn open_session(&mut self, user_id: &str) -> AppResult<String> {
        let sid = new_session_id()?;
        self.sessions.insert(sid.clone(), user_id.to_string());
        Ok(sid)
    }

    /// Drops the session. Unknown ids are fine.
    pub fn logout(&mut self, sid: Option<&str>) {
        if let Some(sid) = sid {
            self.sessions.remove(sid);
        }
    }

    pub fn me(&self, sid: Option<&str>) -> AppResult<Identity> {
        let sid = sid.ok_or_else(|| AppError::unauthorized(MSG_NO_SESSION))?;
        self.sessions
            .get(sid)
            .and_then(|id| self.users.get(id))
            .map(UserRecord::identity)
            .ok_or_else(|| AppError::unauthorized(MSG_SESSION_EXPIRED))
    }

    pub fn add_post(&mut self, username: &str, text: &str) -> AppResult<Post> {
        let author = self
            .by_username
            .get(username)
            .and_then(|id| self.users.get(id))
            .ok_or_else(|| AppError::validation(format!("unknown user {}", username)))?;
        // keep creation order strict even within one clock tick
        let created_at = match self.posts.last() {
            Some(p) if p.created_at >= Utc::now() => p.created_at + Duration::milliseconds(1),
            _ => Utc::now(),
        };
        let record = PostRecord {
            id: Uuid::new_v4().simple().to_string(),
            author_id: author.id.clone(),
            text: text.to_string(),
            created_at,
        };
        let post = self.render_post(&record);
        self.posts.push(record);
        Ok(post)
    }

    fn render_post(&self, record: &PostRecord) -> Post {
        Post {
            id: record.id.clone(),
            text: Some(record.text.clone()),
            img: None,
            user: self.users.get(&record.author_id).map(UserRecord::author),
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: Some(record.created_at),
        }
    }

    /// Every post, newest first.
    pub fn all_posts(&self) -> Vec<Post> {
        let mut records: Vec<&PostRecord> = self.posts.iter().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.into_iter().map(|r| self.render_post(r)).collect()
    }

    /// A demo account plus a few posts, for manual runs.
    pub fn seed_demo(&mut self) -> AppResult<()> {
        if self.by_username.contains_key(DEMO_USERNAME) {
            return Ok(());
        }
        let req = SignupRequest {
            email: "demo@example.com".into(),
            username: DEMO_USERNAME.into(),
            full_name: "Demo User".into(),
            password: DEMO_PASSWORD.into(),
        };
        let (_, sid) = self.signup(&req)?;
        self.logout(Some(&sid));
        for text in ["hello from the demo account", "second post", "posts come back newest first"] {
            self.add_post(DEMO_USERNAME, text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_req(username: &str, email: &str) -> SignupRequest {
        SignupRequest {
            email: email.into(),
            username: username.into(),
            full_name: "Alice A".into(),
            password: "secret1".into(),
        }
    }

    #[test]
    fn signup_then_me_and_login() {
        let mut store = DevStore::new();
        let (identity, sid) = store.signup(&signup_req("alice", "alice@example.com")).unwrap();
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.email.as_deref(), Some("alice@example.com"));
        assert_eq!(store.me(Some(&sid)).unwrap().username, "alice");

        store.logout(Some(&sid));
        assert!(matches!(store.me(Some(&sid)), Err(AppError::Unauthorized { .. })));
        assert!(matches!(store.me(None), Err(AppError::Unauthorized { .. })));

        let ok = store.login(&LoginRequest { username: "alice".into(), password: "secret1".into() });
        assert!(ok.is_ok());
        let bad = store.login(&LoginRequest { username: "alice".into(), password: "wrong!!".into() });
        assert_eq!(bad.unwrap_err(), AppError::validation(MSG_INVALID_CREDENTIALS));
    }

    #[test]
    fn duplicates_and_bad_email_are_rejected() {
        let mut store = DevStore::new();
        store.signup(&signup_req("alice", "alice@example.com")).unwrap();
        let e = store.signup(&signup_req("alice", "other@example.com")).unwrap_err();
        assert_eq!(e.user_message(""), MSG_USERNAME_TAKEN);
        let e = store.signup(&signup_req("bob", "ALICE@example.com")).unwrap_err();
        assert_eq!(e.user_message(""), MSG_EMAIL_TAKEN);
        let e = store.signup(&signup_req("bob", "not-an-email")).unwrap_err();
        assert_eq!(e.user_message(""), MSG_INVALID_EMAIL);
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("a@b@c.d"));
    }

    #[test]
    fn posts_newest_first() {
        let mut store = DevStore::new();
        store.seed_demo().unwrap();
        let posts = store.all_posts();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].text.as_deref(), Some("posts come back newest first"));
        assert_eq!(posts[2].author_name(), DEMO_USERNAME);
        // seeding twice is a no-op
        store.seed_demo().unwrap();
        assert_eq!(store.all_posts().len(), 3);
        assert_eq!(store.session_count(), 0);
    }
}
