use serde::{Deserialize, Serialize};

/// User record as returned by `/api/auth/me`, `/api/auth/login` and
/// `/api/auth/signup`. Only `username` is required; everything else is
/// display data and may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_img: Option<String>,
    #[serde(default)]
    pub cover_img: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: Vec<String>,
    #[serde(default)]
    pub following: Vec<String>,
}

impl Identity {
    pub fn new<S: Into<String>>(username: S) -> Self {
        Self { username: username.into(), ..Default::default() }
    }

    pub fn with_full_name<S: Into<String>>(mut self, full_name: S) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Full name when the backend supplied one, else the username.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => &self.username,
        }
    }

    /// Path of this user's profile route.
    pub fn profile_path(&self) -> String { format!("/profile/{}", self.username) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_shape() {
        let raw = r#"{
            "_id": "65f0",
            "username": "alice",
            "fullName": "Alice Liddell",
            "email": "alice@example.com",
            "followers": ["bob"],
            "following": [],
            "profileImg": "",
            "coverImg": ""
        }"#;
        let id: Identity = serde_json::from_str(raw).unwrap();
        assert_eq!(id.id.as_deref(), Some("65f0"));
        assert_eq!(id.username, "alice");
        assert_eq!(id.display_name(), "Alice Liddell");
        assert_eq!(id.followers, vec!["bob".to_string()]);
        assert_eq!(id.profile_path(), "/profile/alice");
    }

    #[test]
    fn minimal_record_is_enough() {
        let id: Identity = serde_json::from_str(r#"{"username":"bob"}"#).unwrap();
        assert_eq!(id.display_name(), "bob");
        assert!(id.email.is_none());
    }

    #[test]
    fn missing_username_is_rejected() {
        assert!(serde_json::from_str::<Identity>(r#"{"fullName":"Nobody"}"#).is_err());
    }
}
