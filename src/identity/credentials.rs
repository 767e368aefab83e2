//! Login and signup form state plus the client-side validation that runs
//! before any request leaves the process.

use std::fmt;

use serde::Serialize;

use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 6;

pub const MSG_LOGIN_REQUIRED: &str = "Username and Password are required!";
pub const MSG_SIGNUP_REQUIRED: &str = "All fields are required!";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters!";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match!";

/// Body of `POST /api/auth/login`.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /api/auth/signup`. The confirmation never goes on the wire.
#[derive(Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest").field("username", &self.username).field("password", &"***").finish()
    }
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new<S: Into<String>>(username: S, password: S) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    pub fn validate(&self) -> AppResult<LoginRequest> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(AppError::validation(MSG_LOGIN_REQUIRED));
        }
        Ok(LoginRequest { username: self.username.clone(), password: self.password.clone() })
    }

    pub fn clear(&mut self) { *self = Self::default(); }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// Checks run in a fixed order: required fields, length, confirmation.
    pub fn validate(&self) -> AppResult<SignupRequest> {
        let fields = [&self.email, &self.username, &self.full_name, &self.password, &self.confirm_password];
        if fields.iter().any(|f| f.is_empty()) {
            return Err(AppError::validation(MSG_SIGNUP_REQUIRED));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(MSG_PASSWORD_TOO_SHORT));
        }
        if self.password != self.confirm_password {
            return Err(AppError::validation(MSG_PASSWORD_MISMATCH));
        }
        Ok(SignupRequest {
            email: self.email.clone(),
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            password: self.password.clone(),
        })
    }

    pub fn clear(&mut self) { *self = Self::default(); }

    pub fn is_empty(&self) -> bool { *self == Self::default() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            email: "alice@example.com".into(),
            username: "alice".into(),
            full_name: "Alice Liddell".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn login_requires_both_fields() {
        assert_eq!(LoginForm::new("alice", "").validate().unwrap_err(), AppError::validation(MSG_LOGIN_REQUIRED));
        assert_eq!(LoginForm::new("", "pw").validate().unwrap_err(), AppError::validation(MSG_LOGIN_REQUIRED));
        let req = LoginForm::new("alice", "pw").validate().unwrap();
        assert_eq!(req.username, "alice");
    }

    #[test]
    fn signup_short_password_rejected() {
        let err = signup("abc", "abc").validate().unwrap_err();
        assert_eq!(err, AppError::validation(MSG_PASSWORD_TOO_SHORT));
    }

    #[test]
    fn signup_mismatch_rejected() {
        let err = signup("secret1", "secret2").validate().unwrap_err();
        assert_eq!(err, AppError::validation(MSG_PASSWORD_MISMATCH));
    }

    #[test]
    fn signup_missing_field_checked_first() {
        let mut form = signup("abc", "xyz");
        form.email.clear();
        assert_eq!(form.validate().unwrap_err(), AppError::validation(MSG_SIGNUP_REQUIRED));
    }

    #[test]
    fn signup_wire_shape_omits_confirmation() {
        let req = signup("secret1", "secret1").validate().unwrap();
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["fullName"], "Alice Liddell");
        assert!(v.get("confirmPassword").is_none());
        assert!(v.get("full_name").is_none());
    }

    #[test]
    fn password_is_redacted_in_debug() {
        let req = LoginForm::new("alice", "hunter22").validate().unwrap();
        assert!(!format!("{:?}", req).contains("hunter22"));
    }

    #[test]
    fn clear_resets_form() {
        let mut form = signup("secret1", "secret1");
        form.clear();
        assert!(form.is_empty());
    }
}
