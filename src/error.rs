//! Unified application error model and mapping helpers.
//! One error enum is shared by the client paths (HTTP backend, mutations,
//! feed queries) and the development backend, which maps it onto HTTP
//! statuses and `{ "error": ... }` bodies.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// Client-side input validation failed; no request was sent.
    #[error("{message}")]
    Validation { message: String },
    /// The backend answered with a non-2xx status.
    #[error("{}", rejected_display(.status, .message))]
    Rejected { status: u16, message: Option<String> },
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },
    /// Network level failure (connect, timeout, reset).
    #[error("transport error: {message}")]
    Transport { message: String },
    /// A response body could not be decoded.
    #[error("decode error: {message}")]
    Decode { message: String },
    #[error("config error: {message}")]
    Config { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

fn rejected_display(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(m) => format!("HTTP {}: {}", status, m),
        None => format!("HTTP {}", status),
    }
}

impl AppError {
    pub fn validation<S: Into<String>>(msg: S) -> Self { AppError::Validation { message: msg.into() } }
    pub fn rejected(status: u16, message: Option<String>) -> Self { AppError::Rejected { status, message } }
    pub fn unauthorized<S: Into<String>>(msg: S) -> Self { AppError::Unauthorized { message: msg.into() } }
    pub fn transport<S: Into<String>>(msg: S) -> Self { AppError::Transport { message: msg.into() } }
    pub fn decode<S: Into<String>>(msg: S) -> Self { AppError::Decode { message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { AppError::Config { message: msg.into() } }
    pub fn internal<S: Into<String>>(msg: S) -> Self { AppError::Internal { message: msg.into() } }

    pub fn code_str(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation",
            AppError::Rejected { .. } => "rejected",
            AppError::Unauthorized { .. } => "unauthorized",
            AppError::Transport { .. } => "transport",
            AppError::Decode { .. } => "decode",
            AppError::Config { .. } => "config",
            AppError::Internal { .. } => "internal",
        }
    }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Validation { .. } => 400,
            AppError::Rejected { status, .. } => *status,
            AppError::Unauthorized { .. } => 401,
            AppError::Transport { .. } => 503,
            AppError::Decode { .. } => 502,
            AppError::Config { .. } | AppError::Internal { .. } => 500,
        }
    }

    /// Message for a user-facing notification. Validation messages and
    /// backend-provided `error` strings pass through; everything else
    /// (transport, decode, bare statuses) collapses to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Validation { message } => message.clone(),
            AppError::Rejected { message: Some(m), .. } if !m.trim().is_empty() => m.clone(),
            _ => fallback.to_string(),
        }
    }

    /// True when the request never reached a backend verdict (connect,
    /// timeout, reset). A body that arrived but failed to decode is not one.
    pub fn is_transport(&self) -> bool { matches!(self, AppError::Transport { .. }) }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::decode(err.to_string())
        } else {
            AppError::transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self { AppError::decode(err.to_string()) }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
