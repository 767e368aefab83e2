pub mod error;
pub mod config;
pub mod logging;
pub mod identity;
pub mod api;
pub mod session;
pub mod notify;
pub mod auth;
pub mod router;
pub mod shell;
pub mod feed;
pub mod app;
pub mod cli;
pub mod server;
