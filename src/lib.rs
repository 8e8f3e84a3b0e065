//! EduLog - school attendance client
//!
//! Library interface for the EduLog backend: session storage, the
//! refreshing HTTP client, role-gated navigation and cross-tab logout.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;

pub use api::ApiClient;
pub use auth::{RouteGuard, SessionContext, TokenStore};
pub use config::Config;
pub use error::Error;
