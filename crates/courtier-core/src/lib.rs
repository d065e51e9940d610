//! Courtier core library.
//!
//! Talks to the brokerage back office REST API on behalf of a front end:
//!
//! - `auth`: the session store holding the bearer token, its pluggable
//!   storage, and the login/logout service
//! - `api`: the HTTP client, the generic resource factory and the
//!   normalized error type
//! - `models`: `Client`, `Agency`, `Insurance` and their write forms
//! - `config`: on-disk configuration with environment overrides

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ResourceService};
pub use auth::{AuthService, SessionStore};
pub use config::Config;
