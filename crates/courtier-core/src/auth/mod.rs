//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionStore`: the bearer token, persisted under `access_token`
//! - `TokenStorage`: where that token lives (file, keychain, memory)
//! - `AuthService`: login against `/auth/login` and logout
//! - `Navigator`: how the API client sends the user back to `/login`

pub mod navigation;
pub mod service;
pub mod session;
pub mod storage;

pub use navigation::{redirect_to_login, Navigator, RouteTracker, LOGIN_ROUTE};
pub use service::{AuthError, AuthService, AuthUser, LoginResponse};
pub use session::{SessionStore, AUTH_TOKEN_KEY};
pub use storage::{FileStorage, KeyringStorage, MemoryStorage, TokenStorage};
