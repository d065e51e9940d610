use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};

use super::SessionStore;

/// Token endpoint of the back office
pub const AUTH_ENDPOINT: &str = "/auth/login";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Nom d'utilisateur et mot de passe requis")]
    MissingCredentials,

    #[error("Identifiants invalides")]
    InvalidCredentials,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Impossible d'enregistrer la session: {0}")]
    Storage(String),
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Login and logout on top of the API client and its session store.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn session(&self) -> &SessionStore {
        self.client.session()
    }

    /// Exchange credentials for a bearer token and persist it.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let request = LoginRequest { username, password };
        let response: LoginResponse = match self.client.post_public(AUTH_ENDPOINT, &request).await {
            Ok(response) => response,
            Err(ApiError::Unauthorized) => {
                warn!(username, "Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                warn!(username, error = %e, "Login failed");
                return Err(e.into());
            }
        };

        if response.access.is_empty() {
            return Err(ApiError::InvalidResponse("empty access token".to_string()).into());
        }

        self.session()
            .save(&response.access)
            .map_err(|e| AuthError::Storage(format!("{:#}", e)))?;

        info!(username, "Logged in");
        Ok(response.access)
    }

    pub fn logout(&self) -> anyhow::Result<()> {
        self.session().logout()?;
        info!("Logged out");
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.session().token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }
}
