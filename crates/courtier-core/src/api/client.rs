//! API client for the back office REST API.
//!
//! This module provides the `ApiClient` struct: it attaches the bearer token
//! from the session store to every request, classifies failures into
//! `ApiError`, and resets the session when the server answers 401.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::{header, Client as HttpClient, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::{redirect_to_login, Navigator, SessionStore};
use crate::config::Config;
use crate::models::{Agency, Client, Insurance};

use super::resource::{Resource, ResourceService};
use super::ApiError;

/// Record counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub clients: u64,
    pub agencies: u64,
    pub insurances: u64,
}

/// API client for the back office.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    session: SessionStore,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClient {
    /// Create a client for `config.api_base_url` using one fixed timeout for every call.
    pub fn new(config: &Config, session: SessionStore) -> anyhow::Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            session,
            navigator: None,
        })
    }

    /// Navigator told to go to the login route when the session is rejected.
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ===== Resources =====

    pub fn resource<T: Resource>(&self) -> ResourceService<T> {
        ResourceService::new(self.clone())
    }

    pub fn clients(&self) -> ResourceService<Client> {
        self.resource()
    }

    pub fn agencies(&self) -> ResourceService<Agency> {
        self.resource()
    }

    pub fn insurances(&self) -> ResourceService<Insurance> {
        self.resource()
    }

    /// Count every collection concurrently.
    pub async fn stats(&self) -> Result<Stats, ApiError> {
        let clients = self.clients();
        let agencies = self.agencies();
        let insurances = self.insurances();
        let (clients, agencies, insurances) =
            futures::try_join!(clients.count(), agencies.count(), insurances.count())?;

        Ok(Stats {
            clients,
            agencies,
            insurances,
        })
    }

    // ===== HTTP plumbing =====

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = self.session.token() {
            match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value, sending request without it"),
            }
        }
        headers
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        method: Method,
        url: &str,
        authenticated: bool,
    ) -> Result<Response, ApiError> {
        debug!(%method, url, "Sending request");

        let response = request.send().await.map_err(|e| {
            warn!(%method, url, error = %e, "Request failed without a response");
            ApiError::from(e)
        })?;

        self.check_response(response, authenticated).await
    }

    /// Check if response is successful, returning a classified error if not.
    async fn check_response(
        &self,
        response: Response,
        authenticated: bool,
    ) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %ApiError::truncate_body(&body), "Error response");

        let error = ApiError::from_status(status, &body);
        match error {
            ApiError::Unauthorized if authenticated => self.handle_unauthorized(),
            ApiError::Forbidden => warn!("Access forbidden"),
            ref e if e.is_server_error() => warn!(status = status.as_u16(), "Server error"),
            _ => {}
        }
        Err(error)
    }

    /// The server no longer accepts our token: forget it and go to login.
    fn handle_unauthorized(&self) {
        warn!("Session rejected by server, clearing token");
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
        if let Some(ref navigator) = self.navigator {
            redirect_to_login(navigator.as_ref());
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(url, error = %e, body = %ApiError::truncate_body(&text), "Failed to parse JSON response");
            ApiError::InvalidResponse(e.to_string())
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let request = self.http.get(&url).headers(self.auth_headers()).query(query);
        let response = self.execute(request, Method::GET, &url, true).await?;
        Self::read_json(response, &url).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let request = self.http.post(&url).headers(self.auth_headers()).json(body);
        let response = self.execute(request, Method::POST, &url, true).await?;
        Self::read_json(response, &url).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let request = self.http.put(&url).headers(self.auth_headers()).json(body);
        let response = self.execute(request, Method::PUT, &url, true).await?;
        Self::read_json(response, &url).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        let request = self.http.delete(&url).headers(self.auth_headers());
        self.execute(request, Method::DELETE, &url, true).await?;
        Ok(())
    }

    /// POST without a bearer token; a 401 here does not reset the session.
    pub(crate) async fn post_public<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let request = self
            .http
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(body);
        let response = self.execute(request, Method::POST, &url, false).await?;
        Self::read_json(response, &url).await
    }
}
