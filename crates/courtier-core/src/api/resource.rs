//! Generic CRUD service over one REST collection.
//!
//! `ResourceService<T>` turns a collection path such as `/clients` into the
//! five operations every back office page needs, plus list helpers.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::Validate;

use super::{ApiClient, ApiError};

/// An entity exposed as a REST collection.
pub trait Resource: DeserializeOwned + Send {
    /// Write-side representation sent on create/update
    type Form: Serialize + Validate + Sync;

    /// Collection path relative to the API base URL
    const ENDPOINT: &'static str;
}

/// Paginated envelope returned by newer back office versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// A list endpoint answers with either a bare array or a `Page`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paginated(Page<T>),
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    /// Total number of records on the server (not just this page).
    pub fn total(&self) -> u64 {
        match self {
            ListResponse::Paginated(page) => page.count,
            ListResponse::Bare(items) => items.len() as u64,
        }
    }

    pub fn has_next(&self) -> bool {
        matches!(self, ListResponse::Paginated(page) if page.next.is_some())
    }

    pub fn into_records(self) -> Vec<T> {
        match self {
            ListResponse::Paginated(page) => page.results,
            ListResponse::Bare(items) => items,
        }
    }
}

/// Search, ordering, page and exact-match filters for list calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Field to order by; prefix with `-` for descending.
    pub fn ordering(mut self, field: impl Into<String>) -> Self {
        self.ordering = Some(field.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((field.into(), value.to_string()));
        self
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(ref search) = self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(ref ordering) = self.ordering {
            pairs.push(("ordering".to_string(), ordering.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

/// CRUD operations over a single collection.
#[derive(Clone)]
pub struct ResourceService<T> {
    client: ApiClient,
    endpoint: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Resource> ResourceService<T> {
    /// Service over the entity's own collection path.
    pub fn new(client: ApiClient) -> Self {
        Self::with_endpoint(client, T::ENDPOINT)
    }

    /// Validate `form` locally, then create the record.
    pub async fn create(&self, form: &T::Form) -> Result<T, ApiError> {
        form.validate()?;
        self.client
            .post(&self.endpoint, form)
            .await
            .inspect_err(|e| warn!(endpoint = %self.endpoint, error = %e, "Failed to create record"))
    }

    /// Validate `form` locally, then replace the record.
    pub async fn update(&self, id: i64, form: &T::Form) -> Result<T, ApiError> {
        form.validate()?;
        let path = self.item_path(id);
        self.client
            .put(&path, form)
            .await
            .inspect_err(|e| warn!(path = %path, error = %e, "Failed to update record"))
    }
}

impl<T: DeserializeOwned> ResourceService<T> {
    /// Service over an arbitrary collection path.
    pub fn with_endpoint(client: ApiClient, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let endpoint = format!("/{}", endpoint.trim_matches('/'));
        Self {
            client,
            endpoint,
            _marker: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn item_path(&self, id: i64) -> String {
        format!("{}/{}", self.endpoint, id)
    }

    /// Every record of the collection (first page when paginated).
    pub async fn get_all(&self) -> Result<Vec<T>, ApiError> {
        self.get_all_with(&ListQuery::default()).await
    }

    pub async fn get_all_with(&self, query: &ListQuery) -> Result<Vec<T>, ApiError> {
        Ok(self.list(query).await?.into_records())
    }

    /// Raw list response, keeping pagination metadata.
    pub async fn list(&self, query: &ListQuery) -> Result<ListResponse<T>, ApiError> {
        self.client
            .get(&self.endpoint, &query.to_pairs())
            .await
            .inspect_err(|e| warn!(endpoint = %self.endpoint, error = %e, "Failed to fetch list"))
    }

    /// Number of records the server holds for this collection.
    pub async fn count(&self) -> Result<u64, ApiError> {
        Ok(self.list(&ListQuery::default()).await?.total())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<T, ApiError> {
        let path = self.item_path(id);
        self.client
            .get(&path, &[])
            .await
            .inspect_err(|e| warn!(path = %path, error = %e, "Failed to fetch record"))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let path = self.item_path(id);
        self.client
            .delete(&path)
            .await
            .inspect_err(|e| warn!(path = %path, error = %e, "Failed to delete record"))
    }
}
