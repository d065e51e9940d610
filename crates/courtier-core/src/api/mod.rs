//! REST API client module for the back office.
//!
//! This module provides the `ApiClient` for communicating with the back
//! office API and the `ResourceService` factory that exposes
//! `get_all / get_by_id / create / update / delete` for each collection.
//!
//! The API uses bearer token authentication obtained from `/auth/login`.

pub mod client;
pub mod error;
pub mod resource;

pub use client::{ApiClient, Stats};
pub use error::{ApiError, FieldErrors};
pub use resource::{ListQuery, ListResponse, Page, Resource, ResourceService};
