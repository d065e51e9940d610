//! Data models for back office entities.
//!
//! - `Agency`: a branch of the brokerage
//! - `Client`: a customer attached to an agency
//! - `Insurance`: a policy linking a client and an agency
//!
//! Each entity has a write-side form (no `id`, no server-computed fields)
//! that is validated locally before being sent.

pub mod agency;
pub mod client;
pub mod insurance;
pub mod validate;

pub use agency::{Agency, AgencyForm};
pub use client::{Client, ClientForm};
pub use insurance::{Insurance, InsuranceForm};
pub use validate::Validate;
