//! API Key Aggregate
//!
//! Long-lived, hashed bearer credentials for non-interactive and SDK
//! callers. See `entity::ApiKey` for the key format and validity invariant.

pub mod entity;
pub mod operations;
pub mod repository;

pub use entity::{AccessLevel, ApiKey};
pub use repository::ApiKeyRepository;
