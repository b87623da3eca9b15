//! Session Aggregate
//!
//! A platform-scoped live credential binding a hashed access/refresh token
//! pair to a user. See `entity::Session` for the validity invariant.

pub mod entity;
pub mod operations;
pub mod repository;

pub use entity::{Platform, Session};
pub use repository::SessionRepository;
