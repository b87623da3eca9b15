//! Universal Account Identity (UAI) Aggregate
//!
//! Links every credential method a user has ever authenticated with to one
//! stable `universal_id`. See `operations::resolve` for the non-blocking
//! resolution algorithm.

pub mod entity;
pub mod operations;
pub mod repository;

pub use entity::{CredentialLink, Uai};
pub use repository::UaiRepository;
