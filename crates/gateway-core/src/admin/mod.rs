//! Admin Bypass Aggregate
//!
//! A single break-glass account, not a repository-backed entity — its
//! identity lives in configuration (`gateway_config::AdminBypassConfig`),
//! not a database row. See `operations::bypass_login`.

pub mod operations;
