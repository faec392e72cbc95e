//! Data types for discovery requests and results.

pub mod config;
pub mod hit;
pub mod provider;
pub mod query;
