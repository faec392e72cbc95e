//! Per-category query planning.
//!
//! A [`Specialisation`] decides which sites to trust, which queries to run
//! and in what order. Decoration additionally builds a curated online
//! section (see [`decoration`]).

pub mod category;
pub mod decoration;
pub mod vendor;
pub mod venue;

pub use category::{ServiceCategory, Specialisation};

/// Ordered search strings for one invocation.
///
/// Vendors only use `primary`. Venues run `primary` first and fall back to
/// `fallback` in a second, wider pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    pub primary: Vec<String>,
    pub fallback: Vec<String>,
}

impl QueryPlan {
    /// All queries, primary first.
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.primary.iter().chain(self.fallback.iter())
    }
}
