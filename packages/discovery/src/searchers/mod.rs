//! Search backends.

mod serper;

pub use serper::SerperSearcher;
