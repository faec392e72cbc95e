//! Page fetch backends.

mod http;

pub use http::{HttpPageFetcher, DESKTOP_USER_AGENT};
