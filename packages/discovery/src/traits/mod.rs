//! Core trait abstractions for the discovery pipeline.
//!
//! These are the seams to the outside world: search API, web pages, LLM.

pub mod chat;
pub mod fetcher;
pub mod searcher;
