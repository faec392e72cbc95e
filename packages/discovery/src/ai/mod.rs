//! LLM backends.

mod mistral;

pub use mistral::MistralChat;
