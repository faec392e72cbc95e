//! Credential handling.

mod credentials;

pub use credentials::{Credentials, SecretString, MISTRAL_API_KEY, SERPER_API_KEY};
