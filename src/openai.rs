//! OpenAI client configuration with sensible defaults.

use crate::error::{Result, TolkError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Create an OpenAI client with the default timeout.
pub fn create_client() -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
///
/// Fails immediately when the credential is missing instead of on the first request.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let api_key = api_key()?;

    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    Ok(Client::with_config(OpenAIConfig::new().with_api_key(api_key)).with_http_client(http_client))
}

/// Read the API key from the process environment.
pub fn api_key() -> Result<String> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        Ok(_) => Err(TolkError::Config(format!(
            "{} is empty. Set it with: export {}='sk-...'",
            API_KEY_VAR, API_KEY_VAR
        ))),
        Err(_) => Err(TolkError::Config(format!(
            "{} not set. Set it with: export {}='sk-...' or add it to a .env file",
            API_KEY_VAR, API_KEY_VAR
        ))),
    }
}
