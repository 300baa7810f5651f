use std::env;

use thiserror::Error;

use sublingo_core::backend::DEFAULT_SERVER_URL;

/// Overrides the translation server location.
pub const SERVER_ENV_VAR: &str = "SUBLINGO_SERVER";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("server URL '{url}' must start with http:// or https://")]
pub struct ServerUrlError {
    pub url: String,
}

pub fn normalize_server_url(raw: &str) -> Result<String, ServerUrlError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ServerUrlError {
            url: raw.trim().to_string(),
        })
    }
}

/// Server URL from the environment, falling back to the local default the
/// backend ships with.
pub fn resolve_server_url() -> Result<String, ServerUrlError> {
    match env::var(SERVER_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => normalize_server_url(&value),
        _ => Ok(DEFAULT_SERVER_URL.to_string()),
    }
}
