use std::time::Duration;

use reqwest::blocking::{Client, Response};
use tracing::debug;

use crate::domain::LlmError;

use super::response_parsing::log_snippet;

pub(crate) fn build_client(provider: &str, timeout: Duration) -> Result<Client, LlmError> {
    Client::builder().timeout(timeout).build().map_err(|err| {
        LlmError::internal(format!("failed to create {provider} HTTP client: {err}"))
    })
}

pub(crate) fn map_transport_error(
    error: reqwest::Error,
    provider: &str,
    url: &str,
    timeout: Duration,
) -> LlmError {
    if error.is_timeout() {
        return LlmError::Timeout {
            provider: provider.to_string(),
            timeout_secs: timeout.as_secs(),
        };
    }
    if error.is_connect() {
        return LlmError::Connection {
            provider: provider.to_string(),
            url: url.to_string(),
        };
    }

    LlmError::Transport {
        message: format!("{provider} transport error: {error}"),
    }
}

/// Reads the whole body and turns non-2xx statuses into [`LlmError::HttpStatus`].
pub(crate) fn read_success_body(
    response: Response,
    provider: &str,
    url: &str,
    timeout: Duration,
) -> Result<String, LlmError> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|err| map_transport_error(err, provider, url, timeout))?;

    if !status.is_success() {
        debug!(
            provider,
            status = status.as_u16(),
            body = %log_snippet(&body),
            "provider returned non-success status"
        );
        return Err(LlmError::HttpStatus {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}
