//! Response handling shared by the aggregator clients.

use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;

use watson_core::errors::{Error, ProviderError, Result};

/// Request timeout for every outbound aggregator call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest slice of an error body kept in `ProviderError::Http`.
const ERROR_BODY_LIMIT: usize = 200;

pub(crate) fn client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder().timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

pub(crate) fn request_error(provider: &str, err: reqwest::Error) -> Error {
    ProviderError::Request {
        provider: provider.to_string(),
        message: err.to_string(),
    }
    .into()
}

/// Reads the body and decodes it as `T`, mapping non-2xx statuses to
/// `ProviderError::Http` with a truncated body.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    provider: &str,
    response: Response,
) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| request_error(provider, e))?;

    if !status.is_success() {
        return Err(ProviderError::Http {
            provider: provider.to_string(),
            status: status.as_u16(),
            body: truncate(&body),
        }
        .into());
    }

    serde_json::from_str(&body).map_err(|e| {
        ProviderError::Decode {
            provider: provider.to_string(),
            message: format!("{} - {}", e, truncate(&body)),
        }
        .into()
    })
}

fn truncate(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}
