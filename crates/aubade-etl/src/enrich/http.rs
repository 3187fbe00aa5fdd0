//! Shared HTTP plumbing for the external-source clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{EnrichError, EnrichResult};

pub const USER_AGENT: &str = concat!(
    "aubade/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/oxur/aubade)"
);

/// Build an HTTP client with the project user-agent.
///
/// # Errors
/// Returns an error if the client cannot be created.
pub fn client() -> EnrichResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(EnrichError::from)
}

/// Send `request` and decode a JSON body.
///
/// 404 maps to [`EnrichError::NotFound`], 429 to
/// [`EnrichError::RateLimited`], any other non-success status to
/// [`EnrichError::Http`].
pub async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    source_name: &str,
) -> EnrichResult<T> {
    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(EnrichError::NotFound {
            entity: response.url().path().to_string(),
            source_name: source_name.to_string(),
        });
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(EnrichError::RateLimited {
            source_name: source_name.to_string(),
        });
    }
    if !status.is_success() {
        return Err(EnrichError::Http {
            source_name: source_name.to_string(),
            message: status.to_string(),
        });
    }

    response.json::<T>().await.map_err(|e| EnrichError::Parse {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

/// Trim a trailing slash so paths can be appended with `format!`.
pub fn base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
