//! HTTP client construction and error mapping.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::{ColloquyError, Result};

/// Build a reqwest client. Without a timeout, requests wait indefinitely.
///
/// A builder failure happens before any request and is reported as a
/// configuration error.
pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().pool_max_idle_per_host(1);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(builder_error)
}

fn builder_error(e: reqwest::Error) -> ColloquyError {
    ColloquyError::Configuration(format!("cannot build HTTP client: {e}"))
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let value = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
        ColloquyError::Configuration("API key contains characters not allowed in a header".into())
    })?;
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> ColloquyError {
    let message = extract_error_message(body).unwrap_or_else(|| body.to_string());
    match status {
        401 | 403 => ColloquyError::Authentication(message),
        _ => ColloquyError::api(status, message),
    }
}

/// Pull `error.message` out of an OpenAI-style error body.
fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
