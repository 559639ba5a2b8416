//! HTTP utilities for Atlas REST API calls

use super::auth::Credentials;
use super::error::{AtlasError, Result};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const USER_AGENT: &str = concat!("atlasform/", env!("CARGO_PKG_VERSION"));

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Transport-level details of a completed call, for callers that need
/// status or headers (rate limit hints, request ids).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// Error body returned by the Atlas API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

fn api_error(status: StatusCode, body: &str) -> AtlasError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => AtlasError::Api {
            status,
            error_code: parsed.error_code,
            detail: parsed
                .detail
                .or(parsed.reason)
                .unwrap_or_else(|| sanitize_for_log(body)),
        },
        Err(_) => AtlasError::Api {
            status,
            error_code: None,
            detail: sanitize_for_log(body),
        },
    }
}

/// HTTP client wrapper for Atlas API calls
#[derive(Clone, Debug)]
pub struct AtlasHttpClient {
    client: Client,
}

impl AtlasHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client })
    }

    /// Send a request and return the raw body on success
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        credentials: &Credentials,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<(String, ApiResponse)> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        request = credentials.apply(request);

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        let meta = ApiResponse {
            status: response.status(),
            headers: response.headers().clone(),
        };
        let text = response.text().await?;

        if !meta.status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", meta.status, sanitize_for_log(&text));
            return Err(api_error(meta.status, &text));
        }

        Ok((text, meta))
    }

    /// Send a request and decode the JSON body into `T`.
    ///
    /// An empty success body yields `T::default()`, matching how the API
    /// answers some DELETE calls.
    pub async fn json<T, B>(
        &self,
        method: Method,
        url: &str,
        credentials: &Credentials,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<(T, ApiResponse)>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        let (text, meta) = self.send(method, url, credentials, query, body).await?;

        if text.trim().is_empty() {
            return Ok((T::default(), meta));
        }

        let value = serde_json::from_str(&text)?;
        Ok((value, meta))
    }

    /// Send a request whose response body is ignored
    pub async fn empty(
        &self,
        method: Method,
        url: &str,
        credentials: &Credentials,
    ) -> Result<ApiResponse> {
        let (_, meta) = self
            .send::<()>(method, url, credentials, &[], None)
            .await?;
        Ok(meta)
    }
}

/// Format an Atlas API error for display
/// Security: Sanitizes error messages to avoid leaking sensitive API details
pub fn format_atlas_error(error: &AtlasError) -> String {
    match error {
        AtlasError::Argument { .. } => return error.to_string(),
        AtlasError::Decode(_) => {
            return "Unexpected response from Atlas. The API may have changed.".to_string()
        }
        _ => {}
    }

    match error.status().map(|s| s.as_u16()) {
        Some(401) => {
            "Authentication failed. Check MONGODB_ATLAS_PUBLIC_KEY and MONGODB_ATLAS_PRIVATE_KEY."
                .to_string()
        }
        Some(403) => {
            "Permission denied. Check the API key's project roles and access list.".to_string()
        }
        Some(404) => "Resource not found.".to_string(),
        Some(409) => {
            "Resource conflict. The resource may already exist or be in use.".to_string()
        }
        Some(429) => "Rate limit exceeded. Please try again later.".to_string(),
        Some(400) => match error {
            AtlasError::Api { detail, .. } => format!("Invalid request: {}", detail),
            _ => "Invalid request. Check your parameters.".to_string(),
        },
        Some(500..=599) => "Atlas service temporarily unavailable. Please try again.".to_string(),
        _ => {
            // Truncate long error messages and remove potential sensitive data
            let error_str = error.to_string();
            let sanitized = error_str
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .take(80)
                .collect::<String>();

            if sanitized.len() < error_str.len() {
                format!("{}...", sanitized)
            } else {
                sanitized
            }
        }
    }
}
