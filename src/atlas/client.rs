//! Atlas Client
//!
//! Main client for interacting with the Atlas Admin API, combining
//! credentials, base URL resolution and HTTP functionality.

use super::auth::Credentials;
use super::custom_db_roles::CustomDbRolesService;
use super::error::{AtlasError, Result};
use super::global_clusters::GlobalClustersService;
use super::http::{ApiResponse, AtlasHttpClient};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Default Atlas Admin API base URL
pub const DEFAULT_BASE_URL: &str = "https://cloud.mongodb.com/api/atlas/v1.0/";

/// Main Atlas client
#[derive(Clone, Debug)]
pub struct AtlasClient {
    base_url: Url,
    credentials: Credentials,
    http: AtlasHttpClient,
}

impl AtlasClient {
    /// Create a new Atlas client against `base_url`
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        // Relative joins drop the last segment unless the base ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        let base_url =
            Url::parse(&normalized).map_err(|e| AtlasError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            base_url,
            credentials,
            http: AtlasHttpClient::new()?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build an absolute URL from a path relative to the API base
    pub fn url(&self, path: &str) -> Result<String> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map(String::from)
            .map_err(|e| AtlasError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Issue a request and decode the JSON response
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<(T, ApiResponse)>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        self.http
            .json(method, &url, &self.credentials, query, body)
            .await
    }

    /// Issue a request that returns no meaningful body
    pub async fn request_empty(&self, method: Method, path: &str) -> Result<ApiResponse> {
        let url = self.url(path)?;
        self.http.empty(method, &url, &self.credentials).await
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// Global Clusters endpoints
    pub fn global_clusters(&self) -> GlobalClustersService {
        GlobalClustersService::new(self.clone())
    }

    /// Custom database role endpoints
    pub fn custom_db_roles(&self) -> CustomDbRolesService {
        CustomDbRolesService::new(self.clone())
    }
}

/// Percent-encode a single path segment
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Build a project-scoped API path
pub(crate) fn group_path(group_id: &str, rest: &str) -> String {
    format!("groups/{}/{}", segment(group_id), rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = AtlasClient::new(DEFAULT_BASE_URL, Credentials::default()).unwrap();
        assert_eq!(
            client.url("groups/p1/clusters/c1/globalWrites").unwrap(),
            "https://cloud.mongodb.com/api/atlas/v1.0/groups/p1/clusters/c1/globalWrites"
        );
        assert_eq!(
            client.url("/groups/p1").unwrap(),
            "https://cloud.mongodb.com/api/atlas/v1.0/groups/p1"
        );
    }

    #[test]
    fn test_url_building_without_trailing_slash() {
        let client =
            AtlasClient::new("http://localhost:8080/api/atlas/v1.0", Credentials::default())
                .unwrap();
        assert_eq!(
            client.url("groups/p1").unwrap(),
            "http://localhost:8080/api/atlas/v1.0/groups/p1"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = AtlasClient::new("not a url", Credentials::default());
        assert!(matches!(result, Err(AtlasError::InvalidUrl(_))));
    }

    #[test]
    fn test_group_path_encodes_segments() {
        assert_eq!(
            group_path("p 1", "customDBRoles/roles"),
            "groups/p%201/customDBRoles/roles"
        );
    }
}
