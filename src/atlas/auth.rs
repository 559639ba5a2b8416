//! Atlas API credentials
//!
//! Programmatic API keys (public/private pair) or a service account access
//! token. Resolution order is handled by [`crate::config::Config`].

use reqwest::RequestBuilder;
use std::fmt;

/// Credentials attached to every API request
#[derive(Clone, Default)]
pub enum Credentials {
    /// Programmatic API key pair
    ApiKey {
        public_key: String,
        private_key: String,
    },
    /// Service account OAuth access token
    AccessToken(String),
    /// No authentication (local mocks, proxies that inject auth)
    #[default]
    Anonymous,
}

impl Credentials {
    pub fn api_key(public_key: &str, private_key: &str) -> Self {
        Self::ApiKey {
            public_key: public_key.to_string(),
            private_key: private_key.to_string(),
        }
    }

    pub fn access_token(token: &str) -> Self {
        Self::AccessToken(token.to_string())
    }

    /// Attach these credentials to an outgoing request
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::ApiKey {
                public_key,
                private_key,
            } => request.basic_auth(public_key, Some(private_key)),
            Self::AccessToken(token) => request.bearer_auth(token),
            Self::Anonymous => request,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

// Security: never print secrets, even in debug logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey { public_key, .. } => f
                .debug_struct("ApiKey")
                .field("public_key", public_key)
                .field("private_key", &"<redacted>")
                .finish(),
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}
