//! Error types for resource controllers.

use crate::atlas::AtlasError;
use thiserror::Error;

/// A resource definition that cannot be sent to the API as written
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("setting `actions.resources.cluster` is exclusive with `actions.resources.collection_name` and `actions.resources.database_name` (action `{action}`)")]
    ClusterWithNamespace { action: String },

    #[error("either `actions.resources.cluster` or both `actions.resources.collection_name` and `actions.resources.database_name` must be set (action `{action}`)")]
    IncompleteNamespace { action: String },

    #[error("`actions` must contain at least one action")]
    NoActions,

    #[error("`role_name` {0}")]
    RoleName(&'static str),

    #[error("`{0}` must be set")]
    Required(&'static str),
}

/// Errors returned by resource lifecycle operations
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The API call failed; `context` says which step
    #[error("{context}: {source}")]
    Remote {
        context: String,
        #[source]
        source: AtlasError,
    },

    #[error("malformed resource id `{0}`")]
    InvalidStateId(String),

    #[error("import format error: to import a {kind} use the format {expected} (got `{id}`)")]
    ImportFormat {
        id: String,
        kind: &'static str,
        expected: &'static str,
    },

    #[error("couldn't import {kind} `{id}`: {source}")]
    Import {
        id: String,
        kind: &'static str,
        #[source]
        source: AtlasError,
    },
}

impl ProviderError {
    pub(crate) fn remote(context: impl Into<String>, source: AtlasError) -> Self {
        Self::Remote {
            context: context.into(),
            source,
        }
    }

    /// True when the remote object does not exist; hosts treat this on read
    /// as "resource removed outside of the provider".
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Remote { source, .. } | Self::Import { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
