//! Atlas API interaction module
//!
//! This module provides a typed client for the MongoDB Atlas Admin API:
//! credentials, HTTP transport, and the endpoint groups the provider needs.
//!
//! # Module Structure
//!
//! - [`auth`] - API key / access token credentials
//! - [`client`] - Main Atlas client and URL building
//! - [`http`] - HTTP utilities for REST API calls
//! - [`global_clusters`] - Managed namespaces and custom zone mappings
//! - [`custom_db_roles`] - Custom database roles
//!
//! # Example
//!
//! ```ignore
//! use atlasform::atlas::{AtlasClient, Credentials, GlobalClustersApi};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = AtlasClient::new(DEFAULT_BASE_URL, Credentials::api_key("pub", "priv"))?;
//!     let (cluster, _) = client.global_clusters().get("my-project", "Cluster0").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod custom_db_roles;
pub mod error;
pub mod global_clusters;
pub mod http;

pub use auth::Credentials;
pub use client::{AtlasClient, DEFAULT_BASE_URL};
pub use custom_db_roles::{
    Action, ActionResource, CustomDbRole, CustomDbRolesApi, CustomDbRolesService, InheritedRole,
};
pub use error::AtlasError;
pub use global_clusters::{
    CustomZoneMapping, CustomZoneMappingsRequest, GlobalCluster, GlobalClustersApi,
    GlobalClustersService, ManagedNamespace,
};
pub use http::{format_atlas_error, ApiResponse};
