//! Declarative resource provider and typed API client for MongoDB Atlas.
//!
//! - [`atlas`] - Atlas Admin API client (Global Clusters, Custom DB Roles)
//! - [`provider`] - Resource controllers reconciling typed models with Atlas
//! - [`config`] - Credentials and endpoint configuration

pub mod atlas;
pub mod config;
pub mod provider;

/// Version injected at compile time via ATLASFORM_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("ATLASFORM_VERSION") {
    Some(v) => v,
    None => "dev",
};
