//! Resource provider layer
//!
//! Resource controllers translate a typed resource model into Atlas API calls
//! and map the remote objects back into the model.
//!
//! # Architecture
//!
//! - [`custom_db_role`] - `custom_db_role` resource (create/read/update/delete/import)
//! - [`global_cluster_config`] - `global_cluster_config` resource (create/read/delete/import)
//! - [`state_id`] - Composite resource identifiers
//! - [`error`] - Validation and lifecycle errors
//!
//! Controllers are generic over the API traits in [`crate::atlas`], so the
//! HTTP client is injected rather than looked up.

pub mod custom_db_role;
pub mod error;
pub mod global_cluster_config;
pub mod state_id;

use crate::atlas::{AtlasClient, CustomDbRolesService, GlobalClustersService};
use serde::{Deserialize, Serialize};

pub use custom_db_role::{CustomDbRoleModel, CustomDbRoleResource};
pub use error::{ProviderError, ValidationError};
pub use global_cluster_config::{GlobalClusterConfigModel, GlobalClusterConfigResource};

/// A resource instance as tracked by the host: its id plus its attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState<M> {
    pub id: String,
    pub model: M,
}

/// Entry point handing out resource controllers bound to one Atlas client
#[derive(Debug, Clone)]
pub struct Provider {
    client: AtlasClient,
}

impl Provider {
    pub fn new(client: AtlasClient) -> Self {
        Self { client }
    }

    pub fn custom_db_role(&self) -> CustomDbRoleResource<CustomDbRolesService> {
        CustomDbRoleResource::new(self.client.custom_db_roles())
    }

    pub fn global_cluster_config(&self) -> GlobalClusterConfigResource<GlobalClustersService> {
        GlobalClusterConfigResource::new(self.client.global_clusters())
    }

    pub fn client(&self) -> &AtlasClient {
        &self.client
    }
}
