//! Global Clusters endpoints
//!
//! Managed namespaces and custom zone mappings of a Global Cluster.
//! See <https://docs.atlas.mongodb.com/reference/api/global-clusters/>.

use super::client::{group_path, segment, AtlasClient};
use super::error::{AtlasError, Result};
use super::http::ApiResponse;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;

/// Global writes configuration of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalCluster {
    /// Location code to zone id
    #[serde(default)]
    pub custom_zone_mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub managed_namespaces: Vec<ManagedNamespace>,
}

/// A (database, collection) pair under global write sharding rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedNamespace {
    pub db: String,
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_shard_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomZoneMappingsRequest {
    pub custom_zone_mappings: Vec<CustomZoneMapping>,
}

/// Maps a location code (e.g. `US-VA`) to a named zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomZoneMapping {
    pub location: String,
    pub zone: String,
}

/// Operations on a cluster's global writes configuration
pub trait GlobalClustersApi {
    fn get(
        &self,
        group_id: &str,
        cluster_name: &str,
    ) -> impl Future<Output = Result<(GlobalCluster, ApiResponse)>> + Send;

    fn add_managed_namespace(
        &self,
        group_id: &str,
        cluster_name: &str,
        namespace: Option<&ManagedNamespace>,
    ) -> impl Future<Output = Result<(GlobalCluster, ApiResponse)>> + Send;

    fn delete_managed_namespace(
        &self,
        group_id: &str,
        cluster_name: &str,
        namespace: Option<&ManagedNamespace>,
    ) -> impl Future<Output = Result<(GlobalCluster, ApiResponse)>> + Send;

    fn add_custom_zone_mappings(
        &self,
        group_id: &str,
        cluster_name: &str,
        mappings: Option<&CustomZoneMappingsRequest>,
    ) -> impl Future<Output = Result<(GlobalCluster, ApiResponse)>> + Send;

    fn delete_custom_zone_mappings(
        &self,
        group_id: &str,
        cluster_name: &str,
    ) -> impl Future<Output = Result<(GlobalCluster, ApiResponse)>> + Send;
}

/// [`GlobalClustersApi`] backed by the Atlas REST API
#[derive(Clone, Debug)]
pub struct GlobalClustersService {
    client: AtlasClient,
}

impl GlobalClustersService {
    pub fn new(client: AtlasClient) -> Self {
        Self { client }
    }
}

fn global_writes_path(group_id: &str, cluster_name: &str) -> String {
    group_path(
        group_id,
        &format!("clusters/{}/globalWrites", segment(cluster_name)),
    )
}

fn global_writes_sub_path(group_id: &str, cluster_name: &str, sub: &str) -> String {
    format!("{}/{}", global_writes_path(group_id, cluster_name), sub)
}

impl GlobalClustersApi for GlobalClustersService {
    /// Retrieve all managed namespaces and custom zone mappings of a Global Cluster
    async fn get(&self, group_id: &str, cluster_name: &str) -> Result<(GlobalCluster, ApiResponse)> {
        if cluster_name.is_empty() {
            return Err(AtlasError::argument("cluster_name", "must be set"));
        }

        let path = global_writes_path(group_id, cluster_name);
        self.client
            .request::<_, ()>(Method::GET, &path, &[], None)
            .await
    }

    async fn add_managed_namespace(
        &self,
        group_id: &str,
        cluster_name: &str,
        namespace: Option<&ManagedNamespace>,
    ) -> Result<(GlobalCluster, ApiResponse)> {
        let Some(namespace) = namespace else {
            return Err(AtlasError::argument("namespace", "cannot be nil"));
        };

        tracing::info!(
            "adding managed namespace {}.{} to {}/{}",
            namespace.db,
            namespace.collection,
            group_id,
            cluster_name
        );

        let path = global_writes_sub_path(group_id, cluster_name, "managedNamespaces");
        self.client
            .request(Method::POST, &path, &[], Some(namespace))
            .await
    }

    /// The namespace goes in the query string, not the body: the endpoint
    /// ignores DELETE bodies.
    async fn delete_managed_namespace(
        &self,
        group_id: &str,
        cluster_name: &str,
        namespace: Option<&ManagedNamespace>,
    ) -> Result<(GlobalCluster, ApiResponse)> {
        let Some(namespace) = namespace else {
            return Err(AtlasError::argument("namespace", "cannot be nil"));
        };

        tracing::info!(
            "deleting managed namespace {}.{} from {}/{}",
            namespace.db,
            namespace.collection,
            group_id,
            cluster_name
        );

        let path = global_writes_sub_path(group_id, cluster_name, "managedNamespaces");
        let query = [
            ("collection", namespace.collection.as_str()),
            ("db", namespace.db.as_str()),
        ];
        self.client
            .request::<_, ()>(Method::DELETE, &path, &query, None)
            .await
    }

    async fn add_custom_zone_mappings(
        &self,
        group_id: &str,
        cluster_name: &str,
        mappings: Option<&CustomZoneMappingsRequest>,
    ) -> Result<(GlobalCluster, ApiResponse)> {
        let Some(mappings) = mappings else {
            return Err(AtlasError::argument("mappings", "cannot be nil"));
        };

        tracing::info!(
            "adding {} custom zone mappings to {}/{}",
            mappings.custom_zone_mappings.len(),
            group_id,
            cluster_name
        );

        let path = global_writes_sub_path(group_id, cluster_name, "customZoneMapping");
        self.client
            .request(Method::POST, &path, &[], Some(mappings))
            .await
    }

    /// Removes every custom zone mapping of the cluster
    async fn delete_custom_zone_mappings(
        &self,
        group_id: &str,
        cluster_name: &str,
    ) -> Result<(GlobalCluster, ApiResponse)> {
        tracing::info!(
            "deleting custom zone mappings of {}/{}",
            group_id,
            cluster_name
        );

        let path = global_writes_sub_path(group_id, cluster_name, "customZoneMapping");
        self.client
            .request::<_, ()>(Method::DELETE, &path, &[], None)
            .await
    }
}
