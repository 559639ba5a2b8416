//! Global Cluster Config resource
//!
//! Declares the managed namespaces and custom zone mappings of a Global
//! Cluster. Every attribute forces replacement, so there is no update.

use super::error::{ProviderError, Result, ValidationError};
use super::state_id::{decode_state_id, id_part, split_import_id, state_id};
use super::ResourceState;
use crate::atlas::{
    CustomZoneMapping, CustomZoneMappingsRequest, GlobalCluster, GlobalClustersApi,
    ManagedNamespace,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const KIND: &str = "global cluster config";
const IMPORT_FORMAT: &str = "{project_id}-{cluster_name}";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalClusterConfigModel {
    pub project_id: String,
    pub cluster_name: String,
    #[serde(default)]
    pub managed_namespaces: Vec<ManagedNamespaceBlock>,
    #[serde(default)]
    pub custom_zone_mappings: Vec<ZoneMappingBlock>,
    /// Computed: location code to zone id, as reported by Atlas
    #[serde(default)]
    pub custom_zone_mapping: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedNamespaceBlock {
    pub db: String,
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_shard_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMappingBlock {
    pub location: String,
    pub zone: String,
}

fn expand_namespace(block: &ManagedNamespaceBlock) -> ManagedNamespace {
    ManagedNamespace {
        db: block.db.clone(),
        collection: block.collection.clone(),
        custom_shard_key: block.custom_shard_key.clone(),
    }
}

fn flatten_namespace(ns: &ManagedNamespace) -> ManagedNamespaceBlock {
    ManagedNamespaceBlock {
        db: ns.db.clone(),
        collection: ns.collection.clone(),
        custom_shard_key: ns.custom_shard_key.clone(),
    }
}

fn expand_zone_mappings(blocks: &[ZoneMappingBlock]) -> CustomZoneMappingsRequest {
    CustomZoneMappingsRequest {
        custom_zone_mappings: blocks
            .iter()
            .map(|b| CustomZoneMapping {
                location: b.location.clone(),
                zone: b.zone.clone(),
            })
            .collect(),
    }
}

/// Lifecycle operations for a cluster's global writes configuration
#[derive(Debug, Clone)]
pub struct GlobalClusterConfigResource<A> {
    api: A,
}

impl<A: GlobalClustersApi> GlobalClusterConfigResource<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub async fn create(
        &self,
        planned: &GlobalClusterConfigModel,
    ) -> Result<ResourceState<GlobalClusterConfigModel>> {
        let project_id = &planned.project_id;
        let cluster_name = &planned.cluster_name;

        if project_id.is_empty() {
            return Err(ValidationError::Required("project_id").into());
        }
        if cluster_name.is_empty() {
            return Err(ValidationError::Required("cluster_name").into());
        }

        for block in &planned.managed_namespaces {
            let ns = expand_namespace(block);
            self.api
                .add_managed_namespace(project_id, cluster_name, Some(&ns))
                .await
                .map_err(|e| {
                    ProviderError::remote(
                        format!(
                            "error adding managed namespace {}.{} to {}",
                            ns.db, ns.collection, cluster_name
                        ),
                        e,
                    )
                })?;
        }

        if !planned.custom_zone_mappings.is_empty() {
            let request = expand_zone_mappings(&planned.custom_zone_mappings);
            self.api
                .add_custom_zone_mappings(project_id, cluster_name, Some(&request))
                .await
                .map_err(|e| {
                    ProviderError::remote(
                        format!("error adding custom zone mappings to {}", cluster_name),
                        e,
                    )
                })?;
        }

        let prior = ResourceState {
            id: config_state_id(project_id, cluster_name),
            model: planned.clone(),
        };
        self.read(&prior).await
    }

    /// Refresh from Atlas. Declared zone mappings are kept from `prior`:
    /// the API reports zone ids, not the names that were sent.
    pub async fn read(
        &self,
        prior: &ResourceState<GlobalClusterConfigModel>,
    ) -> Result<ResourceState<GlobalClusterConfigModel>> {
        let (project_id, cluster_name) = decode_config_id(&prior.id)?;

        let (cluster, _) = self
            .api
            .get(&project_id, &cluster_name)
            .await
            .map_err(|e| {
                ProviderError::remote(
                    format!("error reading global cluster config for {}", cluster_name),
                    e,
                )
            })?;

        Ok(ResourceState {
            id: prior.id.clone(),
            model: model_from_cluster(
                &project_id,
                &cluster_name,
                prior.model.custom_zone_mappings.clone(),
                cluster,
            ),
        })
    }

    /// Remove the namespaces recorded in state, then all zone mappings
    pub async fn delete(&self, state: &ResourceState<GlobalClusterConfigModel>) -> Result<()> {
        let (project_id, cluster_name) = decode_config_id(&state.id)?;

        for block in &state.model.managed_namespaces {
            let ns = expand_namespace(block);
            self.api
                .delete_managed_namespace(&project_id, &cluster_name, Some(&ns))
                .await
                .map_err(|e| {
                    ProviderError::remote(
                        format!(
                            "error deleting managed namespace {}.{} from {}",
                            ns.db, ns.collection, cluster_name
                        ),
                        e,
                    )
                })?;
        }

        self.api
            .delete_custom_zone_mappings(&project_id, &cluster_name)
            .await
            .map_err(|e| {
                ProviderError::remote(
                    format!("error deleting custom zone mappings of {}", cluster_name),
                    e,
                )
            })?;

        tracing::info!("deleted global cluster config of {}/{}", project_id, cluster_name);
        Ok(())
    }

    /// Import from `{project_id}-{cluster_name}`
    pub async fn import(&self, import_id: &str) -> Result<ResourceState<GlobalClusterConfigModel>> {
        let (project_id, cluster_name) = split_import_id(import_id, KIND, IMPORT_FORMAT)?;

        let (cluster, _) =
            self.api
                .get(project_id, cluster_name)
                .await
                .map_err(|source| ProviderError::Import {
                    id: import_id.to_string(),
                    kind: KIND,
                    source,
                })?;

        Ok(ResourceState {
            id: config_state_id(project_id, cluster_name),
            model: model_from_cluster(project_id, cluster_name, Vec::new(), cluster),
        })
    }
}

pub fn config_state_id(project_id: &str, cluster_name: &str) -> String {
    state_id(&[("project_id", project_id), ("cluster_name", cluster_name)])
}

fn decode_config_id(id: &str) -> Result<(String, String)> {
    let parts = decode_state_id(id)?;
    Ok((
        id_part(&parts, "project_id", id)?.to_string(),
        id_part(&parts, "cluster_name", id)?.to_string(),
    ))
}

fn model_from_cluster(
    project_id: &str,
    cluster_name: &str,
    custom_zone_mappings: Vec<ZoneMappingBlock>,
    cluster: GlobalCluster,
) -> GlobalClusterConfigModel {
    GlobalClusterConfigModel {
        project_id: project_id.to_string(),
        cluster_name: cluster_name.to_string(),
        managed_namespaces: cluster.managed_namespaces.iter().map(flatten_namespace).collect(),
        custom_zone_mappings,
        custom_zone_mapping: cluster.custom_zone_mapping,
    }
}
