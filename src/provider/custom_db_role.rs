//! Custom DB Role resource
//!
//! Lifecycle of a `custom_db_role` resource: the typed model declared by the
//! user is validated, expanded into API types, sent to Atlas, and the remote
//! role is flattened back into the model on every read.

use super::error::{ProviderError, Result, ValidationError};
use super::state_id::{decode_state_id, id_part, split_import_id, state_id};
use super::ResourceState;
use crate::atlas::{Action, ActionResource, CustomDbRole, CustomDbRolesApi, InheritedRole};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const KIND: &str = "custom db role";
const IMPORT_FORMAT: &str = "{project_id}-{role_name}";

/// Declared state of a custom database role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDbRoleModel {
    pub project_id: String,
    pub role_name: String,
    #[serde(default)]
    pub actions: Vec<ActionBlock>,
    #[serde(default)]
    pub inherited_roles: Vec<InheritedRoleBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionBlock {
    pub action: String,
    #[serde(default)]
    pub resources: Vec<ResourceBlock>,
}

/// One resource entry as written in configuration. Exactly one of
/// `cluster = true` or the `database_name`/`collection_name` pair is valid;
/// see [`validate_actions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
}

impl ResourceBlock {
    pub fn cluster() -> Self {
        Self {
            cluster: Some(true),
            ..Self::default()
        }
    }

    pub fn namespace(database_name: &str, collection_name: &str) -> Self {
        Self {
            cluster: None,
            database_name: Some(database_name.to_string()),
            collection_name: Some(collection_name.to_string()),
        }
    }

    fn is_cluster(&self) -> bool {
        self.cluster == Some(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritedRoleBlock {
    pub database_name: String,
    pub role_name: String,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Check the cluster-vs-namespace shape of every resource entry
pub fn validate_actions(actions: &[ActionBlock]) -> std::result::Result<(), ValidationError> {
    for action in actions {
        for resource in &action.resources {
            let has_db = present(&resource.database_name);
            let has_collection = present(&resource.collection_name);

            if resource.is_cluster() {
                if has_db || has_collection {
                    return Err(ValidationError::ClusterWithNamespace {
                        action: action.action.clone(),
                    });
                }
            } else if !has_db || !has_collection {
                return Err(ValidationError::IncompleteNamespace {
                    action: action.action.clone(),
                });
            }
        }
    }
    Ok(())
}

fn role_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid role name pattern"))
}

/// Names Atlas refuses for custom roles
pub fn validate_role_name(role_name: &str) -> std::result::Result<(), ValidationError> {
    if !role_name_pattern().is_match(role_name) {
        return Err(ValidationError::RoleName(
            "can contain only letters, digits, underscores, and dashes",
        ));
    }
    if role_name == "atlasAdmin" {
        return Err(ValidationError::RoleName("cannot be 'atlasAdmin'"));
    }
    if role_name.starts_with("xgen-") {
        return Err(ValidationError::RoleName("cannot start with 'xgen-'"));
    }
    Ok(())
}

/// All checks run before a create or update reaches the network
pub fn validate_model(model: &CustomDbRoleModel) -> std::result::Result<(), ValidationError> {
    validate_role_name(&model.role_name)?;
    if model.actions.is_empty() {
        return Err(ValidationError::NoActions);
    }
    validate_actions(&model.actions)
}

// =========================================================================
// expand / flatten
// =========================================================================

pub fn expand_actions(actions: &[ActionBlock]) -> Vec<Action> {
    actions
        .iter()
        .map(|a| Action {
            action: a.action.clone(),
            resources: a.resources.iter().map(expand_resource).collect(),
        })
        .collect()
}

fn expand_resource(resource: &ResourceBlock) -> ActionResource {
    if resource.is_cluster() {
        ActionResource::Cluster
    } else {
        ActionResource::Namespace {
            db: resource.database_name.clone().unwrap_or_default(),
            collection: resource.collection_name.clone().unwrap_or_default(),
        }
    }
}

pub fn flatten_actions(actions: &[Action]) -> Vec<ActionBlock> {
    actions
        .iter()
        .map(|a| ActionBlock {
            action: a.action.clone(),
            resources: a.resources.iter().map(flatten_resource).collect(),
        })
        .collect()
}

fn flatten_resource(resource: &ActionResource) -> ResourceBlock {
    match resource {
        ActionResource::Cluster => ResourceBlock::cluster(),
        ActionResource::Namespace { db, collection } => ResourceBlock::namespace(db, collection),
    }
}

pub fn expand_inherited_roles(roles: &[InheritedRoleBlock]) -> Vec<InheritedRole> {
    roles
        .iter()
        .map(|r| InheritedRole {
            db: r.database_name.clone(),
            role: r.role_name.clone(),
        })
        .collect()
}

pub fn flatten_inherited_roles(roles: &[InheritedRole]) -> Vec<InheritedRoleBlock> {
    roles
        .iter()
        .map(|r| InheritedRoleBlock {
            database_name: r.db.clone(),
            role_name: r.role.clone(),
        })
        .collect()
}

// =========================================================================
// Resource controller
// =========================================================================

/// Lifecycle operations for custom database roles
#[derive(Debug, Clone)]
pub struct CustomDbRoleResource<A> {
    api: A,
}

impl<A: CustomDbRolesApi> CustomDbRoleResource<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub async fn create(&self, planned: &CustomDbRoleModel) -> Result<ResourceState<CustomDbRoleModel>> {
        validate_model(planned)?;

        let request = CustomDbRole {
            role_name: planned.role_name.clone(),
            actions: expand_actions(&planned.actions),
            inherited_roles: expand_inherited_roles(&planned.inherited_roles),
        };

        let (created, _) = self
            .api
            .create(&planned.project_id, &request)
            .await
            .map_err(|e| ProviderError::remote("error creating custom db role", e))?;

        let id = role_state_id(&planned.project_id, &created.role_name);
        tracing::info!("created custom db role {} ({})", created.role_name, id);

        self.read(&id).await
    }

    pub async fn read(&self, id: &str) -> Result<ResourceState<CustomDbRoleModel>> {
        let (project_id, role_name) = decode_role_id(id)?;

        let (role, _) = self.api.get(&project_id, &role_name).await.map_err(|e| {
            ProviderError::remote("error getting custom db role information", e)
        })?;

        Ok(ResourceState {
            id: id.to_string(),
            model: model_from_role(&project_id, role),
        })
    }

    /// Actions and inherited roles are replaced wholesale when they changed
    /// between `prior` and `planned`. The planned role is validated on every
    /// update, whichever block changed.
    pub async fn update(
        &self,
        id: &str,
        prior: &CustomDbRoleModel,
        planned: &CustomDbRoleModel,
    ) -> Result<ResourceState<CustomDbRoleModel>> {
        let (project_id, role_name) = decode_role_id(id)?;
        validate_model(planned)?;

        let (mut role, _) = self.api.get(&project_id, &role_name).await.map_err(|e| {
            ProviderError::remote("error getting custom db role information", e)
        })?;

        if prior.actions != planned.actions {
            role.actions = expand_actions(&planned.actions);
        }

        if prior.inherited_roles != planned.inherited_roles {
            role.inherited_roles = expand_inherited_roles(&planned.inherited_roles);
        }

        // The role name travels in the path
        role.role_name.clear();

        self.api
            .update(&project_id, &role_name, &role)
            .await
            .map_err(|e| {
                ProviderError::remote(format!("error updating custom db role ({role_name})"), e)
            })?;

        self.read(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let (project_id, role_name) = decode_role_id(id)?;

        self.api.delete(&project_id, &role_name).await.map_err(|e| {
            ProviderError::remote(format!("error deleting custom db role ({role_name})"), e)
        })?;

        tracing::info!("deleted custom db role {} in {}", role_name, project_id);
        Ok(())
    }

    /// Import an existing role from `{project_id}-{role_name}`
    pub async fn import(&self, import_id: &str) -> Result<ResourceState<CustomDbRoleModel>> {
        let (project_id, role_name) = split_import_id(import_id, KIND, IMPORT_FORMAT)?;

        let (role, _) =
            self.api
                .get(project_id, role_name)
                .await
                .map_err(|source| ProviderError::Import {
                    id: import_id.to_string(),
                    kind: KIND,
                    source,
                })?;

        // Use the name Atlas reports, not the one typed by the user
        let id = role_state_id(project_id, &role.role_name);
        tracing::info!("imported custom db role {} ({})", role.role_name, id);

        Ok(ResourceState {
            id,
            model: model_from_role(project_id, role),
        })
    }
}

pub fn role_state_id(project_id: &str, role_name: &str) -> String {
    state_id(&[("project_id", project_id), ("role_name", role_name)])
}

fn decode_role_id(id: &str) -> Result<(String, String)> {
    let parts = decode_state_id(id)?;
    Ok((
        id_part(&parts, "project_id", id)?.to_string(),
        id_part(&parts, "role_name", id)?.to_string(),
    ))
}

fn model_from_role(project_id: &str, role: CustomDbRole) -> CustomDbRoleModel {
    CustomDbRoleModel {
        project_id: project_id.to_string(),
        actions: flatten_actions(&role.actions),
        inherited_roles: flatten_inherited_roles(&role.inherited_roles),
        role_name: role.role_name,
    }
}
