//! Custom database role endpoints
//!
//! See <https://docs.atlas.mongodb.com/reference/api/custom-roles/>.

use super::client::{group_path, segment, AtlasClient};
use super::error::{AtlasError, Result};
use super::http::ApiResponse;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A named bundle of privileges, optionally inheriting other roles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDbRole {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role_name: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub inherited_roles: Vec<InheritedRole>,
}

/// A privilege action and the resources it is granted on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub action: String,
    #[serde(default)]
    pub resources: Vec<ActionResource>,
}

/// What an action applies to: the whole cluster, or one namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawResource", into = "RawResource")]
pub enum ActionResource {
    Cluster,
    Namespace { db: String, collection: String },
}

/// Wire shape of [`ActionResource`]
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawResource {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    cluster: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    db: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    collection: Option<String>,
}

impl From<RawResource> for ActionResource {
    fn from(raw: RawResource) -> Self {
        if raw.cluster {
            Self::Cluster
        } else {
            Self::Namespace {
                db: raw.db.unwrap_or_default(),
                collection: raw.collection.unwrap_or_default(),
            }
        }
    }
}

impl From<ActionResource> for RawResource {
    fn from(resource: ActionResource) -> Self {
        match resource {
            ActionResource::Cluster => Self {
                cluster: true,
                ..Self::default()
            },
            ActionResource::Namespace { db, collection } => Self {
                cluster: false,
                db: Some(db),
                collection: Some(collection),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritedRole {
    pub db: String,
    pub role: String,
}

/// Operations on a project's custom database roles
pub trait CustomDbRolesApi {
    fn create(
        &self,
        group_id: &str,
        role: &CustomDbRole,
    ) -> impl Future<Output = Result<(CustomDbRole, ApiResponse)>> + Send;

    fn get(
        &self,
        group_id: &str,
        role_name: &str,
    ) -> impl Future<Output = Result<(CustomDbRole, ApiResponse)>> + Send;

    /// Replace the role's actions and inherited roles
    fn update(
        &self,
        group_id: &str,
        role_name: &str,
        role: &CustomDbRole,
    ) -> impl Future<Output = Result<(CustomDbRole, ApiResponse)>> + Send;

    fn delete(
        &self,
        group_id: &str,
        role_name: &str,
    ) -> impl Future<Output = Result<ApiResponse>> + Send;
}

/// [`CustomDbRolesApi`] backed by the Atlas REST API
#[derive(Clone, Debug)]
pub struct CustomDbRolesService {
    client: AtlasClient,
}

impl CustomDbRolesService {
    pub fn new(client: AtlasClient) -> Self {
        Self { client }
    }
}

fn roles_path(group_id: &str) -> String {
    group_path(group_id, "customDBRoles/roles")
}

fn role_path(group_id: &str, role_name: &str) -> String {
    format!("{}/{}", roles_path(group_id), segment(role_name))
}

fn require_role_name(role_name: &str) -> Result<()> {
    if role_name.is_empty() {
        return Err(AtlasError::argument("role_name", "must be set"));
    }
    Ok(())
}

impl CustomDbRolesApi for CustomDbRolesService {
    async fn create(&self, group_id: &str, role: &CustomDbRole) -> Result<(CustomDbRole, ApiResponse)> {
        require_role_name(&role.role_name)?;
        tracing::info!("creating custom db role {} in {}", role.role_name, group_id);

        self.client
            .request(Method::POST, &roles_path(group_id), &[], Some(role))
            .await
    }

    async fn get(&self, group_id: &str, role_name: &str) -> Result<(CustomDbRole, ApiResponse)> {
        require_role_name(role_name)?;

        self.client
            .request::<_, ()>(Method::GET, &role_path(group_id, role_name), &[], None)
            .await
    }

    async fn update(
        &self,
        group_id: &str,
        role_name: &str,
        role: &CustomDbRole,
    ) -> Result<(CustomDbRole, ApiResponse)> {
        require_role_name(role_name)?;
        tracing::info!("updating custom db role {} in {}", role_name, group_id);

        self.client
            .request(Method::PATCH, &role_path(group_id, role_name), &[], Some(role))
            .await
    }

    async fn delete(&self, group_id: &str, role_name: &str) -> Result<ApiResponse> {
        require_role_name(role_name)?;
        tracing::info!("deleting custom db role {} in {}", role_name, group_id);

        self.client
            .request_empty(Method::DELETE, &role_path(group_id, role_name))
            .await
    }
}
