//! Integration tests for the Atlas client and resource controllers using wiremock
//!
//! These tests verify request construction (method, path, query, body,
//! credentials) and response/error handling against mocked endpoints.

use atlasform::atlas::{
    AtlasClient, AtlasError, CustomDbRolesApi, CustomZoneMapping, CustomZoneMappingsRequest,
    Credentials, GlobalClustersApi, ManagedNamespace,
};
use atlasform::provider::custom_db_role::{
    role_state_id, ActionBlock, InheritedRoleBlock, ResourceBlock,
};
use atlasform::provider::{CustomDbRoleModel, Provider, ProviderError};
use serde_json::json;
use wiremock::matchers::{any, basic_auth, bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "/api/atlas/v1.0";

fn client_for(server: &MockServer, credentials: Credentials) -> AtlasClient {
    AtlasClient::new(&format!("{}{}", server.uri(), BASE), credentials)
        .expect("client should build")
}

fn cluster_body() -> serde_json::Value {
    json!({
        "customZoneMapping": {"US-VA": "5b48f1b6a07b7c2a8e4f0a1b"},
        "managedNamespaces": [
            {"db": "sales", "collection": "orders", "customShardKey": "region"}
        ]
    })
}

/// Global Clusters endpoints
mod global_clusters_tests {
    use super::*;

    /// Test successful GET returns the decoded cluster
    #[tokio::test]
    async fn test_get_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{BASE}/groups/p1/clusters/Cluster0/globalWrites")))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cluster_body()))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server, Credentials::access_token("test-token")).global_clusters();
        let (cluster, response) = api.get("p1", "Cluster0").await.expect("get should succeed");

        assert_eq!(response.status, 200);
        assert_eq!(cluster.managed_namespaces.len(), 1);
        assert_eq!(cluster.managed_namespaces[0].db, "sales");
        assert_eq!(
            cluster.custom_zone_mapping["US-VA"],
            "5b48f1b6a07b7c2a8e4f0a1b"
        );
    }

    /// Test empty cluster name fails before any request is sent
    #[tokio::test]
    async fn test_get_empty_cluster_name_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let api = client_for(&server, Credentials::default()).global_clusters();
        let err = api.get("p1", "").await.unwrap_err();

        assert!(matches!(
            err,
            AtlasError::Argument {
                name: "cluster_name",
                ..
            }
        ));
    }

    /// Test nil arguments are rejected without a request
    #[tokio::test]
    async fn test_missing_bodies_send_nothing() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let api = client_for(&server, Credentials::default()).global_clusters();

        assert!(matches!(
            api.add_managed_namespace("p1", "c", None).await,
            Err(AtlasError::Argument { .. })
        ));
        assert!(matches!(
            api.delete_managed_namespace("p1", "c", None).await,
            Err(AtlasError::Argument { .. })
        ));
        assert!(matches!(
            api.add_custom_zone_mappings("p1", "c", None).await,
            Err(AtlasError::Argument { .. })
        ));
    }

    /// Test POST of a managed namespace sends it as the JSON body
    #[tokio::test]
    async fn test_add_managed_namespace_posts_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!(
                "{BASE}/groups/p1/clusters/Cluster0/globalWrites/managedNamespaces"
            )))
            .and(basic_auth("public", "private"))
            .and(body_json(json!({
                "db": "sales",
                "collection": "orders",
                "customShardKey": "region"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(cluster_body()))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server, Credentials::api_key("public", "private")).global_clusters();
        let ns = ManagedNamespace {
            db: "sales".into(),
            collection: "orders".into(),
            custom_shard_key: Some("region".into()),
        };

        let (cluster, _) = api
            .add_managed_namespace("p1", "Cluster0", Some(&ns))
            .await
            .expect("add should succeed");
        assert_eq!(cluster.managed_namespaces[0], ns);
    }

    /// Test DELETE of a managed namespace uses query parameters and no body
    #[tokio::test]
    async fn test_delete_managed_namespace_uses_query() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!(
                "{BASE}/groups/p1/clusters/Cluster0/globalWrites/managedNamespaces"
            )))
            .and(query_param("db", "sales"))
            .and(query_param("collection", "orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "customZoneMapping": {},
                "managedNamespaces": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server, Credentials::default()).global_clusters();
        let ns = ManagedNamespace {
            db: "sales".into(),
            collection: "orders".into(),
            custom_shard_key: None,
        };

        let (cluster, _) = api
            .delete_managed_namespace("p1", "Cluster0", Some(&ns))
            .await
            .expect("delete should succeed");
        assert!(cluster.managed_namespaces.is_empty());

        let requests = server.received_requests().await.expect("recording enabled");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.query(), Some("collection=orders&db=sales"));
        assert!(requests[0].body.is_empty());
    }

    /// Test POST of custom zone mappings wraps them in `customZoneMappings`
    #[tokio::test]
    async fn test_add_custom_zone_mappings() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!(
                "{BASE}/groups/p1/clusters/Cluster0/globalWrites/customZoneMapping"
            )))
            .and(body_json(json!({
                "customZoneMappings": [
                    {"location": "US-VA", "zone": "Zone 1"},
                    {"location": "CA", "zone": "Zone 2"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(cluster_body()))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server, Credentials::default()).global_clusters();
        let request = CustomZoneMappingsRequest {
            custom_zone_mappings: vec![
                CustomZoneMapping {
                    location: "US-VA".into(),
                    zone: "Zone 1".into(),
                },
                CustomZoneMapping {
                    location: "CA".into(),
                    zone: "Zone 2".into(),
                },
            ],
        };

        api.add_custom_zone_mappings("p1", "Cluster0", Some(&request))
            .await
            .expect("add should succeed");
    }

    /// Test DELETE of zone mappings tolerates an empty body
    #[tokio::test]
    async fn test_delete_custom_zone_mappings_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!(
                "{BASE}/groups/p1/clusters/Cluster0/globalWrites/customZoneMapping"
            )))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server, Credentials::default()).global_clusters();
        let (cluster, response) = api
            .delete_custom_zone_mappings("p1", "Cluster0")
            .await
            .expect("delete should succeed");

        assert_eq!(response.status, 200);
        assert!(cluster.custom_zone_mapping.is_empty());
        assert!(cluster.managed_namespaces.is_empty());
    }

    /// Test server errors are surfaced once, without retries
    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server, Credentials::default()).global_clusters();
        let err = api.get("p1", "Cluster0").await.unwrap_err();

        assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
    }

    /// Test malformed JSON is reported as a decode error
    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let api = client_for(&server, Credentials::default()).global_clusters();
        let err = api.get("p1", "Cluster0").await.unwrap_err();

        assert!(matches!(err, AtlasError::Decode(_)));
    }
}

/// Custom DB Roles endpoints
mod custom_db_roles_tests {
    use super::*;

    fn role_body() -> serde_json::Value {
        json!({
            "roleName": "reporting",
            "actions": [
                {"action": "FIND", "resources": [{"db": "sales", "collection": "orders", "cluster": false}]},
                {"action": "LIST_SESSIONS", "resources": [{"cluster": true}]}
            ],
            "inheritedRoles": [{"db": "admin", "role": "read"}]
        })
    }

    fn role_model() -> CustomDbRoleModel {
        CustomDbRoleModel {
            project_id: "p1".into(),
            role_name: "reporting".into(),
            actions: vec![
                ActionBlock {
                    action: "FIND".into(),
                    resources: vec![ResourceBlock::namespace("sales", "orders")],
                },
                ActionBlock {
                    action: "LIST_SESSIONS".into(),
                    resources: vec![ResourceBlock::cluster()],
                },
            ],
            inherited_roles: vec![InheritedRoleBlock {
                database_name: "admin".into(),
                role_name: "read".into(),
            }],
        }
    }

    /// Test 404 carries the Atlas error code
    #[tokio::test]
    async fn test_get_missing_role() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{BASE}/groups/p1/customDBRoles/roles/missing")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "detail": "No custom role named missing exists in group p1.",
                "error": 404,
                "errorCode": "ATLAS_CUSTOM_ROLE_NOT_FOUND",
                "reason": "Not Found"
            })))
            .mount(&server)
            .await;

        let api = client_for(&server, Credentials::default()).custom_db_roles();
        let err = api.get("p1", "missing").await.unwrap_err();

        assert!(err.is_not_found());
        match err {
            AtlasError::Api { error_code, .. } => {
                assert_eq!(error_code.as_deref(), Some("ATLAS_CUSTOM_ROLE_NOT_FOUND"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Test create sends the expanded role and reads it back
    #[tokio::test]
    async fn test_resource_create() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{BASE}/groups/p1/customDBRoles/roles")))
            .and(body_json(json!({
                "roleName": "reporting",
                "actions": [
                    {"action": "FIND", "resources": [{"db": "sales", "collection": "orders"}]},
                    {"action": "LIST_SESSIONS", "resources": [{"cluster": true}]}
                ],
                "inheritedRoles": [{"db": "admin", "role": "read"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(role_body()))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{BASE}/groups/p1/customDBRoles/roles/reporting")))
            .respond_with(ResponseTemplate::new(200).set_body_json(role_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = Provider::new(client_for(&server, Credentials::default()));
        let state = provider
            .custom_db_role()
            .create(&role_model())
            .await
            .expect("create should succeed");

        assert_eq!(state.id, role_state_id("p1", "reporting"));
        assert_eq!(state.model, role_model());
    }

    /// Test invalid resource shapes never reach the API
    #[tokio::test]
    async fn test_resource_create_invalid_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut model = role_model();
        model.actions[1].resources[0].database_name = Some("sales".into());

        let provider = Provider::new(client_for(&server, Credentials::default()));
        let err = provider.custom_db_role().create(&model).await.unwrap_err();

        assert!(matches!(err, ProviderError::Validation(_)));
    }

    /// Test update fetches, PATCHes the replaced actions, then re-reads
    #[tokio::test]
    async fn test_resource_update() {
        let server = MockServer::start().await;

        let updated_body = json!({
            "roleName": "reporting",
            "actions": [
                {"action": "FIND", "resources": [{"db": "sales", "collection": "orders"}]}
            ],
            "inheritedRoles": [{"db": "admin", "role": "read"}]
        });

        Mock::given(method("GET"))
            .and(path(format!("{BASE}/groups/p1/customDBRoles/roles/reporting")))
            .respond_with(ResponseTemplate::new(200).set_body_json(role_body()))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path(format!("{BASE}/groups/p1/customDBRoles/roles/reporting")))
            .and(body_json(json!({
                "actions": [
                    {"action": "FIND", "resources": [{"db": "sales", "collection": "orders"}]}
                ],
                "inheritedRoles": [{"db": "admin", "role": "read"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated_body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{BASE}/groups/p1/customDBRoles/roles/reporting")))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated_body))
            .mount(&server)
            .await;

        let prior = role_model();
        let mut planned = prior.clone();
        planned.actions.truncate(1);

        let provider = Provider::new(client_for(&server, Credentials::default()));
        let state = provider
            .custom_db_role()
            .update(&role_state_id("p1", "reporting"), &prior, &planned)
            .await
            .expect("update should succeed");

        assert_eq!(state.model, planned);
    }

    /// Test delete propagates a missing role as an error
    #[tokio::test]
    async fn test_resource_delete_missing() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/groups/p1/customDBRoles/roles/reporting")))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let provider = Provider::new(client_for(&server, Credentials::default()));
        let err = provider
            .custom_db_role()
            .delete(&role_state_id("p1", "reporting"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    /// Test import splits on the first dash and confirms the role exists
    #[tokio::test]
    async fn test_resource_import() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{BASE}/groups/p1/customDBRoles/roles/reporting")))
            .respond_with(ResponseTemplate::new(200).set_body_json(role_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = Provider::new(client_for(&server, Credentials::default()));
        let state = provider
            .custom_db_role()
            .import("p1-reporting")
            .await
            .expect("import should succeed");

        assert_eq!(state.id, role_state_id("p1", "reporting"));
        assert_eq!(state.model, role_model());
    }
}
