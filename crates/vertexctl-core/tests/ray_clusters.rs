//! Ray cluster lifecycle against a mock persistent-resource service

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use vertexctl_core::ray::{
    self, CreateClusterParams, PscIConfig, Resources, job_submission_cluster_info,
};
use vertexctl_core::{AiPlatformClient, CoreError, PollConfig};
use wiremock::matchers::{any, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PARENT: &str = "projects/test-project/locations/us-central1";
const IMAGE: &str = "us-docker.pkg.dev/vertex-ai/training/ray-cpu.2-33.py310:latest";

fn client(server: &MockServer) -> AiPlatformClient {
    AiPlatformClient::builder()
        .base_url(server.uri())
        .access_token("test-token")
        .build()
        .unwrap()
}

fn fast_poll() -> PollConfig {
    PollConfig::fixed(Duration::from_millis(10))
}

fn cluster_name(id: &str) -> String {
    format!("{PARENT}/persistentResources/{id}")
}

fn ray_resource(id: &str, state: &str) -> Value {
    json!({
        "name": cluster_name(id),
        "state": state,
        "resourcePools": [
            {
                "id": "head-node",
                "machineSpec": {"machineType": "n1-standard-16"},
                "replicaCount": "1",
                "diskSpec": {"bootDiskType": "pd-ssd", "bootDiskSizeGb": 100}
            },
            {
                "id": "worker-pool1",
                "machineSpec": {"machineType": "n1-standard-8"},
                "replicaCount": "2",
                "diskSpec": {"bootDiskType": "pd-ssd", "bootDiskSizeGb": 100}
            }
        ],
        "resourceRuntimeSpec": {
            "raySpec": {
                "resourcePoolImages": {"head-node": IMAGE, "worker-pool1": IMAGE},
                "headNodeResourcePoolId": "head-node"
            }
        },
        "resourceRuntime": {
            "accessUris": {
                "RAY_DASHBOARD_URI": "abc123-dot-us-central1.aiplatform-training.googleusercontent.com",
                "RAY_HEAD_NODE_INTERNAL_IP": "10.128.0.2"
            }
        }
    })
}

async fn mount_done_operation(server: &MockServer, op: &str, response: Option<Value>) {
    let mut body = json!({"name": op, "done": true});
    if let Some(response) = response {
        body["response"] = response;
    }
    Mock::given(method("GET"))
        .and(path(format!("/v1/{op}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ============================================================================
// List / get
// ============================================================================

#[tokio::test]
async fn test_list_with_no_clusters_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{PARENT}/persistentResources")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let clusters = ray::list_ray_clusters(&client(&server), PARENT).await.unwrap();
    assert!(clusters.is_empty());
}

#[tokio::test]
async fn test_list_skips_non_ray_resources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{PARENT}/persistentResources")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "persistentResources": [
                ray_resource("ray-1", "RUNNING"),
                {
                    "name": cluster_name("training-pool"),
                    "state": "RUNNING",
                    "resourcePools": [{"id": "pool", "machineSpec": {"machineType": "n1-standard-4"}}]
                }
            ]
        })))
        .mount(&server)
        .await;

    let clusters = ray::list_ray_clusters(&client(&server), PARENT).await.unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].cluster_resource_name, cluster_name("ray-1"));
}

#[tokio::test]
async fn test_get_cluster_maps_pools_and_versions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{}", cluster_name("ray-1"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(ray_resource("ray-1", "RUNNING")))
        .mount(&server)
        .await;

    let cluster = ray::get_ray_cluster(&client(&server), &cluster_name("ray-1"))
        .await
        .unwrap();

    assert!(cluster.is_running());
    assert_eq!(cluster.ray_version.as_deref(), Some("2.33"));
    assert_eq!(cluster.python_version.as_deref(), Some("3.10"));
    assert_eq!(cluster.head_node_type.as_ref().unwrap().node_count, 1);
    assert_eq!(cluster.worker_node_types.len(), 1);
    assert_eq!(cluster.worker_node_types[0].machine_type, "n1-standard-8");
    assert_eq!(cluster.worker_node_types[0].node_count, 2);
    assert_eq!(cluster.head_node_address.as_deref(), Some("10.128.0.2"));
}

#[tokio::test]
async fn test_get_non_ray_resource_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{}", cluster_name("plain"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": cluster_name("plain"),
            "resourcePools": []
        })))
        .mount(&server)
        .await;

    let err = ray::get_ray_cluster(&client(&server), &cluster_name("plain"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("is not a Ray cluster"));
}

// ============================================================================
// Create / update / delete
// ============================================================================

#[tokio::test]
async fn test_create_waits_for_operation() {
    let server = MockServer::start().await;
    let op = format!("{}/operations/1", cluster_name("my-cluster"));
    Mock::given(method("POST"))
        .and(path(format!("/v1/{PARENT}/persistentResources")))
        .and(query_param("persistentResourceId", "my-cluster"))
        .and(body_partial_json(json!({
            "resourceRuntimeSpec": {
                "raySpec": {
                    "headNodeResourcePoolId": "head-node",
                    "resourcePoolImages": {"head-node": IMAGE, "worker-pool1": IMAGE}
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": op})))
        .expect(1)
        .mount(&server)
        .await;
    mount_done_operation(&server, &op, Some(ray_resource("my-cluster", "RUNNING"))).await;

    let params = CreateClusterParams::new().with_cluster_name("my-cluster");
    let name = ray::create_ray_cluster(&client(&server), PARENT, &params, &fast_poll(), None)
        .await
        .unwrap();
    assert_eq!(name, cluster_name("my-cluster"));
}

#[tokio::test]
async fn test_create_validation_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let client = client(&server);

    let both = CreateClusterParams::new()
        .with_network("projects/123/global/networks/default")
        .with_psc_interface_config(PscIConfig {
            network_attachment: "my-attachment".to_string(),
        });
    let err = ray::create_ray_cluster(&client, PARENT, &both, &fast_poll(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let two_heads = CreateClusterParams::new().with_head_node_type(Resources::default().with_node_count(2));
    assert!(
        ray::create_ray_cluster(&client, PARENT, &two_heads, &fast_poll(), None)
            .await
            .is_err()
    );

    let bad_versions = CreateClusterParams::new().with_versions("2.9", "3.11");
    assert!(
        ray::create_ray_cluster(&client, PARENT, &bad_versions, &fast_poll(), None)
            .await
            .is_err()
    );

    let bad_name = CreateClusterParams::new().with_cluster_name("Not_Valid");
    assert!(
        ray::create_ray_cluster(&client, PARENT, &bad_name, &fast_poll(), None)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_update_patches_replica_counts() {
    let server = MockServer::start().await;
    let name = cluster_name("ray-1");
    let op = format!("{name}/operations/2");
    Mock::given(method("GET"))
        .and(path(format!("/v1/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ray_resource("ray-1", "RUNNING")))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/v1/{name}")))
        .and(query_param("updateMask", "resource_pools.replica_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": op})))
        .expect(1)
        .mount(&server)
        .await;
    mount_done_operation(&server, &op, Some(ray_resource("ray-1", "RUNNING"))).await;

    let updated = ray::update_ray_cluster(
        &client(&server),
        &name,
        &[Resources::default().with_node_count(5)],
        &fast_poll(),
        None,
    )
    .await
    .unwrap();
    assert_eq!(updated, name);

    let requests = server.received_requests().await.unwrap();
    let patch = requests
        .iter()
        .find(|r| r.method.as_str() == "PATCH")
        .unwrap();
    let body: Value = serde_json::from_slice(&patch.body).unwrap();
    assert_eq!(body["resourcePools"][0]["replicaCount"], "1");
    assert_eq!(body["resourcePools"][1]["replicaCount"], "5");
}

#[tokio::test]
async fn test_update_rejects_pool_count_mismatch() {
    let server = MockServer::start().await;
    let name = cluster_name("ray-1");
    Mock::given(method("GET"))
        .and(path(format!("/v1/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ray_resource("ray-1", "RUNNING")))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = ray::update_ray_cluster(
        &client(&server),
        &name,
        &[Resources::default(), Resources::default()],
        &fast_poll(),
        None,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("worker pools"));
}

#[tokio::test]
async fn test_update_rejects_autoscaling_pool() {
    let server = MockServer::start().await;
    let name = cluster_name("ray-2");
    let mut resource = ray_resource("ray-2", "RUNNING");
    resource["resourcePools"][1]["autoscalingSpec"] =
        json!({"minReplicaCount": "1", "maxReplicaCount": "4"});
    Mock::given(method("GET"))
        .and(path(format!("/v1/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(resource))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = ray::update_ray_cluster(
        &client(&server),
        &name,
        &[Resources::default().with_node_count(3)],
        &fast_poll(),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert!(err.to_string().contains("autoscaling"));
}

#[tokio::test]
async fn test_delete_waits_for_operation() {
    let server = MockServer::start().await;
    let name = cluster_name("ray-1");
    let op = format!("{name}/operations/3");
    Mock::given(method("DELETE"))
        .and(path(format!("/v1/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": op})))
        .expect(1)
        .mount(&server)
        .await;
    mount_done_operation(&server, &op, None).await;

    ray::delete_ray_cluster(&client(&server), &name, &fast_poll(), None)
        .await
        .unwrap();
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
async fn test_job_submission_info_for_running_cluster() {
    let server = MockServer::start().await;
    let name = cluster_name("ray-1");
    Mock::given(method("GET"))
        .and(path(format!("/v1/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ray_resource("ray-1", "RUNNING")))
        .mount(&server)
        .await;

    let info = job_submission_cluster_info(&client(&server), &format!("vertex_ray://{name}"))
        .await
        .unwrap();
    assert_eq!(
        info.address,
        "https://abc123-dot-us-central1.aiplatform-training.googleusercontent.com"
    );
    assert_eq!(info.headers["Authorization"], "Bearer test-token");
}

#[tokio::test]
async fn test_job_submission_info_requires_running_cluster() {
    let server = MockServer::start().await;
    let name = cluster_name("ray-1");
    Mock::given(method("GET"))
        .and(path(format!("/v1/{name}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ray_resource("ray-1", "PROVISIONING")),
        )
        .mount(&server)
        .await;

    let err = job_submission_cluster_info(&client(&server), &name)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not running"));
}
