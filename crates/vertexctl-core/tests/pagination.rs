//! Lazy pagination over list and search calls

use futures::TryStreamExt;
use serde_json::json;
use vertexctl_core::services::{
    ExampleStoreHandler, FetchExamplesRequest, IndexHandler, JobServiceHandler, ListIndexesParams,
    SearchModelDeploymentMonitoringStatsAnomaliesRequest,
};
use vertexctl_core::{AiPlatformClient, BlockingClient, CoreError};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PARENT: &str = "projects/test-project/locations/us-central1";

fn client(server: &MockServer) -> AiPlatformClient {
    AiPlatformClient::builder()
        .base_url(server.uri())
        .access_token("test-token")
        .build()
        .unwrap()
}

fn index(id: u32) -> serde_json::Value {
    json!({
        "name": format!("{PARENT}/indexes/{id}"),
        "displayName": format!("index-{id}"),
        "indexStats": {"vectorsCount": "1000", "shardsCount": 1}
    })
}

async fn mount_index_pages(server: &MockServer) {
    // Most specific first: token-bearing requests must not hit the first page mock
    Mock::given(method("GET"))
        .and(path(format!("/v1/{PARENT}/indexes")))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexes": [index(3)],
            "nextPageToken": ""
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{PARENT}/indexes")))
        .and(query_param("pageSize", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexes": [index(1), index(2)],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_collect_follows_tokens_one_call_per_page() {
    let server = MockServer::start().await;
    mount_index_pages(&server).await;

    let handler = IndexHandler::new(client(&server));
    let mut pager = handler
        .list_indexes(&ListIndexesParams::new(PARENT).with_page_size(2))
        .unwrap();

    let first = pager.next_page().await.unwrap().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(pager.page_token(), Some("page-2"));
    assert!(!pager.is_finished());

    let second = pager.next_page().await.unwrap().unwrap();
    assert_eq!(second[0].display_name, "index-3");
    assert_eq!(second[0].index_stats.as_ref().unwrap().vectors_count, Some(1000));
    assert!(pager.is_finished());
    assert_eq!(pager.pages_fetched(), 2);

    assert!(pager.next_page().await.unwrap().is_none());
}

#[tokio::test]
async fn test_stream_yields_items_in_page_order() {
    let server = MockServer::start().await;
    mount_index_pages(&server).await;

    let handler = IndexHandler::new(client(&server));
    let names: Vec<String> = handler
        .list_indexes(&ListIndexesParams::new(PARENT).with_page_size(2))
        .unwrap()
        .into_stream()
        .map_ok(|index| index.display_name)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(names, vec!["index-1", "index-2", "index-3"]);
}

#[tokio::test]
async fn test_failed_page_is_retried_with_same_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{PARENT}/indexes")))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": 503, "message": "Backend unavailable", "status": "UNAVAILABLE"}
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_index_pages(&server).await;

    let handler = IndexHandler::new(client(&server));
    let mut pager = handler
        .list_indexes(&ListIndexesParams::new(PARENT).with_page_size(2))
        .unwrap();

    pager.next_page().await.unwrap();
    let err = pager.next_page().await.unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(pager.page_token(), Some("page-2"));
    assert_eq!(pager.pages_fetched(), 1);

    let retried = pager.next_page().await.unwrap().unwrap();
    assert_eq!(retried.len(), 1);
    assert!(pager.is_finished());
}

#[tokio::test]
async fn test_empty_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{PARENT}/indexes")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let handler = IndexHandler::new(client(&server));
    let all = handler
        .list_indexes(&ListIndexesParams::new(PARENT))
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_post_pager_carries_token_in_body() {
    let server = MockServer::start().await;
    let store = format!("{PARENT}/exampleStores/9");
    Mock::given(method("POST"))
        .and(path(format!("/v1beta1/{store}:fetchExamples")))
        .and(body_partial_json(json!({"pageToken": "next"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "examples": [{"exampleId": "b"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v1beta1/{store}:fetchExamples")))
        .and(body_partial_json(json!({"exampleIds": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "examples": [{"exampleId": "a"}],
            "nextPageToken": "next"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let handler = ExampleStoreHandler::new(client(&server));
    let examples = handler
        .fetch_examples(
            &FetchExamplesRequest::new(&store)
                .with_example_ids(vec!["a".to_string(), "b".to_string()]),
        )
        .unwrap()
        .collect()
        .await
        .unwrap();

    let ids: Vec<_> = examples
        .iter()
        .filter_map(|e| e.example_id.as_deref())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn test_blocking_iteration_over_search_results() {
    let blocking = BlockingClient::new().unwrap();
    let server = blocking.block_on(MockServer::start());
    let job = format!("{PARENT}/modelDeploymentMonitoringJobs/123");
    blocking.block_on(
        Mock::given(method("POST"))
            .and(path(format!(
                "/v1/{job}:searchModelDeploymentMonitoringStatsAnomalies"
            )))
            .and(body_partial_json(json!({
                "modelDeploymentMonitoringJob": job,
                "deployedModelId": "456"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "monitoringStats": [
                    {"objective": "RAW_FEATURE_SKEW", "deployedModelId": "456", "anomalyCount": 2},
                    {"objective": "RAW_FEATURE_DRIFT", "deployedModelId": "456", "anomalyCount": 0}
                ]
            })))
            .expect(1)
            .mount(&server),
    );

    let handler = JobServiceHandler::new(client(&server));
    let pager = handler
        .search_model_deployment_monitoring_stats_anomalies(
            &SearchModelDeploymentMonitoringStatsAnomaliesRequest::new(&job, "456"),
        )
        .unwrap();

    let stats: Vec<_> = blocking
        .iter(pager)
        .collect::<Result<Vec<_>, CoreError>>()
        .unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].anomaly_count, 2);
}
