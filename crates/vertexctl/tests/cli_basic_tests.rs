use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a test command isolated from the caller's environment
fn vertexctl() -> Command {
    let mut cmd = Command::cargo_bin("vertexctl").unwrap();
    cmd.env_remove("VERTEXCTL_PROFILE")
        .env_remove("VERTEXCTL_CONFIG_FILE")
        .env_remove("GOOGLE_OAUTH_ACCESS_TOKEN")
        .env_remove("GOOGLE_CLOUD_PROJECT")
        .env_remove("GOOGLE_CLOUD_LOCATION")
        .env_remove("RUST_LOG");
    cmd
}

/// Config file with one profile pointed at `endpoint`
fn write_config(dir: &Path, endpoint: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        format!(
            r#"default_profile = "test"

[profiles.test]
project = "my-project"
location = "us-central1"
access_token = "test-token"
api_endpoint = "{endpoint}"

[profiles.test.polling]
initial_delay_ms = 10
multiplier = 1.0
max_delay_ms = 10
"#
        ),
    )
    .unwrap();
    path
}

const PARENT: &str = "/v1/projects/my-project/locations/us-central1";

#[test]
fn test_help_flag() {
    vertexctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vertex AI management CLI"))
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn test_version_flag() {
    vertexctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vertexctl"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command_json() {
    vertexctl()
        .args(["version", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "vertexctl""#));
}

#[test]
fn test_no_args_shows_help() {
    vertexctl()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_subcommand() {
    vertexctl()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_completions_bash() {
    vertexctl()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vertexctl"));
}

#[test]
fn test_update_requires_worker_count() {
    vertexctl()
        .args(["cluster", "update", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--worker-count"));
}

#[test]
fn test_profile_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("nested").join("config.toml");
    let config_arg = config.to_str().unwrap();

    vertexctl()
        .args(["--config-file", config_arg, "profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles configured"));

    vertexctl()
        .args([
            "--config-file",
            config_arg,
            "profile",
            "set",
            "dev",
            "--project",
            "my-project",
            "--access-token",
            "ya29.secret",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("profile 'dev'"))
        .stdout(predicate::str::contains("Set 'dev' as the default profile"));
    assert!(config.exists());

    vertexctl()
        .args(["--config-file", config_arg, "profile", "show", "dev", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""project": "my-project""#))
        .stdout(predicate::str::contains(r#""location": "us-central1""#))
        .stdout(predicate::str::contains("ya29.secret").not());

    vertexctl()
        .args(["--config-file", config_arg, "profile", "list", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""is_default": true"#));

    vertexctl()
        .args(["--config-file", config_arg, "profile", "remove", "dev"])
        .assert()
        .success();

    vertexctl()
        .args(["--config-file", config_arg, "profile", "show", "dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'dev' not found"));
}

#[test]
fn test_default_requires_existing_profile() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), "http://127.0.0.1:9");

    vertexctl()
        .args(["--config-file", config.to_str().unwrap()])
        .args(["profile", "default", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'missing' not found"));
}

#[test]
fn test_commands_without_profile_explain_setup() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("empty.toml");

    vertexctl()
        .args(["--config-file", config.to_str().unwrap(), "index", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No profile configured"))
        .stderr(predicate::str::contains("vertexctl profile set"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_index_list_renders_and_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/indexes")))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("filter", "labels.team=search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexes": [
                {
                    "name": "projects/my-project/locations/us-central1/indexes/111",
                    "displayName": "products",
                    "indexStats": {"vectorsCount": "1200", "shardsCount": 1}
                },
                {
                    "name": "projects/my-project/locations/us-central1/indexes/222",
                    "displayName": "reviews"
                }
            ]
        })))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &server.uri());

    vertexctl()
        .args(["--config-file", config.to_str().unwrap()])
        .args(["index", "list", "--filter", "labels.team=search"])
        .assert()
        .success()
        .stdout(predicate::str::contains("products"))
        .stdout(predicate::str::contains("1200"));

    vertexctl()
        .args(["--config-file", config.to_str().unwrap()])
        .args(["index", "list", "--filter", "labels.team=search"])
        .args(["-q", "[].displayName", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""reviews""#))
        .stdout(predicate::str::contains("indexStats").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_index_get_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/indexes/404")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Index not found", "status": "NOT_FOUND"}
        })))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &server.uri());

    vertexctl()
        .args(["--config-file", config.to_str().unwrap(), "index", "get", "404"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Index not found"))
        .stderr(predicate::str::contains("tip"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_index_delete_without_wait_prints_operation() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{PARENT}/indexes/111")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/my-project/locations/us-central1/indexes/111/operations/9"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &server.uri());

    vertexctl()
        .args(["--config-file", config.to_str().unwrap(), "index", "delete", "111"])
        .assert()
        .success()
        .stdout(predicate::str::contains("indexes/111/operations/9"))
        .stdout(predicate::str::contains("vertexctl operation wait"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_operation_wait_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/operations/77")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/my-project/locations/us-central1/operations/77",
            "done": true,
            "error": {"code": 8, "message": "Quota exceeded for aiplatform.googleapis.com"}
        })))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &server.uri());

    vertexctl()
        .args(["--config-file", config.to_str().unwrap()])
        .args([
            "operation",
            "wait",
            "projects/my-project/locations/us-central1/operations/77",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed (code 8)"))
        .stderr(predicate::str::contains("Quota exceeded"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cluster_list_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PARENT}/persistentResources")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &server.uri());

    vertexctl()
        .args(["--config-file", config.to_str().unwrap(), "cluster", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No Ray clusters"));

    vertexctl()
        .args(["--config-file", config.to_str().unwrap()])
        .args(["cluster", "list", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_example_remove_sends_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/v1beta1/projects/my-project/locations/us-central1/exampleStores/42:removeExamples",
        ))
        .and(body_json(json!({"exampleIds": ["a", "b"]})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"exampleIds": ["a", "b"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &server.uri());

    vertexctl()
        .args(["--config-file", config.to_str().unwrap()])
        .args(["example", "remove", "--store", "42", "--id", "a", "--id", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 example(s)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_extension_import_rejects_incomplete_file_locally() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &server.uri());
    let manifest = temp_dir.path().join("extension.yaml");
    std::fs::write(&manifest, "displayName: Code Interpreter\n").unwrap();

    vertexctl()
        .args(["--config-file", config.to_str().unwrap()])
        .args(["extension", "import", "--file", manifest.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input"))
        .stderr(predicate::str::contains("manifest.name"));
}
