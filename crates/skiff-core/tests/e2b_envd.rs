//! Contract tests for the E2B backend against a mock envd and control plane.

use serde_json::json;
use skiff_core::e2b::{E2bConfig, E2bSandbox};
use skiff_core::{CoreError, EntryType, FileError, FileInterface, FileMetadata};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `Basic base64("user:")`
const USER_BASIC_AUTH: &str = "Basic dXNlcjo=";

async fn attach(server: &MockServer) -> skiff_core::Sandbox {
    E2bSandbox::with_envd_url(
        &E2bConfig::default(),
        "sbx-test",
        server.uri(),
        Some("envd-token".to_string()),
    )
    .expect("client builds")
    .into_handle()
}

#[tokio::test]
async fn test_list_calls_list_dir_rpc() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/filesystem.Filesystem/ListDir"))
        .and(header("Connect-Protocol-Version", "1"))
        .and(header("Authorization", USER_BASIC_AUTH))
        .and(header("X-Access-Token", "envd-token"))
        .and(body_json(json!({ "path": "/home/user", "depth": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [
                { "name": "main.py", "type": "FILE_TYPE_FILE", "path": "/home/user/main.py", "size": "120" },
                { "name": "data", "type": "FILE_TYPE_DIRECTORY", "path": "/home/user/data" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sandbox = attach(&server).await;
    let entries = sandbox.files().list("/home/user").await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "main.py");
    assert_eq!(entries[0].kind, EntryType::File);
    assert_eq!(entries[1].path, "/home/user/data");
    assert_eq!(entries[1].kind, EntryType::Dir);
}

#[tokio::test]
async fn test_read_downloads_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("path", "/home/user/a.txt"))
        .and(query_param("username", "user"))
        .and(header("X-Access-Token", "envd-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello sandbox"))
        .expect(1)
        .mount(&server)
        .await;

    let sandbox = attach(&server).await;
    let content = sandbox.files().read("/home/user/a.txt").await.unwrap();

    assert_eq!(content, "hello sandbox");
}

#[tokio::test]
async fn test_read_missing_file_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 404,
            "message": "path '/nope' does not exist"
        })))
        .mount(&server)
        .await;

    let sandbox = attach(&server).await;
    let err = sandbox.files().read("/nope").await.unwrap_err();

    assert_eq!(err, FileError::NotFound("path '/nope' does not exist".into()));
}

#[tokio::test]
async fn test_write_uploads_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("path", "/logs/a.txt"))
        .and(query_param("username", "user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "a.txt", "type": "file", "path": "/logs/a.txt" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let sandbox = attach(&server).await;
    sandbox.files().write("/logs/a.txt", "line one\n").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("line one\n"));
}

#[tokio::test]
async fn test_write_disk_full_is_io_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(
            ResponseTemplate::new(507).set_body_json(json!({ "code": 507, "message": "no space" })),
        )
        .mount(&server)
        .await;

    let sandbox = attach(&server).await;
    let err = sandbox.files().write("/big.bin", "x").await.unwrap_err();

    assert!(matches!(err, FileError::Io(_)));
}

#[tokio::test]
async fn test_stat_uses_filesystem_info_and_narrows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/filesystem.Filesystem/Stat"))
        .and(body_json(json!({ "path": "/home/user/data.csv" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entry": {
                "name": "data.csv",
                "type": "FILE_TYPE_FILE",
                "path": "/home/user/data.csv",
                "size": "2048",
                "mode": 420,
                "permissions": "-rw-r--r--",
                "owner": "user",
                "group": "user",
                "modifiedTime": "2024-05-01T10:00:00Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sandbox = attach(&server).await;
    let metadata = sandbox.files().stat("/home/user/data.csv").await.unwrap();

    assert_eq!(
        metadata,
        FileMetadata {
            is_dir: false,
            size: 2048,
        }
    );
}

#[tokio::test]
async fn test_stat_not_found_maps_connect_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/filesystem.Filesystem/Stat"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "not_found",
            "message": "file not found: /ghost"
        })))
        .mount(&server)
        .await;

    let sandbox = attach(&server).await;
    let err = sandbox.files().stat("/ghost").await.unwrap_err();

    assert_eq!(err, FileError::NotFound("file not found: /ghost".into()));
}

#[tokio::test]
async fn test_delete_uses_filesystem_remove() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/filesystem.Filesystem/Remove"))
        .and(body_json(json!({ "path": "/tmp/old.log" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let sandbox = attach(&server).await;
    sandbox.files().delete("/tmp/old.log").await.unwrap();
}

#[tokio::test]
async fn test_delete_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/filesystem.Filesystem/Remove"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "permission_denied",
            "message": "operation not permitted"
        })))
        .mount(&server)
        .await;

    let sandbox = attach(&server).await;
    let err = sandbox.files().delete("/etc/passwd").await.unwrap_err();

    assert_eq!(
        err,
        FileError::PermissionDenied("operation not permitted".into())
    );
}

#[tokio::test]
async fn test_connect_fetches_sandbox_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sandboxes/sbx-live"))
        .and(header("X-API-Key", "e2b_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sandboxID": "sbx-live",
            "templateID": "code-interpreter-v1",
            "clientID": "6532622b",
            "envdVersion": "0.2.0",
            "envdAccessToken": "tok",
            "domain": "e2b.example"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = E2bConfig {
        api_key: Some("e2b_key".into()),
        api_url: server.uri(),
        ..Default::default()
    };
    let sandbox = E2bSandbox::connect(&config, "sbx-live").await.unwrap();

    assert_eq!(sandbox.id(), "sbx-live");
}

#[tokio::test]
async fn test_connect_unknown_sandbox_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sandboxes/sbx-gone"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "code": 404, "message": "sandbox not found" })),
        )
        .mount(&server)
        .await;

    let config = E2bConfig {
        api_key: Some("e2b_key".into()),
        api_url: server.uri(),
        ..Default::default()
    };
    let err = E2bSandbox::connect(&config, "sbx-gone").await.unwrap_err();

    assert!(matches!(err, CoreError::Api { status: 404, .. }));
}
