//! End-to-end tool calls through `SkiffServer::dispatch` on the memory backend.

use rmcp::model::CallToolResult;
use serde_json::{json, Value};
use skiff_core::SandboxRegistry;
use skiff_mcp::{attach_sessions, parse_sessions, BackendKind, SkiffConfig, SkiffServer};
use std::sync::Arc;

async fn memory_server(sessions: &str) -> SkiffServer {
    let config = SkiffConfig {
        backend: BackendKind::Memory,
        sessions: parse_sessions(sessions).unwrap(),
        ..Default::default()
    };
    let registry = Arc::new(SandboxRegistry::new());
    attach_sessions(&config, &registry).await;
    SkiffServer::new(registry)
}

async fn call(server: &SkiffServer, tool: &str, args: Value) -> (Value, bool) {
    let args = match args {
        Value::Object(map) => Some(map),
        _ => None,
    };
    let result: CallToolResult = server.dispatch(tool, args).await;
    let json = serde_json::to_value(&result).unwrap();
    let text = json["content"][0]["text"].as_str().unwrap().to_string();
    let is_error = json["isError"].as_bool().unwrap_or(false);
    (serde_json::from_str(&text).unwrap(), is_error)
}

#[tokio::test]
async fn test_write_list_read_delete_flow() {
    let server = memory_server("s1=box").await;

    let (body, is_error) = call(
        &server,
        "write_file",
        json!({ "session_id": "s1", "file_path": "/work/notes.txt", "content": "hello" }),
    )
    .await;
    assert!(!is_error);
    assert_eq!(
        body,
        json!({ "path": "/work/notes.txt", "message": "File written successfully" })
    );

    let (body, _) = call(&server, "list_files", json!({ "session_id": "s1", "path": "/work" })).await;
    assert_eq!(
        body,
        json!({
            "path": "/work",
            "files": [{ "name": "notes.txt", "path": "/work/notes.txt", "type": "file" }]
        })
    );

    let (body, _) = call(
        &server,
        "read_file",
        json!({ "session_id": "s1", "file_path": "/work/notes.txt" }),
    )
    .await;
    assert_eq!(body, json!({ "path": "/work/notes.txt", "content": "hello" }));

    let (body, _) = call(
        &server,
        "get_file_metadata",
        json!({ "session_id": "s1", "file_path": "/work/notes.txt" }),
    )
    .await;
    assert_eq!(
        body,
        json!({ "path": "/work/notes.txt", "metadata": { "is_dir": false, "size": 5 } })
    );

    let (body, is_error) = call(
        &server,
        "delete_file",
        json!({ "session_id": "s1", "file_path": "/work/notes.txt" }),
    )
    .await;
    assert!(!is_error);
    assert_eq!(body["message"], "File deleted successfully");

    let (body, is_error) = call(
        &server,
        "read_file",
        json!({ "session_id": "s1", "file_path": "/work/notes.txt" }),
    )
    .await;
    assert!(is_error);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Error reading file: "));
}

#[tokio::test]
async fn test_upload_defaults_to_root() {
    let server = memory_server("s1=box").await;

    let (body, is_error) = call(
        &server,
        "upload_file",
        json!({ "session_id": "s1", "file_name": "data.csv", "file_content": "a,b" }),
    )
    .await;
    assert!(!is_error);
    assert_eq!(
        body,
        json!({ "path": "/data.csv", "message": "File uploaded successfully" })
    );

    let (body, _) = call(&server, "list_files", json!({ "session_id": "s1" })).await;
    assert_eq!(body["path"], "/");
    assert_eq!(body["files"][0]["path"], "/data.csv");
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let server = memory_server("a=box-a,b=box-b").await;

    call(
        &server,
        "write_file",
        json!({ "session_id": "a", "file_path": "/only-a.txt", "content": "x" }),
    )
    .await;

    let (body, _) = call(&server, "list_files", json!({ "session_id": "b" })).await;
    assert_eq!(body["files"], json!([]));
}

#[tokio::test]
async fn test_unknown_session() {
    let server = memory_server("s1=box").await;

    let (body, is_error) = call(&server, "list_files", json!({ "session_id": "nope" })).await;
    assert!(is_error);
    assert_eq!(
        body,
        json!({ "error": "No sandbox found with session ID: nope. Create a sandbox first." })
    );
}

#[tokio::test]
async fn test_missing_arguments() {
    let server = memory_server("s1=box").await;

    let (body, is_error) = call(&server, "write_file", json!({ "session_id": "s1" })).await;
    assert!(is_error);
    assert_eq!(
        body,
        json!({ "error": "Missing required parameters: session_id, file_path, content" })
    );

    let (body, is_error) = call(&server, "read_file", Value::Null).await;
    assert!(is_error);
    assert_eq!(
        body,
        json!({ "error": "Missing required parameters: session_id, file_path" })
    );
}

#[tokio::test]
async fn test_unknown_tool() {
    let server = memory_server("s1=box").await;

    let (body, is_error) = call(&server, "execute_code", json!({})).await;
    assert!(is_error);
    assert_eq!(body, json!({ "error": "Unknown tool: execute_code" }));
}
