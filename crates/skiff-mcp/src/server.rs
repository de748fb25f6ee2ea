//! SkiffServer - MCP server that exposes sandbox file operations as tools.
//!
//! This module implements ServerHandler manually: tool schemas are built
//! from the parameter types, and `call_tool` dispatches by name to the
//! handlers in [`FileTools`].

use crate::tools::FileTools;
use crate::types::*;

use rmcp::{
    handler::server::ServerHandler,
    model::*,
    service::{RequestContext, RoleServer},
    ErrorData,
};
use schemars::schema_for;
use serde::{de::DeserializeOwned, Serialize};
use skiff_core::SessionRegistry;
use std::sync::Arc;

/// Names of the tools this server exposes, in listing order.
pub const TOOL_NAMES: [&str; 6] = [
    "list_files",
    "read_file",
    "write_file",
    "upload_file",
    "delete_file",
    "get_file_metadata",
];

/// MCP server for sandbox file operations.
#[derive(Clone)]
pub struct SkiffServer {
    tools: FileTools,
}

impl SkiffServer {
    /// Create a server that resolves sessions through `registry`.
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self {
            tools: FileTools::new(registry),
        }
    }

    /// Get the tool handlers.
    pub fn tools(&self) -> &FileTools {
        &self.tools
    }

    /// Deserialize tool arguments, or produce the error envelope naming
    /// the required parameters.
    fn parse_params<T: DeserializeOwned>(
        args: Option<serde_json::Map<String, serde_json::Value>>,
        required: &str,
    ) -> Result<T, CallToolResult> {
        match args
            .map(|a| serde_json::from_value(serde_json::Value::Object(a)))
            .transpose()
        {
            Ok(Some(p)) => Ok(p),
            _ => Err(Self::error_result(format!(
                "Missing required parameters: {required}"
            ))),
        }
    }

    /// Render an envelope as tool output. Failure envelopes are flagged
    /// as tool errors.
    fn envelope_result<T: Serialize>(response: &ToolResponse<T>) -> CallToolResult {
        let json = match serde_json::to_string_pretty(response) {
            Ok(json) => json,
            Err(e) => return Self::error_result(format!("JSON serialization error: {e}")),
        };

        if response.is_error() {
            CallToolResult::error(vec![Content::text(json)])
        } else {
            CallToolResult::success(vec![Content::text(json)])
        }
    }

    /// Helper to create an `{"error": ...}` result
    fn error_result(message: impl Into<String>) -> CallToolResult {
        Self::envelope_result(&ToolResponse::<()>::failure(message))
    }

    /// Convert schemars RootSchema to rmcp JsonObject
    fn schema_to_json_object<T: schemars::JsonSchema>(
    ) -> Arc<serde_json::Map<String, serde_json::Value>> {
        let schema = schema_for!(T);
        let json = serde_json::to_value(&schema.schema).unwrap_or_else(|_| serde_json::json!({}));
        match json {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::new()),
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Run a tool by name with raw JSON arguments.
    ///
    /// Always produces a result; unknown tools and bad arguments become
    /// error envelopes.
    pub async fn dispatch(
        &self,
        name: &str,
        args: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> CallToolResult {
        tracing::debug!(tool = %name, "Tool call");

        match name {
            "list_files" => match Self::parse_params::<ListFilesParams>(args, "session_id") {
                Ok(p) => Self::envelope_result(&self.tools.list_files(&p.session_id, &p.path).await),
                Err(e) => e,
            },
            "read_file" => {
                match Self::parse_params::<ReadFileParams>(args, "session_id, file_path") {
                    Ok(p) => Self::envelope_result(
                        &self.tools.read_file(&p.session_id, &p.file_path).await,
                    ),
                    Err(e) => e,
                }
            }
            "write_file" => match Self::parse_params::<WriteFileParams>(
                args,
                "session_id, file_path, content",
            ) {
                Ok(p) => Self::envelope_result(
                    &self
                        .tools
                        .write_file(&p.session_id, &p.file_path, &p.content)
                        .await,
                ),
                Err(e) => e,
            },
            "upload_file" => match Self::parse_params::<UploadFileParams>(
                args,
                "session_id, file_name, file_content",
            ) {
                Ok(p) => Self::envelope_result(
                    &self
                        .tools
                        .upload_file(
                            &p.session_id,
                            &p.file_name,
                            &p.file_content,
                            &p.destination_path,
                        )
                        .await,
                ),
                Err(e) => e,
            },
            "delete_file" => {
                match Self::parse_params::<DeleteFileParams>(args, "session_id, file_path") {
                    Ok(p) => Self::envelope_result(
                        &self.tools.delete_file(&p.session_id, &p.file_path).await,
                    ),
                    Err(e) => e,
                }
            }
            "get_file_metadata" => {
                match Self::parse_params::<GetFileMetadataParams>(args, "session_id, file_path") {
                    Ok(p) => Self::envelope_result(
                        &self
                            .tools
                            .get_file_metadata(&p.session_id, &p.file_path)
                            .await,
                    ),
                    Err(e) => e,
                }
            }
            _ => Self::error_result(format!("Unknown tool: {name}")),
        }
    }

    /// Build the list of available tools
    pub fn build_tools_list() -> Vec<Tool> {
        vec![
            Tool::new(
                "list_files",
                "List files in the sandbox at the specified path (default: root directory).",
                Self::schema_to_json_object::<ListFilesParams>(),
            ),
            Tool::new(
                "read_file",
                "Read the contents of a file in the sandbox.",
                Self::schema_to_json_object::<ReadFileParams>(),
            ),
            Tool::new(
                "write_file",
                "Write content to a file in the sandbox, replacing it if it exists.",
                Self::schema_to_json_object::<WriteFileParams>(),
            ),
            Tool::new(
                "upload_file",
                "Upload a file to the sandbox: creates file_name inside destination_path.",
                Self::schema_to_json_object::<UploadFileParams>(),
            ),
            Tool::new(
                "delete_file",
                "Delete a file in the sandbox.",
                Self::schema_to_json_object::<DeleteFileParams>(),
            ),
            Tool::new(
                "get_file_metadata",
                "Get metadata (is_dir, size) for a file in the sandbox.",
                Self::schema_to_json_object::<GetFileMetadataParams>(),
            ),
        ]
    }
}

// ============================================================================
// ServerHandler Implementation
// ============================================================================

impl ServerHandler for SkiffServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Skiff MCP Server - Work with files inside code execution sandboxes. \
                 Every tool takes the session_id of an existing sandbox. Use list_files, \
                 read_file and get_file_metadata to inspect, write_file and upload_file to \
                 create or replace files, and delete_file to remove them."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: Self::build_tools_list(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.dispatch(request.name.as_ref(), request.arguments).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_tools_list() {
        let tools = SkiffServer::build_tools_list();
        assert_eq!(tools.len(), TOOL_NAMES.len());
        for name in TOOL_NAMES {
            assert!(tools.iter().any(|t| t.name == name), "missing {name}");
        }
    }

    #[test]
    fn test_upload_schema_marks_required_fields() {
        let schema = SkiffServer::schema_to_json_object::<UploadFileParams>();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"session_id"));
        assert!(required.contains(&"file_name"));
        assert!(required.contains(&"file_content"));
        assert!(!required.contains(&"destination_path"));
    }

    #[test]
    fn test_error_result_is_flagged() {
        let result = SkiffServer::error_result("boom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isError"], serde_json::json!(true));
        let text = json["content"][0]["text"].as_str().unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(text).unwrap(),
            serde_json::json!({ "error": "boom" })
        );
    }
}
