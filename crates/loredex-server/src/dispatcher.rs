//! Line-delimited tool protocol dispatcher
//!
//! One JSON value per line in each direction. Every inbound line gets
//! exactly one response line, emitted before the next line is read, so
//! responses are strictly FIFO with arrival order. Operation failures
//! travel inside the result envelope; only unparseable frames and
//! unknown methods become protocol-level errors.

use crate::tools::{tool_catalog, ResourceDetail, ResourceSummary, ToolResponse, ToolSpec};
use anyhow::Result;
use loredex_search::{ResourceCatalog, SearchError, SearchOptions};
use loredex_types::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Protocol error code for frames that are not valid requests
const PARSE_ERROR: i64 = -32700;
/// Protocol error code for methods the server does not implement
const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    loredex_search::DEFAULT_SEARCH_LIMIT
}

#[derive(Debug, Deserialize)]
struct GetArgs {
    name: String,
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListArgs {
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Serialize)]
struct RpcReply {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcReply {
    fn result(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(RpcError { code, message }),
        }
    }
}

/// Routes protocol requests to catalog operations and frames responses
pub struct Dispatcher {
    index_dir: PathBuf,
    workspace_root: PathBuf,
    system_rules: PathBuf,
    tools: Vec<ToolSpec>,
}

impl Dispatcher {
    /// Create a dispatcher serving the given index and workspace
    pub fn new(
        index_dir: impl Into<PathBuf>,
        workspace_root: impl Into<PathBuf>,
        system_rules: impl Into<PathBuf>,
    ) -> Self {
        Self {
            index_dir: index_dir.into(),
            workspace_root: workspace_root.into(),
            system_rules: system_rules.into(),
            tools: tool_catalog(),
        }
    }

    /// Serve the protocol until the counterpart closes the stream.
    ///
    /// Emits the `server/info` notification first, then one response
    /// line per request line.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Serving tool protocol for index at {:?}", self.index_dir);
        send_line(&mut writer, &self.server_info()).await?;

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let reply = self.handle_line(&line);
            send_line(&mut writer, &reply).await?;
        }

        info!("Protocol stream closed, shutting down");
        Ok(())
    }

    fn server_info(&self) -> Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "method": "server/info",
            "params": {
                "name": "loredex",
                "version": env!("CARGO_PKG_VERSION"),
                "description": "Search and retrieve skills, agents, prompts, and instructions",
                "tools": self.tools,
            }
        })
    }

    /// Handle one inbound frame; every frame yields exactly one reply
    fn handle_line(&self, line: &str) -> RpcReply {
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!("Malformed request frame: {}", e);
                return RpcReply::error(None, PARSE_ERROR, format!("Parse error: {e}"));
            }
        };

        match request.method.as_str() {
            "tools/list" => RpcReply::result(
                request.id,
                serde_json::json!({ "tools": self.tools }),
            ),
            "tools/call" => {
                let call: CallParams = match serde_json::from_value(request.params) {
                    Ok(call) => call,
                    Err(e) => {
                        warn!("Malformed tools/call params: {}", e);
                        return RpcReply::error(
                            request.id,
                            PARSE_ERROR,
                            format!("Invalid params: {e}"),
                        );
                    }
                };
                debug!("Tool call '{}'", call.name);
                let response = self.handle_tool_call(&call.name, call.arguments);
                match serde_json::to_value(&response) {
                    Ok(result) => RpcReply::result(request.id, result),
                    Err(e) => RpcReply::error(
                        request.id,
                        PARSE_ERROR,
                        format!("Failed to encode result: {e}"),
                    ),
                }
            }
            other => RpcReply::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {other}"),
            ),
        }
    }

    /// Route one tool call; all operation errors land in the envelope
    fn handle_tool_call(&self, tool: &str, args: Value) -> ToolResponse {
        match tool {
            "search_resources" => self.tool_search(args),
            "get_resource" => self.tool_get(args),
            "list_resources" => self.tool_list(args),
            "get_system_rules" => self.tool_system_rules(),
            "get_resource_stats" => self.tool_stats(),
            other => ToolResponse::failure(format!("Unknown tool: {other}")),
        }
    }

    /// Load the catalog fresh from disk; every call sees the latest build
    fn catalog(&self) -> Result<ResourceCatalog, SearchError> {
        ResourceCatalog::load(&self.index_dir, &self.workspace_root)
    }

    fn tool_search(&self, args: Value) -> ToolResponse {
        let args: SearchArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(e) => return ToolResponse::failure(format!("Invalid arguments: {e}")),
        };
        let kind = match parse_kind(args.kind.as_deref()) {
            Ok(kind) => kind,
            Err(message) => return ToolResponse::failure(message),
        };

        let options = SearchOptions {
            kind,
            tags: args.tags,
            limit: args.limit,
        };
        match self.catalog() {
            Ok(catalog) => {
                let results = catalog
                    .search(&args.query, &options)
                    .into_iter()
                    .map(ResourceSummary::hit)
                    .collect();
                ToolResponse::search(results)
            }
            Err(e) => ToolResponse::failure(e.to_string()),
        }
    }

    fn tool_get(&self, args: Value) -> ToolResponse {
        let args: GetArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(e) => return ToolResponse::failure(format!("Invalid arguments: {e}")),
        };
        let kind = match parse_kind(args.kind.as_deref()) {
            Ok(kind) => kind,
            Err(message) => return ToolResponse::failure(message),
        };

        match self.catalog().and_then(|c| c.get_by_name(&args.name, kind)) {
            Ok(loaded) => ToolResponse::resource(ResourceDetail::from(&loaded)),
            Err(e) => ToolResponse::failure(e.to_string()),
        }
    }

    fn tool_list(&self, args: Value) -> ToolResponse {
        let args: ListArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(e) => return ToolResponse::failure(format!("Invalid arguments: {e}")),
        };
        let kind = match parse_kind(args.kind.as_deref()) {
            Ok(kind) => kind,
            Err(message) => return ToolResponse::failure(message),
        };

        match self.catalog() {
            Ok(catalog) => {
                let resources = catalog
                    .list(kind)
                    .into_iter()
                    .map(ResourceSummary::listing)
                    .collect();
                ToolResponse::list(resources)
            }
            Err(e) => ToolResponse::failure(e.to_string()),
        }
    }

    fn tool_system_rules(&self) -> ToolResponse {
        match fs::read_to_string(&self.system_rules) {
            Ok(rules) => ToolResponse::system_rules(rules),
            Err(e) => ToolResponse::failure_at(
                format!("Could not load system rules: {e}"),
                self.system_rules.to_string_lossy(),
            ),
        }
    }

    fn tool_stats(&self) -> ToolResponse {
        match self.catalog() {
            Ok(catalog) => ToolResponse::stats(catalog.stats()),
            Err(e) => ToolResponse::failure(e.to_string()),
        }
    }
}

/// Parse an optional kind argument into the enum, with a
/// caller-friendly message on failure
fn parse_kind(raw: Option<&str>) -> Result<Option<ResourceKind>, String> {
    match raw {
        None => Ok(None),
        Some(raw) => raw
            .parse::<ResourceKind>()
            .map(Some)
            .map_err(|e| e.to_string()),
    }
}

async fn send_line<W, T>(writer: &mut W, value: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut frame = serde_json::to_vec(value)?;
    frame.push(b'\n');
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
