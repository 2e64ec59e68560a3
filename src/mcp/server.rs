//! Tool server implementation

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use universal_search_core::SearchQuery;

use super::protocol::{
    CallToolResult, DEFAULT_PROTOCOL_VERSION, INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION,
    METHOD_NOT_FOUND, PARSE_ERROR, Request, Response, ToolCallParams,
};
use super::tool;
use crate::search::SearchBackend;

const SERVER_NAME: &str = "universal-search";

/// Tool server handling client requests
pub struct ToolServer {
    backend: Arc<SearchBackend>,
    timeout: Duration,
}

impl ToolServer {
    /// Create a new tool server
    pub fn new(backend: Arc<SearchBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Serve on stdin/stdout until stdin is closed
    pub async fn run(self: Arc<Self>) -> Result<()> {
        info!("Starting tool server on stdio ({} backend)", self.backend.kind());
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve newline-delimited requests from `reader`, writing responses to `writer`.
    ///
    /// Each request is handled on its own task; a single writer task owns the
    /// output so response lines never interleave.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<String>(64);

        let writer_task = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            debug!("Received request: {}", line.trim());

            let server = self.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    if tx.send(response).await.is_err() {
                        warn!("Response dropped, writer has stopped");
                    }
                }
            });
        }

        // Writer finishes once every in-flight request has answered
        drop(tx);
        writer_task.await??;
        info!("Input closed, tool server stopping");
        Ok(())
    }

    /// Handle one raw line; `None` for notifications
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle_request(request).await?,
            Err(e) => Response::error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)),
        };

        match serde_json::to_string(&response) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("Failed to serialize response: {}", e);
                None
            }
        }
    }

    /// Handle a single request
    async fn handle_request(&self, request: Request) -> Option<Response> {
        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);

        if request.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
            return Some(Response::error(id, INVALID_REQUEST, "Expected jsonrpc \"2.0\""));
        }

        let response = match request.method.as_str() {
            "initialize" => {
                let version = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PROTOCOL_VERSION);
                Response::ok(
                    id,
                    json!({
                        "protocolVersion": version,
                        "capabilities": { "tools": {} },
                        "serverInfo": {
                            "name": SERVER_NAME,
                            "version": env!("CARGO_PKG_VERSION"),
                        },
                    }),
                )
            }

            "ping" => Response::ok(id, json!({})),

            "tools/list" => Response::ok(
                id,
                json!({
                    "tools": [{
                        "name": tool::TOOL_NAME,
                        "description": tool::description(self.backend.kind()),
                        "inputSchema": tool::input_schema(),
                    }]
                }),
            ),

            "tools/call" => match serde_json::from_value::<ToolCallParams>(request.params) {
                Ok(params) if params.name == tool::TOOL_NAME => {
                    let result = self.call_search(params.arguments).await;
                    match serde_json::to_value(result) {
                        Ok(value) => Response::ok(id, value),
                        Err(e) => Response::error(id, INVALID_PARAMS, e.to_string()),
                    }
                }
                Ok(params) => {
                    Response::error(id, INVALID_PARAMS, format!("Unknown tool: {}", params.name))
                }
                Err(e) => Response::error(id, INVALID_PARAMS, format!("Invalid params: {}", e)),
            },

            "resources/list" => Response::ok(id, json!({ "resources": [] })),
            "resources/templates/list" => Response::ok(id, json!({ "resourceTemplates": [] })),
            "prompts/list" => Response::ok(id, json!({ "prompts": [] })),

            other => Response::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", other)),
        };

        Some(response)
    }

    /// Run the search tool. Every failure is rendered as text.
    async fn call_search(&self, arguments: Value) -> CallToolResult {
        let query = match SearchQuery::from_arguments(arguments) {
            Ok(q) => q,
            Err(e) => return CallToolResult::failure(e),
        };

        let backend = self.backend.clone();
        let task = tokio::task::spawn_blocking(move || backend.search(&query));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(results))) => CallToolResult::text(tool::render_results(&results)),
            Ok(Ok(Err(e))) => {
                warn!("Search failed: {}", e);
                CallToolResult::failure(e)
            }
            Ok(Err(e)) => CallToolResult::failure(format!("search task failed: {}", e)),
            Err(_) => {
                CallToolResult::failure(format!("timed out after {}s", self.timeout.as_secs()))
            }
        }
    }
}
