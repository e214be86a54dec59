use crate::app::App;
use crate::errors::{ErrorCode, McpError, ToolError, ToolErrorKind};
use crate::mcp::catalog::{tool_catalog, validate_tool_args};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

const PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "cwaf-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn map_tool_error(tool: &str, error: &ToolError) -> McpError {
    let lines = vec![
        "ToolError".to_string(),
        format!("tool: {}", tool),
        format!("kind: {:?}", error.kind).to_lowercase(),
        format!("code: {}", error.code),
        format!("retryable: {}", error.retryable),
        format!("message: {}", error.message),
    ];
    let message = lines.join("\n");

    match error.kind {
        ToolErrorKind::InvalidParams => McpError::new(ErrorCode::InvalidParams, message),
        ToolErrorKind::Timeout => McpError::new(ErrorCode::RequestTimeout, message),
        _ => McpError::new(ErrorCode::InternalError, message),
    }
}

pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub async fn new() -> Result<Self, ToolError> {
        let app = App::initialize()?;
        Ok(Self { app: Arc::new(app) })
    }

    async fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"list": true, "call": true}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    async fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": tool_catalog() })
    }

    async fn handle_tools_call(&self, name: &str, args: Value) -> Result<Value, McpError> {
        let Some(handler) = self.app.handlers.get(name) else {
            return Err(McpError::new(
                ErrorCode::InvalidParams,
                format!("Unknown tool: {}", name),
            ));
        };
        validate_tool_args(name, &args)?;

        let ctx = self.app.auth.request_context();
        let logger = self.app.logger.with_trace(ctx.trace_id());
        logger.info("tool call", Some(&serde_json::json!({"tool": name})));

        let result = handler
            .handle(args, &ctx)
            .await
            .map_err(|err| map_tool_error(name, &err))?;

        Ok(serde_json::json!({
            "content": [{
                "type": "text",
                "text": serde_json::to_string(&result).unwrap_or_else(|_| "{}".to_string()),
            }]
        }))
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin).lines();
        let mut writer = BufWriter::new(stdout);

        while let Some(line) = reader
            .next_line()
            .await
            .map_err(|err| ToolError::internal(err.to_string()))?
        {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let parsed: Value = match serde_json::from_str(trimmed) {
                Ok(value) => value,
                Err(_) => {
                    let response = JsonRpcResponse::failure(
                        Value::Null,
                        ErrorCode::ParseError.as_i32(),
                        "Parse error".to_string(),
                    );
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            let request: JsonRpcRequest = match serde_json::from_value(parsed) {
                Ok(req) => req,
                Err(_) => {
                    let response = JsonRpcResponse::failure(
                        Value::Null,
                        ErrorCode::InvalidRequest.as_i32(),
                        "Invalid request".to_string(),
                    );
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            let response = match request.method.as_str() {
                "notifications/initialized" => request
                    .id
                    .clone()
                    .map(|id| JsonRpcResponse::success(id, serde_json::json!({}))),
                _ if request.method.starts_with("notifications/") && request.id.is_none() => None,
                "initialize" => match request.id.clone() {
                    Some(id) => Some(JsonRpcResponse::success(id, self.handle_initialize().await)),
                    None => None,
                },
                "tools/list" => match request.id.clone() {
                    Some(id) => Some(JsonRpcResponse::success(id, self.handle_tools_list().await)),
                    None => None,
                },
                "tools/call" => match request.id.clone() {
                    Some(id) => {
                        let params = request.params.as_object().cloned().unwrap_or_default();
                        let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
                        if name.is_empty() {
                            Some(JsonRpcResponse::failure(
                                id,
                                ErrorCode::InvalidParams.as_i32(),
                                "Missing tool name".to_string(),
                            ))
                        } else {
                            let args = params
                                .get("arguments")
                                .cloned()
                                .unwrap_or_else(|| Value::Object(Default::default()));
                            let call = match self.handle_tools_call(name, args).await {
                                Ok(result) => JsonRpcResponse::success(id, result),
                                Err(err) => {
                                    JsonRpcResponse::failure(id, err.code.as_i32(), err.message)
                                }
                            };
                            Some(call)
                        }
                    }
                    None => None,
                },
                _ => request.id.clone().map(|id| {
                    JsonRpcResponse::failure(
                        id,
                        ErrorCode::MethodNotFound.as_i32(),
                        "Method not found".to_string(),
                    )
                }),
            };

            if let Some(response) = response {
                write_response(&mut writer, &response).await?;
            }
        }

        Ok(())
    }
}

async fn write_response(
    writer: &mut BufWriter<tokio::io::Stdout>,
    response: &JsonRpcResponse,
) -> Result<(), ToolError> {
    let payload = serde_json::to_string(response).unwrap_or_default();
    writer.write_all(payload.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

pub async fn run_stdio() -> Result<(), ToolError> {
    let server = McpServer::new().await?;
    server.run_stdio().await
}
