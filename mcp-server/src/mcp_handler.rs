use anyhow::Result;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;
use tracing::{info, warn};

use crate::use_cases::{DrawUseCase, TicketUseCase};

#[derive(Debug, serde::Deserialize)]
struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc")]
    jsonrpc: String,
    method: String,
    params: Option<Value>,
    id: Option<Value>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct Tool {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

pub struct MCPHandler {
    draw_use_case: Arc<DrawUseCase>,
    ticket_use_case: Arc<TicketUseCase>,
}

impl MCPHandler {
    pub fn new(draw_use_case: Arc<DrawUseCase>, ticket_use_case: Arc<TicketUseCase>) -> Self {
        Self {
            draw_use_case,
            ticket_use_case,
        }
    }

    pub async fn serve<R, W>(self, reader: R, mut writer: W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(req) => req,
                Err(e) => {
                    warn!("Failed to parse request: {} - Line: {}", e, line);
                    let error_response = JsonRpcResponse {
                        jsonrpc: "2.0".to_string(),
                        result: None,
                        error: Some(JsonRpcError {
                            code: -32700,
                            message: "Parse error".to_string(),
                            data: Some(json!(e.to_string())),
                        }),
                        id: None,
                    };
                    let response_json = serde_json::to_string(&error_response)?;
                    writeln!(writer, "{}", response_json)?;
                    writer.flush()?;
                    continue;
                }
            };

            // Notifications never get a response.
            let is_notification =
                request.id.is_none() || request.method.starts_with("notifications/");
            if is_notification {
                if request.method == "notifications/initialized" {
                    info!("client initialized");
                }
                continue;
            }

            let response = self.handle_request(request).await;
            let response_json = serde_json::to_string(&response)?;
            writeln!(writer, "{}", response_json)?;
            writer.flush()?;
        }

        Ok(())
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id).await,
            "tools/list" => self.handle_list_tools(request.id).await,
            "tools/call" => self.handle_call_tool(request.params, request.id).await,
            _ => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(JsonRpcError {
                    code: -32601,
                    message: format!("Method not found: {}", request.method),
                    data: None,
                }),
                id: Some(request.id.unwrap_or(json!(1))),
            },
        }
    }

    async fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("initializing lotto-scan MCP server");
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "lotto-scan-mcp",
                    "version": "0.1.0"
                }
            })),
            error: None,
            id: Some(id.unwrap_or(json!(1))),
        }
    }

    async fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = self.get_tools();
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(json!({ "tools": tools })),
            error: None,
            id: Some(id.unwrap_or(json!(1))),
        }
    }

    async fn handle_call_tool(&self, params: Option<Value>, id: Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(p) => p,
            None => {
                return JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code: -32602,
                        message: "Missing params".to_string(),
                        data: None,
                    }),
                    id: Some(id.unwrap_or(json!(1))),
                };
            }
        };

        let tool_name = match params.get("name").and_then(|n| n.as_str()) {
            Some(name) => name,
            None => {
                return JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code: -32602,
                        message: "Missing tool name".to_string(),
                        data: None,
                    }),
                    id: Some(id.unwrap_or(json!(1))),
                };
            }
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
        let arguments_map: HashMap<String, Value> =
            serde_json::from_value(arguments).unwrap_or_default();

        let result = self.execute_tool(tool_name, &arguments_map).await;

        match result {
            Ok(content) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(json!({
                    "content": [
                        {
                            "type": "text",
                            "text": content
                        }
                    ]
                })),
                error: None,
                id: Some(id.unwrap_or(json!(1))),
            },
            Err(e) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(JsonRpcError {
                    code: -32603,
                    message: format!("Tool execution error: {}", e),
                    data: None,
                }),
                id: Some(id.unwrap_or(json!(1))),
            },
        }
    }

    async fn execute_tool(
        &self,
        tool_name: &str,
        arguments: &HashMap<String, Value>,
    ) -> Result<String> {
        match tool_name {
            "ingest_document_text" => self.draw_use_case.ingest_document_text(arguments).await,
            "ingest_document_url" => self.draw_use_case.ingest_document_url(arguments).await,
            "check_ticket" => self.ticket_use_case.check_ticket(arguments).await,
            "get_draw_by_date" => self.draw_use_case.get_draw_by_date(arguments).await,
            "get_latest_draws" => self.draw_use_case.get_latest_draws(arguments).await,
            "get_draws_by_date_range" => {
                self.draw_use_case.get_draws_by_date_range(arguments).await
            }
            "search_ticket" => self.draw_use_case.search_ticket(arguments).await,
            _ => Err(anyhow::anyhow!("Unknown tool: {}", tool_name)),
        }
    }

    fn get_tools(&self) -> Vec<Tool> {
        vec![
            Tool {
                name: "ingest_document_text".to_string(),
                description: "Extract prize categories from result document text and store the draw"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "lottery": {
                            "type": "string",
                            "description": "Lottery name, e.g. Mahajana Sampatha"
                        },
                        "date": {
                            "type": "string",
                            "description": "Draw date in YYYY-MM-DD format"
                        },
                        "text": {
                            "type": "string",
                            "description": "Plain text of the result document"
                        },
                        "draw_number": {
                            "type": "string",
                            "description": "Optional draw number; read from the text when omitted"
                        },
                        "source": {
                            "type": "string",
                            "description": "Optional identifier of where the text came from"
                        }
                    },
                    "required": ["lottery", "date", "text"]
                }),
            },
            Tool {
                name: "ingest_document_url".to_string(),
                description: "Fetch a plain-text result document and store the draw".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "lottery": {
                            "type": "string",
                            "description": "Lottery name"
                        },
                        "date": {
                            "type": "string",
                            "description": "Draw date in YYYY-MM-DD format"
                        },
                        "url": {
                            "type": "string",
                            "description": "URL serving the document text"
                        },
                        "draw_number": {
                            "type": "string",
                            "description": "Optional draw number"
                        }
                    },
                    "required": ["lottery", "date", "url"]
                }),
            },
            Tool {
                name: "check_ticket".to_string(),
                description: "Check whether a ticket won in a draw and which prize it won"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "lottery": {
                            "type": "string",
                            "description": "Lottery name"
                        },
                        "date": {
                            "type": "string",
                            "description": "Draw date in YYYY-MM-DD format"
                        },
                        "ticket": {
                            "type": "string",
                            "description": "Ticket as printed, e.g. DF 869610 or 0456"
                        }
                    },
                    "required": ["lottery", "date", "ticket"]
                }),
            },
            Tool {
                name: "get_draw_by_date".to_string(),
                description: "Get a stored draw with all prize categories and winning tickets"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "lottery": {
                            "type": "string",
                            "description": "Lottery name"
                        },
                        "date": {
                            "type": "string",
                            "description": "Draw date in YYYY-MM-DD format"
                        }
                    },
                    "required": ["lottery", "date"]
                }),
            },
            Tool {
                name: "get_latest_draws".to_string(),
                description: "Get the latest stored draws".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "limit": {
                            "type": "integer",
                            "description": "Number of draws to return (default: 10)"
                        }
                    }
                }),
            },
            Tool {
                name: "get_draws_by_date_range".to_string(),
                description: "Get stored draws within a date range".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "start_date": {
                            "type": "string",
                            "description": "Start date in YYYY-MM-DD format"
                        },
                        "end_date": {
                            "type": "string",
                            "description": "End date in YYYY-MM-DD format"
                        }
                    },
                    "required": ["start_date", "end_date"]
                }),
            },
            Tool {
                name: "search_ticket".to_string(),
                description: "Search winning ticket numbers across all stored draws".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "number": {
                            "type": "string",
                            "description": "Digits to search for"
                        }
                    },
                    "required": ["number"]
                }),
            },
        ]
    }
}

pub fn stdio() -> (BufReader<io::Stdin>, io::Stdout) {
    (BufReader::new(io::stdin()), io::stdout())
}
