#![allow(dead_code)]

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, JsonObject, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RunningService};
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, ServiceExt};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::io::DuplexStream;
use tokio::task::JoinHandle;
use touchline::config::SocialConfig;
use touchline::tools::SocialBridge;

/// Text the echo server treats as a request to fail with a JSON-RPC error.
pub const FAIL_WITH_RPC_ERROR: &str = "__rpc_error__";
/// Text the echo server answers with an `isError` result.
pub const FAIL_WITH_TOOL_ERROR: &str = "__tool_error__";
/// Post id the echo server answers with an empty content list.
pub const EMPTY_RESULT_ID: &str = "__empty__";
/// Post id the echo server answers with a lone image item.
pub const IMAGE_RESULT_ID: &str = "__image__";

/// Received calls, in arrival order.
pub type CallLog = Arc<Mutex<Vec<(String, JsonObject)>>>;

/// In-process MCP server answering every call with `"<tool>:<arguments json>"`.
#[derive(Clone)]
pub struct EchoServer {
    advertise_tools: bool,
    calls: CallLog,
}

impl EchoServer {
    pub fn new() -> Self {
        Self {
            advertise_tools: true,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn without_tools() -> Self {
        Self {
            advertise_tools: false,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }
}

impl ServerHandler for EchoServer {
    fn get_info(&self) -> ServerInfo {
        let capabilities = if self.advertise_tools {
            ServerCapabilities::builder().enable_tools().build()
        } else {
            ServerCapabilities::default()
        };

        ServerInfo {
            instructions: Some("Echo server for bridge tests".to_string()),
            capabilities,
            ..Default::default()
        }
    }

    async fn call_tool(
        &self,
        params: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = params.arguments.unwrap_or_default();
        self.calls
            .lock()
            .unwrap()
            .push((params.name.to_string(), arguments.clone()));

        let text = arguments.get("text").and_then(Value::as_str);
        let tweet_id = arguments.get("tweet_id").and_then(Value::as_str);

        if text == Some(FAIL_WITH_RPC_ERROR) {
            return Err(McpError::invalid_params(
                "image_path does not exist",
                None,
            ));
        }
        if text == Some(FAIL_WITH_TOOL_ERROR) {
            return Ok(CallToolResult::error(vec![Content::text(
                "rate limit exceeded",
            )]));
        }
        if tweet_id == Some(EMPTY_RESULT_ID) {
            return Ok(CallToolResult::success(vec![]));
        }
        if tweet_id == Some(IMAGE_RESULT_ID) {
            return Ok(CallToolResult::success(vec![Content::image(
                "iVBORw0KGgo=",
                "image/png",
            )]));
        }

        let echoed = format!("{}:{}", params.name, Value::Object(arguments));
        Ok(CallToolResult::success(vec![
            Content::text(echoed),
            Content::text("second item is ignored"),
        ]))
    }
}

pub fn social_config() -> SocialConfig {
    SocialConfig {
        inherit_env: false,
        handshake_timeout_secs: 5,
        ..Default::default()
    }
}

/// Client-side pipe ends plus the server-side ends, wired back to back.
pub fn pipes() -> ((DuplexStream, DuplexStream), (DuplexStream, DuplexStream)) {
    let (client_read, server_write) = tokio::io::duplex(4096);
    let (server_read, client_write) = tokio::io::duplex(4096);
    ((client_read, client_write), (server_read, server_write))
}

/// Serve `server` on the given pipe ends until the client goes away.
pub fn spawn_server(
    server: EchoServer,
    transport: (DuplexStream, DuplexStream),
) -> JoinHandle<Option<RunningService<RoleServer, EchoServer>>> {
    tokio::spawn(async move { server.serve(transport).await.ok() })
}

/// A bridge that completed its handshake with an in-process echo server.
pub async fn connected_bridge(server: EchoServer) -> (SocialBridge, CallLog) {
    let calls = server.calls();
    let (client_side, server_side) = pipes();
    let server_task = spawn_server(server, server_side);

    let mut bridge = SocialBridge::new(social_config());
    bridge
        .connect(client_side)
        .await
        .expect("handshake with echo server");

    // Keep the server running in the background for the rest of the test.
    let service = server_task
        .await
        .expect("server task")
        .expect("server handshake");
    tokio::spawn(async move {
        let _ = service.waiting().await;
    });

    (bridge, calls)
}

/// Split an echo reply back into tool name and arguments.
pub fn parse_echo(reply: &str) -> (String, Value) {
    let (tool, args) = reply.split_once(':').expect("echo reply has a tool prefix");
    (
        tool.to_string(),
        serde_json::from_str(args).expect("echo reply carries JSON arguments"),
    )
}
