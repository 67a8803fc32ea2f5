use rmcp::service::ServiceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Tool bridge not started: {0}")]
    NotStarted(String),

    #[error("Tool bridge already started: {0}")]
    AlreadyStarted(String),

    #[error("Session is closed: {0}")]
    SessionClosed(String),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Transport closed: {0}")]
    TransportClosed(String),

    #[error("Remote tool error: {0}")]
    RemoteTool(String),

    #[error("Tool '{0}' returned no text content")]
    EmptyResult(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool not allowed: {0}")]
    ToolNotAllowed(String),

    #[error("Failed to spawn tool process: {0}")]
    Spawn(String),

    #[error("MCP protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    pub(crate) fn not_started(name: impl Into<String>) -> Self {
        BridgeError::NotStarted(name.into())
    }

    pub(crate) fn invalid_argument(details: impl Into<String>) -> Self {
        BridgeError::InvalidArgument(details.into())
    }

    /// Classify an rmcp service failure raised while a call was in flight.
    pub(crate) fn from_service_error(tool: &str, err: ServiceError) -> Self {
        match err {
            ServiceError::McpError(data) => BridgeError::RemoteTool(data.message.to_string()),
            ServiceError::TransportClosed => {
                BridgeError::TransportClosed(format!("channel closed while calling '{}'", tool))
            }
            ServiceError::TransportSend(e) => {
                BridgeError::TransportClosed(format!("failed to send '{}': {}", tool, e))
            }
            // rmcp rejects a tools/call result carrying neither content nor structured content
            ServiceError::UnexpectedResponse => BridgeError::EmptyResult(tool.to_string()),
            other => BridgeError::Protocol(format!("call to '{}' failed: {}", tool, other)),
        }
    }

    /// Whether the bridge that produced this error must be restarted before reuse.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BridgeError::NotStarted(_)
                | BridgeError::SessionClosed(_)
                | BridgeError::Handshake(_)
                | BridgeError::TransportClosed(_)
                | BridgeError::Spawn(_)
        )
    }
}

impl From<anyhow::Error> for BridgeError {
    fn from(err: anyhow::Error) -> Self {
        BridgeError::Config(err.to_string())
    }
}
