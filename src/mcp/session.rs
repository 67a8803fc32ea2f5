use super::types::{ToolCallRequest, ToolCallResponse};
use crate::error::{BridgeError, Result};
use rmcp::model::CallToolRequestParams;
use rmcp::service::{RoleClient, RunningService};
use rmcp::transport::IntoTransport;
use rmcp::ServiceExt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default timeout for the MCP handshake.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Uninitialized,
    Ready,
    Closed,
}

enum SessionState {
    Uninitialized,
    Ready(RunningService<RoleClient, ()>),
    Closed,
}

/// One MCP client session over one transport.
///
/// Calls take `&mut self`, so at most one invocation is in flight per session.
pub struct Session {
    name: String,
    handshake_timeout: Duration,
    state: SessionState,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_handshake_timeout(name, HANDSHAKE_TIMEOUT)
    }

    pub fn with_handshake_timeout(name: impl Into<String>, handshake_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            handshake_timeout,
            state: SessionState::Uninitialized,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::Uninitialized => SessionStatus::Uninitialized,
            SessionState::Ready(_) => SessionStatus::Ready,
            SessionState::Closed => SessionStatus::Closed,
        }
    }

    /// Run the MCP `initialize` exchange over `transport`.
    ///
    /// The provider must answer within the handshake timeout and advertise
    /// the `tools` capability.
    pub async fn initialize<T, E, A>(&mut self, transport: T) -> Result<()>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        match self.state {
            SessionState::Uninitialized => {}
            SessionState::Ready(_) => {
                return Err(BridgeError::Handshake(format!(
                    "session '{}' is already initialized",
                    self.name
                )))
            }
            SessionState::Closed => return Err(BridgeError::SessionClosed(self.name.clone())),
        }

        info!("Initializing MCP session: {}", self.name);

        let ct = CancellationToken::new();
        let ct_clone = ct.clone();

        let service = tokio::time::timeout(self.handshake_timeout, async {
            ().serve_with_ct(transport, ct_clone).await
        })
        .await
        .map_err(|_| {
            ct.cancel();
            BridgeError::Handshake(format!(
                "handshake timed out after {:?} for session: {}",
                self.handshake_timeout, self.name
            ))
        })?
        .map_err(|e| {
            BridgeError::Handshake(format!(
                "failed to initialize session '{}': {}",
                self.name, e
            ))
        })?;

        let provider = service
            .peer_info()
            .map(|info| {
                (
                    info.server_info.name.clone(),
                    info.server_info.version.clone(),
                    info.capabilities.tools.is_some(),
                )
            });

        match provider {
            Some((name, version, true)) => {
                info!(
                    "MCP session '{}' ready (provider: {} {})",
                    self.name, name, version
                );
                self.state = SessionState::Ready(service);
                Ok(())
            }
            Some((name, _, false)) => {
                warn!(
                    "Provider {} for session '{}' does not offer tools",
                    name, self.name
                );
                let _ = service.cancel().await;
                Err(BridgeError::Handshake(format!(
                    "provider '{}' does not advertise the tools capability",
                    name
                )))
            }
            None => {
                let _ = service.cancel().await;
                Err(BridgeError::Handshake(format!(
                    "no initialize result received for session: {}",
                    self.name
                )))
            }
        }
    }

    /// Call one remote tool and wait for its response.
    pub async fn invoke(&mut self, request: ToolCallRequest) -> Result<ToolCallResponse> {
        let service = match &self.state {
            SessionState::Ready(service) => service,
            SessionState::Uninitialized => return Err(BridgeError::not_started(self.name.clone())),
            SessionState::Closed => return Err(BridgeError::SessionClosed(self.name.clone())),
        };

        debug!(
            "Calling tool '{}' on session: {} ({} args)",
            request.name,
            self.name,
            request.arguments.len()
        );

        let mcp_request = CallToolRequestParams {
            meta: None,
            name: request.name.clone().into(),
            arguments: Some(request.arguments.into_object()),
            task: None,
        };

        let result = service.call_tool(mcp_request).await.map_err(|e| {
            error!(
                "Failed to call tool '{}' on {}: {}",
                request.name, self.name, e
            );
            BridgeError::from_service_error(&request.name, e)
        })?;

        let response = ToolCallResponse::from(result);
        if response.is_error() {
            let message = response
                .first_text()
                .map(str::to_string)
                .unwrap_or_else(|| format!("tool '{}' reported an error", request.name));
            warn!("Tool '{}' reported an error: {}", request.name, message);
            return Err(BridgeError::RemoteTool(message));
        }

        Ok(response)
    }

    /// Release the channel. Safe to call more than once.
    pub async fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Ready(service) => {
                info!("Closing MCP session: {}", self.name);
                service.cancel().await.map(|_| ()).map_err(|e| {
                    BridgeError::Protocol(format!(
                        "session '{}' did not shut down cleanly: {}",
                        self.name, e
                    ))
                })
            }
            SessionState::Uninitialized | SessionState::Closed => {
                debug!("Session {} has no open channel", self.name);
                Ok(())
            }
        }
    }
}
