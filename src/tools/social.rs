use crate::config::SocialConfig;
use crate::error::{BridgeError, Result};
use crate::mcp::{spawn_process, Session, ToolArguments, ToolCallRequest};
use rmcp::service::RoleClient;
use rmcp::transport::IntoTransport;
use std::ops::RangeInclusive;
use tracing::{debug, info, warn};

pub const CREATE_TWEET: &str = "create_tweet";
pub const GET_HOME_TIMELINE: &str = "get_home_timeline";
pub const REPLY_TO_TWEET: &str = "reply_to_tweet";
pub const DELETE_TWEET: &str = "delete_tweet";

pub const DEFAULT_TIMELINE_LIMIT: u32 = 20;
pub const TIMELINE_LIMIT_RANGE: RangeInclusive<u32> = 1..=100;

/// Optional media for a post or reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments {
    pub image_path: Option<String>,
    pub video_path: Option<String>,
}

impl Attachments {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn image(path: impl Into<String>) -> Self {
        Self {
            image_path: Some(path.into()),
            video_path: None,
        }
    }

    pub fn video(path: impl Into<String>) -> Self {
        Self {
            image_path: None,
            video_path: Some(path.into()),
        }
    }

    fn apply(self, args: ToolArguments) -> ToolArguments {
        args.with_optional("image_path", self.image_path.filter(|p| !p.is_empty()))
            .with_optional("video_path", self.video_path.filter(|p| !p.is_empty()))
    }
}

/// Typed front for the social-posting MCP tool provider.
///
/// Owns the provider process and its session exclusively; `start` and `stop`
/// acquire and release both together.
pub struct SocialBridge {
    name: String,
    config: SocialConfig,
    session: Option<Session>,
}

impl SocialBridge {
    pub fn new(config: SocialConfig) -> Self {
        Self {
            name: "social".to_string(),
            config,
            session: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_started(&self) -> bool {
        self.session.is_some()
    }

    /// Launch the provider process and complete the handshake.
    pub async fn start(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Err(BridgeError::AlreadyStarted(self.name.clone()));
        }

        let params = self.config.connection_params();
        info!(
            "Starting social tool provider: {} {}",
            params.command(),
            params.args().join(" ")
        );

        let transport = spawn_process(&params)?;
        self.connect(transport).await
    }

    /// Complete the handshake over an already established transport.
    pub async fn connect<T, E, A>(&mut self, transport: T) -> Result<()>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        if self.session.is_some() {
            return Err(BridgeError::AlreadyStarted(self.name.clone()));
        }

        let mut session =
            Session::with_handshake_timeout(self.name.clone(), self.config.handshake_timeout());
        session.initialize(transport).await?;
        self.session = Some(session);

        info!("Social tool bridge started");
        Ok(())
    }

    /// Tear down the session and the provider process. Safe to call repeatedly.
    pub async fn stop(&mut self) -> Result<()> {
        match self.session.take() {
            Some(mut session) => {
                info!("Stopping social tool bridge");
                session.close().await
            }
            None => {
                debug!("Social tool bridge already stopped");
                Ok(())
            }
        }
    }

    fn ensure_started(&self) -> Result<()> {
        if self.session.is_none() {
            return Err(BridgeError::not_started(self.name.clone()));
        }
        Ok(())
    }

    async fn call(&mut self, tool: &str, arguments: ToolArguments) -> Result<String> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| BridgeError::not_started(self.name.clone()))?;

        let response = session
            .invoke(ToolCallRequest::new(tool, arguments))
            .await?;

        match response.first_text() {
            Some(text) => Ok(text.to_string()),
            None => {
                warn!(
                    "Tool '{}' returned no leading text item: {}",
                    tool,
                    serde_json::to_string(&response.content).unwrap_or_default()
                );
                Err(BridgeError::EmptyResult(tool.to_string()))
            }
        }
    }

    pub async fn create_post(&mut self, text: &str, attachments: Attachments) -> Result<String> {
        let args = attachments.apply(ToolArguments::new().with("text", text));
        self.call(CREATE_TWEET, args).await
    }

    /// Most recent timeline items; `None` asks for the default of 20.
    pub async fn home_timeline(&mut self, limit: Option<u32>) -> Result<String> {
        self.ensure_started()?;
        let limit = limit.unwrap_or(DEFAULT_TIMELINE_LIMIT);
        if !TIMELINE_LIMIT_RANGE.contains(&limit) {
            return Err(BridgeError::invalid_argument(format!(
                "limit must be between {} and {}, got {}",
                TIMELINE_LIMIT_RANGE.start(),
                TIMELINE_LIMIT_RANGE.end(),
                limit
            )));
        }

        self.call(GET_HOME_TIMELINE, ToolArguments::new().with("limit", limit))
            .await
    }

    pub async fn reply_to_post(
        &mut self,
        post_id: &str,
        text: &str,
        attachments: Attachments,
    ) -> Result<String> {
        let args = attachments.apply(
            ToolArguments::new()
                .with("tweet_id", post_id)
                .with("text", text),
        );
        self.call(REPLY_TO_TWEET, args).await
    }

    pub async fn delete_post(&mut self, post_id: &str) -> Result<String> {
        self.call(DELETE_TWEET, ToolArguments::new().with("tweet_id", post_id))
            .await
    }
}
