use super::alerting::AlertClient;
use super::football::FootballClient;
use super::social::{
    Attachments, SocialBridge, CREATE_TWEET, DELETE_TWEET, GET_HOME_TIMELINE, REPLY_TO_TWEET,
};
use crate::config::ToolFilter;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Name and description of one capability, as shown to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
}

pub const FOOTBALL_TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: "get_livescores",
        description: "Get current live scores for ongoing matches, optionally filtered by league name (search_term).",
    },
    ToolDescriptor {
        name: "get_match_preview",
        description: "Get a preview for a specific match (match_id).",
    },
    ToolDescriptor {
        name: "get_match",
        description: "Get detailed information about a specific match (match_id).",
    },
    ToolDescriptor {
        name: "get_countries",
        description: "Get a list of all available countries.",
    },
    ToolDescriptor {
        name: "get_leagues",
        description: "Get a list of all available leagues, optionally filtered by name (search_query).",
    },
    ToolDescriptor {
        name: "get_standings",
        description: "Get the standings for a specific league (league_id).",
    },
];

pub const ALERT_TOOLS: &[ToolDescriptor] = &[ToolDescriptor {
    name: "send_alert",
    description: "Send an on-call alert carrying the given message.",
}];

pub const SOCIAL_TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: CREATE_TWEET,
        description: "Create a new post with text and an optional image_path or video_path.",
    },
    ToolDescriptor {
        name: GET_HOME_TIMELINE,
        description: "Get the most recent posts from the home timeline (limit 1-100, default 20).",
    },
    ToolDescriptor {
        name: REPLY_TO_TWEET,
        description: "Reply to a post by tweet_id with text and optional attachments.",
    },
    ToolDescriptor {
        name: DELETE_TWEET,
        description: "Delete a post by tweet_id.",
    },
];

/// A set of named capabilities callable with JSON arguments.
#[async_trait]
pub trait ToolProvider: Send {
    fn provider_name(&self) -> &str;

    fn tools(&self) -> &'static [ToolDescriptor];

    async fn call_tool(&mut self, name: &str, args: Value) -> Result<String>;

    /// Release whatever the provider holds open.
    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|e| BridgeError::invalid_argument(format!("{}: {}", tool, e)))
}

#[derive(Debug, Default, Deserialize)]
struct SearchArgs {
    #[serde(alias = "search_query", alias = "search_term")]
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatchArgs {
    match_id: i64,
}

#[derive(Debug, Deserialize)]
struct LeagueArgs {
    league_id: i64,
}

#[derive(Debug, Deserialize)]
struct AlertArgs {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PostArgs {
    text: String,
    image_path: Option<String>,
    video_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimelineArgs {
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ReplyArgs {
    tweet_id: String,
    text: String,
    image_path: Option<String>,
    video_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteArgs {
    tweet_id: String,
}

#[async_trait]
impl ToolProvider for FootballClient {
    fn provider_name(&self) -> &str {
        "football"
    }

    fn tools(&self) -> &'static [ToolDescriptor] {
        FOOTBALL_TOOLS
    }

    async fn call_tool(&mut self, name: &str, args: Value) -> Result<String> {
        match name {
            "get_livescores" => {
                let args: SearchArgs = parse_args(name, args)?;
                Ok(self.livescores(args.search.as_deref()).await)
            }
            "get_match_preview" => {
                let args: MatchArgs = parse_args(name, args)?;
                Ok(self.match_preview(args.match_id).await)
            }
            "get_match" => {
                let args: MatchArgs = parse_args(name, args)?;
                Ok(self.match_details(args.match_id).await)
            }
            "get_countries" => Ok(self.countries().await),
            "get_leagues" => {
                let args: SearchArgs = parse_args(name, args)?;
                Ok(self.leagues(args.search.as_deref()).await)
            }
            "get_standings" => {
                let args: LeagueArgs = parse_args(name, args)?;
                Ok(self.standings(args.league_id).await)
            }
            other => Err(BridgeError::UnknownTool(other.to_string())),
        }
    }
}

#[async_trait]
impl ToolProvider for AlertClient {
    fn provider_name(&self) -> &str {
        "alerting"
    }

    fn tools(&self) -> &'static [ToolDescriptor] {
        ALERT_TOOLS
    }

    async fn call_tool(&mut self, name: &str, args: Value) -> Result<String> {
        match name {
            "send_alert" => {
                let args: AlertArgs = parse_args(name, args)?;
                Ok(self.send_alert(&args.message).await)
            }
            other => Err(BridgeError::UnknownTool(other.to_string())),
        }
    }
}

#[async_trait]
impl ToolProvider for SocialBridge {
    fn provider_name(&self) -> &str {
        self.name()
    }

    fn tools(&self) -> &'static [ToolDescriptor] {
        SOCIAL_TOOLS
    }

    async fn call_tool(&mut self, name: &str, args: Value) -> Result<String> {
        match name {
            CREATE_TWEET => {
                let args: PostArgs = parse_args(name, args)?;
                let attachments = Attachments {
                    image_path: args.image_path,
                    video_path: args.video_path,
                };
                self.create_post(&args.text, attachments).await
            }
            GET_HOME_TIMELINE => {
                let args: TimelineArgs = parse_args(name, args)?;
                self.home_timeline(args.limit).await
            }
            REPLY_TO_TWEET => {
                let args: ReplyArgs = parse_args(name, args)?;
                let attachments = Attachments {
                    image_path: args.image_path,
                    video_path: args.video_path,
                };
                self.reply_to_post(&args.tweet_id, &args.text, attachments)
                    .await
            }
            DELETE_TWEET => {
                let args: DeleteArgs = parse_args(name, args)?;
                self.delete_post(&args.tweet_id).await
            }
            other => Err(BridgeError::UnknownTool(other.to_string())),
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.stop().await
    }
}

/// Every capability handed to the agent, behind one name-based dispatcher.
pub struct Toolbox {
    providers: Vec<Box<dyn ToolProvider>>,
    filter: Option<ToolFilter>,
}

impl Toolbox {
    pub fn new(filter: Option<ToolFilter>) -> Self {
        Self {
            providers: Vec::new(),
            filter,
        }
    }

    pub fn register(&mut self, provider: Box<dyn ToolProvider>) {
        debug!(
            "Registering {} tools from provider: {}",
            provider.tools().len(),
            provider.provider_name()
        );
        self.providers.push(provider);
    }

    fn is_allowed(&self, tool_name: &str) -> bool {
        match &self.filter {
            None => true,
            Some(filter) => filter.allows(tool_name),
        }
    }

    /// Exposed tools, in registration order, after the allow-list.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.providers
            .iter()
            .flat_map(|p| p.tools().iter().copied())
            .filter(|t| self.is_allowed(t.name))
            .collect()
    }

    pub async fn dispatch(&mut self, name: &str, args: Value) -> Result<String> {
        if !self.is_allowed(name) {
            warn!("Rejected call to filtered tool: {}", name);
            return Err(BridgeError::ToolNotAllowed(name.to_string()));
        }

        let provider = self
            .providers
            .iter_mut()
            .find(|p| p.tools().iter().any(|t| t.name == name))
            .ok_or_else(|| BridgeError::UnknownTool(name.to_string()))?;

        debug!("Dispatching {} to provider {}", name, provider.provider_name());
        provider.call_tool(name, args).await
    }

    /// Shut down every provider, reporting the first failure after trying all.
    pub async fn shutdown(&mut self) -> Result<()> {
        let mut first_error = None;
        for provider in &mut self.providers {
            if let Err(e) = provider.shutdown().await {
                warn!("Provider {} failed to shut down: {}", provider.provider_name(), e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
