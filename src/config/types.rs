use crate::mcp::ConnectionParams;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub social: SocialConfig,
    #[serde(default)]
    pub football: FootballConfig,
    #[serde(default)]
    pub alerting: AlertingConfig,
    #[serde(default)]
    pub tools: Option<ToolFilter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Launch settings for the social-posting MCP tool provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub command: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
    /// Forward the whole parent environment (credentials included) to the child.
    pub inherit_env: bool,
    pub handshake_timeout_secs: u64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            command: "node".to_string(),
            args: vec!["build/index.js".to_string()],
            cwd: Some(PathBuf::from("x-mcp-server")),
            env: HashMap::new(),
            inherit_env: true,
            handshake_timeout_secs: 30,
        }
    }
}

impl SocialConfig {
    /// Freeze the launch settings, snapshotting the parent environment if inherited.
    pub fn connection_params(&self) -> ConnectionParams {
        let mut env: HashMap<String, String> = if self.inherit_env {
            std::env::vars().collect()
        } else {
            HashMap::new()
        };
        env.extend(self.env.clone());

        ConnectionParams::new(self.command.clone(), self.args.clone(), self.cwd.clone(), env)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FootballConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for FootballConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.soccerdataapi.com/".to_string(),
            auth_token: None,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertingConfig {
    pub base_url: String,
    pub trigger_id: Option<String>,
    pub auth_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.heyoncall.com".to_string(),
            trigger_id: None,
            auth_key: None,
            timeout_secs: 10,
        }
    }
}

impl AlertingConfig {
    pub fn trigger_url(&self) -> String {
        format!(
            "{}/triggers/{}/mcp",
            self.base_url.trim_end_matches('/'),
            self.trigger_id.as_deref().unwrap_or_default()
        )
    }
}

/// Allow-list over the tool names exposed to the agent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolFilter {
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

impl ToolFilter {
    /// Include list takes precedence - if present, tool must be in it.
    /// Exclude list is then checked - if present, tool must not be in it.
    pub fn allows(&self, tool_name: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.iter().any(|t| t == tool_name) {
                return false;
            }
        }

        if let Some(exclude) = &self.exclude {
            if exclude.iter().any(|t| t == tool_name) {
                return false;
            }
        }

        true
    }
}
