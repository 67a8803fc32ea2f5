use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use touchline::config::{self, AppConfig};
use touchline::tools::toolbox::SOCIAL_TOOLS;
use touchline::tools::{AlertClient, FootballClient, SocialBridge, Toolbox};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "touchline")]
#[command(about = "Football agent tools: live statistics, alerts and social posting", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "touchline.toml", global = true)]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Override log format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the tools exposed to the agent
    List,
    /// Call any exposed tool by name with JSON arguments
    Call {
        tool: String,
        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,
    },
    /// Current live scores, optionally for one league
    Livescores {
        #[arg(long)]
        league: Option<String>,
    },
    /// Preview of a match
    MatchPreview { match_id: i64 },
    /// Details of a match
    Match { match_id: i64 },
    /// All available countries
    Countries,
    /// Available leagues, optionally filtered by name
    Leagues {
        #[arg(long)]
        search: Option<String>,
    },
    /// Standings of a league
    Standings { league_id: i64 },
    /// Send an on-call alert
    Alert { message: String },
    /// Create a post
    Post {
        text: String,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        video: Option<String>,
    },
    /// Most recent posts from the home timeline
    Timeline {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Reply to a post
    Reply {
        post_id: String,
        text: String,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        video: Option<String>,
    },
    /// Delete a post
    Delete { post_id: String },
}

impl Command {
    /// Translate into a toolbox call.
    fn into_call(self) -> Result<Option<(String, Value)>> {
        let call = match self {
            Command::List => return Ok(None),
            Command::Call { tool, args } => {
                let args: Value = serde_json::from_str(&args)
                    .with_context(|| format!("Arguments for '{}' are not valid JSON", tool))?;
                (tool, args)
            }
            Command::Livescores { league } => {
                ("get_livescores".to_string(), json!({ "search_term": league }))
            }
            Command::MatchPreview { match_id } => {
                ("get_match_preview".to_string(), json!({ "match_id": match_id }))
            }
            Command::Match { match_id } => ("get_match".to_string(), json!({ "match_id": match_id })),
            Command::Countries => ("get_countries".to_string(), json!({})),
            Command::Leagues { search } => {
                ("get_leagues".to_string(), json!({ "search_query": search }))
            }
            Command::Standings { league_id } => {
                ("get_standings".to_string(), json!({ "league_id": league_id }))
            }
            Command::Alert { message } => ("send_alert".to_string(), json!({ "message": message })),
            Command::Post { text, image, video } => (
                "create_tweet".to_string(),
                json!({ "text": text, "image_path": image, "video_path": video }),
            ),
            Command::Timeline { limit } => {
                ("get_home_timeline".to_string(), json!({ "limit": limit }))
            }
            Command::Reply {
                post_id,
                text,
                image,
                video,
            } => (
                "reply_to_tweet".to_string(),
                json!({ "tweet_id": post_id, "text": text, "image_path": image, "video_path": video }),
            ),
            Command::Delete { post_id } => {
                ("delete_tweet".to_string(), json!({ "tweet_id": post_id }))
            }
        };
        Ok(Some(call))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = config::load_config(&cli.config).with_context(|| {
        format!(
            "Failed to load configuration from: {}",
            cli.config.display()
        )
    })?;

    if let Some(log_level) = cli.log_level {
        config.logging.level = log_level;
    }
    if let Some(log_format) = cli.log_format {
        config.logging.format = log_format;
    }

    init_logging(&config.logging)?;

    let call = cli.command.into_call()?;
    let needs_social = call
        .as_ref()
        .map(|(tool, _)| SOCIAL_TOOLS.iter().any(|t| t.name == tool))
        .unwrap_or(false);

    let mut toolbox = build_toolbox(&config, needs_social).await?;

    let outcome = match call {
        None => {
            for tool in toolbox.list() {
                println!("{:<20} {}", tool.name, tool.description);
            }
            Ok(())
        }
        Some((tool, args)) => run_call(&mut toolbox, &tool, args).await,
    };

    // Tear down providers whatever the outcome of the call.
    if let Err(e) = toolbox.shutdown().await {
        error!("Error during shutdown: {}", e);
    }

    outcome
}

async fn build_toolbox(config: &AppConfig, start_social: bool) -> Result<Toolbox> {
    let mut toolbox = Toolbox::new(config.tools.clone());
    toolbox.register(Box::new(FootballClient::new(&config.football)?));
    toolbox.register(Box::new(AlertClient::new(&config.alerting)?));

    let mut social = SocialBridge::new(config.social.clone());
    if start_social {
        social
            .start()
            .await
            .context("Failed to start the social tool provider")?;
    }
    toolbox.register(Box::new(social));

    Ok(toolbox)
}

async fn run_call(toolbox: &mut Toolbox, tool: &str, args: Value) -> Result<()> {
    info!("Calling tool: {}", tool);

    tokio::select! {
        result = toolbox.dispatch(tool, args) => {
            match result {
                Ok(text) => {
                    println!("{}", text);
                    Ok(())
                }
                Err(e) if e.is_fatal() => Err(e.into()),
                Err(e) => {
                    warn!("Tool '{}' failed: {}", tool, e);
                    println!("Error: {}", e);
                    Ok(())
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C signal, shutting down...");
            Ok(())
        }
    }
}

fn init_logging(config: &config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
