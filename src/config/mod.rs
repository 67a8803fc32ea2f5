pub mod types;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use std::path::Path;
pub use types::*;

/// Environment prefix for structured overrides, e.g. `TOUCHLINE_FOOTBALL__AUTH_TOKEN`.
pub const ENV_PREFIX: &str = "TOUCHLINE";

/// Load configuration from an optional TOML file, `TOUCHLINE_*` variables and
/// the legacy credential variables, in increasing order of precedence.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();

    let config = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("football.auth_token", non_empty_var("AUTH_KEY"))?
        .set_override_option("alerting.trigger_id", non_empty_var("HEYONCALL_TRIGGER_ID"))?
        .set_override_option("alerting.auth_key", non_empty_var("HEYONCALL_AUTH_KEY"))?
        .build()
        .with_context(|| format!("Failed to load config from: {}", path.display()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    validate_config(&app_config)?;

    Ok(app_config)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Validate the loaded configuration
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        anyhow::bail!(
            "Invalid log level '{}'. Valid levels: {}",
            config.logging.level,
            valid_levels.join(", ")
        );
    }

    let valid_formats = ["pretty", "json"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        anyhow::bail!(
            "Invalid log format '{}'. Valid formats: {}",
            config.logging.format,
            valid_formats.join(", ")
        );
    }

    if config.social.command.trim().is_empty() {
        anyhow::bail!("social.command must not be empty");
    }

    for (key, secs) in [
        ("social.handshake_timeout_secs", config.social.handshake_timeout_secs),
        ("football.timeout_secs", config.football.timeout_secs),
        ("alerting.timeout_secs", config.alerting.timeout_secs),
    ] {
        if secs == 0 {
            anyhow::bail!("{} must be greater than zero", key);
        }
    }

    for (key, url) in [
        ("football.base_url", &config.football.base_url),
        ("alerting.base_url", &config.alerting.base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("{} must be an http(s) URL, got '{}'", key, url);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CREDENTIAL_VARS: [&str; 3] = ["AUTH_KEY", "HEYONCALL_TRIGGER_ID", "HEYONCALL_AUTH_KEY"];

    fn clear_credential_vars() {
        for var in CREDENTIAL_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_load_valid_config() {
        clear_credential_vars();
        let config_content = r#"
[logging]
level = "debug"
format = "json"

[social]
command = "node"
args = ["/opt/x-mcp-server/build/index.js"]
cwd = "/opt/x-mcp-server"
inherit_env = false

[social.env]
node_env = "production"

[football]
auth_token = "token-from-file"

[alerting]
trigger_id = "trg_1"
auth_key = "hoc_key"

[tools]
exclude = ["delete_tweet"]
"#;

        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.social.args, vec!["/opt/x-mcp-server/build/index.js"]);
        assert!(!config.social.inherit_env);
        assert_eq!(
            config.social.env.get("node_env").map(String::as_str),
            Some("production")
        );
        assert_eq!(config.football.auth_token.as_deref(), Some("token-from-file"));
        assert_eq!(config.alerting.trigger_id.as_deref(), Some("trg_1"));
        let tools = config.tools.unwrap();
        assert!(!tools.allows("delete_tweet"));
        assert!(tools.allows("create_tweet"));
    }

    #[test]
    #[serial]
    fn test_missing_file_uses_defaults() {
        clear_credential_vars();
        let config = load_config("/nonexistent/touchline.toml").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.social.command, "node");
        assert_eq!(config.football.base_url, "https://api.soccerdataapi.com/");
        assert_eq!(config.football.timeout_secs, 15);
        assert_eq!(config.alerting.timeout_secs, 10);
        assert!(config.football.auth_token.is_none());
        assert!(config.tools.is_none());
    }

    #[test]
    #[serial]
    fn test_legacy_credential_vars_override_file() {
        clear_credential_vars();
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        temp_file
            .write_all(b"[football]\nauth_token = \"from-file\"\n")
            .unwrap();

        std::env::set_var("AUTH_KEY", "from-env");
        std::env::set_var("HEYONCALL_AUTH_KEY", "hoc-env");
        let config = load_config(temp_file.path());
        clear_credential_vars();

        let config = config.unwrap();
        assert_eq!(config.football.auth_token.as_deref(), Some("from-env"));
        assert_eq!(config.alerting.auth_key.as_deref(), Some("hoc-env"));
    }

    #[test]
    #[serial]
    fn test_empty_legacy_var_is_ignored() {
        clear_credential_vars();
        std::env::set_var("AUTH_KEY", "   ");
        let config = load_config("/nonexistent/touchline.toml");
        clear_credential_vars();

        assert!(config.unwrap().football.auth_token.is_none());
    }

    #[test]
    #[serial]
    fn test_invalid_log_level_rejected() {
        clear_credential_vars();
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        temp_file
            .write_all(b"[logging]\nlevel = \"loud\"\n")
            .unwrap();

        assert!(load_config(temp_file.path()).is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = AppConfig::default();
        config.football.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_base_url() {
        let mut config = AppConfig::default();
        config.alerting.base_url = "ftp://example.com".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_command() {
        let mut config = AppConfig::default();
        config.social.command = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }
}
