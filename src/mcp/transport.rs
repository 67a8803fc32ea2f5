use crate::error::{BridgeError, Result};
use rmcp::transport::TokioChildProcess;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, error};

/// How to launch a tool-provider process.
///
/// `env` is the complete environment of the child: nothing is inherited
/// from the parent beyond what it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    command: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: HashMap<String, String>,
}

impl ConnectionParams {
    pub fn new(
        command: impl Into<String>,
        args: Vec<String>,
        cwd: Option<PathBuf>,
        env: HashMap<String, String>,
    ) -> Self {
        Self {
            command: command.into(),
            args,
            cwd,
            env,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .env_clear()
            .envs(&self.env)
            .kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

/// Spawn the tool-provider process with its stdin/stdout piped into an MCP transport.
///
/// The child is killed when the returned transport is dropped.
pub fn spawn_process(params: &ConnectionParams) -> Result<TokioChildProcess> {
    debug!(
        "Spawning tool process: {} {} (cwd: {:?})",
        params.command,
        params.args.join(" "),
        params.cwd
    );

    if params.command.trim().is_empty() {
        return Err(BridgeError::Spawn("empty command".to_string()));
    }

    TokioChildProcess::new(params.to_command()).map_err(|e| {
        error!("Failed to create TokioChildProcess: {}", e);
        BridgeError::Spawn(format!("{}: {}", params.command, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_carries_params() {
        let mut env = HashMap::new();
        env.insert("X_API_KEY".to_string(), "secret".to_string());
        let params = ConnectionParams::new(
            "node",
            vec!["build/index.js".to_string()],
            Some(PathBuf::from("/opt/x-mcp-server")),
            env,
        );

        let cmd = params.to_command();
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "node");
        assert_eq!(
            std_cmd.get_args().collect::<Vec<_>>(),
            vec!["build/index.js"]
        );
        assert_eq!(
            std_cmd.get_current_dir(),
            Some(Path::new("/opt/x-mcp-server"))
        );
        let envs: Vec<_> = std_cmd.get_envs().collect();
        assert!(envs
            .iter()
            .any(|(k, v)| *k == "X_API_KEY" && *v == Some(std::ffi::OsStr::new("secret"))));
    }

    #[tokio::test]
    async fn test_spawn_missing_binary_fails() {
        let params = ConnectionParams::new(
            "touchline-definitely-missing-binary",
            vec![],
            None,
            HashMap::new(),
        );
        let result = spawn_process(&params);
        assert!(matches!(result, Err(BridgeError::Spawn(_))));
    }

    #[tokio::test]
    async fn test_spawn_empty_command_fails() {
        let params = ConnectionParams::new("  ", vec![], None, HashMap::new());
        assert!(matches!(
            spawn_process(&params),
            Err(BridgeError::Spawn(_))
        ));
    }
}
