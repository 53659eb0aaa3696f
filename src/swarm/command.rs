//! External orchestrator command execution

use std::io;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::CommandError;

/// Default bound on a single command invocation
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes a single external control command and returns its raw stdout.
///
/// Invocations are one-shot: a failure is reported, never retried, since a
/// mutating command's side effects may already have partially applied. For
/// mutating commands a successful return means the command was accepted and
/// executed by the orchestrator, not that convergence has completed.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &[&str]) -> Result<String, CommandError>;
}

/// Command runner backed by the local Docker CLI
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    timeout: Duration,
}

impl DockerCli {
    /// Create a runner for the given binary with a per-invocation timeout
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker", DEFAULT_COMMAND_TIMEOUT)
    }
}

#[async_trait]
impl CommandRunner for DockerCli {
    async fn run(&self, args: &[&str]) -> Result<String, CommandError> {
        debug!(binary = %self.binary, ?args, "running orchestrator command");

        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) if err.kind() == io::ErrorKind::NotFound => {
                return Err(CommandError::ToolNotFound(self.binary.clone()));
            }
            Ok(Err(err)) => return Err(CommandError::Io(err)),
            // The future is dropped on expiry, which kills the child.
            Err(_) => {
                return Err(CommandError::TimedOut {
                    secs: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CommandError::ExecutionFailure {
                code: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end()
            .to_string())
    }
}
