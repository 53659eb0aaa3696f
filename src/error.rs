//! Error types for swarmdeck

use thiserror::Error;

/// Result type for swarmdeck operations
pub type Result<T> = std::result::Result<T, SwarmError>;

/// Failure of a single external orchestrator command invocation
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("orchestrator binary not found: {0}")]
    ToolNotFound(String),

    #[error("command exited with status {code:?}: {stderr}")]
    ExecutionFailure { code: Option<i32>, stderr: String },

    #[error("command timed out after {secs}s")]
    TimedOut { secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// swarmdeck error types
#[derive(Error, Debug)]
pub enum SwarmError {
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("service {0} is not replicated and cannot be scaled by replica count")]
    NotScalable(String),

    #[error("could not parse replica count for service {service}: {raw:?}")]
    UnparseableReplicaCount { service: String, raw: String },

    #[error("invalid scaling direction: {0}")]
    InvalidDirection(String),

    #[error("invalid availability action: {0}")]
    InvalidAction(String),

    #[error("scale command failed: {0}")]
    ScaleCommandFailed(#[source] CommandError),

    #[error("availability command failed: {0}")]
    AvailabilityCommandFailed(#[source] CommandError),
}
