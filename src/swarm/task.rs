//! Swarm task records

use serde::{Deserialize, Serialize};

/// One row of `service ps` / `node ps` output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    /// Task ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Task name (service name plus slot)
    pub name: String,
    /// Image reference
    #[serde(default)]
    pub image: String,
    /// Hostname or ID of the node the task is placed on
    #[serde(default)]
    pub node: String,
    /// Desired state, as formatted by the CLI (`Running`, `Shutdown`, ...)
    #[serde(default)]
    pub desired_state: String,
    /// Current state column, including the relative-time suffix
    #[serde(default)]
    pub current_state: String,
    /// Empty unless the task failed
    #[serde(default)]
    pub error: String,
    /// Published ports
    #[serde(default)]
    pub ports: String,
}

impl Task {
    /// Whether the orchestrator recorded a failure for this task
    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}
