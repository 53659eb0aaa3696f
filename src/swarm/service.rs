//! Swarm service records

use std::fmt;

use serde::{Deserialize, Serialize};

/// Service mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceMode {
    /// Replicated service
    #[serde(rename = "replicated")]
    Replicated,
    /// Global service (one task per node, scales with cluster size)
    #[serde(rename = "global")]
    Global,
    /// Replicated job
    #[serde(rename = "replicated job")]
    ReplicatedJob,
    /// Global job
    #[serde(rename = "global job")]
    GlobalJob,
}

impl fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self {
            ServiceMode::Replicated => "replicated",
            ServiceMode::Global => "global",
            ServiceMode::ReplicatedJob => "replicated job",
            ServiceMode::GlobalJob => "global job",
        };
        write!(f, "{mode}")
    }
}

/// One row of `service ls` output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Service {
    /// Service ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Service name
    pub name: String,
    /// Service mode
    pub mode: ServiceMode,
    /// Raw replica column: `"current/desired"` for replicated services,
    /// `"global"` for global ones
    pub replicas: String,
    /// Image reference
    #[serde(default)]
    pub image: String,
    /// Published ports, as formatted by the CLI
    #[serde(default)]
    pub ports: String,
}

impl Service {
    /// Desired replica count, parsed from the second component of the
    /// `"current/desired"` column.
    ///
    /// Scaling operates off the desired count rather than the transient
    /// running count, so a service mid-convergence is not scaled relative
    /// to a momentarily-wrong value.
    pub fn desired_replicas(&self) -> Option<u64> {
        let mut parts = self.replicas.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(_current), Some(desired), None) => desired.trim().parse().ok(),
            _ => None,
        }
    }
}
