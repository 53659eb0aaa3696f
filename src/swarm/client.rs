//! Read-side queries against the cluster
//!
//! Every query re-derives truth from the live orchestrator; nothing is
//! cached between calls.

use serde_json::Value;

use super::command::CommandRunner;
use super::decode::{decode_lines, Decoded};
use super::node::{Node, NodeDetail};
use super::service::Service;
use super::task::Task;
use crate::error::{Result, SwarmError};

/// Go-template argument that makes the CLI emit one JSON object per line
const JSON_FORMAT: &str = "{{json .}}";

/// Typed client over the orchestrator's line-oriented command interface
pub struct SwarmClient<R> {
    runner: R,
}

impl<R: CommandRunner> SwarmClient<R> {
    /// Create a client over the given command runner
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// The underlying command runner, for issuing mutating commands
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// List all services in the cluster
    pub async fn list_services(&self) -> Result<Vec<Decoded<Service>>> {
        let raw = self
            .runner
            .run(&["service", "ls", "--format", JSON_FORMAT])
            .await?;
        Ok(decode_lines(&raw))
    }

    /// List all nodes in the cluster
    pub async fn list_nodes(&self) -> Result<Vec<Decoded<Node>>> {
        let raw = self
            .runner
            .run(&["node", "ls", "--format", JSON_FORMAT])
            .await?;
        Ok(decode_lines(&raw))
    }

    /// List the tasks of a service
    pub async fn list_service_tasks(&self, service: &str) -> Result<Vec<Decoded<Task>>> {
        if service.is_empty() {
            return Err(SwarmError::InvalidArgument("service id or name is required"));
        }
        let raw = self
            .runner
            .run(&["service", "ps", service, "--format", JSON_FORMAT, "--no-trunc"])
            .await?;
        Ok(decode_lines(&raw))
    }

    /// List the tasks placed on a node
    pub async fn list_node_tasks(&self, node: &str) -> Result<Vec<Decoded<Task>>> {
        if node.is_empty() {
            return Err(SwarmError::InvalidArgument("node id or hostname is required"));
        }
        let raw = self
            .runner
            .run(&["node", "ps", node, "--format", JSON_FORMAT, "--no-trunc"])
            .await?;
        Ok(decode_lines(&raw))
    }

    /// Fetch a single node's full detail record.
    ///
    /// `node inspect` emits a one-element JSON array; the element is
    /// unwrapped. A bare object is tolerated since older CLI versions emit
    /// one. Any other shape, including a multi-element array, is a
    /// malformed response rather than something to silently pick from.
    pub async fn inspect_node(&self, node: &str) -> Result<NodeDetail> {
        if node.is_empty() {
            return Err(SwarmError::InvalidArgument("node id or hostname is required"));
        }
        let raw = self.runner.run(&["node", "inspect", node]).await?;

        let value: Value = serde_json::from_str(&raw).map_err(|err| {
            SwarmError::MalformedResponse(format!("node inspect output is not valid JSON: {err}"))
        })?;

        let detail = match value {
            Value::Array(mut items) if items.len() == 1 => items.remove(0),
            Value::Array(items) => {
                return Err(SwarmError::MalformedResponse(format!(
                    "expected a single-element array from node inspect, got {} elements",
                    items.len()
                )));
            }
            object @ Value::Object(_) => object,
            other => {
                return Err(SwarmError::MalformedResponse(format!(
                    "unexpected node inspect shape: {other}"
                )));
            }
        };

        serde_json::from_value(detail).map_err(|err| {
            SwarmError::MalformedResponse(format!("could not decode node detail: {err}"))
        })
    }
}
