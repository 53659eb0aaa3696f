//! Node availability transitions

use std::sync::Arc;

use tracing::info;

use super::client::SwarmClient;
use super::command::CommandRunner;
use super::locks::TargetLocks;
use super::node::NodeAvailability;
use super::scale::Confirmation;
use crate::error::{Result, SwarmError};

/// Result of an accepted availability change
#[derive(Debug, Clone)]
pub struct AvailabilityOutcome {
    /// Node ID
    pub node_id: String,
    /// Applied availability
    pub action: NodeAvailability,
    /// Whether the command output named the node
    pub confirmation: Confirmation,
    /// Raw command output, for operator display
    pub output: String,
}

/// Validates and applies a node's availability transition.
///
/// Operations on the same node are serialized, like scaling.
pub struct AvailabilityController<R> {
    client: Arc<SwarmClient<R>>,
    locks: TargetLocks,
}

impl<R: CommandRunner> AvailabilityController<R> {
    /// Create a controller over the given client
    pub fn new(client: Arc<SwarmClient<R>>) -> Self {
        Self {
            client,
            locks: TargetLocks::new(),
        }
    }

    /// Move a node between `active`, `pause`, and `drain`.
    ///
    /// The action is validated against the closed set before any command is
    /// constructed.
    pub async fn set_availability(
        &self,
        node_id: &str,
        action: &str,
    ) -> Result<AvailabilityOutcome> {
        let action = NodeAvailability::parse_action(action)
            .ok_or_else(|| SwarmError::InvalidAction(action.to_string()))?;
        if node_id.is_empty() {
            return Err(SwarmError::InvalidArgument("node id is required"));
        }

        let lock = self.locks.acquire(node_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.apply(node_id, action).await
        };
        drop(lock);
        self.locks.prune(node_id).await;

        result
    }

    async fn apply(&self, node_id: &str, action: NodeAvailability) -> Result<AvailabilityOutcome> {
        let output = self
            .client
            .runner()
            .run(&["node", "update", "--availability", action.as_arg(), node_id])
            .await
            .map_err(SwarmError::AvailabilityCommandFailed)?;

        let confirmation = if output.contains(node_id) {
            Confirmation::Confirmed
        } else {
            Confirmation::Unconfirmed
        };

        info!(
            node = %node_id,
            action = %action,
            ?confirmation,
            "availability update accepted"
        );

        Ok(AvailabilityOutcome {
            node_id: node_id.to_string(),
            action,
            confirmation,
            output,
        })
    }
}
